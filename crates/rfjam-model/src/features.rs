// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

pub const FEATURE_COUNT: usize = 6;

/// Canonical feature order. The scaler and every tree index features by this order.
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] =
    ["Time", "SNR", "Speed", "RSSI", "PDR", "Relative_Speed"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    #[serde(rename = "Time")]
    pub time: f64,
    #[serde(rename = "SNR")]
    pub snr: f64,
    #[serde(rename = "Speed")]
    pub speed: f64,
    #[serde(rename = "RSSI")]
    pub rssi: f64,
    #[serde(rename = "PDR")]
    pub pdr: f64,
    #[serde(rename = "Relative_Speed")]
    pub relative_speed: f64,
}

impl FeatureVector {
    #[must_use]
    pub const fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        Self {
            time: values[0],
            snr: values[1],
            speed: values[2],
            rssi: values[3],
            pdr: values[4],
            relative_speed: values[5],
        }
    }

    #[must_use]
    pub const fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.time,
            self.snr,
            self.speed,
            self.rssi,
            self.pdr,
            self.relative_speed,
        ]
    }

    #[must_use]
    pub fn named(&self) -> [(&'static str, f64); FEATURE_COUNT] {
        let values = self.to_array();
        std::array::from_fn(|i| (FEATURE_COLUMNS[i], values[i]))
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}
