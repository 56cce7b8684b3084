// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

fn main() -> Result<(), String> {
    let mut out: Option<PathBuf> = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--out" {
            out = args.next().map(PathBuf::from);
        }
    }
    let spec = rfjam_api::openapi::openapi_spec();
    let mut bytes = serde_json::to_vec_pretty(&spec).map_err(|e| e.to_string())?;
    bytes.push(b'\n');
    let Some(out) = out else {
        io::stdout().write_all(&bytes).map_err(|e| e.to_string())?;
        return Ok(());
    };
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    fs::write(&out, bytes).map_err(|e| e.to_string())?;
    eprintln!("wrote OpenAPI spec: {}", out.display());
    Ok(())
}
