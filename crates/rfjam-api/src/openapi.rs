// SPDX-License-Identifier: Apache-2.0

use crate::ApiErrorCode;
use serde_json::{json, Value};

fn feature_properties() -> Value {
    let mut props = serde_json::Map::new();
    for col in rfjam_model::FEATURE_COLUMNS {
        props.insert(col.to_string(), json!({"type": "number", "format": "double"}));
    }
    Value::Object(props)
}

fn error_ref() -> Value {
    json!({"application/json": {"schema": {"$ref": crate::error_mapping::API_ERROR_SCHEMA_REF}}})
}

/// OpenAPI document covering both the inference and record services.
#[must_use]
pub fn openapi_spec() -> Value {
    let error_codes: Vec<&str> = ApiErrorCode::ALL.iter().map(|c| c.as_str()).collect();
    let mut record_props = feature_properties();
    if let Some(obj) = record_props.as_object_mut() {
        obj.insert("prediction".to_string(), json!({"type": "string", "maxLength": rfjam_model::PREDICTION_MAX_LEN}));
    }
    let mut stored_props = record_props.clone();
    if let Some(obj) = stored_props.as_object_mut() {
        obj.insert("id".to_string(), json!({"type": "integer", "format": "int64"}));
    }
    json!({
      "openapi": "3.0.3",
      "info": {
        "title": "rfjam prediction services",
        "version": env!("CARGO_PKG_VERSION")
      },
      "paths": {
        "/": {"get": {"x-service": "predict", "responses": {"200": {"description": "index page"}}}},
        "/add_record": {
          "post": {
            "x-service": "records",
            "requestBody": {"required": true, "content": {"application/json": {"schema": {"$ref": "#/components/schemas/NewRecord"}}}},
            "responses": {
              "201": {"description": "record created", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/AddRecordResponse"}}}},
              "400": {"description": "missing or invalid fields, malformed or oversized body", "content": error_ref()},
              "500": {"description": "store unavailable", "content": error_ref()}
            }
          }
        },
        "/get_records": {
          "get": {
            "x-service": "records",
            "responses": {
              "200": {"description": "all stored records", "content": {"application/json": {"schema": {"type": "array", "items": {"$ref": "#/components/schemas/PredictionRecord"}}}}},
              "500": {"description": "store unavailable", "content": error_ref()}
            }
          }
        },
        "/healthz": {"get": {"x-service": "both", "responses": {"200": {"description": "ok"}}}},
        "/metrics": {"get": {"x-service": "both", "responses": {"200": {"description": "prometheus metrics"}}}},
        "/predict": {
          "post": {
            "x-service": "predict",
            "requestBody": {"required": true, "content": {"application/json": {"schema": {"$ref": "#/components/schemas/FeatureVector"}}}},
            "responses": {
              "200": {"description": "prediction", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/PredictResponse"}}}},
              "400": {"description": "missing or invalid fields, malformed or oversized body", "content": error_ref()},
              "500": {"description": "model prediction failed", "content": error_ref()}
            }
          }
        },
        "/records_page": {"get": {"x-service": "records", "responses": {"200": {"description": "html table of stored records"}}}}
      },
      "components": {
        "schemas": {
          "AddRecordResponse": {
            "type": "object",
            "required": ["message", "id"],
            "properties": {"id": {"type": "integer", "format": "int64"}, "message": {"type": "string"}}
          },
          "ApiError": {
            "type": "object",
            "required": ["error", "code", "details"],
            "properties": {
              "code": {"type": "string", "enum": error_codes},
              "details": {},
              "error": {"type": "string"},
              "missing": {"type": "array", "items": {"type": "string"}},
              "required": {"type": "array", "items": {"type": "string"}}
            }
          },
          "FeatureVector": {
            "type": "object",
            "required": rfjam_model::FEATURE_COLUMNS,
            "properties": feature_properties()
          },
          "NewRecord": {
            "type": "object",
            "required": rfjam_model::RECORD_FIELDS,
            "properties": record_props
          },
          "PredictResponse": {
            "type": "object",
            "required": ["prediction"],
            "properties": {"prediction": {"type": "string"}}
          },
          "PredictionRecord": {
            "type": "object",
            "properties": stored_props
          }
        }
      }
    })
}
