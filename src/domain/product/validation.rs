//! Schema checks for untrusted product input.
//!
//! Both entry points run every field check and collect all violations before
//! returning, so a caller can report every problem in a single response.
//! Unrecognized keys are dropped.

use super::{ProductCreateData, ProductUpdateData};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;

pub const NAME_MIN_LEN: usize = 3;
pub const DESCRIPTION_MIN_LEN: usize = 10;
pub const SKU_MIN_LEN: usize = 3;

pub const MSG_REQUIRED: &str = "Required";
pub const MSG_NAME: &str = "Name must be at least 3 characters.";
pub const MSG_DESCRIPTION: &str = "Description must be at least 10 characters.";
pub const MSG_PRICE: &str = "Price must be a positive number.";
pub const MSG_SKU: &str = "SKU must be at least 3 characters.";
pub const MSG_STOCK: &str = "Stock cannot be negative.";
pub const MSG_STOCK_RANGE: &str = "Stock is too large.";
pub const MSG_IMAGE_URL: &str = "Invalid image URL.";
pub const MSG_NUL_CHAR: &str = "Text cannot contain NUL characters.";
pub const MSG_NO_UPDATE_DATA: &str = "No data provided for update.";

/// Flattened validation failure: record-level messages plus per-field messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.field_errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn add_form(&mut self, message: impl Into<String>) {
        self.form_errors.push(message.into());
    }

    /// Messages recorded for `field`, if any.
    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.field_errors.get(field).map(Vec::as_slice)
    }

    fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.form_errors.clone();
        for (field, messages) in &self.field_errors {
            parts.push(format!("{}: {}", field, messages.join(", ")));
        }
        write!(f, "{}", parts.join("; "))
    }
}

/// Validates a full creation payload.
pub fn validate_create(input: &JsonValue) -> Result<ProductCreateData, FieldErrors> {
    let mut errors = FieldErrors::default();
    let obj = match as_object(input, &mut errors) {
        Some(o) => o,
        None => return Err(errors),
    };

    let name = required(obj, "name", &mut errors, |v| text(v, NAME_MIN_LEN, MSG_NAME));
    let description = required(obj, "description", &mut errors, |v| {
        text(v, DESCRIPTION_MIN_LEN, MSG_DESCRIPTION)
    });
    let price = required(obj, "price", &mut errors, price);
    let sku = required(obj, "sku", &mut errors, |v| text(v, SKU_MIN_LEN, MSG_SKU));
    let stock = required(obj, "stock", &mut errors, stock);
    let image_url = optional(obj, "imageUrl", &mut errors, image_url).flatten();

    match (name, description, price, sku, stock) {
        (Some(name), Some(description), Some(price), Some(sku), Some(stock)) => errors.into_result(
            ProductCreateData {
                name,
                description,
                price,
                sku,
                stock,
                image_url,
            },
        ),
        _ => Err(errors),
    }
}

/// Validates a partial update payload. At least one recognized field must be present.
pub fn validate_update(input: &JsonValue) -> Result<ProductUpdateData, FieldErrors> {
    let mut errors = FieldErrors::default();
    let obj = match as_object(input, &mut errors) {
        Some(o) => o,
        None => return Err(errors),
    };

    let data = ProductUpdateData {
        name: optional(obj, "name", &mut errors, |v| text(v, NAME_MIN_LEN, MSG_NAME)),
        description: optional(obj, "description", &mut errors, |v| {
            text(v, DESCRIPTION_MIN_LEN, MSG_DESCRIPTION)
        }),
        price: optional(obj, "price", &mut errors, price),
        sku: optional(obj, "sku", &mut errors, |v| text(v, SKU_MIN_LEN, MSG_SKU)),
        stock: optional(obj, "stock", &mut errors, stock),
        image_url: optional(obj, "imageUrl", &mut errors, image_url),
    };

    if errors.is_empty() && data.is_empty() {
        errors.add_form(MSG_NO_UPDATE_DATA);
    }
    errors.into_result(data)
}

fn as_object<'a>(input: &'a JsonValue, errors: &mut FieldErrors) -> Option<&'a Map<String, JsonValue>> {
    let obj = input.as_object();
    if obj.is_none() {
        errors.add_form(type_mismatch("object", input));
    }
    obj
}

fn required<T>(
    obj: &Map<String, JsonValue>,
    field: &str,
    errors: &mut FieldErrors,
    check: impl FnOnce(&JsonValue) -> Result<T, String>,
) -> Option<T> {
    match obj.get(field) {
        None => {
            errors.add(field, MSG_REQUIRED);
            None
        }
        Some(v) => record(field, check(v), errors),
    }
}

fn optional<T>(
    obj: &Map<String, JsonValue>,
    field: &str,
    errors: &mut FieldErrors,
    check: impl FnOnce(&JsonValue) -> Result<T, String>,
) -> Option<T> {
    obj.get(field).and_then(|v| record(field, check(v), errors))
}

fn record<T>(field: &str, outcome: Result<T, String>, errors: &mut FieldErrors) -> Option<T> {
    match outcome {
        Ok(v) => Some(v),
        Err(msg) => {
            errors.add(field, msg);
            None
        }
    }
}

fn json_type_name(v: &JsonValue) -> &'static str {
    match v {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn type_mismatch(expected: &str, got: &JsonValue) -> String {
    format!("Expected {}, received {}", expected, json_type_name(got))
}

fn text(v: &JsonValue, min_len: usize, message: &str) -> Result<String, String> {
    let s = v.as_str().ok_or_else(|| type_mismatch("string", v))?;
    // Postgres TEXT cannot store U+0000.
    if s.contains('\0') {
        return Err(MSG_NUL_CHAR.to_string());
    }
    if s.chars().count() < min_len {
        return Err(message.to_string());
    }
    Ok(s.to_string())
}

fn price(v: &JsonValue) -> Result<f64, String> {
    let n = v.as_f64().ok_or_else(|| type_mismatch("number", v))?;
    if !n.is_finite() || n <= 0.0 {
        return Err(MSG_PRICE.to_string());
    }
    Ok(n)
}

fn stock(v: &JsonValue) -> Result<i32, String> {
    if let Some(n) = v.as_i64() {
        return stock_in_range(n < 0, i32::try_from(n).ok());
    }
    // Beyond i64, or written with a fraction: 5.0 is an integer, 5.5 is not.
    let f = v.as_f64().ok_or_else(|| type_mismatch("number", v))?;
    if f.fract() != 0.0 {
        return Err("Expected integer, received float".to_string());
    }
    let exact = (f.abs() <= f64::from(i32::MAX)).then(|| f as i32);
    stock_in_range(f < 0.0, exact)
}

fn stock_in_range(negative: bool, value: Option<i32>) -> Result<i32, String> {
    if negative {
        return Err(MSG_STOCK.to_string());
    }
    value.ok_or_else(|| MSG_STOCK_RANGE.to_string())
}

/// `""` and `null` both mean "no image".
fn image_url(v: &JsonValue) -> Result<Option<String>, String> {
    match v {
        JsonValue::Null => Ok(None),
        JsonValue::String(s) if s.is_empty() => Ok(None),
        JsonValue::String(s) if s.contains('\0') => Err(MSG_NUL_CHAR.to_string()),
        JsonValue::String(s) => Url::parse(s)
            .map(|_| Some(s.clone()))
            .map_err(|_| MSG_IMAGE_URL.to_string()),
        other => Err(type_mismatch("string", other)),
    }
}
