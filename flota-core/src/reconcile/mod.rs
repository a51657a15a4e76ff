//! Reconciliation of raw stored documents into the typed display model.
//!
//! Documents loaded by the legacy ETL mix UPPER and lowercase keys for the
//! same field, store numbers as strings (and strings as numbers), and use
//! textual null markers. Everything that reads a raw document goes through the
//! helpers here so the rules live in one place.

pub mod alertas;
pub mod costos;
pub mod documentos;
pub mod fechas;
pub mod patente;
pub mod vehiculo;

use serde_json::Value;

use crate::constants::NULL_MARKERS;
use crate::storage::Document;

/// True when a value carries no information: null, empty/whitespace strings,
/// null markers such as `"N/A"` or `"nan"`, and non-finite numbers.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed.is_empty() || NULL_MARKERS.iter().any(|m| trimmed.eq_ignore_ascii_case(m))
        }
        Value::Number(n) => n.as_f64().map_or(true, |f| !f.is_finite()),
        _ => false,
    }
}

/// First non-blank value among `keys`, in order
pub fn coalesce<'a>(doc: &'a Document, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| doc.get(*k))
        .find(|v| !is_blank(v))
}

/// Render a scalar as text. Integral floats lose their fraction so a móvil
/// stored as `12.0` reads `"12"`.
pub fn value_as_string(value: &Value) -> Option<String> {
    if is_blank(value) {
        return None;
    }
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else {
                let f = n.as_f64()?;
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    Some(format!("{}", f as i64))
                } else {
                    Some(f.to_string())
                }
            }
        }
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Numbers and numeric strings; a decimal comma is accepted (`"1234,5"`)
pub fn value_as_f64(value: &Value) -> Option<f64> {
    if is_blank(value) {
        return None;
    }
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => {
            let cleaned = s.trim().replace(['$', ' '], "");
            let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
                // "1.234,56": dot groups thousands, comma is the decimal mark
                (Some(comma), Some(dot)) if comma > dot => {
                    cleaned.replace('.', "").replace(',', ".")
                }
                (Some(_), Some(_)) => cleaned.replace(',', ""),
                (Some(_), None) => cleaned.replace(',', "."),
                _ => cleaned,
            };
            normalized.parse::<f64>().ok().filter(|f| f.is_finite())
        }
        _ => None,
    }
}

/// Booleans, `1`/`0`, and the textual forms the ETL produced (`SI`, `NO`, `true`, ...)
pub fn value_as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match fold(s).as_str() {
            "true" | "si" | "s" | "1" | "activo" | "yes" => Some(true),
            "false" | "no" | "n" | "0" | "inactivo" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

pub fn coalesce_str(doc: &Document, keys: &[&str]) -> Option<String> {
    coalesce(doc, keys).and_then(value_as_string)
}

pub fn coalesce_f64(doc: &Document, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|k| doc.get(*k))
        .find_map(value_as_f64)
}

pub fn coalesce_bool(doc: &Document, keys: &[&str]) -> Option<bool> {
    keys.iter()
        .filter_map(|k| doc.get(*k))
        .find_map(value_as_bool)
}

/// Lowercase and strip Spanish diacritics, for keyword comparisons
pub fn fold(text: &str) -> String {
    text.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ä' => 'a',
            'é' | 'è' | 'ë' => 'e',
            'í' | 'ì' | 'ï' => 'i',
            'ó' | 'ò' | 'ö' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

/// Round to cents
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Document id as a string, whatever scalar type it was stored with
pub fn document_id(doc: &Document) -> Option<String> {
    doc.get("_id").and_then(value_as_string)
}
