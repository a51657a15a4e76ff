use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },

    /// Rejected locally, nothing was sent
    #[error("{0}")]
    Validation(String),

    #[error("Invalid response body: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

fn validation_item(item: &Value) -> String {
    let loc = item
        .get("loc")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .map(|p| match p {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(" → ")
        })
        .unwrap_or_default();
    let msg = item.get("msg").and_then(Value::as_str).unwrap_or("valor inválido");
    let kind = item.get("type").and_then(Value::as_str);

    let mut line = if loc.is_empty() {
        msg.to_string()
    } else {
        format!("{loc}: {msg}")
    };
    if let Some(kind) = kind {
        line.push_str(&format!(" ({kind})"));
    }
    line
}

/// Human-readable message for a failed response: the backend `detail`
/// when there is one, else generic text with the status code.
pub fn describe_error(status: u16, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned());

    match detail {
        Some(Value::String(s)) if !s.trim().is_empty() => s,
        Some(Value::Array(items)) if !items.is_empty() => items
            .iter()
            .map(validation_item)
            .collect::<Vec<_>>()
            .join("\n"),
        Some(Value::Null) | None => {
            let text = body.trim();
            if text.is_empty() || text.starts_with('{') || text.starts_with('<') {
                format!("Error del servidor (HTTP {status})")
            } else {
                let corto: String = text.chars().take(200).collect();
                format!("Error del servidor (HTTP {status}): {corto}")
            }
        }
        Some(other) => other.to_string(),
    }
}
