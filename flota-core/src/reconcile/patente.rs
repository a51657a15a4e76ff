use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]").expect("plate regex"));

/// Canonical plate: alphanumerics only, uppercased. `"ab-123 cd"` becomes `"AB123CD"`.
pub fn normalize_patente(patente: &str) -> String {
    NON_ALNUM.replace_all(patente, "").to_uppercase()
}
