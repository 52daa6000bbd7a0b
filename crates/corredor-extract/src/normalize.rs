//! Deterministic value/currency normalization.
//!
//! The prompt already instructs the model to convert lucas/palos/UF/USD into
//! CLP at extraction time; this pass re-derives the final cell values so a
//! drifting model cannot produce formatted or fractional amounts.

/// Normalize a raw value/currency pair from the model.
///
/// Strips every non-digit character from the value. If nothing remains,
/// both fields are cleared; value and currency are always set together.
/// Otherwise the currency records the original unit when the model reported
/// a UF or USD source, and plain "CLP" otherwise.
pub fn normalize_value(raw_value: &str, raw_currency: &str) -> (String, String) {
    let digits: String = raw_value.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return (String::new(), String::new());
    }

    // Drop leading zeros but keep a lone zero.
    let trimmed = digits.trim_start_matches('0');
    let value = if trimmed.is_empty() { "0" } else { trimmed };

    let upper = raw_currency.to_uppercase();
    let currency = if upper.contains("UF") {
        "CLP (original UF)"
    } else if upper.contains("USD") {
        "CLP (original USD)"
    } else {
        "CLP"
    };

    (value.to_string(), currency.to_string())
}
