//! LLM response parsing.
//!
//! The model may answer with a single JSON object or a JSON array, usually
//! wrapped in markdown code fences. Parsing is modeled as a tagged union so
//! callers handle each shape explicitly; a malformed response is a terminal
//! outcome, never retried.

use corredor_core::record::PropertyRecord;
use tracing::warn;

/// Outcome of parsing a completion response.
#[derive(Debug)]
pub enum ParseResult {
    Single(Box<PropertyRecord>),
    Multiple(Vec<PropertyRecord>),
    Malformed,
}

impl ParseResult {
    /// Flatten into a record list; `Malformed` yields an empty list.
    pub fn into_records(self) -> Vec<PropertyRecord> {
        match self {
            Self::Single(record) => vec![*record],
            Self::Multiple(records) => records,
            Self::Malformed => Vec::new(),
        }
    }
}

/// Strip markdown code fences and surrounding whitespace.
fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    for prefix in ["```json", "```JSON", "```"] {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest;
            break;
        }
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Parse a raw completion into records.
pub fn parse_response(raw: &str) -> ParseResult {
    let cleaned = strip_fences(raw);

    if cleaned.starts_with('[') && cleaned.ends_with(']') {
        match serde_json::from_str::<Vec<PropertyRecord>>(cleaned) {
            Ok(records) => ParseResult::Multiple(records),
            Err(e) => {
                warn!("failed to parse model response as JSON array: {e}");
                ParseResult::Malformed
            }
        }
    } else if cleaned.starts_with('{') && cleaned.ends_with('}') {
        match serde_json::from_str::<PropertyRecord>(cleaned) {
            Ok(record) => ParseResult::Single(Box::new(record)),
            Err(e) => {
                warn!("failed to parse model response as JSON object: {e}");
                ParseResult::Malformed
            }
        }
    } else {
        warn!(
            "model response was neither a JSON object nor an array: {}",
            cleaned.chars().take(80).collect::<String>()
        );
        ParseResult::Malformed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_object() {
        let raw = r#"{"Tipo de Operacion": "Venta", "Propiedad": "Casa"}"#;
        match parse_response(raw) {
            ParseResult::Single(record) => assert_eq!(record.property_type, "Casa"),
            other => panic!("expected Single, got {other:?}"),
        }
    }

    #[test]
    fn test_array() {
        let raw = r#"[{"Propiedad": "Casa"}, {"Propiedad": "Oficina"}]"#;
        match parse_response(raw) {
            ParseResult::Multiple(records) => {
                assert_eq!(records.len(), 2);
                assert_eq!(records[1].property_type, "Oficina");
            }
            other => panic!("expected Multiple, got {other:?}"),
        }
    }

    #[test]
    fn test_fenced_json() {
        let raw = "```json\n{\"Propiedad\": \"Departamento\"}\n```";
        match parse_response(raw) {
            ParseResult::Single(record) => assert_eq!(record.property_type, "Departamento"),
            other => panic!("expected Single, got {other:?}"),
        }
    }

    #[test]
    fn test_prose_is_malformed() {
        assert!(matches!(
            parse_response("No encontré propiedades en el mensaje."),
            ParseResult::Malformed
        ));
    }

    #[test]
    fn test_broken_json_is_malformed() {
        assert!(matches!(
            parse_response(r#"{"Propiedad": "Casa""#),
            ParseResult::Malformed
        ));
        assert!(matches!(
            parse_response(r#"[{"Propiedad": }]"#),
            ParseResult::Malformed
        ));
    }

    #[test]
    fn test_into_records() {
        assert!(ParseResult::Malformed.into_records().is_empty());
        let records = parse_response(r#"[{"Propiedad": "Casa"}]"#).into_records();
        assert_eq!(records.len(), 1);
    }
}
