//! The extraction engine: prompt → provider → parse → post-process.

use crate::classify::{classify_intent, resolve_intent};
use crate::normalize::normalize_value;
use crate::parse::{parse_response, ParseResult};
use crate::prompt::build_extraction_prompt;
use corredor_core::{config::ExtractConfig, record::PropertyRecord, traits::Provider};
use std::sync::Arc;
use tracing::{debug, warn};

/// Extracts structured property records from free-text messages.
pub struct Extractor {
    provider: Arc<dyn Provider>,
    uf_rate_clp: u64,
    usd_rate_clp: u64,
}

impl Extractor {
    pub fn new(provider: Arc<dyn Provider>, config: &ExtractConfig) -> Self {
        Self {
            provider,
            uf_rate_clp: config.uf_rate_clp,
            usd_rate_clp: config.usd_rate_clp,
        }
    }

    /// Extract all property records from a message.
    ///
    /// Never fails: provider errors and malformed responses yield an empty
    /// list. Record order follows the source JSON.
    pub async fn extract(&self, message_text: &str) -> Vec<PropertyRecord> {
        let prompt = build_extraction_prompt(message_text, self.uf_rate_clp, self.usd_rate_clp);

        let raw = match self.provider.complete(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("extraction provider call failed: {e}");
                return Vec::new();
            }
        };

        let candidates = match parse_response(&raw) {
            ParseResult::Malformed => return Vec::new(),
            result => result.into_records(),
        };

        debug!(
            "extracted {} candidate record(s) from message ({} chars)",
            candidates.len(),
            message_text.len()
        );

        candidates
            .into_iter()
            .map(|record| post_process(record, message_text))
            .collect()
    }
}

/// Deterministic post-processing of one parsed candidate.
///
/// The intent is recomputed from the whole original message (the model's
/// own polarity label is never trusted), and the value/currency pair is
/// re-derived from digits only.
fn post_process(mut record: PropertyRecord, message_text: &str) -> PropertyRecord {
    let signal = classify_intent(message_text);
    record.intent = resolve_intent(signal, record.operation);

    let (value, currency) = normalize_value(&record.value, &record.currency);
    record.value = value;
    record.currency = currency;

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use corredor_core::error::CorredorError;
    use corredor_core::record::{Intent, OperationType};

    /// Provider returning a canned response, or an error.
    struct MockProvider {
        response: Result<String, String>,
    }

    impl MockProvider {
        fn ok(response: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(response.to_string()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                response: Err("quota exceeded".to_string()),
            })
        }
    }

    #[async_trait]
    impl Provider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn complete(&self, _prompt: &str) -> Result<String, CorredorError> {
            self.response
                .clone()
                .map_err(CorredorError::Provider)
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    fn extractor(provider: Arc<MockProvider>) -> Extractor {
        Extractor::new(provider, &ExtractConfig::default())
    }

    #[tokio::test]
    async fn test_single_property_intent_from_message_not_model() {
        // The model mislabels the polarity; the keyword heuristic corrects it.
        let response = r#"{
            "Busco / Ofrezco": "Busco",
            "Tipo de Operacion": "Venta",
            "Propiedad": "Departamento",
            "Opcion Comuna": "Providencia",
            "Valor": "55000000",
            "Moneda": "CLP"
        }"#;
        let records = extractor(MockProvider::ok(response))
            .extract("Vendo depto en Providencia en 55 palos")
            .await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].intent, Some(Intent::Ofrezco));
        assert_eq!(records[0].operation, Some(OperationType::Venta));
    }

    #[tokio::test]
    async fn test_lucas_value_normalized() {
        let response = r#"{
            "Tipo de Operacion": "Arriendo",
            "Propiedad": "Departamento",
            "Valor": "500.000",
            "Moneda": "CLP"
        }"#;
        let records = extractor(MockProvider::ok(response))
            .extract("arriendo depto en 500 lucas")
            .await;
        assert_eq!(records[0].value, "500000");
        assert_eq!(records[0].currency, "CLP");
    }

    #[tokio::test]
    async fn test_uf_value_keeps_original_tag() {
        let response = r#"{
            "Tipo de Operacion": "Venta",
            "Propiedad": "Oficina",
            "Valor": 3700000,
            "Moneda": "CLP (original UF)"
        }"#;
        let records = extractor(MockProvider::ok(response))
            .extract("vendo oficina en 100 UF")
            .await;
        assert_eq!(records[0].value, "3700000");
        assert_eq!(records[0].currency, "CLP (original UF)");
    }

    #[tokio::test]
    async fn test_empty_value_clears_currency() {
        let response = r#"{
            "Tipo de Operacion": "Compra",
            "Propiedad": "Casa",
            "Valor": "",
            "Moneda": "CLP"
        }"#;
        let records = extractor(MockProvider::ok(response))
            .extract("busco casa en Ñuñoa")
            .await;
        assert_eq!(records[0].value, "");
        assert_eq!(records[0].currency, "");
        assert_eq!(records[0].intent, Some(Intent::Busco));
    }

    #[tokio::test]
    async fn test_array_response_preserves_order() {
        let response = r#"[
            {"Tipo de Operacion": "Arriendo", "Propiedad": "Departamento"},
            {"Tipo de Operacion": "Compra", "Propiedad": "Oficina"}
        ]"#;
        let records = extractor(MockProvider::ok(response))
            .extract("tengo un depto en arriendo y ando buscando oficina")
            .await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].property_type, "Departamento");
        assert_eq!(records[1].property_type, "Oficina");
        // Ambiguous message: each record resolves via its own operation.
        assert_eq!(records[0].intent, Some(Intent::Ofrezco));
        assert_eq!(records[1].intent, Some(Intent::Busco));
    }

    #[tokio::test]
    async fn test_malformed_response_yields_empty() {
        let records = extractor(MockProvider::ok("lo siento, no entendí"))
            .extract("vendo casa")
            .await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_provider_error_yields_empty() {
        let records = extractor(MockProvider::failing())
            .extract("vendo casa")
            .await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_no_keywords_falls_back_to_operation() {
        let response = r#"{"Tipo de Operacion": "Compra", "Propiedad": "Terreno"}"#;
        let records = extractor(MockProvider::ok(response))
            .extract("terreno en Chicureo 5000 m2")
            .await;
        assert_eq!(records[0].intent, Some(Intent::Busco));
    }
}
