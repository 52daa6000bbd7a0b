//! Shared Busco/Ofrezco keyword classifier.
//!
//! One keyword table, three call sites: the extraction engine (intent
//! recomputation over the raw message), the splitter (indicator scan), and
//! the search-query parser. Deterministic string matching, no model calls.

use corredor_core::record::{Intent, OperationType};

/// Phrases signalling the sender is offering a property.
pub const OFFER_KEYWORDS: &[&str] = &[
    "tengo",
    "ofrezco",
    "dispongo",
    "vendo",
    "vendemos",
    "arriendo",
    "arrendamos",
    "se vende",
    "se arrienda",
    "se ofrece",
    "disponible",
    "en venta",
    "en arriendo",
];

/// Phrases signalling the sender is looking for a property.
pub const SEEK_KEYWORDS: &[&str] = &[
    "busco",
    "buscamos",
    "ando buscando",
    "necesito",
    "necesitamos",
    "requiero",
    "quiero comprar",
    "quiero arrendar",
    "me interesa comprar",
];

/// What the keyword scan found in a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentSignal {
    Busco,
    Ofrezco,
    /// Both offer and seek keywords present.
    Ambiguous,
    /// Neither present.
    None,
}

/// Classify a whole message by keyword membership.
pub fn classify_intent(text: &str) -> IntentSignal {
    let lower = text.to_lowercase();
    let offers = OFFER_KEYWORDS.iter().any(|kw| lower.contains(kw));
    let seeks = SEEK_KEYWORDS.iter().any(|kw| lower.contains(kw));
    match (offers, seeks) {
        (true, false) => IntentSignal::Ofrezco,
        (false, true) => IntentSignal::Busco,
        (true, true) => IntentSignal::Ambiguous,
        (false, false) => IntentSignal::None,
    }
}

/// Resolve a signal into a final intent, falling back to the operation type
/// when the keywords are ambiguous or absent: Compra means the sender is
/// looking, Venta/Arriendo means they are offering.
pub fn resolve_intent(signal: IntentSignal, operation: Option<OperationType>) -> Option<Intent> {
    match signal {
        IntentSignal::Ofrezco => Some(Intent::Ofrezco),
        IntentSignal::Busco => Some(Intent::Busco),
        IntentSignal::Ambiguous | IntentSignal::None => match operation {
            Some(OperationType::Compra) => Some(Intent::Busco),
            Some(OperationType::Venta) | Some(OperationType::Arriendo) => Some(Intent::Ofrezco),
            None => None,
        },
    }
}

/// A keyword occurrence inside scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indicator {
    /// Byte offset of the match.
    pub position: usize,
    pub polarity: Intent,
    pub keyword: &'static str,
}

/// Every offer/seek keyword occurrence in `text`, in position order.
///
/// Multiple occurrences of the same keyword all appear. The splitter uses
/// this to emit one record per competing transaction.
pub fn find_indicators(text: &str) -> Vec<Indicator> {
    let lower = text.to_lowercase();
    let mut found = Vec::new();

    let mut scan = |keywords: &[&'static str], polarity: Intent| {
        for &kw in keywords {
            let mut start = 0;
            while let Some(pos) = lower[start..].find(kw) {
                found.push(Indicator {
                    position: start + pos,
                    polarity,
                    keyword: kw,
                });
                start += pos + 1;
            }
        }
    };

    scan(SEEK_KEYWORDS, Intent::Busco);
    scan(OFFER_KEYWORDS, Intent::Ofrezco);

    found.sort_by_key(|i| i.position);
    found
}

/// Map an indicator keyword to the operation it implies.
///
/// A bare "busco" with no further context defaults to Compra.
pub fn infer_operation(keyword: &str, polarity: Intent) -> OperationType {
    match keyword {
        "vendo" | "vendemos" | "se vende" | "en venta" => OperationType::Venta,
        "arriendo" | "arrendamos" | "se arrienda" | "en arriendo" | "quiero arrendar" => {
            OperationType::Arriendo
        }
        _ => match polarity {
            Intent::Busco => OperationType::Compra,
            Intent::Ofrezco => OperationType::Venta,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_only() {
        assert_eq!(
            classify_intent("Vendo depto en Providencia, 2D 1B"),
            IntentSignal::Ofrezco
        );
    }

    #[test]
    fn test_seek_only() {
        assert_eq!(
            classify_intent("Busco casa en Las Condes con patio"),
            IntentSignal::Busco
        );
    }

    #[test]
    fn test_both_is_ambiguous() {
        assert_eq!(
            classify_intent("Vendo mi depto y además busco oficina"),
            IntentSignal::Ambiguous
        );
    }

    #[test]
    fn test_neither_is_none() {
        assert_eq!(
            classify_intent("Departamento 2 dormitorios Providencia"),
            IntentSignal::None
        );
    }

    #[test]
    fn test_resolve_ambiguous_via_operation() {
        assert_eq!(
            resolve_intent(IntentSignal::Ambiguous, Some(OperationType::Compra)),
            Some(Intent::Busco)
        );
        assert_eq!(
            resolve_intent(IntentSignal::Ambiguous, Some(OperationType::Venta)),
            Some(Intent::Ofrezco)
        );
        assert_eq!(
            resolve_intent(IntentSignal::None, Some(OperationType::Arriendo)),
            Some(Intent::Ofrezco)
        );
        assert_eq!(resolve_intent(IntentSignal::None, None), None);
    }

    #[test]
    fn test_signal_wins_over_operation() {
        // Keywords trump whatever the model put in the operation field.
        assert_eq!(
            resolve_intent(IntentSignal::Ofrezco, Some(OperationType::Compra)),
            Some(Intent::Ofrezco)
        );
    }

    #[test]
    fn test_find_indicators_in_order() {
        let found = find_indicators("vendo casa en Macul y busco oficina");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].keyword, "vendo");
        assert_eq!(found[0].polarity, Intent::Ofrezco);
        assert_eq!(found[1].keyword, "busco");
        assert_eq!(found[1].polarity, Intent::Busco);
        assert!(found[0].position < found[1].position);
    }

    #[test]
    fn test_find_indicators_repeated_keyword() {
        let found = find_indicators("vendo casa, vendo bodega");
        let vendo: Vec<_> = found.iter().filter(|i| i.keyword == "vendo").collect();
        assert_eq!(vendo.len(), 2);
    }

    #[test]
    fn test_infer_operation() {
        assert_eq!(
            infer_operation("vendo", Intent::Ofrezco),
            OperationType::Venta
        );
        assert_eq!(
            infer_operation("arriendo", Intent::Ofrezco),
            OperationType::Arriendo
        );
        assert_eq!(
            infer_operation("busco", Intent::Busco),
            OperationType::Compra
        );
        assert_eq!(
            infer_operation("tengo", Intent::Ofrezco),
            OperationType::Venta
        );
    }
}
