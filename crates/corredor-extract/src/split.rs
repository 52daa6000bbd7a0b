//! Multi-property splitter.
//!
//! The model sometimes collapses two competing transactions ("vendo casa…
//! ofrezco casa…", "por un lado… por otro lado…") into a single record.
//! This pass detects the mixture over the record's concatenated field text
//! and emits one record per transaction. Splitting is best-effort: when two
//! listings genuinely share details, field attribution may be wrong; that
//! is accepted error, not corrected.

use crate::classify::{find_indicators, infer_operation};
use corredor_core::record::{Intent, OperationType, PropertyRecord};
use regex::Regex;
use tracing::{debug, info};

/// Detects and splits records that encode multiple listings.
pub struct Splitter {
    detection: Vec<Regex>,
    vendo_casa: Regex,
    ofrezco_casa: Regex,
}

impl Default for Splitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Splitter {
    pub fn new() -> Self {
        let detection_patterns = [
            r"por un lado.*por otro lado",
            r"también .*busco",
            r"además .*vendo",
            r"además .*ofrezco",
            r"vendo.*también.*busco",
            r"ofrezco.*también.*busco",
            r"busco.*también.*vendo",
            r"busco.*también.*ofrezco",
            r"vendo.*busco",
            r"ofrezco.*busco",
            r"arriendo.*busco",
            r"busco.*vendo",
            r"busco.*ofrezco",
            r"busco.*arriendo",
            r"vendo.*ofrezco",
            r"ofrezco.*vendo",
        ];
        let detection = detection_patterns
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect();

        Self {
            detection,
            vendo_casa: Regex::new(r"vendo\s+casa.*?(\d+)\s+dormitorio").unwrap(),
            ofrezco_casa: Regex::new(r"ofrezco\s+casa.*?(\d+)\s+dormitorio").unwrap(),
        }
    }

    /// Split a record into independent listings if it encodes several.
    ///
    /// Returns the record unchanged (as a single-element list) when no
    /// mixture pattern matches.
    pub fn maybe_split(&self, record: &PropertyRecord) -> Vec<PropertyRecord> {
        let lower = record.concatenated_text().to_lowercase();

        if !self.detection.iter().any(|re| re.is_match(&lower)) {
            return vec![record.clone()];
        }
        info!("record text matches a multi-property pattern, splitting");

        self.split_record(record, &lower)
    }

    fn split_record(&self, record: &PropertyRecord, lower: &str) -> Vec<PropertyRecord> {
        // Specific shape: "vendo casa ... N dormitorios" together with
        // "ofrezco casa ... M dormitorios" yields exactly two sale listings
        // with bedroom counts taken from the respective captures.
        let vendo = self.vendo_casa.captures(lower);
        let ofrezco = self.ofrezco_casa.captures(lower);
        if let (Some(vendo), Some(ofrezco)) = (&vendo, &ofrezco) {
            let mut first = record.clone();
            first.intent = Some(Intent::Ofrezco);
            first.operation = Some(OperationType::Venta);
            if let Some(m) = vendo.get(1) {
                first.bedrooms = m.as_str().to_string();
            }

            let mut second = record.clone();
            second.intent = Some(Intent::Ofrezco);
            second.operation = Some(OperationType::Venta);
            if let Some(m) = ofrezco.get(1) {
                second.bedrooms = m.as_str().to_string();
            }

            debug!(
                "specific split: bedrooms {} / {}",
                first.bedrooms, second.bedrooms
            );
            return vec![first, second];
        }

        // General shape: one record per seek/offer indicator occurrence,
        // in position order.
        let indicators = find_indicators(lower);
        match indicators.len() {
            0 => vec![record.clone()],
            1 => {
                let mut only = record.clone();
                only.intent = Some(indicators[0].polarity);
                vec![only]
            }
            _ => indicators
                .iter()
                .map(|indicator| {
                    let mut split = record.clone();
                    split.intent = Some(indicator.polarity);
                    split.operation =
                        Some(infer_operation(indicator.keyword, indicator.polarity));
                    split
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_text(text: &str) -> PropertyRecord {
        PropertyRecord {
            property_type: text.to_string(),
            region: "Metropolitana".to_string(),
            commune: "Macul".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_record_passes_through() {
        let splitter = Splitter::new();
        let record = record_with_text("Casa");
        let out = splitter.maybe_split(&record);
        assert_eq!(out, vec![record]);
    }

    #[test]
    fn test_specific_vendo_ofrezco_casa_shape() {
        let splitter = Splitter::new();
        let record =
            record_with_text("vendo casa de 3 dormitorios y ofrezco casa de 5 dormitorios");
        let out = splitter.maybe_split(&record);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].bedrooms, "3");
        assert_eq!(out[1].bedrooms, "5");
        for split in &out {
            assert_eq!(split.intent, Some(Intent::Ofrezco));
            assert_eq!(split.operation, Some(OperationType::Venta));
            // Shared fields are shallow-copied into both.
            assert_eq!(split.commune, "Macul");
        }
    }

    #[test]
    fn test_general_vendo_busco_mixture() {
        let splitter = Splitter::new();
        let record = record_with_text("vendo departamento en Macul y busco oficina");
        let out = splitter.maybe_split(&record);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].intent, Some(Intent::Ofrezco));
        assert_eq!(out[0].operation, Some(OperationType::Venta));
        assert_eq!(out[1].intent, Some(Intent::Busco));
        assert_eq!(out[1].operation, Some(OperationType::Compra));
    }

    #[test]
    fn test_por_un_lado_pattern_detected() {
        let splitter = Splitter::new();
        let record =
            record_with_text("por un lado arriendo un depto, por otro lado busco bodega");
        let out = splitter.maybe_split(&record);
        assert!(out.len() >= 2);
        assert!(out.iter().any(|r| r.intent == Some(Intent::Ofrezco)));
        assert!(out.iter().any(|r| r.intent == Some(Intent::Busco)));
    }

    #[test]
    fn test_arriendo_indicator_infers_arriendo() {
        let splitter = Splitter::new();
        let record = record_with_text("arriendo depto céntrico y además busco casa");
        let out = splitter.maybe_split(&record);
        let offer = out
            .iter()
            .find(|r| r.intent == Some(Intent::Ofrezco))
            .expect("offer split");
        assert_eq!(offer.operation, Some(OperationType::Arriendo));
    }

    #[test]
    fn test_uid_carried_into_splits() {
        let splitter = Splitter::new();
        let mut record = record_with_text("vendo casa y busco depto");
        record.uid = Some("pre-minted".to_string());
        let out = splitter.maybe_split(&record);
        assert!(out.iter().all(|r| r.uid.as_deref() == Some("pre-minted")));
    }
}
