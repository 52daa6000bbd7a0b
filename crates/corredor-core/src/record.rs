//! The canonical structured listing extracted from a free-text message.
//!
//! Field names mirror the JSON keys the extraction prompt asks the model
//! for, so a parsed response deserializes straight into [`PropertyRecord`].
//! Missing cells are empty strings, matching the sheet contract; the sheet
//! never stores nulls.

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Seeking vs. offering a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    Busco,
    Ofrezco,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busco => write!(f, "Busco"),
            Self::Ofrezco => write!(f, "Ofrezco"),
        }
    }
}

impl FromStr for Intent {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "busco" => Ok(Self::Busco),
            "ofrezco" => Ok(Self::Ofrezco),
            _ => Err(()),
        }
    }
}

/// Nature of the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationType {
    Arriendo,
    Venta,
    Compra,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arriendo => write!(f, "Arriendo"),
            Self::Venta => write!(f, "Venta"),
            Self::Compra => write!(f, "Compra"),
        }
    }
}

impl FromStr for OperationType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "arriendo" => Ok(Self::Arriendo),
            "venta" => Ok(Self::Venta),
            "compra" => Ok(Self::Compra),
            _ => Err(()),
        }
    }
}

/// A structured property listing.
///
/// All free-form fields are strings with `""` meaning absent. `intent` is
/// never trusted from the model; the extraction engine recomputes it from
/// the raw message text after parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    #[serde(rename = "Busco / Ofrezco", default, deserialize_with = "de_intent")]
    pub intent: Option<Intent>,
    #[serde(rename = "Tipo de Operacion", default, deserialize_with = "de_operation")]
    pub operation: Option<OperationType>,
    #[serde(rename = "Propiedad", default, deserialize_with = "de_stringly")]
    pub property_type: String,
    #[serde(rename = "Region", default, deserialize_with = "de_stringly")]
    pub region: String,
    #[serde(rename = "Ciudad", default, deserialize_with = "de_stringly")]
    pub city: String,
    #[serde(rename = "Opcion Comuna", default, deserialize_with = "de_stringly")]
    pub commune: String,
    #[serde(rename = "Opcion Comuna 2", default, deserialize_with = "de_stringly")]
    pub commune2: String,
    #[serde(rename = "Opcion Comuna 3", default, deserialize_with = "de_stringly")]
    pub commune3: String,
    #[serde(rename = "Opcion Comuna 4", default, deserialize_with = "de_stringly")]
    pub commune4: String,
    #[serde(rename = "Dormitorios", default, deserialize_with = "de_stringly")]
    pub bedrooms: String,
    #[serde(rename = "Baños", default, deserialize_with = "de_stringly")]
    pub bathrooms: String,
    #[serde(rename = "Estacionamiento", default, deserialize_with = "de_stringly")]
    pub parking: String,
    #[serde(rename = "Bodegas", default, deserialize_with = "de_stringly")]
    pub storage: String,
    #[serde(rename = "Valor", default, deserialize_with = "de_stringly")]
    pub value: String,
    #[serde(rename = "Moneda", default, deserialize_with = "de_stringly")]
    pub currency: String,
    #[serde(rename = "Gastos Comunes", default, deserialize_with = "de_stringly")]
    pub common_expenses: String,
    #[serde(rename = "Metros Cuadrados", default, deserialize_with = "de_stringly")]
    pub area_m2: String,
    #[serde(rename = "Telefono", default, deserialize_with = "de_stringly")]
    pub phone: String,
    #[serde(rename = "Correo Electronico", default, deserialize_with = "de_stringly")]
    pub email: String,
    /// Present only when a prior split already minted an identity.
    #[serde(skip)]
    pub uid: Option<String>,
}

impl PropertyRecord {
    /// All textual content of the record joined for pattern scanning.
    ///
    /// The splitter runs its detection patterns over this; the enums are
    /// included in display form so "Venta"/"Compra" remain matchable.
    pub fn concatenated_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        let intent_s = self.intent.map(|i| i.to_string());
        let op_s = self.operation.map(|o| o.to_string());
        if let Some(ref s) = intent_s {
            parts.push(s);
        }
        if let Some(ref s) = op_s {
            parts.push(s);
        }
        for field in [
            &self.property_type,
            &self.region,
            &self.city,
            &self.commune,
            &self.commune2,
            &self.commune3,
            &self.commune4,
            &self.bedrooms,
            &self.bathrooms,
            &self.parking,
            &self.storage,
            &self.value,
            &self.currency,
            &self.common_expenses,
            &self.area_m2,
            &self.phone,
            &self.email,
        ] {
            if !field.is_empty() {
                parts.push(field);
            }
        }
        parts.join(" ")
    }
}

/// Accept string, number, bool, or null where a string is expected.
///
/// Models regularly emit `"Valor": 600000` where the prompt asked for a
/// string; a hard type error would throw away an otherwise good record.
fn de_stringly<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(stringly(&value))
}

fn stringly(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Lenient enum parse: unknown or non-string values become `None`.
fn de_intent<'de, D>(deserializer: D) -> Result<Option<Intent>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(stringly(&value).parse().ok())
}

fn de_operation<'de, D>(deserializer: D) -> Result<Option<OperationType>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(stringly(&value).parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_from_prompt_json() {
        let json = r#"{
            "Tipo de Operacion": "Arriendo",
            "Propiedad": "Departamento",
            "Region": "Metropolitana de Santiago",
            "Ciudad": "Santiago",
            "Opcion Comuna": "Providencia",
            "Dormitorios": "2",
            "Baños": "1",
            "Valor": "600000",
            "Moneda": "CLP"
        }"#;
        let record: PropertyRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.operation, Some(OperationType::Arriendo));
        assert_eq!(record.property_type, "Departamento");
        assert_eq!(record.commune, "Providencia");
        assert_eq!(record.value, "600000");
        assert_eq!(record.commune2, "");
        assert!(record.intent.is_none());
    }

    #[test]
    fn test_deserialize_numeric_value() {
        let json = r#"{"Valor": 600000, "Dormitorios": 2}"#;
        let record: PropertyRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.value, "600000");
        assert_eq!(record.bedrooms, "2");
    }

    #[test]
    fn test_deserialize_unknown_operation_is_none() {
        let json = r#"{"Tipo de Operacion": "Permuta"}"#;
        let record: PropertyRecord = serde_json::from_str(json).unwrap();
        assert!(record.operation.is_none());
    }

    #[test]
    fn test_deserialize_null_field_is_empty() {
        let json = r#"{"Region": null, "Ciudad": "  Valparaíso  "}"#;
        let record: PropertyRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.region, "");
        assert_eq!(record.city, "Valparaíso");
    }

    #[test]
    fn test_intent_round_trip() {
        assert_eq!("busco".parse::<Intent>(), Ok(Intent::Busco));
        assert_eq!("Ofrezco".parse::<Intent>(), Ok(Intent::Ofrezco));
        assert_eq!(Intent::Busco.to_string(), "Busco");
        assert!("vendo".parse::<Intent>().is_err());
    }

    #[test]
    fn test_concatenated_text_includes_enums_and_fields() {
        let record = PropertyRecord {
            intent: Some(Intent::Ofrezco),
            operation: Some(OperationType::Venta),
            property_type: "Casa".into(),
            commune: "Ñuñoa".into(),
            ..Default::default()
        };
        let text = record.concatenated_text();
        assert!(text.contains("Ofrezco"));
        assert!(text.contains("Venta"));
        assert!(text.contains("Casa"));
        assert!(text.contains("Ñuñoa"));
    }
}
