//! Record → sheet row mapping and sanitization.

use crate::schema::{Column, TOTAL_COLUMNS};
use chrono::{DateTime, Local};
use corredor_core::record::PropertyRecord;
use tracing::warn;
use uuid::Uuid;

/// Map a property record to a full sheet row.
///
/// Pure and total: every input produces exactly [`TOTAL_COLUMNS`] string
/// cells. A UID is minted unless the record already carries one from a
/// prior split; publication date/time come from `now`; status starts at
/// "Nuevo". The sender's WhatsApp name and phone land in their attribution
/// columns.
pub fn to_row(
    record: &PropertyRecord,
    sender_name: &str,
    sender_phone: &str,
    now: DateTime<Local>,
) -> Vec<String> {
    let uid = record
        .uid
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut row = vec![String::new(); TOTAL_COLUMNS];
    let mut set = |column: Column, value: String| {
        row[column.index()] = value;
    };

    set(
        Column::BuscoOfrezco,
        record.intent.map(|i| i.to_string()).unwrap_or_default(),
    );
    set(
        Column::TipoOperacion,
        record.operation.map(|o| o.to_string()).unwrap_or_default(),
    );
    set(Column::Propiedad, record.property_type.clone());
    set(Column::Region, record.region.clone());
    set(Column::Ciudad, record.city.clone());
    set(Column::OpcionComuna, record.commune.clone());
    set(Column::OpcionComuna2, record.commune2.clone());
    set(Column::OpcionComuna3, record.commune3.clone());
    set(Column::OpcionComuna4, record.commune4.clone());
    set(Column::Dormitorios, record.bedrooms.clone());
    set(Column::Banos, record.bathrooms.clone());
    set(Column::Estacionamiento, record.parking.clone());
    set(Column::Bodegas, record.storage.clone());
    set(Column::Valor, record.value.clone());
    set(Column::Moneda, record.currency.clone());
    set(Column::GastosComunes, record.common_expenses.clone());
    set(Column::MetrosCuadrados, record.area_m2.clone());
    set(Column::Telefono, record.phone.clone());
    set(Column::CorreoElectronico, record.email.clone());
    set(Column::TelefonoCorredor, sender_phone.to_string());
    set(Column::NombreWhatsapp, sender_name.to_string());
    set(Column::FechaPublicacion, now.format("%Y-%m-%d").to_string());
    set(Column::HoraPublicacion, now.format("%H:%M:%S").to_string());
    set(Column::Uid, uid);
    set(Column::Status, "Nuevo".to_string());

    sanitize_row(row)
}

/// Force a row to exactly [`TOTAL_COLUMNS`] cells.
///
/// With a correct mapping this never fires; it guards against schema drift
/// between the mapper and the column table.
pub fn sanitize_row(mut row: Vec<String>) -> Vec<String> {
    if row.len() != TOTAL_COLUMNS {
        warn!(
            "adjusting row length from {} to {TOTAL_COLUMNS}",
            row.len()
        );
        row.resize(TOTAL_COLUMNS, String::new());
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::cell;
    use corredor_core::record::{Intent, OperationType};

    fn fixed_now() -> DateTime<Local> {
        use chrono::TimeZone;
        Local.with_ymd_and_hms(2025, 7, 14, 18, 30, 5).unwrap()
    }

    fn sample_record() -> PropertyRecord {
        PropertyRecord {
            intent: Some(Intent::Ofrezco),
            operation: Some(OperationType::Venta),
            property_type: "Departamento".into(),
            region: "Metropolitana de Santiago".into(),
            city: "Santiago".into(),
            commune: "Providencia".into(),
            bedrooms: "2".into(),
            bathrooms: "1".into(),
            value: "600000".into(),
            currency: "CLP".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_row_has_exactly_27_cells() {
        let row = to_row(&sample_record(), "Ana", "56911223344", fixed_now());
        assert_eq!(row.len(), TOTAL_COLUMNS);
    }

    #[test]
    fn test_empty_record_still_yields_27_cells() {
        let row = to_row(&PropertyRecord::default(), "", "", fixed_now());
        assert_eq!(row.len(), TOTAL_COLUMNS);
        assert_eq!(cell(&row, Column::BuscoOfrezco), "");
        assert_eq!(cell(&row, Column::Status), "Nuevo");
        assert!(!cell(&row, Column::Uid).is_empty());
    }

    #[test]
    fn test_field_positions() {
        let row = to_row(&sample_record(), "Ana", "56911223344", fixed_now());
        assert_eq!(cell(&row, Column::BuscoOfrezco), "Ofrezco");
        assert_eq!(cell(&row, Column::TipoOperacion), "Venta");
        assert_eq!(cell(&row, Column::OpcionComuna), "Providencia");
        assert_eq!(cell(&row, Column::Valor), "600000");
        assert_eq!(cell(&row, Column::TelefonoCorredor), "56911223344");
        assert_eq!(cell(&row, Column::NombreWhatsapp), "Ana");
        assert_eq!(cell(&row, Column::FechaPublicacion), "2025-07-14");
        assert_eq!(cell(&row, Column::HoraPublicacion), "18:30:05");
        assert_eq!(cell(&row, Column::Status), "Nuevo");
        assert_eq!(cell(&row, Column::Reservada), "");
        assert_eq!(cell(&row, Column::UltimoSeguimiento), "");
    }

    #[test]
    fn test_existing_uid_preserved() {
        let mut record = sample_record();
        record.uid = Some("11111111-2222-3333-4444-555555555555".into());
        let row = to_row(&record, "Ana", "56911223344", fixed_now());
        assert_eq!(
            cell(&row, Column::Uid),
            "11111111-2222-3333-4444-555555555555"
        );
    }

    #[test]
    fn test_minted_uids_are_unique() {
        let record = sample_record();
        let a = to_row(&record, "Ana", "1", fixed_now());
        let b = to_row(&record, "Ana", "1", fixed_now());
        assert_ne!(cell(&a, Column::Uid), cell(&b, Column::Uid));
    }

    #[test]
    fn test_row_round_trip_preserves_key_fields() {
        let mut record = sample_record();
        record.uid = Some("round-trip-uid".into());
        let row = to_row(&record, "Ana", "56911223344", fixed_now());
        assert_eq!(cell(&row, Column::Uid), "round-trip-uid");
        assert_eq!(
            cell(&row, Column::TipoOperacion),
            record.operation.unwrap().to_string()
        );
        assert_eq!(cell(&row, Column::Valor), record.value);
    }

    #[test]
    fn test_sanitize_pads_and_truncates() {
        let short = sanitize_row(vec!["a".to_string()]);
        assert_eq!(short.len(), TOTAL_COLUMNS);
        assert_eq!(short[1], "");

        let long = sanitize_row(vec![String::from("x"); TOTAL_COLUMNS + 5]);
        assert_eq!(long.len(), TOTAL_COLUMNS);
    }
}
