//! `/buscar` query parsing and sheet search.
//!
//! Keyword tables turn a free-form query into (action, property type,
//! location) criteria; rows of the property log are matched cell-by-cell.
//! At least two criteria are required before a search runs; with less, the
//! reply names what is missing.

use corredor_sheets::{schema::cell, Column, IndexedRow};

const RENT_KEYWORDS: &[&str] = &[
    "arriendo", "arrendar", "alquilar", "alquiler", "renta", "rentar",
];
const SALE_KEYWORDS: &[&str] = &["venta", "vender", "comprar", "compra", "adquirir"];

/// Normalized property type → synonyms.
const PROPERTY_TYPES: &[(&str, &[&str])] = &[
    (
        "Departamento",
        &["departamento", "depto", "depa", "apto", "apartamento"],
    ),
    ("Casa", &["casa", "chalet", "vivienda", "residencia"]),
    ("Oficina", &["oficina", "despacho"]),
    ("Local Comercial", &["local comercial", "local", "tienda"]),
    ("Terreno", &["terreno", "sitio", "parcela", "lote"]),
    ("Bodega", &["bodega", "galpón", "almacén"]),
    (
        "Estacionamiento",
        &["estacionamiento", "cochera", "garage", "parqueadero"],
    ),
];

/// Known locations (communes and common shorthand).
const LOCATIONS: &[&str] = &[
    "las condes",
    "providencia",
    "ñuñoa",
    "santiago centro",
    "santiago",
    "vitacura",
    "lo barnechea",
    "san miguel",
    "macul",
    "la florida",
    "maipu",
    "puente alto",
    "quilicura",
    "recoleta",
    "independencia",
    "la reina",
    "peñalolen",
    "la cisterna",
    "estacion central",
    "huechuraba",
    "pudahuel",
];

/// Parsed search criteria.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub action: Option<&'static str>,
    pub property_type: Option<&'static str>,
    pub location: Option<String>,
}

impl SearchQuery {
    /// At least two of the three criteria present.
    pub fn is_searchable(&self) -> bool {
        [
            self.action.is_some(),
            self.property_type.is_some(),
            self.location.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
            >= 2
    }
}

/// Parse `/buscar <texto>` into criteria. Returns `None` when the query
/// after the command is empty.
pub fn parse_search_query(text: &str) -> Option<SearchQuery> {
    let rest = text
        .trim()
        .strip_prefix("/buscar")
        .unwrap_or(text)
        .trim()
        .to_lowercase();
    if rest.is_empty() {
        return None;
    }

    let mut query = SearchQuery::default();

    if RENT_KEYWORDS.iter().any(|kw| rest.contains(kw)) {
        query.action = Some("Arriendo");
    } else if SALE_KEYWORDS.iter().any(|kw| rest.contains(kw)) {
        query.action = Some("Venta");
    }

    for &(normalized, synonyms) in PROPERTY_TYPES {
        if synonyms.iter().any(|kw| rest.contains(kw)) {
            query.property_type = Some(normalized);
            break;
        }
    }

    for location in LOCATIONS {
        if rest.contains(location) {
            query.location = Some(capitalize_words(location));
            break;
        }
    }

    Some(query)
}

/// Reply asking for whatever criteria the query is missing.
pub fn missing_criteria_reply(query: &SearchQuery) -> String {
    let mut missing = Vec::new();
    if query.property_type.is_none() {
        missing.push("el tipo de propiedad (casa, departamento, oficina...)");
    }
    if query.action.is_none() {
        missing.push("si es para arriendo o venta");
    }
    if query.location.is_none() {
        missing.push("la comuna o ubicación");
    }
    format!(
        "Para buscar necesito un poco más de detalle. Me falta: {}.",
        missing.join(", ")
    )
}

/// Filter rows against the criteria. Only open listings match.
pub fn search_rows<'a>(rows: &'a [IndexedRow], query: &SearchQuery) -> Vec<&'a IndexedRow> {
    rows.iter()
        .filter(|row| row_matches(&row.cells, query))
        .collect()
}

fn row_matches(cells: &[String], query: &SearchQuery) -> bool {
    let status = cell(cells, Column::Status);
    if !(status == "Nuevo" || status.starts_with("Activo")) {
        return false;
    }

    if let Some(action) = query.action {
        if !cell(cells, Column::TipoOperacion).eq_ignore_ascii_case(action) {
            return false;
        }
    }

    if let Some(property_type) = query.property_type {
        if !cell(cells, Column::Propiedad).eq_ignore_ascii_case(property_type) {
            return false;
        }
    }

    if let Some(ref location) = query.location {
        let wanted = location.to_lowercase();
        let found = [
            Column::OpcionComuna,
            Column::OpcionComuna2,
            Column::OpcionComuna3,
            Column::OpcionComuna4,
            Column::Ciudad,
        ]
        .iter()
        .any(|col| cell(cells, *col).to_lowercase() == wanted);
        if !found {
            return false;
        }
    }

    true
}

/// Format up to five matches as a reply.
pub fn format_results(matches: &[&IndexedRow], query: &SearchQuery) -> String {
    if matches.is_empty() {
        return format!(
            "Lo siento, no encontré propiedades para: {} {} en {}. ¿Quieres intentar con otros criterios?",
            query.property_type.unwrap_or("cualquier tipo"),
            query.action.unwrap_or(""),
            query.location.as_deref().unwrap_or("cualquier lugar"),
        );
    }

    let mut reply = format!(
        "Encontré {} propiedad(es) para tu búsqueda ({} para {} en {}):\n\n",
        matches.len(),
        query.property_type.unwrap_or("cualquier tipo"),
        query.action.unwrap_or("cualquier operación"),
        query.location.as_deref().unwrap_or("cualquier ubicación"),
    );

    for (i, row) in matches.iter().take(5).enumerate() {
        let cells = &row.cells;
        reply.push_str(&format!(
            "{}. {} ({})\n",
            i + 1,
            non_empty_or(cell(cells, Column::Propiedad), "Propiedad"),
            non_empty_or(cell(cells, Column::TipoOperacion), "N/E"),
        ));
        reply.push_str(&format!(
            "   Ubic.: {}\n",
            non_empty_or(cell(cells, Column::OpcionComuna), "N/E")
        ));
        let value = cell(cells, Column::Valor);
        if !value.is_empty() {
            reply.push_str(&format!(
                "   Precio: {} {}\n",
                value,
                cell(cells, Column::Moneda)
            ));
        }
        let bedrooms = cell(cells, Column::Dormitorios);
        if !bedrooms.is_empty() {
            reply.push_str(&format!("   Dorms: {bedrooms}\n"));
        }
        reply.push_str(&format!("   (Ref UID: {})\n\n", cell(cells, Column::Uid)));
    }

    if matches.len() > 5 {
        reply.push_str(&format!("... y {} más.\n", matches.len() - 5));
    }
    reply.push_str("Si alguna te interesa, pide más detalles mencionando el UID.");
    reply
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
