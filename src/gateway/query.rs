//! Generic question answering over the property log.
//!
//! Direct-chat messages that yield no extractable listing are treated as
//! questions; the logged rows become the model's only context.

use super::Gateway;
use corredor_sheets::{schema, Column};
use tracing::warn;

const NO_DATA_REPLY: &str =
    "Lo siento, no hay información de propiedades disponible en este momento.";
const ERROR_REPLY: &str =
    "Lo siento, ha ocurrido un error al procesar tu consulta. Por favor, intenta de nuevo más tarde.";

impl Gateway {
    /// Answer a free-text question from the logged properties.
    pub(super) async fn answer_query(&self, question: &str) -> String {
        let (sheet_id, tab) = match self.resolve_target_sheet().await {
            Ok(target) => target,
            Err(e) => {
                warn!("query: {e}");
                return NO_DATA_REPLY.to_string();
            }
        };

        let rows = match self.sheets.rows_with_index(&sheet_id, &tab).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("query: failed to read sheet: {e}");
                return NO_DATA_REPLY.to_string();
            }
        };

        if rows.is_empty() {
            return "Lo siento, no pude encontrar información de propiedades registradas."
                .to_string();
        }

        let context = rows_as_json(&rows.iter().map(|r| r.cells.clone()).collect::<Vec<_>>());

        let prompt = format!(
            "Eres un asistente especializado en propiedades inmobiliarias. Responde la pregunta \
             usando únicamente la información proporcionada. Si no encuentras información \
             específica, indícalo claramente. No inventes detalles que no estén en los datos.\n\n\
             Datos de propiedades disponibles:\n{context}\n\n\
             Pregunta del usuario: {question}"
        );

        match self.provider.complete(&prompt).await {
            Ok(answer) => answer.trim().to_string(),
            Err(e) => {
                warn!("query: provider error: {e}");
                ERROR_REPLY.to_string()
            }
        }
    }
}

/// Serialize rows as a JSON array of header→cell objects, dropping empty
/// cells to keep the context compact.
fn rows_as_json(rows: &[Vec<String>]) -> String {
    let objects: Vec<serde_json::Value> = rows
        .iter()
        .map(|cells| {
            let mut object = serde_json::Map::new();
            for column in Column::ALL {
                let value = schema::cell(cells, column);
                if !value.is_empty() && !column.header().is_empty() {
                    object.insert(
                        column.header().to_string(),
                        serde_json::Value::String(value.to_string()),
                    );
                }
            }
            serde_json::Value::Object(object)
        })
        .collect();

    serde_json::to_string(&objects).unwrap_or_else(|_| "[]".to_string())
}
