//! `SheetStore` trait and the Google Sheets v4 REST implementation.
//!
//! The adapter is deliberately thin: appends are at-least-once (a transport
//! retry may duplicate a row, an accepted risk), reads are full scans, and
//! updates locate a row by a linear scan of the UID column. No internal
//! retries; transport errors propagate to the caller.

use crate::schema::{column_letter, Column, TOTAL_COLUMNS};
use async_trait::async_trait;
use corredor_core::error::CorredorError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// A data row paired with its 1-based sheet row number.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedRow {
    pub row_index: u32,
    pub cells: Vec<String>,
}

/// Row-store operations the rest of the system depends on.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Append rows at the end of the tab. Returns the number of rows the
    /// store reports as written.
    async fn append_rows(
        &self,
        sheet_id: &str,
        tab: &str,
        rows: &[Vec<String>],
    ) -> Result<usize, CorredorError>;

    /// All data rows with their sheet row numbers. The header row is
    /// excluded; data starts at sheet row 2.
    async fn rows_with_index(
        &self,
        sheet_id: &str,
        tab: &str,
    ) -> Result<Vec<IndexedRow>, CorredorError>;

    /// Update specific cells of the row whose UID column equals `uid`.
    /// Errors when no row matches.
    async fn update_cells_by_uid(
        &self,
        sheet_id: &str,
        tab: &str,
        uid: &str,
        updates: &[(Column, String)],
    ) -> Result<(), CorredorError>;

    /// Title of the spreadsheet's first tab.
    async fn first_tab_title(&self, sheet_id: &str) -> Result<String, CorredorError>;
}

/// Google Sheets REST client.
pub struct SheetsClient {
    client: reqwest::Client,
    api_token: String,
}

impl SheetsClient {
    /// Create from a bearer token (config value or GOOGLE_SHEETS_TOKEN).
    pub fn new(api_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_token,
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
    ) -> Result<T, CorredorError> {
        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| CorredorError::Sheets(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(CorredorError::Sheets(format!(
                "sheets API returned {status}: {text}"
            )));
        }

        resp.json()
            .await
            .map_err(|e| CorredorError::Sheets(format!("failed to parse response: {e}")))
    }

    /// Resolve the numeric grid ID of a tab by title.
    async fn grid_id(&self, sheet_id: &str, tab: &str) -> Result<i64, CorredorError> {
        let url = format!("{SHEETS_BASE_URL}/{sheet_id}?fields=sheets.properties");
        let meta: SpreadsheetMeta = self.get_json(&url).await?;
        meta.sheets
            .iter()
            .find(|s| s.properties.title == tab)
            .map(|s| s.properties.sheet_id)
            .ok_or_else(|| {
                CorredorError::Sheets(format!("tab '{tab}' not found in spreadsheet {sheet_id}"))
            })
    }
}

#[async_trait]
impl SheetStore for SheetsClient {
    async fn append_rows(
        &self,
        sheet_id: &str,
        tab: &str,
        rows: &[Vec<String>],
    ) -> Result<usize, CorredorError> {
        if rows.is_empty() {
            return Ok(0);
        }

        // RAW keeps the store from re-interpreting values as numbers/dates.
        let url = format!(
            "{SHEETS_BASE_URL}/{sheet_id}/values/{tab}!A1:append?valueInputOption=RAW&insertDataOption=INSERT_ROWS"
        );
        let body = ValuesBody {
            values: rows.to_vec(),
        };

        debug!("appending {} row(s) to {sheet_id}/{tab}", rows.len());
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| CorredorError::Sheets(format!("append request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(CorredorError::Sheets(format!(
                "append returned {status}: {text}"
            )));
        }

        let parsed: AppendResponse = resp
            .json()
            .await
            .map_err(|e| CorredorError::Sheets(format!("failed to parse append response: {e}")))?;

        let written = parsed
            .updates
            .and_then(|u| u.updated_rows)
            .unwrap_or(0) as usize;
        info!("appended {written} row(s) to {sheet_id}/{tab}");
        Ok(written)
    }

    async fn rows_with_index(
        &self,
        sheet_id: &str,
        tab: &str,
    ) -> Result<Vec<IndexedRow>, CorredorError> {
        let last = column_letter(TOTAL_COLUMNS - 1);
        let url = format!("{SHEETS_BASE_URL}/{sheet_id}/values/{tab}!A:{last}");
        let parsed: ValuesResponse = self.get_json(&url).await?;

        let values = parsed.values.unwrap_or_default();
        // First row is the header; data rows are 1-based sheet rows 2..
        let rows: Vec<IndexedRow> = values
            .into_iter()
            .skip(1)
            .enumerate()
            .map(|(i, cells)| IndexedRow {
                row_index: i as u32 + 2,
                cells,
            })
            .collect();

        debug!("read {} data row(s) from {sheet_id}/{tab}", rows.len());
        Ok(rows)
    }

    async fn update_cells_by_uid(
        &self,
        sheet_id: &str,
        tab: &str,
        uid: &str,
        updates: &[(Column, String)],
    ) -> Result<(), CorredorError> {
        if updates.is_empty() {
            return Ok(());
        }

        // Linear scan of the UID column to find the row number.
        let uid_letter = Column::Uid.letter();
        let url = format!("{SHEETS_BASE_URL}/{sheet_id}/values/{tab}!{uid_letter}:{uid_letter}");
        let parsed: ValuesResponse = self.get_json(&url).await?;
        let row_number = locate_uid(&parsed.values.unwrap_or_default(), uid).ok_or_else(|| {
            warn!("UID '{uid}' not found in {sheet_id}/{tab}");
            CorredorError::Sheets(format!("UID '{uid}' not found in tab '{tab}'"))
        })?;

        let grid_id = self.grid_id(sheet_id, tab).await?;

        let requests: Vec<BatchRequest> = updates
            .iter()
            .map(|(column, value)| BatchRequest {
                update_cells: UpdateCells {
                    rows: vec![CellRow {
                        values: vec![CellValue {
                            user_entered_value: EnteredValue {
                                string_value: value.clone(),
                            },
                        }],
                    }],
                    fields: "userEnteredValue".to_string(),
                    start: GridCoordinate {
                        sheet_id: grid_id,
                        row_index: row_number - 1,
                        column_index: column.index() as u32,
                    },
                },
            })
            .collect();

        let url = format!("{SHEETS_BASE_URL}/{sheet_id}:batchUpdate");
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&BatchUpdateBody { requests })
            .send()
            .await
            .map_err(|e| CorredorError::Sheets(format!("batch update request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(CorredorError::Sheets(format!(
                "batch update returned {status}: {text}"
            )));
        }

        info!(
            "updated {} cell(s) for UID {uid} in {sheet_id}/{tab}",
            updates.len()
        );
        Ok(())
    }

    async fn first_tab_title(&self, sheet_id: &str) -> Result<String, CorredorError> {
        let url = format!("{SHEETS_BASE_URL}/{sheet_id}?fields=sheets.properties");
        let meta: SpreadsheetMeta = self.get_json(&url).await?;
        meta.sheets
            .first()
            .map(|s| s.properties.title.clone())
            .ok_or_else(|| CorredorError::Sheets(format!("spreadsheet {sheet_id} has no tabs")))
    }
}

/// Find the 1-based sheet row whose UID cell equals `uid`.
///
/// `values` is the raw UID column including the header cell at index 0.
fn locate_uid(values: &[Vec<String>], uid: &str) -> Option<u32> {
    values.iter().enumerate().find_map(|(i, row)| {
        if row.first().map(String::as_str) == Some(uid) {
            Some(i as u32 + 1)
        } else {
            None
        }
    })
}

// --- Wire types ---

#[derive(Serialize)]
struct ValuesBody {
    values: Vec<Vec<String>>,
}

#[derive(Deserialize)]
struct ValuesResponse {
    values: Option<Vec<Vec<String>>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    updates: Option<AppendUpdates>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    updated_rows: Option<u32>,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Serialize)]
struct BatchUpdateBody {
    requests: Vec<BatchRequest>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchRequest {
    update_cells: UpdateCells,
}

#[derive(Serialize)]
struct UpdateCells {
    rows: Vec<CellRow>,
    fields: String,
    start: GridCoordinate,
}

#[derive(Serialize)]
struct CellRow {
    values: Vec<CellValue>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CellValue {
    user_entered_value: EnteredValue,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnteredValue {
    string_value: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GridCoordinate {
    sheet_id: i64,
    row_index: u32,
    column_index: u32,
}
