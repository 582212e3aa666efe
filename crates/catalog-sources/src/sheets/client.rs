use crate::error::SheetsError;
use crate::retry::RetryPolicy;
use crate::sheets::auth::{ServiceAccountKey, TokenProvider};
use crate::traits::{SheetRow, SpreadsheetService, TabInfo};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::{json, Value};
use tracing::debug;

const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

/// Google Sheets v4 client authenticated as a service account.
///
/// Every request goes through the retry policy; tokens are refreshed per
/// attempt so a long backoff never reuses an expired token.
pub struct GoogleSheetsClient {
    client: Client,
    tokens: TokenProvider,
    retry: RetryPolicy,
}

impl GoogleSheetsClient {
    pub fn new(key: ServiceAccountKey, retry: RetryPolicy) -> Result<Self, SheetsError> {
        let client = Client::builder().build()?;
        let tokens = TokenProvider::new(client.clone(), key);
        Ok(Self { client, tokens, retry })
    }

    pub fn service_account(&self) -> &str {
        self.tokens.service_account()
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, SheetsError> {
        let token = self.tokens.access_token().await?;
        let response = request.bearer_auth(token).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(SheetsError::Http { status: status.as_u16(), body })
        }
    }

    async fn send_json(&self, request: RequestBuilder) -> Result<Value, SheetsError> {
        let response = self.send(request).await?;
        response
            .json()
            .await
            .map_err(|e| SheetsError::InvalidResponse(e.to_string()))
    }
}

/// A1 range covering a whole tab; quotes are doubled inside the title
pub(crate) fn tab_range(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

pub(crate) fn values_url(spreadsheet_id: &str, range: &str) -> String {
    format!(
        "{}/{}/values/{}",
        SHEETS_BASE_URL,
        spreadsheet_id,
        urlencoding::encode(range)
    )
}

/// Drive search expression for a spreadsheet by exact title
pub(crate) fn drive_title_query(title: &str) -> String {
    let escaped = title.replace('\\', "\\\\").replace('\'', "\\'");
    format!(
        "name = '{}' and mimeType = '{}' and trashed = false",
        escaped, SPREADSHEET_MIME
    )
}

pub(crate) fn parse_tab(properties: &Value) -> Option<TabInfo> {
    let grid = properties.get("gridProperties");
    let dimension = |key: &str| {
        grid.and_then(|g| g.get(key))
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as u32
    };
    Some(TabInfo {
        sheet_id: properties.get("sheetId").and_then(|v| v.as_i64()).unwrap_or(0),
        title: properties.get("title")?.as_str()?.to_string(),
        row_count: dimension("rowCount"),
        column_count: dimension("columnCount"),
    })
}

pub(crate) fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SpreadsheetService for GoogleSheetsClient {
    async fn open_by_title(&self, title: &str) -> Result<String, SheetsError> {
        let query = drive_title_query(title);
        let json = self
            .retry
            .run("find spreadsheet", || {
                self.send_json(self.client.get(DRIVE_FILES_URL).query(&[
                    ("q", query.as_str()),
                    ("fields", "files(id,name)"),
                    ("supportsAllDrives", "true"),
                    ("includeItemsFromAllDrives", "true"),
                ]))
            })
            .await?;

        json.get("files")
            .and_then(|f| f.as_array())
            .and_then(|files| files.first())
            .and_then(|file| file.get("id"))
            .and_then(|id| id.as_str())
            .map(|id| id.to_string())
            .ok_or_else(|| SheetsError::SpreadsheetNotFound(title.to_string()))
    }

    async fn tabs(&self, spreadsheet_id: &str) -> Result<Vec<TabInfo>, SheetsError> {
        let url = format!("{}/{}", SHEETS_BASE_URL, spreadsheet_id);
        let json = self
            .retry
            .run("list tabs", || {
                self.send_json(self.client.get(&url).query(&[("fields", "sheets.properties")]))
            })
            .await?;

        Ok(json
            .get("sheets")
            .and_then(|s| s.as_array())
            .map(|sheets| sheets.iter().filter_map(|s| parse_tab(s.get("properties")?)).collect())
            .unwrap_or_default())
    }

    async fn add_tab(&self, spreadsheet_id: &str, title: &str, rows: u32, cols: u32) -> Result<(), SheetsError> {
        let url = format!("{}/{}:batchUpdate", SHEETS_BASE_URL, spreadsheet_id);
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": title,
                        "gridProperties": {"rowCount": rows, "columnCount": cols}
                    }
                }
            }]
        });
        debug!("Adding tab '{}' to spreadsheet {}", title, spreadsheet_id);
        self.retry
            .run("add tab", || self.send(self.client.post(&url).json(&body)))
            .await?;
        Ok(())
    }

    async fn resize_tab(&self, spreadsheet_id: &str, sheet_id: i64, rows: u32, cols: u32) -> Result<(), SheetsError> {
        let url = format!("{}/{}:batchUpdate", SHEETS_BASE_URL, spreadsheet_id);
        let body = json!({
            "requests": [{
                "updateSheetProperties": {
                    "properties": {
                        "sheetId": sheet_id,
                        "gridProperties": {"rowCount": rows, "columnCount": cols}
                    },
                    "fields": "gridProperties(rowCount,columnCount)"
                }
            }]
        });
        self.retry
            .run("resize tab", || self.send(self.client.post(&url).json(&body)))
            .await?;
        Ok(())
    }

    async fn clear_tab(&self, spreadsheet_id: &str, title: &str) -> Result<(), SheetsError> {
        let url = format!("{}:clear", values_url(spreadsheet_id, &tab_range(title)));
        self.retry
            .run("clear tab", || self.send(self.client.post(&url).json(&json!({}))))
            .await?;
        Ok(())
    }

    async fn write_rows(&self, spreadsheet_id: &str, title: &str, rows: &[SheetRow]) -> Result<(), SheetsError> {
        let range = format!("{}!A1", tab_range(title));
        let url = values_url(spreadsheet_id, &range);
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": rows,
        });
        debug!("Writing {} rows to tab '{}'", rows.len(), title);
        self.retry
            .run("write tab", || {
                self.send(
                    self.client
                        .put(&url)
                        .query(&[("valueInputOption", "RAW")])
                        .json(&body),
                )
            })
            .await?;
        Ok(())
    }

    async fn read_rows(&self, spreadsheet_id: &str, title: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = values_url(spreadsheet_id, &tab_range(title));
        let json = self
            .retry
            .run("read tab", || self.send_json(self.client.get(&url)))
            .await?;

        Ok(json
            .get("values")
            .and_then(|v| v.as_array())
            .map(|rows| {
                rows.iter()
                    .map(|row| {
                        row.as_array()
                            .map(|cells| cells.iter().map(cell_to_string).collect())
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}
