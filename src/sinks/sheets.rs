use crate::models::OutputRow;
use crate::sinks::traits::RowSink;
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// The fields of a Google service account key file that the token exchange needs
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read service account file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Malformed service account file {}", path.display()))
    }
}

/// How the sink obtains its bearer token
pub enum SheetsAuth {
    ServiceAccount(ServiceAccountKey),
    AccessToken(String),
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
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
struct SheetProperties {
    title: String,
}

/// Read the target spreadsheet id from a file holding just the id
pub fn read_spreadsheet_id(path: &Path) -> Result<String> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read spreadsheet id file {}", path.display()))?;
    let id = raw.trim();
    if id.is_empty() {
        bail!("Spreadsheet id file {} is empty", path.display());
    }
    Ok(id.to_string())
}

/// A1 range naming a whole sheet. Quoting keeps titles such as `Q1` or
/// `My Sheet` from being read as cell references.
fn sheet_range(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Appends rows to a Google Sheets tab through the values API
pub struct GoogleSheetsSink {
    client: Client,
    api_base: Url,
    spreadsheet_id: String,
    range: String,
    access_token: String,
}

impl GoogleSheetsSink {
    /// Authenticate and resolve the target tab. Without a `range` the first
    /// sheet of the spreadsheet is used.
    pub async fn connect(
        auth: SheetsAuth,
        spreadsheet_id: impl Into<String>,
        range: Option<String>,
    ) -> Result<Self> {
        Self::connect_with_base(SHEETS_API_BASE, auth, spreadsheet_id, range).await
    }

    pub async fn connect_with_base(
        api_base: &str,
        auth: SheetsAuth,
        spreadsheet_id: impl Into<String>,
        range: Option<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;
        let api_base = Url::parse(api_base)
            .with_context(|| format!("Invalid Sheets API base URL {}", api_base))?;

        let access_token = match auth {
            SheetsAuth::AccessToken(token) => token,
            SheetsAuth::ServiceAccount(key) => exchange_token(&client, &key).await?,
        };

        let mut sink = Self {
            client,
            api_base,
            spreadsheet_id: spreadsheet_id.into(),
            range: String::new(),
            access_token,
        };

        sink.range = match range {
            Some(range) => range,
            None => sink.first_sheet_title().await?,
        };
        info!("Writing to sheet '{}' of {}", sink.range, sink.spreadsheet_id);

        Ok(sink)
    }

    pub fn range(&self) -> &str {
        &self.range
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Sheets API base URL cannot hold a path"))?
            .pop_if_empty()
            .push(&self.spreadsheet_id)
            .extend(segments);
        Ok(url)
    }

    async fn first_sheet_title(&self) -> Result<String> {
        let mut url = self.endpoint(&[])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties.title");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .context("Failed to fetch spreadsheet metadata")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Spreadsheet lookup failed: {} {}", status, body);
        }

        let meta: SpreadsheetMeta = response
            .json()
            .await
            .context("Malformed spreadsheet metadata")?;

        meta.sheets
            .into_iter()
            .next()
            .map(|sheet| sheet.properties.title)
            .ok_or_else(|| anyhow!("Spreadsheet {} has no sheets", self.spreadsheet_id))
    }
}

async fn exchange_token(client: &Client, key: &ServiceAccountKey) -> Result<String> {
    let iat = Utc::now().timestamp();
    let claims = Claims {
        iss: &key.client_email,
        scope: SHEETS_SCOPE,
        aud: &key.token_uri,
        iat,
        exp: iat + 3600,
    };

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .context("Service account private key is not a valid RSA PEM")?;
    let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
        .context("Failed to sign service account assertion")?;

    debug!("Requesting access token for {}", key.client_email);
    let response = client
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .await
        .context("Failed to reach token endpoint")?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        bail!("Token exchange failed: {} {}", status, body);
    }

    let token: TokenResponse = response.json().await.context("Malformed token response")?;
    Ok(token.access_token)
}

#[async_trait]
impl RowSink for GoogleSheetsSink {
    async fn append_row(&self, row: &OutputRow) -> Result<()> {
        let target = format!("{}:append", sheet_range(&self.range));
        let mut url = self.endpoint(&["values", target.as_str()])?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&json!({ "values": [row.to_values()] }))
            .send()
            .await
            .context("Failed to send append request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Sheets append failed: {} {}", status, body);
        }

        debug!("Sheets accepted row {}", row);
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "google_sheets"
    }
}
