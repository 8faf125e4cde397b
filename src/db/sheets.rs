// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google Sheets `values` API client.
//!
//! Handles:
//! - Service-account token exchange (signed JWT bearer assertion)
//! - Access token caching until shortly before expiry
//! - Appending a record as a new row, seeding the header on an empty worksheet
//! - Reading every row of the worksheet

use crate::db::{RowSnapshot, SheetGateway};
use crate::error::StorageError;
use crate::models::record::HEADER;
use crate::models::{Credential, Record};
use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::{Mutex, OnceCell, RwLock};

pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: u64 = 3600;
/// Refresh the access token this long before it actually expires.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Claims of the service-account assertion sent to the token endpoint.
#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Row store backed by one worksheet of a Google spreadsheet.
pub struct GoogleSheetsGateway {
    http: reqwest::Client,
    base_url: String,
    sheet_id: String,
    worksheet: String,
    credential: Credential,
    signing_key: EncodingKey,
    token_cache: RwLock<Option<CachedToken>>,
    refresh_lock: Mutex<()>,
    header_ready: OnceCell<()>,
}

impl GoogleSheetsGateway {
    /// Create a gateway for `worksheet` in spreadsheet `sheet_id`.
    ///
    /// Fails if the credential's private key is not a valid RSA PEM.
    pub fn new(
        credential: Credential,
        sheet_id: &str,
        worksheet: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, StorageError> {
        let signing_key = EncodingKey::from_rsa_pem(credential.private_key.as_bytes())
            .map_err(|e| StorageError::Auth(format!("Invalid service account key: {}", e)))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StorageError::Unavailable(format!("HTTP client error: {}", e)))?;

        tracing::info!(
            sheet_id = sheet_id,
            worksheet = worksheet,
            client_email = %credential.client_email,
            "Google Sheets gateway initialized"
        );

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            sheet_id: sheet_id.to_string(),
            worksheet: worksheet.to_string(),
            credential,
            signing_key,
            token_cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            header_ready: OnceCell::new(),
        })
    }

    fn values_url(&self, suffix: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}{}",
            self.base_url,
            urlencoding::encode(&self.sheet_id),
            urlencoding::encode(&self.worksheet),
            suffix
        )
    }

    /// Get a valid access token, exchanging a fresh assertion if needed.
    async fn access_token(&self) -> Result<String, StorageError> {
        if let Some(token) = self.cached_token().await {
            return Ok(token);
        }

        // Only one task exchanges at a time; the rest reuse its result.
        let _guard = self.refresh_lock.lock().await;
        if let Some(token) = self.cached_token().await {
            return Ok(token);
        }

        let fresh = self.exchange_assertion().await?;
        let token = fresh.access_token.clone();
        *self.token_cache.write().await = Some(fresh);
        Ok(token)
    }

    async fn cached_token(&self) -> Option<String> {
        self.token_cache
            .read()
            .await
            .as_ref()
            .filter(|cached| cached.expires_at > Instant::now())
            .map(|cached| cached.access_token.clone())
    }

    async fn exchange_assertion(&self) -> Result<CachedToken, StorageError> {
        let iat = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| StorageError::Auth(format!("System clock error: {}", e)))?
            .as_secs();

        let claims = AssertionClaims {
            iss: &self.credential.client_email,
            scope: self.credential.scopes.join(" "),
            aud: &self.credential.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.credential.private_key_id.clone());

        let assertion = encode(&header, &claims, &self.signing_key)
            .map_err(|e| StorageError::Auth(format!("Failed to sign assertion: {}", e)))?;

        let response = self
            .http
            .post(&self.credential.token_uri)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                "Service account token exchange rejected"
            );
            return Err(StorageError::Auth(format!("HTTP {}: {}", status, body)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| StorageError::InvalidResponse(format!("Token JSON parse error: {}", e)))?;

        tracing::debug!(expires_in = token.expires_in, "Obtained Sheets access token");

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + lifetime,
        })
    }

    /// Write the header row if the worksheet has no rows yet.
    ///
    /// Runs once per gateway; a failed check is retried on the next append.
    async fn ensure_header(&self) -> Result<(), StorageError> {
        self.header_ready
            .get_or_try_init(|| async {
                if self.get_all_rows().await?.is_empty() {
                    tracing::info!(worksheet = %self.worksheet, "Seeding header row");
                    self.append_values(HEADER.iter().map(|h| h.to_string()).collect()).await?;
                }
                Ok::<(), StorageError>(())
            })
            .await?;
        Ok(())
    }

    async fn append_values(&self, row: Vec<String>) -> Result<(), StorageError> {
        let token = self.access_token().await?;
        let body = serde_json::json!({ "values": [row] });

        let response = self
            .http
            .post(self.values_url(":append"))
            .bearer_auth(token)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&body)
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        Self::check_response(response).await?;
        Ok(())
    }

    /// Check response status and return error if not successful.
    async fn check_response(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, StorageError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let message = response.text().await.unwrap_or_default();

        if status.as_u16() == 429 {
            tracing::warn!("Sheets API rate limit hit (429)");
        }

        Err(StorageError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl SheetGateway for GoogleSheetsGateway {
    async fn append_row(&self, record: &Record) -> Result<(), StorageError> {
        self.ensure_header().await?;
        self.append_values(record.to_row()).await
    }

    async fn get_all_rows(&self) -> Result<RowSnapshot, StorageError> {
        let token = self.access_token().await?;

        let response = self
            .http
            .get(self.values_url(""))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        let range: ValueRange = Self::check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| StorageError::InvalidResponse(format!("JSON parse error: {}", e)))?;

        Ok(range.values)
    }
}
