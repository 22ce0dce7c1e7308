//! Remote lock service client.
//!
//! One call per code: POST `/v3/keyboardPwd/add` with the code, its
//! validity window, and a label naming the guest and booking. The call
//! is idempotent under "code already exists": that reply means the
//! desired end state (this code valid on this lock) already holds and
//! is treated as success. Every other non-zero error code, and any
//! transport failure, is a definitive per-call failure; retry policy
//! belongs to the caller.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

/// Error code the lock service returns when the code is already
/// present on the lock.
const ERRCODE_ALREADY_EXISTS: i64 = -3007;
/// Passcode type: timed (valid between start and end date).
const KEYBOARD_PWD_TYPE_TIMED: u8 = 3;
/// Add via the cloud API rather than a local gateway.
const ADD_TYPE_REMOTE: u8 = 2;

/// A single (lock, code, validity window) provisioning request.
#[derive(Clone, Debug)]
pub struct CodeRequest {
    pub lock_id: u64,
    pub code: String,
    pub guest_name: String,
    /// Which lock this is for, e.g. "Front Door" or the room name.
    /// Used only in the code's display label.
    pub label: String,
    pub booking_id: String,
    pub valid_from: NaiveDateTime,
    pub valid_to: NaiveDateTime,
}

impl CodeRequest {
    /// Display name shown in the lock vendor's app.
    pub fn display_name(&self) -> String {
        format!("{} - {} - {}", self.guest_name, self.label, self.booking_id)
    }
}

/// Outcome of one code-creation call. `AlreadyExists` is kept distinct
/// from `Created` so callers can see that the existing code's validity
/// window was never verified against this booking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Created,
    AlreadyExists,
    Failed(String),
}

impl ProvisionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProvisionOutcome::Created | ProvisionOutcome::AlreadyExists)
    }
}

/// Seam for the booking processor so tests can substitute a double.
#[async_trait]
pub trait LockClient: Send + Sync {
    async fn create_code(&self, req: &CodeRequest) -> ProvisionOutcome;
}

/// Response body from the lock service. A missing `errcode` means
/// success (the service omits it on some success paths).
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    pub errcode: Option<i64>,
    pub errmsg: Option<String>,
}

/// Map a parsed service response to an outcome.
pub fn classify_response(res: &ApiResponse) -> ProvisionOutcome {
    match res.errcode {
        None | Some(0) => ProvisionOutcome::Created,
        Some(ERRCODE_ALREADY_EXISTS) => ProvisionOutcome::AlreadyExists,
        Some(code) => ProvisionOutcome::Failed(format!(
            "API error {}: {}",
            code,
            res.errmsg.as_deref().unwrap_or("Unknown error")
        )),
    }
}

/// Epoch milliseconds for the lock service's absolute timestamps.
pub fn to_ms(dt: NaiveDateTime) -> i64 {
    dt.and_utc().timestamp_millis()
}

/// HTTP implementation of [`LockClient`].
pub struct HttpLockClient {
    http: Client,
    base_url: String,
    client_id: String,
    access_token: String,
}

impl HttpLockClient {
    pub fn new(
        base_url: &str,
        client_id: &str,
        access_token: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id: client_id.to_string(),
            access_token: access_token.to_string(),
        })
    }

    async fn post_code(&self, req: &CodeRequest) -> Result<ApiResponse> {
        let url = format!("{}/v3/keyboardPwd/add", self.base_url);
        let form = [
            ("clientId", self.client_id.clone()),
            ("accessToken", self.access_token.clone()),
            ("lockId", req.lock_id.to_string()),
            ("keyboardPwd", req.code.clone()),
            ("keyboardPwdName", req.display_name()),
            ("keyboardPwdType", KEYBOARD_PWD_TYPE_TIMED.to_string()),
            ("startDate", to_ms(req.valid_from).to_string()),
            ("endDate", to_ms(req.valid_to).to_string()),
            ("addType", ADD_TYPE_REMOTE.to_string()),
            ("date", Utc::now().timestamp_millis().to_string()),
        ];

        let res = self.http.post(&url).form(&form).send().await?;
        let status = res.status();
        let text = res.text().await.unwrap_or_default();
        if !status.is_success() {
            anyhow::bail!("Code creation failed: {} ({})", status, text);
        }
        serde_json::from_str(&text).context("Invalid JSON response from lock service")
    }
}

#[async_trait]
impl LockClient for HttpLockClient {
    async fn create_code(&self, req: &CodeRequest) -> ProvisionOutcome {
        tracing::info!(
            lock_id = req.lock_id,
            code = %req.code,
            label = %req.label,
            "creating_lock_code"
        );

        let outcome = match self.post_code(req).await {
            Ok(res) => classify_response(&res),
            Err(e) => ProvisionOutcome::Failed(e.to_string()),
        };

        match &outcome {
            ProvisionOutcome::Created => {
                tracing::info!(lock_id = req.lock_id, code = %req.code, "lock_code_created");
            }
            ProvisionOutcome::AlreadyExists => {
                // The service does not say whose code it is; a stale
                // code from a prior booking would be accepted here too.
                tracing::warn!(
                    lock_id = req.lock_id,
                    code = %req.code,
                    "lock_code_already_exists, validity window not verified"
                );
            }
            ProvisionOutcome::Failed(reason) => {
                tracing::error!(
                    lock_id = req.lock_id,
                    code = %req.code,
                    reason = %reason,
                    "lock_code_creation_failed"
                );
            }
        }

        outcome
    }
}
