//! Adapter for a spreadsheet script exposed as a single POST endpoint.
//!
//! Every operation is one POST carrying a `{method, path, body}` envelope.
//! The script answers with a record, an array of records, `{success: true}`
//! or `{error: message}`, always with a 2xx status.

use std::time::Duration;

use async_trait::async_trait;
use bounce_core::check::{CheckFields, CheckPatch, CheckRecord};
use serde::Serialize;
use serde_json::Value;

use crate::error::StoreError;
use crate::normalize::{record_from_value, records_from_value};
use crate::{BackendKind, RecordStore};

/// The script's error string for a missing row.
const NOT_FOUND_MESSAGE: &str = "Not found";

#[derive(Debug, Serialize)]
struct Envelope<'a> {
    method: &'static str,
    path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<Value>,
}

/// HTTP client for the script endpoint.
pub struct ScriptStore {
    client: reqwest::Client,
    endpoint: String,
}

impl ScriptStore {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one envelope and return the decoded payload.
    ///
    /// `{error}` payloads are turned into errors here; `id` names the record
    /// a "Not found" answer refers to.
    async fn call(
        &self,
        method: &'static str,
        path: &str,
        body: Option<Value>,
        id: Option<&str>,
    ) -> Result<Value, StoreError> {
        let envelope = Envelope { method, path, body };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, method, path, "Script endpoint unreachable");
                StoreError::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Unavailable(format!(
                "script endpoint returned HTTP {status}"
            )));
        }

        let payload: Value = response.json().await?;
        match payload.get("error") {
            Some(error) if payload.is_object() => {
                let message = error.as_str().map(str::to_string).unwrap_or_else(|| error.to_string());
                match id {
                    Some(id) if message == NOT_FOUND_MESSAGE => Err(StoreError::NotFound(id.to_string())),
                    _ => {
                        tracing::warn!(method, path, error = %message, "Script rejected request");
                        Err(StoreError::Rejected(message))
                    }
                }
            }
            _ => Ok(payload),
        }
    }

    /// `/checks/{id}`, or `None` for ids the script could never match.
    fn record_path(id: &str) -> Option<String> {
        if id.is_empty() || id.contains('/') {
            None
        } else {
            Some(format!("/checks/{id}"))
        }
    }

    fn record_path_or_missing(id: &str) -> Result<String, StoreError> {
        Self::record_path(id).ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl RecordStore for ScriptStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Script
    }

    async fn list(&self) -> Result<Vec<CheckRecord>, StoreError> {
        let payload = self.call("GET", "/checks", None, None).await?;
        records_from_value(payload)
    }

    async fn get(&self, id: &str) -> Result<CheckRecord, StoreError> {
        let path = Self::record_path_or_missing(id)?;
        let payload = self.call("GET", &path, None, Some(id)).await?;
        record_from_value(payload)
    }

    async fn create(&self, fields: &CheckFields) -> Result<CheckRecord, StoreError> {
        let body = serde_json::to_value(fields)?;
        let payload = self.call("POST", "/checks", Some(body), None).await?;
        let record = record_from_value(payload)?;
        tracing::debug!(id = %record.id, "Check appended by script");
        Ok(record)
    }

    async fn update(&self, id: &str, patch: &CheckPatch) -> Result<CheckRecord, StoreError> {
        let path = Self::record_path_or_missing(id)?;
        let body = serde_json::to_value(patch)?;
        let payload = self.call("PUT", &path, Some(body), Some(id)).await?;
        record_from_value(payload)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let path = Self::record_path_or_missing(id)?;
        let payload = self.call("DELETE", &path, None, Some(id)).await?;
        match payload.get("success").and_then(Value::as_bool) {
            Some(true) => Ok(()),
            _ => Err(StoreError::Corrupt(format!(
                "unexpected delete response: {payload}"
            ))),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.call("GET", "/checks", None, None).await.map(|_| ())
    }
}
