//! KeyStateClient - current holder keys from a KERIA agent
//!
//! A binding signed with a key the holder has since rotated away should not
//! verify, so verifiers can resolve the holder's current signing key from the
//! KEL instead of trusting the key embedded in the AID.

use crate::config::KeriaConfig;
use crate::core::verfer::Verfer;
use crate::error::{BindingError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Key state of an AID at its latest establishment event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyState {
    pub aid: String,
    pub sequence_number: u64,
    pub current_signing_key_hex: String,
}

impl KeyState {
    /// Decode a key state record as KERIA returns it
    ///
    /// `/states` answers with a list of records; a bare record is accepted too.
    pub fn from_json(aid: &str, body: &Value) -> Result<Self> {
        let record = match body {
            Value::Array(records) => records
                .first()
                .ok_or_else(|| BindingError::NotFound(format!("No key state for {}", aid)))?,
            Value::Object(_) => body,
            _ => {
                return Err(BindingError::ParseError(
                    "Key state response is not a JSON object or list".to_string(),
                ))
            }
        };

        let state_aid = record
            .get("i")
            .and_then(|v| v.as_str())
            .ok_or_else(|| BindingError::MissingField("i".to_string()))?;
        if state_aid != aid {
            return Err(BindingError::ParseError(format!(
                "Key state is for {}, requested {}",
                state_aid, aid
            )));
        }

        let sn = record
            .get("s")
            .and_then(|v| v.as_str())
            .ok_or_else(|| BindingError::MissingField("s".to_string()))?;
        let sequence_number = u64::from_str_radix(sn, 16)
            .map_err(|e| BindingError::ParseError(format!("Invalid sequence number {}: {}", sn, e)))?;

        let key = record
            .get("k")
            .and_then(|v| v.as_array())
            .and_then(|keys| keys.first())
            .and_then(|k| k.as_str())
            .ok_or_else(|| BindingError::MissingField("k".to_string()))?;
        let verfer = Verfer::from_qb64(key)?;
        debug!(aid, key = %verfer.qb64(), "current signing key");

        Ok(Self {
            aid: aid.to_string(),
            sequence_number,
            current_signing_key_hex: hex::encode(verfer.raw()),
        })
    }

    /// Raw current signing key
    pub fn holder_public_key(&self) -> Result<[u8; 32]> {
        let raw = hex::decode(&self.current_signing_key_hex)?;
        raw.as_slice()
            .try_into()
            .map_err(|_| BindingError::InvalidKeyLength {
                expected: 32,
                actual: raw.len(),
            })
    }
}

/// Read-only client for KERIA key state queries
pub struct KeyStateClient {
    url: String,
    client: Client,
}

impl KeyStateClient {
    pub fn new(config: &KeriaConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BindingError::Config(format!("Cannot build HTTP client: {}", e)))?;

        Ok(Self {
            url: config.url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the current key state of `aid`
    pub async fn key_state(&self, aid: &str) -> Result<KeyState> {
        let url = format!("{}/states", self.url);
        debug!(%url, aid, "querying key state");

        let response = self
            .client
            .get(&url)
            .query(&[("pre", aid)])
            .send()
            .await
            .map_err(|e| BindingError::NetworkError(e.to_string()))?;

        if response.status().as_u16() == 404 {
            return Err(BindingError::NotFound(format!("No key state for {}", aid)));
        }
        if !response.status().is_success() {
            return Err(BindingError::HttpError(format!(
                "Key state query failed with status {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| BindingError::ParseError(e.to_string()))?;

        let state = KeyState::from_json(aid, &body)?;
        info!(aid, sn = state.sequence_number, "resolved holder key state");
        Ok(state)
    }
}
