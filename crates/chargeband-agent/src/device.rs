//! Cloud device client and relay power control.
//!
//! The plug is commanded through the vendor's cloud API. One session is
//! established at startup and reused for every command — no per-call
//! reconnects, no pooling. Commands always carry two codes: `switch_1` for
//! the relay and `countdown_1` reset to 0, so a previously scheduled
//! auto-off cannot fire after the plug is switched back on.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use chargeband_common::error::CommandError;

use crate::config::CloudConfig;

/// One `{code, value}` pair in a device command or status list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceCode {
    pub code: String,
    pub value: serde_json::Value,
}

impl DeviceCode {
    pub fn new(code: &str, value: impl Into<serde_json::Value>) -> Self {
        Self {
            code: code.into(),
            value: value.into(),
        }
    }
}

/// Long-lived session with the cloud device API.
pub struct CloudDeviceClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl CloudDeviceClient {
    /// Establish the session. Called once at startup; the token is reused
    /// for every subsequent command.
    pub async fn connect(cfg: &CloudConfig) -> Result<Self, CommandError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| CommandError::Transport(e.to_string()))?;

        let login = serde_json::json!({
            "access_id": cfg.access_id,
            "access_key": cfg.access_key,
            "username": cfg.username,
            "password": cfg.password,
        });

        let resp = http
            .post(format!("{}/v1.0/token", cfg.endpoint))
            .json(&login)
            .send()
            .await
            .map_err(|e| CommandError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CommandError::Rejected(format!("login returned HTTP {status}")));
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| CommandError::Transport(e.to_string()))?;
        let token = body
            .pointer("/result/access_token")
            .and_then(|t| t.as_str())
            .ok_or_else(|| CommandError::Rejected("login response missing access token".into()))?
            .to_string();

        tracing::info!(endpoint = %cfg.endpoint, "cloud device session established");

        Ok(Self {
            http,
            endpoint: cfg.endpoint.clone(),
            token,
        })
    }

    /// POST a command list to a device.
    pub async fn post_command(
        &self,
        device_id: &str,
        commands: &[DeviceCode],
    ) -> Result<(), CommandError> {
        let body = serde_json::json!({ "commands": commands });
        let resp = self
            .http
            .post(format!("{}/v1.0/devices/{device_id}/commands", self.endpoint))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| CommandError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CommandError::Rejected(format!("HTTP {status}")));
        }

        // The vendor wraps protocol-level failures in a 200 with success=false.
        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| CommandError::Transport(e.to_string()))?;
        if body.get("success").and_then(|s| s.as_bool()) == Some(false) {
            let msg = body
                .get("msg")
                .and_then(|m| m.as_str())
                .unwrap_or("unspecified");
            return Err(CommandError::Rejected(msg.to_string()));
        }

        Ok(())
    }

    /// Fetch the device's live status code list.
    pub async fn get_status(&self, device_id: &str) -> Result<Vec<DeviceCode>, CommandError> {
        let resp = self
            .http
            .get(format!("{}/v1.0/devices/{device_id}/status", self.endpoint))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| CommandError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CommandError::Rejected(format!("HTTP {status}")));
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| CommandError::Transport(e.to_string()))?;
        let codes = body
            .get("result")
            .cloned()
            .ok_or_else(|| CommandError::Rejected("status response missing result".into()))?;

        serde_json::from_value(codes).map_err(|e| CommandError::Transport(e.to_string()))
    }
}

/// Issues idempotent on/off commands to the relay.
///
/// Stateless about the device's real-world state: every call produces one
/// outbound command, repeated calls are never deduplicated, and the live
/// switch position only ever comes from [`PowerSwitch::status`].
pub struct PowerSwitch {
    client: Arc<CloudDeviceClient>,
    device_id: String,
}

impl PowerSwitch {
    pub fn new(client: Arc<CloudDeviceClient>, device_id: impl Into<String>) -> Self {
        Self {
            client,
            device_id: device_id.into(),
        }
    }

    /// Send one relay command. Returns false on any failure; never retries,
    /// never touches local state.
    pub async fn set_power(&self, on: bool) -> bool {
        let commands = [
            DeviceCode::new("switch_1", on),
            DeviceCode::new("countdown_1", 0),
        ];

        match self.client.post_command(&self.device_id, &commands).await {
            Ok(()) => {
                tracing::info!(on, "relay command accepted");
                true
            }
            Err(e) => {
                tracing::error!(on, error = %e, "relay command failed");
                false
            }
        }
    }

    /// Query the live switch position from the cloud. `None` when the query
    /// failed or the device reported no switch code.
    pub async fn status(&self) -> Option<bool> {
        match self.client.get_status(&self.device_id).await {
            Ok(codes) => codes
                .iter()
                .find(|c| c.code == "switch_1")
                .and_then(|c| c.value.as_bool()),
            Err(e) => {
                tracing::error!(error = %e, "device status query failed");
                None
            }
        }
    }
}
