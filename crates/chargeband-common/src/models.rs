//! Core data model — battery readings, power actions, and the uniform
//! result shape shared by the scheduler and the HTTP surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A battery percentage read from the modem, with its capture time.
///
/// The percentage is always within `0..=100`; a failed fetch is represented
/// by `TelemetryError`, never by a zero or defaulted reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatteryReading {
    pub percent: u8,
    pub captured_at: DateTime<Utc>,
}

/// What the decision engine wants done with the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    /// Close the relay (resume charging).
    On,
    /// Open the relay. Issuing this also clears any pending device-side
    /// auto-off countdown.
    Off,
    /// Leave the relay alone.
    NoOp,
}

/// Status tag carried by every [`OperationResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpStatus {
    Success,
    Off,
    On,
    Ok,
    Error,
    Warning,
}

/// The uniform JSON contract every control operation returns, whether it was
/// triggered by the scheduler or by an HTTP request.
///
/// `battery` is three-valued on the wire: operations that never attempt a
/// reading omit the field, a failed fetch serializes as `null`, and a
/// successful reading echoes the percentage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult {
    pub status: OpStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub battery: Option<Option<u8>>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub internet_connected: Option<bool>,
}

impl OperationResult {
    /// Result of a decision made on a live battery reading.
    pub fn with_battery(status: OpStatus, percent: u8, message: impl Into<String>) -> Self {
        Self {
            status,
            battery: Some(Some(percent)),
            message: message.into(),
            internet_connected: None,
        }
    }

    /// Result of a decision cycle whose battery fetch failed. The battery
    /// field is present and null.
    pub fn battery_unknown(message: impl Into<String>) -> Self {
        Self {
            status: OpStatus::Error,
            battery: Some(None),
            message: message.into(),
            internet_connected: None,
        }
    }

    /// Result of an operation that never reads the battery.
    pub fn plain(status: OpStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            battery: None,
            message: message.into(),
            internet_connected: None,
        }
    }

    /// Result of a reachability-gated operation.
    pub fn gated(status: OpStatus, message: impl Into<String>, internet_connected: bool) -> Self {
        Self {
            status,
            battery: None,
            message: message.into(),
            internet_connected: Some(internet_connected),
        }
    }
}

/// One escalation notification, with its delivery outcome. Ephemeral —
/// never persisted, never retried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub subject: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub delivered: bool,
}

/// Snapshot of one scheduler job for the status surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInfo {
    pub name: String,
    pub interval_s: u64,
    pub next_run_in_s: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn battery_field_omitted_for_plain_results() {
        let json =
            serde_json::to_value(OperationResult::plain(OpStatus::Success, "done")).unwrap();
        assert!(json.get("battery").is_none());
        assert!(json.get("internet_connected").is_none());
        assert_eq!(json["status"], "success");
    }

    #[test]
    fn battery_field_null_after_failed_fetch() {
        let json = serde_json::to_value(OperationResult::battery_unknown(
            "Failed to get battery percentage",
        ))
        .unwrap();
        assert!(json.get("battery").is_some());
        assert!(json["battery"].is_null());
        assert_eq!(json["status"], "error");
    }

    #[test]
    fn battery_field_echoes_reading() {
        let json = serde_json::to_value(OperationResult::with_battery(
            OpStatus::Off,
            85,
            "Modem turned off - battery above 80%",
        ))
        .unwrap();
        assert_eq!(json["battery"], 85);
        assert_eq!(json["status"], "off");
    }

    #[test]
    fn gated_result_carries_connectivity_flag() {
        let json = serde_json::to_value(OperationResult::gated(
            OpStatus::Error,
            "Modem not reachable, email notification sent",
            false,
        ))
        .unwrap();
        assert_eq!(json["internet_connected"], false);
        assert!(json.get("battery").is_none());
    }

    #[test]
    fn status_tags_serialize_lowercase() {
        for (status, tag) in [
            (OpStatus::Success, "success"),
            (OpStatus::Off, "off"),
            (OpStatus::On, "on"),
            (OpStatus::Ok, "ok"),
            (OpStatus::Error, "error"),
            (OpStatus::Warning, "warning"),
        ] {
            assert_eq!(serde_json::to_value(status).unwrap(), tag);
        }
    }
}
