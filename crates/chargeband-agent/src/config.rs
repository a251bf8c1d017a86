//! Agent configuration.
//!
//! Operational knobs (addresses, cadences, timeouts) come from CLI flags;
//! credentials come from the environment. Cloud credentials are required —
//! the agent is useless without a commandable relay. Notification settings
//! are optional and degrade to a warn-log when absent.

use clap::Parser;

/// Chargeband agent daemon.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "chargeband-agent",
    about = "Keeps a battery-backed modem inside its safe charge band"
)]
pub struct Cli {
    /// HTTP control surface listen address.
    #[arg(long, default_value = "0.0.0.0:8765")]
    pub listen_addr: String,

    /// Modem host (telemetry, liveness probe, restart).
    #[arg(long, default_value = "192.168.1.1")]
    pub modem_host: String,

    /// Decision cycle cadence in seconds.
    #[arg(long, default_value_t = 300)]
    pub cycle_interval: u64,

    /// Gated turn-on cadence in seconds.
    #[arg(long, default_value_t = 14_400)]
    pub turn_on_interval: u64,

    /// Telemetry fetch timeout in seconds.
    #[arg(long, default_value_t = 10)]
    pub telemetry_timeout: u64,

    /// Per-layer reachability probe timeout in seconds.
    #[arg(long, default_value_t = 5)]
    pub probe_timeout: u64,
}

/// Cloud device API credentials and target device, read once at startup.
#[derive(Debug, Clone)]
pub struct CloudConfig {
    pub endpoint: String,
    pub access_id: String,
    pub access_key: String,
    pub username: String,
    pub password: String,
    pub device_id: String,
}

impl CloudConfig {
    /// Read from the environment. All six variables are required.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            endpoint: require("CLOUD_ENDPOINT")?,
            access_id: require("CLOUD_ACCESS_ID")?,
            access_key: require("CLOUD_ACCESS_KEY")?,
            username: require("CLOUD_USERNAME")?,
            password: require("CLOUD_PASSWORD")?,
            device_id: require("DEVICE_ID")?,
        })
    }
}

/// Escalation notification settings. All-or-nothing: if the key or the
/// recipient is missing the notifier runs unconfigured.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    pub api_url: String,
    pub api_key: String,
    pub sender_name: String,
    pub sender_email: String,
    pub recipient_name: String,
    pub recipient_email: String,
}

impl NotifyConfig {
    /// Read from the environment. Returns `None` when any required piece
    /// (API key, sender address, recipient address) is unset.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("NOTIFY_API_KEY").ok()?;
        let sender_email = std::env::var("NOTIFY_SENDER_EMAIL").ok()?;
        let recipient_email = std::env::var("NOTIFY_RECIPIENT_EMAIL").ok()?;

        Some(Self {
            api_url: std::env::var("NOTIFY_API_URL")
                .unwrap_or_else(|_| "https://api.brevo.com/v3/smtp/email".into()),
            api_key,
            sender_name: std::env::var("NOTIFY_SENDER_NAME")
                .unwrap_or_else(|_| "chargeband".into()),
            sender_email,
            recipient_name: std::env::var("NOTIFY_RECIPIENT_NAME")
                .unwrap_or_else(|_| recipient_email.clone()),
            recipient_email,
        })
    }
}

fn require(name: &str) -> anyhow::Result<String> {
    std::env::var(name)
        .map_err(|_| anyhow::anyhow!("required environment variable {name} is not set"))
}
