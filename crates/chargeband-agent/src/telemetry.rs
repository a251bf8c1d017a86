//! Modem telemetry adapter — battery percentage, liveness probe, restart.
//!
//! The modem publishes its battery level as a small XML document on its own
//! web UI, guarded by a `Referer` check. One request per fetch, bounded
//! timeout, no retries; a malformed or missing field is a parse failure,
//! kept distinct from transport failures so the caller can tell "modem gone"
//! from "modem speaking gibberish".

use std::time::Duration;

use chrono::Utc;
use quick_xml::events::Event;
use quick_xml::Reader;

use chargeband_common::error::TelemetryError;
use chargeband_common::models::BatteryReading;

pub struct ModemClient {
    http: reqwest::Client,
    base_url: String,
    referer: String,
    timeout_s: u64,
}

impl ModemClient {
    pub fn new(host: &str, timeout_s: u64) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_s))
            .build()?;

        Ok(Self {
            http,
            base_url: format!("http://{host}"),
            referer: format!("http://{host}/index.html"),
            timeout_s,
        })
    }

    /// Fetch the current battery percentage. Exactly one round trip.
    pub async fn fetch_battery(&self) -> Result<BatteryReading, TelemetryError> {
        let resp = self
            .http
            .get(format!("{}/mark_title.w.xml", self.base_url))
            .header(reqwest::header::REFERER, &self.referer)
            .send()
            .await
            .map_err(|e| self.classify(e))?
            .error_for_status()
            .map_err(|e| TelemetryError::Unreachable(e.to_string()))?;

        let body = resp.text().await.map_err(|e| self.classify(e))?;
        let percent = parse_battery_percent(&body)?;

        Ok(BatteryReading {
            percent,
            captured_at: Utc::now(),
        })
    }

    /// Liveness probe against the modem's root page. 200 means reachable.
    pub async fn is_reachable(&self) -> bool {
        match self.http.get(format!("{}/", self.base_url)).send().await {
            Ok(resp) => resp.status() == reqwest::StatusCode::OK,
            Err(_) => false,
        }
    }

    /// Ask the modem to reboot itself. Fire-and-forget; the response body is
    /// informational only.
    pub async fn restart(&self) -> bool {
        let result = self
            .http
            .post(format!("{}/wxml/set_reboot.xml", self.base_url))
            .header(reqwest::header::REFERER, &self.referer)
            .body("reboot=1")
            .send()
            .await
            .and_then(|r| r.error_for_status());

        match result {
            Ok(resp) => {
                tracing::info!(status = %resp.status(), "modem restart accepted");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "modem restart request failed");
                false
            }
        }
    }

    fn classify(&self, e: reqwest::Error) -> TelemetryError {
        if e.is_timeout() {
            TelemetryError::Timeout(self.timeout_s)
        } else {
            TelemetryError::Unreachable(e.to_string())
        }
    }
}

/// Pull the integer `batt_p` field out of the modem's `<title>` document.
///
/// Values outside `0..=100` violate the reading invariant and are rejected
/// as parse failures, same as a missing or non-integer field.
fn parse_battery_percent(xml: &str) -> Result<u8, TelemetryError> {
    let mut reader = Reader::from_str(xml);
    let mut in_batt = false;
    let mut value: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"batt_p" => in_batt = true,
            Ok(Event::End(e)) if e.name().as_ref() == b"batt_p" => in_batt = false,
            Ok(Event::Text(t)) if in_batt => {
                let text = t
                    .unescape()
                    .map_err(|e| TelemetryError::Parse(e.to_string()))?;
                value = Some(text.into_owned());
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(TelemetryError::Parse(e.to_string())),
            _ => {}
        }
    }

    let raw = value.ok_or_else(|| TelemetryError::Parse("batt_p field missing".into()))?;
    let percent: u8 = raw
        .trim()
        .parse()
        .map_err(|_| TelemetryError::Parse(format!("batt_p is not an integer: {raw:?}")))?;

    if percent > 100 {
        return Err(TelemetryError::Parse(format!(
            "batt_p out of range: {percent}"
        )));
    }

    Ok(percent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_battery_from_title_document() {
        let xml = "<title><prod>MR200</prod><batt_p>85</batt_p><sig>4</sig></title>";
        assert_eq!(parse_battery_percent(xml).unwrap(), 85);
    }

    #[test]
    fn parses_zero_and_full() {
        assert_eq!(
            parse_battery_percent("<title><batt_p>0</batt_p></title>").unwrap(),
            0
        );
        assert_eq!(
            parse_battery_percent("<title><batt_p>100</batt_p></title>").unwrap(),
            100
        );
    }

    #[test]
    fn tolerates_whitespace_around_value() {
        let xml = "<title>\n  <batt_p> 42 </batt_p>\n</title>";
        assert_eq!(parse_battery_percent(xml).unwrap(), 42);
    }

    #[test]
    fn missing_field_is_parse_error() {
        let err = parse_battery_percent("<title><sig>4</sig></title>").unwrap_err();
        assert!(matches!(err, TelemetryError::Parse(_)));
    }

    #[test]
    fn non_integer_field_is_parse_error() {
        let err = parse_battery_percent("<title><batt_p>high</batt_p></title>").unwrap_err();
        assert!(matches!(err, TelemetryError::Parse(_)));
    }

    #[test]
    fn out_of_range_value_is_parse_error() {
        let err = parse_battery_percent("<title><batt_p>250</batt_p></title>").unwrap_err();
        assert!(matches!(err, TelemetryError::Parse(_)));
    }

    #[tokio::test]
    async fn connection_refused_is_unreachable() {
        // Bind-then-drop to get a port nothing is listening on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ModemClient::new(&addr.to_string(), 2).unwrap();
        let err = client.fetch_battery().await.unwrap_err();
        assert!(matches!(err, TelemetryError::Unreachable(_)));
    }
}
