//! Escalation notifications.
//!
//! One best-effort JSON POST to a transactional email API per event.
//! Unconfigured transport degrades to a warn-log; delivery failure is
//! reported back as an undelivered event. Nothing here retries, queues, or
//! falls back to a secondary channel — the caller must not block on this.

use std::time::Duration;

use chrono::Utc;

use chargeband_common::error::NotifyError;
use chargeband_common::models::NotificationEvent;

use crate::config::NotifyConfig;

pub struct Notifier {
    http: reqwest::Client,
    config: Option<NotifyConfig>,
}

impl Notifier {
    pub fn new(config: Option<NotifyConfig>) -> Result<Self, reqwest::Error> {
        if config.is_none() {
            tracing::warn!("notification credentials not configured; escalations will be logged only");
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { http, config })
    }

    /// Send one notification. The returned event records the delivery
    /// outcome; callers must not escalate further on failure.
    pub async fn notify(&self, subject: &str, body: &str) -> NotificationEvent {
        let mut event = NotificationEvent {
            subject: subject.to_string(),
            body: body.to_string(),
            sent_at: Utc::now(),
            delivered: false,
        };

        match self.send(subject, body).await {
            Ok(()) => {
                event.delivered = true;
                tracing::info!(subject, "notification delivered");
            }
            Err(NotifyError::NotConfigured) => {
                tracing::warn!(subject, "notification skipped: transport not configured");
            }
            Err(e) => {
                tracing::error!(subject, error = %e, "notification delivery failed");
            }
        }

        event
    }

    async fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let cfg = self.config.as_ref().ok_or(NotifyError::NotConfigured)?;

        let payload = serde_json::json!({
            "sender": { "name": cfg.sender_name, "email": cfg.sender_email },
            "to": [{ "email": cfg.recipient_email, "name": cfg.recipient_name }],
            "subject": subject,
            "htmlContent": body,
        });

        let resp = self
            .http
            .post(&cfg.api_url)
            .header("api-key", &cfg.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        if resp.status() != reqwest::StatusCode::CREATED {
            return Err(NotifyError::Rejected(resp.status().as_u16()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_notifier_reports_undelivered() {
        let notifier = Notifier::new(None).unwrap();
        let event = notifier.notify("subject", "body").await;
        assert!(!event.delivered);
        assert_eq!(event.subject, "subject");
    }

    #[tokio::test]
    async fn non_created_response_reports_undelivered() {
        use axum::routing::post;

        // API that answers 200 instead of the expected 201.
        let app = axum::Router::new().route("/", post(|| async { "ok" }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let notifier = Notifier::new(Some(test_config(&format!("http://{addr}/")))).unwrap();
        let event = notifier.notify("subject", "body").await;
        assert!(!event.delivered);
    }

    #[tokio::test]
    async fn created_response_reports_delivered() {
        use axum::routing::post;

        let app = axum::Router::new()
            .route("/", post(|| async { axum::http::StatusCode::CREATED }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let notifier = Notifier::new(Some(test_config(&format!("http://{addr}/")))).unwrap();
        let event = notifier.notify("subject", "body").await;
        assert!(event.delivered);
    }

    fn test_config(api_url: &str) -> NotifyConfig {
        NotifyConfig {
            api_url: api_url.to_string(),
            api_key: "test-key".into(),
            sender_name: "chargeband".into(),
            sender_email: "agent@example.com".into(),
            recipient_name: "operator".into(),
            recipient_email: "operator@example.com".into(),
        }
    }
}
