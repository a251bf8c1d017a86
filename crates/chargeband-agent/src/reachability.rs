//! Layered internet reachability probe.
//!
//! The gate needs a cheap answer to "is it safe to command the plug", so the
//! probe checks general path connectivity rather than the plug itself: ICMP
//! to two well-known hosts, then an HTTP GET, then a DNS lookup, in order,
//! short-circuiting on the first success. Any failure inside a layer is that
//! layer's failure — the probe always resolves to a boolean, never an error.
//! Worst case latency is bounded by the sum of the per-layer timeouts.

use std::time::Duration;

/// Probe targets, one per layer. Override for tests or odd networks.
#[derive(Debug, Clone)]
pub struct ProbeTargets {
    /// Hosts for the ICMP layers, tried in order.
    pub ping_hosts: Vec<String>,
    /// Known-good HTTP endpoint; any non-error response counts.
    pub http_endpoint: String,
    /// `host:port` name for the DNS resolution layer.
    pub dns_name: String,
}

impl Default for ProbeTargets {
    fn default() -> Self {
        Self {
            ping_hosts: vec!["1.1.1.1".into(), "8.8.8.8".into()],
            http_endpoint: "http://connectivitycheck.gstatic.com/generate_204".into(),
            dns_name: "one.one.one.one:443".into(),
        }
    }
}

pub struct ReachabilityChecker {
    http: reqwest::Client,
    targets: ProbeTargets,
    layer_timeout: Duration,
}

impl ReachabilityChecker {
    pub fn new(layer_timeout_s: u64) -> Result<Self, reqwest::Error> {
        Self::with_targets(ProbeTargets::default(), layer_timeout_s)
    }

    pub fn with_targets(targets: ProbeTargets, layer_timeout_s: u64) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(layer_timeout_s))
            .build()?;

        Ok(Self {
            http,
            targets,
            layer_timeout: Duration::from_secs(layer_timeout_s),
        })
    }

    /// Run the layers in order, returning on the first success. False only
    /// when every layer failed or timed out.
    pub async fn probe(&self) -> bool {
        for host in &self.targets.ping_hosts {
            if self.ping(host).await {
                tracing::debug!(host = %host, "reachability confirmed via ICMP");
                return true;
            }
        }

        if self.http_layer().await {
            tracing::debug!(endpoint = %self.targets.http_endpoint, "reachability confirmed via HTTP");
            return true;
        }

        if self.dns_layer().await {
            tracing::debug!(name = %self.targets.dns_name, "reachability confirmed via DNS");
            return true;
        }

        tracing::warn!("all reachability layers failed");
        false
    }

    /// One ICMP layer — shells out to the system ping binary. A missing
    /// binary or a non-zero exit is a layer failure.
    async fn ping(&self, host: &str) -> bool {
        let wait_s = self.layer_timeout.as_secs().max(1).to_string();
        let output = tokio::time::timeout(
            self.layer_timeout + Duration::from_secs(1),
            tokio::process::Command::new("ping")
                .args(["-c", "1", "-W", &wait_s, host])
                .output(),
        )
        .await;

        match output {
            Ok(Ok(out)) => out.status.success(),
            _ => false,
        }
    }

    async fn http_layer(&self) -> bool {
        match self.http.get(&self.targets.http_endpoint).send().await {
            Ok(resp) => resp.status().is_success() || resp.status().is_redirection(),
            Err(_) => false,
        }
    }

    async fn dns_layer(&self) -> bool {
        tokio::time::timeout(
            self.layer_timeout,
            tokio::net::lookup_host(&self.targets.dns_name),
        )
        .await
        .map(|r| r.is_ok())
        .unwrap_or(false)
    }
}
