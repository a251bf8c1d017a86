//! Control operations — the decision cycle and the gated turn-on.
//!
//! A scheduled job and a foreground HTTP request can ask for the same
//! operation at the same time, so everything that can end in a relay
//! command runs under one mutex: one power decision in flight at a time.
//! Concurrent idempotent commands would not corrupt anything (the switch
//! holds no local device state), but two overlapping cycles could issue
//! contradictory commands in quick succession.

use tokio::sync::Mutex;

use chargeband_common::models::{OperationResult, OpStatus, PowerAction};

use crate::decision::{self, LOWER_PERCENT, UPPER_PERCENT};
use crate::device::PowerSwitch;
use crate::notify::Notifier;
use crate::reachability::ReachabilityChecker;
use crate::telemetry::ModemClient;

/// Fixed escalation subject for a failed gated turn-on. One notification
/// per failed attempt, never more.
pub const UNREACHABLE_SUBJECT: &str = "Modem charger unreachable - manual intervention required";

const UNREACHABLE_BODY: &str = "The modem could not be reached from the controller, so the \
     charger was not commanded. Please check the modem and power it on manually.";

pub struct Automation {
    modem: ModemClient,
    switch: PowerSwitch,
    checker: ReachabilityChecker,
    notifier: Notifier,
    power_lock: Mutex<()>,
}

impl Automation {
    pub fn new(
        modem: ModemClient,
        switch: PowerSwitch,
        checker: ReachabilityChecker,
        notifier: Notifier,
    ) -> Self {
        Self {
            modem,
            switch,
            checker,
            notifier,
            power_lock: Mutex::new(()),
        }
    }

    /// One decision cycle: fetch the battery, decide, command the relay.
    ///
    /// The reported result reflects the decision; a failed relay command is
    /// logged but does not change the status, since the device's real state
    /// is unknown either way and the next cycle re-decides from scratch.
    pub async fn run_cycle(&self) -> OperationResult {
        let _guard = self.power_lock.lock().await;

        let percent = match self.modem.fetch_battery().await {
            Ok(reading) => {
                tracing::info!(battery = reading.percent, at = %reading.captured_at, "battery reading");
                reading.percent
            }
            Err(e) => {
                tracing::error!(error = %e, "battery fetch failed");
                return OperationResult::battery_unknown("Failed to get battery percentage");
            }
        };

        match decision::decide(Some(percent)) {
            PowerAction::Off => {
                if !self.switch.set_power(false).await {
                    tracing::warn!("turn-off command failed; will retry on next cycle");
                }
                OperationResult::with_battery(
                    OpStatus::Off,
                    percent,
                    format!("Modem turned off - battery above {UPPER_PERCENT}%"),
                )
            }
            PowerAction::On => {
                if !self.switch.set_power(true).await {
                    tracing::warn!("turn-on command failed; will retry on next cycle");
                }
                OperationResult::with_battery(
                    OpStatus::On,
                    percent,
                    format!("Modem turned on - battery below {LOWER_PERCENT}%"),
                )
            }
            PowerAction::NoOp => {
                tracing::info!(battery = percent, "battery inside the band, no action");
                OperationResult::with_battery(
                    OpStatus::Ok,
                    percent,
                    format!("Battery at {percent}% - no action needed"),
                )
            }
        }
    }

    /// Gated turn-on: probe the path first, escalate to a human instead of
    /// commanding a plug nobody can verify.
    pub async fn gated_turn_on(&self) -> OperationResult {
        let _guard = self.power_lock.lock().await;

        if !self.checker.probe().await {
            let event = self.notifier.notify(UNREACHABLE_SUBJECT, UNREACHABLE_BODY).await;
            tracing::warn!(
                delivered = event.delivered,
                "modem unreachable; escalated to operator"
            );
            return OperationResult::gated(
                OpStatus::Error,
                "Modem not reachable, email notification sent",
                false,
            );
        }

        if self.switch.set_power(true).await {
            OperationResult::gated(OpStatus::Success, "Device turned on successfully", true)
        } else {
            OperationResult::gated(OpStatus::Error, "Failed to turn device on", true)
        }
    }

    /// Unconditional turn-off. The off path is deliberately ungated: opening
    /// the relay is always safe, and waiting on a probe would only delay it.
    pub async fn turn_off(&self) -> OperationResult {
        let _guard = self.power_lock.lock().await;

        if self.switch.set_power(false).await {
            OperationResult::gated(OpStatus::Success, "Device turned off successfully", true)
        } else {
            OperationResult::gated(OpStatus::Error, "Failed to turn device off", true)
        }
    }

    /// Liveness probe against the modem's own web UI.
    pub async fn modem_status(&self) -> OperationResult {
        if self.modem.is_reachable().await {
            OperationResult::plain(OpStatus::Ok, "Modem is reachable")
        } else {
            OperationResult::plain(OpStatus::Error, "Modem is not reachable")
        }
    }

    /// Ask the modem to reboot. Fire-and-forget.
    pub async fn restart_modem(&self) -> OperationResult {
        if self.modem.restart().await {
            OperationResult::plain(OpStatus::Success, "Modem restart requested")
        } else {
            OperationResult::plain(OpStatus::Error, "Failed to restart modem")
        }
    }

    /// Live relay position from the cloud API.
    pub async fn charger_status(&self) -> OperationResult {
        match self.switch.status().await {
            Some(on) => OperationResult::plain(
                OpStatus::Ok,
                format!("Charger switch is {}", if on { "on" } else { "off" }),
            ),
            None => OperationResult::plain(OpStatus::Error, "Failed to query charger state"),
        }
    }
}
