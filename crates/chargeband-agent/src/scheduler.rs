//! Recurring-job scheduler.
//!
//! Owns a set of named jobs with independent cadences and drives them from
//! one background loop. The loop wakes on a fixed tick; every due job runs
//! sequentially, one at a time — job bodies are never concurrent with each
//! other. A job's next-fire time is pushed forward the moment it comes due,
//! before the body runs, so a slow or failing body cannot starve its own
//! future schedule. The loop observes a shutdown signal and exits cleanly.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::{watch, Mutex};
use tokio::time::{Instant, MissedTickBehavior};

use chargeband_common::models::{JobInfo, OperationResult, OpStatus};

/// How often the loop wakes to look for due jobs.
pub const TICK: Duration = Duration::from_secs(30);

type JobAction = Arc<dyn Fn() -> BoxFuture<'static, OperationResult> + Send + Sync>;

struct Job {
    name: String,
    every: Duration,
    next_run: Instant,
    action: JobAction,
}

pub struct Scheduler {
    jobs: Mutex<Vec<Job>>,
    shutdown: watch::Receiver<bool>,
    tick: Duration,
}

impl Scheduler {
    pub fn new(shutdown: watch::Receiver<bool>) -> Self {
        Self::with_tick(shutdown, TICK)
    }

    pub fn with_tick(shutdown: watch::Receiver<bool>, tick: Duration) -> Self {
        Self {
            jobs: Mutex::new(Vec::new()),
            shutdown,
            tick,
        }
    }

    /// Register a job. The first firing is one full interval from now, not
    /// immediately.
    pub async fn add_job<F, Fut>(&self, name: impl Into<String>, every: Duration, action: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = OperationResult> + Send + 'static,
    {
        assert!(!every.is_zero(), "job cadence must be non-zero");

        let name = name.into();
        tracing::info!(job = %name, every_s = every.as_secs(), "job registered");

        self.jobs.lock().await.push(Job {
            name,
            every,
            next_run: Instant::now() + every,
            action: Arc::new(move || action().boxed()),
        });
    }

    /// Snapshot of registered jobs for the status surface.
    pub async fn jobs(&self) -> Vec<JobInfo> {
        let now = Instant::now();
        self.jobs
            .lock()
            .await
            .iter()
            .map(|job| JobInfo {
                name: job.name.clone(),
                interval_s: job.every.as_secs(),
                next_run_in_s: job.next_run.saturating_duration_since(now).as_secs(),
            })
            .collect()
    }

    /// Drive the loop until the shutdown signal flips. Runs for the lifetime
    /// of the process under normal operation.
    pub async fn run(&self) {
        let mut shutdown = self.shutdown.clone();
        let mut ticker = tokio::time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first interval tick completes immediately; consume it so jobs
        // are only considered one full tick after startup.
        ticker.tick().await;

        tracing::info!(tick_s = self.tick.as_secs(), "scheduler started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    // A flipped flag or a dropped sender both mean stop.
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("scheduler stopped");
                        return;
                    }
                    continue;
                }
            }

            for (name, action) in self.take_due().await {
                self.execute(&name, action).await;
            }
        }
    }

    /// Collect the actions of every due job, pushing each schedule forward
    /// first. Skips whole periods when the loop fell behind, so one stall
    /// does not cause a catch-up burst.
    async fn take_due(&self) -> Vec<(String, JobAction)> {
        let now = Instant::now();
        let mut jobs = self.jobs.lock().await;
        let mut due = Vec::new();

        for job in jobs.iter_mut() {
            if job.next_run > now {
                continue;
            }
            while job.next_run <= now {
                job.next_run += job.every;
            }
            due.push((job.name.clone(), job.action.clone()));
        }

        due
    }

    /// Run one job body to completion. Panics and error results are absorbed
    /// here; neither stops the loop or the other jobs.
    async fn execute(&self, name: &str, action: JobAction) {
        tracing::debug!(job = %name, "job firing");

        match tokio::spawn(action()).await {
            Ok(result) if result.status == OpStatus::Error => {
                tracing::warn!(job = %name, message = %result.message, "job reported failure");
            }
            Ok(result) => {
                tracing::debug!(job = %name, status = ?result.status, "job finished");
            }
            Err(e) => {
                tracing::error!(job = %name, error = %e, "job panicked");
            }
        }
    }
}
