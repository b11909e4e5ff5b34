// Simulated early-warning feed.
//
// Each tick draws a Bernoulli trial; on success one alert is synthesized from the
// candidate pools of a uniformly chosen severity class.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::model::{Alert, Severity};

/// Candidate content for one severity class
struct CandidatePool {
    severity: Severity,
    titles: &'static [&'static str],
    messages: &'static [&'static str],
}

const POOLS: &[CandidatePool] = &[
    CandidatePool {
        severity: Severity::Critical,
        titles: &["Earthquake Alert", "Tsunami Warning", "Severe Cyclone Alert"],
        messages: &[
            "Immediate evacuation required from coastal areas.",
            "Seek higher ground immediately.",
            "Move to designated safe zones now.",
        ],
    },
    CandidatePool {
        severity: Severity::Warning,
        titles: &["Flood Warning", "Landslide Risk", "Heat Wave Alert"],
        messages: &[
            "Avoid travel in affected areas.",
            "Stay indoors and keep hydrated.",
            "Follow local authority guidelines.",
        ],
    },
    CandidatePool {
        severity: Severity::Info,
        titles: &["Weather Update", "Safety Reminder", "Preparedness Tips"],
        messages: &[
            "Check your emergency kit.",
            "Review evacuation routes.",
            "Stay informed through official channels.",
        ],
    },
];

/// Locations are shared by every severity class
const LOCATIONS: &[&str] = &[
    "Mumbai", "Delhi", "Chennai", "Kolkata", "Bangalore", "Hyderabad", "Pune", "Ahmedabad",
];

/// Feed timing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedConfig {
    /// Time between ticks; the first tick fires one interval after start
    pub interval: Duration,
    /// Chance that a tick produces an alert
    pub probability: f64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            probability: 0.1,
        }
    }
}

impl FeedConfig {
    pub fn new(interval: Duration, probability: f64) -> Self {
        Self {
            // A zero period would make tokio's interval panic
            interval: interval.max(Duration::from_millis(1)),
            probability: if probability.is_nan() { 0.0 } else { probability.clamp(0.0, 1.0) },
        }
    }
}

pub struct FeedGenerator<R> {
    config: FeedConfig,
    rng: R,
}

impl<R: Rng> FeedGenerator<R> {
    pub fn new(config: FeedConfig, rng: R) -> Self {
        let config = FeedConfig::new(config.interval, config.probability);
        Self { config, rng }
    }

    /// Run one tick: maybe produce an alert.
    pub fn tick(&mut self) -> Option<Alert> {
        if self.rng.random_bool(self.config.probability) {
            Some(self.synthesize())
        } else {
            None
        }
    }

    /// Produce one alert with a fresh id, stamped now.
    pub fn synthesize(&mut self) -> Alert {
        // Pools and locations are non-empty constants
        let pool = POOLS.choose(&mut self.rng).unwrap_or(&POOLS[0]);
        let title = pool.titles.choose(&mut self.rng).copied().unwrap_or_default();
        let message = pool.messages.choose(&mut self.rng).copied().unwrap_or_default();
        let location = LOCATIONS.choose(&mut self.rng).copied().unwrap_or_default();

        Alert::new(uuid::Uuid::new_v4().to_string(), pool.severity, title, message, location)
    }
}

/// Owner's handle on a running feed. Dropping it aborts the task.
pub struct FeedHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl FeedHandle {
    /// Stop the feed and wait for the task to finish. No alert is sent afterwards.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    log::error!("Alert feed task failed: {}", e);
                }
            }
        }
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Start the feed on the current tokio runtime, sending alerts to `tx`.
pub fn spawn(config: FeedConfig, tx: mpsc::Sender<Alert>) -> FeedHandle {
    spawn_with_rng(config, StdRng::from_os_rng(), tx)
}

pub fn spawn_with_rng<R>(config: FeedConfig, rng: R, tx: mpsc::Sender<Alert>) -> FeedHandle
where
    R: Rng + Send + 'static,
{
    let mut generator = FeedGenerator::new(config, rng);
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
    let period = generator.config.interval;

    let task = tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        log::info!(
            "Alert feed started (every {:?}, p={})",
            period,
            generator.config.probability
        );

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                _ = ticker.tick() => {
                    let Some(alert) = generator.tick() else {
                        continue;
                    };
                    log::debug!("Feed produced {:?} alert {}", alert.severity, alert.id);
                    // A backlogged receiver must not keep the task from seeing shutdown
                    tokio::select! {
                        _ = &mut shutdown_rx => break,
                        sent = tx.send(alert) => {
                            if sent.is_err() {
                                log::debug!("Alert receiver gone, stopping feed");
                                break;
                            }
                        }
                    }
                }
            }
        }
        log::info!("Alert feed stopped");
    });

    FeedHandle {
        shutdown: Some(shutdown_tx),
        task: Some(task),
    }
}
