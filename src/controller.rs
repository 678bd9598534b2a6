use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use log::debug;
use tokio::task::JoinHandle;

use crate::client::RequestGateway;
use crate::stats::ResultAggregator;

/// How often the controller re-evaluates the window while saturated.
/// Trades CPU overhead against launch latency once a slot frees up.
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

/// Where the controller is in its launch/drain lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Below the limit with time remaining: launch another request.
    Filling,
    /// At the limit: wait one tick for a slot to free.
    Saturated,
    /// Deadline passed with work outstanding: stop launching, await it.
    Draining,
    /// Deadline passed, nothing in flight. Terminal.
    Idle,
}

fn phase(in_flight: usize, limit: usize, now: Instant, deadline: Instant) -> Phase {
    if now < deadline {
        if in_flight < limit {
            Phase::Filling
        } else {
            Phase::Saturated
        }
    } else if in_flight > 0 {
        Phase::Draining
    } else {
        Phase::Idle
    }
}

/// Maintains the sliding window of in-flight requests.
///
/// The window is owned exclusively by the `run` loop (single writer);
/// completions are observed only through `JoinHandle`s, and each task
/// records its outcome in the aggregator before it finishes, so a handle
/// reported finished has always been counted already.
pub struct Controller {
    gateway: Arc<dyn RequestGateway>,
    stats: Arc<ResultAggregator>,
    limit: usize,
    tick: Duration,
}

impl Controller {
    pub fn new(
        gateway: Arc<dyn RequestGateway>,
        stats: Arc<ResultAggregator>,
        limit: usize,
    ) -> Self {
        Controller {
            gateway,
            stats,
            limit,
            tick: DEFAULT_TICK,
        }
    }

    /// Overrides the saturation polling interval, mainly for tests.
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    fn launch(&self, in_flight: &mut Vec<JoinHandle<()>>) {
        let gateway = self.gateway.clone();
        let stats = self.stats.clone();
        in_flight.push(tokio::spawn(async move {
            let outcome = gateway.issue().await;
            stats.record(&outcome);
        }));
    }

    /// Drives the window for `duration`, then drains whatever is still in
    /// flight. Returns the number of requests launched; every one of them
    /// has been recorded in the aggregator by the time this returns.
    ///
    /// The in-flight count and the deadline are re-checked before every
    /// individual launch, so the limit is a hard instantaneous ceiling
    /// and a zero duration launches nothing at all.
    pub async fn run(&self, duration: Duration) -> u64 {
        let deadline = Instant::now() + duration;
        let mut in_flight: Vec<JoinHandle<()>> = Vec::new();
        let mut launched: u64 = 0;

        loop {
            in_flight.retain(|handle| !handle.is_finished());
            match phase(in_flight.len(), self.limit, Instant::now(), deadline) {
                Phase::Filling => {
                    self.launch(&mut in_flight);
                    launched += 1;
                }
                Phase::Saturated => tokio::time::sleep(self.tick).await,
                Phase::Draining => {
                    debug!("Time budget spent, draining {} in-flight requests", in_flight.len());
                    let _ = join_all(in_flight).await;
                    break;
                }
                Phase::Idle => break,
            }
        }

        launched
    }
}
