//! Controller invariants, driven through fake gateways so no network is
//! involved.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pummel::client::{RequestGateway, RequestOutcome};
use pummel::controller::Controller;
use pummel::stats::ResultAggregator;
use tokio::time::sleep;

/// Gateway that tracks how many calls overlap and the worst case seen.
struct GaugeGateway {
    current: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
    delay: Duration,
}

impl GaugeGateway {
    fn new(delay: Duration) -> Self {
        GaugeGateway {
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            delay,
        }
    }
}

#[async_trait]
impl RequestGateway for GaugeGateway {
    async fn issue(&self) -> RequestOutcome {
        let overlapping = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(overlapping, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        sleep(self.delay).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        RequestOutcome::Success(200)
    }
}

/// Gateway that cycles success, HTTP failure, and network error.
struct ScriptedGateway {
    calls: AtomicUsize,
}

#[async_trait]
impl RequestGateway for ScriptedGateway {
    async fn issue(&self) -> RequestOutcome {
        match self.calls.fetch_add(1, Ordering::SeqCst) % 3 {
            0 => RequestOutcome::Success(204),
            1 => RequestOutcome::Failure(503),
            _ => RequestOutcome::Error("connection reset".to_string()),
        }
    }
}

#[tokio::test]
async fn window_never_exceeds_limit() {
    let gateway = Arc::new(GaugeGateway::new(Duration::from_millis(20)));
    let stats = Arc::new(ResultAggregator::default());
    let controller = Controller::new(gateway.clone(), stats.clone(), 5)
        .with_tick(Duration::from_millis(5));

    let launched = controller.run(Duration::from_millis(200)).await;

    assert!(launched > 0);
    assert!(gateway.peak.load(Ordering::SeqCst) <= 5);
    assert_eq!(gateway.calls.load(Ordering::SeqCst) as u64, launched);
}

#[tokio::test]
async fn limit_of_one_is_fully_serial() {
    let gateway = Arc::new(GaugeGateway::new(Duration::from_millis(10)));
    let stats = Arc::new(ResultAggregator::default());
    let controller = Controller::new(gateway.clone(), stats, 1)
        .with_tick(Duration::from_millis(2));

    let launched = controller.run(Duration::from_millis(150)).await;

    assert!(launched > 1);
    assert_eq!(gateway.peak.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn zero_duration_launches_nothing() {
    let gateway = Arc::new(GaugeGateway::new(Duration::from_millis(1)));
    let stats = Arc::new(ResultAggregator::default());
    let controller = Controller::new(gateway.clone(), stats.clone(), 10);

    let launched = controller.run(Duration::ZERO).await;

    assert_eq!(launched, 0);
    let report = stats.snapshot();
    assert_eq!(report.total, 0);
    assert_eq!(report.success_rate, 0.0);
}

#[tokio::test]
async fn every_launch_is_recorded_before_run_returns() {
    let gateway = Arc::new(ScriptedGateway {
        calls: AtomicUsize::new(0),
    });
    let stats = Arc::new(ResultAggregator::default());
    let controller = Controller::new(gateway, stats.clone(), 4)
        .with_tick(Duration::from_millis(5));

    let launched = controller.run(Duration::from_millis(100)).await;
    let report = stats.snapshot();

    assert_eq!(report.total, launched);
    assert_eq!(report.success + report.errors, report.total);
    // A mix of outcomes landed and errors never stopped the loop.
    assert!(report.success > 0);
    assert!(report.errors > 0);
    // Drained means stable.
    assert_eq!(report, stats.snapshot());
}
