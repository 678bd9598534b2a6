use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};

use crate::client::{build_client, HttpClientConfig, HttpGateway, RequestGateway};
use crate::config::Settings;
use crate::controller::Controller;
use crate::error::RunError;
use crate::stats::{ResultAggregator, TestReport};

/// Runs one complete load test: client setup, timed request window,
/// graceful drain, final report. Ctrl-C interrupts the run.
pub async fn run(settings: &Settings) -> Result<TestReport, RunError> {
    run_with_shutdown(settings, async {
        // ctrl_c only errors when no signal handler can be installed; in
        // that case the run is simply not interruptible.
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    })
    .await
}

/// Same as [`run`], but the caller supplies the interruption signal.
///
/// On shutdown the controller future is dropped: in-flight requests are
/// abandoned rather than awaited, the client handles are released with
/// it, and `RunError::Interrupted` propagates. On the normal path the
/// controller is driven all the way to idle before the snapshot is taken,
/// so no `record` call can race the report.
pub async fn run_with_shutdown<F>(settings: &Settings, shutdown: F) -> Result<TestReport, RunError>
where
    F: Future<Output = ()>,
{
    let client = build_client(&HttpClientConfig {
        timeout_seconds: settings.http_timeout_seconds,
    })?;
    let gateway: Arc<dyn RequestGateway> =
        Arc::new(HttpGateway::new(client, settings.target_url.clone()));
    let stats = Arc::new(ResultAggregator::default());
    let controller = Controller::new(gateway, stats.clone(), settings.concurrency);

    info!(
        "Starting load test against {} for {}s with concurrency limit {}",
        settings.target_url, settings.duration_secs, settings.concurrency
    );

    tokio::select! {
        launched = controller.run(Duration::from_secs(settings.duration_secs)) => {
            info!("Load test finished after {} requests", launched);
        }
        _ = shutdown => {
            warn!("Load test interrupted, abandoning in-flight requests");
            return Err(RunError::Interrupted);
        }
    }

    Ok(stats.snapshot())
}
