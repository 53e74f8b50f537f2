//! Prometheus metrics exposition
//!
//! The pool library emits through the `metrics` facade:
//!
//! - `token_pool_selections_total` (counter)
//! - `token_pool_resets_total` (counter)
//! - `token_pool_reported_usage_total` (counter)
//! - `token_pool_tokens` (gauge)
//!
//! The driver installs a recorder so those can be rendered after a run.

use anyhow::Context;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering metrics.
///
/// Must run before the pool is constructed, otherwise the size gauge is lost.
pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus recorder")
}

#[cfg(test)]
mod tests {
    use token_pool::{SharedTokenPool, SimulationMode, TokenPool};

    use super::*;

    #[tokio::test]
    async fn simulated_run_renders_pool_metrics() {
        // build_recorder() avoids the process-wide recorder singleton
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let _guard = metrics::set_default_local_recorder(&recorder);

        let pool = SharedTokenPool::new(TokenPool::new(10).unwrap());
        pool.simulate(5, SimulationMode::CallerIncrement).await.unwrap();

        let output = handle.render();
        assert!(
            output.contains("token_pool_tokens 10"),
            "size gauge must be rendered, got: {output}"
        );
        assert!(
            output.contains("token_pool_selections_total 5"),
            "selection counter must be rendered, got: {output}"
        );
        assert!(
            output.contains("token_pool_reported_usage_total 5"),
            "caller increments must be counted separately, got: {output}"
        );
    }
}
