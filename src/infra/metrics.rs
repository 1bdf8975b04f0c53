use {
    crate::domain::vault::ActionType,
    prometheus_metric_storage::StorageRegistry,
    std::sync::LazyLock,
};

/// Metrics for the vault model.
#[derive(Debug, Clone, prometheus_metric_storage::MetricStorage)]
#[metric(subsystem = "vault_model")]
struct Metrics {
    /// Total number of simulated multicalls.
    multicalls: prometheus::IntCounter,

    /// Number of requests per multicall.
    #[metric(buckets(1, 2, 4, 8, 16, 32, 64))]
    multicall_requests: prometheus::Histogram,

    /// Errors that aborted a multicall.
    #[metric(labels("reason"))]
    multicall_errors: prometheus::IntCounterVec,

    /// Executed steps by action type.
    #[metric(labels("action"))]
    steps: prometheus::IntCounterVec,

    /// Pool fetches from the pool data provider.
    #[metric(labels("result"))]
    pool_fetches: prometheus::IntCounterVec,
}

static REGISTRY: LazyLock<StorageRegistry> =
    LazyLock::new(|| StorageRegistry::new(prometheus::Registry::new()));

pub fn multicall(requests: usize) {
    get().multicalls.inc();
    get().multicall_requests.observe(requests as f64);
}

pub fn multicall_error(reason: &str) {
    get().multicall_errors.with_label_values(&[reason]).inc();
}

pub fn step(action: ActionType) {
    get().steps.with_label_values(&[action.as_str()]).inc();
}

pub fn pool_fetch(success: bool) {
    let result = if success { "success" } else { "failure" };
    get().pool_fetches.with_label_values(&[result]).inc();
}

/// The registry all vault model metrics are registered with.
pub fn registry() -> &'static prometheus::Registry {
    REGISTRY.registry()
}

/// Get the metrics instance.
fn get() -> &'static Metrics {
    Metrics::instance(&REGISTRY).expect("unexpected error getting metrics instance")
}
