use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub provider: ProviderSettings,
    pub pipeline: PipelineSettings,
    pub server: ServerSettings,
}

/// Where and how to reach the typed-record provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    /// Base URL of the provider's REST endpoint (no trailing slash).
    pub base_url: String,
    /// Page size for range pagination. A page shorter than this signals the
    /// last page, so it must stay constant for the life of a request loop.
    pub page_size: usize,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

/// Batch pipeline tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSettings {
    /// How many ratio rows to upsert per write batch.
    pub write_batch_size: usize,
}

/// Bind address for the peer-comparison query surface.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}
