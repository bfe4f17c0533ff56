use crate::error::ConfigError;
use crate::settings::Settings;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{PipelineSettings, ProviderSettings, ServerSettings};

/// Loads the application configuration from the `config.toml` file, with
/// `PEERVIEW__*` environment variables layered on top (e.g.
/// `PEERVIEW__SERVER__PORT=8080`).
///
/// This function is the primary entry point for this crate. It reads the
/// configuration sources, deserializes them into our strongly-typed
/// `Settings` struct, validates the tunables, and returns the result.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .set_default("provider.base_url", "http://localhost:54321")?
        .set_default("provider.page_size", 1000)?
        .set_default("provider.request_timeout_secs", 30)?
        .set_default("pipeline.write_batch_size", 200)?
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3000)?
        // Tells the builder to look for a file named `config.toml`
        .add_source(config::File::with_name("config.toml").required(false))
        .add_source(config::Environment::with_prefix("PEERVIEW").separator("__"))
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;
    validate(&settings)?;

    Ok(settings)
}

fn validate(settings: &Settings) -> Result<(), ConfigError> {
    if settings.provider.page_size == 0 {
        return Err(ConfigError::Invalid(
            "provider.page_size must be greater than zero".to_string(),
        ));
    }
    if settings.pipeline.write_batch_size == 0 {
        return Err(ConfigError::Invalid(
            "pipeline.write_batch_size must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
