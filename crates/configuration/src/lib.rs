use rust_decimal::Decimal;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use settings::{
    AnalysisSettings, CleaningConfig, Config, DatasetConfig, InsightSettings, LoggingConfig,
    OutputConfig, OutputFormat, DEFAULT_COST_RATIO, DEFAULT_OUTLIER_FENCE,
};

/// The file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Loads the application configuration.
///
/// Sources, lowest precedence first: built-in defaults, the TOML file, then
/// environment variables prefixed with `KPI` (`KPI_ANALYSIS__COST_RATIO=0.6`).
/// An explicitly passed file must exist; the default `config.toml` is optional.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.display().to_string()));
            }
            config::File::from(path).required(true)
        }
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix("KPI")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    tracing::debug!(?config, "Configuration loaded.");
    Ok(config)
}

/// Rejects settings that would make the calculations meaningless.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let analysis = &config.analysis;
    if analysis.cost_ratio < Decimal::ZERO || analysis.cost_ratio >= Decimal::ONE {
        return Err(ConfigError::ValidationError(format!(
            "analysis.cost_ratio must be in [0, 1), got {}",
            analysis.cost_ratio
        )));
    }
    if analysis.outlier_fence <= Decimal::ZERO {
        return Err(ConfigError::ValidationError(format!(
            "analysis.outlier_fence must be positive, got {}",
            analysis.outlier_fence
        )));
    }
    if analysis.top_n == 0 {
        return Err(ConfigError::ValidationError(
            "analysis.top_n must be at least 1".to_string(),
        ));
    }
    if config.cleaning.default_currency.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "cleaning.default_currency must not be empty".to_string(),
        ));
    }
    Ok(())
}
