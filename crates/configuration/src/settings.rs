use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;

/// The fraction of the selling price assumed to be the cost of goods.
///
/// This is a stated business assumption, not something derived from the data.
/// Override it with `analysis.cost_ratio` in `config.toml`.
pub const DEFAULT_COST_RATIO: Decimal = Decimal::from_parts(65, 0, 0, false, 2);

/// The box-plot fence multiplier applied to the interquartile range.
pub const DEFAULT_OUTLIER_FENCE: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dataset: DatasetConfig,
    pub cleaning: CleaningConfig,
    pub analysis: AnalysisSettings,
    pub insights: InsightSettings,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Where the order export lives and what shape it is in.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Path to the order CSV.
    pub path: PathBuf,
    /// `true` when `path` points at the raw marketplace export that still
    /// needs cleaning, `false` for an already-cleaned canonical snapshot.
    pub raw: bool,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/Cleaned_Amazon_Sale_Report.csv"),
            raw: false,
        }
    }
}

/// Rules used when turning the raw export into the canonical table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Drop rows that are exact duplicates of an earlier row.
    pub drop_duplicates: bool,
    /// Currency assumed for lines that do not state one.
    pub default_currency: String,
    /// Sentinel for a missing courier status.
    pub default_courier_status: String,
    /// Sentinel for a missing promotion id.
    pub default_promotion: String,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            drop_duplicates: true,
            default_currency: "INR".to_string(),
            default_courier_status: "Pending".to_string(),
            default_promotion: "No Promotion".to_string(),
        }
    }
}

/// Parameters of the KPI calculations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Assumed cost as a fraction of the selling price (0.65 means 65%).
    pub cost_ratio: Decimal,
    /// Multiplier applied to the IQR when fencing outliers.
    pub outlier_fence: Decimal,
    /// How many entries ranked breakdowns show by default.
    pub top_n: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            cost_ratio: DEFAULT_COST_RATIO,
            outlier_fence: DEFAULT_OUTLIER_FENCE,
            top_n: 10,
        }
    }
}

/// Thresholds for the rule-based insights.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InsightSettings {
    /// Cancellation rate (percent) above which the rate is flagged as unhealthy.
    pub cancellation_warning_pct: Decimal,
    /// Cancellation rate (percent) above which a reduction is recommended.
    pub cancellation_recommend_pct: Decimal,
    /// B2B revenue share (percent) below which B2B expansion is recommended.
    pub b2b_expansion_pct: Decimal,
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            cancellation_warning_pct: Decimal::from(15),
            cancellation_recommend_pct: Decimal::from(10),
            b2b_expansion_pct: Decimal::from(20),
        }
    }
}

/// How the CLI renders its results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}
