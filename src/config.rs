use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Error level analysis settings. Thresholds are advisory cut-offs for the
/// assessment text, not verdict boundaries.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ElaConfig {
    /// JPEG quality used for the recompression pass (1-100).
    pub quality: u8,
    /// Mean difference below this reads as low error level variance.
    pub low_threshold: f64,
    /// Mean difference above this reads as high error level variance.
    pub high_threshold: f64,
    /// Write an amplified difference image next to the report.
    pub save_visualization: bool,
    /// Multiplier applied to difference values in the visualization.
    pub amplification: u16,
}

impl Default for ElaConfig {
    fn default() -> Self {
        ElaConfig {
            quality: 90,
            low_threshold: 5.0,
            high_threshold: 12.0,
            save_visualization: false,
            amplification: 10,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub output_directory: String,
    pub report_formats: Vec<String>,
    pub hash_algorithms: Vec<String>,
    pub allowed_extensions: HashSet<String>,
    pub num_workers: usize,
    pub log_level: String,
    pub ela: ElaConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            output_directory: "reports".to_string(),
            report_formats: vec!["json".to_string(), "text".to_string()],
            hash_algorithms: vec![
                "md5".to_string(),
                "sha1".to_string(),
                "sha256".to_string(),
                "sha512".to_string(),
                "blake2b".to_string(),
                "blake2s".to_string(),
            ],
            allowed_extensions: [
                "jpg", "jpeg", "png", "tif", "tiff", "webp", "heic", "heif", "dng", "gif",
                "bmp",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            num_workers: 4,
            log_level: "info".to_string(),
            ela: ElaConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration: built-in defaults, overlaid by config/default,
    /// config/{RUN_MODE} and config/local when present.
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            .build()?;

        s.try_deserialize()
    }
}
