//! Application configuration.
//!
//! Configuration is an explicit object resolved once at startup: a TOML file
//! (`bloomwatch.toml`) provides the base, environment variables overlay
//! credentials and paths on top. Every defaultable field has its default
//! applied at load time so the rest of the crate never falls back at call
//! sites.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default evalscript for the statistics request.
///
/// Produces two outputs per aggregation interval: `indices` with three bands
/// (B0 = NDVI, B1 = NDWI, B2 = NDRE) and `cloud_info` with the cloudy-pixel
/// fraction. Pixels flagged cloud/snow by the scene classification layer
/// (SCL classes 8-11) are masked to NaN, as are zero-denominator ratios.
pub const INDICES_EVALSCRIPT: &str = r#"//VERSION=3
function setup(){
  return {
    input: [{bands: ["B03", "B04", "B05", "B08", "SCL"]}],
    output: [
      {id: "indices", bands: 3, sampleType: "FLOAT32"},
      {id: "cloud_info", bands: 1, sampleType: "FLOAT32"}
    ]
  };
}
function clear(s){ return ![8, 9, 10, 11].includes(s.SCL); }
function evaluatePixel(s){
  if (!clear(s)) return {indices: [NaN, NaN, NaN], cloud_info: [1]};
  var ndviD = s.B08 + s.B04;
  var ndwiD = s.B03 + s.B08;
  var ndreD = s.B08 + s.B05;
  return {
    indices: [
      ndviD === 0 ? NaN : (s.B08 - s.B04) / ndviD,
      ndwiD === 0 ? NaN : (s.B03 - s.B08) / ndwiD,
      ndreD === 0 ? NaN : (s.B08 - s.B05) / ndreD
    ],
    cloud_info: [0]
  };
}"#;

/// Default evalscript for the land-cover process request.
///
/// Returns the raw scene classification codes (0-11) as a single UINT8 band.
pub const SCENE_CLASSIFICATION_EVALSCRIPT: &str = r#"//VERSION=3
function setup(){
  return {
    input: [{bands: ["SCL"]}],
    output: {bands: 1, sampleType: "UINT8"}
  };
}
function evaluatePixel(s){ return [s.SCL]; }"#;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("No bloomwatch.toml found in standard locations")]
    NotFound,
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub statistics: StatisticsConfig,
    #[serde(default)]
    pub process: ProcessConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
    #[serde(default)]
    pub geocode: GeocodeConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// OAuth client settings for token acquisition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// OAuth client id (client_credentials grant)
    #[serde(default)]
    pub client_id: String,
    /// OAuth client secret
    #[serde(default)]
    pub client_secret: String,
    /// Ordered token endpoints, tried in sequence until one succeeds
    #[serde(default = "default_token_endpoints")]
    pub token_endpoints: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            token_endpoints: default_token_endpoints(),
        }
    }
}

/// Statistics API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsConfig {
    #[serde(default = "default_statistics_url")]
    pub url: String,
    /// Evalscript producing the `indices` and `cloud_info` outputs
    #[serde(default = "default_indices_evalscript")]
    pub evalscript: String,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            url: default_statistics_url(),
            evalscript: default_indices_evalscript(),
        }
    }
}

/// Process API (land-cover) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessConfig {
    #[serde(default = "default_process_url")]
    pub url: String,
    /// Evalscript for the classification raster
    #[serde(default = "default_classification_evalscript")]
    pub evalscript: String,
    #[serde(default = "default_raster_size")]
    pub width: u32,
    #[serde(default = "default_raster_size")]
    pub height: u32,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            url: default_process_url(),
            evalscript: default_classification_evalscript(),
            width: default_raster_size(),
            height: default_raster_size(),
        }
    }
}

/// WMS overlay settings.
///
/// The overlay is optional: without an instance id the overlay URL cannot be
/// built and callers disable the layer instead of failing the analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Sentinel Hub WMS instance id
    #[serde(default)]
    pub instance_id: Option<String>,
    #[serde(default = "default_wms_base_url")]
    pub base_url: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            instance_id: None,
            base_url: default_wms_base_url(),
        }
    }
}

/// Reverse geocoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeConfig {
    #[serde(default = "default_geocode_url")]
    pub url: String,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            url: default_geocode_url(),
        }
    }
}

/// History store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the JSON history document (file-store backend)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_token_endpoints() -> Vec<String> {
    vec![
        "https://identity.dataspace.copernicus.eu/auth/realms/CDSE/protocol/openid-connect/token"
            .to_string(),
        "https://services.sentinel-hub.com/oauth/token".to_string(),
    ]
}

fn default_statistics_url() -> String {
    "https://sh.dataspace.copernicus.eu/api/v1/statistics".to_string()
}

fn default_process_url() -> String {
    "https://sh.dataspace.copernicus.eu/api/v1/process".to_string()
}

fn default_wms_base_url() -> String {
    "https://sh.dataspace.copernicus.eu/ogc/wms".to_string()
}

fn default_geocode_url() -> String {
    "https://nominatim.openstreetmap.org/reverse".to_string()
}

fn default_indices_evalscript() -> String {
    INDICES_EVALSCRIPT.to_string()
}

fn default_classification_evalscript() -> String {
    SCENE_CLASSIFICATION_EVALSCRIPT.to_string()
}

fn default_raster_size() -> u32 {
    512
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `bloomwatch.toml` in:
    /// 1. Current directory
    /// 2. `config/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let search_paths = vec![
            PathBuf::from("bloomwatch.toml"),
            PathBuf::from("config/bloomwatch.toml"),
            PathBuf::from("../bloomwatch.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(ConfigError::NotFound)
    }

    /// Resolve the effective configuration: file when present, environment
    /// variables overlaid on top. A missing file is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::from_default_location() {
            Ok(config) => config,
            Err(ConfigError::NotFound) => Self::default(),
            Err(e) => return Err(e),
        };
        config.apply_env();
        Ok(config)
    }

    /// Overlay environment variables onto this configuration. Blank values
    /// are ignored.
    ///
    /// # Environment Variables
    /// - `BLOOM_CLIENT_ID`: OAuth client id
    /// - `BLOOM_CLIENT_SECRET`: OAuth client secret
    /// - `BLOOM_TOKEN_ENDPOINTS`: comma-separated endpoint list override
    /// - `BLOOM_INSTANCE_ID`: WMS overlay instance id
    /// - `BLOOM_STORE_PATH`: history document path (file-store backend)
    pub fn apply_env(&mut self) {
        if let Ok(client_id) = env::var("BLOOM_CLIENT_ID") {
            if !client_id.is_empty() {
                self.auth.client_id = client_id;
            }
        }
        if let Ok(client_secret) = env::var("BLOOM_CLIENT_SECRET") {
            if !client_secret.is_empty() {
                self.auth.client_secret = client_secret;
            }
        }
        if let Ok(endpoints) = env::var("BLOOM_TOKEN_ENDPOINTS") {
            let endpoints: Vec<String> = endpoints
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !endpoints.is_empty() {
                self.auth.token_endpoints = endpoints;
            }
        }
        if let Ok(instance_id) = env::var("BLOOM_INSTANCE_ID") {
            if !instance_id.is_empty() {
                self.overlay.instance_id = Some(instance_id);
            }
        }
        if let Ok(path) = env::var("BLOOM_STORE_PATH") {
            if !path.is_empty() {
                self.store.path = Some(PathBuf::from(path));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_gets_all_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();

        assert_eq!(config.auth.token_endpoints.len(), 2);
        assert!(config.auth.token_endpoints[0].contains("dataspace.copernicus.eu"));
        assert_eq!(
            config.statistics.url,
            "https://sh.dataspace.copernicus.eu/api/v1/statistics"
        );
        assert_eq!(config.process.width, 512);
        assert!(config.overlay.instance_id.is_none());
        assert!(config.store.path.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[auth]
client_id = "my-client"
client_secret = "my-secret"
token_endpoints = ["https://auth.example.com/token"]

[statistics]
url = "https://stats.example.com"

[overlay]
instance_id = "abc123"

[store]
path = "history.json"
"#;

        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.auth.client_id, "my-client");
        assert_eq!(config.auth.token_endpoints.len(), 1);
        assert_eq!(config.statistics.url, "https://stats.example.com");
        // Unset fields still get their defaults
        assert!(!config.statistics.evalscript.is_empty());
        assert_eq!(config.overlay.instance_id.as_deref(), Some("abc123"));
        assert_eq!(config.store.path.as_deref(), Some(Path::new("history.json")));
    }

    #[test]
    fn test_default_evalscript_declares_both_outputs() {
        let config = StatisticsConfig::default();
        assert!(config.evalscript.contains("indices"));
        assert!(config.evalscript.contains("cloud_info"));
    }

    #[test]
    fn test_missing_file_is_distinct_error() {
        let result = AppConfig::from_file("/nonexistent/bloomwatch.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
