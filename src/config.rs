use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Main configuration structure for MapDistance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub adapter: AdapterConfig,
    pub location: LocationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    /// `http` or `terminal`
    pub surface: String,
    pub http_bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    pub format: OutputFormat,
    /// Language the answer must be written in, as named inside the prompt
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// `none`, `ip` or `fixed`
    pub provider: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    pub ip_lookup_url: String,
}

/// Profile selecting prompt, tools, temperature and parsing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Explanatory answer grounded on Maps and Search
    #[default]
    Prose,
    /// A single `Total KM: <n>` line grounded on Maps only
    Terse,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prose" | "verbose" => Ok(OutputFormat::Prose),
            "terse" | "km" => Ok(OutputFormat::Terse),
            other => Err(format!("Unknown output format: {other}")),
        }
    }
}

const PLACEHOLDER_API_KEY: &str = "PLACEHOLDER_GEMINI_API_KEY";

impl Config {
    /// Load configuration from file with environment variable overrides
    /// ALWAYS returns a valid config - never fails
    pub fn load() -> Self {
        let env_paths = ["../.env", ".env"];

        let mut env_loaded = false;
        for path in &env_paths {
            if dotenvy::from_path(path).is_ok() {
                tracing::info!("Loaded .env from: {}", path);
                env_loaded = true;
                break;
            }
        }

        if !env_loaded {
            tracing::warn!(
                "No .env file found in any expected location - continuing with env vars only"
            );
        }

        let config_path = env::var("MD_CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => match serde_yaml::from_str::<Config>(&contents) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from {}", config_path);
                        config
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to parse config file {}: {} - using defaults",
                            config_path,
                            e
                        );
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::error!(
                        "Failed to read config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }
            }
        } else {
            tracing::warn!("Config file not found at {} - using defaults", config_path);
            Self::default()
        };

        config.apply_overrides(|key| env::var(key).ok());

        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - continuing anyway", e);
        }

        config
    }

    /// Apply overrides from a key lookup (the process environment in `load`)
    fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(surface) = var("MD_SURFACE") {
            self.server.surface = surface;
        }
        if let Some(bind) = var("MD_HTTP_BIND") {
            self.server.http_bind = bind;
        }

        // Gemini overrides
        if let Some(api_key) = var("GEMINI_API_KEY").or_else(|| var("API_KEY")) {
            self.gemini.api_key = api_key;
        }
        if let Some(model) = var("GEMINI_MODEL") {
            self.gemini.model = model;
        }
        if let Some(base_url) = var("GEMINI_BASE_URL") {
            self.gemini.base_url = base_url;
        }
        if let Some(timeout) = var("GEMINI_TIMEOUT_SECONDS") {
            if let Ok(secs) = timeout.parse() {
                self.gemini.timeout_seconds = secs;
            }
        }

        // Adapter overrides
        if let Some(format) = var("MD_OUTPUT_FORMAT") {
            match format.parse() {
                Ok(f) => self.adapter.format = f,
                Err(e) => tracing::warn!("{} - keeping {:?}", e, self.adapter.format),
            }
        }
        if let Some(language) = var("MD_LANGUAGE") {
            self.adapter.language = language;
        }

        // Location overrides
        if let Some(provider) = var("MD_LOCATOR") {
            self.location.provider = provider;
        }
        if let Some(lat) = var("MD_DEVICE_LAT") {
            if let Ok(v) = lat.parse() {
                self.location.lat = Some(v);
            }
        }
        if let Some(lng) = var("MD_DEVICE_LNG") {
            if let Ok(v) = lng.parse() {
                self.location.lng = Some(v);
            }
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.gemini.api_key == PLACEHOLDER_API_KEY || self.gemini.api_key.is_empty() {
            return Err("GEMINI_API_KEY environment variable must be set".into());
        }

        if self.gemini.model.trim().is_empty() {
            return Err("gemini.model cannot be empty".into());
        }

        if self.gemini.timeout_seconds == 0 {
            return Err("gemini.timeout_seconds cannot be 0".into());
        }

        match self.server.surface.as_str() {
            "http" | "terminal" => {}
            other => return Err(format!("Unknown surface '{other}' (expected http|terminal)").into()),
        }

        match self.location.provider.as_str() {
            "none" | "ip" => {}
            "fixed" => {
                if self.location.lat.is_none() || self.location.lng.is_none() {
                    return Err("location.provider 'fixed' needs both lat and lng".into());
                }
            }
            other => {
                return Err(format!("Unknown location provider '{other}' (expected none|ip|fixed)").into());
            }
        }

        Ok(())
    }

    /// Key to hand to the transport; the placeholder counts as missing
    pub fn api_key(&self) -> Option<String> {
        let key = self.gemini.api_key.trim();
        if key.is_empty() || key == PLACEHOLDER_API_KEY {
            None
        } else {
            Some(key.to_string())
        }
    }

    /// Get request timeout as Duration
    pub fn get_request_timeout(&self) -> Duration {
        Duration::from_secs(self.gemini.timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "map-distance".to_string(),
                surface: "http".to_string(),
                http_bind: "127.0.0.1:8080".to_string(),
            },
            gemini: GeminiConfig {
                api_key: PLACEHOLDER_API_KEY.to_string(),
                model: "gemini-2.5-flash".to_string(),
                base_url: "https://generativelanguage.googleapis.com".to_string(),
                timeout_seconds: 60,
            },
            adapter: AdapterConfig {
                format: OutputFormat::Prose,
                language: "Português do Brasil".to_string(),
            },
            location: LocationConfig {
                provider: "ip".to_string(),
                lat: None,
                lng: None,
                ip_lookup_url: "http://ip-api.com/json".to_string(),
            },
        }
    }
}
