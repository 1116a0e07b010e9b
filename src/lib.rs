pub mod adapter;
pub mod config;
pub mod error;
pub mod http;
pub mod locator;
pub mod models;
pub mod prompt;
pub mod render;
pub mod shell;
pub mod terminal;
pub mod transport;
pub mod validation;

use std::sync::Arc;

use crate::adapter::{DistanceEstimator, GeminiDistance};
use crate::config::Config;
use crate::error::TransportError;
use crate::shell::Shell;
use crate::transport::{GeminiTransport, Transport};

/// Estimator and shell wired from configuration.
pub struct MapDistance {
    pub estimator: Arc<dyn DistanceEstimator>,
    pub shell: Shell,
}

impl MapDistance {
    pub fn new(cfg: &Config) -> Result<Self, TransportError> {
        if cfg.api_key().is_none() {
            tracing::warn!("No Gemini API key configured - every request will fail");
        }
        let transport = Arc::new(GeminiTransport::with_base_url(
            cfg.api_key(),
            cfg.gemini.base_url.clone(),
            cfg.get_request_timeout(),
        )?);

        let estimator: Arc<dyn DistanceEstimator> = Arc::new(GeminiDistance::from_config(
            Arc::clone(&transport) as Arc<dyn Transport>,
            cfg,
        ));

        Ok(Self {
            shell: Shell::new(Arc::clone(&estimator)),
            estimator,
        })
    }
}
