use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::Instrument;

use crate::config::{Config, OutputFormat};
use crate::error::{DistanceError, Result, TransportError};
use crate::models::{
    CalculationResult, Content, DeviceCoordinate, GenerateContentRequest,
    GenerateContentResponse, GenerationConfig, GroundingSource, LocationQuery, RetrievalConfig,
    Tool, ToolConfig,
};
use crate::prompt::build_prompt;
use crate::transport::Transport;

pub const EMPTY_TEXT_FALLBACK: &str =
    "Não foi possível gerar um resumo textual, mas verifique as fontes abaixo para mais detalhes no mapa.";
pub const MAPS_SOURCE_LABEL: &str = "Localização no Google Maps";
pub const WEB_SOURCE_LABEL: &str = "Fonte Web";

static TOTAL_KM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Total KM:\s*\d+(?:[.,]\d+)?").expect("Total KM pattern is valid")
});

#[async_trait]
pub trait DistanceEstimator: Send + Sync {
    async fn compute_distance(
        &self,
        query: &LocationQuery,
        coordinate: DeviceCoordinate,
    ) -> Result<CalculationResult>;
}

/// Everything that differs between the two answer styles.
#[derive(Debug, Clone, Copy)]
struct Profile {
    tools: &'static [Tool],
    temperature: f32,
    join: &'static str,
    extract_total_km: bool,
    web_sources: bool,
    distinguish_not_found: bool,
}

const PROSE: Profile = Profile {
    tools: &[Tool::GoogleMaps {}, Tool::GoogleSearch {}],
    temperature: 0.7,
    join: "\n",
    extract_total_km: false,
    web_sources: true,
    distinguish_not_found: true,
};

const TERSE: Profile = Profile {
    tools: &[Tool::GoogleMaps {}],
    temperature: 0.0,
    join: "",
    extract_total_km: true,
    web_sources: false,
    distinguish_not_found: false,
};

impl From<OutputFormat> for Profile {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Prose => PROSE,
            OutputFormat::Terse => TERSE,
        }
    }
}

pub struct GeminiDistance {
    tx: Arc<dyn Transport>,
    model: String,
    format: OutputFormat,
    language: String,
}

impl GeminiDistance {
    pub fn new(tx: Arc<dyn Transport>, model: String, format: OutputFormat, language: String) -> Self {
        Self {
            tx,
            model,
            format,
            language,
        }
    }

    pub fn from_config(tx: Arc<dyn Transport>, cfg: &Config) -> Self {
        Self::new(
            tx,
            cfg.gemini.model.clone(),
            cfg.adapter.format,
            cfg.adapter.language.clone(),
        )
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    fn build_request(&self, query: &LocationQuery, coordinate: DeviceCoordinate) -> GenerateContentRequest {
        let profile = Profile::from(self.format);
        GenerateContentRequest {
            contents: vec![Content::user_text(build_prompt(
                self.format,
                query,
                &self.language,
            ))],
            tools: profile.tools.to_vec(),
            tool_config: coordinate.lat_lng().map(|lat_lng| ToolConfig {
                retrieval_config: RetrievalConfig { lat_lng },
            }),
            generation_config: Some(GenerationConfig {
                temperature: profile.temperature,
            }),
        }
    }

    fn classify(&self, err: &TransportError) -> DistanceError {
        if Profile::from(self.format).distinguish_not_found && err.is_not_found() {
            DistanceError::NotFound
        } else {
            DistanceError::Request
        }
    }
}

#[async_trait]
impl DistanceEstimator for GeminiDistance {
    async fn compute_distance(
        &self,
        query: &LocationQuery,
        coordinate: DeviceCoordinate,
    ) -> Result<CalculationResult> {
        let span = tracing::info_span!(
            "compute_distance",
            request_id = %uuid::Uuid::new_v4(),
            format = ?self.format
        );

        async {
            tracing::info!(
                "Requesting distance from '{}' to '{}' (location bias: {})",
                query.origin,
                query.destination,
                coordinate.lat_lng().is_some()
            );

            let request = self.build_request(query, coordinate);
            match self.tx.generate(&self.model, &request).await {
                Ok(response) => {
                    let result = normalize_response(self.format, &response);
                    tracing::info!("Received answer with {} source(s)", result.sources.len());
                    Ok(result)
                }
                Err(e) => {
                    tracing::error!("Gemini API error details: {:?}", e);
                    Err(self.classify(&e))
                }
            }
        }
        .instrument(span)
        .await
    }
}

/// Turn a raw reply into the text and citations shown to the user.
pub fn normalize_response(format: OutputFormat, response: &GenerateContentResponse) -> CalculationResult {
    let profile = Profile::from(format);

    let text = match response.text().filter(|t| !t.is_empty()) {
        Some(text) => text,
        None => {
            let joined = response.text_fragments().join(profile.join);
            if profile.join.is_empty() {
                joined.trim().to_string()
            } else {
                joined
            }
        }
    };

    let text = if profile.extract_total_km {
        match TOTAL_KM.find(&text) {
            Some(m) => m.as_str().to_string(),
            None => text.trim().to_string(),
        }
    } else {
        text
    };

    let text = if text.is_empty() {
        EMPTY_TEXT_FALLBACK.to_string()
    } else {
        text
    };

    CalculationResult {
        text,
        sources: collect_sources(response, profile.web_sources),
    }
}

fn collect_sources(response: &GenerateContentResponse, include_web: bool) -> Vec<GroundingSource> {
    let mut sources = Vec::new();
    for chunk in response.grounding_chunks() {
        let (citation, label) = match (&chunk.maps, &chunk.web) {
            (Some(maps), _) => (maps, MAPS_SOURCE_LABEL),
            (None, Some(web)) if include_web => (web, WEB_SOURCE_LABEL),
            _ => continue,
        };
        let Some(uri) = citation.uri.clone() else {
            tracing::debug!("Skipping grounding chunk without uri");
            continue;
        };
        let title = citation
            .title
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| label.to_string());
        sources.push(GroundingSource {
            title: Some(title),
            uri,
        });
    }
    sources
}
