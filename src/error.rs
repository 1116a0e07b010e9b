use serde::Serialize;
use thiserror::Error;

pub const VALIDATION_MESSAGE: &str = "Por favor, informe a origem e o destino.";
pub const NOT_FOUND_MESSAGE: &str =
    "O modelo de IA não foi encontrado. Por favor, tente novamente mais tarde.";
pub const REQUEST_MESSAGE: &str =
    "Erro ao calcular a distância. Verifique sua conexão ou tente outros nomes de cidades.";

/// User-facing failures. The `Display` text is what the UI shows verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DistanceError {
    #[error("{}", VALIDATION_MESSAGE)]
    Validation,

    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,

    #[error("{}", REQUEST_MESSAGE)]
    Request,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Request,
}

impl DistanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DistanceError::Validation => ErrorKind::Validation,
            DistanceError::NotFound => ErrorKind::NotFound,
            DistanceError::Request => ErrorKind::Request,
        }
    }
}

/// Failures of the outbound call to the generative API.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Gemini API key is not configured")]
    MissingApiKey,

    // Structured error body returned with a non-success status
    #[error("Gemini API error (HTTP {status}, {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Underlying request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode Gemini response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl TransportError {
    /// Whether the upstream reported the model or resource as missing.
    ///
    /// Structured API errors are judged by their status alone; anything
    /// else falls back to looking at the message text.
    pub fn is_not_found(&self) -> bool {
        match self {
            TransportError::Api { status, code, .. } => *status == 404 || code == "NOT_FOUND",
            TransportError::Http(e) if e.status().is_some_and(|s| s.as_u16() == 404) => true,
            other => {
                let message = other.to_string();
                message.contains("404") || message.to_lowercase().contains("not found")
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, DistanceError>;
