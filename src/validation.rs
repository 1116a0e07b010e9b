use crate::error::{DistanceError, Result};
use crate::models::LocationQuery;

/// Accept the pair only when both fields have non-whitespace content.
///
/// The strings are kept exactly as typed; trimming only decides emptiness.
pub fn validate_query(origin: &str, destination: &str) -> Result<LocationQuery> {
    if origin.trim().is_empty() || destination.trim().is_empty() {
        tracing::debug!("Rejected query with empty origin or destination");
        return Err(DistanceError::Validation);
    }
    Ok(LocationQuery {
        origin: origin.to_string(),
        destination: destination.to_string(),
    })
}
