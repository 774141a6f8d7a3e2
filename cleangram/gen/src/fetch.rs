//! Retrieval of the reference document.
//!
//! The document is loaded exactly once per run and fully materialized before
//! extraction starts. A source beginning with `http://` or `https://` is
//! downloaded; anything else is read from disk.

use tracing::info;

use crate::errors::GeneratorError;

/// Default location of the reference page.
pub const DEFAULT_SOURCE: &str = "https://core.telegram.org/bots/api";

/// True when `source` names a remote document.
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Loads the reference document from a URL or a file path.
///
/// ## Errors
///
/// Returns `GeneratorError::FetchError` if the request fails, the server
/// answers with an error status, or the file cannot be read.
pub async fn load_document(source: &str) -> Result<String, GeneratorError> {
    let failed = |reason: String| GeneratorError::FetchError {
        source_ref: source.to_string(),
        reason,
    };

    let html = if is_remote(source) {
        let response = reqwest::get(source)
            .await
            .map_err(|e| failed(e.to_string()))?
            .error_for_status()
            .map_err(|e| failed(e.to_string()))?;
        response.text().await.map_err(|e| failed(e.to_string()))?
    } else {
        tokio::fs::read_to_string(source)
            .await
            .map_err(|e| failed(e.to_string()))?
    };

    info!("Loaded reference document from {} ({} bytes)", source, html.len());
    Ok(html)
}
