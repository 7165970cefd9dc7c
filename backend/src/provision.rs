use std::path::PathBuf;

use log::info;

use crate::config::ArtifactConfig;

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("artifact {} is missing and no download URL is configured", .0.display())]
    MissingArtifact(PathBuf),
    #[error("artifact download failed: {0}")]
    Download(#[from] reqwest::Error),
    #[error("artifact download from {url} returned status {status}")]
    BadStatus {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("failed to store artifact: {0}")]
    Io(#[from] std::io::Error),
}

/// Startup-only step: make sure the artifact file exists on disk, fetching
/// it once from the configured URL when absent. Never runs per-request.
pub async fn ensure_artifact(artifact: &ArtifactConfig) -> Result<(), ProvisionError> {
    if artifact.path.exists() {
        info!(
            "Found {} artifact at {}",
            artifact.family,
            artifact.path.display()
        );
        return Ok(());
    }

    let Some(url) = &artifact.url else {
        return Err(ProvisionError::MissingArtifact(artifact.path.clone()));
    };

    info!("Downloading {} artifact from {}", artifact.family, url);
    let response = reqwest::get(url).await?;
    if !response.status().is_success() {
        return Err(ProvisionError::BadStatus {
            url: url.clone(),
            status: response.status(),
        });
    }
    let bytes = response.bytes().await?;

    if let Some(parent) = artifact.path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&artifact.path, &bytes).await?;
    info!(
        "Stored {} artifact at {} ({} bytes)",
        artifact.family,
        artifact.path.display(),
        bytes.len()
    );
    Ok(())
}
