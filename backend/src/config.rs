use std::env;
use std::path::PathBuf;

use shared::ModelFamily;

#[derive(Debug, Clone)]
pub struct ArtifactConfig {
    pub family: ModelFamily,
    pub path: PathBuf,
    /// One-time provisioning source used only when `path` is absent.
    pub url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub mobilenet: ArtifactConfig,
    pub efficientnet: ArtifactConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = env::var("PORT").unwrap_or_else(|_| "8081".to_string());
        let bind_address = format!("0.0.0.0:{}", port);
        let model_dir = env::var("MODEL_DIR").unwrap_or_else(|_| "model".to_string());

        AppConfig {
            bind_address,
            mobilenet: artifact_from_env(
                ModelFamily::Mobilenet,
                &model_dir,
                "MOBILENET_MODEL_PATH",
                "MOBILENET_MODEL_URL",
                "brain_tumor_mobilenet.pt",
            ),
            efficientnet: artifact_from_env(
                ModelFamily::Efficientnet,
                &model_dir,
                "EFFICIENTNET_MODEL_PATH",
                "EFFICIENTNET_MODEL_URL",
                "brain_tumor_efficientnet.pt",
            ),
        }
    }
}

fn artifact_from_env(
    family: ModelFamily,
    model_dir: &str,
    path_var: &str,
    url_var: &str,
    default_file: &str,
) -> ArtifactConfig {
    let path = env::var(path_var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(model_dir).join(default_file));
    let url = env::var(url_var).ok().filter(|url| !url.is_empty());
    ArtifactConfig { family, path, url }
}
