//! Server state and configuration.

use std::path::{Component, Path, PathBuf};

use crate::config::RenderConfig;
use crate::error::LabelError;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Directory that request paths are resolved against
    pub asset_root: PathBuf,
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub render: RenderConfig,
}

impl AppState {
    pub fn new(config: ServerConfig, render: RenderConfig) -> Self {
        Self { config, render }
    }

    /// Resolve a request path inside the asset directory.
    ///
    /// Only plain relative paths are accepted: absolute paths, `..` and
    /// prefix components are rejected.
    pub fn resolve_asset(&self, relative: &Path) -> Result<PathBuf, LabelError> {
        if relative.as_os_str().is_empty() {
            return Err(LabelError::InvalidPath("empty path".to_string()));
        }

        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => {
                    return Err(LabelError::InvalidPath(format!(
                        "{} must be relative to the asset directory",
                        relative.display()
                    )));
                }
            }
        }

        Ok(self.config.asset_root.join(relative))
    }
}
