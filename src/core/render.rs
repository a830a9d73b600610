use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{info, warn};

use crate::config::RenderConfig;

/// Result of one layout-tool invocation. Failures are reported, never
/// propagated: the DOT file is already on disk by the time rendering
/// starts.
#[derive(Debug)]
pub struct RenderOutcome {
    pub format: String,
    pub output_path: PathBuf,
    pub result: std::result::Result<(), String>,
}

/// Invokes the external `dot` binary once per configured image format,
/// and optionally opens the first rendered image with the platform
/// viewer. Entirely outside the core pipeline: the run's exit status
/// never depends on these outcomes.
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub async fn render_formats(&self, dot_path: &Path, output_dir: &Path) -> Vec<RenderOutcome> {
        let mut outcomes = Vec::new();

        for format in &self.config.formats {
            let output_path = output_dir.join(format!("output.{}", format));
            let outcome = Self::render_one(dot_path, &output_path, format).await;

            match &outcome.result {
                Ok(()) => info!("Generated {} file: {}", format, outcome.output_path.display()),
                Err(e) => warn!("Graphviz {} rendering failed: {}", format, e),
            }
            outcomes.push(outcome);
        }

        if self.config.open_image {
            if let Some(rendered) = outcomes.iter().find(|o| o.result.is_ok()) {
                Self::open_image(&rendered.output_path).await;
            }
        }

        outcomes
    }

    async fn render_one(dot_path: &Path, output_path: &Path, format: &str) -> RenderOutcome {
        let result = Command::new("dot")
            .arg(format!("-T{}", format))
            .arg("-o")
            .arg(output_path)
            .arg(dot_path)
            .output()
            .await;

        let result = match result {
            Ok(output) if output.status.success() => Ok(()),
            Ok(output) => Err(String::from_utf8_lossy(&output.stderr).trim().to_string()),
            Err(e) => Err(e.to_string()),
        };

        RenderOutcome {
            format: format.to_string(),
            output_path: output_path.to_path_buf(),
            result,
        }
    }

    async fn open_image(path: &Path) {
        let opener = if cfg!(target_os = "macos") {
            "open"
        } else if cfg!(target_os = "windows") {
            "explorer"
        } else {
            "xdg-open"
        };

        if let Err(e) = Command::new(opener).arg(path).spawn() {
            warn!("Error while opening the image: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn test_failed_render_reports_outcome_without_failing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default().render;
        config.formats = vec!["not-a-real-format".to_string()];
        config.open_image = false;

        let renderer = Renderer::new(&config);
        let outcomes = renderer
            .render_formats(&dir.path().join("missing.dot"), dir.path())
            .await;

        // Whether `dot` is installed or not, this invocation fails, and
        // the failure is captured instead of raised
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].format, "not-a-real-format");
        assert!(outcomes[0].result.is_err());
    }
}
