use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ClassdotError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source collection settings
    pub collection: CollectionConfig,

    /// Extraction settings
    pub extraction: ExtractionConfig,

    /// Relationship resolution settings
    pub resolution: ResolutionConfig,

    /// Graph assembly and output settings
    pub graph: GraphConfig,

    /// Downstream rendering settings
    pub render: RenderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Directory names excluded from the walk
    pub ignore_dirs: Vec<String>,

    /// File-name suffixes excluded from the walk
    pub ignore_file_patterns: Vec<String>,

    /// Maximum file size to parse (in bytes)
    pub max_file_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Abort the run on the first file that fails to parse instead of
    /// skipping it with a warning
    pub fail_fast: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionConfig {
    /// Emit containment edges from NgModule declaration metadata
    pub structural: bool,

    /// Emit reference edges from textual import/usage heuristics
    pub textual: bool,
}

/// What to do when two files declare same-named classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Keep the first declaration seen, warn about later ones (default)
    FirstWins,
    /// Fail the run
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Name used in the digraph header
    pub name: String,

    /// Node attribute line emitted after the header
    pub node_attributes: String,

    /// Same-name declaration policy
    pub collision_policy: CollisionPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Whether to invoke the external layout tool at all
    pub enabled: bool,

    /// Image formats passed to `dot -T<format>`
    pub formats: Vec<String>,

    /// Open the first rendered image with the platform viewer
    pub open_image: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collection: CollectionConfig {
                ignore_dirs: vec![
                    "node_modules".to_string(),
                    ".git".to_string(),
                    "dist".to_string(),
                ],
                ignore_file_patterns: vec![
                    ".spec.ts".to_string(),
                    ".test.ts".to_string(),
                    ".d.ts".to_string(),
                ],
                max_file_size: 1024 * 1024, // 1MB
            },
            extraction: ExtractionConfig { fail_fast: false },
            resolution: ResolutionConfig {
                structural: true,
                textual: true,
            },
            graph: GraphConfig {
                name: "G".to_string(),
                node_attributes: "node [shape=record fontname=Arial];".to_string(),
                collision_policy: CollisionPolicy::FirstWins,
            },
            render: RenderConfig {
                enabled: true,
                formats: vec!["png".to_string(), "pdf".to_string(), "svg".to_string()],
                open_image: false,
            },
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| ClassdotError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ClassdotError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                let candidates = ["Classdot.toml", "classdot.toml", ".classdot.toml"];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }
}
