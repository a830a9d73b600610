use clap::Parser;
use std::path::PathBuf;
use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::core::Engine;

/// Log filter from `RUST_LOG` when set, otherwise from the verbose flag
pub fn log_filter(env_directives: Option<&str>, verbose: bool) -> EnvFilter {
    match env_directives {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::new(if verbose { "debug" } else { "info" }),
    }
}

#[derive(Parser)]
#[command(name = "classdot")]
#[command(about = "Generate UML-style Graphviz class diagrams from TypeScript source trees")]
#[command(version)]
pub struct Cli {
    /// Root of the TypeScript source tree to analyze.
    ///
    /// Optional at the clap level so its absence exits with code 1 as a
    /// plain usage error, checked in main.
    pub source_root: Option<PathBuf>,

    /// Output path for the DOT file (defaults to <source_root>.dot)
    pub output: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Skip invoking the external layout tool
    #[arg(long)]
    pub no_render: bool,

    /// Also write the extracted declaration model as JSON
    #[arg(long)]
    pub model_json: Option<PathBuf>,
}

impl Cli {
    pub async fn execute(self, mut engine: Engine) -> Result<()> {
        let source_root = self
            .source_root
            .ok_or_else(|| anyhow::anyhow!("source root path is required"))?;
        engine
            .generate(source_root, self.output, self.no_render, self.model_json)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_flag_drives_the_filter() {
        assert_eq!(log_filter(None, true).to_string(), "debug");
        assert_eq!(log_filter(None, false).to_string(), "info");
    }

    #[test]
    fn test_rust_log_overrides_verbose() {
        let filter = log_filter(Some("classdot=trace"), false);
        assert_eq!(filter.to_string(), "classdot=trace");
    }
}
