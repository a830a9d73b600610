use std::path::{Path, PathBuf};
use anyhow::Result;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::ClassdotError;
use super::collector::SourceCollector;
use super::declaration::{AnnotationKind, Declaration, DeclarationKind, Edge, SourceUnit};
use super::dot::GraphSerializer;
use super::extractor::DeclarationExtractor;
use super::graph::{Graph, GraphAssembler};
use super::render::Renderer;
use super::resolver::{ReferenceResolver, StructuralResolver, TextualResolver};

/// Main orchestration engine: collects sources, extracts declarations,
/// resolves edges against the complete node set, assembles the graph and
/// serializes it. One sequential pass; the graph is built and written
/// exactly once per run.
pub struct Engine {
    config: Config,
    collector: SourceCollector,
    extractor: DeclarationExtractor,
    serializer: GraphSerializer,
    renderer: Renderer,
}

impl Engine {
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;
        debug!("Loaded configuration: {:?}", config);

        let collector = SourceCollector::new(&config.collection);
        let extractor = DeclarationExtractor::new()?;
        let serializer = GraphSerializer::new(&config.graph)?;
        let renderer = Renderer::new(&config.render);

        Ok(Self {
            config,
            collector,
            extractor,
            serializer,
            renderer,
        })
    }

    /// Run the full pipeline and write the DOT description, then hand the
    /// written file to the downstream renderer. Render failures never
    /// affect the exit status.
    pub async fn generate(
        &mut self,
        source_root: PathBuf,
        output: Option<PathBuf>,
        no_render: bool,
        model_json: Option<PathBuf>,
    ) -> Result<()> {
        let dot_path = output.unwrap_or_else(|| source_root.with_extension("dot"));

        let (graph, dot_text) = self.build_graph(&source_root)?;
        info!(
            "Assembled graph: {} nodes, {} edges",
            graph.nodes.len(),
            graph.edges.len()
        );

        std::fs::write(&dot_path, &dot_text).map_err(ClassdotError::Io)?;
        info!("UML diagram dotfile generated: {}", dot_path.display());

        if let Some(model_path) = model_json {
            let model = serde_json::to_string_pretty(&graph.nodes)
                .map_err(ClassdotError::Serialization)?;
            std::fs::write(&model_path, model).map_err(ClassdotError::Io)?;
            info!("Declaration model written: {}", model_path.display());
        }

        if self.config.render.enabled && !no_render {
            let output_dir = dot_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            self.renderer.render_formats(&dot_path, &output_dir).await;
        }

        Ok(())
    }

    /// The core pipeline, synchronous from collection through
    /// serialization
    pub fn build_graph(&mut self, source_root: &Path) -> Result<(Graph, String)> {
        let files = self.collector.collect(source_root)?;
        info!("Analyzing {} source files under {}", files.len(), source_root.display());

        let mut units = Vec::with_capacity(files.len());
        for path in files {
            let text = std::fs::read_to_string(&path).map_err(ClassdotError::Io)?;
            units.push(SourceUnit { path, text });
        }

        // Pass 1: collect the complete declaration set
        let mut declarations: Vec<Declaration> = Vec::new();
        for unit in &units {
            match self.extractor.extract(unit) {
                Ok(mut extracted) => declarations.append(&mut extracted),
                Err(e) if self.config.extraction.fail_fast => return Err(e.into()),
                Err(e) => warn!("Skipping {}: {}", unit.path.display(), e),
            }
        }

        let components = declarations
            .iter()
            .filter(|d| {
                d.annotations.iter().any(|a| {
                    matches!(
                        a,
                        AnnotationKind::Component | AnnotationKind::Directive | AnnotationKind::Pipe
                    )
                })
            })
            .count();
        let modules = declarations
            .iter()
            .filter(|d| d.kind == DeclarationKind::Module)
            .count();
        info!(
            "Extracted {} declarations ({} annotated components, {} modules)",
            declarations.len(),
            components,
            modules
        );

        // Pass 2: resolve edges against the complete node set
        let mut edges: Vec<Edge> = Vec::new();
        if self.config.resolution.structural {
            edges.extend(StructuralResolver.resolve(&declarations, &units)?);
        }
        if self.config.resolution.textual {
            let textual = TextualResolver::new()?;
            edges.extend(textual.resolve(&declarations, &units)?);
        }

        let assembler = GraphAssembler::new(self.config.graph.collision_policy);
        let graph = assembler.assemble(declarations, edges)?;
        let dot_text = self.serializer.serialize(&graph);

        Ok((graph, dot_text))
    }
}
