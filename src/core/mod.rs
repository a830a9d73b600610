mod collector;
mod declaration;
mod dot;
mod engine;
mod extractor;
mod graph;
mod label;
mod render;
mod resolver;

pub use collector::SourceCollector;
pub use declaration::{
    AnnotationKind, Declaration, DeclarationKind, Edge, EdgeKind, Member, MemberKind, SourceUnit,
    Visibility,
};
pub use dot::GraphSerializer;
pub use extractor::DeclarationExtractor;
pub use graph::{Graph, GraphAssembler};
pub use label::{escape_label, LabelRenderer};
pub use render::{RenderOutcome, Renderer};
pub use resolver::{ReferenceResolver, StructuralResolver, TextualResolver};

pub use engine::Engine;
