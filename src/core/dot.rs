use crate::config::GraphConfig;
use crate::error::Result;
use super::graph::Graph;
use super::label::LabelRenderer;

/// Renders the assembled graph as a Graphviz record-shaped digraph.
/// Nodes are emitted first in name order, then edges in sorted order, so
/// identical input always produces byte-identical output.
pub struct GraphSerializer {
    graph_name: String,
    node_attributes: String,
    labels: LabelRenderer,
}

impl GraphSerializer {
    pub fn new(config: &GraphConfig) -> Result<Self> {
        Ok(Self {
            graph_name: config.name.clone(),
            node_attributes: config.node_attributes.clone(),
            labels: LabelRenderer::new()?,
        })
    }

    pub fn serialize(&self, graph: &Graph) -> String {
        let mut lines = Vec::with_capacity(graph.nodes.len() + graph.edges.len() + 3);

        lines.push(format!("digraph {} {{", self.graph_name));
        lines.push(format!("    {}", self.node_attributes));

        for (name, declaration) in &graph.nodes {
            let label = self.labels.render(declaration);
            lines.push(format!("    {} [label=\"{{{}}}\"];", name, label));
        }

        for edge in &graph.edges {
            lines.push(format!("    {} -> {};", edge.from, edge.to));
        }

        lines.push("}".to_string());
        let mut output = lines.join("\n");
        output.push('\n');
        output
    }
}
