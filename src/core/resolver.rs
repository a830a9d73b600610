use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use regex::Regex;

use crate::error::{ClassdotError, Result};
use super::declaration::{Declaration, DeclarationKind, Edge, SourceUnit};

/// Strategy interface for inferring edges between declarations.
///
/// Implementations receive the complete declaration set plus the raw
/// source units, so a precise symbol-table resolver can replace the
/// textual heuristic without touching the rest of the pipeline.
pub trait ReferenceResolver {
    fn resolve(&self, declarations: &[Declaration], units: &[SourceUnit]) -> Result<Vec<Edge>>;
}

/// Exact containment edges from module metadata
///
/// For every module declaration, one edge per name in its `declarations`
/// list. Driven by declared metadata, not heuristics.
pub struct StructuralResolver;

impl ReferenceResolver for StructuralResolver {
    fn resolve(&self, declarations: &[Declaration], _units: &[SourceUnit]) -> Result<Vec<Edge>> {
        let mut edges = BTreeSet::new();

        for declaration in declarations {
            if declaration.kind != DeclarationKind::Module {
                continue;
            }
            for target in &declaration.declared_members {
                edges.insert(Edge::containment(&declaration.name, target));
            }
        }

        Ok(edges.into_iter().collect())
    }
}

/// Heuristic reference edges from textual pattern matching
///
/// Emits `A -> B` when A's file mentions B through a dotted-access token
/// whose prefix is an imported symbol, through an import list, or through
/// a dynamic-import type reference in a member signature. Best-effort:
/// aliased imports and re-exports are missed, and same-named unrelated
/// symbols can false-positive. Only exact matches against the extracted
/// declaration set are emitted, and duplicates collapse to one edge.
pub struct TextualResolver {
    import_list: Regex,
    dotted_access: Regex,
    dynamic_import: Regex,
}

impl TextualResolver {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| ClassdotError::Parser(e.to_string()))
        };

        Ok(Self {
            import_list: compile(r#"import\s*\{([^}]*)\}\s*from\s*['"][^'"]*['"]"#)?,
            dotted_access: compile(r"([A-Za-z_][A-Za-z0-9_$]*)\s*\.\s*[A-Za-z_]")?,
            dynamic_import: compile(r#"import\("[^"]+"\)\.([A-Za-z_][A-Za-z0-9_$]*)"#)?,
        })
    }

    /// Symbols named in the file's import lists. Aliased entries keep the
    /// original name (`Foo as Bar` contributes `Foo`).
    fn imported_symbols(&self, text: &str) -> BTreeSet<String> {
        let mut symbols = BTreeSet::new();
        for capture in self.import_list.captures_iter(text) {
            for entry in capture[1].split(',') {
                let name = entry.split_whitespace().next().unwrap_or_default();
                if !name.is_empty() {
                    symbols.insert(name.to_string());
                }
            }
        }
        symbols
    }
}

impl ReferenceResolver for TextualResolver {
    fn resolve(&self, declarations: &[Declaration], units: &[SourceUnit]) -> Result<Vec<Edge>> {
        let node_names: BTreeSet<&str> =
            declarations.iter().map(|d| d.name.as_str()).collect();

        let mut declarations_by_path: BTreeMap<&PathBuf, Vec<&Declaration>> = BTreeMap::new();
        for declaration in declarations {
            declarations_by_path
                .entry(&declaration.path)
                .or_default()
                .push(declaration);
        }

        let mut edges = BTreeSet::new();

        for unit in units {
            let sources = match declarations_by_path.get(&unit.path) {
                Some(sources) => sources,
                None => continue,
            };

            let imported = self.imported_symbols(&unit.text);
            let mut targets: BTreeSet<&str> = BTreeSet::new();

            // Imported symbols that name an extracted declaration
            for symbol in &imported {
                if node_names.contains(symbol.as_str()) {
                    targets.insert(symbol.as_str());
                }
            }

            // Dotted-access tokens whose prefix is an imported declaration
            for capture in self.dotted_access.captures_iter(&unit.text) {
                let prefix = capture.get(1).map(|m| m.as_str()).unwrap_or_default();
                if imported.contains(prefix) && node_names.contains(prefix) {
                    targets.insert(prefix);
                }
            }

            // Dynamic-import type references inside member signatures
            for declaration in sources.iter() {
                for member in &declaration.members {
                    for capture in self.dynamic_import.captures_iter(&member.type_signature) {
                        let symbol = capture.get(1).map(|m| m.as_str()).unwrap_or_default();
                        if node_names.contains(symbol) {
                            targets.insert(symbol);
                        }
                    }
                }
            }

            for declaration in sources.iter() {
                for target in &targets {
                    if declaration.name.as_str() != *target {
                        edges.insert(Edge::reference(&declaration.name, *target));
                    }
                }
            }
        }

        Ok(edges.into_iter().collect())
    }
}
