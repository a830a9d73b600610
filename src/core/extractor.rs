use std::collections::BTreeSet;
use tree_sitter::{Node, Parser};

use crate::error::{ClassdotError, Result};
use super::declaration::{
    AnnotationKind, Declaration, DeclarationKind, Member, MemberKind, SourceUnit, Visibility,
};

/// TypeScript declaration extractor built on Tree-sitter
///
/// Produces zero or more `Declaration` records per source unit. Classes
/// decorated with `NgModule` become module declarations carrying the names
/// from their `declarations` metadata list; everything else class-shaped
/// becomes a class declaration with its members and decorator tags.
pub struct DeclarationExtractor {
    parser: Parser,
}

impl DeclarationExtractor {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let typescript_language = tree_sitter_typescript::language_typescript();
        parser
            .set_language(&typescript_language)
            .map_err(|e| ClassdotError::Parser(format!("Failed to set TypeScript language: {}", e)))?;

        Ok(Self { parser })
    }

    /// Extract all class-like and module-like declarations from one file.
    /// A file with no such constructs yields an empty list, not an error.
    pub fn extract(&mut self, unit: &SourceUnit) -> Result<Vec<Declaration>> {
        let tree = self.parser.parse(&unit.text, None).ok_or_else(|| {
            ClassdotError::Parser(format!("Failed to parse {}", unit.path.display()))
        })?;

        let root_node = tree.root_node();
        if root_node.has_error() {
            return Err(ClassdotError::Parser(format!(
                "Syntax errors in {}",
                unit.path.display()
            )));
        }

        let mut declarations = Vec::new();
        self.walk_for_classes(root_node, unit, &mut declarations)?;
        Ok(declarations)
    }

    fn walk_for_classes(
        &self,
        node: Node,
        unit: &SourceUnit,
        declarations: &mut Vec<Declaration>,
    ) -> Result<()> {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "class_declaration" => {
                    // Decorators may sit on the class itself or on the
                    // wrapping export statement
                    let mut annotations = self.decorator_annotations(child, &unit.text);
                    if node.kind() == "export_statement" {
                        annotations.append(&mut self.decorator_annotations(node, &unit.text));
                    }

                    if let Some(declaration) =
                        self.parse_class(child, unit, annotations)?
                    {
                        declarations.push(declaration);
                    }
                }
                _ => {
                    self.walk_for_classes(child, unit, declarations)?;
                }
            }
        }

        Ok(())
    }

    fn parse_class(
        &self,
        node: Node,
        unit: &SourceUnit,
        annotations: BTreeSet<AnnotationKind>,
    ) -> Result<Option<Declaration>> {
        let name = match node.child_by_field_name("name") {
            Some(name_node) => self.node_text(name_node, &unit.text),
            None => return Ok(None),
        };

        let kind = if annotations.contains(&AnnotationKind::NgModule) {
            DeclarationKind::Module
        } else {
            DeclarationKind::Class
        };

        let declared_members = if kind == DeclarationKind::Module {
            self.parse_declared_members(node, &unit.text)
        } else {
            Vec::new()
        };

        let mut members = Vec::new();
        if let Some(body_node) = node.child_by_field_name("body") {
            let mut cursor = body_node.walk();
            for child in body_node.children(&mut cursor) {
                match child.kind() {
                    "public_field_definition" | "field_definition" => {
                        if let Some(member) = self.parse_property(child, &unit.text) {
                            members.push(member);
                        }
                    }
                    "method_definition" => {
                        if let Some(member) = self.parse_method(child, &unit.text) {
                            members.push(member);
                        }
                    }
                    _ => {}
                }
            }
        }

        Ok(Some(Declaration {
            kind,
            name,
            path: unit.path.clone(),
            annotations,
            members,
            declared_members,
        }))
    }

    /// Parse a class field into a property member
    fn parse_property(&self, node: Node, source: &str) -> Option<Member> {
        let name_node = node.child_by_field_name("name")?;
        let name = self.node_text(name_node, source);

        let type_signature = match node.child_by_field_name("type") {
            Some(type_node) => self.type_annotation_text(type_node, source),
            None => self.infer_type(node.child_by_field_name("value"), source),
        };

        Some(Member {
            kind: MemberKind::Property,
            name,
            visibility: self.parse_visibility(node, source),
            type_signature,
            parameter_signatures: vec![],
            annotations: self.decorator_annotations(node, source),
        })
    }

    /// Parse a method definition into a method member
    fn parse_method(&self, node: Node, source: &str) -> Option<Member> {
        let name_node = node.child_by_field_name("name")?;
        let name = self.node_text(name_node, source);

        let type_signature = match node.child_by_field_name("return_type") {
            Some(type_node) => self.type_annotation_text(type_node, source),
            None => "void".to_string(),
        };

        let mut parameter_signatures = Vec::new();
        if let Some(params_node) = node.child_by_field_name("parameters") {
            let mut cursor = params_node.walk();
            for param in params_node.named_children(&mut cursor) {
                match param.kind() {
                    "required_parameter" | "optional_parameter" | "rest_parameter" => {
                        parameter_signatures.push(self.node_text(param, source));
                    }
                    _ => {}
                }
            }
        }

        Some(Member {
            kind: MemberKind::Method,
            name,
            visibility: self.parse_visibility(node, source),
            type_signature,
            parameter_signatures,
            annotations: self.decorator_annotations(node, source),
        })
    }

    /// Visibility from the explicit accessibility modifier, default public
    fn parse_visibility(&self, node: Node, source: &str) -> Visibility {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "accessibility_modifier" {
                return match self.node_text(child, source).as_str() {
                    "private" => Visibility::Private,
                    "protected" => Visibility::Protected,
                    _ => Visibility::Public,
                };
            }
        }
        Visibility::Public
    }

    /// Collect decorator tags attached directly to a node
    fn decorator_annotations(&self, node: Node, source: &str) -> BTreeSet<AnnotationKind> {
        let mut annotations = BTreeSet::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() != "decorator" {
                continue;
            }
            if let Some(name) = self.decorator_name(child, source) {
                annotations.insert(AnnotationKind::from_name(&name));
            }
        }
        annotations
    }

    /// The identifier a decorator names: `@Component({...})` -> `Component`
    fn decorator_name(&self, node: Node, source: &str) -> Option<String> {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "identifier" => return Some(self.node_text(child, source)),
                "call_expression" => {
                    let function = child.child_by_field_name("function")?;
                    return Some(self.node_text(function, source));
                }
                _ => {}
            }
        }
        None
    }

    /// Names listed in the NgModule decorator's `declarations` array
    fn parse_declared_members(&self, class_node: Node, source: &str) -> Vec<String> {
        let metadata = match self.ngmodule_metadata(class_node, source) {
            Some(object) => object,
            None => return Vec::new(),
        };

        let mut names = Vec::new();
        let mut cursor = metadata.walk();
        for pair in metadata.named_children(&mut cursor) {
            if pair.kind() != "pair" {
                continue;
            }
            let key = match pair.child_by_field_name("key") {
                Some(key) => key,
                None => continue,
            };
            if self.node_text(key, source) != "declarations" {
                continue;
            }
            if let Some(value) = pair.child_by_field_name("value") {
                if value.kind() == "array" {
                    let mut array_cursor = value.walk();
                    for element in value.named_children(&mut array_cursor) {
                        if element.kind() == "identifier" {
                            names.push(self.node_text(element, source));
                        }
                    }
                }
            }
        }

        names
    }

    /// The object literal passed to the `NgModule` decorator, searched on
    /// the class and its wrapping export statement
    fn ngmodule_metadata<'a>(&self, class_node: Node<'a>, source: &str) -> Option<Node<'a>> {
        let mut candidates = vec![class_node];
        if let Some(parent) = class_node.parent() {
            if parent.kind() == "export_statement" {
                candidates.push(parent);
            }
        }

        for candidate in candidates {
            let mut cursor = candidate.walk();
            for child in candidate.children(&mut cursor) {
                if child.kind() != "decorator" {
                    continue;
                }
                if self.decorator_name(child, source).as_deref() != Some("NgModule") {
                    continue;
                }
                let mut decorator_cursor = child.walk();
                for call in child.named_children(&mut decorator_cursor) {
                    if call.kind() != "call_expression" {
                        continue;
                    }
                    let arguments = call.child_by_field_name("arguments")?;
                    let mut args_cursor = arguments.walk();
                    for argument in arguments.named_children(&mut args_cursor) {
                        if argument.kind() == "object" {
                            return Some(argument);
                        }
                    }
                }
            }
        }

        None
    }

    /// Type annotation text without the leading colon
    fn type_annotation_text(&self, node: Node, source: &str) -> String {
        self.node_text(node, source)
            .trim_start_matches(':')
            .trim()
            .to_string()
    }

    /// Best-effort type text for fields without an annotation, from the
    /// shape of the initializer
    fn infer_type(&self, value: Option<Node>, source: &str) -> String {
        let value = match value {
            Some(value) => value,
            None => return "any".to_string(),
        };

        match value.kind() {
            "string" | "template_string" => "string".to_string(),
            "number" => "number".to_string(),
            "true" | "false" => "boolean".to_string(),
            "array" => "any[]".to_string(),
            "arrow_function" | "function_expression" => "Function".to_string(),
            "new_expression" => value
                .child_by_field_name("constructor")
                .map(|c| self.node_text(c, source))
                .unwrap_or_else(|| "any".to_string()),
            _ => "any".to_string(),
        }
    }

    fn node_text(&self, node: Node, source: &str) -> String {
        source[node.byte_range()].to_string()
    }
}
