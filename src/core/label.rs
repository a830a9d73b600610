use std::collections::BTreeSet;
use regex::Regex;

use crate::error::{ClassdotError, Result};
use super::declaration::{Declaration, Member, MemberKind};

/// Record-field line break, left-justified
const LINE_BREAK: &str = "\\l";

/// Escape label text for the DOT record format. Applied exactly once to
/// every fragment that reaches a label.
pub fn escape_label(text: &str) -> String {
    text.replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('<', "\\<")
        .replace('>', "\\>")
}

/// Formats one declaration into a record-shaped node label:
/// header, imports, properties and methods joined with `|`, lines within
/// a section joined with `\l`. Empty sections are omitted.
pub struct LabelRenderer {
    dynamic_import: Regex,
}

impl LabelRenderer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dynamic_import: Regex::new(r#"import\("[^"]+"\)"#)
                .map_err(|e| ClassdotError::Parser(e.to_string()))?,
        })
    }

    pub fn render(&self, declaration: &Declaration) -> String {
        let mut sections = vec![escape_label(&declaration.name)];

        // Wiring-annotated members are hidden from the member lists but
        // still contribute their type references
        let imports = self.collect_imports(&declaration.members);
        if !imports.is_empty() {
            sections.push(Self::join_section(imports));
        }

        let properties: Vec<String> = declaration
            .members
            .iter()
            .filter(|m| m.kind == MemberKind::Property && !m.is_wiring())
            .map(|m| self.member_line(m))
            .collect();
        if !properties.is_empty() {
            sections.push(Self::join_section(properties));
        }

        let methods: Vec<String> = declaration
            .members
            .iter()
            .filter(|m| m.kind == MemberKind::Method && !m.is_wiring())
            .map(|m| self.member_line(m))
            .collect();
        if !methods.is_empty() {
            sections.push(Self::join_section(methods));
        }

        sections.join("|")
    }

    fn member_line(&self, member: &Member) -> String {
        let prefix = member.visibility.prefix();
        let type_name = escape_label(member.simplified_type());

        match member.kind {
            MemberKind::Property => format!("{}{}: {}", prefix, member.name, type_name),
            MemberKind::Method => {
                let parameters = escape_label(&member.parameter_signatures.join(", "));
                format!("{}{}({}): {}", prefix, member.name, parameters, type_name)
            }
        }
    }

    /// Deduplicated, sorted dynamic-import references found in member
    /// type signatures
    fn collect_imports(&self, members: &[Member]) -> Vec<String> {
        let mut imports = BTreeSet::new();
        for member in members {
            for found in self.dynamic_import.find_iter(&member.type_signature) {
                imports.insert(escape_label(found.as_str()));
            }
        }
        imports.into_iter().collect()
    }

    fn join_section(lines: Vec<String>) -> String {
        let mut section = lines.join(LINE_BREAK);
        section.push_str(LINE_BREAK);
        section
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::declaration::{AnnotationKind, DeclarationKind, Visibility};
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    fn property(name: &str, visibility: Visibility, type_signature: &str) -> Member {
        Member {
            kind: MemberKind::Property,
            name: name.to_string(),
            visibility,
            type_signature: type_signature.to_string(),
            parameter_signatures: vec![],
            annotations: BTreeSet::new(),
        }
    }

    fn method(name: &str, parameters: &[&str], return_type: &str) -> Member {
        Member {
            kind: MemberKind::Method,
            name: name.to_string(),
            visibility: Visibility::Public,
            type_signature: return_type.to_string(),
            parameter_signatures: parameters.iter().map(|p| p.to_string()).collect(),
            annotations: BTreeSet::new(),
        }
    }

    fn declaration(members: Vec<Member>) -> Declaration {
        Declaration {
            kind: DeclarationKind::Class,
            name: "Widget".to_string(),
            path: PathBuf::from("widget.ts"),
            annotations: BTreeSet::new(),
            members,
            declared_members: vec![],
        }
    }

    #[test]
    fn test_escapes_each_special_character_once() {
        let escaped = escape_label("say \"hi\"\n<T>");
        assert_eq!(escaped, "say \\\"hi\\\"\\n\\<T\\>");
    }

    #[test]
    fn test_member_line_count_excludes_wiring() {
        let mut bound = property("model", Visibility::Public, "User");
        bound.annotations.insert(AnnotationKind::Input);

        let label = LabelRenderer::new().unwrap().render(&declaration(vec![
            property("count", Visibility::Private, "number"),
            property("title", Visibility::Public, "string"),
            bound,
            method("refresh", &[], "void"),
        ]));

        // one line break per member line: 2 eligible properties + 1 method
        assert_eq!(label.matches("\\l").count(), 3);
        assert!(label.contains("-count: number"));
        assert!(label.contains("+title: string"));
        assert!(label.contains("+refresh(): void"));
        assert!(!label.contains("model"));
    }

    #[test]
    fn test_sections_joined_with_pipe_and_empty_omitted() {
        let renderer = LabelRenderer::new().unwrap();

        let only_methods = renderer.render(&declaration(vec![method("run", &[], "void")]));
        assert_eq!(only_methods, "Widget|+run(): void\\l");

        let empty = renderer.render(&declaration(vec![]));
        assert_eq!(empty, "Widget");
        assert!(!empty.contains('|'));
    }

    #[test]
    fn test_method_parameters_and_generic_return() {
        let label = LabelRenderer::new().unwrap().render(&declaration(vec![method(
            "lookup",
            &["id: string", "strict: boolean"],
            "Map<string, User>",
        )]));

        assert!(label.contains("+lookup(id: string, strict: boolean): Map\\<string, User\\>"));
    }

    #[test]
    fn test_imports_section_is_sorted_and_deduplicated() {
        let mut wired = property("user", Visibility::Public, "import(\"/src/user\").User");
        wired.annotations.insert(AnnotationKind::Input);

        let label = LabelRenderer::new().unwrap().render(&declaration(vec![
            wired,
            property("backup", Visibility::Private, "import(\"/src/user\").User"),
            property("audit", Visibility::Private, "import(\"/src/audit\").Audit"),
        ]));

        let imports_section = label.split('|').nth(1).unwrap();
        let audit_pos = imports_section.find("/src/audit").unwrap();
        let user_pos = imports_section.find("/src/user").unwrap();
        assert!(audit_pos < user_pos);
        assert_eq!(imports_section.matches("/src/user").count(), 1);
        assert!(imports_section.contains("import(\\\"/src/audit\\\")"));
    }
}
