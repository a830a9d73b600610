use std::collections::BTreeSet;
use std::path::PathBuf;
use serde::{Deserialize, Serialize};

/// A source file read once at the start of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceUnit {
    /// File path relative to the source root
    pub path: PathBuf,

    /// Raw source text
    pub text: String,
}

/// Decorator tag recognized at extraction time
///
/// Downstream logic switches on these tags instead of re-inspecting
/// raw decorator text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnnotationKind {
    Component,
    NgModule,
    Directive,
    Pipe,
    Injectable,
    Input,
    Output,
    Other(String),
}

impl AnnotationKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Component" => Self::Component,
            "NgModule" => Self::NgModule,
            "Directive" => Self::Directive,
            "Pipe" => Self::Pipe,
            "Injectable" => Self::Injectable,
            "Input" => Self::Input,
            "Output" => Self::Output,
            other => Self::Other(other.to_string()),
        }
    }

    /// Markers that bind a member to/from an external owner. Such members
    /// are excluded from rendered member lists but still scanned for
    /// cross-references.
    pub fn is_wiring(&self) -> bool {
        matches!(self, Self::Input | Self::Output)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl Visibility {
    /// One-character UML prefix for node labels
    pub fn prefix(&self) -> char {
        match self {
            Self::Public => '+',
            Self::Protected => '#',
            Self::Private => '-',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberKind {
    Property,
    Method,
}

/// A field or method extracted from a class body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub kind: MemberKind,

    pub name: String,

    /// From the explicit accessibility modifier, default public
    pub visibility: Visibility,

    /// Declared type text, or the inferred text when no annotation exists
    pub type_signature: String,

    /// `name: type` pairs, methods only
    pub parameter_signatures: Vec<String>,

    pub annotations: BTreeSet<AnnotationKind>,
}

impl Member {
    pub fn is_wiring(&self) -> bool {
        self.annotations.iter().any(AnnotationKind::is_wiring)
    }

    /// Type text truncated to its most specific namespace segment, for
    /// display. `import("./user").User` becomes `User`.
    pub fn simplified_type(&self) -> &str {
        self.type_signature
            .rsplit('.')
            .next()
            .unwrap_or(&self.type_signature)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclarationKind {
    Class,
    Module,
}

/// A class-like or module-like construct found in one source file.
/// Immutable after extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Declaration {
    pub kind: DeclarationKind,

    pub name: String,

    /// File the declaration was extracted from
    pub path: PathBuf,

    /// Decorator tags attached to the declaration itself
    pub annotations: BTreeSet<AnnotationKind>,

    pub members: Vec<Member>,

    /// Names registered in the module's `declarations` metadata list.
    /// Populated only for `Module` declarations.
    pub declared_members: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeKind {
    /// A module declares/registers a component
    Containment,
    /// One class's source mentions or imports another class
    Reference,
}

/// Directed edge between two named declarations
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn containment(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind: EdgeKind::Containment,
        }
    }

    pub fn reference(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind: EdgeKind::Reference,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_from_name() {
        assert_eq!(AnnotationKind::from_name("Component"), AnnotationKind::Component);
        assert_eq!(AnnotationKind::from_name("NgModule"), AnnotationKind::NgModule);
        assert_eq!(
            AnnotationKind::from_name("HostListener"),
            AnnotationKind::Other("HostListener".to_string())
        );
    }

    #[test]
    fn test_wiring_markers() {
        assert!(AnnotationKind::Input.is_wiring());
        assert!(AnnotationKind::Output.is_wiring());
        assert!(!AnnotationKind::Component.is_wiring());
        assert!(!AnnotationKind::Other("Host".to_string()).is_wiring());
    }

    #[test]
    fn test_visibility_prefix() {
        assert_eq!(Visibility::Public.prefix(), '+');
        assert_eq!(Visibility::Protected.prefix(), '#');
        assert_eq!(Visibility::Private.prefix(), '-');
    }

    #[test]
    fn test_edge_ordering_is_stable() {
        let a = Edge::containment("AppModule", "AppComponent");
        let b = Edge::reference("AppComponent", "UserService");
        let mut set = std::collections::BTreeSet::new();
        set.insert(b.clone());
        set.insert(a.clone());
        set.insert(b.clone());

        let ordered: Vec<_> = set.into_iter().collect();
        assert_eq!(ordered, vec![b, a]);
    }
}
