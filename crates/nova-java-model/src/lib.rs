//! Java type model consumed by Nova's MicroProfile analyzers.
//!
//! The host (an IDE, a build tool integration, a test fixture) owns the real type
//! system. Analyzers only see it through [`JavaModel`]: a small capability set for
//! resolving the types of a project, introspecting their annotations, methods and
//! fields, and mapping annotation member values back to source ranges.
//!
//! Two building blocks are provided:
//!
//! - [`MemoryJavaModel`], a plain in-memory implementation that hosts can fill
//!   directly and tests use as a fixture;
//! - [`ProjectBuilder`], which lowers Java source text (parsed with
//!   `tree-sitter-java`) into a [`MemoryJavaModel`].

pub mod descriptor;
mod memory;
mod source;
mod text;

pub use memory::MemoryJavaModel;
pub use source::{parse_java, ProjectBuilder};
pub use text::{LineIndex, Position, Range};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque handle to a type stored in a [`JavaModel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn to_raw(self) -> u32 {
        self.0
    }
}

/// Which part of the project participates in a search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchScope {
    /// Only types declared in the project's own sources.
    SourcesOnly,
    /// Project sources plus compiled dependencies.
    #[default]
    SourcesAndDependencies,
}

impl SearchScope {
    pub fn includes(self, origin: &TypeOrigin) -> bool {
        match (self, origin) {
            (_, TypeOrigin::Source { .. }) => true,
            (SearchScope::SourcesAndDependencies, TypeOrigin::Binary) => true,
            (SearchScope::SourcesOnly, TypeOrigin::Binary) => false,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("project `{0}` is not loaded")]
    ProjectNotLoaded(String),
    #[error("unknown type id {}", .0.to_raw())]
    UnknownType(TypeId),
    #[error("document `{0}` is not part of the project")]
    UnknownDocument(String),
    #[error("failed to parse `{uri}`: {message}")]
    Parse { uri: String, message: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeOrigin {
    /// Declared in a project source file.
    Source { uri: String },
    /// Loaded from a compiled dependency.
    Binary,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JavaType {
    /// Fully qualified name; nested types are joined with `$`.
    pub name: String,
    pub kind: TypeKind,
    pub origin: TypeOrigin,
    pub annotations: Vec<Annotation>,
    pub methods: Vec<JavaMethod>,
    pub fields: Vec<JavaField>,
}

impl JavaType {
    pub fn new(name: impl Into<String>, kind: TypeKind, origin: TypeOrigin) -> Self {
        Self {
            name: name.into(),
            kind,
            origin,
            annotations: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    pub fn is_binary(&self) -> bool {
        matches!(self.origin, TypeOrigin::Binary)
    }

    pub fn uri(&self) -> Option<&str> {
        match &self.origin {
            TypeOrigin::Source { uri } => Some(uri),
            TypeOrigin::Binary => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JavaMethod {
    pub name: String,
    /// Erased return type as written/resolved (`void`, `int`, `java.lang.String`, ...).
    pub return_type: String,
    /// Erased parameter types, in declaration order.
    pub parameter_types: Vec<String>,
    /// JVM method descriptor, e.g. `(Ljava/lang/String;)V`.
    pub descriptor: String,
    pub annotations: Vec<Annotation>,
    /// Range of the method name.
    pub range: Option<Range>,
}

impl JavaMethod {
    /// Build a method and derive its descriptor from already resolved types.
    pub fn new(
        name: impl Into<String>,
        return_type: impl Into<String>,
        parameter_types: Vec<String>,
    ) -> Self {
        let return_type = return_type.into();
        let descriptor = descriptor::method_descriptor(&return_type, &parameter_types);
        Self {
            name: name.into(),
            return_type,
            parameter_types,
            descriptor,
            annotations: Vec::new(),
            range: None,
        }
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// `name` followed by the descriptor, e.g. `serviceA()V`.
    pub fn signature(&self) -> String {
        format!("{}{}", self.name, self.descriptor)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JavaField {
    pub name: String,
    pub ty: String,
    pub annotations: Vec<Annotation>,
    pub range: Option<Range>,
}

/// An annotation applied to a type, method or field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotation {
    /// The import-resolved qualified name, or the name as written when the model
    /// could not resolve it.
    pub name: String,
    pub members: Vec<AnnotationMember>,
    pub range: Option<Range>,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            range: None,
        }
    }

    pub fn with_member(mut self, name: impl Into<String>, value: AnnotationValue) -> Self {
        self.members.push(AnnotationMember {
            name: name.into(),
            value,
            range: None,
        });
        self
    }

    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    pub fn member(&self, name: &str) -> Option<&AnnotationMember> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Does this annotation denote `qualified_name`?
    ///
    /// Resolved names must match exactly. A name the model could not resolve (a
    /// bare simple name) matches any qualified name with the same simple name.
    pub fn matches(&self, qualified_name: &str) -> bool {
        if self.name == qualified_name {
            return true;
        }
        !self.name.contains('.')
            && qualified_name
                .strip_suffix(self.name.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationMember {
    pub name: String,
    pub value: AnnotationValue,
    /// Range of the value expression (for strings this includes the quotes).
    pub range: Option<Range>,
}

/// The value of an annotation member as written in source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnnotationValue {
    /// String literal contents without quotes; escape sequences are preserved.
    String(String),
    /// Numeric literal text, including sign and any suffix.
    Number(String),
    Boolean(bool),
    Char(String),
    /// Class literal (`Foo.class`), carrying the resolved class name.
    Class(String),
    /// Enum constant or static constant reference (`ChronoUnit.SECONDS`).
    Constant { owner: Option<String>, name: String },
    Array(Vec<AnnotationValue>),
    /// Any other expression, kept as source text.
    Other(String),
}

impl AnnotationValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnnotationValue::String(value) => Some(value),
            _ => None,
        }
    }
}

/// A program element that can carry annotations.
#[derive(Clone, Copy, Debug)]
pub enum Element<'a> {
    Type(&'a JavaType),
    Method(&'a JavaType, &'a JavaMethod),
    Field(&'a JavaType, &'a JavaField),
}

/// Query interface over a host's Java type model.
pub trait JavaModel {
    /// Types of the project in `scope`, in a stable order.
    fn resolve_project(&self, scope: SearchScope) -> Result<Vec<TypeId>, ModelError>;

    fn java_type(&self, id: TypeId) -> Result<&JavaType, ModelError>;

    /// Types declared in the source document `uri`, outermost first.
    fn types_in_document(&self, uri: &str) -> Result<Vec<TypeId>, ModelError>;

    fn annotations_on<'a>(&'a self, element: Element<'a>) -> &'a [Annotation] {
        match element {
            Element::Type(ty) => &ty.annotations,
            Element::Method(_, method) => &method.annotations,
            Element::Field(_, field) => &field.annotations,
        }
    }

    fn methods_of(&self, id: TypeId) -> Result<&[JavaMethod], ModelError> {
        Ok(&self.java_type(id)?.methods)
    }

    fn source_range_of(&self, member: &AnnotationMember) -> Option<Range> {
        member.range
    }
}

/// Last segment of a dotted or `$`-nested name.
pub fn simple_name(name: &str) -> &str {
    name.rsplit(&['.', '$'][..]).next().unwrap_or(name)
}
