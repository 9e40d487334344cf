//! Lowering of Java source text into [`MemoryJavaModel`] types.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use tree_sitter::{Node, Parser, Tree};

use crate::descriptor::{erase, is_primitive};
use crate::text::LineIndex;
use crate::{
    Annotation, AnnotationMember, AnnotationValue, JavaField, JavaMethod, JavaType,
    MemoryJavaModel, ModelError, TypeKind, TypeOrigin,
};

thread_local! {
    static JAVA_PARSER: RefCell<Result<Parser, String>> = RefCell::new({
        let mut parser = Parser::new();
        match parser.set_language(tree_sitter_java::language()) {
            Ok(()) => Ok(parser),
            Err(_) => Err("tree-sitter-java language load failed".to_string()),
        }
    });
}

/// Parse Java source text with `tree-sitter-java`.
pub fn parse_java(source: &str) -> Result<Tree, String> {
    JAVA_PARSER.with(|parser_cell| {
        let mut parser = parser_cell
            .try_borrow_mut()
            .map_err(|_| "tree-sitter parser is already in use".to_string())?;
        let parser = match parser.as_mut() {
            Ok(parser) => parser,
            Err(err) => return Err(err.clone()),
        };

        parser
            .parse(source, None)
            .ok_or_else(|| "tree-sitter failed to produce a syntax tree".to_string())
    })
}

fn find_named_child<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    let result = node
        .named_children(&mut cursor)
        .find(|child| child.kind() == kind);
    result
}

fn named_children<'a>(node: Node<'a>) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    let children = node.named_children(&mut cursor).collect();
    children
}

fn has_token(node: Node<'_>, kind: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|child| child.kind() == kind);
    found
}

fn modifier_node(node: Node<'_>) -> Option<Node<'_>> {
    node.child_by_field_name("modifiers")
        .or_else(|| find_named_child(node, "modifiers"))
}

fn node_text<'a>(source: &'a str, node: Node<'_>) -> &'a str {
    &source[node.byte_range()]
}

const JAVA_LANG: &[&str] = &[
    "ArithmeticException",
    "Boolean",
    "Byte",
    "CharSequence",
    "Character",
    "Class",
    "Deprecated",
    "Double",
    "Enum",
    "Error",
    "Exception",
    "Float",
    "FunctionalInterface",
    "IllegalArgumentException",
    "IllegalStateException",
    "IndexOutOfBoundsException",
    "Integer",
    "InterruptedException",
    "Iterable",
    "Long",
    "NullPointerException",
    "Number",
    "Object",
    "Override",
    "Runnable",
    "RuntimeException",
    "SecurityException",
    "Short",
    "String",
    "StringBuilder",
    "SuppressWarnings",
    "Thread",
    "Throwable",
    "UnsupportedOperationException",
    "Void",
];

struct PendingUnit {
    uri: String,
    text: String,
    origin: TypeOrigin,
}

/// Collects Java sources and lowers them into a [`MemoryJavaModel`].
///
/// Names are resolved the way `javac` would for the common cases: types declared
/// in the same file, single-type imports, the current package, on-demand imports
/// and `java.lang`. On-demand imports only resolve against types the builder knows
/// about (other sources plus [`ProjectBuilder::add_classpath_type`]); anything else
/// keeps the name as written.
pub struct ProjectBuilder {
    project: String,
    units: Vec<PendingUnit>,
    classpath: HashSet<String>,
}

impl ProjectBuilder {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            units: Vec::new(),
            classpath: HashSet::new(),
        }
    }

    /// Add a project source document.
    pub fn add_source(&mut self, uri: impl Into<String>, text: impl Into<String>) -> &mut Self {
        let uri = uri.into();
        self.units.push(PendingUnit {
            origin: TypeOrigin::Source { uri: uri.clone() },
            uri,
            text: text.into(),
        });
        self
    }

    /// Add the source of a dependency type (e.g. from a sources jar).
    ///
    /// Its types are lowered with [`TypeOrigin::Binary`] and are not addressable as
    /// documents.
    pub fn add_dependency_source(
        &mut self,
        uri: impl Into<String>,
        text: impl Into<String>,
    ) -> &mut Self {
        self.units.push(PendingUnit {
            uri: uri.into(),
            text: text.into(),
            origin: TypeOrigin::Binary,
        });
        self
    }

    /// Declare a type that exists on the classpath without a model entry.
    pub fn add_classpath_type(&mut self, qualified_name: impl Into<String>) -> &mut Self {
        self.classpath.insert(qualified_name.into());
        self
    }

    pub fn build(self) -> Result<MemoryJavaModel, ModelError> {
        let mut parsed = Vec::with_capacity(self.units.len());
        for unit in self.units {
            let tree = parse_java(&unit.text).map_err(|message| ModelError::Parse {
                uri: unit.uri.clone(),
                message,
            })?;
            if tree.root_node().has_error() {
                tracing::debug!(
                    target = "nova.java_model",
                    uri = %unit.uri,
                    "java source has syntax errors; lowering best-effort"
                );
            }
            parsed.push((unit, tree));
        }

        let mut known = self.classpath;
        for (unit, tree) in &parsed {
            let root = tree.root_node();
            let package = package_name(root, &unit.text);
            for (name, _) in declared_types(root, &unit.text, package.as_deref()) {
                known.insert(name);
            }
        }

        let mut model = MemoryJavaModel::named(self.project);
        for (unit, tree) in &parsed {
            if let TypeOrigin::Source { uri } = &unit.origin {
                model.add_document(uri.clone());
            }
            let lowering = Lowering::new(unit, tree.root_node(), &known);
            for ty in lowering.lower() {
                model.add_type(ty);
            }
        }
        Ok(model)
    }
}

fn package_name(root: Node<'_>, text: &str) -> Option<String> {
    let decl = find_named_child(root, "package_declaration")?;
    named_children(decl)
        .into_iter()
        .find(|n| matches!(n.kind(), "scoped_identifier" | "identifier"))
        .map(|n| node_text(text, n).split_whitespace().collect())
}

fn is_type_declaration(kind: &str) -> bool {
    matches!(
        kind,
        "class_declaration"
            | "interface_declaration"
            | "enum_declaration"
            | "record_declaration"
            | "annotation_type_declaration"
    )
}

/// `(qualified name, simple name)` of every type declared in a compilation unit.
fn declared_types(root: Node<'_>, text: &str, package: Option<&str>) -> Vec<(String, String)> {
    fn walk(node: Node<'_>, text: &str, prefix: &str, sep: char, out: &mut Vec<(String, String)>) {
        for child in named_children(node) {
            if !is_type_declaration(child.kind()) {
                continue;
            }
            let Some(name) = child.child_by_field_name("name") else {
                continue;
            };
            let simple = node_text(text, name).to_string();
            let qualified = if prefix.is_empty() {
                simple.clone()
            } else {
                format!("{prefix}{sep}{simple}")
            };
            if let Some(body) = child.child_by_field_name("body") {
                walk(body, text, &qualified, '$', out);
                if let Some(decls) = find_named_child(body, "enum_body_declarations") {
                    walk(decls, text, &qualified, '$', out);
                }
            }
            out.push((qualified, simple));
        }
    }

    let mut out = Vec::new();
    walk(root, text, package.unwrap_or_default(), '.', &mut out);
    out
}

struct Resolver<'a> {
    package: Option<String>,
    local: HashMap<String, String>,
    single: HashMap<String, String>,
    on_demand: Vec<String>,
    known: &'a HashSet<String>,
}

impl Resolver<'_> {
    fn resolve(&self, name: &str) -> String {
        if is_primitive(name) || name == "void" {
            return name.to_string();
        }
        if name.contains('.') {
            return name.to_string();
        }
        if let Some(local) = self.local.get(name) {
            return local.clone();
        }
        if let Some(imported) = self.single.get(name) {
            return imported.clone();
        }
        if let Some(pkg) = &self.package {
            let candidate = format!("{pkg}.{name}");
            if self.known.contains(&candidate) {
                return candidate;
            }
        }
        for pkg in &self.on_demand {
            let candidate = format!("{pkg}.{name}");
            if self.known.contains(&candidate) {
                return candidate;
            }
        }
        if JAVA_LANG.contains(&name) {
            return format!("java.lang.{name}");
        }
        name.to_string()
    }

    /// Resolve an erased type, keeping array suffixes and mapping type variables
    /// to `java.lang.Object`.
    fn resolve_type(&self, raw: &str, type_params: &[String]) -> String {
        let erased = erase(raw);
        let base = erased.trim_end_matches("[]");
        let dims = &erased[base.len()..];
        let resolved = if type_params.iter().any(|p| p == base) {
            "java.lang.Object".to_string()
        } else {
            self.resolve(base)
        };
        format!("{resolved}{dims}")
    }
}

struct Lowering<'a> {
    text: &'a str,
    origin: &'a TypeOrigin,
    root: Node<'a>,
    index: LineIndex,
    resolver: Resolver<'a>,
}

impl<'a> Lowering<'a> {
    fn new(unit: &'a PendingUnit, root: Node<'a>, known: &'a HashSet<String>) -> Self {
        let text = unit.text.as_str();
        let package = package_name(root, text);

        let local = declared_types(root, text, package.as_deref())
            .into_iter()
            .map(|(qualified, simple)| (simple, qualified))
            .collect();

        let mut single = HashMap::new();
        let mut on_demand = Vec::new();
        for decl in named_children(root)
            .into_iter()
            .filter(|n| n.kind() == "import_declaration")
        {
            if has_token(decl, "static") {
                continue;
            }
            let Some(path) = named_children(decl)
                .into_iter()
                .find(|n| matches!(n.kind(), "scoped_identifier" | "identifier"))
                .map(|n| node_text(text, n).split_whitespace().collect::<String>())
            else {
                continue;
            };
            if find_named_child(decl, "asterisk").is_some() {
                on_demand.push(path);
            } else {
                let simple = path.rsplit('.').next().unwrap_or(&path).to_string();
                single.insert(simple, path);
            }
        }

        Self {
            text,
            origin: &unit.origin,
            root,
            index: LineIndex::new(text),
            resolver: Resolver {
                package: package.clone(),
                local,
                single,
                on_demand,
                known,
            },
        }
    }

    fn lower(&self) -> Vec<JavaType> {
        let mut out = Vec::new();
        let prefix = self.resolver.package.clone().unwrap_or_default();
        for child in named_children(self.root) {
            if is_type_declaration(child.kind()) {
                self.lower_type(child, &prefix, '.', &[], &mut out);
            }
        }
        out
    }

    fn lower_type(
        &self,
        node: Node<'a>,
        prefix: &str,
        sep: char,
        outer_params: &[String],
        out: &mut Vec<JavaType>,
    ) {
        let Some(name) = node.child_by_field_name("name") else {
            return;
        };
        let simple = node_text(self.text, name);
        let qualified = if prefix.is_empty() {
            simple.to_string()
        } else {
            format!("{prefix}{sep}{simple}")
        };
        let kind = match node.kind() {
            "interface_declaration" => TypeKind::Interface,
            "enum_declaration" => TypeKind::Enum,
            "record_declaration" => TypeKind::Record,
            "annotation_type_declaration" => TypeKind::Annotation,
            _ => TypeKind::Class,
        };

        let mut type_params = outer_params.to_vec();
        type_params.extend(self.type_parameters(node));

        let mut ty = JavaType::new(qualified.clone(), kind, self.origin.clone());
        ty.annotations = self.annotations(node);

        let mut nested = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            let mut members = named_children(body);
            if let Some(decls) = find_named_child(body, "enum_body_declarations") {
                members.extend(named_children(decls));
            }
            for member in members {
                match member.kind() {
                    "method_declaration" | "annotation_type_element_declaration" => {
                        if let Some(method) = self.lower_method(member, &type_params) {
                            ty.methods.push(method);
                        }
                    }
                    "field_declaration" | "constant_declaration" => {
                        ty.fields.extend(self.lower_fields(member, &type_params));
                    }
                    kind if is_type_declaration(kind) => nested.push(member),
                    _ => {}
                }
            }
        }

        out.push(ty);
        for member in nested {
            self.lower_type(member, &qualified, '$', &type_params, out);
        }
    }

    fn type_parameters(&self, node: Node<'_>) -> Vec<String> {
        let Some(params) = node.child_by_field_name("type_parameters") else {
            return Vec::new();
        };
        named_children(params)
            .into_iter()
            .filter(|p| p.kind() == "type_parameter")
            .filter_map(|p| {
                named_children(p)
                    .into_iter()
                    .find(|n| matches!(n.kind(), "type_identifier" | "identifier"))
            })
            .map(|n| node_text(self.text, n).to_string())
            .collect()
    }

    fn lower_method(&self, node: Node<'a>, class_params: &[String]) -> Option<JavaMethod> {
        let name = node.child_by_field_name("name")?;
        let mut type_params = class_params.to_vec();
        type_params.extend(self.type_parameters(node));

        let return_type = match node.child_by_field_name("type") {
            Some(ty) if ty.kind() == "void_type" => "void".to_string(),
            Some(ty) => self
                .resolver
                .resolve_type(node_text(self.text, ty), &type_params),
            None => "void".to_string(),
        };

        let mut parameter_types = Vec::new();
        if let Some(params) = node.child_by_field_name("parameters") {
            for param in named_children(params) {
                match param.kind() {
                    "formal_parameter" => {
                        let Some(ty) = param.child_by_field_name("type") else {
                            continue;
                        };
                        let mut raw = node_text(self.text, ty).to_string();
                        if let Some(dims) = param.child_by_field_name("dimensions") {
                            for _ in node_text(self.text, dims).matches('[') {
                                raw.push_str("[]");
                            }
                        }
                        parameter_types.push(self.resolver.resolve_type(&raw, &type_params));
                    }
                    "spread_parameter" => {
                        let ty = named_children(param).into_iter().find(|n| {
                            !matches!(n.kind(), "modifiers" | "variable_declarator")
                                && !n.kind().ends_with("annotation")
                        });
                        if let Some(ty) = ty {
                            let raw = format!("{}[]", node_text(self.text, ty));
                            parameter_types.push(self.resolver.resolve_type(&raw, &type_params));
                        }
                    }
                    _ => {}
                }
            }
        }

        let mut method = JavaMethod::new(node_text(self.text, name), return_type, parameter_types);
        method.annotations = self.annotations(node);
        method.range = Some(self.range(name));
        Some(method)
    }

    fn lower_fields(&self, node: Node<'a>, type_params: &[String]) -> Vec<JavaField> {
        let Some(ty) = node.child_by_field_name("type") else {
            return Vec::new();
        };
        let ty = self
            .resolver
            .resolve_type(node_text(self.text, ty), type_params);
        let annotations = self.annotations(node);

        named_children(node)
            .into_iter()
            .filter(|n| n.kind() == "variable_declarator")
            .filter_map(|decl| decl.child_by_field_name("name"))
            .map(|name| JavaField {
                name: node_text(self.text, name).to_string(),
                ty: ty.clone(),
                annotations: annotations.clone(),
                range: Some(self.range(name)),
            })
            .collect()
    }

    fn annotations(&self, node: Node<'a>) -> Vec<Annotation> {
        let Some(modifiers) = modifier_node(node) else {
            return Vec::new();
        };
        named_children(modifiers)
            .into_iter()
            .filter(|n| matches!(n.kind(), "annotation" | "marker_annotation"))
            .filter_map(|n| self.lower_annotation(n))
            .collect()
    }

    fn lower_annotation(&self, node: Node<'a>) -> Option<Annotation> {
        let name = node.child_by_field_name("name")?;
        let written: String = node_text(self.text, name).split_whitespace().collect();
        let mut annotation = Annotation::new(self.resolver.resolve(&written));
        annotation.range = Some(self.range(node));

        if let Some(args) = node.child_by_field_name("arguments") {
            for arg in named_children(args) {
                match arg.kind() {
                    "comment" | "line_comment" | "block_comment" => {}
                    "element_value_pair" => {
                        let (Some(key), Some(value)) = (
                            arg.child_by_field_name("key"),
                            arg.child_by_field_name("value"),
                        ) else {
                            continue;
                        };
                        annotation.members.push(AnnotationMember {
                            name: node_text(self.text, key).to_string(),
                            value: self.lower_value(value),
                            range: Some(self.range(value)),
                        });
                    }
                    _ => annotation.members.push(AnnotationMember {
                        name: "value".to_string(),
                        value: self.lower_value(arg),
                        range: Some(self.range(arg)),
                    }),
                }
            }
        }
        Some(annotation)
    }

    fn lower_value(&self, node: Node<'a>) -> AnnotationValue {
        let raw = node_text(self.text, node);
        match node.kind() {
            "string_literal" => AnnotationValue::String(strip_string_quotes(raw).to_string()),
            "character_literal" => {
                AnnotationValue::Char(raw.trim_matches('\'').to_string())
            }
            "true" => AnnotationValue::Boolean(true),
            "false" => AnnotationValue::Boolean(false),
            kind if kind.ends_with("_integer_literal")
                || kind.ends_with("_floating_point_literal") =>
            {
                AnnotationValue::Number(raw.to_string())
            }
            "unary_expression" => {
                let compact: String = raw.split_whitespace().collect();
                let signed_number = compact
                    .strip_prefix(&['-', '+'][..])
                    .and_then(|rest| rest.chars().next())
                    .is_some_and(|c| c.is_ascii_digit());
                if signed_number {
                    AnnotationValue::Number(compact)
                } else {
                    AnnotationValue::Other(raw.to_string())
                }
            }
            "class_literal" => {
                let ty = raw.trim().trim_end_matches("class").trim_end();
                let ty = ty.strip_suffix('.').unwrap_or(ty);
                AnnotationValue::Class(self.resolver.resolve_type(ty, &[]))
            }
            "field_access" => {
                match (
                    node.child_by_field_name("object"),
                    node.child_by_field_name("field"),
                ) {
                    (Some(object), Some(field)) => {
                        let owner: String =
                            node_text(self.text, object).split_whitespace().collect();
                        AnnotationValue::Constant {
                            owner: Some(self.resolver.resolve(&owner)),
                            name: node_text(self.text, field).to_string(),
                        }
                    }
                    _ => AnnotationValue::Other(raw.to_string()),
                }
            }
            "identifier" => AnnotationValue::Constant {
                owner: None,
                name: raw.to_string(),
            },
            "element_value_array_initializer" => AnnotationValue::Array(
                named_children(node)
                    .into_iter()
                    .filter(|n| !n.kind().ends_with("comment"))
                    .map(|n| self.lower_value(n))
                    .collect(),
            ),
            _ => AnnotationValue::Other(raw.to_string()),
        }
    }

    fn range(&self, node: Node<'_>) -> crate::Range {
        self.index
            .range(self.text, node.start_byte(), node.end_byte())
    }
}

fn strip_string_quotes(raw: &str) -> &str {
    if let Some(block) = raw
        .strip_prefix("\"\"\"")
        .and_then(|rest| rest.strip_suffix("\"\"\""))
    {
        return block.trim_start_matches(&['\r', '\n'][..]);
    }
    raw.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(raw)
}
