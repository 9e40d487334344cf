use nova_java_model::{
    Annotation, AnnotationMember, AnnotationValue, Element, JavaField, JavaMethod, JavaModel,
    JavaType, ModelError, TypeId,
};

use crate::catalog::{self, AnnotationSpec, ParameterSpec};

/// Where a fault tolerance annotation was applied.
#[derive(Clone, Copy, Debug)]
pub enum Target<'a> {
    Type,
    Method(&'a JavaMethod),
    Field(&'a JavaField),
}

/// One catalog annotation applied to a program element.
#[derive(Clone, Copy, Debug)]
pub struct AnnotationOccurrence<'a> {
    pub spec: &'static AnnotationSpec,
    pub annotation: &'a Annotation,
    pub declaring_type: &'a JavaType,
    pub target: Target<'a>,
}

impl<'a> AnnotationOccurrence<'a> {
    pub fn member(&self, name: &str) -> Option<&'a AnnotationMember> {
        self.annotation.member(name)
    }
}

/// Fault tolerance annotations of the type `id`: type annotations first, then
/// those of each method, then those of each field, each in declaration order.
pub fn occurrences<'a>(
    model: &'a dyn JavaModel,
    id: TypeId,
) -> Result<Vec<AnnotationOccurrence<'a>>, ModelError> {
    let ty = model.java_type(id)?;
    let methods = model.methods_of(id)?;
    let mut out = Vec::new();
    let mut push = |annotations: &'a [Annotation], target: Target<'a>| {
        for annotation in annotations {
            if let Some(spec) = catalog::resolve(annotation) {
                out.push(AnnotationOccurrence {
                    spec,
                    annotation,
                    declaring_type: ty,
                    target,
                });
            }
        }
    };

    push(model.annotations_on(Element::Type(ty)), Target::Type);
    for method in methods {
        push(
            model.annotations_on(Element::Method(ty, method)),
            Target::Method(method),
        );
    }
    for field in &ty.fields {
        push(
            model.annotations_on(Element::Field(ty, field)),
            Target::Field(field),
        );
    }
    Ok(out)
}

/// The annotation on `ty` itself that denotes `spec`, if any.
pub(crate) fn type_annotation<'a>(
    model: &'a dyn JavaModel,
    ty: &'a JavaType,
    spec: &'static AnnotationSpec,
) -> Option<&'a Annotation> {
    model
        .annotations_on(Element::Type(ty))
        .iter()
        .find(|a| catalog::resolve(a).is_some_and(|found| std::ptr::eq(found, spec)))
}

/// Value of `param` on `annotation` as a configuration literal, falling back to
/// the catalog default.
pub fn parameter_value(annotation: Option<&Annotation>, param: &ParameterSpec) -> Option<String> {
    annotation
        .and_then(|a| a.member(param.name))
        .map(|m| config_literal(&m.value))
        .or_else(|| param.default_value.map(str::to_string))
}

/// Render an annotation value the way it is written in a configuration source.
pub fn config_literal(value: &AnnotationValue) -> String {
    match value {
        AnnotationValue::String(s) | AnnotationValue::Char(s) | AnnotationValue::Class(s) => {
            s.clone()
        }
        AnnotationValue::Number(n) => numeric_literal(n),
        AnnotationValue::Boolean(b) => b.to_string(),
        AnnotationValue::Constant { name, .. } => name.clone(),
        AnnotationValue::Array(items) => items
            .iter()
            .map(config_literal)
            .collect::<Vec<_>>()
            .join(","),
        AnnotationValue::Other(text) => text.clone(),
    }
}

/// Java numeric literal as MicroProfile Config's number converters read it:
/// no digit separators, no type suffix, integers in decimal.
fn numeric_literal(text: &str) -> String {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
    };

    if let Some(value) = integer_literal(digits, negative) {
        return value.to_string();
    }

    let is_hex = digits.starts_with("0x") || digits.starts_with("0X");
    let suffixes: &[char] = if is_hex {
        &['l', 'L']
    } else {
        &['l', 'L', 'f', 'F', 'd', 'D']
    };
    match cleaned.strip_suffix(suffixes) {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => cleaned,
    }
}

/// Value of an integer literal with Java's `int`/`long` wrapping: hex, octal
/// and binary literals denote two's complement bit patterns.
fn integer_literal(digits: &str, negative: bool) -> Option<i64> {
    let (body, long) = match digits.strip_suffix(&['l', 'L'][..]) {
        Some(body) => (body, true),
        None => (digits, false),
    };
    let (radix, body) = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        (16, hex)
    } else if let Some(bin) = body.strip_prefix("0b").or_else(|| body.strip_prefix("0B")) {
        (2, bin)
    } else if body.len() > 1 && body.starts_with('0') {
        (8, &body[1..])
    } else {
        (10, body)
    };
    if body.is_empty() || !body.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let magnitude = u64::from_str_radix(body, radix).ok()?;

    if long {
        if radix == 10 && magnitude > 1 << 63 {
            return None;
        }
        let value = magnitude as i64;
        Some(if negative { value.wrapping_neg() } else { value })
    } else {
        if radix == 10 && magnitude > 1 << 31 {
            return None;
        }
        let value = u32::try_from(magnitude).ok()? as i32;
        Some(i64::from(if negative { value.wrapping_neg() } else { value }))
    }
}
