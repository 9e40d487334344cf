use nova_java_model::descriptor::erase;
use nova_java_model::{simple_name, JavaMethod, JavaModel, ModelError, Range, TypeId};

use crate::catalog::{FALLBACK_ANNOTATION, FALLBACK_METHOD_PARAMETER};
use crate::occurrence::{occurrences, Target};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FallbackProblem {
    /// No method with the referenced name exists on the enclosing type.
    MissingMethod { name: String },
    /// The only candidate cannot stand in for the annotated method.
    IncompatibleSignature { name: String, expected: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FallbackFinding {
    /// Range of the `fallbackMethod` value, quotes included.
    pub range: Range,
    pub problem: FallbackProblem,
}

/// Check every `@Fallback(fallbackMethod = ...)` declared on the type `id`.
pub(crate) fn validate_type(
    model: &dyn JavaModel,
    id: TypeId,
    check_signatures: bool,
) -> Result<Vec<FallbackFinding>, ModelError> {
    let methods = model.methods_of(id)?;
    let mut findings = Vec::new();

    for occurrence in occurrences(model, id)? {
        if occurrence.spec.qualified_name != FALLBACK_ANNOTATION {
            continue;
        }
        let Some(member) = occurrence.member(FALLBACK_METHOD_PARAMETER) else {
            continue;
        };
        let Some(name) = member.value.as_str() else {
            tracing::debug!(
                target = "nova.microprofile",
                class = %occurrence.declaring_type.name,
                "fallbackMethod is not a string literal"
            );
            continue;
        };
        if name.is_empty() {
            continue;
        }

        let range = model
            .source_range_of(member)
            .or(occurrence.annotation.range)
            .unwrap_or_default();

        let candidates: Vec<&JavaMethod> = methods.iter().filter(|m| m.name == name).collect();

        let problem = match (candidates.as_slice(), occurrence.target) {
            ([], _) => Some(FallbackProblem::MissingMethod {
                name: name.to_string(),
            }),
            ([candidate], Target::Method(annotated)) if check_signatures => {
                if is_compatible(annotated, candidate) {
                    None
                } else {
                    Some(FallbackProblem::IncompatibleSignature {
                        name: name.to_string(),
                        expected: expected_signature(name, annotated),
                    })
                }
            }
            _ => None,
        };

        if let Some(problem) = problem {
            findings.push(FallbackFinding { range, problem });
        }
    }

    Ok(findings)
}

fn same_type(a: &str, b: &str) -> bool {
    simple_name(&erase(a)) == simple_name(&erase(b))
}

/// A fallback must return what the annotated method returns and take either
/// the same parameters or none at all.
pub fn is_compatible(annotated: &JavaMethod, fallback: &JavaMethod) -> bool {
    if !same_type(&annotated.return_type, &fallback.return_type) {
        return false;
    }
    fallback.parameter_types.is_empty()
        || (fallback.parameter_types.len() == annotated.parameter_types.len()
            && annotated
                .parameter_types
                .iter()
                .zip(&fallback.parameter_types)
                .all(|(a, b)| same_type(a, b)))
}

/// Java-style signature a fallback for `annotated` is expected to have, e.g.
/// `String recover(int, List)`.
pub fn expected_signature(name: &str, annotated: &JavaMethod) -> String {
    let params = annotated
        .parameter_types
        .iter()
        .map(|p| display_type(p))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} {}({})", display_type(&annotated.return_type), name, params)
}

fn display_type(ty: &str) -> String {
    let erased = erase(ty);
    let dims = erased.matches("[]").count();
    let base = erased.trim_end_matches("[]");
    format!("{}{}", simple_name(base), "[]".repeat(dims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_java_model::{
        Annotation, AnnotationValue, JavaType, MemoryJavaModel, TypeKind, TypeOrigin,
    };
    use pretty_assertions::assert_eq;

    fn method(name: &str, ret: &str, params: &[&str]) -> JavaMethod {
        JavaMethod::new(
            name,
            ret,
            params.iter().map(|p| p.to_string()).collect(),
        )
    }

    fn fallback(target: &str) -> Annotation {
        Annotation::new(FALLBACK_ANNOTATION).with_member(
            FALLBACK_METHOD_PARAMETER,
            AnnotationValue::String(target.into()),
        )
    }

    fn validate(methods: Vec<JavaMethod>, check_signatures: bool) -> Vec<FallbackFinding> {
        let mut ty = JavaType::new(
            "org.acme.Resource",
            TypeKind::Class,
            TypeOrigin::Source {
                uri: "file:///Resource.java".into(),
            },
        );
        ty.methods = methods;
        let mut model = MemoryJavaModel::new();
        let id = model.add_type(ty);
        validate_type(&model, id, check_signatures).unwrap()
    }

    #[test]
    fn missing_fallback_method_is_reported() {
        let findings = validate(
            vec![method("hello", "java.lang.String", &[]).with_annotation(fallback("aaa"))],
            true,
        );
        assert_eq!(
            findings,
            vec![FallbackFinding {
                range: Range::default(),
                problem: FallbackProblem::MissingMethod { name: "aaa".into() },
            }]
        );
    }

    #[test]
    fn compatible_fallbacks_pass() {
        let annotated = method("hello", "java.lang.String", &["int", "java.util.List"])
            .with_annotation(fallback("recover"));
        assert!(validate(
            vec![annotated.clone(), method("recover", "String", &["int", "java.util.List<java.lang.String>"])],
            true
        )
        .is_empty());
        assert!(validate(
            vec![annotated, method("recover", "java.lang.String", &[])],
            true
        )
        .is_empty());
    }

    #[test]
    fn incompatible_single_candidate_is_reported() {
        let findings = validate(
            vec![
                method("hello", "java.lang.String", &["int"]).with_annotation(fallback("recover")),
                method("recover", "void", &["int"]),
            ],
            true,
        );
        assert_eq!(
            findings[0].problem,
            FallbackProblem::IncompatibleSignature {
                name: "recover".into(),
                expected: "String recover(int)".into(),
            }
        );
    }

    #[test]
    fn signature_check_can_be_disabled() {
        let findings = validate(
            vec![
                method("hello", "java.lang.String", &["int"]).with_annotation(fallback("recover")),
                method("recover", "void", &["int"]),
            ],
            false,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn overloads_only_need_to_exist() {
        let findings = validate(
            vec![
                method("hello", "java.lang.String", &[]).with_annotation(fallback("recover")),
                method("recover", "void", &["int"]),
                method("recover", "void", &["long"]),
            ],
            true,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn non_literal_or_absent_references_are_ignored() {
        let constant = Annotation::new(FALLBACK_ANNOTATION).with_member(
            FALLBACK_METHOD_PARAMETER,
            AnnotationValue::Constant {
                owner: None,
                name: "FALLBACK".into(),
            },
        );
        let findings = validate(
            vec![
                method("a", "void", &[]).with_annotation(constant),
                method("b", "void", &[]).with_annotation(Annotation::new(FALLBACK_ANNOTATION)),
            ],
            true,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn expected_signature_uses_simple_names() {
        let annotated = method(
            "hello",
            "java.util.concurrent.CompletionStage<java.lang.String>",
            &["java.lang.String[]", "int"],
        );
        assert_eq!(
            expected_signature("recover", &annotated),
            "CompletionStage recover(String[], int)"
        );
    }
}
