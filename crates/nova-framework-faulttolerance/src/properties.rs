use std::collections::HashSet;

use nova_java_model::{Annotation, JavaModel, JavaType, SearchScope};
use nova_microprofile_metadata::{ItemMetadata, ProjectInfo, PropertiesCollector};

use crate::catalog::{
    AnnotationSpec, MP_FAULT_TOLERANCE_NONFALLBACK_ENABLED,
    MP_FAULT_TOLERANCE_NONFALLBACK_ENABLED_DESCRIPTION,
};
use crate::occurrence::{
    occurrences, parameter_value, type_annotation, AnnotationOccurrence, Target,
};
use crate::FaultToleranceError;

/// Provenance stamped on every descriptor of one naming tier.
struct Source<'a> {
    prefix: String,
    source_type: &'a str,
    source_method: Option<String>,
    binary: bool,
}

#[derive(Default)]
struct Deriver {
    collector: PropertiesCollector,
    used: Vec<&'static AnnotationSpec>,
    class_tiers: HashSet<(String, &'static str)>,
}

pub(crate) fn collect_properties(
    model: &dyn JavaModel,
    scope: SearchScope,
) -> Result<ProjectInfo, FaultToleranceError> {
    let ids = model.resolve_project(scope)?;
    let mut deriver = Deriver::default();

    for id in ids {
        let found = match occurrences(model, id) {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(
                    target = "nova.microprofile",
                    type_id = id.to_raw(),
                    error = %err,
                    "skipping unreadable type"
                );
                continue;
            }
        };
        for occurrence in &found {
            deriver.visit(model, occurrence);
        }
    }

    let info = deriver.finish();
    tracing::debug!(
        target = "nova.microprofile",
        ?scope,
        properties = info.properties.len(),
        hints = info.hints.len(),
        "collected fault tolerance properties"
    );
    Ok(info)
}

impl Deriver {
    fn visit(&mut self, model: &dyn JavaModel, occurrence: &AnnotationOccurrence<'_>) {
        let spec = occurrence.spec;
        if !self.used.iter().any(|u| std::ptr::eq(*u, spec)) {
            self.used.push(spec);
        }

        let ty = occurrence.declaring_type;
        match occurrence.target {
            Target::Type => self.class_tier(ty, spec, Some(occurrence.annotation)),
            Target::Method(method) => {
                self.class_tier(ty, spec, type_annotation(model, ty, spec));
                let source = Source {
                    prefix: format!("{}/{}/{}", ty.name, method.name, spec.simple_name()),
                    source_type: &ty.name,
                    source_method: Some(method.signature()),
                    binary: ty.is_binary(),
                };
                self.emit(spec, &source, Some(occurrence.annotation));
            }
            Target::Field(_) => {}
        }
    }

    fn class_tier(
        &mut self,
        ty: &JavaType,
        spec: &'static AnnotationSpec,
        annotation: Option<&Annotation>,
    ) {
        if !self
            .class_tiers
            .insert((ty.name.clone(), spec.qualified_name))
        {
            return;
        }
        let source = Source {
            prefix: format!("{}/{}", ty.name, spec.simple_name()),
            source_type: &ty.name,
            source_method: None,
            binary: ty.is_binary(),
        };
        self.emit(spec, &source, annotation);
    }

    fn emit(
        &mut self,
        spec: &'static AnnotationSpec,
        source: &Source<'_>,
        annotation: Option<&Annotation>,
    ) {
        // Required members are validated, never configured.
        for param in spec.parameters.iter().filter(|p| !p.is_required()) {
            let Some(default_value) = parameter_value(annotation, param) else {
                continue;
            };

            let mut item = ItemMetadata::new(format!("{}/{}", source.prefix, param.name), param.ty);
            item.description = Some(param.documentation());
            item.source_type = Some(source.source_type.to_string());
            item.source_method = source.source_method.clone();
            item.default_value = Some(default_value);
            item.binary = source.binary;

            if let Some(hint) = param.hint {
                if !self.collector.has_item_hint(hint.name) {
                    self.collector.add_item_hint(hint.to_item_hint());
                }
            }
            self.collector.add_item_metadata(item);
        }
    }

    fn finish(mut self) -> ProjectInfo {
        for spec in std::mem::take(&mut self.used) {
            self.emit_global(spec);
        }

        let mut toggle = ItemMetadata::new(MP_FAULT_TOLERANCE_NONFALLBACK_ENABLED, "boolean");
        toggle.description = Some(MP_FAULT_TOLERANCE_NONFALLBACK_ENABLED_DESCRIPTION.to_string());
        toggle.default_value = Some("false".to_string());
        self.collector.add_item_metadata(toggle);

        self.collector.into_project_info()
    }

    /// Global descriptors point at the annotation member itself.
    fn emit_global(&mut self, spec: &'static AnnotationSpec) {
        for param in spec.parameters {
            let Some(default_value) = param.default_value else {
                continue;
            };
            let mut item =
                ItemMetadata::new(format!("{}/{}", spec.simple_name(), param.name), param.ty);
            item.description = Some(param.documentation());
            item.source_type = Some(spec.qualified_name.to_string());
            item.source_method = param.source_method.map(str::to_string);
            item.default_value = Some(default_value.to_string());

            if let Some(hint) = param.hint {
                self.collector.add_item_hint(hint.to_item_hint());
            }
            self.collector.add_item_metadata(item);
        }
    }
}
