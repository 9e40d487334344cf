use nova_framework_faulttolerance::catalog::{
    self, CHRONO_UNIT_TYPE, MP_FAULT_TOLERANCE_NONFALLBACK_ENABLED,
};
use nova_framework_faulttolerance::{FaultToleranceAnalyzer, ProjectInfo, SearchScope};
use nova_java_model::{MemoryJavaModel, ProjectBuilder};
use pretty_assertions::assert_eq;
use serde_json::json;

const MY_CLIENT: &str = include_str!("fixtures/MyClient.java");
const REMOTE_SERVICE: &str = include_str!("fixtures/RemoteService.java");
const FAULT_TOLERANT_RESOURCE: &str = include_str!("fixtures/FaultTolerantResource.java");
const ALL_POLICIES: &str = include_str!("fixtures/AllPolicies.java");

fn project(sources: &[(&str, &str)], dependencies: &[(&str, &str)]) -> MemoryJavaModel {
    let mut builder = ProjectBuilder::new("demo");
    for (uri, text) in sources {
        builder.add_source(*uri, *text);
    }
    for (uri, text) in dependencies {
        builder.add_dependency_source(*uri, *text);
    }
    builder.build().expect("fixtures parse")
}

fn my_client() -> MemoryJavaModel {
    project(
        &[("file:///src/org/acme/MyClient.java", MY_CLIENT)],
        &[("jar:///lib.jar!/org/lib/RemoteService.java", REMOTE_SERVICE)],
    )
}

fn properties(model: &MemoryJavaModel, scope: SearchScope) -> ProjectInfo {
    FaultToleranceAnalyzer::new()
        .properties(model, scope)
        .expect("project resolves")
}

fn default_of<'a>(info: &'a ProjectInfo, name: &str) -> Option<&'a str> {
    info.property(name)?.default_value.as_deref()
}

#[test]
fn source_properties_are_ordered_by_tier() {
    let info = properties(&my_client(), SearchScope::SourcesOnly);
    let names: Vec<_> = info.properties.iter().map(|p| p.name.as_str()).collect();

    let retry_params = [
        "maxRetries",
        "delay",
        "delayUnit",
        "maxDuration",
        "durationUnit",
        "jitter",
        "jitterDelayUnit",
        "retryOn",
        "abortOn",
        "enabled",
    ];
    let bulkhead_params = ["value", "waitingTaskQueue", "enabled"];

    let mut expected = Vec::new();
    expected.extend(retry_params.iter().map(|p| format!("org.acme.MyClient/Retry/{p}")));
    expected.extend(
        retry_params
            .iter()
            .map(|p| format!("org.acme.MyClient/serviceA/Retry/{p}")),
    );
    expected.extend(
        bulkhead_params
            .iter()
            .map(|p| format!("org.acme.MyClient/Bulkhead/{p}")),
    );
    expected.extend(
        bulkhead_params
            .iter()
            .map(|p| format!("org.acme.MyClient/serviceB/Bulkhead/{p}")),
    );
    expected.push("org.acme.MyClient/Asynchronous/enabled".to_string());
    expected.push("org.acme.MyClient/serviceB/Asynchronous/enabled".to_string());
    expected.extend(retry_params.iter().map(|p| format!("Retry/{p}")));
    expected.extend(bulkhead_params.iter().map(|p| format!("Bulkhead/{p}")));
    expected.push("Asynchronous/enabled".to_string());
    expected.push(MP_FAULT_TOLERANCE_NONFALLBACK_ENABLED.to_string());

    assert_eq!(names, expected);
}

#[test]
fn explicit_values_override_catalog_defaults() {
    let info = properties(&my_client(), SearchScope::SourcesOnly);

    assert_eq!(default_of(&info, "org.acme.MyClient/Retry/delay"), Some("100"));
    assert_eq!(
        default_of(&info, "org.acme.MyClient/Retry/delayUnit"),
        Some("SECONDS")
    );
    assert_eq!(default_of(&info, "org.acme.MyClient/Retry/maxRetries"), Some("3"));

    assert_eq!(
        default_of(&info, "org.acme.MyClient/serviceA/Retry/maxRetries"),
        Some("90")
    );
    assert_eq!(default_of(&info, "org.acme.MyClient/serviceA/Retry/delay"), Some("0"));

    assert_eq!(default_of(&info, "org.acme.MyClient/Bulkhead/value"), Some("10"));
    assert_eq!(
        default_of(&info, "org.acme.MyClient/serviceB/Bulkhead/value"),
        Some("15")
    );
    assert_eq!(
        info.property("org.acme.MyClient/serviceB/Bulkhead/value")
            .and_then(|p| p.source_method.as_deref()),
        Some("serviceB(Ljava/lang/String;)Ljava/util/concurrent/CompletionStage;")
    );
}

#[test]
fn method_property_wire_shape() {
    let info = properties(&my_client(), SearchScope::SourcesOnly);
    let item = info
        .property("org.acme.MyClient/serviceA/Retry/maxRetries")
        .unwrap();
    assert_eq!(
        serde_json::to_value(item).unwrap(),
        json!({
            "name": "org.acme.MyClient/serviceA/Retry/maxRetries",
            "type": "int",
            "description": " *  **Returns:**\n    \n     *  The max number of retries. -1 means retry forever. The value must be greater than or equal to -1.",
            "sourceType": "org.acme.MyClient",
            "sourceMethod": "serviceA()V",
            "defaultValue": "90",
            "required": false,
            "phase": 0,
            "binary": false,
        })
    );
}

#[test]
fn global_properties_carry_catalog_defaults() {
    let info = properties(&my_client(), SearchScope::SourcesOnly);
    for spec in catalog::annotations() {
        for param in spec.parameters {
            let name = format!("{}/{}", spec.simple_name(), param.name);
            let Some(item) = info.property(&name) else {
                continue;
            };
            assert_eq!(item.default_value.as_deref(), param.default_value, "{name}");
            assert_eq!(item.source_type.as_deref(), Some(spec.qualified_name), "{name}");
            assert_eq!(item.source_method.as_deref(), param.source_method, "{name}");
            assert!(!item.binary, "{name}");
        }
    }
    assert_eq!(
        info.property("Bulkhead/value").and_then(|p| p.source_method.as_deref()),
        Some("value()I")
    );
    assert!(info.property("Timeout/value").is_none());
}

#[test]
fn chrono_unit_hint_is_reported_once() {
    let info = properties(&my_client(), SearchScope::SourcesAndDependencies);
    assert_eq!(info.hints.len(), 1);

    let hint = info.hint(CHRONO_UNIT_TYPE).unwrap();
    let values: Vec<_> = hint.values.iter().map(|v| v.value.as_str()).collect();
    assert_eq!(
        values,
        vec![
            "NANOS",
            "MICROS",
            "MILLIS",
            "SECONDS",
            "MINUTES",
            "HALF_DAYS",
            "DAYS",
            "WEEKS",
            "MONTHS",
            "YEARS",
            "DECADES",
            "CENTURIES",
            "MILLENNIA",
            "ERAS",
            "FOREVER",
        ]
    );
    assert!(hint.values.iter().all(|v| v.description.is_none()));
    assert!(hint.binary);
    assert_eq!(hint.source_type.as_deref(), Some(CHRONO_UNIT_TYPE));
}

#[test]
fn toggle_is_present_exactly_once() {
    for model in [MemoryJavaModel::new(), my_client()] {
        for scope in [SearchScope::SourcesOnly, SearchScope::SourcesAndDependencies] {
            let info = properties(&model, scope);
            let toggles: Vec<_> = info
                .properties
                .iter()
                .filter(|p| p.name == MP_FAULT_TOLERANCE_NONFALLBACK_ENABLED)
                .collect();
            assert_eq!(toggles.len(), 1);
            assert_eq!(toggles[0].default_value.as_deref(), Some("false"));
            assert_eq!(toggles[0].ty, "boolean");
        }
    }
}

#[test]
fn dependency_types_are_binary_and_scoped() {
    let model = my_client();

    let sources = properties(&model, SearchScope::SourcesOnly);
    assert!(sources
        .properties
        .iter()
        .all(|p| !p.name.starts_with("org.lib.")));

    let all = properties(&model, SearchScope::SourcesAndDependencies);
    let timeout = all.property("org.lib.RemoteService/Timeout/value").unwrap();
    assert_eq!(timeout.default_value.as_deref(), Some("2000"));
    assert!(timeout.binary);
    assert_eq!(
        default_of(&all, "org.lib.RemoteService/fetch/Retry/abortOn"),
        Some("java.lang.IllegalArgumentException,java.lang.IllegalStateException")
    );
    assert_eq!(default_of(&all, "org.lib.RemoteService/fetch/Retry/retryOn"), Some("java.lang.Exception"));
    assert!(!all.property("Timeout/value").unwrap().binary);
}

#[test]
fn fallback_method_is_never_a_property() {
    let model = project(
        &[(
            "file:///src/org/acme/FaultTolerantResource.java",
            FAULT_TOLERANT_RESOURCE,
        )],
        &[],
    );
    let info = properties(&model, SearchScope::SourcesOnly);

    assert!(info
        .properties
        .iter()
        .all(|p| !p.name.ends_with("/fallbackMethod")));
    assert!(info.properties.iter().all(|p| !p.required));
    assert_eq!(
        default_of(&info, "org.acme.FaultTolerantResource/hello/Fallback/value"),
        Some("org.eclipse.microprofile.faulttolerance.Fallback$DEFAULT")
    );
    assert_eq!(
        default_of(&info, "Fallback/value"),
        Some("org.eclipse.microprofile.faulttolerance.Fallback$DEFAULT")
    );
}

#[test]
fn class_tier_defaults_match_the_catalog_for_every_annotation() {
    let model = project(
        &[("file:///src/org/acme/AllPolicies.java", ALL_POLICIES)],
        &[],
    );
    let info = properties(&model, SearchScope::SourcesOnly);

    let mut configurable = 0;
    for spec in catalog::annotations() {
        for param in spec.parameters {
            let class_tier = format!("org.acme.AllPolicies/{}/{}", spec.simple_name(), param.name);
            let global = format!("{}/{}", spec.simple_name(), param.name);
            match param.default_value {
                Some(default) => {
                    configurable += 1;
                    assert_eq!(default_of(&info, &class_tier), Some(default), "{class_tier}");
                    assert_eq!(default_of(&info, &global), Some(default), "{global}");
                    let item = info.property(&class_tier).unwrap();
                    assert_eq!(item.source_type.as_deref(), Some("org.acme.AllPolicies"));
                    assert_eq!(item.source_method, None, "{class_tier}");
                }
                None => {
                    assert!(info.property(&class_tier).is_none(), "{class_tier}");
                    assert!(info.property(&global).is_none(), "{global}");
                }
            }
        }
    }
    assert_eq!(info.properties.len(), configurable * 2 + 1);

    assert_eq!(
        default_of(&info, "org.acme.AllPolicies/CircuitBreaker/failOn"),
        Some("java.lang.Throwable")
    );
    assert_eq!(
        default_of(&info, "org.acme.AllPolicies/CircuitBreaker/failureRatio"),
        Some("0.5")
    );
    assert_eq!(
        default_of(&info, "org.acme.AllPolicies/Fallback/applyOn"),
        Some("java.lang.Throwable")
    );
    assert_eq!(default_of(&info, "org.acme.AllPolicies/Fallback/skipOn"), Some(""));

    assert_eq!(info.hints.len(), 1);
    assert_eq!(info.hints[0].name, CHRONO_UNIT_TYPE);
}

#[test]
fn deriving_twice_is_stable() {
    let model = my_client();
    let first = properties(&model, SearchScope::SourcesAndDependencies);
    let second = properties(&model, SearchScope::SourcesAndDependencies);
    assert_eq!(first, second);
}

#[test]
fn first_descriptor_wins_on_name_collisions() {
    // The same class declared twice (e.g. a stale copy in another source root).
    let stale = MY_CLIENT.replace("maxRetries = 90", "maxRetries = 7");
    let model = project(
        &[
            ("file:///src/org/acme/MyClient.java", MY_CLIENT),
            ("file:///old/org/acme/MyClient.java", stale.as_str()),
        ],
        &[],
    );
    let info = properties(&model, SearchScope::SourcesOnly);
    let matching: Vec<_> = info
        .properties
        .iter()
        .filter(|p| p.name == "org.acme.MyClient/serviceA/Retry/maxRetries")
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].default_value.as_deref(), Some("90"));
}
