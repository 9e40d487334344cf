//! Static catalog of the MicroProfile Fault Tolerance annotations.
//!
//! The catalog is hand-maintained from the `microprofile-fault-tolerance-api`
//! Javadoc. Documentation strings reproduce the Markdown the Javadoc renders to,
//! including its `**Returns:**` block, so clients show the same hover text as
//! for the annotation sources themselves.

use std::collections::HashMap;
use std::sync::OnceLock;

use nova_java_model::Annotation;
use nova_microprofile_metadata::{ItemHint, ValueHint};

pub const ASYNCHRONOUS_ANNOTATION: &str = "org.eclipse.microprofile.faulttolerance.Asynchronous";
pub const BULKHEAD_ANNOTATION: &str = "org.eclipse.microprofile.faulttolerance.Bulkhead";
pub const CIRCUIT_BREAKER_ANNOTATION: &str =
    "org.eclipse.microprofile.faulttolerance.CircuitBreaker";
pub const FALLBACK_ANNOTATION: &str = "org.eclipse.microprofile.faulttolerance.Fallback";
pub const RETRY_ANNOTATION: &str = "org.eclipse.microprofile.faulttolerance.Retry";
pub const TIMEOUT_ANNOTATION: &str = "org.eclipse.microprofile.faulttolerance.Timeout";

pub const FALLBACK_METHOD_PARAMETER: &str = "fallbackMethod";

/// Source tag attached to every diagnostic of this crate.
pub const DIAGNOSTIC_SOURCE: &str = "microprofile-faulttolerance";

pub const MP_FAULT_TOLERANCE_NONFALLBACK_ENABLED: &str = "MP_Fault_Tolerance_NonFallback_Enabled";
pub const MP_FAULT_TOLERANCE_NONFALLBACK_ENABLED_DESCRIPTION: &str = "Some service mesh platforms, e.g. Istio, have their own Fault Tolerance policy. The operation team might want to use the platform Fault Tolerance. In order to fix the fault tolerance policy, the property `MP_Fault_Tolerance_NonFallback_Enabled` with the value of `false` can be specified to disable all fault tolerance policies except `@Fallback`.";

pub const CHRONO_UNIT_TYPE: &str = "java.time.temporal.ChronoUnit";

const FAULT_TOLERANCE_DEFINITION_EXCEPTION: &str =
    "`org.eclipse.microprofile.faulttolerance.exceptions.FaultToleranceDefinitionException`";

/// Suggested values for an enum-typed parameter.
#[derive(Debug)]
pub struct EnumHint {
    pub name: &'static str,
    pub values: &'static [&'static str],
}

impl EnumHint {
    pub fn to_item_hint(&self) -> ItemHint {
        ItemHint {
            name: self.name.to_string(),
            description: None,
            source_type: Some(self.name.to_string()),
            is_enum: true,
            binary: true,
            values: self.values.iter().map(|v| ValueHint::new(*v)).collect(),
        }
    }
}

pub const CHRONO_UNIT: &EnumHint = &EnumHint {
    name: CHRONO_UNIT_TYPE,
    values: &[
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
    ],
};

#[derive(Debug)]
pub struct AnnotationSpec {
    pub qualified_name: &'static str,
    pub parameters: &'static [ParameterSpec],
}

impl AnnotationSpec {
    pub fn simple_name(&self) -> &'static str {
        let name = self.qualified_name;
        name.rsplit('.').next().unwrap_or(name)
    }

    pub fn parameter(&self, name: &str) -> Option<&'static ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

#[derive(Debug)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub ty: &'static str,
    /// Configuration literal of the default. `None` marks a required parameter.
    pub default_value: Option<&'static str>,
    pub summary: Option<&'static str>,
    pub returns: Option<&'static str>,
    /// Member name plus JVM descriptor on the annotation type, e.g. `value()I`.
    pub source_method: Option<&'static str>,
    pub hint: Option<&'static EnumHint>,
}

impl ParameterSpec {
    pub fn is_required(&self) -> bool {
        self.default_value.is_none()
    }

    pub fn documentation(&self) -> String {
        let summary = self.summary.unwrap_or_default();
        match self.returns {
            None => summary.to_string(),
            Some(returns) => {
                let block = format!(" *  **Returns:**\n    \n     *  {returns}");
                if summary.is_empty() {
                    block
                } else {
                    format!("{summary}\n\n{block}")
                }
            }
        }
    }
}

const fn param(
    name: &'static str,
    ty: &'static str,
    default_value: Option<&'static str>,
    summary: Option<&'static str>,
    returns: &'static str,
    source_method: &'static str,
) -> ParameterSpec {
    ParameterSpec {
        name,
        ty,
        default_value,
        summary,
        returns: Some(returns),
        source_method: Some(source_method),
        hint: None,
    }
}

const fn unit_param(
    name: &'static str,
    summary: Option<&'static str>,
    returns: &'static str,
    source_method: &'static str,
) -> ParameterSpec {
    ParameterSpec {
        hint: Some(CHRONO_UNIT),
        ..param(name, CHRONO_UNIT_TYPE, Some("MILLIS"), summary, returns, source_method)
    }
}

const fn classes_param(
    name: &'static str,
    default_value: &'static str,
    summary: &'static str,
    returns: &'static str,
    source_method: &'static str,
) -> ParameterSpec {
    param(
        name,
        "java.lang.Class<? extends java.lang.Throwable>[]",
        Some(default_value),
        Some(summary),
        returns,
        source_method,
    )
}

const ENABLED: ParameterSpec = ParameterSpec {
    name: "enabled",
    ty: "boolean",
    default_value: Some("true"),
    summary: Some("Enabling the policy"),
    returns: None,
    source_method: None,
    hint: None,
};

static ANNOTATIONS: [AnnotationSpec; 6] = [
    AnnotationSpec {
        qualified_name: ASYNCHRONOUS_ANNOTATION,
        parameters: &[ENABLED],
    },
    AnnotationSpec {
        qualified_name: BULKHEAD_ANNOTATION,
        parameters: &[
            param(
                "value",
                "int",
                Some("10"),
                Some(concat!(
                    "Specify the maximum number of concurrent calls to an instance. The value must be greater than 0. Otherwise, ",
                    "`org.eclipse.microprofile.faulttolerance.exceptions.FaultToleranceDefinitionException`",
                    " occurs."
                )),
                "the limit of the concurrent calls",
                "value()I",
            ),
            param(
                "waitingTaskQueue",
                "int",
                Some("10"),
                Some(concat!(
                    "Specify the waiting task queue. This setting only takes effect on asynchronous invocation. The value must be greater than 0. Otherwise, ",
                    "`org.eclipse.microprofile.faulttolerance.exceptions.FaultToleranceDefinitionException`",
                    " occurs."
                )),
                "the size of the waiting queue of the asynchronous calls",
                "waitingTaskQueue()I",
            ),
            ENABLED,
        ],
    },
    AnnotationSpec {
        qualified_name: CIRCUIT_BREAKER_ANNOTATION,
        parameters: &[
            classes_param(
                "failOn",
                "java.lang.Throwable",
                "The list of exception types which should be considered failures. Note that if a method throws a Throwable which is not an Error or Exception, non-portable behavior results.",
                "the exception types which should be considered failures",
                "failOn()[Ljava/lang/Class;",
            ),
            classes_param(
                "skipOn",
                "",
                "The list of exception types which should not be considered failures. This list takes priority over the types listed in failOn.",
                "the exception types which should not be considered failures",
                "skipOn()[Ljava/lang/Class;",
            ),
            param(
                "delay",
                "long",
                Some("5000"),
                Some("The delay after which an open circuit will transitions to half-open state. The amount of delay is taken from this delay value and the delayUnit, and defaults to five seconds. The value must be greater than or equal to 0. 0 means no delay."),
                "The delay time after which an open circuit transitions to half-open state",
                "delay()J",
            ),
            unit_param(
                "delayUnit",
                Some("The unit of the delay after which an open circuit will transitions to half-open state."),
                "The unit of the delay",
                "delayUnit()Ljava/time/temporal/ChronoUnit;",
            ),
            param(
                "requestVolumeThreshold",
                "int",
                Some("20"),
                Some("The number of consecutive requests in a rolling window. The value must be greater than or equal to 1."),
                "The number of the consecutive requests in a rolling window",
                "requestVolumeThreshold()I",
            ),
            param(
                "failureRatio",
                "double",
                Some("0.5"),
                Some("The ratio of failures within the rolling window that will trip the circuit to open. The value must be between 0 and 1 (inclusive)."),
                "The failure ratio to trip the circuit",
                "failureRatio()D",
            ),
            param(
                "successThreshold",
                "int",
                Some("1"),
                Some("The number of successful executions, before a half-open circuit is closed again. The value must be greater than or equal to 1."),
                "The success threshold to fully close the circuit",
                "successThreshold()I",
            ),
            ENABLED,
        ],
    },
    AnnotationSpec {
        qualified_name: FALLBACK_ANNOTATION,
        parameters: &[
            param(
                "value",
                "java.lang.Class<? extends org.eclipse.microprofile.faulttolerance.FallbackHandler<?>>",
                Some("org.eclipse.microprofile.faulttolerance.Fallback$DEFAULT"),
                Some(concat!(
                    "Specify the fallback class to be used. An new instance of the fallback class is returned. The instance is unmanaged. The type parameter of the fallback class must be assignable to the return type of the annotated method. Otherwise, ",
                    "`org.eclipse.microprofile.faulttolerance.exceptions.FaultToleranceDefinitionException`",
                    " occurs."
                )),
                "the fallback class",
                "value()Ljava/lang/Class;",
            ),
            param(
                FALLBACK_METHOD_PARAMETER,
                "java.lang.String",
                None,
                Some("Specify the method name to be fallbacked to. This method belongs to the same class as the method to fallback. The method must have the exactly same arguments as the method being annotated. The method return type must be assignable to the return type of the method the fallback is for."),
                "the local method to fallback to",
                "fallbackMethod()Ljava/lang/String;",
            ),
            classes_param(
                "applyOn",
                "java.lang.Throwable",
                "The list of exception types which should trigger Fallback.",
                "the exception types which should trigger Fallback",
                "applyOn()[Ljava/lang/Class;",
            ),
            classes_param(
                "skipOn",
                "",
                "The list of exception types which should not trigger Fallback. This list takes priority over the types listed in applyOn.",
                "the exception types which should not trigger Fallback",
                "skipOn()[Ljava/lang/Class;",
            ),
            ENABLED,
        ],
    },
    AnnotationSpec {
        qualified_name: RETRY_ANNOTATION,
        parameters: &[
            param(
                "maxRetries",
                "int",
                Some("3"),
                None,
                "The max number of retries. -1 means retry forever. The value must be greater than or equal to -1.",
                "maxRetries()I",
            ),
            param(
                "delay",
                "long",
                Some("0"),
                Some("The delay between retries. Defaults to 0. The value must be greater than or equal to 0."),
                "the delay time",
                "delay()J",
            ),
            unit_param(
                "delayUnit",
                None,
                "the delay unit",
                "delayUnit()Ljava/time/temporal/ChronoUnit;",
            ),
            param(
                "maxDuration",
                "long",
                Some("180000"),
                Some("The max duration. The max duration must be greater than the delay duration if set. 0 means not set."),
                "the maximum duration to perform retries for",
                "maxDuration()J",
            ),
            unit_param(
                "durationUnit",
                None,
                "the duration unit",
                "durationUnit()Ljava/time/temporal/ChronoUnit;",
            ),
            param(
                "jitter",
                "long",
                Some("200"),
                Some("Set the jitter to randomly vary retry delays for. The value must be greater than or equals to 0. 0 means not set. The effective delay will be [delay - jitter, delay + jitter] and always greater than or equal to 0. Negative effective delays will be 0."),
                "the jitter that randomly vary retry delays by. e.g. a jitter of 200 milliseconds will randomly add between -200 and 200 milliseconds to each retry delay.",
                "jitter()J",
            ),
            unit_param(
                "jitterDelayUnit",
                None,
                "the jitter delay unit",
                "jitterDelayUnit()Ljava/time/temporal/ChronoUnit;",
            ),
            classes_param(
                "retryOn",
                "java.lang.Exception",
                "The list of exception types that should trigger a retry. Note that if a method throws a Throwable which is not an Error or Exception, non-portable behavior results.",
                "the exception types on which to retry",
                "retryOn()[Ljava/lang/Class;",
            ),
            classes_param(
                "abortOn",
                "",
                "The list of exception types that should not trigger a retry. This list takes priority over the types listed in retryOn.",
                "the exception types on which to abort (not retry)",
                "abortOn()[Ljava/lang/Class;",
            ),
            ENABLED,
        ],
    },
    AnnotationSpec {
        qualified_name: TIMEOUT_ANNOTATION,
        parameters: &[
            param(
                "value",
                "long",
                Some("1000"),
                Some(concat!(
                    "The timeout value. The value must be greater than or equal to 0. 0 means no timeout configured. Otherwise, ",
                    "`org.eclipse.microprofile.faulttolerance.exceptions.FaultToleranceDefinitionException`",
                    " occurs."
                )),
                "the timeout value",
                "value()J",
            ),
            unit_param(
                "unit",
                Some("The timeout unit. Defaults to milliseconds."),
                "the timeout unit",
                "unit()Ljava/time/temporal/ChronoUnit;",
            ),
            ENABLED,
        ],
    },
];

/// All supported annotations, in catalog order.
pub fn annotations() -> &'static [AnnotationSpec] {
    &ANNOTATIONS
}

/// Look up an annotation by its qualified name.
pub fn lookup(qualified_name: &str) -> Option<&'static AnnotationSpec> {
    static INDEX: OnceLock<HashMap<&'static str, &'static AnnotationSpec>> = OnceLock::new();
    INDEX
        .get_or_init(|| {
            ANNOTATIONS
                .iter()
                .map(|spec| (spec.qualified_name, spec))
                .collect()
        })
        .get(qualified_name)
        .copied()
}

/// Find the catalog entry an annotation occurrence denotes, if any.
///
/// Annotation names the model could not resolve are matched by simple name.
pub fn resolve(annotation: &Annotation) -> Option<&'static AnnotationSpec> {
    lookup(&annotation.name).or_else(|| {
        ANNOTATIONS
            .iter()
            .find(|spec| annotation.matches(spec.qualified_name))
    })
}
