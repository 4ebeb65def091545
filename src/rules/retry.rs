use crate::predicates::method_annotated_with;
use crate::rules::{MethodCondition, MethodRule};

const RETRYABLE: &str = "org.springframework.retry.annotation.Retryable";

/// Rule that checks a proxy can intercept every `@Retryable` method.
///
/// A method the proxy cannot override either fails context startup or silently runs
/// without retries.
pub(crate) fn retryable_methods_are_proxyable() -> MethodRule {
    MethodRule::new(
        "RETRYABLE_NOT_PROXYABLE",
        "Retryable method not proxyable",
        method_annotated_with(RETRYABLE),
        MethodCondition::BeProxyable,
    )
}

/// Rule that detects `@Retryable` methods called from within their own class.
///
/// Only meaningful when retry runs in proxy mode (see `@EnableRetry`). Calls from a
/// subclass to an inherited `@Retryable` method are not reported, since the check compares
/// against the declaring class.
pub(crate) fn retryable_methods_not_called_from_same_class() -> MethodRule {
    MethodRule::new(
        "RETRYABLE_SELF_INVOCATION",
        "Retryable self-invocation",
        method_annotated_with(RETRYABLE),
        MethodCondition::NotBeCalledFromWithinTheSameClass,
    )
}
