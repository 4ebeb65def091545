use crate::predicates::method_annotated_with;
use crate::rules::{MethodCondition, MethodRule};

const CACHEABLE: &str = "org.springframework.cache.annotation.Cacheable";

/// Rule that detects `@Cacheable` methods called from within their own class.
///
/// Such calls skip the caching proxy, so the cache is never consulted. Only meaningful
/// when caching runs in proxy mode (the `@EnableCaching` default).
///
/// "Same class" means the class that declares the called method. A subclass calling an
/// inherited `@Cacheable` method on `this` is not reported.
pub(crate) fn cacheable_method_not_called_from_same_class() -> MethodRule {
    MethodRule::new(
        "CACHEABLE_SELF_INVOCATION",
        "Cacheable self-invocation",
        method_annotated_with(CACHEABLE),
        MethodCondition::NotBeCalledFromWithinTheSameClass,
    )
}
