use anyhow::Result;
use rayon::prelude::*;
use serde_sarif::sarif::{
    ArtifactLocation, Location, LogicalLocation, Message, PhysicalLocation, Region,
    Result as SarifResult,
};
use tracing::debug;

use crate::descriptor::method_display;
use crate::engine::AnalysisContext;
use crate::ir::{Class, Method, MethodKey, Violation};
use crate::predicates::DescribedPredicate;
use crate::proxy::proxyability_violation;
use crate::self_invocation::find_self_invocations;

pub(crate) mod cache;
pub(crate) mod retry;

/// Metadata describing an analysis rule.
#[derive(Clone, Debug)]
pub(crate) struct RuleMetadata {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) description: String,
}

/// Rule interface for analysis execution.
pub(crate) trait Rule: Send + Sync {
    fn metadata(&self) -> RuleMetadata;
    fn run(&self, context: &AnalysisContext) -> Result<Vec<SarifResult>>;
}

/// What every method selected by a [`MethodRule`] must satisfy.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum MethodCondition {
    NotBeCalledFromWithinTheSameClass,
    BeProxyable,
}

impl MethodCondition {
    pub(crate) fn description(self) -> &'static str {
        match self {
            MethodCondition::NotBeCalledFromWithinTheSameClass => {
                "not be called from within the same class"
            }
            MethodCondition::BeProxyable => "be proxyable",
        }
    }
}

/// "Methods that <predicate> should <condition>", evaluated over analysis target classes.
pub(crate) struct MethodRule {
    id: String,
    name: String,
    that: DescribedPredicate<Method>,
    should: MethodCondition,
}

impl MethodRule {
    pub(crate) fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        that: DescribedPredicate<Method>,
        should: MethodCondition,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            that,
            should,
        }
    }

    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    fn matching_methods<'a>(&self, context: &'a AnalysisContext) -> Vec<(&'a Class, &'a Method)> {
        let candidates: Vec<(&Class, &Method)> = context
            .analysis_target_classes()
            .flat_map(|class| class.methods.iter().map(move |method| (class, method)))
            .collect();
        candidates
            .into_par_iter()
            .filter(|(_, method)| self.that.test(context, method))
            .collect()
    }

    fn violations(&self, context: &AnalysisContext) -> Result<Vec<Violation>> {
        let matched = self.matching_methods(context);
        debug!(rule = %self.id, matched = matched.len(), "selected methods");
        let violations = match self.should {
            MethodCondition::NotBeCalledFromWithinTheSameClass => {
                let keys: Vec<MethodKey> = matched.iter().map(|(_, method)| method.key()).collect();
                find_self_invocations(context, &keys)?
            }
            MethodCondition::BeProxyable => matched
                .iter()
                .filter_map(|(class, method)| proxyability_violation(class, method))
                .collect(),
        };
        Ok(violations)
    }
}

impl Rule for MethodRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: self.id.clone(),
            name: self.name.clone(),
            description: format!(
                "methods that are {} should {}",
                self.that.description(),
                self.should.description()
            ),
        }
    }

    fn run(&self, context: &AnalysisContext) -> Result<Vec<SarifResult>> {
        let results = self
            .violations(context)?
            .into_iter()
            .map(|violation| {
                let artifact_uri = context
                    .class(&violation.method.class)
                    .and_then(|class| context.class_artifact_uri(class));
                let location =
                    method_location_with_line(&violation.method, artifact_uri.as_deref(), violation.line);
                SarifResult::builder()
                    .rule_id(self.id.clone())
                    .message(result_message(violation.description))
                    .locations(vec![location])
                    .build()
            })
            .collect();
        Ok(results)
    }
}

/// Rules shipped with the tool, in reporting order.
pub(crate) fn builtin_rules() -> Vec<MethodRule> {
    vec![
        cache::cacheable_method_not_called_from_same_class(),
        retry::retryable_methods_are_proxyable(),
        retry::retryable_methods_not_called_from_same_class(),
    ]
}

pub(crate) fn method_location_with_line(
    method: &MethodKey,
    artifact_uri: Option<&str>,
    line: Option<u32>,
) -> Location {
    let logical = method_logical_location(method);
    let Some(uri) = artifact_uri else {
        return Location::builder().logical_locations(vec![logical]).build();
    };
    let artifact_location = ArtifactLocation::builder().uri(uri).build();
    let physical = match line {
        Some(line) => PhysicalLocation::builder()
            .artifact_location(artifact_location)
            .region(Region::builder().start_line(i64::from(line)).build())
            .build(),
        None => PhysicalLocation::builder()
            .artifact_location(artifact_location)
            .build(),
    };
    Location::builder()
        .physical_location(physical)
        .logical_locations(vec![logical])
        .build()
}

pub(crate) fn method_logical_location(method: &MethodKey) -> LogicalLocation {
    LogicalLocation::builder()
        .name(method_display(method))
        .kind("function")
        .build()
}

pub(crate) fn result_message(text: impl Into<String>) -> Message {
    Message::builder().text(text.into()).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicates::method_annotated_with;
    use crate::test_harness::{call_at, class, method};

    fn context_with_artifact(classes: Vec<Class>) -> AnalysisContext {
        let artifact = serde_sarif::sarif::Artifact::builder()
            .location(ArtifactLocation::builder().uri("model.json").build())
            .build();
        crate::engine::build_context(classes, &[artifact]).expect("context build")
    }

    #[test]
    fn method_rule_reports_with_rule_id_and_location() {
        let context = context_with_artifact(vec![
            class("com.example.App")
                .method(method("cached", "()V").annotated("com.example.Marker"))
                .method(method("run", "()V").calls(call_at("com.example.App", "cached", "()V", 7)))
                .build(),
        ]);
        let rule = MethodRule::new(
            "MARKER_SELF_INVOCATION",
            "Marker self-invocation",
            method_annotated_with("com.example.Marker"),
            MethodCondition::NotBeCalledFromWithinTheSameClass,
        );

        let results = rule.run(&context).expect("rule run");

        assert_eq!(1, results.len());
        let value = serde_json::to_value(&results[0]).expect("serialize result");
        assert_eq!("MARKER_SELF_INVOCATION", value["ruleId"]);
        let location = &value["locations"][0];
        assert_eq!("com.example.App.cached()", location["logicalLocations"][0]["name"]);
        assert_eq!("model.json", location["physicalLocation"]["artifactLocation"]["uri"]);
        assert_eq!(7, location["physicalLocation"]["region"]["startLine"]);
    }

    #[test]
    fn method_rule_ignores_library_classes() {
        let context = context_with_artifact(vec![
            class("com.example.Library")
                .library()
                .method(method("cached", "()V").annotated("com.example.Marker").private())
                .build(),
        ]);
        let rule = MethodRule::new(
            "MARKER_PROXYABLE",
            "Marker proxyable",
            method_annotated_with("com.example.Marker"),
            MethodCondition::BeProxyable,
        );

        assert!(rule.run(&context).expect("rule run").is_empty());
    }

    #[test]
    fn metadata_describes_predicate_and_condition() {
        let rule = MethodRule::new(
            "X",
            "x",
            method_annotated_with("com.example.Marker"),
            MethodCondition::BeProxyable,
        );

        assert_eq!(
            "methods that are annotated with @Marker should be proxyable",
            rule.metadata().description
        );
    }

    #[test]
    fn builtin_rule_ids_are_unique() {
        let mut ids: Vec<String> = builtin_rules()
            .iter()
            .map(|rule| rule.id().to_string())
            .collect();
        let count = ids.len();
        ids.sort();
        ids.dedup();

        assert_eq!(count, ids.len());
    }
}
