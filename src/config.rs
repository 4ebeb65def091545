use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::ir::Class;
use crate::predicates::{DescribedPredicate, declared_in, method_annotated_with};
use crate::rules::{MethodCondition, MethodRule, builtin_rules};
use crate::stereotypes;

/// User rule configuration: built-in rules to switch off and extra rules to declare.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RuleConfig {
    #[serde(default)]
    pub(crate) disabled: Vec<String>,
    #[serde(default)]
    pub(crate) rules: Vec<CustomRule>,
}

/// Rule declared in the configuration file for another proxy-backed annotation.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CustomRule {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) name: Option<String>,
    pub(crate) annotation: String,
    pub(crate) condition: ConditionConfig,
    #[serde(default)]
    pub(crate) declared_in: Option<Stereotype>,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ConditionConfig {
    NotCalledFromSameClass,
    BeProxyable,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Stereotype {
    Component,
    Controller,
    Service,
    Repository,
    Configuration,
}

impl Stereotype {
    fn predicate(self) -> DescribedPredicate<Class> {
        match self {
            Stereotype::Component => stereotypes::spring_component(),
            Stereotype::Controller => stereotypes::spring_controller(),
            Stereotype::Service => stereotypes::spring_service(),
            Stereotype::Repository => stereotypes::spring_repository(),
            Stereotype::Configuration => stereotypes::spring_configuration(),
        }
    }
}

pub(crate) fn load_config(path: &Path) -> Result<RuleConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("failed to parse {}", path.display()))
}

/// Built-in rules minus the disabled ones, followed by the custom rules in declaration order.
pub(crate) fn configured_rules(config: &RuleConfig) -> Result<Vec<MethodRule>> {
    let mut rules = builtin_rules();
    let mut ids: BTreeSet<String> = rules.iter().map(|rule| rule.id().to_string()).collect();
    for custom in &config.rules {
        if !ids.insert(custom.id.clone()) {
            anyhow::bail!("rule id {} is declared more than once", custom.id);
        }
        rules.push(custom_rule(custom));
    }

    let disabled: BTreeSet<&str> = config.disabled.iter().map(String::as_str).collect();
    for id in &disabled {
        if !ids.contains(*id) {
            warn!(rule = %id, "disabled rule is unknown");
        }
    }
    rules.retain(|rule| !disabled.contains(rule.id()));
    Ok(rules)
}

fn custom_rule(custom: &CustomRule) -> MethodRule {
    let mut that = method_annotated_with(&custom.annotation);
    if let Some(stereotype) = custom.declared_in {
        that = that.and(declared_in(stereotype.predicate()));
    }
    let should = match custom.condition {
        ConditionConfig::NotCalledFromSameClass => {
            MethodCondition::NotBeCalledFromWithinTheSameClass
        }
        ConditionConfig::BeProxyable => MethodCondition::BeProxyable,
    };
    let name = custom.name.clone().unwrap_or_else(|| custom.id.clone());
    MethodRule::new(custom.id.clone(), name, that, should)
}
