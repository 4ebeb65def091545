use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde_sarif::sarif::Artifact;
use thiserror::Error;
use tracing::{debug, warn};

use crate::ir::{CallEdge, CallSite, Class, MethodKey};

/// Broken preconditions of the program model handed over by the front end.
#[derive(Debug, Error)]
pub(crate) enum ModelError {
    #[error(
        "call from {origin} targets {owner}.{name}{descriptor}, which is declared neither in {owner} nor in its supertypes"
    )]
    UnresolvedCallTarget {
        origin: MethodKey,
        owner: String,
        name: String,
        descriptor: String,
    },
    #[error("method {0} is not part of the program model")]
    UnknownMethod(MethodKey),
}

/// Read-only view over the program model shared by every rule of a run.
pub(crate) struct AnalysisContext {
    classes: Vec<Class>,
    class_index: BTreeMap<String, usize>,
    meta_annotations: BTreeMap<String, Vec<String>>,
    callers: BTreeMap<MethodKey, Vec<CallEdge>>,
    artifact_uris: Vec<Option<String>>,
}

impl AnalysisContext {
    pub(crate) fn all_classes(&self) -> impl Iterator<Item = &Class> {
        self.classes.iter()
    }

    pub(crate) fn analysis_target_classes(&self) -> impl Iterator<Item = &Class> {
        self.all_classes().filter(|class| class.is_analysis_target)
    }

    pub(crate) fn class(&self, name: &str) -> Option<&Class> {
        self.class_index.get(name).map(|index| &self.classes[*index])
    }

    /// Annotation types present on the given annotation type; empty when it is unknown.
    pub(crate) fn meta_annotations_of(&self, annotation_type: &str) -> &[String] {
        self.meta_annotations
            .get(annotation_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Direct supertypes of the named class; empty when the class is outside the model.
    pub(crate) fn supertypes_of(&self, class_name: &str) -> Vec<&str> {
        self.class(class_name)
            .map(|class| class.supertypes().collect())
            .unwrap_or_default()
    }

    /// Incoming call edges of a method, in model order.
    pub(crate) fn callers_of(&self, key: &MethodKey) -> Result<&[CallEdge], ModelError> {
        self.callers
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| ModelError::UnknownMethod(key.clone()))
    }

    pub(crate) fn class_artifact_uri(&self, class: &Class) -> Option<String> {
        usize::try_from(class.artifact_index)
            .ok()
            .and_then(|index| self.artifact_uris.get(index))
            .cloned()
            .flatten()
    }

    pub(crate) fn class_count(&self) -> usize {
        self.classes.len()
    }
}

/// Build the analysis context, indexing annotations and incoming calls once per run.
pub(crate) fn build_context(
    classes: Vec<Class>,
    artifacts: &[Artifact],
) -> Result<AnalysisContext, ModelError> {
    let mut unique = Vec::with_capacity(classes.len());
    let mut class_index = BTreeMap::new();
    for mut class in classes {
        if class_index.contains_key(&class.name) {
            warn!(class = %class.name, "duplicate class definition ignored");
            continue;
        }
        for method in &mut class.methods {
            method.owner = class.name.clone();
        }
        class_index.insert(class.name.clone(), unique.len());
        unique.push(class);
    }

    let meta_annotations = unique
        .iter()
        .map(|class| {
            let types = class
                .annotations
                .iter()
                .map(|annotation| annotation.type_name.clone())
                .collect();
            (class.name.clone(), types)
        })
        .collect();

    let artifact_uris = artifacts
        .iter()
        .map(|artifact| {
            artifact
                .location
                .as_ref()
                .and_then(|location| location.uri.clone())
        })
        .collect();

    let mut context = AnalysisContext {
        classes: unique,
        class_index,
        meta_annotations,
        callers: BTreeMap::new(),
        artifact_uris,
    };
    context.callers = index_callers(&context)?;
    debug!(
        classes = context.classes.len(),
        methods = context.callers.len(),
        "analysis context built"
    );
    Ok(context)
}

fn index_callers(
    context: &AnalysisContext,
) -> Result<BTreeMap<MethodKey, Vec<CallEdge>>, ModelError> {
    let mut callers: BTreeMap<MethodKey, Vec<CallEdge>> = BTreeMap::new();
    for class in &context.classes {
        for method in &class.methods {
            callers.entry(method.key()).or_default();
        }
    }
    for class in &context.classes {
        for method in &class.methods {
            let origin = method.key();
            for call in &method.calls {
                let Some(target) = resolve_call_target(context, &origin, call)? else {
                    continue;
                };
                callers.entry(target.clone()).or_default().push(CallEdge {
                    origin: origin.clone(),
                    target,
                    line: call.line,
                });
            }
        }
    }
    Ok(callers)
}

/// Find the declaring method of a call: the owner first, then its supertypes breadth-first.
///
/// Returns `None` for calls that leave the model.
fn resolve_call_target(
    context: &AnalysisContext,
    origin: &MethodKey,
    call: &CallSite,
) -> Result<Option<MethodKey>, ModelError> {
    if context.class(&call.owner).is_none() {
        return Ok(None);
    }
    let mut seen = BTreeSet::new();
    let mut queue = VecDeque::from([call.owner.as_str()]);
    let mut leaves_model = false;
    while let Some(name) = queue.pop_front() {
        if !seen.insert(name) {
            continue;
        }
        let Some(class) = context.class(name) else {
            leaves_model = true;
            continue;
        };
        let declared = class
            .methods
            .iter()
            .any(|method| method.name == call.name && method.descriptor == call.descriptor);
        if declared {
            return Ok(Some(MethodKey::new(name, &call.name, &call.descriptor)));
        }
        queue.extend(class.supertypes());
    }
    if leaves_model {
        return Ok(None);
    }
    Err(ModelError::UnresolvedCallTarget {
        origin: origin.clone(),
        owner: call.owner.clone(),
        name: call.name.clone(),
        descriptor: call.descriptor.clone(),
    })
}
