use crate::descriptor::method_display;
use crate::engine::{AnalysisContext, ModelError};
use crate::ir::{CallEdge, MethodKey, Violation};

/// Report every call to `methods` that comes from the class declaring the called method.
///
/// Output follows the order of `methods`, then the order of the recorded call edges.
/// Edges point at the declaring method, so subclass calls to inherited methods never match.
pub(crate) fn find_self_invocations<'a, I>(
    context: &AnalysisContext,
    methods: I,
) -> Result<Vec<Violation>, ModelError>
where
    I: IntoIterator<Item = &'a MethodKey>,
{
    let mut violations = Vec::new();
    for method in methods {
        for call in context.callers_of(method)? {
            if call.origin_class() == call.target_class() {
                violations.push(Violation {
                    method: method.clone(),
                    description: describe_call(context, call),
                    line: call.line,
                });
            }
        }
    }
    Ok(violations)
}

fn describe_call(context: &AnalysisContext, call: &CallEdge) -> String {
    let mut description = format!(
        "Method <{}> calls method <{}>",
        method_display(&call.origin),
        method_display(&call.target)
    );
    let source_file = context
        .class(call.origin_class())
        .and_then(|class| class.source_file.as_deref());
    if let (Some(source_file), Some(line)) = (source_file, call.line) {
        description.push_str(&format!(" in ({source_file}:{line})"));
    }
    description
}
