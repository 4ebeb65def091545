use std::str::FromStr;

use jdescriptor::{DescriptorError, MethodDescriptor, TypeDescriptor};

use crate::ir::MethodKey;

/// Java source names of the parameter types in a JVM method descriptor.
pub(crate) fn parameter_types(descriptor: &str) -> Result<Vec<String>, DescriptorError> {
    let descriptor = MethodDescriptor::from_str(descriptor)?;
    Ok(descriptor.parameter_types().iter().map(java_name).collect())
}

/// Render a method as `com.example.Type.name(param.Type, int)`.
///
/// Falls back to the raw descriptor when it cannot be parsed.
pub(crate) fn method_display(key: &MethodKey) -> String {
    match parameter_types(&key.descriptor) {
        Ok(params) => format!("{}.{}({})", key.class, key.name, params.join(", ")),
        Err(_) => key.to_string(),
    }
}

fn java_name(descriptor: &TypeDescriptor) -> String {
    match descriptor {
        TypeDescriptor::Byte => "byte".to_string(),
        TypeDescriptor::Char => "char".to_string(),
        TypeDescriptor::Double => "double".to_string(),
        TypeDescriptor::Float => "float".to_string(),
        TypeDescriptor::Integer => "int".to_string(),
        TypeDescriptor::Long => "long".to_string(),
        TypeDescriptor::Short => "short".to_string(),
        TypeDescriptor::Boolean => "boolean".to_string(),
        TypeDescriptor::Void => "void".to_string(),
        TypeDescriptor::Array(component, dimensions) => {
            format!("{}{}", java_name(component), "[]".repeat(usize::from(*dimensions)))
        }
        TypeDescriptor::Object(name) => name.replace('/', "."),
    }
}
