use std::fmt;

use serde::Deserialize;

const JAVA_LANG_OBJECT: &str = "java.lang.Object";

/// Program model document emitted by the bytecode front end.
#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct ProgramModel {
    #[serde(default)]
    pub(crate) classes: Vec<Class>,
}

/// Intermediate representation for a class, interface or annotation type.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Class {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) super_name: Option<String>,
    #[serde(default)]
    pub(crate) interfaces: Vec<String>,
    #[serde(default)]
    pub(crate) access: ClassAccess,
    #[serde(default)]
    pub(crate) source_file: Option<String>,
    #[serde(default)]
    pub(crate) annotations: Vec<Annotation>,
    #[serde(default)]
    pub(crate) methods: Vec<Method>,
    #[serde(skip)]
    pub(crate) artifact_index: i64,
    #[serde(skip)]
    pub(crate) is_analysis_target: bool,
}

impl Class {
    /// Direct supertypes: superclass first, then interfaces in declaration order.
    ///
    /// A missing superclass means `java.lang.Object`, except for `java.lang.Object` itself.
    pub(crate) fn supertypes(&self) -> impl Iterator<Item = &str> {
        let super_name = match self.super_name.as_deref() {
            Some(name) => Some(name),
            None if self.name != JAVA_LANG_OBJECT => Some(JAVA_LANG_OBJECT),
            None => None,
        };
        super_name
            .into_iter()
            .chain(self.interfaces.iter().map(String::as_str))
    }
}

/// Class access flags used for proxy checks.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ClassAccess {
    pub(crate) is_final: bool,
}

/// Intermediate representation for a method and the calls it makes.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Method {
    pub(crate) name: String,
    pub(crate) descriptor: String,
    #[serde(default)]
    pub(crate) access: MethodAccess,
    #[serde(default)]
    pub(crate) annotations: Vec<Annotation>,
    #[serde(default)]
    pub(crate) calls: Vec<CallSite>,
    /// Declaring class, filled in when the analysis context is built.
    #[serde(skip)]
    pub(crate) owner: String,
}

impl Method {
    pub(crate) fn key(&self) -> MethodKey {
        MethodKey::new(&self.owner, &self.name, &self.descriptor)
    }
}

/// Method access flags that decide whether a proxy can intercept the method.
///
/// Other flags present in the document are ignored.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct MethodAccess {
    pub(crate) is_private: bool,
    pub(crate) is_static: bool,
    pub(crate) is_final: bool,
}

/// Annotation instance attached to a class or method. Attribute values are not read.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Annotation {
    pub(crate) type_name: String,
}

/// Call site recorded in a method body.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct CallSite {
    pub(crate) owner: String,
    pub(crate) name: String,
    pub(crate) descriptor: String,
    #[serde(default)]
    pub(crate) line: Option<u32>,
}

/// Stable identity of a method: declaring class, name and descriptor.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub(crate) struct MethodKey {
    pub(crate) class: String,
    pub(crate) name: String,
    pub(crate) descriptor: String,
}

impl MethodKey {
    pub(crate) fn new(class: &str, name: &str, descriptor: &str) -> Self {
        Self {
            class: class.to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        }
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.class, self.name, self.descriptor)
    }
}

/// Resolved static call edge between two methods of the model.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct CallEdge {
    pub(crate) origin: MethodKey,
    pub(crate) target: MethodKey,
    pub(crate) line: Option<u32>,
}

impl CallEdge {
    pub(crate) fn origin_class(&self) -> &str {
        &self.origin.class
    }

    pub(crate) fn target_class(&self) -> &str {
        &self.target.class
    }
}

/// A rule breach located at one method.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Violation {
    pub(crate) method: MethodKey,
    pub(crate) description: String,
    pub(crate) line: Option<u32>,
}
