//! Builders for program model fixtures used across rule and resolver tests.

use crate::engine::{AnalysisContext, build_context};
use crate::ir::{Annotation, CallSite, Class, ClassAccess, Method, MethodAccess};

pub(crate) struct ClassBuilder {
    class: Class,
}

pub(crate) fn class(name: &str) -> ClassBuilder {
    ClassBuilder {
        class: Class {
            name: name.to_string(),
            super_name: None,
            interfaces: Vec::new(),
            access: ClassAccess::default(),
            source_file: Some(format!(
                "{}.java",
                name.rsplit('.').next().unwrap_or(name)
            )),
            annotations: Vec::new(),
            methods: Vec::new(),
            artifact_index: 0,
            is_analysis_target: true,
        },
    }
}

impl ClassBuilder {
    pub(crate) fn extends(mut self, super_name: &str) -> Self {
        self.class.super_name = Some(super_name.to_string());
        self
    }

    pub(crate) fn implements(mut self, interface: &str) -> Self {
        self.class.interfaces.push(interface.to_string());
        self
    }

    pub(crate) fn annotated(mut self, type_name: &str) -> Self {
        self.class.annotations.push(annotation(type_name));
        self
    }

    pub(crate) fn final_class(mut self) -> Self {
        self.class.access.is_final = true;
        self
    }

    pub(crate) fn library(mut self) -> Self {
        self.class.is_analysis_target = false;
        self
    }

    pub(crate) fn method(mut self, method: MethodBuilder) -> Self {
        self.class.methods.push(method.method);
        self
    }

    pub(crate) fn build(self) -> Class {
        self.class
    }
}

pub(crate) struct MethodBuilder {
    method: Method,
}

pub(crate) fn method(name: &str, descriptor: &str) -> MethodBuilder {
    MethodBuilder {
        method: Method {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            access: MethodAccess::default(),
            annotations: Vec::new(),
            calls: Vec::new(),
            owner: String::new(),
        },
    }
}

impl MethodBuilder {
    pub(crate) fn annotated(mut self, type_name: &str) -> Self {
        self.method.annotations.push(annotation(type_name));
        self
    }

    pub(crate) fn calls(mut self, call: CallSite) -> Self {
        self.method.calls.push(call);
        self
    }

    pub(crate) fn private(mut self) -> Self {
        self.method.access.is_private = true;
        self
    }

    pub(crate) fn static_method(mut self) -> Self {
        self.method.access.is_static = true;
        self
    }

    pub(crate) fn final_method(mut self) -> Self {
        self.method.access.is_final = true;
        self
    }
}

pub(crate) fn annotation(type_name: &str) -> Annotation {
    Annotation {
        type_name: type_name.to_string(),
    }
}

pub(crate) fn call(owner: &str, name: &str, descriptor: &str) -> CallSite {
    CallSite {
        owner: owner.to_string(),
        name: name.to_string(),
        descriptor: descriptor.to_string(),
        line: None,
    }
}

pub(crate) fn call_at(owner: &str, name: &str, descriptor: &str, line: u32) -> CallSite {
    CallSite {
        line: Some(line),
        ..call(owner, name, descriptor)
    }
}

pub(crate) fn context_for(classes: Vec<Class>) -> AnalysisContext {
    build_context(classes, &[]).expect("context build")
}

/// Spring stereotype and Spring Data annotation types as they appear on the classpath.
pub(crate) fn spring_annotation_types() -> Vec<Class> {
    vec![
        class("org.springframework.stereotype.Component")
            .library()
            .build(),
        class("org.springframework.stereotype.Service")
            .annotated("org.springframework.stereotype.Component")
            .library()
            .build(),
        class("org.springframework.stereotype.Repository")
            .annotated("org.springframework.stereotype.Component")
            .library()
            .build(),
        class("org.springframework.stereotype.Controller")
            .annotated("org.springframework.stereotype.Component")
            .library()
            .build(),
        class("org.springframework.web.bind.annotation.RestController")
            .annotated("org.springframework.stereotype.Controller")
            .library()
            .build(),
        class("org.springframework.context.annotation.Configuration")
            .annotated("org.springframework.stereotype.Component")
            .library()
            .build(),
        class("org.springframework.data.repository.Repository")
            .library()
            .build(),
        class("org.springframework.data.repository.NoRepositoryBean")
            .library()
            .build(),
    ]
}
