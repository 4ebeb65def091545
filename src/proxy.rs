use std::fmt;

use crate::descriptor::method_display;
use crate::ir::{Class, Method, Violation};

/// Reason a subclass- or interface-based proxy cannot intercept a method.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ProxyObstacle {
    PrivateMethod,
    StaticMethod,
    FinalMethod,
    FinalClass,
}

impl fmt::Display for ProxyObstacle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ProxyObstacle::PrivateMethod => "method is private",
            ProxyObstacle::StaticMethod => "method is static",
            ProxyObstacle::FinalMethod => "method is final",
            ProxyObstacle::FinalClass => "declaring class is final",
        };
        f.write_str(text)
    }
}

pub(crate) fn proxy_obstacles(class: &Class, method: &Method) -> Vec<ProxyObstacle> {
    let mut obstacles = Vec::new();
    if method.access.is_private {
        obstacles.push(ProxyObstacle::PrivateMethod);
    }
    if method.access.is_static {
        obstacles.push(ProxyObstacle::StaticMethod);
    }
    if method.access.is_final {
        obstacles.push(ProxyObstacle::FinalMethod);
    }
    if class.access.is_final {
        obstacles.push(ProxyObstacle::FinalClass);
    }
    obstacles
}

pub(crate) fn is_proxyable(class: &Class, method: &Method) -> bool {
    proxy_obstacles(class, method).is_empty()
}

/// Violation for a method a proxy cannot intercept, or `None` when it is proxyable.
pub(crate) fn proxyability_violation(class: &Class, method: &Method) -> Option<Violation> {
    if is_proxyable(class, method) {
        return None;
    }
    let obstacles = proxy_obstacles(class, method);
    let key = method.key();
    let reasons: Vec<String> = obstacles.iter().map(ToString::to_string).collect();
    Some(Violation {
        description: format!(
            "Method <{}> is not proxyable: {}",
            method_display(&key),
            reasons.join(", ")
        ),
        method: key,
        line: None,
    })
}
