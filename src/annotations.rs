use std::collections::{BTreeSet, VecDeque};

use crate::engine::AnalysisContext;
use crate::ir::{Annotation, Class, Method};

/// How far an annotation lookup may look beyond the element itself.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub(crate) enum Mode {
    /// Only annotations declared on the element.
    Direct,
    /// Declared annotations and everything they are (transitively) meta-annotated with.
    Meta,
    /// Meta lookup on the class and on all of its supertypes. Same as `Meta` for methods.
    Subtype,
}

/// Program element an annotation query runs against.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Element<'a> {
    Class(&'a Class),
    Method(&'a Method),
}

impl<'a> Element<'a> {
    fn annotations(self) -> &'a [Annotation] {
        match self {
            Element::Class(class) => &class.annotations,
            Element::Method(method) => &method.annotations,
        }
    }

    fn annotation_types(self) -> impl Iterator<Item = &'a str> {
        self.annotations()
            .iter()
            .map(|annotation| annotation.type_name.as_str())
    }
}

/// Answers "is this element annotated with X" over one analysis context.
#[derive(Clone, Copy)]
pub(crate) struct AnnotationResolver<'a> {
    context: &'a AnalysisContext,
}

impl<'a> AnnotationResolver<'a> {
    pub(crate) fn new(context: &'a AnalysisContext) -> Self {
        Self { context }
    }

    pub(crate) fn is_annotated(self, element: Element<'a>, annotation_type: &str, mode: Mode) -> bool {
        match (mode, element) {
            (Mode::Direct, _) => search(element.annotation_types(), no_edges, |node| {
                node == annotation_type
            }),
            (Mode::Meta, _) | (Mode::Subtype, Element::Method(_)) => search(
                element.annotation_types(),
                |node| self.meta_edges(node),
                |node| node == annotation_type,
            ),
            (Mode::Subtype, Element::Class(class)) => search(
                [class.name.as_str()],
                |node| self.context.supertypes_of(node),
                |node| {
                    self.context.class(node).is_some_and(|ancestor| {
                        self.is_annotated(Element::Class(ancestor), annotation_type, Mode::Meta)
                    })
                },
            ),
        }
    }

    /// Whether `class` is `type_name` or transitively extends or implements it.
    pub(crate) fn is_assignable_to(self, class: &'a Class, type_name: &str) -> bool {
        search(
            [class.name.as_str()],
            |node| self.context.supertypes_of(node),
            |node| node == type_name,
        )
    }

    fn meta_edges(self, annotation_type: &str) -> Vec<&'a str> {
        self.context
            .meta_annotations_of(annotation_type)
            .iter()
            .map(String::as_str)
            .collect()
    }
}

fn no_edges<'a>(_: &'a str) -> Vec<&'a str> {
    Vec::new()
}

/// Breadth-first search from `roots` along `expand` until `found` holds.
///
/// Each node is visited at most once, so cyclic graphs terminate.
fn search<'a, R, E, F>(roots: R, mut expand: E, mut found: F) -> bool
where
    R: IntoIterator<Item = &'a str>,
    E: FnMut(&'a str) -> Vec<&'a str>,
    F: FnMut(&'a str) -> bool,
{
    let mut seen = BTreeSet::new();
    let mut queue: VecDeque<&'a str> = roots.into_iter().collect();
    while let Some(node) = queue.pop_front() {
        if !seen.insert(node) {
            continue;
        }
        if found(node) {
            return true;
        }
        queue.extend(expand(node));
    }
    false
}
