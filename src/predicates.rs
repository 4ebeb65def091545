use std::sync::Arc;

use crate::annotations::{AnnotationResolver, Element, Mode};
use crate::engine::AnalysisContext;
use crate::ir::{Class, Method};

type Test<T> = Arc<dyn Fn(&AnalysisContext, &T) -> bool + Send + Sync>;

/// Boolean test over program elements that carries a human-readable description.
pub(crate) struct DescribedPredicate<T> {
    description: String,
    test: Test<T>,
}

impl<T> Clone for DescribedPredicate<T> {
    fn clone(&self) -> Self {
        Self {
            description: self.description.clone(),
            test: Arc::clone(&self.test),
        }
    }
}

impl<T: 'static> DescribedPredicate<T> {
    pub(crate) fn new(
        description: impl Into<String>,
        test: impl Fn(&AnalysisContext, &T) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            test: Arc::new(test),
        }
    }

    pub(crate) fn test(&self, context: &AnalysisContext, element: &T) -> bool {
        (self.test)(context, element)
    }

    pub(crate) fn description(&self) -> &str {
        &self.description
    }

    pub(crate) fn described_as(self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            test: self.test,
        }
    }

    pub(crate) fn and(self, other: Self) -> Self {
        let description = format!("{} and {}", self.description, other.description);
        Self::new(description, move |context, element| {
            self.test(context, element) && other.test(context, element)
        })
    }

    pub(crate) fn or(self, other: Self) -> Self {
        let description = format!("{} or {}", self.description, other.description);
        Self::new(description, move |context, element| {
            self.test(context, element) || other.test(context, element)
        })
    }

    pub(crate) fn not(self) -> Self {
        let description = format!("not {}", self.description);
        Self::new(description, move |context, element| {
            !self.test(context, element)
        })
    }
}

impl DescribedPredicate<Class> {
    /// Reject classes carrying `marker` themselves, whatever the rest of the predicate says.
    ///
    /// Markers on supertypes do not count.
    pub(crate) fn unless_marked(self, marker: &str) -> Self {
        let description = format!("{} unless @{}", self.description, simple_name(marker));
        let marked = class_annotated_with(marker).for_class_only();
        self.and(marked.not()).described_as(description)
    }
}

/// Class annotation predicate whose lookup mode can still be widened.
pub(crate) struct ClassAnnotationPredicate {
    annotation_type: String,
    description: String,
}

impl ClassAnnotationPredicate {
    pub(crate) fn described_as(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Also match classes whose supertypes carry the annotation.
    pub(crate) fn for_subtype(self) -> DescribedPredicate<Class> {
        self.with_mode(Mode::Subtype)
    }

    pub(crate) fn for_class_only(self) -> DescribedPredicate<Class> {
        self.with_mode(Mode::Meta)
    }

    fn with_mode(self, mode: Mode) -> DescribedPredicate<Class> {
        let annotation_type = self.annotation_type;
        DescribedPredicate::new(self.description, move |context, class: &Class| {
            AnnotationResolver::new(context).is_annotated(Element::Class(class), &annotation_type, mode)
        })
    }
}

/// Classes directly or meta-annotated with `annotation_type`.
pub(crate) fn class_annotated_with(annotation_type: &str) -> ClassAnnotationPredicate {
    ClassAnnotationPredicate {
        annotation_type: annotation_type.to_string(),
        description: format!("annotated with @{}", simple_name(annotation_type)),
    }
}

/// Methods directly or meta-annotated with `annotation_type`.
pub(crate) fn method_annotated_with(annotation_type: &str) -> DescribedPredicate<Method> {
    let owned = annotation_type.to_string();
    DescribedPredicate::new(
        format!("annotated with @{}", simple_name(annotation_type)),
        move |context, method: &Method| {
            AnnotationResolver::new(context).is_annotated(Element::Method(method), &owned, Mode::Meta)
        },
    )
}

pub(crate) fn assignable_to(type_name: &str) -> DescribedPredicate<Class> {
    let owned = type_name.to_string();
    DescribedPredicate::new(
        format!("assignable to {type_name}"),
        move |context, class: &Class| AnnotationResolver::new(context).is_assignable_to(class, &owned),
    )
}

/// Methods whose declaring class satisfies `class_predicate`.
pub(crate) fn declared_in(class_predicate: DescribedPredicate<Class>) -> DescribedPredicate<Method> {
    DescribedPredicate::new(
        format!("declared in {}", class_predicate.description()),
        move |context, method: &Method| {
            context
                .class(&method.owner)
                .is_some_and(|class| class_predicate.test(context, class))
        },
    )
}

fn simple_name(type_name: &str) -> &str {
    type_name.rsplit('.').next().unwrap_or(type_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_harness::{class, context_for, method};

    fn always(description: &str, value: bool) -> DescribedPredicate<Class> {
        DescribedPredicate::new(description, move |_, _: &Class| value)
    }

    #[test]
    fn combinators_compose_logic_and_descriptions() {
        let context = context_for(vec![class("com.example.App").build()]);
        let app = context.class("com.example.App").expect("class");

        let both = always("yes", true).and(always("no", false));
        let either = always("yes", true).or(always("no", false));
        let negated = always("no", false).not();

        assert!(!both.test(&context, app));
        assert_eq!("yes and no", both.description());
        assert!(either.test(&context, app));
        assert_eq!("yes or no", either.description());
        assert!(negated.test(&context, app));
        assert_eq!("not no", negated.description());
    }

    #[test]
    fn described_as_replaces_description_only() {
        let context = context_for(vec![class("com.example.App").build()]);
        let app = context.class("com.example.App").expect("class");

        let predicate = always("a", true).or(always("b", false)).described_as("custom");

        assert_eq!("custom", predicate.description());
        assert!(predicate.test(&context, app));
    }

    #[test]
    fn method_predicate_sees_meta_annotations() {
        let context = context_for(vec![
            class("com.example.Cached")
                .annotated("org.springframework.cache.annotation.Cacheable")
                .build(),
            class("com.example.BookService")
                .method(method("findBook", "()V").annotated("com.example.Cached"))
                .method(method("save", "()V"))
                .build(),
        ]);
        let service = context.class("com.example.BookService").expect("class");
        let predicate = method_annotated_with("org.springframework.cache.annotation.Cacheable");

        assert_eq!("annotated with @Cacheable", predicate.description());
        assert!(predicate.test(&context, &service.methods[0]));
        assert!(!predicate.test(&context, &service.methods[1]));
    }

    #[test]
    fn declared_in_lifts_class_predicates_to_methods() {
        let context = context_for(vec![
            class("com.example.Base")
                .annotated("com.example.Marker")
                .build(),
            class("com.example.Child")
                .extends("com.example.Base")
                .method(method("run", "()V"))
                .build(),
        ]);
        let child = context.class("com.example.Child").expect("class");

        let inherited = declared_in(class_annotated_with("com.example.Marker").for_subtype());
        let own_only = declared_in(class_annotated_with("com.example.Marker").for_class_only());

        assert_eq!("declared in annotated with @Marker", inherited.description());
        assert!(inherited.test(&context, &child.methods[0]));
        assert!(!own_only.test(&context, &child.methods[0]));
    }

    #[test]
    fn exclusion_marker_on_the_element_disables_inherited_match() {
        let context = context_for(vec![
            class("com.example.Base").annotated("com.example.Marker").build(),
            class("com.example.Excluded")
                .extends("com.example.Base")
                .annotated("com.example.Skip")
                .build(),
            class("com.example.Included")
                .extends("com.example.Base")
                .build(),
        ]);
        let predicate = class_annotated_with("com.example.Marker")
            .for_subtype()
            .unless_marked("com.example.Skip");
        let excluded = context.class("com.example.Excluded").expect("class");
        let included = context.class("com.example.Included").expect("class");

        assert_eq!("annotated with @Marker unless @Skip", predicate.description());
        assert!(!predicate.test(&context, excluded));
        assert!(predicate.test(&context, included));
    }

    #[test]
    fn exclusion_marker_on_intermediate_ancestor_does_not_propagate() {
        let context = context_for(vec![
            class("com.example.Base").annotated("com.example.Marker").build(),
            class("com.example.Intermediate")
                .extends("com.example.Base")
                .annotated("com.example.Skip")
                .build(),
            class("com.example.Concrete")
                .extends("com.example.Intermediate")
                .build(),
        ]);
        let predicate = class_annotated_with("com.example.Marker")
            .for_subtype()
            .unless_marked("com.example.Skip");
        let intermediate = context.class("com.example.Intermediate").expect("class");
        let concrete = context.class("com.example.Concrete").expect("class");

        assert!(!predicate.test(&context, intermediate));
        assert!(predicate.test(&context, concrete));
    }

    #[test]
    fn predicates_are_shareable_across_threads() {
        let context = context_for(vec![
            class("com.example.A").annotated("com.example.Marker").build(),
            class("com.example.B").build(),
        ]);
        let predicate = class_annotated_with("com.example.Marker").for_class_only();
        let predicate = &predicate;
        let context = &context;

        let matched = std::thread::scope(|scope| {
            let handles: Vec<_> = context
                .all_classes()
                .map(|class| scope.spawn(move || predicate.test(context, class)))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("join"))
                .collect::<Vec<_>>()
        });

        assert_eq!(vec![true, false], matched);
    }
}
