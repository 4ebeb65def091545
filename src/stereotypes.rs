//! Predicates matching the Spring stereotypes.

use crate::ir::Class;
use crate::predicates::{DescribedPredicate, assignable_to, class_annotated_with};

const COMPONENT: &str = "org.springframework.stereotype.Component";
const CONTROLLER: &str = "org.springframework.stereotype.Controller";
const SERVICE: &str = "org.springframework.stereotype.Service";
const REPOSITORY: &str = "org.springframework.stereotype.Repository";
const CONFIGURATION: &str = "org.springframework.context.annotation.Configuration";
const DATA_REPOSITORY: &str = "org.springframework.data.repository.Repository";
const NO_REPOSITORY_BEAN: &str = "org.springframework.data.repository.NoRepositoryBean";

/// Classes annotated with `@Component` (directly, composed or inherited), or Spring Data
/// repositories.
pub(crate) fn spring_component() -> DescribedPredicate<Class> {
    class_annotated_with(COMPONENT)
        .for_subtype()
        .or(spring_data_repository())
        .described_as("Spring component")
}

/// Classes annotated with `@Controller`, which includes `@RestController`.
pub(crate) fn spring_controller() -> DescribedPredicate<Class> {
    class_annotated_with(CONTROLLER)
        .described_as("Spring controller")
        .for_subtype()
}

pub(crate) fn spring_service() -> DescribedPredicate<Class> {
    class_annotated_with(SERVICE)
        .described_as("Spring service")
        .for_subtype()
}

/// Classes annotated with `@Repository`, or Spring Data repositories.
pub(crate) fn spring_repository() -> DescribedPredicate<Class> {
    class_annotated_with(REPOSITORY)
        .for_subtype()
        .or(spring_data_repository())
        .described_as("Spring repository")
}

pub(crate) fn spring_configuration() -> DescribedPredicate<Class> {
    class_annotated_with(CONFIGURATION)
        .described_as("Spring configuration")
        .for_subtype()
}

/// Spring Data repository interfaces, minus the ones marked `@NoRepositoryBean`.
fn spring_data_repository() -> DescribedPredicate<Class> {
    assignable_to(DATA_REPOSITORY)
        .unless_marked(NO_REPOSITORY_BEAN)
        .described_as("Spring Data repository")
}
