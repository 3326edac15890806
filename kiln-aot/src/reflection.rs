//! Narrow contract over the host runtime's reflection facilities. The pipeline only records
//! which types and operations must remain available after ahead-of-time compilation (see
//! [crate::hints]) - resolving and constructing types is the host's responsibility.

use crate::error::ReflectionError;
use crate::instance::ComponentInstanceAnyPtr;
use crate::registry::{ComponentDescriptor, ConstructionStrategy};
#[cfg(test)]
use mockall::automock;

/// Constructor for type-erased instances, given access to host reflection.
pub type ComponentConstructor =
    fn(reflection: &dyn TypeReflectionProvider) -> Result<ComponentInstanceAnyPtr, ReflectionError>;

/// Host runtime capability for resolving types by name, constructing instances, and invoking
/// methods reflectively. Errors are propagated, not recovered.
#[cfg_attr(test, automock)]
pub trait TypeReflectionProvider {
    /// Resolves a type by name and constructs an instance with the given arguments.
    fn construct(
        &self,
        type_name: &str,
        args: &[ComponentInstanceAnyPtr],
    ) -> Result<ComponentInstanceAnyPtr, ReflectionError>;

    /// Invokes a named method on an instance, returning its result, if any.
    fn invoke(
        &self,
        instance: ComponentInstanceAnyPtr,
        method_name: &str,
        args: &[ComponentInstanceAnyPtr],
    ) -> Result<Option<ComponentInstanceAnyPtr>, ReflectionError>;
}

/// Produces an instance for the given descriptor, honoring its construction strategy. Supplied
/// instances are returned as-is, including any wrapping applied during the decorating stage.
pub fn construct_component(
    descriptor: &ComponentDescriptor,
    reflection: &dyn TypeReflectionProvider,
) -> Result<ComponentInstanceAnyPtr, ReflectionError> {
    match descriptor.construction() {
        ConstructionStrategy::DefaultConstructor(constructor) => (constructor)(reflection),
        ConstructionStrategy::FactoryMethod { factory, .. } => (factory)(reflection),
        ConstructionStrategy::SuppliedInstance(instance) => Ok(instance.clone()),
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ReflectionError;
    use crate::instance::{ComponentInstanceAnyPtr, ComponentInstancePtr};
    use crate::reflection::{construct_component, MockTypeReflectionProvider};
    use crate::registry::{ComponentRegistry, ConstructionStrategy};

    struct TestComponent;

    #[test]
    fn should_construct_with_default_constructor() {
        let mut registry = ComponentRegistry::new();
        registry
            .register::<TestComponent>(
                "test",
                ConstructionStrategy::DefaultConstructor(|reflection| {
                    reflection.construct("TestComponent", &[])
                }),
            )
            .unwrap();

        let mut reflection = MockTypeReflectionProvider::new();
        reflection
            .expect_construct()
            .times(1)
            .returning(|_, _| Ok(ComponentInstancePtr::new(TestComponent) as ComponentInstanceAnyPtr));

        assert!(construct_component(registry.find("test").unwrap(), &reflection).is_ok());
    }

    #[test]
    fn should_forward_reflection_errors() {
        let mut registry = ComponentRegistry::new();
        registry
            .register::<TestComponent>(
                "test",
                ConstructionStrategy::DefaultConstructor(|reflection| {
                    reflection.construct("TestComponent", &[])
                }),
            )
            .unwrap();

        let mut reflection = MockTypeReflectionProvider::new();
        reflection
            .expect_construct()
            .times(1)
            .returning(|type_name, _| Err(ReflectionError::TypeNotFound(type_name.to_string())));

        assert_eq!(
            construct_component(registry.find("test").unwrap(), &reflection).unwrap_err(),
            ReflectionError::TypeNotFound("TestComponent".to_string())
        );
    }

    #[test]
    fn should_return_supplied_instance() {
        let mut registry = ComponentRegistry::new();
        registry
            .register::<TestComponent>(
                "test",
                ConstructionStrategy::SuppliedInstance(
                    ComponentInstancePtr::new(TestComponent) as ComponentInstanceAnyPtr
                ),
            )
            .unwrap();

        let reflection = MockTypeReflectionProvider::new();
        assert!(construct_component(registry.find("test").unwrap(), &reflection).is_ok());
    }
}
