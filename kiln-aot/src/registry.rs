//! Functionality related to registering descriptors of components discovered during the
//! ahead-of-time pass. Descriptors carry identity, declared type, and construction metadata, and
//! accumulate [Decoration]s contributed by [processors](crate::processor) and
//! [decorators](crate::decorate). Descriptors can be registered manually or gathered from
//! statically registered definitions (see [internal]).

use crate::error::ComponentRegistryError;
use crate::instance::{ComponentInstanceAnyPtr, WrapperFunctionPtr};
use crate::reflection::ComponentConstructor;
use derivative::Derivative;
use fxhash::FxHashMap;
use std::any::{type_name, TypeId};
use std::path::PathBuf;
use tracing::debug;

/// How an instance of a registered component comes into existence. The pipeline itself never
/// instantiates components - construction metadata is recorded for the host runtime.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub enum ConstructionStrategy {
    /// Construct with the type's default constructor.
    DefaultConstructor(#[derivative(Debug = "ignore")] ComponentConstructor),
    /// Construct by calling a named factory method.
    FactoryMethod {
        factory_name: String,
        #[derivative(Debug = "ignore")]
        factory: ComponentConstructor,
    },
    /// An already-constructed singleton supplied at registration time.
    SuppliedInstance(#[derivative(Debug = "ignore")] ComponentInstanceAnyPtr),
}

/// Provenance data baked into a generated wrapper at generation time. The values are captured
/// once and never re-evaluated on later invocations.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct Provenance {
    /// Wall-clock milliseconds since the unix epoch, fixed at generation time.
    pub compiled_at_millis: u64,
    /// Filesystem path of the build, fixed at generation time.
    pub source_path: PathBuf,
}

/// Generated behavior attached to a single [ComponentDescriptor] at build time. A decoration is
/// owned exclusively by its descriptor and is never retargeted.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct Decoration {
    /// Identity of the processor or decorator which produced this decoration.
    pub produced_by: String,
    /// Generated wrapper augmenting the original instance.
    #[derivative(Debug = "ignore")]
    pub wrapper: WrapperFunctionPtr,
    /// Optional provenance baked in at generation time.
    pub provenance: Option<Provenance>,
}

/// Recorded identity, declared type, and construction strategy for a registrable component.
/// The identity is immutable; the decoration list grows as the pass progresses.
#[derive(Clone, Debug)]
pub struct ComponentDescriptor {
    name: String,
    type_id: TypeId,
    type_name: &'static str,
    construction: ConstructionStrategy,
    decorations: Vec<Decoration>,
}

impl ComponentDescriptor {
    /// Unique name of this component within its registry.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn construction(&self) -> &ConstructionStrategy {
        &self.construction
    }

    /// Decorations attached so far, in attachment order.
    pub fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }

    /// Checks if this descriptor declares the given type.
    pub fn is_type<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Attaches a decoration unless one from the same producer is already present, which keeps
    /// repeated chain runs idempotent. Returns whether the decoration was attached.
    pub(crate) fn attach_decoration(&mut self, decoration: Decoration) -> bool {
        if self
            .decorations
            .iter()
            .any(|existing| existing.produced_by == decoration.produced_by)
        {
            return false;
        }

        self.decorations.push(decoration);
        true
    }

    /// Applies a wrapper to an already-supplied instance. Called exactly once per decoration,
    /// during the decorating stage - later lookups observe the wrapped instance.
    pub(crate) fn wrap_supplied_instance(&mut self, wrapper: &WrapperFunctionPtr) {
        if let ConstructionStrategy::SuppliedInstance(instance) = &mut self.construction {
            *instance = (wrapper)(instance.clone());
        }
    }
}

/// Registry of named component descriptors populated during the initialization pass. Names are
/// unique for the registry's lifetime and registration order is preserved, since later
/// processors may depend on earlier registrations being visible.
#[derive(Default, Debug)]
pub struct ComponentRegistry {
    descriptors: Vec<ComponentDescriptor>,
    names: FxHashMap<String, usize>,
    frozen: bool,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    /// Registers a descriptor for the given type. Fails with
    /// [DuplicateComponentName](ComponentRegistryError::DuplicateComponentName) on a name
    /// collision, leaving the registry unchanged, and with
    /// [RegistryFrozen](ComponentRegistryError::RegistryFrozen) once processing has started.
    pub fn register<T: 'static>(
        &mut self,
        name: &str,
        construction: ConstructionStrategy,
    ) -> Result<&ComponentDescriptor, ComponentRegistryError> {
        self.register_described(name, TypeId::of::<T>(), type_name::<T>(), construction)
    }

    /// Registers a descriptor from explicit type information. Useful when the type handle comes
    /// from a statically registered definition rather than a generic parameter.
    pub fn register_described(
        &mut self,
        name: &str,
        type_id: TypeId,
        type_name: &'static str,
        construction: ConstructionStrategy,
    ) -> Result<&ComponentDescriptor, ComponentRegistryError> {
        if self.frozen {
            return Err(ComponentRegistryError::RegistryFrozen(name.to_string()));
        }

        if self.names.contains_key(name) {
            return Err(ComponentRegistryError::DuplicateComponentName(
                name.to_string(),
            ));
        }

        debug!("Registering component descriptor '{name}' of type {type_name}.");

        let index = self.descriptors.len();
        self.descriptors.push(ComponentDescriptor {
            name: name.to_string(),
            type_id,
            type_name,
            construction,
            decorations: vec![],
        });
        self.names.insert(name.to_string(), index);

        Ok(&self.descriptors[index])
    }

    /// Returns all descriptors in registration order.
    pub fn all(&self) -> impl Iterator<Item = &ComponentDescriptor> {
        self.descriptors.iter()
    }

    /// Returns the descriptor with the given name.
    pub fn find(&self, name: &str) -> Result<&ComponentDescriptor, ComponentRegistryError> {
        self.names
            .get(name)
            .and_then(|index| self.descriptors.get(*index))
            .ok_or_else(|| ComponentRegistryError::ComponentNotFound(name.to_string()))
    }

    /// Checks if there's a descriptor with the given name.
    pub fn is_name_registered(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Checks if the given type is present in this registry.
    pub fn is_registered(&self, type_id: TypeId) -> bool {
        self.descriptors
            .iter()
            .any(|descriptor| descriptor.type_id == type_id)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Rejects further registrations. Called when the pass leaves the populating stage.
    pub(crate) fn freeze(&mut self) {
        self.frozen = true;
    }

    pub(crate) fn descriptor_at(&self, index: usize) -> &ComponentDescriptor {
        &self.descriptors[index]
    }

    pub(crate) fn attach_decoration_at(&mut self, index: usize, decoration: Decoration) -> bool {
        self.descriptors[index].attach_decoration(decoration)
    }

    pub(crate) fn wrap_supplied_instance_at(&mut self, index: usize, wrapper: &WrapperFunctionPtr) {
        self.descriptors[index].wrap_supplied_instance(wrapper);
    }
}

#[doc(hidden)]
pub mod internal {
    use crate::registry::ConstructionStrategy;
    use inventory::collect;
    pub use inventory::submit;
    use std::any::TypeId;

    #[derive(Clone)]
    pub struct DescriptorMetadata {
        pub name: &'static str,
        pub type_id: TypeId,
        pub type_name: &'static str,
        pub construction: ConstructionStrategy,
    }

    pub struct DescriptorRegisterer {
        pub register: fn() -> DescriptorMetadata,
    }

    collect!(DescriptorRegisterer);
}

#[cfg(test)]
mod tests {
    use crate::error::ComponentRegistryError;
    use crate::instance::{identity_wrapper, ComponentInstanceAnyPtr, ComponentInstancePtr};
    use crate::registry::{ComponentRegistry, ConstructionStrategy, Decoration};

    struct TestComponent;

    fn default_construction() -> ConstructionStrategy {
        ConstructionStrategy::DefaultConstructor(|_| {
            Ok(ComponentInstancePtr::new(TestComponent) as ComponentInstanceAnyPtr)
        })
    }

    #[test]
    fn should_register_descriptor() {
        let mut registry = ComponentRegistry::new();
        registry
            .register::<TestComponent>("test", default_construction())
            .unwrap();

        assert!(registry.is_name_registered("test"));
        assert!(registry.is_registered(std::any::TypeId::of::<TestComponent>()));
        assert!(registry.find("test").unwrap().is_type::<TestComponent>());
    }

    #[test]
    fn should_preserve_registration_order() {
        let mut registry = ComponentRegistry::new();
        for name in ["a", "b", "c"] {
            registry
                .register::<TestComponent>(name, default_construction())
                .unwrap();
        }

        let names = registry
            .all()
            .map(|descriptor| descriptor.name().to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn should_not_register_duplicate_name() {
        let mut registry = ComponentRegistry::new();
        registry
            .register::<TestComponent>("test", default_construction())
            .unwrap();

        assert_eq!(
            registry
                .register::<TestComponent>("test", default_construction())
                .unwrap_err(),
            ComponentRegistryError::DuplicateComponentName("test".to_string())
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn should_not_register_after_freezing() {
        let mut registry = ComponentRegistry::new();
        registry.freeze();

        assert_eq!(
            registry
                .register::<TestComponent>("test", default_construction())
                .unwrap_err(),
            ComponentRegistryError::RegistryFrozen("test".to_string())
        );
    }

    #[test]
    fn should_not_find_missing_descriptor() {
        let registry = ComponentRegistry::new();

        assert_eq!(
            registry.find("missing").unwrap_err(),
            ComponentRegistryError::ComponentNotFound("missing".to_string())
        );
    }

    #[test]
    fn should_not_attach_duplicate_decoration() {
        let mut registry = ComponentRegistry::new();
        registry
            .register::<TestComponent>("test", default_construction())
            .unwrap();

        let decoration = Decoration {
            produced_by: "processor".to_string(),
            wrapper: identity_wrapper(),
            provenance: None,
        };

        assert!(registry.attach_decoration_at(0, decoration.clone()));
        assert!(!registry.attach_decoration_at(0, decoration));
        assert_eq!(registry.find("test").unwrap().decorations().len(), 1);
    }
}
