//! Capability decoration: conditionally attaching generated wrappers to registered components
//! without modifying the original types. A [CapabilityDecorator] selects eligible descriptors
//! with a predicate and produces a [Decoration] for each via a generator.
//!
//! For descriptors constructed from an already-supplied instance, the wrapper is applied to the
//! value exactly once, during the decorating stage - later lookups observe the wrapped instance
//! and the wrapper is never re-invoked.

use crate::instance::wrapper_fn;
use crate::registry::{ComponentDescriptor, ComponentRegistry, ConstructionStrategy, Decoration, Provenance};
use std::env;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

#[cfg(not(feature = "threadsafe"))]
pub type DescriptorPredicatePtr = Box<dyn Fn(&ComponentDescriptor) -> bool>;
#[cfg(feature = "threadsafe")]
pub type DescriptorPredicatePtr = Box<dyn Fn(&ComponentDescriptor) -> bool + Send + Sync>;

#[cfg(not(feature = "threadsafe"))]
pub type DecorationGeneratorPtr = Box<dyn Fn(&ComponentDescriptor) -> Decoration>;
#[cfg(feature = "threadsafe")]
pub type DecorationGeneratorPtr = Box<dyn Fn(&ComponentDescriptor) -> Decoration + Send + Sync>;

/// Decorates descriptors matching a predicate with decorations produced by a generator.
/// Attachment is idempotent per producer identity, so re-running a decorator over an already
/// decorated registry is a no-op.
pub struct CapabilityDecorator {
    name: String,
    predicate: DescriptorPredicatePtr,
    generator: DecorationGeneratorPtr,
}

impl CapabilityDecorator {
    pub fn new<T: ToString>(
        name: T,
        predicate: DescriptorPredicatePtr,
        generator: DecorationGeneratorPtr,
    ) -> Self {
        Self {
            name: name.to_string(),
            predicate,
            generator,
        }
    }

    /// Convenience constructor selecting descriptors declaring the given type.
    pub fn for_type<T: 'static, N: ToString>(name: N, generator: DecorationGeneratorPtr) -> Self {
        Self::new(
            name,
            Box::new(|descriptor: &ComponentDescriptor| descriptor.is_type::<T>())
                as DescriptorPredicatePtr,
            generator,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Applies this decorator to every matching descriptor in the registry, returning the
    /// number of descriptors decorated. Supplied instances are wrapped in place, once.
    pub fn decorate(&self, registry: &mut ComponentRegistry) -> usize {
        let mut decorated = 0;

        for index in 0..registry.len() {
            let decoration = {
                let descriptor = registry.descriptor_at(index);
                if !(self.predicate)(descriptor) {
                    continue;
                }

                (self.generator)(descriptor)
            };

            let wrapper = decoration.wrapper.clone();
            let supplied = matches!(
                registry.descriptor_at(index).construction(),
                ConstructionStrategy::SuppliedInstance(_)
            );

            if registry.attach_decoration_at(index, decoration) {
                decorated += 1;

                if supplied {
                    registry.wrap_supplied_instance_at(index, &wrapper);
                }

                debug!(
                    "Decorated component '{}' with capability '{}'.",
                    registry.descriptor_at(index).name(),
                    self.name
                );
            }
        }

        decorated
    }
}

/// Generator which bakes build provenance into every decoration it produces. The timestamp and
/// filesystem path are captured once, when the generator is created, and never re-evaluated on
/// later wrapper invocations.
pub struct ProvenanceGenerator {
    name: String,
    provenance: Provenance,
}

impl ProvenanceGenerator {
    /// Captures the current wall-clock time and working directory as the baked-in provenance.
    pub fn new<T: ToString>(name: T) -> Self {
        Self::with_provenance(
            name,
            Provenance {
                compiled_at_millis: current_millis(),
                source_path: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            },
        )
    }

    /// Captures the current wall-clock time with an explicit source path.
    pub fn with_source_path<T: ToString, P: Into<PathBuf>>(name: T, source_path: P) -> Self {
        Self::with_provenance(
            name,
            Provenance {
                compiled_at_millis: current_millis(),
                source_path: source_path.into(),
            },
        )
    }

    pub fn with_provenance<T: ToString>(name: T, provenance: Provenance) -> Self {
        Self {
            name: name.to_string(),
            provenance,
        }
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Produces a decoration whose wrapper reports the baked-in provenance and returns the
    /// original instance unchanged.
    pub fn generate(&self, descriptor: &ComponentDescriptor) -> Decoration {
        let provenance = self.provenance.clone();
        let component = descriptor.name().to_string();

        Decoration {
            produced_by: self.name.clone(),
            wrapper: wrapper_fn(move |instance| {
                debug!(
                    "Component '{component}' compiled at {} in {}.",
                    provenance.compiled_at_millis,
                    provenance.source_path.display()
                );
                instance
            }),
            provenance: Some(self.provenance.clone()),
        }
    }

    /// Turns this generator into a [DecorationGeneratorPtr] for use with a
    /// [CapabilityDecorator].
    pub fn into_generator(self) -> DecorationGeneratorPtr {
        Box::new(move |descriptor| self.generate(descriptor))
    }
}

fn current_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use crate::decorate::{CapabilityDecorator, DecorationGeneratorPtr, ProvenanceGenerator};
    use crate::instance::{wrapper_fn, ComponentInstanceAnyPtr, ComponentInstancePtr};
    use crate::registry::{
        ComponentRegistry, ConstructionStrategy, Decoration, Provenance,
    };
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct TestComponent;
    struct OtherComponent;

    fn create_registry() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        registry
            .register::<TestComponent>(
                "test",
                ConstructionStrategy::DefaultConstructor(|_| {
                    Ok(ComponentInstancePtr::new(TestComponent) as ComponentInstanceAnyPtr)
                }),
            )
            .unwrap();
        registry
            .register::<OtherComponent>(
                "other",
                ConstructionStrategy::DefaultConstructor(|_| {
                    Ok(ComponentInstancePtr::new(OtherComponent) as ComponentInstanceAnyPtr)
                }),
            )
            .unwrap();

        registry
    }

    #[test]
    fn should_decorate_only_matching_descriptors() {
        let mut registry = create_registry();

        let decorator = CapabilityDecorator::for_type::<TestComponent, _>(
            "provenance",
            ProvenanceGenerator::with_provenance(
                "provenance",
                Provenance {
                    compiled_at_millis: 1_700_000_000_000,
                    source_path: PathBuf::from("/build"),
                },
            )
            .into_generator(),
        );

        assert_eq!(decorator.decorate(&mut registry), 1);

        let decorations = registry.find("test").unwrap().decorations();
        assert_eq!(decorations.len(), 1);
        assert_eq!(
            decorations[0].provenance.as_ref().unwrap(),
            &Provenance {
                compiled_at_millis: 1_700_000_000_000,
                source_path: PathBuf::from("/build"),
            }
        );

        assert!(registry.find("other").unwrap().decorations().is_empty());
    }

    #[test]
    fn should_wrap_supplied_instance_once() {
        let mut registry = ComponentRegistry::new();
        registry
            .register::<TestComponent>(
                "supplied",
                ConstructionStrategy::SuppliedInstance(
                    ComponentInstancePtr::new(TestComponent) as ComponentInstanceAnyPtr
                ),
            )
            .unwrap();

        let invocations = Arc::new(AtomicUsize::new(0));
        let generator_invocations = invocations.clone();

        let generator: DecorationGeneratorPtr = Box::new(move |_| {
            let wrapper_invocations = generator_invocations.clone();
            Decoration {
                produced_by: "wrapping".to_string(),
                wrapper: wrapper_fn(move |instance| {
                    wrapper_invocations.fetch_add(1, Ordering::SeqCst);
                    instance
                }),
                provenance: None,
            }
        });

        let decorator = CapabilityDecorator::for_type::<TestComponent, _>("wrapping", generator);
        assert_eq!(decorator.decorate(&mut registry), 1);
        assert_eq!(invocations.load(Ordering::SeqCst), 1);

        // subsequent lookups never re-invoke the wrapper
        registry.find("supplied").unwrap();
        registry.find("supplied").unwrap();
        assert_eq!(invocations.load(Ordering::SeqCst), 1);

        // re-running the decorator doesn't wrap again either
        assert_eq!(decorator.decorate(&mut registry), 0);
        assert_eq!(invocations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn should_capture_provenance_at_generation_time() {
        let registry = create_registry();

        let generator = ProvenanceGenerator::with_provenance(
            "provenance",
            Provenance {
                compiled_at_millis: 42,
                source_path: PathBuf::from("/somewhere"),
            },
        );

        let descriptor = registry.find("test").unwrap();
        let first = generator.generate(descriptor);
        let second = generator.generate(descriptor);

        assert_eq!(first.provenance, second.provenance);
        assert_eq!(first.provenance.unwrap().compiled_at_millis, 42);
    }
}
