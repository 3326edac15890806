//! One-shot orchestration of the whole ahead-of-time pass:
//! `Empty -> Populating -> Processing -> Decorating -> Exported`.
//!
//! The pass is synchronous and non-reentrant. Any stage error aborts the pass before the
//! exported state is reached - no partial export is ever observable.

use crate::decorate::CapabilityDecorator;
use crate::error::{ComponentRegistryError, HintsError, ProcessorChainError};
use crate::hints::internal::HintsRegistration;
use crate::hints::{AotManifest, HintsRegistrar, RuntimeHints};
use crate::pipeline::internal::ProcessorRegisterer;
use crate::processor::{AotProcessorPtr, ProcessorChain};
use crate::registry::internal::{DescriptorMetadata, DescriptorRegisterer};
use crate::registry::{ComponentDescriptor, ComponentRegistry, ConstructionStrategy};
use itertools::Itertools;
use std::any::TypeId;
use thiserror::Error;
use tracing::{debug, info};

/// Errors aborting an ahead-of-time pass.
#[derive(Error, Clone, Debug)]
pub enum AotPassError {
    #[error("Registry error: {0}")]
    RegistryError(#[from] ComponentRegistryError),
    #[error("Processor chain error: {0}")]
    ProcessorChainError(#[from] ProcessorChainError),
    #[error("Hints error: {0}")]
    HintsError(#[from] HintsError),
}

/// Stage of the ahead-of-time pass.
#[derive(Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum PassState {
    Empty,
    Populating,
    Processing,
    Decorating,
    Exported,
}

/// A single build-time pass over a set of registered components. Populate the pass with
/// descriptors, processors, decorators, and hint declarations, then [run](AotPass::run) it to
/// completion.
pub struct AotPass {
    registry: ComponentRegistry,
    chain: ProcessorChain,
    decorators: Vec<CapabilityDecorator>,
    hints: RuntimeHints,
    state: PassState,
}

impl Default for AotPass {
    fn default() -> Self {
        Self::new()
    }
}

impl AotPass {
    pub fn new() -> Self {
        Self {
            registry: ComponentRegistry::new(),
            chain: ProcessorChain::new(),
            decorators: vec![],
            hints: RuntimeHints::new(),
            state: PassState::Empty,
        }
    }

    /// Creates a pass populated from statically registered descriptors, processors, and hints
    /// registrations.
    pub fn with_static_registrations() -> Result<Self, AotPassError> {
        let descriptors: Vec<DescriptorMetadata> = inventory::iter::<DescriptorRegisterer>
            .into_iter()
            .map(|registerer| (registerer.register)())
            .collect_vec();

        let mut pass = Self::new();

        for metadata in descriptors {
            pass.register_described(
                metadata.name,
                metadata.type_id,
                metadata.type_name,
                metadata.construction,
            )?;
        }

        for registerer in inventory::iter::<ProcessorRegisterer>.into_iter() {
            pass.add_processor((registerer.register)());
        }

        for registration in inventory::iter::<HintsRegistration>.into_iter() {
            (registration.register)(&mut pass.hints);
        }

        Ok(pass)
    }

    /// Registers a component descriptor. Fails with
    /// [RegistryFrozen](ComponentRegistryError::RegistryFrozen) once the pass has left the
    /// populating stage.
    pub fn register_component<T: 'static>(
        &mut self,
        name: &str,
        construction: ConstructionStrategy,
    ) -> Result<(), AotPassError> {
        self.ensure_populating(name)?;
        self.registry.register::<T>(name, construction)?;
        Ok(())
    }

    /// Registers a component descriptor from explicit type information.
    pub fn register_described(
        &mut self,
        name: &str,
        type_id: TypeId,
        type_name: &'static str,
        construction: ConstructionStrategy,
    ) -> Result<(), AotPassError> {
        self.ensure_populating(name)?;
        self.registry
            .register_described(name, type_id, type_name, construction)?;
        Ok(())
    }

    pub fn add_processor(&mut self, processor: AotProcessorPtr) {
        self.chain.add_processor(processor);
    }

    pub fn add_decorator(&mut self, decorator: CapabilityDecorator) {
        self.decorators.push(decorator);
    }

    /// Applies a registrar object's declarations to this pass's hints.
    pub fn apply_hints_registrar(&mut self, registrar: &dyn HintsRegistrar) {
        registrar.register_hints(&mut self.hints);
    }

    /// Direct access to the hint declarations, e.g. for explicit resource registration.
    pub fn hints_mut(&mut self) -> &mut RuntimeHints {
        &mut self.hints
    }

    pub fn hints(&self) -> &RuntimeHints {
        &self.hints
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn state(&self) -> PassState {
        self.state
    }

    /// Returns the descriptor with the given name, including any decorations attached so far.
    pub fn find(&self, name: &str) -> Result<&ComponentDescriptor, ComponentRegistryError> {
        self.registry.find(name)
    }

    /// Runs the processing and decorating stages, then exports the runtime hints. The pass
    /// either fully completes to the exported state or fails with the first error encountered.
    pub fn run(&mut self) -> Result<AotManifest, AotPassError> {
        info!(
            "Freezing component registry with {} descriptors.",
            self.registry.len()
        );
        self.registry.freeze();

        self.state = PassState::Processing;
        self.chain.run(&mut self.registry, &mut self.hints)?;

        self.state = PassState::Decorating;
        for decorator in &self.decorators {
            let decorated = decorator.decorate(&mut self.registry);
            debug!(
                "Capability decorator '{}' decorated {decorated} components.",
                decorator.name()
            );
        }

        let manifest = self.hints.export()?;
        self.state = PassState::Exported;

        info!("Ahead-of-time pass complete.");

        Ok(manifest)
    }

    fn ensure_populating(&mut self, name: &str) -> Result<(), AotPassError> {
        if !matches!(self.state, PassState::Empty | PassState::Populating) {
            return Err(ComponentRegistryError::RegistryFrozen(name.to_string()).into());
        }

        self.state = PassState::Populating;
        Ok(())
    }
}

#[doc(hidden)]
pub mod internal {
    use crate::processor::AotProcessorPtr;
    use inventory::collect;
    pub use inventory::submit;

    pub struct ProcessorRegisterer {
        pub register: fn() -> AotProcessorPtr,
    }

    collect!(ProcessorRegisterer);
}
