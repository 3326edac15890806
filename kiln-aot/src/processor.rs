//! Post-processors inspect registered descriptors before the registry is finalized. Each
//! processor is given a chance to annotate a descriptor with a generated [Decoration] and to
//! declare reflective or resource allowances - processors never remove or rename descriptors.
//! Processors must be side-effect-idempotent: running the chain twice over an unchanged registry
//! produces equal decoration sets.

use crate::error::{ErrorPtr, ProcessorChainError};
use crate::hints::RuntimeHints;
use crate::registry::{ComponentDescriptor, ComponentRegistry, Decoration};
#[cfg(test)]
use mockall::automock;
use tracing::{debug, trace};

#[cfg(not(feature = "threadsafe"))]
pub type AotProcessorPtr = Box<dyn AotProcessor>;
#[cfg(feature = "threadsafe")]
pub type AotProcessorPtr = Box<dyn AotProcessor + Send + Sync>;

/// A transformer run once per descriptor during the processing stage.
#[cfg_attr(test, automock)]
pub trait AotProcessor {
    /// Identity of this processor, recorded in the decorations it produces.
    fn name(&self) -> &str;

    /// Inspects a descriptor and optionally contributes a decoration for it. Implementations
    /// may also declare allowances through `hints`.
    fn process_ahead_of_time(
        &self,
        descriptor: &ComponentDescriptor,
        hints: &mut RuntimeHints,
    ) -> Result<Option<Decoration>, ErrorPtr>;
}

/// An ordered list of [AotProcessor]s, each given a chance to annotate every descriptor in the
/// registry. Processors run in registration order, then descriptors in registration order. The
/// first error aborts the whole run.
#[derive(Default)]
pub struct ProcessorChain {
    processors: Vec<AotProcessorPtr>,
}

impl ProcessorChain {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_processor(&mut self, processor: AotProcessorPtr) {
        self.processors.push(processor);
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Invokes every processor against every descriptor currently in the registry, attaching
    /// returned decorations to their descriptors.
    pub fn run(
        &self,
        registry: &mut ComponentRegistry,
        hints: &mut RuntimeHints,
    ) -> Result<(), ProcessorChainError> {
        for processor in &self.processors {
            debug!("Running AOT processor '{}'.", processor.name());

            for index in 0..registry.len() {
                let decoration = {
                    let descriptor = registry.descriptor_at(index);
                    processor
                        .process_ahead_of_time(descriptor, hints)
                        .map_err(|error| ProcessorChainError::ProcessorFailed {
                            processor: processor.name().to_string(),
                            component: descriptor.name().to_string(),
                            error,
                        })?
                };

                if let Some(decoration) = decoration {
                    let component = registry.descriptor_at(index).name().to_string();
                    if registry.attach_decoration_at(index, decoration) {
                        trace!(
                            "Attached decoration from '{}' to component '{component}'.",
                            processor.name()
                        );
                    }
                }
            }
        }

        Ok(())
    }
}
