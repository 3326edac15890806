//! Build-time component processing pipeline. Components are registered as
//! [descriptors](registry::ComponentDescriptor), inspected by an ordered
//! [processor chain](processor::ProcessorChain), optionally wrapped with generated behavior by
//! [capability decorators](decorate::CapabilityDecorator), and finally described by exported
//! [runtime hints](hints::RuntimeHints) consumed by a downstream packaging step.
//!
//! The whole pipeline models a one-shot, synchronous ahead-of-time pass - see
//! [pipeline::AotPass].
//!
//! ### Features
//!
//! * `threadsafe` - use threadsafe pointers and `Send + Sync` trait bounds

pub mod decorate;
pub mod error;
pub mod hints;
pub mod instance;
pub mod pipeline;
pub mod processor;
pub mod reflection;
pub mod registry;
pub mod resource;
