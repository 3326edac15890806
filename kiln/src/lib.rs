//! Bootstrapping for [kiln_aot] ahead-of-time passes.
//!
//! A build-time pass gathers component descriptors, processors, and hint declarations, runs
//! them to completion, and hands the exported manifest to a downstream packaging step. This
//! crate provides the entrypoint which assembles such a pass from statically registered
//! definitions, configures supporting infrastructure like logging, and executes it - see
//! [application::AotApplication].
//!
//! ### Features
//!
//! * `threadsafe` - use threadsafe pointers and `Send + Sync` trait bounds

pub mod application;
pub mod config;
pub mod resource;
