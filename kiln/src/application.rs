//! Core pass bootstrapping functionality.

use crate::config::AotConfig;
use derive_more::Constructor;
use kiln_aot::decorate::ProvenanceGenerator;
use kiln_aot::error::ErrorPtr;
use kiln_aot::hints::AotManifest;
use kiln_aot::pipeline::{AotPass, AotPassError};
use std::error::Error;
use thiserror::Error;
use tracing::info;

#[cfg(feature = "threadsafe")]
fn convert_error<E: Error + Send + Sync + 'static>(error: E) -> ErrorPtr {
    use std::sync::Arc;
    Arc::new(error) as ErrorPtr
}

#[cfg(not(feature = "threadsafe"))]
fn convert_error<E: Error + 'static>(error: E) -> ErrorPtr {
    use std::rc::Rc;
    Rc::new(error) as ErrorPtr
}

#[derive(Clone, Error, Debug)]
pub enum ApplicationError {
    #[error("Error initializing pass config: {0}")]
    ConfigError(ErrorPtr),
    #[error("Pass error: {0}")]
    PassError(#[from] AotPassError),
}

/// Main entrypoint for a build-time pass. Bootstraps the pass, configures supporting
/// infrastructure, and runs it to the exported state.
#[derive(Constructor)]
pub struct AotApplication {
    pass: AotPass,
    config: AotConfig,
}

impl AotApplication {
    /// The underlying pass, e.g. for registering additional components or decorators before
    /// running.
    pub fn pass_mut(&mut self) -> &mut AotPass {
        &mut self.pass
    }

    pub fn config(&self) -> &AotConfig {
        &self.config
    }

    /// Creates a provenance generator honoring the configured path override.
    pub fn provenance_generator<T: ToString>(&self, name: T) -> ProvenanceGenerator {
        match &self.config.provenance_path {
            Some(path) => ProvenanceGenerator::with_source_path(name, path),
            None => ProvenanceGenerator::new(name),
        }
    }

    /// Runs the pass to completion, returning the exported manifest.
    pub fn run(&mut self) -> Result<AotManifest, ApplicationError> {
        if self.config.install_tracing_logger {
            install_tracing_logger();
        }

        info!("Running ahead-of-time pass...");

        let manifest = self.pass.run()?;

        info!(
            "Exported {} reflective and {} resource allowances.",
            manifest.reflective.len(),
            manifest.resources.len()
        );

        Ok(manifest)
    }
}

/// Creates an [AotApplication] with default configuration and a pass populated from statically
/// registered descriptors, processors, and hints registrations.
pub fn create_default() -> Result<AotApplication, ApplicationError> {
    let config = AotConfig::init_from_environment()
        .map_err(|error| ApplicationError::ConfigError(convert_error(error)))?;

    create_with_config(config)
}

/// Creates an [AotApplication] with the given configuration.
pub fn create_with_config(config: AotConfig) -> Result<AotApplication, ApplicationError> {
    let pass = AotPass::with_static_registrations()?;
    Ok(AotApplication::new(pass, config))
}

fn install_tracing_logger() {
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::EnvFilter;

    // ignore the error if a global subscriber is already set
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .finish()
        .try_init();
}
