use std::error::Error;
#[cfg(not(feature = "threadsafe"))]
use std::rc::Rc;
#[cfg(feature = "threadsafe")]
use std::sync::Arc;
use thiserror::Error;

#[cfg(not(feature = "threadsafe"))]
pub type ErrorPtr = Rc<dyn Error>;
#[cfg(feature = "threadsafe")]
pub type ErrorPtr = Arc<dyn Error + Send + Sync>;

/// Errors related to registering and looking up component descriptors.
#[derive(Error, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum ComponentRegistryError {
    #[error("Attempted to register a duplicated component with name: {0}")]
    DuplicateComponentName(String),
    #[error("Cannot find component descriptor named: {0}")]
    ComponentNotFound(String),
    #[error("Cannot register component '{0}' - the registry is frozen once processing has started")]
    RegistryFrozen(String),
}

/// Errors raised while running the post-processor chain.
#[derive(Error, Clone, Debug)]
pub enum ProcessorChainError {
    #[error("Processor '{processor}' failed for component '{component}': {error}")]
    ProcessorFailed {
        processor: String,
        component: String,
        error: ErrorPtr,
    },
}

/// Errors related to declaring and exporting runtime hints.
#[derive(Error, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum HintsError {
    #[error("Runtime hints have already been exported")]
    AlreadyExported,
}

/// Errors reported by the host runtime's reflection facilities. These are propagated as-is -
/// the pipeline never recovers from them.
#[derive(Error, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum ReflectionError {
    #[error("Cannot resolve type: {0}")]
    TypeNotFound(String),
    #[error("Cannot construct an instance of type {type_name}: {message}")]
    ConstructionFailed { type_name: String, message: String },
    #[error("Cannot find method {method_name} on type {type_name}")]
    MethodNotFound {
        type_name: String,
        method_name: String,
    },
    #[error("Invoking {method_name} failed: {message}")]
    InvocationFailed {
        method_name: String,
        message: String,
    },
}

/// Errors related to loading bundled resources.
#[derive(Error, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum ResourceError {
    #[error("Cannot find resource: {0}")]
    NotFound(String),
    #[error("Error reading resource {path}: {message}")]
    Io { path: String, message: String },
}
