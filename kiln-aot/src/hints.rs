//! Runtime hints describe which reflective operations and bundled resources must remain
//! available after ahead-of-time compilation. Allowances are append-only while the pass runs,
//! then frozen and exported exactly once as an [AotManifest] for a downstream packaging step.
//!
//! Hints can be declared directly, by [processors](crate::processor) during the processing
//! stage, or through [HintsRegistrar] objects - equivalent entry points to the same exporter.

use crate::error::HintsError;
use fxhash::{FxHashMap, FxHashSet};
#[cfg(test)]
use mockall::automock;
use std::any::{type_name, TypeId};
use tracing::{debug, warn};

/// A reflective operation which must survive into the packaged artifact.
#[derive(Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum ReflectiveOperation {
    Construct,
    ReadField,
    InvokeMethod,
}

impl ReflectiveOperation {
    /// All supported operations.
    pub fn all() -> [ReflectiveOperation; 3] {
        [
            ReflectiveOperation::Construct,
            ReflectiveOperation::ReadField,
            ReflectiveOperation::InvokeMethod,
        ]
    }
}

/// Declared permission for reflective access to a type. Duplicate declarations for the same
/// type merge their operation sets.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ReflectiveAllowance {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub operations: FxHashSet<ReflectiveOperation>,
}

/// Declared permission for loading a bundled resource.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct ResourceAllowance {
    pub path: String,
}

/// The final allow-lists handed to the downstream packager.
#[derive(Clone, Debug, Default)]
pub struct AotManifest {
    pub reflective: Vec<ReflectiveAllowance>,
    pub resources: Vec<ResourceAllowance>,
}

impl AotManifest {
    pub fn reflective_for(&self, type_id: TypeId) -> Option<&ReflectiveAllowance> {
        self.reflective
            .iter()
            .find(|allowance| allowance.type_id == type_id)
    }

    pub fn contains_resource(&self, path: &str) -> bool {
        self.resources.iter().any(|allowance| allowance.path == path)
    }
}

/// Accumulator for reflective and resource allowances. Declarations only grow during a pass;
/// [export](RuntimeHints::export) freezes the sets and can succeed only once.
#[derive(Clone, Debug, Default)]
pub struct RuntimeHints {
    reflective: FxHashMap<TypeId, ReflectiveAllowance>,
    resources: FxHashSet<String>,
    exported: bool,
}

impl RuntimeHints {
    pub fn new() -> Self {
        Default::default()
    }

    /// Declares reflective operations which must remain available for the given type, merging
    /// with any previous declaration.
    pub fn register_reflective<T: 'static>(
        &mut self,
        operations: impl IntoIterator<Item = ReflectiveOperation>,
    ) {
        self.register_reflective_type(TypeId::of::<T>(), type_name::<T>(), operations);
    }

    /// Non-generic version of [register_reflective](RuntimeHints::register_reflective) for use
    /// with explicit type handles.
    pub fn register_reflective_type(
        &mut self,
        type_id: TypeId,
        type_name: &'static str,
        operations: impl IntoIterator<Item = ReflectiveOperation>,
    ) {
        if self.exported {
            warn!("Ignoring reflective declaration for {type_name} - hints already exported.");
            return;
        }

        let allowance = self
            .reflective
            .entry(type_id)
            .or_insert_with(|| ReflectiveAllowance {
                type_id,
                type_name,
                operations: Default::default(),
            });
        allowance.operations.extend(operations);
    }

    /// Declares a resource path which must remain loadable. Duplicate paths are recorded once.
    pub fn register_resource<T: ToString>(&mut self, path: T) {
        let path = path.to_string();
        if self.exported {
            warn!("Ignoring resource declaration for {path} - hints already exported.");
            return;
        }

        self.resources.insert(path);
    }

    pub fn reflective(&self) -> impl Iterator<Item = &ReflectiveAllowance> {
        self.reflective.values()
    }

    pub fn reflective_for(&self, type_id: TypeId) -> Option<&ReflectiveAllowance> {
        self.reflective.get(&type_id)
    }

    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.resources.iter().map(String::as_str)
    }

    pub fn is_exported(&self) -> bool {
        self.exported
    }

    /// Freezes the allowance sets and produces the manifest. A second call fails with
    /// [AlreadyExported](HintsError::AlreadyExported); the sets remain readable either way.
    pub fn export(&mut self) -> Result<AotManifest, HintsError> {
        if self.exported {
            return Err(HintsError::AlreadyExported);
        }

        self.exported = true;

        debug!(
            "Exporting {} reflective and {} resource allowances.",
            self.reflective.len(),
            self.resources.len()
        );

        Ok(AotManifest {
            reflective: self.reflective.values().cloned().collect(),
            resources: self
                .resources
                .iter()
                .cloned()
                .map(|path| ResourceAllowance { path })
                .collect(),
        })
    }
}

/// Registrar-object entry point for declaring hints, typically discovered from statically
/// registered definitions (see [internal]).
#[cfg_attr(test, automock)]
pub trait HintsRegistrar {
    fn register_hints(&self, hints: &mut RuntimeHints);
}

#[doc(hidden)]
pub mod internal {
    use crate::hints::RuntimeHints;
    use inventory::collect;
    pub use inventory::submit;

    pub struct HintsRegistration {
        pub register: fn(&mut RuntimeHints),
    }

    collect!(HintsRegistration);
}
