//! Pointer aliases for component instances and generated wrappers. The concrete pointer type
//! depends on the `threadsafe` feature.

use std::any::Any;
#[cfg(not(feature = "threadsafe"))]
use std::rc::Rc;
#[cfg(feature = "threadsafe")]
use std::sync::Arc;

#[cfg(not(feature = "threadsafe"))]
pub type ComponentInstancePtr<T> = Rc<T>;
#[cfg(feature = "threadsafe")]
pub type ComponentInstancePtr<T> = Arc<T>;

#[cfg(not(feature = "threadsafe"))]
pub type ComponentInstanceAnyPtr = ComponentInstancePtr<dyn Any + 'static>;
#[cfg(feature = "threadsafe")]
pub type ComponentInstanceAnyPtr = ComponentInstancePtr<dyn Any + Send + Sync + 'static>;

/// Generated wrapper for a component: takes the original instance and returns an instance of
/// the same declared type.
#[cfg(not(feature = "threadsafe"))]
pub type WrapperFunctionPtr = Rc<dyn Fn(ComponentInstanceAnyPtr) -> ComponentInstanceAnyPtr>;
#[cfg(feature = "threadsafe")]
pub type WrapperFunctionPtr =
    Arc<dyn Fn(ComponentInstanceAnyPtr) -> ComponentInstanceAnyPtr + Send + Sync>;

/// Wraps a closure in a [WrapperFunctionPtr].
#[cfg(not(feature = "threadsafe"))]
pub fn wrapper_fn<F: Fn(ComponentInstanceAnyPtr) -> ComponentInstanceAnyPtr + 'static>(
    wrapper: F,
) -> WrapperFunctionPtr {
    Rc::new(wrapper)
}

/// Wraps a closure in a [WrapperFunctionPtr].
#[cfg(feature = "threadsafe")]
pub fn wrapper_fn<
    F: Fn(ComponentInstanceAnyPtr) -> ComponentInstanceAnyPtr + Send + Sync + 'static,
>(
    wrapper: F,
) -> WrapperFunctionPtr {
    Arc::new(wrapper)
}

/// Wrapper which returns the given instance unchanged.
pub fn identity_wrapper() -> WrapperFunctionPtr {
    wrapper_fn(|instance| instance)
}
