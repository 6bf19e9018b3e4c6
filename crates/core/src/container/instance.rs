use std::any::Any;
use std::sync::Arc;

use crate::container::ident::ServiceIdent;
use crate::errors::ContainerError;

/// Type-erased handle to a resolved service.
///
/// Wraps an `Arc<T>` where `T` may be unsized (`dyn Trait`). Clones share the
/// same underlying value.
#[derive(Clone)]
pub struct Instance {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Instance {
    pub fn new<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            value: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Recover the typed handle, if `T` matches the stored type
    pub fn downcast<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.value.downcast_ref::<Arc<T>>().cloned()
    }

    /// Recover the typed handle of the service registered under `ident`
    pub fn typed<T: ?Sized + Send + Sync + 'static>(
        &self,
        ident: &ServiceIdent,
    ) -> Result<Arc<T>, ContainerError> {
        self.downcast::<T>()
            .ok_or_else(|| ContainerError::TypeMismatch {
                ident: ident.clone(),
                expected: std::any::type_name::<T>(),
                actual: self.type_name,
            })
    }

    /// Name of the stored type
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether both handles refer to the same value
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("type_name", &self.type_name)
            .finish()
    }
}
