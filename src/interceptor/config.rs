//! Per-route interceptor configuration
//!
//! A configuration value names the one interceptor type it is meant for.
//! The chain resolves, per interceptor, the value addressed to it by type
//! identity; other interceptors never see it.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use super::Interceptor;

/// A configuration value addressed to the interceptor `Self::Target`.
///
/// ```ignore
/// #[derive(Debug, Clone, Copy)]
/// pub struct SkipAuth;
///
/// impl InterceptorConfig for SkipAuth {
///     type Target = AuthInterceptor;
/// }
/// ```
pub trait InterceptorConfig: Any + Send + Sync + fmt::Debug {
    /// The only interceptor type this value applies to.
    type Target: Interceptor;
}

/// Object-safe view of an [`InterceptorConfig`].
trait AddressedConfig: Send + Sync + fmt::Debug {
    fn target(&self) -> TypeId;
    fn as_any(&self) -> &dyn Any;
}

impl<C: InterceptorConfig> AddressedConfig for C {
    fn target(&self) -> TypeId {
        TypeId::of::<C::Target>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Ordered set of configuration values declared by one route.
///
/// Immutable once the route is registered.
#[derive(Clone, Default)]
pub struct RouteConfig {
    values: Vec<Arc<dyn AddressedConfig>>,
}

impl RouteConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a configuration value.
    ///
    /// When several values address the same interceptor, the first one wins.
    pub fn with<C: InterceptorConfig>(mut self, value: C) -> Self {
        self.values.push(Arc::new(value));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value addressed to the interceptor with type id `target`.
    pub(crate) fn slot_for(&self, target: TypeId) -> ConfigSlot<'_> {
        ConfigSlot(
            self.values
                .iter()
                .find(|value| value.target() == target)
                .map(|value| value.as_ref()),
        )
    }
}

impl fmt::Debug for RouteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.values.iter()).finish()
    }
}

/// The configuration a route declared for one particular interceptor.
#[derive(Clone, Copy, Default)]
pub struct ConfigSlot<'a>(Option<&'a dyn AddressedConfig>);

impl<'a> ConfigSlot<'a> {
    /// The declared value, if it is a `C`.
    pub fn get<C: InterceptorConfig>(&self) -> Option<&'a C> {
        self.0.and_then(|value| value.as_any().downcast_ref::<C>())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Debug for ConfigSlot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => f.debug_tuple("ConfigSlot").field(value).finish(),
            None => f.write_str("ConfigSlot(empty)"),
        }
    }
}
