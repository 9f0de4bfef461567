//! HTTP method dispatch.
//!
//! The dispatch set is fixed: `allow`, `copy`, `delete`, `get`, `options`, `patch`, `post` and
//! `put`, with `HEAD` served by the `get` handler. Only `get` is registered by default.

mod get;

pub use get::GetHandler;

use crate::decorator::StoreDecorator;
use crate::store::{LdpRequest, LdpResponse};
use crate::{StoreError, StoreResult};
use async_trait::async_trait;
use http::Method;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKey {
    Allow,
    Copy,
    Delete,
    Get,
    Options,
    Patch,
    Post,
    Put,
}

impl HandlerKey {
    /// Handler key for an HTTP method, case-insensitively.
    ///
    /// # Errors
    /// Returns `StoreError::UnsupportedMethod` for methods outside the dispatch set.
    pub fn for_method(method: &Method) -> StoreResult<Self> {
        match method.as_str().to_ascii_uppercase().as_str() {
            "ALLOW" => Ok(Self::Allow),
            "COPY" => Ok(Self::Copy),
            "DELETE" => Ok(Self::Delete),
            "GET" | "HEAD" => Ok(Self::Get),
            "OPTIONS" => Ok(Self::Options),
            "PATCH" => Ok(Self::Patch),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            other => Err(StoreError::UnsupportedMethod(other.to_string())),
        }
    }
}

#[async_trait]
pub trait MethodHandler: Send + Sync {
    async fn handle(&self, store: &StoreDecorator, request: &LdpRequest)
        -> StoreResult<LdpResponse>;
}

/// Method handler table of a decorator.
#[derive(Clone)]
pub struct Handlers {
    table: HashMap<HandlerKey, Arc<dyn MethodHandler>>,
}

impl Handlers {
    /// A table with no handlers at all.
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    pub fn with_handler(mut self, key: HandlerKey, handler: impl MethodHandler + 'static) -> Self {
        self.table.insert(key, Arc::new(handler));
        self
    }

    pub fn get(&self, key: HandlerKey) -> Option<&Arc<dyn MethodHandler>> {
        self.table.get(&key)
    }

    /// Runs the handler registered for `key`.
    ///
    /// # Errors
    /// Returns `StoreError::MethodNotImplemented` when nothing is registered for `key`.
    pub async fn dispatch(
        &self,
        key: HandlerKey,
        store: &StoreDecorator,
        request: &LdpRequest,
    ) -> StoreResult<LdpResponse> {
        let handler = self
            .get(key)
            .ok_or_else(|| StoreError::MethodNotImplemented(request.method().to_string()))?;
        handler.handle(store, request).await
    }
}

impl Default for Handlers {
    fn default() -> Self {
        Self::empty().with_handler(HandlerKey::Get, GetHandler)
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.table.keys().map(|key| format!("{key:?}")).collect();
        keys.sort();
        f.debug_struct("Handlers").field("registered", &keys).finish()
    }
}
