//! Type-keyed request dispatch.
//!
//! Each request type maps to exactly one handler. The map is assembled by
//! [`DispatcherBuilder`], checked once in [`DispatcherBuilder::build`], and is
//! immutable afterwards, so a [`Dispatcher`] can be cloned and shared freely
//! between concurrent callers.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, DispatchError, Result};

/// Whether a request mutates state or only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Command,
    Query,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Command => "command",
            RequestKind::Query => "query",
        }
    }
}

/// An intent that can be dispatched.
pub trait Request: Send + 'static {
    /// Value produced by the handler on success.
    type Response: Send + 'static;

    const KIND: RequestKind;
}

/// Handles one request type.
#[async_trait]
pub trait RequestHandler<R: Request>: Send + Sync {
    async fn handle(&self, request: R, cancel: CancellationToken) -> Result<R::Response>;
}

type BoxedValue = Box<dyn Any + Send>;

#[async_trait]
trait ErasedHandler: Send + Sync {
    async fn handle_boxed(&self, request: BoxedValue, cancel: CancellationToken)
    -> Result<BoxedValue>;
}

struct TypedHandler<R, H> {
    handler: H,
    _request: PhantomData<fn(R)>,
}

#[async_trait]
impl<R, H> ErasedHandler for TypedHandler<R, H>
where
    R: Request,
    H: RequestHandler<R>,
{
    async fn handle_boxed(
        &self,
        request: BoxedValue,
        cancel: CancellationToken,
    ) -> Result<BoxedValue> {
        let request = request
            .downcast::<R>()
            .map_err(|_| DispatchError::TypeMismatch(type_name::<R>()))?;
        let response = self.handler.handle(*request, cancel).await?;
        Ok(Box::new(response))
    }
}

/// Routes requests to their registered handler.
#[derive(Clone)]
pub struct Dispatcher {
    handlers: Arc<HashMap<TypeId, Arc<dyn ErasedHandler>>>,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// Returns true if a handler is registered for `R`.
    pub fn handles<R: Request>(&self) -> bool {
        self.handlers.contains_key(&TypeId::of::<R>())
    }

    /// Runs the handler registered for `R`.
    ///
    /// Fails with `NoHandlerRegistered` without touching any port when `R` has
    /// no handler.
    #[tracing::instrument(skip_all, fields(request = type_name::<R>(), kind = R::KIND.as_str()))]
    pub async fn dispatch<R: Request>(
        &self,
        request: R,
        cancel: CancellationToken,
    ) -> Result<R::Response> {
        let name = type_name::<R>();
        let Some(handler) = self.handlers.get(&TypeId::of::<R>()) else {
            tracing::error!("No handler registered");
            return Err(DispatchError::NoHandlerRegistered(name).into());
        };

        metrics::counter!(
            "dispatch_requests_total",
            "request" => short_name(name),
            "kind" => R::KIND.as_str()
        )
        .increment(1);

        let response = handler.handle_boxed(Box::new(request), cancel).await;
        if let Err(ref e) = response {
            metrics::counter!("dispatch_failures_total", "request" => short_name(name))
                .increment(1);
            tracing::debug!(error = %e, "Request failed");
        }

        response?
            .downcast::<R::Response>()
            .map(|response| *response)
            .map_err(|_| AppError::from(DispatchError::TypeMismatch(name)))
    }
}

/// Collects handler registrations for a [`Dispatcher`].
#[derive(Default)]
pub struct DispatcherBuilder {
    handlers: HashMap<TypeId, Arc<dyn ErasedHandler>>,
    duplicate: Option<&'static str>,
}

impl DispatcherBuilder {
    /// Registers `handler` for request type `R`.
    ///
    /// Registering a second handler for the same type is reported by
    /// [`build`](Self::build).
    pub fn register<R, H>(mut self, handler: H) -> Self
    where
        R: Request,
        H: RequestHandler<R> + 'static,
    {
        let wrapped = TypedHandler {
            handler,
            _request: PhantomData::<fn(R)>,
        };
        if self
            .handlers
            .insert(TypeId::of::<R>(), Arc::new(wrapped))
            .is_some()
        {
            self.duplicate.get_or_insert(type_name::<R>());
        }
        self
    }

    /// Freezes the registrations.
    pub fn build(self) -> std::result::Result<Dispatcher, DispatchError> {
        if let Some(name) = self.duplicate {
            return Err(DispatchError::MultipleHandlersRegistered(name));
        }
        Ok(Dispatcher {
            handlers: Arc::new(self.handlers),
        })
    }
}

fn short_name(name: &'static str) -> &'static str {
    name.rsplit("::").next().unwrap_or(name)
}
