//! Application error types.

use common::ProductId;
use domain::{ProductError, ValidationErrors};
use messaging::PublishError;
use product_store::RepositoryError;
use thiserror::Error;

/// Wiring errors raised by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No handler was registered for the request type.
    #[error("No handler registered for {0}")]
    NoHandlerRegistered(&'static str),

    /// More than one handler was registered for the request type.
    #[error("Multiple handlers registered for {0}")]
    MultipleHandlersRegistered(&'static str),

    /// A handler produced a value of the wrong type.
    #[error("Handler for {0} received or returned an unexpected type")]
    TypeMismatch(&'static str),
}

/// Errors returned by dispatched requests.
#[derive(Debug, Error)]
pub enum AppError {
    /// Field validation failed. No state was changed.
    #[error("Validation failed: {0}")]
    ValidationFailed(ValidationErrors),

    /// The targeted product does not exist.
    #[error("Product with ID {0} not found")]
    NotFound(ProductId),

    /// A request argument was out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The broker did not accept an integration event.
    #[error(transparent)]
    DeliveryFailed(#[from] PublishError),

    /// A domain event subscriber failed.
    #[error("Event subscriber '{subscriber}' failed: {source}")]
    Subscriber {
        subscriber: String,
        #[source]
        source: Box<AppError>,
    },

    /// The dispatcher is wired incorrectly.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// The persistence backend failed.
    #[error("Persistence error: {0}")]
    Persistence(RepositoryError),

    /// The caller cancelled the request.
    #[error("Request was cancelled")]
    Cancelled,
}

/// Coarse classification of [`AppError`], stable across wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ValidationFailed,
    NotFound,
    InvalidArgument,
    DeliveryFailed,
    NoHandlerRegistered,
    MultipleHandlersRegistered,
    Persistence,
    Cancelled,
    Internal,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::ValidationFailed(_) => ErrorKind::ValidationFailed,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            AppError::DeliveryFailed(_) => ErrorKind::DeliveryFailed,
            AppError::Subscriber { source, .. } => source.kind(),
            AppError::Dispatch(DispatchError::NoHandlerRegistered(_)) => {
                ErrorKind::NoHandlerRegistered
            }
            AppError::Dispatch(DispatchError::MultipleHandlersRegistered(_)) => {
                ErrorKind::MultipleHandlersRegistered
            }
            AppError::Dispatch(DispatchError::TypeMismatch(_)) => ErrorKind::Internal,
            AppError::Persistence(_) => ErrorKind::Persistence,
            AppError::Cancelled => ErrorKind::Cancelled,
        }
    }
}

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::Validation(errors) => AppError::ValidationFailed(errors),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => AppError::NotFound(id),
            other => AppError::Persistence(other),
        }
    }
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;
