//! Error types and result types for document store operations.
//!
//! Every operation exposed by the store reports success or one specific failure.
//! Use [`DocumentStoreResult<T>`] as the return type for fallible operations and
//! [`DocumentStoreError::kind`] when only the failure category matters.

use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a document store.
#[derive(Error, Debug)]
pub enum DocumentStoreError {
    /// The requested collection does not exist in the store.
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),
    /// The requested record was not found in the collection.
    /// The first argument is the record ID, the second is the collection name.
    #[error("Record {0} not found in collection {1}")]
    RecordNotFound(String, String),
    /// Import input could not be decoded: bad JSON, wrong top-level shape, or invalid UTF-8.
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    /// An import was requested without any attached data.
    #[error("No payload provided")]
    NoPayload,
    /// A registered hook failed. The first argument is the route key.
    #[error("Hook failed on route {0}: {1}")]
    Hook(String, String),
    /// Encoding an export failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Failure category of a [`DocumentStoreError`].
///
/// A missing collection and a missing record share [`ErrorKind::NotFound`]; the
/// operation's own scope tells them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    MalformedInput,
    NoPayload,
    Hook,
    Internal,
}

impl DocumentStoreError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DocumentStoreError::CollectionNotFound(_)
            | DocumentStoreError::RecordNotFound(_, _) => ErrorKind::NotFound,
            DocumentStoreError::MalformedInput(_) => ErrorKind::MalformedInput,
            DocumentStoreError::NoPayload => ErrorKind::NoPayload,
            DocumentStoreError::Hook(_, _) => ErrorKind::Hook,
            DocumentStoreError::Serialization(_)
            | DocumentStoreError::Backend(_) => ErrorKind::Internal,
        }
    }

    /// Returns `true` if this error reports an absent collection or record.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Convenience constructor for hook callbacks reporting a failure.
    pub fn hook(route: impl Into<String>, message: impl Into<String>) -> Self {
        DocumentStoreError::Hook(route.into(), message.into())
    }
}

/// A specialized `Result` type for document store operations.
///
/// This type alias is used throughout the crate to indicate operations that may fail
/// with a [`DocumentStoreError`].
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

impl From<SerdeJsonError> for DocumentStoreError {
    fn from(err: SerdeJsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}
