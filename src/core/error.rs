use crate::core::Operation;
use thiserror::Error;

/// Failure reported by a registry implementation. The text is kept for
/// diagnostics only and is never shown to the user.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Schema not found: {0}")]
    SchemaNotFound(String),

    #[error("Rejected by registry: {0}")]
    Rejected(String),

    #[error("Transport error: {0}")]
    Transport(#[from] anyhow::Error),
}

/// Why an operation was refused before reaching the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    Busy,
    EmptyFieldName,
    DuplicateFieldName,
    IndexOutOfRange,
    NoFields,
    EmptySchemaId,
    NoSchemaFetched,
    UnknownField,
    EmptyDraft,
}

/// A value in the attestation draft that does not fit its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub expected: String,
    pub value: String,
}

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Precondition not met: {0:?}")]
    PreconditionNotMet(Precondition),

    #[error("failed to {operation}")]
    OperationFailed {
        operation: Operation,
        #[source]
        source: RegistryError,
    },

    #[error("Invalid draft: {} field(s) do not match their declared type", .0.len())]
    InvalidDraft(Vec<FieldIssue>),
}

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

pub type Result<T> = std::result::Result<T, WorkflowError>;
