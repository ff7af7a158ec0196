//! Bus Debug Error Hierarchy
//!
//! Defines the error types surfaced by the inspection layer, categorized by
//! the component that rejects the operation.

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Client/fabric registry shape violations
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Operator text input rejected by the update-request parser or a scalar file
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Inspection surface bring-up and file access failures
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    /// Status reported back by the external scaling framework
    #[error(transparent)]
    Framework(#[from] FrameworkError),

    /// Configuration loading failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Configuration validation failures
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Scratch or display buffer could not be reserved
    #[error("Failed to allocate {requested} bytes")]
    AllocationFailure { requested: usize },

    /// Host I/O used by the operator binary
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A live record already carries this identity
    #[error("Client {identity} is already registered")]
    DuplicateClient { identity: String },

    #[error("Fabric {name} is already registered")]
    DuplicateFabric { name: String },

    #[error("Fabric {name} not found")]
    FabricNotFound { name: String },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    /// Trailing token after the client name is not a decimal integer
    #[error("Index conversion failed for {token:?}")]
    InvalidIndexFormat { token: String },

    /// Requested usecase index exceeds the client's usecase table
    #[error("Invalid index {index} for client {client} with {num_usecases} usecases")]
    IndexOutOfRange {
        client: String,
        index: u64,
        num_usecases: usize,
    },

    /// Scalar file write that is not a decimal value
    #[error("Invalid value {input:?}")]
    InvalidValue { input: String },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SurfaceError {
    /// Bring-up aborted; every entry created so far has been removed
    #[error("Inspection surface initialization failed: {reason}")]
    InitializationFailure { reason: String },

    #[error("No such entry: {path}")]
    NotFound { path: String },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    /// Entry creation requested before the surface is live
    #[error("Inspection surface is not ready")]
    NotReady,

    /// Failure reported by the filesystem backend
    #[error("Inspection backend error: {0}")]
    Backend(String),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrameworkError {
    #[error("Scaling framework rejected request with status {0}")]
    Status(i32),
}

impl Error {
    /// Maps a failed reservation onto [`Error::AllocationFailure`].
    pub(crate) fn allocation(requested: usize) -> Self {
        Error::AllocationFailure { requested }
    }
}
