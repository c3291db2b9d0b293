//! Application service errors.

use md_01_menu_tree::MalformedMenuTree;
use md_03_object_storage::StorageError;
use shared_types::BackendError;
use thiserror::Error;

use crate::domain::FieldError;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input fields rejected, all of them listed
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error(transparent)]
    MalformedTree(#[from] MalformedMenuTree),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// Existing todos were deleted but their replacements were not inserted
    #[error("removed {removed} todos, then insert failed: {cause}")]
    PartialReplace { removed: usize, cause: BackendError },

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
