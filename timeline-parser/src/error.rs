use thiserror::Error;

use crate::Column;

/// Why a row did not become an [`Event`](crate::Event).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("missing required field `{0}`")]
    MissingRequiredField(Column),
    #[error("invalid start year `{0}`")]
    InvalidStartYear(String),
}
