use thiserror::Error;

/// Errors returned by the checked operations of [`AvlTree`](crate::AvlTree).
///
/// Missing keys and duplicate inserts are not errors, they are reported
/// through the `bool`/`Option` results of the operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) const NONE_KEY: Error = Error::InvalidArgument("key must not be None");
    pub(crate) const NONE_VALUE: Error = Error::InvalidArgument("value must not be None");
}
