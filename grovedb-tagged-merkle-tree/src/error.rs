use thiserror::Error;

/// Errors from tagged Merkle tree operations.
///
/// Verification never produces an error because of proof content; a proof
/// that does not lead to the claimed root is reported as `false`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaggedMerkleError {
    /// A required argument was empty or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The item collection passed to tree construction was empty.
    #[error("item list cannot be empty")]
    EmptyInput,
    /// A binary proof could not be decoded.
    #[error("invalid proof: {0}")]
    InvalidProof(String),
}

/// Alias for `core::result::Result<T, TaggedMerkleError>`.
pub type Result<T> = core::result::Result<T, TaggedMerkleError>;

/// Fail with `InvalidArgument` when `value` is empty.
pub(crate) fn ensure_not_empty(value: &[u8], field: &str) -> Result<()> {
    if value.is_empty() {
        return Err(TaggedMerkleError::InvalidArgument(format!(
            "{} cannot be empty",
            field
        )));
    }
    Ok(())
}
