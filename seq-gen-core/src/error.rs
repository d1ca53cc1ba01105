use thiserror::Error;

/// Errors produced by the n-gram graph and sequence generation layers.
///
/// # Variants
/// - `InvalidInput`: a structural precondition was violated (empty pool,
///   n-gram too short, length mismatch, too few path positions, ...).
///   Always raised eagerly, at construction or query time.
/// - `Disconnected`: no path exists between the configured start and end
///   vertices. This is a legal terminal state of the data, not a bug, but
///   any operation that must produce a path or sequence fails with it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
	#[error("invalid input: {0}")]
	InvalidInput(String),

	#[error("start and end vertices are disconnected")]
	Disconnected,
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
	/// Shorthand for building an `InvalidInput` from anything displayable.
	pub(crate) fn invalid(msg: impl Into<String>) -> Self {
		Error::InvalidInput(msg.into())
	}
}
