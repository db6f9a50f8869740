#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error(transparent)]
	Qdrant(#[from] Box<qdrant_client::QdrantError>),
}
impl Error {
	/// Connection-level failures are worth retrying; statement errors are
	/// deterministic and are not.
	pub fn is_transient(&self) -> bool {
		match self {
			Self::Sqlx(err) => matches!(
				err,
				sqlx::Error::PoolTimedOut
					| sqlx::Error::PoolClosed
					| sqlx::Error::Io(_)
					| sqlx::Error::Protocol(_)
					| sqlx::Error::WorkerCrashed
			),
			_ => false,
		}
	}
}
impl From<qdrant_client::QdrantError> for Error {
	fn from(err: qdrant_client::QdrantError) -> Self {
		Self::Qdrant(Box::new(err))
	}
}
