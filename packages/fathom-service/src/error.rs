pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Qdrant error: {message}")]
	Qdrant { message: String },
}
impl From<fathom_providers::Error> for Error {
	fn from(err: fathom_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<fathom_storage::Error> for Error {
	fn from(err: fathom_storage::Error) -> Self {
		match err {
			fathom_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			fathom_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			fathom_storage::Error::Qdrant(inner) => Self::Qdrant { message: inner.to_string() },
		}
	}
}

impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}
