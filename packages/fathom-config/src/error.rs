pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read config file at {path:?}.")]
	Read { path: std::path::PathBuf, source: std::io::Error },
	#[error("Failed to parse config file at {path:?}.")]
	Parse { path: std::path::PathBuf, source: toml::de::Error },
	#[error("Unsupported warehouse dialect {dialect:?}; expected \"legacy-rownum\" or \"fetch-first\".")]
	UnknownDialect { dialect: String },
	#[error("Invalid value for {field}: {reason}.")]
	Invalid { field: &'static str, reason: &'static str },
}

impl Error {
	pub(crate) fn invalid(field: &'static str, reason: &'static str) -> Self {
		Self::Invalid { field, reason }
	}
}
