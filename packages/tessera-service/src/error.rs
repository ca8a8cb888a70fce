use std::{io, path::PathBuf};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Insufficient source diversity: found {found} sources, need at least {required}.")]
	InsufficientSources { found: usize, required: usize },
	#[error("Document store lock is poisoned.")]
	LockPoisoned,
	#[error("Failed to access {}.", path.display())]
	Io { path: PathBuf, source: io::Error },
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
}
