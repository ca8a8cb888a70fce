use std::{io, path::PathBuf};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read config file at {}.", path.display())]
	Read { path: PathBuf, source: io::Error },
	#[error("Config file at {} is not valid TOML.", path.display())]
	Parse { path: PathBuf, source: toml::de::Error },
	#[error("Invalid config value for {key}: {message}")]
	Validation { key: &'static str, message: String },
}
impl Error {
	pub fn key(&self) -> Option<&'static str> {
		match self {
			Self::Validation { key, .. } => Some(key),
			_ => None,
		}
	}
}
