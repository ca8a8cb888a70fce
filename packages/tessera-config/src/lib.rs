mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Balancing, Chunking, Config, KnowledgeBase, Scoring, Search, Service, Storage};

use std::{
	fs,
	path::{Path, PathBuf},
};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::Read { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::Parse { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

/// Parses, normalizes and validates a config held in memory.
pub fn from_toml_str(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::Parse { path: PathBuf::from("<inline>"), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(invalid("service.log_level", "must be non-empty."));
	}
	if cfg.storage.collection_name.trim().is_empty() {
		return Err(invalid("storage.collection_name", "must be non-empty."));
	}

	let scoring = &cfg.scoring;

	if !scoring.min_similarity.is_finite() || !(0.0..1.0).contains(&scoring.min_similarity) {
		return Err(invalid("scoring.min_similarity", "must be in the range 0.0-1.0 (exclusive)."));
	}

	for (key, weight) in [
		("scoring.substring_weight", scoring.substring_weight),
		("scoring.word_weight", scoring.word_weight),
		("scoring.keyword_weight", scoring.keyword_weight),
		("scoring.platform_boost", scoring.platform_boost),
		("scoring.generic_boost", scoring.generic_boost),
	] {
		if !weight.is_finite() {
			return Err(invalid(key, "must be a finite number."));
		}
		if weight < 0.0 {
			return Err(invalid(key, "must be zero or greater."));
		}
	}

	if scoring.platform_marker.is_empty() {
		return Err(invalid("scoring.platform_marker", "must be non-empty."));
	}
	if scoring.platform_marker.chars().any(char::is_whitespace) {
		return Err(invalid("scoring.platform_marker", "must be a single word."));
	}
	if cfg.balancing.min_sources == 0 {
		return Err(invalid("balancing.min_sources", "must be greater than zero."));
	}
	if cfg.balancing.max_per_source == 0 {
		return Err(invalid("balancing.max_per_source", "must be greater than zero."));
	}
	if cfg.balancing.candidate_multiplier == 0 {
		return Err(invalid("balancing.candidate_multiplier", "must be greater than zero."));
	}
	if cfg.search.top_k == 0 {
		return Err(invalid("search.top_k", "must be greater than zero."));
	}
	if cfg.chunking.chunk_size == 0 {
		return Err(invalid("chunking.chunk_size", "must be greater than zero."));
	}
	if cfg.chunking.overlap >= cfg.chunking.chunk_size {
		return Err(invalid("chunking.overlap", "must be less than chunking.chunk_size."));
	}

	if let Some(kb) = cfg.knowledge_base.as_ref()
		&& kb.path.as_os_str().is_empty()
	{
		return Err(invalid("knowledge_base.path", "must be non-empty when set."));
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.storage.corpus_path.as_ref().map(|path| path.as_os_str().is_empty()).unwrap_or(false) {
		cfg.storage.corpus_path = None;
	}

	cfg.scoring.platform_marker = cfg.scoring.platform_marker.trim().to_lowercase();
}

fn invalid(key: &'static str, message: &str) -> Error {
	Error::Validation { key, message: message.to_string() }
}
