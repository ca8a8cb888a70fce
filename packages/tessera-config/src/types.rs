use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub scoring: Scoring,
	#[serde(default)]
	pub balancing: Balancing,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub chunking: Chunking,
	pub knowledge_base: Option<KnowledgeBase>,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub collection_name: String,
	/// Optional. When absent the corpus lives in memory only.
	pub corpus_path: Option<PathBuf>,
}

/// Weights of the additive lexical similarity heuristic.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Scoring {
	/// Documents scoring at or below this value never become candidates.
	pub min_similarity: f32,
	pub substring_weight: f32,
	pub word_weight: f32,
	pub keyword_weight: f32,
	pub platform_marker: String,
	/// Added when the query names the platform and the document belongs to it.
	pub platform_boost: f32,
	/// Added when the query does not name the platform and the document is not of it.
	pub generic_boost: f32,
}
impl Default for Scoring {
	fn default() -> Self {
		Self {
			min_similarity: 0.1,
			substring_weight: 0.8,
			word_weight: 0.3,
			keyword_weight: 0.2,
			platform_marker: "linkedin".to_string(),
			platform_boost: 0.5,
			generic_boost: 0.2,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Balancing {
	pub enabled: bool,
	pub min_sources: u32,
	pub max_per_source: u32,
	/// Balanced searches score `top_k * candidate_multiplier` candidates before selection.
	pub candidate_multiplier: u32,
}
impl Default for Balancing {
	fn default() -> Self {
		Self { enabled: true, min_sources: 2, max_per_source: 3, candidate_multiplier: 2 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	pub top_k: u32,
}
impl Default for Search {
	fn default() -> Self {
		Self { top_k: 5 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Chunking {
	pub chunk_size: u32,
	pub overlap: u32,
}
impl Default for Chunking {
	fn default() -> Self {
		Self { chunk_size: 1_000, overlap: 200 }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeBase {
	pub path: PathBuf,
}
