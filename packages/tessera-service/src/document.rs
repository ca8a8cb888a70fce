use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use tessera_domain::keywords;

pub const UNKNOWN_SOURCE: &str = "unknown";

/// Provenance of a document. `source_file` is the unit of diversity balancing; everything the
/// ranking does not read lives in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
	#[serde(default = "unknown_source")]
	pub source_file: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub platform: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub source_type: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub chunk_index: Option<u32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub total_chunks: Option<u32>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
impl Metadata {
	pub fn new(source_file: impl Into<String>) -> Self {
		Self {
			source_file: source_file.into(),
			platform: None,
			source_type: None,
			chunk_index: None,
			total_chunks: None,
			extra: Map::new(),
		}
	}

	pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
		self.platform = Some(platform.into());

		self
	}

	pub fn is_platform(&self, marker: &str) -> bool {
		self.platform
			.as_deref()
			.map(|platform| platform.trim().eq_ignore_ascii_case(marker))
			.unwrap_or(false)
	}
}

/// A document as supplied by a corpus loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInput {
	pub id: String,
	pub content: String,
	pub metadata: Metadata,
}

/// An ingested document with its derived search fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
	pub id: String,
	pub content: String,
	pub metadata: Metadata,
	#[serde(default)]
	pub content_lower: String,
	#[serde(default)]
	pub keywords: BTreeSet<String>,
}
impl Document {
	pub fn new(input: DocumentInput) -> Self {
		let content_lower = input.content.to_lowercase();
		let keywords = keywords::extract_keywords(&content_lower);

		Self {
			id: input.id,
			content: input.content,
			metadata: input.metadata,
			content_lower,
			keywords,
		}
	}

	pub fn source(&self) -> &str {
		self.metadata.source_file.as_str()
	}
}
impl From<Document> for DocumentInput {
	fn from(doc: Document) -> Self {
		Self { id: doc.id, content: doc.content, metadata: doc.metadata }
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
	pub id: String,
	pub content: String,
	pub metadata: Metadata,
	pub score: f32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub original_score: Option<f32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub source_weight: Option<f32>,
}
impl ScoredResult {
	pub fn new(doc: &Document, score: f32) -> Self {
		Self {
			id: doc.id.clone(),
			content: doc.content.clone(),
			metadata: doc.metadata.clone(),
			score: clamp_score(score),
			original_score: None,
			source_weight: None,
		}
	}

	pub fn source(&self) -> &str {
		self.metadata.source_file.as_str()
	}
}

pub fn clamp_score(score: f32) -> f32 {
	if score.is_nan() {
		return 0.0;
	}

	score.clamp(0.0, 1.0)
}

fn unknown_source() -> String {
	UNKNOWN_SOURCE.to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn derives_search_fields() {
		let doc = Document::new(DocumentInput {
			id: "doc_1".to_string(),
			content: "Remote Benefits Package".to_string(),
			metadata: Metadata::new("kb2.txt"),
		});

		assert_eq!(doc.content_lower, "remote benefits package");
		assert!(doc.keywords.contains("benefits"));
		assert_eq!(doc.source(), "kb2.txt");
	}

	#[test]
	fn metadata_defaults_missing_source() {
		let metadata: Metadata =
			serde_json::from_value(serde_json::json!({ "platform": "general", "author": "hr" }))
				.expect("Metadata must deserialize.");

		assert_eq!(metadata.source_file, UNKNOWN_SOURCE);
		assert_eq!(metadata.platform.as_deref(), Some("general"));
		assert_eq!(metadata.extra.get("author"), Some(&serde_json::json!("hr")));
	}

	#[test]
	fn extra_metadata_round_trips_flat() {
		let mut metadata = Metadata::new("guide.txt").with_platform("linkedin");

		metadata.extra.insert("section".to_string(), serde_json::json!("intro"));

		let value = serde_json::to_value(&metadata).expect("Metadata must serialize.");

		assert_eq!(value["section"], "intro");
		assert_eq!(value["source_file"], "guide.txt");
		assert!(value.get("chunk_index").is_none());
	}

	#[test]
	fn platform_match_ignores_case() {
		let metadata = Metadata::new("a.txt").with_platform("LinkedIn");

		assert!(metadata.is_platform("linkedin"));
		assert!(!Metadata::new("a.txt").is_platform("linkedin"));
	}

	#[test]
	fn scores_are_clamped() {
		assert_eq!(clamp_score(1.7), 1.0);
		assert_eq!(clamp_score(-0.2), 0.0);
		assert_eq!(clamp_score(f32::NAN), 0.0);
	}
}
