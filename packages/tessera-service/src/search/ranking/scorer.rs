use tessera_config::Scoring;
use tessera_domain::query::PreparedQuery;

use crate::{
	document::{Document, ScoredResult, clamp_score},
	search::ranking::order,
};

/// Additive lexical similarity between a query and a document, clamped to `[0, 1]`.
#[derive(Clone, Debug)]
pub struct LexicalScorer {
	cfg: Scoring,
}
impl LexicalScorer {
	pub fn new(cfg: &Scoring) -> Self {
		Self { cfg: cfg.clone() }
	}

	pub fn platform_marker(&self) -> &str {
		self.cfg.platform_marker.as_str()
	}

	/// A blank query scores zero against every document.
	pub fn similarity(&self, query: &PreparedQuery, doc: &Document) -> f32 {
		if query.is_blank() {
			return 0.0;
		}

		let content = doc.content_lower.as_str();
		let mut score = 0.0_f32;

		if content.contains(query.lowered.as_str()) {
			score += self.cfg.substring_weight;
		}

		let word_hits = query.words.iter().filter(|word| content.contains(word.as_str())).count();

		score += word_hits as f32 * self.cfg.word_weight;

		let shared_keywords = query.keywords.intersection(&doc.keywords).count();

		score += shared_keywords as f32 * self.cfg.keyword_weight;

		let marker = self.platform_marker();
		let query_names_platform = query.mentions(marker);
		let doc_on_platform = doc.metadata.is_platform(marker);

		if query_names_platform && doc_on_platform {
			score += self.cfg.platform_boost;
		} else if !query_names_platform && !doc_on_platform {
			score += self.cfg.generic_boost;
		}

		clamp_score(score.min(1.0))
	}

	/// Scores every document and keeps those above the similarity threshold, best first.
	pub fn score_documents(&self, query: &PreparedQuery, docs: &[Document]) -> Vec<ScoredResult> {
		let mut results = docs
			.iter()
			.filter_map(|doc| {
				let score = self.similarity(query, doc);

				(score > self.cfg.min_similarity).then(|| ScoredResult::new(doc, score))
			})
			.collect::<Vec<_>>();

		order::sort_results(&mut results);

		results
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::document::{DocumentInput, Metadata};

	fn doc(id: &str, content: &str, platform: Option<&str>) -> Document {
		let mut metadata = Metadata::new("guide.txt");

		metadata.platform = platform.map(str::to_string);

		Document::new(DocumentInput { id: id.to_string(), content: content.to_string(), metadata })
	}

	fn scorer() -> LexicalScorer {
		LexicalScorer::new(&Scoring::default())
	}

	#[test]
	fn word_and_keyword_hits_add_up() {
		// One word hit (0.3), one shared keyword (0.2) and the generic boost (0.2).
		let query = PreparedQuery::new("remote salary");
		let score = scorer().similarity(&query, &doc("doc_1", "Remote work.", None));

		assert!((score - 0.7).abs() < 1e-6);

		let score =
			scorer().similarity(&PreparedQuery::new("salary"), &doc("doc_2", "No match.", None));

		assert!((score - 0.2).abs() < 1e-6);
	}

	#[test]
	fn platform_boost_requires_both_sides() {
		let query = PreparedQuery::new("linkedin");
		let on_platform = doc("doc_1", "Nothing relevant.", Some("LinkedIn"));
		let general = doc("doc_2", "Nothing relevant.", Some("general"));

		assert!((scorer().similarity(&query, &on_platform) - 0.5).abs() < 1e-6);
		assert_eq!(scorer().similarity(&query, &general), 0.0);
	}

	#[test]
	fn platform_doc_gets_no_generic_boost() {
		let query = PreparedQuery::new("salary");
		let on_platform = doc("doc_1", "Nothing relevant.", Some("linkedin"));

		assert_eq!(scorer().similarity(&query, &on_platform), 0.0);
	}

	#[test]
	fn score_is_capped_at_one() {
		let query = PreparedQuery::new("linkedin job posting format");
		let target = doc("doc_1", "LinkedIn job posting format guide.", Some("linkedin"));

		assert_eq!(scorer().similarity(&query, &target), 1.0);
	}

	#[test]
	fn blank_query_scores_zero() {
		let query = PreparedQuery::new("   ");

		assert_eq!(scorer().similarity(&query, &doc("doc_1", "Text.", None)), 0.0);
	}

	#[test]
	fn threshold_excludes_low_scores() {
		let mut cfg = Scoring::default();

		cfg.min_similarity = 0.2;

		let scorer = LexicalScorer::new(&cfg);
		let docs = vec![doc("doc_1", "Unrelated text.", None), doc("doc_2", "Salary bands.", None)];
		let results = scorer.score_documents(&PreparedQuery::new("salary"), &docs);

		assert_eq!(results.len(), 1);
		assert_eq!(results[0].id, "doc_2");
	}
}
