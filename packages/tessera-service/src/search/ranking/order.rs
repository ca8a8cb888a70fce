use std::cmp::Ordering;

use crate::document::ScoredResult;

pub fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}

/// Score descending, then id ascending.
pub fn cmp_results(left: &ScoredResult, right: &ScoredResult) -> Ordering {
	cmp_f32_desc(left.score, right.score).then_with(|| left.id.cmp(&right.id))
}

pub fn sort_results(results: &mut [ScoredResult]) {
	results.sort_by(cmp_results);
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::document::{Document, DocumentInput, Metadata};

	fn result(id: &str, score: f32) -> ScoredResult {
		let doc = Document::new(DocumentInput {
			id: id.to_string(),
			content: String::new(),
			metadata: Metadata::new("a.txt"),
		});

		ScoredResult::new(&doc, score)
	}

	#[test]
	fn nan_sorts_last() {
		assert_eq!(cmp_f32_desc(f32::NAN, 0.1), Ordering::Greater);
		assert_eq!(cmp_f32_desc(0.9, 0.1), Ordering::Less);
	}

	#[test]
	fn ties_break_on_id() {
		let mut results = vec![result("doc_b", 0.5), result("doc_c", 0.9), result("doc_a", 0.5)];

		sort_results(&mut results);

		let ids: Vec<&str> = results.iter().map(|item| item.id.as_str()).collect();

		assert_eq!(ids, vec!["doc_c", "doc_a", "doc_b"]);
	}
}
