use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::document::ScoredResult;

/// Diversity above this value counts as balanced.
pub const BALANCED_DIVERSITY: f32 = 0.5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceStats {
	pub count: usize,
	pub percentage: f32,
	pub avg_score: f32,
	pub max_score: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceDistribution {
	pub total_results: usize,
	pub total_sources: usize,
	pub diversity_score: f32,
	pub sources: BTreeMap<String, SourceStats>,
	pub is_balanced: bool,
	pub dominant_source: Option<String>,
}
impl SourceDistribution {
	pub fn empty() -> Self {
		Self {
			total_results: 0,
			total_sources: 0,
			diversity_score: 0.0,
			sources: BTreeMap::new(),
			is_balanced: false,
			dominant_source: None,
		}
	}

	/// Share of the largest source, in percent. Zero for an empty distribution.
	pub fn dominant_percentage(&self) -> f32 {
		self.sources.values().map(|stats| stats.percentage).fold(0.0, f32::max)
	}
}

pub fn analyze(results: &[ScoredResult]) -> SourceDistribution {
	if results.is_empty() {
		return SourceDistribution::empty();
	}

	let mut first_seen: Vec<&str> = Vec::new();
	let mut scores: HashMap<&str, Vec<f32>> = HashMap::new();

	for result in results {
		let entry = scores.entry(result.source()).or_insert_with(|| {
			first_seen.push(result.source());

			Vec::new()
		});

		entry.push(result.score);
	}

	let total_results = results.len();
	let total_sources = scores.len();
	let max_count = scores.values().map(Vec::len).max().unwrap_or(0);
	let diversity = if total_sources <= 1 || max_count == 0 {
		0.0
	} else {
		(total_sources as f32 / max_count as f32).min(1.0)
	};
	let mut dominant_source: Option<(&str, usize)> = None;

	for source in &first_seen {
		let count = scores.get(source).map(Vec::len).unwrap_or(0);

		if dominant_source.map(|(_, best)| count > best).unwrap_or(true) {
			dominant_source = Some((*source, count));
		}
	}

	let sources = scores
		.iter()
		.map(|(source, values)| {
			let count = values.len();
			let sum: f32 = values.iter().sum();
			let max = values.iter().copied().fold(f32::MIN, f32::max);

			(
				source.to_string(),
				SourceStats {
					count,
					percentage: round3(count as f32 / total_results as f32 * 100.0),
					avg_score: round3(sum / count as f32),
					max_score: round3(max),
				},
			)
		})
		.collect();

	SourceDistribution {
		total_results,
		total_sources,
		diversity_score: round3(diversity),
		sources,
		is_balanced: diversity > BALANCED_DIVERSITY,
		dominant_source: dominant_source.map(|(source, _)| source.to_string()),
	}
}

pub fn round3(value: f32) -> f32 {
	(value * 1000.0).round() / 1000.0
}
