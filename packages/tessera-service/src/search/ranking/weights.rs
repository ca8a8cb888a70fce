use std::collections::BTreeMap;

use crate::{
	document::{ScoredResult, clamp_score},
	search::ranking::{distribution::SourceDistribution, order},
};

pub const MAX_SOURCE_WEIGHT: f32 = 2.0;

/// Boost factors for sources holding less than an equal share of `distribution`.
///
/// A source with `count` of `total` results among `n` sources is underrepresented when
/// `count * n < total` and then gets `total / (n * count)`, capped at [`MAX_SOURCE_WEIGHT`].
/// Every other source gets exactly `1.0`.
pub fn compute_source_weights(distribution: &SourceDistribution) -> BTreeMap<String, f32> {
	let num_sources = distribution.sources.len();
	let total = distribution.total_results;

	if num_sources == 0 || total == 0 {
		return BTreeMap::new();
	}

	distribution
		.sources
		.iter()
		.map(|(source, stats)| {
			let weight = if stats.count == 0 {
				MAX_SOURCE_WEIGHT
			} else if stats.count * num_sources < total {
				(total as f32 / (num_sources * stats.count) as f32).min(MAX_SOURCE_WEIGHT)
			} else {
				1.0
			};

			(source.clone(), weight)
		})
		.collect()
}

/// Multiplies each score by its source weight and re-sorts. Unknown sources and unusable
/// weights count as `1.0`.
pub fn reweight(results: Vec<ScoredResult>, weights: &BTreeMap<String, f32>) -> Vec<ScoredResult> {
	let mut reweighted = results
		.into_iter()
		.map(|mut result| {
			let weight = weights
				.get(result.source())
				.copied()
				.filter(|weight| weight.is_finite() && *weight >= 0.0)
				.unwrap_or(1.0);

			result.original_score = Some(result.score);
			result.score = clamp_score(result.score * weight);
			result.source_weight = Some(weight);

			result
		})
		.collect::<Vec<_>>();

	order::sort_results(&mut reweighted);

	reweighted
}
