use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use tessera_domain::query::PreparedQuery;

use crate::{
	Error, Result, RetrievalEngine,
	document::ScoredResult,
	search::ranking::{self, BALANCED_DIVERSITY, SourceDistribution},
};

pub const INSUFFICIENT_DIVERSITY: &str = "insufficient source diversity";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnbalancedBlock {
	pub results_count: usize,
	pub source_distribution: SourceDistribution,
	pub dominant_source_percentage: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BalancedBlock {
	pub results_count: usize,
	pub source_distribution: SourceDistribution,
	pub diversity_improvement: f32,
}

/// Side-by-side comparison of plain and balanced retrieval for one query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiasReport {
	pub query: String,
	pub unbalanced: UnbalancedBlock,
	pub balanced: BalancedBlock,
	pub bias_detected: bool,
	pub balancing_effective: bool,
	pub source_weights: BTreeMap<String, f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BiasAnalysis {
	Report(Box<BiasReport>),
	Failed { error: String },
}
impl BiasAnalysis {
	pub fn report(&self) -> Option<&BiasReport> {
		match self {
			Self::Report(report) => Some(report),
			Self::Failed { .. } => None,
		}
	}

	pub fn error(&self) -> Option<&str> {
		match self {
			Self::Report(_) => None,
			Self::Failed { error } => Some(error.as_str()),
		}
	}
}

pub fn build_report(
	query: &str,
	unbalanced: &[ScoredResult],
	balanced: &[ScoredResult],
) -> BiasReport {
	let unbalanced_dist = ranking::analyze(unbalanced);
	let balanced_dist = ranking::analyze(balanced);
	let improvement =
		ranking::round3(balanced_dist.diversity_score - unbalanced_dist.diversity_score);
	let source_weights = ranking::compute_source_weights(&unbalanced_dist);

	BiasReport {
		query: query.to_string(),
		bias_detected: unbalanced_dist.diversity_score < BALANCED_DIVERSITY,
		balancing_effective: balanced_dist.diversity_score > unbalanced_dist.diversity_score,
		unbalanced: UnbalancedBlock {
			results_count: unbalanced.len(),
			dominant_source_percentage: unbalanced_dist.dominant_percentage(),
			source_distribution: unbalanced_dist,
		},
		balanced: BalancedBlock {
			results_count: balanced.len(),
			source_distribution: balanced_dist,
			diversity_improvement: improvement,
		},
		source_weights,
	}
}

impl RetrievalEngine {
	/// Runs `query` with and without balancing and reports how skewed the plain ranking is.
	/// Errors come back as [`BiasAnalysis::Failed`].
	pub fn analyze_search_bias(&self, query: &str, n_results: usize) -> BiasAnalysis {
		match self.try_analyze_search_bias(query, n_results) {
			Ok(report) => BiasAnalysis::Report(Box::new(report)),
			Err(Error::InsufficientSources { found, required }) => {
				tracing::warn!(found, required, "Bias analysis needs more distinct sources.");

				BiasAnalysis::Failed { error: INSUFFICIENT_DIVERSITY.to_string() }
			},
			Err(err) => {
				tracing::error!(error = %err, "Bias analysis failed.");

				BiasAnalysis::Failed { error: err.to_string() }
			},
		}
	}

	fn try_analyze_search_bias(&self, query: &str, n_results: usize) -> Result<BiasReport> {
		if PreparedQuery::new(query).is_blank() {
			return Err(Error::InvalidRequest { message: "Query must not be blank.".to_string() });
		}
		if n_results == 0 {
			return Err(Error::InvalidRequest {
				message: "n_results must be greater than zero.".to_string(),
			});
		}

		let found = self.store.source_count()?;
		let required = self.policy.min_sources;

		if found < required {
			return Err(Error::InsufficientSources { found, required });
		}

		let unbalanced = self.try_search(query, n_results, false)?;
		let balanced = self.try_search(query, n_results, true)?;
		let report = build_report(query, &unbalanced, &balanced);

		tracing::info!(
			bias_detected = report.bias_detected,
			balancing_effective = report.balancing_effective,
			diversity_improvement = report.balanced.diversity_improvement,
			"Bias analysis completed."
		);

		Ok(report)
	}
}
