pub mod ranking;

use tessera_domain::query::{PreparedQuery, platform_query};

use crate::{Result, RetrievalEngine, document::ScoredResult, search::ranking::BalanceMode};

impl RetrievalEngine {
	/// Scores the corpus against `query` and returns at most `target_count` results, balanced
	/// across sources when `balance` is set. Failures are logged and yield no results.
	pub fn search(&self, query: &str, target_count: usize, balance: bool) -> Vec<ScoredResult> {
		match self.try_search(query, target_count, balance) {
			Ok(results) => results,
			Err(err) => {
				tracing::error!(error = %err, "Search failed.");

				Vec::new()
			},
		}
	}

	/// Searches with the configured `top_k` and balancing switch.
	pub fn search_default(&self, query: &str) -> Vec<ScoredResult> {
		self.search(query, self.default_top_k(), self.cfg.balancing.enabled)
	}

	/// Balanced search for `"{query} {platform}"`, retried with the bare query when the
	/// platform-qualified one finds nothing. A blank query finds nothing.
	pub fn search_by_platform(&self, query: &str, platform: &str) -> Vec<ScoredResult> {
		if PreparedQuery::new(query).is_blank() {
			tracing::debug!(platform, "Skipping platform search for a blank query.");

			return Vec::new();
		}

		let top_k = self.default_top_k();
		let results = self.search(&platform_query(query, platform), top_k, true);

		if !results.is_empty() {
			return results;
		}

		tracing::info!(platform, "No platform-specific results. Falling back to the plain query.");

		self.search(query, top_k, true)
	}

	/// Boosts sources that are underrepresented among the candidates, then keeps the best
	/// `target_count`.
	pub fn search_reweighted(&self, query: &str, target_count: usize) -> Vec<ScoredResult> {
		match self.try_search_reweighted(query, target_count) {
			Ok(results) => results,
			Err(err) => {
				tracing::error!(error = %err, "Reweighted search failed.");

				Vec::new()
			},
		}
	}

	pub(crate) fn try_search(
		&self,
		query: &str,
		target_count: usize,
		balance: bool,
	) -> Result<Vec<ScoredResult>> {
		let mut candidates = self.score_candidates(query, target_count)?;

		if candidates.is_empty() {
			return Ok(candidates);
		}
		if !balance {
			candidates.truncate(target_count);

			tracing::info!(results = candidates.len(), balanced = false, "Search completed.");

			return Ok(candidates);
		}

		candidates.truncate(self.candidate_limit(target_count));

		let outcome = ranking::balance_with_outcome(candidates, target_count, &self.policy);

		if outcome.mode == BalanceMode::RoundRobin {
			let distribution = ranking::analyze(&outcome.results);

			tracing::info!(
				sources = distribution.total_sources,
				diversity_score = distribution.diversity_score,
				"Search balanced."
			);
		}

		tracing::info!(results = outcome.results.len(), balanced = true, "Search completed.");

		Ok(outcome.results)
	}

	fn try_search_reweighted(&self, query: &str, target_count: usize) -> Result<Vec<ScoredResult>> {
		let mut candidates = self.score_candidates(query, target_count)?;

		candidates.truncate(self.candidate_limit(target_count));

		let weights = ranking::compute_source_weights(&ranking::analyze(&candidates));
		let mut results = ranking::reweight(candidates, &weights);

		results.truncate(target_count);

		Ok(results)
	}

	/// Every document above the similarity threshold, best first.
	fn score_candidates(&self, query: &str, target_count: usize) -> Result<Vec<ScoredResult>> {
		let prepared = PreparedQuery::new(query);

		if target_count == 0 || prepared.is_blank() {
			tracing::debug!(target_count, "Skipping search for a blank query or zero target.");

			return Ok(Vec::new());
		}

		self.store.with_documents(|docs| self.scorer.score_documents(&prepared, docs))
	}

	fn candidate_limit(&self, target_count: usize) -> usize {
		target_count.saturating_mul(self.cfg.balancing.candidate_multiplier.max(1) as usize)
	}
}
