use std::collections::{HashMap, HashSet};

use serde::Serialize;

use tessera_config::Balancing;

use crate::{document::ScoredResult, search::ranking::order};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BalancePolicy {
	/// Below this many distinct sources the candidates are returned by score alone.
	pub min_sources: usize,
	pub max_per_source: usize,
}
impl BalancePolicy {
	fn cap(&self) -> usize {
		self.max_per_source.max(1)
	}
}
impl Default for BalancePolicy {
	fn default() -> Self {
		Self { min_sources: 2, max_per_source: 3 }
	}
}
impl From<&Balancing> for BalancePolicy {
	fn from(cfg: &Balancing) -> Self {
		Self { min_sources: cfg.min_sources as usize, max_per_source: cfg.max_per_source as usize }
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceMode {
	Empty,
	Degraded,
	RoundRobin,
}

#[derive(Clone, Debug)]
pub struct BalanceOutcome {
	pub results: Vec<ScoredResult>,
	pub mode: BalanceMode,
	pub round_robin_picks: usize,
	pub fill_picks: usize,
}

pub fn balance(
	candidates: Vec<ScoredResult>,
	target_count: usize,
	policy: &BalancePolicy,
) -> Vec<ScoredResult> {
	balance_with_outcome(candidates, target_count, policy).results
}

/// Picks up to `target_count` candidates so that several sources are represented.
///
/// Sources take turns in order of their best candidate. Round `r` takes each source's `r`-th best
/// candidate while the source is under the cap, and the remaining slots are then filled with the
/// best leftovers from sources still under the cap. The selection comes back sorted by score.
pub fn balance_with_outcome(
	mut candidates: Vec<ScoredResult>,
	target_count: usize,
	policy: &BalancePolicy,
) -> BalanceOutcome {
	if candidates.is_empty() || target_count == 0 {
		return BalanceOutcome {
			results: Vec::new(),
			mode: BalanceMode::Empty,
			round_robin_picks: 0,
			fill_picks: 0,
		};
	}

	order::sort_results(&mut candidates);

	let groups = group_by_source(&candidates);

	if groups.len() < policy.min_sources {
		tracing::warn!(
			sources = groups.len(),
			required = policy.min_sources,
			"Too few distinct sources to balance. Returning the top results by score."
		);

		candidates.truncate(target_count);

		let picks = candidates.len();

		return BalanceOutcome {
			results: candidates,
			mode: BalanceMode::Degraded,
			round_robin_picks: 0,
			fill_picks: picks,
		};
	}

	let cap = policy.cap();
	let rounds = target_count.div_ceil(groups.len());
	let mut chosen = vec![false; candidates.len()];
	let (round_robin_picks, fill_picks) = {
		let mut selected_ids: HashSet<&str> = HashSet::new();
		let mut per_source: HashMap<&str, usize> = HashMap::new();
		let mut picked = 0_usize;

		'rounds: for round in 0..rounds {
			for (source, members) in &groups {
				if picked >= target_count {
					break 'rounds;
				}

				let Some(&idx) = members.get(round) else { continue };
				let taken = per_source.entry(*source).or_default();

				if *taken >= cap || !selected_ids.insert(candidates[idx].id.as_str()) {
					continue;
				}

				*taken += 1;
				chosen[idx] = true;
				picked += 1;
			}
		}

		let round_robin_picks = picked;

		for (idx, candidate) in candidates.iter().enumerate() {
			if picked >= target_count {
				break;
			}
			if chosen[idx] {
				continue;
			}

			let taken = per_source.entry(candidate.source()).or_default();

			if *taken >= cap || !selected_ids.insert(candidate.id.as_str()) {
				continue;
			}

			*taken += 1;
			chosen[idx] = true;
			picked += 1;
		}

		(round_robin_picks, picked - round_robin_picks)
	};

	tracing::debug!(
		sources = groups.len(),
		round_robin_picks,
		fill_picks,
		"Balanced candidates across sources."
	);

	let results = candidates
		.into_iter()
		.zip(chosen)
		.filter_map(|(candidate, keep)| keep.then_some(candidate))
		.collect();

	BalanceOutcome { results, mode: BalanceMode::RoundRobin, round_robin_picks, fill_picks }
}

/// Drops entries, in their current order, once their source has `max_per_source` entries. A cap
/// of zero keeps nothing.
pub fn enforce_source_limits(
	results: Vec<ScoredResult>,
	max_per_source: usize,
) -> Vec<ScoredResult> {
	let mut per_source: HashMap<String, usize> = HashMap::new();

	results
		.into_iter()
		.filter(|result| {
			let taken = per_source.entry(result.source().to_string()).or_default();

			if *taken >= max_per_source {
				return false;
			}

			*taken += 1;

			true
		})
		.collect()
}

/// Candidate indices per source, sources ordered by first appearance.
fn group_by_source(candidates: &[ScoredResult]) -> Vec<(&str, Vec<usize>)> {
	let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
	let mut positions: HashMap<&str, usize> = HashMap::new();

	for (idx, candidate) in candidates.iter().enumerate() {
		let source = candidate.source();
		let position = *positions.entry(source).or_insert_with(|| {
			groups.push((source, Vec::new()));

			groups.len() - 1
		});

		groups[position].1.push(idx);
	}

	groups
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::document::{Document, DocumentInput, Metadata};

	fn result(id: &str, source: &str, score: f32) -> ScoredResult {
		let doc = Document::new(DocumentInput {
			id: id.to_string(),
			content: format!("Body of {id}."),
			metadata: Metadata::new(source),
		});

		ScoredResult::new(&doc, score)
	}

	fn ids(results: &[ScoredResult]) -> Vec<&str> {
		results.iter().map(|item| item.id.as_str()).collect()
	}

	#[test]
	fn empty_inputs_yield_nothing() {
		let outcome = balance_with_outcome(Vec::new(), 5, &BalancePolicy::default());

		assert_eq!(outcome.mode, BalanceMode::Empty);
		assert!(balance(vec![result("a1", "a", 0.9)], 0, &BalancePolicy::default()).is_empty());
	}

	#[test]
	fn single_source_degrades_to_top_n() {
		let candidates = vec![
			result("a1", "a", 0.9),
			result("a2", "a", 0.8),
			result("a3", "a", 0.7),
			result("a4", "a", 0.6),
		];
		let policy = BalancePolicy { min_sources: 2, max_per_source: 2 };
		let outcome = balance_with_outcome(candidates, 3, &policy);

		assert_eq!(outcome.mode, BalanceMode::Degraded);
		assert_eq!(ids(&outcome.results), vec!["a1", "a2", "a3"]);
	}

	#[test]
	fn round_robin_interleaves_sources() {
		let candidates = vec![
			result("a1", "a", 0.95),
			result("a2", "a", 0.9),
			result("a3", "a", 0.85),
			result("b1", "b", 0.5),
			result("b2", "b", 0.4),
			result("c1", "c", 0.3),
		];
		let policy = BalancePolicy { min_sources: 2, max_per_source: 3 };
		let outcome = balance_with_outcome(candidates, 3, &policy);

		assert_eq!(outcome.mode, BalanceMode::RoundRobin);
		assert_eq!(outcome.round_robin_picks, 3);
		assert_eq!(ids(&outcome.results), vec!["a1", "b1", "c1"]);
	}

	#[test]
	fn short_sources_are_skipped_then_filled_by_score() {
		let candidates = vec![
			result("a1", "a", 0.9),
			result("a2", "a", 0.8),
			result("a3", "a", 0.7),
			result("b1", "b", 0.6),
		];
		let policy = BalancePolicy { min_sources: 2, max_per_source: 3 };
		let outcome = balance_with_outcome(candidates, 4, &policy);

		assert_eq!(outcome.round_robin_picks, 3);
		assert_eq!(outcome.fill_picks, 1);
		assert_eq!(ids(&outcome.results), vec!["a1", "a2", "a3", "b1"]);
	}

	#[test]
	fn cap_holds_during_fill() {
		let candidates = vec![
			result("a1", "a", 0.9),
			result("a2", "a", 0.8),
			result("a3", "a", 0.7),
			result("a4", "a", 0.6),
			result("b1", "b", 0.5),
		];
		let policy = BalancePolicy { min_sources: 2, max_per_source: 2 };
		let results = balance(candidates, 5, &policy);

		assert_eq!(ids(&results), vec!["a1", "a2", "b1"]);
	}

	#[test]
	fn duplicate_ids_are_selected_once() {
		let candidates =
			vec![result("x", "a", 0.9), result("x", "b", 0.8), result("y", "b", 0.7)];
		let results = balance(candidates, 3, &BalancePolicy::default());

		assert_eq!(ids(&results), vec!["x", "y"]);
	}

	#[test]
	fn zero_cap_balances_one_per_source() {
		let candidates =
			vec![result("a1", "a", 0.9), result("a2", "a", 0.8), result("b1", "b", 0.7)];
		let policy = BalancePolicy { min_sources: 2, max_per_source: 0 };

		assert_eq!(ids(&balance(candidates, 3, &policy)), vec!["a1", "b1"]);
	}

	#[test]
	fn zero_limit_keeps_nothing() {
		let candidates = vec![result("a1", "a", 0.9), result("b1", "b", 0.7)];

		assert!(enforce_source_limits(candidates, 0).is_empty());
	}

	#[test]
	fn enforce_limits_keeps_order_and_is_idempotent() {
		let results = vec![
			result("a1", "a", 0.9),
			result("b1", "b", 0.85),
			result("a2", "a", 0.8),
			result("a3", "a", 0.7),
		];
		let once = enforce_source_limits(results, 2);

		assert_eq!(ids(&once), vec!["a1", "b1", "a2"]);
		assert_eq!(enforce_source_limits(once.clone(), 2), once);
	}
}
