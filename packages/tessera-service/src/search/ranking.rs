mod balance;
mod distribution;
mod order;
mod scorer;
mod weights;

pub use balance::{
	BalanceMode, BalanceOutcome, BalancePolicy, balance, balance_with_outcome,
	enforce_source_limits,
};
pub use distribution::{BALANCED_DIVERSITY, SourceDistribution, SourceStats, analyze, round3};
pub use order::{cmp_f32_desc, cmp_results, sort_results};
pub use scorer::LexicalScorer;
pub use weights::{MAX_SOURCE_WEIGHT, compute_source_weights, reweight};
