pub mod audit;
pub mod document;
pub mod knowledge_base;
pub mod search;
pub mod store;

mod error;

use std::sync::Arc;

use serde::Serialize;

pub use audit::{BalancedBlock, BiasAnalysis, BiasReport, INSUFFICIENT_DIVERSITY, UnbalancedBlock};
pub use document::{Document, DocumentInput, Metadata, ScoredResult, UNKNOWN_SOURCE};
pub use error::{Error, Result};
pub use knowledge_base::load_knowledge_base;
pub use search::ranking::{BalancePolicy, LexicalScorer, SourceDistribution, SourceStats};
pub use store::{CorpusStorage, DocumentStore, JsonFileStorage, MemoryStorage};
use tessera_config::Config;

pub const EMBEDDING_METHOD: &str = "simple_text_matching";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CollectionStats {
	pub document_count: usize,
	pub collection_name: String,
	pub embedding_method: String,
	pub source_count: usize,
}

/// Lexical retrieval over a [`DocumentStore`] with source balancing and bias analysis.
pub struct RetrievalEngine {
	cfg: Config,
	store: DocumentStore,
	scorer: LexicalScorer,
	policy: BalancePolicy,
}
impl RetrievalEngine {
	pub fn new(cfg: Config, store: DocumentStore) -> Self {
		let scorer = LexicalScorer::new(&cfg.scoring);
		let policy = BalancePolicy::from(&cfg.balancing);

		tracing::info!(
			collection = store.collection_name(),
			balancing = cfg.balancing.enabled,
			"Retrieval engine initialized."
		);

		Self { cfg, store, scorer, policy }
	}

	/// Opens the store configured in `storage.corpus_path`, or an in-memory one.
	pub fn open(cfg: Config) -> Result<Self> {
		let storage: Arc<dyn CorpusStorage> = match cfg.storage.corpus_path.as_ref() {
			Some(path) => Arc::new(JsonFileStorage::new(path)),
			None => Arc::new(MemoryStorage),
		};
		let store = DocumentStore::open(cfg.storage.collection_name.clone(), storage)?;

		Ok(Self::new(cfg, store))
	}

	pub fn cfg(&self) -> &Config {
		&self.cfg
	}

	pub fn default_top_k(&self) -> usize {
		self.cfg.search.top_k as usize
	}

	pub fn add_documents(&self, documents: Vec<DocumentInput>) -> Result<usize> {
		self.store.add(documents)
	}

	pub fn clear(&self) -> Result<()> {
		self.store.clear()
	}

	/// Counts fall back to zero when the store cannot be read.
	pub fn get_collection_stats(&self) -> CollectionStats {
		let counts = self.store.len().and_then(|len| Ok((len, self.store.source_count()?)));
		let (document_count, source_count) = counts.unwrap_or_else(|err| {
			tracing::error!(error = %err, "Failed to read collection stats.");

			(0, 0)
		});

		CollectionStats {
			document_count,
			collection_name: self.store.collection_name().to_string(),
			embedding_method: EMBEDDING_METHOD.to_string(),
			source_count,
		}
	}
}
