use std::{
	collections::{BTreeSet, HashSet},
	fs,
	path::PathBuf,
	sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::{
	Error, Result,
	document::{Document, DocumentInput},
};

/// Persistence port for the corpus. Every write hands over the full document list.
pub trait CorpusStorage
where
	Self: Send + Sync,
{
	fn load(&self) -> Result<Vec<Document>>;

	fn save(&self, documents: &[Document]) -> Result<()>;
}

/// Keeps nothing outside the process.
#[derive(Debug, Default)]
pub struct MemoryStorage;
impl CorpusStorage for MemoryStorage {
	fn load(&self) -> Result<Vec<Document>> {
		Ok(Vec::new())
	}

	fn save(&self, _documents: &[Document]) -> Result<()> {
		Ok(())
	}
}

/// Stores the corpus as a pretty-printed JSON array.
#[derive(Debug)]
pub struct JsonFileStorage {
	path: PathBuf,
}
impl JsonFileStorage {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}
impl CorpusStorage for JsonFileStorage {
	fn load(&self) -> Result<Vec<Document>> {
		if !self.path.exists() {
			return Ok(Vec::new());
		}

		let raw = fs::read_to_string(&self.path)
			.map_err(|source| Error::Io { path: self.path.clone(), source })?;
		let documents: Vec<Document> = serde_json::from_str(&raw)?;

		tracing::info!(
			path = %self.path.display(),
			count = documents.len(),
			"Loaded documents from storage."
		);

		Ok(documents)
	}

	fn save(&self, documents: &[Document]) -> Result<()> {
		if let Some(parent) = self.path.parent()
			&& !parent.as_os_str().is_empty()
		{
			fs::create_dir_all(parent)
				.map_err(|source| Error::Io { path: parent.to_path_buf(), source })?;
		}

		let payload = serde_json::to_string_pretty(documents)?;
		let tmp_path = self.path.with_extension("json.tmp");

		fs::write(&tmp_path, payload)
			.map_err(|source| Error::Io { path: tmp_path.clone(), source })?;
		fs::rename(&tmp_path, &self.path)
			.map_err(|source| Error::Io { path: self.path.clone(), source })?;

		tracing::info!(
			path = %self.path.display(),
			count = documents.len(),
			"Saved documents to storage."
		);

		Ok(())
	}
}

/// The corpus, guarded by a reader/writer lock and mirrored to a [`CorpusStorage`] on every
/// write.
pub struct DocumentStore {
	collection_name: String,
	documents: RwLock<Vec<Document>>,
	storage: Arc<dyn CorpusStorage>,
}
impl DocumentStore {
	pub fn in_memory(collection_name: impl Into<String>) -> Self {
		Self {
			collection_name: collection_name.into(),
			documents: RwLock::new(Vec::new()),
			storage: Arc::new(MemoryStorage),
		}
	}

	/// Opens a store over `storage`, recomputing the derived fields of every stored document.
	pub fn open(
		collection_name: impl Into<String>,
		storage: Arc<dyn CorpusStorage>,
	) -> Result<Self> {
		let documents = storage
			.load()?
			.into_iter()
			.map(|doc| Document::new(DocumentInput::from(doc)))
			.collect::<Vec<_>>();

		ensure_unique_ids(&[], &documents)?;

		Ok(Self {
			collection_name: collection_name.into(),
			documents: RwLock::new(documents),
			storage,
		})
	}

	pub fn collection_name(&self) -> &str {
		&self.collection_name
	}

	/// Appends `inputs` and persists the corpus. Nothing is added when any id is blank or
	/// already present, or when persisting fails.
	pub fn add(&self, inputs: Vec<DocumentInput>) -> Result<usize> {
		let incoming = inputs.into_iter().map(Document::new).collect::<Vec<_>>();
		let added = incoming.len();
		let mut documents = self.write()?;

		ensure_unique_ids(&documents, &incoming)?;

		let previous_len = documents.len();

		documents.extend(incoming);

		if let Err(err) = self.storage.save(&documents) {
			documents.truncate(previous_len);

			return Err(err);
		}

		tracing::info!(added, total = documents.len(), "Added documents to the store.");

		Ok(added)
	}

	/// Swaps the whole corpus for `inputs` with a single save. The previous corpus is kept when
	/// any id is invalid or persisting fails.
	pub fn replace(&self, inputs: Vec<DocumentInput>) -> Result<usize> {
		let incoming = inputs.into_iter().map(Document::new).collect::<Vec<_>>();

		ensure_unique_ids(&[], &incoming)?;

		let mut documents = self.write()?;
		let previous = std::mem::replace(&mut *documents, incoming);

		if let Err(err) = self.storage.save(&documents) {
			*documents = previous;

			return Err(err);
		}

		tracing::info!(
			removed = previous.len(),
			total = documents.len(),
			"Replaced the document store."
		);

		Ok(documents.len())
	}

	/// Removes every document. The previous corpus is kept when persisting fails.
	pub fn clear(&self) -> Result<()> {
		let mut documents = self.write()?;
		let previous = std::mem::take(&mut *documents);

		if let Err(err) = self.storage.save(&documents) {
			*documents = previous;

			return Err(err);
		}

		tracing::info!(removed = previous.len(), "Cleared the document store.");

		Ok(())
	}

	pub fn len(&self) -> Result<usize> {
		Ok(self.read()?.len())
	}

	pub fn is_empty(&self) -> Result<bool> {
		Ok(self.read()?.is_empty())
	}

	pub fn source_count(&self) -> Result<usize> {
		let documents = self.read()?;
		let sources = documents.iter().map(Document::source).collect::<BTreeSet<_>>();

		Ok(sources.len())
	}

	/// Runs `f` over a snapshot of the corpus while holding the read lock.
	pub fn with_documents<R>(&self, f: impl FnOnce(&[Document]) -> R) -> Result<R> {
		let documents = self.read()?;

		Ok(f(&documents))
	}

	fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Document>>> {
		self.documents.read().map_err(|_| Error::LockPoisoned)
	}

	fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Document>>> {
		self.documents.write().map_err(|_| Error::LockPoisoned)
	}
}

fn ensure_unique_ids(existing: &[Document], incoming: &[Document]) -> Result<()> {
	let mut seen = existing.iter().map(|doc| doc.id.as_str()).collect::<HashSet<_>>();

	for doc in incoming {
		if doc.id.trim().is_empty() {
			return Err(Error::InvalidRequest {
				message: "Document id must not be empty.".to_string(),
			});
		}
		if !seen.insert(doc.id.as_str()) {
			return Err(Error::InvalidRequest {
				message: format!("Document id {} is already present.", doc.id),
			});
		}
	}

	Ok(())
}
