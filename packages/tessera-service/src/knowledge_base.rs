use std::{
	fs,
	path::{Path, PathBuf},
};

use tessera_chunking::{ChunkingConfig, split_text};

use crate::{
	Error, Result, RetrievalEngine,
	document::{DocumentInput, Metadata},
};

pub const GENERAL_PLATFORM: &str = "general";

/// Chunks every `*.txt` file in `dir`, in file name order, into documents `doc_1..doc_N`.
///
/// A file whose lowercase stem contains `platform_marker` is tagged with that platform, every
/// other file with [`GENERAL_PLATFORM`]. Unreadable files are skipped.
pub fn load_knowledge_base(
	dir: &Path,
	chunking: &ChunkingConfig,
	platform_marker: &str,
) -> Result<Vec<DocumentInput>> {
	let mut documents = Vec::new();

	for path in text_files(dir)? {
		let content = match fs::read_to_string(&path) {
			Ok(content) => content,
			Err(err) => {
				tracing::warn!(
					path = %path.display(),
					error = %err,
					"Skipping unreadable knowledge base file."
				);

				continue;
			},
		};
		let file_name =
			path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default();
		let platform = platform_for(&path, platform_marker);
		let chunks = split_text(&content, chunking);
		let total_chunks = chunks.len() as u32;

		tracing::info!(file = %file_name, chunks = total_chunks, "Processed knowledge base file.");

		for chunk in chunks {
			let mut metadata = Metadata::new(file_name.clone()).with_platform(platform.clone());

			metadata.source_type = Some(platform.clone());
			metadata.chunk_index = Some(chunk.chunk_index);
			metadata.total_chunks = Some(total_chunks);

			documents.push(DocumentInput {
				id: format!("doc_{}", documents.len() + 1),
				content: chunk.text,
				metadata,
			});
		}
	}

	Ok(documents)
}

impl RetrievalEngine {
	/// Replaces the corpus with the chunks of the knowledge base in `dir` in one write. The corpus
	/// is left untouched when the directory yields no chunks or the write fails.
	pub fn reload_knowledge_base(&self, dir: &Path) -> Result<usize> {
		let chunking = ChunkingConfig::from(&self.cfg.chunking);
		let documents = load_knowledge_base(dir, &chunking, &self.cfg.scoring.platform_marker)?;

		if documents.is_empty() {
			tracing::warn!(dir = %dir.display(), "No knowledge base documents found.");

			return Ok(0);
		}

		let added = self.store.replace(documents)?;

		tracing::info!(dir = %dir.display(), documents = added, "Loaded knowledge base.");

		Ok(added)
	}
}

fn text_files(dir: &Path) -> Result<Vec<PathBuf>> {
	let entries =
		fs::read_dir(dir).map_err(|source| Error::Io { path: dir.to_path_buf(), source })?;
	let mut files = entries
		.filter_map(|entry| entry.ok().map(|entry| entry.path()))
		.filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "txt"))
		.collect::<Vec<_>>();

	files.sort();

	Ok(files)
}

fn platform_for(path: &Path, platform_marker: &str) -> String {
	let stem =
		path.file_stem().map(|stem| stem.to_string_lossy().to_lowercase()).unwrap_or_default();

	if !platform_marker.is_empty() && stem.contains(platform_marker) {
		platform_marker.to_string()
	} else {
		GENERAL_PLATFORM.to_string()
	}
}
