#[derive(Clone, Debug)]
pub struct ChunkingConfig {
	pub chunk_size: usize,
	pub overlap: usize,
}
impl From<&tessera_config::Chunking> for ChunkingConfig {
	fn from(cfg: &tessera_config::Chunking) -> Self {
		Self { chunk_size: cfg.chunk_size as usize, overlap: cfg.overlap as usize }
	}
}

/// A window of the source text. Offsets count characters, not bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
	pub chunk_index: u32,
	pub start_offset: usize,
	pub end_offset: usize,
	pub text: String,
}

/// Splits `text` into overlapping windows of at most `chunk_size` characters.
///
/// A window that does not reach the end of the text is shortened to end right after the last
/// `.` in its second half. Without one, the last `!` is tried, and only when the window holds no
/// `!` at all, the last `?`. Each following window starts `overlap` characters before the end of
/// the previous one. Windows are trimmed and blank ones are dropped.
pub fn split_text(text: &str, cfg: &ChunkingConfig) -> Vec<Chunk> {
	if text.trim().is_empty() {
		return Vec::new();
	}

	let chars: Vec<char> = text.chars().collect();
	let total = chars.len();
	let chunk_size = cfg.chunk_size.max(1);

	if total <= chunk_size {
		return vec![Chunk {
			chunk_index: 0,
			start_offset: 0,
			end_offset: total,
			text: text.trim().to_string(),
		}];
	}

	let overlap = if cfg.overlap >= chunk_size {
		tracing::warn!(
			overlap = cfg.overlap,
			chunk_size,
			"Chunk overlap is not smaller than chunk size. Ignoring overlap."
		);

		0
	} else {
		cfg.overlap
	};
	let mut chunks = Vec::new();
	let mut start = 0_usize;

	while start < total {
		let mut end = (start + chunk_size).min(total);

		if start + chunk_size < total {
			end = sentence_boundary(&chars, start, end, chunk_size).unwrap_or(end);
		}

		let window: String = chars[start..end].iter().collect();
		let trimmed = window.trim();

		if !trimmed.is_empty() {
			chunks.push(Chunk {
				chunk_index: chunks.len() as u32,
				start_offset: start,
				end_offset: end,
				text: trimmed.to_string(),
			});
		}

		if end >= total {
			break;
		}

		start = end.saturating_sub(overlap).max(start + 1);
	}

	chunks
}

fn sentence_boundary(chars: &[char], start: usize, end: usize, chunk_size: usize) -> Option<usize> {
	let midpoint = start + chunk_size / 2;

	if let Some(pos) = rfind(chars, '.', start, end)
		&& pos > midpoint
	{
		return Some(pos + 1);
	}

	let punct = rfind(chars, '!', start, end).or_else(|| rfind(chars, '?', start, end))?;

	(punct > midpoint).then_some(punct + 1)
}

fn rfind(chars: &[char], needle: char, start: usize, end: usize) -> Option<usize> {
	chars[start..end].iter().rposition(|ch| *ch == needle).map(|pos| start + pos)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn cfg(chunk_size: usize, overlap: usize) -> ChunkingConfig {
		ChunkingConfig { chunk_size, overlap }
	}

	#[test]
	fn short_text_is_a_single_chunk() {
		let chunks = split_text("  One short note.  ", &cfg(100, 20));

		assert_eq!(chunks.len(), 1);
		assert_eq!(chunks[0].text, "One short note.");
		assert_eq!(chunks[0].chunk_index, 0);
	}

	#[test]
	fn blank_text_has_no_chunks() {
		assert!(split_text("", &cfg(10, 2)).is_empty());
		assert!(split_text(" \n ", &cfg(10, 2)).is_empty());
	}

	#[test]
	fn breaks_after_sentence_end_in_second_half() {
		// The period at index 16 lies past the midpoint (10) of the first 20-character window.
		let text = "Alpha beta gamma. Delta epsilon zeta eta theta iota.";
		let chunks = split_text(text, &cfg(20, 0));

		assert_eq!(chunks[0].text, "Alpha beta gamma.");
		assert_eq!(chunks[0].end_offset, 17);
		assert_eq!(chunks[1].start_offset, 17);
	}

	#[test]
	fn ignores_sentence_end_in_first_half() {
		let text = "Hi. abcdefghijklmnopqrstuvwxyz abcdefghij";
		let chunks = split_text(text, &cfg(20, 0));

		assert_eq!(chunks[0].end_offset, 20);
	}

	#[test]
	fn falls_back_to_exclamation_mark() {
		let text = "abcdefghijklmn wow! rest of the text goes on";
		let chunks = split_text(text, &cfg(20, 0));

		assert_eq!(chunks[0].text, "abcdefghijklmn wow!");
	}

	#[test]
	fn windows_overlap() {
		let text = "a".repeat(25);
		let chunks = split_text(&text, &cfg(10, 4));
		let starts: Vec<usize> = chunks.iter().map(|chunk| chunk.start_offset).collect();

		assert_eq!(starts, vec![0, 6, 12, 18]);
		assert_eq!(chunks.last().map(|chunk| chunk.end_offset), Some(25));
	}

	#[test]
	fn chunk_indices_are_sequential() {
		let text = "word ".repeat(100);
		let chunks = split_text(&text, &cfg(50, 10));

		for (idx, chunk) in chunks.iter().enumerate() {
			assert_eq!(chunk.chunk_index as usize, idx);
			assert!(chunk.text.chars().count() <= 50);
		}
	}

	#[test]
	fn handles_multibyte_characters() {
		let text = "é".repeat(30);
		let chunks = split_text(&text, &cfg(10, 0));

		assert_eq!(chunks.len(), 3);
		assert!(chunks.iter().all(|chunk| chunk.text.chars().count() == 10));
	}
}
