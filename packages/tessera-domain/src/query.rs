/// A query prepared once for scoring against many documents.
#[derive(Clone, Debug)]
pub struct PreparedQuery {
	pub lowered: String,
	pub words: Vec<String>,
	pub keywords: std::collections::BTreeSet<String>,
}
impl PreparedQuery {
	pub fn new(query: &str) -> Self {
		let lowered = query.to_lowercase();
		let words = lowered.split_whitespace().map(str::to_string).collect();
		let keywords = crate::keywords::extract_keywords(&lowered);

		Self { lowered, words, keywords }
	}

	pub fn is_blank(&self) -> bool {
		self.words.is_empty()
	}

	/// Whether the query names `marker` anywhere, including inside a longer word.
	pub fn mentions(&self, marker: &str) -> bool {
		!marker.is_empty() && self.lowered.contains(marker)
	}
}

pub fn platform_query(query: &str, platform: &str) -> String {
	let platform = platform.trim();

	if platform.is_empty() {
		return query.to_string();
	}

	format!("{query} {platform}")
}
