use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use tessera_config::{Config, Error};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_toml_with(section: &str, key: &str, value: Value) -> String {
	let mut root: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let table = root
		.as_table_mut()
		.expect("Template config must be a table.")
		.get_mut(section)
		.and_then(Value::as_table_mut)
		.expect("Template config must include the requested section.");

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render template config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("tessera_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_payload(payload: String) -> tessera_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = tessera_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn expect_validation_key(payload: String, expected_key: &str) {
	let err = load_payload(payload).expect_err("Expected a validation error.");

	assert_eq!(err.key(), Some(expected_key), "Unexpected error: {err}");
}

#[test]
fn loads_sample_config() {
	let cfg = load_payload(SAMPLE_CONFIG_TEMPLATE_TOML.to_string())
		.expect("Sample config must be valid.");

	assert_eq!(cfg.storage.collection_name, "simple_text_store");
	assert_eq!(cfg.balancing.max_per_source, 3);
	assert_eq!(cfg.search.top_k, 5);
	assert_eq!(cfg.chunking.chunk_size, 1_000);
	assert!(cfg.knowledge_base.is_some());
}

#[test]
fn missing_optional_sections_use_defaults() {
	let payload = r#"
[service]
log_level = "debug"

[storage]
collection_name = "kb"
"#;
	let cfg = tessera_config::from_toml_str(payload).expect("Minimal config must be valid.");

	assert!(cfg.storage.corpus_path.is_none());
	assert!(cfg.knowledge_base.is_none());
	assert!(cfg.balancing.enabled);
	assert_eq!(cfg.balancing.min_sources, 2);
	assert_eq!(cfg.balancing.candidate_multiplier, 2);
	assert_eq!(cfg.scoring.platform_marker, "linkedin");
	assert!((cfg.scoring.min_similarity - 0.1).abs() < f32::EPSILON);
	assert_eq!(cfg.chunking.overlap, 200);
}

#[test]
fn partial_section_keeps_remaining_defaults() {
	let payload = r#"
[service]
log_level = "info"

[storage]
collection_name = "kb"

[balancing]
max_per_source = 2
"#;
	let cfg = tessera_config::from_toml_str(payload).expect("Config must be valid.");

	assert_eq!(cfg.balancing.max_per_source, 2);
	assert_eq!(cfg.balancing.min_sources, 2);
	assert!(cfg.balancing.enabled);
}

#[test]
fn platform_marker_is_normalized() {
	let payload =
		sample_toml_with("scoring", "platform_marker", Value::String("  LinkedIn ".to_string()));
	let cfg = load_payload(payload).expect("Config must be valid.");

	assert_eq!(cfg.scoring.platform_marker, "linkedin");
}

#[test]
fn blank_corpus_path_means_in_memory() {
	let payload = sample_toml_with("storage", "corpus_path", Value::String(String::new()));
	let cfg = load_payload(payload).expect("Config must be valid.");

	assert!(cfg.storage.corpus_path.is_none());
}

#[test]
fn min_sources_must_be_positive() {
	expect_validation_key(
		sample_toml_with("balancing", "min_sources", Value::Integer(0)),
		"balancing.min_sources",
	);
}

#[test]
fn max_per_source_must_be_positive() {
	expect_validation_key(
		sample_toml_with("balancing", "max_per_source", Value::Integer(0)),
		"balancing.max_per_source",
	);
}

#[test]
fn candidate_multiplier_must_be_positive() {
	expect_validation_key(
		sample_toml_with("balancing", "candidate_multiplier", Value::Integer(0)),
		"balancing.candidate_multiplier",
	);
}

#[test]
fn top_k_must_be_positive() {
	expect_validation_key(sample_toml_with("search", "top_k", Value::Integer(0)), "search.top_k");
}

#[test]
fn overlap_must_be_less_than_chunk_size() {
	expect_validation_key(
		sample_toml_with("chunking", "overlap", Value::Integer(1_000)),
		"chunking.overlap",
	);
}

#[test]
fn weights_must_be_non_negative() {
	expect_validation_key(
		sample_toml_with("scoring", "word_weight", Value::Float(-0.3)),
		"scoring.word_weight",
	);
}

#[test]
fn min_similarity_must_be_below_one() {
	expect_validation_key(
		sample_toml_with("scoring", "min_similarity", Value::Float(1.0)),
		"scoring.min_similarity",
	);
}

#[test]
fn platform_marker_must_be_a_single_word() {
	expect_validation_key(
		sample_toml_with("scoring", "platform_marker", Value::String("linked in".to_string())),
		"scoring.platform_marker",
	);
}

#[test]
fn collection_name_must_be_non_empty() {
	let payload = sample_toml_with("storage", "collection_name", Value::String("  ".to_string()));
	let err = load_payload(payload).expect_err("Expected validation error.");
	let message = err.to_string();

	assert!(
		message.contains("storage.collection_name") && message.contains("must be non-empty."),
		"Unexpected error message: {message}"
	);
}

#[test]
fn missing_file_reports_read_error() {
	let mut path = env::temp_dir();

	path.push("tessera_config_test_definitely_missing.toml");

	let err = tessera_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, Error::Read { .. }), "Unexpected error: {err}");
}

#[test]
fn malformed_toml_reports_parse_error() {
	let err =
		load_payload("[service\nlog_level = ".to_string()).expect_err("Expected parse error.");

	assert!(matches!(err, Error::Parse { .. }), "Unexpected error: {err}");
	assert!(err.key().is_none());
}
