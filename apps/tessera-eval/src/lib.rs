pub mod cli;

use std::{
	fs,
	path::{Path, PathBuf},
	time::Instant,
};

use clap::{Parser, Subcommand};
use color_eyre::eyre;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use tessera_service::{
	BiasAnalysis, DocumentInput, RetrievalEngine, ScoredResult, SourceDistribution,
	search::ranking,
};

const DEFAULT_AUDIT_RESULTS: usize = 10;

#[derive(Debug, Parser)]
#[command(version = cli::VERSION, rename_all = "kebab", styles = cli::styles())]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Replace the corpus with the chunks of a knowledge base directory.
	Ingest {
		#[arg(long, value_name = "DIR")]
		kb_dir: Option<PathBuf>,
	},
	/// Add documents from a JSON array of `{id, content, metadata}` objects.
	Add {
		#[arg(long, short = 'f', value_name = "FILE")]
		file: PathBuf,
	},
	/// Search the corpus. Balancing follows `balancing.enabled` unless a flag overrides it.
	Search {
		#[arg(long, short = 'q')]
		query: String,
		#[arg(long, value_name = "N", conflicts_with = "platform")]
		top_k: Option<u32>,
		#[arg(long)]
		no_balance: bool,
		#[arg(long, value_name = "NAME", conflicts_with_all = ["no_balance", "reweight"])]
		platform: Option<String>,
		#[arg(long, conflicts_with = "no_balance")]
		reweight: bool,
	},
	/// Compare plain and balanced retrieval for one query.
	Audit {
		#[arg(long, short = 'q')]
		query: String,
		#[arg(
			short = 'n',
			long = "n-results",
			value_name = "N",
			default_value_t = DEFAULT_AUDIT_RESULTS
		)]
		n_results: usize,
	},
	/// Run the bias audit over every query of a dataset file.
	AuditDataset {
		#[arg(long, short = 'd', value_name = "FILE")]
		dataset: PathBuf,
	},
	/// Print document and source counts.
	Stats,
	/// Remove every document from the corpus.
	Clear,
}

#[derive(Debug, Deserialize)]
struct AuditDataset {
	name: Option<String>,
	n_results: Option<usize>,
	queries: Vec<AuditQuery>,
}

#[derive(Debug, Deserialize)]
struct AuditQuery {
	id: Option<String>,
	query: String,
	n_results: Option<usize>,
}

#[derive(Debug, Serialize)]
struct SearchOutput {
	query: String,
	mode: &'static str,
	results: Vec<ScoredResult>,
	source_distribution: SourceDistribution,
}

#[derive(Debug, Serialize)]
struct CountOutput {
	documents: usize,
}

#[derive(Debug, Serialize)]
struct AuditDatasetOutput {
	dataset: DatasetInfo,
	summary: AuditSummary,
	queries: Vec<QueryAudit>,
}

#[derive(Debug, Serialize)]
struct DatasetInfo {
	name: String,
	query_count: usize,
}

#[derive(Debug, Serialize, PartialEq)]
struct AuditSummary {
	query_count: usize,
	failed_count: usize,
	bias_detected_count: usize,
	balancing_effective_count: usize,
	mean_unbalanced_diversity: f64,
	mean_balanced_diversity: f64,
	mean_diversity_improvement: f64,
	latency_ms_p50: f64,
	latency_ms_p95: f64,
}

#[derive(Debug, Serialize)]
struct QueryAudit {
	id: String,
	query: String,
	n_results: usize,
	latency_ms: f64,
	#[serde(skip_serializing_if = "Option::is_none")]
	bias_detected: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	balancing_effective: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	unbalanced_diversity: Option<f32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	balanced_diversity: Option<f32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	diversity_improvement: Option<f32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	error: Option<String>,
}
impl QueryAudit {
	fn new(
		id: String,
		query: String,
		n_results: usize,
		latency_ms: f64,
		analysis: BiasAnalysis,
	) -> Self {
		let mut audit = Self {
			id,
			query,
			n_results,
			latency_ms,
			bias_detected: None,
			balancing_effective: None,
			unbalanced_diversity: None,
			balanced_diversity: None,
			diversity_improvement: None,
			error: None,
		};

		match analysis {
			BiasAnalysis::Report(report) => {
				audit.bias_detected = Some(report.bias_detected);
				audit.balancing_effective = Some(report.balancing_effective);
				audit.unbalanced_diversity =
					Some(report.unbalanced.source_distribution.diversity_score);
				audit.balanced_diversity =
					Some(report.balanced.source_distribution.diversity_score);
				audit.diversity_improvement = Some(report.balanced.diversity_improvement);
			},
			BiasAnalysis::Failed { error } => audit.error = Some(error),
		}

		audit
	}
}

pub fn run(args: Args) -> color_eyre::Result<()> {
	let cfg = tessera_config::load(&args.config)?;

	init_tracing(&cfg.service.log_level);

	let engine = RetrievalEngine::open(cfg)?;

	match args.command {
		Command::Ingest { kb_dir } => {
			let dir = kb_dir
				.or_else(|| engine.cfg().knowledge_base.as_ref().map(|kb| kb.path.clone()))
				.ok_or_else(|| {
					eyre::eyre!("No knowledge base directory configured. Pass --kb-dir.")
				})?;
			let documents = engine.reload_knowledge_base(&dir)?;

			print_json(&CountOutput { documents })
		},
		Command::Add { file } => {
			let documents = load_documents(&file)?;
			let documents = engine.add_documents(documents)?;

			print_json(&CountOutput { documents })
		},
		Command::Search { query, top_k, no_balance, platform, reweight } => {
			let flags = SearchFlags { top_k, no_balance, platform, reweight };
			let (mode, results) = search(&engine, &query, flags);
			let source_distribution = ranking::analyze(&results);

			print_json(&SearchOutput { query, mode, results, source_distribution })
		},
		Command::Audit { query, n_results } =>
			print_json(&engine.analyze_search_bias(&query, n_results)),
		Command::AuditDataset { dataset } => {
			let dataset = load_dataset(&dataset)?;

			print_json(&audit_dataset(&engine, dataset))
		},
		Command::Stats => print_json(&engine.get_collection_stats()),
		Command::Clear => {
			engine.clear()?;

			print_json(&CountOutput { documents: 0 })
		},
	}
}

struct SearchFlags {
	top_k: Option<u32>,
	no_balance: bool,
	platform: Option<String>,
	reweight: bool,
}

fn search(
	engine: &RetrievalEngine,
	query: &str,
	flags: SearchFlags,
) -> (&'static str, Vec<ScoredResult>) {
	let target = flags.top_k.map(|top_k| top_k as usize).unwrap_or_else(|| engine.default_top_k());
	let default_mode = if engine.cfg().balancing.enabled { "balanced" } else { "plain" };

	match flags.platform {
		Some(platform) => ("platform", engine.search_by_platform(query, &platform)),
		None if flags.reweight => ("reweighted", engine.search_reweighted(query, target)),
		None if flags.no_balance => ("plain", engine.search(query, target, false)),
		None if flags.top_k.is_none() => (default_mode, engine.search_default(query)),
		None => (default_mode, engine.search(query, target, engine.cfg().balancing.enabled)),
	}
}

fn init_tracing(log_level: &str) {
	let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn print_json<T>(value: &T) -> color_eyre::Result<()>
where
	T: Serialize,
{
	println!("{}", serde_json::to_string_pretty(value)?);

	Ok(())
}

fn load_documents(path: &Path) -> color_eyre::Result<Vec<DocumentInput>> {
	let raw = fs::read_to_string(path)?;
	let documents: Vec<DocumentInput> = serde_json::from_str(&raw)?;

	if documents.is_empty() {
		return Err(eyre::eyre!("Document file must include at least one document."));
	}

	Ok(documents)
}

fn load_dataset(path: &Path) -> color_eyre::Result<AuditDataset> {
	let raw = fs::read_to_string(path)?;
	let dataset: AuditDataset = serde_json::from_str(&raw)?;

	if dataset.queries.is_empty() {
		return Err(eyre::eyre!("Dataset must include at least one query."));
	}

	Ok(dataset)
}

fn audit_dataset(engine: &RetrievalEngine, dataset: AuditDataset) -> AuditDatasetOutput {
	let default_n = dataset.n_results.unwrap_or(DEFAULT_AUDIT_RESULTS);
	let mut queries = Vec::with_capacity(dataset.queries.len());

	for (idx, item) in dataset.queries.into_iter().enumerate() {
		let n_results = item.n_results.unwrap_or(default_n);
		let started = Instant::now();
		let analysis = engine.analyze_search_bias(&item.query, n_results);
		let latency_ms = started.elapsed().as_secs_f64() * 1_000.0;
		let id = item.id.unwrap_or_else(|| format!("q{}", idx + 1));

		queries.push(QueryAudit::new(id, item.query, n_results, latency_ms, analysis));
	}

	let summary = summarize(&queries);

	tracing::info!(
		queries = summary.query_count,
		bias_detected = summary.bias_detected_count,
		balancing_effective = summary.balancing_effective_count,
		"Dataset audit completed."
	);

	AuditDatasetOutput {
		dataset: DatasetInfo {
			name: dataset.name.unwrap_or_else(|| "dataset".to_string()),
			query_count: queries.len(),
		},
		summary,
		queries,
	}
}

/// Means cover the queries that produced a report.
fn summarize(queries: &[QueryAudit]) -> AuditSummary {
	let reported = queries.iter().filter(|item| item.error.is_none()).collect::<Vec<_>>();
	let count = reported.len().max(1) as f64;
	let mean = |field: fn(&QueryAudit) -> Option<f32>| {
		reported.iter().filter_map(|item| field(item)).map(f64::from).sum::<f64>() / count
	};
	let mut latencies = queries.iter().map(|item| item.latency_ms).collect::<Vec<_>>();

	latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

	AuditSummary {
		query_count: queries.len(),
		failed_count: queries.len() - reported.len(),
		bias_detected_count: reported
			.iter()
			.filter(|item| item.bias_detected == Some(true))
			.count(),
		balancing_effective_count: reported
			.iter()
			.filter(|item| item.balancing_effective == Some(true))
			.count(),
		mean_unbalanced_diversity: mean(|item| item.unbalanced_diversity),
		mean_balanced_diversity: mean(|item| item.balanced_diversity),
		mean_diversity_improvement: mean(|item| item.diversity_improvement),
		latency_ms_p50: percentile(&latencies, 0.50),
		latency_ms_p95: percentile(&latencies, 0.95),
	}
}

fn percentile(values: &[f64], percentile: f64) -> f64 {
	if values.is_empty() {
		return 0.0;
	}

	let pos = percentile.clamp(0.0, 1.0) * (values.len() as f64 - 1.0);
	let lower = pos.floor() as usize;
	let upper = pos.ceil() as usize;
	let weight = pos - lower as f64;

	values[lower] * (1.0 - weight) + values[upper] * weight
}
