// crates.io
use clap::Parser;
// self
use tessera_eval::Args;

fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = Args::parse();
	tessera_eval::run(args)
}
