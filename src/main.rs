#![allow(missing_docs)]

use clap::{ArgAction, Parser, Subcommand};
use tracing::Level;

mod cmd;

#[derive(Parser)]
#[command(name = "nimaloader", about = "NIMA document inspection tools")]
struct Cli {
	/// Log verbosity on stderr (-v debug, -vv trace).
	#[arg(short, long, action = ArgAction::Count, global = true)]
	verbose: u8,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Header, section counts, and diagnostics.
	Info(cmd::info::Args),
	/// Top-level block layout.
	Blocks(cmd::blocks::Args),
	/// Flat component list.
	Components(cmd::components::Args),
	/// Animation clips and tracks.
	Animations(cmd::animations::Args),
}

fn main() {
	let cli = Cli::parse();
	init_tracing(cli.verbose);

	if let Err(err) = run(cli.command) {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn init_tracing(verbose: u8) {
	let level = match verbose {
		0 => Level::WARN,
		1 => Level::DEBUG,
		_ => Level::TRACE,
	};
	tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).with_target(false).init();
}

fn run(command: Commands) -> nimaloader::nima::Result<()> {
	match command {
		Commands::Info(args) => cmd::info::run(args),
		Commands::Blocks(args) => cmd::blocks::run(args),
		Commands::Components(args) => cmd::components::run(args),
		Commands::Animations(args) => cmd::animations::run(args),
	}
}
