use clap::{ArgAction,Parser};
use log::LevelFilter;

#[derive(Parser, Debug, Clone)]
#[command(name = "osh", version, about = "A small shell running pipelines of external programs")]
pub struct Config {
	/// Prompt shown before each line when stdin is a terminal
	#[arg(long, default_value = "osh> ")]
	pub prompt: String,

	/// Number of commands kept for `history` and `!!`
	#[arg(long, default_value_t = 10)]
	pub history_size: usize,

	/// Longest accepted input line, in bytes
	#[arg(long, default_value_t = 4096)]
	pub max_line: usize,

	/// Most tokens accepted on one line
	#[arg(long, default_value_t = 256)]
	pub max_tokens: usize,

	/// Run these lines instead of reading stdin
	#[arg(short = 'c', value_name = "LINE")]
	pub commands: Vec<String>,

	/// More log output (-v info, -vv debug); RUST_LOG takes precedence
	#[arg(short, long, action = ArgAction::Count)]
	pub verbose: u8,
}

impl Config {
	pub fn log_level(&self) -> LevelFilter {
		match self.verbose {
			0 => LevelFilter::Warn,
			1 => LevelFilter::Info,
			2 => LevelFilter::Debug,
			_ => LevelFilter::Trace,
		}
	}
}

impl Default for Config {
	fn default() -> Config {
		Config::parse_from(["osh"])
	}
}
