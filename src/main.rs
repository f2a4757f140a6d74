mod builtin;
mod config;
mod error;
mod eval;
mod global;
mod history;
mod job;
mod parser;
mod pipe;
mod redirect;
mod spawn;
mod types;

use std::io::{self,BufRead,IsTerminal,Write};
use anyhow::Context;
use clap::Parser;
use log::debug;

use config::Config;
use global::Flow;

fn main() -> anyhow::Result<()> {
	let config = Config::parse();
	env_logger::Builder::new()
		.filter_level(config.log_level())
		.parse_default_env()
		.init();
	debug!("{:?}", config);

	let mut state = global::State::new(&config);
	if !config.commands.is_empty() {
		for line in &config.commands {
			if state.dispatch(line.as_bytes()) == Flow::Exit {
				break;
			}
		}
		return Ok(());
	}

	let mut stdout = io::stdout();
	let stdin = io::stdin();
	let interactive = stdin.is_terminal();
	let mut stdin_locked = stdin.lock();
	loop {
		state.reap_jobs();
		if interactive {
			stdout.write_all(config.prompt.as_bytes()).context("writing prompt")?;
			stdout.flush().context("writing prompt")?;
		}
		let mut line: Vec<u8> = vec![];
		let n = stdin_locked.read_until(b'\n', &mut line).context("reading input")?;
		if n == 0 {
			break;
		}
		if state.dispatch(&line) == Flow::Exit {
			break;
		}
	}
	Ok(())
}
