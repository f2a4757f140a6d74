use std::io::{self,Write};
use log::debug;

use crate::builtin::{self,Builtin};
use crate::config::Config;
use crate::error::Result;
use crate::eval;
use crate::history::History;
use crate::job::{self,JobSet};
use crate::parser;
use crate::types::BACKGROUND;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Flow { Continue, Exit }

/// Where a line came from. A replayed line is never `!!` itself, so replay
/// happens at most once per input line.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Origin { Input, Replay }

pub struct State {
	pub history: History,
	pub job_set: JobSet,
	max_line: usize,
	max_tokens: usize,
}

impl State {
	pub fn new(config: &Config) -> State {
		State {
			history: History::new(config.history_size),
			job_set: JobSet::new(),
			max_line: config.max_line,
			max_tokens: config.max_tokens,
		}
	}

	/// Handle one input line. Errors are reported here; only `exit` ends the
	/// shell.
	pub fn dispatch(&mut self, line: &[u8]) -> Flow {
		match self.dispatch_line(line, Origin::Input) {
			Ok(flow) => flow,
			Err(e) => {
				let _ = writeln!(io::stderr(), "osh: {}", e);
				Flow::Continue
			},
		}
	}

	/// Reap finished background jobs; call before showing a prompt.
	pub fn reap_jobs(&mut self) {
		for (job, status) in self.job_set.reap() {
			debug!("reaped background job {} ({}): {:?}", job.pid, job.command, status);
		}
		if self.job_set.len() > 0 {
			debug!("{} background job(s) still running", self.job_set.len());
		}
	}

	fn dispatch_line(&mut self, line: &[u8], origin: Origin) -> Result<Flow> {
		let mut tokens = parser::tokenize(line, self.max_line, self.max_tokens)?;
		let first = match tokens.first() {
			Some(t) => t.as_slice(),
			None => return Ok(Flow::Continue),
		};

		match builtin::match_builtin(first) {
			Some(Builtin::Exit) => return Ok(Flow::Exit),
			Some(Builtin::Repeat) if origin == Origin::Input => {
				let last = match self.history.last() {
					Some(last) => last.to_vec(),
					None => {
						writeln!(io::stdout().lock(), "No commands in history")?;
						return Ok(Flow::Continue);
					},
				};
				return self.dispatch_line(&last, Origin::Replay);
			},
			Some(Builtin::History) => {
				let stdout = io::stdout();
				self.history.display(&mut stdout.lock())?;
				return Ok(Flow::Continue);
			},
			Some(Builtin::Repeat) | None => {},
		}

		self.history.record(&tokens);
		let background = tokens.last().map_or(false, |t| t.as_slice() == BACKGROUND);
		if background {
			tokens.pop();
		}
		let pipeline = eval::split(&tokens)?;

		let pid = job::fork_job(&pipeline)?;
		if background {
			let command: Vec<_> = tokens.iter().map(|t| String::from_utf8_lossy(t)).collect();
			self.job_set.push(pid, command.join(" "));
		} else {
			job::wait_job(pid)?;
		}
		Ok(Flow::Continue)
	}
}
