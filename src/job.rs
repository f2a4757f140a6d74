use std::io::{self,Write};
use nix::errno::Errno;
use nix::sys::wait::{self,WaitPidFlag,WaitStatus};
use nix::unistd::{self,ForkResult,Pid};
use log::{debug,info,warn};

use crate::error::{Result,ShellError};
use crate::eval;
use crate::spawn;
use crate::types::Pipeline;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum State { Active, Terminated }

pub trait WaitStatusExt {
	fn state(self) -> State;
}

impl WaitStatusExt for WaitStatus {
	fn state(self) -> State {
		match self {
			WaitStatus::Exited(..) | WaitStatus::Signaled(..) => State::Terminated,
			_ => State::Active,
		}
	}
}

/// Fork the process that owns one whole pipeline. The child never returns:
/// it runs every stage, waits for them and exits with the last stage's code.
pub fn fork_job(pipeline: &Pipeline) -> Result<Pid> {
	let _ = io::stdout().flush();
	match unsafe { unistd::fork() }.map_err(ShellError::Fork)? {
		ForkResult::Parent { child } => {
			debug!("forked job {} for {} stage(s)", child, pipeline.stages.len());
			Ok(child)
		},
		ForkResult::Child => {
			let code = match eval::run(pipeline, libc::STDIN_FILENO, libc::STDOUT_FILENO) {
				Ok(code) => code,
				Err(e) => {
					let _ = writeln!(io::stderr(), "osh: {}", e);
					1
				},
			};
			unsafe { libc::_exit(code) }
		},
	}
}

/// Block until the job process `pid` is gone.
pub fn wait_job(pid: Pid) -> Result<WaitStatus> {
	loop {
		let status = spawn::wait_for(pid)?;
		if status.state() == State::Terminated {
			debug!("job {} finished: {:?}", pid, status);
			return Ok(status);
		}
	}
}

#[derive(Debug)]
pub struct Job {
	pub pid: Pid,
	pub command: String,
}

/// Background jobs the shell has not yet reaped.
#[derive(Debug, Default)]
pub struct JobSet {
	jobs: Vec<Job>,
}

impl JobSet {
	pub fn new() -> JobSet {
		JobSet { jobs: vec![] }
	}

	pub fn push(&mut self, pid: Pid, command: String) {
		info!("job {} running in background: {}", pid, command);
		self.jobs.push(Job { pid: pid, command: command });
	}

	pub fn len(&self) -> usize {
		self.jobs.len()
	}

	/// Collect finished background jobs without blocking.
	pub fn reap(&mut self) -> Vec<(Job, WaitStatus)> {
		let mut done = vec![];
		let mut i = 0;
		while i < self.jobs.len() {
			let state = match wait::waitpid(self.jobs[i].pid, Some(WaitPidFlag::WNOHANG)) {
				Ok(status) => Some(status).filter(|s| s.state() == State::Terminated),
				Err(Errno::ECHILD) => {
					warn!("job {} vanished", self.jobs[i].pid);
					Some(WaitStatus::StillAlive)
				},
				Err(_) => None,
			};
			match state {
				Some(status) => {
					let job = self.jobs.swap_remove(i);
					info!("job {} done ({:?}): {}", job.pid, status, job.command);
					done.push((job, status));
				},
				None => i += 1,
			}
		}
		done
	}
}
