use std::os::unix::io::RawFd;
use nix::errno::Errno;
use nix::sys::wait::{self,WaitStatus};
use log::{debug,warn};

use crate::error::{Result,ShellError};
use crate::pipe::PipeSet;
use crate::redirect;
use crate::spawn::{self,Spawned};
use crate::types::{Pipeline,PIPE};

/// Cut `tokens` at every `|` and pull the redirections out of each piece.
/// Nothing is spawned for a line with a malformed stage.
pub fn split<S: AsRef<[u8]>>(tokens: &[S]) -> Result<Pipeline> {
	let mut stages = vec![];
	for piece in tokens.split(|t| t.as_ref() == PIPE) {
		let stage = redirect::extract(piece)?;
		if stage.argv.is_empty() {
			return Err(ShellError::EmptyStage);
		}
		stages.push(stage);
	}
	Ok(Pipeline { stages: stages })
}

/// Reap children until none are left. Every stage that could not start its
/// program is reported; the last stage's status is returned.
fn wait_all(pipeline: &Pipeline, spawned: &[Spawned]) -> Result<Option<WaitStatus>> {
	let mut last = None;
	loop {
		let status = match wait::wait() {
			Ok(s) => s,
			Err(Errno::EINTR) => continue,
			Err(Errno::ECHILD) => break,
			Err(e) => return Err(ShellError::Wait(e)),
		};
		let pid = match status.pid() {
			Some(pid) => pid,
			None => continue,
		};
		debug!("reaped {}: {:?}", pid, status);
		if let Some(i) = spawned.iter().position(|s| s.pid == pid) {
			if spawned[i].exec_error.is_some() {
				spawn::report_command_not_found(&pipeline.stages[i]);
			}
			if i + 1 == pipeline.stages.len() {
				last = Some(status);
			}
		}
	}
	Ok(last)
}

fn spawn_all(pipeline: &Pipeline, infd: RawFd, outfd: RawFd, pipes: &PipeSet, spawned: &mut Vec<Spawned>) -> Result<()> {
	let n = pipeline.stages.len();
	for (i, stage) in pipeline.stages.iter().enumerate() {
		let stage_in = if i == 0 { infd } else { pipes.reader(i - 1) };
		let stage_out = if i == n - 1 { outfd } else { pipes.writer(i) };
		spawned.push(spawn::spawn_async(stage, stage_in, stage_out, pipes)?);
	}
	Ok(())
}

/// Run every stage of `pipeline`, stage `i` feeding stage `i + 1`, with the
/// first reading `infd` and the last writing `outfd`. Returns the exit code
/// of the last stage.
pub fn run(pipeline: &Pipeline, infd: RawFd, outfd: RawFd) -> Result<i32> {
	if let [stage] = pipeline.stages.as_slice() {
		let status = spawn::spawn_sync(stage, infd, outfd)?;
		return Ok(spawn::exit_code(status));
	}

	let pipes = PipeSet::create(pipeline.pipe_count())?;
	let mut spawned = Vec::with_capacity(pipeline.stages.len());
	let result = spawn_all(pipeline, infd, outfd, &pipes, &mut spawned);
	pipes.release();
	if let Err(ref e) = result {
		warn!("pipeline aborted after {} stage(s): {}", spawned.len(), e);
	}

	let last = wait_all(pipeline, &spawned)?;
	result?;
	Ok(last.map_or(0, spawn::exit_code))
}
