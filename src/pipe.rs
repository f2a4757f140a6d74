use std::os::unix::io::{AsRawFd,OwnedFd,RawFd};
use nix::fcntl::{fcntl,FcntlArg,FdFlag};
use nix::unistd;
use log::debug;

use crate::error::{Result,ShellError};

#[derive(Debug)]
pub struct Pipe {
	pub read: OwnedFd,
	pub write: OwnedFd,
}

/// Pipes connecting neighbouring stages, `pipes[i]` runs from stage `i` to
/// stage `i + 1`. Both ends are close-on-exec so that only the copies a stage
/// dup2's onto its standard streams survive into the executed program.
#[derive(Debug)]
pub struct PipeSet {
	pipes: Vec<Pipe>,
}

fn set_cloexec(fd: &OwnedFd) -> nix::Result<()> {
	fcntl(fd.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC)).map(|_| ())
}

/// One pipe, both ends close-on-exec. Returns `(read, write)`.
pub fn cloexec_pipe() -> Result<(OwnedFd, OwnedFd)> {
	let (read, write) = unistd::pipe().map_err(ShellError::Pipe)?;
	set_cloexec(&read).map_err(ShellError::Pipe)?;
	set_cloexec(&write).map_err(ShellError::Pipe)?;
	Ok((read, write))
}

/// Tests that fork, reap or watch descriptor numbers take this lock.
#[cfg(test)]
pub fn serial() -> std::sync::MutexGuard<'static, ()> {
	static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
	LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

impl PipeSet {
	pub fn empty() -> PipeSet {
		PipeSet { pipes: vec![] }
	}

	/// Allocate `n` pipes. On failure every pipe opened so far is closed again.
	pub fn create(n: usize) -> Result<PipeSet> {
		let mut pipes = Vec::with_capacity(n);
		for _ in 0 .. n {
			let (read, write) = cloexec_pipe()?;
			pipes.push(Pipe { read: read, write: write });
		}
		debug!("allocated {} pipe(s): {:?}", n, pipes);
		Ok(PipeSet { pipes: pipes })
	}

	pub fn len(&self) -> usize {
		self.pipes.len()
	}

	pub fn reader(&self, i: usize) -> RawFd {
		self.pipes[i].read.as_raw_fd()
	}

	pub fn writer(&self, i: usize) -> RawFd {
		self.pipes[i].write.as_raw_fd()
	}

	pub fn raw_fds(&self) -> Vec<RawFd> {
		self.pipes.iter().flat_map(|p| [p.read.as_raw_fd(), p.write.as_raw_fd()]).collect()
	}

	/// Close this process's copy of every descriptor without giving up the
	/// `PipeSet`. Only for a forked child that is about to exec or `_exit`,
	/// where the owning handles are never dropped.
	pub fn close_inherited(&self) -> nix::Result<()> {
		for fd in self.raw_fds() {
			unistd::close(fd)?;
		}
		Ok(())
	}

	/// Close both ends of every pipe.
	pub fn release(self) {
		debug!("releasing {} pipe(s)", self.len());
		drop(self.pipes);
	}
}
