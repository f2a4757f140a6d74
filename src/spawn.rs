use std::ffi::{CString,OsStr};
use std::fs;
use std::io::{self,Read,Write};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::{AsRawFd,RawFd};
use nix::errno::Errno;
use nix::sys::signal::{self,SigHandler,Signal};
use nix::sys::wait::{self,WaitStatus};
use nix::unistd::{self,ForkResult,Pid};
use log::{debug,trace,warn};

use crate::error::{Result,ShellError};
use crate::pipe::{self,PipeSet};
use crate::types::Stage;

/// Exit status of a stage whose program could not be executed.
pub const COMMAND_NOT_FOUND: i32 = 127;
/// Exit status of a stage whose redirect target could not be opened.
pub const REDIRECT_FAILED: i32 = 1;
/// Exit status of a stage that failed while wiring its descriptors.
pub const SETUP_FAILED: i32 = 126;

/// A forked stage. `exec_error` is set when the child never got to run its
/// program; it comes from the child itself, not from the exit code, so a
/// program that exits 127 on its own is not mistaken for a missing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spawned {
	pub pid: Pid,
	pub exec_error: Option<Errno>,
}

pub fn report_command_not_found(stage: &Stage) {
	let _ = writeln!(io::stderr(), "osh: command not found: {}", stage.name());
}

/// Plain exit code for a finished process, shell style.
pub fn exit_code(status: WaitStatus) -> i32 {
	match status {
		WaitStatus::Exited(_, code) => code,
		WaitStatus::Signaled(_, sig, _) => 128 + sig as i32,
		_ => 0,
	}
}

fn die(code: i32) -> ! {
	unsafe { libc::_exit(code) }
}

enum Stream { Input, Output }

fn open_redirect(path: &[u8], stream: &Stream) -> io::Result<fs::File> {
	let mut oopt = fs::OpenOptions::new();
	let _ = match *stream {
		Stream::Input => oopt.read(true),
		Stream::Output => oopt.write(true).create(true).truncate(true),
	};
	oopt.open(OsStr::from_bytes(path))
}

/// Point `target` (0 or 1) at either the redirect file or `fd`.
fn wire(target: RawFd, path: Option<&Vec<u8>>, fd: RawFd, stream: Stream) {
	if let Some(path) = path {
		let file = match open_redirect(path, &stream) {
			Ok(f) => f,
			Err(e) => {
				let _ = writeln!(io::stderr(), "osh: cannot open file \"{}\": {}", String::from_utf8_lossy(path), e);
				die(REDIRECT_FAILED);
			},
		};
		if let Err(e) = unistd::dup2(file.as_raw_fd(), target) {
			let _ = writeln!(io::stderr(), "osh: dup2: {}", e);
			die(SETUP_FAILED);
		}
	} else if fd != target {
		if let Err(e) = unistd::dup2(fd, target) {
			let _ = writeln!(io::stderr(), "osh: dup2: {}", e);
			die(SETUP_FAILED);
		}
	}
}

fn exec_stage(stage: &Stage, infd: RawFd, outfd: RawFd, pipes: &PipeSet, mut status: fs::File) -> ! {
	wire(libc::STDIN_FILENO, stage.input.as_ref(), infd, Stream::Input);
	wire(libc::STDOUT_FILENO, stage.output.as_ref(), outfd, Stream::Output);
	if let Err(e) = pipes.close_inherited() {
		let _ = writeln!(io::stderr(), "osh: close: {}", e);
		die(SETUP_FAILED);
	}
	// The shell runs with SIGPIPE ignored; programs expect the default.
	if let Err(e) = unsafe { signal::signal(Signal::SIGPIPE, SigHandler::SigDfl) } {
		let _ = writeln!(io::stderr(), "osh: signal: {}", e);
		die(SETUP_FAILED);
	}

	let argv: std::result::Result<Vec<CString>, _> = stage.argv.iter().map(|s| CString::new(s.as_slice())).collect();
	let argv = match argv {
		Ok(argv) if !argv.is_empty() => argv,
		Ok(_) => die(SETUP_FAILED),
		Err(e) => {
			let _ = writeln!(io::stderr(), "osh: {}", e);
			die(SETUP_FAILED);
		},
	};
	let e = match unistd::execvp(&argv[0], &argv) {
		Err(e) => e,
		Ok(never) => match never {},
	};
	trace!("execvp {:?}: {}", argv[0], e);
	let _ = status.write_all(&(e as i32).to_ne_bytes());
	die(COMMAND_NOT_FOUND)
}

/// Wait for the child to exec (status pipe closes empty) or to report why it
/// could not.
fn read_exec_status(read: fs::File) -> Option<Errno> {
	let mut buf = Vec::with_capacity(4);
	if let Err(e) = read.take(4).read_to_end(&mut buf) {
		warn!("reading exec status: {}", e);
		return None;
	}
	match <[u8; 4]>::try_from(buf.as_slice()) {
		Ok(bytes) => Some(Errno::from_raw(i32::from_ne_bytes(bytes))),
		Err(_) => None,
	}
}

/// Fork a process for `stage` reading `infd` and writing `outfd`. Every
/// descriptor in `pipes` is closed in the child before the program runs.
/// Returns once the child has either started its program or given up.
pub fn spawn_async(stage: &Stage, infd: RawFd, outfd: RawFd, pipes: &PipeSet) -> Result<Spawned> {
	let (status_read, status_write) = pipe::cloexec_pipe()?;
	let _ = io::stdout().flush();
	// The shell is single threaded, so the child may allocate freely before exec.
	match unsafe { unistd::fork() }.map_err(ShellError::Fork)? {
		ForkResult::Parent { child } => {
			drop(status_write);
			let exec_error = read_exec_status(fs::File::from(status_read));
			debug!("spawned stage {:?} as pid {} (in={}, out={}, exec error: {:?})",
			       stage.name(), child, infd, outfd, exec_error);
			Ok(Spawned { pid: child, exec_error: exec_error })
		},
		ForkResult::Child => {
			drop(status_read);
			exec_stage(stage, infd, outfd, pipes, fs::File::from(status_write))
		},
	}
}

/// Block until `pid` exits, retrying on EINTR.
pub fn wait_for(pid: Pid) -> Result<WaitStatus> {
	loop {
		match wait::waitpid(pid, None) {
			Ok(status) => return Ok(status),
			Err(Errno::EINTR) => continue,
			Err(e) => return Err(ShellError::Wait(e)),
		}
	}
}

/// Run `stage` to completion. A stage that could not be executed is reported
/// as not found; the raw status is returned either way.
pub fn spawn_sync(stage: &Stage, infd: RawFd, outfd: RawFd) -> Result<WaitStatus> {
	let spawned = spawn_async(stage, infd, outfd, &PipeSet::empty())?;
	let status = wait_for(spawned.pid)?;
	debug!("stage {} finished: {:?}", spawned.pid, status);
	if spawned.exec_error.is_some() {
		report_command_not_found(stage);
	}
	Ok(status)
}
