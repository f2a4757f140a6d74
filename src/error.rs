use std::{ffi,io};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShellError {
	#[error("syntax error: missing file name after '{0}'")]
	MissingRedirectTarget(String),
	#[error("syntax error: empty command in pipeline")]
	EmptyStage,
	#[error("input line longer than {limit} bytes")]
	LineTooLong { limit: usize },
	#[error("too many tokens in input line (limit {limit})")]
	TooManyTokens { limit: usize },
	#[error("cannot create pipe: {0}")]
	Pipe(#[source] nix::Error),
	#[error("unable to create child process: {0}")]
	Fork(#[source] nix::Error),
	#[error("wait failed: {0}")]
	Wait(#[source] nix::Error),
	#[error("argument contains a nul byte")]
	Nul(#[from] ffi::NulError),
	#[error(transparent)]
	Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ShellError>;
