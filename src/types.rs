use std::borrow::Cow;

pub const PIPE: &[u8] = b"|";
pub const BACKGROUND: &[u8] = b"&";
pub const REDIRECT_IN: &[u8] = b"<";
pub const REDIRECT_OUT: &[u8] = b">";

/// One program invocation: argv with redirection operators already stripped.
/// Arguments are raw bytes, exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stage {
	pub argv: Vec<Vec<u8>>,
	pub input: Option<Vec<u8>>,
	pub output: Option<Vec<u8>>,
}

impl Stage {
	/// Program name, for messages.
	pub fn name(&self) -> Cow<'_, str> {
		String::from_utf8_lossy(self.argv.first().map_or(&b""[..], |s| s.as_slice()))
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
	pub stages: Vec<Stage>,
}

impl Pipeline {
	/// Number of pipes needed to connect the stages.
	pub fn pipe_count(&self) -> usize {
		self.stages.len().saturating_sub(1)
	}
}
