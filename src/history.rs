use std::collections::VecDeque;
use std::io::{self,Write};

use crate::types::PIPE;

/// Most recent command lines, oldest dropped once `capacity` is reached.
/// Lines are kept as the raw bytes that were typed.
#[derive(Debug)]
pub struct History {
	entries: VecDeque<Vec<u8>>,
	capacity: usize,
}

fn push_quoted(line: &mut Vec<u8>, token: &[u8]) {
	let bare_pipe = token == PIPE;
	if token.iter().any(|&c| c.is_ascii_whitespace() || (c == b'|' && !bare_pipe)) {
		line.push(b'"');
		line.extend_from_slice(token);
		line.push(b'"');
	} else {
		line.extend_from_slice(token);
	}
}

impl History {
	pub fn new(capacity: usize) -> History {
		let capacity = capacity.max(1);
		History { entries: VecDeque::with_capacity(capacity), capacity: capacity }
	}

	/// Store `tokens` as one line. Tokens that were quoted on input are quoted
	/// again so that replaying the line yields the same tokens.
	pub fn record<S: AsRef<[u8]>>(&mut self, tokens: &[S]) {
		let mut line = vec![];
		for (i, t) in tokens.iter().enumerate() {
			if i > 0 {
				line.push(b' ');
			}
			push_quoted(&mut line, t.as_ref());
		}
		if self.entries.len() == self.capacity {
			self.entries.pop_front();
		}
		self.entries.push_back(line);
	}

	pub fn last(&self) -> Option<&[u8]> {
		self.entries.back().map(|s| s.as_slice())
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Newest first.
	pub fn entries(&self) -> impl Iterator<Item = &[u8]> {
		self.entries.iter().rev().map(|s| s.as_slice())
	}

	pub fn display<W: Write>(&self, out: &mut W) -> io::Result<()> {
		if self.is_empty() {
			return writeln!(out, "No commands in history");
		}
		for (i, line) in self.entries().enumerate() {
			write!(out, "{} ", i + 1)?;
			out.write_all(line)?;
			out.write_all(b"\n")?;
		}
		Ok(())
	}
}
