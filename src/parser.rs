use crate::error::{Result,ShellError};

struct Parser<'a> {
	line: &'a [u8],
	i: usize,
	tokens: Vec<Vec<u8>>,
	max_tokens: usize,
}

impl<'a> Parser<'a> {
	fn proceed_while<F>(&mut self, f: F) where F: Fn(u8) -> bool {
		while let Some(c) = self.line.get(self.i) {
			if !f(*c) { break; }
			self.i += 1;
		}
	}

	fn is_whitespace(c: u8) -> bool {
		c.is_ascii_whitespace()
	}

	fn is_letter(c: u8) -> bool {
		c != b'|' && !Parser::is_whitespace(c)
	}

	fn skip_whitespaces(&mut self) {
		self.proceed_while(Parser::is_whitespace);
	}

	fn push(&mut self, token: &[u8]) -> Result<()> {
		if self.tokens.len() >= self.max_tokens {
			return Err(ShellError::TooManyTokens { limit: self.max_tokens });
		}
		self.tokens.push(token.to_vec());
		Ok(())
	}

	fn read_quoted(&mut self) -> &'a [u8] {
		self.i += 1;
		let orig = self.i;
		self.proceed_while(|c| c != b'"');
		let word = &self.line[orig .. self.i];
		if self.i < self.line.len() {
			self.i += 1;
		}
		word
	}

	fn read_word(&mut self) -> &'a [u8] {
		let orig = self.i;
		self.proceed_while(Parser::is_letter);
		&self.line[orig .. self.i]
	}

	fn parse_tokens(mut self) -> Result<Vec<Vec<u8>>> {
		loop {
			self.skip_whitespaces();
			let word = match self.line.get(self.i) {
				None => break,
				Some(&b'"') => self.read_quoted(),
				Some(_) => self.read_word(),
			};
			if !word.is_empty() {
				self.push(word)?;
			}
			while self.line.get(self.i) == Some(&b'|') {
				self.push(b"|")?;
				self.i += 1;
			}
		}
		Ok(self.tokens)
	}
}

/// Split one input line into tokens. `|` is always a token of its own and a
/// span opened by `"` keeps its whitespace. Bytes are passed through as is,
/// whether or not they are valid UTF-8.
pub fn tokenize(line: &[u8], max_line: usize, max_tokens: usize) -> Result<Vec<Vec<u8>>> {
	let mut line = line;
	while let Some((&(b'\n' | b'\r'), rest)) = line.split_last() {
		line = rest;
	}
	if line.len() > max_line {
		return Err(ShellError::LineTooLong { limit: max_line });
	}
	let parser = Parser { line: line, i: 0, tokens: vec![], max_tokens: max_tokens };
	parser.parse_tokens()
}
