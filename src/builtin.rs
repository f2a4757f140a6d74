#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Builtin {
	Exit,
	History,
	/// `!!`: run the last recorded command again.
	Repeat,
}

pub fn match_builtin(name: &[u8]) -> Option<Builtin> {
	match name {
		b"exit" => Some(Builtin::Exit),
		b"history" => Some(Builtin::History),
		b"!!" => Some(Builtin::Repeat),
		_ => None,
	}
}
