use crate::error::{Result,ShellError};
use crate::types::{Stage,REDIRECT_IN,REDIRECT_OUT};

/// Strip `<` and `>` together with their targets out of `argv`. The last
/// occurrence of an operator wins; other arguments keep their order.
pub fn extract<S: AsRef<[u8]>>(argv: &[S]) -> Result<Stage> {
	let mut stage = Stage::default();
	let mut iter = argv.iter().map(|s| s.as_ref());
	while let Some(arg) = iter.next() {
		let slot = if arg == REDIRECT_IN {
			&mut stage.input
		} else if arg == REDIRECT_OUT {
			&mut stage.output
		} else {
			stage.argv.push(arg.to_vec());
			continue;
		};
		match iter.next() {
			Some(target) => *slot = Some(target.to_vec()),
			None => return Err(ShellError::MissingRedirectTarget(String::from_utf8_lossy(arg).into_owned())),
		}
	}
	Ok(stage)
}
