/// Settings for one elaboration run.
#[derive(Clone, Copy, Default, Debug)]
pub struct Config {
	/// Rejects metavariable solutions that mention the metavariable being solved.
	/// Off by default: without it, a cyclic solution can be recorded.
	pub occurs_check: bool,
}

impl Config {
	pub fn with_occurs_check(self, occurs_check: bool) -> Self { Self { occurs_check, ..self } }
}
