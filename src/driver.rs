use lasso::RodeoResolver;
use thiserror::Error;
use tracing::info;

use crate::{
	backend::{
		interpret::{execute, Data, ExecutionError},
		stage::{Stage as _, StageError},
	},
	common::Range,
	config::Config,
	frontend::{
		elaborate::{elaborate, Elaboration, Severity},
		lex::{lex, LexError},
		parse::parse,
		zonk::{zonk, Zonked},
	},
	ir::staged::StagedTerm,
};

#[derive(Debug, Error)]
pub enum RunError {
	#[error("lex error: {0:?}")]
	Lex(LexError),
	#[error("parse error: expected one of {expected:?}")]
	Parse { range: Range, expected: Vec<&'static str> },
	#[error("program rejected with {0} error(s)")]
	Rejected(usize),
	#[error(transparent)]
	Stage(#[from] StageError),
	#[error(transparent)]
	Execute(#[from] ExecutionError),
}

/// A source program after elaboration and zonking.
pub struct Frontend {
	pub resolver: RodeoResolver,
	pub elaboration: Elaboration,
}

/// Lexes, parses, elaborates and zonks a source program.
///
/// Only lexing and parsing failures are errors here; elaboration problems are recorded as diagnostics.
pub fn compile(source: &str, config: &Config) -> Result<Frontend, RunError> {
	let tokens = lex(source).map_err(RunError::Lex)?;
	let (program, resolver) = parse(&tokens).map_err(|error| RunError::Parse {
		range: tokens.range_of(error.location),
		expected: error.expected.tokens().collect(),
	})?;
	let Elaboration { term, ty, unifier, mut diagnostics, inlay_hints, hovers } = elaborate(program, config);
	let Zonked { term, ty, diagnostics: unsolved } = zonk(term, ty, &unifier);
	diagnostics.extend(unsolved);
	info!(diagnostics = diagnostics.len(), "compiled program");
	Ok(Frontend { resolver, elaboration: Elaboration { term, ty, unifier, diagnostics, inlay_hints, hovers } })
}

impl Frontend {
	pub fn errors(&self) -> usize {
		self.elaboration.diagnostics.iter().filter(|diagnostic| diagnostic.severity == Severity::Error).count()
	}

	/// Resolves every splice, refusing programs with errors.
	pub fn stage(&self) -> Result<StagedTerm, RunError> {
		match self.errors() {
			0 => Ok(self.elaboration.term.stage()?),
			errors => Err(RunError::Rejected(errors)),
		}
	}

	pub fn execute(&self) -> Result<Data, RunError> { Ok(execute(&self.stage()?)?) }
}

/// Runs a source program to its data tree.
pub fn run(source: &str, config: &Config) -> Result<Data, RunError> { compile(source, config)?.execute() }
