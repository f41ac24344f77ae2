use std::rc::Rc;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::debug;

use crate::{
	common::{rc, Name},
	ir::staged::StagedTerm,
};

/// A fully computed data tree.
#[derive(Clone, PartialEq, Debug)]
pub enum Data {
	Byte(i8),
	Short(i16),
	Int(i32),
	Long(i64),
	Float(f32),
	Double(f64),
	String(String),
	ByteArray(Vec<i8>),
	IntArray(Vec<i32>),
	LongArray(Vec<i64>),
	List(Vec<Data>),
	Compound(IndexMap<Name, Data>),
}

#[derive(Clone, Debug, Error)]
pub enum ExecutionError {
	#[error("function {0:?} is not bound")]
	UnboundFunction(Name),
	#[error("array element has the wrong shape: {0:?}")]
	WrongShape(Data),
}

pub fn execute(term: &StagedTerm) -> Result<Data, ExecutionError> {
	let data = Executor.run(term, &rc!(Scope::Empty))?;
	debug!("executed program");
	Ok(data)
}

// Function bindings visible at one point of a program, innermost first.
enum Scope<'a> {
	Empty,
	Bound { name: Name, body: &'a StagedTerm, outer: Rc<Scope<'a>> },
}

impl<'a> Scope<'a> {
	fn lookup(self: &Rc<Self>, name: Name) -> Option<(&'a StagedTerm, Rc<Self>)> {
		let mut scope = self;
		loop {
			match scope.as_ref() {
				Scope::Empty => return None,
				Scope::Bound { name: bound, body, outer } if *bound == name => return Some((*body, outer.clone())),
				Scope::Bound { outer, .. } => scope = outer,
			}
		}
	}
}

struct Executor;

impl Executor {
	fn run<'a>(&self, term: &'a StagedTerm, scope: &Rc<Scope<'a>>) -> Result<Data, ExecutionError> {
		use StagedTerm as S;
		let all = |elements: &'a [StagedTerm]| -> Result<Vec<Data>, ExecutionError> {
			elements.iter().map(|element| self.run(element, scope)).collect()
		};
		Ok(match term {
			S::ByteTag(n) => Data::Byte(*n),
			S::ShortTag(n) => Data::Short(*n),
			S::IntTag(n) => Data::Int(*n),
			S::LongTag(n) => Data::Long(*n),
			S::FloatTag(n) => Data::Float(*n),
			S::DoubleTag(n) => Data::Double(*n),
			S::StringTag(s) => Data::String(s.clone()),

			S::ByteArrayTag(elements) => Data::ByteArray(
				all(elements)?
					.into_iter()
					.map(|data| match data {
						Data::Byte(n) => Ok(n),
						data => Err(ExecutionError::WrongShape(data)),
					})
					.collect::<Result<_, _>>()?,
			),
			S::IntArrayTag(elements) => Data::IntArray(
				all(elements)?
					.into_iter()
					.map(|data| match data {
						Data::Int(n) => Ok(n),
						data => Err(ExecutionError::WrongShape(data)),
					})
					.collect::<Result<_, _>>()?,
			),
			S::LongArrayTag(elements) => Data::LongArray(
				all(elements)?
					.into_iter()
					.map(|data| match data {
						Data::Long(n) => Ok(n),
						data => Err(ExecutionError::WrongShape(data)),
					})
					.collect::<Result<_, _>>()?,
			),
			S::ListTag(elements) => Data::List(all(elements)?),
			S::CompoundTag(fields) => Data::Compound(
				fields.iter().map(|(name, field)| Ok((*name, self.run(field, scope)?))).collect::<Result<_, ExecutionError>>()?,
			),

			S::Function { name, body, tail } =>
				self.run(tail, &rc!(Scope::Bound { name: *name, body: body.as_ref(), outer: scope.clone() }))?,
			// Bodies run once per reference, under the scope of their definition.
			S::Run(name) => match scope.lookup(*name) {
				Some((body, definition)) => self.run(body, &definition)?,
				None => return Err(ExecutionError::UnboundFunction(*name)),
			},
		})
	}
}

#[cfg(test)]
mod tests {
	use lasso::Rodeo;

	use super::*;
	use crate::common::bx;

	#[test]
	fn functions_run_their_bodies() {
		let mut interner = Rodeo::new();
		let f = interner.get_or_intern("f");
		let term = StagedTerm::Function { name: f, body: bx!(StagedTerm::IntTag(5)), tail: bx!(StagedTerm::Run(f)) };
		assert_eq!(execute(&term).ok(), Some(Data::Int(5)));
	}

	#[test]
	fn bodies_see_their_definition_scope() {
		// function f = 1; function g = f; function f = 2; g
		let mut interner = Rodeo::new();
		let (f, g) = (interner.get_or_intern("f"), interner.get_or_intern("g"));
		let term = StagedTerm::Function {
			name: f,
			body: bx!(StagedTerm::IntTag(1)),
			tail: bx!(StagedTerm::Function {
				name: g,
				body: bx!(StagedTerm::Run(f)),
				tail: bx!(StagedTerm::Function { name: f, body: bx!(StagedTerm::IntTag(2)), tail: bx!(StagedTerm::Run(g)) }),
			}),
		};
		assert_eq!(execute(&term).ok(), Some(Data::Int(1)));
	}

	#[test]
	fn functions_cannot_call_themselves() {
		let mut interner = Rodeo::new();
		let f = interner.get_or_intern("f");
		let term = StagedTerm::Function { name: f, body: bx!(StagedTerm::Run(f)), tail: bx!(StagedTerm::Run(f)) };
		assert!(matches!(execute(&term), Err(ExecutionError::UnboundFunction(name)) if name == f));
	}

	#[test]
	fn arrays_pack_their_elements() {
		let term = StagedTerm::ByteArrayTag(vec![StagedTerm::ByteTag(1), StagedTerm::ByteTag(-1)]);
		assert_eq!(execute(&term).ok(), Some(Data::ByteArray(vec![1, -1])));
		let term = StagedTerm::IntArrayTag(vec![StagedTerm::ByteTag(1)]);
		assert!(matches!(execute(&term), Err(ExecutionError::WrongShape(Data::Byte(1)))));
	}
}
