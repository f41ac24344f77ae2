use indexmap::IndexSet;
use tracing::debug;

use crate::{
	common::{bind, bx, Binder, Label, Level},
	frontend::{
		elaborate::{Diagnostic, DiagnosticKind},
		reify::Reify as _,
		unify::Unifier,
	},
	ir::syntax::{MetaTerm, ObjectTerm, ObjectType},
};

pub struct Zonked {
	pub term: ObjectTerm,
	pub ty: ObjectType,
	pub diagnostics: Vec<Diagnostic>,
}

/// Substitutes every solved metavariable in an elaborated program by its solution.
///
/// Each metavariable left unsolved is reported once, at the range it was created for.
pub fn zonk(term: ObjectTerm, ty: ObjectType, unifier: &Unifier) -> Zonked {
	let mut zonker = Zonker { unifier, unsolved: IndexSet::new() };
	let term = zonker.object_term(term, Level(0));
	let ty = zonker.object_type(ty, Level(0));
	let diagnostics: Vec<_> = zonker
		.unsolved
		.iter()
		.map(|&index| DiagnosticKind::UnsolvedMetavariable(index).at(unifier.origin(index).unwrap_or_default()))
		.collect();
	debug!(unsolved = diagnostics.len(), "zonked program");
	Zonked { term, ty, diagnostics }
}

struct Zonker<'u> {
	unifier: &'u Unifier,
	unsolved: IndexSet<usize>,
}

impl<'u> Zonker<'u> {
	fn object_type(&mut self, ty: ObjectType, level: Level) -> ObjectType {
		use ObjectType as T;
		match ty {
			T::Collection(element) => T::Collection(bx!(self.object_type(*element, level))),
			T::List(element) => T::List(bx!(self.object_type(*element, level))),
			T::Compound(fields) =>
				T::Compound(fields.into_iter().map(|(name, field)| (name, self.object_type(field, level))).collect()),
			T::Splice(splicee) => match self.meta_term(*splicee, level) {
				MetaTerm::QuoteObjectType(ty) => *ty,
				splicee => T::Splice(bx!(splicee)),
			},
			ty => ty,
		}
	}

	fn object_term(&mut self, term: ObjectTerm, level: Level) -> ObjectTerm {
		use ObjectTerm as T;
		let mut all = |elements: Vec<ObjectTerm>| -> Vec<ObjectTerm> {
			elements.into_iter().map(|element| self.object_term(element, level)).collect()
		};
		match term {
			T::ByteArrayTag(elements) => T::ByteArrayTag(all(elements)),
			T::IntArrayTag(elements) => T::IntArrayTag(all(elements)),
			T::LongArrayTag(elements) => T::LongArrayTag(all(elements)),
			T::ListTag(elements) => T::ListTag(all(elements)),
			T::CompoundTag(fields) =>
				T::CompoundTag(fields.into_iter().map(|(name, field)| (name, self.object_term(field, level))).collect()),
			T::Function { name, body, tail } => T::Function {
				name,
				body: bx!(self.object_term(*body, level)),
				tail: bx!(self.object_term(*tail, level)),
			},
			T::Splice(splicee) => T::Splice(bx!(self.meta_term(*splicee, level))),
			term => term,
		}
	}

	fn binder(&mut self, binder: Binder<Label, Box<MetaTerm>>, level: Level) -> Binder<Label, Box<MetaTerm>> {
		bind(binder.parameter, bx!(self.meta_term(*binder.body, level + 1)))
	}

	fn meta_term(&mut self, term: MetaTerm, level: Level) -> MetaTerm {
		use MetaTerm as T;
		let mut all = |elements: Vec<MetaTerm>| -> Vec<MetaTerm> {
			elements.into_iter().map(|element| self.meta_term(element, level)).collect()
		};
		match term {
			T::Meta(index) => match self.unifier.solution(index) {
				// Solutions may mention other metavariables that are still unsolved.
				Some(solution) => {
					let solution = solution.reify_in(level, self.unifier);
					self.meta_term(solution, level)
				}
				None => {
					self.unsolved.insert(index);
					T::Meta(index)
				}
			},

			T::ByteArrayTag(elements) => T::ByteArrayTag(all(elements)),
			T::IntArrayTag(elements) => T::IntArrayTag(all(elements)),
			T::LongArrayTag(elements) => T::LongArrayTag(all(elements)),
			T::ListTag(elements) => T::ListTag(all(elements)),

			T::Let { init, tail } => T::Let { init: bx!(self.meta_term(*init, level)), tail: self.binder(tail, level) },
			T::List(element) => T::List(bx!(self.meta_term(*element, level))),
			T::Compound(fields) =>
				T::Compound(fields.into_iter().map(|(name, field)| (name, self.meta_term(field, level))).collect()),
			T::CompoundTag(fields) =>
				T::CompoundTag(fields.into_iter().map(|(name, field)| (name, self.meta_term(field, level))).collect()),
			T::Code(ty) => T::Code(bx!(self.object_type(*ty, level))),
			T::MetaCode(ty) => T::MetaCode(bx!(self.meta_term(*ty, level))),

			T::FunType { domain, codomain } =>
				T::FunType { domain: bx!(self.meta_term(*domain, level)), codomain: self.binder(codomain, level) },
			T::Abs { domain, body } => T::Abs { domain: bx!(self.meta_term(*domain, level)), body: self.binder(body, level) },
			T::Apply { operator, operand } =>
				T::Apply { operator: bx!(self.meta_term(*operator, level)), operand: bx!(self.meta_term(*operand, level)) },

			T::MatchWholeValue(pattern) => T::MatchWholeValue(bx!(self.meta_term(*pattern, level))),
			T::MatchElement(pattern) => T::MatchElement(bx!(self.meta_term(*pattern, level))),
			T::ElementAt(index) => T::ElementAt(bx!(self.meta_term(*index, level))),
			T::Get { target, path } =>
				T::Get { target: bx!(self.meta_term(*target, level)), path: bx!(self.meta_term(*path, level)) },

			T::QuoteObjectType(ty) => T::QuoteObjectType(bx!(self.object_type(*ty, level))),
			T::QuoteObjectTerm(term) => T::QuoteObjectTerm(bx!(self.object_term(*term, level))),
			T::QuoteMetaTerm(term) => T::QuoteMetaTerm(bx!(self.meta_term(*term, level))),
			T::Splice(splicee) => T::Splice(bx!(self.meta_term(*splicee, level))),

			term => term,
		}
	}
}
