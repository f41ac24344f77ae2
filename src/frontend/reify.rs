use crate::{
	common::{bind, bx, Binder, Closure, Label, Level},
	frontend::{reflect::ReflectAuto, unify::Unifier},
	ir::{
		semantics::{Environment, MetaNeutral, MetaValue, ObjectTermValue, ObjectTypeValue},
		syntax::{MetaTerm, ObjectTerm, ObjectType},
	},
};

/// Reads a value back into core syntax, following solved metavariables.
pub trait Reify {
	type Term;
	fn reify(&self, unifier: &Unifier) -> Self::Term { self.reify_in(Level(0), unifier) }

	fn reify_in(&self, level: Level, unifier: &Unifier) -> Self::Term;
}

impl Reify for Closure<Environment, MetaTerm> {
	type Term = Binder<Label, Box<MetaTerm>>;
	fn reify_in(&self, level: Level, unifier: &Unifier) -> Self::Term {
		bind(self.parameter, bx!(self.reflect_auto(level).reify_in(level + 1, unifier)))
	}
}

impl Reify for ObjectTypeValue {
	type Term = ObjectType;
	fn reify_in(&self, level: Level, unifier: &Unifier) -> Self::Term {
		use ObjectType as T;
		use ObjectTypeValue as V;
		match unifier.force_object_type(self) {
			V::End => T::End,
			V::Byte => T::Byte,
			V::Short => T::Short,
			V::Int => T::Int,
			V::Long => T::Long,
			V::Float => T::Float,
			V::Double => T::Double,
			V::String => T::String,

			V::Collection(element) => T::Collection(bx!(element.reify_in(level, unifier))),
			V::ByteArray => T::ByteArray,
			V::IntArray => T::IntArray,
			V::LongArray => T::LongArray,
			V::List(element) => T::List(bx!(element.reify_in(level, unifier))),
			V::Compound(fields) =>
				T::Compound(fields.iter().map(|(name, field)| (*name, field.reify_in(level, unifier))).collect()),

			V::Splice(splicee) => T::Splice(bx!(splicee.reify_in(level, unifier))),

			V::Hole => T::Hole,
		}
	}
}

impl Reify for ObjectTermValue {
	type Term = ObjectTerm;
	fn reify_in(&self, level: Level, unifier: &Unifier) -> Self::Term {
		use ObjectTerm as T;
		use ObjectTermValue as V;
		let all = |elements: &[ObjectTermValue]| -> Vec<ObjectTerm> {
			elements.iter().map(|element| element.reify_in(level, unifier)).collect()
		};
		match self {
			V::ByteTag(n) => T::ByteTag(*n),
			V::ShortTag(n) => T::ShortTag(*n),
			V::IntTag(n) => T::IntTag(*n),
			V::LongTag(n) => T::LongTag(*n),
			V::FloatTag(n) => T::FloatTag(*n),
			V::DoubleTag(n) => T::DoubleTag(*n),
			V::StringTag(s) => T::StringTag(s.clone()),

			V::ByteArrayTag(elements) => T::ByteArrayTag(all(elements)),
			V::IntArrayTag(elements) => T::IntArrayTag(all(elements)),
			V::LongArrayTag(elements) => T::LongArrayTag(all(elements)),
			V::ListTag(elements) => T::ListTag(all(elements)),
			V::CompoundTag(fields) =>
				T::CompoundTag(fields.iter().map(|(name, field)| (*name, field.reify_in(level, unifier))).collect()),

			V::Function { name, body, tail } =>
				T::Function { name: *name, body: bx!(body.reify_in(level, unifier)), tail: bx!(tail.reify_in(level, unifier)) },
			V::Run(name) => T::Run(*name),

			V::Splice(splicee) => match unifier.force(&MetaValue::Neutral(splicee.as_ref().clone())) {
				MetaValue::QuoteObjectTerm(term) => term.reify_in(level, unifier),
				splicee => T::Splice(bx!(splicee.reify_in(level, unifier))),
			},
			V::Unquoted(splicee) => T::Splice(bx!(splicee.reify_in(level, unifier))),

			V::Hole => T::Hole,
		}
	}
}

impl Reify for MetaValue {
	type Term = MetaTerm;
	fn reify_in(&self, level: Level, unifier: &Unifier) -> Self::Term {
		use MetaTerm as T;
		use MetaValue as V;
		let all = |elements: &[MetaValue]| -> Vec<MetaTerm> {
			elements.iter().map(|element| element.reify_in(level, unifier)).collect()
		};
		match unifier.force(self) {
			// Neutrals.
			V::Neutral(neutral) => neutral.reify_in(level, unifier),

			// Types.
			V::Universe => T::Universe,
			V::End => T::End,
			V::Byte => T::Byte,
			V::Short => T::Short,
			V::Int => T::Int,
			V::Long => T::Long,
			V::Float => T::Float,
			V::Double => T::Double,
			V::String => T::String,
			V::ByteArray => T::ByteArray,
			V::IntArray => T::IntArray,
			V::LongArray => T::LongArray,
			V::List(element) => T::List(bx!(element.reify_in(level, unifier))),
			V::Compound(fields) =>
				T::Compound(fields.iter().map(|(name, field)| (*name, field.reify_in(level, unifier))).collect()),
			V::Node => T::Node,
			V::ObjectType => T::ObjectType,
			V::Code(ty) => T::Code(bx!(ty.reify_in(level, unifier))),
			V::MetaCode(ty) => T::MetaCode(bx!(ty.reify_in(level, unifier))),

			// Dependent functions.
			V::FunType { domain, codomain } =>
				T::FunType { domain: bx!(domain.reify_in(level, unifier)), codomain: codomain.reify_in(level, unifier) },
			V::Abs { domain, body } =>
				T::Abs { domain: bx!(domain.reify_in(level, unifier)), body: body.reify_in(level, unifier) },

			// Data.
			V::ByteTag(n) => T::ByteTag(n),
			V::ShortTag(n) => T::ShortTag(n),
			V::IntTag(n) => T::IntTag(n),
			V::LongTag(n) => T::LongTag(n),
			V::FloatTag(n) => T::FloatTag(n),
			V::DoubleTag(n) => T::DoubleTag(n),
			V::StringTag(s) => T::StringTag(s),
			V::ByteArrayTag(elements) => T::ByteArrayTag(all(&elements)),
			V::IntArrayTag(elements) => T::IntArrayTag(all(&elements)),
			V::LongArrayTag(elements) => T::LongArrayTag(all(&elements)),
			V::ListTag(elements) => T::ListTag(all(&elements)),
			V::CompoundTag(fields) =>
				T::CompoundTag(fields.iter().map(|(name, field)| (*name, field.reify_in(level, unifier))).collect()),

			// Paths.
			V::MatchWholeValue(pattern) => T::MatchWholeValue(bx!(pattern.reify_in(level, unifier))),
			V::MatchElement(pattern) => T::MatchElement(bx!(pattern.reify_in(level, unifier))),
			V::AllElements => T::AllElements,
			V::ElementAt(index) => T::ElementAt(bx!(index.reify_in(level, unifier))),
			V::FieldNamed(name) => T::FieldNamed(name),

			// Staging.
			V::QuoteObjectType(ty) => T::QuoteObjectType(bx!(ty.reify_in(level, unifier))),
			V::QuoteObjectTerm(term) => T::QuoteObjectTerm(bx!(term.reify_in(level, unifier))),
			V::QuoteMetaTerm(term) => T::QuoteMetaTerm(bx!(term.reify_in(level, unifier))),
		}
	}
}

impl Reify for MetaNeutral {
	type Term = MetaTerm;
	fn reify_in(&self, level: Level, unifier: &Unifier) -> Self::Term {
		use MetaNeutral as N;
		use MetaTerm as T;
		match self {
			N::Variable(name, level) => T::Var(*name, *level),
			N::Meta(index) => T::Meta(*index),
			N::Hole => T::Hole,
			N::Apply { operator, operand } => T::Apply {
				operator: bx!(operator.reify_in(level, unifier)),
				operand: bx!(operand.force().reify_in(level, unifier)),
			},
			N::Get { target, path } =>
				T::Get { target: bx!(target.reify_in(level, unifier)), path: bx!(path.reify_in(level, unifier)) },
			N::Splice(splicee) => T::Splice(bx!(splicee.reify_in(level, unifier))),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::frontend::reflect::Reflect;

	#[test]
	fn function_types_read_back_at_fresh_levels() {
		// (x: Type) -> List(x), reified under one enclosing binder.
		let ty = MetaTerm::FunType {
			domain: bx!(MetaTerm::Universe),
			codomain: bind(None, bx!(MetaTerm::List(bx!(MetaTerm::Var(None, Level(1)))))),
		};
		let environment = Environment(vec![crate::ir::semantics::Lazy::ready(MetaValue::Int)]);
		let value = ty.reflect_in(&environment);
		assert_eq!(value.reify_in(Level(1), &Unifier::default()), ty);
	}

	#[test]
	fn normalization_is_idempotent() {
		let term = MetaTerm::Let {
			init: bx!(MetaTerm::Abs { domain: bx!(MetaTerm::Int), body: bind(None, bx!(MetaTerm::Var(None, Level(0)))) }),
			tail: bind(None, bx!(MetaTerm::Apply { operator: bx!(MetaTerm::Var(None, Level(0))), operand: bx!(MetaTerm::IntTag(4)) })),
		};
		let unifier = Unifier::default();
		let once = term.reflect().reify(&unifier);
		assert_eq!(once, MetaTerm::IntTag(4));
		assert_eq!(once.reflect().reify(&unifier), once);
	}
}
