use std::rc::Rc;

use crate::{
	common::{rc, Binder, Closure, Label, Level},
	ir::{
		semantics::{Environment, Lazy, MetaNeutral, MetaValue, ObjectTermValue, ObjectTypeValue},
		syntax::{MetaTerm, ObjectTerm, ObjectType},
	},
};

pub trait Reflect {
	type Value;
	/// Transforms a closed core term into a value.
	fn reflect(&self) -> Self::Value { self.reflect_in(&Environment::default()) }

	fn reflect_in(&self, environment: &Environment) -> Self::Value;
}

pub trait ReflectWith {
	/// Invokes a closure on an argument.
	fn reflect_with(&self, argument: Rc<Lazy>) -> MetaValue;
}

pub trait ReflectAuto {
	/// Invokes a closure on a rigid variable standing at `level`.
	fn reflect_auto(&self, level: Level) -> MetaValue;
}

impl ReflectWith for Closure<Environment, MetaTerm> {
	fn reflect_with(&self, argument: Rc<Lazy>) -> MetaValue { self.body.reflect_in(&self.environment.extend(argument)) }
}

impl ReflectAuto for Closure<Environment, MetaTerm> {
	fn reflect_auto(&self, level: Level) -> MetaValue { self.reflect_with(Lazy::ready((self.parameter, level).into())) }
}

impl Reflect for Binder<Label, Box<MetaTerm>> {
	type Value = Closure<Environment, MetaTerm>;
	fn reflect_in(&self, environment: &Environment) -> Self::Value {
		Closure::new(environment.clone(), self.parameter, self.body.as_ref().clone())
	}
}

impl Reflect for ObjectType {
	type Value = ObjectTypeValue;
	fn reflect_in(&self, environment: &Environment) -> Self::Value {
		use ObjectType as T;
		use ObjectTypeValue as V;
		match self {
			T::End => V::End,
			T::Byte => V::Byte,
			T::Short => V::Short,
			T::Int => V::Int,
			T::Long => V::Long,
			T::Float => V::Float,
			T::Double => V::Double,
			T::String => V::String,

			T::Collection(element) => V::Collection(rc!(element.reflect_in(environment))),
			T::ByteArray => V::ByteArray,
			T::IntArray => V::IntArray,
			T::LongArray => V::LongArray,
			T::List(element) => V::List(rc!(element.reflect_in(environment))),
			T::Compound(fields) =>
				V::Compound(fields.iter().map(|(name, field)| (*name, field.reflect_in(environment))).collect()),

			T::Splice(splicee) => match splicee.reflect_in(environment) {
				MetaValue::QuoteObjectType(ty) => ty.as_ref().clone(),
				MetaValue::Neutral(neutral) => V::Splice(rc!(neutral)),
				_ => unreachable!("spliced a value that is not an object type quotation"),
			},

			T::Hole => V::Hole,
		}
	}
}

impl Reflect for ObjectTerm {
	type Value = ObjectTermValue;
	fn reflect_in(&self, environment: &Environment) -> Self::Value {
		use ObjectTerm as T;
		use ObjectTermValue as V;
		let all = |elements: &[ObjectTerm]| -> Vec<ObjectTermValue> { elements.iter().map(|element| element.reflect_in(environment)).collect() };
		match self {
			T::ByteTag(n) => V::ByteTag(*n),
			T::ShortTag(n) => V::ShortTag(*n),
			T::IntTag(n) => V::IntTag(*n),
			T::LongTag(n) => V::LongTag(*n),
			T::FloatTag(n) => V::FloatTag(*n),
			T::DoubleTag(n) => V::DoubleTag(*n),
			T::StringTag(s) => V::StringTag(s.clone()),

			T::ByteArrayTag(elements) => V::ByteArrayTag(all(elements)),
			T::IntArrayTag(elements) => V::IntArrayTag(all(elements)),
			T::LongArrayTag(elements) => V::LongArrayTag(all(elements)),
			T::ListTag(elements) => V::ListTag(all(elements)),
			T::CompoundTag(fields) =>
				V::CompoundTag(fields.iter().map(|(name, field)| (*name, field.reflect_in(environment))).collect()),

			T::Function { name, body, tail } =>
				V::Function { name: *name, body: rc!(body.reflect_in(environment)), tail: rc!(tail.reflect_in(environment)) },
			T::Run(name) => V::Run(*name),

			T::Splice(splicee) => match splicee.reflect_in(environment) {
				MetaValue::QuoteObjectTerm(term) => term.as_ref().clone(),
				MetaValue::Neutral(neutral) => V::Splice(rc!(neutral)),
				value => V::Unquoted(rc!(value)),
			},

			T::Hole => V::Hole,
		}
	}
}

impl Reflect for MetaTerm {
	type Value = MetaValue;
	fn reflect_in(&self, environment: &Environment) -> Self::Value {
		use MetaTerm as T;
		use MetaValue as V;
		let all = |elements: &[MetaTerm]| -> Vec<MetaValue> { elements.iter().map(|element| element.reflect_in(environment)).collect() };
		let boxed = |term: &MetaTerm| rc!(term.reflect_in(environment));
		match self {
			// Variables.
			T::Var(_, level) => environment.lookup(*level),
			T::Meta(index) => V::Neutral(MetaNeutral::Meta(*index)),
			T::Hole => V::hole(),

			// Let-expressions.
			T::Let { init, tail } =>
				tail.body.reflect_in(&environment.extend(Lazy::new(environment.clone(), init.as_ref().clone()))),

			// Types.
			T::Universe => V::Universe,
			T::End => V::End,
			T::Byte => V::Byte,
			T::Short => V::Short,
			T::Int => V::Int,
			T::Long => V::Long,
			T::Float => V::Float,
			T::Double => V::Double,
			T::String => V::String,
			T::ByteArray => V::ByteArray,
			T::IntArray => V::IntArray,
			T::LongArray => V::LongArray,
			T::List(element) => V::List(boxed(element)),
			T::Compound(fields) =>
				V::Compound(fields.iter().map(|(name, field)| (*name, field.reflect_in(environment))).collect()),
			T::Node => V::Node,
			T::ObjectType => V::ObjectType,
			T::Code(ty) => V::Code(rc!(ty.reflect_in(environment))),
			T::MetaCode(ty) => V::MetaCode(boxed(ty)),

			// Dependent functions.
			T::FunType { domain, codomain } =>
				V::FunType { domain: boxed(domain), codomain: rc!(codomain.reflect_in(environment)) },
			T::Abs { domain, body } => V::Abs { domain: boxed(domain), body: rc!(body.reflect_in(environment)) },
			T::Apply { operator, operand } => operator
				.reflect_in(environment)
				.apply(Lazy::new(environment.clone(), operand.as_ref().clone())),

			// Data.
			T::ByteTag(n) => V::ByteTag(*n),
			T::ShortTag(n) => V::ShortTag(*n),
			T::IntTag(n) => V::IntTag(*n),
			T::LongTag(n) => V::LongTag(*n),
			T::FloatTag(n) => V::FloatTag(*n),
			T::DoubleTag(n) => V::DoubleTag(*n),
			T::StringTag(s) => V::StringTag(s.clone()),
			T::ByteArrayTag(elements) => V::ByteArrayTag(all(elements)),
			T::IntArrayTag(elements) => V::IntArrayTag(all(elements)),
			T::LongArrayTag(elements) => V::LongArrayTag(all(elements)),
			T::ListTag(elements) => V::ListTag(all(elements)),
			T::CompoundTag(fields) =>
				V::CompoundTag(fields.iter().map(|(name, field)| (*name, field.reflect_in(environment))).collect()),

			// Paths.
			T::MatchWholeValue(pattern) => V::MatchWholeValue(boxed(pattern)),
			T::MatchElement(pattern) => V::MatchElement(boxed(pattern)),
			T::AllElements => V::AllElements,
			T::ElementAt(index) => V::ElementAt(boxed(index)),
			T::FieldNamed(name) => V::FieldNamed(*name),
			T::Get { target, path } => V::get(target.reflect_in(environment), path.reflect_in(environment)),

			// Staging.
			T::QuoteObjectType(ty) => V::QuoteObjectType(rc!(ty.reflect_in(environment))),
			T::QuoteObjectTerm(term) => V::QuoteObjectTerm(rc!(term.reflect_in(environment))),
			T::QuoteMetaTerm(term) => V::QuoteMetaTerm(boxed(term)),
			T::Splice(splicee) => splicee.reflect_in(environment).splice(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::common::{bind, bx};

	#[test]
	fn application_beta_reduces() {
		// (\x: Int => x) 7
		let term = MetaTerm::Apply {
			operator: bx!(MetaTerm::Abs { domain: bx!(MetaTerm::Int), body: bind(None, bx!(MetaTerm::Var(None, Level(0)))) }),
			operand: bx!(MetaTerm::IntTag(7)),
		};
		assert!(matches!(term.reflect(), MetaValue::IntTag(7)));
	}

	#[test]
	fn let_bindings_never_survive_reflection() {
		let term = MetaTerm::Let {
			init: bx!(MetaTerm::ByteTag(2)),
			tail: bind(None, bx!(MetaTerm::ListTag(vec![MetaTerm::Var(None, Level(0)), MetaTerm::Var(None, Level(0))]))),
		};
		let MetaValue::ListTag(elements) = term.reflect() else { panic!() };
		assert!(matches!(elements.as_slice(), [MetaValue::ByteTag(2), MetaValue::ByteTag(2)]));
	}

	#[test]
	fn splicing_a_quotation_inlines_it() {
		let term = ObjectTerm::Splice(bx!(MetaTerm::QuoteObjectTerm(bx!(ObjectTerm::ByteTag(1)))));
		assert!(matches!(term.reflect(), ObjectTermValue::ByteTag(1)));
	}

	#[test]
	fn unused_arguments_are_never_forced() {
		// The operand refers past the end of the environment and panics if forced.
		let term = MetaTerm::Apply {
			operator: bx!(MetaTerm::Abs { domain: bx!(MetaTerm::Int), body: bind(None, bx!(MetaTerm::IntTag(1))) }),
			operand: bx!(MetaTerm::Var(None, Level(5))),
		};
		assert!(matches!(term.reflect(), MetaValue::IntTag(1)));
	}
}
