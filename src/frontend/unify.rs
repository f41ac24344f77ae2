use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::{
	common::{rc, Closure, Level, Name, Range},
	config::Config,
	frontend::{reflect::ReflectAuto, reify::Reify},
	ir::{
		semantics::{Environment, MetaNeutral, MetaValue, ObjectTypeValue},
		syntax::MetaTerm,
	},
};

/// The metavariable store of one elaboration run.
///
/// Slots are only ever appended, and a solved slot is never reassigned.
#[derive(Clone, Default, Debug)]
pub struct Unifier {
	solutions: Vec<Option<MetaValue>>,
	origins: Vec<Range>,
	occurs_check: bool,
}

pub trait Unify<T: ?Sized> {
	/// Decides whether two values are equal, solving metavariables on the way.
	fn unify(&mut self, level: Level, left: &T, right: &T) -> bool;
}

impl Unifier {
	pub fn new(config: &Config) -> Self { Self { occurs_check: config.occurs_check, ..Self::default() } }

	/// Allocates an unsolved metavariable arising from the given source range.
	pub fn fresh(&mut self, origin: Range) -> MetaTerm {
		let index = self.solutions.len();
		self.solutions.push(None);
		self.origins.push(origin);
		trace!(index, "allocated metavariable");
		MetaTerm::Meta(index)
	}

	pub fn len(&self) -> usize { self.solutions.len() }

	pub fn is_empty(&self) -> bool { self.solutions.is_empty() }

	pub fn solution(&self, index: usize) -> Option<&MetaValue> { self.solutions.get(index)?.as_ref() }

	pub fn origin(&self, index: usize) -> Option<Range> { self.origins.get(index).copied() }

	/// Exposes the head of a value, following solved metavariables.
	pub fn force(&self, value: &MetaValue) -> MetaValue {
		match value {
			MetaValue::Neutral(neutral) => self.force_neutral(neutral),
			value => value.clone(),
		}
	}

	fn force_neutral(&self, neutral: &MetaNeutral) -> MetaValue {
		use MetaNeutral as N;
		match neutral {
			N::Meta(index) => match self.solution(*index) {
				Some(solution) => self.force(solution),
				None => MetaValue::Neutral(neutral.clone()),
			},
			N::Apply { operator, operand } => match self.force_neutral(operator) {
				MetaValue::Neutral(operator) => MetaValue::Neutral(N::Apply { operator: rc!(operator), operand: operand.clone() }),
				operator => self.force(&operator.apply(operand.clone())),
			},
			N::Splice(splicee) => match self.force_neutral(splicee) {
				MetaValue::Neutral(splicee) => MetaValue::Neutral(N::Splice(rc!(splicee))),
				splicee => self.force(&splicee.splice()),
			},
			N::Get { target, path } => match MetaValue::get(self.force(target), self.force(path)) {
				MetaValue::Neutral(stuck) => MetaValue::Neutral(stuck),
				selection => selection,
			},
			N::Variable(..) | N::Hole => MetaValue::Neutral(neutral.clone()),
		}
	}

	pub fn force_object_type(&self, ty: &ObjectTypeValue) -> ObjectTypeValue {
		match ty {
			ObjectTypeValue::Splice(splicee) => match self.force_neutral(splicee) {
				MetaValue::QuoteObjectType(ty) => self.force_object_type(&ty),
				MetaValue::Neutral(splicee) => ObjectTypeValue::Splice(rc!(splicee)),
				_ => unreachable!("spliced a value that is not an object type quotation"),
			},
			ty => ty.clone(),
		}
	}

	/// Records a solution, or checks a candidate against the existing one.
	pub fn solve(&mut self, level: Level, index: usize, candidate: &MetaValue) -> bool {
		if let Some(solution) = self.solution(index).cloned() {
			return self.unify(level, &solution, candidate);
		}
		if self.occurs_check && candidate.reify_in(level, self).mentions_meta(index) {
			debug!(index, "rejected cyclic metavariable solution");
			return false;
		}
		trace!(index, "solved metavariable");
		self.solutions[index] = Some(candidate.clone());
		true
	}

	/// Decides whether `sub` is an object subtype of `sup`.
	pub fn subtype(&mut self, level: Level, sub: &ObjectTypeValue, sup: &ObjectTypeValue) -> bool {
		use ObjectTypeValue as T;
		let (sub, sup) = (self.force_object_type(sub), self.force_object_type(sup));
		match (&sub, &sup) {
			(T::End, _) => true,
			// Unsolved splices may still be solved to either side.
			(T::Splice(_), _) | (_, T::Splice(_)) => self.unify(level, &sub, &sup),
			// Erroneous types conform both ways.
			(T::Hole, _) | (_, T::Hole) => true,
			(_, T::End) => false,
			(T::ByteArray, T::Collection(element)) => self.subtype(level, &T::Byte, element),
			(T::IntArray, T::Collection(element)) => self.subtype(level, &T::Int, element),
			(T::LongArray, T::Collection(element)) => self.subtype(level, &T::Long, element),
			(T::List(sub), T::List(sup) | T::Collection(sup)) | (T::Collection(sub), T::Collection(sup)) =>
				self.subtype(level, sub, sup),
			(T::Compound(sub), T::Compound(sup)) =>
				sub.len() == sup.len()
					&& sub.iter().all(|(name, sub)| sup.get(name).is_some_and(|sup| self.subtype(level, sub, sup))),
			_ => self.unify(level, &sub, &sup),
		}
	}

	fn unify_fields<T>(&mut self, level: Level, left: &IndexMap<Name, T>, right: &IndexMap<Name, T>) -> bool
	where
		Self: Unify<T>,
	{
		left.len() == right.len()
			&& left.iter().all(|(name, left)| right.get(name).is_some_and(|right| self.unify(level, left, right)))
	}

	fn unify_all(&mut self, level: Level, left: &[MetaValue], right: &[MetaValue]) -> bool {
		left.len() == right.len() && left.iter().zip(right).all(|(left, right)| self.unify(level, left, right))
	}

	fn unify_neutral(&mut self, level: Level, left: &MetaNeutral, right: &MetaNeutral) -> bool {
		use MetaNeutral as N;
		match (left, right) {
			(N::Variable(_, left), N::Variable(_, right)) => left == right,
			(N::Apply { operator: left_operator, operand: left }, N::Apply { operator: right_operator, operand: right }) =>
				self.unify_neutral(level, left_operator, right_operator) && self.unify(level, left.force(), right.force()),
			(N::Get { target: left_target, path: left }, N::Get { target: right_target, path: right }) =>
				self.unify(level, &**left_target, &**right_target) && self.unify(level, &**left, &**right),
			(N::Splice(left), N::Splice(right)) => self.unify_neutral(level, left, right),
			_ => false,
		}
	}
}

impl Unify<MetaValue> for Unifier {
	fn unify(&mut self, level: Level, left: &MetaValue, right: &MetaValue) -> bool {
		use MetaNeutral as N;
		use MetaValue as V;
		let (left, right) = (self.force(left), self.force(right));
		match (&left, &right) {
			// Metavariables.
			(V::Neutral(N::Meta(left)), V::Neutral(N::Meta(right))) if left == right => true,
			(V::Neutral(N::Meta(index)), other) | (other, V::Neutral(N::Meta(index))) => self.solve(level, *index, other),
			(V::Neutral(left), V::Neutral(right)) => self.unify_neutral(level, left, right),

			// Types.
			(V::Universe, V::Universe)
			| (V::End, V::End)
			| (V::Byte, V::Byte)
			| (V::Short, V::Short)
			| (V::Int, V::Int)
			| (V::Long, V::Long)
			| (V::Float, V::Float)
			| (V::Double, V::Double)
			| (V::String, V::String)
			| (V::ByteArray, V::ByteArray)
			| (V::IntArray, V::IntArray)
			| (V::LongArray, V::LongArray)
			| (V::Node, V::Node)
			| (V::ObjectType, V::ObjectType)
			| (V::AllElements, V::AllElements) => true,
			(V::List(left), V::List(right))
			| (V::MetaCode(left), V::MetaCode(right))
			| (V::MatchWholeValue(left), V::MatchWholeValue(right))
			| (V::MatchElement(left), V::MatchElement(right))
			| (V::ElementAt(left), V::ElementAt(right)) => self.unify(level, &**left, &**right),
			(V::Compound(left), V::Compound(right)) | (V::CompoundTag(left), V::CompoundTag(right)) =>
				self.unify_fields(level, left, right),
			(V::Code(left), V::Code(right)) => self.unify(level, &**left, &**right),

			// Dependent functions.
			(V::FunType { domain: left_domain, codomain: left }, V::FunType { domain: right_domain, codomain: right }) =>
				self.unify(level, &**left_domain, &**right_domain) && self.unify(level, &**left, &**right),
			(V::Abs { body: left, .. }, V::Abs { body: right, .. }) => self.unify(level, &**left, &**right),

			// Data.
			(V::ByteTag(left), V::ByteTag(right)) => left == right,
			(V::ShortTag(left), V::ShortTag(right)) => left == right,
			(V::IntTag(left), V::IntTag(right)) => left == right,
			(V::LongTag(left), V::LongTag(right)) => left == right,
			(V::FloatTag(left), V::FloatTag(right)) => left.to_bits() == right.to_bits(),
			(V::DoubleTag(left), V::DoubleTag(right)) => left.to_bits() == right.to_bits(),
			(V::StringTag(left), V::StringTag(right)) => left == right,
			(V::ByteArrayTag(left), V::ByteArrayTag(right))
			| (V::IntArrayTag(left), V::IntArrayTag(right))
			| (V::LongArrayTag(left), V::LongArrayTag(right))
			| (V::ListTag(left), V::ListTag(right)) => self.unify_all(level, left, right),
			(V::FieldNamed(left), V::FieldNamed(right)) => left == right,

			// Quotations and holes are never equal.
			_ => false,
		}
	}
}

impl Unify<ObjectTypeValue> for Unifier {
	fn unify(&mut self, level: Level, left: &ObjectTypeValue, right: &ObjectTypeValue) -> bool {
		use ObjectTypeValue as T;
		let (left, right) = (self.force_object_type(left), self.force_object_type(right));
		match (&left, &right) {
			(T::Splice(left), T::Splice(right)) =>
				self.unify(level, &MetaValue::Neutral(left.as_ref().clone()), &MetaValue::Neutral(right.as_ref().clone())),
			(T::Splice(splicee), ty) | (ty, T::Splice(splicee)) => match splicee.as_ref() {
				MetaNeutral::Meta(index) => self.solve(level, *index, &MetaValue::QuoteObjectType(rc!(ty.clone()))),
				_ => false,
			},
			(T::End, T::End)
			| (T::Byte, T::Byte)
			| (T::Short, T::Short)
			| (T::Int, T::Int)
			| (T::Long, T::Long)
			| (T::Float, T::Float)
			| (T::Double, T::Double)
			| (T::String, T::String)
			| (T::ByteArray, T::ByteArray)
			| (T::IntArray, T::IntArray)
			| (T::LongArray, T::LongArray) => true,
			(T::Collection(left), T::Collection(right)) | (T::List(left), T::List(right)) =>
				self.unify(level, &**left, &**right),
			(T::Compound(left), T::Compound(right)) => self.unify_fields(level, left, right),
			_ => false,
		}
	}
}

impl Unify<Closure<Environment, MetaTerm>> for Unifier {
	fn unify(&mut self, level: Level, left: &Closure<Environment, MetaTerm>, right: &Closure<Environment, MetaTerm>) -> bool {
		self.unify(level + 1, &left.reflect_auto(level), &right.reflect_auto(level))
	}
}
