use std::{
	cell::{Cell, OnceCell},
	fmt,
	rc::Rc,
};

use indexmap::IndexMap;

use super::syntax::MetaTerm;
use crate::{
	common::{rc, Closure, Label, Level, Name},
	frontend::reflect::{Reflect, ReflectWith},
};

#[derive(Clone, Debug)]
pub enum ObjectTypeValue {
	// Scalars.
	End,
	Byte,
	Short,
	Int,
	Long,
	Float,
	Double,
	String,

	// Collections.
	Collection(Rc<Self>),
	ByteArray,
	IntArray,
	LongArray,
	List(Rc<Self>),
	Compound(IndexMap<Name, Self>),

	// Staging.
	Splice(Rc<MetaNeutral>),

	Hole,
}

#[derive(Clone, Debug)]
pub enum ObjectTermValue {
	// Scalars.
	ByteTag(i8),
	ShortTag(i16),
	IntTag(i32),
	LongTag(i64),
	FloatTag(f32),
	DoubleTag(f64),
	StringTag(String),

	// Collections.
	ByteArrayTag(Vec<Self>),
	IntArrayTag(Vec<Self>),
	LongArrayTag(Vec<Self>),
	ListTag(Vec<Self>),
	CompoundTag(IndexMap<Name, Self>),

	// Functions.
	Function { name: Name, body: Rc<Self>, tail: Rc<Self> },
	Run(Name),

	// Staging.
	Splice(Rc<MetaNeutral>),
	/// A splice whose splicee evaluated to something other than a quotation.
	Unquoted(Rc<MetaValue>),

	Hole,
}

#[derive(Clone, Debug)]
pub enum MetaValue {
	// Neutrals.
	Neutral(MetaNeutral),

	// Types.
	Universe,
	End,
	Byte,
	Short,
	Int,
	Long,
	Float,
	Double,
	String,
	ByteArray,
	IntArray,
	LongArray,
	List(Rc<Self>),
	Compound(IndexMap<Name, Self>),
	Node,
	ObjectType,
	Code(Rc<ObjectTypeValue>),
	MetaCode(Rc<Self>),

	// Dependent functions.
	FunType { domain: Rc<Self>, codomain: Rc<Closure<Environment, MetaTerm>> },
	Abs { domain: Rc<Self>, body: Rc<Closure<Environment, MetaTerm>> },

	// Data.
	ByteTag(i8),
	ShortTag(i16),
	IntTag(i32),
	LongTag(i64),
	FloatTag(f32),
	DoubleTag(f64),
	StringTag(String),
	ByteArrayTag(Vec<Self>),
	IntArrayTag(Vec<Self>),
	LongArrayTag(Vec<Self>),
	ListTag(Vec<Self>),
	CompoundTag(IndexMap<Name, Self>),

	// Paths.
	MatchWholeValue(Rc<Self>),
	MatchElement(Rc<Self>),
	AllElements,
	ElementAt(Rc<Self>),
	FieldNamed(Name),

	// Staging.
	QuoteObjectType(Rc<ObjectTypeValue>),
	QuoteObjectTerm(Rc<ObjectTermValue>),
	QuoteMetaTerm(Rc<Self>),
}

#[derive(Clone, Debug)]
pub enum MetaNeutral {
	// Variables.
	Variable(Label, Level),
	Meta(usize),
	Hole,

	// Eliminators.
	Apply { operator: Rc<Self>, operand: Rc<Lazy> },
	Get { target: Rc<MetaValue>, path: Rc<MetaValue> },
	Splice(Rc<Self>),
}

impl From<(Label, Level)> for MetaValue {
	fn from((name, level): (Label, Level)) -> Self { Self::Neutral(MetaNeutral::Variable(name, level)) }
}

impl MetaValue {
	pub fn hole() -> Self { Self::Neutral(MetaNeutral::Hole) }

	pub fn is_hole(&self) -> bool { matches!(self, Self::Neutral(MetaNeutral::Hole)) }

	pub fn apply(self, operand: Rc<Lazy>) -> Self {
		match self {
			Self::Abs { body, .. } => body.reflect_with(operand),
			Self::Neutral(operator) => Self::Neutral(MetaNeutral::Apply { operator: rc!(operator), operand }),
			_ => unreachable!("applied a value that is not a function"),
		}
	}

	pub fn splice(self) -> Self {
		match self {
			Self::QuoteMetaTerm(quotee) => quotee.as_ref().clone(),
			Self::Neutral(splicee) => Self::Neutral(MetaNeutral::Splice(rc!(splicee))),
			_ => unreachable!("spliced a value that is not a meta quotation"),
		}
	}

	/// Selects every value `path` reaches from `target`, or gets stuck.
	pub fn get(target: Self, path: Self) -> Self {
		match select(&target, &path) {
			Some(selection) => Self::ListTag(selection),
			None => Self::Neutral(MetaNeutral::Get { target: rc!(target), path: rc!(path) }),
		}
	}

	/// The elements of a list or array, if this is a literal collection.
	pub fn elements(&self) -> Option<&[Self]> {
		match self {
			Self::ByteArrayTag(elements)
			| Self::IntArrayTag(elements)
			| Self::LongArrayTag(elements)
			| Self::ListTag(elements) => Some(elements),
			_ => None,
		}
	}

	/// The element type of a list or array type.
	pub fn element_type(&self) -> Option<Self> {
		match self {
			Self::List(element) => Some(element.as_ref().clone()),
			Self::ByteArray => Some(Self::Byte),
			Self::IntArray => Some(Self::Int),
			Self::LongArray => Some(Self::Long),
			_ => None,
		}
	}
}

fn select(target: &MetaValue, path: &MetaValue) -> Option<Vec<MetaValue>> {
	let MetaValue::ListTag(nodes) = path else { return None };
	let mut selection = vec![target.clone()];
	for node in nodes {
		let mut next = Vec::new();
		for value in selection {
			if let MetaValue::Neutral(_) = value {
				return None;
			}
			match node {
				MetaValue::FieldNamed(name) =>
					if let MetaValue::CompoundTag(fields) = &value {
						next.extend(fields.get(name).cloned());
					},
				MetaValue::ElementAt(index) => {
					let MetaValue::IntTag(index) = **index else { return None };
					let elements = value.elements().unwrap_or_default();
					let index = if index < 0 { elements.len().checked_sub(index.unsigned_abs() as usize) } else { Some(index as usize) };
					next.extend(index.and_then(|index| elements.get(index)).cloned());
				}
				MetaValue::AllElements => next.extend(value.elements().unwrap_or_default().iter().cloned()),
				MetaValue::MatchElement(pattern) =>
					for element in value.elements().unwrap_or_default() {
						if matches(pattern, element)? {
							next.push(element.clone());
						}
					},
				MetaValue::MatchWholeValue(pattern) =>
					if matches(pattern, &value)? {
						next.push(value);
					},
				_ => return None,
			}
		}
		selection = next;
	}
	Some(selection)
}

// Decides whether `value` matches `pattern`, or `None` if either is stuck.
fn matches(pattern: &MetaValue, value: &MetaValue) -> Option<bool> {
	use MetaValue as V;
	Some(match (pattern, value) {
		(V::Neutral(_), _) | (_, V::Neutral(_)) => return None,
		(V::CompoundTag(pattern), V::CompoundTag(fields)) => {
			for (name, pattern) in pattern {
				match fields.get(name) {
					Some(field) if matches(pattern, field)? => (),
					_ => return Some(false),
				}
			}
			true
		}
		(V::ListTag(pattern) | V::ByteArrayTag(pattern) | V::IntArrayTag(pattern) | V::LongArrayTag(pattern), value) => {
			let Some(elements) = value.elements() else { return Some(false) };
			for pattern in pattern {
				let mut found = Some(false);
				for element in elements {
					match matches(pattern, element) {
						Some(true) => {
							found = Some(true);
							break;
						}
						Some(false) => (),
						None => found = None,
					}
				}
				if !found? {
					return Some(false);
				}
			}
			true
		}
		(V::ByteTag(p), V::ByteTag(v)) => p == v,
		(V::ShortTag(p), V::ShortTag(v)) => p == v,
		(V::IntTag(p), V::IntTag(v)) => p == v,
		(V::LongTag(p), V::LongTag(v)) => p == v,
		(V::FloatTag(p), V::FloatTag(v)) => p.to_bits() == v.to_bits(),
		(V::DoubleTag(p), V::DoubleTag(v)) => p.to_bits() == v.to_bits(),
		(V::StringTag(p), V::StringTag(v)) => p == v,
		_ => false,
	})
}

/// A call-by-need cell: evaluated at most once, on first demand.
pub struct Lazy {
	value: OnceCell<MetaValue>,
	thunk: Cell<Option<(Environment, MetaTerm)>>,
}

impl Lazy {
	pub fn new(environment: Environment, term: MetaTerm) -> Rc<Self> {
		rc!(Self { value: OnceCell::new(), thunk: Cell::new(Some((environment, term))) })
	}

	pub fn ready(value: MetaValue) -> Rc<Self> { rc!(Self { value: OnceCell::from(value), thunk: Cell::new(None) }) }

	pub fn force(&self) -> &MetaValue {
		self.value.get_or_init(|| match self.thunk.take() {
			Some((environment, term)) => term.reflect_in(&environment),
			None => unreachable!("lazy value forced while being forced"),
		})
	}
}

impl fmt::Debug for Lazy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.value.get() {
			Some(value) => value.fmt(f),
			None => write!(f, "<thunk>"),
		}
	}
}

#[derive(Clone, Default, Debug)]
pub struct Environment(pub Vec<Rc<Lazy>>);

impl Environment {
	pub fn level(&self) -> Level { Level(self.0.len()) }

	pub fn lookup(&self, Level(level): Level) -> MetaValue {
		match self.0.get(level) {
			Some(value) => value.force().clone(),
			None => panic!("variable at level {level} escaped its environment"),
		}
	}

	pub fn extend(&self, value: Rc<Lazy>) -> Self {
		let mut environment = self.clone();
		environment.push(value);
		environment
	}

	pub fn push(&mut self, value: Rc<Lazy>) { self.0.push(value) }

	pub fn pop(&mut self) { self.0.pop(); }
}

#[cfg(test)]
mod tests {
	use lasso::Rodeo;

	use super::*;

	#[test]
	fn lazy_values_are_forced_once() {
		let lazy = Lazy::new(Environment::default(), MetaTerm::IntTag(3));
		let first = lazy.force() as *const MetaValue;
		let second = lazy.force() as *const MetaValue;
		assert_eq!(first, second);
		assert!(matches!(lazy.force(), MetaValue::IntTag(3)));
	}

	#[test]
	fn get_projects_fields_and_elements() {
		let mut interner = Rodeo::new();
		let a = interner.get_or_intern("a");
		let target = MetaValue::CompoundTag(IndexMap::from([(
			a,
			MetaValue::ListTag(vec![MetaValue::IntTag(1), MetaValue::IntTag(2), MetaValue::IntTag(3)]),
		)]));
		let path = MetaValue::ListTag(vec![MetaValue::FieldNamed(a), MetaValue::ElementAt(rc!(MetaValue::IntTag(-1)))]);
		let MetaValue::ListTag(selection) = MetaValue::get(target, path) else { panic!() };
		assert!(matches!(selection.as_slice(), [MetaValue::IntTag(3)]));
	}

	#[test]
	fn get_filters_by_pattern() {
		let mut interner = Rodeo::new();
		let id = interner.get_or_intern("id");
		let entry = |n| MetaValue::CompoundTag(IndexMap::from([(id, MetaValue::IntTag(n))]));
		let target = MetaValue::ListTag(vec![entry(1), entry(2), entry(1)]);
		let path = MetaValue::ListTag(vec![MetaValue::MatchElement(rc!(entry(1)))]);
		let MetaValue::ListTag(selection) = MetaValue::get(target, path) else { panic!() };
		assert_eq!(selection.len(), 2);
	}

	fn selected(target: MetaValue, nodes: Vec<MetaValue>) -> Vec<MetaValue> {
		let MetaValue::ListTag(selection) = MetaValue::get(target, MetaValue::ListTag(nodes)) else { panic!("selection is stuck") };
		selection
	}

	fn numbers(values: &[MetaValue]) -> Vec<i64> {
		values
			.iter()
			.map(|value| match value {
				MetaValue::ByteTag(n) => i64::from(*n),
				MetaValue::IntTag(n) => i64::from(*n),
				MetaValue::LongTag(n) => *n,
				value => panic!("not a number: {value:?}"),
			})
			.collect()
	}

	fn ints(values: &[i32]) -> MetaValue { MetaValue::ListTag(values.iter().map(|n| MetaValue::IntTag(*n)).collect()) }

	fn at(index: i32) -> MetaValue { MetaValue::ElementAt(rc!(MetaValue::IntTag(index))) }

	#[test]
	fn indices_out_of_range_select_nothing() {
		assert_eq!(numbers(&selected(ints(&[1, 2, 3]), vec![at(0)])), [1]);
		assert_eq!(numbers(&selected(ints(&[1, 2, 3]), vec![at(-3)])), [1]);
		assert!(selected(ints(&[1, 2, 3]), vec![at(3)]).is_empty());
		assert!(selected(ints(&[1, 2, 3]), vec![at(-4)]).is_empty());
		assert!(selected(ints(&[]), vec![at(-1)]).is_empty());
	}

	#[test]
	fn arrays_are_navigated_like_lists() {
		let bytes = MetaValue::ByteArrayTag(vec![MetaValue::ByteTag(1), MetaValue::ByteTag(2)]);
		let int_array = MetaValue::IntArrayTag(vec![MetaValue::IntTag(10), MetaValue::IntTag(20)]);
		let longs = MetaValue::LongArrayTag(vec![MetaValue::LongTag(100), MetaValue::LongTag(300)]);
		assert_eq!(numbers(&selected(bytes, vec![MetaValue::AllElements])), [1, 2]);
		assert_eq!(numbers(&selected(int_array, vec![at(1)])), [20]);
		assert_eq!(numbers(&selected(longs, vec![at(-1)])), [300]);
	}

	#[test]
	fn nodes_that_do_not_apply_select_nothing() {
		let mut interner = Rodeo::new();
		let a = interner.get_or_intern("a");
		assert!(selected(MetaValue::IntTag(1), vec![at(0)]).is_empty());
		assert!(selected(MetaValue::IntTag(1), vec![MetaValue::AllElements]).is_empty());
		assert!(selected(ints(&[1]), vec![MetaValue::FieldNamed(a)]).is_empty());
	}

	#[test]
	fn whole_value_patterns_keep_matching_selections() {
		let mut interner = Rodeo::new();
		let id = interner.get_or_intern("id");
		let entry = |n| MetaValue::CompoundTag(IndexMap::from([(id, MetaValue::IntTag(n))]));
		let whole = |pattern| MetaValue::MatchWholeValue(rc!(pattern));
		assert_eq!(selected(entry(1), vec![whole(entry(1))]).len(), 1);
		assert!(selected(entry(1), vec![whole(entry(2))]).is_empty());
		assert_eq!(numbers(&selected(ints(&[1, 2, 3, 2]), vec![MetaValue::AllElements, whole(MetaValue::IntTag(2))])), [2, 2]);
	}

	#[test]
	fn list_patterns_need_each_element_somewhere() {
		let target = MetaValue::ListTag(vec![ints(&[1, 2, 3]), ints(&[3, 4]), ints(&[2])]);
		let each = |pattern| vec![MetaValue::MatchElement(rc!(pattern))];
		let found = selected(target.clone(), each(ints(&[3, 1])));
		let [only] = found.as_slice() else { panic!("expected one match: {found:?}") };
		assert_eq!(numbers(only.elements().unwrap()), [1, 2, 3]);
		assert_eq!(selected(target.clone(), each(ints(&[3]))).len(), 2);
		assert_eq!(selected(target.clone(), each(ints(&[]))).len(), 3);
		assert!(selected(target, each(ints(&[5]))).is_empty());
		let scalars = ints(&[1, 2]);
		assert!(selected(scalars, each(ints(&[1]))).is_empty());
	}

	#[test]
	fn list_patterns_match_arrays() {
		let target = MetaValue::ListTag(vec![MetaValue::IntArrayTag(vec![MetaValue::IntTag(7), MetaValue::IntTag(8)])]);
		assert_eq!(selected(target, vec![MetaValue::MatchElement(rc!(ints(&[8])))]).len(), 1);
	}

	#[test]
	fn get_is_stuck_on_neutral_targets() {
		let target = MetaValue::from((None, Level(0)));
		let path = MetaValue::ListTag(vec![MetaValue::AllElements]);
		assert!(matches!(MetaValue::get(target, path), MetaValue::Neutral(MetaNeutral::Get { .. })));
	}
}
