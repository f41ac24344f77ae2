use indexmap::IndexMap;

use crate::common::{Binder, Label, Level, Name};

#[derive(Clone, PartialEq, Debug)]
pub enum ObjectType {
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
	Collection(Box<Self>),
	ByteArray,
	IntArray,
	LongArray,
	List(Box<Self>),
	Compound(IndexMap<Name, Self>),

	// Staging.
	Splice(Box<MetaTerm>),

	Hole,
}

#[derive(Clone, PartialEq, Debug)]
pub enum ObjectTerm {
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
	Function { name: Name, body: Box<Self>, tail: Box<Self> },
	Run(Name),

	// Staging.
	Splice(Box<MetaTerm>),

	Hole,
}

#[derive(Clone, PartialEq, Debug)]
pub enum MetaTerm {
	// Variables.
	Var(Label, Level),
	Meta(usize),
	Hole,

	// Let-expressions.
	Let { init: Box<Self>, tail: Binder<Label, Box<Self>> },

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
	List(Box<Self>),
	Compound(IndexMap<Name, Self>),
	Node,
	ObjectType,
	Code(Box<ObjectType>),
	MetaCode(Box<Self>),

	// Dependent functions.
	FunType { domain: Box<Self>, codomain: Binder<Label, Box<Self>> },
	Abs { domain: Box<Self>, body: Binder<Label, Box<Self>> },
	Apply { operator: Box<Self>, operand: Box<Self> },

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
	MatchWholeValue(Box<Self>),
	MatchElement(Box<Self>),
	AllElements,
	ElementAt(Box<Self>),
	FieldNamed(Name),
	Get { target: Box<Self>, path: Box<Self> },

	// Staging.
	QuoteObjectType(Box<ObjectType>),
	QuoteObjectTerm(Box<ObjectTerm>),
	QuoteMetaTerm(Box<Self>),
	Splice(Box<Self>),
}

impl ObjectType {
	pub fn mentions_meta(&self, index: usize) -> bool {
		use ObjectType as T;
		match self {
			T::Collection(element) | T::List(element) => element.mentions_meta(index),
			T::Compound(fields) => fields.values().any(|field| field.mentions_meta(index)),
			T::Splice(splicee) => splicee.mentions_meta(index),
			_ => false,
		}
	}
}

impl ObjectTerm {
	pub fn mentions_meta(&self, index: usize) -> bool {
		use ObjectTerm as T;
		match self {
			T::ByteArrayTag(elements) | T::IntArrayTag(elements) | T::LongArrayTag(elements) | T::ListTag(elements) =>
				elements.iter().any(|element| element.mentions_meta(index)),
			T::CompoundTag(fields) => fields.values().any(|field| field.mentions_meta(index)),
			T::Function { body, tail, .. } => body.mentions_meta(index) || tail.mentions_meta(index),
			T::Splice(splicee) => splicee.mentions_meta(index),
			_ => false,
		}
	}
}

impl MetaTerm {
	/// Returns whether `Meta(index)` occurs anywhere in this term.
	pub fn mentions_meta(&self, index: usize) -> bool {
		use MetaTerm as T;
		match self {
			T::Meta(other) => *other == index,

			T::Let { init, tail } => init.mentions_meta(index) || tail.body.mentions_meta(index),
			T::FunType { domain, codomain: Binder { body, .. } } | T::Abs { domain, body: Binder { body, .. } } =>
				domain.mentions_meta(index) || body.mentions_meta(index),
			T::Apply { operator, operand } => operator.mentions_meta(index) || operand.mentions_meta(index),
			T::Get { target, path } => target.mentions_meta(index) || path.mentions_meta(index),

			T::List(inner)
			| T::MetaCode(inner)
			| T::MatchWholeValue(inner)
			| T::MatchElement(inner)
			| T::ElementAt(inner)
			| T::QuoteMetaTerm(inner)
			| T::Splice(inner) => inner.mentions_meta(index),

			T::Compound(fields) | T::CompoundTag(fields) => fields.values().any(|field| field.mentions_meta(index)),
			T::ByteArrayTag(elements) | T::IntArrayTag(elements) | T::LongArrayTag(elements) | T::ListTag(elements) =>
				elements.iter().any(|element| element.mentions_meta(index)),

			T::Code(ty) | T::QuoteObjectType(ty) => ty.mentions_meta(index),
			T::QuoteObjectTerm(term) => term.mentions_meta(index),

			_ => false,
		}
	}
}
