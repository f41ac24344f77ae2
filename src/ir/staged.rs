use indexmap::IndexMap;

use crate::common::Name;

/// An object program with every splice resolved.
#[derive(Clone, PartialEq, Debug)]
pub enum StagedTerm {
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
}
