use crate::common::{Binder, Label, Name, Range};

#[derive(Debug, Clone)]
pub struct Expression {
	pub range: Range,
	pub preterm: Preterm,
}

#[derive(Debug, Clone, Copy)]
pub struct ParsedLabel {
	pub range: Range,
	pub label: Label,
}

#[derive(Debug, Clone)]
pub enum Preterm {
	Variable(Name),
	Hole,

	// Data.
	Literal(Literal),
	Array(ArrayKind, Vec<Expression>),
	List(Vec<Expression>),
	Compound(Vec<(Name, Expression)>),

	// Bindings.
	Let { ty: Option<Box<Expression>>, argument: Box<Expression>, tail: Binder<ParsedLabel, Box<Expression>> },
	Function { name: Name, ty: Option<Box<Expression>>, body: Box<Expression>, tail: Box<Expression> },

	// Dependent functions.
	Pi { base: Box<Expression>, family: Binder<ParsedLabel, Box<Expression>> },
	Lambda { domain: Option<Box<Expression>>, body: Binder<ParsedLabel, Box<Expression>> },
	Call { callee: Box<Expression>, argument: Box<Expression> },

	// Types.
	Former(Former, Vec<Expression>),

	// Paths.
	Node(NodeForm),
	Get { target: Box<Expression>, path: Box<Expression> },

	// Staging.
	Quote(Box<Expression>),
	Splice(Box<Expression>),
}

impl Preterm {
	pub fn at(self, range: Range) -> Expression { Expression { range, preterm: self } }
}

#[derive(Debug, Clone)]
pub enum Literal {
	Byte(i8),
	Short(i16),
	Int(i32),
	Long(i64),
	Float(f32),
	Double(f64),
	String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayKind {
	Byte,
	Int,
	Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Former {
	// Universes.
	Universe,
	ObjectType,
	Node,

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
	ByteArray,
	IntArray,
	LongArray,
	List,
	Collection,

	// Quoted programs.
	Code,
	MetaCode,
}

#[derive(Debug, Clone)]
pub enum NodeForm {
	Whole(Box<Expression>),
	Each(Box<Expression>),
	All,
	At(Box<Expression>),
	Field(Name),
}
