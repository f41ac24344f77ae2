use crate::common::Range;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Token {
	Keyword(Keyword),
	Identifier,
	Number,
	String,
	LowDash,
	Backtick,
	Dollar,
	Backslash,
	Colon,
	Semi,
	Comma,
	Equal,
	Arrow,
	FatArrow,
	ParenL,
	ParenR,
	SquareL,
	SquareR,
	CurlyL,
	CurlyR,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Keyword {
	Let,
	Function,

	// Paths.
	Get,
	Whole,
	Each,
	All,
	At,
	Field,

	// Types.
	Type,
	ObjectType,
	Node,
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
	List,
	Collection,
	Code,
	MetaCode,
}

pub struct TokenizedSource<'a> {
	pub source: &'a str,
	pub tokens: Box<[Token]>,
	pub ranges: Box<[Range]>,
}

impl TokenizedSource<'_> {
	/// The byte range of a token, or a one-byte range past the end for out-of-bounds indices.
	pub fn range_of(&self, token_index: usize) -> Range {
		self.ranges.get(token_index).copied().unwrap_or((self.source.len(), self.source.len() + 1))
	}
}
