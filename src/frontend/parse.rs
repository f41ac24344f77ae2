use lasso::{Rodeo, RodeoResolver};
use peg::error::ParseError;
use tracing::debug;

use crate::{
	common::{bind, bx, Name, Range},
	ir::{
		presyntax::{ArrayKind, Expression, Former, Literal, NodeForm, ParsedLabel, Preterm},
		tokenized::{Keyword, Token, TokenizedSource},
	},
};

/// Parses a program from a tokenized source string.
///
/// Errors are located at token indices; see [`TokenizedSource::range_of`].
pub fn parse(source: &TokenizedSource) -> Result<(Expression, RodeoResolver), ParseError<usize>> {
	let mut parser = Parser { source: source.source, interner: Rodeo::new(), ranges: source.ranges.clone() };
	let program = presyntax_parse::program(&source.tokens, &mut parser)?;
	debug!(names = parser.interner.len(), "parsed program");
	Ok((program, parser.interner.into_resolver()))
}

pub struct Parser<'s> {
	source: &'s str,
	interner: Rodeo,
	ranges: Box<[Range]>,
}

impl<'s> Parser<'s> {
	fn text(&self, token_index: usize) -> &'s str {
		let range = self.ranges[token_index];
		&self.source[range.0..range.1]
	}

	fn identifier(&mut self, token_index: usize) -> Name {
		let span = self.text(token_index);
		self.interner.get_or_intern(span)
	}

	// Byte range covering the tokens `start..end`.
	fn span(&self, start: usize, end: usize) -> Range { (self.ranges[start].0, self.ranges[end - 1].1) }

	fn number(&self, token_index: usize) -> Option<Literal> {
		let text = self.text(token_index);
		let (digits, suffix) = match text.char_indices().last() {
			Some((at, c)) if c.is_ascii_alphabetic() => (&text[..at], Some(c.to_ascii_lowercase())),
			_ => (text, None),
		};
		Some(match suffix {
			Some('b') => Literal::Byte(digits.parse().ok()?),
			Some('s') => Literal::Short(digits.parse().ok()?),
			Some('l') => Literal::Long(digits.parse().ok()?),
			Some('f') => Literal::Float(digits.parse().ok()?),
			Some('d') => Literal::Double(digits.parse().ok()?),
			_ if digits.contains('.') => Literal::Double(digits.parse().ok()?),
			_ => Literal::Int(digits.parse().ok()?),
		})
	}

	fn string(&self, token_index: usize) -> String {
		let text = self.text(token_index);
		let mut string = String::with_capacity(text.len());
		let mut chars = text[1..text.len() - 1].chars();
		while let Some(c) = chars.next() {
			string.push(match c {
				'\\' => match chars.next() {
					Some('n') => '\n',
					Some('t') => '\t',
					Some(c) => c,
					None => break,
				},
				c => c,
			});
		}
		string
	}

	fn key(&mut self, token_index: usize) -> Name {
		let key = self.string(token_index);
		self.interner.get_or_intern(key)
	}

	fn array_kind(&self, token_index: usize) -> Option<ArrayKind> {
		match self.text(token_index) {
			"B" => Some(ArrayKind::Byte),
			"I" => Some(ArrayKind::Int),
			"L" => Some(ArrayKind::Long),
			_ => None,
		}
	}
}

peg::parser! {
  grammar presyntax_parse(parser: &mut Parser) for [Token] {
		rule identifier() -> Name
			= pos:position!() [Token::Identifier] {parser.identifier(pos)}

		rule parameter() -> ParsedLabel
			= pos:position!() label:(name:identifier() {Some(name)} / [Token::LowDash] {None}) {ParsedLabel { range: parser.span(pos, pos + 1), label }}

		rule key() -> Name
			= identifier()
			/ pos:position!() [Token::String] {parser.key(pos)}

		rule literal() -> Literal
			= pos:position!() [Token::Number] {? parser.number(pos).ok_or("literal in range")}
			/ pos:position!() [Token::String] {Literal::String(parser.string(pos))}

		rule array_kind() -> ArrayKind
			= pos:position!() [Token::Identifier] {? parser.array_kind(pos).ok_or("array kind")}

		rule annotation() -> Box<Expression>
			= [Token::Colon] ty:expression() {bx!(ty)}

		rule elements() -> Vec<Expression>
			= elements:(expression() ** [Token::Comma]) [Token::Comma]? {elements}

		rule fields() -> Vec<(Name, Expression)>
			= fields:((key:key() [Token::Colon] value:expression() {(key, value)}) ** [Token::Comma]) [Token::Comma]? {fields}

		rule former() -> Former
			= [Token::Keyword(Keyword::Type)] {Former::Universe}
			/ [Token::Keyword(Keyword::ObjectType)] {Former::ObjectType}
			/ [Token::Keyword(Keyword::Node)] {Former::Node}
			// Scalars.
			/ [Token::Keyword(Keyword::End)] {Former::End}
			/ [Token::Keyword(Keyword::Byte)] {Former::Byte}
			/ [Token::Keyword(Keyword::Short)] {Former::Short}
			/ [Token::Keyword(Keyword::Int)] {Former::Int}
			/ [Token::Keyword(Keyword::Long)] {Former::Long}
			/ [Token::Keyword(Keyword::Float)] {Former::Float}
			/ [Token::Keyword(Keyword::Double)] {Former::Double}
			/ [Token::Keyword(Keyword::String)] {Former::String}
			// Arrays.
			/ [Token::Keyword(Keyword::ByteArray)] {Former::ByteArray}
			/ [Token::Keyword(Keyword::IntArray)] {Former::IntArray}
			/ [Token::Keyword(Keyword::LongArray)] {Former::LongArray}

		rule unary_former() -> Former
			= [Token::Keyword(Keyword::List)] {Former::List}
			/ [Token::Keyword(Keyword::Collection)] {Former::Collection}
			/ [Token::Keyword(Keyword::Code)] {Former::Code}
			/ [Token::Keyword(Keyword::MetaCode)] {Former::MetaCode}

		rule atom() -> Expression
			= [Token::ParenL] expression:expression() [Token::ParenR] {expression}
			/ init:position!() preterm:(
				  [Token::LowDash] {Preterm::Hole}
				/ name:identifier() {Preterm::Variable(name)}
				/ literal:literal() {Preterm::Literal(literal)}
				/ [Token::SquareL] kind:array_kind() [Token::Semi] elements:elements() [Token::SquareR] {Preterm::Array(kind, elements)}
				/ [Token::SquareL] elements:elements() [Token::SquareR] {Preterm::List(elements)}
				/ [Token::CurlyL] fields:fields() [Token::CurlyR] {Preterm::Compound(fields)}
				/ [Token::Keyword(Keyword::All)] {Preterm::Node(NodeForm::All)}
				/ former:unary_former() [Token::ParenL] argument:expression() [Token::ParenR] {Preterm::Former(former, vec![argument])}
				/ former:former() {Preterm::Former(former, vec![])}
			) fini:position!() {preterm.at(parser.span(init, fini))}

		rule prefix() -> Expression
			= init:position!() preterm:(
				  [Token::Backtick] quotee:prefix() {Preterm::Quote(bx!(quotee))}
				/ [Token::Dollar] splicee:prefix() {Preterm::Splice(bx!(splicee))}
				/ [Token::Keyword(Keyword::Get)] target:prefix() path:prefix() {Preterm::Get { target: bx!(target), path: bx!(path) }}
				// Path nodes.
				/ [Token::Keyword(Keyword::Whole)] pattern:prefix() {Preterm::Node(NodeForm::Whole(bx!(pattern)))}
				/ [Token::Keyword(Keyword::Each)] pattern:prefix() {Preterm::Node(NodeForm::Each(bx!(pattern)))}
				/ [Token::Keyword(Keyword::At)] index:prefix() {Preterm::Node(NodeForm::At(bx!(index)))}
				/ [Token::Keyword(Keyword::Field)] name:key() {Preterm::Node(NodeForm::Field(name))}
			) fini:position!() {preterm.at(parser.span(init, fini))}
			/ atom()

		rule application() -> Expression
			= init:position!() head:prefix() arguments:(argument:prefix() fini:position!() {(argument, fini)})* {
				arguments.into_iter().fold(head, |callee, (argument, fini)| {
					Preterm::Call { callee: bx!(callee), argument: bx!(argument) }.at(parser.span(init, fini))
				})
			}

		rule expression() -> Expression
			= init:position!() preterm:(
				  [Token::Keyword(Keyword::Let)] parameter:parameter() ty:annotation()? [Token::Equal] argument:expression() [Token::Semi] tail:expression()
					{Preterm::Let { ty, argument: bx!(argument), tail: bind(parameter, bx!(tail)) }}
				/ [Token::Keyword(Keyword::Function)] name:identifier() ty:annotation()? [Token::Equal] body:expression() [Token::Semi] tail:expression()
					{Preterm::Function { name, ty, body: bx!(body), tail: bx!(tail) }}
				// Dependent functions.
				/ [Token::Backslash] parameter:parameter() [Token::FatArrow] body:expression()
					{Preterm::Lambda { domain: None, body: bind(parameter, bx!(body)) }}
				/ [Token::Backslash] [Token::ParenL] parameter:parameter() domain:annotation() [Token::ParenR] [Token::FatArrow] body:expression()
					{Preterm::Lambda { domain: Some(domain), body: bind(parameter, bx!(body)) }}
				/ [Token::ParenL] parameter:parameter() base:annotation() [Token::ParenR] [Token::Arrow] family:expression()
					{Preterm::Pi { base, family: bind(parameter, bx!(family)) }}
			) fini:position!() {preterm.at(parser.span(init, fini))}
			/ init:position!() base:application() family:([Token::Arrow] family:expression() {family})? fini:position!() {
				match family {
					Some(family) => {
						let parameter = ParsedLabel { range: base.range, label: None };
						Preterm::Pi { base: bx!(base), family: bind(parameter, bx!(family)) }.at(parser.span(init, fini))
					}
					None => base,
				}
			}

		pub rule program() -> Expression
			= expression()
	}
}

#[cfg(test)]
mod tests {
	use lasso::Resolver as _;

	use super::*;
	use crate::frontend::lex::lex;

	fn parse_source(source: &str) -> (Expression, RodeoResolver) {
		let tokens = lex(source).expect("source should lex");
		parse(&tokens).expect("source should parse")
	}

	#[test]
	fn application_associates_left() {
		let (expression, resolver) = parse_source("f x y");
		assert_eq!(expression.range, (0, 5));
		let Preterm::Call { callee, argument } = expression.preterm else { panic!("expected a call") };
		assert!(matches!(argument.preterm, Preterm::Variable(y) if resolver.resolve(&y) == "y"));
		assert_eq!(callee.range, (0, 3));
		assert!(matches!(callee.preterm, Preterm::Call { .. }));
	}

	#[test]
	fn arrows_associate_right() {
		let (expression, _) = parse_source("Int -> Int -> Int");
		let Preterm::Pi { base, family } = expression.preterm else { panic!("expected a function type") };
		assert!(matches!(base.preterm, Preterm::Former(Former::Int, _)));
		assert_eq!(family.parameter.label, None);
		assert!(matches!(family.body.preterm, Preterm::Pi { .. }));
	}

	#[test]
	fn dependent_function_types_bind_their_parameter() {
		let (expression, resolver) = parse_source("(t: Type) -> List(t)");
		let Preterm::Pi { family, .. } = expression.preterm else { panic!("expected a function type") };
		assert_eq!(family.parameter.label.map(|name| resolver.resolve(&name).to_owned()).as_deref(), Some("t"));
		assert!(matches!(family.body.preterm, Preterm::Former(Former::List, ref arguments) if arguments.len() == 1));
	}

	#[test]
	fn literal_suffixes_select_tags() {
		let literals = ["1b", "2s", "3", "4L", "5.5f", "6.5", "7d", "-8"].map(|source| parse_source(source).0.preterm);
		assert!(matches!(
			literals,
			[
				Preterm::Literal(Literal::Byte(1)),
				Preterm::Literal(Literal::Short(2)),
				Preterm::Literal(Literal::Int(3)),
				Preterm::Literal(Literal::Long(4)),
				Preterm::Literal(Literal::Float(_)),
				Preterm::Literal(Literal::Double(_)),
				Preterm::Literal(Literal::Double(_)),
				Preterm::Literal(Literal::Int(-8)),
			]
		));
	}

	#[test]
	fn out_of_range_literals_are_rejected() {
		let tokens = lex("300b").expect("source should lex");
		assert!(parse(&tokens).is_err());
	}

	#[test]
	fn arrays_are_distinguished_from_lists() {
		let (expression, _) = parse_source("[B; 1b, 2b]");
		assert!(matches!(expression.preterm, Preterm::Array(ArrayKind::Byte, ref elements) if elements.len() == 2));
		let (expression, _) = parse_source("[B, 1b]");
		assert!(matches!(expression.preterm, Preterm::List(ref elements) if elements.len() == 2));
	}

	#[test]
	fn compound_keys_may_be_strings() {
		let (expression, resolver) = parse_source(r#"{a: 1, "b c": "\"x\""}"#);
		let Preterm::Compound(fields) = expression.preterm else { panic!("expected a compound") };
		let keys: Vec<_> = fields.iter().map(|(key, _)| resolver.resolve(key)).collect();
		assert_eq!(keys, ["a", "b c"]);
		assert!(matches!(&fields[1].1.preterm, Preterm::Literal(Literal::String(s)) if s == "\"x\""));
	}

	#[test]
	fn paths_and_staging_are_prefixes() {
		let (expression, _) = parse_source("$(get x [field a, at -1, each {id: 1}, whole [1], all])");
		let Preterm::Splice(splicee) = expression.preterm else { panic!("expected a splice") };
		let Preterm::Get { path, .. } = splicee.preterm else { panic!("expected a get") };
		let Preterm::List(nodes) = path.preterm else { panic!("expected a list") };
		assert!(matches!(
			nodes.iter().map(|node| &node.preterm).collect::<Vec<_>>().as_slice(),
			[
				Preterm::Node(NodeForm::Field(_)),
				Preterm::Node(NodeForm::At(_)),
				Preterm::Node(NodeForm::Each(_)),
				Preterm::Node(NodeForm::Whole(_)),
				Preterm::Node(NodeForm::All),
			]
		));
	}

	#[test]
	fn bindings_scope_over_their_tails() {
		let (expression, _) = parse_source("let x: Int = 1; function f = `x; \\(y: Int) => y");
		let Preterm::Let { ty, tail, .. } = expression.preterm else { panic!("expected a let") };
		assert!(ty.is_some());
		let Preterm::Function { tail, .. } = tail.body.preterm else { panic!("expected a function") };
		assert!(matches!(tail.preterm, Preterm::Lambda { domain: Some(_), .. }));
	}

	#[test]
	fn trailing_tokens_are_rejected() {
		let tokens = lex("1 )").expect("source should lex");
		assert!(parse(&tokens).is_err());
	}
}
