use std::str::Chars;

use tracing::debug;

use crate::ir::tokenized::{Keyword, Token, TokenizedSource};

#[derive(Debug)]
pub struct LexError(pub usize, pub LexErrorKind);

#[derive(Debug)]
pub enum LexErrorKind {
	UnrecognizedLexemePrefix,
	UnexpectedCharacter(&'static [char]),
	UnexpectedEnd(&'static [char]),
}

struct Scanner<'s> {
	len: usize,
	chars: Chars<'s>,
}

impl<'s> Scanner<'s> {
	fn new(source: &'s str) -> Self { Self { len: source.len(), chars: source.chars() } }

	fn position(&self) -> usize { self.len - self.chars.as_str().len() }

	fn previous_position(&self) -> usize { self.position() - 1 }

	fn next(&mut self) -> Option<(char, usize)> {
		let position = self.position();
		Some((self.chars.next()?, position))
	}

	fn pop(&mut self) -> Option<char> { self.chars.next() }

	fn peek(&self) -> Option<char> { self.chars.clone().next() }

	fn peek_second(&self) -> Option<char> { self.chars.clone().nth(1) }

	fn skip_digits(&mut self) {
		while let Some('0'..='9') = self.peek() {
			self.pop();
		}
	}
}

fn keyword_or_identifier(string: &str) -> Token {
	use Token::*;

	use self::Keyword::*;
	match string {
		"let" => Keyword(Let),
		"function" => Keyword(Function),

		"get" => Keyword(Get),
		"whole" => Keyword(Whole),
		"each" => Keyword(Each),
		"all" => Keyword(All),
		"at" => Keyword(At),
		"field" => Keyword(Field),

		"Type" => Keyword(Type),
		"ObjectType" => Keyword(ObjectType),
		"Node" => Keyword(Node),
		"End" => Keyword(End),
		"Byte" => Keyword(Byte),
		"Short" => Keyword(Short),
		"Int" => Keyword(Int),
		"Long" => Keyword(Long),
		"Float" => Keyword(Float),
		"Double" => Keyword(Double),
		"String" => Keyword(self::Keyword::String),
		"ByteArray" => Keyword(ByteArray),
		"IntArray" => Keyword(IntArray),
		"LongArray" => Keyword(LongArray),
		"List" => Keyword(List),
		"Collection" => Keyword(Collection),
		"Code" => Keyword(Code),
		"MetaCode" => Keyword(MetaCode),

		_ => Identifier,
	}
}

/// Splits a source string into tokens and their byte ranges, skipping whitespace and `%` comments.
pub fn lex(source: &str) -> Result<TokenizedSource, LexError> {
	use LexErrorKind::*;
	use Token::*;
	let mut scanner = Scanner::new(source);
	let mut tokens = Vec::new();
	let mut ranges = Vec::new();
	while let Some((initial, start)) = scanner.next() {
		let token = match initial {
			' ' | '\n' | '\t' | '\r' => continue,
			'%' => {
				while let Some(c) = scanner.pop() {
					if c == '\n' {
						break;
					}
				}
				continue;
			}
			'a'..='z' | 'A'..='Z' => {
				while let Some('a'..='z' | 'A'..='Z' | '0'..='9' | '_') = scanner.peek() {
					scanner.pop();
				}
				keyword_or_identifier(&source[start..scanner.position()])
			}
			'0'..='9' => number(&mut scanner),
			'-' => match scanner.peek() {
				Some('>') => {
					scanner.pop();
					Arrow
				}
				Some('0'..='9') => number(&mut scanner),
				Some(_) => {
					scanner.pop();
					return Err(LexError(scanner.previous_position(), UnexpectedCharacter(&['>'])));
				}
				None => return Err(LexError(scanner.position(), UnexpectedEnd(&['>']))),
			},
			'"' => {
				const ESCAPES: [char; 4] = ['"', '\\', 'n', 't'];
				loop {
					match scanner.pop() {
						Some('"') => break,
						Some('\\') => match scanner.pop() {
							Some('"' | '\\' | 'n' | 't') => (),
							Some(_) => return Err(LexError(scanner.previous_position(), UnexpectedCharacter(&ESCAPES))),
							None => return Err(LexError(scanner.position(), UnexpectedEnd(&ESCAPES))),
						},
						Some(_) => (),
						None => return Err(LexError(scanner.position(), UnexpectedEnd(&['"']))),
					}
				}
				String
			}
			'=' =>
				if let Some('>') = scanner.peek() {
					scanner.pop();
					FatArrow
				} else {
					Equal
				},
			'_' => LowDash,
			'`' => Backtick,
			'$' => Dollar,
			'\\' => Backslash,
			':' => Colon,
			';' => Semi,
			',' => Comma,
			'(' => ParenL,
			')' => ParenR,
			'[' => SquareL,
			']' => SquareR,
			'{' => CurlyL,
			'}' => CurlyR,
			_ => return Err(LexError(start, UnrecognizedLexemePrefix)),
		};
		tokens.push(token);
		ranges.push((start, scanner.position()));
	}
	debug!(tokens = tokens.len(), "lexed source");
	Ok(TokenizedSource { source, tokens: tokens.into(), ranges: ranges.into() })
}

// Digits, an optional fraction, and an optional suffix; the parser decides the literal tag.
fn number(scanner: &mut Scanner) -> Token {
	scanner.skip_digits();
	if let (Some('.'), Some('0'..='9')) = (scanner.peek(), scanner.peek_second()) {
		scanner.pop();
		scanner.skip_digits();
	}
	if let Some('b' | 'B' | 's' | 'S' | 'l' | 'L' | 'f' | 'F' | 'd' | 'D') = scanner.peek() {
		scanner.pop();
	}
	Token::Number
}

#[cfg(test)]
mod tests {
	use super::*;

	fn tokens(source: &str) -> Vec<Token> { lex(source).map(|lexed| lexed.tokens.to_vec()).unwrap_or_default() }

	#[test]
	fn comments_and_whitespace_are_skipped() {
		assert_eq!(tokens("  % nothing here\n\t1 % trailing"), vec![Token::Number]);
	}

	#[test]
	fn numbers_carry_sign_fraction_and_suffix() {
		let lexed = lex("-12.5f 3b -> 7").expect("source should lex");
		assert_eq!(lexed.tokens.as_ref(), [Token::Number, Token::Number, Token::Arrow, Token::Number]);
		assert_eq!(lexed.ranges.as_ref(), [(0, 6), (7, 9), (10, 12), (13, 14)]);
	}

	#[test]
	fn keywords_are_carved_out_of_identifiers() {
		assert_eq!(
			tokens("let lets List Code_"),
			vec![Token::Keyword(Keyword::Let), Token::Identifier, Token::Keyword(Keyword::List), Token::Identifier]
		);
	}

	#[test]
	fn arrows_are_distinguished_from_equals() {
		assert_eq!(tokens("= => ->"), vec![Token::Equal, Token::FatArrow, Token::Arrow]);
	}

	#[test]
	fn strings_allow_escapes() {
		let lexed = lex(r#""a\"b" 1"#).expect("source should lex");
		assert_eq!(lexed.tokens.as_ref(), [Token::String, Token::Number]);
		assert_eq!(lexed.ranges[0], (0, 6));
	}

	#[test]
	fn unterminated_strings_are_rejected() {
		assert!(matches!(lex("\"abc"), Err(LexError(4, LexErrorKind::UnexpectedEnd(_)))));
	}

	#[test]
	fn unknown_characters_are_rejected() {
		assert!(matches!(lex("1 # 2"), Err(LexError(2, LexErrorKind::UnrecognizedLexemePrefix))));
	}
}
