use std::fmt::{self, Write};

use indexmap::IndexMap;
use lasso::Resolver;

use crate::{
	backend::interpret::Data,
	common::{Label, Name},
	ir::syntax::{MetaTerm, ObjectTerm, ObjectType},
};

/// Renders a tree in surface notation, resolving names against an interner.
pub trait Print {
	fn print(&self, f: &mut impl Write, resolver: &impl Resolver) -> fmt::Result;

	fn pretty<'a, R: Resolver>(&'a self, resolver: &'a R) -> Pretty<'a, Self, R> { Pretty { tree: self, resolver } }
}

pub struct Pretty<'a, T: ?Sized, R> {
	tree: &'a T,
	resolver: &'a R,
}

impl<T: Print + ?Sized, R: Resolver> fmt::Display for Pretty<'_, T, R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.tree.print(f, self.resolver) }
}

impl Print for ObjectType {
	fn print(&self, f: &mut impl Write, resolver: &impl Resolver) -> fmt::Result {
		use ObjectType as T;
		match self {
			T::End => write!(f, "End"),
			T::Byte => write!(f, "Byte"),
			T::Short => write!(f, "Short"),
			T::Int => write!(f, "Int"),
			T::Long => write!(f, "Long"),
			T::Float => write!(f, "Float"),
			T::Double => write!(f, "Double"),
			T::String => write!(f, "String"),
			T::ByteArray => write!(f, "ByteArray"),
			T::IntArray => write!(f, "IntArray"),
			T::LongArray => write!(f, "LongArray"),
			T::Collection(element) => {
				write!(f, "Collection(")?;
				element.print(f, resolver)?;
				write!(f, ")")
			}
			T::List(element) => {
				write!(f, "List(")?;
				element.print(f, resolver)?;
				write!(f, ")")
			}
			T::Compound(fields) => print_fields(fields, f, resolver),
			T::Splice(splicee) => {
				write!(f, "$")?;
				print_atom(splicee, f, resolver)
			}
			T::Hole => write!(f, "_"),
		}
	}
}

impl Print for ObjectTerm {
	fn print(&self, f: &mut impl Write, resolver: &impl Resolver) -> fmt::Result {
		use ObjectTerm as T;
		match self {
			T::ByteTag(n) => write!(f, "{n}b"),
			T::ShortTag(n) => write!(f, "{n}s"),
			T::IntTag(n) => write!(f, "{n}"),
			T::LongTag(n) => write!(f, "{n}L"),
			T::FloatTag(n) => write!(f, "{n:?}f"),
			T::DoubleTag(n) => write!(f, "{n:?}d"),
			T::StringTag(s) => write!(f, "{s:?}"),
			T::ByteArrayTag(elements) => print_elements("B; ", elements, f, resolver),
			T::IntArrayTag(elements) => print_elements("I; ", elements, f, resolver),
			T::LongArrayTag(elements) => print_elements("L; ", elements, f, resolver),
			T::ListTag(elements) => print_elements("", elements, f, resolver),
			T::CompoundTag(fields) => print_fields(fields, f, resolver),
			T::Function { name, body, tail } => {
				write!(f, "function {} = ", resolver.resolve(name))?;
				body.print(f, resolver)?;
				write!(f, "; ")?;
				tail.print(f, resolver)
			}
			T::Run(name) => write!(f, "{}", resolver.resolve(name)),
			T::Splice(splicee) => {
				write!(f, "$")?;
				print_atom(splicee, f, resolver)
			}
			T::Hole => write!(f, "_"),
		}
	}
}

impl Print for MetaTerm {
	fn print(&self, f: &mut impl Write, resolver: &impl Resolver) -> fmt::Result {
		use MetaTerm as T;
		match self {
			T::Var(name, level) => match name {
				Some(name) => write!(f, "{}", resolver.resolve(name)),
				None => write!(f, "#{}", level.0),
			},
			T::Meta(index) => write!(f, "?{index}"),
			T::Hole => write!(f, "_"),
			T::Let { init, tail } => {
				write!(f, "let {} = ", label(&tail.parameter, resolver))?;
				init.print(f, resolver)?;
				write!(f, "; ")?;
				tail.body.print(f, resolver)
			}

			// Types.
			T::Universe => write!(f, "Type"),
			T::End => write!(f, "End"),
			T::Byte => write!(f, "Byte"),
			T::Short => write!(f, "Short"),
			T::Int => write!(f, "Int"),
			T::Long => write!(f, "Long"),
			T::Float => write!(f, "Float"),
			T::Double => write!(f, "Double"),
			T::String => write!(f, "String"),
			T::ByteArray => write!(f, "ByteArray"),
			T::IntArray => write!(f, "IntArray"),
			T::LongArray => write!(f, "LongArray"),
			T::List(element) => {
				write!(f, "List(")?;
				element.print(f, resolver)?;
				write!(f, ")")
			}
			T::Compound(fields) => print_fields(fields, f, resolver),
			T::Node => write!(f, "Node"),
			T::ObjectType => write!(f, "ObjectType"),
			T::Code(ty) => {
				write!(f, "Code(")?;
				ty.print(f, resolver)?;
				write!(f, ")")
			}
			T::MetaCode(ty) => {
				write!(f, "MetaCode(")?;
				ty.print(f, resolver)?;
				write!(f, ")")
			}

			// Dependent functions.
			T::FunType { domain, codomain } => {
				match codomain.parameter {
					Some(name) => {
						write!(f, "({}: ", resolver.resolve(&name))?;
						domain.print(f, resolver)?;
						write!(f, ") -> ")?;
					}
					None => {
						print_spine(domain, f, resolver)?;
						write!(f, " -> ")?;
					}
				}
				codomain.body.print(f, resolver)
			}
			T::Abs { domain, body } => {
				write!(f, "\\({}: ", label(&body.parameter, resolver))?;
				domain.print(f, resolver)?;
				write!(f, ") => ")?;
				body.body.print(f, resolver)
			}
			T::Apply { operator, operand } => {
				print_spine(operator, f, resolver)?;
				write!(f, " ")?;
				print_atom(operand, f, resolver)
			}

			// Data.
			T::ByteTag(n) => write!(f, "{n}b"),
			T::ShortTag(n) => write!(f, "{n}s"),
			T::IntTag(n) => write!(f, "{n}"),
			T::LongTag(n) => write!(f, "{n}L"),
			T::FloatTag(n) => write!(f, "{n:?}f"),
			T::DoubleTag(n) => write!(f, "{n:?}d"),
			T::StringTag(s) => write!(f, "{s:?}"),
			T::ByteArrayTag(elements) => print_elements("B; ", elements, f, resolver),
			T::IntArrayTag(elements) => print_elements("I; ", elements, f, resolver),
			T::LongArrayTag(elements) => print_elements("L; ", elements, f, resolver),
			T::ListTag(elements) => print_elements("", elements, f, resolver),
			T::CompoundTag(fields) => print_fields(fields, f, resolver),

			// Paths.
			T::MatchWholeValue(pattern) => {
				write!(f, "whole ")?;
				print_atom(pattern, f, resolver)
			}
			T::MatchElement(pattern) => {
				write!(f, "each ")?;
				print_atom(pattern, f, resolver)
			}
			T::AllElements => write!(f, "all"),
			T::ElementAt(index) => {
				write!(f, "at ")?;
				print_atom(index, f, resolver)
			}
			T::FieldNamed(name) => {
				write!(f, "field ")?;
				print_key(*name, f, resolver)
			}
			T::Get { target, path } => {
				write!(f, "get ")?;
				print_atom(target, f, resolver)?;
				write!(f, " ")?;
				print_atom(path, f, resolver)
			}

			// Staging.
			T::QuoteObjectType(ty) => {
				write!(f, "`(")?;
				ty.print(f, resolver)?;
				write!(f, ")")
			}
			T::QuoteObjectTerm(term) => {
				write!(f, "`(")?;
				term.print(f, resolver)?;
				write!(f, ")")
			}
			T::QuoteMetaTerm(term) => {
				write!(f, "`")?;
				print_atom(term, f, resolver)
			}
			T::Splice(splicee) => {
				write!(f, "$")?;
				print_atom(splicee, f, resolver)
			}
		}
	}
}

impl Print for Data {
	fn print(&self, f: &mut impl Write, resolver: &impl Resolver) -> fmt::Result {
		match self {
			Data::Byte(n) => write!(f, "{n}b"),
			Data::Short(n) => write!(f, "{n}s"),
			Data::Int(n) => write!(f, "{n}"),
			Data::Long(n) => write!(f, "{n}L"),
			Data::Float(n) => write!(f, "{n:?}f"),
			Data::Double(n) => write!(f, "{n:?}d"),
			Data::String(s) => write!(f, "{s:?}"),
			Data::ByteArray(elements) => print_numbers("B", elements, "b", f),
			Data::IntArray(elements) => print_numbers("I", elements, "", f),
			Data::LongArray(elements) => print_numbers("L", elements, "L", f),
			Data::List(elements) => print_elements("", elements, f, resolver),
			Data::Compound(fields) => print_fields(fields, f, resolver),
		}
	}
}

fn print_spine(term: &MetaTerm, f: &mut impl Write, resolver: &impl Resolver) -> fmt::Result {
	match term {
		MetaTerm::Apply { .. } => term.print(f, resolver),
		_ => print_atom(term, f, resolver),
	}
}

fn print_atom(term: &MetaTerm, f: &mut impl Write, resolver: &impl Resolver) -> fmt::Result {
	use MetaTerm as T;
	match term {
		T::Let { .. }
		| T::FunType { .. }
		| T::Abs { .. }
		| T::Apply { .. }
		| T::MatchWholeValue(_)
		| T::MatchElement(_)
		| T::ElementAt(_)
		| T::FieldNamed(_)
		| T::Get { .. }
		| T::QuoteMetaTerm(_)
		| T::Splice(_) => {
			write!(f, "(")?;
			term.print(f, resolver)?;
			write!(f, ")")
		}
		_ => term.print(f, resolver),
	}
}

fn print_elements<T: Print>(prefix: &str, elements: &[T], f: &mut impl Write, resolver: &impl Resolver) -> fmt::Result {
	write!(f, "[{prefix}")?;
	for (i, element) in elements.iter().enumerate() {
		if i > 0 {
			write!(f, ", ")?;
		}
		element.print(f, resolver)?;
	}
	write!(f, "]")
}

fn print_numbers<T: fmt::Display>(kind: &str, elements: &[T], suffix: &str, f: &mut impl Write) -> fmt::Result {
	write!(f, "[{kind};")?;
	for (i, element) in elements.iter().enumerate() {
		write!(f, "{} {element}{suffix}", if i > 0 { "," } else { "" })?;
	}
	write!(f, "]")
}

fn print_fields<T: Print>(fields: &IndexMap<Name, T>, f: &mut impl Write, resolver: &impl Resolver) -> fmt::Result {
	write!(f, "{{")?;
	for (i, (name, field)) in fields.iter().enumerate() {
		if i > 0 {
			write!(f, ", ")?;
		}
		print_key(*name, f, resolver)?;
		write!(f, ": ")?;
		field.print(f, resolver)?;
	}
	write!(f, "}}")
}

// Keys that would not lex as identifiers are quoted.
fn print_key(name: Name, f: &mut impl Write, resolver: &impl Resolver) -> fmt::Result {
	let key = resolver.resolve(&name);
	let mut chars = key.chars();
	let bare = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
		&& chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
	if bare { write!(f, "{key}") } else { write!(f, "{key:?}") }
}

fn label<'a>(label: &Label, resolver: &'a impl Resolver) -> &'a str {
	match label {
		Some(name) => resolver.resolve(name),
		None => "_",
	}
}

#[cfg(test)]
mod tests {
	use lasso::Rodeo;

	use super::*;
	use crate::common::{bind, bx, Level};

	#[test]
	fn types_print_in_surface_notation() {
		let mut interner = Rodeo::new();
		let a = interner.get_or_intern("a");
		let b = interner.get_or_intern("b c");
		let ty = ObjectType::Compound(IndexMap::from([
			(a, ObjectType::List(bx!(ObjectType::Byte))),
			(b, ObjectType::Collection(bx!(ObjectType::Int))),
		]));
		assert_eq!(ty.pretty(&interner).to_string(), r#"{a: List(Byte), "b c": Collection(Int)}"#);
	}

	#[test]
	fn function_types_name_only_bound_parameters() {
		let mut interner = Rodeo::new();
		let t = interner.get_or_intern("t");
		let dependent = MetaTerm::FunType {
			domain: bx!(MetaTerm::Universe),
			codomain: bind(Some(t), bx!(MetaTerm::List(bx!(MetaTerm::Var(Some(t), Level(0)))))),
		};
		assert_eq!(dependent.pretty(&interner).to_string(), "(t: Type) -> List(t)");
		let plain = MetaTerm::FunType { domain: bx!(MetaTerm::Int), codomain: bind(None, bx!(MetaTerm::Int)) };
		assert_eq!(plain.pretty(&interner).to_string(), "Int -> Int");
	}

	#[test]
	fn applications_parenthesize_operands() {
		let interner = Rodeo::new();
		let term = MetaTerm::Apply {
			operator: bx!(MetaTerm::Apply { operator: bx!(MetaTerm::Meta(0)), operand: bx!(MetaTerm::IntTag(1)) }),
			operand: bx!(MetaTerm::Splice(bx!(MetaTerm::Meta(1)))),
		};
		assert_eq!(term.pretty(&interner).to_string(), "?0 1 ($?1)");
	}

	#[test]
	fn data_prints_like_snbt() {
		let mut interner = Rodeo::new();
		let id = interner.get_or_intern("id");
		let data = Data::List(vec![
			Data::Compound(IndexMap::from([(id, Data::Short(3))])),
			Data::ByteArray(vec![1, -2]),
			Data::String("q\"".to_owned()),
			Data::Double(1.0),
		]);
		assert_eq!(data.pretty(&interner).to_string(), r#"[{id: 3s}, [B; 1b, -2b], "q\"", 1.0d]"#);
	}
}
