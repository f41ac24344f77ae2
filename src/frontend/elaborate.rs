use std::rc::Rc;

use indexmap::IndexMap;
use lasso::Resolver;
use tracing::debug;

use crate::{
	common::{bind, bx, rc, Closure, Label, Level, Name, Range},
	config::Config,
	frontend::{
		pretty::Print as _,
		reflect::{Reflect as _, ReflectWith as _},
		reify::Reify as _,
		unify::{Unifier, Unify as _},
	},
	ir::{
		presyntax::{ArrayKind, Expression, Former, Literal, NodeForm, Preterm},
		semantics::{Environment, Lazy, MetaNeutral, MetaValue, ObjectTypeValue},
		syntax::{MetaTerm, ObjectTerm, ObjectType},
	},
};

/// Elaborates a surface program as an object term and synthesizes its type.
///
/// Elaboration never aborts: every failure is recorded as a diagnostic and the offending node becomes a hole.
pub fn elaborate(program: Expression, config: &Config) -> Elaboration {
	let mut context = Context::new(config);
	let AnnotatedObjectTerm { term, ty } = context.synthesize_object_term(program);
	let ty = ty.reify(&context.unifier);
	debug!(
		diagnostics = context.diagnostics.len(),
		metavariables = context.unifier.len(),
		"elaborated program"
	);
	Elaboration {
		term,
		ty,
		unifier: context.unifier,
		diagnostics: context.diagnostics,
		inlay_hints: context.inlay_hints,
		hovers: context.hovers,
	}
}

pub struct Elaboration {
	pub term: ObjectTerm,
	pub ty: ObjectType,
	pub unifier: Unifier,
	pub diagnostics: Vec<Diagnostic>,
	pub inlay_hints: Vec<InlayHint>,
	pub hovers: Vec<Hover>,
}

impl Elaboration {
	pub fn has_errors(&self) -> bool {
		self.diagnostics.iter().any(|diagnostic| diagnostic.severity == Severity::Error)
	}

	/// Renders the type of the innermost elaborated node covering a byte offset.
	pub fn hover_at(&self, offset: usize, resolver: &impl Resolver) -> Option<String> {
		self.hovers
			.iter()
			.filter(|hover| hover.range.0 <= offset && offset < hover.range.1)
			.min_by_key(|hover| hover.range.1 - hover.range.0)
			.map(|hover| hover.ty.render(hover.level, &self.unifier, resolver))
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Severity {
	Error,
	Warning,
}

#[derive(Clone, Debug)]
pub struct Diagnostic {
	pub severity: Severity,
	pub range: Range,
	pub kind: DiagnosticKind,
}

#[derive(Clone, Debug)]
pub enum DiagnosticKind {
	NotFound(Name),
	ObjectTypeMismatch { found: ObjectType, expected: ObjectType },
	MetaTypeMismatch { found: MetaTerm, expected: MetaTerm },
	ArrowExpected { found: MetaTerm },
	CodeExpected { found: MetaTerm },
	InvalidPath { ty: MetaTerm },
	UnexpectedConstruct,
	UnsolvedMetavariable(usize),
	UnfilledHole,
}

impl DiagnosticKind {
	pub fn at(self, range: Range) -> Diagnostic {
		let severity = match self {
			Self::UnfilledHole => Severity::Warning,
			_ => Severity::Error,
		};
		Diagnostic { severity, range, kind: self }
	}
}

impl Diagnostic {
	pub fn message(&self, resolver: &impl Resolver) -> String {
		use DiagnosticKind as K;
		match &self.kind {
			K::NotFound(name) => format!("`{}` is not in scope", resolver.resolve(name)),
			K::ObjectTypeMismatch { found, expected } => format!(
				"type mismatch\nexpected: {}\nfound: {}",
				expected.pretty(resolver),
				found.pretty(resolver)
			),
			K::MetaTypeMismatch { found, expected } => format!(
				"type mismatch\nexpected: {}\nfound: {}",
				expected.pretty(resolver),
				found.pretty(resolver)
			),
			K::ArrowExpected { found } => format!("expected a function, found a term of type {}", found.pretty(resolver)),
			K::CodeExpected { found } => format!("expected a quotation, found a term of type {}", found.pretty(resolver)),
			K::InvalidPath { ty } => format!("path cannot navigate a value of type {}", ty.pretty(resolver)),
			K::UnexpectedConstruct => "this construct is not allowed here".to_owned(),
			K::UnsolvedMetavariable(index) => format!("could not infer ?{index}"),
			K::UnfilledHole => "unfilled hole".to_owned(),
		}
	}
}

/// A type kept as a value and read back only when displayed.
#[derive(Clone, Debug)]
pub enum ShownType {
	Object(ObjectTypeValue),
	Meta(MetaValue),
}

impl ShownType {
	pub fn render(&self, level: Level, unifier: &Unifier, resolver: &impl Resolver) -> String {
		match self {
			Self::Object(ty) => ty.reify_in(level, unifier).pretty(resolver).to_string(),
			Self::Meta(ty) => ty.reify_in(level, unifier).pretty(resolver).to_string(),
		}
	}
}

#[derive(Clone, Debug)]
pub struct InlayHint {
	pub position: usize,
	pub level: Level,
	pub ty: ShownType,
}

impl InlayHint {
	pub fn label(&self, unifier: &Unifier, resolver: &impl Resolver) -> String {
		format!(": {}", self.ty.render(self.level, unifier, resolver))
	}
}

#[derive(Clone, Debug)]
pub struct Hover {
	pub range: Range,
	pub level: Level,
	pub ty: ShownType,
}

struct AnnotatedObjectTerm {
	term: ObjectTerm,
	ty: ObjectTypeValue,
}

impl ObjectTerm {
	fn annotate(self, ty: ObjectTypeValue) -> AnnotatedObjectTerm { AnnotatedObjectTerm { term: self, ty } }
}

struct AnnotatedMetaTerm {
	term: MetaTerm,
	ty: MetaValue,
}

impl MetaTerm {
	fn annotate(self, ty: MetaValue) -> AnnotatedMetaTerm { AnnotatedMetaTerm { term: self, ty } }
}

struct Context {
	// Meta-level variables, indexed by level.
	names: Vec<Label>,
	types: Vec<MetaValue>,
	environment: Environment,

	// Object-level functions, innermost last.
	functions: Vec<(Name, ObjectTypeValue)>,

	unifier: Unifier,
	diagnostics: Vec<Diagnostic>,
	inlay_hints: Vec<InlayHint>,
	hovers: Vec<Hover>,
}

impl Context {
	fn new(config: &Config) -> Self {
		Self {
			names: Vec::new(),
			types: Vec::new(),
			environment: Environment::default(),
			functions: Vec::new(),
			unifier: Unifier::new(config),
			diagnostics: Vec::new(),
			inlay_hints: Vec::new(),
			hovers: Vec::new(),
		}
	}

	fn level(&self) -> Level { self.environment.level() }

	/// Runs `body` with one more meta-level variable in scope, aliased to `value` if given.
	fn bind<T>(&mut self, name: Label, ty: MetaValue, value: Option<Rc<Lazy>>, body: impl FnOnce(&mut Self) -> T) -> T {
		let value = value.unwrap_or_else(|| Lazy::ready((name, self.level()).into()));
		self.names.push(name);
		self.types.push(ty);
		self.environment.push(value);
		let result = body(self);
		self.names.pop();
		self.types.pop();
		self.environment.pop();
		result
	}

	fn define<T>(&mut self, name: Name, ty: ObjectTypeValue, body: impl FnOnce(&mut Self) -> T) -> T {
		self.functions.push((name, ty));
		let result = body(self);
		self.functions.pop();
		result
	}

	fn lookup(&self, name: Name) -> Option<(Level, MetaValue)> {
		let level = self.names.iter().rposition(|candidate| *candidate == Some(name))?;
		Some((Level(level), self.types[level].clone()))
	}

	fn lookup_function(&self, name: Name) -> Option<ObjectTypeValue> {
		self.functions.iter().rev().find(|(candidate, _)| *candidate == name).map(|(_, ty)| ty.clone())
	}

	fn fresh(&mut self, range: Range) -> MetaTerm { self.unifier.fresh(range) }

	fn fresh_value(&mut self, range: Range) -> MetaValue { self.fresh(range).reflect_in(&self.environment) }

	fn report(&mut self, range: Range, kind: DiagnosticKind) { self.diagnostics.push(kind.at(range)) }

	fn hover(&mut self, range: Range, ty: ShownType) { self.hovers.push(Hover { range, level: self.level(), ty }) }

	fn inlay(&mut self, position: usize, ty: ShownType) {
		self.inlay_hints.push(InlayHint { position, level: self.level(), ty })
	}

	fn show_object(&self, ty: &ObjectTypeValue) -> ObjectType { ty.reify_in(self.level(), &self.unifier) }

	fn show_meta(&self, ty: &MetaValue) -> MetaTerm { ty.reify_in(self.level(), &self.unifier) }

	fn subtype(&mut self, sub: &ObjectTypeValue, sup: &ObjectTypeValue) -> bool {
		let level = self.level();
		self.unifier.subtype(level, sub, sup)
	}

	// Checks an inferred meta type against an expected one. Erroneous types conform both ways.
	fn conforms(&mut self, ty: &MetaValue, expected: &MetaValue) -> bool {
		let level = self.level();
		match (self.unifier.force(ty), self.unifier.force(expected)) {
			(ty, expected) if ty.is_hole() || expected.is_hole() => true,
			(MetaValue::Code(ty), MetaValue::Code(expected)) => self.unifier.subtype(level, &ty, &expected),
			(ty, expected) => self.unifier.unify(level, &ty, &expected),
		}
	}

	fn object_mismatch(&self, found: &ObjectTypeValue, expected: &ObjectTypeValue) -> DiagnosticKind {
		DiagnosticKind::ObjectTypeMismatch { found: self.show_object(found), expected: self.show_object(expected) }
	}

	fn elaborate_object_type(&mut self, expr: Expression) -> ObjectType {
		let range = expr.range;
		match self.try_elaborate_object_type(expr) {
			Ok(ty) => {
				self.hover(range, ShownType::Meta(MetaValue::ObjectType));
				ty
			}
			Err(kind) => {
				self.report(range, kind);
				ObjectType::Hole
			}
		}
	}

	fn try_elaborate_object_type(&mut self, expr: Expression) -> Result<ObjectType, DiagnosticKind> {
		use ObjectType as T;
		let Expression { range, preterm } = expr;
		Ok(match preterm {
			Preterm::Former(former, arguments) => match former {
				Former::End => T::End,
				Former::Byte => T::Byte,
				Former::Short => T::Short,
				Former::Int => T::Int,
				Former::Long => T::Long,
				Former::Float => T::Float,
				Former::Double => T::Double,
				Former::String => T::String,
				Former::ByteArray => T::ByteArray,
				Former::IntArray => T::IntArray,
				Former::LongArray => T::LongArray,
				Former::List => T::List(bx!(self.elaborate_object_type(unary(arguments)?))),
				Former::Collection => T::Collection(bx!(self.elaborate_object_type(unary(arguments)?))),
				Former::Universe | Former::ObjectType | Former::Node | Former::Code | Former::MetaCode =>
					return Err(DiagnosticKind::UnexpectedConstruct),
			},
			Preterm::Compound(fields) =>
				T::Compound(fields.into_iter().map(|(name, field)| (name, self.elaborate_object_type(field))).collect()),
			Preterm::Splice(splicee) => T::Splice(bx!(self.verify_meta_term(*splicee, &MetaValue::ObjectType))),
			// An omitted object type is an unknown type to be solved by unification.
			Preterm::Hole => {
				let ty = T::Splice(bx!(self.fresh(range)));
				self.inlay(range.1, ShownType::Object(ty.reflect_in(&self.environment)));
				ty
			}
			_ => return Err(DiagnosticKind::UnexpectedConstruct),
		})
	}

	fn synthesize_object_term(&mut self, expr: Expression) -> AnnotatedObjectTerm { self.elaborate_object_term(expr, None) }

	fn verify_object_term(&mut self, expr: Expression, ty: &ObjectTypeValue) -> ObjectTerm {
		self.elaborate_object_term(expr, Some(ty)).term
	}

	fn elaborate_object_term(&mut self, expr: Expression, expected: Option<&ObjectTypeValue>) -> AnnotatedObjectTerm {
		let range = expr.range;
		match self.try_elaborate_object_term(expr, expected) {
			Ok(term) => {
				self.hover(range, ShownType::Object(term.ty.clone()));
				term
			}
			Err(kind) => {
				self.report(range, kind);
				ObjectTerm::Hole.annotate(expected.cloned().unwrap_or(ObjectTypeValue::Hole))
			}
		}
	}

	fn try_elaborate_object_term(
		&mut self,
		expr: Expression,
		expected: Option<&ObjectTypeValue>,
	) -> Result<AnnotatedObjectTerm, DiagnosticKind> {
		use ObjectTerm as O;
		use ObjectTypeValue as T;
		let Expression { range, preterm } = expr;
		let expected = expected.map(|ty| self.unifier.force_object_type(ty));
		Ok(match (preterm, expected) {
			// Scalars.
			(Preterm::Literal(literal), None) => match literal {
				Literal::Byte(n) => O::ByteTag(n).annotate(T::Byte),
				Literal::Short(n) => O::ShortTag(n).annotate(T::Short),
				Literal::Int(n) => O::IntTag(n).annotate(T::Int),
				Literal::Long(n) => O::LongTag(n).annotate(T::Long),
				Literal::Float(n) => O::FloatTag(n).annotate(T::Float),
				Literal::Double(n) => O::DoubleTag(n).annotate(T::Double),
				Literal::String(s) => O::StringTag(s).annotate(T::String),
			},

			// Collections.
			(Preterm::Array(kind, elements), None) => {
				let element_ty = match kind {
					ArrayKind::Byte => T::Byte,
					ArrayKind::Int => T::Int,
					ArrayKind::Long => T::Long,
				};
				let elements = elements.into_iter().map(|element| self.verify_object_term(element, &element_ty)).collect();
				match kind {
					ArrayKind::Byte => O::ByteArrayTag(elements).annotate(T::ByteArray),
					ArrayKind::Int => O::IntArrayTag(elements).annotate(T::IntArray),
					ArrayKind::Long => O::LongArrayTag(elements).annotate(T::LongArray),
				}
			}
			(Preterm::List(elements), Some(T::List(element_ty))) => {
				let elements = elements.into_iter().map(|element| self.verify_object_term(element, &element_ty)).collect();
				O::ListTag(elements).annotate(T::List(element_ty))
			}
			(Preterm::List(elements), None) => {
				let mut elements = elements.into_iter();
				let Some(first) = elements.next() else {
					return Ok(O::ListTag(Vec::new()).annotate(T::List(rc!(T::End))));
				};
				let first = self.synthesize_object_term(first);
				let mut terms = vec![first.term];
				terms.extend(elements.map(|element| self.verify_object_term(element, &first.ty)));
				O::ListTag(terms).annotate(T::List(rc!(first.ty)))
			}
			(Preterm::Compound(fields), expected) => {
				let expected_fields = match &expected {
					Some(T::Compound(fields)) => Some(fields.clone()),
					_ => None,
				};
				let mut terms = IndexMap::new();
				let mut types = IndexMap::new();
				for (name, field) in fields {
					let field_ty = expected_fields.as_ref().and_then(|fields| fields.get(&name));
					let field = self.elaborate_object_term(field, field_ty);
					terms.insert(name, field.term);
					types.insert(name, field.ty);
				}
				let ty = T::Compound(types);
				match expected {
					Some(expected) if !self.subtype(&ty, &expected) => return Err(self.object_mismatch(&ty, &expected)),
					Some(expected) => O::CompoundTag(terms).annotate(expected),
					None => O::CompoundTag(terms).annotate(ty),
				}
			}

			// Functions.
			(Preterm::Function { name, ty, body, tail }, expected) => {
				let body = match ty {
					Some(ty) => {
						let ty = self.elaborate_object_type(*ty).reflect_in(&self.environment);
						let body = self.verify_object_term(*body, &ty);
						body.annotate(ty)
					}
					None => self.synthesize_object_term(*body),
				};
				let tail = self.define(name, body.ty, |context| context.elaborate_object_term(*tail, expected.as_ref()));
				O::Function { name, body: bx!(body.term), tail: bx!(tail.term) }.annotate(tail.ty)
			}
			(Preterm::Variable(name), None) => match self.lookup_function(name) {
				Some(ty) => O::Run(name).annotate(ty),
				None => return Err(DiagnosticKind::NotFound(name)),
			},

			// Meta-level bindings scope over object code through a splice.
			(Preterm::Let { ty, argument, tail }, expected) => {
				let argument = self.elaborate_let_argument(ty, *argument);
				let label = tail.parameter.label;
				let value = Lazy::new(self.environment.clone(), argument.term.clone());
				let tail = self.bind(label, argument.ty, Some(value), |context| {
					context.elaborate_object_term(*tail.body, expected.as_ref())
				});
				let quoted = MetaTerm::QuoteObjectTerm(bx!(tail.term));
				O::Splice(bx!(MetaTerm::Let { init: bx!(argument.term), tail: bind(label, bx!(quoted)) })).annotate(tail.ty)
			}

			// Staging.
			(Preterm::Splice(splicee), expected) => {
				let code = expected.clone().map(|ty| MetaValue::Code(rc!(ty)));
				let splicee = self.elaborate_meta_term(*splicee, code.as_ref());
				match self.unifier.force(&splicee.ty) {
					MetaValue::Code(ty) => O::Splice(bx!(splicee.term)).annotate(ty.as_ref().clone()),
					ty if ty.is_hole() => O::Hole.annotate(expected.unwrap_or(T::Hole)),
					ty => return Err(DiagnosticKind::CodeExpected { found: self.show_meta(&ty) }),
				}
			}

			(Preterm::Hole, expected) => {
				self.inlay(range.1, ShownType::Object(expected.unwrap_or(T::End)));
				self.report(range, DiagnosticKind::UnfilledHole);
				O::Hole.annotate(T::End)
			}

			// Switch directions.
			(preterm, Some(expected)) => {
				let term = self.synthesize_object_term(preterm.at(range));
				if self.subtype(&term.ty, &expected) {
					term.term.annotate(expected)
				} else {
					return Err(self.object_mismatch(&term.ty, &expected));
				}
			}
			(_, None) => return Err(DiagnosticKind::UnexpectedConstruct),
		})
	}

	fn elaborate_let_argument(&mut self, ty: Option<Box<Expression>>, argument: Expression) -> AnnotatedMetaTerm {
		match ty {
			Some(ty) => {
				let ty = self.verify_meta_term(*ty, &MetaValue::Universe).reflect_in(&self.environment);
				let argument = self.verify_meta_term(argument, &ty);
				argument.annotate(ty)
			}
			None => self.synthesize_meta_term(argument),
		}
	}

	fn synthesize_meta_term(&mut self, expr: Expression) -> AnnotatedMetaTerm { self.elaborate_meta_term(expr, None) }

	fn verify_meta_term(&mut self, expr: Expression, ty: &MetaValue) -> MetaTerm {
		self.elaborate_meta_term(expr, Some(ty)).term
	}

	fn elaborate_meta_term(&mut self, expr: Expression, expected: Option<&MetaValue>) -> AnnotatedMetaTerm {
		let range = expr.range;
		match self.try_elaborate_meta_term(expr, expected) {
			Ok(term) => {
				self.hover(range, ShownType::Meta(term.ty.clone()));
				term
			}
			Err(kind) => {
				self.report(range, kind);
				MetaTerm::Hole.annotate(expected.cloned().unwrap_or_else(MetaValue::hole))
			}
		}
	}

	fn try_elaborate_meta_term(
		&mut self,
		expr: Expression,
		expected: Option<&MetaValue>,
	) -> Result<AnnotatedMetaTerm, DiagnosticKind> {
		use MetaTerm as M;
		use MetaValue as V;
		let Expression { range, preterm } = expr;
		let expected = expected.map(|ty| self.unifier.force(ty));
		Ok(match (preterm, expected) {
			// Variables.
			(Preterm::Variable(name), None) => match self.lookup(name) {
				Some((level, ty)) => M::Var(Some(name), level).annotate(ty),
				None => return Err(DiagnosticKind::NotFound(name)),
			},
			(Preterm::Hole, expected) => {
				let ty = match expected {
					Some(ty) => ty,
					None => self.fresh_value(range),
				};
				self.inlay(range.1, ShownType::Meta(ty.clone()));
				self.fresh(range).annotate(ty)
			}

			// Let-expressions.
			(Preterm::Let { ty, argument, tail }, expected) => {
				let argument = self.elaborate_let_argument(ty, *argument);
				let label = tail.parameter.label;
				let value = Lazy::new(self.environment.clone(), argument.term.clone());
				let tail = self.bind(label, argument.ty, Some(value), |context| {
					context.elaborate_meta_term(*tail.body, expected.as_ref())
				});
				M::Let { init: bx!(argument.term), tail: bind(label, bx!(tail.term)) }.annotate(tail.ty)
			}

			// Types.
			(Preterm::Former(former, arguments), None) => match former {
				Former::Universe => M::Universe,
				Former::ObjectType => M::ObjectType,
				Former::Node => M::Node,
				Former::End => M::End,
				Former::Byte => M::Byte,
				Former::Short => M::Short,
				Former::Int => M::Int,
				Former::Long => M::Long,
				Former::Float => M::Float,
				Former::Double => M::Double,
				Former::String => M::String,
				Former::ByteArray => M::ByteArray,
				Former::IntArray => M::IntArray,
				Former::LongArray => M::LongArray,
				Former::List => M::List(bx!(self.verify_meta_term(unary(arguments)?, &V::Universe))),
				Former::Code => M::Code(bx!(self.elaborate_object_type(unary(arguments)?))),
				Former::MetaCode => M::MetaCode(bx!(self.verify_meta_term(unary(arguments)?, &V::Universe))),
				Former::Collection => return Err(DiagnosticKind::UnexpectedConstruct),
			}
			.annotate(V::Universe),
			(Preterm::Compound(fields), Some(V::Universe)) => M::Compound(
				fields.into_iter().map(|(name, field)| (name, self.verify_meta_term(field, &V::Universe))).collect(),
			)
			.annotate(V::Universe),

			// Dependent functions.
			(Preterm::Pi { base, family }, None) => {
				let base = self.verify_meta_term(*base, &V::Universe);
				let base_value = base.reflect_in(&self.environment);
				let label = family.parameter.label;
				let family = self.bind(label, base_value, None, |context| context.verify_meta_term(*family.body, &V::Universe));
				M::FunType { domain: bx!(base), codomain: bind(label, bx!(family)) }.annotate(V::Universe)
			}
			(Preterm::Lambda { domain, body }, None) => {
				let domain = match domain {
					Some(domain) => self.verify_meta_term(*domain, &V::Universe),
					None => self.fresh(body.parameter.range),
				};
				let domain_value = domain.reflect_in(&self.environment);
				let label = body.parameter.label;
				let level = self.level();
				let (body, codomain) = self.bind(label, domain_value.clone(), None, |context| {
					let body = context.synthesize_meta_term(*body.body);
					(body.term, body.ty.reify_in(level + 1, &context.unifier))
				});
				let codomain = Closure::new(self.environment.clone(), label, codomain);
				M::Abs { domain: bx!(domain), body: bind(label, bx!(body)) }
					.annotate(V::FunType { domain: rc!(domain_value), codomain: rc!(codomain) })
			}
			(Preterm::Call { callee, argument }, None) => {
				let callee = self.synthesize_meta_term(*callee);
				let (domain, codomain) = match self.unifier.force(&callee.ty) {
					V::FunType { domain, codomain } => (domain, codomain),
					ty @ V::Neutral(MetaNeutral::Meta(_)) => {
						let domain = rc!(self.fresh_value(range));
						let codomain = rc!(Closure::new(self.environment.clone(), None, self.fresh(range)));
						let level = self.level();
						let function = V::FunType { domain: domain.clone(), codomain: codomain.clone() };
						if !self.unifier.unify(level, &ty, &function) {
							return Err(DiagnosticKind::ArrowExpected { found: self.show_meta(&ty) });
						}
						(domain, codomain)
					}
					ty if ty.is_hole() => {
						self.synthesize_meta_term(*argument);
						return Ok(M::Hole.annotate(ty));
					}
					ty => return Err(DiagnosticKind::ArrowExpected { found: self.show_meta(&ty) }),
				};
				let argument = self.verify_meta_term(*argument, &domain);
				let operand = Lazy::new(self.environment.clone(), argument.clone());
				M::Apply { operator: bx!(callee.term), operand: bx!(argument) }.annotate(codomain.reflect_with(operand))
			}

			// Data.
			(Preterm::Literal(literal), None) => match literal {
				Literal::Byte(n) => M::ByteTag(n).annotate(V::Byte),
				Literal::Short(n) => M::ShortTag(n).annotate(V::Short),
				Literal::Int(n) => M::IntTag(n).annotate(V::Int),
				Literal::Long(n) => M::LongTag(n).annotate(V::Long),
				Literal::Float(n) => M::FloatTag(n).annotate(V::Float),
				Literal::Double(n) => M::DoubleTag(n).annotate(V::Double),
				Literal::String(s) => M::StringTag(s).annotate(V::String),
			},
			(Preterm::Array(kind, elements), None) => {
				let element_ty = match kind {
					ArrayKind::Byte => V::Byte,
					ArrayKind::Int => V::Int,
					ArrayKind::Long => V::Long,
				};
				let elements = elements.into_iter().map(|element| self.verify_meta_term(element, &element_ty)).collect();
				match kind {
					ArrayKind::Byte => M::ByteArrayTag(elements).annotate(V::ByteArray),
					ArrayKind::Int => M::IntArrayTag(elements).annotate(V::IntArray),
					ArrayKind::Long => M::LongArrayTag(elements).annotate(V::LongArray),
				}
			}
			(Preterm::List(elements), Some(V::List(element_ty))) => {
				let elements = elements.into_iter().map(|element| self.verify_meta_term(element, &element_ty)).collect();
				M::ListTag(elements).annotate(V::List(element_ty))
			}
			(Preterm::List(elements), None) => {
				let mut elements = elements.into_iter();
				let Some(first) = elements.next() else {
					let element_ty = self.fresh_value(range);
					return Ok(M::ListTag(Vec::new()).annotate(V::List(rc!(element_ty))));
				};
				let first = self.synthesize_meta_term(first);
				let mut terms = vec![first.term];
				terms.extend(elements.map(|element| self.verify_meta_term(element, &first.ty)));
				M::ListTag(terms).annotate(V::List(rc!(first.ty)))
			}
			(Preterm::Compound(fields), None) => {
				let mut terms = IndexMap::new();
				let mut types = IndexMap::new();
				for (name, field) in fields {
					let field = self.synthesize_meta_term(field);
					terms.insert(name, field.term);
					types.insert(name, field.ty);
				}
				M::CompoundTag(terms).annotate(V::Compound(types))
			}

			// Paths.
			(Preterm::Node(form), None) => match form {
				NodeForm::Whole(pattern) => M::MatchWholeValue(bx!(self.synthesize_meta_term(*pattern).term)),
				NodeForm::Each(pattern) => M::MatchElement(bx!(self.synthesize_meta_term(*pattern).term)),
				NodeForm::All => M::AllElements,
				NodeForm::At(index) => M::ElementAt(bx!(self.verify_meta_term(*index, &V::Int))),
				NodeForm::Field(name) => M::FieldNamed(name),
			}
			.annotate(V::Node),
			(Preterm::Get { target, path }, None) => {
				let target = self.synthesize_meta_term(*target);
				let path = self.verify_meta_term(*path, &V::List(rc!(V::Node)));
				let element_ty = match self.unifier.force(&path.reflect_in(&self.environment)) {
					V::ListTag(nodes) => self.navigate(target.ty, &nodes, range)?,
					_ => self.fresh_value(range),
				};
				M::Get { target: bx!(target.term), path: bx!(path) }.annotate(V::List(rc!(element_ty)))
			}

			// Staging.
			(Preterm::Quote(quotee), Some(V::Code(ty))) =>
				M::QuoteObjectTerm(bx!(self.verify_object_term(*quotee, &ty))).annotate(V::Code(ty)),
			(Preterm::Quote(quotee), Some(V::ObjectType)) =>
				M::QuoteObjectType(bx!(self.elaborate_object_type(*quotee))).annotate(V::ObjectType),
			(Preterm::Quote(quotee), Some(V::MetaCode(ty))) =>
				M::QuoteMetaTerm(bx!(self.verify_meta_term(*quotee, &ty))).annotate(V::MetaCode(ty)),
			(Preterm::Quote(quotee), None) => {
				let Expression { range: quoted, preterm } = *quotee;
				match preterm {
					preterm @ Preterm::Former(..) =>
						M::QuoteObjectType(bx!(self.elaborate_object_type(preterm.at(quoted)))).annotate(V::ObjectType),
					Preterm::Splice(splicee) => self.synthesize_quoted_splice(*splicee)?,
					preterm => {
						let quotee = self.synthesize_object_term(preterm.at(quoted));
						M::QuoteObjectTerm(bx!(quotee.term)).annotate(V::Code(rc!(quotee.ty)))
					}
				}
			}
			(Preterm::Splice(splicee), None) => {
				let splicee = self.synthesize_meta_term(*splicee);
				match self.unifier.force(&splicee.ty) {
					V::MetaCode(ty) => M::Splice(bx!(splicee.term)).annotate(ty.as_ref().clone()),
					ty if ty.is_hole() => M::Hole.annotate(ty),
					ty => return Err(DiagnosticKind::CodeExpected { found: self.show_meta(&ty) }),
				}
			}

			// Switch directions.
			(preterm, Some(expected)) => {
				let term = self.synthesize_meta_term(preterm.at(range));
				if self.conforms(&term.ty, &expected) {
					term.term.annotate(expected)
				} else {
					return Err(DiagnosticKind::MetaTypeMismatch {
						found: self.show_meta(&term.ty),
						expected: self.show_meta(&expected),
					});
				}
			}
			(_, None) => return Err(DiagnosticKind::UnexpectedConstruct),
		})
	}

	// Quotes a splice as whatever kind of code its splicee has.
	fn synthesize_quoted_splice(&mut self, splicee: Expression) -> Result<AnnotatedMetaTerm, DiagnosticKind> {
		use MetaValue as V;
		let splicee = self.synthesize_meta_term(splicee);
		let term = splicee.term;
		Ok(match self.unifier.force(&splicee.ty) {
			V::ObjectType => MetaTerm::QuoteObjectType(bx!(ObjectType::Splice(bx!(term)))).annotate(V::ObjectType),
			V::Code(ty) => MetaTerm::QuoteObjectTerm(bx!(ObjectTerm::Splice(bx!(term)))).annotate(V::Code(ty)),
			V::MetaCode(ty) => MetaTerm::QuoteMetaTerm(bx!(MetaTerm::Splice(bx!(term)))).annotate(V::MetaCode(ty)),
			ty if ty.is_hole() => MetaTerm::Hole.annotate(ty),
			ty => return Err(DiagnosticKind::CodeExpected { found: self.show_meta(&ty) }),
		})
	}

	// Computes the type of the values a literal path selects from a target of type `ty`.
	fn navigate(&mut self, mut ty: MetaValue, nodes: &[MetaValue], range: Range) -> Result<MetaValue, DiagnosticKind> {
		for node in nodes {
			ty = self.unifier.force(&ty);
			ty = match (node, &ty) {
				(_, ty) if ty.is_hole() => return Ok(ty.clone()),
				(MetaValue::Neutral(_), _) | (_, MetaValue::Neutral(_)) => return Ok(self.fresh_value(range)),
				(MetaValue::MatchWholeValue(_), _) => continue,
				(MetaValue::FieldNamed(name), MetaValue::Compound(fields)) if fields.contains_key(name) =>
					fields[name].clone(),
				(MetaValue::AllElements | MetaValue::MatchElement(_) | MetaValue::ElementAt(_), ty)
					if ty.element_type().is_some() =>
					ty.element_type().unwrap_or_else(MetaValue::hole),
				_ => return Err(DiagnosticKind::InvalidPath { ty: self.show_meta(&ty) }),
			};
		}
		Ok(ty)
	}
}

fn unary(arguments: Vec<Expression>) -> Result<Expression, DiagnosticKind> {
	let [argument] = <[Expression; 1]>::try_from(arguments).map_err(|_| DiagnosticKind::UnexpectedConstruct)?;
	Ok(argument)
}
