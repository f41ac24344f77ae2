use std::rc::Rc;

use arbor::{
	common::{bind, Level},
	config::Config,
	frontend::{reflect::Reflect as _, reify::Reify as _, unify::{Unifier, Unify as _}},
	ir::{
		semantics::{MetaNeutral, MetaValue, ObjectTypeValue},
		syntax::MetaTerm,
	},
};
use proptest::prelude::*;

fn scalar() -> impl Strategy<Value = MetaTerm> {
	prop_oneof![
		any::<i8>().prop_map(MetaTerm::ByteTag),
		any::<i32>().prop_map(MetaTerm::IntTag),
		"[a-z]{0,4}".prop_map(MetaTerm::StringTag),
	]
}

fn node() -> impl Strategy<Value = MetaTerm> {
	prop_oneof![Just(MetaTerm::AllElements), (-3i32..3).prop_map(|i| MetaTerm::ElementAt(Box::new(MetaTerm::IntTag(i))))]
}

// Terms whose only free variable is the one at level zero.
fn open_term() -> impl Strategy<Value = MetaTerm> {
	let leaf = prop_oneof![scalar(), Just(MetaTerm::Var(None, Level(0)))];
	leaf.prop_recursive(4, 32, 4, |inner| {
		prop_oneof![
			prop::collection::vec(inner.clone(), 0..4).prop_map(MetaTerm::ListTag),
			(inner.clone(), inner.clone())
				.prop_map(|(init, tail)| MetaTerm::Let { init: Box::new(init), tail: bind(None, Box::new(tail)) }),
			(inner.clone(), inner.clone()).prop_map(|(body, operand)| MetaTerm::Apply {
				operator: Box::new(MetaTerm::Abs { domain: Box::new(MetaTerm::Int), body: bind(None, Box::new(body)) }),
				operand: Box::new(operand),
			}),
			inner.clone().prop_map(|term| MetaTerm::Splice(Box::new(MetaTerm::QuoteMetaTerm(Box::new(term))))),
			(inner, prop::collection::vec(node(), 0..3)).prop_map(|(target, path)| MetaTerm::Get {
				target: Box::new(target),
				path: Box::new(MetaTerm::ListTag(path)),
			}),
		]
	})
}

fn closed_term() -> impl Strategy<Value = MetaTerm> {
	(scalar(), open_term()).prop_map(|(init, tail)| MetaTerm::Let { init: Box::new(init), tail: bind(None, Box::new(tail)) })
}

fn object_type() -> impl Strategy<Value = ObjectTypeValue> {
	use ObjectTypeValue as T;
	let leaf = prop_oneof![Just(T::End), Just(T::Byte), Just(T::Int), Just(T::ByteArray), Just(T::IntArray)];
	leaf.prop_recursive(3, 12, 1, |inner| {
		prop_oneof![inner.clone().prop_map(|t| T::List(Rc::new(t))), inner.prop_map(|t| T::Collection(Rc::new(t)))]
	})
}

fn meta_type() -> impl Strategy<Value = MetaValue> {
	prop_oneof![
		Just(MetaValue::Int),
		Just(MetaValue::Byte),
		Just(MetaValue::String),
		Just(MetaValue::List(Rc::new(MetaValue::Int))),
	]
}

proptest! {
	#[test]
	fn normalization_is_idempotent(term in closed_term()) {
		let unifier = Unifier::default();
		let once = term.reflect().reify(&unifier);
		let once_is_let = matches!(once, MetaTerm::Let { .. });
		prop_assert!(!once_is_let);
		prop_assert_eq!(once.reflect().reify(&unifier), once);
	}

	#[test]
	fn subtyping_is_reflexive(t in object_type()) {
		prop_assert!(Unifier::default().subtype(Level(0), &t, &t));
	}

	#[test]
	fn end_is_the_bottom_type(t in object_type()) {
		let mut unifier = Unifier::default();
		prop_assert!(unifier.subtype(Level(0), &ObjectTypeValue::End, &t));
		prop_assert_eq!(unifier.subtype(Level(0), &t, &ObjectTypeValue::End), matches!(t, ObjectTypeValue::End));
	}

	#[test]
	fn subtyping_is_transitive(a in object_type(), b in object_type(), c in object_type()) {
		let mut unifier = Unifier::default();
		if unifier.subtype(Level(0), &a, &b) && unifier.subtype(Level(0), &b, &c) {
			prop_assert!(unifier.subtype(Level(0), &a, &c));
		}
	}

	#[test]
	fn solutions_only_accumulate(steps in prop::collection::vec((0usize..4, meta_type()), 0..12)) {
		let mut unifier = Unifier::new(&Config::default());
		let metas: Vec<_> = (0..4).map(|_| unifier.fresh((0, 0))).collect();
		let mut solved: Vec<Option<MetaTerm>> = vec![None; metas.len()];
		for (index, ty) in steps {
			let &MetaTerm::Meta(meta) = &metas[index] else { unreachable!() };
			let meta = MetaValue::Neutral(MetaNeutral::Meta(meta));
			if unifier.unify(Level(0), &meta, &ty) {
				prop_assert!(unifier.unify(Level(0), &meta, &ty));
			}
			for (slot, previous) in solved.iter_mut().enumerate() {
				let current = unifier.solution(slot).map(|solution| solution.reify(&unifier));
				if previous.is_some() {
					prop_assert_eq!(&current, &*previous);
				}
				*previous = current;
			}
		}
	}
}
