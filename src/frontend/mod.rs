pub mod elaborate;
pub mod lex;
pub mod parse;
pub mod pretty;
pub mod reflect;
pub mod reify;
pub mod unify;
pub mod zonk;
