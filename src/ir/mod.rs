pub mod presyntax;
pub mod semantics;
pub mod staged;
pub mod syntax;
pub mod tokenized;
