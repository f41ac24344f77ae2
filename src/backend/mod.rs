pub mod interpret;
pub mod stage;
