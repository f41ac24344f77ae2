pub mod backend;
pub mod common;
pub mod config;
pub mod driver;
pub mod frontend;
pub mod ir;
pub mod report;
