pub mod ast;
pub mod lexer;
#[allow(clippy::module_inception)]
pub mod parser;
pub mod validator;

pub use ast::{Command, ExecutionRequest, Pipeline};
pub use parser::Parser;
