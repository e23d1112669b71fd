mod builtins;
#[allow(clippy::module_inception)]
mod executor;
mod launcher;
mod wait;

pub use executor::{Executor, Outcome};
