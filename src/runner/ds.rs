//! Runtime data structures: values, type descriptors, objects and environments.

pub mod error;
pub mod lex_env;
pub mod object;
pub mod types;
pub mod value;
