//! Evaluation module for executing the script AST.
//!
//! This module contains the tree-walking interpreter behind the program instances.

pub mod context;
pub mod expression;
pub mod function;
pub mod statement;
pub mod types;

pub use types::{Completion, CompletionType, EvalResult, ValueResult};
