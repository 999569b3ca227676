//! The contract between the bridge and a script language implementation.
//!
//! The bridge only ever talks to a language through these traits: it hands source text
//! and a [`BindingScope`] to a [`ProgramCompiler`], asks the resulting
//! [`CompiledForm`] for one [`ProgramInstance`], and from then on evaluates it and reads
//! its declared properties and callables.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::host::bindings::BindingScope;
use crate::host::invoker::OverloadPolicy;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::Callable;
use crate::runner::ds::types::JsType;
use crate::runner::ds::value::JsValue;

pub trait ProgramCompiler: Send + Sync {
    /// Short language name, used in logs.
    fn name(&self) -> &str;

    /// One-time runtime setup. An engine calls this exactly once before its first parse.
    fn initialize(&self) -> Result<(), String>;

    fn parse(
        &self,
        source: &str,
        scope: &BindingScope,
        options: &ParseOptions,
    ) -> Result<Arc<dyn CompiledForm>, ParseError>;
}

pub trait CompiledForm: Send + Sync {
    /// Creates the live instance that holds the program's top-level state.
    fn new_instance(&self) -> Arc<dyn ProgramInstance>;
}

pub trait ProgramInstance: Send + Sync {
    fn type_name(&self) -> String;

    /// Runs the program's top level against `scope`, returning the completion value.
    fn evaluate(&self, scope: &BindingScope) -> Result<JsValue, JErrorType>;

    /// Every top-level property, meta-properties included, in declaration order.
    fn declared_properties(&self) -> Vec<PropertyInfo>;

    /// Top-level functions. Each receives the caller's scope as an implicit first
    /// argument.
    fn declared_callables(&self) -> Vec<Callable>;

    /// The instance as a script value, usable as an invocation target.
    fn as_target(&self) -> JsValue;
}

/// Options passed through to the parser and retained by the compiled program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub max_call_depth: usize,
    pub overload_policy: OverloadPolicy,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_call_depth: 64,
            overload_policy: OverloadPolicy::default(),
        }
    }
}

/// A syntax error with the 1-based position it was reported at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at line {line}, column {column}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// A top-level property of a program instance, read through its accessor.
#[derive(Clone)]
pub struct PropertyInfo {
    pub name: String,
    pub ty: JsType,
    accessor: Arc<dyn Fn() -> JsValue + Send + Sync>,
}

impl PropertyInfo {
    pub fn new<F>(name: &str, ty: JsType, accessor: F) -> Self
    where
        F: Fn() -> JsValue + Send + Sync + 'static,
    {
        PropertyInfo {
            name: name.to_string(),
            ty,
            accessor: Arc::new(accessor),
        }
    }

    pub fn value(&self) -> JsValue {
        (self.accessor)()
    }
}

impl fmt::Debug for PropertyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyInfo")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .finish()
    }
}
