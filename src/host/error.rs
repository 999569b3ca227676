use thiserror::Error;

use crate::host::compiler::ParseError;
use crate::runner::ds::error::JErrorType;

/// Failures surfaced to the host by the bridge.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The source did not parse.
    #[error("compilation failed: {0}")]
    Compilation(#[from] ParseError),

    /// The program raised while its top level ran.
    #[error("evaluation failed: {source}")]
    Evaluation {
        #[source]
        source: JErrorType,
    },

    /// Resolution found nothing matching the name, arity and argument types.
    #[error("no callable `{name}` accepting {arity} argument(s)")]
    NoSuchCallable { name: String, arity: usize },

    /// A callable was resolved but failed while running.
    #[error("invocation of `{name}` failed: {source}")]
    Invocation {
        name: String,
        #[source]
        source: JErrorType,
    },

    /// Nothing has been evaluated on this engine yet.
    #[error("no program has been evaluated on this engine")]
    NotCompiled,

    #[error("`{name}` is bound in the global scope and cannot be overwritten")]
    BindingCollision { name: String },

    #[error("engine initialization failed: {0}")]
    Initialization(String),

    #[error("cannot read script source: {0}")]
    Io(#[from] std::io::Error),
}

impl ScriptError {
    pub fn is_no_such_callable(&self) -> bool {
        matches!(self, ScriptError::NoSuchCallable { .. })
    }
}
