use thiserror::Error;

use crate::runner::ds::object::ScriptObject;
use crate::runner::ds::value::JsValue;

/// Failures raised while a script runs.
#[derive(Debug, Clone, Error)]
pub enum JErrorType {
    #[error("Uncaught reference error: {0}.")]
    ReferenceError(String),
    #[error("Uncaught type error: {0}.")]
    TypeError(String),
    #[error("Uncaught range error: {0}.")]
    RangeError(String),
    #[error("Uncaught syntax error: {0}.")]
    SyntaxError(String),
    /// A value raised by a `throw` statement.
    #[error("Uncaught {0}")]
    Thrown(JsValue),
    #[error("Internal error: {0}.")]
    InternalError(String),
}

impl JErrorType {
    pub fn name(&self) -> &'static str {
        match self {
            JErrorType::ReferenceError(_) => "ReferenceError",
            JErrorType::TypeError(_) => "TypeError",
            JErrorType::RangeError(_) => "RangeError",
            JErrorType::SyntaxError(_) => "SyntaxError",
            JErrorType::Thrown(_) => "Error",
            JErrorType::InternalError(_) => "InternalError",
        }
    }

    /// The value a `catch` clause binds for this error. Thrown values are handed back
    /// unchanged; engine errors become an `Error` object with `name` and `message`.
    pub fn to_js_value(&self) -> JsValue {
        match self {
            JErrorType::Thrown(v) => v.clone(),
            JErrorType::ReferenceError(m)
            | JErrorType::TypeError(m)
            | JErrorType::RangeError(m)
            | JErrorType::SyntaxError(m)
            | JErrorType::InternalError(m) => {
                let error = ScriptObject::new("Error");
                error.define("name", JsValue::from(self.name()));
                error.define("message", JsValue::from(m.as_str()));
                JsValue::object(error)
            }
        }
    }
}
