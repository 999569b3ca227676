//! Standard library built-ins.
//!
//! Global functions plus the methods available on string and array values.

pub mod array;
pub mod global;
pub mod string;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::value::{JsNumberType, JsValue};

/// Looks up a global built-in by name.
pub fn global(name: &str) -> Option<JsValue> {
    global::GLOBALS.get(name).cloned()
}

/// Forces the built-in tables so the first script does not pay for them.
pub fn init() {
    lazy_static::initialize(&global::GLOBALS);
    lazy_static::initialize(&string::STRING_METHODS);
    lazy_static::initialize(&array::ARRAY_METHODS);
}

/// Integer argument at `index`, `default` when absent. NaN counts as zero.
fn integer_arg(args: &[JsValue], index: usize, default: i64) -> i64 {
    match args.get(index) {
        None | Some(JsValue::Undefined) => default,
        Some(v) => match v.to_number() {
            JsNumberType::Integer(i) => i,
            JsNumberType::Float(f) => f.trunc() as i64,
            JsNumberType::NaN => 0,
            JsNumberType::PositiveInfinity => i64::MAX,
            JsNumberType::NegativeInfinity => i64::MIN,
        },
    }
}

fn string_arg(args: &[JsValue], index: usize) -> String {
    args.get(index)
        .map(|v| v.to_js_string())
        .unwrap_or_else(|| "undefined".to_string())
}

fn receiver_type_error(method: &str, this: &JsValue) -> JErrorType {
    JErrorType::TypeError(format!(
        "{} called on incompatible receiver {}",
        method,
        this.type_of()
    ))
}
