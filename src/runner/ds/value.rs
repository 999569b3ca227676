use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::{Callable, FunctionObject, JsObject, Signature};
use crate::runner::ds::types::JsType;

pub const TYPE_STR_UNDEFINED: &str = "undefined";
pub const TYPE_STR_NULL: &str = "null";
pub const TYPE_STR_BOOLEAN: &str = "boolean";
pub const TYPE_STR_NUMBER: &str = "number";
pub const TYPE_STR_STRING: &str = "string";
pub const TYPE_STR_OBJECT: &str = "object";
pub const TYPE_STR_FUNCTION: &str = "function";

pub type JsArray = Arc<RwLock<Vec<JsValue>>>;

/// Joins the elements of `array`, rendering nullish elements and arrays already being
/// joined further up (`visited`) as empty strings.
pub fn join_array(
    array: &JsArray,
    separator: &str,
    visited: &mut Vec<*const RwLock<Vec<JsValue>>>,
) -> String {
    let ptr = Arc::as_ptr(array);
    if visited.contains(&ptr) {
        return String::new();
    }
    visited.push(ptr);
    let joined = array
        .read()
        .iter()
        .map(|v| match v {
            JsValue::Undefined | JsValue::Null => String::new(),
            JsValue::Array(inner) => join_array(inner, ",", visited),
            _ => v.to_js_string(),
        })
        .collect::<Vec<_>>()
        .join(separator);
    visited.pop();
    joined
}

/// A value shared between the host and running scripts.
///
/// Reference values (arrays, objects, functions) are reference counted, so cloning a
/// value never copies the underlying storage.
#[derive(Clone)]
pub enum JsValue {
    Undefined,
    Null,
    Boolean(bool),
    String(String),
    Number(JsNumberType),
    Array(JsArray),
    Object(Arc<dyn JsObject>),
    Function(Arc<FunctionObject>),
}

impl JsValue {
    pub fn array(values: Vec<JsValue>) -> Self {
        JsValue::Array(Arc::new(RwLock::new(values)))
    }

    pub fn object<O: JsObject + 'static>(obj: O) -> Self {
        JsValue::Object(Arc::new(obj))
    }

    /// Wrap a host closure so scripts can call it like any other function.
    pub fn host_function<F>(name: &str, params: Vec<JsType>, f: F) -> Self
    where
        F: Fn(&[JsValue]) -> Result<JsValue, JErrorType> + Send + Sync + 'static,
    {
        let callable = Callable::new(name, Signature::new(params), move |inv| f(inv.args));
        JsValue::Function(Arc::new(FunctionObject::host(callable)))
    }

    pub fn type_of(&self) -> &'static str {
        match self {
            JsValue::Undefined => TYPE_STR_UNDEFINED,
            JsValue::Null => TYPE_STR_OBJECT,
            JsValue::Boolean(_) => TYPE_STR_BOOLEAN,
            JsValue::String(_) => TYPE_STR_STRING,
            JsValue::Number(_) => TYPE_STR_NUMBER,
            JsValue::Array(_) | JsValue::Object(_) => TYPE_STR_OBJECT,
            JsValue::Function(_) => TYPE_STR_FUNCTION,
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, JsValue::Undefined | JsValue::Null)
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            JsValue::Undefined | JsValue::Null => false,
            JsValue::Boolean(b) => *b,
            JsValue::String(s) => !s.is_empty(),
            JsValue::Number(n) => match n {
                JsNumberType::Integer(i) => *i != 0,
                JsNumberType::Float(f) => *f != 0.0,
                JsNumberType::NaN => false,
                JsNumberType::PositiveInfinity | JsNumberType::NegativeInfinity => true,
            },
            JsValue::Array(_) | JsValue::Object(_) | JsValue::Function(_) => true,
        }
    }

    pub fn to_number(&self) -> JsNumberType {
        match self {
            JsValue::Undefined => JsNumberType::NaN,
            JsValue::Null => JsNumberType::Integer(0),
            JsValue::Boolean(b) => JsNumberType::Integer(*b as i64),
            JsValue::Number(n) => n.clone(),
            JsValue::String(s) => JsNumberType::parse(s),
            // Through the string form, so `[]` is 0, `[7]` is 7 and a cycle ends.
            JsValue::Array(a) => JsNumberType::parse(&join_array(a, ",", &mut Vec::new())),
            JsValue::Object(_) | JsValue::Function(_) => JsNumberType::NaN,
        }
    }

    pub fn to_js_string(&self) -> String {
        match self {
            JsValue::Undefined => TYPE_STR_UNDEFINED.to_string(),
            JsValue::Null => TYPE_STR_NULL.to_string(),
            JsValue::Boolean(b) => b.to_string(),
            JsValue::String(s) => s.clone(),
            JsValue::Number(n) => n.to_string(),
            JsValue::Array(a) => join_array(a, ",", &mut Vec::new()),
            JsValue::Object(o) => format!("[object {}]", o.class_name()),
            JsValue::Function(f) => format!("function {}() {{ [code] }}", f.name),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            JsValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            JsValue::Number(JsNumberType::Integer(i)) => Some(*i),
            JsValue::Number(JsNumberType::Float(f)) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            JsValue::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Arc<dyn JsObject>> {
        match self {
            JsValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// `===` semantics: no coercion, references compare by identity.
    pub fn strict_equals(&self, other: &JsValue) -> bool {
        match (self, other) {
            (JsValue::Number(a), JsValue::Number(b)) => a.numeric_eq(b),
            (JsValue::Undefined, JsValue::Undefined) | (JsValue::Null, JsValue::Null) => true,
            (JsValue::Boolean(a), JsValue::Boolean(b)) => a == b,
            (JsValue::String(a), JsValue::String(b)) => a == b,
            (JsValue::Array(a), JsValue::Array(b)) => Arc::ptr_eq(a, b),
            (JsValue::Object(a), JsValue::Object(b)) => same_object(a, b),
            (JsValue::Function(a), JsValue::Function(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// `==` semantics for the primitive coercions the language supports.
    pub fn loose_equals(&self, other: &JsValue) -> bool {
        match (self, other) {
            (a, b) if a.is_nullish() && b.is_nullish() => true,
            (a, b) if a.is_nullish() || b.is_nullish() => false,
            (JsValue::Number(_), JsValue::String(_))
            | (JsValue::String(_), JsValue::Number(_))
            | (JsValue::Boolean(_), _)
            | (_, JsValue::Boolean(_)) => self.to_number().numeric_eq(&other.to_number()),
            _ => self.strict_equals(other),
        }
    }
}

fn same_object(a: &Arc<dyn JsObject>, b: &Arc<dyn JsObject>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const u8,
        Arc::as_ptr(b) as *const u8,
    )
}

impl Display for JsValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_js_string())
    }
}

impl fmt::Debug for JsValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            JsValue::Undefined => write!(f, "JsValue::Undefined"),
            JsValue::Null => write!(f, "JsValue::Null"),
            JsValue::Boolean(b) => write!(f, "JsValue::Boolean({})", b),
            JsValue::String(s) => write!(f, "JsValue::String({:?})", s),
            JsValue::Number(n) => write!(f, "JsValue::Number({:?})", n),
            JsValue::Array(a) => {
                write!(f, "JsValue::Array([{}])", join_array(a, ", ", &mut Vec::new()))
            }
            JsValue::Object(o) => write!(f, "JsValue::Object({})", o.class_name()),
            JsValue::Function(func) => write!(f, "JsValue::Function({})", func.name),
        }
    }
}

/// Structural equality, used by host code and tests. Scripts use `strict_equals`.
impl PartialEq for JsValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (JsValue::Undefined, JsValue::Undefined) => true,
            (JsValue::Null, JsValue::Null) => true,
            (JsValue::Boolean(a), JsValue::Boolean(b)) => a == b,
            (JsValue::String(a), JsValue::String(b)) => a == b,
            (JsValue::Number(a), JsValue::Number(b)) => a == b,
            (JsValue::Array(a), JsValue::Array(b)) => Arc::ptr_eq(a, b) || *a.read() == *b.read(),
            (JsValue::Object(a), JsValue::Object(b)) => same_object(a, b),
            (JsValue::Function(a), JsValue::Function(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for JsValue {
    fn from(b: bool) -> Self {
        JsValue::Boolean(b)
    }
}

impl From<i32> for JsValue {
    fn from(i: i32) -> Self {
        JsValue::Number(JsNumberType::Integer(i as i64))
    }
}

impl From<i64> for JsValue {
    fn from(i: i64) -> Self {
        JsValue::Number(JsNumberType::Integer(i))
    }
}

impl From<f64> for JsValue {
    fn from(f: f64) -> Self {
        JsValue::Number(JsNumberType::from_f64(f))
    }
}

impl From<&str> for JsValue {
    fn from(s: &str) -> Self {
        JsValue::String(s.to_string())
    }
}

impl From<String> for JsValue {
    fn from(s: String) -> Self {
        JsValue::String(s)
    }
}

impl From<JsNumberType> for JsValue {
    fn from(n: JsNumberType) -> Self {
        JsValue::Number(n)
    }
}

impl From<Vec<JsValue>> for JsValue {
    fn from(values: Vec<JsValue>) -> Self {
        JsValue::array(values)
    }
}

#[derive(Debug, Clone)]
pub enum JsNumberType {
    Integer(i64),
    Float(f64),
    NaN,
    PositiveInfinity,
    NegativeInfinity,
}

impl JsNumberType {
    pub fn from_f64(f: f64) -> Self {
        if f.is_nan() {
            JsNumberType::NaN
        } else if f == f64::INFINITY {
            JsNumberType::PositiveInfinity
        } else if f == f64::NEG_INFINITY {
            JsNumberType::NegativeInfinity
        } else {
            JsNumberType::Float(f)
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            JsNumberType::Integer(i) => *i as f64,
            JsNumberType::Float(f) => *f,
            JsNumberType::NaN => f64::NAN,
            JsNumberType::PositiveInfinity => f64::INFINITY,
            JsNumberType::NegativeInfinity => f64::NEG_INFINITY,
        }
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, JsNumberType::NaN)
    }

    /// Numeric string conversion. Empty and blank strings convert to zero.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            return JsNumberType::Integer(0);
        }
        match s {
            "Infinity" | "+Infinity" => return JsNumberType::PositiveInfinity,
            "-Infinity" => return JsNumberType::NegativeInfinity,
            _ => {}
        }
        if let Ok(i) = s.parse::<i64>() {
            return JsNumberType::Integer(i);
        }
        if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
            return JsNumberType::NaN;
        }
        match s.parse::<f64>() {
            Ok(f) => JsNumberType::from_f64(f),
            Err(_) => JsNumberType::NaN,
        }
    }

    /// IEEE comparison: NaN never equals anything.
    pub fn numeric_eq(&self, other: &JsNumberType) -> bool {
        match (self, other) {
            (JsNumberType::Integer(a), JsNumberType::Integer(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl PartialEq for JsNumberType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (JsNumberType::NaN, JsNumberType::NaN) => true,
            _ => self.numeric_eq(other),
        }
    }
}

impl Display for JsNumberType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            JsNumberType::Integer(i) => write!(f, "{}", i),
            JsNumberType::Float(nf) => {
                if *nf == 0.0 {
                    write!(f, "0")
                } else if nf.fract() == 0.0 && nf.abs() < 1e21 {
                    write!(f, "{:.0}", nf)
                } else {
                    write!(f, "{}", nf)
                }
            }
            JsNumberType::NaN => write!(f, "NaN"),
            JsNumberType::PositiveInfinity => write!(f, "Infinity"),
            JsNumberType::NegativeInfinity => write!(f, "-Infinity"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_print_like_script_numbers() {
        assert_eq!(JsValue::from(4.0).to_js_string(), "4");
        assert_eq!(JsValue::from(2.5).to_js_string(), "2.5");
        assert_eq!(JsValue::from(f64::INFINITY).to_js_string(), "Infinity");
        assert_eq!(JsValue::Number(JsNumberType::NaN).to_js_string(), "NaN");
    }

    #[test]
    fn string_conversion_to_number() {
        assert_eq!(JsNumberType::parse(" 42 "), JsNumberType::Integer(42));
        assert_eq!(JsNumberType::parse(""), JsNumberType::Integer(0));
        assert_eq!(JsNumberType::parse("1.5"), JsNumberType::Float(1.5));
        assert!(JsNumberType::parse("abc").is_nan());
        assert!(JsNumberType::parse("inf").is_nan());
    }

    #[test]
    fn equality_flavours() {
        let one = JsValue::from(1);
        assert!(one.strict_equals(&JsValue::from(1.0)));
        assert!(!one.strict_equals(&JsValue::from("1")));
        assert!(one.loose_equals(&JsValue::from("1")));
        assert!(JsValue::Null.loose_equals(&JsValue::Undefined));
        assert!(!JsValue::Null.strict_equals(&JsValue::Undefined));
        let nan = JsValue::Number(JsNumberType::NaN);
        assert!(!nan.strict_equals(&nan));
    }

    #[test]
    fn arrays_join_with_commas() {
        let arr = JsValue::array(vec![JsValue::from(1), JsValue::Null, JsValue::from("x")]);
        assert_eq!(arr.to_js_string(), "1,,x");
    }
}
