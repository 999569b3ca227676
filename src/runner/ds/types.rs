use std::fmt;
use std::fmt::{Display, Formatter};

use crate::runner::ds::value::JsValue;

/// Runtime type descriptor attached to bound values and declared parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JsType {
    Any,
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Array,
    Function,
    Object,
    /// A named class, either script-declared or a host object's class name.
    Class(String),
}

impl JsType {
    /// The descriptor of a value, taken from its tag. Never looks through null.
    pub fn of(value: &JsValue) -> JsType {
        match value {
            JsValue::Undefined => JsType::Undefined,
            JsValue::Null => JsType::Null,
            JsValue::Boolean(_) => JsType::Boolean,
            JsValue::String(_) => JsType::String,
            JsValue::Number(_) => JsType::Number,
            JsValue::Array(_) => JsType::Array,
            JsValue::Function(_) => JsType::Function,
            JsValue::Object(o) => {
                let class_name = o.class_name();
                if class_name == "Object" {
                    JsType::Object
                } else {
                    JsType::Class(class_name.to_string())
                }
            }
        }
    }

    /// Maps a source annotation such as `: String` or `: number` to a descriptor.
    pub fn from_annotation(name: &str) -> JsType {
        match name {
            "any" | "Any" | "var" => JsType::Any,
            "undefined" | "void" => JsType::Undefined,
            "null" => JsType::Null,
            "boolean" | "Boolean" | "bool" => JsType::Boolean,
            "number" | "Number" | "int" | "float" | "double" => JsType::Number,
            "string" | "String" => JsType::String,
            "array" | "Array" => JsType::Array,
            "function" | "Function" => JsType::Function,
            "object" | "Object" => JsType::Object,
            other => JsType::Class(other.to_string()),
        }
    }

    /// Assignability of a value of type `actual` to a slot declared as `self`.
    ///
    /// Null and undefined are accepted by every slot, as are all reference types by
    /// `Object`.
    pub fn accepts(&self, actual: &JsType) -> bool {
        match (self, actual) {
            (JsType::Any, _) => true,
            (_, JsType::Null) | (_, JsType::Undefined) => true,
            (JsType::Object, JsType::Class(_))
            | (JsType::Object, JsType::Array)
            | (JsType::Object, JsType::Function) => true,
            (declared, actual) => declared == actual,
        }
    }

    /// Ranks how well `actual` matches this slot: 2 for an exact match, 1 for an
    /// assignable one, 0 for `Any`. Only meaningful when `accepts` holds.
    pub fn specificity(&self, actual: &JsType) -> u32 {
        match self {
            JsType::Any => 0,
            declared if declared == actual => 2,
            _ => 1,
        }
    }
}

impl Display for JsType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            JsType::Any => write!(f, "any"),
            JsType::Undefined => write!(f, "undefined"),
            JsType::Null => write!(f, "null"),
            JsType::Boolean => write!(f, "boolean"),
            JsType::Number => write!(f, "number"),
            JsType::String => write!(f, "string"),
            JsType::Array => write!(f, "array"),
            JsType::Function => write!(f, "function"),
            JsType::Object => write!(f, "object"),
            JsType::Class(name) => write!(f, "{}", name),
        }
    }
}
