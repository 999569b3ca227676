//! String methods.
//!
//! Indices count characters, not bytes.

use std::collections::HashMap;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::NativeFn;
use crate::runner::ds::value::JsValue;
use crate::runner::eval::context::EvalContext;

use super::{integer_arg, receiver_type_error, string_arg};

lazy_static! {
    pub static ref STRING_METHODS: HashMap<&'static str, NativeFn> = {
        let mut methods: HashMap<&'static str, NativeFn> = HashMap::new();
        methods.insert("toUpperCase", string_to_upper_case);
        methods.insert("toLowerCase", string_to_lower_case);
        methods.insert("trim", string_trim);
        methods.insert("indexOf", string_index_of);
        methods.insert("charAt", string_char_at);
        methods.insert("substring", string_substring);
        methods.insert("includes", string_includes);
        methods.insert("startsWith", string_starts_with);
        methods.insert("endsWith", string_ends_with);
        methods.insert("split", string_split);
        methods.insert("concat", string_concat);
        methods.insert("repeat", string_repeat);
        methods
    };
}

pub fn method(name: &str) -> Option<NativeFn> {
    STRING_METHODS.get(name).copied()
}

fn this_string(method: &str, this: &JsValue) -> Result<String, JErrorType> {
    match this {
        JsValue::String(s) => Ok(s.clone()),
        other => Err(receiver_type_error(method, other)),
    }
}

fn clamp_index(i: i64, len: usize) -> usize {
    i.clamp(0, len as i64) as usize
}

fn string_to_upper_case(_ctx: &mut EvalContext, this: JsValue, _args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    Ok(JsValue::String(this_string("toUpperCase", &this)?.to_uppercase()))
}

fn string_to_lower_case(_ctx: &mut EvalContext, this: JsValue, _args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    Ok(JsValue::String(this_string("toLowerCase", &this)?.to_lowercase()))
}

fn string_trim(_ctx: &mut EvalContext, this: JsValue, _args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    Ok(JsValue::String(this_string("trim", &this)?.trim().to_string()))
}

fn string_index_of(_ctx: &mut EvalContext, this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let s: Vec<char> = this_string("indexOf", &this)?.chars().collect();
    let search: Vec<char> = string_arg(&args, 0).chars().collect();
    let from = clamp_index(integer_arg(&args, 1, 0), s.len());
    if search.is_empty() {
        return Ok(JsValue::from(from as i64));
    }
    let found = (from..s.len())
        .find(|&i| s[i..].starts_with(&search))
        .map(|i| i as i64)
        .unwrap_or(-1);
    Ok(JsValue::from(found))
}

fn string_char_at(_ctx: &mut EvalContext, this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let s = this_string("charAt", &this)?;
    let index = integer_arg(&args, 0, 0);
    Ok(JsValue::String(if index < 0 {
        String::new()
    } else {
        s.chars()
            .nth(index as usize)
            .map(|c| c.to_string())
            .unwrap_or_default()
    }))
}

fn string_substring(_ctx: &mut EvalContext, this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let s: Vec<char> = this_string("substring", &this)?.chars().collect();
    let start = clamp_index(integer_arg(&args, 0, 0), s.len());
    let end = clamp_index(integer_arg(&args, 1, s.len() as i64), s.len());
    let (from, to) = if start <= end { (start, end) } else { (end, start) };
    Ok(JsValue::String(s[from..to].iter().collect()))
}

fn string_includes(_ctx: &mut EvalContext, this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let s = this_string("includes", &this)?;
    Ok(JsValue::Boolean(s.contains(&string_arg(&args, 0))))
}

fn string_starts_with(_ctx: &mut EvalContext, this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let s = this_string("startsWith", &this)?;
    Ok(JsValue::Boolean(s.starts_with(&string_arg(&args, 0))))
}

fn string_ends_with(_ctx: &mut EvalContext, this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let s = this_string("endsWith", &this)?;
    Ok(JsValue::Boolean(s.ends_with(&string_arg(&args, 0))))
}

fn string_split(_ctx: &mut EvalContext, this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let s = this_string("split", &this)?;
    let parts: Vec<JsValue> = match args.first() {
        None | Some(JsValue::Undefined) => vec![JsValue::String(s)],
        Some(sep) => {
            let sep = sep.to_js_string();
            if sep.is_empty() {
                s.chars().map(|c| JsValue::String(c.to_string())).collect()
            } else {
                s.split(sep.as_str()).map(JsValue::from).collect()
            }
        }
    };
    Ok(JsValue::array(parts))
}

fn string_concat(_ctx: &mut EvalContext, this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let mut s = this_string("concat", &this)?;
    for arg in &args {
        s.push_str(&arg.to_js_string());
    }
    Ok(JsValue::String(s))
}

const MAX_STRING_LENGTH: usize = 1 << 28;

fn string_repeat(_ctx: &mut EvalContext, this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let s = this_string("repeat", &this)?;
    let count = integer_arg(&args, 0, 0);
    if count < 0 {
        return Err(JErrorType::RangeError(format!("Invalid count value: {}", count)));
    }
    match s.len().checked_mul(count as usize) {
        Some(len) if len <= MAX_STRING_LENGTH => Ok(JsValue::String(s.repeat(count as usize))),
        _ => Err(JErrorType::RangeError("Invalid string length".to_string())),
    }
}
