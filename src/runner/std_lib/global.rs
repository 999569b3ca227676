//! Global functions: `print`, `String`, `Number`, `isNaN`, `parseInt`, `parseFloat`.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::{FunctionObject, NativeFn};
use crate::runner::ds::value::{JsNumberType, JsValue};
use crate::runner::eval::context::EvalContext;

lazy_static! {
    pub static ref GLOBALS: IndexMap<&'static str, JsValue> = {
        let functions: [(&'static str, NativeFn); 6] = [
            ("print", print),
            ("String", string),
            ("Number", number),
            ("isNaN", is_nan),
            ("parseInt", parse_int),
            ("parseFloat", parse_float),
        ];
        let mut globals = IndexMap::new();
        for (name, f) in functions {
            globals.insert(name, JsValue::Function(Arc::new(FunctionObject::native(name, f))));
        }
        globals.insert("NaN", JsValue::Number(JsNumberType::NaN));
        globals.insert("Infinity", JsValue::Number(JsNumberType::PositiveInfinity));
        globals
    };
}

/// Writes its arguments, space separated, as one line of output.
fn print(ctx: &mut EvalContext, _this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let line = args
        .iter()
        .map(|v| v.to_js_string())
        .collect::<Vec<_>>()
        .join(" ");
    ctx.write_line(&line)?;
    Ok(JsValue::Undefined)
}

fn string(_ctx: &mut EvalContext, _this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    Ok(JsValue::String(match args.first() {
        Some(v) => v.to_js_string(),
        None => String::new(),
    }))
}

fn number(_ctx: &mut EvalContext, _this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    Ok(JsValue::Number(match args.first() {
        Some(v) => v.to_number(),
        None => JsNumberType::Integer(0),
    }))
}

fn is_nan(_ctx: &mut EvalContext, _this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let n = args.first().map(|v| v.to_number()).unwrap_or(JsNumberType::NaN);
    Ok(JsValue::Boolean(n.is_nan()))
}

/// Parses the longest leading integer, in base 10 unless a radix is given.
fn parse_int(_ctx: &mut EvalContext, _this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let text = super::string_arg(&args, 0);
    let radix = super::integer_arg(&args, 1, 10);
    if !(2..=36).contains(&radix) {
        return Ok(JsValue::Number(JsNumberType::NaN));
    }
    let trimmed = text.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let prefix: String = digits
        .chars()
        .take_while(|c| c.is_digit(radix as u32))
        .collect();
    Ok(JsValue::Number(
        match i64::from_str_radix(&prefix, radix as u32) {
            Ok(v) => JsNumberType::Integer(if negative { -v } else { v }),
            Err(_) => JsNumberType::NaN,
        },
    ))
}

fn parse_float(_ctx: &mut EvalContext, _this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let text = super::string_arg(&args, 0);
    let trimmed = text.trim();
    let end = trimmed
        .char_indices()
        .take_while(|(i, c)| c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+')))
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);
    Ok(JsValue::Number(match trimmed[..end].parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f.abs() < 9e15 => JsNumberType::Integer(f as i64),
        Ok(f) => JsNumberType::from_f64(f),
        Err(_) => JsNumberType::NaN,
    }))
}
