//! Array methods.

use std::collections::HashMap;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::NativeFn;
use crate::runner::ds::value::{join_array, JsArray, JsValue};
use crate::runner::eval::context::EvalContext;
use crate::runner::eval::function::call_function;

use super::{integer_arg, receiver_type_error};

lazy_static! {
    pub static ref ARRAY_METHODS: HashMap<&'static str, NativeFn> = {
        let mut methods: HashMap<&'static str, NativeFn> = HashMap::new();
        methods.insert("push", array_push);
        methods.insert("pop", array_pop);
        methods.insert("join", array_join);
        methods.insert("indexOf", array_index_of);
        methods.insert("includes", array_includes);
        methods.insert("slice", array_slice);
        methods.insert("forEach", array_for_each);
        methods.insert("map", array_map);
        methods.insert("filter", array_filter);
        methods
    };
}

pub fn method(name: &str) -> Option<NativeFn> {
    ARRAY_METHODS.get(name).copied()
}

fn this_array(method: &str, this: &JsValue) -> Result<JsArray, JErrorType> {
    match this {
        JsValue::Array(a) => Ok(a.clone()),
        other => Err(receiver_type_error(method, other)),
    }
}

fn array_push(_ctx: &mut EvalContext, this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let array = this_array("push", &this)?;
    let mut values = array.write();
    values.extend(args);
    Ok(JsValue::from(values.len() as i64))
}

fn array_pop(_ctx: &mut EvalContext, this: JsValue, _args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let array = this_array("pop", &this)?;
    let popped = array.write().pop();
    Ok(popped.unwrap_or(JsValue::Undefined))
}

fn array_join(_ctx: &mut EvalContext, this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let array = this_array("join", &this)?;
    let separator = match args.first() {
        None | Some(JsValue::Undefined) => ",".to_string(),
        Some(sep) => sep.to_js_string(),
    };
    Ok(JsValue::String(join_array(&array, &separator, &mut Vec::new())))
}

fn array_index_of(_ctx: &mut EvalContext, this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let array = this_array("indexOf", &this)?;
    let needle = args.first().cloned().unwrap_or(JsValue::Undefined);
    let index = array
        .read()
        .iter()
        .position(|v| v.strict_equals(&needle))
        .map(|i| i as i64)
        .unwrap_or(-1);
    Ok(JsValue::from(index))
}

fn array_includes(_ctx: &mut EvalContext, this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let array = this_array("includes", &this)?;
    let needle = args.first().cloned().unwrap_or(JsValue::Undefined);
    let found = array.read().iter().any(|v| v.strict_equals(&needle));
    Ok(JsValue::Boolean(found))
}

fn array_slice(_ctx: &mut EvalContext, this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let array = this_array("slice", &this)?;
    let values = array.read();
    let len = values.len() as i64;
    let relative = |i: i64| -> usize {
        if i < 0 {
            (len + i).max(0) as usize
        } else {
            i.min(len) as usize
        }
    };
    let start = relative(integer_arg(&args, 0, 0));
    let end = relative(integer_arg(&args, 1, len));
    let slice = if start < end {
        values[start..end].to_vec()
    } else {
        Vec::new()
    };
    Ok(JsValue::array(slice))
}

/// Snapshot of the elements so callbacks may mutate the array.
fn elements(array: &JsArray) -> Vec<JsValue> {
    array.read().clone()
}

fn callback_arg(method: &str, args: &[JsValue]) -> Result<JsValue, JErrorType> {
    match args.first() {
        Some(f @ JsValue::Function(_)) => Ok(f.clone()),
        Some(other) => Err(JErrorType::TypeError(format!(
            "{} is not a function in Array.{}",
            other.to_js_string(),
            method
        ))),
        None => Err(JErrorType::TypeError(format!(
            "Array.{} requires a callback",
            method
        ))),
    }
}

fn array_for_each(ctx: &mut EvalContext, this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let array = this_array("forEach", &this)?;
    let callback = callback_arg("forEach", &args)?;
    for (i, v) in elements(&array).into_iter().enumerate() {
        call_function(ctx, &callback, JsValue::Undefined, vec![v, JsValue::from(i as i64)])?;
    }
    Ok(JsValue::Undefined)
}

fn array_map(ctx: &mut EvalContext, this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let array = this_array("map", &this)?;
    let callback = callback_arg("map", &args)?;
    let mut mapped = Vec::new();
    for (i, v) in elements(&array).into_iter().enumerate() {
        mapped.push(call_function(ctx, &callback, JsValue::Undefined, vec![v, JsValue::from(i as i64)])?);
    }
    Ok(JsValue::array(mapped))
}

fn array_filter(ctx: &mut EvalContext, this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let array = this_array("filter", &this)?;
    let callback = callback_arg("filter", &args)?;
    let mut kept = Vec::new();
    for (i, v) in elements(&array).into_iter().enumerate() {
        let keep = call_function(ctx, &callback, JsValue::Undefined, vec![v.clone(), JsValue::from(i as i64)])?;
        if keep.is_truthy() {
            kept.push(v);
        }
    }
    Ok(JsValue::array(kept))
}
