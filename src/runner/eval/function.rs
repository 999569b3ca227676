//! Function calls and object construction.

use std::sync::Arc;

use crate::host::bindings::BindingScope;
use crate::host::invoker::select_overload;
use crate::parser::ast::FunctionData;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::lex_env::Env;
use crate::runner::ds::object::{
    param_types, FunctionKind, FunctionObject, Invocation, ScriptClass, ScriptObject,
};
use crate::runner::ds::value::JsValue;
use crate::runner::eval::context::EvalContext;
use crate::runner::eval::expression::evaluate_expression;
use crate::runner::eval::statement::execute_statements;
use crate::runner::eval::types::{CompletionType, ValueResult};
use crate::runner::program::ProgramState;

/// Calls a script function from outside the interpreter, e.g. from a resolved
/// callable, starting a fresh call stack.
pub fn call_script_function(
    program: &Arc<ProgramState>,
    scope: BindingScope,
    def: &Arc<FunctionData>,
    closure: Option<Env>,
    this_value: JsValue,
    args: Vec<JsValue>,
) -> ValueResult {
    let ctx = EvalContext::new(program.clone(), scope);
    invoke_function_body(&ctx, program.clone(), def, closure, this_value, args)
}

/// Runs `def` with fresh parameter bindings in a context one level below `ctx`.
pub fn invoke_function_body(
    ctx: &EvalContext,
    program: Arc<ProgramState>,
    def: &FunctionData,
    closure: Option<Env>,
    this_value: JsValue,
    args: Vec<JsValue>,
) -> ValueResult {
    let mut fctx = ctx.enter_function(program, closure, this_value)?;
    let mut args = args.into_iter();
    for param in &def.params {
        let value = args.next().unwrap_or(JsValue::Undefined);
        fctx.declare_local(&param.name, value);
    }
    let completion = execute_statements(&def.body, &mut fctx)?;
    Ok(match completion.completion_type {
        CompletionType::Return => completion.get_value(),
        _ => JsValue::Undefined,
    })
}

/// Calls any function value with the given receiver.
pub fn call_function(
    ctx: &mut EvalContext,
    callee: &JsValue,
    this_value: JsValue,
    args: Vec<JsValue>,
) -> ValueResult {
    let function = match callee {
        JsValue::Function(f) => f,
        other => {
            return Err(JErrorType::TypeError(format!(
                "{} is not a function",
                other.to_js_string()
            )))
        }
    };
    call_function_object(ctx, function, this_value, args)
}

pub fn call_function_object(
    ctx: &mut EvalContext,
    function: &FunctionObject,
    this_value: JsValue,
    args: Vec<JsValue>,
) -> ValueResult {
    match &function.kind {
        FunctionKind::Script(sf) => {
            let def = select_script_overload(ctx, &function.name, &sf.overloads, &args)?;
            let program = sf.program.upgrade().unwrap_or_else(|| ctx.program.clone());
            invoke_function_body(ctx, program, &def, sf.closure.clone(), this_value, args)
        }
        FunctionKind::Native(f) => f(ctx, this_value, args),
        FunctionKind::Host(callable) => callable.call(&Invocation {
            this: &this_value,
            scope: Some(&ctx.scope),
            args: &args,
        }),
        FunctionKind::Constructor(class) => Err(JErrorType::TypeError(format!(
            "Class constructor {} cannot be invoked without 'new'",
            class.name()
        ))),
    }
}

/// A lone declaration is called leniently, missing arguments becoming `undefined`.
/// Overloaded names are resolved by arity and parameter types.
pub fn select_script_overload(
    ctx: &EvalContext,
    name: &str,
    overloads: &[Arc<FunctionData>],
    args: &[JsValue],
) -> Result<Arc<FunctionData>, JErrorType> {
    if overloads.len() == 1 {
        return Ok(overloads[0].clone());
    }
    let policy = ctx.program.options().overload_policy;
    select_overload(overloads, |d| param_types(d), args, policy)
        .cloned()
        .ok_or_else(|| {
            JErrorType::TypeError(format!(
                "no overload of {} accepts {} argument(s) of the given types",
                name,
                args.len()
            ))
        })
}

/// `new Class(args)`: field initializers run first, then the constructor.
pub fn construct(ctx: &mut EvalContext, class: &Arc<ScriptClass>, args: Vec<JsValue>) -> ValueResult {
    let program = class.program.upgrade().unwrap_or_else(|| ctx.program.clone());
    let instance = Arc::new(ScriptObject::instance_of(class.clone()));
    let this_value = JsValue::Object(instance.clone());
    {
        let mut init_ctx = ctx.enter_function(program.clone(), None, this_value.clone())?;
        for field in &class.def.fields {
            let value = match &field.init {
                Some(init) => evaluate_expression(init, &mut init_ctx)?,
                None => JsValue::Undefined,
            };
            instance.define(&field.name, value);
        }
    }
    if let Some(constructor) = &class.def.constructor {
        invoke_function_body(ctx, program, constructor, None, this_value.clone(), args)?;
    }
    Ok(this_value)
}

/// Calls a method of a script class instance, resolving overloads the way plain
/// function calls do. Returns `None` when the class declares no such method.
pub fn call_class_method(
    ctx: &mut EvalContext,
    class: &Arc<ScriptClass>,
    this_value: JsValue,
    name: &str,
    args: Vec<JsValue>,
) -> Option<ValueResult> {
    let overloads: Vec<Arc<FunctionData>> = class.def.methods_named(name).cloned().collect();
    if overloads.is_empty() {
        return None;
    }
    let program = class.program.upgrade().unwrap_or_else(|| ctx.program.clone());
    Some(
        select_script_overload(ctx, name, &overloads, &args).and_then(|def| {
            invoke_function_body(ctx, program, &def, None, this_value, args)
        }),
    )
}
