//! Expression evaluation.

use std::sync::Arc;

use crate::parser::ast::{
    BinaryOperator, ExpressionType, LiteralType, LogicalOperator, NumberLiteralType,
    UnaryOperator, UpdateOperator,
};
use crate::host::invoker::select_overload;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::{FunctionKind, FunctionObject, Invocation, ScriptObject};
use crate::runner::ds::value::{JsNumberType, JsValue};
use crate::runner::eval::context::EvalContext;
use crate::runner::eval::function::{call_class_method, call_function, construct};
use crate::runner::eval::types::ValueResult;
use crate::runner::program::ProgramState;
use crate::runner::std_lib;

/// Evaluate an expression and return its value.
pub fn evaluate_expression(expr: &ExpressionType, ctx: &mut EvalContext) -> ValueResult {
    match expr {
        ExpressionType::Literal(lit) => Ok(evaluate_literal(lit)),
        ExpressionType::Identifier(name) => ctx.get_binding(name),
        ExpressionType::ThisExpression => Ok(ctx.this_value.clone()),
        ExpressionType::ArrayExpression(elements) => {
            let mut values = Vec::with_capacity(elements.len());
            for element in elements {
                values.push(evaluate_expression(element, ctx)?);
            }
            Ok(JsValue::array(values))
        }
        ExpressionType::ObjectExpression(properties) => {
            let obj = ScriptObject::new("Object");
            for (key, value_expr) in properties {
                let value = evaluate_expression(value_expr, ctx)?;
                obj.define(key, value);
            }
            Ok(JsValue::object(obj))
        }
        ExpressionType::FunctionExpression(def) => Ok(JsValue::Function(Arc::new(
            FunctionObject::script(
                def.name(),
                vec![def.clone()],
                ctx.env().cloned(),
                Arc::downgrade(&ctx.program),
            ),
        ))),
        ExpressionType::UnaryExpression { operator, argument } => {
            evaluate_unary(*operator, argument, ctx)
        }
        ExpressionType::UpdateExpression {
            operator,
            argument,
            prefix,
        } => {
            let old_value = evaluate_expression(argument, ctx)?.to_number();
            let one = JsNumberType::Integer(1);
            let new_value = match operator {
                UpdateOperator::PlusPlus => numeric_op(BinaryOperator::Add, &old_value, &one),
                UpdateOperator::MinusMinus => {
                    numeric_op(BinaryOperator::Subtract, &old_value, &one)
                }
            };
            put_value(argument, JsValue::Number(new_value.clone()), ctx)?;
            Ok(JsValue::Number(if *prefix { new_value } else { old_value }))
        }
        ExpressionType::BinaryExpression {
            operator,
            left,
            right,
        } => {
            let l = evaluate_expression(left, ctx)?;
            let r = evaluate_expression(right, ctx)?;
            Ok(evaluate_binary(*operator, &l, &r))
        }
        ExpressionType::LogicalExpression {
            operator,
            left,
            right,
        } => {
            let l = evaluate_expression(left, ctx)?;
            match operator {
                LogicalOperator::And if !l.is_truthy() => Ok(l),
                LogicalOperator::Or if l.is_truthy() => Ok(l),
                _ => evaluate_expression(right, ctx),
            }
        }
        ExpressionType::AssignmentExpression {
            operator,
            left,
            right,
        } => {
            let value = match operator.binary_operator() {
                None => evaluate_expression(right, ctx)?,
                Some(op) => {
                    let current = evaluate_expression(left, ctx)?;
                    let r = evaluate_expression(right, ctx)?;
                    evaluate_binary(op, &current, &r)
                }
            };
            put_value(left, value.clone(), ctx)?;
            Ok(value)
        }
        ExpressionType::ConditionalExpression {
            test,
            consequent,
            alternate,
        } => {
            if evaluate_expression(test, ctx)?.is_truthy() {
                evaluate_expression(consequent, ctx)
            } else {
                evaluate_expression(alternate, ctx)
            }
        }
        ExpressionType::MemberExpression { object, property } => {
            let obj = evaluate_expression(object, ctx)?;
            get_member(&obj, property)
        }
        ExpressionType::IndexExpression { object, index } => {
            let obj = evaluate_expression(object, ctx)?;
            let idx = evaluate_expression(index, ctx)?;
            get_indexed(&obj, &idx)
        }
        ExpressionType::CallExpression { callee, arguments } => {
            evaluate_call(callee, arguments, ctx)
        }
        ExpressionType::NewExpression { callee, arguments } => {
            let constructor = evaluate_expression(callee, ctx)?;
            let args = evaluate_arguments(arguments, ctx)?;
            match &constructor {
                JsValue::Function(f) => match &f.kind {
                    FunctionKind::Constructor(class) => construct(ctx, class, args),
                    _ => Err(JErrorType::TypeError(format!("{} is not a constructor", f.name))),
                },
                other => Err(JErrorType::TypeError(format!(
                    "{} is not a constructor",
                    other.to_js_string()
                ))),
            }
        }
    }
}

fn evaluate_literal(lit: &LiteralType) -> JsValue {
    match lit {
        LiteralType::NullLiteral => JsValue::Null,
        LiteralType::UndefinedLiteral => JsValue::Undefined,
        LiteralType::BooleanLiteral(b) => JsValue::Boolean(*b),
        LiteralType::StringLiteral(s) => JsValue::String(s.clone()),
        LiteralType::NumberLiteral(NumberLiteralType::IntegerLiteral(i)) => {
            JsValue::Number(JsNumberType::Integer(*i))
        }
        LiteralType::NumberLiteral(NumberLiteralType::FloatLiteral(f)) => {
            JsValue::Number(JsNumberType::from_f64(*f))
        }
    }
}

fn evaluate_unary(
    operator: UnaryOperator,
    argument: &ExpressionType,
    ctx: &mut EvalContext,
) -> ValueResult {
    if operator == UnaryOperator::TypeOf {
        if let ExpressionType::Identifier(name) = argument {
            return Ok(match ctx.get_binding(name) {
                Ok(v) => JsValue::from(v.type_of()),
                Err(JErrorType::ReferenceError(_)) => JsValue::from("undefined"),
                Err(e) => return Err(e),
            });
        }
    }
    let value = evaluate_expression(argument, ctx)?;
    Ok(match operator {
        UnaryOperator::Minus => JsValue::Number(negate(&value.to_number())),
        UnaryOperator::Plus => JsValue::Number(value.to_number()),
        UnaryOperator::LogicalNot => JsValue::Boolean(!value.is_truthy()),
        UnaryOperator::TypeOf => JsValue::from(value.type_of()),
    })
}

fn negate(n: &JsNumberType) -> JsNumberType {
    match n {
        JsNumberType::Integer(0) => JsNumberType::Float(-0.0),
        JsNumberType::Integer(i) => match i.checked_neg() {
            Some(v) => JsNumberType::Integer(v),
            None => JsNumberType::Float(-(*i as f64)),
        },
        JsNumberType::Float(f) => JsNumberType::Float(-f),
        JsNumberType::NaN => JsNumberType::NaN,
        JsNumberType::PositiveInfinity => JsNumberType::NegativeInfinity,
        JsNumberType::NegativeInfinity => JsNumberType::PositiveInfinity,
    }
}

pub fn evaluate_binary(operator: BinaryOperator, l: &JsValue, r: &JsValue) -> JsValue {
    match operator {
        BinaryOperator::Add => {
            if is_numeric_primitive(l) && is_numeric_primitive(r) {
                JsValue::Number(numeric_op(operator, &l.to_number(), &r.to_number()))
            } else {
                JsValue::String(format!("{}{}", l.to_js_string(), r.to_js_string()))
            }
        }
        BinaryOperator::Subtract
        | BinaryOperator::Multiply
        | BinaryOperator::Divide
        | BinaryOperator::Modulo => {
            JsValue::Number(numeric_op(operator, &l.to_number(), &r.to_number()))
        }
        BinaryOperator::LooselyEqual => JsValue::Boolean(l.loose_equals(r)),
        BinaryOperator::LooselyUnequal => JsValue::Boolean(!l.loose_equals(r)),
        BinaryOperator::StrictlyEqual => JsValue::Boolean(l.strict_equals(r)),
        BinaryOperator::StrictlyUnequal => JsValue::Boolean(!l.strict_equals(r)),
        BinaryOperator::LessThan
        | BinaryOperator::LessThanEqual
        | BinaryOperator::GreaterThan
        | BinaryOperator::GreaterThanEqual => JsValue::Boolean(compare(operator, l, r)),
    }
}

fn is_numeric_primitive(v: &JsValue) -> bool {
    matches!(
        v,
        JsValue::Number(_) | JsValue::Boolean(_) | JsValue::Null | JsValue::Undefined
    )
}

/// Integer arithmetic stays integral while it fits; everything else goes through f64.
pub fn numeric_op(operator: BinaryOperator, a: &JsNumberType, b: &JsNumberType) -> JsNumberType {
    if let (JsNumberType::Integer(x), JsNumberType::Integer(y)) = (a, b) {
        let (x, y) = (*x, *y);
        let exact = match operator {
            BinaryOperator::Add => x.checked_add(y),
            BinaryOperator::Subtract => x.checked_sub(y),
            BinaryOperator::Multiply => x.checked_mul(y),
            BinaryOperator::Divide => match x.checked_rem(y) {
                Some(0) => x.checked_div(y),
                _ => None,
            },
            BinaryOperator::Modulo => x.checked_rem(y),
            _ => None,
        };
        if let Some(v) = exact {
            return JsNumberType::Integer(v);
        }
    }
    let (x, y) = (a.as_f64(), b.as_f64());
    JsNumberType::from_f64(match operator {
        BinaryOperator::Add => x + y,
        BinaryOperator::Subtract => x - y,
        BinaryOperator::Multiply => x * y,
        BinaryOperator::Divide => x / y,
        BinaryOperator::Modulo => x % y,
        _ => f64::NAN,
    })
}

fn compare(operator: BinaryOperator, l: &JsValue, r: &JsValue) -> bool {
    if let (JsValue::String(a), JsValue::String(b)) = (l, r) {
        return match operator {
            BinaryOperator::LessThan => a < b,
            BinaryOperator::LessThanEqual => a <= b,
            BinaryOperator::GreaterThan => a > b,
            _ => a >= b,
        };
    }
    let (x, y) = (l.to_number().as_f64(), r.to_number().as_f64());
    match operator {
        BinaryOperator::LessThan => x < y,
        BinaryOperator::LessThanEqual => x <= y,
        BinaryOperator::GreaterThan => x > y,
        _ => x >= y,
    }
}

fn evaluate_arguments(arguments: &[ExpressionType], ctx: &mut EvalContext) -> Result<Vec<JsValue>, JErrorType> {
    let mut values = Vec::with_capacity(arguments.len());
    for arg in arguments {
        values.push(evaluate_expression(arg, ctx)?);
    }
    Ok(values)
}

/// Stores `value` into an assignment target.
fn put_value(target: &ExpressionType, value: JsValue, ctx: &mut EvalContext) -> Result<(), JErrorType> {
    match target {
        ExpressionType::Identifier(name) => ctx.set_binding(name, value),
        ExpressionType::MemberExpression { object, property } => {
            let obj = evaluate_expression(object, ctx)?;
            put_member(&obj, property, value)
        }
        ExpressionType::IndexExpression { object, index } => {
            let obj = evaluate_expression(object, ctx)?;
            let idx = evaluate_expression(index, ctx)?;
            match &obj {
                JsValue::Array(values) => {
                    let i = array_index(&idx)
                        .filter(|i| *i < MAX_ARRAY_LENGTH)
                        .ok_or_else(|| {
                            JErrorType::RangeError(format!("Invalid array index {}", idx))
                        })?;
                    let mut values = values.write();
                    if i >= values.len() {
                        let len = i.checked_add(1).ok_or_else(|| {
                            JErrorType::RangeError(format!("Invalid array index {}", idx))
                        })?;
                        values.resize(len, JsValue::Undefined);
                    }
                    values[i] = value;
                    Ok(())
                }
                _ => put_member(&obj, &idx.to_js_string(), value),
            }
        }
        _ => Err(JErrorType::SyntaxError(
            "Invalid left-hand side in assignment".to_string(),
        )),
    }
}

fn put_member(obj: &JsValue, property: &str, value: JsValue) -> Result<(), JErrorType> {
    match obj {
        JsValue::Object(o) => o.set_property(property, value),
        JsValue::Undefined | JsValue::Null => Err(JErrorType::TypeError(format!(
            "Cannot set property '{}' of {}",
            property,
            obj.to_js_string()
        ))),
        // Writes to primitives are silently dropped.
        _ => Ok(()),
    }
}

/// Writes past this index are refused rather than grown into.
const MAX_ARRAY_LENGTH: usize = 1 << 24;

fn array_index(idx: &JsValue) -> Option<usize> {
    match idx.to_number() {
        JsNumberType::Integer(i) if i >= 0 => Some(i as usize),
        JsNumberType::Float(f) if f >= 0.0 && f.fract() == 0.0 => Some(f as usize),
        _ => None,
    }
}

/// Property read. `Class` and `IntrinsicType` are answered for every object.
pub fn get_member(obj: &JsValue, property: &str) -> ValueResult {
    match obj {
        JsValue::Undefined | JsValue::Null => Err(JErrorType::TypeError(format!(
            "Cannot read property '{}' of {}",
            property,
            obj.to_js_string()
        ))),
        JsValue::String(s) if property == "length" => {
            Ok(JsValue::from(s.chars().count() as i64))
        }
        JsValue::Array(values) if property == "length" => {
            Ok(JsValue::from(values.read().len() as i64))
        }
        JsValue::Function(f) if property == "name" => Ok(JsValue::from(f.name.as_str())),
        JsValue::Object(o) => Ok(match o.get_property(property) {
            Some(v) => v,
            None if property == "Class" || property == "IntrinsicType" => {
                JsValue::from(o.class_name())
            }
            None => JsValue::Undefined,
        }),
        _ => Ok(JsValue::Undefined),
    }
}

fn get_indexed(obj: &JsValue, idx: &JsValue) -> ValueResult {
    match obj {
        JsValue::Array(values) => Ok(array_index(idx)
            .and_then(|i| values.read().get(i).cloned())
            .unwrap_or(JsValue::Undefined)),
        JsValue::String(s) => match array_index(idx) {
            Some(i) => Ok(s
                .chars()
                .nth(i)
                .map(|c| JsValue::String(c.to_string()))
                .unwrap_or(JsValue::Undefined)),
            None => get_member(obj, &idx.to_js_string()),
        },
        _ => get_member(obj, &idx.to_js_string()),
    }
}

fn evaluate_call(
    callee: &ExpressionType,
    arguments: &[ExpressionType],
    ctx: &mut EvalContext,
) -> ValueResult {
    if let ExpressionType::MemberExpression { object, property } = callee {
        let this_value = evaluate_expression(object, ctx)?;
        let args = evaluate_arguments(arguments, ctx)?;
        return call_method(ctx, this_value, property, args);
    }
    let function = evaluate_expression(callee, ctx)?;
    let args = evaluate_arguments(arguments, ctx)?;
    call_function(ctx, &function, JsValue::Undefined, args)
}

/// `receiver.name(args)`: built-in methods on strings and arrays, class methods on
/// script objects, function-valued properties, then the object's declared callables.
pub fn call_method(
    ctx: &mut EvalContext,
    this_value: JsValue,
    name: &str,
    args: Vec<JsValue>,
) -> ValueResult {
    match &this_value {
        JsValue::String(_) => {
            return match std_lib::string::method(name) {
                Some(f) => f(ctx, this_value, args),
                None => Err(not_a_function(&this_value, name)),
            }
        }
        JsValue::Array(_) => {
            return match std_lib::array::method(name) {
                Some(f) => f(ctx, this_value, args),
                None => Err(not_a_function(&this_value, name)),
            }
        }
        JsValue::Object(o) => {
            let o = o.clone();
            if let Some(script_obj) = o.as_any().downcast_ref::<ScriptObject>() {
                if let Some(class) = script_obj.class() {
                    if let Some(result) = call_class_method(ctx, class, this_value.clone(), name, args.clone()) {
                        return result;
                    }
                }
            }
            if let Some(program) = o.as_any().downcast_ref::<ProgramState>() {
                if let Some(function) = program.function_value(name) {
                    return call_function(ctx, &function, this_value.clone(), args);
                }
            }
            if let Some(property) = o.get_property(name) {
                return call_function(ctx, &property, this_value.clone(), args);
            }
            let candidates: Vec<_> = o
                .declared_callables()
                .into_iter()
                .filter(|c| c.name == name && !c.signature.receives_scope)
                .collect();
            let policy = ctx.program.options().overload_policy;
            return match select_overload(&candidates, |c| c.signature.params.clone(), &args, policy) {
                Some(callable) => callable.call(&Invocation {
                    this: &this_value,
                    scope: Some(&ctx.scope),
                    args: &args,
                }),
                None if candidates.is_empty() => Err(not_a_function(&this_value, name)),
                None => Err(JErrorType::TypeError(format!(
                    "no overload of {}.{} accepts {} argument(s) of the given types",
                    o.class_name(),
                    name,
                    args.len()
                ))),
            };
        }
        _ => {}
    }
    let property = get_member(&this_value, name)?;
    call_function(ctx, &property, this_value, args)
}

fn not_a_function(this_value: &JsValue, name: &str) -> JErrorType {
    let receiver = match this_value {
        JsValue::Object(o) => o.class_name().to_string(),
        other => other.type_of().to_string(),
    };
    JErrorType::TypeError(format!("{}.{} is not a function", receiver, name))
}
