//! Statement execution.
//!
//! This module provides statement execution logic for the interpreter.

use std::sync::Arc;

use crate::parser::ast::{
    BlockStatementData, CatchClauseData, ExpressionType, ForInit, StatementType,
    VariableDeclarationData,
};
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::{FunctionObject, ScriptClass};
use crate::runner::ds::value::JsValue;
use crate::runner::eval::context::EvalContext;
use crate::runner::eval::expression::evaluate_expression;
use crate::runner::eval::types::{Completion, CompletionType, EvalResult};

/// Execute a statement and return its completion.
pub fn execute_statement(stmt: &StatementType, ctx: &mut EvalContext) -> EvalResult {
    match stmt {
        StatementType::EmptyStatement => Ok(Completion::normal()),

        StatementType::ExpressionStatement { expression } => {
            let value = evaluate_expression(expression, ctx)?;
            Ok(Completion::normal_with_value(value))
        }

        StatementType::VariableDeclaration(decl) => {
            execute_variable_declaration(decl, ctx)?;
            Ok(Completion::normal())
        }

        // Hoisted when the enclosing body starts.
        StatementType::FunctionDeclaration(_) | StatementType::ClassDeclaration(_) => {
            Ok(Completion::normal())
        }

        StatementType::BlockStatement(block) => execute_block_statement(block, ctx),

        StatementType::IfStatement {
            test,
            consequent,
            alternate,
        } => {
            if evaluate_expression(test, ctx)?.is_truthy() {
                execute_statement(consequent, ctx)
            } else if let Some(alternate) = alternate {
                execute_statement(alternate, ctx)
            } else {
                Ok(Completion::normal())
            }
        }

        StatementType::WhileStatement { test, body } => {
            let mut last = None;
            while evaluate_expression(test, ctx)?.is_truthy() {
                let completion = execute_statement(body, ctx)?;
                match completion.completion_type {
                    CompletionType::Break => break,
                    CompletionType::Return => return Ok(completion),
                    CompletionType::Continue | CompletionType::Normal => {
                        if completion.value.is_some() {
                            last = completion.value;
                        }
                    }
                }
            }
            Ok(Completion::normal().update_empty(last))
        }

        StatementType::ForStatement {
            init,
            test,
            update,
            body,
        } => {
            ctx.push_block_scope();
            let result = execute_for_statement(init.as_ref(), test.as_ref(), update.as_ref(), body, ctx);
            ctx.pop_block_scope();
            result
        }

        StatementType::ReturnStatement { argument } => {
            let value = match argument {
                Some(arg) => evaluate_expression(arg, ctx)?,
                None => JsValue::Undefined,
            };
            Ok(Completion::return_value(value))
        }

        StatementType::BreakStatement => Ok(Completion::break_completion()),

        StatementType::ContinueStatement => Ok(Completion::continue_completion()),

        StatementType::ThrowStatement { argument } => {
            let value = evaluate_expression(argument, ctx)?;
            Err(JErrorType::Thrown(value))
        }

        StatementType::TryStatement {
            block,
            handler,
            finalizer,
        } => execute_try_statement(block, handler.as_ref(), finalizer.as_ref(), ctx),
    }
}

/// Execute a statement list after hoisting the function and class declarations it
/// contains into the current environment.
pub fn execute_statements(statements: &[StatementType], ctx: &mut EvalContext) -> EvalResult {
    if ctx.env().is_some() {
        hoist_declarations(statements, ctx);
    }
    let mut completion = Completion::normal();
    for stmt in statements {
        let next = execute_statement(stmt, ctx)?;
        if next.is_abrupt() {
            return Ok(next);
        }
        if next.value.is_some() {
            completion = next;
        }
    }
    Ok(completion)
}

fn hoist_declarations(statements: &[StatementType], ctx: &mut EvalContext) {
    for stmt in statements {
        match stmt {
            StatementType::FunctionDeclaration(def) => {
                let function = FunctionObject::script(
                    def.name(),
                    vec![def.clone()],
                    ctx.env().cloned(),
                    Arc::downgrade(&ctx.program),
                );
                ctx.declare_local(def.name(), JsValue::Function(Arc::new(function)));
            }
            StatementType::ClassDeclaration(def) => {
                let class = Arc::new(ScriptClass {
                    def: def.clone(),
                    program: Arc::downgrade(&ctx.program),
                });
                let constructor = FunctionObject::constructor(class);
                ctx.declare_local(&def.id, JsValue::Function(Arc::new(constructor)));
            }
            _ => {}
        }
    }
}

/// Execute a block statement in its own scope for let/const bindings.
fn execute_block_statement(block: &BlockStatementData, ctx: &mut EvalContext) -> EvalResult {
    ctx.push_block_scope();
    let result = execute_statements(&block.body, ctx);
    ctx.pop_block_scope();
    result
}

fn execute_variable_declaration(
    decl: &VariableDeclarationData,
    ctx: &mut EvalContext,
) -> Result<(), JErrorType> {
    for declarator in &decl.declarations {
        let value = match &declarator.init {
            Some(init) => Some(evaluate_expression(init, ctx)?),
            None => None,
        };
        ctx.declare_variable(
            decl.kind,
            &declarator.id,
            value,
            declarator.type_name.as_deref(),
        );
    }
    Ok(())
}

fn execute_for_statement(
    init: Option<&ForInit>,
    test: Option<&ExpressionType>,
    update: Option<&ExpressionType>,
    body: &StatementType,
    ctx: &mut EvalContext,
) -> EvalResult {
    match init {
        Some(ForInit::VariableDeclaration(decl)) => execute_variable_declaration(decl, ctx)?,
        Some(ForInit::Expression(expr)) => {
            evaluate_expression(expr, ctx)?;
        }
        None => {}
    }
    let mut last = None;
    loop {
        if let Some(test) = test {
            if !evaluate_expression(test, ctx)?.is_truthy() {
                break;
            }
        }
        let completion = execute_statement(body, ctx)?;
        match completion.completion_type {
            CompletionType::Break => break,
            CompletionType::Return => return Ok(completion),
            CompletionType::Continue | CompletionType::Normal => {
                if completion.value.is_some() {
                    last = completion.value;
                }
            }
        }
        if let Some(update) = update {
            evaluate_expression(update, ctx)?;
        }
    }
    Ok(Completion::normal().update_empty(last))
}

fn execute_try_statement(
    block: &BlockStatementData,
    handler: Option<&CatchClauseData>,
    finalizer: Option<&BlockStatementData>,
    ctx: &mut EvalContext,
) -> EvalResult {
    let mut result = execute_block_statement(block, ctx);

    let caught = match &result {
        Err(error) if is_catchable(error) => Some(error.to_js_value()),
        _ => None,
    };
    if let (Some(caught), Some(handler)) = (caught, handler) {
        ctx.push_block_scope();
        if let Some(param) = &handler.param {
            ctx.declare_local(param, caught);
        }
        result = execute_statements(&handler.body.body, ctx);
        ctx.pop_block_scope();
    }

    if let Some(finalizer) = finalizer {
        let completion = execute_block_statement(finalizer, ctx)?;
        if completion.is_abrupt() {
            return Ok(completion);
        }
    }

    result
}

fn is_catchable(error: &JErrorType) -> bool {
    !matches!(error, JErrorType::InternalError(_))
}
