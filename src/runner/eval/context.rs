//! Per-call evaluation state.

use std::io::Write;
use std::sync::Arc;

use crate::host::bindings::BindingScope;
use crate::parser::ast::VariableDeclarationKind;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::lex_env::{Env, LexEnvironment};
use crate::runner::ds::types::JsType;
use crate::runner::ds::value::JsValue;
use crate::runner::eval::types::ValueResult;
use crate::runner::program::ProgramState;
use crate::runner::std_lib;

/// Execution context passed to statements, expressions and native functions.
///
/// Name resolution order: lexical environments, then the program instance
/// (fields, functions, classes), then the host binding scope, then built-ins.
pub struct EvalContext {
    pub program: Arc<ProgramState>,
    pub scope: BindingScope,
    pub this_value: JsValue,
    env: Option<Env>,
    var_env: Option<Env>,
    depth: usize,
}

impl EvalContext {
    /// A top-level context: `this` is the program instance and declarations land on it.
    pub fn new(program: Arc<ProgramState>, scope: BindingScope) -> Self {
        let this_value = program.as_value();
        EvalContext {
            program,
            scope,
            this_value,
            env: None,
            var_env: None,
            depth: 0,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn env(&self) -> Option<&Env> {
        self.env.as_ref()
    }

    /// Context for the body of a called function, one level deeper than `self`.
    pub fn enter_function(
        &self,
        program: Arc<ProgramState>,
        closure: Option<Env>,
        this_value: JsValue,
    ) -> Result<EvalContext, JErrorType> {
        let depth = self.depth + 1;
        if depth > program.options().max_call_depth {
            return Err(JErrorType::RangeError(
                "Maximum call stack size exceeded".to_string(),
            ));
        }
        let env = LexEnvironment::new(closure);
        Ok(EvalContext {
            program,
            scope: self.scope.clone(),
            this_value,
            env: Some(env.clone()),
            var_env: Some(env),
            depth,
        })
    }

    pub fn push_block_scope(&mut self) {
        self.env = Some(LexEnvironment::new(self.env.take()));
    }

    pub fn pop_block_scope(&mut self) {
        self.env = self.env.as_ref().and_then(|e| e.outer().cloned());
    }

    /// Declares a variable. `var` goes to the enclosing function (or the program at
    /// top level); `let` and `const` go to the innermost block.
    pub fn declare_variable(
        &mut self,
        kind: VariableDeclarationKind,
        name: &str,
        value: Option<JsValue>,
        type_name: Option<&str>,
    ) {
        let target = match kind {
            VariableDeclarationKind::Var => self.var_env.clone(),
            VariableDeclarationKind::Let | VariableDeclarationKind::Const => self.env.clone(),
        };
        let constant = kind == VariableDeclarationKind::Const;
        match target {
            Some(env) => match value {
                Some(v) => env.declare(name, v, !constant),
                None if kind == VariableDeclarationKind::Var && env.has_own_binding(name) => {}
                None => env.declare(name, JsValue::Undefined, !constant),
            },
            None => self.program.define_field(
                name,
                value,
                type_name.map(JsType::from_annotation),
                constant,
            ),
        }
    }

    /// Binds a local function or class declared inside a block or function body.
    pub fn declare_local(&mut self, name: &str, value: JsValue) {
        match &self.env {
            Some(env) => env.declare(name, value, true),
            None => self.program.define_field(name, Some(value), None, false),
        }
    }

    pub fn get_binding(&self, name: &str) -> ValueResult {
        if let Some(env) = &self.env {
            if let Some(v) = env.lookup(name) {
                return Ok(v);
            }
        }
        if let Some(v) = self.program.lookup(name) {
            return Ok(v);
        }
        if let Some(symbol) = self.scope.lookup(name) {
            return Ok(symbol.value.clone());
        }
        if let Some(v) = std_lib::global(name) {
            return Ok(v);
        }
        Err(JErrorType::ReferenceError(format!("{} is not defined", name)))
    }

    /// Assigns to the nearest declaration. Names declared nowhere in the script become
    /// program fields, even when the host bound them.
    pub fn set_binding(&mut self, name: &str, value: JsValue) -> Result<(), JErrorType> {
        if let Some(env) = &self.env {
            if env.assign(name, value.clone())? {
                return Ok(());
            }
        }
        self.program.assign_field(name, value)
    }

    /// Writes a line to the host context's writer, or stdout when it has none.
    pub fn write_line(&self, text: &str) -> Result<(), JErrorType> {
        let result = match self.scope.output() {
            Some(sink) => {
                let mut writer = sink.lock();
                writeln!(writer, "{}", text).and_then(|_| writer.flush())
            }
            None => writeln!(std::io::stdout().lock(), "{}", text),
        };
        result.map_err(|e| JErrorType::InternalError(format!("cannot write output: {}", e)))
    }
}
