//! The *just* implementation of the program compiler contract.
//!
//! A compiled program is the parsed AST. Each instance of it is a [`ProgramState`]:
//! top-level `var`/`let`/`const` declarations become its fields, top-level functions and
//! classes are bound when the instance is created, and the instance itself is the
//! script-visible object that `this` refers to at top level.

use std::any::Any;
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::RwLock;
use pest::error::{ErrorVariant, LineColLocation};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::host::bindings::BindingScope;
use crate::host::compiler::{
    CompiledForm, ParseError, ParseOptions, ProgramCompiler, ProgramInstance, PropertyInfo,
};
use crate::parser::ast::{FunctionData, ProgramData, StatementType};
use crate::parser::{JsParser, Rule};
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::{
    param_types, Callable, FunctionObject, JsObject, ScriptClass, Signature,
};
use crate::runner::ds::types::JsType;
use crate::runner::ds::value::JsValue;
use crate::runner::eval::context::EvalContext;
use crate::runner::eval::function::call_script_function;
use crate::runner::eval::statement::execute_statements;
use crate::runner::eval::CompletionType;
use crate::runner::std_lib;

pub const PROGRAM_CLASS_NAME: &str = "Program";

#[derive(Debug, Default, Clone, Copy)]
pub struct JustCompiler;

impl JustCompiler {
    pub fn new() -> Self {
        JustCompiler
    }
}

fn to_parse_error(error: pest::error::Error<Rule>) -> ParseError {
    let (line, column) = match error.line_col {
        LineColLocation::Pos(pos) => pos,
        LineColLocation::Span(start, _) => start,
    };
    let message = match &error.variant {
        ErrorVariant::CustomError { message } => message.clone(),
        ErrorVariant::ParsingError {
            positives,
            negatives,
        } => match (positives.is_empty(), negatives.is_empty()) {
            (false, _) => format!("expected {:?}", positives),
            (true, false) => format!("unexpected {:?}", negatives),
            (true, true) => "unexpected input".to_string(),
        },
    };
    ParseError {
        message,
        line,
        column,
    }
}

impl ProgramCompiler for JustCompiler {
    fn name(&self) -> &str {
        "just"
    }

    fn initialize(&self) -> Result<(), String> {
        std_lib::init();
        Ok(())
    }

    fn parse(
        &self,
        source: &str,
        scope: &BindingScope,
        options: &ParseOptions,
    ) -> Result<Arc<dyn CompiledForm>, ParseError> {
        let ast = JsParser::parse_to_ast_from_str(source).map_err(to_parse_error)?;
        trace!(statements = ast.body.len(), symbols = scope.len(), "parsed program");
        Ok(Arc::new(JustProgram {
            ast: Arc::new(ast),
            options: *options,
        }))
    }
}

/// A parsed program, ready to be instantiated.
pub struct JustProgram {
    ast: Arc<ProgramData>,
    options: ParseOptions,
}

impl JustProgram {
    pub fn ast(&self) -> &ProgramData {
        &self.ast
    }
}

impl CompiledForm for JustProgram {
    fn new_instance(&self) -> Arc<dyn ProgramInstance> {
        ProgramState::new(self.ast.clone(), self.options)
    }
}

#[derive(Clone)]
struct Field {
    value: JsValue,
    ty: Option<JsType>,
    constant: bool,
}

/// The live instance of a program.
pub struct ProgramState {
    id: Uuid,
    ast: Arc<ProgramData>,
    options: ParseOptions,
    me: Weak<ProgramState>,
    fields: RwLock<IndexMap<String, Field>>,
    /// Top-level functions by name, overloads in declaration order.
    overloads: IndexMap<String, Vec<Arc<FunctionData>>>,
    functions: IndexMap<String, JsValue>,
    classes: IndexMap<String, JsValue>,
    current_scope: RwLock<BindingScope>,
}

impl ProgramState {
    pub fn new(ast: Arc<ProgramData>, options: ParseOptions) -> Arc<ProgramState> {
        Arc::new_cyclic(|me: &Weak<ProgramState>| {
            let mut overloads: IndexMap<String, Vec<Arc<FunctionData>>> = IndexMap::new();
            let mut classes = IndexMap::new();
            for stmt in &ast.body {
                match stmt {
                    StatementType::FunctionDeclaration(def) => overloads
                        .entry(def.name().to_string())
                        .or_default()
                        .push(def.clone()),
                    StatementType::ClassDeclaration(def) => {
                        let class = Arc::new(ScriptClass {
                            def: def.clone(),
                            program: me.clone(),
                        });
                        classes.insert(
                            def.id.clone(),
                            JsValue::Function(Arc::new(FunctionObject::constructor(class))),
                        );
                    }
                    _ => {}
                }
            }
            let functions = overloads
                .iter()
                .map(|(name, defs)| {
                    let function = FunctionObject::script(name, defs.clone(), None, me.clone());
                    (name.clone(), JsValue::Function(Arc::new(function)))
                })
                .collect();
            ProgramState {
                id: Uuid::new_v4(),
                ast,
                options,
                me: me.clone(),
                fields: RwLock::new(IndexMap::new()),
                overloads,
                functions,
                classes,
                current_scope: RwLock::new(BindingScope::empty()),
            }
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// The scope of the evaluation that ran last.
    pub fn current_scope(&self) -> BindingScope {
        self.current_scope.read().clone()
    }

    pub fn as_value(&self) -> JsValue {
        match self.me.upgrade() {
            Some(program) => JsValue::Object(program),
            None => JsValue::Undefined,
        }
    }

    /// Declares a top-level variable. A declaration without a value keeps the current
    /// value of an existing field.
    pub fn define_field(
        &self,
        name: &str,
        value: Option<JsValue>,
        ty: Option<JsType>,
        constant: bool,
    ) {
        let mut fields = self.fields.write();
        let value = match (value, fields.get(name)) {
            (Some(v), _) => v,
            (None, Some(existing)) => existing.value.clone(),
            (None, None) => JsValue::Undefined,
        };
        fields.insert(
            name.to_string(),
            Field {
                value,
                ty,
                constant,
            },
        );
    }

    pub fn assign_field(&self, name: &str, value: JsValue) -> Result<(), JErrorType> {
        let mut fields = self.fields.write();
        match fields.get_mut(name) {
            Some(field) if field.constant => Err(JErrorType::TypeError(format!(
                "Assignment to constant variable '{}'",
                name
            ))),
            Some(field) => {
                field.value = value;
                Ok(())
            }
            None => {
                fields.insert(
                    name.to_string(),
                    Field {
                        value,
                        ty: None,
                        constant: false,
                    },
                );
                Ok(())
            }
        }
    }

    pub fn field_value(&self, name: &str) -> Option<JsValue> {
        self.fields.read().get(name).map(|f| f.value.clone())
    }

    /// A top-level field, function or class.
    pub fn lookup(&self, name: &str) -> Option<JsValue> {
        self.field_value(name)
            .or_else(|| self.function_value(name))
            .or_else(|| self.classes.get(name).cloned())
    }

    pub fn function_value(&self, name: &str) -> Option<JsValue> {
        self.functions.get(name).cloned()
    }

    fn type_name(&self) -> String {
        format!("{}_{}", PROGRAM_CLASS_NAME, self.id.to_simple())
    }

    fn function_callables(&self) -> Vec<Callable> {
        let mut callables = Vec::new();
        for (name, defs) in &self.overloads {
            for def in defs {
                let def = def.clone();
                let me = self.me.clone();
                callables.push(Callable::new(
                    name,
                    Signature::scoped(param_types(&def)),
                    move |inv| {
                        let program = me.upgrade().ok_or_else(|| {
                            JErrorType::InternalError("program instance is gone".to_string())
                        })?;
                        let scope = match inv.scope {
                            Some(scope) => scope.clone(),
                            None => program.current_scope(),
                        };
                        call_script_function(
                            &program,
                            scope,
                            &def,
                            None,
                            inv.this.clone(),
                            inv.args.to_vec(),
                        )
                    },
                ));
            }
        }
        callables
    }
}

impl JsObject for ProgramState {
    fn class_name(&self) -> &str {
        PROGRAM_CLASS_NAME
    }

    fn get_property(&self, name: &str) -> Option<JsValue> {
        match self.lookup(name) {
            Some(v) => Some(v),
            None if name == "Class" || name == "IntrinsicType" => {
                Some(JsValue::from(self.type_name()))
            }
            None => None,
        }
    }

    fn set_property(&self, name: &str, value: JsValue) -> Result<(), JErrorType> {
        self.assign_field(name, value)
    }

    fn property_names(&self) -> Vec<String> {
        self.fields.read().keys().cloned().collect()
    }

    fn declared_callables(&self) -> Vec<Callable> {
        self.function_callables()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ProgramInstance for ProgramState {
    fn type_name(&self) -> String {
        ProgramState::type_name(self)
    }

    fn evaluate(&self, scope: &BindingScope) -> Result<JsValue, JErrorType> {
        let program = self
            .me
            .upgrade()
            .ok_or_else(|| JErrorType::InternalError("program instance is gone".to_string()))?;
        *self.current_scope.write() = scope.clone();
        let mut ctx = EvalContext::new(program, scope.clone());
        let completion = execute_statements(&self.ast.body, &mut ctx)?;
        debug!(program = %self.type_name(), fields = self.fields.read().len(), "top level finished");
        match completion.completion_type {
            CompletionType::Normal | CompletionType::Return => Ok(completion.get_value()),
            CompletionType::Break => Err(JErrorType::SyntaxError(
                "Illegal break statement".to_string(),
            )),
            CompletionType::Continue => Err(JErrorType::SyntaxError(
                "Illegal continue statement".to_string(),
            )),
        }
    }

    fn declared_properties(&self) -> Vec<PropertyInfo> {
        let fields = self.fields.read();
        let mut properties: Vec<PropertyInfo> = fields
            .iter()
            .map(|(name, field)| {
                let ty = field.ty.clone().unwrap_or_else(|| JsType::of(&field.value));
                let me = self.me.clone();
                let key = name.clone();
                PropertyInfo::new(name, ty, move || {
                    me.upgrade()
                        .and_then(|p| p.field_value(&key))
                        .unwrap_or(JsValue::Undefined)
                })
            })
            .collect();
        let type_name = self.type_name();
        for meta in &["Class", "IntrinsicType"] {
            let value = type_name.clone();
            properties.push(PropertyInfo::new(meta, JsType::String, move || {
                JsValue::from(value.as_str())
            }));
        }
        properties
    }

    fn declared_callables(&self) -> Vec<Callable> {
        self.function_callables()
    }

    fn as_target(&self) -> JsValue {
        self.as_value()
    }
}
