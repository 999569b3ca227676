use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::host::bindings::BindingScope;
use crate::parser::ast::{ClassData, FunctionData};
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::lex_env::Env;
use crate::runner::ds::types::JsType;
use crate::runner::ds::value::JsValue;
use crate::runner::eval::context::EvalContext;
use crate::runner::eval::function::call_script_function;
use crate::runner::program::ProgramState;

/// Function signature for built-in functions.
/// Native functions receive the evaluation context, `this` value, and arguments.
pub type NativeFn = fn(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType>;

/// An object visible to scripts. Host applications implement this to hand their own
/// objects to scripts; the interpreter implements it for script objects and for the
/// program instance itself.
pub trait JsObject: Send + Sync {
    fn class_name(&self) -> &str;

    fn get_property(&self, name: &str) -> Option<JsValue>;

    fn set_property(&self, name: &str, value: JsValue) -> Result<(), JErrorType>;

    fn property_names(&self) -> Vec<String>;

    /// Callables that reflective invocation can resolve against this object, in
    /// declaration order.
    fn declared_callables(&self) -> Vec<Callable> {
        Vec::new()
    }

    fn as_any(&self) -> &dyn Any;
}

/// Declared parameter types of a callable. `receives_scope` marks callables that take
/// the caller's binding scope as an implicit leading argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<JsType>,
    pub receives_scope: bool,
}

impl Signature {
    pub fn new(params: Vec<JsType>) -> Self {
        Signature {
            params,
            receives_scope: false,
        }
    }

    pub fn scoped(params: Vec<JsType>) -> Self {
        Signature {
            params,
            receives_scope: true,
        }
    }

    /// Arity as seen by the resolver, counting the scope slot.
    pub fn arity(&self) -> usize {
        self.params.len() + self.receives_scope as usize
    }
}

/// The receiver, optional scope and arguments of one call.
pub struct Invocation<'a> {
    pub this: &'a JsValue,
    pub scope: Option<&'a BindingScope>,
    pub args: &'a [JsValue],
}

pub type CallableBody = dyn Fn(&Invocation) -> Result<JsValue, JErrorType> + Send + Sync;

/// A named, typed entry point that the reflective invoker can resolve and call.
#[derive(Clone)]
pub struct Callable {
    pub name: String,
    pub signature: Signature,
    body: Arc<CallableBody>,
}

impl Callable {
    pub fn new<F>(name: &str, signature: Signature, body: F) -> Self
    where
        F: Fn(&Invocation) -> Result<JsValue, JErrorType> + Send + Sync + 'static,
    {
        Callable {
            name: name.to_string(),
            signature,
            body: Arc::new(body),
        }
    }

    pub fn arity(&self) -> usize {
        self.signature.arity()
    }

    pub fn call(&self, invocation: &Invocation) -> Result<JsValue, JErrorType> {
        (self.body)(invocation)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish()
    }
}

/// A plain property bag, optionally an instance of a script class.
pub struct ScriptObject {
    id: Uuid,
    class_name: String,
    class: Option<Arc<ScriptClass>>,
    properties: RwLock<IndexMap<String, JsValue>>,
}

impl ScriptObject {
    pub fn new(class_name: &str) -> Self {
        ScriptObject {
            id: Uuid::new_v4(),
            class_name: class_name.to_string(),
            class: None,
            properties: RwLock::new(IndexMap::new()),
        }
    }

    pub fn instance_of(class: Arc<ScriptClass>) -> Self {
        ScriptObject {
            id: Uuid::new_v4(),
            class_name: class.name().to_string(),
            class: Some(class),
            properties: RwLock::new(IndexMap::new()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn class(&self) -> Option<&Arc<ScriptClass>> {
        self.class.as_ref()
    }

    pub fn define(&self, name: &str, value: JsValue) {
        self.properties.write().insert(name.to_string(), value);
    }
}

impl JsObject for ScriptObject {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn get_property(&self, name: &str) -> Option<JsValue> {
        self.properties.read().get(name).cloned()
    }

    fn set_property(&self, name: &str, value: JsValue) -> Result<(), JErrorType> {
        self.define(name, value);
        Ok(())
    }

    fn property_names(&self) -> Vec<String> {
        self.properties.read().keys().cloned().collect()
    }

    fn declared_callables(&self) -> Vec<Callable> {
        match &self.class {
            Some(class) => class.method_callables(),
            None => Vec::new(),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A class declared by a script.
pub struct ScriptClass {
    pub def: Arc<ClassData>,
    pub program: Weak<ProgramState>,
}

impl ScriptClass {
    pub fn name(&self) -> &str {
        &self.def.id
    }

    /// One callable per declared method, receiving the instance as `this`.
    pub fn method_callables(&self) -> Vec<Callable> {
        self.def
            .methods
            .iter()
            .map(|method| {
                let def = method.clone();
                let program = self.program.clone();
                Callable::new(method.name(), Signature::new(param_types(method)), move |inv| {
                    let program = program.upgrade().ok_or_else(|| {
                        JErrorType::InternalError("program instance is gone".to_string())
                    })?;
                    let scope = match inv.scope {
                        Some(scope) => scope.clone(),
                        None => program.current_scope(),
                    };
                    call_script_function(&program, scope, &def, None, inv.this.clone(), inv.args.to_vec())
                })
            })
            .collect()
    }
}

/// Declared parameter types of a script function; unannotated parameters are `Any`.
pub fn param_types(def: &FunctionData) -> Vec<JsType> {
    def.params
        .iter()
        .map(|p| match &p.type_name {
            Some(t) => JsType::from_annotation(t),
            None => JsType::Any,
        })
        .collect()
}

pub struct ScriptFunction {
    /// Same-name declarations, in declaration order. Closures have exactly one.
    pub overloads: Vec<Arc<FunctionData>>,
    pub closure: Option<Env>,
    pub program: Weak<ProgramState>,
}

pub enum FunctionKind {
    Script(ScriptFunction),
    Native(NativeFn),
    Host(Callable),
    Constructor(Arc<ScriptClass>),
}

pub struct FunctionObject {
    pub name: String,
    pub kind: FunctionKind,
}

impl FunctionObject {
    pub fn native(name: &str, f: NativeFn) -> Self {
        FunctionObject {
            name: name.to_string(),
            kind: FunctionKind::Native(f),
        }
    }

    pub fn host(callable: Callable) -> Self {
        FunctionObject {
            name: callable.name.clone(),
            kind: FunctionKind::Host(callable),
        }
    }

    pub fn script(
        name: &str,
        overloads: Vec<Arc<FunctionData>>,
        closure: Option<Env>,
        program: Weak<ProgramState>,
    ) -> Self {
        FunctionObject {
            name: name.to_string(),
            kind: FunctionKind::Script(ScriptFunction {
                overloads,
                closure,
                program,
            }),
        }
    }

    pub fn constructor(class: Arc<ScriptClass>) -> Self {
        FunctionObject {
            name: class.name().to_string(),
            kind: FunctionKind::Constructor(class),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_object_properties_keep_insertion_order() {
        let obj = ScriptObject::new("Object");
        obj.define("b", JsValue::from(1));
        obj.define("a", JsValue::from(2));
        obj.set_property("b", JsValue::from(3)).unwrap();
        assert_eq!(obj.property_names(), vec!["b".to_string(), "a".to_string()]);
        assert_eq!(obj.get_property("b"), Some(JsValue::from(3)));
        assert!(obj.declared_callables().is_empty());
    }

    #[test]
    fn scoped_signatures_count_the_scope_slot() {
        assert_eq!(Signature::new(vec![JsType::Any]).arity(), 1);
        assert_eq!(Signature::scoped(vec![JsType::Any]).arity(), 2);
    }
}
