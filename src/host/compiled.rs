use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, debug_span};

use crate::host::bindings::{flush, BindingScope, ScriptContext};
use crate::host::compiler::{CompiledForm, ProgramCompiler, ProgramInstance};
use crate::host::config::EngineConfig;
use crate::host::error::ScriptError;
use crate::host::invoker::{invoke, Arguments, CallableRegistry};
use crate::host::proxy::{InterfaceProxy, InterfaceType, ProxyTarget};
use crate::runner::ds::value::JsValue;

/// A parsed program together with its single live instance.
///
/// Every evaluation runs against the same instance, so top-level state accumulates
/// across evaluations.
pub struct CompiledProgram {
    form: Arc<dyn CompiledForm>,
    instance: Arc<dyn ProgramInstance>,
    scope: BindingScope,
    last_scope: RwLock<BindingScope>,
    registry: CallableRegistry,
    config: Arc<EngineConfig>,
}

impl CompiledProgram {
    pub fn compile(
        compiler: &dyn ProgramCompiler,
        source: &str,
        scope: BindingScope,
        config: Arc<EngineConfig>,
    ) -> Result<Self, ScriptError> {
        let _span = debug_span!("compile", language = compiler.name()).entered();
        let form = compiler.parse(source, &scope, &config.parse_options())?;
        let instance = form.new_instance();
        let registry =
            CallableRegistry::from_callables(instance.declared_callables(), config.overload_policy);
        debug!(
            program = %instance.type_name(),
            callables = registry.len(),
            "compiled program"
        );
        Ok(CompiledProgram {
            form,
            instance,
            last_scope: RwLock::new(scope.clone()),
            scope,
            registry,
            config,
        })
    }

    /// Evaluates against a scope built from `context`, then flushes into it.
    pub fn evaluate(&self, context: &ScriptContext) -> Result<JsValue, ScriptError> {
        self.evaluate_in(BindingScope::build(Some(context)), context)
    }

    /// Evaluates against `scope` and flushes the instance's properties into `context`.
    /// Nothing is flushed when evaluation fails.
    pub fn evaluate_in(
        &self,
        scope: BindingScope,
        context: &ScriptContext,
    ) -> Result<JsValue, ScriptError> {
        let _span = debug_span!("evaluate", program = %self.instance.type_name()).entered();
        *self.last_scope.write() = scope.clone();
        let value = self
            .instance
            .evaluate(&scope)
            .map_err(|source| ScriptError::Evaluation { source })?;
        flush(self.instance.as_ref(), context, &self.config)?;
        debug!(result = %value, "evaluation finished");
        Ok(value)
    }

    /// Calls a top-level function, passing the scope of the latest evaluation.
    pub fn invoke_function(&self, name: &str, args: Vec<JsValue>) -> Result<JsValue, ScriptError> {
        let scope = self.last_scope.read().clone();
        self.invoke_function_in(scope, name, args)
    }

    pub fn invoke_function_in(
        &self,
        scope: BindingScope,
        name: &str,
        args: Vec<JsValue>,
    ) -> Result<JsValue, ScriptError> {
        invoke(
            &self.registry,
            &self.instance.as_target(),
            name,
            Arguments::with_scope(scope, args),
        )
    }

    /// Calls a method declared by `target`'s type, with `target` as the receiver.
    pub fn invoke_method(
        &self,
        target: &JsValue,
        name: &str,
        args: Vec<JsValue>,
    ) -> Result<JsValue, ScriptError> {
        let registry = CallableRegistry::for_target(target, self.config.overload_policy);
        invoke(&registry, target, name, Arguments::positional(args))
    }

    /// A proxy whose methods call this program's top-level functions.
    pub fn get_interface(self: &Arc<Self>, interface: InterfaceType) -> InterfaceProxy {
        InterfaceProxy::new(interface, ProxyTarget::Program(self.clone()))
    }

    pub fn form(&self) -> &Arc<dyn CompiledForm> {
        &self.form
    }

    pub fn instance(&self) -> &Arc<dyn ProgramInstance> {
        &self.instance
    }

    pub fn registry(&self) -> &CallableRegistry {
        &self.registry
    }

    /// The scope the program was compiled against.
    pub fn scope(&self) -> &BindingScope {
        &self.scope
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
