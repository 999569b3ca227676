use std::io::Read;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::host::bindings::{BindingScope, Bindings, ScopeLevel, ScriptContext};
use crate::host::compiled::CompiledProgram;
use crate::host::compiler::ProgramCompiler;
use crate::host::config::EngineConfig;
use crate::host::error::ScriptError;
use crate::host::invoker::{invoke, Arguments, CallableRegistry};
use crate::host::io::read_source;
use crate::host::proxy::{InterfaceProxy, InterfaceType, ProxyTarget, ScriptInterface};
use crate::runner::ds::value::JsValue;
use crate::runner::program::JustCompiler;

/// The program an engine evaluated last, with the scope it was evaluated against.
/// Replaced as a whole by every `evaluate`, never modified in place.
pub struct Session {
    pub program: Arc<CompiledProgram>,
    pub scope: BindingScope,
}

pub type SessionSlot = Arc<RwLock<Option<Arc<Session>>>>;

/// Evaluates scripts against a host [`ScriptContext`] and exposes the last evaluated
/// program for reflective calls.
///
/// All work runs on the calling thread. Concurrent `evaluate` calls race on which
/// program becomes current; calls already running keep the session they started with.
pub struct ScriptEngine {
    compiler: Arc<dyn ProgramCompiler>,
    config: Arc<EngineConfig>,
    initialized: OnceCell<Result<(), String>>,
    context: RwLock<ScriptContext>,
    session: SessionSlot,
}

impl ScriptEngine {
    pub fn new() -> Self {
        ScriptEngine::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        ScriptEngine::with_compiler(Arc::new(JustCompiler::new()), config)
    }

    pub fn with_compiler(compiler: Arc<dyn ProgramCompiler>, config: EngineConfig) -> Self {
        ScriptEngine {
            compiler,
            config: Arc::new(config),
            initialized: OnceCell::new(),
            context: RwLock::new(ScriptContext::new()),
            session: Arc::new(RwLock::new(None)),
        }
    }

    /// Runs the compiler's one-time setup. Concurrent first callers block until it is
    /// done; a failure is remembered and reported to every later caller.
    fn ensure_initialized(&self) -> Result<(), ScriptError> {
        self.initialized
            .get_or_init(|| {
                info!(language = self.compiler.name(), "initializing script runtime");
                self.compiler.initialize()
            })
            .clone()
            .map_err(ScriptError::Initialization)
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.initialized.get(), Some(Ok(())))
    }

    /// Evaluates `source` against the engine's own context.
    pub fn evaluate(&self, source: &str) -> Result<JsValue, ScriptError> {
        let context = self.context();
        self.evaluate_with_context(source, &context)
    }

    /// Compiles `source` against a scope built from `context`, makes it the current
    /// session, evaluates it and flushes its top-level variables into `context`.
    pub fn evaluate_with_context(
        &self,
        source: &str,
        context: &ScriptContext,
    ) -> Result<JsValue, ScriptError> {
        self.ensure_initialized()?;
        let scope = BindingScope::build(Some(context));
        let program = Arc::new(CompiledProgram::compile(
            self.compiler.as_ref(),
            source,
            scope.clone(),
            self.config.clone(),
        )?);
        *self.session.write() = Some(Arc::new(Session {
            program: program.clone(),
            scope: scope.clone(),
        }));
        debug!("installed new session");
        program.evaluate_in(scope, context)
    }

    pub fn evaluate_reader<R: Read>(&self, reader: R) -> Result<JsValue, ScriptError> {
        let source = read_source(reader)?;
        self.evaluate(&source)
    }

    /// Compiles without evaluating, against a context with no bindings. The engine's
    /// current session is left untouched.
    pub fn compile(&self, source: &str) -> Result<Arc<CompiledProgram>, ScriptError> {
        self.ensure_initialized()?;
        let scope = BindingScope::build(Some(&ScriptContext::empty()));
        let program =
            CompiledProgram::compile(self.compiler.as_ref(), source, scope, self.config.clone())?;
        Ok(Arc::new(program))
    }

    pub fn compile_reader<R: Read>(&self, reader: R) -> Result<Arc<CompiledProgram>, ScriptError> {
        let source = read_source(reader)?;
        self.compile(&source)
    }

    /// Calls a top-level function of the current session's program.
    pub fn invoke_function(&self, name: &str, args: Vec<JsValue>) -> Result<JsValue, ScriptError> {
        let session = self.session().ok_or(ScriptError::NotCompiled)?;
        session
            .program
            .invoke_function_in(session.scope.clone(), name, args)
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

    /// A typed adapter over the engine's current session.
    pub fn get_interface<T: ScriptInterface>(&self) -> T {
        T::from_proxy(self.proxy(T::interface_type()))
    }

    /// A typed adapter over the methods of `target`.
    pub fn get_interface_of<T: ScriptInterface>(&self, target: &JsValue) -> T {
        T::from_proxy(self.proxy_for(target, T::interface_type()))
    }

    /// A proxy forwarding to top-level functions of whichever program is current when
    /// each call is made.
    pub fn proxy(&self, interface: InterfaceType) -> InterfaceProxy {
        InterfaceProxy::new(interface, ProxyTarget::Session(self.session.clone()))
    }

    pub fn proxy_for(&self, target: &JsValue, interface: InterfaceType) -> InterfaceProxy {
        InterfaceProxy::new(
            interface,
            ProxyTarget::Object {
                target: target.clone(),
                policy: self.config.overload_policy,
            },
        )
    }

    pub fn create_bindings(&self) -> Bindings {
        Bindings::new()
    }

    /// Binds `name` at the engine level, creating the engine bindings if needed.
    pub fn put(&self, name: &str, value: JsValue) {
        let mut context = self.context.write();
        if context.bindings(ScopeLevel::Engine).is_none() {
            context.set_bindings(ScopeLevel::Engine, Some(Bindings::new()));
        }
        if let Some(bindings) = context.bindings(ScopeLevel::Engine) {
            bindings.put(name, value);
        }
    }

    pub fn get(&self, name: &str) -> Option<JsValue> {
        self.context
            .read()
            .bindings(ScopeLevel::Engine)
            .and_then(|b| b.get(name))
    }

    /// The engine's context. Bindings in the returned context share storage with the
    /// engine's.
    pub fn context(&self) -> ScriptContext {
        self.context.read().clone()
    }

    pub fn set_context(&self, context: ScriptContext) {
        *self.context.write() = context;
    }

    pub fn bindings(&self, level: ScopeLevel) -> Option<Bindings> {
        self.context.read().bindings(level).cloned()
    }

    pub fn set_bindings(&self, level: ScopeLevel, bindings: Option<Bindings>) {
        self.context.write().set_bindings(level, bindings);
    }

    /// A snapshot of the current session, if anything has been evaluated.
    pub fn session(&self) -> Option<Arc<Session>> {
        self.session.read().clone()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl Default for ScriptEngine {
    fn default() -> Self {
        ScriptEngine::new()
    }
}
