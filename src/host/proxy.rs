//! Interface-shaped views of script behaviour.
//!
//! An [`InterfaceProxy`] holds one thunk per interface method. Each thunk captures the
//! invocation target and the method name and goes through the reflective invoker on
//! every call, so a proxy over an engine session sees functions redefined by later
//! evaluations.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::trace;

use crate::host::compiled::CompiledProgram;
use crate::host::engine::SessionSlot;
use crate::host::error::ScriptError;
use crate::host::invoker::{invoke, Arguments, CallableRegistry, OverloadPolicy};
use crate::runner::ds::value::JsValue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSpec {
    pub name: String,
    pub arity: usize,
}

/// A host-declared interface: a name and its methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceType {
    pub name: String,
    pub methods: Vec<MethodSpec>,
}

impl InterfaceType {
    pub fn new(name: &str) -> Self {
        InterfaceType {
            name: name.to_string(),
            methods: Vec::new(),
        }
    }

    pub fn method(mut self, name: &str, arity: usize) -> Self {
        self.methods.push(MethodSpec {
            name: name.to_string(),
            arity,
        });
        self
    }
}

/// What a proxy forwards to. Fixed when the proxy is created.
#[derive(Clone)]
pub enum ProxyTarget {
    /// Top-level functions of whatever program an engine currently holds.
    Session(SessionSlot),
    /// Top-level functions of one compiled program.
    Program(Arc<CompiledProgram>),
    /// Methods declared by the type of an explicit value.
    Object {
        target: JsValue,
        policy: OverloadPolicy,
    },
}

impl ProxyTarget {
    fn dispatch(&self, name: &str, args: Vec<JsValue>) -> Result<JsValue, ScriptError> {
        match self {
            ProxyTarget::Session(slot) => {
                let session = slot.read().clone().ok_or(ScriptError::NotCompiled)?;
                session
                    .program
                    .invoke_function_in(session.scope.clone(), name, args)
            }
            ProxyTarget::Program(program) => program.invoke_function(name, args),
            ProxyTarget::Object { target, policy } => {
                let registry = CallableRegistry::for_target(target, *policy);
                invoke(&registry, target, name, Arguments::positional(args))
            }
        }
    }
}

type Thunk = Arc<dyn Fn(Vec<JsValue>) -> Result<JsValue, ScriptError> + Send + Sync>;

pub struct InterfaceProxy {
    interface: InterfaceType,
    thunks: IndexMap<(String, usize), Thunk>,
}

impl InterfaceProxy {
    pub fn new(interface: InterfaceType, target: ProxyTarget) -> Self {
        let mut thunks: IndexMap<(String, usize), Thunk> = IndexMap::new();
        for method in &interface.methods {
            let target = target.clone();
            let name = method.name.clone();
            thunks.insert(
                (method.name.clone(), method.arity),
                Arc::new(move |args| target.dispatch(&name, args)),
            );
        }
        InterfaceProxy { interface, thunks }
    }

    pub fn interface(&self) -> &InterfaceType {
        &self.interface
    }

    pub fn implements(&self, method: &str, arity: usize) -> bool {
        self.thunks.contains_key(&(method.to_string(), arity))
    }

    /// Calls interface method `method`. Methods the interface does not declare fail with
    /// `NoSuchCallable` without reaching the target.
    pub fn call(&self, method: &str, args: Vec<JsValue>) -> Result<JsValue, ScriptError> {
        trace!(interface = %self.interface.name, method, "proxy call");
        match self.thunks.get(&(method.to_string(), args.len())) {
            Some(thunk) => thunk(args),
            None => Err(ScriptError::NoSuchCallable {
                name: method.to_string(),
                arity: args.len(),
            }),
        }
    }
}

impl fmt::Debug for InterfaceProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceProxy")
            .field("interface", &self.interface)
            .finish()
    }
}

/// A typed host adapter over an [`InterfaceProxy`]. Usually produced by
/// [`script_interface!`](crate::script_interface).
pub trait ScriptInterface: Sized {
    fn interface_type() -> InterfaceType;

    fn from_proxy(proxy: InterfaceProxy) -> Self;
}

/// Declares a struct wrapping an [`InterfaceProxy`] with one typed method per interface
/// method. Arguments convert into `JsValue`; every method returns
/// `Result<JsValue, ScriptError>`.
///
/// ```ignore
/// script_interface! {
///     pub struct Greeter: "Greeter" {
///         fn greet(name: &str);
///         fn run();
///     }
/// }
/// ```
#[macro_export]
macro_rules! script_interface {
    (@count) => { 0usize };
    (@count $head:ident $($tail:ident)*) => { 1usize + $crate::script_interface!(@count $($tail)*) };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident : $iface:literal {
            $( fn $method:ident ( $( $arg:ident : $ty:ty ),* $(,)? ); )*
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            proxy: $crate::host::proxy::InterfaceProxy,
        }

        impl $name {
            $(
                #[allow(dead_code)]
                pub fn $method(
                    &self,
                    $( $arg: $ty ),*
                ) -> ::std::result::Result<$crate::JsValue, $crate::ScriptError> {
                    self.proxy.call(
                        stringify!($method),
                        vec![$( $crate::JsValue::from($arg) ),*],
                    )
                }
            )*

            #[allow(dead_code)]
            pub fn proxy(&self) -> &$crate::host::proxy::InterfaceProxy {
                &self.proxy
            }
        }

        impl $crate::host::proxy::ScriptInterface for $name {
            fn interface_type() -> $crate::host::proxy::InterfaceType {
                $crate::host::proxy::InterfaceType::new($iface)
                    $( .method(stringify!($method), $crate::script_interface!(@count $($arg)*)) )*
            }

            fn from_proxy(proxy: $crate::host::proxy::InterfaceProxy) -> Self {
                $name { proxy }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::object::{Callable, JsObject, Signature};
    use crate::runner::ds::types::JsType;
    use std::any::Any;

    struct Counter;

    impl JsObject for Counter {
        fn class_name(&self) -> &str {
            "Counter"
        }

        fn get_property(&self, _name: &str) -> Option<JsValue> {
            None
        }

        fn set_property(&self, _name: &str, _value: JsValue) -> Result<(), crate::runner::ds::error::JErrorType> {
            Ok(())
        }

        fn property_names(&self) -> Vec<String> {
            Vec::new()
        }

        fn declared_callables(&self) -> Vec<Callable> {
            vec![Callable::new("next", Signature::new(vec![JsType::Number]), |inv| {
                Ok(JsValue::from(inv.args[0].as_i64().unwrap_or(0) + 1))
            })]
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn method_mode_forwards_to_declared_callables() {
        let target = JsValue::Object(Arc::new(Counter));
        let proxy = InterfaceProxy::new(
            InterfaceType::new("Stepper").method("next", 1),
            ProxyTarget::Object {
                target,
                policy: OverloadPolicy::default(),
            },
        );
        assert!(proxy.implements("next", 1));
        assert_eq!(proxy.call("next", vec![JsValue::from(41)]).unwrap(), JsValue::from(42));
        assert!(proxy.call("next", vec![]).unwrap_err().is_no_such_callable());
        assert!(proxy.call("prev", vec![JsValue::from(1)]).unwrap_err().is_no_such_callable());
    }

    crate::script_interface! {
        struct Stepper: "Stepper" {
            fn next(n: i64);
            fn reset();
        }
    }

    #[test]
    fn macro_declares_the_interface() {
        let iface = <Stepper as ScriptInterface>::interface_type();
        assert_eq!(iface.name, "Stepper");
        assert_eq!(
            iface.methods,
            vec![
                MethodSpec { name: "next".to_string(), arity: 1 },
                MethodSpec { name: "reset".to_string(), arity: 0 },
            ]
        );
        let stepper = Stepper::from_proxy(InterfaceProxy::new(
            iface,
            ProxyTarget::Object {
                target: JsValue::Object(Arc::new(Counter)),
                policy: OverloadPolicy::default(),
            },
        ));
        assert_eq!(stepper.next(1).unwrap(), JsValue::from(2));
        assert!(stepper.reset().unwrap_err().is_no_such_callable());
    }
}
