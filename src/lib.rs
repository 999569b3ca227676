//! # just-host - an embeddable script engine bridge
//!
//! Lets a host application evaluate fragments of the *just* script language, exchange
//! named values with them, call the functions and methods they define, and wrap script
//! behaviour behind host-declared interfaces.
//!
//! ## Quick Start
//!
//! ### Evaluating a script and reading its variables back
//!
//! ```
//! use just_host::{JsValue, ScriptEngine};
//!
//! let engine = ScriptEngine::new();
//! engine.put("name", JsValue::from("world"));
//! let result = engine.evaluate("var greeting = 'Hello, ' + name; greeting.length").unwrap();
//! assert_eq!(result, JsValue::from(12));
//! assert_eq!(engine.get("greeting"), Some(JsValue::from("Hello, world")));
//! ```
//!
//! ### Calling script functions from the host
//!
//! ```
//! use just_host::{JsValue, ScriptEngine};
//!
//! let engine = ScriptEngine::new();
//! engine.evaluate("function add(a: Number, b: Number) { return a + b }").unwrap();
//! let sum = engine.invoke_function("add", vec![JsValue::from(2), JsValue::from(3)]).unwrap();
//! assert_eq!(sum, JsValue::from(5));
//! ```
//!
//! ### Wrapping script behaviour behind an interface
//!
//! ```
//! use just_host::{script_interface, JsValue, ScriptEngine};
//!
//! script_interface! {
//!     pub struct Greeter: "Greeter" {
//!         fn greet(name: &str);
//!     }
//! }
//!
//! let engine = ScriptEngine::new();
//! engine.evaluate("function greet(name) { return 'Hi ' + name }").unwrap();
//! let greeter: Greeter = engine.get_interface();
//! assert_eq!(greeter.greet("Ann").unwrap(), JsValue::from("Hi Ann"));
//! ```
//!
//! ## Architecture
//!
//! - **[`host`]** - the bridge: binding tables, compiled programs, the engine, reflective
//!   invocation and interface proxies. It reaches the language only through the
//!   [`host::compiler`] traits.
//! - **[`parser`]** - PEG grammar and AST of the *just* language
//! - **[`runner`]** - tree-walking interpreter implementing [`host::compiler`]
//!   - **[`runner::ds`]** - values, type descriptors, objects and environments
//!   - **[`runner::eval`]** - statement and expression evaluation
//!   - **[`runner::program`]** - compiled programs and program instances

#[macro_use]
extern crate lazy_static;

pub mod host;
pub mod parser;
pub mod runner;

pub use host::bindings::{BindingScope, Bindings, GlobalCollision, ScopeLevel, ScriptContext};
pub use host::compiled::CompiledProgram;
pub use host::config::EngineConfig;
pub use host::engine::ScriptEngine;
pub use host::error::ScriptError;
pub use host::factory::ScriptEngineFactory;
pub use host::invoker::OverloadPolicy;
pub use host::proxy::{InterfaceProxy, InterfaceType, ScriptInterface};
pub use runner::ds::object::{Callable, JsObject, Signature};
pub use runner::ds::types::JsType;
pub use runner::ds::value::{JsNumberType, JsValue};
