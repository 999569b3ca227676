//! The host side of the bridge: binding tables, compiled programs, the engine, reflective
//! invocation and interface proxies.

pub mod bindings;
pub mod compiled;
pub mod compiler;
pub mod config;
pub mod engine;
pub mod error;
pub mod factory;
pub mod invoker;
pub mod io;
pub mod proxy;
