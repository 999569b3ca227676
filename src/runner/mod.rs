//! The *just* script language runtime: values, the tree-walking interpreter, built-ins
//! and the program instances handed to the host bridge.

pub mod ds;
pub mod eval;
pub mod program;
pub mod std_lib;
