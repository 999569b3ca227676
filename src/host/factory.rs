//! Engine identity and discovery metadata.

use crate::host::config::EngineConfig;
use crate::host::engine::ScriptEngine;

pub const ENGINE_NAME: &str = "just";
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const LANGUAGE_NAME: &str = "just";
pub const LANGUAGE_VERSION: &str = "0.1";

const NAMES: [&str; 3] = ["just", "Just", "js-just"];
const EXTENSIONS: [&str; 1] = ["js"];
const MIME_TYPES: [&str; 2] = ["application/x-just", "text/x-just"];

/// Describes the engine and creates instances of it.
#[derive(Debug, Clone, Default)]
pub struct ScriptEngineFactory {
    config: EngineConfig,
}

impl ScriptEngineFactory {
    pub fn new() -> Self {
        ScriptEngineFactory::default()
    }

    /// Engines created by this factory use `config`.
    pub fn with_config(config: EngineConfig) -> Self {
        ScriptEngineFactory { config }
    }

    pub fn engine_name(&self) -> &'static str {
        ENGINE_NAME
    }

    pub fn engine_version(&self) -> &'static str {
        ENGINE_VERSION
    }

    pub fn language_name(&self) -> &'static str {
        LANGUAGE_NAME
    }

    pub fn language_version(&self) -> &'static str {
        LANGUAGE_VERSION
    }

    pub fn names(&self) -> Vec<&'static str> {
        NAMES.to_vec()
    }

    pub fn extensions(&self) -> Vec<&'static str> {
        EXTENSIONS.to_vec()
    }

    pub fn mime_types(&self) -> Vec<&'static str> {
        MIME_TYPES.to_vec()
    }

    /// Well-known metadata keys. Unknown keys give `None`.
    pub fn parameter(&self, key: &str) -> Option<String> {
        let value = match key {
            "ENGINE" => ENGINE_NAME,
            "ENGINE_VERSION" => ENGINE_VERSION,
            "NAME" => NAMES[0],
            "LANGUAGE" => LANGUAGE_NAME,
            "LANGUAGE_VERSION" => LANGUAGE_VERSION,
            "THREADING" => "MULTITHREADED",
            _ => return None,
        };
        Some(value.to_string())
    }

    /// `obj.m(a,b);`
    pub fn method_call_syntax(&self, obj: &str, method: &str, args: &[&str]) -> String {
        format!("{}.{}({});", obj, method, args.join(","))
    }

    pub fn output_statement(&self, to_display: &str) -> String {
        format!("print({});", to_display)
    }

    /// Joins statements into one program, adding a separator after every statement but
    /// the last unless it already ends with `;`.
    pub fn program(&self, statements: &[&str]) -> String {
        let mut program = String::new();
        if let Some((last, init)) = statements.split_last() {
            for statement in init {
                program.push_str(statement);
                if !statement.trim().ends_with(';') {
                    program.push_str("; ");
                }
            }
            program.push_str(last);
        }
        program
    }

    pub fn script_engine(&self) -> ScriptEngine {
        ScriptEngine::with_config(self.config.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builds_statement_syntax() {
        let factory = ScriptEngineFactory::new();
        assert_eq!(factory.method_call_syntax("obj", "m", &["a", "b"]), "obj.m(a,b);");
        assert_eq!(factory.method_call_syntax("obj", "m", &[]), "obj.m();");
        assert_eq!(factory.output_statement("x"), "print(x);");
        assert_eq!(factory.program(&[]), "");
        assert_eq!(factory.program(&["var a = 1", "var b = 2;", "a + b"]), "var a = 1; var b = 2;a + b");
    }

    #[test]
    fn reports_metadata() {
        let factory = ScriptEngineFactory::new();
        assert_eq!(factory.parameter("ENGINE"), Some("just".to_string()));
        assert_eq!(factory.parameter("LANGUAGE_VERSION"), Some(LANGUAGE_VERSION.to_string()));
        assert_eq!(factory.parameter("bogus"), None);
        assert!(factory.extensions().contains(&"js"));
        assert!(factory.names().contains(&factory.engine_name()));
        assert_eq!(factory.mime_types().len(), 2);
    }
}
