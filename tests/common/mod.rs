//! Helpers shared by the integration tests.
#![allow(dead_code)]

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use just_host::host::bindings::BindingScope;
use just_host::host::compiler::{CompiledForm, ParseError, ParseOptions, ProgramCompiler};
use just_host::runner::ds::error::JErrorType;
use just_host::runner::program::JustCompiler;
use just_host::{Callable, JsObject, JsType, JsValue, Signature};
use parking_lot::Mutex;

/// A host object scripts can append text to, like a string writer.
#[derive(Default)]
pub struct StringWriter {
    text: Mutex<String>,
}

impl StringWriter {
    pub fn new() -> Self {
        StringWriter::default()
    }

    pub fn contents(&self) -> String {
        self.text.lock().clone()
    }
}

fn writer_of(this: &JsValue) -> Result<&StringWriter, JErrorType> {
    this.as_object()
        .and_then(|o| o.as_any().downcast_ref::<StringWriter>())
        .ok_or_else(|| JErrorType::TypeError("receiver is not a StringWriter".to_string()))
}

impl JsObject for StringWriter {
    fn class_name(&self) -> &str {
        "StringWriter"
    }

    fn get_property(&self, _name: &str) -> Option<JsValue> {
        None
    }

    fn set_property(&self, name: &str, _value: JsValue) -> Result<(), JErrorType> {
        Err(JErrorType::TypeError(format!("cannot set {} on StringWriter", name)))
    }

    fn property_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn declared_callables(&self) -> Vec<Callable> {
        vec![
            Callable::new("append", Signature::new(vec![JsType::Any]), |inv| {
                let writer = writer_of(inv.this)?;
                if let Some(value) = inv.args.first() {
                    writer.text.lock().push_str(&value.to_js_string());
                }
                Ok(inv.this.clone())
            }),
            Callable::new("toString", Signature::new(vec![]), |inv| {
                Ok(JsValue::from(writer_of(inv.this)?.contents()))
            }),
        ]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Returns the writer both as a script value and as a handle the test can read.
pub fn string_writer() -> (JsValue, Arc<dyn JsObject>) {
    let value = JsValue::object(StringWriter::new());
    let handle = match &value {
        JsValue::Object(o) => o.clone(),
        _ => unreachable!(),
    };
    (value, handle)
}

pub fn contents_of(handle: &Arc<dyn JsObject>) -> String {
    match handle.as_any().downcast_ref::<StringWriter>() {
        Some(w) => w.contents(),
        None => panic!("not a StringWriter"),
    }
}

/// Wraps the default compiler and counts how often the runtime gets initialized.
pub struct CountingCompiler {
    inner: JustCompiler,
    pub initializations: AtomicUsize,
}

impl CountingCompiler {
    pub fn new() -> Self {
        CountingCompiler {
            inner: JustCompiler::new(),
            initializations: AtomicUsize::new(0),
        }
    }

    pub fn count(&self) -> usize {
        self.initializations.load(Ordering::SeqCst)
    }
}

impl ProgramCompiler for CountingCompiler {
    fn name(&self) -> &str {
        "counting"
    }

    fn initialize(&self) -> Result<(), String> {
        self.initializations.fetch_add(1, Ordering::SeqCst);
        // Keep the window for a racing second initializer open.
        std::thread::sleep(std::time::Duration::from_millis(20));
        self.inner.initialize()
    }

    fn parse(
        &self,
        source: &str,
        scope: &BindingScope,
        options: &ParseOptions,
    ) -> Result<Arc<dyn CompiledForm>, ParseError> {
        self.inner.parse(source, scope, options)
    }
}

/// A compiler whose runtime never comes up.
pub struct BrokenCompiler {
    pub attempts: AtomicUsize,
}

impl ProgramCompiler for BrokenCompiler {
    fn name(&self) -> &str {
        "broken"
    }

    fn initialize(&self) -> Result<(), String> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err("runtime unavailable".to_string())
    }

    fn parse(
        &self,
        _source: &str,
        _scope: &BindingScope,
        _options: &ParseOptions,
    ) -> Result<Arc<dyn CompiledForm>, ParseError> {
        Err(ParseError {
            message: "unreachable".to_string(),
            line: 1,
            column: 1,
        })
    }
}
