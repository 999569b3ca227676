//! Host binding tables and their bridge to the script namespace.

use std::collections::HashSet;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use serde::Deserialize;
use tracing::{debug, trace, warn};

use crate::host::compiler::ProgramInstance;
use crate::host::config::EngineConfig;
use crate::host::error::ScriptError;
use crate::runner::ds::types::JsType;
use crate::runner::ds::value::JsValue;

lazy_static! {
    /// Meta-properties every program instance reports that are never flushed.
    pub static ref FILTERED_SYMBOLS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("IntrinsicType");
        s.insert("Class");
        s
    };
}

pub type OutputSink = Arc<Mutex<Box<dyn Write + Send>>>;

/// A shared, insertion-ordered name to value table. Clones share storage.
#[derive(Clone, Default)]
pub struct Bindings {
    values: Arc<RwLock<IndexMap<String, JsValue>>>,
}

impl Bindings {
    pub fn new() -> Self {
        Bindings::default()
    }

    pub fn put(&self, name: &str, value: JsValue) -> Option<JsValue> {
        self.values.write().insert(name.to_string(), value)
    }

    pub fn get(&self, name: &str) -> Option<JsValue> {
        self.values.read().get(name).cloned()
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.values.read().contains_key(name)
    }

    pub fn remove(&self, name: &str) -> Option<JsValue> {
        self.values.write().shift_remove(name)
    }

    pub fn clear(&self) {
        self.values.write().clear();
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.values.read().keys().cloned().collect()
    }

    /// A point-in-time copy of the entries, in insertion order.
    pub fn entries(&self) -> Vec<(String, JsValue)> {
        self.values
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn ptr_eq(&self, other: &Bindings) -> bool {
        Arc::ptr_eq(&self.values, &other.values)
    }
}

impl fmt::Debug for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries()).finish()
    }
}

/// The two well-known binding levels of a [`ScriptContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeLevel {
    /// Per-engine bindings. Script results are flushed here.
    Engine,
    /// Bindings shared by every engine of an application.
    Global,
}

/// What the flush does with a top-level script variable whose name is also bound at
/// the global level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GlobalCollision {
    /// Write it to the engine level, where it shadows the global binding.
    #[default]
    Shadow,
    /// Leave it out of the flush.
    Skip,
    /// Fail the evaluation with `ScriptError::BindingCollision` before writing anything.
    Reject,
}

/// The host side of a script's namespace: optional global and engine bindings plus an
/// optional writer for script output.
#[derive(Clone)]
pub struct ScriptContext {
    global: Option<Bindings>,
    engine: Option<Bindings>,
    writer: Option<OutputSink>,
}

impl ScriptContext {
    /// A context with empty engine bindings and no global bindings.
    pub fn new() -> Self {
        ScriptContext {
            global: None,
            engine: Some(Bindings::new()),
            writer: None,
        }
    }

    /// A context with no bindings at all.
    pub fn empty() -> Self {
        ScriptContext {
            global: None,
            engine: None,
            writer: None,
        }
    }

    pub fn with_bindings(mut self, level: ScopeLevel, bindings: Bindings) -> Self {
        self.set_bindings(level, Some(bindings));
        self
    }

    pub fn with_writer<W: Write + Send + 'static>(mut self, writer: W) -> Self {
        self.set_writer(writer);
        self
    }

    pub fn bindings(&self, level: ScopeLevel) -> Option<&Bindings> {
        match level {
            ScopeLevel::Engine => self.engine.as_ref(),
            ScopeLevel::Global => self.global.as_ref(),
        }
    }

    pub fn set_bindings(&mut self, level: ScopeLevel, bindings: Option<Bindings>) {
        match level {
            ScopeLevel::Engine => self.engine = bindings,
            ScopeLevel::Global => self.global = bindings,
        }
    }

    /// Looks `name` up engine level first.
    pub fn get_attribute(&self, name: &str) -> Option<JsValue> {
        self.engine
            .as_ref()
            .and_then(|b| b.get(name))
            .or_else(|| self.global.as_ref().and_then(|b| b.get(name)))
    }

    pub fn set_writer<W: Write + Send + 'static>(&mut self, writer: W) {
        self.writer = Some(Arc::new(Mutex::new(Box::new(writer))));
    }

    pub fn writer(&self) -> Option<&OutputSink> {
        self.writer.as_ref()
    }
}

impl Default for ScriptContext {
    fn default() -> Self {
        ScriptContext::new()
    }
}

impl fmt::Debug for ScriptContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptContext")
            .field("global", &self.global)
            .field("engine", &self.engine)
            .field("writer", &self.writer.is_some())
            .finish()
    }
}

/// A name bound into the script namespace, with the descriptor of its value.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub ty: JsType,
    pub value: JsValue,
}

impl Symbol {
    pub fn new(name: &str, value: JsValue) -> Self {
        Symbol {
            name: name.to_string(),
            ty: JsType::of(&value),
            value,
        }
    }
}

type Frame = IndexMap<String, Symbol>;

/// The script-side view of a [`ScriptContext`]: a stack of frames searched from the top.
///
/// Frames are shared between clones and never modified after they are pushed.
#[derive(Clone)]
pub struct BindingScope {
    frames: Vec<Arc<Frame>>,
    output: Option<OutputSink>,
}

impl BindingScope {
    /// A scope with a single empty frame.
    pub fn empty() -> Self {
        BindingScope {
            frames: vec![Arc::new(Frame::new())],
            output: None,
        }
    }

    /// Global bindings go into the base frame. Engine bindings, when present, go into a
    /// frame pushed above it so they shadow globals of the same name.
    pub fn build(context: Option<&ScriptContext>) -> Self {
        let context = match context {
            Some(c) => c,
            None => return BindingScope::empty(),
        };
        let mut base = Frame::new();
        if let Some(global) = context.bindings(ScopeLevel::Global) {
            for (name, value) in global.entries() {
                base.insert(name.clone(), Symbol::new(&name, value));
            }
        }
        let mut scope = BindingScope {
            frames: vec![Arc::new(base)],
            output: context.writer().cloned(),
        };
        if let Some(engine) = context.bindings(ScopeLevel::Engine) {
            scope.push_frame(engine.entries());
        }
        trace!(depth = scope.depth(), symbols = scope.len(), "built binding scope");
        scope
    }

    pub fn push_frame<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, JsValue)>,
    {
        let frame: Frame = entries
            .into_iter()
            .map(|(name, value)| {
                let symbol = Symbol::new(&name, value);
                (name, symbol)
            })
            .collect();
        self.frames.push(Arc::new(frame));
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Total number of symbols across frames, shadowed ones included.
    pub fn len(&self) -> usize {
        self.frames.iter().map(|f| f.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visible names, innermost frame first.
    pub fn names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for frame in self.frames.iter().rev() {
            for name in frame.keys() {
                if seen.insert(name.as_str()) {
                    names.push(name.clone());
                }
            }
        }
        names
    }

    pub fn output(&self) -> Option<&OutputSink> {
        self.output.as_ref()
    }
}

impl Default for BindingScope {
    fn default() -> Self {
        BindingScope::empty()
    }
}

impl fmt::Debug for BindingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.frames.iter().map(|frame| frame.keys().collect::<Vec<_>>()))
            .finish()
    }
}

fn is_filtered(name: &str, config: &EngineConfig) -> bool {
    FILTERED_SYMBOLS.contains(name) || config.filtered_symbols.iter().any(|s| s == name)
}

/// Writes the instance's top-level properties into the context's engine bindings,
/// overwriting existing entries. Returns the number of names written.
pub fn flush(
    instance: &dyn ProgramInstance,
    context: &ScriptContext,
    config: &EngineConfig,
) -> Result<usize, ScriptError> {
    let engine = match context.bindings(ScopeLevel::Engine) {
        Some(b) => b,
        None => {
            warn!(program = %instance.type_name(), "context has no engine bindings, skipping flush");
            return Ok(0);
        }
    };
    let global = context.bindings(ScopeLevel::Global);
    let properties: Vec<_> = instance
        .declared_properties()
        .into_iter()
        .filter(|p| !is_filtered(&p.name, config))
        .collect();

    let collides = |name: &str| match global {
        Some(g) => !g.ptr_eq(engine) && g.contains_key(name),
        None => false,
    };

    if config.global_collision == GlobalCollision::Reject {
        if let Some(p) = properties.iter().find(|p| collides(&p.name)) {
            return Err(ScriptError::BindingCollision {
                name: p.name.clone(),
            });
        }
    }

    let mut written = 0;
    for p in &properties {
        if config.global_collision == GlobalCollision::Skip && collides(&p.name) {
            trace!(name = %p.name, "global binding kept, skipping flush of name");
            continue;
        }
        engine.put(&p.name, p.value());
        written += 1;
    }
    debug!(program = %instance.type_name(), written, "flushed program properties");
    Ok(written)
}
