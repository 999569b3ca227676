use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::value::JsValue;

pub type Env = Arc<LexEnvironment>;

struct Binding {
    value: JsValue,
    mutable: bool,
}

/// A declarative environment: function locals, parameters and block bindings.
pub struct LexEnvironment {
    bindings: RwLock<IndexMap<String, Binding>>,
    outer: Option<Env>,
}

impl LexEnvironment {
    pub fn new(outer: Option<Env>) -> Env {
        Arc::new(LexEnvironment {
            bindings: RwLock::new(IndexMap::new()),
            outer,
        })
    }

    pub fn outer(&self) -> Option<&Env> {
        self.outer.as_ref()
    }

    pub fn declare(&self, name: &str, value: JsValue, mutable: bool) {
        self.bindings
            .write()
            .insert(name.to_string(), Binding { value, mutable });
    }

    pub fn has_own_binding(&self, name: &str) -> bool {
        self.bindings.read().contains_key(name)
    }

    /// Looks `name` up through the chain of enclosing environments.
    pub fn lookup(&self, name: &str) -> Option<JsValue> {
        if let Some(b) = self.bindings.read().get(name) {
            return Some(b.value.clone());
        }
        match &self.outer {
            Some(outer) => outer.lookup(name),
            None => None,
        }
    }

    /// Assigns to the nearest binding of `name`. Returns `Ok(false)` when no
    /// environment in the chain declares it.
    pub fn assign(&self, name: &str, value: JsValue) -> Result<bool, JErrorType> {
        {
            let mut bindings = self.bindings.write();
            if let Some(b) = bindings.get_mut(name) {
                if !b.mutable {
                    return Err(JErrorType::TypeError(format!(
                        "Assignment to constant variable '{}'",
                        name
                    )));
                }
                b.value = value;
                return Ok(true);
            }
        }
        match &self.outer {
            Some(outer) => outer.assign(name, value),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_bindings_shadow_outer_ones() {
        let outer = LexEnvironment::new(None);
        outer.declare("x", JsValue::from(1), true);
        let inner = LexEnvironment::new(Some(outer.clone()));
        inner.declare("x", JsValue::from(2), true);
        assert_eq!(inner.lookup("x"), Some(JsValue::from(2)));
        assert_eq!(outer.lookup("x"), Some(JsValue::from(1)));
    }

    #[test]
    fn assignment_walks_the_chain() {
        let outer = LexEnvironment::new(None);
        outer.declare("x", JsValue::from(1), true);
        outer.declare("k", JsValue::from(1), false);
        let inner = LexEnvironment::new(Some(outer.clone()));
        assert!(inner.assign("x", JsValue::from(5)).unwrap());
        assert_eq!(outer.lookup("x"), Some(JsValue::from(5)));
        assert!(!inner.assign("missing", JsValue::Null).unwrap());
        assert!(inner.assign("k", JsValue::Null).is_err());
    }
}
