//! Reflective invocation: resolving a callable by name, arity and argument types, then
//! calling it.
//!
//! Candidates are grouped by `(name, arity)` ahead of time. Resolution keeps the
//! candidates whose every declared parameter accepts the runtime type of the argument in
//! that position, then applies the registry's [`OverloadPolicy`].

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{debug, debug_span, trace};

use crate::host::bindings::BindingScope;
use crate::host::error::ScriptError;
use crate::runner::ds::object::{Callable, Invocation};
use crate::runner::ds::types::JsType;
use crate::runner::ds::value::JsValue;

/// Tie-break among several type-compatible candidates of the same name and arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverloadPolicy {
    /// Highest summed parameter specificity wins; equal scores go to the earlier
    /// declaration.
    #[default]
    MostSpecific,
    /// The earliest declaration that accepts the arguments wins.
    FirstDeclared,
}

/// Picks the candidate for `args` among `candidates`, which are in declaration order.
pub fn select_overload<'c, T, F>(
    candidates: &'c [T],
    params_of: F,
    args: &[JsValue],
    policy: OverloadPolicy,
) -> Option<&'c T>
where
    F: Fn(&T) -> Vec<JsType>,
{
    let arg_types: Vec<JsType> = args.iter().map(JsType::of).collect();
    let mut best: Option<(&'c T, u32)> = None;
    for (position, candidate) in candidates.iter().enumerate() {
        let params = params_of(candidate);
        if params.len() != arg_types.len() {
            continue;
        }
        if !params.iter().zip(&arg_types).all(|(p, a)| p.accepts(a)) {
            trace!(position, "candidate rejected by argument types");
            continue;
        }
        match policy {
            OverloadPolicy::FirstDeclared => return Some(candidate),
            OverloadPolicy::MostSpecific => {
                let score: u32 = params
                    .iter()
                    .zip(&arg_types)
                    .map(|(p, a)| p.specificity(a))
                    .sum();
                if best.map_or(true, |(_, s)| score > s) {
                    best = Some((candidate, score));
                }
            }
        }
    }
    best.map(|(c, _)| c)
}

/// Positional arguments of a reflective call, optionally preceded by the caller's
/// binding scope.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    scope: Option<BindingScope>,
    values: Vec<JsValue>,
}

impl Arguments {
    pub fn positional(values: Vec<JsValue>) -> Self {
        Arguments {
            scope: None,
            values,
        }
    }

    pub fn with_scope(scope: BindingScope, values: Vec<JsValue>) -> Self {
        Arguments {
            scope: Some(scope),
            values,
        }
    }

    /// Arity as seen by the resolver, counting the scope slot.
    pub fn arity(&self) -> usize {
        self.values.len() + self.scope.is_some() as usize
    }

    pub fn values(&self) -> &[JsValue] {
        &self.values
    }

    pub fn scope(&self) -> Option<&BindingScope> {
        self.scope.as_ref()
    }
}

#[derive(Debug, Clone)]
pub enum Resolution {
    Found(Callable),
    NotFound,
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }
}

/// Callables of one invocation target, keyed by `(name, arity)`.
#[derive(Debug, Clone, Default)]
pub struct CallableRegistry {
    entries: IndexMap<(String, usize), Vec<Callable>>,
    policy: OverloadPolicy,
}

impl CallableRegistry {
    pub fn new(policy: OverloadPolicy) -> Self {
        CallableRegistry {
            entries: IndexMap::new(),
            policy,
        }
    }

    pub fn from_callables<I>(callables: I, policy: OverloadPolicy) -> Self
    where
        I: IntoIterator<Item = Callable>,
    {
        let mut registry = CallableRegistry::new(policy);
        for callable in callables {
            registry.register(callable);
        }
        registry
    }

    /// The registry of an arbitrary value: an object's declared callables, nothing for
    /// anything else.
    pub fn for_target(target: &JsValue, policy: OverloadPolicy) -> Self {
        match target {
            JsValue::Object(o) => CallableRegistry::from_callables(o.declared_callables(), policy),
            _ => CallableRegistry::new(policy),
        }
    }

    pub fn register(&mut self, callable: Callable) {
        self.entries
            .entry((callable.name.clone(), callable.arity()))
            .or_default()
            .push(callable);
    }

    pub fn policy(&self) -> OverloadPolicy {
        self.policy
    }

    /// Number of registered callables.
    pub fn len(&self) -> usize {
        self.entries.values().map(|c| c.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct callable names, in first-registration order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for (name, _) in self.entries.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    pub fn resolve(&self, name: &str, args: &Arguments) -> Resolution {
        let candidates = match self.entries.get(&(name.to_string(), args.arity())) {
            Some(c) => c,
            None => return Resolution::NotFound,
        };
        let compatible: Vec<&Callable> = candidates
            .iter()
            .filter(|c| c.signature.receives_scope == args.scope.is_some())
            .collect();
        match select_overload(
            &compatible,
            |c| c.signature.params.clone(),
            &args.values,
            self.policy,
        ) {
            Some(c) => Resolution::Found((*c).clone()),
            None => Resolution::NotFound,
        }
    }
}

/// Resolves `name` in `registry` and calls it on `target`. Resolution failure is
/// reported as `NoSuchCallable`; a failure inside the callable as `Invocation`.
pub fn invoke(
    registry: &CallableRegistry,
    target: &JsValue,
    name: &str,
    args: Arguments,
) -> Result<JsValue, ScriptError> {
    let _span = debug_span!("invoke", name, arity = args.arity()).entered();
    match registry.resolve(name, &args) {
        Resolution::NotFound => {
            debug!("no matching callable");
            Err(ScriptError::NoSuchCallable {
                name: name.to_string(),
                arity: args.values.len(),
            })
        }
        Resolution::Found(callable) => callable
            .call(&Invocation {
                this: target,
                scope: args.scope(),
                args: args.values(),
            })
            .map_err(|source| ScriptError::Invocation {
                name: name.to_string(),
                source,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::error::JErrorType;
    use crate::runner::ds::object::Signature;

    fn tagged(name: &str, params: Vec<JsType>, tag: &'static str) -> Callable {
        Callable::new(name, Signature::new(params), move |_| Ok(JsValue::from(tag)))
    }

    fn call(registry: &CallableRegistry, name: &str, args: Vec<JsValue>) -> Result<JsValue, ScriptError> {
        invoke(registry, &JsValue::Undefined, name, Arguments::positional(args))
    }

    #[test]
    fn filters_by_name_arity_and_type() {
        let registry = CallableRegistry::from_callables(
            vec![
                tagged("f", vec![JsType::Number], "number"),
                tagged("f", vec![JsType::String], "string"),
                tagged("f", vec![JsType::Any, JsType::Any], "pair"),
            ],
            OverloadPolicy::MostSpecific,
        );
        assert_eq!(call(&registry, "f", vec![JsValue::from(1)]).unwrap(), JsValue::from("number"));
        assert_eq!(call(&registry, "f", vec![JsValue::from("a")]).unwrap(), JsValue::from("string"));
        assert_eq!(
            call(&registry, "f", vec![JsValue::from(1), JsValue::from(2)]).unwrap(),
            JsValue::from("pair")
        );
        assert!(call(&registry, "f", vec![JsValue::from(true)]).unwrap_err().is_no_such_callable());
        assert!(call(&registry, "g", vec![]).unwrap_err().is_no_such_callable());
    }

    #[test]
    fn most_specific_wins_over_declaration_order() {
        let callables = vec![
            tagged("f", vec![JsType::Any], "any"),
            tagged("f", vec![JsType::Object], "object"),
            tagged("f", vec![JsType::Array], "array"),
        ];
        let most = CallableRegistry::from_callables(callables.clone(), OverloadPolicy::MostSpecific);
        let first = CallableRegistry::from_callables(callables, OverloadPolicy::FirstDeclared);
        let arg = vec![JsValue::array(vec![])];
        assert_eq!(call(&most, "f", arg.clone()).unwrap(), JsValue::from("array"));
        assert_eq!(call(&first, "f", arg).unwrap(), JsValue::from("any"));
    }

    #[test]
    fn equal_scores_go_to_the_first_declaration() {
        let registry = CallableRegistry::from_callables(
            vec![
                tagged("f", vec![JsType::String, JsType::Any], "first"),
                tagged("f", vec![JsType::Any, JsType::String], "second"),
            ],
            OverloadPolicy::MostSpecific,
        );
        let args = vec![JsValue::from("a"), JsValue::from("b")];
        assert_eq!(call(&registry, "f", args).unwrap(), JsValue::from("first"));
    }

    #[test]
    fn scope_slot_counts_towards_arity() {
        let scoped = Callable::new("hello", Signature::scoped(vec![JsType::Any]), |inv| {
            assert!(inv.scope.is_some());
            Ok(inv.args[0].clone())
        });
        let registry = CallableRegistry::from_callables(vec![scoped], OverloadPolicy::MostSpecific);
        let with_scope = Arguments::with_scope(BindingScope::empty(), vec![JsValue::from("X")]);
        assert!(registry.resolve("hello", &with_scope).is_found());
        let without = Arguments::positional(vec![JsValue::from("X")]);
        assert!(!registry.resolve("hello", &without).is_found());
        let both = Arguments::positional(vec![JsValue::from("X"), JsValue::from("Y")]);
        assert!(!registry.resolve("hello", &both).is_found());
    }

    #[test]
    fn body_failures_are_wrapped() {
        let failing = Callable::new("boom", Signature::new(vec![]), |_| {
            Err(JErrorType::TypeError("bad".to_string()))
        });
        let registry = CallableRegistry::from_callables(vec![failing], OverloadPolicy::MostSpecific);
        match call(&registry, "boom", vec![]) {
            Err(ScriptError::Invocation { name, source }) => {
                assert_eq!(name, "boom");
                assert!(matches!(source, JErrorType::TypeError(_)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn registry_bookkeeping() {
        let registry = CallableRegistry::from_callables(
            vec![
                tagged("b", vec![], "b"),
                tagged("a", vec![], "a"),
                tagged("b", vec![JsType::Any], "b1"),
            ],
            OverloadPolicy::FirstDeclared,
        );
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.names(), vec!["b".to_string(), "a".to_string()]);
        assert_eq!(registry.policy(), OverloadPolicy::FirstDeclared);
    }
}
