//! Engines shared across threads.

extern crate just_host;

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use just_host::{EngineConfig, JsValue, ScriptEngine, ScriptError};
use pretty_assertions::assert_eq;

use common::{BrokenCompiler, CountingCompiler};

#[test]
fn test_runtime_is_initialized_once_across_threads() {
    let compiler = Arc::new(CountingCompiler::new());
    let engine = Arc::new(ScriptEngine::with_compiler(compiler.clone(), EngineConfig::default()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = engine.clone();
            thread::spawn(move || engine.evaluate(&format!("{} * 2", i)).unwrap())
        })
        .collect();
    let mut results: Vec<i64> = handles
        .into_iter()
        .map(|h| h.join().unwrap().as_i64().unwrap())
        .collect();
    results.sort();

    assert_eq!(results, vec![0, 2, 4, 6, 8, 10, 12, 14]);
    assert_eq!(compiler.count(), 1);
    assert!(engine.is_initialized());
}

#[test]
fn test_initialization_failure_is_remembered() {
    let compiler = Arc::new(BrokenCompiler {
        attempts: AtomicUsize::new(0),
    });
    let engine = ScriptEngine::with_compiler(compiler.clone(), EngineConfig::default());
    for _ in 0..3 {
        match engine.evaluate("1") {
            Err(ScriptError::Initialization(message)) => assert_eq!(message, "runtime unavailable"),
            other => panic!("expected an initialization error, got {:?}", other),
        }
    }
    assert!(engine.compile("1").err().is_some());
    assert_eq!(compiler.attempts.load(Ordering::SeqCst), 1);
    assert!(!engine.is_initialized());
}

#[test]
fn test_invocations_run_concurrently_with_evaluation() {
    let engine = Arc::new(ScriptEngine::new());
    engine
        .evaluate("function version() { return 1 }")
        .unwrap();

    let reader = {
        let engine = engine.clone();
        thread::spawn(move || {
            let mut seen = Vec::new();
            for _ in 0..200 {
                let v = engine.invoke_function("version", vec![]).unwrap();
                seen.push(v.as_i64().unwrap());
            }
            seen
        })
    };
    for n in 2..20 {
        engine
            .evaluate(&format!("function version() {{ return {} }}", n))
            .unwrap();
    }
    let seen = reader.join().unwrap();

    // Every call sees some whole session, and sessions only move forward.
    assert!(seen.iter().all(|v| (1..20).contains(v)));
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(
        engine.invoke_function("version", vec![]).unwrap(),
        JsValue::from(19)
    );
}

#[test]
fn test_shared_program_state_across_threads() {
    let engine = Arc::new(ScriptEngine::new());
    engine
        .evaluate("var count = 0\nfunction bump() { count = count + 1; return count }")
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = engine.clone();
            thread::spawn(move || {
                for _ in 0..25 {
                    engine.invoke_function("bump", vec![]).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    let last = engine.invoke_function("bump", vec![]).unwrap();
    // Read and write are separate steps, so updates may be lost, but never more than
    // the number of calls made.
    let last = last.as_i64().unwrap();
    assert!(last >= 1 && last <= 101);
}
