//! End-to-end tests of the engine: evaluation, reflective calls and binding flushes.

extern crate just_host;

mod common;

use std::io::Cursor;

use just_host::host::io::OutputBuffer;
use just_host::{JsType, JsValue, ScopeLevel, ScriptContext, ScriptEngine, ScriptError};
use pretty_assertions::assert_eq;

use common::{contents_of, string_writer};

const HELLO: &str = "function hello(name: String): String {
    var value = \"Hello, \" + name
    return value
}";

#[test]
fn test_invoke_function_after_evaluate() {
    let engine = ScriptEngine::new();
    engine.evaluate(HELLO).unwrap();
    let result = engine
        .invoke_function("hello", vec![JsValue::from("Scripting!!")])
        .unwrap();
    assert_eq!(result, JsValue::from("Hello, Scripting!!"));
    // Function locals never reach the bindings.
    assert_eq!(engine.get("value"), None);
    assert_eq!(engine.get("hello"), None);
}

#[test]
fn test_invoke_method_on_script_object() {
    let engine = ScriptEngine::new();
    engine
        .evaluate(
            "class Doit {
                function doIt(s: String): String { return 'Did ' + s }
            }
            var obj = new Doit()",
        )
        .unwrap();
    let obj = engine.get("obj").unwrap();
    let result = engine.invoke_method(&obj, "doIt", vec![JsValue::from("it")]).unwrap();
    assert_eq!(result, JsValue::from("Did it"));
}

#[test]
fn test_evaluate_from_reader() {
    let engine = ScriptEngine::new();
    let result = engine
        .evaluate_reader(Cursor::new("var x = 6 * 7; x".as_bytes()))
        .unwrap();
    assert_eq!(result, JsValue::from(42));
    assert_eq!(engine.get("x"), Some(JsValue::from(42)));
}

#[test]
fn test_put_is_visible_to_scripts() {
    let engine = ScriptEngine::new();
    engine.put("filename", JsValue::from("test.js"));
    let result = engine.evaluate("'running ' + filename").unwrap();
    assert_eq!(result, JsValue::from("running test.js"));
    assert_eq!(engine.get("filename"), Some(JsValue::from("test.js")));
}

#[test]
fn test_multiple_scopes() {
    let engine = ScriptEngine::new();
    let (out, handle) = string_writer();
    engine.put("out", out.clone());
    engine.evaluate("out.append('hello')").unwrap();

    let context = ScriptContext::new();
    let bindings = context.bindings(ScopeLevel::Engine).unwrap();
    bindings.put("x", JsValue::from("world"));
    bindings.put("out", out);
    engine.evaluate_with_context("out.append(x)", &context).unwrap();

    assert_eq!(contents_of(&handle), "helloworld");
    // The other context's names did not leak into the engine's own bindings.
    assert_eq!(engine.get("x"), None);
}

#[test]
fn test_top_level_variables_are_flushed() {
    let engine = ScriptEngine::new();
    engine
        .evaluate("var a = 1; let b = 'two'; const c = [1, 2]; var d = null; var e")
        .unwrap();
    assert_eq!(engine.get("a"), Some(JsValue::from(1)));
    assert_eq!(engine.get("b"), Some(JsValue::from("two")));
    assert_eq!(
        engine.get("c"),
        Some(JsValue::array(vec![JsValue::from(1), JsValue::from(2)]))
    );
    assert_eq!(engine.get("d"), Some(JsValue::Null));
    assert_eq!(engine.get("e"), Some(JsValue::Undefined));
}

#[test]
fn test_variables_carry_over_between_evaluations() {
    let engine = ScriptEngine::new();
    engine.evaluate("var total = 10").unwrap();
    engine.evaluate("var total = total + 5").unwrap();
    assert_eq!(engine.get("total"), Some(JsValue::from(15)));
}

#[test]
fn test_previous_bindings_survive_unrelated_evaluation() {
    let engine = ScriptEngine::new();
    engine.evaluate("var total = 2 + 2").unwrap();
    assert_eq!(engine.get("total"), Some(JsValue::from(4)));
    engine.evaluate("var other = 'x'").unwrap();
    assert_eq!(engine.get("total"), Some(JsValue::from(4)));
    assert_eq!(engine.get("other"), Some(JsValue::from("x")));
}

#[test]
fn test_compilation_error_reports_position() {
    let engine = ScriptEngine::new();
    match engine.evaluate("var a = 1;\nvar x = ;") {
        Err(ScriptError::Compilation(e)) => {
            assert_eq!(e.line, 2);
            assert!(e.column > 1);
        }
        other => panic!("expected a compilation error, got {:?}", other),
    }
    // A failed compile does not install a session.
    assert!(engine.session().is_none());
}

#[test]
fn test_evaluation_error_skips_flush() {
    let engine = ScriptEngine::new();
    match engine.evaluate("var a = 1; missing()") {
        Err(ScriptError::Evaluation { source }) => {
            assert!(source.to_string().contains("missing is not defined"));
        }
        other => panic!("expected an evaluation error, got {:?}", other),
    }
    assert_eq!(engine.get("a"), None);
}

#[test]
fn test_uncaught_throw_is_an_evaluation_error() {
    let engine = ScriptEngine::new();
    let err = engine.evaluate("throw 'boom'").err().unwrap();
    assert_eq!(err.to_string(), "evaluation failed: Uncaught boom");
}

#[test]
fn test_invoke_before_evaluate_is_not_compiled() {
    let engine = ScriptEngine::new();
    assert!(matches!(
        engine.invoke_function("anything", vec![]),
        Err(ScriptError::NotCompiled)
    ));
}

#[test]
fn test_compile_leaves_session_untouched() {
    let engine = ScriptEngine::new();
    engine.evaluate("function f() { return 1 }").unwrap();
    let program = engine.compile("function f() { return 2 }").unwrap();
    assert_eq!(engine.invoke_function("f", vec![]).unwrap(), JsValue::from(1));
    assert_eq!(program.invoke_function("f", vec![]).unwrap(), JsValue::from(2));
}

#[test]
fn test_compile_uses_an_empty_context() {
    let engine = ScriptEngine::new();
    engine.put("k", JsValue::from(5));
    let program = engine.compile("function f() { return k }").unwrap();
    assert!(!program.scope().contains("k"));
    assert!(matches!(
        program.invoke_function("f", vec![]),
        Err(ScriptError::Invocation { .. })
    ));

    program.evaluate(&engine.context()).unwrap();
    assert_eq!(program.invoke_function("f", vec![]).unwrap(), JsValue::from(5));
}

#[test]
fn test_compiled_program_reevaluates_cumulatively() {
    let engine = ScriptEngine::new();
    engine.put("count", JsValue::from(0));
    let program = engine.compile("var count = count + 1; count").unwrap();
    let context = engine.context();
    assert_eq!(program.evaluate(&context).unwrap(), JsValue::from(1));
    assert_eq!(program.evaluate(&context).unwrap(), JsValue::from(2));
    assert_eq!(program.evaluate(&context).unwrap(), JsValue::from(3));
    assert_eq!(engine.get("count"), Some(JsValue::from(3)));
}

#[test]
fn test_compile_reader() {
    let engine = ScriptEngine::new();
    let program = engine
        .compile_reader(Cursor::new(b"function twice(n) { return n * 2 }".to_vec()))
        .unwrap();
    assert_eq!(
        program.invoke_function("twice", vec![JsValue::from(21)]).unwrap(),
        JsValue::from(42)
    );
    assert!(engine.session().is_none());
}

#[test]
fn test_print_goes_to_context_writer() {
    let engine = ScriptEngine::new();
    let buffer = OutputBuffer::new();
    engine.set_context(ScriptContext::new().with_writer(buffer.clone()));
    engine.evaluate("print('a', 1); print([1, 2])").unwrap();
    assert_eq!(buffer.contents(), "a 1\n1,2\n");

    // Functions called later still write to the writer they were evaluated with.
    engine.evaluate("function shout(s) { print(s.toUpperCase()) }").unwrap();
    buffer.clear();
    engine.invoke_function("shout", vec![JsValue::from("hey")]).unwrap();
    assert_eq!(buffer.contents(), "HEY\n");
}

#[test]
fn test_host_functions_are_callable_from_scripts() {
    let engine = ScriptEngine::new();
    engine.put(
        "square",
        JsValue::host_function("square", vec![JsType::Number], |args| {
            let n = args.first().and_then(|v| v.as_f64()).unwrap_or(0.0);
            Ok(JsValue::from(n * n))
        }),
    );
    assert_eq!(engine.evaluate("square(4) + 1").unwrap(), JsValue::from(17));
}

#[test]
fn test_engine_is_lazily_initialized() {
    let engine = ScriptEngine::new();
    assert!(!engine.is_initialized());
    engine.evaluate("1").unwrap();
    assert!(engine.is_initialized());
}

#[test]
fn test_class_and_intrinsic_type_are_not_flushed() {
    let engine = ScriptEngine::new();
    let result = engine.evaluate("var kind = this.Class; kind").unwrap();
    let name = result.as_str().unwrap().to_string();
    assert!(name.starts_with("Program_"), "unexpected type name {}", name);
    assert_eq!(engine.get("Class"), None);
    assert_eq!(engine.get("IntrinsicType"), None);
    assert_eq!(engine.get("kind"), Some(JsValue::from(name)));
}
