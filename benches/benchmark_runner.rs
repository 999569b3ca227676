/// Benchmark runner for the host bridge.
///
/// Compares evaluating source on every iteration with compiling once and
/// re-evaluating, and measures reflective function calls.
extern crate just_host;

use just_host::{JsNumberType, JsValue, ScriptContext, ScriptEngine};
use std::time::{Duration, Instant};

/// Parse, evaluate and flush on every iteration.
fn run_benchmark_eval(name: &str, code: &str, iterations: u32) -> Duration {
    let engine = ScriptEngine::new();
    if let Err(e) = engine.evaluate(code) {
        panic!("Failed to run benchmark {}: {}", name, e);
    }

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = engine.evaluate(code);
    }
    start.elapsed()
}

/// Compile once, then evaluate the same program instance repeatedly.
fn run_benchmark_compiled(name: &str, code: &str, iterations: u32) -> Duration {
    let engine = ScriptEngine::new();
    let program = match engine.compile(code) {
        Ok(p) => p,
        Err(e) => panic!("Failed to compile benchmark {}: {}", name, e),
    };
    let context = ScriptContext::new();

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = program.evaluate(&context);
    }
    start.elapsed()
}

/// Evaluate once and read a flushed variable back.
fn run_and_get_var(code: &str, var_name: &str) -> JsValue {
    let engine = ScriptEngine::new();
    let _ = engine.evaluate(code);
    engine.get(var_name).unwrap_or(JsValue::Undefined)
}

// ============================================================================
// Benchmark definitions
// ============================================================================

const BENCH_FIBONACCI: &str = r#"
var n = 20;
var a = 0;
var b = 1;
for (var i = 0; i < n; i = i + 1) {
    var temp = a;
    a = b;
    b = temp + b;
}
"#;

const BENCH_LOOP_SUM: &str = r#"
var sum = 0;
for (var i = 0; i < 10000; i = i + 1) {
    sum = sum + i;
}
"#;

const BENCH_NESTED_LOOPS: &str = r#"
var count = 0;
for (var i = 0; i < 100; i = i + 1) {
    for (var j = 0; j < 100; j = j + 1) {
        count = count + 1;
    }
}
"#;

const BENCH_CONDITIONALS: &str = r#"
var count = 0;
for (var i = 0; i < 1000; i = i + 1) {
    if (i % 2 === 0) {
        count = count + 1;
    } else {
        count = count + 2;
    }
}
"#;

const BENCH_FACTORIAL: &str = r#"
function factorial(n) {
    if (n <= 1) return 1;
    return n * factorial(n - 1);
}
var result = factorial(12);
"#;

const BENCH_PRIME_SIEVE: &str = r#"
var count = 0;
for (var n = 2; n < 100; n = n + 1) {
    var isPrime = true;
    for (var i = 2; i * i <= n; i = i + 1) {
        if (n % i === 0) {
            isPrime = false;
            break;
        }
    }
    if (isPrime) {
        count = count + 1;
    }
}
"#;

const BENCH_CLASSES: &str = r#"
class Counter {
    var total = 0
    add(n) { this.total = this.total + n; return this }
}
var c = new Counter();
for (var i = 0; i < 500; i++) { c.add(i) }
var total = c.total;
"#;

const BENCH_INVOKE: &str = r#"
function add(a: Number, b: Number) { return a + b }
function add(a: String, b: String) { return a + b }
"#;

fn main() {
    println!("=======================================================");
    println!("  just-host - Performance Benchmarks");
    println!("  Evaluate From Source vs Compile Once");
    println!("=======================================================\n");

    let benchmarks: Vec<(&str, &str, u32)> = vec![
        ("Fibonacci (n=20)", BENCH_FIBONACCI, 1000),
        ("Loop Sum (10K iterations)", BENCH_LOOP_SUM, 100),
        ("Nested Loops (100x100)", BENCH_NESTED_LOOPS, 100),
        ("Conditionals (1K)", BENCH_CONDITIONALS, 500),
        ("Factorial (n=12)", BENCH_FACTORIAL, 5000),
        ("Prime Sieve (<100)", BENCH_PRIME_SIEVE, 200),
        ("Class Methods (500)", BENCH_CLASSES, 200),
    ];

    println!("{:<30} {:>14} {:>14} {:>10}", "Benchmark", "Evaluate", "Compiled", "Speedup");
    println!("{}", "-".repeat(70));

    let mut total_eval = Duration::ZERO;
    let mut total_compiled = Duration::ZERO;

    for (name, code, iterations) in &benchmarks {
        let eval_dur = run_benchmark_eval(name, code, *iterations);
        let compiled_dur = run_benchmark_compiled(name, code, *iterations);
        total_eval += eval_dur;
        total_compiled += compiled_dur;

        let speedup = eval_dur.as_secs_f64() / compiled_dur.as_secs_f64();

        println!(
            "{:<30} {:>12.2?} {:>12.2?} {:>9.2}x",
            name, eval_dur, compiled_dur, speedup
        );
    }

    println!("{}", "-".repeat(70));
    let total_speedup = total_eval.as_secs_f64() / total_compiled.as_secs_f64();
    println!(
        "{:<30} {:>12.2?} {:>12.2?} {:>9.2}x",
        "TOTAL", total_eval, total_compiled, total_speedup
    );

    println!("\n=======================================================");
    println!("  Reflective Invocation");
    println!("=======================================================\n");

    let engine = ScriptEngine::new();
    if let Err(e) = engine.evaluate(BENCH_INVOKE) {
        panic!("Failed to set up invocation benchmark: {}", e);
    }
    let calls = 10_000;
    let start = Instant::now();
    for i in 0..calls {
        let _ = engine.invoke_function("add", vec![JsValue::from(i), JsValue::from(1)]);
    }
    let numeric = start.elapsed();
    let start = Instant::now();
    for _ in 0..calls {
        let _ = engine.invoke_function("add", vec![JsValue::from("a"), JsValue::from("b")]);
    }
    let strings = start.elapsed();
    println!("{:<30} {:>12.2?}", "add(Number, Number) x10K", numeric);
    println!("{:<30} {:>12.2?}", "add(String, String) x10K", strings);

    // Verify correctness
    println!("\n=======================================================");
    println!("  Correctness Verification");
    println!("=======================================================\n");

    let verifications: Vec<(&str, &str, &str, i64)> = vec![
        ("Fibonacci", BENCH_FIBONACCI, "a", 6765),
        ("Loop Sum", BENCH_LOOP_SUM, "sum", 49995000),
        ("Nested Loops", BENCH_NESTED_LOOPS, "count", 10000),
        ("Factorial", BENCH_FACTORIAL, "result", 479001600),
        ("Prime Count", BENCH_PRIME_SIEVE, "count", 25),
        ("Class Methods", BENCH_CLASSES, "total", 124750),
    ];

    println!("{:<20} {:>12} {:>12}", "Test", "Expected", "Actual");
    println!("{}", "-".repeat(46));

    for (name, code, var, expected) in verifications {
        let actual = match run_and_get_var(code, var) {
            JsValue::Number(JsNumberType::Integer(n)) => n,
            _ => -1,
        };
        let status = if actual == expected { "✓" } else { "✗" };
        println!("{:<20} {:>12} {:>4} {:>7}", name, expected, status, actual);
    }
}
