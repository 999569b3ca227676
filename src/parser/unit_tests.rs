use super::api::JsParser;
use super::api::Rule;
use super::ast::*;

use pest::error::ErrorVariant;
use pest::{consumes_to, parses_to};

fn parse(code: &str) -> ProgramData {
    match JsParser::parse_to_ast_from_str(code) {
        Ok(p) => p,
        Err(e) => panic!("failed to parse {:?}: {}", code, e),
    }
}

fn validation_message(code: &str) -> String {
    match JsParser::parse_to_ast_from_str(code) {
        Ok(_) => panic!("expected {:?} to be rejected", code),
        Err(e) => match e.variant {
            ErrorVariant::CustomError { message } => message,
            other => panic!("expected a validation error, got {:?}", other),
        },
    }
}

fn single_expression(code: &str) -> ExpressionType {
    let mut program = parse(code);
    assert_eq!(program.body.len(), 1);
    match program.body.remove(0) {
        StatementType::ExpressionStatement { expression } => expression,
        other => panic!("not an expression statement: {:?}", other),
    }
}

#[test]
fn test_number_literal_tokens() {
    parses_to! {
        parser: JsParser,
        input: "10.5e3",
        rule: Rule::number_literal,
        tokens: [
            number_literal(0, 6)
        ]
    };
}

#[test]
fn test_string_literal_tokens() {
    parses_to! {
        parser: JsParser,
        input: "'ab\\'c'",
        rule: Rule::string_literal,
        tokens: [
            string_literal(0, 7, [
                single_chars(1, 6)
            ])
        ]
    };
}

#[test]
fn test_number_literals() {
    assert!(matches!(
        single_expression("42"),
        ExpressionType::Literal(LiteralType::NumberLiteral(NumberLiteralType::IntegerLiteral(42)))
    ));
    assert!(matches!(
        single_expression("4.5"),
        ExpressionType::Literal(LiteralType::NumberLiteral(NumberLiteralType::FloatLiteral(f))) if f == 4.5
    ));
    assert!(matches!(
        single_expression("99999999999999999999"),
        ExpressionType::Literal(LiteralType::NumberLiteral(NumberLiteralType::FloatLiteral(_)))
    ));
}

#[test]
fn test_string_escapes() {
    match single_expression(r#""a\tb\nA""#) {
        ExpressionType::Literal(LiteralType::StringLiteral(s)) => assert_eq!(s, "a\tb\nA"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_variable_declarations_with_annotations() {
    let program = parse("var a: String = 'x', b; const c = 1");
    assert_eq!(program.body.len(), 2);
    match &program.body[0] {
        StatementType::VariableDeclaration(decl) => {
            assert_eq!(decl.kind, VariableDeclarationKind::Var);
            assert_eq!(decl.declarations.len(), 2);
            assert_eq!(decl.declarations[0].id, "a");
            assert_eq!(decl.declarations[0].type_name.as_deref(), Some("String"));
            assert!(decl.declarations[1].init.is_none());
        }
        other => panic!("unexpected {:?}", other),
    }
    match &program.body[1] {
        StatementType::VariableDeclaration(decl) => {
            assert_eq!(decl.kind, VariableDeclarationKind::Const)
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_keywords_are_not_identifiers_but_prefixes_are() {
    assert!(JsParser::parse_to_ast_from_str("var var = 1;").is_err());
    let program = parse("var variable = 1; var classy = 2; var newer = 3;");
    assert_eq!(program.body.len(), 3);
}

#[test]
fn test_function_declaration() {
    let program = parse("function hello(name: String, n): String { var value = 'Hello, ' + name; return value }");
    match &program.body[0] {
        StatementType::FunctionDeclaration(f) => {
            assert_eq!(f.name(), "hello");
            assert_eq!(f.params.len(), 2);
            assert_eq!(f.params[0].type_name.as_deref(), Some("String"));
            assert!(f.params[1].type_name.is_none());
            assert_eq!(f.return_type.as_deref(), Some("String"));
            assert_eq!(f.body.len(), 2);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_class_declaration() {
    let program = parse(
        "class Doit {
            var count = 0
            constructor(start) { this.count = start }
            function doIt(s: String) { return s + this.count }
            reset() { this.count = 0 }
        }",
    );
    match &program.body[0] {
        StatementType::ClassDeclaration(c) => {
            assert_eq!(c.id, "Doit");
            assert_eq!(c.fields.len(), 1);
            assert!(c.constructor.is_some());
            let names: Vec<&str> = c.methods.iter().map(|m| m.name()).collect();
            assert_eq!(names, vec!["doIt", "reset"]);
            assert_eq!(c.methods_named("doIt").count(), 1);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_precedence() {
    match single_expression("1 + 2 * 3") {
        ExpressionType::BinaryExpression {
            operator: BinaryOperator::Add,
            right,
            ..
        } => assert!(matches!(
            *right,
            ExpressionType::BinaryExpression {
                operator: BinaryOperator::Multiply,
                ..
            }
        )),
        other => panic!("unexpected {:?}", other),
    }
    match single_expression("a || b && c") {
        ExpressionType::LogicalExpression {
            operator: LogicalOperator::Or,
            right,
            ..
        } => assert!(matches!(
            *right,
            ExpressionType::LogicalExpression {
                operator: LogicalOperator::And,
                ..
            }
        )),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_binary_chains_fold_left() {
    match single_expression("10 - 4 - 3") {
        ExpressionType::BinaryExpression {
            operator: BinaryOperator::Subtract,
            left,
            right,
        } => {
            assert!(matches!(*left, ExpressionType::BinaryExpression { .. }));
            assert!(matches!(
                *right,
                ExpressionType::Literal(LiteralType::NumberLiteral(NumberLiteralType::IntegerLiteral(3)))
            ));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_member_calls_and_new() {
    match single_expression("obj.run(1, 'a')") {
        ExpressionType::CallExpression { callee, arguments } => {
            assert!(matches!(*callee, ExpressionType::MemberExpression { ref property, .. } if property == "run"));
            assert_eq!(arguments.len(), 2);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(
        single_expression("new Doit(1).doIt('x')"),
        ExpressionType::CallExpression { .. }
    ));
    assert!(matches!(
        single_expression("new Doit"),
        ExpressionType::NewExpression { ref arguments, .. } if arguments.is_empty()
    ));
}

#[test]
fn test_assignments_and_updates() {
    assert!(matches!(
        single_expression("x += 2"),
        ExpressionType::AssignmentExpression {
            operator: AssignmentOperator::AddEquals,
            ..
        }
    ));
    assert!(matches!(
        single_expression("a[0] = b.c = 1"),
        ExpressionType::AssignmentExpression { .. }
    ));
    assert!(matches!(
        single_expression("i++"),
        ExpressionType::UpdateExpression { prefix: false, .. }
    ));
    assert!(matches!(
        single_expression("--i"),
        ExpressionType::UpdateExpression { prefix: true, .. }
    ));
}

#[test]
fn test_control_flow_statements() {
    let program = parse(
        "if (a) { b() } else c();
         while (x < 10) x++;
         for (var i = 0; i < 3; i++) { continue }
         for (;;) { break }
         try { throw 'boom' } catch (e) { print(e) } finally { done() }
         ;",
    );
    assert!(matches!(program.body[0], StatementType::IfStatement { alternate: Some(_), .. }));
    assert!(matches!(program.body[1], StatementType::WhileStatement { .. }));
    assert!(matches!(program.body[2], StatementType::ForStatement { init: Some(_), .. }));
    assert!(matches!(
        program.body[3],
        StatementType::ForStatement { init: None, test: None, update: None, .. }
    ));
    assert!(matches!(
        program.body[4],
        StatementType::TryStatement { handler: Some(_), finalizer: Some(_), .. }
    ));
    assert!(matches!(program.body[5], StatementType::EmptyStatement));
}

#[test]
fn test_literals_and_comments() {
    let program = parse(
        "// leading comment
         var o = { a: 1, 'b c': [1, 2, 3,], }; /* block */
         var f = function (x) { return x };",
    );
    assert_eq!(program.body.len(), 2);
    match &program.body[0] {
        StatementType::VariableDeclaration(decl) => match &decl.declarations[0].init {
            Some(ExpressionType::ObjectExpression(props)) => {
                let keys: Vec<&str> = props.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, vec!["a", "b c"]);
            }
            other => panic!("unexpected {:?}", other),
        },
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_validation_errors() {
    assert_eq!(
        validation_message("const x;"),
        "Missing initializer in const declaration"
    );
    assert_eq!(
        validation_message("function f(a, a) {}"),
        "Duplicate parameter name"
    );
    assert_eq!(
        validation_message("try { x() }"),
        "Missing catch or finally after try"
    );
    assert_eq!(
        validation_message("1 = 2"),
        "Invalid left-hand side in assignment"
    );
}

#[test]
fn test_syntax_errors() {
    assert!(JsParser::parse_to_ast_from_str("var x = ;").is_err());
    assert!(JsParser::parse_to_ast_from_str("function (").is_err());
    assert!(JsParser::parse_to_ast_from_str("a +").is_err());
}
