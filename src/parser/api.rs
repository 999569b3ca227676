use std::sync::Arc;

use pest::error::{Error, ErrorVariant};
use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;

use super::ast::*;

#[derive(Parser)]
#[grammar = "parser/js_grammar.pest"] // relative to src
pub struct JsParser;

impl JsParser {
    /// Parse a complete script into its AST.
    pub fn parse_to_ast_from_str(script: &str) -> Result<ProgramData, Error<Rule>> {
        let pairs = JsParser::parse(Rule::script, script)?;
        build_ast_from_script(pairs, script.len())
    }
}

fn build_ast_from_script(pairs: Pairs<Rule>, script_len: usize) -> Result<ProgramData, Error<Rule>> {
    let mut body = vec![];
    for pair in pairs {
        if pair.as_rule() != Rule::script {
            return Err(get_unexpected_error(1, &pair));
        }
        for child in pair.into_inner() {
            match child.as_rule() {
                Rule::statement => body.push(build_ast_from_statement(child)?),
                Rule::EOI => { /* Do nothing */ }
                _ => return Err(get_unexpected_error(2, &child)),
            }
        }
    }
    Ok(ProgramData {
        meta: Meta {
            start_index: 0,
            end_index: script_len,
        },
        body,
    })
}

fn get_unexpected_error(id: i32, pair: &Pair<Rule>) -> Error<Rule> {
    let message = format!("Unexpected state reached [{:?}] - {}", pair.as_rule(), id);
    Error::new_from_span(ErrorVariant::CustomError { message }, pair.as_span())
}

fn get_validation_error(message: &str, pair: &Pair<Rule>) -> Error<Rule> {
    Error::new_from_span(
        ErrorVariant::CustomError {
            message: message.to_string(),
        },
        pair.as_span(),
    )
}

fn meta_of(pair: &Pair<Rule>) -> Meta {
    let span = pair.as_span();
    Meta {
        start_index: span.start(),
        end_index: span.end(),
    }
}

fn first_inner<'i>(pair: &Pair<'i, Rule>) -> Result<Pair<'i, Rule>, Error<Rule>> {
    pair.clone()
        .into_inner()
        .next()
        .ok_or_else(|| get_unexpected_error(3, pair))
}

fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_var
            | Rule::kw_let
            | Rule::kw_const
            | Rule::kw_function
            | Rule::kw_class
            | Rule::kw_return
            | Rule::kw_if
            | Rule::kw_else
            | Rule::kw_while
            | Rule::kw_for
            | Rule::kw_break
            | Rule::kw_continue
            | Rule::kw_throw
            | Rule::kw_try
            | Rule::kw_catch
            | Rule::kw_finally
            | Rule::kw_new
    )
}

/// Children of `pair` with keyword tokens removed.
fn significant<'i>(pair: &Pair<'i, Rule>) -> Vec<Pair<'i, Rule>> {
    pair.clone()
        .into_inner()
        .filter(|p| !is_keyword(p.as_rule()))
        .collect()
}

fn build_statement_list(pair: Pair<Rule>) -> Result<Vec<StatementType>, Error<Rule>> {
    let mut statements = vec![];
    for child in pair.into_inner() {
        match child.as_rule() {
            Rule::statement => statements.push(build_ast_from_statement(child)?),
            _ => return Err(get_unexpected_error(4, &child)),
        }
    }
    Ok(statements)
}

fn build_ast_from_statement(pair: Pair<Rule>) -> Result<StatementType, Error<Rule>> {
    let inner_pair = first_inner(&pair)?;
    Ok(match inner_pair.as_rule() {
        Rule::function_declaration => {
            StatementType::FunctionDeclaration(Arc::new(build_ast_from_function(inner_pair)?))
        }
        Rule::class_declaration => {
            StatementType::ClassDeclaration(Arc::new(build_ast_from_class(inner_pair)?))
        }
        Rule::variable_statement => {
            StatementType::VariableDeclaration(build_ast_from_variable_declaration(inner_pair)?)
        }
        Rule::if_statement => {
            let mut children = significant(&inner_pair).into_iter();
            let test = next_expression(&mut children, &inner_pair)?;
            let consequent = Box::new(next_statement(&mut children, &inner_pair)?);
            let alternate = match children.next() {
                Some(p) => Some(Box::new(build_ast_from_statement(p)?)),
                None => None,
            };
            StatementType::IfStatement {
                test,
                consequent,
                alternate,
            }
        }
        Rule::while_statement => {
            let mut children = significant(&inner_pair).into_iter();
            let test = next_expression(&mut children, &inner_pair)?;
            let body = Box::new(next_statement(&mut children, &inner_pair)?);
            StatementType::WhileStatement { test, body }
        }
        Rule::for_statement => build_ast_from_for_statement(inner_pair)?,
        Rule::return_statement => {
            let argument = match significant(&inner_pair).into_iter().next() {
                Some(p) => Some(build_ast_from_expression(p)?),
                None => None,
            };
            StatementType::ReturnStatement { argument }
        }
        Rule::break_statement => StatementType::BreakStatement,
        Rule::continue_statement => StatementType::ContinueStatement,
        Rule::throw_statement => {
            let mut children = significant(&inner_pair).into_iter();
            let argument = next_expression(&mut children, &inner_pair)?;
            StatementType::ThrowStatement { argument }
        }
        Rule::try_statement => build_ast_from_try_statement(inner_pair)?,
        Rule::block_statement => StatementType::BlockStatement(build_ast_from_block(inner_pair)?),
        Rule::empty_statement => StatementType::EmptyStatement,
        Rule::expression_statement => StatementType::ExpressionStatement {
            expression: build_ast_from_expression(first_inner(&inner_pair)?)?,
        },
        _ => return Err(get_unexpected_error(5, &inner_pair)),
    })
}

fn next_expression<'i>(
    children: &mut impl Iterator<Item = Pair<'i, Rule>>,
    parent: &Pair<'i, Rule>,
) -> Result<ExpressionType, Error<Rule>> {
    match children.next() {
        Some(p) => build_ast_from_expression(p),
        None => Err(get_unexpected_error(6, parent)),
    }
}

fn next_statement<'i>(
    children: &mut impl Iterator<Item = Pair<'i, Rule>>,
    parent: &Pair<'i, Rule>,
) -> Result<StatementType, Error<Rule>> {
    match children.next() {
        Some(p) => build_ast_from_statement(p),
        None => Err(get_unexpected_error(7, parent)),
    }
}

fn build_ast_from_block(pair: Pair<Rule>) -> Result<BlockStatementData, Error<Rule>> {
    Ok(BlockStatementData {
        body: build_statement_list(pair)?,
    })
}

fn build_ast_from_variable_declaration(
    pair: Pair<Rule>,
) -> Result<VariableDeclarationData, Error<Rule>> {
    let mut kind = VariableDeclarationKind::Var;
    let mut declarations = vec![];
    for child in pair.into_inner() {
        match child.as_rule() {
            Rule::var_kind => {
                kind = match first_inner(&child)?.as_rule() {
                    Rule::kw_var => VariableDeclarationKind::Var,
                    Rule::kw_let => VariableDeclarationKind::Let,
                    Rule::kw_const => VariableDeclarationKind::Const,
                    _ => return Err(get_unexpected_error(8, &child)),
                };
            }
            Rule::variable_declaration => {
                let declarator = build_ast_from_variable_declarator(child.clone())?;
                if kind == VariableDeclarationKind::Const && declarator.init.is_none() {
                    return Err(get_validation_error(
                        "Missing initializer in const declaration",
                        &child,
                    ));
                }
                declarations.push(declarator);
            }
            _ => return Err(get_unexpected_error(9, &child)),
        }
    }
    Ok(VariableDeclarationData { kind, declarations })
}

fn build_ast_from_variable_declarator(
    pair: Pair<Rule>,
) -> Result<VariableDeclaratorData, Error<Rule>> {
    let mut id = None;
    let mut type_name = None;
    let mut init = None;
    for child in pair.clone().into_inner() {
        match child.as_rule() {
            Rule::identifier => id = Some(child.as_str().to_string()),
            Rule::type_annotation => type_name = Some(first_inner(&child)?.as_str().to_string()),
            Rule::expression => init = Some(build_ast_from_expression(child)?),
            _ => return Err(get_unexpected_error(10, &child)),
        }
    }
    Ok(VariableDeclaratorData {
        id: id.ok_or_else(|| get_unexpected_error(11, &pair))?,
        type_name,
        init,
    })
}

fn build_ast_from_function(pair: Pair<Rule>) -> Result<FunctionData, Error<Rule>> {
    let meta = meta_of(&pair);
    let mut id = None;
    let mut params = vec![];
    let mut return_type = None;
    let mut body = vec![];
    for child in significant(&pair) {
        match child.as_rule() {
            Rule::identifier | Rule::property_name => id = Some(child.as_str().to_string()),
            Rule::formal_parameters => params = build_ast_from_formal_parameters(child)?,
            Rule::type_annotation => {
                return_type = Some(first_inner(&child)?.as_str().to_string())
            }
            Rule::function_body => body = build_statement_list(child)?,
            _ => return Err(get_unexpected_error(12, &child)),
        }
    }
    Ok(FunctionData {
        meta,
        id,
        params,
        return_type,
        body,
    })
}

fn build_ast_from_formal_parameters(pair: Pair<Rule>) -> Result<Vec<ParameterData>, Error<Rule>> {
    let mut params: Vec<ParameterData> = vec![];
    for param in pair.into_inner() {
        let mut name = None;
        let mut type_name = None;
        for child in param.clone().into_inner() {
            match child.as_rule() {
                Rule::identifier => name = Some(child.as_str().to_string()),
                Rule::type_annotation => {
                    type_name = Some(first_inner(&child)?.as_str().to_string())
                }
                _ => return Err(get_unexpected_error(13, &child)),
            }
        }
        let name = name.ok_or_else(|| get_unexpected_error(14, &param))?;
        if params.iter().any(|p| p.name == name) {
            return Err(get_validation_error("Duplicate parameter name", &param));
        }
        params.push(ParameterData { name, type_name });
    }
    Ok(params)
}

fn build_ast_from_class(pair: Pair<Rule>) -> Result<ClassData, Error<Rule>> {
    let meta = meta_of(&pair);
    let mut id = None;
    let mut constructor = None;
    let mut methods = vec![];
    let mut fields = vec![];
    for child in significant(&pair) {
        match child.as_rule() {
            Rule::identifier => id = Some(child.as_str().to_string()),
            Rule::class_body => {
                for member in child.into_inner() {
                    let member_inner = first_inner(&member)?;
                    match member_inner.as_rule() {
                        Rule::method_definition => {
                            let method = build_ast_from_function(member_inner.clone())?;
                            if method.name() == "constructor" {
                                if constructor.is_some() {
                                    return Err(get_validation_error(
                                        "A class may only have one constructor",
                                        &member_inner,
                                    ));
                                }
                                constructor = Some(Arc::new(method));
                            } else {
                                methods.push(Arc::new(method));
                            }
                        }
                        Rule::field_definition => {
                            fields.push(build_ast_from_field(member_inner)?);
                        }
                        _ => return Err(get_unexpected_error(15, &member_inner)),
                    }
                }
            }
            _ => return Err(get_unexpected_error(16, &child)),
        }
    }
    Ok(ClassData {
        meta,
        id: id.ok_or_else(|| get_unexpected_error(17, &pair))?,
        constructor,
        methods,
        fields,
    })
}

fn build_ast_from_field(pair: Pair<Rule>) -> Result<FieldData, Error<Rule>> {
    let mut name = None;
    let mut type_name = None;
    let mut init = None;
    for child in significant(&pair) {
        match child.as_rule() {
            Rule::property_name => name = Some(child.as_str().to_string()),
            Rule::type_annotation => type_name = Some(first_inner(&child)?.as_str().to_string()),
            Rule::expression => init = Some(build_ast_from_expression(child)?),
            _ => return Err(get_unexpected_error(18, &child)),
        }
    }
    Ok(FieldData {
        name: name.ok_or_else(|| get_unexpected_error(19, &pair))?,
        type_name,
        init,
    })
}

fn build_ast_from_for_statement(pair: Pair<Rule>) -> Result<StatementType, Error<Rule>> {
    let mut init = None;
    let mut test = None;
    let mut update = None;
    let mut body = None;
    for child in significant(&pair) {
        match child.as_rule() {
            Rule::for_init => {
                let init_inner = first_inner(&child)?;
                init = Some(match init_inner.as_rule() {
                    Rule::for_variable_declaration => ForInit::VariableDeclaration(
                        build_ast_from_variable_declaration(init_inner)?,
                    ),
                    _ => ForInit::Expression(build_ast_from_expression(init_inner)?),
                });
            }
            Rule::for_test => test = Some(build_ast_from_expression(first_inner(&child)?)?),
            Rule::for_update => update = Some(build_ast_from_expression(first_inner(&child)?)?),
            Rule::statement => body = Some(Box::new(build_ast_from_statement(child)?)),
            _ => return Err(get_unexpected_error(20, &child)),
        }
    }
    Ok(StatementType::ForStatement {
        init,
        test,
        update,
        body: body.ok_or_else(|| get_unexpected_error(21, &pair))?,
    })
}

fn build_ast_from_try_statement(pair: Pair<Rule>) -> Result<StatementType, Error<Rule>> {
    let mut block = None;
    let mut handler = None;
    let mut finalizer = None;
    for child in significant(&pair) {
        match child.as_rule() {
            Rule::block_statement => block = Some(build_ast_from_block(child)?),
            Rule::catch_clause => {
                let mut param = None;
                let mut body = None;
                for c in significant(&child) {
                    match c.as_rule() {
                        Rule::identifier => param = Some(c.as_str().to_string()),
                        Rule::block_statement => body = Some(build_ast_from_block(c)?),
                        _ => return Err(get_unexpected_error(22, &c)),
                    }
                }
                handler = Some(CatchClauseData {
                    param,
                    body: body.ok_or_else(|| get_unexpected_error(23, &child))?,
                });
            }
            Rule::finally_clause => {
                let block_pair = significant(&child)
                    .into_iter()
                    .next()
                    .ok_or_else(|| get_unexpected_error(24, &child))?;
                finalizer = Some(build_ast_from_block(block_pair)?);
            }
            _ => return Err(get_unexpected_error(25, &child)),
        }
    }
    if handler.is_none() && finalizer.is_none() {
        return Err(get_validation_error("Missing catch or finally after try", &pair));
    }
    Ok(StatementType::TryStatement {
        block: block.ok_or_else(|| get_unexpected_error(26, &pair))?,
        handler,
        finalizer,
    })
}

fn build_ast_from_expression(pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
    match pair.as_rule() {
        Rule::expression | Rule::paren_expression | Rule::primary_expression | Rule::literal => {
            let inner = first_inner(&pair)?;
            build_ast_from_expression(inner)
        }
        Rule::assignment_expression => build_ast_from_assignment_expression(pair),
        Rule::conditional_expression => {
            let mut children = pair.clone().into_inner();
            let test = next_expression(&mut children, &pair)?;
            match children.next() {
                None => Ok(test),
                Some(consequent) => Ok(ExpressionType::ConditionalExpression {
                    test: Box::new(test),
                    consequent: Box::new(build_ast_from_expression(consequent)?),
                    alternate: Box::new(next_expression(&mut children, &pair)?),
                }),
            }
        }
        Rule::logical_or_expression
        | Rule::logical_and_expression
        | Rule::equality_expression
        | Rule::relational_expression
        | Rule::additive_expression
        | Rule::multiplicative_expression => build_ast_from_binary_chain(pair),
        Rule::unary_expression => build_ast_from_unary_expression(pair),
        Rule::postfix_expression => {
            let mut children = pair.clone().into_inner();
            let argument = next_expression(&mut children, &pair)?;
            match children.next() {
                None => Ok(argument),
                Some(op) => build_update_expression(&op, argument, false),
            }
        }
        Rule::lhs_expression => build_ast_from_lhs_expression(pair),
        Rule::new_expression => build_ast_from_new_expression(pair),
        Rule::function_expression => Ok(ExpressionType::FunctionExpression(Arc::new(
            build_ast_from_function(pair)?,
        ))),
        Rule::array_literal => {
            let mut elements = vec![];
            for child in pair.into_inner() {
                elements.push(build_ast_from_expression(child)?);
            }
            Ok(ExpressionType::ArrayExpression(elements))
        }
        Rule::object_literal => {
            let mut properties = vec![];
            for property in pair.into_inner() {
                let mut children = property.clone().into_inner();
                let key_pair = children
                    .next()
                    .ok_or_else(|| get_unexpected_error(27, &property))?;
                let key = match key_pair.as_rule() {
                    Rule::string_literal => unescape_string(&first_inner(&key_pair)?),
                    _ => key_pair.as_str().to_string(),
                };
                let value = next_expression(&mut children, &property)?;
                properties.push((key, value));
            }
            Ok(ExpressionType::ObjectExpression(properties))
        }
        Rule::kw_this => Ok(ExpressionType::ThisExpression),
        Rule::identifier => Ok(ExpressionType::Identifier(pair.as_str().to_string())),
        Rule::null_literal => Ok(ExpressionType::Literal(LiteralType::NullLiteral)),
        Rule::undefined_literal => Ok(ExpressionType::Literal(LiteralType::UndefinedLiteral)),
        Rule::boolean_literal => Ok(ExpressionType::Literal(LiteralType::BooleanLiteral(
            pair.as_str() == "true",
        ))),
        Rule::number_literal => Ok(ExpressionType::Literal(LiteralType::NumberLiteral(
            parse_number_literal(&pair)?,
        ))),
        Rule::string_literal => Ok(ExpressionType::Literal(LiteralType::StringLiteral(
            unescape_string(&first_inner(&pair)?),
        ))),
        _ => Err(get_unexpected_error(28, &pair)),
    }
}

fn build_ast_from_assignment_expression(pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
    let mut children = pair.clone().into_inner();
    let first = children
        .next()
        .ok_or_else(|| get_unexpected_error(29, &pair))?;
    let op = match children.next() {
        None => return build_ast_from_expression(first),
        Some(op) => op,
    };
    let left = build_ast_from_expression(first.clone())?;
    if !left.is_assignment_target() {
        return Err(get_validation_error("Invalid left-hand side in assignment", &first));
    }
    let operator = match op.as_str() {
        "=" => AssignmentOperator::Equals,
        "+=" => AssignmentOperator::AddEquals,
        "-=" => AssignmentOperator::SubtractEquals,
        "*=" => AssignmentOperator::MultiplyEquals,
        "/=" => AssignmentOperator::DivideEquals,
        "%=" => AssignmentOperator::ModuloEquals,
        _ => return Err(get_unexpected_error(30, &op)),
    };
    let right = next_expression(&mut children, &pair)?;
    Ok(ExpressionType::AssignmentExpression {
        operator,
        left: Box::new(left),
        right: Box::new(right),
    })
}

fn build_ast_from_binary_chain(pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
    let mut children = pair.clone().into_inner();
    let mut left = next_expression(&mut children, &pair)?;
    while let Some(op) = children.next() {
        let right = next_expression(&mut children, &pair)?;
        left = match op.as_str() {
            "||" => logical(LogicalOperator::Or, left, right),
            "&&" => logical(LogicalOperator::And, left, right),
            s => binary(binary_operator(s, &op)?, left, right),
        };
    }
    Ok(left)
}

fn logical(operator: LogicalOperator, left: ExpressionType, right: ExpressionType) -> ExpressionType {
    ExpressionType::LogicalExpression {
        operator,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn binary(operator: BinaryOperator, left: ExpressionType, right: ExpressionType) -> ExpressionType {
    ExpressionType::BinaryExpression {
        operator,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn binary_operator(op: &str, pair: &Pair<Rule>) -> Result<BinaryOperator, Error<Rule>> {
    Ok(match op {
        "==" => BinaryOperator::LooselyEqual,
        "!=" => BinaryOperator::LooselyUnequal,
        "===" => BinaryOperator::StrictlyEqual,
        "!==" => BinaryOperator::StrictlyUnequal,
        "<" => BinaryOperator::LessThan,
        "<=" => BinaryOperator::LessThanEqual,
        ">" => BinaryOperator::GreaterThan,
        ">=" => BinaryOperator::GreaterThanEqual,
        "+" => BinaryOperator::Add,
        "-" => BinaryOperator::Subtract,
        "*" => BinaryOperator::Multiply,
        "/" => BinaryOperator::Divide,
        "%" => BinaryOperator::Modulo,
        _ => return Err(get_unexpected_error(31, pair)),
    })
}

fn build_ast_from_unary_expression(pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
    let mut children = pair.clone().into_inner();
    let first = children
        .next()
        .ok_or_else(|| get_unexpected_error(32, &pair))?;
    match first.as_rule() {
        Rule::prefix_update => {
            let mut update_children = first.clone().into_inner();
            let op = update_children
                .next()
                .ok_or_else(|| get_unexpected_error(33, &first))?;
            let argument = next_expression(&mut update_children, &first)?;
            build_update_expression(&op, argument, true)
        }
        Rule::unary_op => {
            let operator = match first.as_str() {
                "-" => UnaryOperator::Minus,
                "+" => UnaryOperator::Plus,
                "!" => UnaryOperator::LogicalNot,
                "typeof" => UnaryOperator::TypeOf,
                _ => return Err(get_unexpected_error(34, &first)),
            };
            let argument = next_expression(&mut children, &pair)?;
            Ok(ExpressionType::UnaryExpression {
                operator,
                argument: Box::new(argument),
            })
        }
        _ => build_ast_from_expression(first),
    }
}

fn build_update_expression(
    op: &Pair<Rule>,
    argument: ExpressionType,
    prefix: bool,
) -> Result<ExpressionType, Error<Rule>> {
    if !argument.is_assignment_target() {
        return Err(get_validation_error(
            "Invalid left-hand side expression in update operation",
            op,
        ));
    }
    let operator = match op.as_str() {
        "++" => UpdateOperator::PlusPlus,
        "--" => UpdateOperator::MinusMinus,
        _ => return Err(get_unexpected_error(35, op)),
    };
    Ok(ExpressionType::UpdateExpression {
        operator,
        argument: Box::new(argument),
        prefix,
    })
}

fn build_ast_from_lhs_expression(pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
    let mut children = pair.clone().into_inner();
    let mut obj = next_expression(&mut children, &pair)?;
    for suffix in children {
        let suffix_inner = first_inner(&suffix)?;
        obj = apply_suffix(obj, suffix_inner)?;
    }
    Ok(obj)
}

fn apply_suffix(obj: ExpressionType, suffix: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
    Ok(match suffix.as_rule() {
        Rule::arguments => ExpressionType::CallExpression {
            callee: Box::new(obj),
            arguments: build_ast_from_arguments(suffix)?,
        },
        Rule::member_suffix => ExpressionType::MemberExpression {
            object: Box::new(obj),
            property: first_inner(&suffix)?.as_str().to_string(),
        },
        Rule::index_suffix => ExpressionType::IndexExpression {
            object: Box::new(obj),
            index: Box::new(build_ast_from_expression(first_inner(&suffix)?)?),
        },
        _ => return Err(get_unexpected_error(36, &suffix)),
    })
}

fn build_ast_from_arguments(pair: Pair<Rule>) -> Result<Vec<ExpressionType>, Error<Rule>> {
    let mut arguments = vec![];
    for child in pair.into_inner() {
        arguments.push(build_ast_from_expression(child)?);
    }
    Ok(arguments)
}

fn build_ast_from_new_expression(pair: Pair<Rule>) -> Result<ExpressionType, Error<Rule>> {
    let mut callee = None;
    let mut arguments = vec![];
    for child in significant(&pair) {
        match child.as_rule() {
            Rule::new_callee => {
                let mut callee_children = child.clone().into_inner();
                let mut obj = next_expression(&mut callee_children, &child)?;
                for suffix in callee_children {
                    obj = apply_suffix(obj, suffix)?;
                }
                callee = Some(obj);
            }
            Rule::arguments => arguments = build_ast_from_arguments(child)?,
            _ => return Err(get_unexpected_error(37, &child)),
        }
    }
    Ok(ExpressionType::NewExpression {
        callee: Box::new(callee.ok_or_else(|| get_unexpected_error(38, &pair))?),
        arguments,
    })
}

fn parse_number_literal(pair: &Pair<Rule>) -> Result<NumberLiteralType, Error<Rule>> {
    let text = pair.as_str();
    if !text.contains(['.', 'e', 'E']) {
        if let Ok(i) = text.parse::<i64>() {
            return Ok(NumberLiteralType::IntegerLiteral(i));
        }
    }
    text.parse::<f64>()
        .map(NumberLiteralType::FloatLiteral)
        .map_err(|_| get_validation_error("Invalid number literal", pair))
}

fn unescape_string(pair: &Pair<Rule>) -> String {
    let raw = pair.as_str();
    let mut s = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            s.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => s.push('\n'),
            Some('t') => s.push('\t'),
            Some('r') => s.push('\r'),
            Some('0') => s.push('\0'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => s.push(decoded),
                    None => {
                        s.push_str("\\u");
                        s.push_str(&hex);
                    }
                }
            }
            Some(other) => s.push(other),
            None => s.push('\\'),
        }
    }
    s
}
