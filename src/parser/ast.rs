use std::fmt::Debug;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Meta {
    pub start_index: usize,
    pub end_index: usize,
}

pub trait HasMeta {
    fn get_meta(&self) -> &Meta;
}

#[derive(Debug)]
pub struct ProgramData {
    pub meta: Meta,
    pub body: Vec<StatementType>,
}

impl HasMeta for ProgramData {
    fn get_meta(&self) -> &Meta {
        &self.meta
    }
}

#[derive(Debug)]
pub enum StatementType {
    ExpressionStatement {
        expression: ExpressionType,
    },
    VariableDeclaration(VariableDeclarationData),
    FunctionDeclaration(Arc<FunctionData>),
    ClassDeclaration(Arc<ClassData>),
    BlockStatement(BlockStatementData),
    IfStatement {
        test: ExpressionType,
        consequent: Box<StatementType>,
        alternate: Option<Box<StatementType>>,
    },
    WhileStatement {
        test: ExpressionType,
        body: Box<StatementType>,
    },
    ForStatement {
        init: Option<ForInit>,
        test: Option<ExpressionType>,
        update: Option<ExpressionType>,
        body: Box<StatementType>,
    },
    ReturnStatement {
        argument: Option<ExpressionType>,
    },
    BreakStatement,
    ContinueStatement,
    ThrowStatement {
        argument: ExpressionType,
    },
    TryStatement {
        block: BlockStatementData,
        handler: Option<CatchClauseData>,
        finalizer: Option<BlockStatementData>,
    },
    EmptyStatement,
}

#[derive(Debug)]
pub struct BlockStatementData {
    pub body: Vec<StatementType>,
}

#[derive(Debug)]
pub struct CatchClauseData {
    pub param: Option<String>,
    pub body: BlockStatementData,
}

#[derive(Debug)]
pub enum ForInit {
    VariableDeclaration(VariableDeclarationData),
    Expression(ExpressionType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableDeclarationKind {
    Var,
    Let,
    Const,
}

#[derive(Debug)]
pub struct VariableDeclarationData {
    pub kind: VariableDeclarationKind,
    pub declarations: Vec<VariableDeclaratorData>,
}

#[derive(Debug)]
pub struct VariableDeclaratorData {
    pub id: String,
    pub type_name: Option<String>,
    pub init: Option<ExpressionType>,
}

#[derive(Debug)]
pub struct ParameterData {
    pub name: String,
    pub type_name: Option<String>,
}

#[derive(Debug)]
pub struct FunctionData {
    pub meta: Meta,
    pub id: Option<String>,
    pub params: Vec<ParameterData>,
    pub return_type: Option<String>,
    pub body: Vec<StatementType>,
}

impl HasMeta for FunctionData {
    fn get_meta(&self) -> &Meta {
        &self.meta
    }
}

impl FunctionData {
    pub fn name(&self) -> &str {
        self.id.as_deref().unwrap_or("<anonymous>")
    }
}

#[derive(Debug)]
pub struct FieldData {
    pub name: String,
    pub type_name: Option<String>,
    pub init: Option<ExpressionType>,
}

#[derive(Debug)]
pub struct ClassData {
    pub meta: Meta,
    pub id: String,
    pub constructor: Option<Arc<FunctionData>>,
    pub methods: Vec<Arc<FunctionData>>,
    pub fields: Vec<FieldData>,
}

impl HasMeta for ClassData {
    fn get_meta(&self) -> &Meta {
        &self.meta
    }
}

impl ClassData {
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Arc<FunctionData>> + 'a {
        self.methods.iter().filter(move |m| m.name() == name)
    }
}

#[derive(Debug)]
pub enum ExpressionType {
    Literal(LiteralType),
    Identifier(String),
    ThisExpression,
    ArrayExpression(Vec<ExpressionType>),
    ObjectExpression(Vec<(String, ExpressionType)>),
    FunctionExpression(Arc<FunctionData>),
    UnaryExpression {
        operator: UnaryOperator,
        argument: Box<ExpressionType>,
    },
    UpdateExpression {
        operator: UpdateOperator,
        argument: Box<ExpressionType>,
        prefix: bool,
    },
    BinaryExpression {
        operator: BinaryOperator,
        left: Box<ExpressionType>,
        right: Box<ExpressionType>,
    },
    LogicalExpression {
        operator: LogicalOperator,
        left: Box<ExpressionType>,
        right: Box<ExpressionType>,
    },
    AssignmentExpression {
        operator: AssignmentOperator,
        left: Box<ExpressionType>,
        right: Box<ExpressionType>,
    },
    ConditionalExpression {
        test: Box<ExpressionType>,
        consequent: Box<ExpressionType>,
        alternate: Box<ExpressionType>,
    },
    MemberExpression {
        object: Box<ExpressionType>,
        property: String,
    },
    IndexExpression {
        object: Box<ExpressionType>,
        index: Box<ExpressionType>,
    },
    CallExpression {
        callee: Box<ExpressionType>,
        arguments: Vec<ExpressionType>,
    },
    NewExpression {
        callee: Box<ExpressionType>,
        arguments: Vec<ExpressionType>,
    },
}

impl ExpressionType {
    /// Whether the expression can appear on the left of an assignment or update.
    pub fn is_assignment_target(&self) -> bool {
        matches!(
            self,
            ExpressionType::Identifier(_)
                | ExpressionType::MemberExpression { .. }
                | ExpressionType::IndexExpression { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralType {
    NullLiteral,
    UndefinedLiteral,
    BooleanLiteral(bool),
    StringLiteral(String),
    NumberLiteral(NumberLiteralType),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NumberLiteralType {
    IntegerLiteral(i64),
    FloatLiteral(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Minus,
    Plus,
    LogicalNot,
    TypeOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOperator {
    PlusPlus,
    MinusMinus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    LooselyEqual,
    LooselyUnequal,
    StrictlyEqual,
    StrictlyUnequal,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    Or,
    And,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOperator {
    Equals,
    AddEquals,
    SubtractEquals,
    MultiplyEquals,
    DivideEquals,
    ModuloEquals,
}

impl AssignmentOperator {
    /// The binary operator applied before storing, for compound assignments.
    pub fn binary_operator(&self) -> Option<BinaryOperator> {
        match self {
            AssignmentOperator::Equals => None,
            AssignmentOperator::AddEquals => Some(BinaryOperator::Add),
            AssignmentOperator::SubtractEquals => Some(BinaryOperator::Subtract),
            AssignmentOperator::MultiplyEquals => Some(BinaryOperator::Multiply),
            AssignmentOperator::DivideEquals => Some(BinaryOperator::Divide),
            AssignmentOperator::ModuloEquals => Some(BinaryOperator::Modulo),
        }
    }
}
