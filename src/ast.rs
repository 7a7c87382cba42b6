use std::rc::Rc;

use crate::interpreter::types::{FunType, Type};

/// Represents a literal value in the language.
///
/// `LiteralValue` covers the constants that can appear directly in source
/// code. Arrays and records are not literals here; they are built by their
/// own expression nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// A 64-bit floating-point literal.
    Number(f64),
    /// A string literal with escapes already resolved.
    String(String),
    /// A boolean literal value: `true` or `false`.
    Bool(bool),
    /// The `none` literal.
    None,
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<String> for LiteralValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// The different ways of reaching into a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    /// `a.b`
    Field(String),
    /// `a[expr]`
    Computed(Box<Expr>),
    /// `a:b`, only valid as a callee.
    CallSelf(String),
    /// `a::b`
    Namespace(String),
}

/// An `els` continuation of an `if`.
#[derive(Debug, Clone, PartialEq)]
pub enum ElseBranch {
    /// `els if ...`, an `Expr::If` node.
    If(Box<Expr>),
    /// `els { ... }`
    Block(Vec<Statement>),
}

/// One arm of a `mat` expression: any pattern matching runs the body.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchArm {
    pub patterns: Vec<Expr>,
    pub body:     Vec<Statement>,
}

/// An abstract syntax tree (AST) node representing an expression in the
/// language.
///
/// Every construct of the language is an expression except declarations,
/// loops and the control keywords, which are [`Statement`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value (number, string, boolean or none).
    Literal {
        /// The constant value.
        value: LiteralValue,
        /// Line number in the source code.
        line:  usize,
    },
    /// Reference to a variable by name.
    Variable {
        /// Name of the variable.
        name: String,
        /// Line number in the source code.
        line: usize,
    },
    /// A unary operation (`-x`, `!x`, `*p`, `&x`).
    UnaryOp {
        /// The operator.
        op:   UnaryOperator,
        /// The operand.
        expr: Box<Expr>,
        /// Line number in the source code.
        line: usize,
    },
    /// A binary operation.
    BinaryOp {
        /// Left operand.
        left:  Box<Expr>,
        /// The operator.
        op:    BinaryOperator,
        /// Right operand.
        right: Box<Expr>,
        /// Line number in the source code.
        line:  usize,
    },
    /// `target = value`. Compound assignments are desugared into this node.
    Assign {
        /// A variable, member or dereference.
        target: Box<Expr>,
        /// The assigned value.
        value:  Box<Expr>,
        /// Line number in the source code.
        line:   usize,
    },
    /// A call of any callee expression.
    Call {
        /// The called expression.
        callee:    Box<Expr>,
        /// Positional arguments.
        arguments: Vec<Expr>,
        /// Line number in the source code.
        line:      usize,
    },
    /// Member access of any of the four kinds.
    Member {
        /// The accessed value.
        object: Box<Expr>,
        /// How it is accessed.
        member: Member,
        /// Line number in the source code.
        line:   usize,
    },
    /// `[a, b, c]`
    ArrayLiteral {
        /// Element expressions.
        elements: Vec<Expr>,
        /// Line number in the source code.
        line:     usize,
    },
    /// `{k -> v}` or, with a name, the struct literal `Name{f: v}`.
    RecordLiteral {
        /// The struct name for struct literals.
        name:    Option<String>,
        /// Key and value expressions in source order.
        entries: Vec<(Expr, Expr)>,
        /// Line number in the source code.
        line:    usize,
    },
    /// A function literal.
    Function(Rc<FunctionDef>),
    /// `do { ... }`
    Do {
        /// The block body.
        body: Vec<Statement>,
        /// Line number in the source code.
        line: usize,
    },
    /// `expr cat name { ... }`
    Catch {
        /// The guarded expression.
        expr: Box<Expr>,
        /// The name bound to the caught value.
        name: String,
        /// The handler body.
        body: Vec<Statement>,
        /// Line number in the source code.
        line: usize,
    },
    /// `ext path`
    Ext {
        /// Expression producing the file path.
        path: Box<Expr>,
        /// Line number in the source code.
        line: usize,
    },
    /// `if cond { ... } els ...`
    If {
        /// The condition.
        condition:   Box<Expr>,
        /// Body run when the condition is truthy.
        then_branch: Vec<Statement>,
        /// Optional continuation.
        else_branch: Option<ElseBranch>,
        /// Line number in the source code.
        line:        usize,
    },
    /// `mat subject { patterns { ... } _ { ... } }`
    Match {
        /// The matched value.
        subject: Box<Expr>,
        /// Arms in source order.
        arms:    Vec<MatchArm>,
        /// The `_` arm.
        default: Option<Vec<Statement>>,
        /// Line number in the source code.
        line:    usize,
    },
}

impl Expr {
    /// Returns the source line on which this expression begins.
    pub fn line(&self) -> usize {
        match self {
            Self::Function(def) => def.line,
            Self::Literal { line, .. }
            | Self::Variable { line, .. }
            | Self::UnaryOp { line, .. }
            | Self::BinaryOp { line, .. }
            | Self::Assign { line, .. }
            | Self::Call { line, .. }
            | Self::Member { line, .. }
            | Self::ArrayLiteral { line, .. }
            | Self::RecordLiteral { line, .. }
            | Self::Do { line, .. }
            | Self::Catch { line, .. }
            | Self::Ext { line, .. }
            | Self::If { line, .. }
            | Self::Match { line, .. } => *line,
        }
    }

    /// The node kind's name, as reported by `Meta::kind`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Literal { value: LiteralValue::Number(_), .. } => "Number",
            Self::Literal { value: LiteralValue::String(_), .. } => "String",
            Self::Literal { value: LiteralValue::Bool(_), .. } => "Bool",
            Self::Literal { value: LiteralValue::None, .. } => "None",
            Self::Variable { .. } => "Id",
            Self::UnaryOp { .. } => "Unary",
            Self::BinaryOp { .. } => "Binary",
            Self::Assign { .. } => "Assign",
            Self::Call { .. } => "Call",
            Self::Member { .. } => "Member",
            Self::ArrayLiteral { .. } => "Array",
            Self::RecordLiteral { name: Some(_), .. } => "Struct",
            Self::RecordLiteral { name: None, .. } => "Record",
            Self::Function(_) => "Fun",
            Self::Do { .. } => "Do",
            Self::Catch { .. } => "Catch",
            Self::Ext { .. } => "Ext",
            Self::If { .. } => "If",
            Self::Match { .. } => "Match",
        }
    }
}

/// Represents a user-defined function definition.
///
/// Methods, static methods, named declarations and anonymous literals all
/// share this node; the definition is shared by every closure made from it.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    /// The name of the function, absent for literals.
    pub name:      Option<String>,
    /// Parameters and return type.
    pub signature: FunType,
    /// The body statements.
    pub body:      Vec<Statement>,
    /// Line number in the source code.
    pub line:      usize,
}

/// A static field of a struct declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticField {
    pub name: String,
    pub ty:   Type,
    /// Evaluated once when the declaration runs.
    pub init: Expr,
}

/// `str Name { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub name:           String,
    pub fields:         Vec<(String, Type)>,
    pub static_fields:  Vec<StaticField>,
    pub methods:        Vec<Rc<FunctionDef>>,
    pub static_methods: Vec<Rc<FunctionDef>>,
}

/// `tag Name { A, B(Type) }`
#[derive(Debug, Clone, PartialEq)]
pub struct TagDecl {
    pub name:    String,
    pub plain:   Vec<String>,
    pub payload: Vec<(String, Type)>,
}

/// The tree of a `use` statement.
#[derive(Debug, Clone, PartialEq)]
pub enum UseTree {
    /// `name` or `name as alias`
    Name {
        name:  String,
        alias: Option<String>,
    },
    /// `left::name`, optionally aliased.
    Path {
        left:  Box<UseTree>,
        name:  String,
        alias: Option<String>,
    },
    /// `left::{a, b::c}`
    Expand {
        left:    Box<UseTree>,
        members: Vec<UseTree>,
    },
}

/// Represents a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// An expression evaluated for its result.
    Expression {
        /// The expression to evaluate.
        expr: Expr,
        /// Line number in the source code.
        line: usize,
    },
    /// `let name: Type = value` or `mut name: Type = value`.
    VariableDeclaration {
        /// The name of the variable.
        name:    String,
        /// Whether the binding may be reassigned.
        mutable: bool,
        /// The declared type, `Any` when omitted.
        ty:      Type,
        /// The initial value.
        value:   Expr,
        /// Line number in the source code.
        line:    usize,
    },
    /// A named function declaration.
    Function(Rc<FunctionDef>),
    /// A struct declaration.
    Struct {
        /// The declaration.
        decl: StructDecl,
        /// Line number in the source code.
        line: usize,
    },
    /// A tag declaration.
    Tag {
        /// The declaration.
        decl: TagDecl,
        /// Line number in the source code.
        line: usize,
    },
    /// `use tree`
    Use {
        /// What to bring into scope.
        tree: UseTree,
        /// Line number in the source code.
        line: usize,
    },
    /// `whl cond { ... }`
    While {
        /// The loop condition.
        condition: Expr,
        /// The loop body.
        body:      Vec<Statement>,
        /// Line number in the source code.
        line:      usize,
    },
    /// `for a, b of iterable { ... }`
    For {
        /// First binding: index for arrays, key for objects.
        first:    String,
        /// Second binding: the element or value.
        second:   String,
        /// The iterated expression.
        iterable: Expr,
        /// The loop body.
        body:     Vec<Statement>,
        /// Line number in the source code.
        line:     usize,
    },
    /// `ret value`
    Return {
        /// The returned value.
        value: Expr,
        /// Line number in the source code.
        line:  usize,
    },
    /// `err value`
    Raise {
        /// The raised value.
        value: Expr,
        /// Line number in the source code.
        line:  usize,
    },
    /// `brk`
    Break {
        /// Line number in the source code.
        line: usize,
    },
    /// `cnt`
    Continue {
        /// Line number in the source code.
        line: usize,
    },
}

impl Statement {
    /// Returns the source line on which this statement begins.
    pub fn line(&self) -> usize {
        match self {
            Self::Function(def) => def.line,
            Self::Expression { line, .. }
            | Self::VariableDeclaration { line, .. }
            | Self::Struct { line, .. }
            | Self::Tag { line, .. }
            | Self::Use { line, .. }
            | Self::While { line, .. }
            | Self::For { line, .. }
            | Self::Return { line, .. }
            | Self::Raise { line, .. }
            | Self::Break { line }
            | Self::Continue { line } => *line,
        }
    }
}

/// Represents a binary operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryOperator {
    /// Addition (`+`)
    Add,
    /// Subtraction (`-`)
    Sub,
    /// Multiplication (`*`)
    Mul,
    /// Division (`/`)
    Div,
    /// Modulo (`%`)
    Mod,
    /// Exponentiation (`^`)
    Pow,
    /// Shift left (`<<`)
    ShiftLeft,
    /// Shift right (`>>`)
    ShiftRight,
    /// Bitwise or (`|`)
    BitOr,
    /// Bitwise and (`&`)
    BitAnd,
    /// String concatenation of rendered operands (`..`)
    Concat,
    /// Less than (`<`)
    Less,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than (`>`)
    Greater,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Structural equality (`==`)
    Equal,
    /// Structural inequality (`!=`)
    NotEqual,
    /// Logical and (`&&`)
    And,
    /// Logical or (`||`)
    Or,
    /// Nullish fallback (`??`)
    Nullish,
}

impl BinaryOperator {
    /// Whether constant folding may evaluate this operator at parse time.
    pub fn is_foldable(self) -> bool {
        matches!(self,
                 Self::Add
                 | Self::Sub
                 | Self::Mul
                 | Self::Div
                 | Self::Mod
                 | Self::Pow
                 | Self::ShiftLeft
                 | Self::ShiftRight
                 | Self::BitOr
                 | Self::BitAnd)
    }
}

/// Represents a unary operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnaryOperator {
    /// Arithmetic negation (e.g. `-x`).
    Negate,
    /// Logical NOT (e.g. `!x`).
    Not,
    /// Dereference (e.g. `*p`).
    Deref,
    /// Address-of (e.g. `&x`).
    AddressOf,
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use BinaryOperator::{
            Add, And, BitAnd, BitOr, Concat, Div, Equal, Greater, GreaterEqual, Less, LessEqual,
            Mod, Mul, NotEqual, Nullish, Or, Pow, ShiftLeft, ShiftRight, Sub,
        };
        let operator = match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
            Pow => "^",
            ShiftLeft => "<<",
            ShiftRight => ">>",
            BitOr => "|",
            BitAnd => "&",
            Concat => "..",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            Equal => "==",
            NotEqual => "!=",
            And => "&&",
            Or => "||",
            Nullish => "??",
        };
        write!(f, "{operator}")
    }
}

impl std::fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operator = match self {
            Self::Negate => "-",
            Self::Not => "!",
            Self::Deref => "*",
            Self::AddressOf => "&",
        };
        write!(f, "{operator}")
    }
}
