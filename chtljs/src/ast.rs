//! Generic JavaScript syntax tree produced by the parser.
//!
//! CHTL JS constructs appear as [`Stmt::Chtl`] / [`Stmt::Util`] statements and
//! [`Expr::Selector`] expressions; everything else is plain JavaScript kept in
//! just enough detail to regenerate it.

use crate::node::{EnhancedSelector, Node};
use crate::SourceLocation;

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Var,
    Let,
    Const,
}

impl DeclKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclKind::Var => "var",
            DeclKind::Let => "let",
            DeclKind::Const => "const",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Declarator {
    pub name: String,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct SwitchCase {
    /// `None` for the `default:` arm.
    pub test: Option<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub default: Option<Expr>,
    /// `...name`
    pub rest: bool,
}

impl Param {
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            rest: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: Option<String>,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
}

/// Head of a `for` loop.
#[derive(Debug, Clone)]
pub enum ForHead {
    /// `for (init; test; update)`
    Classic {
        init: Option<Box<Stmt>>,
        test: Option<Expr>,
        update: Option<Expr>,
    },
    /// `for (decl name in|of expr)`
    Each {
        kind: Option<DeclKind>,
        name: String,
        of: bool,
        iterable: Expr,
    },
}

#[derive(Debug, Clone)]
pub enum Stmt {
    /// Expression used as a statement
    Expr { loc: SourceLocation, expr: Expr },
    /// `var` / `let` / `const` declaration
    VarDecl {
        loc: SourceLocation,
        kind: DeclKind,
        decls: Vec<Declarator>,
    },
    Function { loc: SourceLocation, def: FunctionDef },
    If {
        loc: SourceLocation,
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    For {
        loc: SourceLocation,
        head: ForHead,
        body: Box<Stmt>,
    },
    While {
        loc: SourceLocation,
        condition: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        loc: SourceLocation,
        body: Box<Stmt>,
        condition: Expr,
    },
    Switch {
        loc: SourceLocation,
        discriminant: Expr,
        cases: Vec<SwitchCase>,
    },
    Break { loc: SourceLocation, label: Option<String> },
    Continue { loc: SourceLocation, label: Option<String> },
    Return { loc: SourceLocation, value: Option<Expr> },
    Throw { loc: SourceLocation, value: Expr },
    Try {
        loc: SourceLocation,
        block: Vec<Stmt>,
        param: Option<String>,
        handler: Option<Vec<Stmt>>,
        finalizer: Option<Vec<Stmt>>,
    },
    Block { loc: SourceLocation, body: Vec<Stmt> },
    Empty { loc: SourceLocation },
    /// A CHTL JS statement. `target` is the element the node acts on (for
    /// `listen`), `body` the nested block (for `fileloader`).
    Chtl {
        node: Node,
        target: Option<Expr>,
        body: Vec<Stmt>,
    },
    /// `util condition [change stmt] then stmt`
    Util {
        loc: SourceLocation,
        condition: Expr,
        on_change: Option<Box<Stmt>>,
        then: Box<Stmt>,
    },
}

impl Stmt {
    pub fn location(&self) -> SourceLocation {
        match self {
            Stmt::Expr { loc, .. }
            | Stmt::VarDecl { loc, .. }
            | Stmt::Function { loc, .. }
            | Stmt::If { loc, .. }
            | Stmt::For { loc, .. }
            | Stmt::While { loc, .. }
            | Stmt::DoWhile { loc, .. }
            | Stmt::Switch { loc, .. }
            | Stmt::Break { loc, .. }
            | Stmt::Continue { loc, .. }
            | Stmt::Return { loc, .. }
            | Stmt::Throw { loc, .. }
            | Stmt::Try { loc, .. }
            | Stmt::Block { loc, .. }
            | Stmt::Empty { loc }
            | Stmt::Util { loc, .. } => *loc,
            Stmt::Chtl { node, .. } => node.location,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    Neq,
    StrictEq,
    StrictNeq,
    Lt,
    Gt,
    Le,
    Ge,
    In,
    Instanceof,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
    And,
    Or,
    Nullish,
}

impl BinOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::Eq => "==",
            BinOp::Neq => "!=",
            BinOp::StrictEq => "===",
            BinOp::StrictNeq => "!==",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::In => "in",
            BinOp::Instanceof => "instanceof",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::UShr => ">>>",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Nullish => "??",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnOp {
    Not,
    Neg,
    Plus,
    BitNot,
    Typeof,
    Void,
    Delete,
}

impl UnOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnOp::Not => "!",
            UnOp::Neg => "-",
            UnOp::Plus => "+",
            UnOp::BitNot => "~",
            UnOp::Typeof => "typeof ",
            UnOp::Void => "void ",
            UnOp::Delete => "delete ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

impl UpdateOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateOp::Increment => "++",
            UpdateOp::Decrement => "--",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl AssignOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Mod => "%=",
        }
    }
}

#[derive(Debug, Clone)]
pub enum PropKey {
    Ident(String),
    Str(String),
    Number(String),
    Computed(Box<Expr>),
}

impl PropKey {
    /// The key as a plain name (quotes stripped), if it is not computed.
    pub fn name(&self) -> Option<String> {
        match self {
            PropKey::Ident(s) | PropKey::Number(s) => Some(s.clone()),
            PropKey::Str(s) => Some(crate::text::unquote(s)),
            PropKey::Computed(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Property {
    KeyValue { key: PropKey, value: Expr },
    /// `{ name }`
    Shorthand(String),
    /// `{ ...expr }`
    Spread(Expr),
}

#[derive(Debug, Clone)]
pub enum ArrowBody {
    Expr(Box<Expr>),
    Block(Vec<Stmt>),
}

#[derive(Debug, Clone)]
pub enum Expr {
    /// Numeric literal in source spelling
    Number(String),
    /// String literal including quotes
    Str(String),
    /// Template literal including backticks
    Template(String),
    /// Regular expression literal including slashes and flags
    Regex(String),
    Bool(bool),
    Null,
    Undefined,
    This,
    Ident(String),
    Array(Vec<Expr>),
    Object(Vec<Property>),
    Function(FunctionDef),
    Arrow {
        params: Vec<Param>,
        body: ArrowBody,
    },
    /// `{{selector}}`
    Selector(EnhancedSelector),
    Unary {
        op: UnOp,
        operand: Box<Expr>,
    },
    Update {
        op: UpdateOp,
        prefix: bool,
        operand: Box<Expr>,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    New {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Member {
        object: Box<Expr>,
        property: String,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Spread(Box<Expr>),
    Sequence(Vec<Expr>),
}

impl Expr {
    pub fn is_function_like(&self) -> bool {
        matches!(self, Expr::Function(_) | Expr::Arrow { .. })
    }

    /// The unquoted value of a string literal.
    pub fn as_string_literal(&self) -> Option<String> {
        match self {
            Expr::Str(s) => Some(crate::text::unquote(s)),
            _ => None,
        }
    }
}

impl From<Node> for Stmt {
    fn from(node: Node) -> Self {
        Stmt::Chtl {
            node,
            target: None,
            body: Vec::new(),
        }
    }
}

// ── Traversal ───────────────────────────────────────────────────────────

/// CHTL JS nodes and enhanced selectors reachable from a statement list.
#[derive(Default)]
pub struct ChtlRefs<'a> {
    pub nodes: Vec<&'a Node>,
    pub selectors: Vec<&'a EnhancedSelector>,
}

impl Program {
    /// Collect every CHTL JS node and selector, in source order.
    pub fn chtl_refs(&self) -> ChtlRefs<'_> {
        let mut refs = ChtlRefs::default();
        refs.stmts(&self.statements);
        refs
    }
}

impl<'a> ChtlRefs<'a> {
    fn stmts(&mut self, stmts: &'a [Stmt]) {
        for stmt in stmts {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &'a Stmt) {
        match stmt {
            Stmt::Expr { expr, .. } | Stmt::Throw { value: expr, .. } => self.expr(expr),
            Stmt::VarDecl { decls, .. } => {
                for d in decls {
                    if let Some(init) = &d.init {
                        self.expr(init);
                    }
                }
            }
            Stmt::Function { def, .. } => self.stmts(&def.body),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.expr(condition);
                self.stmt(then_branch);
                if let Some(alt) = else_branch {
                    self.stmt(alt);
                }
            }
            Stmt::For { head, body, .. } => {
                match head {
                    ForHead::Classic { init, test, update } => {
                        if let Some(init) = init {
                            self.stmt(init);
                        }
                        for e in test.iter().chain(update.iter()) {
                            self.expr(e);
                        }
                    }
                    ForHead::Each { iterable, .. } => self.expr(iterable),
                }
                self.stmt(body);
            }
            Stmt::While {
                condition, body, ..
            }
            | Stmt::DoWhile {
                condition, body, ..
            } => {
                self.expr(condition);
                self.stmt(body);
            }
            Stmt::Switch {
                discriminant,
                cases,
                ..
            } => {
                self.expr(discriminant);
                for case in cases {
                    if let Some(test) = &case.test {
                        self.expr(test);
                    }
                    self.stmts(&case.body);
                }
            }
            Stmt::Return { value, .. } => {
                if let Some(v) = value {
                    self.expr(v);
                }
            }
            Stmt::Try {
                block,
                handler,
                finalizer,
                ..
            } => {
                self.stmts(block);
                for body in handler.iter().chain(finalizer.iter()) {
                    self.stmts(body);
                }
            }
            Stmt::Block { body, .. } => self.stmts(body),
            Stmt::Chtl { node, target, body } => {
                self.nodes.push(node);
                if let Some(t) = target {
                    self.expr(t);
                }
                self.stmts(body);
            }
            Stmt::Util {
                condition,
                on_change,
                then,
                ..
            } => {
                self.expr(condition);
                if let Some(c) = on_change {
                    self.stmt(c);
                }
                self.stmt(then);
            }
            Stmt::Break { .. } | Stmt::Continue { .. } | Stmt::Empty { .. } => {}
        }
    }

    fn expr(&mut self, expr: &'a Expr) {
        match expr {
            Expr::Selector(sel) => self.selectors.push(sel),
            Expr::Array(items) | Expr::Sequence(items) => {
                for e in items {
                    self.expr(e);
                }
            }
            Expr::Object(props) => {
                for prop in props {
                    match prop {
                        Property::KeyValue { key, value } => {
                            if let PropKey::Computed(k) = key {
                                self.expr(k);
                            }
                            self.expr(value);
                        }
                        Property::Spread(e) => self.expr(e),
                        Property::Shorthand(_) => {}
                    }
                }
            }
            Expr::Function(def) => self.stmts(&def.body),
            Expr::Arrow { body, .. } => match body {
                ArrowBody::Expr(e) => self.expr(e),
                ArrowBody::Block(stmts) => self.stmts(stmts),
            },
            Expr::Unary { operand, .. } | Expr::Update { operand, .. } => self.expr(operand),
            Expr::Spread(inner) => self.expr(inner),
            Expr::Member { object, .. } => self.expr(object),
            Expr::Binary { left, right, .. } => {
                self.expr(left);
                self.expr(right);
            }
            Expr::Assign { target, value, .. } => {
                self.expr(target);
                self.expr(value);
            }
            Expr::Index { object, index } => {
                self.expr(object);
                self.expr(index);
            }
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.expr(test);
                self.expr(consequent);
                self.expr(alternate);
            }
            Expr::Call { callee, args } | Expr::New { callee, args } => {
                self.expr(callee);
                for a in args {
                    self.expr(a);
                }
            }
            Expr::Number(_)
            | Expr::Str(_)
            | Expr::Template(_)
            | Expr::Regex(_)
            | Expr::Bool(_)
            | Expr::Null
            | Expr::Undefined
            | Expr::This
            | Expr::Ident(_) => {}
        }
    }
}
