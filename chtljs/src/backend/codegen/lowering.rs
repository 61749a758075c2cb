//! Expression lowering.

use super::Codegen;
use crate::ast::{ArrowBody, BinOp, Expr, FunctionDef, Param, PropKey, Property, UnOp};
use crate::node::Node;
use crate::text::indent;

// ============================================================================
// Precedence
// ============================================================================

const PREC_SEQUENCE: u8 = 0;
const PREC_ASSIGN: u8 = 1;
const PREC_CONDITIONAL: u8 = 2;
const PREC_UNARY: u8 = 14;
const PREC_POSTFIX: u8 = 15;
const PREC_CALL: u8 = 17;
const PREC_PRIMARY: u8 = 18;

fn binary_prec(op: BinOp) -> u8 {
    match op {
        BinOp::Or | BinOp::Nullish => 3,
        BinOp::And => 4,
        BinOp::BitOr => 5,
        BinOp::BitXor => 6,
        BinOp::BitAnd => 7,
        BinOp::Eq | BinOp::Neq | BinOp::StrictEq | BinOp::StrictNeq => 8,
        BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge | BinOp::In | BinOp::Instanceof => 9,
        BinOp::Shl | BinOp::Shr | BinOp::UShr => 10,
        BinOp::Add | BinOp::Sub => 11,
        BinOp::Mul | BinOp::Div | BinOp::Mod => 12,
        BinOp::Pow => 13,
    }
}

fn prec(expr: &Expr) -> u8 {
    match expr {
        Expr::Sequence(_) => PREC_SEQUENCE,
        Expr::Assign { .. } | Expr::Arrow { .. } | Expr::Spread(_) => PREC_ASSIGN,
        Expr::Conditional { .. } => PREC_CONDITIONAL,
        Expr::Binary { op, .. } => binary_prec(*op),
        Expr::Unary { .. } => PREC_UNARY,
        Expr::Update { prefix: true, .. } => PREC_UNARY,
        Expr::Update { prefix: false, .. } => PREC_POSTFIX,
        Expr::Call { .. }
        | Expr::New { .. }
        | Expr::Member { .. }
        | Expr::Index { .. }
        | Expr::Selector(_) => PREC_CALL,
        _ => PREC_PRIMARY,
    }
}

/// `??` cannot be mixed with `&&` / `||` without parentheses.
fn mixes_nullish(op: BinOp, operand: &Expr) -> bool {
    match operand {
        Expr::Binary { op: inner, .. } => match op {
            BinOp::Nullish => matches!(inner, BinOp::And | BinOp::Or),
            BinOp::And | BinOp::Or => *inner == BinOp::Nullish,
            _ => false,
        },
        _ => false,
    }
}

fn parens(text: String) -> String {
    format!("({})", text)
}

impl Codegen<'_> {
    pub fn lower_expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::Number(text) | Expr::Str(text) | Expr::Template(text) | Expr::Regex(text) => {
                text.clone()
            }
            Expr::Bool(b) => b.to_string(),
            Expr::Null => "null".to_string(),
            Expr::Undefined => "undefined".to_string(),
            Expr::This => "this".to_string(),
            Expr::Ident(name) => name.clone(),
            Expr::Array(items) => format!("[{}]", self.lower_list(items)),
            Expr::Object(props) => self.lower_object(props),
            Expr::Function(def) => self.lower_function(def),
            Expr::Arrow { params, body } => self.lower_arrow(params, body),
            Expr::Selector(sel) => {
                let node = Node::from(sel.clone());
                match self.custom_lowering(&node) {
                    Some(text) => text,
                    None => sel.to_javascript(),
                }
            }
            Expr::Unary { op, operand } => {
                let inner = self.operand(operand, PREC_UNARY);
                let sign_clash = matches!(
                    (op, inner.chars().next()),
                    (UnOp::Neg, Some('-')) | (UnOp::Plus, Some('+'))
                );
                if sign_clash {
                    format!("{} {}", op.as_str(), inner)
                } else {
                    format!("{}{}", op.as_str(), inner)
                }
            }
            Expr::Update {
                op,
                prefix,
                operand,
            } => {
                let inner = self.operand(operand, PREC_POSTFIX);
                if *prefix {
                    format!("{}{}", op.as_str(), inner)
                } else {
                    format!("{}{}", inner, op.as_str())
                }
            }
            Expr::Binary { op, left, right } => {
                let p = binary_prec(*op);
                let (left_min, right_min) = if *op == BinOp::Pow {
                    // Right-associative; a unary left operand needs parentheses.
                    (PREC_POSTFIX, p)
                } else {
                    (p, p + 1)
                };
                let mut l = self.operand(left, left_min);
                let mut r = self.operand(right, right_min);
                if mixes_nullish(*op, left) && !l.starts_with('(') {
                    l = parens(l);
                }
                if mixes_nullish(*op, right) && !r.starts_with('(') {
                    r = parens(r);
                }
                format!("{} {} {}", l, op.as_str(), r)
            }
            Expr::Assign { op, target, value } => format!(
                "{} {} {}",
                self.operand(target, PREC_CALL),
                op.as_str(),
                self.operand(value, PREC_ASSIGN)
            ),
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => format!(
                "{} ? {} : {}",
                self.operand(test, PREC_CONDITIONAL + 1),
                self.operand(consequent, PREC_ASSIGN),
                self.operand(alternate, PREC_ASSIGN)
            ),
            Expr::Call { callee, args } => {
                let callee_text = match callee.as_ref() {
                    Expr::Function(_) => parens(self.lower_expr(callee)),
                    other => self.operand(other, PREC_CALL),
                };
                format!("{}({})", callee_text, self.lower_list(args))
            }
            Expr::New { callee, args } => {
                let callee_text = match callee.as_ref() {
                    Expr::Call { .. } => parens(self.lower_expr(callee)),
                    other => self.operand(other, PREC_CALL),
                };
                format!("new {}({})", callee_text, self.lower_list(args))
            }
            Expr::Member { object, property } => {
                format!("{}.{}", self.member_object(object), property)
            }
            Expr::Index { object, index } => {
                format!("{}[{}]", self.member_object(object), self.lower_expr(index))
            }
            Expr::Spread(inner) => format!("...{}", self.operand(inner, PREC_ASSIGN)),
            Expr::Sequence(items) => items
                .iter()
                .map(|e| self.operand(e, PREC_ASSIGN))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Lower `expr`, parenthesized if it binds looser than `min`.
    fn operand(&self, expr: &Expr, min: u8) -> String {
        let text = self.lower_expr(expr);
        if prec(expr) < min {
            parens(text)
        } else {
            text
        }
    }

    fn member_object(&self, object: &Expr) -> String {
        match object {
            Expr::Number(_) | Expr::Function(_) | Expr::Object(_) => parens(self.lower_expr(object)),
            other => self.operand(other, PREC_CALL),
        }
    }

    fn lower_list(&self, items: &[Expr]) -> String {
        items
            .iter()
            .map(|e| self.operand(e, PREC_ASSIGN))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn lower_object(&self, props: &[Property]) -> String {
        if props.is_empty() {
            return "{}".to_string();
        }
        let entries: Vec<String> = props
            .iter()
            .map(|prop| match prop {
                Property::KeyValue { key, value } => {
                    let key = match key {
                        PropKey::Ident(s) | PropKey::Str(s) | PropKey::Number(s) => s.clone(),
                        PropKey::Computed(e) => format!("[{}]", self.lower_expr(e)),
                    };
                    format!("{}: {}", key, self.operand(value, PREC_ASSIGN))
                }
                Property::Shorthand(name) => name.clone(),
                Property::Spread(e) => format!("...{}", self.operand(e, PREC_ASSIGN)),
            })
            .collect();
        if entries.iter().any(|e| e.contains('\n')) {
            format!("{{\n{}\n}}", indent(&entries.join(",\n"), 1))
        } else {
            format!("{{ {} }}", entries.join(", "))
        }
    }

    fn lower_params(&self, params: &[Param]) -> String {
        params
            .iter()
            .map(|p| {
                let mut text = String::new();
                if p.rest {
                    text.push_str("...");
                }
                text.push_str(&p.name);
                if let Some(default) = &p.default {
                    text.push_str(" = ");
                    text.push_str(&self.operand(default, PREC_ASSIGN));
                }
                text
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub(crate) fn lower_function(&self, def: &FunctionDef) -> String {
        format!(
            "function{}({}) {}",
            def.name.as_deref().map(|n| format!(" {}", n)).unwrap_or_default(),
            self.lower_params(&def.params),
            self.lower_block(&def.body)
        )
    }

    fn lower_arrow(&self, params: &[Param], body: &ArrowBody) -> String {
        let head = match params {
            [p] if !p.rest && p.default.is_none() => p.name.clone(),
            _ => format!("({})", self.lower_params(params)),
        };
        let body = match body {
            ArrowBody::Block(stmts) => self.lower_block(stmts),
            ArrowBody::Expr(e) => match e.as_ref() {
                Expr::Object(_) => parens(self.lower_expr(e)),
                other => self.operand(other, PREC_ASSIGN),
            },
        };
        format!("{} => {}", head, body)
    }
}
