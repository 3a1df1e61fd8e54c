//! Expression syntax tree for transform and refine payloads
//!
//! Copyright (c) 2025 Fieldsmith Team
//! Licensed under the Apache-2.0 license

use std::fmt;

/// A one-parameter arrow function: `(param) => body`
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub param: String,
    pub body: Expr,
}

impl Expression {
    pub fn new(param: impl Into<String>, body: Expr) -> Self {
        Self {
            param: param.into(),
            body,
        }
    }
}

/// Expression nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// The arrow function's parameter
    Param,
    Global(Global),
    Array(Vec<Expr>),
    Member {
        object: Box<Expr>,
        property: String,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
}

/// Whitelisted global bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Global {
    Math,
    Number,
    String,
    Boolean,
    Array,
    Object,
    ParseInt,
    ParseFloat,
    IsNaN,
    IsFinite,
    NaN,
    Infinity,
}

impl Global {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "Math" => Global::Math,
            "Number" => Global::Number,
            "String" => Global::String,
            "Boolean" => Global::Boolean,
            "Array" => Global::Array,
            "Object" => Global::Object,
            "parseInt" => Global::ParseInt,
            "parseFloat" => Global::ParseFloat,
            "isNaN" => Global::IsNaN,
            "isFinite" => Global::IsFinite,
            "NaN" => Global::NaN,
            "Infinity" => Global::Infinity,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Global::Math => "Math",
            Global::Number => "Number",
            Global::String => "String",
            Global::Boolean => "Boolean",
            Global::Array => "Array",
            Global::Object => "Object",
            Global::ParseInt => "parseInt",
            Global::ParseFloat => "parseFloat",
            Global::IsNaN => "isNaN",
            Global::IsFinite => "isFinite",
            Global::NaN => "NaN",
            Global::Infinity => "Infinity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
    TypeOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    StrictEq,
    StrictNe,
    LooseEq,
    LooseNe,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNe => "!==",
            BinaryOp::LooseEq => "==",
            BinaryOp::LooseNe => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }

    /// Binding power; higher binds tighter
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::StrictEq | BinaryOp::StrictNe | BinaryOp::LooseEq | BinaryOp::LooseNe => 5,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 6,
            BinaryOp::Add | BinaryOp::Sub => 7,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Nullish,
}

impl LogicalOp {
    pub fn symbol(self) -> &'static str {
        match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
            LogicalOp::Nullish => "??",
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            LogicalOp::Nullish => 2,
            LogicalOp::Or => 3,
            LogicalOp::And => 4,
        }
    }
}

const PREC_CONDITIONAL: u8 = 1;
const PREC_UNARY: u8 = 9;
const PREC_POSTFIX: u8 = 10;
const PREC_PRIMARY: u8 = 11;

impl Expr {
    pub fn precedence(&self) -> u8 {
        match self {
            Expr::Conditional { .. } => PREC_CONDITIONAL,
            Expr::Logical { op, .. } => op.precedence(),
            Expr::Binary { op, .. } => op.precedence(),
            Expr::Unary { .. } => PREC_UNARY,
            Expr::Member { .. } | Expr::Index { .. } | Expr::Call { .. } => PREC_POSTFIX,
            _ => PREC_PRIMARY,
        }
    }

    /// Render as JavaScript source, `param` naming the arrow parameter
    pub fn render(&self, param: &str) -> String {
        let mut out = String::new();
        self.write(&mut out, param);
        out
    }

    fn write_operand(&self, out: &mut String, param: &str, min_precedence: u8) {
        if self.precedence() < min_precedence {
            out.push('(');
            self.write(out, param);
            out.push(')');
        } else {
            self.write(out, param);
        }
    }

    fn write(&self, out: &mut String, param: &str) {
        match self {
            Expr::Undefined => out.push_str("undefined"),
            Expr::Null => out.push_str("null"),
            Expr::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Expr::Number(n) => out.push_str(&crate::value::format_number(*n)),
            Expr::String(s) => out.push_str(&crate::policy::quote_js_string(s)),
            Expr::Param => out.push_str(param),
            Expr::Global(global) => out.push_str(global.name()),
            Expr::Array(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.write_operand(out, param, PREC_CONDITIONAL);
                }
                out.push(']');
            }
            Expr::Member { object, property } => {
                // `5.toFixed` is not valid JavaScript
                if matches!(object.as_ref(), Expr::Number(_)) {
                    out.push('(');
                    object.write(out, param);
                    out.push(')');
                } else {
                    object.write_operand(out, param, PREC_POSTFIX);
                }
                out.push('.');
                out.push_str(property);
            }
            Expr::Index { object, index } => {
                object.write_operand(out, param, PREC_POSTFIX);
                out.push('[');
                index.write(out, param);
                out.push(']');
            }
            Expr::Call { callee, args } => {
                callee.write_operand(out, param, PREC_POSTFIX);
                out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    arg.write_operand(out, param, PREC_CONDITIONAL);
                }
                out.push(')');
            }
            Expr::Unary { op, operand } => {
                let mut inner = String::new();
                operand.write_operand(&mut inner, param, PREC_UNARY);
                match op {
                    UnaryOp::Not => out.push('!'),
                    UnaryOp::Neg => out.push('-'),
                    UnaryOp::Plus => out.push('+'),
                    UnaryOp::TypeOf => out.push_str("typeof "),
                }
                // `--x` and `++x` would lex as update operators
                if matches!(op, UnaryOp::Neg | UnaryOp::Plus) && inner.starts_with(['-', '+']) {
                    out.push('(');
                    out.push_str(&inner);
                    out.push(')');
                } else {
                    out.push_str(&inner);
                }
            }
            Expr::Binary { op, left, right } => {
                left.write_operand(out, param, op.precedence());
                out.push(' ');
                out.push_str(op.symbol());
                out.push(' ');
                right.write_operand(out, param, op.precedence() + 1);
            }
            Expr::Logical { op, left, right } => {
                left.write_operand(out, param, logical_operand_min(*op, left, false));
                out.push(' ');
                out.push_str(op.symbol());
                out.push(' ');
                right.write_operand(out, param, logical_operand_min(*op, right, true));
            }
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                test.write_operand(out, param, PREC_CONDITIONAL + 1);
                out.push_str(" ? ");
                consequent.write_operand(out, param, PREC_CONDITIONAL);
                out.push_str(" : ");
                alternate.write_operand(out, param, PREC_CONDITIONAL);
            }
        }
    }
}

/// `??` cannot be mixed with `&&` or `||` without parentheses
fn logical_operand_min(parent: LogicalOp, child: &Expr, is_right: bool) -> u8 {
    let base = if is_right {
        parent.precedence() + 1
    } else {
        parent.precedence()
    };
    match child {
        Expr::Logical { op: child_op, .. } => {
            let mixes = (parent == LogicalOp::Nullish) != (*child_op == LogicalOp::Nullish);
            if mixes || (parent == LogicalOp::Nullish && is_right) {
                PREC_PRIMARY
            } else {
                base
            }
        }
        _ => base,
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) => {}", self.param, self.body.render(&self.param))
    }
}
