//! Instruction fragments for the target stack machine.
//!
//! Statements compile into short sequences of [`Inst`] values; the
//! textual mnemonic form is produced through `Display`, one instruction
//! per line, e.g. `push 5`, `tjmp L3`, `ret`.
use crate::{tokens::TokenKind, types::Value};

use itertools::Itertools;
use smol_str::SmolStr;
use std::fmt;

/// Jump target, unique within one compile run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Allocator handing out jump labels.
///
/// One allocator lives on the compiler context so inlined callee
/// fragments never collide with caller labels.
#[derive(Debug, Default)]
pub struct Labels {
    next: u32,
}

impl Labels {
    pub fn next_label(&mut self) -> Label {
        let label = Label(self.next);
        self.next += 1;
        label
    }
}

/// Binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    #[rustfmt::skip]
    pub(crate) fn from_token(kind: TokenKind) -> Option<Self> {
        use TokenKind as T;
        match kind {
            T::Plus  => Some(BinOp::Add),
            T::Minus => Some(BinOp::Sub),
            T::Star  => Some(BinOp::Mul),
            T::Slash => Some(BinOp::Div),
            _ => None,
        }
    }

    /// Apply the operator to constant operands.
    ///
    /// Returns `None` on overflow or division by zero.
    pub(crate) fn apply(self, lhs: u64, rhs: u64) -> Option<u64> {
        match self {
            BinOp::Add => lhs.checked_add(rhs),
            BinOp::Sub => lhs.checked_sub(rhs),
            BinOp::Mul => lhs.checked_mul(rhs),
            BinOp::Div => lhs.checked_div(rhs),
        }
    }
}

impl fmt::Display for BinOp {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BinOp::Add => write!(f, "add"),
            BinOp::Sub => write!(f, "sub"),
            BinOp::Mul => write!(f, "mul"),
            BinOp::Div => write!(f, "div"),
        }
    }
}

/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq, // ==
    Ne, // !=
    Lt, // <
    Le, // <=
    Gt, // >
    Ge, // >=
}

impl CmpOp {
    #[rustfmt::skip]
    pub(crate) fn from_token(kind: TokenKind) -> Option<Self> {
        use TokenKind as T;
        match kind {
            T::EqEq      => Some(CmpOp::Eq),
            T::NotEq     => Some(CmpOp::Ne),
            T::Less      => Some(CmpOp::Lt),
            T::LessEq    => Some(CmpOp::Le),
            T::Greater   => Some(CmpOp::Gt),
            T::GreaterEq => Some(CmpOp::Ge),
            _ => None,
        }
    }
}

impl fmt::Display for CmpOp {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CmpOp::Eq => write!(f, "eq"),
            CmpOp::Ne => write!(f, "ne"),
            CmpOp::Lt => write!(f, "lt"),
            CmpOp::Le => write!(f, "le"),
            CmpOp::Gt => write!(f, "gt"),
            CmpOp::Ge => write!(f, "ge"),
        }
    }
}

/// Operand of a `push`: a literal or a named slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Lit(Value),
    Var(SmolStr),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operand::Lit(value) => write!(f, "{}", value),
            Operand::Var(name) => write!(f, "{}", name),
        }
    }
}

/// One instruction of the target machine.
///
/// The machine operates on an implicit value stack; `tjmp` is taken
/// when the popped condition is false.
#[derive(Debug, Clone, PartialEq)]
pub enum Inst {
    /// Push a literal or a named slot's value.
    Push(Operand),
    /// Pop the top of stack into a named slot.
    Pop(SmolStr),
    /// Pop two operands, push the arithmetic result.
    Binary(BinOp),
    /// Pop two operands, push the comparison result.
    Cmp(CmpOp),
    /// Jump to the label when the popped condition is false.
    Tjmp(Label),
    /// Unconditional jump.
    Jmp(Label),
    /// Label mark, a jump target in the listing.
    Label(Label),
    /// Return from the current function.
    Ret,
}

/// Outputs the instruction in its textual mnemonic form.
impl fmt::Display for Inst {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Inst::Push(operand) => write!(f, "push {}", operand),
            Inst::Pop(name)     => write!(f, "pop {}", name),
            Inst::Binary(op)    => write!(f, "{}", op),
            Inst::Cmp(op)       => write!(f, "{}", op),
            Inst::Tjmp(label)   => write!(f, "tjmp {}", label),
            Inst::Jmp(label)    => write!(f, "jmp {}", label),
            Inst::Label(label)  => write!(f, ".{}", label),
            Inst::Ret           => write!(f, "ret"),
        }
    }
}

/// Render an instruction sequence, one mnemonic per line.
pub fn listing(code: &[Inst]) -> String {
    code.iter().join("\n")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_instruction_text() {
        assert_eq!(Inst::Push(Operand::Lit(Value::Qword(5))).to_string(), "push 5");
        assert_eq!(Inst::Tjmp(Label(3)).to_string(), "tjmp L3");
        assert_eq!(Inst::Label(Label(3)).to_string(), ".L3");
        assert_eq!(Inst::Ret.to_string(), "ret");
        assert_eq!(Inst::Cmp(CmpOp::Eq).to_string(), "eq");
    }

    #[test]
    fn test_listing_lines() {
        let code = vec![
            Inst::Push(Operand::Lit(Value::Qword(1))),
            Inst::Pop(SmolStr::new("x")),
        ];
        assert_eq!(listing(&code), "push 1\npop x");
    }

    #[test]
    fn test_labels_are_unique() {
        let mut labels = Labels::default();
        assert_eq!(labels.next_label(), Label(0));
        assert_eq!(labels.next_label(), Label(1));
    }
}
