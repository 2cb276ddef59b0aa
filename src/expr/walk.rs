//! Formula traversals that keep their own stack.
//!
//! A bounded selector over a large buffer produces conditional chains one node per byte,
//! far deeper than the call stack allows. Dropping, counting and evaluating formulas
//! therefore run off an explicit worklist.

use num_bigint::BigInt;
use num_traits::Signed;
use std::collections::HashMap;
use std::mem;
use std::sync::{Arc, LazyLock};

use crate::expr::boolean::{BoolExpr, CmpOp};
use crate::expr::int::{BinOp, IntExpr, TerOp};

/// A borrowed node of either sort.
#[derive(Clone, Copy)]
pub(crate) enum Node<'a> {
    Int(&'a IntExpr),
    Bool(&'a BoolExpr),
}

/// Number of nodes under `root`, counting shared children once per use.
pub(crate) fn size(root: Node<'_>) -> usize {
    let mut stack = vec![root];
    let mut count = 0;
    while let Some(node) = stack.pop() {
        count += 1;
        match node {
            Node::Int(IntExpr::Lit(_) | IntExpr::Var(_)) | Node::Bool(BoolExpr::Lit(_)) => {}
            Node::Int(IntExpr::Popcount(x)) => stack.push(Node::Int(&**x)),
            Node::Int(IntExpr::Binary(_, a, b)) => {
                stack.extend([Node::Int(&**a), Node::Int(&**b)]);
            }
            Node::Int(IntExpr::Ternary(_, a, b, c)) => {
                stack.extend([Node::Int(&**a), Node::Int(&**b), Node::Int(&**c)]);
            }
            Node::Int(IntExpr::Ite(c, a, b)) => {
                stack.extend([Node::Bool(&**c), Node::Int(&**a), Node::Int(&**b)]);
            }
            Node::Bool(BoolExpr::Cmp(_, a, b)) => {
                stack.extend([Node::Int(&**a), Node::Int(&**b)]);
            }
            Node::Bool(BoolExpr::Not(x)) => stack.push(Node::Bool(&**x)),
            Node::Bool(BoolExpr::And(a, b) | BoolExpr::Or(a, b)) => {
                stack.extend([Node::Bool(&**a), Node::Bool(&**b)]);
            }
        }
    }
    count
}

enum Task<'a> {
    Int(&'a IntExpr),
    Bool(&'a BoolExpr),
    Popcount,
    Binary(BinOp),
    Ternary(TerOp),
    /// Condition is on the bool stack; continue with the chosen branch only.
    Branch(&'a IntExpr, &'a IntExpr),
    Cmp(CmpOp),
    Not,
    AndThen(&'a BoolExpr),
    OrElse(&'a BoolExpr),
}

struct Machine<'a> {
    tasks: Vec<Task<'a>>,
    ints: Vec<BigInt>,
    bools: Vec<bool>,
}

impl<'a> Machine<'a> {
    fn run(root: Task<'a>, model: &HashMap<String, BigInt>) -> Option<Self> {
        let mut m = Machine {
            tasks: vec![root],
            ints: Vec::new(),
            bools: Vec::new(),
        };
        while let Some(task) = m.tasks.pop() {
            match task {
                Task::Int(expr) => match expr {
                    IntExpr::Lit(v) => m.ints.push(v.clone()),
                    IntExpr::Var(name) => m.ints.push(model.get(name)?.clone()),
                    IntExpr::Popcount(x) => m.tasks.extend([Task::Popcount, Task::Int(&**x)]),
                    IntExpr::Binary(op, a, b) => {
                        m.tasks
                            .extend([Task::Binary(*op), Task::Int(&**b), Task::Int(&**a)]);
                    }
                    IntExpr::Ternary(op, a, b, c) => m.tasks.extend([
                        Task::Ternary(*op),
                        Task::Int(&**c),
                        Task::Int(&**b),
                        Task::Int(&**a),
                    ]),
                    IntExpr::Ite(c, a, b) => {
                        m.tasks.extend([Task::Branch(&**a, &**b), Task::Bool(&**c)]);
                    }
                },
                Task::Bool(expr) => match expr {
                    BoolExpr::Lit(b) => m.bools.push(*b),
                    BoolExpr::Cmp(op, a, b) => {
                        m.tasks.extend([Task::Cmp(*op), Task::Int(&**b), Task::Int(&**a)]);
                    }
                    BoolExpr::Not(x) => m.tasks.extend([Task::Not, Task::Bool(&**x)]),
                    BoolExpr::And(a, b) => m.tasks.extend([Task::AndThen(&**b), Task::Bool(&**a)]),
                    BoolExpr::Or(a, b) => m.tasks.extend([Task::OrElse(&**b), Task::Bool(&**a)]),
                },
                Task::Popcount => {
                    let v = m.ints.pop()?;
                    if v.is_negative() {
                        return None;
                    }
                    m.ints.push(BigInt::from(v.magnitude().count_ones()));
                }
                Task::Binary(op) => {
                    let y = m.ints.pop()?;
                    let x = m.ints.pop()?;
                    m.ints.push(op.eval(&x, &y)?);
                }
                Task::Ternary(op) => {
                    let z = m.ints.pop()?;
                    let y = m.ints.pop()?;
                    let x = m.ints.pop()?;
                    m.ints.push(op.eval(&x, &y, &z)?);
                }
                Task::Branch(then_, otherwise) => {
                    let chosen = if m.bools.pop()? { then_ } else { otherwise };
                    m.tasks.push(Task::Int(chosen));
                }
                Task::Cmp(op) => {
                    let y = m.ints.pop()?;
                    let x = m.ints.pop()?;
                    m.bools.push(op.holds(&x, &y));
                }
                Task::Not => {
                    let v = m.bools.pop()?;
                    m.bools.push(!v);
                }
                Task::AndThen(rhs) => {
                    if m.bools.pop()? {
                        m.tasks.push(Task::Bool(rhs));
                    } else {
                        m.bools.push(false);
                    }
                }
                Task::OrElse(rhs) => {
                    if m.bools.pop()? {
                        m.bools.push(true);
                    } else {
                        m.tasks.push(Task::Bool(rhs));
                    }
                }
            }
        }
        Some(m)
    }
}

pub(crate) fn eval_int(expr: &IntExpr, model: &HashMap<String, BigInt>) -> Option<BigInt> {
    Machine::run(Task::Int(expr), model)?.ints.pop()
}

pub(crate) fn eval_bool(expr: &BoolExpr, model: &HashMap<String, BigInt>) -> Option<bool> {
    Machine::run(Task::Bool(expr), model)?.bools.pop()
}

// Placeholders swapped in for detached children. Statics are never dropped, so a
// placeholder never reaches zero references.
static INT_LEAF: LazyLock<Arc<IntExpr>> = LazyLock::new(|| Arc::new(IntExpr::zero()));
static BOOL_LEAF: LazyLock<Arc<BoolExpr>> = LazyLock::new(|| Arc::new(BoolExpr::Lit(false)));

enum Owned {
    Int(Arc<IntExpr>),
    Bool(Arc<BoolExpr>),
}

/// Children moved out of nodes that are about to be freed.
#[derive(Default)]
struct Detached(Vec<Owned>);

impl Detached {
    fn int(&mut self, child: &mut Arc<IntExpr>) {
        let leaf = matches!(**child, IntExpr::Lit(_) | IntExpr::Var(_));
        if !leaf && Arc::get_mut(child).is_some() {
            self.0.push(Owned::Int(mem::replace(child, Arc::clone(&INT_LEAF))));
        }
    }

    fn bool(&mut self, child: &mut Arc<BoolExpr>) {
        let leaf = matches!(**child, BoolExpr::Lit(_));
        if !leaf && Arc::get_mut(child).is_some() {
            self.0.push(Owned::Bool(mem::replace(child, Arc::clone(&BOOL_LEAF))));
        }
    }

    fn int_children(&mut self, expr: &mut IntExpr) {
        match expr {
            IntExpr::Lit(_) | IntExpr::Var(_) => {}
            IntExpr::Popcount(x) => self.int(x),
            IntExpr::Binary(_, a, b) => {
                self.int(a);
                self.int(b);
            }
            IntExpr::Ternary(_, a, b, c) => {
                self.int(a);
                self.int(b);
                self.int(c);
            }
            IntExpr::Ite(c, a, b) => {
                self.bool(c);
                self.int(a);
                self.int(b);
            }
        }
    }

    fn bool_children(&mut self, expr: &mut BoolExpr) {
        match expr {
            BoolExpr::Lit(_) => {}
            BoolExpr::Cmp(_, a, b) => {
                self.int(a);
                self.int(b);
            }
            BoolExpr::Not(x) => self.bool(x),
            BoolExpr::And(a, b) | BoolExpr::Or(a, b) => {
                self.bool(a);
                self.bool(b);
            }
        }
    }

    /// Frees everything detached so far. Each unwrapped node hands its own children to
    /// the worklist before it goes, so its drop finds nothing left to recurse into.
    fn release(mut self) {
        while let Some(owned) = self.0.pop() {
            match owned {
                Owned::Int(arc) => {
                    if let Ok(mut node) = Arc::try_unwrap(arc) {
                        self.int_children(&mut node);
                    }
                }
                Owned::Bool(arc) => {
                    if let Ok(mut node) = Arc::try_unwrap(arc) {
                        self.bool_children(&mut node);
                    }
                }
            }
        }
    }
}

impl Drop for IntExpr {
    fn drop(&mut self) {
        let mut detached = Detached::default();
        detached.int_children(self);
        detached.release();
    }
}

impl Drop for BoolExpr {
    fn drop(&mut self) {
        let mut detached = Detached::default();
        detached.bool_children(self);
        detached.release();
    }
}
