//! Collection of member-path references from a statement.
//!
//! Walks every expression reachable from the axes, the slicer and formula
//! bodies. A path is collected only when its syntactic position expects a
//! member or member set; level/hierarchy/dimension argument positions and
//! the names being defined by formulas are excluded. The decision is driven
//! entirely by signature metadata, never by the shape of the path.

use pivotdb_parser::ast::{Expr, PathExpr, SelectStatement};

use crate::functions::{ArgKind, FunctionTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Collect,
    Exclude,
}

impl Position {
    fn from_kind(kind: Option<ArgKind>) -> Position {
        match kind {
            Some(kind) if kind.is_member_position() => Position::Collect,
            _ => Position::Exclude,
        }
    }
}

/// Collect every path used as a member reference, in walk order.
pub fn collect_member_paths<'a>(
    statement: &'a SelectStatement,
    functions: &FunctionTable,
) -> Vec<&'a PathExpr> {
    let mut out = Vec::new();

    // Formula bodies are walked, the names being defined are not.
    for formula in &statement.formulas {
        walk_expr(formula.body(), Position::Collect, functions, &mut out);
    }
    for axis in &statement.axes {
        walk_expr(&axis.expr, Position::Collect, functions, &mut out);
    }
    if let Some(slicer) = &statement.slicer {
        walk_expr(slicer, Position::Collect, functions, &mut out);
    }

    out
}

fn walk_expr<'a>(
    expr: &'a Expr,
    position: Position,
    functions: &FunctionTable,
    out: &mut Vec<&'a PathExpr>,
) {
    match expr {
        Expr::Path(path) => {
            if position == Position::Collect {
                out.push(path);
            }
        }
        Expr::Literal(_) => (),
        Expr::Call(call) => {
            // A function without signature metadata conservatively excludes
            // its argument paths; nested calls still classify on their own.
            let signature = functions.signature(&call.name.value);
            for (idx, arg) in call.args.iter().enumerate() {
                let position = match signature {
                    Some(signature) => Position::from_kind(signature.arg_kind(idx)),
                    None => Position::Exclude,
                };
                walk_expr(arg, position, functions, out);
            }
        }
        Expr::Property { expr, name } => {
            let position =
                Position::from_kind(functions.property(&name.value).map(|p| p.base));
            walk_expr(expr, position, functions, out);
        }
        Expr::Set(elements) | Expr::Tuple(elements) => {
            for element in elements {
                walk_expr(element, position, functions, out);
            }
        }
        Expr::UnaryExpr { expr, .. } => walk_expr(expr, position, functions, out),
        Expr::BinaryExpr { left, right, .. } => {
            walk_expr(left, position, functions, out);
            walk_expr(right, position, functions, out);
        }
    }
}
