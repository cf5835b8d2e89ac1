//! Parenthesizes immediately-invoked function expressions.
//!
//! Engines that see `(function` start compiling the function eagerly instead
//! of pre-parsing it and parsing it again on the call. The pass finds
//! function expressions that are called on the spot (directly, or through
//! `.call` / `.apply`) and wraps them in parentheses. Everything else in the
//! source is left byte for byte.

use oxc_allocator::Allocator;
use oxc_ast::ast::{CallExpression, Expression};
use oxc_ast_visit::{walk, Visit};
use oxc_span::Span;

use super::parse_program;

/// Returns `source` with every bare IIFE wrapped in parentheses.
pub fn optimize_iifes(source: &str) -> Result<String, String> {
    let allocator = Allocator::default();
    let program = parse_program(&allocator, source)?;

    let mut finder = IifeFinder::default();
    finder.visit_program(&program);

    let mut inserts: Vec<(u32, char)> = finder
        .spans
        .iter()
        .flat_map(|span| [(span.start, '('), (span.end, ')')])
        .collect();
    // Back to front so earlier offsets stay valid. At equal offsets `(` goes
    // in first so that it ends up after the `)`.
    inserts.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    let mut out = source.to_string();
    for (offset, paren) in inserts {
        out.insert(offset as usize, paren);
    }
    Ok(out)
}

#[derive(Default)]
struct IifeFinder {
    spans: Vec<Span>,
}

impl<'a> Visit<'a> for IifeFinder {
    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        match &call.callee {
            Expression::FunctionExpression(func) => self.spans.push(func.span),
            Expression::StaticMemberExpression(member)
                if matches!(member.property.name.as_str(), "call" | "apply") =>
            {
                if let Expression::FunctionExpression(func) = &member.object {
                    self.spans.push(func.span);
                }
            }
            _ => {}
        }
        walk::walk_call_expression(self, call);
    }
}
