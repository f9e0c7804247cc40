//! Script lint rules run over the transpiled program.
//!
//! - `eqeqeq`: `==` / `!=`
//! - `no-eval`: direct `eval(...)` calls
//! - `no-with`: `with` statements

use oxc::ast::ast::{BinaryExpression, BinaryOperator, CallExpression, Expression, Program, WithStatement};
use oxc::ast_visit::{Visit, walk};
use oxc::span::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFinding {
    /// Byte offset into the bundle.
    pub offset: u32,
    pub rule: &'static str,
    pub message: &'static str,
}

/// Collect findings in source order.
pub fn lint_program(program: &Program<'_>) -> Vec<ScriptFinding> {
    let mut linter = ScriptLinter::default();
    linter.visit_program(program);
    linter.findings.sort_by_key(|f| f.offset);
    linter.findings
}

#[derive(Default)]
struct ScriptLinter {
    findings: Vec<ScriptFinding>,
}

impl ScriptLinter {
    fn report(&mut self, span: Span, rule: &'static str, message: &'static str) {
        // Nodes synthesized by the transformer have no source position
        if span.is_unspanned() {
            return;
        }
        self.findings.push(ScriptFinding {
            offset: span.start,
            rule,
            message,
        });
    }
}

impl<'a> Visit<'a> for ScriptLinter {
    fn visit_binary_expression(&mut self, expr: &BinaryExpression<'a>) {
        match expr.operator {
            BinaryOperator::Equality => self.report(expr.span, "eqeqeq", "Expected '===' and instead saw '=='"),
            BinaryOperator::Inequality => self.report(expr.span, "eqeqeq", "Expected '!==' and instead saw '!='"),
            _ => {}
        }
        walk::walk_binary_expression(self, expr);
    }

    fn visit_call_expression(&mut self, expr: &CallExpression<'a>) {
        if let Expression::Identifier(ident) = &expr.callee
            && ident.name.as_str() == "eval"
        {
            self.report(expr.span, "no-eval", "eval can be harmful");
        }
        walk::walk_call_expression(self, expr);
    }

    fn visit_with_statement(&mut self, stmt: &WithStatement<'a>) {
        self.report(stmt.span, "no-with", "Unexpected use of 'with' statement");
        walk::walk_with_statement(self, stmt);
    }
}
