//! Rule-expression lowering.
//!
//! Compiles model rule expressions into Python source that delegates to
//! the runtime helper functions (`rune_resolve_attr`, `rune_all_elements`,
//! `if_cond_fn`, ...). Conditional branches become numbered local
//! closures so that only the taken branch is evaluated.

use modelpy_model::{CmpOp, Condition, Expr, Literal};

use crate::error::CodegenError;
use crate::writer::PyWriter;

/// Compiles expressions within one condition body, tracking the closure
/// blocks that must be defined before the final `return`.
#[derive(Debug, Default)]
pub struct ExprCompiler {
    closure_count: usize,
    blocks: Vec<String>,
}

impl ExprCompiler {
    /// Creates a compiler with no pending closures.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles an expression to a Python source fragment. Conditional
    /// branches are deferred into closures retrievable via
    /// [`Self::take_blocks`].
    ///
    /// # Errors
    /// Returns `CodegenError::UnsupportedConstruct` for expressions with
    /// no lowering rule.
    pub fn compile(&mut self, expr: &Expr, path: &str) -> Result<String, CodegenError> {
        match expr {
            Expr::AttributePath(segments) => {
                if segments.is_empty() {
                    return Err(CodegenError::unsupported("empty attribute path", path));
                }
                let mut src = "self".to_string();
                for segment in segments {
                    src = format!("rune_resolve_attr({src}, \"{segment}\")");
                }
                Ok(src)
            }
            Expr::Literal(literal) => Ok(compile_literal(literal)),
            Expr::Exists(inner) => {
                let inner = self.compile(inner, path)?;
                Ok(format!("rune_attr_exists({inner})"))
            }
            Expr::IsAbsent(inner) => {
                let inner = self.compile(inner, path)?;
                Ok(format!("(not rune_attr_exists({inner}))"))
            }
            Expr::Comparison { op, lhs, rhs } => {
                let lhs = self.compile(lhs, path)?;
                let rhs = self.compile(rhs, path)?;
                Ok(format!(
                    "rune_all_elements({lhs}, \"{}\", {rhs})",
                    cmp_token(*op)
                ))
            }
            Expr::All(operands) => self.compile_junction(operands, "and", path),
            Expr::Any(operands) => self.compile_junction(operands, "or", path),
            Expr::Count(inner) => {
                let inner = self.compile(inner, path)?;
                Ok(format!("rune_count({inner})"))
            }
            Expr::OneOf {
                attributes,
                required,
            } => {
                let names: Vec<String> =
                    attributes.iter().map(|name| format!("'{name}'")).collect();
                let necessity = if *required { "True" } else { "False" };
                Ok(format!(
                    "rune_check_one_of(self, {}, necessity={necessity})",
                    names.join(", ")
                ))
            }
            Expr::IfThenElse {
                cond,
                then,
                otherwise,
            } => {
                let n = self.closure_count;
                self.closure_count += 1;
                let cond = self.compile(cond, path)?;
                let then = self.compile(then, path)?;
                let otherwise = match otherwise {
                    Some(expr) => self.compile(expr, path)?,
                    None => "True".to_string(),
                };
                self.blocks.push(format!(
                    "def _then_fn{n}():\n    return {then}\n\ndef _else_fn{n}():\n    return {otherwise}"
                ));
                Ok(format!("if_cond_fn({cond}, _then_fn{n}, _else_fn{n})"))
            }
            Expr::FunctionCall {
                namespace,
                name,
                args,
            } => {
                let mut compiled = Vec::with_capacity(args.len());
                for arg in args {
                    compiled.push(self.compile(arg, path)?);
                }
                Ok(format!(
                    "{}_functions_{name}({})",
                    namespace.replace('.', "_"),
                    compiled.join(", ")
                ))
            }
        }
    }

    fn compile_junction(
        &mut self,
        operands: &[Expr],
        joiner: &str,
        path: &str,
    ) -> Result<String, CodegenError> {
        match operands {
            [] => Err(CodegenError::unsupported(
                format!("empty '{joiner}' junction"),
                path,
            )),
            [single] => self.compile(single, path),
            _ => {
                let mut parts = Vec::with_capacity(operands.len());
                for operand in operands {
                    parts.push(self.compile(operand, path)?);
                }
                Ok(format!("({})", parts.join(format!(" {joiner} ").as_str())))
            }
        }
    }

    /// Drains the closure blocks accumulated so far, in definition order.
    pub fn take_blocks(&mut self) -> Vec<String> {
        std::mem::take(&mut self.blocks)
    }
}

fn compile_literal(literal: &Literal) -> String {
    match literal {
        Literal::Bool(true) => "True".to_string(),
        Literal::Bool(false) => "False".to_string(),
        Literal::Int(value) => value.to_string(),
        Literal::Decimal(repr) => format!("Decimal('{repr}')"),
        Literal::Str(value) => format!("\"{value}\""),
    }
}

const fn cmp_token(op: CmpOp) -> &'static str {
    op.token()
}

/// Writes one class condition method at the writer's current level.
///
/// # Errors
/// Propagates expression lowering failures.
pub fn emit_condition(
    writer: &mut PyWriter,
    index: usize,
    condition: &Condition,
    path: &str,
) -> Result<(), CodegenError> {
    let mut compiler = ExprCompiler::new();
    let body = compiler.compile(&condition.expr, path)?;

    writer.push_line("@rune_condition");
    let method = match &condition.name {
        Some(name) => format!("condition_{index}_{name}"),
        None => format!("condition_{index}_"),
    };
    writer.push_line(&format!("def {method}(self):"));
    writer.indent();
    if let Some(definition) = &condition.definition {
        writer.push_line("\"\"\"");
        writer.push_block(definition);
        writer.push_line("\"\"\"");
    }
    writer.push_line("item = self");
    for block in compiler.take_blocks() {
        writer.push_block(&block);
        writer.blank();
    }
    writer.push_line(&format!("return {body}"));
    writer.unindent();
    Ok(())
}
