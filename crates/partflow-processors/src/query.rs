//! Query adapter: the only surface the stage uses from the jq engine
//!
//! Queries are compiled with jaq (`jaq-core` + `jaq-std` + `jaq-json`). The
//! native filters that reach outside the input value are left out, so a
//! compiled query is a pure function of its input.
use crate::error::{CompileError, EvalError};
use jaq_core::load::{self, Arena, File, Loader};
use jaq_core::{compile, Compiler, Ctx, Native, RcIter};
use jaq_json::Val;
use serde_json::Value;
use std::fmt;

/// Lazy results of one evaluation.
pub type Results<'a> = Box<dyn Iterator<Item = Result<Value, EvalError>> + 'a>;

/// Deepest bracket nesting accepted in query text, same as serde_json's
/// recursion limit for documents.
pub const MAX_NESTING: usize = 128;

/// Filters that read the environment or the clock, or end the process.
const EXCLUDED: &[&str] = &["env", "now", "localtime", "strflocaltime", "halt", "halt_error"];

/// A compiled, immutable query. `Send + Sync`; evaluate it from any number of
/// threads at once.
pub struct Query {
    source: String,
    filter: jaq_core::Filter<Native<Val>>,
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query").field("source", &self.source).finish()
    }
}

impl Query {
    pub fn compile(expr: &str) -> Result<Self, CompileError> {
        check_nesting(expr)?;

        let defs = jaq_std::defs()
            .chain(jaq_json::defs())
            .filter(|def| !EXCLUDED.contains(&def.name));
        let arena = Arena::default();
        let modules = Loader::new(defs)
            .load(&arena, File { code: expr, path: () })
            .map_err(|errs| load_error(expr, errs))?;

        let funs = jaq_std::funs()
            .chain(jaq_json::funs())
            .filter(|(name, _, _)| !EXCLUDED.contains(name));
        let filter = Compiler::default()
            .with_funs(funs)
            .compile(modules)
            .map_err(|errs| undefined_error(expr, errs))?;

        Ok(Self {
            source: expr.to_string(),
            filter,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Hands the lazy result stream to `consume`. Results are produced on
    /// demand and the caller's value is never touched.
    pub fn evaluate<R>(&self, value: &Value, consume: impl FnOnce(Results<'_>) -> R) -> R {
        let inputs = RcIter::new(core::iter::empty());
        let results = self
            .filter
            .run((Ctx::new([], &inputs), Val::from(value.clone())))
            .map(|r| r.map(Value::from).map_err(eval_error));
        consume(Box::new(results))
    }

    /// First result only. Later results are never computed.
    pub fn first(&self, value: &Value) -> Result<Value, EvalError> {
        self.evaluate(value, |mut results| {
            results.next().unwrap_or(Err(EvalError::NoResult))
        })
    }

    /// Every result, stopping at the first error.
    pub fn all(&self, value: &Value) -> Result<Vec<Value>, EvalError> {
        self.evaluate(value, |results| results.collect())
    }
}

fn eval_error(err: jaq_core::Error<Val>) -> EvalError {
    match Value::from(err.into_val()) {
        Value::String(message) => EvalError::Engine(message),
        other => EvalError::Engine(other.to_string()),
    }
}

/// Rejects bracket nesting beyond `MAX_NESTING` before the recursive parser
/// sees it. String interpolation `\(...)` counts as a level.
fn check_nesting(code: &str) -> Result<(), CompileError> {
    // true marks an interpolation, which resumes the string when closed
    let mut stack: Vec<bool> = Vec::new();
    let mut in_string = false;
    let mut chars = code.char_indices();

    while let Some((pos, c)) = chars.next() {
        if in_string {
            match c {
                '"' => in_string = false,
                '\\' => {
                    if let Some((_, '(')) = chars.next() {
                        stack.push(true);
                        in_string = false;
                    }
                }
                _ => {}
            }
        } else {
            match c {
                '"' => in_string = true,
                '#' => {
                    for (_, c) in chars.by_ref() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                '(' | '[' | '{' => stack.push(false),
                ')' | ']' | '}' => in_string = stack.pop().unwrap_or(false),
                _ => {}
            }
        }

        if stack.len() > MAX_NESTING {
            return Err(CompileError {
                message: format!("nesting deeper than {} levels", MAX_NESTING),
                position: pos,
            });
        }
    }
    Ok(())
}

/// Byte offset of `part` inside `code`, or 0 when `part` points elsewhere
/// (for example into the standard library definitions).
fn offset(code: &str, part: &str) -> usize {
    let start = code.as_ptr() as usize;
    let at = part.as_ptr() as usize;
    if at >= start && at <= start + code.len() {
        at - start
    } else {
        0
    }
}

fn load_error(code: &str, errs: load::Errors<&str, ()>) -> CompileError {
    let first = errs.into_iter().find_map(|(_, err)| match err {
        load::Error::Io(items) => items
            .into_iter()
            .next()
            .map(|(path, msg)| (format!("cannot load {}: {}", path, msg), offset(code, path))),
        load::Error::Lex(items) => items.into_iter().next().map(|(expect, found)| {
            (format!("expected {}", expect.as_str()), offset(code, found))
        }),
        load::Error::Parse(items) => items.into_iter().next().map(|(expect, found)| {
            (format!("expected {}", expect.as_str()), offset(code, found))
        }),
    });
    let (message, position) = first.unwrap_or_else(|| ("invalid query".to_string(), 0));
    CompileError { message, position }
}

fn undefined_error(code: &str, errs: compile::Errors<&str, ()>) -> CompileError {
    let first = errs
        .into_iter()
        .flat_map(|(_, undefined)| undefined)
        .next()
        .map(|(name, kind)| {
            let message = match kind {
                compile::Undefined::Filter(arity) => format!("undefined filter {}/{}", name, arity),
                other => format!("undefined {} {}", other.as_str(), name),
            };
            (message, offset(code, name))
        });
    let (message, position) = first.unwrap_or_else(|| ("invalid query".to_string(), 0));
    CompileError { message, position }
}
