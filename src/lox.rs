//! Pipeline driver: scan → parse → resolve → interpret.
//!
//! Each stage hands its diagnostics back instead of setting shared flags;
//! [`Lox::run`] decides whether to carry on to the next stage.

use std::io::Write;

use log::{debug, info};

use crate::ast::Stmt;
use crate::error::{LoxError, RunFailure};
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::scan_tokens;

/// Scan and parse `source`, returning the statements that parsed cleanly
/// together with every lexical and syntax error.
pub fn parse_source(source: &str) -> (Vec<Stmt>, Vec<LoxError>) {
    let (tokens, mut errors) = scan_tokens(source);
    let (statements, parse_errors) = Parser::new(tokens).parse();

    errors.extend(parse_errors);

    (statements, errors)
}

/// An interpreter session.  Global state persists across calls to
/// [`Lox::run`], which is what prompt mode relies on.
pub struct Lox {
    interpreter: Interpreter,
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

impl Lox {
    /// A session printing to standard output.
    pub fn new() -> Self {
        Self {
            interpreter: Interpreter::new(),
        }
    }

    /// A session whose `print` output goes to `out`.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        Self {
            interpreter: Interpreter::with_output(out),
        }
    }

    /// Limit how deeply calls may nest before `Stack overflow.` is raised.
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.interpreter.set_max_call_depth(depth);
        self
    }

    /// Run one chunk of source.  Nothing executes if any static error was
    /// found; otherwise execution stops at the first runtime error.
    pub fn run(&mut self, source: &str) -> Result<(), RunFailure> {
        info!("Running {} bytes of source", source.len());

        let (statements, errors) = parse_source(source);

        if !errors.is_empty() {
            debug!("Skipping execution: {} syntax error(s)", errors.len());
            return Err(RunFailure::Static(errors));
        }

        let mut resolver = Resolver::new(&mut self.interpreter);
        resolver.resolve(&statements);
        let errors: Vec<LoxError> = resolver.finish();

        if !errors.is_empty() {
            debug!("Skipping execution: {} resolve error(s)", errors.len());
            return Err(RunFailure::Static(errors));
        }

        self.interpreter
            .interpret(&statements)
            .map_err(RunFailure::Runtime)
    }
}
