#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use treelox::{Lox, LoxError, RunFailure};

/// A `Write` sink whose bytes stay readable after it is boxed away.
#[derive(Clone, Default)]
pub struct Capture(Rc<RefCell<Vec<u8>>>);

impl Capture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A fresh session plus the sink its `print` output lands in.
pub fn session() -> (Lox, Capture) {
    let capture = Capture::default();
    let lox = Lox::with_output(Box::new(capture.clone()));
    (lox, capture)
}

/// Run `source` in a fresh session, returning what it printed and how it ended.
pub fn run(source: &str) -> (String, Result<(), RunFailure>) {
    let (mut lox, capture) = session();
    let result = lox.run(source);
    (capture.contents(), result)
}

/// Run a program expected to succeed and return its output.
pub fn output_of(source: &str) -> String {
    let (out, result) = run(source);
    if let Err(failure) = result {
        panic!("program failed: {}\n{:?}", failure, failure);
    }
    out
}

/// Rendered static diagnostics of a program expected not to run.
pub fn static_errors(source: &str) -> Vec<String> {
    match run(source).1 {
        Err(RunFailure::Static(errors)) => errors.iter().map(LoxError::to_string).collect(),
        other => panic!("expected static errors, got {:?}", other),
    }
}

/// Output printed before the runtime error, and the rendered error.
pub fn runtime_error(source: &str) -> (String, String) {
    match run(source) {
        (out, Err(RunFailure::Runtime(e))) => (out, e.to_string()),
        (_, other) => panic!("expected a runtime error, got {:?}", other),
    }
}
