use crate::evaluator::{evaluate, Environment};
use crate::lexer::Lexer;
use crate::parser::parse;
use crate::value::Value;

/// Runs a source text through the whole pipeline and prints the resulting
/// value, if there is one. Errors are rendered as diagnostics against the
/// source.
pub fn run(source: &str, filename: Option<&str>) {
    let tokens = match Lexer::new(source).scan_tokens() {
        Ok(tokens) => tokens,
        Err(error) => {
            error.report(source, filename);
            return;
        }
    };

    let expression = match parse(tokens) {
        Ok(expression) => expression,
        Err(error) => {
            error.report(source, filename);
            return;
        }
    };

    let mut environment = Environment::new();
    match evaluate(&expression, &mut environment) {
        Ok(Value::Unit) => {}
        Ok(value) => println!("{}", value),
        Err(error) => error.report(source, filename),
    }
}
