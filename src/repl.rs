use crate::ast::Expr;
use crate::evaluator::{evaluate, Environment};
use crate::lexer::Lexer;
use crate::parser::parse;
use crate::value::Value;
use std::io::{self, Write};

pub fn start() {
    println!("rill interpreter v0.1.0");
    println!("Type 'exit' or press Ctrl+C to quit");
    println!();

    // A persistent environment keeps bindings alive between lines.
    let mut environment = Environment::new();

    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                // EOF reached (Ctrl+D or piped input ended)
                println!();
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" || line == "quit" {
                    println!("Goodbye!");
                    break;
                }

                run_repl_line(line, &mut environment);
            }
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                break;
            }
        }
    }
}

fn run_repl_line(source: &str, environment: &mut Environment) {
    let tokens = match Lexer::new(source).scan_tokens() {
        Ok(tokens) => tokens,
        Err(error) => {
            error.report(source, None);
            return;
        }
    };

    let expression = match parse(tokens) {
        Ok(expression) => expression,
        Err(error) => {
            error.report(source, None);
            return;
        }
    };

    match evaluate(&expression, environment) {
        Ok(value) => {
            // Declarations and assignments are statements; stay quiet for
            // them and for anything else that produced no value.
            let silent = matches!(&expression, Expr::VarDecl { .. })
                || matches!(&expression, Expr::Binary { op, .. } if op.as_str() == "=");
            if !silent && value != Value::Unit {
                println!("{}", value);
            }
        }
        Err(error) => error.report(source, None),
    }
}
