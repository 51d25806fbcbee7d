//! compiler pipeline for the oprex notation

use std::path::Path;
use tracing::debug;

use crate::problem::{CompileError, LoadingError};

pub mod charclass;
pub mod flags;
pub mod parser;
pub mod quantifier;
mod scope;
pub mod tokenizer;

/// Read a source file and return an owned String, so the caller decides how
/// long the text lives relative to the compilation borrowing it.
pub fn load(filename: &Path) -> Result<String, LoadingError<'_>> {
    match std::fs::read_to_string(filename) {
        Ok(content) => Ok(content),
        Err(error) => {
            debug!(?error);
            match error.kind() {
                std::io::ErrorKind::NotFound => Err(LoadingError {
                    problem: "File not found".to_string(),
                    details: String::new(),
                    filename,
                }),
                _ => Err(LoadingError {
                    problem: "Failed reading".to_string(),
                    details: error
                        .kind()
                        .to_string(),
                    filename,
                }),
            }
        }
    }
}

/// Compile oprex source text into a single regex pattern string, or report
/// the first error encountered. The source must begin and end with a blank
/// line.
pub fn compile(source: &str) -> Result<String, CompileError> {
    let result = parser::parse(source);
    match &result {
        Ok(pattern) => {
            debug!("Compiled to {} pattern characters", pattern.len());
        }
        Err(error) => {
            debug!("Compilation failed: {}", error);
        }
    }
    result
}
