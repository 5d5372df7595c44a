//! Per-file orchestration
//!
//! [`generate`] runs one file through the parser in the mode selected by its
//! role and renders its artifact. It touches nothing but its inputs, so files
//! can be generated in parallel. The file-spanning declarations artifact is
//! assembled afterwards from the per-file outputs by [`Aggregate`], in
//! whatever order the caller feeds them.

use crate::codegen;
use crate::config::Config;
use crate::parser::ast::ForwardDecl;
use crate::parser::parse::{ParseError, Parser};
use std::path::PathBuf;
use thiserror::Error;

pub use crate::parser::parse::Mode;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("{path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything produced for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutput {
    /// Logical path the file was generated for
    pub path: String,
    pub mode: Mode,
    /// The generated-definitions text (header mode) or the
    /// forward-declarations text (source mode)
    pub generated: String,
    /// Types seen in header mode, in the order they were entered
    pub forward_decls: Vec<ForwardDecl>,
    /// One line per top-level construct that was skipped unparsed
    pub diagnostics: Vec<String>,
}

/// Generate the artifact for one file.
///
/// `path` is only used to reference the original file from generated code.
pub fn generate(path: &str, source: &str, mode: Mode, config: &Config) -> Result<FileOutput, GenerateError> {
    let mut parser = Parser::new(source, mode);
    let output = parser.parse_file().map_err(|source| GenerateError::Parse {
        path: path.to_string(),
        source,
    })?;

    let generated = match mode {
        Mode::Header => codegen::generated_header(path, &output.types, config),
        Mode::Source => codegen::symbols_file(&output.externs),
    };
    tracing::debug!(
        path,
        types = output.types.len(),
        externs = output.externs.len(),
        diagnostics = output.diagnostics.len(),
        "generated"
    );

    Ok(FileOutput {
        path: path.to_string(),
        mode,
        generated,
        forward_decls: output.forward_decls,
        diagnostics: output.diagnostics,
    })
}

/// Builder for the file-spanning declarations artifact
#[derive(Debug, Default, Clone)]
pub struct Aggregate {
    types: Vec<String>,
    symbols: Vec<String>,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the lines for one file. `artifact_include` is how the
    /// aggregate includes that file's forward-declarations artifact; it is
    /// only used in source mode.
    pub fn add(&mut self, output: &FileOutput, artifact_include: &str) {
        match output.mode {
            Mode::Header => self.types.extend(
                output
                    .forward_decls
                    .iter()
                    .map(|decl| codegen::aggregate_type_line(&output.path, decl)),
            ),
            Mode::Source => self
                .symbols
                .push(codegen::aggregate_symbols_line(artifact_include)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.symbols.is_empty()
    }

    pub fn render(&self) -> String {
        let mut out = String::from("#pragma once\n");
        for line in self.types.iter().chain(&self.symbols) {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}
