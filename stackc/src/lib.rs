pub mod error;
pub mod extract;
pub mod inst;
pub mod lex;
pub mod parsing;
pub mod scan;
pub mod symbol;
pub mod token_stream;
pub mod tokens;
pub mod types;

use error::{CompileError, CompileResult};
use extract::FunctionExtractor;
use inst::Labels;
use itertools::Itertools;
use parsing::ParsedFunction;
use symbol::FunctionTable;

use std::fmt;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compile a whole source text with a fresh compiler context.
pub fn compile_str(source: &str) -> CompileResult<Program> {
    Compiler::new().compile(source)
}

/// Compiler context for one or more related compile runs.
///
/// Owns the function table, so repeated compiles on the same value see
/// each other's functions, while independent contexts never interfere.
#[derive(Debug, Default)]
pub struct Compiler {
    functions: FunctionTable,
    labels: Labels,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a pre-compiled function into the table, making it callable
    /// from subsequently compiled source.
    pub fn register(&mut self, function: ParsedFunction) -> CompileResult<()> {
        if self.functions.contains_function(&function.label) {
            return Err(CompileError::DuplicateFunctionLabel {
                label: function.label.clone(),
            });
        }
        self.functions.add_function(function);
        Ok(())
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    /// Compile a whole source text into a program listing.
    ///
    /// Sources without any `function` definition compile as the body
    /// of a synthetic function labelled `main`, which is not added to
    /// the table. Any failure aborts the whole compile; no listing is
    /// produced from a partially compiled source.
    pub fn compile(&mut self, source: &str) -> CompileResult<Program> {
        let mut compiled = vec![];

        // Extraction and compilation run as one pass in source order,
        // so calls resolve functions defined before the call site.
        for raw in FunctionExtractor::new(source) {
            let raw = raw?;

            if self.functions.contains_function(raw.label.trim()) {
                return Err(CompileError::DuplicateFunctionLabel {
                    label: raw.label.trim().into(),
                });
            }

            let function = ParsedFunction::parse(&raw, &self.functions, &mut self.labels)?;
            compiled.push(function.clone());
            self.functions.add_function(function);
        }

        if compiled.is_empty() && !source.trim().is_empty() {
            let function =
                ParsedFunction::parse_bare("main", source, &self.functions, &mut self.labels)?;
            compiled.push(function);
        }

        Ok(Program {
            functions: compiled,
        })
    }
}

/// Compiled output of one source text: the functions in source order,
/// each carrying its final instruction sequence.
#[derive(Debug)]
pub struct Program {
    functions: Vec<ParsedFunction>,
}

impl Program {
    pub fn functions(&self) -> &[ParsedFunction] {
        &self.functions
    }

    pub fn get(&self, label: &str) -> Option<&ParsedFunction> {
        self.functions.iter().find(|function| function.label == label)
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// The whole listing as text, one labelled section per function.
    pub fn listing(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.functions.iter().join("\n"))
    }
}
