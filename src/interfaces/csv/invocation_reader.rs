use crate::error::{MortgageError, Result};
use serde::Deserialize;
use std::io::Read;

/// One scripted call of a named operation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Invocation {
    pub function: String,
    pub argument: Option<String>,
}

impl Invocation {
    /// Arguments in the form the router expects.
    pub fn args(&self) -> Vec<String> {
        self.argument.iter().cloned().collect()
    }
}

/// Reads invocations from a CSV source with `function,argument` columns.
///
/// JSON arguments are quoted the usual CSV way; an empty argument column
/// means the operation takes none.
pub struct InvocationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> InvocationReader<R> {
    /// Creates a new `InvocationReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes invocations.
    pub fn invocations(self) -> impl Iterator<Item = Result<Invocation>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(MortgageError::from))
    }
}
