use std::fmt;
use std::path::Path;

use super::error::CompileError;
use super::rule::{Rule, Udt};
use crate::analysis::Analysis;

/// Builder for compiling one or more ABNF sources into a [`Grammar`].
///
/// Sources are concatenated in the order they are added, so a grammar may
/// be split across several files.
///
/// # Example
///
/// ```
/// use sabnf::Compiler;
///
/// let grammar = Compiler::new()
///     .source("greeting = hello SP world\n")
///     .source("hello = \"hello\"\nworld = \"world\"\nSP = %x20\n")
///     .compile()
///     .unwrap();
/// assert_eq!(grammar.rules().len(), 4);
/// ```
#[derive(Debug, Default)]
pub struct Compiler {
    strict: bool,
    sources: Vec<String>,
}

impl Compiler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept only RFC 5234 ABNF: CRLF line ends, no SABNF operators, no
    /// case-sensitive strings.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Append grammar text.
    #[must_use]
    pub fn source(mut self, text: &str) -> Self {
        self.sources.push(text.to_owned());
        self
    }

    /// Append the contents of a grammar file.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be read.
    pub fn file(mut self, path: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        self.sources.push(std::fs::read_to_string(path)?);
        Ok(self)
    }

    /// Run the full pipeline over the accumulated sources.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] for the first stage that reports errors,
    /// carrying every error of that stage.
    pub fn compile(self) -> Result<Grammar, CompileError> {
        // A source that stops mid-line must not run into the next one. The
        // last source is left as is so a missing final line end is reported.
        let line_end = if self.strict { "\r\n" } else { "\n" };
        let mut text = String::new();
        for (i, source) in self.sources.iter().enumerate() {
            text.push_str(source);
            let more = i + 1 < self.sources.len();
            if more && !text.is_empty() && !text.ends_with(&['\n', '\r'][..]) {
                text.push_str(line_end);
            }
        }
        crate::compile::compile(text, self.strict)
    }
}

/// A compiled grammar: reduced rule opcodes, UDTs, and the attribute
/// analysis that accepted them. Immutable and safe to share across threads.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub(crate) rules: Vec<Rule>,
    pub(crate) udts: Vec<Udt>,
    pub(crate) analysis: Analysis,
    pub(crate) source: String,
}

impl Grammar {
    /// Compile ABNF text with default (non-strict) settings.
    ///
    /// # Errors
    ///
    /// Returns [`SabnfError`](crate::SabnfError) wrapping the compile error.
    pub fn from_abnf(input: &str) -> Result<Self, crate::SabnfError> {
        Ok(Compiler::new().source(input).compile()?)
    }

    /// Read an ABNF file and compile it.
    ///
    /// # Errors
    ///
    /// Returns [`SabnfError`](crate::SabnfError) on I/O or compile failure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, crate::SabnfError> {
        Ok(Compiler::new().file(path)?.compile()?)
    }

    /// Rules in definition order; `rules()[i].index == i`.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    #[must_use]
    pub fn udts(&self) -> &[Udt] {
        &self.udts
    }

    /// Look up a rule by case-insensitive name.
    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        let lower = name.to_ascii_lowercase();
        self.rules.iter().find(|r| r.lower == lower)
    }

    #[must_use]
    pub fn analysis(&self) -> &Analysis {
        &self.analysis
    }

    /// The grammar text this grammar was compiled from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Names of the rules reachable from `rule_name`, directly or through
    /// other rules, in rule order.
    ///
    /// Returns `None` if the rule name is not found.
    #[must_use]
    pub fn dependencies_of(&self, rule_name: &str) -> Option<Vec<&str>> {
        self.rule(rule_name).map(|rule| {
            self.analysis
                .references(rule.index)
                .into_iter()
                .map(|index| self.rules[index].name.as_str())
                .collect()
        })
    }

    /// Lowercased rule and UDT names, sorted: the names an application
    /// registers callbacks under.
    #[must_use]
    pub fn callback_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .rules
            .iter()
            .map(|r| r.lower.clone())
            .chain(self.udts.iter().map(|u| u.lower.clone()))
            .collect();
        names.sort();
        names
    }
}

#[cfg(feature = "binary-cache")]
impl Grammar {
    /// Serialize this grammar to a byte vector.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::serial::SerializeError) if encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, crate::serial::SerializeError> {
        crate::serial::encode(self)
    }

    /// Deserialize a grammar from bytes produced by [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::serial::DeserializeError) on
    /// format, integrity, or validation failure.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::serial::DeserializeError> {
        crate::serial::decode(bytes)
    }

    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::serial::SerializeError) on
    /// encoding or I/O failure.
    pub fn to_binary_file(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<(), crate::serial::SerializeError> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::serial::DeserializeError) on
    /// I/O, format, integrity, or validation failure.
    pub fn from_binary_file(
        path: impl AsRef<Path>,
    ) -> Result<Self, crate::serial::DeserializeError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Grammar({} rules, {} udts, {} opcodes)",
            self.rules.len(),
            self.udts.len(),
            self.rules.iter().map(|r| r.opcodes.len()).sum::<usize>(),
        )
    }
}
