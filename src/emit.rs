//! Grammar emitter: Rust source for a compiled grammar and the statistics
//! printed in its header.

use std::fmt;

use crate::types::{Grammar, Opcode};

/// Opcode mnemonics in the order the summary lists them.
const SUMMARY_ORDER: [&str; 15] = [
    "ALT", "CAT", "RNM", "UDT", "BKR", "REP", "AND", "NOT", "BKA", "BKN", "ABG", "AEN", "TLS",
    "TBS", "TRG",
];

/// Size statistics of a compiled grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarSummary {
    pub rules: usize,
    pub udts: usize,
    pub opcodes: usize,
    /// Opcode count per mnemonic, in summary order.
    pub opcode_counts: Vec<(&'static str, usize)>,
    /// Smallest and largest character code used by any terminal, if any
    /// `TLS`, `TBS` or `TRG` opcode exists.
    pub characters: Option<(u32, u32)>,
}

impl GrammarSummary {
    fn of(grammar: &Grammar) -> Self {
        let mut opcode_counts: Vec<(&'static str, usize)> =
            SUMMARY_ORDER.iter().map(|&name| (name, 0)).collect();
        let mut characters: Option<(u32, u32)> = None;
        let mut widen = |lo: u32, hi: u32| {
            characters = Some(match characters {
                Some((min, max)) => (min.min(lo), max.max(hi)),
                None => (lo, hi),
            });
        };

        for op in grammar.rules.iter().flat_map(|r| &r.opcodes) {
            if let Some(entry) = opcode_counts.iter_mut().find(|(n, _)| *n == op.mnemonic()) {
                entry.1 += 1;
            }
            match op {
                Opcode::Tls { string } | Opcode::Tbs { string } => {
                    if let (Some(&lo), Some(&hi)) = (string.iter().min(), string.iter().max()) {
                        widen(lo, hi);
                    }
                }
                Opcode::Trg { min, max } => widen(*min, *max),
                _ => {}
            }
        }

        Self {
            rules: grammar.rules.len(),
            udts: grammar.udts.len(),
            opcodes: grammar.rules.iter().map(|r| r.opcodes.len()).sum(),
            opcode_counts,
            characters,
        }
    }

    /// Number of opcodes with the given mnemonic, e.g. `"ALT"`.
    #[must_use]
    pub fn count(&self, mnemonic: &str) -> usize {
        self.opcode_counts
            .iter()
            .find(|(name, _)| *name == mnemonic)
            .map_or(0, |(_, count)| *count)
    }
}

impl fmt::Display for GrammarSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>10} = {}", "rules", self.rules)?;
        writeln!(f, "{:>10} = {}", "udts", self.udts)?;
        writeln!(f, "{:>10} = {}", "opcodes", self.opcodes)?;
        for (name, count) in &self.opcode_counts {
            writeln!(f, "{name:>10} = {count}")?;
        }
        match self.characters {
            Some((min, max)) => write!(f, "characters = [{min} - {max}]")?,
            None => write!(f, "characters = [none defined]")?,
        }
        if self.count("UDT") > 0 {
            write!(f, " + user defined")?;
        }
        Ok(())
    }
}

/// Display adapter that writes a grammar as a Rust module.
struct RustSource<'g>(&'g Grammar);

impl fmt::Display for RustSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.write_rust_source(f)
    }
}

impl Grammar {
    /// Opcode statistics for this grammar.
    #[must_use]
    pub fn summary(&self) -> GrammarSummary {
        GrammarSummary::of(self)
    }

    /// Render this grammar as a Rust module.
    ///
    /// The module defines `CALLBACK_NAMES`, `rules()` and `udts()`, which
    /// rebuild this grammar's tables through the `sabnf` types, and `SOURCE`,
    /// the grammar text. A `SUMMARY` comment block heads the file.
    #[must_use]
    pub fn to_rust_source(&self) -> String {
        RustSource(self).to_string()
    }

    fn write_rust_source(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(out, "// Generated by sabnf {}.", env!("CARGO_PKG_VERSION"))?;
        writeln!(out, "//")?;
        writeln!(out, "// SUMMARY")?;
        for line in self.summary().to_string().lines() {
            writeln!(out, "// {line}")?;
        }
        writeln!(out)?;
        writeln!(out, "use sabnf::{{Opcode, Rule, Udt}};")?;
        writeln!(out)?;

        writeln!(out, "/// Lowercased rule and UDT names, sorted.")?;
        writeln!(out, "pub const CALLBACK_NAMES: &[&str] = &[")?;
        for name in self.callback_names() {
            writeln!(out, "    {name:?},")?;
        }
        writeln!(out, "];")?;
        writeln!(out)?;

        writeln!(out, "pub fn rules() -> Vec<Rule> {{")?;
        writeln!(out, "    vec![")?;
        for rule in &self.rules {
            writeln!(out, "        Rule::new(")?;
            writeln!(out, "            {:?},", rule.name)?;
            writeln!(out, "            {},", rule.index)?;
            writeln!(out, "            vec![")?;
            for (index, op) in rule.opcodes.iter().enumerate() {
                write!(out, "                {},", opcode_source(op))?;
                writeln!(out, " // {index}: {}", self.opcode_comment(op))?;
            }
            writeln!(out, "            ],")?;
            writeln!(out, "        ),")?;
        }
        writeln!(out, "    ]")?;
        writeln!(out, "}}")?;
        writeln!(out)?;

        writeln!(out, "pub fn udts() -> Vec<Udt> {{")?;
        if self.udts.is_empty() {
            writeln!(out, "    Vec::new()")?;
        } else {
            writeln!(out, "    vec![")?;
            for udt in &self.udts {
                writeln!(
                    out,
                    "        Udt::new({:?}, {}, {}),",
                    udt.name, udt.index, udt.empty
                )?;
            }
            writeln!(out, "    ]")?;
        }
        writeln!(out, "}}")?;
        writeln!(out)?;

        writeln!(out, "/// The grammar these tables were generated from.")?;
        writeln!(out, "pub const SOURCE: &str = {:?};", self.source)
    }

    /// Opcode display form with referenced names spelled out.
    fn opcode_comment(&self, op: &Opcode) -> String {
        match op {
            Opcode::Rnm { index } => format!("RNM({})", self.rules[*index].name),
            Opcode::Udt { index, .. } => format!("UDT({})", self.udts[*index].name),
            Opcode::Bkr {
                index,
                udt,
                case_insensitive,
            } => {
                let name = if *udt {
                    &self.udts[*index].name
                } else {
                    &self.rules[*index].name
                };
                let case = if *case_insensitive { "%i" } else { "%s" };
                format!("BKR(\\{case}{name})")
            }
            other => other.to_string(),
        }
    }
}

/// Rust expression that constructs `op`.
fn opcode_source(op: &Opcode) -> String {
    match op {
        Opcode::Alt { children } => format!("Opcode::Alt {{ children: vec!{children:?} }}"),
        Opcode::Cat { children } => format!("Opcode::Cat {{ children: vec!{children:?} }}"),
        Opcode::Rep { min, max } => format!("Opcode::Rep {{ min: {min}, max: {max:?} }}"),
        Opcode::Rnm { index } => format!("Opcode::Rnm {{ index: {index} }}"),
        Opcode::Udt { index, empty } => {
            format!("Opcode::Udt {{ index: {index}, empty: {empty} }}")
        }
        Opcode::Bkr {
            index,
            udt,
            case_insensitive,
        } => format!(
            "Opcode::Bkr {{ index: {index}, udt: {udt}, case_insensitive: {case_insensitive} }}"
        ),
        Opcode::Tls { string } => format!("Opcode::Tls {{ string: vec!{string:?} }}"),
        Opcode::Tbs { string } => format!("Opcode::Tbs {{ string: vec!{string:?} }}"),
        Opcode::Trg { min, max } => format!("Opcode::Trg {{ min: {min}, max: {max} }}"),
        Opcode::And => "Opcode::And".to_owned(),
        Opcode::Not => "Opcode::Not".to_owned(),
        Opcode::Bka => "Opcode::Bka".to_owned(),
        Opcode::Bkn => "Opcode::Bkn".to_owned(),
        Opcode::Abg => "Opcode::Abg".to_owned(),
        Opcode::Aen => "Opcode::Aen".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_expressions() {
        assert_eq!(
            opcode_source(&Opcode::Alt {
                children: vec![1, 2]
            }),
            "Opcode::Alt { children: vec![1, 2] }"
        );
        assert_eq!(
            opcode_source(&Opcode::Rep { min: 0, max: None }),
            "Opcode::Rep { min: 0, max: None }"
        );
        assert_eq!(
            opcode_source(&Opcode::Rep {
                min: 1,
                max: Some(3)
            }),
            "Opcode::Rep { min: 1, max: Some(3) }"
        );
        assert_eq!(opcode_source(&Opcode::Aen), "Opcode::Aen");
    }

    #[test]
    fn summary_counts() {
        let grammar = Grammar::from_abnf("S = \"ab\" / %d48-57 A\nA = %x09\n").unwrap();
        let summary = grammar.summary();
        assert_eq!(summary.rules, 2);
        assert_eq!(summary.count("ALT"), 1);
        assert_eq!(summary.count("CAT"), 1);
        assert_eq!(summary.count("TLS"), 1);
        assert_eq!(summary.count("TRG"), 1);
        assert_eq!(summary.count("RNM"), 1);
        assert_eq!(summary.count("TBS"), 1);
        assert_eq!(summary.opcodes, 6);
        assert_eq!(summary.characters, Some((9, 98)));
    }

    #[test]
    fn summary_display() {
        let grammar = Grammar::from_abnf("S = u_x\n").unwrap();
        let text = grammar.summary().to_string();
        assert!(text.starts_with("     rules = 1\n"));
        assert!(text.contains("       UDT = 1\n"));
        assert!(text.ends_with("characters = [none defined] + user defined"));
    }

    #[test]
    fn rust_source_layout() {
        let grammar = Grammar::from_abnf("S = A / u_x\nA = \\S\n").unwrap();
        let source = grammar.to_rust_source();
        assert!(source.contains("// SUMMARY\n//      rules = 2\n"));
        assert!(source.contains("pub const CALLBACK_NAMES: &[&str] = &[\n    \"a\",\n    \"s\",\n    \"u_x\",\n];"));
        assert!(source.contains("Opcode::Rnm { index: 1 }, // 1: RNM(A)"));
        assert!(source.contains("// 2: UDT(u_x)"));
        assert!(source.contains("// 0: BKR(\\%iS)"));
        assert!(source.contains("Udt::new(\"u_x\", 0, false),"));
        assert!(source.contains("pub const SOURCE: &str = \"S = A / u_x\\nA = \\\\S\\n\";"));
    }

    #[test]
    fn rust_source_is_written_in_full() {
        let grammar = Grammar::from_abnf("S = \"a\" S / \"b\"\n").unwrap();
        let source = grammar.to_rust_source();
        assert_eq!(source, RustSource(&grammar).to_string());
        assert!(source.starts_with("// Generated by sabnf "));
        assert!(source.trim_end().ends_with("\";"));
    }
}
