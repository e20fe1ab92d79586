use std::fmt;

/// One node of a rule's flat opcode tree.
///
/// A rule's opcodes live in a single `Vec`; opcode 0 is the root. Structural
/// opcodes refer to their children by index into that same vector:
///
/// - `Alt` and `Cat` list their children explicitly.
/// - `Rep`, `And`, `Not`, `Bka` and `Bkn` govern the opcode immediately
///   following them (`index + 1`).
/// - `Rnm` refers to another rule by its index in the grammar, `Udt` to a
///   user-defined terminal by its index in the UDT list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opcode {
    /// Ordered choice over `children`.
    Alt { children: Vec<usize> },
    /// Sequence of `children`.
    Cat { children: Vec<usize> },
    /// Repetition of the next opcode, `min` to `max` times (`None` = unbounded).
    Rep { min: u32, max: Option<u32> },
    /// Rule reference.
    Rnm { index: usize },
    /// User-defined terminal. `empty` is true for `e_` names.
    Udt { index: usize, empty: bool },
    /// Positive look-ahead.
    And,
    /// Negative look-ahead.
    Not,
    /// Positive look-behind.
    Bka,
    /// Negative look-behind.
    Bkn,
    /// Beginning-of-string anchor.
    Abg,
    /// End-of-string anchor.
    Aen,
    /// Back-reference to the last phrase matched by a rule or UDT.
    Bkr {
        index: usize,
        udt: bool,
        case_insensitive: bool,
    },
    /// Case-insensitive literal string. Stored lowercased.
    Tls { string: Vec<u32> },
    /// Case-sensitive binary string.
    Tbs { string: Vec<u32> },
    /// Character range, inclusive.
    Trg { min: u32, max: u32 },
}

impl Opcode {
    /// The numeric type tag used by generated tables.
    #[must_use]
    pub fn type_id(&self) -> u8 {
        match self {
            Opcode::Alt { .. } => 1,
            Opcode::Cat { .. } => 2,
            Opcode::Rep { .. } => 3,
            Opcode::Rnm { .. } => 4,
            Opcode::Udt { .. } => 5,
            Opcode::And => 6,
            Opcode::Not => 7,
            Opcode::Trg { .. } => 8,
            Opcode::Tls { .. } => 9,
            Opcode::Tbs { .. } => 10,
            Opcode::Bkr { .. } => 11,
            Opcode::Bka => 12,
            Opcode::Bkn => 13,
            Opcode::Abg => 14,
            Opcode::Aen => 15,
        }
    }

    /// Upper-case operator mnemonic, e.g. `"ALT"`.
    #[must_use]
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Alt { .. } => "ALT",
            Opcode::Cat { .. } => "CAT",
            Opcode::Rep { .. } => "REP",
            Opcode::Rnm { .. } => "RNM",
            Opcode::Udt { .. } => "UDT",
            Opcode::And => "AND",
            Opcode::Not => "NOT",
            Opcode::Bka => "BKA",
            Opcode::Bkn => "BKN",
            Opcode::Abg => "ABG",
            Opcode::Aen => "AEN",
            Opcode::Bkr { .. } => "BKR",
            Opcode::Tls { .. } => "TLS",
            Opcode::Tbs { .. } => "TBS",
            Opcode::Trg { .. } => "TRG",
        }
    }

    /// Children of an `Alt` or `Cat`; empty for every other opcode.
    #[must_use]
    pub fn children(&self) -> &[usize] {
        match self {
            Opcode::Alt { children } | Opcode::Cat { children } => children,
            _ => &[],
        }
    }

    /// True for the opcodes that apply to the opcode immediately after them.
    #[must_use]
    pub fn governs_next(&self) -> bool {
        matches!(
            self,
            Opcode::Rep { .. } | Opcode::And | Opcode::Not | Opcode::Bka | Opcode::Bkn
        )
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opcode::Alt { children } | Opcode::Cat { children } => {
                write!(f, "{}(", self.mnemonic())?;
                write_list(f, children)?;
                write!(f, ")")
            }
            Opcode::Rep { min, max: Some(max) } => write!(f, "REP({min},{max})"),
            Opcode::Rep { min, max: None } => write!(f, "REP({min},inf)"),
            Opcode::Rnm { index } => write!(f, "RNM({index})"),
            Opcode::Udt { index, empty } => write!(f, "UDT({index},{})", u8::from(*empty)),
            Opcode::Bkr {
                index,
                udt,
                case_insensitive,
            } => {
                let target = if *udt { "udt" } else { "rule" };
                let case = if *case_insensitive { "%i" } else { "%s" };
                write!(f, "BKR({target} {index},{case})")
            }
            Opcode::Tls { string } | Opcode::Tbs { string } => {
                write!(f, "{}(", self.mnemonic())?;
                write_list(f, string)?;
                write!(f, ")")
            }
            Opcode::Trg { min, max } => write!(f, "TRG({min},{max})"),
            Opcode::And | Opcode::Not | Opcode::Bka | Opcode::Bkn | Opcode::Abg | Opcode::Aen => {
                f.write_str(self.mnemonic())
            }
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_ids_are_distinct() {
        let ops = [
            Opcode::Alt { children: vec![] },
            Opcode::Cat { children: vec![] },
            Opcode::Rep { min: 0, max: None },
            Opcode::Rnm { index: 0 },
            Opcode::Udt { index: 0, empty: false },
            Opcode::And,
            Opcode::Not,
            Opcode::Trg { min: 0, max: 1 },
            Opcode::Tls { string: vec![] },
            Opcode::Tbs { string: vec![] },
            Opcode::Bkr {
                index: 0,
                udt: false,
                case_insensitive: true,
            },
            Opcode::Bka,
            Opcode::Bkn,
            Opcode::Abg,
            Opcode::Aen,
        ];
        let mut ids: Vec<u8> = ops.iter().map(Opcode::type_id).collect();
        assert_eq!(ids, (1..=15).collect::<Vec<u8>>());
        ids.dedup();
        assert_eq!(ids.len(), 15);
    }

    #[test]
    fn display_forms() {
        assert_eq!(
            Opcode::Alt {
                children: vec![1, 4]
            }
            .to_string(),
            "ALT(1,4)"
        );
        assert_eq!(Opcode::Rep { min: 0, max: None }.to_string(), "REP(0,inf)");
        assert_eq!(
            Opcode::Rep {
                min: 2,
                max: Some(3)
            }
            .to_string(),
            "REP(2,3)"
        );
        assert_eq!(
            Opcode::Tbs {
                string: vec![97, 98]
            }
            .to_string(),
            "TBS(97,98)"
        );
        assert_eq!(Opcode::Aen.to_string(), "AEN");
    }

    #[test]
    fn governing_opcodes() {
        assert!(Opcode::Rep { min: 0, max: None }.governs_next());
        assert!(Opcode::Not.governs_next());
        assert!(Opcode::Bka.governs_next());
        assert!(!Opcode::Abg.governs_next());
        assert!(!Opcode::Cat { children: vec![1] }.governs_next());
    }
}
