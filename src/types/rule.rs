use super::opcode::Opcode;

/// A named grammar rule and its opcode tree.
///
/// Rule names are case-insensitive; `lower` holds the lowercased form used
/// for lookups and for callback registration. `index` is the rule's position
/// in its grammar, which is also the value every [`Opcode::Rnm`] uses to
/// refer to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: String,
    pub lower: String,
    pub index: usize,
    pub opcodes: Vec<Opcode>,
}

impl Rule {
    #[must_use]
    pub fn new(name: &str, index: usize, opcodes: Vec<Opcode>) -> Self {
        Self {
            name: name.to_owned(),
            lower: name.to_ascii_lowercase(),
            index,
            opcodes,
        }
    }
}

/// A user-defined terminal: a named phrase recognizer supplied by the
/// application at parse time.
///
/// `empty` is true when the name carries the `e_` prefix, meaning the
/// terminal is allowed to match the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Udt {
    pub name: String,
    pub lower: String,
    pub index: usize,
    pub empty: bool,
}

impl Udt {
    #[must_use]
    pub fn new(name: &str, index: usize, empty: bool) -> Self {
        Self {
            name: name.to_owned(),
            lower: name.to_ascii_lowercase(),
            index,
            empty,
        }
    }
}
