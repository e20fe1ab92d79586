//! The SABNF grammar of grammar files, as a static opcode table.
//!
//! This is the table the syntax phase runs against. Rule indices are fixed:
//! the constants below name them for the syntax and semantic callback tables.
//! Each rule is preceded by the ABNF it was generated from.

use std::sync::OnceLock;

use crate::types::{Opcode, Rule};

pub(crate) const FILE: usize = 0;
pub(crate) const BLANK_LINE: usize = 1;
pub(crate) const RULE: usize = 2;
pub(crate) const RULE_LOOKUP: usize = 3;
pub(crate) const RULE_NAME_TEST: usize = 4;
pub(crate) const RULE_NAME: usize = 5;
pub(crate) const RULE_NAME_ERROR: usize = 6;
pub(crate) const DEFINED_AS_TEST: usize = 7;
pub(crate) const DEFINED_AS_ERROR: usize = 8;
pub(crate) const DEFINED_AS: usize = 9;
pub(crate) const DEFINED: usize = 10;
pub(crate) const INC_ALT: usize = 11;
pub(crate) const RULE_ERROR: usize = 12;
pub(crate) const LINE_END_ERROR: usize = 13;
pub(crate) const ALTERNATION: usize = 14;
pub(crate) const CONCATENATION: usize = 15;
pub(crate) const REPETITION: usize = 16;
pub(crate) const BASIC_ELEMENT: usize = 17;
pub(crate) const BASIC_ELEMENT_ERROR: usize = 18;
pub(crate) const GROUP: usize = 19;
pub(crate) const GROUP_ERROR: usize = 20;
pub(crate) const GROUP_OPEN: usize = 21;
pub(crate) const GROUP_CLOSE: usize = 22;
pub(crate) const OPTION: usize = 23;
pub(crate) const OPTION_ERROR: usize = 24;
pub(crate) const OPTION_OPEN: usize = 25;
pub(crate) const OPTION_CLOSE: usize = 26;
pub(crate) const RNM_OP: usize = 27;
pub(crate) const UDT_OP: usize = 28;
pub(crate) const UDT_NON_EMPTY: usize = 29;
pub(crate) const UDT_EMPTY: usize = 30;
pub(crate) const REP_OP: usize = 31;
pub(crate) const ALT_OP: usize = 32;
pub(crate) const CAT_OP: usize = 33;
pub(crate) const STAR_OP: usize = 34;
pub(crate) const AND_OP: usize = 35;
pub(crate) const NOT_OP: usize = 36;
pub(crate) const TRG_OP: usize = 37;
pub(crate) const TBS_OP: usize = 38;
pub(crate) const TLS_OP: usize = 39;
pub(crate) const TLS_OPEN: usize = 40;
pub(crate) const TLS_CLOSE: usize = 41;
pub(crate) const TLS_STRING: usize = 42;
pub(crate) const STRING_TAB: usize = 43;
pub(crate) const CLS_OP: usize = 44;
pub(crate) const CLS_OPEN: usize = 45;
pub(crate) const CLS_CLOSE: usize = 46;
pub(crate) const CLS_STRING: usize = 47;
pub(crate) const PROS_VAL: usize = 48;
pub(crate) const PROS_VAL_OPEN: usize = 49;
pub(crate) const PROS_VAL_STRING: usize = 50;
pub(crate) const PROS_VAL_CLOSE: usize = 51;
pub(crate) const REP_MIN: usize = 52;
pub(crate) const REP_MIN_MAX: usize = 53;
pub(crate) const REP_MAX: usize = 54;
pub(crate) const REP_NUM: usize = 55;
pub(crate) const D_STRING: usize = 56;
pub(crate) const X_STRING: usize = 57;
pub(crate) const B_STRING: usize = 58;
pub(crate) const DEC: usize = 59;
pub(crate) const HEX: usize = 60;
pub(crate) const BIN: usize = 61;
pub(crate) const DMIN: usize = 62;
pub(crate) const DMAX: usize = 63;
pub(crate) const BMIN: usize = 64;
pub(crate) const BMAX: usize = 65;
pub(crate) const XMIN: usize = 66;
pub(crate) const XMAX: usize = 67;
pub(crate) const DNUM: usize = 68;
pub(crate) const BNUM: usize = 69;
pub(crate) const XNUM: usize = 70;
pub(crate) const ALPHANUM: usize = 71;
pub(crate) const OWSP: usize = 72;
pub(crate) const WSP: usize = 73;
pub(crate) const SPACE: usize = 74;
pub(crate) const COMMENT: usize = 75;
pub(crate) const LINE_END: usize = 76;
pub(crate) const LINE_CONTINUE: usize = 77;
pub(crate) const BKA_OP: usize = 78;
pub(crate) const BKN_OP: usize = 79;
pub(crate) const ABG_OP: usize = 80;
pub(crate) const AEN_OP: usize = 81;
pub(crate) const BKR_OP: usize = 82;
pub(crate) const BKR_MODIFIER: usize = 83;
pub(crate) const BKR_CI: usize = 84;
pub(crate) const BKR_CS: usize = 85;
pub(crate) const BKR_NAME: usize = 86;

pub(crate) const RULE_COUNT: usize = 87;

/// Compact opcode form for the static table. Only the operators the bootstrap
/// grammar itself uses appear here.
enum Op {
    Alt(&'static [usize]),
    Cat(&'static [usize]),
    Rep(u32, Option<u32>),
    Rnm(usize),
    Tbs(&'static [u32]),
    Trg(u32, u32),
}

impl Op {
    fn to_opcode(&self) -> Opcode {
        match self {
            Op::Alt(children) => Opcode::Alt {
                children: children.to_vec(),
            },
            Op::Cat(children) => Opcode::Cat {
                children: children.to_vec(),
            },
            Op::Rep(min, max) => Opcode::Rep {
                min: *min,
                max: *max,
            },
            Op::Rnm(index) => Opcode::Rnm { index: *index },
            Op::Tbs(string) => Opcode::Tbs {
                string: string.to_vec(),
            },
            Op::Trg(min, max) => Opcode::Trg {
                min: *min,
                max: *max,
            },
        }
    }
}

struct RuleDef {
    name: &'static str,
    opcodes: &'static [Op],
}

/// The bootstrap grammar, converted once into the crate's rule type.
pub(crate) fn rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| {
        GRAMMAR
            .iter()
            .enumerate()
            .map(|(index, def)| {
                Rule::new(def.name, index, def.opcodes.iter().map(Op::to_opcode).collect())
            })
            .collect()
    })
}

#[rustfmt::skip]
static GRAMMAR: [RuleDef; RULE_COUNT] = [
    // File          = *(BlankLine / Rule / RuleError)
    RuleDef {
        name: "File",
        opcodes: &[
            Op::Rep(0, None),
            Op::Alt(&[2, 3, 4]),
            Op::Rnm(BLANK_LINE),
            Op::Rnm(RULE),
            Op::Rnm(RULE_ERROR),
        ],
    },
    // BlankLine     = *(%d32/%d9) [comment] LineEnd
    RuleDef {
        name: "BlankLine",
        opcodes: &[
            Op::Cat(&[1, 5, 7]),
            Op::Rep(0, None),
            Op::Alt(&[3, 4]),
            Op::Tbs(&[32]),
            Op::Tbs(&[9]),
            Op::Rep(0, Some(1)),
            Op::Rnm(COMMENT),
            Op::Rnm(LINE_END),
        ],
    },
    // Rule          = RuleLookup owsp Alternation ((owsp LineEnd) / (LineEndError LineEnd))
    RuleDef {
        name: "Rule",
        opcodes: &[
            Op::Cat(&[1, 2, 3, 4]),
            Op::Rnm(RULE_LOOKUP),
            Op::Rnm(OWSP),
            Op::Rnm(ALTERNATION),
            Op::Alt(&[5, 8]),
            Op::Cat(&[6, 7]),
            Op::Rnm(OWSP),
            Op::Rnm(LINE_END),
            Op::Cat(&[9, 10]),
            Op::Rnm(LINE_END_ERROR),
            Op::Rnm(LINE_END),
        ],
    },
    // RuleLookup    = RuleNameTest owsp DefinedAsTest
    RuleDef {
        name: "RuleLookup",
        opcodes: &[
            Op::Cat(&[1, 2, 3]),
            Op::Rnm(RULE_NAME_TEST),
            Op::Rnm(OWSP),
            Op::Rnm(DEFINED_AS_TEST),
        ],
    },
    // RuleNameTest  = RuleName/RuleNameError
    RuleDef {
        name: "RuleNameTest",
        opcodes: &[
            Op::Alt(&[1, 2]),
            Op::Rnm(RULE_NAME),
            Op::Rnm(RULE_NAME_ERROR),
        ],
    },
    // RuleName      = alphanum
    RuleDef {
        name: "RuleName",
        opcodes: &[
            Op::Rnm(ALPHANUM),
        ],
    },
    // RuleNameError = 1*(%d33-60/%d62-126) ; all chars up to next space, "defined as" (=) or line end
    RuleDef {
        name: "RuleNameError",
        opcodes: &[
            Op::Rep(1, None),
            Op::Alt(&[2, 3]),
            Op::Trg(33, 60),
            Op::Trg(62, 126),
        ],
    },
    // DefinedAsTest = DefinedAs / DefinedAsError
    RuleDef {
        name: "DefinedAsTest",
        opcodes: &[
            Op::Alt(&[1, 2]),
            Op::Rnm(DEFINED_AS),
            Op::Rnm(DEFINED_AS_ERROR),
        ],
    },
    // DefinedAsError = 1*2%d33-126 ; the next 2 or 2 chars, not space or line end
    RuleDef {
        name: "DefinedAsError",
        opcodes: &[
            Op::Rep(1, Some(2)),
            Op::Trg(33, 126),
        ],
    },
    // DefinedAs     = IncAlt / Defined
    RuleDef {
        name: "DefinedAs",
        opcodes: &[
            Op::Alt(&[1, 2]),
            Op::Rnm(INC_ALT),
            Op::Rnm(DEFINED),
        ],
    },
    // Defined       = %d61
    RuleDef {
        name: "Defined",
        opcodes: &[
            Op::Tbs(&[61]),
        ],
    },
    // IncAlt        = %d61.47
    RuleDef {
        name: "IncAlt",
        opcodes: &[
            Op::Tbs(&[61, 47]),
        ],
    },
    // RuleError     = 1*(%d32-126 / %d9  / LineContinue) LineEnd
    RuleDef {
        name: "RuleError",
        opcodes: &[
            Op::Cat(&[1, 6]),
            Op::Rep(1, None),
            Op::Alt(&[3, 4, 5]),
            Op::Trg(32, 126),
            Op::Tbs(&[9]),
            Op::Rnm(LINE_CONTINUE),
            Op::Rnm(LINE_END),
        ],
    },
    // LineEndError  = 1*(%d32-126 / %d9  / LineContinue)
    RuleDef {
        name: "LineEndError",
        opcodes: &[
            Op::Rep(1, None),
            Op::Alt(&[2, 3, 4]),
            Op::Trg(32, 126),
            Op::Tbs(&[9]),
            Op::Rnm(LINE_CONTINUE),
        ],
    },
    // Alternation   = Concatenation *(owsp AltOp Concatenation)
    RuleDef {
        name: "Alternation",
        opcodes: &[
            Op::Cat(&[1, 2]),
            Op::Rnm(CONCATENATION),
            Op::Rep(0, None),
            Op::Cat(&[4, 5, 6]),
            Op::Rnm(OWSP),
            Op::Rnm(ALT_OP),
            Op::Rnm(CONCATENATION),
        ],
    },
    // Concatenation = Repetition *(CatOp Repetition)
    RuleDef {
        name: "Concatenation",
        opcodes: &[
            Op::Cat(&[1, 2]),
            Op::Rnm(REPETITION),
            Op::Rep(0, None),
            Op::Cat(&[4, 5]),
            Op::Rnm(CAT_OP),
            Op::Rnm(REPETITION),
        ],
    },
    // Repetition    = [BkaOp / BknOp / AndOp / NotOp / RepOp] (Group / Option / BasicElement / BasicElementError)
    RuleDef {
        name: "Repetition",
        opcodes: &[
            Op::Cat(&[1, 8]),
            Op::Rep(0, Some(1)),
            Op::Alt(&[3, 4, 5, 6, 7]),
            Op::Rnm(BKA_OP),
            Op::Rnm(BKN_OP),
            Op::Rnm(AND_OP),
            Op::Rnm(NOT_OP),
            Op::Rnm(REP_OP),
            Op::Alt(&[9, 10, 11, 12]),
            Op::Rnm(GROUP),
            Op::Rnm(OPTION),
            Op::Rnm(BASIC_ELEMENT),
            Op::Rnm(BASIC_ELEMENT_ERROR),
        ],
    },
    // BasicElement  = UdtOp / RnmOp / TrgOp / TbsOp / AbgOp / AenOp / BkrOp / TlsOp / ClsOp / ProsVal
    RuleDef {
        name: "BasicElement",
        opcodes: &[
            Op::Alt(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]),
            Op::Rnm(UDT_OP),
            Op::Rnm(RNM_OP),
            Op::Rnm(TRG_OP),
            Op::Rnm(TBS_OP),
            Op::Rnm(ABG_OP),
            Op::Rnm(AEN_OP),
            Op::Rnm(BKR_OP),
            Op::Rnm(TLS_OP),
            Op::Rnm(CLS_OP),
            Op::Rnm(PROS_VAL),
        ],
    },
    // BasicElementError = 1*(%d33-40/%d42-46/%d48-92/%d94-126)
    RuleDef {
        name: "BasicElementError",
        opcodes: &[
            Op::Rep(1, None),
            Op::Alt(&[2, 3, 4, 5]),
            Op::Trg(33, 40),
            Op::Trg(42, 46),
            Op::Trg(48, 92),
            Op::Trg(94, 126),
        ],
    },
    // Group         = GroupOpen  Alternation (GroupClose / GroupError)
    RuleDef {
        name: "Group",
        opcodes: &[
            Op::Cat(&[1, 2, 3]),
            Op::Rnm(GROUP_OPEN),
            Op::Rnm(ALTERNATION),
            Op::Alt(&[4, 5]),
            Op::Rnm(GROUP_CLOSE),
            Op::Rnm(GROUP_ERROR),
        ],
    },
    // GroupError    = 1*(%d33-40/%d42-46/%d48-92/%d94-126) ; same as BasicElementError
    RuleDef {
        name: "GroupError",
        opcodes: &[
            Op::Rep(1, None),
            Op::Alt(&[2, 3, 4, 5]),
            Op::Trg(33, 40),
            Op::Trg(42, 46),
            Op::Trg(48, 92),
            Op::Trg(94, 126),
        ],
    },
    // GroupOpen     = %d40 owsp
    RuleDef {
        name: "GroupOpen",
        opcodes: &[
            Op::Cat(&[1, 2]),
            Op::Tbs(&[40]),
            Op::Rnm(OWSP),
        ],
    },
    // GroupClose    = owsp %d41
    RuleDef {
        name: "GroupClose",
        opcodes: &[
            Op::Cat(&[1, 2]),
            Op::Rnm(OWSP),
            Op::Tbs(&[41]),
        ],
    },
    // Option        = OptionOpen Alternation (OptionClose / OptionError)
    RuleDef {
        name: "Option",
        opcodes: &[
            Op::Cat(&[1, 2, 3]),
            Op::Rnm(OPTION_OPEN),
            Op::Rnm(ALTERNATION),
            Op::Alt(&[4, 5]),
            Op::Rnm(OPTION_CLOSE),
            Op::Rnm(OPTION_ERROR),
        ],
    },
    // OptionError   = 1*(%d33-40/%d42-46/%d48-92/%d94-126) ; same as BasicElementError
    RuleDef {
        name: "OptionError",
        opcodes: &[
            Op::Rep(1, None),
            Op::Alt(&[2, 3, 4, 5]),
            Op::Trg(33, 40),
            Op::Trg(42, 46),
            Op::Trg(48, 92),
            Op::Trg(94, 126),
        ],
    },
    // OptionOpen    = %d91 owsp
    RuleDef {
        name: "OptionOpen",
        opcodes: &[
            Op::Cat(&[1, 2]),
            Op::Tbs(&[91]),
            Op::Rnm(OWSP),
        ],
    },
    // OptionClose   = owsp %d93
    RuleDef {
        name: "OptionClose",
        opcodes: &[
            Op::Cat(&[1, 2]),
            Op::Rnm(OWSP),
            Op::Tbs(&[93]),
        ],
    },
    // RnmOp         = alphanum
    RuleDef {
        name: "RnmOp",
        opcodes: &[
            Op::Rnm(ALPHANUM),
        ],
    },
    // UdtOp         = udt-empty / udt-non-empty
    RuleDef {
        name: "UdtOp",
        opcodes: &[
            Op::Alt(&[1, 2]),
            Op::Rnm(UDT_EMPTY),
            Op::Rnm(UDT_NON_EMPTY),
        ],
    },
    // udt-non-empty = %d117.95 alphanum
    RuleDef {
        name: "udt-non-empty",
        opcodes: &[
            Op::Cat(&[1, 2]),
            Op::Tbs(&[117, 95]),
            Op::Rnm(ALPHANUM),
        ],
    },
    // udt-empty     = %d101.95 alphanum
    RuleDef {
        name: "udt-empty",
        opcodes: &[
            Op::Cat(&[1, 2]),
            Op::Tbs(&[101, 95]),
            Op::Rnm(ALPHANUM),
        ],
    },
    // RepOp         = (rep-min StarOp rep-max) /
    //                 (rep-min StarOp)         /
    //                 (StarOp rep-max)         /
    //                  StarOp                  /
    //                  rep-min-max
    RuleDef {
        name: "RepOp",
        opcodes: &[
            Op::Alt(&[1, 5, 8, 11, 12]),
            Op::Cat(&[2, 3, 4]),
            Op::Rnm(REP_MIN),
            Op::Rnm(STAR_OP),
            Op::Rnm(REP_MAX),
            Op::Cat(&[6, 7]),
            Op::Rnm(REP_MIN),
            Op::Rnm(STAR_OP),
            Op::Cat(&[9, 10]),
            Op::Rnm(STAR_OP),
            Op::Rnm(REP_MAX),
            Op::Rnm(STAR_OP),
            Op::Rnm(REP_MIN_MAX),
        ],
    },
    // AltOp         = %d47 owsp
    RuleDef {
        name: "AltOp",
        opcodes: &[
            Op::Cat(&[1, 2]),
            Op::Tbs(&[47]),
            Op::Rnm(OWSP),
        ],
    },
    // CatOp         = wsp
    RuleDef {
        name: "CatOp",
        opcodes: &[
            Op::Rnm(WSP),
        ],
    },
    // StarOp        = %d42
    RuleDef {
        name: "StarOp",
        opcodes: &[
            Op::Tbs(&[42]),
        ],
    },
    // AndOp         = %d38
    RuleDef {
        name: "AndOp",
        opcodes: &[
            Op::Tbs(&[38]),
        ],
    },
    // NotOp         = %d33
    RuleDef {
        name: "NotOp",
        opcodes: &[
            Op::Tbs(&[33]),
        ],
    },
    // TrgOp         = %d37 ((Dec dmin %d45 dmax) / (Hex xmin %d45 xmax) / (Bin bmin %d45 bmax))
    RuleDef {
        name: "TrgOp",
        opcodes: &[
            Op::Cat(&[1, 2]),
            Op::Tbs(&[37]),
            Op::Alt(&[3, 8, 13]),
            Op::Cat(&[4, 5, 6, 7]),
            Op::Rnm(DEC),
            Op::Rnm(DMIN),
            Op::Tbs(&[45]),
            Op::Rnm(DMAX),
            Op::Cat(&[9, 10, 11, 12]),
            Op::Rnm(HEX),
            Op::Rnm(XMIN),
            Op::Tbs(&[45]),
            Op::Rnm(XMAX),
            Op::Cat(&[14, 15, 16, 17]),
            Op::Rnm(BIN),
            Op::Rnm(BMIN),
            Op::Tbs(&[45]),
            Op::Rnm(BMAX),
        ],
    },
    // TbsOp         = %d37 ((Dec dString *(%d46 dString)) / (Hex xString *(%d46 xString)) / (Bin bString *(%d46 bString)))
    RuleDef {
        name: "TbsOp",
        opcodes: &[
            Op::Cat(&[1, 2]),
            Op::Tbs(&[37]),
            Op::Alt(&[3, 10, 17]),
            Op::Cat(&[4, 5, 6]),
            Op::Rnm(DEC),
            Op::Rnm(D_STRING),
            Op::Rep(0, None),
            Op::Cat(&[8, 9]),
            Op::Tbs(&[46]),
            Op::Rnm(D_STRING),
            Op::Cat(&[11, 12, 13]),
            Op::Rnm(HEX),
            Op::Rnm(X_STRING),
            Op::Rep(0, None),
            Op::Cat(&[15, 16]),
            Op::Tbs(&[46]),
            Op::Rnm(X_STRING),
            Op::Cat(&[18, 19, 20]),
            Op::Rnm(BIN),
            Op::Rnm(B_STRING),
            Op::Rep(0, None),
            Op::Cat(&[22, 23]),
            Op::Tbs(&[46]),
            Op::Rnm(B_STRING),
        ],
    },
    // TlsOp         = TlsOpen TlsString TlsClose
    RuleDef {
        name: "TlsOp",
        opcodes: &[
            Op::Cat(&[1, 2, 3]),
            Op::Rnm(TLS_OPEN),
            Op::Rnm(TLS_STRING),
            Op::Rnm(TLS_CLOSE),
        ],
    },
    // TlsOpen       = %d34
    RuleDef {
        name: "TlsOpen",
        opcodes: &[
            Op::Tbs(&[34]),
        ],
    },
    // TlsClose      = %d34
    RuleDef {
        name: "TlsClose",
        opcodes: &[
            Op::Tbs(&[34]),
        ],
    },
    // TlsString     = *(%d32-33/%d35-126/StringTab)
    RuleDef {
        name: "TlsString",
        opcodes: &[
            Op::Rep(0, None),
            Op::Alt(&[2, 3, 4]),
            Op::Trg(32, 33),
            Op::Trg(35, 126),
            Op::Rnm(STRING_TAB),
        ],
    },
    // StringTab     = %d9
    RuleDef {
        name: "StringTab",
        opcodes: &[
            Op::Tbs(&[9]),
        ],
    },
    // ClsOp         = ClsOpen ClsString ClsClose
    RuleDef {
        name: "ClsOp",
        opcodes: &[
            Op::Cat(&[1, 2, 3]),
            Op::Rnm(CLS_OPEN),
            Op::Rnm(CLS_STRING),
            Op::Rnm(CLS_CLOSE),
        ],
    },
    // ClsOpen       = %d39
    RuleDef {
        name: "ClsOpen",
        opcodes: &[
            Op::Tbs(&[39]),
        ],
    },
    // ClsClose      = %d39
    RuleDef {
        name: "ClsClose",
        opcodes: &[
            Op::Tbs(&[39]),
        ],
    },
    // ClsString     = *(%d32-38/%d40-126/StringTab)
    RuleDef {
        name: "ClsString",
        opcodes: &[
            Op::Rep(0, None),
            Op::Alt(&[2, 3, 4]),
            Op::Trg(32, 38),
            Op::Trg(40, 126),
            Op::Rnm(STRING_TAB),
        ],
    },
    // ProsVal       = ProsValOpen ProsValString ProsValClose
    RuleDef {
        name: "ProsVal",
        opcodes: &[
            Op::Cat(&[1, 2, 3]),
            Op::Rnm(PROS_VAL_OPEN),
            Op::Rnm(PROS_VAL_STRING),
            Op::Rnm(PROS_VAL_CLOSE),
        ],
    },
    // ProsValOpen   = %d60
    RuleDef {
        name: "ProsValOpen",
        opcodes: &[
            Op::Tbs(&[60]),
        ],
    },
    // ProsValString = *(%d32-61/%d63-126/StringTab)
    RuleDef {
        name: "ProsValString",
        opcodes: &[
            Op::Rep(0, None),
            Op::Alt(&[2, 3, 4]),
            Op::Trg(32, 61),
            Op::Trg(63, 126),
            Op::Rnm(STRING_TAB),
        ],
    },
    // ProsValClose  = %d62
    RuleDef {
        name: "ProsValClose",
        opcodes: &[
            Op::Tbs(&[62]),
        ],
    },
    // rep-min       = rep-num
    RuleDef {
        name: "rep-min",
        opcodes: &[
            Op::Rnm(REP_NUM),
        ],
    },
    // rep-min-max   = rep-num
    RuleDef {
        name: "rep-min-max",
        opcodes: &[
            Op::Rnm(REP_NUM),
        ],
    },
    // rep-max       = rep-num
    RuleDef {
        name: "rep-max",
        opcodes: &[
            Op::Rnm(REP_NUM),
        ],
    },
    // rep-num       = 1*(%d48-57)
    RuleDef {
        name: "rep-num",
        opcodes: &[
            Op::Rep(1, None),
            Op::Trg(48, 57),
        ],
    },
    // dString       = dnum
    RuleDef {
        name: "dString",
        opcodes: &[
            Op::Rnm(DNUM),
        ],
    },
    // xString       = xnum
    RuleDef {
        name: "xString",
        opcodes: &[
            Op::Rnm(XNUM),
        ],
    },
    // bString       = bnum
    RuleDef {
        name: "bString",
        opcodes: &[
            Op::Rnm(BNUM),
        ],
    },
    // Dec           = (%d68/%d100)
    RuleDef {
        name: "Dec",
        opcodes: &[
            Op::Alt(&[1, 2]),
            Op::Tbs(&[68]),
            Op::Tbs(&[100]),
        ],
    },
    // Hex           = (%d88/%d120)
    RuleDef {
        name: "Hex",
        opcodes: &[
            Op::Alt(&[1, 2]),
            Op::Tbs(&[88]),
            Op::Tbs(&[120]),
        ],
    },
    // Bin           = (%d66/%d98)
    RuleDef {
        name: "Bin",
        opcodes: &[
            Op::Alt(&[1, 2]),
            Op::Tbs(&[66]),
            Op::Tbs(&[98]),
        ],
    },
    // dmin          = dnum
    RuleDef {
        name: "dmin",
        opcodes: &[
            Op::Rnm(DNUM),
        ],
    },
    // dmax          = dnum
    RuleDef {
        name: "dmax",
        opcodes: &[
            Op::Rnm(DNUM),
        ],
    },
    // bmin          = bnum
    RuleDef {
        name: "bmin",
        opcodes: &[
            Op::Rnm(BNUM),
        ],
    },
    // bmax          = bnum
    RuleDef {
        name: "bmax",
        opcodes: &[
            Op::Rnm(BNUM),
        ],
    },
    // xmin          = xnum
    RuleDef {
        name: "xmin",
        opcodes: &[
            Op::Rnm(XNUM),
        ],
    },
    // xmax          = xnum
    RuleDef {
        name: "xmax",
        opcodes: &[
            Op::Rnm(XNUM),
        ],
    },
    // dnum          = 1*(%d48-57)
    RuleDef {
        name: "dnum",
        opcodes: &[
            Op::Rep(1, None),
            Op::Trg(48, 57),
        ],
    },
    // bnum          = 1*%d48-49
    RuleDef {
        name: "bnum",
        opcodes: &[
            Op::Rep(1, None),
            Op::Trg(48, 49),
        ],
    },
    // xnum          = 1*(%d48-57 / %d65-70 / %d97-102)
    RuleDef {
        name: "xnum",
        opcodes: &[
            Op::Rep(1, None),
            Op::Alt(&[2, 3, 4]),
            Op::Trg(48, 57),
            Op::Trg(65, 70),
            Op::Trg(97, 102),
        ],
    },
    // alphanum      = (%d97-122/%d65-90) *(%d97-122/%d65-90/%d48-57/%d45)
    RuleDef {
        name: "alphanum",
        opcodes: &[
            Op::Cat(&[1, 4]),
            Op::Alt(&[2, 3]),
            Op::Trg(97, 122),
            Op::Trg(65, 90),
            Op::Rep(0, None),
            Op::Alt(&[6, 7, 8, 9]),
            Op::Trg(97, 122),
            Op::Trg(65, 90),
            Op::Trg(48, 57),
            Op::Tbs(&[45]),
        ],
    },
    // owsp          = *space
    RuleDef {
        name: "owsp",
        opcodes: &[
            Op::Rep(0, None),
            Op::Rnm(SPACE),
        ],
    },
    // wsp           = 1*space
    RuleDef {
        name: "wsp",
        opcodes: &[
            Op::Rep(1, None),
            Op::Rnm(SPACE),
        ],
    },
    // space         = %d32 / %d9 / comment /  LineContinue
    RuleDef {
        name: "space",
        opcodes: &[
            Op::Alt(&[1, 2, 3, 4]),
            Op::Tbs(&[32]),
            Op::Tbs(&[9]),
            Op::Rnm(COMMENT),
            Op::Rnm(LINE_CONTINUE),
        ],
    },
    // comment       = %d59 *(%d32-126 / %d9)
    RuleDef {
        name: "comment",
        opcodes: &[
            Op::Cat(&[1, 2]),
            Op::Tbs(&[59]),
            Op::Rep(0, None),
            Op::Alt(&[4, 5]),
            Op::Trg(32, 126),
            Op::Tbs(&[9]),
        ],
    },
    // LineEnd       = %d13.10 / %d10 / %d13
    RuleDef {
        name: "LineEnd",
        opcodes: &[
            Op::Alt(&[1, 2, 3]),
            Op::Tbs(&[13, 10]),
            Op::Tbs(&[10]),
            Op::Tbs(&[13]),
        ],
    },
    // LineContinue  = (%d13.10 / %d10 / %d13) (%d32 / %d9)
    RuleDef {
        name: "LineContinue",
        opcodes: &[
            Op::Cat(&[1, 5]),
            Op::Alt(&[2, 3, 4]),
            Op::Tbs(&[13, 10]),
            Op::Tbs(&[10]),
            Op::Tbs(&[13]),
            Op::Alt(&[6, 7]),
            Op::Tbs(&[32]),
            Op::Tbs(&[9]),
        ],
    },
    // BkaOp         = %d38.38
    RuleDef {
        name: "BkaOp",
        opcodes: &[
            Op::Tbs(&[38, 38]),
        ],
    },
    // BknOp         = %d33.33
    RuleDef {
        name: "BknOp",
        opcodes: &[
            Op::Tbs(&[33, 33]),
        ],
    },
    // AbgOp         = %d37.94
    RuleDef {
        name: "AbgOp",
        opcodes: &[
            Op::Tbs(&[37, 94]),
        ],
    },
    // AenOp         = %d37.36
    RuleDef {
        name: "AenOp",
        opcodes: &[
            Op::Tbs(&[37, 36]),
        ],
    },
    // BkrOp         = %d92 [bkr-modifier] bkr-name
    RuleDef {
        name: "BkrOp",
        opcodes: &[
            Op::Cat(&[1, 2, 4]),
            Op::Tbs(&[92]),
            Op::Rep(0, Some(1)),
            Op::Rnm(BKR_MODIFIER),
            Op::Rnm(BKR_NAME),
        ],
    },
    // bkr-modifier  = %d37 (bkr-ci / bkr-cs)
    RuleDef {
        name: "bkr-modifier",
        opcodes: &[
            Op::Cat(&[1, 2]),
            Op::Tbs(&[37]),
            Op::Alt(&[3, 4]),
            Op::Rnm(BKR_CI),
            Op::Rnm(BKR_CS),
        ],
    },
    // bkr-ci        = %d105 / %d73
    RuleDef {
        name: "bkr-ci",
        opcodes: &[
            Op::Alt(&[1, 2]),
            Op::Tbs(&[105]),
            Op::Tbs(&[73]),
        ],
    },
    // bkr-cs        = %d115 / %d83
    RuleDef {
        name: "bkr-cs",
        opcodes: &[
            Op::Alt(&[1, 2]),
            Op::Tbs(&[115]),
            Op::Tbs(&[83]),
        ],
    },
    // bkr-name      = [%d117.95 / %d101.95] alphanum
    RuleDef {
        name: "bkr-name",
        opcodes: &[
            Op::Cat(&[1, 5]),
            Op::Rep(0, Some(1)),
            Op::Alt(&[3, 4]),
            Op::Tbs(&[117, 95]),
            Op::Tbs(&[101, 95]),
            Op::Rnm(ALPHANUM),
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_indices_are_in_range() {
        for rule in rules() {
            let len = rule.opcodes.len();
            for (i, op) in rule.opcodes.iter().enumerate() {
                match op {
                    Opcode::Alt { children } | Opcode::Cat { children } => {
                        assert!(!children.is_empty(), "{}: empty child list", rule.name);
                        for &child in children {
                            assert!(child > i && child < len, "{}: child {child}", rule.name);
                        }
                    }
                    Opcode::Rep { .. } => assert!(i + 1 < len, "{}: dangling REP", rule.name),
                    Opcode::Rnm { index } => assert!(*index < RULE_COUNT, "{}", rule.name),
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn names_are_unique_and_match_constants() {
        let rules = rules();
        let names: HashSet<_> = rules.iter().map(|r| r.lower.as_str()).collect();
        assert_eq!(names.len(), RULE_COUNT);
        assert_eq!(rules[FILE].name, "File");
        assert_eq!(rules[REPETITION].name, "Repetition");
        assert_eq!(rules[UDT_EMPTY].name, "udt-empty");
        assert_eq!(rules[LINE_CONTINUE].name, "LineContinue");
        assert_eq!(rules[BKR_NAME].name, "bkr-name");
        assert!(rules.iter().enumerate().all(|(i, r)| r.index == i));
    }
}
