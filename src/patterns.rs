//! Regex fragments for first-person demographic self-disclosure, and the
//! functions that compose them into full rule patterns.
//!
//! Fragments are plain regex sources using non-capturing groups only, so they
//! can be concatenated freely. All patterns are compiled case-insensitively by
//! the extractor; fragments are written in lowercase.

/// Short self-reference used in front of a noun phrase: "i am", "i'm", "me being".
pub const SHORT_SELF: &str = r"(?:i am|i['’]m|me being)";

/// Broader self-reference used in front of shorthand: "i", "i'm (a)", "i am (a)",
/// "me", "my", "myself".
pub const SELF: &str = r"(?:i|(?:i['’]m|i am)(?: a)?|me|my|myself|my self)";

/// One optional filler word between article and noun ("a cool guy").
pub const FILLER_WORD: &str = r"(?:[!-~]* )?";

pub const MAN_NOUN: &str = r"(?:guy|man|boy|boyfriend|husband)";
pub const WOMAN_NOUN: &str = r"(?:woman|girl|gal|girlfriend|wife)";

pub const OPEN_BRACKET: &str = r"[(\[]";
pub const CLOSE_BRACKET: &str = r"[)\]]";

/// Leading boundary: a non-word char or the start of the text.
pub const BEGIN: &str = r"(?:[^\w]|^)";

/// Trailing boundary: a non-word char or the end of the text.
pub const END: &str = r"(?:[^\w]|$)";

/// Trailing boundary after a gender noun. Rejects hyphen continuations
/// ("a man-child") but accepts a dash used as punctuation ("a man - and").
pub const NOUN_END: &str = r"(?:[^\w-]|- |$)";

/// Unit word between an age and "old".
pub const AGE_UNIT: &str = r"(?:years?|yrs?)";

/// Words that make a following self-disclosure hypothetical ("if i'm 30 years old").
pub const HYPOTHETICAL_MARKERS: [&str; 3] = ["when", "if", "until"];

/// Single-letter gender code, as used in shorthand ("23f").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Code {
    Male,
    Female,
    Either,
}

impl Code {
    fn class(self) -> &'static str {
        match self {
            Code::Male => "m",
            Code::Female => "f",
            Code::Either => "[mf]",
        }
    }
}

/// Two digits and a code in either order, optionally separated by a space or a slash:
/// "23f", "f23", "23 f", "23/f".
pub fn shorthand_core(code: Code) -> String {
    let c = code.class();
    format!(r"(?:\d\d[ /]?{c}|{c}[ /]?\d\d)")
}

/// Two digits and a code with no space between them: "23f", "f23", "23/f".
pub fn tight_shorthand_core(code: Code) -> String {
    let c = code.class();
    format!(r"(?:\d\d/?{c}|{c}/?\d\d)")
}

/// "(23f)", " [f 23]"
pub fn bracketed_shorthand(code: Code) -> String {
    format!(" ?{OPEN_BRACKET}{}{CLOSE_BRACKET}", shorthand_core(code))
}

/// " 23 (f)", " 9[m]"
pub fn number_then_bracketed_code(code: Code) -> String {
    format!(r" (?:\d\d|\d) ?{OPEN_BRACKET}{}{CLOSE_BRACKET}", code.class())
}

/// "(f) 23", " [m]9"
pub fn bracketed_code_then_number(code: Code) -> String {
    format!(r" ?{OPEN_BRACKET}{}{CLOSE_BRACKET} ?(?:\d\d|\d)", code.class())
}

/// " 23f", " f 23"
pub fn bare_shorthand(code: Code) -> String {
    format!(" {}", shorthand_core(code))
}

/// The four shorthand shapes for one code, as a single alternation. Shapes carry
/// no trailing boundary; the rule that uses them appends `END` once.
pub fn shorthand(code: Code) -> String {
    format!(
        "(?:{}|{}|{}|{})",
        bracketed_shorthand(code),
        number_then_bracketed_code(code),
        bracketed_code_then_number(code),
        bare_shorthand(code),
    )
}

/// "a man", "a cool guy", "male", "a proud female".
pub fn noun_phrase(code: Code) -> String {
    let (noun, bare) = match code {
        Code::Male => (MAN_NOUN, "male"),
        Code::Female => (WOMAN_NOUN, "female"),
        Code::Either => {
            return format!("(?:{}|{})", noun_phrase(Code::Male), noun_phrase(Code::Female));
        }
    };
    format!("(?:a {FILLER_WORD}{noun}|(?:a {FILLER_WORD})?{bare})")
}

/// "i'm a cool guy"
pub fn self_noun_phrase_rule(code: Code) -> String {
    format!("{BEGIN}{SHORT_SELF} {}{NOUN_END}", noun_phrase(code))
}

/// "i'm 23f", "my (25f)"
pub fn self_shorthand_rule(code: Code) -> String {
    format!("{BEGIN}{SELF}{}{END}", shorthand(code))
}

/// Shorthand that opens the text, the "23M here" idiom. The poster is the implied subject.
/// Unbracketed forms must be contiguous, so "30 m away" is not read as a disclosure.
pub fn leading_shorthand_rule(code: Code) -> String {
    let bracketed = shorthand_core(code);
    let tight = tight_shorthand_core(code);
    format!(r"^\s*(?:{OPEN_BRACKET}{bracketed}{CLOSE_BRACKET}|{tight}){END}")
}

/// "i am 30 years old", "i'm a 23-year-old". Must be paired with the
/// not-hypothetical guard.
pub fn age_phrase_rule() -> String {
    format!(r"{BEGIN}(?:i am|i['’]m)(?: a)? \d\d+[ -](?:{AGE_UNIT}[ -])?old{END}")
}

/// Self-term followed by any of the eight shorthand shapes, male or female.
pub fn age_shorthand_rule() -> String {
    format!(
        "{BEGIN}{SELF} ?(?:{}|{}){END}",
        shorthand(Code::Male),
        shorthand(Code::Female)
    )
}
