use std::fmt;

/// A JtR character class as used by the class-based primitive forms
///
/// Lower-case codes select the class, upper-case codes its complement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharClass {
    code: u8,
    negated: bool,
}

const VOWELS: &[u8] = b"aeiouAEIOU";
const PUNCTUATION: &[u8] = b".,:;'\"?!`";
const SYMBOLS: &[u8] = b"$%^&*()-_+=|\\<>[]{}#@/~";

impl CharClass {
    /// Look up a class by its code character (`v`, `D`, ...)
    pub fn from_code(code: char) -> Option<Self> {
        if !code.is_ascii_alphabetic() {
            return None;
        }
        let lower = code.to_ascii_lowercase() as u8;
        if !b"vcwpsludaxozb".contains(&lower) {
            return None;
        }
        Some(Self {
            code: lower,
            negated: code.is_ascii_uppercase(),
        })
    }

    pub fn code(&self) -> char {
        if self.negated {
            self.code.to_ascii_uppercase() as char
        } else {
            self.code as char
        }
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn contains(&self, byte: u8) -> bool {
        let member = match self.code {
            b'v' => VOWELS.contains(&byte),
            b'c' => byte.is_ascii_alphabetic() && !VOWELS.contains(&byte),
            b'w' => byte == b' ' || byte == b'\t',
            b'p' => PUNCTUATION.contains(&byte),
            b's' => SYMBOLS.contains(&byte),
            b'l' => byte.is_ascii_lowercase(),
            b'u' => byte.is_ascii_uppercase(),
            b'd' => byte.is_ascii_digit(),
            b'a' => byte.is_ascii_alphabetic(),
            b'x' => byte.is_ascii_alphanumeric(),
            b'o' => byte < 0x20 || byte == 0x7f,
            b'z' => true,
            b'b' => byte >= 0x80,
            _ => false,
        };
        member != self.negated
    }
}

impl fmt::Display for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.code())
    }
}

/// One elemental operation of a mangling rule
///
/// Positions are the single-character `0-9A-Z` positions of the rule
/// language, already decoded to `0..=35`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Noop,
    Lowercase,
    Uppercase,
    Capitalize,
    InvertCapitalize,
    ToggleCase,
    ToggleAt(usize),
    Reverse,
    Duplicate,
    DuplicateN(usize),
    Reflect,
    RotateLeft,
    RotateRight,
    Append(u8),
    Prepend(u8),
    DeleteFirst,
    DeleteLast,
    DeleteAt(usize),
    Extract(usize, usize),
    Omit(usize, usize),
    InsertAt(usize, u8),
    OverwriteAt(usize, u8),
    Truncate(usize),
    Replace(u8, u8),
    Purge(u8),
    DuplicateFirst(usize),
    DuplicateLast(usize),
    DuplicateAll,
    SwapFront,
    SwapBack,
    SwapAt(usize, usize),
    BitShiftLeft(usize),
    BitShiftRight(usize),
    Increment(usize),
    Decrement(usize),
    ReplaceWithNext(usize),
    ReplaceWithPrior(usize),
    DuplicateBlockFront(usize),
    DuplicateBlockBack(usize),
    TitleCase,
    TitleCaseSeparator(u8),
    ToggleAfterNth(usize, u8),
    Memorize,
    AppendMemory,
    PrependMemory,
    /// `XNMI`: insert `M` bytes of memory starting at `N` into position `I`
    InsertMemory(usize, usize, usize),
    RejectLess(usize),
    RejectGreater(usize),
    RejectUnlessLength(usize),
    RejectContains(u8),
    RejectNotContains(u8),
    RejectUnlessFirst(u8),
    RejectUnlessLast(u8),
    RejectUnlessAt(usize, u8),
    RejectUnlessCount(usize, u8),
    RejectEqualsMemory,
    /// JtR `S`: shift case, as the shift key would (`a` -> `A`, `1` -> `!`)
    ShiftCase,
    /// JtR `V`: lower-case vowels, upper-case consonants
    VowelCase,
    PastTense,
    Gerund,
    ReplaceClass(CharClass, u8),
    PurgeClass(CharClass),
    RejectContainsClass(CharClass),
    RejectNotContainsClass(CharClass),
    RejectUnlessFirstClass(CharClass),
    RejectUnlessLastClass(CharClass),
    RejectUnlessAtClass(usize, CharClass),
    RejectUnlessCountClass(usize, CharClass),
    /// Opcode outside the supported language; `rest` keeps the unparsed tail
    Unsupported { opcode: char, rest: String },
}

impl PrimitiveKind {
    /// The command character that introduces this primitive
    pub fn opcode(&self) -> char {
        use PrimitiveKind::*;
        match self {
            Noop => ':',
            Lowercase => 'l',
            Uppercase => 'u',
            Capitalize => 'c',
            InvertCapitalize => 'C',
            ToggleCase => 't',
            ToggleAt(_) => 'T',
            Reverse => 'r',
            Duplicate => 'd',
            DuplicateN(_) => 'p',
            Reflect => 'f',
            RotateLeft => '{',
            RotateRight => '}',
            Append(_) => '$',
            Prepend(_) => '^',
            DeleteFirst => '[',
            DeleteLast => ']',
            DeleteAt(_) => 'D',
            Extract(..) => 'x',
            Omit(..) => 'O',
            InsertAt(..) => 'i',
            OverwriteAt(..) => 'o',
            Truncate(_) => '\'',
            Replace(..) | ReplaceClass(..) => 's',
            Purge(_) | PurgeClass(_) => '@',
            DuplicateFirst(_) => 'z',
            DuplicateLast(_) => 'Z',
            DuplicateAll => 'q',
            SwapFront => 'k',
            SwapBack => 'K',
            SwapAt(..) => '*',
            BitShiftLeft(_) => 'L',
            BitShiftRight(_) => 'R',
            Increment(_) => '+',
            Decrement(_) => '-',
            ReplaceWithNext(_) => '.',
            ReplaceWithPrior(_) => ',',
            DuplicateBlockFront(_) => 'y',
            DuplicateBlockBack(_) => 'Y',
            TitleCase => 'E',
            TitleCaseSeparator(_) => 'e',
            ToggleAfterNth(..) => '3',
            Memorize => 'M',
            AppendMemory => '4',
            PrependMemory => '6',
            InsertMemory(..) => 'X',
            RejectLess(_) => '<',
            RejectGreater(_) => '>',
            RejectUnlessLength(_) => '_',
            RejectContains(_) | RejectContainsClass(_) => '!',
            RejectNotContains(_) | RejectNotContainsClass(_) => '/',
            RejectUnlessFirst(_) | RejectUnlessFirstClass(_) => '(',
            RejectUnlessLast(_) | RejectUnlessLastClass(_) => ')',
            RejectUnlessAt(..) | RejectUnlessAtClass(..) => '=',
            RejectUnlessCount(..) | RejectUnlessCountClass(..) => '%',
            RejectEqualsMemory => 'Q',
            ShiftCase => 'S',
            VowelCase => 'V',
            PastTense => 'P',
            Gerund => 'I',
            Unsupported { opcode, .. } => *opcode,
        }
    }

    /// Primitives that splice saved memory back into the word
    pub fn is_memory_restore(&self) -> bool {
        matches!(
            self,
            PrimitiveKind::AppendMemory
                | PrimitiveKind::PrependMemory
                | PrimitiveKind::InsertMemory(..)
        )
    }

    pub fn is_case_shift(&self) -> bool {
        matches!(self, PrimitiveKind::ShiftCase)
    }

    /// Class-based forms that only exist with the regex extension
    pub fn is_class_form(&self) -> bool {
        use PrimitiveKind::*;
        matches!(
            self,
            ReplaceClass(..)
                | PurgeClass(_)
                | RejectContainsClass(_)
                | RejectNotContainsClass(_)
                | RejectUnlessFirstClass(_)
                | RejectUnlessLastClass(_)
                | RejectUnlessAtClass(..)
                | RejectUnlessCountClass(..)
        )
    }

    /// Primitives that may drop the word instead of transforming it
    pub fn is_rejection(&self) -> bool {
        use PrimitiveKind::*;
        matches!(
            self,
            RejectLess(_)
                | RejectGreater(_)
                | RejectUnlessLength(_)
                | RejectContains(_)
                | RejectNotContains(_)
                | RejectUnlessFirst(_)
                | RejectUnlessLast(_)
                | RejectUnlessAt(..)
                | RejectUnlessCount(..)
                | RejectEqualsMemory
                | RejectContainsClass(_)
                | RejectNotContainsClass(_)
                | RejectUnlessFirstClass(_)
                | RejectUnlessLastClass(_)
                | RejectUnlessAtClass(..)
                | RejectUnlessCountClass(..)
        )
    }

    /// Rejections that scan the whole word rather than fixed positions
    pub fn is_word_scan(&self) -> bool {
        use PrimitiveKind::*;
        matches!(
            self,
            RejectContains(_)
                | RejectNotContains(_)
                | RejectUnlessCount(..)
                | RejectContainsClass(_)
                | RejectNotContainsClass(_)
                | RejectUnlessCountClass(..)
        )
    }

    /// Rejections decided by the word length alone
    pub fn is_length_rejection(&self) -> bool {
        matches!(
            self,
            PrimitiveKind::RejectLess(_)
                | PrimitiveKind::RejectGreater(_)
                | PrimitiveKind::RejectUnlessLength(_)
        )
    }
}

/// Encode a position as its rule-language character
pub fn position_char(position: usize) -> char {
    match position {
        0..=9 => (b'0' + position as u8) as char,
        10..=35 => (b'A' + (position - 10) as u8) as char,
        _ => '?',
    }
}

/// Decode a rule-language position character
pub fn decode_position(c: char) -> Option<usize> {
    match c {
        '0'..='9' => Some(c as usize - '0' as usize),
        'A'..='Z' => Some(c as usize - 'A' as usize + 10),
        _ => None,
    }
}

struct ByteArg(u8);

impl fmt::Display for ByteArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            b'\\' => write!(f, "\\x5c"),
            0x20..=0x7e => write!(f, "{}", self.0 as char),
            other => write!(f, "\\x{:02x}", other),
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use PrimitiveKind::*;
        let op = self.opcode();
        let p = position_char;
        match self {
            ToggleAt(n) | DuplicateN(n) | DeleteAt(n) | Truncate(n) | DuplicateFirst(n)
            | DuplicateLast(n) | BitShiftLeft(n) | BitShiftRight(n) | Increment(n)
            | Decrement(n) | ReplaceWithNext(n) | ReplaceWithPrior(n)
            | DuplicateBlockFront(n) | DuplicateBlockBack(n) | RejectLess(n)
            | RejectGreater(n) | RejectUnlessLength(n) => write!(f, "{}{}", op, p(*n)),
            Extract(n, m) | Omit(n, m) | SwapAt(n, m) => {
                write!(f, "{}{}{}", op, p(*n), p(*m))
            }
            Append(b) | Prepend(b) | Purge(b) | TitleCaseSeparator(b) | RejectContains(b)
            | RejectNotContains(b) | RejectUnlessFirst(b) | RejectUnlessLast(b) => {
                write!(f, "{}{}", op, ByteArg(*b))
            }
            InsertAt(n, b) | OverwriteAt(n, b) | ToggleAfterNth(n, b) | RejectUnlessAt(n, b)
            | RejectUnlessCount(n, b) => write!(f, "{}{}{}", op, p(*n), ByteArg(*b)),
            Replace(x, y) => write!(f, "{}{}{}", op, ByteArg(*x), ByteArg(*y)),
            InsertMemory(n, m, i) => write!(f, "{}{}{}{}", op, p(*n), p(*m), p(*i)),
            ReplaceClass(class, b) => write!(f, "{}{}{}", op, class, ByteArg(*b)),
            PurgeClass(class)
            | RejectContainsClass(class)
            | RejectNotContainsClass(class)
            | RejectUnlessFirstClass(class)
            | RejectUnlessLastClass(class) => write!(f, "{}{}", op, class),
            RejectUnlessAtClass(n, class) | RejectUnlessCountClass(n, class) => {
                write!(f, "{}{}{}", op, p(*n), class)
            }
            Unsupported { opcode, rest } => write!(f, "{}{}", opcode, rest),
            _ => write!(f, "{}", op),
        }
    }
}
