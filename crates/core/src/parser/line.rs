//! Line tokenization and control-operator splitting

/// A raw input line together with the words it was split into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    raw: String,
    words: Vec<String>,
}

impl ParsedLine {
    pub fn new(raw: impl Into<String>, words: Vec<String>) -> Self {
        Self {
            raw: raw.into(),
            words,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn first_word(&self) -> Option<&str> {
        self.words.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Raw text following the first word, with leading whitespace trimmed.
    ///
    /// Quoting in the remainder is left untouched so commands that disable
    /// parsing see exactly what the user typed.
    pub fn remainder(&self) -> &str {
        self.remainder_after(1)
    }

    /// Raw text following the first `count` words.
    pub fn remainder_after(&self, count: usize) -> &str {
        let mut rest = self.raw.trim_start();
        for _ in 0..count {
            let end = first_word_end(rest);
            rest = rest[end..].trim_start();
        }
        rest
    }
}

/// Splits a raw line into words.
pub trait LineTokenizer: Send + Sync {
    fn tokenize(&self, raw: &str) -> ParsedLine;
}

/// Whitespace tokenizer with shell-style quoting.
///
/// `'...'` is taken literally, `"..."` honours backslash escapes, and a
/// backslash outside quotes escapes the next character. An unterminated quote
/// runs to the end of the line.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTokenizer;

impl LineTokenizer for DefaultTokenizer {
    fn tokenize(&self, raw: &str) -> ParsedLine {
        let mut words = Vec::new();
        let mut current = String::new();
        let mut in_word = false;
        let mut quote: Option<char> = None;
        let mut chars = raw.chars();

        while let Some(c) = chars.next() {
            match (quote, c) {
                (Some('\''), '\'') => quote = None,
                (Some('"'), '"') => quote = None,
                (Some('"'), '\\') | (None, '\\') => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                    in_word = true;
                }
                (Some(_), c) => current.push(c),
                (None, '\'') | (None, '"') => {
                    quote = Some(c);
                    in_word = true;
                }
                (None, c) if c.is_whitespace() => {
                    if in_word {
                        words.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                (None, c) => {
                    current.push(c);
                    in_word = true;
                }
            }
        }

        if in_word {
            words.push(current);
        }

        ParsedLine::new(raw, words)
    }
}

/// Operator that terminated a command segment on the input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlOperator {
    /// Last segment of the line
    #[default]
    None,
    /// `;`
    End,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `|`
    Pipe,
}

impl ControlOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlOperator::None => "",
            ControlOperator::End => ";",
            ControlOperator::And => "&&",
            ControlOperator::Or => "||",
            ControlOperator::Pipe => "|",
        }
    }
}

/// One command segment of a line and the operator that followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub operator: ControlOperator,
}

/// Split a raw line on control operators, ignoring those inside quotes or escaped.
///
/// Empty segments are kept so the caller can decide how to report them.
pub fn split_operators(raw: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            current.push(c);
            if c == '\\' && q == '"' {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }

        let operator = match c {
            '\'' | '"' => {
                quote = Some(c);
                current.push(c);
                continue;
            }
            '\\' => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                continue;
            }
            ';' => ControlOperator::End,
            '&' if chars.peek() == Some(&'&') => {
                chars.next();
                ControlOperator::And
            }
            '|' if chars.peek() == Some(&'|') => {
                chars.next();
                ControlOperator::Or
            }
            '|' => ControlOperator::Pipe,
            _ => {
                current.push(c);
                continue;
            }
        };

        segments.push(Segment {
            text: std::mem::take(&mut current).trim().to_string(),
            operator,
        });
    }

    let tail = current.trim();
    if !tail.is_empty() || segments.is_empty() {
        segments.push(Segment {
            text: tail.to_string(),
            operator: ControlOperator::None,
        });
    }

    segments
}

fn first_word_end(text: &str) -> usize {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (_, '\\') if quote != Some('\'') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'') | (None, '"') => quote = Some(c),
            (None, c) if c.is_whitespace() => return i,
            _ => {}
        }
    }
    text.len()
}
