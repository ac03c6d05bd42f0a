//! YAML syntax errors.
//!
//! Provides byte offsets and line numbers so callers can point at the
//! offending text.

use core::fmt;

/// Errors that can occur while scanning YAML text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YamlError {
    /// A line is indented deeper than its parent allows.
    InvalidIndentation {
        /// Line number (1-indexed)
        line: usize,
        /// Expected indentation level
        expected: usize,
        /// Actual indentation level found
        found: usize,
    },

    /// Tab character used for indentation (YAML forbids tabs).
    TabIndentation {
        /// Line number where tab was found
        line: usize,
        /// Byte offset in input
        offset: usize,
    },

    /// Unexpected character in the given context.
    UnexpectedCharacter {
        /// Byte offset in input
        offset: usize,
        /// The unexpected character
        char: char,
        /// Description of what was expected
        context: &'static str,
    },

    /// Unclosed quote in a string.
    UnclosedQuote {
        /// Byte offset where the quote started
        start_offset: usize,
        /// The quote character (" or ')
        quote_type: char,
    },

    /// Invalid escape sequence in a double-quoted string.
    InvalidEscape {
        /// Byte offset of the backslash
        offset: usize,
        /// The invalid escape sequence
        sequence: String,
    },

    /// Block scalar indicators (`|`, `>`).
    BlockScalarNotSupported {
        /// Byte offset of the indicator
        offset: usize,
    },

    /// Explicit key (`?`) not supported.
    ExplicitKeyNotSupported {
        /// Byte offset of the `?`
        offset: usize,
    },

    /// Empty tag or anchor name.
    EmptyProperty {
        /// Byte offset of the `!`, `&` or `*`
        offset: usize,
    },

    /// Key without value in mapping.
    KeyWithoutValue {
        /// Byte offset where key starts
        offset: usize,
        /// Line number
        line: usize,
    },

    /// Content after the root node of a document.
    TrailingContent {
        /// Byte offset of the extra content
        offset: usize,
        /// Line number
        line: usize,
    },

    /// Unexpected end of input.
    UnexpectedEof {
        /// What was expected
        context: &'static str,
    },
}

impl fmt::Display for YamlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YamlError::InvalidIndentation {
                line,
                expected,
                found,
            } => {
                write!(
                    f,
                    "invalid indentation at line {}: expected {} spaces, found {}",
                    line, expected, found
                )
            }
            YamlError::TabIndentation { line, offset } => {
                write!(
                    f,
                    "tab character used for indentation at line {} (offset {})",
                    line, offset
                )
            }
            YamlError::UnexpectedCharacter {
                offset,
                char,
                context,
            } => {
                write!(
                    f,
                    "unexpected character '{}' at offset {}: {}",
                    char, offset, context
                )
            }
            YamlError::UnclosedQuote {
                start_offset,
                quote_type,
            } => {
                write!(
                    f,
                    "unclosed {} quote starting at offset {}",
                    if *quote_type == '"' {
                        "double"
                    } else {
                        "single"
                    },
                    start_offset
                )
            }
            YamlError::InvalidEscape { offset, sequence } => {
                write!(
                    f,
                    "invalid escape sequence '{}' at offset {}",
                    sequence, offset
                )
            }
            YamlError::BlockScalarNotSupported { offset } => {
                write!(f, "block scalars (| or >) not supported at offset {}", offset)
            }
            YamlError::ExplicitKeyNotSupported { offset } => {
                write!(f, "explicit keys (?) not supported at offset {}", offset)
            }
            YamlError::EmptyProperty { offset } => {
                write!(f, "empty tag or anchor name at offset {}", offset)
            }
            YamlError::KeyWithoutValue { offset, line } => {
                write!(f, "key without value at line {} (offset {})", line, offset)
            }
            YamlError::TrailingContent { offset, line } => {
                write!(
                    f,
                    "unexpected content after document root at line {} (offset {})",
                    line, offset
                )
            }
            YamlError::UnexpectedEof { context } => {
                write!(f, "unexpected end of input: {}", context)
            }
        }
    }
}

impl std::error::Error for YamlError {}
