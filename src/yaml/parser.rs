//! Recursive-descent YAML parser.
//!
//! Builds a [`YamlNode`] tree for the first document in the input.
//!
//! # Scope
//!
//! - Block mappings and sequences, including sequences at their key's
//!   indentation
//! - Flow mappings `{k: v}` and sequences `[a, b]`, nested and multi-line
//! - Plain, single-quoted and double-quoted scalars (with escapes and line
//!   folding)
//! - Comments, tags (`!h32`, `!!binary`), anchors and aliases
//! - `%` directives and `---` / `...` markers; later documents are ignored
//!
//! Block scalars (`|`, `>`), explicit keys (`?`) and tab indentation are
//! rejected with a [`YamlError`].

use std::borrow::Cow;

use super::error::YamlError;
use super::node::{ScalarStyle, YamlNode, YamlNodeKind};

/// Where a node appears, which decides what may start on its first line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    /// Document root or sequence item: a mapping or sequence may open on
    /// the same line.
    Block,
    /// Value after `key:`. A sequence may sit at the key's own indentation.
    MappingValue,
}

/// Parser state.
struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    line_start: usize,
}

#[inline]
fn is_blank_or_end(b: Option<u8>) -> bool {
    matches!(b, None | Some(b' ' | b'\t' | b'\n'))
}

#[inline]
fn is_flow_indicator(b: u8) -> bool {
    matches!(b, b',' | b'[' | b']' | b'{' | b'}')
}

/// Fill in properties read before a node's content.
fn attach(
    node: &mut YamlNode,
    tag: Option<String>,
    anchor: Option<String>,
    offset: usize,
) -> Result<(), YamlError> {
    if tag.is_some() {
        if node.tag.is_some() {
            return Err(YamlError::UnexpectedCharacter {
                offset,
                char: '!',
                context: "node already has a tag",
            });
        }
        node.tag = tag;
    }
    if anchor.is_some() {
        if node.anchor.is_some() {
            return Err(YamlError::UnexpectedCharacter {
                offset,
                char: '&',
                context: "node already has an anchor",
            });
        }
        node.anchor = anchor;
    }
    Ok(())
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            line: 1,
            line_start: 0,
        }
    }

    // =========================================================================
    // Cursor
    // =========================================================================

    /// Get current byte without advancing.
    #[inline]
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    /// Get byte at offset from current position.
    #[inline]
    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    /// Advance position by one byte.
    #[inline]
    fn advance(&mut self) {
        if self.pos < self.bytes.len() {
            if self.bytes[self.pos] == b'\n' {
                self.line += 1;
                self.line_start = self.pos + 1;
            }
            self.pos += 1;
        }
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    #[inline]
    fn column(&self) -> usize {
        self.pos - self.line_start
    }

    /// The character at the cursor, for error messages.
    fn current_char(&self) -> char {
        self.input
            .get(self.pos..)
            .and_then(|rest| rest.chars().next())
            .unwrap_or('\u{fffd}')
    }

    /// Skip spaces and tabs on the current line.
    fn skip_inline_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.advance();
        }
    }

    /// Count leading spaces (indentation) at start of a line.
    fn count_indent(&self) -> Result<usize, YamlError> {
        let mut count = 0;
        let mut i = self.pos;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b' ' => {
                    count += 1;
                    i += 1;
                }
                b'\t' => {
                    return Err(YamlError::TabIndentation {
                        line: self.line,
                        offset: i,
                    });
                }
                _ => break,
            }
        }
        Ok(count)
    }

    /// Check if at end of meaningful content on this line.
    fn at_line_end(&self) -> bool {
        let mut i = self.pos;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'\n' | b'#' => return true,
                b' ' | b'\t' => i += 1,
                _ => return false,
            }
        }
        true
    }

    /// Skip to end of line (handles comments).
    fn skip_to_eol(&mut self) {
        while let Some(b) = self.peek() {
            if b == b'\n' {
                break;
            }
            self.advance();
        }
    }

    /// Consume the rest of a line after a complete node.
    fn finish_line(&mut self) -> Result<(), YamlError> {
        self.skip_inline_whitespace();
        match self.peek() {
            None => Ok(()),
            Some(b'\n') => {
                self.advance();
                Ok(())
            }
            Some(b'#') => {
                self.skip_to_eol();
                self.advance();
                Ok(())
            }
            Some(_) => Err(YamlError::TrailingContent {
                offset: self.pos,
                line: self.line,
            }),
        }
    }

    /// Skip blank and comment-only lines, stopping at the start of the next
    /// content line.
    fn skip_blank_lines(&mut self) {
        loop {
            let start = self.pos;
            self.skip_inline_whitespace();
            match self.peek() {
                Some(b'\n') => self.advance(),
                Some(b'#') => self.skip_to_eol(),
                None => return,
                Some(_) => {
                    self.pos = start;
                    return;
                }
            }
        }
    }

    fn at_document_marker(&self) -> bool {
        let rest = &self.bytes[self.pos..];
        self.column() == 0
            && (rest.starts_with(b"---") || rest.starts_with(b"..."))
            && is_blank_or_end(self.peek_at(3))
    }

    /// Indentation of the content line at the cursor; `None` once the
    /// document is over.
    fn peek_line_indent(&self) -> Result<Option<usize>, YamlError> {
        if self.pos >= self.bytes.len() || self.at_document_marker() {
            return Ok(None);
        }
        self.count_indent().map(Some)
    }

    fn line_has_dash_at(&self, indent: usize) -> bool {
        self.bytes.get(self.pos + indent) == Some(&b'-')
            && is_blank_or_end(self.bytes.get(self.pos + indent + 1).copied())
    }

    // =========================================================================
    // Properties and scalars
    // =========================================================================

    /// Scan a tag, anchor or alias name up to the next separator.
    fn scan_name(&mut self, flow: bool) -> &'a str {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if matches!(b, b' ' | b'\t' | b'\n') || (flow && is_flow_indicator(b)) {
                break;
            }
            self.advance();
        }
        &self.input[start..self.pos]
    }

    /// Parse any `!tag` and `&anchor` in front of a node.
    fn parse_properties(
        &mut self,
        flow: bool,
    ) -> Result<(Option<String>, Option<String>), YamlError> {
        let mut tag: Option<String> = None;
        let mut anchor: Option<String> = None;
        loop {
            let offset = self.pos;
            match self.peek() {
                Some(b'!') => {
                    let name = if self.peek_at(1) == Some(b'<') {
                        // Verbatim tag: `!<...>`
                        while !matches!(self.peek(), None | Some(b'>' | b'\n')) {
                            self.advance();
                        }
                        self.advance();
                        &self.input[offset..self.pos]
                    } else {
                        self.scan_name(flow)
                    };
                    if name == "!" {
                        return Err(YamlError::EmptyProperty { offset });
                    }
                    if tag.is_some() {
                        return Err(YamlError::UnexpectedCharacter {
                            offset,
                            char: '!',
                            context: "node already has a tag",
                        });
                    }
                    tag = Some(name.to_owned());
                }
                Some(b'&') => {
                    self.advance();
                    let name = self.scan_name(flow);
                    if name.is_empty() {
                        return Err(YamlError::EmptyProperty { offset });
                    }
                    if anchor.is_some() {
                        return Err(YamlError::UnexpectedCharacter {
                            offset,
                            char: '&',
                            context: "node already has an anchor",
                        });
                    }
                    anchor = Some(name.to_owned());
                }
                _ => return Ok((tag, anchor)),
            }
            self.skip_inline_whitespace();
        }
    }

    fn parse_alias(&mut self, flow: bool) -> Result<YamlNode, YamlError> {
        let offset = self.pos;
        self.advance();
        let name = self.scan_name(flow);
        if name.is_empty() {
            return Err(YamlError::EmptyProperty { offset });
        }
        Ok(YamlNode::new(YamlNodeKind::Alias(name.to_owned()), offset))
    }

    /// Check if the `:` at the cursor separates a key from its value.
    fn at_value_indicator(&self, flow: bool) -> bool {
        self.peek() == Some(b':')
            && match self.peek_at(1) {
                None | Some(b' ' | b'\t' | b'\n') => true,
                Some(b',' | b']' | b'}') => flow,
                _ => false,
            }
    }

    /// Scan a plain scalar. Stops at a line break, a comment, a `: `
    /// separator and, in flow context, at flow indicators.
    fn scan_plain(&mut self, flow: bool) -> &'a str {
        let start = self.pos;
        while let Some(b) = self.peek() {
            let stop = match b {
                b'\n' => true,
                b'#' => self.pos > start && matches!(self.bytes[self.pos - 1], b' ' | b'\t'),
                b':' => self.at_value_indicator(flow),
                _ => flow && is_flow_indicator(b),
            };
            if stop {
                break;
            }
            self.advance();
        }
        self.input[start..self.pos].trim_end_matches([' ', '\t'])
    }

    /// Replace a line break inside a quoted scalar: one break folds to a
    /// space, each further empty line keeps a newline.
    fn fold_line_break(&mut self, out: &mut String) {
        let kept = out.trim_end_matches([' ', '\t']).len();
        out.truncate(kept);
        let mut breaks = 0;
        while self.peek() == Some(b'\n') {
            self.advance();
            breaks += 1;
            self.skip_inline_whitespace();
        }
        if breaks == 1 {
            out.push(' ');
        } else {
            for _ in 1..breaks {
                out.push('\n');
            }
        }
    }

    fn parse_hex_escape(&mut self, offset: usize, digits: usize) -> Result<char, YamlError> {
        let end = self.pos + digits;
        let invalid = || YamlError::InvalidEscape {
            offset,
            sequence: self
                .input
                .get(offset..end.min(self.bytes.len()))
                .unwrap_or("\\")
                .to_owned(),
        };
        let hex = self.input.get(self.pos..end).ok_or_else(invalid)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let ch = u32::from_str_radix(hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(invalid)?;
        self.advance_by(digits);
        Ok(ch)
    }

    /// Decode one escape sequence; the cursor is on the backslash.
    fn parse_escape(&mut self, out: &mut String) -> Result<(), YamlError> {
        let offset = self.pos;
        self.advance();
        let c = self.peek().ok_or(YamlError::UnexpectedEof {
            context: "escape sequence in string",
        })?;
        self.advance();
        let ch = match c {
            b'0' => '\0',
            b'a' => '\x07',
            b'b' => '\x08',
            b't' | b'\t' => '\t',
            b'n' => '\n',
            b'v' => '\x0b',
            b'f' => '\x0c',
            b'r' => '\r',
            b'e' => '\x1b',
            b' ' => ' ',
            b'"' => '"',
            b'/' => '/',
            b'\\' => '\\',
            b'N' => '\u{85}',
            b'_' => '\u{a0}',
            b'L' => '\u{2028}',
            b'P' => '\u{2029}',
            b'x' => self.parse_hex_escape(offset, 2)?,
            b'u' => self.parse_hex_escape(offset, 4)?,
            b'U' => self.parse_hex_escape(offset, 8)?,
            b'\n' => {
                // Escaped line break: joins the lines without a space.
                self.skip_inline_whitespace();
                return Ok(());
            }
            _ => {
                return Err(YamlError::InvalidEscape {
                    offset,
                    sequence: format!("\\{}", c as char),
                })
            }
        };
        out.push(ch);
        Ok(())
    }

    /// Parse a double-quoted string.
    fn parse_double_quoted(&mut self) -> Result<String, YamlError> {
        let start = self.pos;
        self.advance();
        let mut out = String::new();
        loop {
            let run = self.pos;
            while !matches!(self.peek(), None | Some(b'"' | b'\\' | b'\n')) {
                self.advance();
            }
            out.push_str(&self.input[run..self.pos]);
            match self.peek() {
                None => {
                    return Err(YamlError::UnclosedQuote {
                        start_offset: start,
                        quote_type: '"',
                    })
                }
                Some(b'"') => {
                    self.advance();
                    return Ok(out);
                }
                Some(b'\\') => self.parse_escape(&mut out)?,
                Some(_) => self.fold_line_break(&mut out),
            }
        }
    }

    /// Parse a single-quoted string (`''` is a literal quote).
    fn parse_single_quoted(&mut self) -> Result<String, YamlError> {
        let start = self.pos;
        self.advance();
        let mut out = String::new();
        loop {
            let run = self.pos;
            while !matches!(self.peek(), None | Some(b'\'' | b'\n')) {
                self.advance();
            }
            out.push_str(&self.input[run..self.pos]);
            match self.peek() {
                None => {
                    return Err(YamlError::UnclosedQuote {
                        start_offset: start,
                        quote_type: '\'',
                    })
                }
                Some(b'\'') if self.peek_at(1) == Some(b'\'') => {
                    out.push('\'');
                    self.advance_by(2);
                }
                Some(b'\'') => {
                    self.advance();
                    return Ok(out);
                }
                Some(_) => self.fold_line_break(&mut out),
            }
        }
    }

    fn parse_scalar(&mut self, flow: bool) -> Result<YamlNode, YamlError> {
        let offset = self.pos;
        Ok(match self.peek() {
            Some(b'"') => {
                YamlNode::scalar(self.parse_double_quoted()?, ScalarStyle::DoubleQuoted, offset)
            }
            Some(b'\'') => {
                YamlNode::scalar(self.parse_single_quoted()?, ScalarStyle::SingleQuoted, offset)
            }
            _ => YamlNode::scalar(self.scan_plain(flow).to_owned(), ScalarStyle::Plain, offset),
        })
    }

    // =========================================================================
    // Block structure
    // =========================================================================

    /// Parse the node starting at the cursor.
    ///
    /// `parent` is the indentation of the enclosing construct; content on
    /// following lines belongs to this node only when indented deeper.
    fn parse_node(&mut self, parent: isize, context: Context) -> Result<YamlNode, YamlError> {
        self.skip_inline_whitespace();
        let start = self.pos;
        let (tag, anchor) = self.parse_properties(false)?;

        if self.at_line_end() {
            self.finish_line()?;
            self.skip_blank_lines();
            if let Some(indent) = self.peek_line_indent()? {
                let deeper = indent as isize > parent;
                let compact = context == Context::MappingValue
                    && indent as isize == parent
                    && self.line_has_dash_at(indent);
                if deeper || compact {
                    self.advance_by(indent);
                    let mut node = self.parse_node(indent as isize - 1, Context::Block)?;
                    attach(&mut node, tag, anchor, start)?;
                    return Ok(node);
                }
            }
            let mut node = YamlNode::empty(start);
            attach(&mut node, tag, anchor, start)?;
            return Ok(node);
        }

        let column = self.column();
        let offset = self.pos;
        let mut node = match self.peek() {
            Some(b'*') => {
                let node = self.parse_alias(false)?;
                self.finish_line()?;
                node
            }
            Some(b'{' | b'[') => {
                let node = self.parse_flow_collection()?;
                self.finish_line()?;
                node
            }
            Some(b'|' | b'>') => return Err(YamlError::BlockScalarNotSupported { offset }),
            Some(b'?') if is_blank_or_end(self.peek_at(1)) => {
                return Err(YamlError::ExplicitKeyNotSupported { offset })
            }
            Some(b'-') if is_blank_or_end(self.peek_at(1)) => {
                if context == Context::MappingValue {
                    return Err(YamlError::UnexpectedCharacter {
                        offset,
                        char: '-',
                        context: "block sequence on the same line as its key",
                    });
                }
                self.parse_block_sequence(column)?
            }
            Some(b @ (b']' | b'}' | b',' | b'@' | b'`')) => {
                return Err(YamlError::UnexpectedCharacter {
                    offset,
                    char: b as char,
                    context: "reserved or unmatched indicator",
                })
            }
            _ => {
                let mut scalar = self.parse_scalar(false)?;
                self.skip_inline_whitespace();
                if self.at_value_indicator(false) {
                    if context == Context::MappingValue {
                        return Err(YamlError::UnexpectedCharacter {
                            offset: self.pos,
                            char: ':',
                            context: "mapping values are not allowed here",
                        });
                    }
                    // Properties in front of an implicit key belong to the key.
                    attach(&mut scalar, tag, anchor, start)?;
                    return self.parse_block_mapping(column, scalar);
                }
                self.finish_line()?;
                scalar
            }
        };
        attach(&mut node, tag, anchor, start)?;
        Ok(node)
    }

    /// Parse a key of a block mapping, leaving the cursor on its `:`.
    fn parse_block_key(&mut self) -> Result<YamlNode, YamlError> {
        let offset = self.pos;
        let key = match self.peek() {
            Some(b'-') if is_blank_or_end(self.peek_at(1)) => {
                return Err(YamlError::UnexpectedCharacter {
                    offset,
                    char: '-',
                    context: "expected a mapping key",
                })
            }
            Some(b'?') if is_blank_or_end(self.peek_at(1)) => {
                return Err(YamlError::ExplicitKeyNotSupported { offset })
            }
            Some(b'{' | b'[') => self.parse_flow_collection()?,
            _ => self.parse_scalar(false)?,
        };
        self.skip_inline_whitespace();
        if !self.at_value_indicator(false) {
            return Err(YamlError::KeyWithoutValue {
                offset,
                line: self.line,
            });
        }
        Ok(key)
    }

    /// Parse a block mapping whose first key has been read; the cursor is
    /// on that key's `:`.
    fn parse_block_mapping(
        &mut self,
        column: usize,
        first_key: YamlNode,
    ) -> Result<YamlNode, YamlError> {
        let offset = first_key.offset;
        let mut entries = Vec::new();
        let mut key = first_key;
        loop {
            self.advance();
            let value = self.parse_node(column as isize, Context::MappingValue)?;
            entries.push((key, value));

            self.skip_blank_lines();
            match self.peek_line_indent()? {
                Some(indent) if indent == column => {
                    self.advance_by(indent);
                    key = self.parse_block_key()?;
                }
                Some(indent) if indent > column => {
                    return Err(YamlError::InvalidIndentation {
                        line: self.line,
                        expected: column,
                        found: indent,
                    })
                }
                _ => break,
            }
        }
        Ok(YamlNode::new(YamlNodeKind::Mapping(entries), offset))
    }

    /// Parse a block sequence; the cursor is on the first `-`.
    fn parse_block_sequence(&mut self, column: usize) -> Result<YamlNode, YamlError> {
        let offset = self.pos;
        let mut items = Vec::new();
        loop {
            self.advance();
            items.push(self.parse_node(column as isize, Context::Block)?);

            self.skip_blank_lines();
            match self.peek_line_indent()? {
                Some(indent) if indent == column && self.line_has_dash_at(indent) => {
                    self.advance_by(indent);
                }
                Some(indent) if indent > column => {
                    return Err(YamlError::InvalidIndentation {
                        line: self.line,
                        expected: column,
                        found: indent,
                    })
                }
                _ => break,
            }
        }
        Ok(YamlNode::new(YamlNodeKind::Sequence(items), offset))
    }

    // =========================================================================
    // Flow structure
    // =========================================================================

    /// Skip whitespace, line breaks and comments inside a flow collection.
    fn skip_flow_whitespace(&mut self) {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\n') => self.advance(),
                Some(b'#') => self.skip_to_eol(),
                _ => return,
            }
        }
    }

    fn parse_flow_node(&mut self) -> Result<YamlNode, YamlError> {
        self.skip_flow_whitespace();
        let start = self.pos;
        let (tag, anchor) = self.parse_properties(true)?;
        self.skip_flow_whitespace();
        let mut node = match self.peek() {
            None => {
                return Err(YamlError::UnexpectedEof {
                    context: "flow collection",
                })
            }
            Some(b'{' | b'[') => self.parse_flow_collection()?,
            Some(b'*') => self.parse_alias(true)?,
            Some(b',' | b']' | b'}') => YamlNode::empty(start),
            Some(b':') if self.at_value_indicator(true) => YamlNode::empty(start),
            _ => self.parse_scalar(true)?,
        };
        attach(&mut node, tag, anchor, start)?;
        Ok(node)
    }

    /// Parse `{...}` or `[...]`; the cursor is on the opening bracket.
    fn parse_flow_collection(&mut self) -> Result<YamlNode, YamlError> {
        let offset = self.pos;
        let mapping = self.peek() == Some(b'{');
        let (close, eof, unexpected) = if mapping {
            (b'}', "flow mapping", "expected ',' or '}' in flow mapping")
        } else {
            (b']', "flow sequence", "expected ',' or ']' in flow sequence")
        };
        self.advance();

        let mut entries = Vec::new();
        let mut items = Vec::new();
        loop {
            self.skip_flow_whitespace();
            match self.peek() {
                None => return Err(YamlError::UnexpectedEof { context: eof }),
                Some(b) if b == close => {
                    self.advance();
                    break;
                }
                _ => {}
            }

            let key = self.parse_flow_node()?;
            self.skip_flow_whitespace();
            let value = if self.peek() == Some(b':') {
                self.advance();
                self.skip_flow_whitespace();
                match self.peek() {
                    Some(b) if b == b',' || b == close => Some(YamlNode::empty(self.pos)),
                    _ => Some(self.parse_flow_node()?),
                }
            } else {
                None
            };

            if mapping {
                let value = value.unwrap_or_else(|| YamlNode::empty(key.offset));
                entries.push((key, value));
            } else if let Some(value) = value {
                // `[k: v]` is a sequence holding a single-pair mapping.
                let pair_offset = key.offset;
                items.push(YamlNode::new(
                    YamlNodeKind::Mapping(vec![(key, value)]),
                    pair_offset,
                ));
            } else {
                items.push(key);
            }

            self.skip_flow_whitespace();
            match self.peek() {
                Some(b',') => self.advance(),
                Some(b) if b == close => {
                    self.advance();
                    break;
                }
                Some(_) => {
                    return Err(YamlError::UnexpectedCharacter {
                        offset: self.pos,
                        char: self.current_char(),
                        context: unexpected,
                    })
                }
                None => return Err(YamlError::UnexpectedEof { context: eof }),
            }
        }

        let kind = if mapping {
            YamlNodeKind::Mapping(entries)
        } else {
            YamlNodeKind::Sequence(items)
        };
        Ok(YamlNode::new(kind, offset))
    }

    // =========================================================================
    // Documents
    // =========================================================================

    fn parse_document(&mut self) -> Result<Option<YamlNode>, YamlError> {
        // Directives and blank lines before the first document.
        loop {
            self.skip_blank_lines();
            if self.peek() == Some(b'%') {
                self.skip_to_eol();
                continue;
            }
            break;
        }
        if self.pos >= self.bytes.len() {
            return Ok(None);
        }

        let root = if self.at_document_marker() {
            if self.bytes[self.pos] == b'.' {
                return Ok(None);
            }
            self.advance_by(3);
            self.parse_node(-1, Context::MappingValue)?
        } else {
            self.count_indent()?;
            self.parse_node(-1, Context::Block)?
        };

        self.skip_blank_lines();
        if self.pos < self.bytes.len() && !self.at_document_marker() {
            return Err(YamlError::TrailingContent {
                offset: self.pos,
                line: self.line,
            });
        }
        Ok(Some(root))
    }
}

/// Parse the first document in `text`.
///
/// Returns `None` when the text holds no document at all. Anything after
/// the first document's end marker is ignored.
pub fn parse_document(text: &str) -> Result<Option<YamlNode>, YamlError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let text: Cow<'_, str> = if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(text)
    };
    Parser::new(&text).parse_document()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> YamlNode {
        parse_document(text).unwrap().unwrap()
    }

    fn scalar(node: &YamlNode) -> &str {
        node.as_scalar().unwrap()
    }

    fn mapping(node: &YamlNode) -> &[(YamlNode, YamlNode)] {
        match &node.kind {
            YamlNodeKind::Mapping(entries) => entries,
            other => panic!("expected mapping, got {:?}", other),
        }
    }

    fn sequence(node: &YamlNode) -> &[YamlNode] {
        match &node.kind {
            YamlNodeKind::Sequence(items) => items,
            other => panic!("expected sequence, got {:?}", other),
        }
    }

    #[test]
    fn test_simple_mapping() {
        let root = parse("name: Alice\nage: 30");
        let entries = mapping(&root);
        assert_eq!(entries.len(), 2);
        assert_eq!(scalar(&entries[0].0), "name");
        assert_eq!(scalar(&entries[0].1), "Alice");
        assert_eq!(scalar(&entries[1].1), "30");
    }

    #[test]
    fn test_simple_sequence() {
        let root = parse("- a\n- b\n- c");
        let items = sequence(&root);
        assert_eq!(items.iter().map(scalar).collect::<Vec<_>>(), ["a", "b", "c"]);
    }

    #[test]
    fn test_nested_block() {
        let root = parse("a:\n  b: 1\n  c:\n  - x\n  - y\nd: 2\n");
        let entries = mapping(&root);
        assert_eq!(entries.len(), 2);
        let inner = mapping(&entries[0].1);
        assert_eq!(scalar(&inner[0].1), "1");
        assert_eq!(sequence(&inner[1].1).len(), 2);
        assert_eq!(scalar(&entries[1].1), "2");
    }

    #[test]
    fn test_mapping_in_sequence_item() {
        let root = parse("- a: 1\n  b: 2\n- - x\n  - y\n-\n  c: 3\n");
        let items = sequence(&root);
        assert_eq!(mapping(&items[0]).len(), 2);
        assert_eq!(sequence(&items[1]).len(), 2);
        assert_eq!(scalar(&mapping(&items[2])[0].0), "c");
    }

    #[test]
    fn test_empty_values() {
        let root = parse("a:\nb: # nothing\n");
        let entries = mapping(&root);
        assert_eq!(scalar(&entries[0].1), "");
        assert_eq!(scalar(&entries[1].1), "");
    }

    #[test]
    fn test_flow_collections() {
        let root = parse("{a: [1, 2], b: {c: d}, e: , 'f': \"g\"}");
        let entries = mapping(&root);
        assert_eq!(entries.len(), 4);
        assert_eq!(sequence(&entries[0].1).len(), 2);
        assert_eq!(scalar(&mapping(&entries[1].1)[0].1), "d");
        assert_eq!(scalar(&entries[2].1), "");
        assert_eq!(scalar(&entries[3].0), "f");
        assert_eq!(scalar(&entries[3].1), "g");
    }

    #[test]
    fn test_multiline_flow() {
        let root = parse("[\n  1, # one\n  2\n]\n");
        assert_eq!(sequence(&root).len(), 2);
    }

    #[test]
    fn test_tags() {
        let root = parse("!h32 { 0x0000001a: !u 0xff, 0x0000001b: !!binary QUI= }");
        assert_eq!(root.tag.as_deref(), Some("!h32"));
        let entries = mapping(&root);
        assert_eq!(scalar(&entries[0].0), "0x0000001a");
        assert_eq!(entries[0].1.tag.as_deref(), Some("!u"));
        assert_eq!(scalar(&entries[0].1), "0xff");
        assert_eq!(entries[1].1.tag.as_deref(), Some("!!binary"));
        assert_eq!(scalar(&entries[1].1), "QUI=");
    }

    #[test]
    fn test_block_tag() {
        let root = parse("!h32\n0x00000001: a\n0x00000002:\n  !h32\n  0x00000003: b\n");
        assert_eq!(root.tag.as_deref(), Some("!h32"));
        let entries = mapping(&root);
        assert_eq!(entries[1].1.tag.as_deref(), Some("!h32"));
        assert_eq!(mapping(&entries[1].1).len(), 1);
    }

    #[test]
    fn test_empty_tagged_value() {
        let root = parse("a: !!binary\nb: 1\n");
        let entries = mapping(&root);
        assert_eq!(entries[0].1.tag.as_deref(), Some("!!binary"));
        assert_eq!(scalar(&entries[0].1), "");
    }

    #[test]
    fn test_double_quoted_escapes() {
        let root = parse(r#""a\"b\\c\n\x41\u00e9""#);
        assert_eq!(scalar(&root), "a\"b\\c\nAé");
        assert_eq!(root.kind, YamlNodeKind::Scalar {
            value: "a\"b\\c\nAé".to_string(),
            style: ScalarStyle::DoubleQuoted,
        });
    }

    #[test]
    fn test_single_quoted() {
        assert_eq!(scalar(&parse("'it''s'")), "it's");
    }

    #[test]
    fn test_quoted_folding() {
        assert_eq!(scalar(&parse("\"one\n  two\n\n  three\"")), "one two\nthree");
    }

    #[test]
    fn test_comments() {
        let root = parse("# header\nkey: value # trailing\n\n# footer\n");
        assert_eq!(scalar(&mapping(&root)[0].1), "value");
    }

    #[test]
    fn test_plain_with_colons_and_hashes() {
        let root = parse("url: http://example.com/#x\n");
        assert_eq!(scalar(&mapping(&root)[0].1), "http://example.com/#x");
    }

    #[test]
    fn test_anchor_and_alias() {
        let root = parse("a: &x 1\nb: *x\n");
        let entries = mapping(&root);
        assert_eq!(entries[0].1.anchor.as_deref(), Some("x"));
        assert_eq!(entries[1].1.kind, YamlNodeKind::Alias("x".to_string()));
    }

    #[test]
    fn test_first_document_only() {
        let root = parse("%YAML 1.2\n---\na: 1\n---\nb: 2\n");
        let entries = mapping(&root);
        assert_eq!(entries.len(), 1);
        assert_eq!(scalar(&entries[0].0), "a");
    }

    #[test]
    fn test_document_marker_with_content() {
        let root = parse("--- !h32 {}\n...\n");
        assert_eq!(root.tag.as_deref(), Some("!h32"));
        assert!(mapping(&root).is_empty());
    }

    #[test]
    fn test_bare_marker_is_null() {
        assert_eq!(scalar(&parse("---\n")), "");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_document("").unwrap(), None);
        assert_eq!(parse_document("  \n# only a comment\n").unwrap(), None);
    }

    #[test]
    fn test_crlf() {
        let root = parse("a: 1\r\nb: 2\r\n");
        assert_eq!(mapping(&root).len(), 2);
    }

    #[test]
    fn test_tab_indentation_error() {
        assert!(matches!(
            parse_document("a:\n\tb: 1"),
            Err(YamlError::TabIndentation { line: 2, .. })
        ));
    }

    #[test]
    fn test_unsupported_syntax() {
        assert!(matches!(
            parse_document("a: |\n  text\n"),
            Err(YamlError::BlockScalarNotSupported { .. })
        ));
        assert!(matches!(
            parse_document("? a\n: b\n"),
            Err(YamlError::ExplicitKeyNotSupported { .. })
        ));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            parse_document("'open"),
            Err(YamlError::UnclosedQuote { quote_type: '\'', .. })
        ));
        assert!(matches!(
            parse_document(r#""bad \q""#),
            Err(YamlError::InvalidEscape { .. })
        ));
        assert!(matches!(
            parse_document("a: 1\n  b: 2\n"),
            Err(YamlError::InvalidIndentation { .. })
        ));
        assert!(matches!(
            parse_document("a: 1\njust text\n"),
            Err(YamlError::KeyWithoutValue { line: 2, .. })
        ));
        assert!(matches!(
            parse_document("[1, 2"),
            Err(YamlError::UnexpectedEof { .. })
        ));
        assert!(matches!(
            parse_document("a: b: c"),
            Err(YamlError::UnexpectedCharacter { char: ':', .. })
        ));
        assert!(matches!(
            parse_document("\"a\" b"),
            Err(YamlError::TrailingContent { .. })
        ));
        assert!(matches!(
            parse_document("! x"),
            Err(YamlError::EmptyProperty { offset: 0 })
        ));
    }
}
