//! YAML text emission for binary documents.
//!
//! Reads nodes straight out of a [`Document`] and writes them as YAML that
//! [`from_yaml`](super::from_yaml) parses back to the same values.
//!
//! Containers whose children are all scalars are written in flow form on a
//! single line (`[1, 2]`, `{ a: 1 }`, `!h32 { 0x0000001a: 1 }`) unless
//! [`EmitterConfig::indented`] is set. Anything else is written in block
//! form, one entry per line.

use base64::{engine::general_purpose::STANDARD, Engine as _};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::convert::classify_plain;
use crate::binary::{to_offset, Document};
use crate::error::{Error, Result};
use crate::hash_map::emit_hash_map;
use crate::node::NodeType;
use crate::value::Byml;

/// Configuration for YAML emission.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EmitterConfig {
    /// Spaces per indentation level (default: 2)
    pub indent_width: usize,
    /// Write every non-empty container in block form (default: false)
    pub indented: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            indent_width: 2,
            indented: false,
        }
    }
}

impl EmitterConfig {
    /// Set the number of spaces per indentation level.
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width.max(1);
        self
    }

    /// Force block form for all non-empty containers.
    pub fn with_indented(mut self, indented: bool) -> Self {
        self.indented = indented;
        self
    }
}

/// Writes the nodes of one document as YAML text.
///
/// Holds the output buffer, the current indentation level and the offsets
/// of the containers being written. The level is only changed through
/// [`with_child`](Self::with_child), which restores it on every exit path.
#[derive(Debug)]
pub struct Emitter<'d> {
    doc: &'d Document<'d>,
    out: String,
    level: usize,
    open: Vec<usize>,
    config: EmitterConfig,
}

impl<'d> Emitter<'d> {
    /// Create an emitter for nodes of `doc`.
    pub fn new(doc: &'d Document<'d>, config: EmitterConfig) -> Self {
        Self {
            doc,
            out: String::new(),
            level: 0,
            open: Vec::new(),
            config,
        }
    }

    /// The document nodes are read from.
    #[inline]
    pub fn doc(&self) -> &'d Document<'d> {
        self.doc
    }

    /// Current indentation level.
    #[inline]
    pub fn level(&self) -> usize {
        self.level
    }

    /// Check if block form is forced.
    #[inline]
    pub fn is_indented(&self) -> bool {
        self.config.indented
    }

    /// Text written so far.
    pub fn as_str(&self) -> &str {
        &self.out
    }

    /// Consume the emitter and return its output.
    pub fn finish(self) -> String {
        self.out
    }

    /// Append raw text.
    #[inline]
    pub fn write(&mut self, text: &str) {
        self.out.push_str(text);
    }

    /// Start a new line at the current indentation.
    ///
    /// Trailing spaces on the finished line are dropped. No line break is
    /// written at the very start of the output.
    pub fn newline(&mut self) {
        let kept = self.out.trim_end_matches(' ').len();
        self.out.truncate(kept);
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        let width = self.level * self.config.indent_width;
        self.out.extend(core::iter::repeat(' ').take(width));
    }

    /// Run `f` one indentation level deeper.
    ///
    /// The level is restored whether `f` succeeds or fails, so an error in
    /// one child cannot shift the indentation of its siblings.
    pub fn with_child<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.level += 1;
        let result = f(self);
        self.level -= 1;
        result
    }

    /// Emit the node of type `node_type` with value field `value` at the
    /// cursor.
    ///
    /// A container nested inside itself fails with [`Error::Cycle`].
    pub fn emit_node(&mut self, node_type: NodeType, value: i32) -> Result<()> {
        if !node_type.is_container() {
            return self.emit_scalar(node_type, value);
        }
        let offset = to_offset(value, self.doc.data().len())?;
        if self.open.contains(&offset) {
            return Err(Error::Cycle { offset });
        }
        self.open.push(offset);
        let result = self.emit_container(node_type, value);
        self.open.pop();
        result
    }

    fn emit_container(&mut self, node_type: NodeType, value: i32) -> Result<()> {
        match node_type {
            NodeType::HashMap32 => {
                let view = self.doc.hash_map32(value)?;
                emit_hash_map(self, &view)
            }
            NodeType::HashMap64 => {
                let view = self.doc.hash_map64(value)?;
                emit_hash_map(self, &view)
            }
            NodeType::Array => self.emit_array(value),
            NodeType::Map => self.emit_map(value),
            _ => self.emit_scalar(node_type, value),
        }
    }

    /// Emit the value of a block entry after its `key:` or `-` marker.
    ///
    /// Nested containers go one level deeper. Null writes nothing.
    pub fn emit_child(&mut self, node_type: NodeType, value: i32) -> Result<()> {
        if node_type == NodeType::Null {
            return Ok(());
        }
        self.write(" ");
        self.with_child(|e| e.emit_node(node_type, value))
    }

    /// Emit the value of a flow entry after its `key:`.
    pub fn emit_flow_value(&mut self, node_type: NodeType, value: i32) -> Result<()> {
        if node_type == NodeType::Null {
            return Ok(());
        }
        self.write(" ");
        self.emit_scalar(node_type, value)
    }

    /// Emit a scalar in the form that parses back to the same value.
    pub fn emit_scalar(&mut self, node_type: NodeType, value: i32) -> Result<()> {
        let scalar = self.doc.resolve(node_type, value)?;
        write_scalar(&mut self.out, &scalar);
        Ok(())
    }

    fn emit_array(&mut self, value: i32) -> Result<()> {
        let view = self.doc.array(value)?;
        if view.is_empty() {
            self.write("[]");
            return Ok(());
        }
        // A null item has no flow spelling that survives a trailing comma.
        let mut block = self.config.indented;
        for item in view.iter() {
            let (node_type, _) = item?;
            block |= node_type.is_container() || node_type == NodeType::Null;
        }
        if !block {
            self.write("[");
            for (index, item) in view.iter().enumerate() {
                let (node_type, value) = item?;
                if index > 0 {
                    self.write(", ");
                }
                self.emit_scalar(node_type, value)?;
            }
            self.write("]");
            return Ok(());
        }
        for item in view.iter() {
            let (node_type, value) = item?;
            self.newline();
            self.write("-");
            self.emit_child(node_type, value)?;
        }
        Ok(())
    }

    fn emit_map(&mut self, value: i32) -> Result<()> {
        let view = self.doc.map(value)?;
        if view.is_empty() {
            self.write("{}");
            return Ok(());
        }
        let mut nested = false;
        for entry in view.iter() {
            nested |= entry?.node_type.is_container();
        }
        if !self.config.indented && !nested {
            self.write("{ ");
            for (index, entry) in view.iter().enumerate() {
                let entry = entry?;
                if index > 0 {
                    self.write(", ");
                }
                write_string(&mut self.out, self.doc.key(entry.key_index)?);
                self.write(":");
                self.emit_flow_value(entry.node_type, entry.value)?;
            }
            self.write(" }");
            return Ok(());
        }
        for entry in view.iter() {
            let entry = entry?;
            self.newline();
            write_string(&mut self.out, self.doc.key(entry.key_index)?);
            self.write(":");
            self.emit_child(entry.node_type, entry.value)?;
        }
        Ok(())
    }
}

/// Check if a string must be quoted to read back as the same string.
fn needs_quotes(s: &str) -> bool {
    let Some(first) = s.chars().next() else {
        return true;
    };
    if !matches!(classify_plain(s), Ok(Byml::String(_))) {
        return true;
    }
    if "-?:,[]{}#&*!|>'\"%@` \t".contains(first) || s.ends_with([' ', '\t', ':']) {
        return true;
    }
    // Would read as a document end marker at the start of a line.
    if s.starts_with("...") {
        return true;
    }
    s.contains(": ")
        || s.contains(" #")
        || s.contains([',', '[', ']', '{', '}'])
        || s.chars().any(|c| c.is_control())
}

/// Write `s` plain when that is unambiguous, double-quoted otherwise.
fn write_string(out: &mut String, s: &str) {
    if !needs_quotes(s) {
        out.push_str(s);
        return;
    }
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Write a scalar value with the tag it needs to round-trip.
fn write_scalar(out: &mut String, value: &Byml) {
    match value {
        Byml::Null => {}
        Byml::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Byml::I32(n) => out.push_str(&n.to_string()),
        Byml::F32(f) => {
            let text = f.to_string();
            out.push_str(&text);
            if f.is_finite() && !text.contains('.') {
                out.push_str(".0");
            }
        }
        Byml::U32(n) => out.push_str(&format!("!u 0x{:x}", n)),
        Byml::I64(n) => out.push_str(&format!("!l {}", n)),
        Byml::U64(n) => out.push_str(&format!("!ul 0x{:x}", n)),
        Byml::F64(f) => out.push_str(&format!("!d {}", f)),
        Byml::String(s) => write_string(out, s),
        Byml::Binary(bytes) => {
            out.push_str("!!binary");
            if !bytes.is_empty() {
                out.push(' ');
                out.push_str(&STANDARD.encode(bytes));
            }
        }
        // Containers never reach here: emit_node dispatches them first.
        Byml::Array(_) | Byml::Map(_) | Byml::HashMap32(_) | Byml::HashMap64(_) => {}
    }
}

/// Render a whole document as YAML.
///
/// A document without a root renders as `---`. The output always ends with
/// a line break.
pub fn emit_document(doc: &Document<'_>, config: EmitterConfig) -> Result<String> {
    let Some((node_type, value)) = doc.root()? else {
        return Ok("---\n".to_string());
    };
    let mut emitter = Emitter::new(doc, config);
    emitter.emit_node(node_type, value)?;
    let mut out = emitter.finish();
    out.push('\n');
    Ok(out)
}
