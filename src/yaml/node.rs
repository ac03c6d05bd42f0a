//! YAML syntax tree.

/// How a scalar was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarStyle {
    /// Unquoted
    Plain,
    /// `'...'`
    SingleQuoted,
    /// `"..."`
    DoubleQuoted,
}

/// Shape of a parsed node.
#[derive(Debug, Clone, PartialEq)]
pub enum YamlNodeKind {
    /// Scalar text, with quotes removed and escapes decoded
    Scalar {
        /// Decoded text
        value: String,
        /// Quoting style
        style: ScalarStyle,
    },
    /// Key/value pairs in document order
    Mapping(Vec<(YamlNode, YamlNode)>),
    /// Items in document order
    Sequence(Vec<YamlNode>),
    /// `*name` reference to an anchored node
    Alias(String),
}

/// A node of the YAML syntax tree with its properties.
#[derive(Debug, Clone, PartialEq)]
pub struct YamlNode {
    /// Node contents
    pub kind: YamlNodeKind,
    /// Tag as written, e.g. `!h32` or `!!binary`
    pub tag: Option<String>,
    /// Anchor name without the `&`
    pub anchor: Option<String>,
    /// Byte offset where the node starts
    pub offset: usize,
}

impl YamlNode {
    /// An empty plain scalar, the YAML null.
    pub fn empty(offset: usize) -> Self {
        Self::scalar(String::new(), ScalarStyle::Plain, offset)
    }

    /// A scalar node without properties.
    pub fn scalar(value: String, style: ScalarStyle, offset: usize) -> Self {
        Self {
            kind: YamlNodeKind::Scalar { value, style },
            tag: None,
            anchor: None,
            offset,
        }
    }

    /// A node of the given kind without properties.
    pub fn new(kind: YamlNodeKind, offset: usize) -> Self {
        Self {
            kind,
            tag: None,
            anchor: None,
            offset,
        }
    }

    /// Scalar text, if this node is a scalar.
    pub fn as_scalar(&self) -> Option<&str> {
        match &self.kind {
            YamlNodeKind::Scalar { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Name of the node kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            YamlNodeKind::Scalar { .. } => "scalar",
            YamlNodeKind::Mapping(_) => "mapping",
            YamlNodeKind::Sequence(_) => "sequence",
            YamlNodeKind::Alias(_) => "alias",
        }
    }
}
