//! YAML node trees that keep scalars as written.
//!
//! The transport subtree is opaque to the pipeline, so it is held as the
//! parser saw it rather than as a typed value. Scalars keep their source
//! text, mapping keys stay nodes and tags stay attached. Big integers,
//! non-finite floats, non-string keys and tagged values therefore survive
//! being written back out.
//!
//! Output is canonical block YAML with two-space indentation. Quoting is
//! decided from what a scalar resolves to, not from how it was written, so
//! flow and block renditions of the same subtree produce the same text.

use std::collections::HashMap;
use std::fmt::Write as _;

use saphyr_parser::{Event, Parser, ScalarStyle, ScanError, Tag};
use thiserror::Error;

const INDENT: usize = 2;
const MAX_NODES: usize = 100_000;
const CORE_SCHEMA_PREFIX: &str = "tag:yaml.org,2002:";
const NULL_SCALAR: &str = "~";
const STRING_TAG: &str = "!!str";

/// Failures while building a node tree.
#[derive(Debug, Error)]
pub(crate) enum NodeError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("alias refers to an unknown anchor")]
    UnknownAnchor,
    #[error("document expands to more than {MAX_NODES} nodes")]
    TooLarge,
    #[error("unbalanced YAML event stream")]
    Unbalanced,
}

/// One node of a YAML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct YamlNode {
    tag: Option<String>,
    kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeKind {
    Scalar { text: String, plain: bool },
    Sequence(Vec<YamlNode>),
    Mapping(Vec<(YamlNode, YamlNode)>),
}

impl YamlNode {
    /// An untagged plain null.
    pub(crate) fn null() -> Self {
        Self {
            tag: None,
            kind: NodeKind::Scalar {
                text: NULL_SCALAR.to_owned(),
                plain: true,
            },
        }
    }

    /// Consumes a mapping node and returns the value stored under `key`.
    pub(crate) fn into_entry(self, key: &str) -> Option<Self> {
        match self.kind {
            NodeKind::Mapping(entries) => entries
                .into_iter()
                .find(|(candidate, _)| candidate.is_text(key))
                .map(|(_, value)| value),
            NodeKind::Scalar { .. } | NodeKind::Sequence(_) => None,
        }
    }

    fn is_text(&self, key: &str) -> bool {
        let untyped = self.tag.as_deref().is_none_or(|tag| tag == STRING_TAG);
        matches!(&self.kind, NodeKind::Scalar { text, .. } if untyped && text == key)
    }

    fn size(&self) -> usize {
        match &self.kind {
            NodeKind::Scalar { .. } => 1,
            NodeKind::Sequence(items) => items.iter().map(Self::size).fold(1, usize::saturating_add),
            NodeKind::Mapping(entries) => entries
                .iter()
                .map(|(key, value)| key.size().saturating_add(value.size()))
                .fold(1, usize::saturating_add),
        }
    }

    /// Writes the node as a block YAML document ending in a newline.
    pub(crate) fn to_yaml(&self) -> String {
        let mut out = String::new();
        match &self.kind {
            NodeKind::Mapping(entries) if !entries.is_empty() => {
                self.push_tag_line(&mut out);
                write_entries(&mut out, entries, 0);
            }
            NodeKind::Sequence(items) if !items.is_empty() => {
                self.push_tag_line(&mut out);
                write_items(&mut out, items, 0);
            }
            NodeKind::Scalar { .. } | NodeKind::Sequence(_) | NodeKind::Mapping(_) => {
                out.push_str(&self.inline(false));
                out.push('\n');
            }
        }
        out
    }

    fn push_tag_line(&self, out: &mut String) {
        if let Some(tag) = &self.tag {
            out.push_str(tag);
            out.push('\n');
        }
    }

    /// Renders the node on one line, using flow style for collections.
    fn inline(&self, in_flow: bool) -> String {
        let body = match &self.kind {
            NodeKind::Scalar { text, plain } => {
                scalar_text(text, *plain, self.tag.is_some(), in_flow)
            }
            NodeKind::Sequence(items) => {
                let rendered: Vec<String> = items.iter().map(|item| item.inline(true)).collect();
                format!("[{}]", rendered.join(", "))
            }
            NodeKind::Mapping(entries) => {
                let rendered: Vec<String> = entries
                    .iter()
                    .map(|(key, value)| format!("{}: {}", key.inline(true), value.inline(true)))
                    .collect();
                format!("{{{}}}", rendered.join(", "))
            }
        };
        match &self.tag {
            Some(tag) => format!("{tag} {body}"),
            None => body,
        }
    }
}

/// Parses the first document of `input` into a node tree.
///
/// Aliases are expanded in place. Returns `None` for an empty stream.
pub(crate) fn parse_document(input: &str) -> Result<Option<YamlNode>, NodeError> {
    let mut builder = TreeBuilder::default();
    for next in Parser::new_from_str(input) {
        let (event, _span) = next?;
        let document_end = matches!(event, Event::DocumentEnd);
        builder.on_event(event)?;
        if document_end && builder.root.is_some() {
            break;
        }
    }
    Ok(builder.root)
}

enum Frame {
    Sequence {
        tag: Option<String>,
        anchor: usize,
        items: Vec<YamlNode>,
    },
    Mapping {
        tag: Option<String>,
        anchor: usize,
        entries: Vec<(YamlNode, YamlNode)>,
        key: Option<YamlNode>,
    },
}

#[derive(Default)]
struct TreeBuilder {
    frames: Vec<Frame>,
    anchors: HashMap<usize, YamlNode>,
    nodes: usize,
    root: Option<YamlNode>,
}

impl TreeBuilder {
    fn on_event(&mut self, event: Event<'_>) -> Result<(), NodeError> {
        match event {
            Event::Scalar(text, style, anchor, tag) => {
                let node = YamlNode {
                    tag: tag.as_deref().map(tag_text),
                    kind: NodeKind::Scalar {
                        text: text.into_owned(),
                        plain: style == ScalarStyle::Plain,
                    },
                };
                self.complete(node, anchor)
            }
            Event::Alias(id) => {
                let node = self.anchors.get(&id).cloned().ok_or(NodeError::UnknownAnchor)?;
                self.count(node.size())?;
                self.attach(node);
                Ok(())
            }
            Event::SequenceStart(anchor, tag) => {
                self.frames.push(Frame::Sequence {
                    tag: tag.as_deref().map(tag_text),
                    anchor,
                    items: Vec::new(),
                });
                Ok(())
            }
            Event::MappingStart(anchor, tag) => {
                self.frames.push(Frame::Mapping {
                    tag: tag.as_deref().map(tag_text),
                    anchor,
                    entries: Vec::new(),
                    key: None,
                });
                Ok(())
            }
            Event::SequenceEnd => match self.frames.pop() {
                Some(Frame::Sequence { tag, anchor, items }) => self.complete(
                    YamlNode {
                        tag,
                        kind: NodeKind::Sequence(items),
                    },
                    anchor,
                ),
                Some(Frame::Mapping { .. }) | None => Err(NodeError::Unbalanced),
            },
            Event::MappingEnd => match self.frames.pop() {
                Some(Frame::Mapping {
                    tag,
                    anchor,
                    entries,
                    key: None,
                }) => self.complete(
                    YamlNode {
                        tag,
                        kind: NodeKind::Mapping(entries),
                    },
                    anchor,
                ),
                Some(Frame::Mapping { .. } | Frame::Sequence { .. }) | None => {
                    Err(NodeError::Unbalanced)
                }
            },
            Event::Nothing
            | Event::StreamStart
            | Event::StreamEnd
            | Event::DocumentStart(_)
            | Event::DocumentEnd => Ok(()),
        }
    }

    fn complete(&mut self, node: YamlNode, anchor: usize) -> Result<(), NodeError> {
        self.count(1)?;
        if anchor != 0 {
            self.anchors.insert(anchor, node.clone());
        }
        self.attach(node);
        Ok(())
    }

    fn count(&mut self, added: usize) -> Result<(), NodeError> {
        self.nodes = self.nodes.saturating_add(added);
        if self.nodes > MAX_NODES {
            return Err(NodeError::TooLarge);
        }
        Ok(())
    }

    fn attach(&mut self, node: YamlNode) {
        match self.frames.last_mut() {
            None => {
                if self.root.is_none() {
                    self.root = Some(node);
                }
            }
            Some(Frame::Sequence { items, .. }) => items.push(node),
            Some(Frame::Mapping { entries, key, .. }) => match key.take() {
                Some(pending) => entries.push((pending, node)),
                None => *key = Some(node),
            },
        }
    }
}

/// Writes a resolved tag in the shortest form that resolves back to it.
fn tag_text(tag: &Tag) -> String {
    if tag.handle == "!" {
        format!("!{}", tag.suffix)
    } else if tag.handle == CORE_SCHEMA_PREFIX {
        format!("!!{}", tag.suffix)
    } else if tag.handle.is_empty() && tag.suffix == "!" {
        "!".to_owned()
    } else {
        format!("!<{}{}>", tag.handle, tag.suffix)
    }
}

fn write_entries(out: &mut String, entries: &[(YamlNode, YamlNode)], indent: usize) {
    for (key, value) in entries {
        push_indent(out, indent);
        write_entry(out, key, value, indent);
    }
}

fn write_entry(out: &mut String, key: &YamlNode, value: &YamlNode, indent: usize) {
    out.push_str(&key.inline(false));
    out.push(':');
    write_value(out, value, indent);
}

fn write_items(out: &mut String, items: &[YamlNode], indent: usize) {
    let child = indent.saturating_add(INDENT);
    for item in items {
        push_indent(out, indent);
        out.push('-');
        match (&item.tag, &item.kind) {
            (None, NodeKind::Mapping(entries)) if !entries.is_empty() => {
                out.push(' ');
                for (position, (key, value)) in entries.iter().enumerate() {
                    if position > 0 {
                        push_indent(out, child);
                    }
                    write_entry(out, key, value, child);
                }
            }
            _ => write_value(out, item, indent),
        }
    }
}

/// Writes a node that follows `key:` or `-` on the current line.
fn write_value(out: &mut String, node: &YamlNode, indent: usize) {
    let child = indent.saturating_add(INDENT);
    match &node.kind {
        NodeKind::Mapping(entries) if !entries.is_empty() => {
            push_tag_suffix(out, node.tag.as_deref());
            write_entries(out, entries, child);
        }
        NodeKind::Sequence(items) if !items.is_empty() => {
            push_tag_suffix(out, node.tag.as_deref());
            write_items(out, items, child);
        }
        NodeKind::Scalar { .. } | NodeKind::Sequence(_) | NodeKind::Mapping(_) => {
            out.push(' ');
            out.push_str(&node.inline(false));
            out.push('\n');
        }
    }
}

/// Ends a `key:` or `-` line that opens a block collection.
fn push_tag_suffix(out: &mut String, tag: Option<&str>) {
    if let Some(text) = tag {
        out.push(' ');
        out.push_str(text);
    }
    out.push('\n');
}

fn push_indent(out: &mut String, indent: usize) {
    out.extend(std::iter::repeat_n(' ', indent));
}

fn scalar_text(text: &str, plain: bool, tagged: bool, in_flow: bool) -> String {
    if plain && text.is_empty() {
        return if tagged { "\"\"" } else { NULL_SCALAR }.to_owned();
    }
    let string_like = resolves_to_string(text);
    if (plain && !string_like) || (string_like && is_plain_safe(text, in_flow)) {
        text.to_owned()
    } else {
        double_quoted(text)
    }
}

/// Whether an untagged plain scalar with this text would load as a string.
///
/// Leans towards "not a string" for forms some loaders treat as booleans or
/// numbers, so such strings are always quoted.
fn resolves_to_string(text: &str) -> bool {
    !(is_null_like(text) || is_bool_like(text) || is_int_like(text) || is_float_like(text))
}

fn is_null_like(text: &str) -> bool {
    text.is_empty() || text == NULL_SCALAR || text.eq_ignore_ascii_case("null")
}

fn is_bool_like(text: &str) -> bool {
    ["true", "false", "yes", "no", "on", "off", "y", "n"]
        .iter()
        .any(|word| text.eq_ignore_ascii_case(word))
}

fn is_int_like(text: &str) -> bool {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    let radix_digits = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)]
        .iter()
        .find_map(|(prefix, radix)| unsigned.strip_prefix(prefix).map(|digits| (digits, *radix)));
    match radix_digits {
        Some((digits, radix)) => {
            !digits.is_empty() && digits.chars().all(|c| c == '_' || c.is_digit(radix))
        }
        None => {
            unsigned.starts_with(|c: char| c.is_ascii_digit())
                && unsigned.chars().all(|c| c == '_' || c.is_ascii_digit())
        }
    }
}

fn is_float_like(text: &str) -> bool {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    if [".inf", ".nan"].iter().any(|word| unsigned.eq_ignore_ascii_case(word)) {
        return true;
    }
    text.replace('_', "").parse::<f64>().is_ok()
}

fn is_plain_safe(text: &str, in_flow: bool) -> bool {
    let Some(first) = text.chars().next() else {
        return false;
    };
    let leading_indicator = "-?:,[]{}#&*!|>'\"%@`".contains(first) || first.is_whitespace();
    let bad_ending = text.ends_with(|c: char| c.is_whitespace() || c == ':');
    let structural = text.contains(": ") || text.contains(" #") || text.starts_with("...");
    let unprintable = text.chars().any(|c| c.is_control() || c == '\u{feff}');
    let flow_indicator = in_flow && text.contains([',', '[', ']', '{', '}']);
    !(leading_indicator || bad_ending || structural || unprintable || flow_indicator)
}

fn double_quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len().saturating_add(2));
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() || c == '\u{feff}' => {
                let _ = write!(out, "\\u{:04X}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
