//! NML decoder
//!
//! NML files are XML documents holding a single skeleton: a `<things>`
//! root with a `<parameters>` section (ignored here) and a `<thing>`
//! element whose first child element lists nodes and whose second child
//! lists edges. The edge list is undirected; after parsing, the raw
//! tables go through the canonicalization core to obtain parent links.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use neuroskel_core::{canonicalize, Edge, RawNode, SkeletonMeta, TreeSkeleton};

use crate::config::ReadOptions;
use crate::errors::{NmlError, Result};
use crate::warn::{default_sink, SharedSink, WarningSink};

/// Which positional child of `<thing>` we are inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Nodes,
    Edges,
    Other,
}

/// Reader for single-skeleton NML documents.
pub struct NmlReader {
    options: ReadOptions,
    sink: SharedSink,
    name_fallback: &'static str,
}

impl NmlReader {
    pub fn new(options: ReadOptions) -> Self {
        Self {
            options,
            sink: default_sink(),
            name_fallback: "NML",
        }
    }

    /// Route warnings (dropped components under the first-component
    /// policy) to an explicit sink.
    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    pub(crate) fn with_name_fallback(mut self, fallback: &'static str) -> Self {
        self.name_fallback = fallback;
        self
    }

    /// Decode an NML document from a string.
    pub fn read_str(&self, xml: &str) -> Result<TreeSkeleton> {
        self.read_str_with(xml, None, None)
    }

    /// Decode an NML document from raw bytes (must be UTF-8).
    pub fn read_bytes(&self, bytes: &[u8]) -> Result<TreeSkeleton> {
        let xml = std::str::from_utf8(bytes)?;
        self.read_str(xml)
    }

    /// Decode an NML file from disk; the path is recorded in the
    /// skeleton's metadata.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<TreeSkeleton> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let xml = std::str::from_utf8(&bytes)?;
        self.read_str_with(xml, Some(path.to_path_buf()), None)
    }

    /// Decode with provenance supplied by the caller (file path, archive
    /// id for NMX members).
    pub(crate) fn read_str_with(
        &self,
        xml: &str,
        file: Option<PathBuf>,
        archive_id: Option<String>,
    ) -> Result<TreeSkeleton> {
        let parsed = parse_document(xml, &self.options)?;

        let canonical = canonicalize(&parsed.nodes, &parsed.edges, self.options.topology)?;
        if !canonical.dropped_nodes.is_empty() || !canonical.unrealized_edges.is_empty() {
            self.sink.warn(&format!(
                "skeleton topology is not a tree: dropped {} node(s), ignored {} edge(s)",
                canonical.dropped_nodes.len(),
                canonical.unrealized_edges.len()
            ));
        }

        // Reader defaults, overridden by anything the caller put in
        // `options.meta`.
        let mut defaults = SkeletonMeta::new();
        defaults.name = parsed
            .thing_name
            .or_else(|| Some(self.name_fallback.to_string()));
        defaults.origin = Some("nml".to_string());
        defaults.file = file;
        defaults.archive_id = archive_id;
        let meta = defaults.merge(&self.options.meta);

        Ok(TreeSkeleton::new(canonical.nodes, meta)?)
    }
}

struct ParsedDocument {
    nodes: Vec<RawNode>,
    edges: Vec<Edge>,
    thing_name: Option<String>,
}

/// Event-loop pass over the document: collect the first `<thing>`'s node
/// and edge tables. Sections are positional (first child element of the
/// thing is the node list, second the edge list), matching the format
/// rather than relying on element names.
fn parse_document(xml: &str, options: &ReadOptions) -> Result<ParsedDocument> {
    let mut reader = Reader::from_str(xml);

    let mut nodes: Vec<RawNode> = Vec::new();
    let mut edges: Vec<Edge> = Vec::new();
    let mut thing_name: Option<String> = None;

    let mut depth = 0usize;
    let mut saw_thing = false;
    let mut in_thing = false;
    let mut thing_done = false;
    let mut child_index = 0usize;
    let mut section = Section::None;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => {
                depth += 1;
                if depth == 2 && !thing_done && !in_thing && e.local_name().as_ref() == b"thing" {
                    saw_thing = true;
                    in_thing = true;
                    child_index = 0;
                    thing_name = attr_value(e, "name").map(Cow::into_owned);
                } else if in_thing && depth == 3 {
                    child_index += 1;
                    section = match child_index {
                        1 => Section::Nodes,
                        2 => Section::Edges,
                        _ => Section::Other,
                    };
                } else if in_thing && depth == 4 {
                    collect_record(e, section, options, &mut nodes, &mut edges)?;
                }
            }
            Event::Empty(ref e) => {
                let elem_depth = depth + 1;
                if elem_depth == 2 && !thing_done && !in_thing && e.local_name().as_ref() == b"thing"
                {
                    // Self-closing thing: counts as present but holds no data.
                    saw_thing = true;
                    thing_done = true;
                    thing_name = attr_value(e, "name").map(Cow::into_owned);
                } else if in_thing && elem_depth == 3 {
                    child_index += 1;
                } else if in_thing && elem_depth == 4 {
                    collect_record(e, section, options, &mut nodes, &mut edges)?;
                }
            }
            Event::End(_) => {
                if in_thing && depth == 2 {
                    in_thing = false;
                    thing_done = true;
                } else if in_thing && depth == 3 {
                    section = Section::None;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_thing {
        return Err(NmlError::MissingSection("thing"));
    }

    Ok(ParsedDocument {
        nodes,
        edges,
        thing_name,
    })
}

fn collect_record(
    e: &BytesStart,
    section: Section,
    options: &ReadOptions,
    nodes: &mut Vec<RawNode>,
    edges: &mut Vec<Edge>,
) -> Result<()> {
    match section {
        Section::Nodes => nodes.push(parse_node(e, options)?),
        Section::Edges => edges.push(parse_edge(e, options)?),
        Section::None | Section::Other => {}
    }
    Ok(())
}

fn parse_node(e: &BytesStart, options: &ReadOptions) -> Result<RawNode> {
    let id = int_attr(e, options, "node", "id")?;
    let radius = float_attr(e, options, "node", "radius")?;
    let x = float_attr(e, options, "node", "x")?;
    let y = float_attr(e, options, "node", "y")?;
    let z = float_attr(e, options, "node", "z")?;
    let label = attr_value(e, "label").map(Cow::into_owned);

    Ok(RawNode {
        id,
        label,
        x,
        y,
        z,
        radius,
    })
}

fn parse_edge(e: &BytesStart, options: &ReadOptions) -> Result<Edge> {
    let source = int_attr(e, options, "edge", "source")?;
    let target = int_attr(e, options, "edge", "target")?;
    Ok(Edge { source, target })
}

fn attr_value<'a>(e: &'a BytesStart, name: &str) -> Option<Cow<'a, str>> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name.as_bytes())
        .and_then(|a| a.unescape_value().ok())
}

fn require_attr(e: &BytesStart, element: &'static str, attribute: &'static str) -> Result<String> {
    attr_value(e, attribute)
        .map(Cow::into_owned)
        .ok_or(NmlError::AttributeMissing { element, attribute })
}

fn int_attr(
    e: &BytesStart,
    options: &ReadOptions,
    element: &'static str,
    attribute: &'static str,
) -> Result<i64> {
    let raw = require_attr(e, element, attribute)?;
    options
        .precision
        .parse_id(&raw)
        .ok_or(NmlError::AttributeInvalid {
            element,
            attribute,
            value: raw,
        })
}

fn float_attr(
    e: &BytesStart,
    options: &ReadOptions,
    element: &'static str,
    attribute: &'static str,
) -> Result<f64> {
    let raw = require_attr(e, element, attribute)?;
    options
        .precision
        .parse_float(&raw)
        .ok_or(NmlError::AttributeInvalid {
            element,
            attribute,
            value: raw,
        })
}
