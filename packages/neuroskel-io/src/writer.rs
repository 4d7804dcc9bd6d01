//! NML encoder
//!
//! Inverse of the reader: a canonicalized skeleton becomes a
//! `things → parameters, thing → nodes, edges` document. Node ids are
//! reindexed from 1; every non-root node contributes one
//! `<edge source=parent target=self>` element; the root contributes none.
//! Output is indented with two spaces for human readability, a
//! formatting contract rather than a semantic one.
//!
//! Encode-side errors always surface; there is no silent skip. Writing
//! the archived (NMX) variant is not supported.

use std::collections::BTreeMap;
use std::path::Path;

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use neuroskel_core::{TreeSkeleton, ROOT_SENTINEL};

use crate::errors::Result;

/// Encode a skeleton to NML bytes.
pub fn nml_to_bytes(skeleton: &TreeSkeleton) -> Result<Vec<u8>> {
    emit(skeleton).map(|(bytes, _)| bytes)
}

/// Encode a skeleton to NML bytes, also returning the old→new node id
/// map produced by reindexing.
pub fn nml_to_bytes_with_map(skeleton: &TreeSkeleton) -> Result<(Vec<u8>, BTreeMap<i64, i64>)> {
    emit(skeleton)
}

/// Write a skeleton to an NML file. Existing files are overwritten.
pub fn write_nml(skeleton: &TreeSkeleton, path: impl AsRef<Path>) -> Result<()> {
    let bytes = nml_to_bytes(skeleton)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Write a skeleton to an NML file and return the old→new node id map.
pub fn write_nml_with_map(
    skeleton: &TreeSkeleton,
    path: impl AsRef<Path>,
) -> Result<BTreeMap<i64, i64>> {
    let (bytes, node_map) = nml_to_bytes_with_map(skeleton)?;
    std::fs::write(path, bytes)?;
    Ok(node_map)
}

fn emit(skeleton: &TreeSkeleton) -> Result<(Vec<u8>, BTreeMap<i64, i64>)> {
    let exported = skeleton.export_table();
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Start(BytesStart::new("things")))?;

    // Parameters section: identity offset/scale. Decoders ignore it.
    writer.write_event(Event::Start(BytesStart::new("parameters")))?;
    let mut offset = BytesStart::new("offset");
    offset.extend_attributes([("x", "0"), ("y", "0"), ("z", "0")]);
    writer.write_event(Event::Empty(offset))?;
    let mut scale = BytesStart::new("scale");
    scale.extend_attributes([("x", "1"), ("y", "1"), ("z", "1")]);
    writer.write_event(Event::Empty(scale))?;
    writer.write_event(Event::End(BytesEnd::new("parameters")))?;

    let name = skeleton
        .meta()
        .name
        .clone()
        .unwrap_or_else(|| "NML".to_string());
    let mut thing = BytesStart::new("thing");
    thing.push_attribute(("id", "1"));
    thing.push_attribute(("name", name.as_str()));
    thing.extend_attributes([
        ("color.r", "0.0"),
        ("color.g", "0.0"),
        ("color.b", "1.0"),
        ("color.a", "1.0"),
    ]);
    writer.write_event(Event::Start(thing))?;

    writer.write_event(Event::Start(BytesStart::new("nodes")))?;
    for row in &exported.rows {
        let id = row.id.to_string();
        let radius = row.radius.to_string();
        let x = row.x.to_string();
        let y = row.y.to_string();
        let z = row.z.to_string();

        let mut node = BytesStart::new("node");
        node.push_attribute(("id", id.as_str()));
        node.push_attribute(("radius", radius.as_str()));
        node.push_attribute(("x", x.as_str()));
        node.push_attribute(("y", y.as_str()));
        node.push_attribute(("z", z.as_str()));
        writer.write_event(Event::Empty(node))?;
    }
    writer.write_event(Event::End(BytesEnd::new("nodes")))?;

    writer.write_event(Event::Start(BytesStart::new("edges")))?;
    for row in &exported.rows {
        if row.parent_id == ROOT_SENTINEL {
            continue;
        }
        let source = row.parent_id.to_string();
        let target = row.id.to_string();

        let mut edge = BytesStart::new("edge");
        edge.push_attribute(("source", source.as_str()));
        edge.push_attribute(("target", target.as_str()));
        writer.write_event(Event::Empty(edge))?;
    }
    writer.write_event(Event::End(BytesEnd::new("edges")))?;

    writer.write_event(Event::End(BytesEnd::new("thing")))?;
    writer.write_event(Event::End(BytesEnd::new("things")))?;

    Ok((writer.into_inner(), exported.node_map))
}
