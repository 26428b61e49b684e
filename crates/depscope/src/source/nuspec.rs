//! `.nuspec` package metadata parsing.
//!
//! Only two things are read from a manifest: the package id
//! (`package/metadata/id`) and the ids of its dependencies, which may sit
//! directly under `metadata/dependencies` or inside framework-specific
//! `group` elements. Namespaces are ignored. Version ranges are not read.

use crate::domain::PackageName;
use crate::error::SourceError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashSet;

/// Package id and dependency ids read from one manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NuspecManifest {
    /// Value of `metadata/id`, if present.
    pub id: Option<PackageName>,
    /// Dependency ids, deduplicated in document order.
    pub dependencies: Vec<PackageName>,
}

/// Parse a `.nuspec` document.
///
/// # Errors
///
/// Returns `SourceError::Parse` if the document is not well-formed XML.
pub fn parse(xml: &str) -> Result<NuspecManifest, SourceError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // Local names of the currently open elements.
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut id = None;
    let mut dependencies = Vec::new();
    let mut seen = HashSet::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if is_dependency(&e, &path) {
                    push_dependency(&e, &mut dependencies, &mut seen)?;
                }
                path.push(e.local_name().as_ref().to_vec());
            }
            Ok(Event::Empty(e)) => {
                if is_dependency(&e, &path) {
                    push_dependency(&e, &mut dependencies, &mut seen)?;
                }
            }
            Ok(Event::Text(t)) => {
                if ends_with(&path, &[b"metadata", b"id"]) {
                    let text = t.unescape().map_err(|e| SourceError::Parse(e.to_string()))?;
                    let text = text.trim();
                    if !text.is_empty() {
                        id = Some(PackageName::from(text));
                    }
                }
            }
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(SourceError::Parse(format!(
                    "invalid XML at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
        }
    }

    Ok(NuspecManifest { id, dependencies })
}

fn ends_with(path: &[Vec<u8>], suffix: &[&[u8]]) -> bool {
    path.len() >= suffix.len()
        && path[path.len() - suffix.len()..]
            .iter()
            .zip(suffix)
            .all(|(a, b)| a.as_slice() == *b)
}

/// A `dependency` element directly under `metadata/dependencies` or under
/// `metadata/dependencies/group`.
fn is_dependency(e: &BytesStart<'_>, path: &[Vec<u8>]) -> bool {
    e.local_name().as_ref() == b"dependency"
        && (ends_with(path, &[b"metadata", b"dependencies"])
            || ends_with(path, &[b"metadata", b"dependencies", b"group"]))
}

fn push_dependency(
    e: &BytesStart<'_>,
    dependencies: &mut Vec<PackageName>,
    seen: &mut HashSet<String>,
) -> Result<(), SourceError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| SourceError::Parse(err.to_string()))?;
        if attr.key.local_name().as_ref() != b"id" {
            continue;
        }
        let value = attr
            .unescape_value()
            .map_err(|err| SourceError::Parse(err.to_string()))?;
        let value = value.trim();
        if !value.is_empty() && seen.insert(value.to_string()) {
            dependencies.push(PackageName::from(value));
        }
    }
    Ok(())
}
