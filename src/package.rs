//! Package and relationship resolution.
//!
//! Maps sheet names to worksheet parts via the workbook manifest
//! (`xl/workbook.xml`) and its relationships, then worksheet parts to
//! drawing parts, and drawing parts to chart parts, by walking the
//! conventional `_rels` files. A missing relationship part never fails a
//! whole extraction; it just resolves to nothing for that sheet.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{BufReader, Read, Seek};
use zip::ZipArchive;

use crate::error::{Result, XlstructError};

/// One sheet from the workbook manifest, in manifest order.
#[derive(Debug, Clone)]
pub struct SheetEntry {
    /// Display name of the sheet.
    pub name: String,
    /// Full worksheet part path, e.g. `xl/worksheets/sheet1.xml`.
    pub path: String,
}

/// Read the sheet manifest: names, worksheet paths, workbook order.
///
/// # Errors
/// Returns [`XlstructError::InvalidPackage`] when the workbook manifest is
/// missing — an archive without `xl/workbook.xml` is not a spreadsheet
/// package.
pub fn sheet_entries<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<SheetEntry>> {
    let rels = worksheet_relationships(archive);

    let file = archive
        .by_name("xl/workbook.xml")
        .map_err(|_| XlstructError::InvalidPackage("missing xl/workbook.xml".to_string()))?;

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut sheets = Vec::new();
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e) | Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"sheet" {
                    let mut name = String::new();
                    let mut r_id = String::new();

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => {
                                name = std::str::from_utf8(&attr.value).unwrap_or("").to_string();
                            }
                            key if key.ends_with(b":id") || key == b"id" => {
                                r_id = std::str::from_utf8(&attr.value).unwrap_or("").to_string();
                            }
                            _ => {}
                        }
                    }

                    if !name.is_empty() {
                        // Fall back to the conventional path when the
                        // relationship entry is absent.
                        let path = rels.get(&r_id).cloned().unwrap_or_else(|| {
                            let idx = sheets.len() + 1;
                            format!("xl/worksheets/sheet{idx}.xml")
                        });
                        sheets.push(SheetEntry { name, path });
                    }
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}

/// Parse `xl/_rels/workbook.xml.rels` into an rId → worksheet path map.
fn worksheet_relationships<R: Read + Seek>(archive: &mut ZipArchive<R>) -> HashMap<String, String> {
    relationships_by_type(archive, "xl/_rels/workbook.xml.rels", "xl", "worksheet")
}

/// Resolve the drawing part for a worksheet, if any.
///
/// Looks in the sheet's own rels file for a relationship whose type
/// contains "drawing". A missing rels part yields `None`.
pub fn drawing_path_for_sheet<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    sheet_path: &str,
) -> Option<String> {
    let sheet_path = sheet_path.trim_start_matches('/');
    let base_dir = parent_dir(sheet_path);
    let rels = relationships_by_type(archive, &rels_path_for(sheet_path), base_dir, "drawing");
    rels.into_values().next()
}

/// Resolve chart parts referenced by a drawing: rId → chart part path.
pub fn chart_paths_for_drawing<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    drawing_path: &str,
) -> HashMap<String, String> {
    let drawing_path = drawing_path.trim_start_matches('/');
    let base_dir = parent_dir(drawing_path);
    relationships_by_type(archive, &rels_path_for(drawing_path), base_dir, "chart")
}

/// Resolve external hyperlink targets for a worksheet: rId → target URI.
pub fn hyperlink_targets_for_sheet<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    sheet_path: &str,
) -> HashMap<String, String> {
    let sheet_path = sheet_path.trim_start_matches('/');
    let mut targets = HashMap::new();
    read_relationships(archive, &rels_path_for(sheet_path), |id, target, rel_type| {
        if rel_type.contains("hyperlink") && !id.is_empty() && !target.is_empty() {
            // Hyperlink targets are external URIs, not package parts;
            // keep them verbatim.
            targets.insert(id.to_string(), target.to_string());
        }
    });
    targets
}

/// Filter a rels part by relationship type substring, resolving targets
/// against `base_dir`.
fn relationships_by_type<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    rels_path: &str,
    base_dir: &str,
    type_fragment: &str,
) -> HashMap<String, String> {
    let mut resolved = HashMap::new();
    read_relationships(archive, rels_path, |id, target, rel_type| {
        if rel_type.contains(type_fragment) && !id.is_empty() && !target.is_empty() {
            resolved.insert(id.to_string(), resolve_relative_path(base_dir, target));
        }
    });
    resolved
}

/// Stream a rels part, invoking `visit(id, target, type)` per entry.
///
/// A missing or malformed rels part simply visits nothing.
fn read_relationships<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    rels_path: &str,
    mut visit: impl FnMut(&str, &str, &str),
) {
    let Ok(file) = archive.by_name(rels_path) else {
        return;
    };

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e) | Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"Relationship" {
                    let mut id = String::new();
                    let mut target = String::new();
                    let mut rel_type = String::new();

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => {
                                id = std::str::from_utf8(&attr.value).unwrap_or("").to_string();
                            }
                            b"Target" => {
                                target = std::str::from_utf8(&attr.value).unwrap_or("").to_string();
                            }
                            b"Type" => {
                                rel_type =
                                    std::str::from_utf8(&attr.value).unwrap_or("").to_string();
                            }
                            _ => {}
                        }
                    }

                    visit(&id, &target, &rel_type);
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
}

/// Construct the relationships part path for a package part.
/// e.g. `xl/drawings/drawing1.xml` → `xl/drawings/_rels/drawing1.xml.rels`
pub(crate) fn rels_path_for(part_path: &str) -> String {
    if let Some(pos) = part_path.rfind('/') {
        let dir = part_path.get(..pos).unwrap_or_default();
        let filename = part_path.get(pos + 1..).unwrap_or_default();
        format!("{dir}/_rels/{filename}.rels")
    } else {
        format!("_rels/{part_path}.rels")
    }
}

/// Resolve a relationship target against a base directory.
///
/// Handles `../` segment stripping and path-absolute targets
/// (leading `/` means package-root relative).
pub(crate) fn resolve_relative_path(base_dir: &str, target: &str) -> String {
    if let Some(stripped) = target.strip_prefix('/') {
        return stripped.to_string();
    }

    let mut components: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();

    for part in target.split('/') {
        match part {
            ".." => {
                components.pop();
            }
            "." | "" => {}
            _ => components.push(part),
        }
    }

    components.join("/")
}

/// Parent directory of a package part path ("" at package root).
fn parent_dir(part_path: &str) -> &str {
    match part_path.rfind('/') {
        Some(pos) => part_path.get(..pos).unwrap_or_default(),
        None => "",
    }
}
