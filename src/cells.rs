//! Worksheet cell-grid reader.
//!
//! Produces the raw string grid the table detector and downstream
//! consumers operate on: per sheet, an ordered list of rows holding
//! column-indexed string values, plus an optional per-cell hyperlink
//! lookup. Values stay strings — shared strings and inline strings are
//! resolved, numbers/booleans/errors keep their stored text.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::io::{BufReader, Read, Seek};
use zip::ZipArchive;

use crate::cell_ref::parse_cell_ref;
use crate::error::Result;
use crate::package::hyperlink_targets_for_sheet;
use crate::types::CellRow;

/// Parse `xl/sharedStrings.xml` into an indexed string table.
///
/// A missing shared-strings part is normal for workbooks without string
/// cells and yields an empty table.
pub fn parse_shared_strings<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Vec<String> {
    let Ok(file) = archive.by_name("xl/sharedStrings.xml") else {
        return Vec::new();
    };

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(false);

    let mut strings = Vec::new();
    let mut buf = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    let mut in_t = false;

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"t" if in_si => in_t = true,
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_t => {
                if let Ok(text) = e.unescape() {
                    current.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"si" => {
                    strings.push(current.clone());
                    in_si = false;
                }
                b"t" => in_t = false,
                _ => {}
            },
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    strings
}

/// Read one worksheet's cell rows as strings.
///
/// Rows without any non-empty value are omitted. When `include_links` is
/// set, worksheet `hyperlink` elements are resolved through the sheet's
/// relationships (external targets) or kept as in-workbook locations, and
/// attached per row.
///
/// # Errors
/// Returns an error when the worksheet XML is malformed; a missing
/// worksheet part yields no rows.
pub fn read_sheet_rows<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    sheet_path: &str,
    shared_strings: &[String],
    include_links: bool,
) -> Result<Vec<CellRow>> {
    let links = if include_links {
        sheet_hyperlinks(archive, sheet_path)
    } else {
        BTreeMap::new()
    };

    let normalized_path = sheet_path.trim_start_matches('/');
    let Ok(file) = archive.by_name(normalized_path) else {
        return Ok(Vec::new());
    };

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(false);

    let mut buf = Vec::new();
    let mut rows: Vec<CellRow> = Vec::new();

    let mut current_row: Option<CellRow> = None;
    let mut cell_col: Option<u32> = None;
    let mut cell_type = CellType::Number;
    let mut in_v = false;
    let mut in_is = false;
    let mut in_is_t = false;
    let mut pending_value = String::new();

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e) | Event::Empty(ref e)) => {
                match e.local_name().as_ref() {
                    b"row" => {
                        let mut r = u32::try_from(rows.len()).map_or(u32::MAX, |n| n + 1);
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"r" {
                                if let Some(parsed) =
                                    std::str::from_utf8(&attr.value).ok().and_then(|s| s.parse().ok())
                                {
                                    r = parsed;
                                }
                            }
                        }
                        current_row = Some(CellRow {
                            r,
                            c: BTreeMap::new(),
                            links: None,
                        });
                    }
                    b"c" => {
                        cell_col = None;
                        cell_type = CellType::Number;
                        pending_value.clear();
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"r" => {
                                    if let Ok(cell_ref) = std::str::from_utf8(&attr.value) {
                                        cell_col = parse_cell_ref(cell_ref).map(|(col, _)| col);
                                    }
                                }
                                b"t" => {
                                    cell_type = match attr.value.as_ref() {
                                        b"s" => CellType::Shared,
                                        b"inlineStr" => CellType::Inline,
                                        _ => CellType::Number,
                                    };
                                }
                                _ => {}
                            }
                        }
                        // Cells without an r attribute take the next column.
                        if cell_col.is_none() {
                            cell_col = current_row
                                .as_ref()
                                .map(|row| row.c.keys().next_back().map_or(0, |last| last + 1));
                        }
                    }
                    b"v" => in_v = true,
                    b"is" => in_is = true,
                    b"t" if in_is => in_is_t = true,
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_v || in_is_t {
                    if let Ok(text) = e.unescape() {
                        pending_value.push_str(&text);
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"v" => in_v = false,
                b"is" => in_is = false,
                b"t" => in_is_t = false,
                b"c" => {
                    if let (Some(col), Some(ref mut row)) = (cell_col, &mut current_row) {
                        let value = match cell_type {
                            CellType::Shared => pending_value
                                .trim()
                                .parse::<usize>()
                                .ok()
                                .and_then(|idx| shared_strings.get(idx).cloned())
                                .unwrap_or_default(),
                            CellType::Inline | CellType::Number => pending_value.clone(),
                        };
                        if !value.trim().is_empty() {
                            row.c.insert(col, value);
                        }
                    }
                    cell_col = None;
                    pending_value.clear();
                }
                b"row" => {
                    if let Some(mut row) = current_row.take() {
                        if !row.c.is_empty() {
                            if !links.is_empty() {
                                let row_links: BTreeMap<u32, String> = links
                                    .iter()
                                    .filter(|((r, _), _)| *r == row.r)
                                    .map(|((_, col), target)| (*col, target.clone()))
                                    .collect();
                                if !row_links.is_empty() {
                                    row.links = Some(row_links);
                                }
                            }
                            rows.push(row);
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(rows)
}

#[derive(Debug, Clone, Copy)]
enum CellType {
    Number,
    Shared,
    Inline,
}

/// Collect `(row, col)` → hyperlink target for one worksheet.
///
/// External links resolve their `r:id` through the sheet relationships;
/// in-workbook links keep their `location` reference.
fn sheet_hyperlinks<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    sheet_path: &str,
) -> BTreeMap<(u32, u32), String> {
    let targets = hyperlink_targets_for_sheet(archive, sheet_path);

    let mut links = BTreeMap::new();
    let normalized_path = sheet_path.trim_start_matches('/');
    let Ok(file) = archive.by_name(normalized_path) else {
        return links;
    };

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e) | Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"hyperlink" {
                    let mut cell: Option<(u32, u32)> = None;
                    let mut target: Option<String> = None;
                    let mut location: Option<String> = None;

                    for attr in e.attributes().flatten() {
                        let key = attr.key.as_ref();
                        if key == b"ref" {
                            if let Ok(cell_ref) = std::str::from_utf8(&attr.value) {
                                cell = parse_cell_ref(cell_ref).map(|(col, row)| (row + 1, col));
                            }
                        } else if key == b"id" || key.ends_with(b":id") {
                            target = std::str::from_utf8(&attr.value)
                                .ok()
                                .and_then(|id| targets.get(id).cloned());
                        } else if key == b"location" {
                            location = std::str::from_utf8(&attr.value)
                                .ok()
                                .map(ToString::to_string);
                        }
                    }

                    if let (Some(cell), Some(resolved)) = (cell, target.or(location)) {
                        links.insert(cell, resolved);
                    }
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    links
}
