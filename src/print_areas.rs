//! Print-area extraction from workbook defined names.
//!
//! User-defined print areas live in `xl/workbook.xml` as `definedName`
//! entries named `_xlnm.Print_Area`, scoped to a sheet by `localSheetId`
//! (the sheet's position in the manifest). One entry may hold several
//! comma-separated ranges.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{BufReader, Read, Seek};
use zip::ZipArchive;

use crate::cell_ref::parse_cell_range;
use crate::types::PrintArea;

const PRINT_AREA_NAME: &str = "_xlnm.Print_Area";

/// Extract print areas for every sheet, keyed by sheet position in the
/// workbook manifest.
///
/// A workbook without defined names (or without a readable manifest)
/// yields an empty map; print areas degrade, never abort.
pub fn workbook_print_areas<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> HashMap<usize, Vec<PrintArea>> {
    let mut areas: HashMap<usize, Vec<PrintArea>> = HashMap::new();

    let Ok(file) = archive.by_name("xl/workbook.xml") else {
        return areas;
    };

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut buf = Vec::new();
    let mut pending_sheet: Option<usize> = None;

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"definedName" {
                    let mut name = String::new();
                    let mut local_sheet: Option<usize> = None;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => {
                                name = std::str::from_utf8(&attr.value).unwrap_or("").to_string();
                            }
                            b"localSheetId" => {
                                local_sheet =
                                    std::str::from_utf8(&attr.value).ok().and_then(|s| s.parse().ok());
                            }
                            _ => {}
                        }
                    }

                    if name == PRINT_AREA_NAME {
                        pending_sheet = local_sheet;
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(sheet_idx) = pending_sheet {
                    if let Ok(text) = e.unescape() {
                        let parsed = parse_print_area_ranges(&text);
                        if !parsed.is_empty() {
                            areas.entry(sheet_idx).or_default().extend(parsed);
                        }
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                if e.local_name().as_ref() == b"definedName" {
                    pending_sheet = None;
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    areas
}

/// Parse a defined-name value (possibly several comma-separated ranges)
/// into inclusive print-area bounds.
fn parse_print_area_ranges(value: &str) -> Vec<PrintArea> {
    value
        .split(',')
        .filter_map(parse_cell_range)
        .map(|(r1, c1, r2, c2)| PrintArea {
            r1: r1 + 1,
            c1,
            r2: r2 + 1,
            c2,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_range() {
        let areas = parse_print_area_ranges("Sheet1!$A$1:$D$10");
        assert_eq!(
            areas,
            vec![PrintArea {
                r1: 1,
                c1: 0,
                r2: 10,
                c2: 3
            }]
        );
    }

    #[test]
    fn parses_comma_separated_ranges() {
        let areas = parse_print_area_ranges("Sheet1!$A$1:$B$2,Sheet1!$D$5:$E$6");
        assert_eq!(areas.len(), 2);
        assert_eq!(
            areas.get(1),
            Some(&PrintArea {
                r1: 5,
                c1: 3,
                r2: 6,
                c2: 4
            })
        );
    }

    #[test]
    fn malformed_parts_are_skipped() {
        let areas = parse_print_area_ranges("notarange,Sheet1!$A$1:$B$2");
        assert_eq!(areas.len(), 1);
    }
}
