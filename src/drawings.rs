//! DrawingML parser: shapes, connectors and flattened groups.
//!
//! Walks a drawing part (`xl/drawings/drawing*.xml`) in one streaming pass
//! over its anchor elements and produces flat shape/connector records.
//! Group shapes are flattened — their children splice into the same list
//! and no record is emitted for the group itself. Chart frames in the same
//! part are handled separately by [`crate::charts`].
//!
//! # Drawing structure
//!
//! ```xml
//! <xdr:wsDr xmlns:xdr="...spreadsheetDrawing" xmlns:a="...main">
//!   <xdr:twoCellAnchor>
//!     <xdr:sp>
//!       <xdr:nvSpPr><xdr:cNvPr id="2" name="Rect 1"/></xdr:nvSpPr>
//!       <xdr:spPr>
//!         <a:xfrm rot="0"><a:off x="0" y="0"/><a:ext cx="914400" cy="914400"/></a:xfrm>
//!         <a:prstGeom prst="rect"/>
//!         <a:ln><a:headEnd type="none"/><a:tailEnd type="triangle"/></a:ln>
//!       </xdr:spPr>
//!       <xdr:txBody><a:p><a:r><a:t>text</a:t></a:r></a:p></xdr:txBody>
//!     </xdr:sp>
//!     <xdr:cxnSp>
//!       <xdr:nvCxnSpPr>
//!         <xdr:cNvPr id="5" name="Connector 4"/>
//!         <xdr:cNvCxnSpPr><a:stCxn id="2"/><a:endCxn id="3"/></xdr:cNvCxnSpPr>
//!       </xdr:nvCxnSpPr>
//!       ...
//!     </xdr:cxnSp>
//!   </xdr:twoCellAnchor>
//! </xdr:wsDr>
//! ```

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{BufReader, Read, Seek};
use zip::ZipArchive;

use crate::error::Result;
use crate::maps::{arrow_style_for, is_connector_preset, type_label_for};
use crate::resolve::resolve_ids;
use crate::types::{ConnectorRecord, Direction, DrawingObject, ExtractionMode, ShapeRecord};
use crate::units::{emu_to_pixels, rotation_degrees};

/// Nesting bound for group flattening; content buried deeper than this in
/// pathological documents is skipped rather than recursed into.
const MAX_GROUP_DEPTH: u32 = 32;

/// A parsed drawing object plus the raw document identifiers needed by the
/// two-pass id resolver. The raw identifiers never leave the crate; public
/// records carry only resolved sequential ids.
#[derive(Debug, Clone)]
pub(crate) struct ParsedObject {
    pub object: DrawingObject,
    /// `cNvPr` id of the element, when present.
    pub source_id: Option<String>,
    /// `stCxn` id captured from a connector, when present.
    pub begin_ref: Option<String>,
    /// `endCxn` id captured from a connector, when present.
    pub end_ref: Option<String>,
}

/// Parse a drawing part, apply the mode filter, and resolve sequential ids.
///
/// This is the complete per-sheet shape pipeline: a missing drawing part
/// yields an empty list, while a malformed one surfaces as an error the
/// caller downgrades to a per-sheet warning.
///
/// # Errors
/// Returns an error when the drawing XML is malformed.
pub fn extract_drawing_objects<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    drawing_path: &str,
    mode: ExtractionMode,
) -> Result<Vec<DrawingObject>> {
    let parsed = parse_drawing_part(archive, drawing_path)?;
    let filtered = apply_mode_filter(parsed, mode);
    Ok(resolve_ids(filtered))
}

/// Parse every shape and connector in a drawing part, groups flattened,
/// in document order. No mode filtering and no id assignment happens here.
pub(crate) fn parse_drawing_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    drawing_path: &str,
) -> Result<Vec<ParsedObject>> {
    let normalized_path = drawing_path.trim_start_matches('/');

    let Ok(file) = archive.by_name(normalized_path) else {
        return Ok(Vec::new());
    };

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    // Run-internal whitespace is significant; the final text is trimmed
    // once after all runs are concatenated.
    xml.trim_text(false);

    let mut buf = Vec::new();
    let mut objects = Vec::new();

    // Current parsing state
    let mut current: Option<ObjectBuilder> = None;
    let mut group_depth: u32 = 0;
    let mut in_sp_pr = false;
    let mut in_xfrm = false;
    let mut in_ln = false;
    let mut in_tx_body = false;
    let mut in_t = false;

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let local_name = e.local_name();
                let name = std::str::from_utf8(local_name.as_ref()).unwrap_or("");

                match name {
                    "grpSp" => group_depth += 1,
                    "sp" if current.is_none() && group_depth <= MAX_GROUP_DEPTH => {
                        current = Some(ObjectBuilder::new(false));
                    }
                    "cxnSp" if current.is_none() && group_depth <= MAX_GROUP_DEPTH => {
                        current = Some(ObjectBuilder::new(true));
                    }
                    "cNvPr" => {
                        if let Some(ref mut b) = current {
                            if b.source_id.is_none() && b.name.is_empty() {
                                for attr in e.attributes().flatten() {
                                    match attr.key.as_ref() {
                                        b"id" => {
                                            b.source_id = std::str::from_utf8(&attr.value)
                                                .ok()
                                                .map(ToString::to_string);
                                        }
                                        b"name" => {
                                            b.name = std::str::from_utf8(&attr.value)
                                                .unwrap_or("")
                                                .to_string();
                                        }
                                        _ => {}
                                    }
                                }
                            }
                        }
                    }
                    "stCxn" | "endCxn" => {
                        if let Some(ref mut b) = current {
                            for attr in e.attributes().flatten() {
                                if attr.key.as_ref() == b"id" {
                                    let id = std::str::from_utf8(&attr.value)
                                        .ok()
                                        .map(ToString::to_string);
                                    if name == "stCxn" {
                                        b.begin_ref = id;
                                    } else {
                                        b.end_ref = id;
                                    }
                                }
                            }
                        }
                    }
                    "spPr" if current.is_some() => in_sp_pr = true,
                    "xfrm" if in_sp_pr => {
                        in_xfrm = true;
                        if let Some(ref mut b) = current {
                            if !b.seen_xfrm {
                                for attr in e.attributes().flatten() {
                                    if attr.key.as_ref() == b"rot" {
                                        b.rot = std::str::from_utf8(&attr.value)
                                            .ok()
                                            .and_then(|s| s.parse().ok());
                                    }
                                }
                            }
                        }
                    }
                    "off" if in_xfrm => {
                        if let Some(ref mut b) = current {
                            if !b.seen_xfrm {
                                let mut x: i64 = 0;
                                let mut y: i64 = 0;
                                for attr in e.attributes().flatten() {
                                    match attr.key.as_ref() {
                                        b"x" => {
                                            x = std::str::from_utf8(&attr.value)
                                                .ok()
                                                .and_then(|s| s.parse().ok())
                                                .unwrap_or(0);
                                        }
                                        b"y" => {
                                            y = std::str::from_utf8(&attr.value)
                                                .ok()
                                                .and_then(|s| s.parse().ok())
                                                .unwrap_or(0);
                                        }
                                        _ => {}
                                    }
                                }
                                b.offset = Some((x, y));
                            }
                        }
                    }
                    "ext" if in_xfrm => {
                        if let Some(ref mut b) = current {
                            if !b.seen_xfrm {
                                let mut cx: i64 = 0;
                                let mut cy: i64 = 0;
                                for attr in e.attributes().flatten() {
                                    match attr.key.as_ref() {
                                        b"cx" => {
                                            cx = std::str::from_utf8(&attr.value)
                                                .ok()
                                                .and_then(|s| s.parse().ok())
                                                .unwrap_or(0);
                                        }
                                        b"cy" => {
                                            cy = std::str::from_utf8(&attr.value)
                                                .ok()
                                                .and_then(|s| s.parse().ok())
                                                .unwrap_or(0);
                                        }
                                        _ => {}
                                    }
                                }
                                b.extent = Some((cx, cy));
                            }
                        }
                    }
                    "prstGeom" if in_sp_pr => {
                        if let Some(ref mut b) = current {
                            for attr in e.attributes().flatten() {
                                if attr.key.as_ref() == b"prst" {
                                    b.preset = std::str::from_utf8(&attr.value)
                                        .ok()
                                        .map(ToString::to_string);
                                }
                            }
                        }
                    }
                    "ln" if in_sp_pr => in_ln = true,
                    "headEnd" | "tailEnd" if in_ln => {
                        if let Some(ref mut b) = current {
                            let mut head_type = "none".to_string();
                            for attr in e.attributes().flatten() {
                                if attr.key.as_ref() == b"type" {
                                    head_type =
                                        std::str::from_utf8(&attr.value).unwrap_or("none").to_string();
                                }
                            }
                            if name == "headEnd" {
                                b.head_type = Some(head_type);
                            } else {
                                b.tail_type = Some(head_type);
                            }
                        }
                    }
                    "txBody" if current.is_some() => in_tx_body = true,
                    "t" if in_tx_body => in_t = true,
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                let local_name = e.local_name();
                let name = std::str::from_utf8(local_name.as_ref()).unwrap_or("");

                // Self-closing variants of the attribute-only elements.
                match name {
                    "cNvPr" => {
                        if let Some(ref mut b) = current {
                            if b.source_id.is_none() && b.name.is_empty() {
                                for attr in e.attributes().flatten() {
                                    match attr.key.as_ref() {
                                        b"id" => {
                                            b.source_id = std::str::from_utf8(&attr.value)
                                                .ok()
                                                .map(ToString::to_string);
                                        }
                                        b"name" => {
                                            b.name = std::str::from_utf8(&attr.value)
                                                .unwrap_or("")
                                                .to_string();
                                        }
                                        _ => {}
                                    }
                                }
                            }
                        }
                    }
                    "stCxn" | "endCxn" => {
                        if let Some(ref mut b) = current {
                            for attr in e.attributes().flatten() {
                                if attr.key.as_ref() == b"id" {
                                    let id = std::str::from_utf8(&attr.value)
                                        .ok()
                                        .map(ToString::to_string);
                                    if name == "stCxn" {
                                        b.begin_ref = id;
                                    } else {
                                        b.end_ref = id;
                                    }
                                }
                            }
                        }
                    }
                    "xfrm" if in_sp_pr => {
                        // A self-closing transform can still carry rotation.
                        if let Some(ref mut b) = current {
                            if !b.seen_xfrm {
                                for attr in e.attributes().flatten() {
                                    if attr.key.as_ref() == b"rot" {
                                        b.rot = std::str::from_utf8(&attr.value)
                                            .ok()
                                            .and_then(|s| s.parse().ok());
                                    }
                                }
                                b.seen_xfrm = true;
                            }
                        }
                    }
                    "off" if in_xfrm => {
                        if let Some(ref mut b) = current {
                            if !b.seen_xfrm {
                                let mut x: i64 = 0;
                                let mut y: i64 = 0;
                                for attr in e.attributes().flatten() {
                                    match attr.key.as_ref() {
                                        b"x" => {
                                            x = std::str::from_utf8(&attr.value)
                                                .ok()
                                                .and_then(|s| s.parse().ok())
                                                .unwrap_or(0);
                                        }
                                        b"y" => {
                                            y = std::str::from_utf8(&attr.value)
                                                .ok()
                                                .and_then(|s| s.parse().ok())
                                                .unwrap_or(0);
                                        }
                                        _ => {}
                                    }
                                }
                                b.offset = Some((x, y));
                            }
                        }
                    }
                    "ext" if in_xfrm => {
                        if let Some(ref mut b) = current {
                            if !b.seen_xfrm {
                                let mut cx: i64 = 0;
                                let mut cy: i64 = 0;
                                for attr in e.attributes().flatten() {
                                    match attr.key.as_ref() {
                                        b"cx" => {
                                            cx = std::str::from_utf8(&attr.value)
                                                .ok()
                                                .and_then(|s| s.parse().ok())
                                                .unwrap_or(0);
                                        }
                                        b"cy" => {
                                            cy = std::str::from_utf8(&attr.value)
                                                .ok()
                                                .and_then(|s| s.parse().ok())
                                                .unwrap_or(0);
                                        }
                                        _ => {}
                                    }
                                }
                                b.extent = Some((cx, cy));
                            }
                        }
                    }
                    "prstGeom" if in_sp_pr => {
                        if let Some(ref mut b) = current {
                            for attr in e.attributes().flatten() {
                                if attr.key.as_ref() == b"prst" {
                                    b.preset = std::str::from_utf8(&attr.value)
                                        .ok()
                                        .map(ToString::to_string);
                                }
                            }
                        }
                    }
                    "headEnd" | "tailEnd" if in_ln => {
                        if let Some(ref mut b) = current {
                            let mut head_type = "none".to_string();
                            for attr in e.attributes().flatten() {
                                if attr.key.as_ref() == b"type" {
                                    head_type = std::str::from_utf8(&attr.value)
                                        .unwrap_or("none")
                                        .to_string();
                                }
                            }
                            if name == "headEnd" {
                                b.head_type = Some(head_type);
                            } else {
                                b.tail_type = Some(head_type);
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_t {
                    if let (Some(ref mut b), Ok(text)) = (&mut current, e.unescape()) {
                        b.text_parts.push(text.to_string());
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let local_name = e.local_name();
                let name = std::str::from_utf8(local_name.as_ref()).unwrap_or("");

                match name {
                    "sp" | "cxnSp" => {
                        if let Some(builder) = current.take() {
                            if let Some(object) = builder.build() {
                                objects.push(object);
                            }
                        }
                        in_sp_pr = false;
                        in_ln = false;
                        in_tx_body = false;
                        in_t = false;
                    }
                    "grpSp" => group_depth = group_depth.saturating_sub(1),
                    "spPr" => in_sp_pr = false,
                    "xfrm" => {
                        in_xfrm = false;
                        if let Some(ref mut b) = current {
                            b.seen_xfrm = true;
                        }
                    }
                    "ln" => in_ln = false,
                    "txBody" => in_tx_body = false,
                    "t" => in_t = false,
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(objects)
}

/// Apply the mode inclusion filter after parsing, before id resolution.
///
/// `light` discards everything; `standard` keeps text-bearing shapes, all
/// connectors and arrow-labelled shapes, and withholds width/height;
/// `verbose` keeps everything and always reports width/height.
pub(crate) fn apply_mode_filter(
    objects: Vec<ParsedObject>,
    mode: ExtractionMode,
) -> Vec<ParsedObject> {
    match mode {
        ExtractionMode::Light => Vec::new(),
        ExtractionMode::Verbose => objects,
        ExtractionMode::Standard => objects
            .into_iter()
            .filter(|po| match &po.object {
                DrawingObject::Connector(_) => true,
                DrawingObject::Shape(s) => !s.text.is_empty() || s.shape_type.contains("Arrow"),
            })
            .map(|mut po| {
                match &mut po.object {
                    DrawingObject::Shape(s) => {
                        s.width = None;
                        s.height = None;
                    }
                    DrawingObject::Connector(c) => {
                        c.width = None;
                        c.height = None;
                    }
                }
                po
            })
            .collect(),
    }
}

/// In-progress shape or connector, finished when its element closes.
#[derive(Debug, Default)]
struct ObjectBuilder {
    connector_element: bool,
    name: String,
    source_id: Option<String>,
    offset: Option<(i64, i64)>,
    extent: Option<(i64, i64)>,
    rot: Option<i64>,
    preset: Option<String>,
    text_parts: Vec<String>,
    head_type: Option<String>,
    tail_type: Option<String>,
    begin_ref: Option<String>,
    end_ref: Option<String>,
    seen_xfrm: bool,
}

impl ObjectBuilder {
    fn new(connector_element: bool) -> Self {
        Self {
            connector_element,
            ..Self::default()
        }
    }

    fn build(self) -> Option<ParsedObject> {
        // Geometry is mandatory; an element without a usable transform
        // cannot be positioned and is dropped, matching anchor semantics.
        let (x, y) = self.offset?;
        let (cx, cy) = self.extent?;

        let left = emu_to_pixels(x);
        let top = emu_to_pixels(y);
        let width = emu_to_pixels(cx);
        let height = emu_to_pixels(cy);

        let text = self.text_parts.concat().trim().to_string();
        let rotation = self.rot.and_then(rotation_degrees);
        let is_connector = self.connector_element
            || self.preset.as_deref().is_some_and(is_connector_preset);

        let object = if is_connector {
            DrawingObject::Connector(ConnectorRecord {
                text,
                left,
                top,
                width: Some(width),
                height: Some(height),
                rotation,
                begin_arrow_style: self.head_type.as_deref().map(arrow_style_for),
                end_arrow_style: self.tail_type.as_deref().map(arrow_style_for),
                begin_id: None,
                end_id: None,
                direction: Direction::from_deltas(width, height),
            })
        } else {
            DrawingObject::Shape(ShapeRecord {
                id: None,
                text,
                left,
                top,
                width: Some(width),
                height: Some(height),
                shape_type: type_label_for(self.preset.as_deref(), &self.name),
                rotation,
            })
        };

        Some(ParsedObject {
            object,
            source_id: self.source_id.filter(|s| !s.is_empty()),
            begin_ref: self.begin_ref,
            end_ref: self.end_ref,
        })
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;

    fn shape_builder() -> ObjectBuilder {
        ObjectBuilder {
            offset: Some((9525, 19050)),
            extent: Some((95250, 190500)),
            ..ObjectBuilder::new(false)
        }
    }

    #[test]
    fn builder_converts_geometry_to_pixels() {
        let parsed = shape_builder().build().unwrap();
        let DrawingObject::Shape(shape) = parsed.object else {
            panic!("expected a shape");
        };
        assert_eq!(shape.left, 1);
        assert_eq!(shape.top, 2);
        assert_eq!(shape.width, Some(10));
        assert_eq!(shape.height, Some(20));
    }

    #[test]
    fn builder_without_geometry_yields_nothing() {
        assert!(ObjectBuilder::new(false).build().is_none());
        let no_ext = ObjectBuilder {
            offset: Some((0, 0)),
            ..ObjectBuilder::new(false)
        };
        assert!(no_ext.build().is_none());
    }

    #[test]
    fn connector_preset_on_plain_shape_builds_connector() {
        let builder = ObjectBuilder {
            preset: Some("straightConnector1".to_string()),
            ..shape_builder()
        };
        assert!(builder.build().unwrap().object.is_connector());
    }

    #[test]
    fn near_zero_rotation_is_dropped() {
        let builder = ObjectBuilder {
            rot: Some(0),
            ..shape_builder()
        };
        let parsed = builder.build().unwrap();
        let DrawingObject::Shape(shape) = parsed.object else {
            panic!("expected a shape");
        };
        assert_eq!(shape.rotation, None);
    }

    #[test]
    fn text_runs_concatenate_and_trim() {
        let builder = ObjectBuilder {
            text_parts: vec!["  Start".to_string(), " here ".to_string()],
            ..shape_builder()
        };
        let parsed = builder.build().unwrap();
        assert_eq!(parsed.object.text(), "Start here");
    }

    #[test]
    fn standard_mode_keeps_connectors_and_texted_shapes() {
        let mut with_text = shape_builder();
        with_text.text_parts.push("label".to_string());
        let mut textless = shape_builder();
        textless.name = "Plain".to_string();
        let connector = ObjectBuilder {
            offset: Some((0, 0)),
            extent: Some((9525, 0)),
            ..ObjectBuilder::new(true)
        };

        let objects = vec![
            with_text.build().unwrap(),
            textless.build().unwrap(),
            connector.build().unwrap(),
        ];
        let kept = apply_mode_filter(objects, ExtractionMode::Standard);
        assert_eq!(kept.len(), 2);
        assert!(!kept[0].object.is_connector());
        assert!(kept[1].object.is_connector());
        // standard mode withholds size
        let DrawingObject::Shape(ref s) = kept[0].object else {
            panic!("expected shape first");
        };
        assert_eq!(s.width, None);
    }

    #[test]
    fn light_mode_discards_everything() {
        let objects = vec![shape_builder().build().unwrap()];
        assert!(apply_mode_filter(objects, ExtractionMode::Light).is_empty());
    }

    #[test]
    fn arrow_labelled_shape_survives_standard_mode() {
        let arrow = ObjectBuilder {
            preset: Some("rightArrow".to_string()),
            ..shape_builder()
        };
        let kept = apply_mode_filter(
            vec![arrow.build().unwrap()],
            ExtractionMode::Standard,
        );
        assert_eq!(kept.len(), 1);
    }
}
