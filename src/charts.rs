//! ChartML parser.
//!
//! Charts are referenced from a sheet's drawing part: `graphicFrame`
//! anchors carry the chart name and position, the drawing's relationships
//! map the frame's rId to a chart part (`xl/charts/chart*.xml`), and the
//! chart part itself holds type, title, series references and axis
//! scaling.
//!
//! ```xml
//! <c:chartSpace xmlns:c="...chart">
//!   <c:chart>
//!     <c:title><c:tx><c:rich>...<a:t>Title</a:t>...</c:rich></c:tx></c:title>
//!     <c:plotArea>
//!       <c:barChart>
//!         <c:ser>
//!           <c:tx><c:strRef><c:f>Sheet1!$B$1</c:f>
//!             <c:strCache><c:pt idx="0"><c:v>Sales</c:v></c:pt></c:strCache></c:strRef></c:tx>
//!           <c:cat><c:strRef><c:f>Sheet1!$A$2:$A$5</c:f></c:strRef></c:cat>
//!           <c:val><c:numRef><c:f>Sheet1!$B$2:$B$5</c:f></c:numRef></c:val>
//!         </c:ser>
//!       </c:barChart>
//!       <c:valAx>
//!         <c:scaling><c:min val="0"/><c:max val="100"/></c:scaling>
//!         <c:title>...</c:title>
//!       </c:valAx>
//!     </c:plotArea>
//!   </c:chart>
//! </c:chartSpace>
//! ```

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{BufReader, Read, Seek};
use zip::ZipArchive;

use crate::error::Result;
use crate::maps::{is_chart_container, CHART_TYPE_TAGS};
use crate::package::chart_paths_for_drawing;
use crate::types::{ChartRecord, ExtractionMode, SeriesRecord};
use crate::units::emu_to_pixels;

/// Fallback frame geometry (px) when an anchor carries no usable transform.
const DEFAULT_CHART_GEOMETRY: (i64, i64, i64, i64) = (0, 0, 400, 300);

/// A chart frame found in a drawing part: name, relationship id, position.
#[derive(Debug, Clone)]
pub(crate) struct ChartAnchor {
    pub r_id: String,
    pub name: String,
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

/// Extract every chart anchored to a drawing part, in document order.
///
/// # Errors
/// Returns an error when the drawing or a chart part is malformed; a
/// missing part just contributes nothing.
pub fn extract_charts<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    drawing_path: &str,
    mode: ExtractionMode,
) -> Result<Vec<ChartRecord>> {
    let anchors = chart_anchors(archive, drawing_path)?;
    if anchors.is_empty() {
        return Ok(Vec::new());
    }

    let chart_paths = chart_paths_for_drawing(archive, drawing_path);

    let mut charts = Vec::new();
    for anchor in anchors {
        let Some(chart_path) = chart_paths.get(&anchor.r_id) else {
            continue;
        };
        if let Some(chart) = parse_chart_part(archive, chart_path, &anchor, mode)? {
            charts.push(chart);
        }
    }

    Ok(charts)
}

/// Collect `graphicFrame` chart references and their pixel geometry from a
/// drawing part.
pub(crate) fn chart_anchors<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    drawing_path: &str,
) -> Result<Vec<ChartAnchor>> {
    let normalized_path = drawing_path.trim_start_matches('/');

    let Ok(file) = archive.by_name(normalized_path) else {
        return Ok(Vec::new());
    };

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut buf = Vec::new();
    let mut anchors = Vec::new();

    let mut in_graphic_frame = false;
    let mut in_xfrm = false;
    let mut r_id: Option<String> = None;
    let mut name: Option<String> = None;
    let mut offset: Option<(i64, i64)> = None;
    let mut extent: Option<(i64, i64)> = None;

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e) | Event::Empty(ref e)) => {
                let local_name = e.local_name();
                let tag = std::str::from_utf8(local_name.as_ref()).unwrap_or("");

                match tag {
                    "graphicFrame" => {
                        in_graphic_frame = true;
                        r_id = None;
                        name = None;
                        offset = None;
                        extent = None;
                    }
                    "cNvPr" if in_graphic_frame => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"name" {
                                name = std::str::from_utf8(&attr.value)
                                    .ok()
                                    .map(ToString::to_string);
                            }
                        }
                    }
                    "xfrm" if in_graphic_frame => in_xfrm = true,
                    "off" if in_graphic_frame && in_xfrm => {
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
                        offset = Some((x, y));
                    }
                    "ext" if in_graphic_frame && in_xfrm => {
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
                        extent = Some((cx, cy));
                    }
                    "chart" if in_graphic_frame => {
                        for attr in e.attributes().flatten() {
                            let key = attr.key.as_ref();
                            if key == b"id" || key.ends_with(b":id") {
                                r_id = std::str::from_utf8(&attr.value)
                                    .ok()
                                    .map(ToString::to_string);
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => {
                let local_name = e.local_name();
                let tag = std::str::from_utf8(local_name.as_ref()).unwrap_or("");

                match tag {
                    "xfrm" => in_xfrm = false,
                    "graphicFrame" => {
                        if let Some(id) = r_id.take() {
                            let (left, top, width, height) = match (offset, extent) {
                                (Some((x, y)), Some((cx, cy))) => (
                                    emu_to_pixels(x),
                                    emu_to_pixels(y),
                                    emu_to_pixels(cx),
                                    emu_to_pixels(cy),
                                ),
                                _ => DEFAULT_CHART_GEOMETRY,
                            };
                            anchors.push(ChartAnchor {
                                name: name.take().unwrap_or_else(|| format!("Chart_{id}")),
                                r_id: id,
                                left,
                                top,
                                width,
                                height,
                            });
                        }
                        in_graphic_frame = false;
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(anchors)
}

/// Parse one chart part into a record positioned by its anchor.
///
/// Returns `Ok(None)` when the part is missing or has no chart/plot-area
/// element at all.
pub(crate) fn parse_chart_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    chart_path: &str,
    anchor: &ChartAnchor,
    mode: ExtractionMode,
) -> Result<Option<ChartRecord>> {
    let normalized_path = chart_path.trim_start_matches('/');

    let Ok(file) = archive.by_name(normalized_path) else {
        return Ok(None);
    };

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut buf = Vec::new();

    let mut saw_plot_area = false;
    let mut in_chart = false;
    let mut in_plot_area = false;

    // Chart title
    let mut in_title = false;
    let mut in_title_str_ref = false;
    let mut title_rich: Option<String> = None;
    let mut title_cache: Option<String> = None;

    // Chart type containers present in the plot area
    let mut containers: Vec<String> = Vec::new();
    let mut in_container = false;

    // Series state
    let mut series: Vec<SeriesRecord> = Vec::new();
    let mut current_series: Option<SeriesBuilder> = None;
    let mut in_tx = false;
    let mut in_cat = false;
    let mut in_val = false;
    let mut in_str_ref = false;
    let mut in_num_ref = false;
    let mut in_f = false;
    let mut in_v = false;

    // Value axis state (first value axis wins)
    let mut in_val_ax = false;
    let mut val_ax_done = false;
    let mut in_ax_title = false;
    let mut in_scaling = false;
    let mut y_axis_title = String::new();
    let mut axis_min: Option<f64> = None;
    let mut axis_max: Option<f64> = None;

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e) | Event::Empty(ref e)) => {
                let local_name = e.local_name();
                let tag = std::str::from_utf8(local_name.as_ref()).unwrap_or("");

                match tag {
                    "chart" => in_chart = true,
                    "plotArea" if in_chart => {
                        in_plot_area = true;
                        saw_plot_area = true;
                    }
                    "title" if in_val_ax => in_ax_title = true,
                    "title" if in_chart && !in_plot_area => in_title = true,
                    "strRef" if in_title => in_title_str_ref = true,
                    "valAx" if in_plot_area && !val_ax_done => in_val_ax = true,
                    "scaling" if in_val_ax => in_scaling = true,
                    "min" if in_scaling => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"val" {
                                axis_min =
                                    std::str::from_utf8(&attr.value).ok().and_then(|s| s.parse().ok());
                            }
                        }
                    }
                    "max" if in_scaling => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"val" {
                                axis_max =
                                    std::str::from_utf8(&attr.value).ok().and_then(|s| s.parse().ok());
                            }
                        }
                    }
                    "ser" if in_container => {
                        current_series = Some(SeriesBuilder::default());
                    }
                    "tx" if current_series.is_some() => in_tx = true,
                    "cat" if current_series.is_some() => in_cat = true,
                    "val" if current_series.is_some() => in_val = true,
                    "strRef" if current_series.is_some() => in_str_ref = true,
                    "numRef" if current_series.is_some() => in_num_ref = true,
                    "f" if in_str_ref || in_num_ref => in_f = true,
                    "v" if in_tx || (in_title && in_title_str_ref) => in_v = true,
                    _ if in_plot_area && is_chart_container(tag) => {
                        in_container = true;
                        if !containers.iter().any(|c| c == tag) {
                            containers.push(tag.to_string());
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                let Ok(text) = e.unescape() else {
                    buf.clear();
                    continue;
                };
                let text = text.trim();
                if text.is_empty() {
                    buf.clear();
                    continue;
                }

                if in_f {
                    if let Some(ref mut ser) = current_series {
                        if in_tx && ser.name_range.is_none() {
                            ser.name_range = Some(text.to_string());
                        } else if in_cat && ser.x_range.is_none() {
                            ser.x_range = Some(text.to_string());
                        } else if in_val && in_num_ref && ser.y_range.is_none() {
                            ser.y_range = Some(text.to_string());
                        }
                    }
                } else if in_v {
                    if let Some(ref mut ser) = current_series {
                        if in_tx {
                            if in_str_ref {
                                if ser.name.is_empty() {
                                    ser.name = text.to_string();
                                }
                            } else {
                                // a literal series name overrides the cache
                                ser.name = text.to_string();
                            }
                        }
                    } else if in_title && in_title_str_ref && title_cache.is_none() {
                        title_cache = Some(text.to_string());
                    }
                } else if in_ax_title {
                    if y_axis_title.is_empty() {
                        y_axis_title = text.to_string();
                    }
                } else if in_title && title_rich.is_none() {
                    title_rich = Some(text.to_string());
                }
            }
            Ok(Event::End(ref e)) => {
                let local_name = e.local_name();
                let tag = std::str::from_utf8(local_name.as_ref()).unwrap_or("");

                match tag {
                    "chart" => in_chart = false,
                    "plotArea" => in_plot_area = false,
                    "title" if in_ax_title => in_ax_title = false,
                    "title" => in_title = false,
                    "valAx" => {
                        if in_val_ax {
                            val_ax_done = true;
                        }
                        in_val_ax = false;
                    }
                    "scaling" => in_scaling = false,
                    "ser" => {
                        if let Some(builder) = current_series.take() {
                            series.push(builder.build());
                        }
                    }
                    "tx" => in_tx = false,
                    "cat" => in_cat = false,
                    "val" => in_val = false,
                    "strRef" => {
                        in_str_ref = false;
                        in_title_str_ref = false;
                    }
                    "numRef" => in_num_ref = false,
                    "f" => in_f = false,
                    "v" => in_v = false,
                    _ if is_chart_container(tag) => in_container = false,
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    if !saw_plot_area {
        return Ok(None);
    }

    // First table entry present among the plot-area containers wins; the
    // composite-chart ambiguity is deliberately left unresolved.
    let chart_type = CHART_TYPE_TAGS
        .iter()
        .find(|(tag, _)| containers.iter().any(|c| c == tag))
        .map_or("unknown", |entry| entry.1);

    let y_axis_range = match (axis_min, axis_max) {
        (Some(min), Some(max)) => Some([min, max]),
        _ => None,
    };

    let verbose = matches!(mode, ExtractionMode::Verbose);
    Ok(Some(ChartRecord {
        name: anchor.name.clone(),
        chart_type: chart_type.to_string(),
        title: title_rich.or(title_cache),
        y_axis_title,
        y_axis_range,
        left: anchor.left,
        top: anchor.top,
        width: verbose.then_some(anchor.width),
        height: verbose.then_some(anchor.height),
        series,
    }))
}

/// Builder for one series while its element is open.
#[derive(Debug, Default)]
struct SeriesBuilder {
    name: String,
    name_range: Option<String>,
    x_range: Option<String>,
    y_range: Option<String>,
}

impl SeriesBuilder {
    fn build(self) -> SeriesRecord {
        SeriesRecord {
            name: self.name,
            name_range: self.name_range,
            x_range: self.x_range,
            y_range: self.y_range,
        }
    }
}
