//! Tests for ChartML parsing.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{
    bar_chart_with_series, chart_frame_anchor, chart_xml, drawing_xml, value_axis,
    xlsx_with_chart,
};
use xlstruct::parse_charts;
use xlstruct::types::ExtractionMode;

fn fixture(title: Option<&str>, plot_area: &str, axis: &str) -> Vec<u8> {
    let drawing = drawing_xml(&chart_frame_anchor("Chart 1", 914400, 0, 3810000, 1905000));
    xlsx_with_chart(&drawing, &chart_xml(title, plot_area, axis))
}

#[test]
fn parses_chart_with_title_series_and_axis() {
    let data = fixture(
        Some("Quarterly Sales"),
        &bar_chart_with_series("Sales"),
        &value_axis("Revenue", Some(0.0), Some(100.0)),
    );

    let charts = parse_charts(&data, "Sheet1", ExtractionMode::Standard).unwrap();
    assert_eq!(charts.len(), 1);
    let chart = &charts[0];
    assert_eq!(chart.name, "Chart 1");
    assert_eq!(chart.chart_type, "Bar");
    assert_eq!(chart.title.as_deref(), Some("Quarterly Sales"));
    assert_eq!(chart.y_axis_title, "Revenue");
    assert_eq!(chart.y_axis_range, Some([0.0, 100.0]));
    assert_eq!(chart.left, 96);
    assert_eq!(chart.top, 0);

    assert_eq!(chart.series.len(), 1);
    let series = &chart.series[0];
    assert_eq!(series.name, "Sales");
    assert_eq!(series.name_range.as_deref(), Some("Sheet1!$B$1"));
    assert_eq!(series.x_range.as_deref(), Some("Sheet1!$A$2:$A$5"));
    assert_eq!(series.y_range.as_deref(), Some("Sheet1!$B$2:$B$5"));
}

#[test]
fn axis_range_requires_both_bounds() {
    let data = fixture(
        None,
        &bar_chart_with_series("S"),
        &value_axis("Y", None, Some(50.0)),
    );
    let charts = parse_charts(&data, "Sheet1", ExtractionMode::Standard).unwrap();
    assert_eq!(charts[0].y_axis_range, None);

    let data = fixture(
        None,
        &bar_chart_with_series("S"),
        &value_axis("Y", Some(1.0), None),
    );
    let charts = parse_charts(&data, "Sheet1", ExtractionMode::Standard).unwrap();
    assert_eq!(charts[0].y_axis_range, None);
}

#[test]
fn missing_title_is_none() {
    let data = fixture(None, &bar_chart_with_series("S"), &value_axis("Y", None, None));
    let charts = parse_charts(&data, "Sheet1", ExtractionMode::Standard).unwrap();
    assert_eq!(charts[0].title, None);
}

#[test]
fn composite_chart_reports_first_table_entry() {
    // bar comes first in the document, but the type table ranks line first
    let plot_area = format!(
        "{}<c:lineChart><c:grouping val=\"standard\"/><c:ser><c:idx val=\"1\"/><c:order val=\"1\"/><c:val><c:numRef><c:f>Sheet1!$C$2:$C$5</c:f></c:numRef></c:val></c:ser><c:axId val=\"1\"/><c:axId val=\"2\"/></c:lineChart>",
        bar_chart_with_series("Bars"),
    );
    let data = fixture(None, &plot_area, "");

    let charts = parse_charts(&data, "Sheet1", ExtractionMode::Standard).unwrap();
    assert_eq!(charts[0].chart_type, "Line");
    // series from every container are collected
    assert_eq!(charts[0].series.len(), 2);
    assert_eq!(
        charts[0].series[1].y_range.as_deref(),
        Some("Sheet1!$C$2:$C$5")
    );
}

#[test]
fn scatter_chart_type_label() {
    let plot_area = r#"<c:scatterChart><c:scatterStyle val="lineMarker"/>
<c:ser><c:idx val="0"/><c:order val="0"/>
<c:xVal><c:numRef><c:f>Sheet1!$A$2:$A$9</c:f></c:numRef></c:xVal>
<c:yVal><c:numRef><c:f>Sheet1!$B$2:$B$9</c:f></c:numRef></c:yVal>
</c:ser><c:axId val="1"/><c:axId val="2"/></c:scatterChart>"#;
    let data = fixture(None, plot_area, "");

    let charts = parse_charts(&data, "Sheet1", ExtractionMode::Standard).unwrap();
    assert_eq!(charts[0].chart_type, "XYScatter");
}

#[test]
fn verbose_mode_reports_chart_size() {
    let data = fixture(None, &bar_chart_with_series("S"), "");

    let standard = parse_charts(&data, "Sheet1", ExtractionMode::Standard).unwrap();
    assert_eq!(standard[0].width, None);
    assert_eq!(standard[0].height, None);

    let verbose = parse_charts(&data, "Sheet1", ExtractionMode::Verbose).unwrap();
    assert_eq!(verbose[0].width, Some(400));
    assert_eq!(verbose[0].height, Some(200));
}

#[test]
fn series_name_falls_back_to_literal() {
    let plot_area = r#"<c:barChart><c:barDir val="col"/>
<c:ser><c:idx val="0"/><c:order val="0"/>
<c:tx><c:v>Literal name</c:v></c:tx>
<c:val><c:numRef><c:f>Sheet1!$B$2:$B$5</c:f></c:numRef></c:val>
</c:ser><c:axId val="1"/><c:axId val="2"/></c:barChart>"#;
    let data = fixture(None, plot_area, "");

    let charts = parse_charts(&data, "Sheet1", ExtractionMode::Standard).unwrap();
    let series = &charts[0].series[0];
    assert_eq!(series.name, "Literal name");
    assert_eq!(series.name_range, None);
}

#[test]
fn missing_chart_part_contributes_nothing() {
    let drawing = drawing_xml(&chart_frame_anchor("Chart 1", 0, 0, 9525, 9525));
    // package with the drawing + rels but no chart part
    let data = common::build_package(&[
        ("[Content_Types].xml", common::CONTENT_TYPES_XML),
        ("_rels/.rels", common::ROOT_RELS_XML),
        ("xl/workbook.xml", &common::workbook_xml(&["Sheet1"], "")),
        ("xl/_rels/workbook.xml.rels", &common::workbook_rels_xml(1)),
        ("xl/worksheets/sheet1.xml", &common::sheet_xml(&[])),
        (
            "xl/worksheets/_rels/sheet1.xml.rels",
            common::SHEET_DRAWING_RELS,
        ),
        ("xl/drawings/drawing1.xml", &drawing),
        (
            "xl/drawings/_rels/drawing1.xml.rels",
            common::DRAWING_CHART_RELS,
        ),
    ]);

    let charts = parse_charts(&data, "Sheet1", ExtractionMode::Standard).unwrap();
    assert!(charts.is_empty());
}

#[test]
fn frame_without_transform_gets_default_geometry() {
    let frame = chart_frame_anchor("Chart 1", 0, 0, 0, 0)
        .replace("<xdr:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/></xdr:xfrm>", "");
    let data = xlsx_with_chart(
        &drawing_xml(&frame),
        &chart_xml(None, &bar_chart_with_series("S"), ""),
    );

    let charts = parse_charts(&data, "Sheet1", ExtractionMode::Verbose).unwrap();
    assert_eq!(charts[0].left, 0);
    assert_eq!(charts[0].width, Some(400));
    assert_eq!(charts[0].height, Some(300));
}
