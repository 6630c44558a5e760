//! Shared fixture builders: minimal XLSX packages assembled in memory.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::too_many_arguments,
    clippy::panic
)]

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

pub const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

pub const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

/// Assemble a zip package from (path, content) parts.
pub fn build_package(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut buffer);
        let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for (path, content) in parts {
            zip.start_file(*path, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buffer.into_inner()
}

/// Workbook manifest for a list of sheet names, rId(N) → sheetN.xml,
/// with optional extra content (e.g. definedNames) before the close tag.
pub fn workbook_xml(sheet_names: &[&str], extra: &str) -> String {
    let mut sheets = String::new();
    for (i, name) in sheet_names.iter().enumerate() {
        let n = i + 1;
        sheets.push_str(&format!(
            r#"<sheet name="{name}" sheetId="{n}" r:id="rId{n}"/>"#
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets>{sheets}</sheets>{extra}
</workbook>"#
    )
}

/// Workbook relationships mapping rId(N) → worksheets/sheetN.xml.
pub fn workbook_rels_xml(sheet_count: usize) -> String {
    let mut rels = String::new();
    for n in 1..=sheet_count {
        rels.push_str(&format!(
            r#"<Relationship Id="rId{n}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{n}.xml"/>"#
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
    )
}

/// A worksheet with inline-string cells at the given (ref, value) pairs,
/// one row per distinct row number in order.
pub fn sheet_xml(cells: &[(&str, &str)]) -> String {
    use std::collections::BTreeMap;

    let mut by_row: BTreeMap<u32, Vec<(&str, &str)>> = BTreeMap::new();
    for &(cell_ref, value) in cells {
        let row: u32 = cell_ref
            .chars()
            .filter(char::is_ascii_digit)
            .collect::<String>()
            .parse()
            .unwrap();
        by_row.entry(row).or_default().push((cell_ref, value));
    }

    let mut sheet_data = String::new();
    for (row, row_cells) in by_row {
        sheet_data.push_str(&format!(r#"<row r="{row}">"#));
        for (cell_ref, value) in row_cells {
            sheet_data.push_str(&format!(
                r#"<c r="{cell_ref}" t="inlineStr"><is><t>{value}</t></is></c>"#
            ));
        }
        sheet_data.push_str("</row>");
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheetData>{sheet_data}</sheetData>
</worksheet>"#
    )
}

/// Sheet relationships pointing rId1 at ../drawings/drawing1.xml.
pub const SHEET_DRAWING_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing" Target="../drawings/drawing1.xml"/>
</Relationships>"#;

/// Drawing relationships pointing rId1 at ../charts/chart1.xml.
pub const DRAWING_CHART_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart" Target="../charts/chart1.xml"/>
</Relationships>"#;

/// Wrap anchor content in a drawing document.
pub fn drawing_xml(anchors: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<xdr:wsDr xmlns:xdr="http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
{anchors}
</xdr:wsDr>"#
    )
}

/// A two-cell anchored shape with id, name, geometry (EMU), preset and text.
pub fn shape_anchor(
    id: u32,
    name: &str,
    preset: &str,
    x: i64,
    y: i64,
    cx: i64,
    cy: i64,
    text: &str,
) -> String {
    format!(
        r#"<xdr:twoCellAnchor>
<xdr:from><xdr:col>0</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>0</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from>
<xdr:to><xdr:col>5</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>5</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:to>
<xdr:sp>
<xdr:nvSpPr><xdr:cNvPr id="{id}" name="{name}"/><xdr:cNvSpPr/></xdr:nvSpPr>
<xdr:spPr>
<a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>
<a:prstGeom prst="{preset}"><a:avLst/></a:prstGeom>
</xdr:spPr>
<xdr:txBody><a:bodyPr/><a:p><a:r><a:t>{text}</a:t></a:r></a:p></xdr:txBody>
</xdr:sp>
<xdr:clientData/>
</xdr:twoCellAnchor>"#
    )
}

/// A two-cell anchored connector with endpoints and arrow heads.
pub fn connector_anchor(
    id: u32,
    begin_id: u32,
    end_id: u32,
    x: i64,
    y: i64,
    cx: i64,
    cy: i64,
    head_type: &str,
    tail_type: &str,
) -> String {
    format!(
        r#"<xdr:twoCellAnchor>
<xdr:from><xdr:col>0</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>0</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from>
<xdr:to><xdr:col>5</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>5</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:to>
<xdr:cxnSp>
<xdr:nvCxnSpPr>
<xdr:cNvPr id="{id}" name="Connector {id}"/>
<xdr:cNvCxnSpPr><a:stCxn id="{begin_id}" idx="3"/><a:endCxn id="{end_id}" idx="1"/></xdr:cNvCxnSpPr>
</xdr:nvCxnSpPr>
<xdr:spPr>
<a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>
<a:prstGeom prst="straightConnector1"><a:avLst/></a:prstGeom>
<a:ln><a:headEnd type="{head_type}"/><a:tailEnd type="{tail_type}"/></a:ln>
</xdr:spPr>
</xdr:cxnSp>
<xdr:clientData/>
</xdr:twoCellAnchor>"#
    )
}

/// A graphic frame anchoring chart rId1 at the given EMU geometry.
pub fn chart_frame_anchor(name: &str, x: i64, y: i64, cx: i64, cy: i64) -> String {
    format!(
        r#"<xdr:twoCellAnchor>
<xdr:from><xdr:col>0</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>0</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from>
<xdr:to><xdr:col>8</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>20</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:to>
<xdr:graphicFrame>
<xdr:nvGraphicFramePr><xdr:cNvPr id="100" name="{name}"/><xdr:cNvGraphicFramePr/></xdr:nvGraphicFramePr>
<xdr:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></xdr:xfrm>
<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/chart">
<c:chart xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" r:id="rId1"/>
</a:graphicData></a:graphic>
</xdr:graphicFrame>
<xdr:clientData/>
</xdr:twoCellAnchor>"#
    )
}

/// A chart part with the given plot-area containers and optional extras.
pub fn chart_xml(title: Option<&str>, plot_area_content: &str, value_axis: &str) -> String {
    let title_block = match title {
        Some(text) => format!(
            "<c:title><c:tx><c:rich><a:bodyPr/><a:p><a:r><a:t>{text}</a:t></a:r></a:p></c:rich></c:tx></c:title>"
        ),
        None => String::new(),
    };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<c:chart>
{title_block}
<c:plotArea><c:layout/>
{plot_area_content}
{value_axis}
</c:plotArea>
</c:chart>
</c:chartSpace>"#
    )
}

/// One bar-chart container with a single fully-referenced series.
pub fn bar_chart_with_series(name: &str) -> String {
    format!(
        r#"<c:barChart><c:barDir val="col"/><c:grouping val="clustered"/>
<c:ser>
<c:idx val="0"/><c:order val="0"/>
<c:tx><c:strRef><c:f>Sheet1!$B$1</c:f><c:strCache><c:ptCount val="1"/><c:pt idx="0"><c:v>{name}</c:v></c:pt></c:strCache></c:strRef></c:tx>
<c:cat><c:strRef><c:f>Sheet1!$A$2:$A$5</c:f></c:strRef></c:cat>
<c:val><c:numRef><c:f>Sheet1!$B$2:$B$5</c:f></c:numRef></c:val>
</c:ser>
<c:axId val="1"/><c:axId val="2"/>
</c:barChart>"#
    )
}

/// A value axis with title and optional explicit scaling bounds.
pub fn value_axis(title: &str, min: Option<f64>, max: Option<f64>) -> String {
    let mut scaling = String::from("<c:scaling><c:orientation val=\"minMax\"/>");
    if let Some(max) = max {
        scaling.push_str(&format!(r#"<c:max val="{max}"/>"#));
    }
    if let Some(min) = min {
        scaling.push_str(&format!(r#"<c:min val="{min}"/>"#));
    }
    scaling.push_str("</c:scaling>");
    format!(
        r#"<c:valAx><c:axId val="2"/>{scaling}
<c:title><c:tx><c:rich><a:bodyPr/><a:p><a:r><a:t>{title}</a:t></a:r></a:p></c:rich></c:tx></c:title>
<c:delete val="0"/><c:axPos val="l"/><c:crossAx val="1"/>
</c:valAx>"#
    )
}

/// A complete single-sheet package with a drawing part.
pub fn xlsx_with_drawing(drawing: &str) -> Vec<u8> {
    build_package(&[
        ("[Content_Types].xml", CONTENT_TYPES_XML),
        ("_rels/.rels", ROOT_RELS_XML),
        ("xl/workbook.xml", &workbook_xml(&["Sheet1"], "")),
        ("xl/_rels/workbook.xml.rels", &workbook_rels_xml(1)),
        ("xl/worksheets/sheet1.xml", &sheet_xml(&[])),
        ("xl/worksheets/_rels/sheet1.xml.rels", SHEET_DRAWING_RELS),
        ("xl/drawings/drawing1.xml", drawing),
    ])
}

/// A complete single-sheet package with a drawing and one chart part.
pub fn xlsx_with_chart(drawing: &str, chart: &str) -> Vec<u8> {
    build_package(&[
        ("[Content_Types].xml", CONTENT_TYPES_XML),
        ("_rels/.rels", ROOT_RELS_XML),
        ("xl/workbook.xml", &workbook_xml(&["Sheet1"], "")),
        ("xl/_rels/workbook.xml.rels", &workbook_rels_xml(1)),
        ("xl/worksheets/sheet1.xml", &sheet_xml(&[])),
        ("xl/worksheets/_rels/sheet1.xml.rels", SHEET_DRAWING_RELS),
        ("xl/drawings/drawing1.xml", drawing),
        ("xl/drawings/_rels/drawing1.xml.rels", DRAWING_CHART_RELS),
        ("xl/charts/chart1.xml", chart),
    ])
}
