use serde::{Deserialize, Serialize};

/// One data series of a chart.
///
/// Ranges are always formula-reference strings (e.g. `Sheet1!$B$2:$B$5`),
/// never resolved values — resolving them would require a calculation
/// engine this parser does not have.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SeriesRecord {
    /// Series display name (cached string value or literal; may be empty).
    pub name: String,
    /// Range reference for the series name cell.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_range: Option<String>,
    /// Range reference for category-axis values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_range: Option<String>,
    /// Range reference for value-axis values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_range: Option<String>,
}

/// A chart parsed from a chart part, positioned by its drawing anchor.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChartRecord {
    /// Chart name from the drawing frame.
    pub name: String,
    /// Chart type label (e.g. `Bar`, `Line`, `XYScatter`).
    pub chart_type: String,
    /// Chart title, absent when the source has none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Value-axis title (empty string when absent).
    pub y_axis_title: String,
    /// Value-axis `[min, max]`, present only when both bounds are explicit
    /// in the source. Automatic scaling is never estimated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis_range: Option<[f64; 2]>,
    /// Left offset in pixels.
    #[serde(rename = "l")]
    pub left: i64,
    /// Top offset in pixels.
    #[serde(rename = "t")]
    pub top: i64,
    /// Width in pixels; reported in verbose mode only.
    #[serde(rename = "w", skip_serializing_if = "Option::is_none")]
    pub width: Option<i64>,
    /// Height in pixels; reported in verbose mode only.
    #[serde(rename = "h", skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
    /// Series contained in the chart, in document order.
    pub series: Vec<SeriesRecord>,
}
