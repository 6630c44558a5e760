//! Static lookup tables for DrawingML and ChartML classification.
//!
//! These are immutable compile-time tables: preset geometry names map to
//! human-readable type labels, OOXML arrow-head types map to numeric arrow
//! styles, and plot-area container tags map to chart type labels.

use crate::types::ArrowStyle;

/// Map an OOXML preset geometry name to its type label.
///
/// Returns `None` for presets outside the table; callers fall back to
/// `AutoShape-<preset>` so unknown geometry still classifies.
#[must_use]
pub fn preset_type_label(preset: &str) -> Option<&'static str> {
    let label = match preset {
        "flowChartProcess" => "AutoShape-FlowchartProcess",
        "flowChartDecision" => "AutoShape-FlowchartDecision",
        "flowChartTerminator" => "AutoShape-FlowchartTerminator",
        "flowChartData" => "AutoShape-FlowchartData",
        "flowChartDocument" => "AutoShape-FlowchartDocument",
        "flowChartMultidocument" => "AutoShape-FlowchartMultidocument",
        "flowChartPredefinedProcess" => "AutoShape-FlowchartPredefinedProcess",
        "flowChartInternalStorage" => "AutoShape-FlowchartInternalStorage",
        "flowChartPreparation" => "AutoShape-FlowchartPreparation",
        "flowChartManualInput" => "AutoShape-FlowchartManualInput",
        "flowChartManualOperation" => "AutoShape-FlowchartManualOperation",
        "flowChartConnector" => "AutoShape-FlowchartConnector",
        "flowChartOffpageConnector" => "AutoShape-FlowchartOffpageConnector",
        "flowChartPunchedCard" => "AutoShape-FlowchartCard",
        "flowChartPunchedTape" => "AutoShape-FlowchartPunchedTape",
        "flowChartSummingJunction" => "AutoShape-FlowchartSummingJunction",
        "flowChartOr" => "AutoShape-FlowchartOr",
        "flowChartCollate" => "AutoShape-FlowchartCollate",
        "flowChartSort" => "AutoShape-FlowchartSort",
        "flowChartExtract" => "AutoShape-FlowchartExtract",
        "flowChartMerge" => "AutoShape-FlowchartMerge",
        "flowChartStoredData" => "AutoShape-FlowchartStoredData",
        "flowChartDelay" => "AutoShape-FlowchartDelay",
        "flowChartMagneticDisk" => "AutoShape-FlowchartMagneticDisk",
        "flowChartMagneticDrum" => "AutoShape-FlowchartSequentialAccessStorage",
        "flowChartDisplay" => "AutoShape-FlowchartDisplay",
        "rect" => "AutoShape-Rectangle",
        "roundRect" => "AutoShape-RoundedRectangle",
        "ellipse" => "AutoShape-Oval",
        "diamond" => "AutoShape-Diamond",
        "triangle" => "AutoShape-IsoscelesTriangle",
        "rtTriangle" => "AutoShape-RightTriangle",
        "parallelogram" => "AutoShape-Parallelogram",
        "trapezoid" => "AutoShape-Trapezoid",
        "pentagon" => "AutoShape-Pentagon",
        "hexagon" => "AutoShape-Hexagon",
        "heptagon" => "AutoShape-Heptagon",
        "octagon" => "AutoShape-Octagon",
        "star4" => "AutoShape-4pointStar",
        "star5" => "AutoShape-5pointStar",
        "star6" => "AutoShape-6pointStar",
        "star7" => "AutoShape-7pointStar",
        "star8" => "AutoShape-8pointStar",
        "star10" => "AutoShape-10pointStar",
        "star12" => "AutoShape-12pointStar",
        "star16" => "AutoShape-16pointStar",
        "star24" => "AutoShape-24pointStar",
        "star32" => "AutoShape-32pointStar",
        "rightArrow" => "AutoShape-RightArrow",
        "leftArrow" => "AutoShape-LeftArrow",
        "upArrow" => "AutoShape-UpArrow",
        "downArrow" => "AutoShape-DownArrow",
        "leftRightArrow" => "AutoShape-LeftRightArrow",
        "upDownArrow" => "AutoShape-UpDownArrow",
        "bentArrow" => "AutoShape-BentArrow",
        "uturnArrow" => "AutoShape-UTurnArrow",
        "curvedRightArrow" => "AutoShape-CurvedRightArrow",
        "curvedLeftArrow" => "AutoShape-CurvedLeftArrow",
        "curvedUpArrow" => "AutoShape-CurvedUpArrow",
        "curvedDownArrow" => "AutoShape-CurvedDownArrow",
        "stripedRightArrow" => "AutoShape-StripedRightArrow",
        "notchedRightArrow" => "AutoShape-NotchedRightArrow",
        "chevron" => "AutoShape-Chevron",
        "homePlate" => "AutoShape-Pentagon",
        "callout1" => "AutoShape-LineCallout1",
        "callout2" => "AutoShape-LineCallout2",
        "callout3" => "AutoShape-LineCallout3",
        "accentCallout1" => "AutoShape-LineCallout1AccentBar",
        "accentCallout2" => "AutoShape-LineCallout2AccentBar",
        "accentCallout3" => "AutoShape-LineCallout3AccentBar",
        "cloudCallout" => "AutoShape-CloudCallout",
        "wedgeRectCallout" => "AutoShape-RectangularCallout",
        "wedgeRoundRectCallout" => "AutoShape-RoundedRectangularCallout",
        "wedgeEllipseCallout" => "AutoShape-OvalCallout",
        "straightConnector1" => "Line",
        "bentConnector2" => "AutoShape-Connector",
        "bentConnector3" => "AutoShape-Connector",
        "bentConnector4" => "AutoShape-Connector",
        "bentConnector5" => "AutoShape-Connector",
        "curvedConnector2" => "AutoShape-Connector",
        "curvedConnector3" => "AutoShape-Connector",
        "curvedConnector4" => "AutoShape-Connector",
        "curvedConnector5" => "AutoShape-Connector",
        "line" => "Line",
        "textBox" => "TextBox",
        _ => return None,
    };
    Some(label)
}

/// Resolve a type label for an optional preset geometry.
///
/// Unmapped presets fall back to `AutoShape-<preset>`; a missing preset
/// falls back to the shape's own name, then to `Unknown`.
#[must_use]
pub fn type_label_for(preset: Option<&str>, shape_name: &str) -> String {
    match preset {
        Some(p) => preset_type_label(p)
            .map(ToString::to_string)
            .unwrap_or_else(|| format!("AutoShape-{p}")),
        None if !shape_name.is_empty() => shape_name.to_string(),
        None => "Unknown".to_string(),
    }
}

/// Whether a preset geometry describes a line or connector.
#[must_use]
pub fn is_connector_preset(preset: &str) -> bool {
    let lower = preset.to_ascii_lowercase();
    lower.contains("connector") || lower.contains("line")
}

/// Map an OOXML arrow-head `type` attribute to an arrow style.
///
/// Unknown types fail closed to [`ArrowStyle::None`] rather than erroring;
/// a malformed head never drops the whole connector.
#[must_use]
pub fn arrow_style_for(head_type: &str) -> ArrowStyle {
    match head_type {
        "triangle" | "arrow" => ArrowStyle::Triangle,
        "stealth" => ArrowStyle::Stealth,
        "diamond" => ArrowStyle::Diamond,
        "oval" => ArrowStyle::Oval,
        _ => ArrowStyle::None,
    }
}

/// Plot-area container tags and their chart type labels, in priority order.
///
/// The first table entry present among a plot area's children decides the
/// reported chart type. Composite charts with several containers are not
/// disambiguated further; first-wins is a documented simplification.
pub const CHART_TYPE_TAGS: &[(&str, &str)] = &[
    ("lineChart", "Line"),
    ("line3DChart", "3DLine"),
    ("barChart", "Bar"),
    ("bar3DChart", "3DBar"),
    ("areaChart", "Area"),
    ("area3DChart", "3DArea"),
    ("pieChart", "Pie"),
    ("pie3DChart", "3DPie"),
    ("doughnutChart", "Doughnut"),
    ("scatterChart", "XYScatter"),
    ("bubbleChart", "Bubble"),
    ("radarChart", "Radar"),
    ("surfaceChart", "Surface"),
    ("surface3DChart", "3DSurface"),
    ("stockChart", "Stock"),
    ("ofPieChart", "PieOfPie"),
];

/// Whether a plot-area child tag is a known chart-type container.
#[must_use]
pub fn is_chart_container(tag: &str) -> bool {
    CHART_TYPE_TAGS.iter().any(|(t, _)| *t == tag)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn known_presets_map_to_labels() {
        assert_eq!(
            preset_type_label("flowChartProcess"),
            Some("AutoShape-FlowchartProcess")
        );
        assert_eq!(preset_type_label("rect"), Some("AutoShape-Rectangle"));
        assert_eq!(preset_type_label("straightConnector1"), Some("Line"));
    }

    #[test]
    fn unmapped_preset_falls_back_to_autoshape_prefix() {
        assert_eq!(preset_type_label("customXYZ"), None);
        assert_eq!(type_label_for(Some("customXYZ"), ""), "AutoShape-customXYZ");
    }

    #[test]
    fn missing_preset_falls_back_to_name_then_unknown() {
        assert_eq!(type_label_for(None, "TextBox 3"), "TextBox 3");
        assert_eq!(type_label_for(None, ""), "Unknown");
    }

    #[test]
    fn connector_presets_detected_by_keyword() {
        assert!(is_connector_preset("straightConnector1"));
        assert!(is_connector_preset("bentConnector3"));
        assert!(is_connector_preset("line"));
        assert!(!is_connector_preset("rect"));
        assert!(!is_connector_preset("flowChartProcess"));
    }

    #[test]
    fn arrow_types_fail_closed() {
        assert_eq!(arrow_style_for("triangle"), ArrowStyle::Triangle);
        assert_eq!(arrow_style_for("arrow"), ArrowStyle::Triangle);
        assert_eq!(arrow_style_for("oval"), ArrowStyle::Oval);
        assert_eq!(arrow_style_for("none"), ArrowStyle::None);
        assert_eq!(arrow_style_for("somethingNew"), ArrowStyle::None);
    }

    #[test]
    fn chart_table_order_prefers_line_over_bar() {
        let first = CHART_TYPE_TAGS
            .iter()
            .find(|(tag, _)| *tag == "lineChart" || *tag == "barChart")
            .map(|(_, label)| *label);
        assert_eq!(first, Some("Line"));
    }
}
