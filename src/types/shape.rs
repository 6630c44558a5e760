use serde::{Deserialize, Serialize};

/// Arrow-head style at one end of a connector.
///
/// Discriminants match the numeric style codes the host application uses,
/// which is what downstream consumers compare against.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArrowStyle {
    /// No arrow head.
    #[default]
    None = 1,
    /// Filled triangle head.
    Triangle = 2,
    /// Stealth (concave) head.
    Stealth = 3,
    /// Diamond head.
    Diamond = 4,
    /// Oval head.
    Oval = 5,
}

impl ArrowStyle {
    /// Numeric style code (host-application convention).
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Compass heading of a connector, derived from its bounding-box deltas.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    E,
    NE,
    N,
    NW,
    W,
    SW,
    S,
    SE,
}

impl Direction {
    /// Map connector deltas to one of eight compass labels.
    ///
    /// `w` grows to the right and `h` grows downward (sheet coordinates), so
    /// the angle is computed as `atan2(-h, w)` with 0° pointing East and
    /// positive angles counterclockwise. Each label owns a 45° sector
    /// centered on its heading, lower bound inclusive. A degenerate
    /// zero-size connector has no direction.
    #[must_use]
    pub fn from_deltas(w: i64, h: i64) -> Option<Self> {
        if w == 0 && h == 0 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let mut angle = (-h as f64).atan2(w as f64).to_degrees();
        if angle < 0.0 {
            angle += 360.0;
        }

        let direction = if !(22.5..337.5).contains(&angle) {
            Self::E
        } else if angle < 67.5 {
            Self::NE
        } else if angle < 112.5 {
            Self::N
        } else if angle < 157.5 {
            Self::NW
        } else if angle < 202.5 {
            Self::W
        } else if angle < 247.5 {
            Self::SW
        } else if angle < 292.5 {
            Self::S
        } else {
            Self::SE
        };
        Some(direction)
    }
}

/// A non-connector shape parsed from a sheet's drawing part.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ShapeRecord {
    /// Sequential shape id within the sheet, assigned in document order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    /// Visible text content, all runs concatenated and trimmed.
    pub text: String,
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
    /// Human-readable type label derived from the preset geometry.
    #[serde(rename = "type")]
    pub shape_type: String,
    /// Rotation in degrees, absent when effectively zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

/// A connector (line/arrow) parsed from a sheet's drawing part.
///
/// Connectors never receive a sequential id of their own; they reference
/// the ids of the shapes they join via `begin_id`/`end_id`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ConnectorRecord {
    /// Visible text content, all runs concatenated and trimmed.
    pub text: String,
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
    /// Rotation in degrees, absent when effectively zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// Arrow style at the connector start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_arrow_style: Option<ArrowStyle>,
    /// Arrow style at the connector end.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_arrow_style: Option<ArrowStyle>,
    /// Sequential id of the shape at the connector start, when resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_id: Option<u32>,
    /// Sequential id of the shape at the connector end, when resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_id: Option<u32>,
    /// Compass heading derived from the connector bounding box.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

/// One flattened drawing object: either a shape or a connector.
///
/// Group shapes are flattened during parsing and never appear here.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DrawingObject {
    Shape(ShapeRecord),
    Connector(ConnectorRecord),
}

impl DrawingObject {
    /// Whether this object is a connector.
    #[must_use]
    pub fn is_connector(&self) -> bool {
        matches!(self, Self::Connector(_))
    }

    /// The object's text content.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Shape(s) => &s.text,
            Self::Connector(c) => &c.text,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(100, 0, Direction::E; "east")]
    #[test_case(0, -100, Direction::N; "north")]
    #[test_case(0, 100, Direction::S; "south")]
    #[test_case(-100, 0, Direction::W; "west")]
    #[test_case(100, -100, Direction::NE; "north east")]
    #[test_case(100, 100, Direction::SE; "south east")]
    #[test_case(-100, 100, Direction::SW; "south west")]
    #[test_case(-100, -100, Direction::NW; "north west")]
    fn compass_sectors(w: i64, h: i64, expected: Direction) {
        assert_eq!(Direction::from_deltas(w, h), Some(expected));
    }

    #[test]
    fn degenerate_connector_has_no_direction() {
        assert_eq!(Direction::from_deltas(0, 0), None);
    }

    #[test]
    fn sector_boundary_straddles_at_22_5_degrees() {
        // atan(415/1000) is just past 22.5 degrees, atan(414/1000) just under
        assert_eq!(Direction::from_deltas(1000, -415), Some(Direction::NE));
        assert_eq!(Direction::from_deltas(1000, -414), Some(Direction::E));
    }

    #[test]
    fn arrow_style_codes_follow_host_convention() {
        assert_eq!(ArrowStyle::None.code(), 1);
        assert_eq!(ArrowStyle::Triangle.code(), 2);
        assert_eq!(ArrowStyle::Stealth.code(), 3);
        assert_eq!(ArrowStyle::Diamond.code(), 4);
        assert_eq!(ArrowStyle::Oval.code(), 5);
    }
}
