//! Two-pass shape-id assignment and connector endpoint resolution.
//!
//! The document's own `cNvPr` identifiers are sparse and reused across
//! sheets, so downstream consumers never see them. Instead every
//! non-connector shape that carries a source identifier gets a dense
//! sequential id (1-based, document order, scoped to one sheet), and
//! connector endpoints become optional references into that id space.

use std::collections::HashMap;

use crate::drawings::ParsedObject;
use crate::types::DrawingObject;

/// Resolve sequential ids over one sheet's flattened object list.
///
/// Pass 1 walks the list in document order and assigns `1..=N` to every
/// non-connector shape with a non-empty source identifier, recording the
/// source → sequential mapping. Pass 2 resolves each connector's captured
/// endpoint identifiers through that mapping; identifiers that match
/// nothing (the shape may have been filtered out, or never existed) leave
/// the endpoint unset — that is expected, not an error.
pub(crate) fn resolve_ids(mut objects: Vec<ParsedObject>) -> Vec<DrawingObject> {
    let mut sequential: HashMap<String, u32> = HashMap::new();
    let mut next_id: u32 = 1;

    for parsed in &mut objects {
        if let DrawingObject::Shape(ref mut shape) = parsed.object {
            if let Some(source) = parsed.source_id.as_deref().filter(|s| !s.is_empty()) {
                shape.id = Some(next_id);
                sequential.insert(source.to_string(), next_id);
                next_id += 1;
            }
        }
    }

    for parsed in &mut objects {
        if let DrawingObject::Connector(ref mut connector) = parsed.object {
            if let Some(begin) = parsed.begin_ref.as_deref() {
                connector.begin_id = sequential.get(begin).copied();
            }
            if let Some(end) = parsed.end_ref.as_deref() {
                connector.end_id = sequential.get(end).copied();
            }
        }
    }

    objects.into_iter().map(|parsed| parsed.object).collect()
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
    use crate::types::{ConnectorRecord, ShapeRecord};

    fn shape(source_id: Option<&str>) -> ParsedObject {
        ParsedObject {
            object: DrawingObject::Shape(ShapeRecord {
                id: None,
                text: String::new(),
                left: 0,
                top: 0,
                width: None,
                height: None,
                shape_type: "AutoShape-Rectangle".to_string(),
                rotation: None,
            }),
            source_id: source_id.map(ToString::to_string),
            begin_ref: None,
            end_ref: None,
        }
    }

    fn connector(begin_ref: Option<&str>, end_ref: Option<&str>) -> ParsedObject {
        ParsedObject {
            object: DrawingObject::Connector(ConnectorRecord {
                text: String::new(),
                left: 0,
                top: 0,
                width: None,
                height: None,
                rotation: None,
                begin_arrow_style: None,
                end_arrow_style: None,
                begin_id: None,
                end_id: None,
                direction: None,
            }),
            source_id: None,
            begin_ref: begin_ref.map(ToString::to_string),
            end_ref: end_ref.map(ToString::to_string),
        }
    }

    fn shape_id(object: &DrawingObject) -> Option<u32> {
        match object {
            DrawingObject::Shape(s) => s.id,
            DrawingObject::Connector(_) => None,
        }
    }

    #[test]
    fn ids_are_dense_and_in_document_order() {
        let resolved = resolve_ids(vec![
            shape(Some("7")),
            shape(Some("3")),
            shape(Some("12")),
        ]);
        assert_eq!(shape_id(&resolved[0]), Some(1));
        assert_eq!(shape_id(&resolved[1]), Some(2));
        assert_eq!(shape_id(&resolved[2]), Some(3));
    }

    #[test]
    fn shapes_without_source_identifier_stay_unassigned() {
        let resolved = resolve_ids(vec![shape(Some("7")), shape(None), shape(Some("9"))]);
        assert_eq!(shape_id(&resolved[0]), Some(1));
        assert_eq!(shape_id(&resolved[1]), None);
        assert_eq!(shape_id(&resolved[2]), Some(2));
    }

    #[test]
    fn connectors_resolve_endpoints_through_the_mapping() {
        let resolved = resolve_ids(vec![
            shape(Some("10")),
            shape(Some("20")),
            connector(Some("10"), Some("20")),
        ]);
        let DrawingObject::Connector(ref c) = resolved[2] else {
            panic!("expected connector");
        };
        assert_eq!(c.begin_id, Some(1));
        assert_eq!(c.end_id, Some(2));
    }

    #[test]
    fn unknown_endpoint_identifiers_stay_unset() {
        let resolved = resolve_ids(vec![shape(Some("10")), connector(Some("10"), Some("99"))]);
        let DrawingObject::Connector(ref c) = resolved[1] else {
            panic!("expected connector");
        };
        assert_eq!(c.begin_id, Some(1));
        assert_eq!(c.end_id, None);
    }

    #[test]
    fn connectors_never_receive_their_own_id() {
        let mut with_source = connector(None, None);
        with_source.source_id = Some("5".to_string());
        let resolved = resolve_ids(vec![with_source, shape(Some("6"))]);
        // the connector's source identifier is ignored for id assignment
        assert_eq!(shape_id(&resolved[1]), Some(1));
    }

    #[test]
    fn connector_before_its_shapes_still_resolves() {
        // resolution is a second pass, so document position does not matter
        let resolved = resolve_ids(vec![connector(Some("2"), None), shape(Some("2"))]);
        let DrawingObject::Connector(ref c) = resolved[0] else {
            panic!("expected connector");
        };
        assert_eq!(c.begin_id, Some(1));
    }
}
