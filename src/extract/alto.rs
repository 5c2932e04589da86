use std::path::Path;

use roxmltree::Node;

use super::{ExtractedDocument, FormatReader, SourceFormat, parse_xml};
use crate::error::EvalResult;
use crate::geometry::{Point, Polygon};
use crate::model::{Granularity, TextItem};

pub(super) struct AltoReader;

impl FormatReader for AltoReader {
    fn read(&self, path: &Path, content: &str) -> EvalResult<ExtractedDocument> {
        let document = parse_xml(path, content)?;

        let mut items = Vec::new();
        let lines = document
            .descendants()
            .filter(|node| node.has_tag_name("TextLine"));
        for (line_index, line) in lines.enumerate() {
            for string in line.children().filter(|node| node.has_tag_name("String")) {
                let text = string.attribute("CONTENT").unwrap_or_default().trim();
                if text.is_empty() {
                    continue;
                }
                items.push(TextItem::new(
                    text,
                    Granularity::Word,
                    line_index,
                    box_geometry(&string),
                ));
            }
        }

        Ok(ExtractedDocument::from_items(SourceFormat::Alto, items))
    }
}

/// Rectangle from `HPOS`/`VPOS`/`WIDTH`/`HEIGHT`, empty when any is missing.
fn box_geometry(node: &Node<'_, '_>) -> Vec<Point> {
    let read = |name: &str| -> Option<f64> { node.attribute(name)?.trim().parse::<f64>().ok() };
    match (read("HPOS"), read("VPOS"), read("WIDTH"), read("HEIGHT")) {
        (Some(x), Some(y), Some(width), Some(height)) => {
            Polygon::rectangle(Point::new(x, y), Point::new(x + width, y + height)).points
        }
        _ => Vec::new(),
    }
}
