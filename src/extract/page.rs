use std::collections::HashMap;
use std::path::Path;

use roxmltree::Node;

use super::{ExtractedDocument, FormatReader, SourceFormat, parse_xml};
use crate::error::EvalResult;
use crate::geometry::{Point, parse_points};
use crate::model::{Granularity, TextItem};

pub(super) struct PageReader;

impl FormatReader for PageReader {
    fn read(&self, path: &Path, content: &str) -> EvalResult<ExtractedDocument> {
        let document = parse_xml(path, content)?;

        let order = reading_order(document.root());
        let mut regions: Vec<((usize, usize), Node<'_, '_>)> = document
            .descendants()
            .filter(|node| node.has_tag_name("TextRegion"))
            .enumerate()
            .map(|(position, region)| {
                let rank = region
                    .attribute("id")
                    .and_then(|id| order.get(id).copied())
                    .unwrap_or(usize::MAX);
                ((rank, position), region)
            })
            .collect();
        regions.sort_by_key(|(key, _)| *key);

        let mut items = Vec::new();
        let mut line_index = 0;
        for (_, region) in regions {
            let mut region_has_lines = false;
            for line in region.children().filter(|node| node.has_tag_name("TextLine")) {
                let words: Vec<TextItem> = line
                    .children()
                    .filter(|node| node.has_tag_name("Word"))
                    .filter_map(|word| {
                        let text = text_equiv(&word)?;
                        Some(TextItem::new(text, Granularity::Word, line_index, coords(&word)))
                    })
                    .collect();

                if !words.is_empty() {
                    items.extend(words);
                } else if let Some(text) = text_equiv(&line) {
                    items.push(TextItem::new(text, Granularity::Line, line_index, coords(&line)));
                } else {
                    continue;
                }
                region_has_lines = true;
                line_index += 1;
            }

            if region_has_lines {
                continue;
            }
            if let Some(text) = text_equiv(&region) {
                items.push(TextItem::new(text, Granularity::Region, line_index, coords(&region)));
                line_index += 1;
            }
        }

        Ok(ExtractedDocument::from_items(SourceFormat::Page, items))
    }
}

/// Maps region ids to their `RegionRefIndexed@index`.
fn reading_order<'a>(root: Node<'a, '_>) -> HashMap<&'a str, usize> {
    let mut order = HashMap::new();
    let Some(reading_order) = root.descendants().find(|node| node.has_tag_name("ReadingOrder")) else {
        return order;
    };
    for reference in reading_order
        .descendants()
        .filter(|node| node.has_tag_name("RegionRefIndexed"))
    {
        let index = reference
            .attribute("index")
            .and_then(|raw| raw.trim().parse::<usize>().ok());
        if let (Some(region), Some(index)) = (reference.attribute("regionRef"), index) {
            order.insert(region, index);
        }
    }
    order
}

/// Text of the direct `TextEquiv` child with the lowest `index`.
fn text_equiv(node: &Node<'_, '_>) -> Option<String> {
    let equiv = node
        .children()
        .filter(|child| child.has_tag_name("TextEquiv"))
        .min_by_key(|equiv| {
            equiv
                .attribute("index")
                .and_then(|raw| raw.trim().parse::<i64>().ok())
                .unwrap_or(i64::MAX)
        })?;
    let unicode = equiv.children().find(|child| child.has_tag_name("Unicode"))?;
    let text: String = unicode
        .text()?
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then_some(text)
}

/// Outline from the direct `Coords@points` child; empty when absent or malformed.
fn coords(node: &Node<'_, '_>) -> Vec<Point> {
    node.children()
        .find(|child| child.has_tag_name("Coords"))
        .and_then(|coords| coords.attribute("points"))
        .and_then(|raw| parse_points(raw).ok())
        .unwrap_or_default()
}
