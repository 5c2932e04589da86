//! Polygon frames and the centroid-based item filter.

use std::fmt;

use regex::Regex;
use serde::Serialize;

use crate::error::{EvalError, EvalResult};
use crate::model::TextItem;

const POINT_LIST_PATTERN: &str = r"^\s*-?\d+,-?\d+(?:\s+-?\d+,-?\d+)*\s*$";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A closed polygon given by its vertices in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polygon {
    pub points: Vec<Point>,
}

impl Polygon {
    /// Builds a frame from at least two points; exactly two points are taken
    /// as the top-left and bottom-right corners of an axis-aligned rectangle.
    pub fn from_points(points: Vec<Point>) -> EvalResult<Self> {
        match points.len() {
            0 | 1 => Err(EvalError::InvalidGeometry(format!(
                "frame needs at least 2 points, got {}",
                points.len()
            ))),
            2 => Ok(Self::rectangle(points[0], points[1])),
            _ => Ok(Self { points }),
        }
    }

    pub fn rectangle(top_left: Point, bottom_right: Point) -> Self {
        Self {
            points: vec![
                top_left,
                Point::new(bottom_right.x, top_left.y),
                bottom_right,
                Point::new(top_left.x, bottom_right.y),
            ],
        }
    }

    /// Parses `"x,y x,y ..."` integer coordinate pairs into a frame.
    pub fn parse(raw: &str) -> EvalResult<Self> {
        Self::from_points(parse_points(raw)?)
    }

    /// Ray casting with boundary points counted as inside.
    pub fn contains(&self, point: Point) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }

        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[j];
            if on_segment(point, a, b) {
                return true;
            }
            if (a.y > point.y) != (b.y > point.y) {
                let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
                if point.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

/// Parses `"x,y x,y ..."` integer coordinate pairs without any expansion.
pub fn parse_points(raw: &str) -> EvalResult<Vec<Point>> {
    let pattern =
        Regex::new(POINT_LIST_PATTERN).map_err(|err| EvalError::InvalidGeometry(err.to_string()))?;
    if !pattern.is_match(raw) {
        return Err(EvalError::InvalidGeometry(format!(
            "expected 'x,y x,y ...' integer pairs, got '{raw}'"
        )));
    }

    let mut points = Vec::new();
    for pair in raw.split_whitespace() {
        let (x, y) = pair
            .split_once(',')
            .ok_or_else(|| EvalError::InvalidGeometry(format!("malformed point '{pair}'")))?;
        let x = x
            .parse::<i64>()
            .map_err(|err| EvalError::InvalidGeometry(format!("{pair}: {err}")))?;
        let y = y
            .parse::<i64>()
            .map_err(|err| EvalError::InvalidGeometry(format!("{pair}: {err}")))?;
        points.push(Point::new(x as f64, y as f64));
    }
    Ok(points)
}

impl fmt::Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .points
            .iter()
            .map(|p| format!("{},{}", p.x, p.y))
            .collect();
        write!(f, "{}", rendered.join(" "))
    }
}

fn on_segment(p: Point, a: Point, b: Point) -> bool {
    let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    if cross.abs() > f64::EPSILON * 16.0 {
        return false;
    }
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Area-weighted centroid via the shoelace formula; falls back to the vertex
/// mean for zero-area outlines. Returns `None` for fewer than 3 points.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.len() < 3 {
        return None;
    }

    let n = points.len();
    let mut area2 = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        let cross = p.x * q.y - q.x * p.y;
        area2 += cross;
        cx += (p.x + q.x) * cross;
        cy += (p.y + q.y) * cross;
    }

    if area2.abs() <= f64::EPSILON {
        let sx: f64 = points.iter().map(|p| p.x).sum();
        let sy: f64 = points.iter().map(|p| p.y).sum();
        return Some(Point::new(sx / n as f64, sy / n as f64));
    }

    Some(Point::new(cx / (3.0 * area2), cy / (3.0 * area2)))
}

/// Axis-aligned hull of every point of every item that has geometry.
pub fn bounding_rectangle<'a, I>(items: I) -> Option<Polygon>
where
    I: IntoIterator<Item = &'a TextItem>,
{
    let mut min = Point::new(f64::INFINITY, f64::INFINITY);
    let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    let mut seen = false;

    for point in items.into_iter().flat_map(|item| item.geometry.iter()) {
        seen = true;
        min.x = min.x.min(point.x);
        min.y = min.y.min(point.y);
        max.x = max.x.max(point.x);
        max.y = max.y.max(point.y);
    }

    seen.then(|| Polygon::rectangle(min, max))
}

#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// Items whose centroid lies inside the frame, in source reading order.
    pub retained: Vec<TextItem>,
    /// Items with degenerate geometry, excluded from the comparison.
    pub skipped: Vec<TextItem>,
}

impl FilterOutcome {
    pub fn text(&self) -> String {
        join_items(&self.retained)
    }
}

pub fn filter_by_polygon(items: &[TextItem], polygon: &Polygon) -> EvalResult<FilterOutcome> {
    if polygon.points.len() < 3 {
        return Err(EvalError::InvalidGeometry(format!(
            "frame '{polygon}' has fewer than 3 vertices"
        )));
    }

    let mut outcome = FilterOutcome::default();
    for item in items {
        match centroid(&item.geometry) {
            Some(center) => {
                if polygon.contains(center) {
                    outcome.retained.push(item.clone());
                }
            }
            None => outcome.skipped.push(item.clone()),
        }
    }
    Ok(outcome)
}

/// Joins items with spaces inside a line and newlines between lines.
pub fn join_items(items: &[TextItem]) -> String {
    let mut text = String::new();
    let mut current_line: Option<usize> = None;
    for item in items {
        if item.text.is_empty() {
            continue;
        }
        match current_line {
            Some(line) if line == item.line => text.push(' '),
            Some(_) => text.push('\n'),
            None => {}
        }
        text.push_str(&item.text);
        current_line = Some(item.line);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Granularity;

    fn word(text: &str, line: usize, x0: f64, y0: f64, x1: f64, y1: f64) -> TextItem {
        TextItem::new(
            text,
            Granularity::Word,
            line,
            Polygon::rectangle(Point::new(x0, y0), Point::new(x1, y1)).points,
        )
    }

    #[test]
    fn two_points_expand_to_rectangle() {
        let polygon = Polygon::parse("0,0 600,400").unwrap();
        assert_eq!(polygon.points.len(), 4);
        assert_eq!(polygon.points[1], Point::new(600.0, 0.0));
        assert_eq!(polygon.points[3], Point::new(0.0, 400.0));
    }

    #[test]
    fn parse_rejects_single_point_and_garbage() {
        assert!(matches!(
            Polygon::parse("10,10"),
            Err(EvalError::InvalidGeometry(_))
        ));
        assert!(Polygon::parse("10;10 20;20").is_err());
        assert!(Polygon::parse("").is_err());
    }

    #[test]
    fn contains_counts_boundary_as_inside() {
        let polygon = Polygon::parse("0,0 600,400").unwrap();
        assert!(polygon.contains(Point::new(300.0, 200.0)));
        assert!(polygon.contains(Point::new(0.0, 200.0)));
        assert!(polygon.contains(Point::new(600.0, 400.0)));
        assert!(!polygon.contains(Point::new(700.0, 500.0)));
        assert!(!polygon.contains(Point::new(-0.5, 10.0)));
    }

    #[test]
    fn contains_handles_concave_polygon() {
        // U-shape open at the top between x=100..200
        let polygon = Polygon::parse("0,0 100,0 100,200 200,200 200,0 300,0 300,300 0,300").unwrap();
        assert!(polygon.contains(Point::new(50.0, 50.0)));
        assert!(!polygon.contains(Point::new(150.0, 50.0)));
        assert!(polygon.contains(Point::new(150.0, 250.0)));
    }

    #[test]
    fn centroid_of_rectangle_is_its_center() {
        let rect = Polygon::rectangle(Point::new(250.0, 150.0), Point::new(350.0, 250.0));
        assert_eq!(centroid(&rect.points), Some(Point::new(300.0, 200.0)));
        assert_eq!(centroid(&rect.points[..2]), None);
    }

    #[test]
    fn filter_keeps_items_centered_inside_frame() {
        let frame = Polygon::parse("0,0 600,400").unwrap();
        let items = vec![
            word("inside", 0, 250.0, 150.0, 350.0, 250.0),
            word("outside", 0, 650.0, 450.0, 750.0, 550.0),
        ];

        let outcome = filter_by_polygon(&items, &frame).unwrap();
        assert_eq!(outcome.retained.len(), 1);
        assert_eq!(outcome.retained[0].text, "inside");
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn filter_reports_degenerate_items_as_skipped() {
        let frame = Polygon::parse("0,0 600,400").unwrap();
        let items = vec![
            TextItem::new("flat", Granularity::Word, 0, vec![Point::new(1.0, 1.0), Point::new(5.0, 1.0)]),
            TextItem::new("bare", Granularity::Line, 1, Vec::new()),
            word("kept", 2, 10.0, 10.0, 20.0, 20.0),
        ];

        let outcome = filter_by_polygon(&items, &frame).unwrap();
        assert_eq!(outcome.retained.len(), 1);
        assert_eq!(outcome.skipped.len(), 2);
        assert_eq!(outcome.skipped[0].text, "flat");
    }

    #[test]
    fn filter_preserves_source_order_instead_of_coordinates() {
        let frame = Polygon::parse("0,0 1000,1000").unwrap();
        let items = vec![
            word("second", 0, 500.0, 500.0, 600.0, 550.0),
            word("first", 0, 10.0, 10.0, 60.0, 50.0),
            word("next", 1, 10.0, 700.0, 60.0, 750.0),
        ];

        let outcome = filter_by_polygon(&items, &frame).unwrap();
        assert_eq!(outcome.text(), "second first\nnext");
    }

    #[test]
    fn bounding_rectangle_spans_all_item_points() {
        let items = vec![
            word("a", 0, 10.0, 20.0, 30.0, 40.0),
            word("b", 1, 5.0, 50.0, 90.0, 60.0),
            TextItem::new("c", Granularity::Word, 2, Vec::new()),
        ];
        let rect = bounding_rectangle(&items).unwrap();
        assert_eq!(rect.points[0], Point::new(5.0, 20.0));
        assert_eq!(rect.points[2], Point::new(90.0, 60.0));
        assert!(bounding_rectangle(&[]).is_none());
    }
}
