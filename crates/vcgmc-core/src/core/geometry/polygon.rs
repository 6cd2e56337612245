use super::planar::{rotate_offset, segment_distance};
use nalgebra::{Point2, Vector2};
use std::io::{self, Write};

const EDGE_TOLERANCE: f64 = 1e-9;

/// A simple (non self-intersecting) polygon given by its ordered vertices.
///
/// Containment tests are inclusive: points lying on an edge count as inside.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point2<f64>>,
}

impl Polygon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n_vertex: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(n_vertex),
        }
    }

    pub fn from_vertices(vertices: Vec<Point2<f64>>) -> Self {
        Self { vertices }
    }

    /// Axis-aligned rectangle `[0, x_size] x [0, y_size]`, counter-clockwise
    /// from the origin.
    pub fn rectangle(x_size: f64, y_size: f64) -> Self {
        let mut polygon = Self::with_capacity(4);
        polygon.add_vertex(0.0, 0.0);
        polygon.add_vertex(x_size, 0.0);
        polygon.add_vertex(x_size, y_size);
        polygon.add_vertex(0.0, y_size);
        polygon
    }

    pub fn add_vertex(&mut self, x: f64, y: f64) {
        self.vertices.push(Point2::new(x, y));
    }

    pub fn n_vertex(&self) -> usize {
        self.vertices.len()
    }

    /// Panics when `index` is out of range.
    pub fn vertex(&self, index: usize) -> Point2<f64> {
        self.vertices[index]
    }

    pub fn vertices(&self) -> &[Point2<f64>] {
        &self.vertices
    }

    fn edges(&self) -> impl Iterator<Item = (&Point2<f64>, &Point2<f64>)> {
        self.vertices
            .iter()
            .zip(self.vertices.iter().cycle().skip(1))
    }

    /// Shoelace area, positive for counter-clockwise vertex order.
    pub fn signed_area(&self) -> f64 {
        if self.vertices.len() < 3 {
            return 0.0;
        }
        self.edges().map(|(a, b)| a.x * b.y - b.x * a.y).sum::<f64>() / 2.0
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Area centroid. Falls back to the vertex mean for degenerate polygons.
    pub fn center(&self) -> Point2<f64> {
        let area = self.signed_area();
        if area.abs() <= EDGE_TOLERANCE {
            return self.vertex_mean();
        }
        let (cx, cy) = self.edges().fold((0.0, 0.0), |(cx, cy), (a, b)| {
            let cross = a.x * b.y - b.x * a.y;
            (cx + (a.x + b.x) * cross, cy + (a.y + b.y) * cross)
        });
        Point2::new(cx / (6.0 * area), cy / (6.0 * area))
    }

    fn vertex_mean(&self) -> Point2<f64> {
        if self.vertices.is_empty() {
            return Point2::origin();
        }
        let sum = self
            .vertices
            .iter()
            .fold(Vector2::zeros(), |acc, v| acc + v.coords);
        Point2::from(sum / self.vertices.len() as f64)
    }

    pub fn center_x(&self) -> f64 {
        self.center().x
    }

    pub fn center_y(&self) -> f64 {
        self.center().y
    }

    pub fn x_min(&self) -> f64 {
        self.vertices.iter().map(|v| v.x).fold(f64::INFINITY, f64::min)
    }

    pub fn x_max(&self) -> f64 {
        self.vertices
            .iter()
            .map(|v| v.x)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn y_min(&self) -> f64 {
        self.vertices.iter().map(|v| v.y).fold(f64::INFINITY, f64::min)
    }

    pub fn y_max(&self) -> f64 {
        self.vertices
            .iter()
            .map(|v| v.y)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Smallest distance from `(x, y)` to any edge.
    pub fn distance_to_boundary(&self, x: f64, y: f64) -> f64 {
        let p = Point2::new(x, y);
        self.edges()
            .map(|(a, b)| segment_distance(&p, a, b))
            .fold(f64::INFINITY, f64::min)
    }

    pub fn is_inside(&self, x: f64, y: f64) -> bool {
        if self.vertices.len() < 3 {
            return false;
        }
        if self.distance_to_boundary(x, y) <= EDGE_TOLERANCE {
            return true;
        }
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > y) != (b.y > y) {
                let x_cross = a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y);
                if x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// A disc of radius `radius` centred on `(x, y)` lies entirely inside.
    pub fn is_inside_with_margin(&self, x: f64, y: f64, radius: f64) -> bool {
        self.is_inside(x, y) && self.distance_to_boundary(x, y) + EDGE_TOLERANCE >= radius
    }

    fn tolerance(&self) -> f64 {
        let extent = (self.x_max() - self.x_min()).max(self.y_max() - self.y_min());
        EDGE_TOLERANCE * (1.0 + extent)
    }

    pub fn is_parallelogram(&self) -> bool {
        if self.vertices.len() != 4 {
            return false;
        }
        let v = &self.vertices;
        let diagonal_gap = (v[0].coords + v[2].coords) - (v[1].coords + v[3].coords);
        diagonal_gap.norm() <= self.tolerance() && self.area() > self.tolerance()
    }

    pub fn is_rectangle(&self) -> bool {
        if !self.is_parallelogram() {
            return false;
        }
        let v = &self.vertices;
        let side_a = v[1] - v[0];
        let side_b = v[3] - v[0];
        side_a.dot(&side_b).abs() <= self.tolerance() * (side_a.norm() + side_b.norm())
    }

    /// Reorders vertices counter-clockwise, starting from the lowest
    /// (then leftmost) vertex.
    pub fn order_vertices(&mut self) {
        if self.vertices.len() < 3 {
            return;
        }
        if self.signed_area() < 0.0 {
            self.vertices.reverse();
        }
        let tolerance = self.tolerance();
        let start = self
            .vertices
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                if (a.y - b.y).abs() <= tolerance {
                    a.x.total_cmp(&b.x)
                } else {
                    a.y.total_cmp(&b.y)
                }
            })
            .map(|(i, _)| i)
            .unwrap_or(0);
        self.vertices.rotate_left(start);
    }

    /// Scales every vertex about the origin.
    pub fn expand(&mut self, factor: f64) {
        for v in &mut self.vertices {
            v.coords *= factor;
        }
    }

    /// Rotates every vertex counter-clockwise about the origin.
    pub fn rotate(&mut self, angle: f64) {
        for v in &mut self.vertices {
            v.coords = rotate_offset(&v.coords, angle);
        }
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        let shift = Vector2::new(dx, dy);
        for v in &mut self.vertices {
            *v += shift;
        }
    }

    /// Writes the vertex count followed by one `x y` line per vertex.
    pub fn write(&self, writer: &mut impl Write) -> io::Result<()> {
        writeln!(writer, "{}", self.vertices.len())?;
        for v in &self.vertices {
            writeln!(writer, "{:9.6} {:9.6}", v.x, v.y)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_4;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn triangle() -> Polygon {
        Polygon::from_vertices(vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(0.0, 3.0),
        ])
    }

    #[test]
    fn area_is_independent_of_vertex_order() {
        let mut polygon = triangle();
        assert!(f64_approx_equal(polygon.area(), 6.0));
        polygon.order_vertices();
        assert!(f64_approx_equal(polygon.area(), 6.0));
        let reversed = Polygon::from_vertices(polygon.vertices().iter().rev().cloned().collect());
        assert!(f64_approx_equal(reversed.area(), 6.0));
        assert!(reversed.signed_area() < 0.0);
    }

    #[test]
    fn center_of_rectangle_is_its_midpoint() {
        let polygon = Polygon::rectangle(4.0, 2.0);
        assert!(f64_approx_equal(polygon.center_x(), 2.0));
        assert!(f64_approx_equal(polygon.center_y(), 1.0));
    }

    #[test]
    fn is_inside_includes_edges_and_excludes_outside_points() {
        let polygon = triangle();
        assert!(polygon.is_inside(1.0, 1.0));
        assert!(polygon.is_inside(2.0, 0.0));
        assert!(polygon.is_inside(0.0, 0.0));
        assert!(!polygon.is_inside(3.0, 3.0));
        assert!(!polygon.is_inside(-0.1, 1.0));
    }

    #[test]
    fn is_inside_with_margin_requires_clearance_from_every_edge() {
        let polygon = Polygon::rectangle(10.0, 10.0);
        assert!(polygon.is_inside_with_margin(5.0, 5.0, 1.0));
        assert!(polygon.is_inside_with_margin(1.0, 5.0, 1.0));
        assert!(!polygon.is_inside_with_margin(0.5, 5.0, 1.0));
    }

    #[test]
    fn parallelogram_and_rectangle_are_recognised() {
        let rectangle = Polygon::rectangle(3.0, 2.0);
        assert!(rectangle.is_parallelogram());
        assert!(rectangle.is_rectangle());

        let sheared = Polygon::from_vertices(vec![
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(4.0, 2.0),
            Point2::new(1.0, 2.0),
        ]);
        assert!(sheared.is_parallelogram());
        assert!(!sheared.is_rectangle());
        assert!(!triangle().is_parallelogram());
    }

    #[test]
    fn order_vertices_starts_at_lowest_left_counter_clockwise() {
        let mut polygon = Polygon::from_vertices(vec![
            Point2::new(0.0, 2.0),
            Point2::new(3.0, 2.0),
            Point2::new(3.0, 0.0),
            Point2::new(0.0, 0.0),
        ]);
        polygon.order_vertices();
        assert_eq!(polygon.vertex(0), Point2::new(0.0, 0.0));
        assert_eq!(polygon.vertex(1), Point2::new(3.0, 0.0));
        assert_eq!(polygon.vertex(3), Point2::new(0.0, 2.0));
        assert!(polygon.signed_area() > 0.0);
    }

    #[test]
    fn rotate_preserves_area_and_rectangularity() {
        let mut polygon = Polygon::rectangle(3.0, 2.0);
        polygon.rotate(FRAC_PI_4);
        assert!(f64_approx_equal(polygon.area(), 6.0));
        assert!(polygon.is_rectangle());
    }

    #[test]
    fn expand_scales_area_quadratically() {
        let mut polygon = triangle();
        polygon.expand(2.0);
        assert!(f64_approx_equal(polygon.area(), 24.0));
    }

    #[test]
    fn translate_moves_extents() {
        let mut polygon = Polygon::rectangle(1.0, 1.0);
        polygon.translate(2.0, -1.0);
        assert!(f64_approx_equal(polygon.x_min(), 2.0));
        assert!(f64_approx_equal(polygon.y_max(), 0.0));
    }

    #[test]
    fn write_emits_count_then_vertices() {
        let mut buffer = Vec::new();
        Polygon::rectangle(1.0, 2.0).write(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "4");
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[3].split_whitespace().collect::<Vec<_>>(), ["1.000000", "2.000000"]);
    }
}
