use super::Configuration;
use crate::core::geometry::planar::on_left;
use crate::core::geometry::polygon::Polygon;
use nalgebra::{Point2, Vector2};
use rand::Rng;
use thiserror::Error;
use tracing::debug;

/// Hull offsets grow by this fraction of the smallest atom radius per pass.
const HULL_OFFSET_FRACTION: f64 = 0.15;
const MAX_HULL_EXPANSIONS: usize = 10_000;

/// Region the objects are confined to.
#[derive(Debug, Clone, PartialEq)]
pub enum Boundary {
    /// Axis-aligned `[0, x_size] x [0, y_size]`, optionally periodic.
    Rectangle {
        x_size: f64,
        y_size: f64,
        periodic: bool,
    },
    /// Arbitrary simple polygon, never periodic.
    Polygon(Polygon),
}

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("A convex hull needs at least 3 objects, found {found}")]
    TooFewObjects { found: usize },
    #[error("Expanding a hull around atoms requires a topology")]
    MissingTopology,
    #[error("Hull offset must be strictly positive, got {0}")]
    NonPositiveOffset(f64),
    #[error("Object centres span only {vertices} hull vertices")]
    Degenerate { vertices: usize },
    #[error("Hull did not enclose all atoms after {iterations} expansions")]
    NotConverged { iterations: usize },
}

impl Boundary {
    pub fn rectangle(x_size: f64, y_size: f64, periodic: bool) -> Self {
        Self::Rectangle {
            x_size,
            y_size,
            periodic,
        }
    }

    pub fn is_periodic(&self) -> bool {
        matches!(self, Self::Rectangle { periodic: true, .. })
    }

    pub fn is_rectangle(&self) -> bool {
        matches!(self, Self::Rectangle { .. })
    }

    pub fn area(&self) -> f64 {
        match self {
            Self::Rectangle { x_size, y_size, .. } => x_size * y_size,
            Self::Polygon(polygon) => polygon.area(),
        }
    }

    pub fn width(&self) -> f64 {
        match self {
            Self::Rectangle { x_size, .. } => *x_size,
            Self::Polygon(polygon) => polygon.x_max() - polygon.x_min(),
        }
    }

    pub fn height(&self) -> f64 {
        match self {
            Self::Rectangle { y_size, .. } => *y_size,
            Self::Polygon(polygon) => polygon.y_max() - polygon.y_min(),
        }
    }

    /// Distance from `p` to the nearest wall, negative when `p` is outside.
    pub fn signed_wall_distance(&self, p: &Point2<f64>) -> f64 {
        match self {
            Self::Rectangle { x_size, y_size, .. } => {
                p.x.min(x_size - p.x).min(p.y).min(y_size - p.y)
            }
            Self::Polygon(polygon) => {
                let d = polygon.distance_to_boundary(p.x, p.y);
                if polygon.is_inside(p.x, p.y) { d } else { -d }
            }
        }
    }

    /// A disc of `radius` centred on `p` fits inside without touching a wall.
    pub fn holds_disc(&self, p: &Point2<f64>, radius: f64) -> bool {
        match self {
            Self::Rectangle { x_size, y_size, .. } => {
                p.x >= radius && p.x + radius <= *x_size && p.y >= radius && p.y + radius <= *y_size
            }
            Self::Polygon(polygon) => polygon.is_inside_with_margin(p.x, p.y, radius),
        }
    }

    fn expand(&mut self, factor: f64) {
        match self {
            Self::Rectangle { x_size, y_size, .. } => {
                *x_size *= factor;
                *y_size *= factor;
            }
            Self::Polygon(polygon) => polygon.expand(factor),
        }
    }
}

impl Configuration {
    /// Scales the boundary and every object position by `factor`.
    /// Orientations are untouched. Returns whether the result clashes.
    pub fn expand(&mut self, factor: f64) -> bool {
        self.boundary.expand(factor);
        for object in &mut self.objects {
            object.expand(factor);
        }
        self.invalidate_all();
        self.has_clashes()
    }

    /// Like [`Configuration::expand`], then jiggles clashing objects up to
    /// `max_try` times. Returns whether clashes remain.
    pub fn expand_with_jiggle(&mut self, factor: f64, max_try: usize, rng: &mut impl Rng) -> bool {
        self.expand(factor);
        for _ in 0..max_try {
            if !self.has_clashes() {
                break;
            }
            self.jiggle(rng);
        }
        self.has_clashes()
    }

    /// Replaces a rectangle with the equivalent polygon. Returns false if the
    /// boundary already was a polygon.
    pub fn rect_2_poly(&mut self) -> bool {
        match self.boundary {
            Boundary::Rectangle { x_size, y_size, .. } => {
                self.boundary = Boundary::Polygon(Polygon::rectangle(x_size, y_size));
                self.invalidate_all();
                true
            }
            Boundary::Polygon(_) => false,
        }
    }

    /// Turns a rectangular polygon back into an axis-aligned rectangle by
    /// moving its lowest corner to the origin and rotating its first edge
    /// onto the x axis. Objects follow the frame. Returns false, leaving the
    /// configuration untouched, if the boundary is not a rectangular polygon.
    pub fn poly_2_rect(&mut self) -> bool {
        let mut polygon = match &self.boundary {
            Boundary::Polygon(polygon) if polygon.is_rectangle() => polygon.clone(),
            _ => return false,
        };
        polygon.order_vertices();
        let origin = polygon.vertex(0);
        self.boundary = Boundary::Polygon(polygon);
        self.translate(-origin.x, -origin.y);

        let edge = self.boundary_vertex(1) - self.boundary_vertex(0);
        if edge.y != 0.0 {
            self.rotate(-edge.y.atan2(edge.x));
        }
        let x_size = self.boundary_vertex(1).x;
        let y_size = self.boundary_vertex(3).y;
        self.boundary = Boundary::rectangle(x_size, y_size, false);
        for index in 0..self.objects.len() {
            self.fix_inbox(index);
        }
        self.invalidate_all();
        debug!(x_size, y_size, "Converted rectangular polygon to rectangle.");
        true
    }

    fn boundary_vertex(&self, index: usize) -> Point2<f64> {
        match &self.boundary {
            Boundary::Polygon(polygon) => polygon.vertex(index),
            Boundary::Rectangle { .. } => Point2::origin(),
        }
    }

    /// Shifts the frame: boundary and objects move by `(dx, dy)`. A rectangle
    /// becomes a polygon first.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.rect_2_poly();
        if let Boundary::Polygon(polygon) = &mut self.boundary {
            polygon.translate(dx, dy);
        }
        for object in &mut self.objects {
            object.translate(dx, dy);
        }
        self.invalidate_all();
    }

    /// Rotates the frame counter-clockwise about the origin: boundary, object
    /// positions and orientations. A rectangle becomes a polygon first.
    pub fn rotate(&mut self, angle: f64) {
        self.rect_2_poly();
        if let Boundary::Polygon(polygon) = &mut self.boundary {
            polygon.rotate(angle);
        }
        let rotation = nalgebra::Rotation2::new(angle);
        for object in &mut self.objects {
            object.position = rotation * object.position;
            object.rotate(angle);
        }
        self.invalidate_all();
    }

    /// Uses `polygon` as the new, non-periodic boundary.
    pub fn set_poly(&mut self, polygon: Polygon) {
        self.boundary = Boundary::Polygon(polygon);
        self.invalidate_all();
    }

    /// Every atom of every object lies inside `polygon` with its full radius.
    /// Without a topology only object centres are checked.
    pub fn objects_inside(&self, polygon: &Polygon) -> bool {
        self.objects.iter().all(|object| match &self.topology {
            Some(topology) => object
                .atoms(topology)
                .all(|a| polygon.is_inside_with_margin(a.position.x, a.position.y, a.radius)),
            None => polygon.is_inside(object.x(), object.y()),
        })
    }

    /// Convex hull of the object centres by gift wrapping from the lowest of
    /// the leftmost centres. Collinear centres on an edge are covered by the
    /// edge but never become vertices, and duplicate centres are ignored.
    /// With `expand`, the hull is pushed outward until it contains every atom.
    pub fn convex_hull(&self, expand: bool) -> Result<Polygon, GeometryError> {
        let n = self.objects.len();
        if n < 3 {
            return Err(GeometryError::TooFewObjects { found: n });
        }
        let points: Vec<Point2<f64>> = self.objects.iter().map(|o| o.position).collect();
        let Some(start) = points
            .iter()
            .copied()
            .min_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)))
        else {
            return Err(GeometryError::TooFewObjects { found: n });
        };

        let mut hull = Polygon::new();
        let mut current = start;
        loop {
            hull.add_vertex(current.x, current.y);
            let mut end: Option<Point2<f64>> = None;
            for &candidate in &points {
                if candidate == current {
                    continue;
                }
                end = match end {
                    Some(e) if !wraps_wider(&current, &e, &candidate) => Some(e),
                    _ => Some(candidate),
                };
            }
            match end {
                Some(next) if next != start && hull.n_vertex() < n => current = next,
                _ => break,
            }
        }
        if hull.n_vertex() < 3 {
            return Err(GeometryError::Degenerate {
                vertices: hull.n_vertex(),
            });
        }

        if expand {
            hull = self.expand_hull(hull)?;
        }
        Ok(hull)
    }

    fn expand_hull(&self, mut hull: Polygon) -> Result<Polygon, GeometryError> {
        let topology = self.topology.as_ref().ok_or(GeometryError::MissingTopology)?;
        let offset = HULL_OFFSET_FRACTION * topology.min_atom_radius();
        if offset.is_nan() || offset <= 0.0 {
            return Err(GeometryError::NonPositiveOffset(offset));
        }
        for iteration in 0..MAX_HULL_EXPANSIONS {
            if self.objects_inside(&hull) {
                debug!(iterations = iteration, "Hull encloses all atoms.");
                return Ok(hull);
            }
            hull = offset_outward(&hull, offset);
        }
        if self.objects_inside(&hull) {
            return Ok(hull);
        }
        Err(GeometryError::NotConverged {
            iterations: MAX_HULL_EXPANSIONS,
        })
    }

    /// Root mean square displacement of atoms relative to `reference`.
    /// `None` when the object counts differ or there are no objects.
    pub fn rms(&self, reference: &Configuration) -> Option<f64> {
        if self.objects.is_empty() || self.objects.len() != reference.objects.len() {
            return None;
        }
        let mut sum = 0.0;
        let mut count = 0usize;
        for (mine, theirs) in self.objects.iter().zip(&reference.objects) {
            let a = self.atom_positions(mine);
            let b = self.atom_positions(theirs);
            for (p, q) in a.iter().zip(&b) {
                sum += (p - q).norm_squared();
                count += 1;
            }
        }
        (count > 0).then(|| (sum / count as f64).sqrt())
    }
}

/// Whether `candidate` should replace `end` as the next hull vertex after
/// `current`: it lies strictly left of `current -> end`, or on that line and
/// farther away.
fn wraps_wider(current: &Point2<f64>, end: &Point2<f64>, candidate: &Point2<f64>) -> bool {
    if on_left(candidate, current, end) {
        return true;
    }
    !on_left(end, current, candidate)
        && (candidate - current).norm_squared() > (end - current).norm_squared()
}

/// Moves each vertex `offset` outward along the bisector of the outward
/// normals of its two edges. Repeated vertices are merged first, and a
/// straight angle moves along the shared edge normal.
fn offset_outward(hull: &Polygon, offset: f64) -> Polygon {
    let mut vertices: Vec<Point2<f64>> = Vec::with_capacity(hull.n_vertex());
    for &vertex in hull.vertices() {
        if vertices.last() != Some(&vertex) {
            vertices.push(vertex);
        }
    }
    while vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }
    let n = vertices.len();
    if n < 3 {
        return hull.clone();
    }

    let winding = if hull.signed_area() < 0.0 { -1.0 } else { 1.0 };
    let outward_normal = |a: &Point2<f64>, b: &Point2<f64>| -> Vector2<f64> {
        let edge = b - a;
        Vector2::new(edge.y, -edge.x) * (winding / edge.norm())
    };

    let mut grown = Polygon::new();
    for i in 0..n {
        let prev = vertices[(i + n - 1) % n];
        let vertex = vertices[i];
        let next = vertices[(i + 1) % n];
        let before = outward_normal(&prev, &vertex);
        let bisector = before + outward_normal(&vertex, &next);
        let direction = if bisector.norm() > f64::EPSILON {
            bisector.normalize()
        } else {
            before
        };
        let shift = direction * offset;
        grown.add_vertex(vertex.x + shift.x, vertex.y + shift.y);
    }
    grown
}
