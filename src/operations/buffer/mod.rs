use std::f64::consts::{FRAC_PI_2, PI};

use crate::error::Result;
use crate::geometry::{point_on_ray, Point, Polygon};
use crate::math::predicates::robust_sign;
use crate::math::Angle;
use crate::operations::builder::{Builder, BuilderOptions, PolygonLayer};
use crate::shape::{Shape, ShapeIndex};

/// Whether polyline end caps are round or flat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndCapStyle {
    /// A 180-degree arc swept around the endpoint.
    #[default]
    Round,
    /// The outline is squared off through the endpoint's offset corners.
    Flat,
}

/// Controls the behavior of a [`BufferOperation`].
#[derive(Debug, Clone, Copy)]
pub struct BufferOptions {
    /// Angular expansion radius. Zero makes the operation a no-op;
    /// negative radii shrink instead of expand.
    pub buffer_radius: Angle,
    /// Maximum fraction of the radius by which an arc approximation may
    /// deviate from the true circle. Controls arc step granularity.
    pub error_fraction: f64,
    pub end_cap_style: EndCapStyle,
}

impl Default for BufferOptions {
    fn default() -> Self {
        Self {
            buffer_radius: 0.0,
            error_fraction: 0.01,
            end_cap_style: EndCapStyle::Round,
        }
    }
}

/// Expands point, polyline, or polygon-boundary geometry by an angular
/// radius, emitting arc vertices at corners and offset edges alongside the
/// input edges.
///
/// The buffered outline of each chain is traced as one closed path and fed
/// through a [`Builder`] into a polygon layer. Single-use: `execute`
/// consumes the operation.
#[derive(Debug)]
pub struct BufferOperation {
    options: BufferOptions,
}

impl BufferOperation {
    /// Creates a buffer operation with the given options.
    #[must_use]
    pub fn new(options: BufferOptions) -> Self {
        Self { options }
    }

    /// Buffers every shape in the index.
    ///
    /// A zero radius produces an empty polygon (nothing is emitted, not
    /// even a copy of the input). Chains too short to buffer (loops with
    /// fewer than 3 vertices, polylines with fewer than 2) are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the output paths cannot be assembled into
    /// loops.
    pub fn execute(self, index: &ShapeIndex) -> Result<Polygon> {
        let mut walk = BufferWalk::new(&self.options);
        if walk.buffer_sign == 0 {
            return Ok(Polygon::empty());
        }

        let mut polygon = Polygon::empty();
        let mut builder = Builder::new(BuilderOptions::default());
        builder.start_layer(PolygonLayer::new(&mut polygon));

        for (_, shape) in index.iter() {
            walk.buffer_shape(shape, &mut builder);
        }

        builder.build()?;
        Ok(polygon)
    }
}

/// Traces buffered outlines, accumulating one closed offset path at a time.
struct BufferWalk {
    buffer_sign: i32,
    abs_radius: Angle,
    vertex_step: Angle,
    point_step: Angle,
    end_cap_style: EndCapStyle,
    path: Vec<Point>,
}

impl BufferWalk {
    fn new(options: &BufferOptions) -> Self {
        let buffer_sign = match options.buffer_radius {
            r if r > 0.0 => 1,
            r if r < 0.0 => -1,
            _ => 0,
        };

        // Number of segments approximating a full circle within the error
        // fraction, and the angular step between arc vertices.
        let fraction = options.error_fraction.clamp(1e-6, 0.5);
        let circle_segments = PI / (1.0 - fraction).acos();
        let step = 2.0 * PI / circle_segments;

        Self {
            buffer_sign,
            abs_radius: options.buffer_radius.abs(),
            vertex_step: step,
            point_step: step,
            end_cap_style: options.end_cap_style,
            path: Vec::new(),
        }
    }

    /// Dispatches one shape per chain and geometry dimension.
    fn buffer_shape(&mut self, shape: &Shape, builder: &mut Builder<'_>) {
        for chain_id in 0..shape.num_chains() {
            if shape.chain(chain_id).length == 0 {
                continue;
            }
            match shape.dimension() {
                0 => self.add_point(&shape.chain_edge(chain_id, 0).v0),
                1 => self.add_polyline(&shape.chain_vertices(chain_id)),
                _ => self.add_loop(&shape.chain_vertices(chain_id)),
            }
            self.output_path(builder);
        }
    }

    /// Buffers a single point into a circle, walking the four quadrants
    /// around it at `point_step` increments.
    fn add_point(&mut self, p: &Point) {
        if self.buffer_sign == 0 {
            return;
        }

        let mut start = p.ortho();
        let mut angle: Angle = 0.0;

        for _ in 0..4 {
            let rotate = Point(p.0.cross(&start.0).normalize());
            while angle < FRAC_PI_2 {
                let dir = Point((start.0 * angle.cos() + rotate.0 * angle.sin()).normalize());
                self.add_offset_vertex(point_on_ray(p, &dir, self.abs_radius));
                angle += self.point_step;
            }
            angle -= FRAC_PI_2;
            start = rotate;
        }
    }

    /// Buffers an open polyline: start cap, one side, end cap, then the
    /// return trip along the other side to close the region.
    fn add_polyline(&mut self, points: &[Point]) {
        let pts = dedup_adjacent(points, false);
        let n = pts.len();
        if n < 2 {
            return;
        }

        self.add_start_cap(&pts[0], &pts[1]);
        for i in 0..n - 2 {
            self.buffer_edge_and_vertex(&pts[i], &pts[i + 1], &pts[i + 2]);
        }
        self.add_edge_arc(&pts[n - 2], &pts[n - 1]);
        self.add_end_cap(&pts[n - 2], &pts[n - 1]);

        for i in (0..n.saturating_sub(2)).rev() {
            self.buffer_edge_and_vertex(&pts[i + 2], &pts[i + 1], &pts[i]);
        }
        self.add_edge_arc(&pts[1], &pts[0]);
    }

    /// Buffers a closed loop boundary; no caps, the path closes cyclically.
    fn add_loop(&mut self, points: &[Point]) {
        let pts = dedup_adjacent(points, true);
        let n = pts.len();
        if n < 3 {
            return;
        }

        for i in 0..n {
            self.buffer_edge_and_vertex(&pts[i], &pts[(i + 1) % n], &pts[(i + 2) % n]);
        }
    }

    /// Emits the offset for edge `(a, b)`, then handles the corner at `b`:
    /// a swept arc when the turn is convex relative to the buffer side, or
    /// a direct join of the adjacent edge offsets when it is reflex.
    fn buffer_edge_and_vertex(&mut self, a: &Point, b: &Point, c: &Point) {
        self.add_edge_arc(a, b);

        let turn = i32::from(robust_sign(a, b, c).sign());
        if self.buffer_sign * turn >= 0 {
            let start = self.edge_axis(a, b);
            let end = self.edge_axis(b, c);
            self.add_vertex_arc(b, &start, &end);
        }
    }

    fn add_start_cap(&mut self, a: &Point, b: &Point) {
        let axis = self.edge_axis(a, b);
        match self.end_cap_style {
            EndCapStyle::Round => self.add_vertex_arc(a, &-axis, &axis),
            EndCapStyle::Flat => {
                // The two corners of the squared-off cap.
                self.add_offset_vertex(point_on_ray(a, &-axis, self.abs_radius));
                self.add_offset_vertex(point_on_ray(a, &axis, self.abs_radius));
            }
        }
    }

    fn add_end_cap(&mut self, a: &Point, b: &Point) {
        let axis = self.edge_axis(a, b);
        match self.end_cap_style {
            EndCapStyle::Round => self.add_vertex_arc(b, &axis, &-axis),
            EndCapStyle::Flat => {
                self.add_offset_vertex(point_on_ray(b, &axis, self.abs_radius));
                self.add_offset_vertex(point_on_ray(b, &-axis, self.abs_radius));
            }
        }
    }

    /// Emits the offset of `b` perpendicular to edge `(a, b)`.
    fn add_edge_arc(&mut self, a: &Point, b: &Point) {
        let axis = self.edge_axis(a, b);
        self.add_offset_vertex(point_on_ray(b, &axis, self.abs_radius));
    }

    /// Sweeps an arc around `v` from the `start` axis to the `end` axis at
    /// `vertex_step` increments.
    fn add_vertex_arc(&mut self, v: &Point, start: &Point, end: &Point) {
        let mut rotate = Point(v.0.cross(&start.0).normalize());
        if self.buffer_sign < 0 {
            rotate = -rotate;
        }

        let cos = start.0.dot(&end.0);
        let sin = end.0.dot(&rotate.0);
        let mut total = sin.atan2(cos);
        if total < 0.0 {
            // Antipodal axes (a 180-degree cap) land on -pi; a straight
            // continuation may land on a tiny negative angle.
            if cos < 0.0 {
                total += 2.0 * PI;
            } else {
                total = 0.0;
            }
        }

        self.add_offset_vertex(point_on_ray(v, start, self.abs_radius));
        let mut angle = self.vertex_step;
        while angle < total {
            let dir = Point((start.0 * angle.cos() + rotate.0 * angle.sin()).normalize());
            self.add_offset_vertex(point_on_ray(v, &dir, self.abs_radius));
            angle += self.vertex_step;
        }
        self.add_offset_vertex(point_on_ray(v, end, self.abs_radius));
    }

    /// The outward perpendicular of edge `(a, b)`: `normalize(b x a)`,
    /// flipped when buffering inward.
    fn edge_axis(&self, a: &Point, b: &Point) -> Point {
        let axis = Point(b.0.cross(&a.0).normalize());
        if self.buffer_sign < 0 {
            -axis
        } else {
            axis
        }
    }

    fn add_offset_vertex(&mut self, p: Point) {
        if self.path.last().is_some_and(|last| last.approx_eq(&p)) {
            return;
        }
        self.path.push(p);
    }

    /// Closes the accumulated path and feeds its edges to the builder.
    fn output_path(&mut self, builder: &mut Builder<'_>) {
        if self
            .path
            .last()
            .zip(self.path.first())
            .is_some_and(|(last, first)| last.approx_eq(first))
        {
            self.path.pop();
        }
        if self.path.len() >= 3 {
            for i in 0..self.path.len() {
                builder.add_edge(self.path[i], self.path[(i + 1) % self.path.len()]);
            }
        }
        self.path.clear();
    }
}

/// Removes adjacent (and for closed inputs, wrap-around) duplicate points.
fn dedup_adjacent(points: &[Point], closed: bool) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().is_some_and(|last| last.approx_eq(p)) {
            continue;
        }
        out.push(*p);
    }
    if closed {
        while out.len() > 1 && out[0].approx_eq(&out[out.len() - 1]) {
            out.pop();
        }
    }
    out
}
