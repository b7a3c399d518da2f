use crate::base::{Error, GEOMETRY_ZERO_TOL};
use serde::{Deserialize, Serialize};

/// Holds a simple polygon in the (z, y) plane of the cross-section
///
/// The z-axis is the transverse direction and the y-axis is the vertical direction.
/// The ring is stored open (the first point is not repeated) and counterclockwise.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Polygon {
    coords: Vec<[f64; 2]>,
}

impl Polygon {
    /// Allocates a new instance
    ///
    /// The closing point (if repeated) and consecutive duplicates are removed. Clockwise
    /// rings are reversed.
    pub fn new(coords: Vec<[f64; 2]>) -> Result<Self, Error> {
        let mut ring: Vec<[f64; 2]> = Vec::with_capacity(coords.len());
        for p in coords {
            if !p[0].is_finite() || !p[1].is_finite() {
                return Err(Error::InvalidPolygon("found NaN or Inf coordinates".to_string()));
            }
            match ring.last() {
                Some(q) if same_point(q, &p) => (),
                _ => ring.push(p),
            }
        }
        while ring.len() > 1 && same_point(&ring[0], &ring[ring.len() - 1]) {
            ring.pop();
        }
        if ring.len() < 3 {
            return Err(Error::InvalidPolygon(format!(
                "at least 3 distinct points are required; found {}",
                ring.len()
            )));
        }
        let signed = signed_area(&ring);
        if f64::abs(signed) <= GEOMETRY_ZERO_TOL {
            return Err(Error::InvalidPolygon("the area is zero".to_string()));
        }
        if signed < 0.0 {
            ring.reverse();
        }
        Ok(Polygon { coords: ring })
    }

    /// Returns the points of the (open, counterclockwise) ring
    pub fn coords(&self) -> &[[f64; 2]] {
        &self.coords
    }

    /// Returns the number of points
    pub fn npoint(&self) -> usize {
        self.coords.len()
    }

    /// Computes the area (shoelace formula)
    pub fn area(&self) -> f64 {
        signed_area(&self.coords)
    }

    /// Returns the bounding box `(z_min, y_min, z_max, y_max)`
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let mut b = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        for p in &self.coords {
            b.0 = f64::min(b.0, p[0]);
            b.1 = f64::min(b.1, p[1]);
            b.2 = f64::max(b.2, p[0]);
            b.3 = f64::max(b.3, p[1]);
        }
        b
    }

    /// Returns the transverse (z) extent of the bounding box
    pub fn width(&self) -> f64 {
        let (z_min, _, z_max, _) = self.bounds();
        z_max - z_min
    }

    /// Returns the vertical (y) extent of the bounding box
    pub fn height(&self) -> f64 {
        let (_, y_min, _, y_max) = self.bounds();
        y_max - y_min
    }

    /// Computes the length of the intersection with the vertical line at `z`
    ///
    /// The polygon is closed; thus the intersection is the union of the intervals found just
    /// left of `z`, just right of `z`, and along vertical edges lying on the line. All
    /// intersected segments are summed; thus re-entrant sections are handled.
    ///
    /// ```text
    ///   ●───────────●
    ///   │           │ ← at z = z_max the vertical edge counts
    ///   ●───────────●
    /// ```
    pub fn vertical_extent(&self, z: f64) -> f64 {
        let n = self.coords.len();
        let mut intervals = Vec::new();
        for from_left in [true, false] {
            let mut ys = Vec::new();
            for i in 0..n {
                let p = &self.coords[i];
                let q = &self.coords[(i + 1) % n];
                let (lo, hi) = (f64::min(p[0], q[0]), f64::max(p[0], q[0]));
                let crosses = if from_left { lo < z && z <= hi } else { lo <= z && z < hi };
                if crosses {
                    let t = (z - p[0]) / (q[0] - p[0]);
                    ys.push(p[1] + t * (q[1] - p[1]));
                }
            }
            ys.sort_by(f64::total_cmp);
            intervals.extend(ys.chunks_exact(2).map(|pair| [pair[0], pair[1]]));
        }
        for i in 0..n {
            let p = &self.coords[i];
            let q = &self.coords[(i + 1) % n];
            if f64::abs(p[0] - z) <= GEOMETRY_ZERO_TOL && f64::abs(q[0] - z) <= GEOMETRY_ZERO_TOL {
                intervals.push([f64::min(p[1], q[1]), f64::max(p[1], q[1])]);
            }
        }
        union_length(&mut intervals)
    }

    /// Clips the polygon to the vertical band `z_min ≤ z ≤ z_max`
    ///
    /// Uses the Sutherland-Hodgman algorithm against the two (convex) half-planes.
    ///
    /// Returns None if the clipped polygon is empty or degenerate. Returns an error if the band
    /// cuts the polygon into disconnected pieces: the clipped ring would then join the pieces
    /// by zero-width bridges along the band edges and would not be simple.
    pub fn clip_band(&self, z_min: f64, z_max: f64) -> Result<Option<Polygon>, Error> {
        if z_max <= z_min {
            return Ok(None);
        }
        let left = clip_vertical(&self.coords, z_min, true);
        let clipped = clip_vertical(&left, z_max, false);
        if bridged_along(&clipped, z_min) || bridged_along(&clipped, z_max) {
            return Err(Error::InvalidPolygon(format!(
                "the band {:?} ≤ z ≤ {:?} splits the polygon into disconnected pieces",
                z_min, z_max
            )));
        }
        Ok(Polygon::new(clipped).ok())
    }

    /// Returns true if no two non-adjacent edges cross each other
    pub fn is_simple(&self) -> bool {
        let n = self.coords.len();
        for i in 0..n {
            let a = &self.coords[i];
            let b = &self.coords[(i + 1) % n];
            for j in (i + 2)..n {
                if i == 0 && j == n - 1 {
                    continue; // adjacent through the closing edge
                }
                let c = &self.coords[j];
                let d = &self.coords[(j + 1) % n];
                if segments_cross(a, b, c, d) {
                    return false;
                }
            }
        }
        true
    }
}

/// Returns true if the points coincide within the geometry tolerance
fn same_point(a: &[f64; 2], b: &[f64; 2]) -> bool {
    f64::abs(a[0] - b[0]) <= GEOMETRY_ZERO_TOL && f64::abs(a[1] - b[1]) <= GEOMETRY_ZERO_TOL
}

/// Computes the total length of the union of closed intervals
fn union_length(intervals: &mut [[f64; 2]]) -> f64 {
    intervals.sort_by(|a, b| f64::total_cmp(&a[0], &b[0]));
    let mut total = 0.0;
    let mut current: Option<[f64; 2]> = None;
    for iv in intervals.iter() {
        current = match current {
            Some(c) if iv[0] <= c[1] => Some([c[0], f64::max(c[1], iv[1])]),
            Some(c) => {
                total += c[1] - c[0];
                Some(*iv)
            }
            None => Some(*iv),
        };
    }
    if let Some(c) = current {
        total += c[1] - c[0];
    }
    total
}

/// Returns true if edges of the ring lying on the vertical line z = c overlap each other
fn bridged_along(ring: &[[f64; 2]], c: f64) -> bool {
    let n = ring.len();
    let mut intervals = Vec::new();
    let mut sum = 0.0;
    for i in 0..n {
        let p = &ring[i];
        let q = &ring[(i + 1) % n];
        if f64::abs(p[0] - c) <= GEOMETRY_ZERO_TOL && f64::abs(q[0] - c) <= GEOMETRY_ZERO_TOL {
            intervals.push([f64::min(p[1], q[1]), f64::max(p[1], q[1])]);
            sum += f64::abs(q[1] - p[1]);
        }
    }
    if intervals.len() < 2 {
        return false;
    }
    let union = union_length(&mut intervals);
    sum > union + GEOMETRY_ZERO_TOL * f64::max(1.0, union)
}

/// Computes the signed area of an open ring (positive if counterclockwise)
fn signed_area(ring: &[[f64; 2]]) -> f64 {
    let n = ring.len();
    let mut sum = 0.0;
    for i in 0..n {
        let p = &ring[i];
        let q = &ring[(i + 1) % n];
        sum += p[0] * q[1] - q[0] * p[1];
    }
    sum / 2.0
}

/// Clips an open ring against the half-plane `z ≥ c` (keep_greater) or `z ≤ c`
fn clip_vertical(ring: &[[f64; 2]], c: f64, keep_greater: bool) -> Vec<[f64; 2]> {
    let inside = |p: &[f64; 2]| if keep_greater { p[0] >= c } else { p[0] <= c };
    let n = ring.len();
    let mut out = Vec::with_capacity(n + 2);
    for i in 0..n {
        let cur = ring[i];
        let prev = ring[(i + n - 1) % n];
        match (inside(&prev), inside(&cur)) {
            (true, true) => out.push(cur),
            (false, true) => {
                out.push(intersect_vertical(&prev, &cur, c));
                out.push(cur);
            }
            (true, false) => out.push(intersect_vertical(&prev, &cur, c)),
            (false, false) => (),
        }
    }
    out
}

/// Computes the intersection of the segment pq with the vertical line z = c
fn intersect_vertical(p: &[f64; 2], q: &[f64; 2], c: f64) -> [f64; 2] {
    let t = (c - p[0]) / (q[0] - p[0]);
    [c, p[1] + t * (q[1] - p[1])]
}

/// Returns the orientation of the triangle abc (positive if counterclockwise)
fn orient(a: &[f64; 2], b: &[f64; 2], c: &[f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// Returns true if the segments ab and cd cross at a single interior point
fn segments_cross(a: &[f64; 2], b: &[f64; 2], c: &[f64; 2], d: &[f64; 2]) -> bool {
    let d1 = orient(a, b, c);
    let d2 = orient(a, b, d);
    let d3 = orient(c, d, a);
    let d4 = orient(c, d, b);
    let tol = GEOMETRY_ZERO_TOL;
    ((d1 > tol && d2 < -tol) || (d1 < -tol && d2 > tol)) && ((d3 > tol && d4 < -tol) || (d3 < -tol && d4 > tol))
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Polygon;
    use crate::base::{Error, SampleSections};
    use russell_lab::approx_eq;

    #[test]
    fn new_captures_errors() {
        assert_eq!(
            Polygon::new(vec![[0.0, 0.0], [1.0, 0.0]]).err(),
            Some(Error::InvalidPolygon(
                "at least 3 distinct points are required; found 2".to_string()
            ))
        );
        assert_eq!(
            Polygon::new(vec![[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]]).err(),
            Some(Error::InvalidPolygon("the area is zero".to_string()))
        );
        assert_eq!(
            Polygon::new(vec![[0.0, 0.0], [1.0, f64::NAN], [2.0, 1.0]]).err(),
            Some(Error::InvalidPolygon("found NaN or Inf coordinates".to_string()))
        );
    }

    #[test]
    fn new_normalizes_the_ring() -> Result<(), Error> {
        // clockwise and closed
        let poly = Polygon::new(vec![[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]])?;
        assert_eq!(poly.npoint(), 4);
        approx_eq(poly.area(), 1.0, 1e-15);
        assert_eq!(poly.coords()[0], [1.0, 0.0]);
        Ok(())
    }

    #[test]
    fn bounds_and_extents_work() -> Result<(), Error> {
        let poly = SampleSections::rectangle(14.0, 1.0)?;
        assert_eq!(poly.bounds(), (-7.0, -0.5, 7.0, 0.5));
        assert_eq!(poly.width(), 14.0);
        assert_eq!(poly.height(), 1.0);
        approx_eq(poly.area(), 14.0, 1e-15);
        Ok(())
    }

    #[test]
    fn vertical_extent_works() -> Result<(), Error> {
        let square = SampleSections::square(14.0)?;
        approx_eq(square.vertical_extent(0.0), 14.0, 1e-14);
        approx_eq(square.vertical_extent(2.0), 10.0, 1e-14);
        approx_eq(square.vertical_extent(-2.0), 10.0, 1e-14);
        approx_eq(square.vertical_extent(6.0), 2.0, 1e-14);
        assert_eq!(square.vertical_extent(7.0), 0.0);
        assert_eq!(square.vertical_extent(8.0), 0.0);

        let rect = SampleSections::rectangle(14.0, 1.0)?;
        approx_eq(rect.vertical_extent(3.0), 1.0, 1e-15);
        approx_eq(rect.vertical_extent(7.0), 1.0, 1e-15);
        approx_eq(rect.vertical_extent(-7.0), 1.0, 1e-15);
        assert_eq!(rect.vertical_extent(7.5), 0.0);

        let round = SampleSections::round(10.0)?;
        approx_eq(round.vertical_extent(0.0), 10.0, 1e-12);
        approx_eq(round.vertical_extent(3.0), 8.0, 1e-3);
        Ok(())
    }

    #[test]
    fn vertical_extent_sums_reentrant_segments() -> Result<(), Error> {
        // C-shaped section opening to the right
        //
        //  +-----------+  y = 3
        //  |           |
        //  |     +-----+  y = 2
        //  |     |
        //  |     +-----+  y = 1
        //  |           |
        //  +-----------+  y = 0
        //  0     1     3
        let poly = Polygon::new(vec![
            [0.0, 0.0],
            [3.0, 0.0],
            [3.0, 1.0],
            [1.0, 1.0],
            [1.0, 2.0],
            [3.0, 2.0],
            [3.0, 3.0],
            [0.0, 3.0],
        ])?;
        approx_eq(poly.area(), 7.0, 1e-15);
        approx_eq(poly.vertical_extent(0.5), 3.0, 1e-15);
        approx_eq(poly.vertical_extent(2.0), 2.0, 1e-15);

        let poly = SampleSections::constricted(6.0, 4.0, 1.5)?;
        approx_eq(poly.vertical_extent(0.0), 1.0, 1e-14);
        approx_eq(poly.vertical_extent(3.0 - 1e-9), 4.0, 1e-8);
        approx_eq(poly.vertical_extent(3.0), 4.0, 1e-15);
        approx_eq(poly.vertical_extent(-3.0), 4.0, 1e-15);

        // the inner wall of the C-shape lies on the line
        let c_shape = Polygon::new(vec![
            [0.0, 0.0],
            [3.0, 0.0],
            [3.0, 1.0],
            [1.0, 1.0],
            [1.0, 2.0],
            [3.0, 2.0],
            [3.0, 3.0],
            [0.0, 3.0],
        ])?;
        approx_eq(c_shape.vertical_extent(1.0), 3.0, 1e-15);
        approx_eq(c_shape.vertical_extent(0.0), 3.0, 1e-15);
        approx_eq(c_shape.vertical_extent(3.0), 2.0, 1e-15);
        Ok(())
    }

    #[test]
    fn clip_band_works() -> Result<(), Error> {
        let rect = SampleSections::rectangle(14.0, 1.0)?;
        let piece = rect.clip_band(-1.0, 1.0)?.unwrap();
        approx_eq(piece.area(), 2.0, 1e-15);
        assert_eq!(piece.bounds(), (-1.0, -0.5, 1.0, 0.5));

        let piece = rect.clip_band(5.0, 7.0)?.unwrap();
        approx_eq(piece.area(), 2.0, 1e-15);

        assert!(rect.clip_band(7.0, 9.0)?.is_none());
        assert!(rect.clip_band(1.0, 1.0)?.is_none());

        let square = SampleSections::square(14.0)?;
        let piece = square.clip_band(3.0, 5.0)?.unwrap();
        approx_eq(piece.area(), 12.0, 1e-13);
        Ok(())
    }

    #[test]
    fn clip_band_handles_non_convex_sections() -> Result<(), Error> {
        let poly = SampleSections::constricted(6.0, 4.0, 1.5)?;
        let mut total = 0.0;
        let bounds = [-3.0, -1.0, 0.0, 1.5, 3.0];
        for i in 0..4 {
            let piece = poly.clip_band(bounds[i], bounds[i + 1])?.unwrap();
            assert!(piece.is_simple());
            total += piece.area();
        }
        approx_eq(total, poly.area(), 1e-13);
        Ok(())
    }

    #[test]
    fn clip_band_captures_disconnected_pieces() -> Result<(), Error> {
        // C-shaped section opening to the right (see above)
        let c_shape = Polygon::new(vec![
            [0.0, 0.0],
            [3.0, 0.0],
            [3.0, 1.0],
            [1.0, 1.0],
            [1.0, 2.0],
            [3.0, 2.0],
            [3.0, 3.0],
            [0.0, 3.0],
        ])?;

        // the spine is connected
        let spine = c_shape.clip_band(0.0, 1.0)?.unwrap();
        approx_eq(spine.area(), 3.0, 1e-15);
        assert!(spine.is_simple());

        // a band through the spine keeps the arms connected
        let piece = c_shape.clip_band(0.5, 3.0)?.unwrap();
        approx_eq(piece.area(), 5.5, 1e-15);

        // the arms alone are two separate pieces
        assert_eq!(
            c_shape.clip_band(2.0, 3.0).err(),
            Some(Error::InvalidPolygon(
                "the band 2.0 ≤ z ≤ 3.0 splits the polygon into disconnected pieces".to_string()
            ))
        );
        assert!(c_shape.clip_band(1.0, 3.0).is_err());
        Ok(())
    }

    #[test]
    fn is_simple_works() -> Result<(), Error> {
        let round = SampleSections::round(10.0)?;
        assert!(round.is_simple());
        let bow_tie = Polygon::new(vec![[0.0, 0.0], [2.0, 2.0], [2.0, 0.0], [0.0, 2.0], [-1.0, 1.0]])?;
        assert!(!bow_tie.is_simple());
        Ok(())
    }
}
