use super::Polygon;
use crate::base::{Error, GEOMETRY_ZERO_TOL};

/// Rebuilds the full symmetric cross-section from the pillars of the half profile
///
/// ```text
///              y
///              ↑
///   (-c₁,h₁/2) ●───●───● (c₁,h₁/2)    the top edge is emitted from the centerline
///            ╱     │     ╲              outwards, closed at (outer, 0), mirrored to
/// (-outer,0)●      o──────●──→ z        the bottom, then mirrored to the negative
///            ╲     │     ╱ (outer,0)    half and closed at the centerline
///              ●───●───●
/// ```
///
/// # Input
///
/// * `pillars` -- transverse coordinates of the pillar centers (strictly increasing, first ≥ 0)
/// * `heights` -- pillar heights (≥ 0)
/// * `outer` -- transverse coordinate of the outer edge (> last pillar center)
pub fn reconstruct_cross_section(pillars: &[f64], heights: &[f64], outer: f64) -> Result<Polygon, Error> {
    let n = pillars.len();
    if n == 0 {
        return Err(Error::DegenerateGeometry("at least one pillar is required".to_string()));
    }
    if heights.len() != n {
        return Err(Error::Input("the number of heights must equal the number of pillars"));
    }
    if pillars[0] < 0.0 {
        return Err(Error::DegenerateGeometry("the first pillar center must be ≥ 0".to_string()));
    }
    for i in 1..n {
        if pillars[i] <= pillars[i - 1] {
            return Err(Error::DegenerateGeometry(format!(
                "pillar centers must be strictly increasing; found {:?} after {:?}",
                pillars[i],
                pillars[i - 1]
            )));
        }
    }
    if outer <= pillars[n - 1] {
        return Err(Error::DegenerateGeometry(format!(
            "the outer edge {:?} must be beyond the last pillar center {:?}",
            outer,
            pillars[n - 1]
        )));
    }
    if let Some(h) = heights.iter().find(|h| !h.is_finite() || **h < 0.0) {
        return Err(Error::DegenerateGeometry(format!("found an invalid pillar height {:?}", h)));
    }

    // the centerline pillar is shared by both halves
    let first_mirrored = if pillars[0] <= GEOMETRY_ZERO_TOL { 1 } else { 0 };

    let mut coords = Vec::with_capacity(4 * n + 2);
    for i in 0..n {
        coords.push([pillars[i], heights[i] / 2.0]);
    }
    coords.push([outer, 0.0]);
    for i in (0..n).rev() {
        coords.push([pillars[i], -heights[i] / 2.0]);
    }
    for i in first_mirrored..n {
        coords.push([-pillars[i], -heights[i] / 2.0]);
    }
    coords.push([-outer, 0.0]);
    for i in (first_mirrored..n).rev() {
        coords.push([-pillars[i], heights[i] / 2.0]);
    }

    let polygon = Polygon::new(coords)?;
    if !polygon.is_simple() {
        return Err(Error::InvalidPolygon(
            "the reconstructed cross-section is self-intersecting".to_string(),
        ));
    }
    Ok(polygon)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::reconstruct_cross_section;
    use crate::base::Error;
    use russell_lab::approx_eq;

    #[test]
    fn captures_errors() {
        assert_eq!(
            reconstruct_cross_section(&[], &[], 1.0).err(),
            Some(Error::DegenerateGeometry("at least one pillar is required".to_string()))
        );
        assert_eq!(
            reconstruct_cross_section(&[0.0, 1.0], &[1.0], 2.0).err(),
            Some(Error::Input("the number of heights must equal the number of pillars"))
        );
        assert_eq!(
            reconstruct_cross_section(&[0.0, 1.0, 1.0], &[1.0, 1.0, 1.0], 2.0).err(),
            Some(Error::DegenerateGeometry(
                "pillar centers must be strictly increasing; found 1.0 after 1.0".to_string()
            ))
        );
        assert_eq!(
            reconstruct_cross_section(&[0.0, 1.0], &[1.0, 1.0], 1.0).err(),
            Some(Error::DegenerateGeometry(
                "the outer edge 1.0 must be beyond the last pillar center 1.0".to_string()
            ))
        );
        assert_eq!(
            reconstruct_cross_section(&[0.0, 1.0], &[1.0, -1.0], 2.0).err(),
            Some(Error::DegenerateGeometry("found an invalid pillar height -1.0".to_string()))
        );
    }

    #[test]
    fn reconstruct_box_works() -> Result<(), Error> {
        // four pillars of height 1 over the half-width 7 (pillar width 2)
        let poly = reconstruct_cross_section(&[0.0, 2.0, 4.0, 6.0], &[1.0, 1.0, 1.0, 1.0], 7.0)?;
        assert_eq!(poly.npoint(), 16);
        assert_eq!(poly.bounds(), (-7.0, -0.5, 7.0, 0.5));
        // the tips at (±7, 0) cut the corners of the 14 × 1 rectangle
        approx_eq(poly.area(), 14.0 - 2.0 * 0.5, 1e-14);
        approx_eq(poly.vertical_extent(0.0), 1.0, 1e-15);
        approx_eq(poly.vertical_extent(-4.0), 1.0, 1e-15);
        approx_eq(poly.vertical_extent(6.5), 0.5, 1e-15);
        assert!(poly.is_simple());
        Ok(())
    }

    #[test]
    fn reconstruct_single_pillar_works() -> Result<(), Error> {
        let poly = reconstruct_cross_section(&[0.0], &[2.0], 1.0)?;
        assert_eq!(poly.npoint(), 4);
        approx_eq(poly.area(), 2.0, 1e-15);
        Ok(())
    }

    #[test]
    fn reconstruct_off_center_pillars_works() -> Result<(), Error> {
        let poly = reconstruct_cross_section(&[0.5, 1.5], &[2.0, 2.0], 2.0)?;
        assert_eq!(poly.npoint(), 10);
        approx_eq(poly.vertical_extent(0.0), 2.0, 1e-15);
        approx_eq(poly.vertical_extent(1.0), 2.0, 1e-15);
        Ok(())
    }
}
