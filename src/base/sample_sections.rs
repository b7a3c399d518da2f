use crate::base::Error;
use crate::geometry::Polygon;
use std::f64::consts::PI;

/// Defines the number of segments used to approximate a round section
pub const ROUND_SECTION_SEGMENTS: usize = 720;

/// Generates cross-sections of frequently used bar profiles
///
/// All sections are centered at the origin and symmetric about the vertical (y) axis.
pub struct SampleSections {}

impl SampleSections {
    /// Returns a round section
    pub fn round(diameter: f64) -> Result<Polygon, Error> {
        let r = diameter / 2.0;
        let n = ROUND_SECTION_SEGMENTS;
        let coords = (0..n)
            .map(|k| {
                let alpha = 2.0 * PI * (k as f64) / (n as f64);
                [r * f64::cos(alpha), r * f64::sin(alpha)]
            })
            .collect();
        Polygon::new(coords)
    }

    /// Returns a square section standing on its corner (rhombus with equal diagonals)
    #[rustfmt::skip]
    pub fn square(diagonal: f64) -> Result<Polygon, Error> {
        //        y
        //        ↑
        //        ●
        //      ╱   ╲
        //    ●   o   ●→ z
        //      ╲   ╱
        //        ●
        let d = diagonal / 2.0;
        Polygon::new(vec![
            [ d, 0.0],
            [0.0,  d],
            [-d, 0.0],
            [0.0, -d],
        ])
    }

    /// Returns a rectangular (box) section
    #[rustfmt::skip]
    pub fn rectangle(width: f64, height: f64) -> Result<Polygon, Error> {
        let (w, h) = (width / 2.0, height / 2.0);
        Polygon::new(vec![
            [-w, -h],
            [ w, -h],
            [ w,  h],
            [-w,  h],
        ])
    }

    /// Returns a diamond section
    #[rustfmt::skip]
    pub fn diamond(width: f64, height: f64) -> Result<Polygon, Error> {
        let (w, h) = (width / 2.0, height / 2.0);
        Polygon::new(vec![
            [ w, 0.0],
            [0.0,  h],
            [-w, 0.0],
            [0.0, -h],
        ])
    }

    /// Returns a rectangular section with V-shaped notches at the top and bottom centers
    #[rustfmt::skip]
    pub fn constricted(width: f64, height: f64, notch_depth: f64) -> Result<Polygon, Error> {
        //  ●─────╮   ╭─────●
        //  │      ╲ ╱      │
        //  │       ●       │
        //  │       ●       │
        //  │      ╱ ╲      │
        //  ●─────╯   ╰─────●
        if notch_depth >= height / 2.0 {
            return Err(Error::Input("the notch depth must be smaller than half the height"));
        }
        let (w, h) = (width / 2.0, height / 2.0);
        Polygon::new(vec![
            [ -w, -h],
            [0.0, -h + notch_depth],
            [  w, -h],
            [  w,  h],
            [0.0,  h - notch_depth],
            [ -w,  h],
        ])
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
