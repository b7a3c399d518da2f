use crate::base::Error;
use crate::pass::DiskElement;
use crate::StrError;
use russell_lab::Vector;

/// Specifies the local (uncorrected) spread of the pillars in a disk element
///
/// The spread law is called after the outbound heights (and thus the draughts) are resolved.
/// It must return one spread factor per pillar.
pub trait SpreadLaw {
    /// Returns the spread factors of all pillars
    fn pillar_spreads(&self, element: &DiskElement) -> Result<Vector, Error>;
}

/// Implements a spread law without lateral spreading
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSpread;

impl SpreadLaw for NoSpread {
    fn pillar_spreads(&self, element: &DiskElement) -> Result<Vector, Error> {
        Ok(Vector::filled(element.npillar(), 1.0))
    }
}

/// Implements a spread law given by a power of the draught: `spread = draught^(-exponent)`
///
/// With `0 < exponent < 1`, compressed pillars spread by a fraction of their height reduction.
#[derive(Clone, Copy, Debug)]
pub struct DraughtPowerSpread {
    pub exponent: f64,
}

impl DraughtPowerSpread {
    /// Allocates a new instance
    pub fn new(exponent: f64) -> Result<Self, StrError> {
        if exponent < 0.0 || exponent > 1.0 {
            return Err("exponent must be in [0, 1]");
        }
        Ok(DraughtPowerSpread { exponent })
    }
}

impl SpreadLaw for DraughtPowerSpread {
    fn pillar_spreads(&self, element: &DiskElement) -> Result<Vector, Error> {
        let draughts = &element.pillar_draughts;
        let mut spreads = Vector::new(draughts.dim());
        for i in 0..draughts.dim() {
            spreads[i] = f64::powf(draughts[i], -self.exponent);
        }
        Ok(spreads)
    }
}
