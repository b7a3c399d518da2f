//! Makes available common structures needed to run a roll pass
//!
//! You may write `use pillarsim::prelude::*` in your code and obtain
//! access to commonly used functionality.

pub use crate::base::{Config, CornerCorrection, Error, PillarType, SampleSections, DEFAULT_OUT_DIR, DEFAULT_TEST_DIR};
pub use crate::geometry::{reconstruct_cross_section, Polygon};
pub use crate::pass::{DiskElement, PassResults, RollPass};
pub use crate::pillars::{Discretizer, PillarProfile, PillarSet};
pub use crate::roll::{DraughtPowerSpread, FlatRoll, GroovedRoll, NoSpread, RollContour, SpreadLaw};
