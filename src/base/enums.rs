use serde::{Deserialize, Serialize};

/// Defines how the half cross-section is partitioned into pillars
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum PillarType {
    /// All pillars have the same width
    ///
    /// The centerline pillar is mirrored; thus its band spans `-dw/2` to `dw/2`.
    Equidistant,

    /// All pillars have the same (rectangular) area `width · height`
    UniformArea,
}

/// Defines when the corner-correction strain is added to a pillar
///
/// The corner correction accounts for the shear strain of a pillar entering the roll gap.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum CornerCorrection {
    /// Added whenever the pillar changes from non-contact to contact
    EveryEntry,

    /// Added only on the first change from non-contact to contact within the pass
    FirstEntryOnly,
}

/// Defines the pass-level attributes held by the evaluation cache
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Attribute {
    TotalPillarDraughts,
    TotalPillarSpreads,
    TotalPillarElongations,
    TotalPillarLogDraughts,
    TotalPillarLogSpreads,
    TotalPillarLogElongations,
    TotalPillarStrains,
    TotalPillarStrainRates,
    TotalPillarContactLengths,
    PillarEntryAngles,
    PillarSpreadCorrection,
}
