/// Defines the default number of pillars
pub const DEFAULT_PILLAR_COUNT: usize = 11;

/// Defines the relaxation factor of the spread-correction update
pub const SPREAD_CORRECTION_RELAXATION: f64 = 0.5;

/// Defines the smallest allowed tolerance (Config)
pub const CONFIG_MIN_TOL: f64 = 1e-15;

/// Defines the tolerance used to regard a length (width, height) as zero
pub const GEOMETRY_ZERO_TOL: f64 = 1e-12;

/// Defines the directory where the result files are saved
pub const DEFAULT_OUT_DIR: &str = "/tmp/pillarsim/results";

/// Defines an auxiliary directory where the test result files are saved
pub const DEFAULT_TEST_DIR: &str = "/tmp/pillarsim/test";
