// Floating point comparisons
pub const FEQ_EPSILON: f64 = 0.00001;

// Shading engine defaults
pub const DELTA: f64 = 0.1;
pub const MAX_CALC_COLOR_LEVEL: usize = 10;
pub const MIN_CALC_COLOR_K: f64 = 0.001;

// Render defaults
pub const SUPERSAMPLING_GRID_SIZE: usize = 9;
pub const ADAPTIVE_MAX_LEVEL: u32 = 3;
pub const ADAPTIVE_LEVEL_LIMIT: u32 = 16;
pub const SPARE_THREADS: usize = 2;
pub const PROGRESS_POLL_MS: u64 = 100;
pub const OUT_FILE: &str = "./out.ppm";

// Point light attenuation defaults
pub const DEFAULT_KC: f64 = 1.0;
pub const DEFAULT_KL: f64 = 0.0;
pub const DEFAULT_KQ: f64 = 0.0;
