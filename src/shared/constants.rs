// =============================================================================
// REWARD CONSTANTS
// =============================================================================

/// Base points granted for any accepted report
pub const POINTS_BASE: i64 = 10;

/// Points required to advance one level
pub const POINTS_PER_LEVEL: i64 = 100;

/// CO2 factor (kg per item) for categories without a table entry
pub const DEFAULT_CO2_FACTOR: f64 = 1.2;

// =============================================================================
// CENTER PERFORMANCE
// =============================================================================

/// Performance score gained per recycled item
pub const PERFORMANCE_SCORE_STEP: f64 = 2.0;

/// Performance score ceiling
pub const PERFORMANCE_SCORE_MAX: f64 = 100.0;

// =============================================================================
// UPLOADS
// =============================================================================

/// Fallback extension for stored images when the original name has none
pub const DEFAULT_IMAGE_EXTENSION: &str = ".jpg";

/// Public URL prefix the upload directory is served under
pub const UPLOADS_URL_PREFIX: &str = "/uploads";
