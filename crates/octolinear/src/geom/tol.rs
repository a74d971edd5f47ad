//! Fixed tolerances of the kernel primitives.
//!
//! Policy
//! - Point equality is per coordinate at `POINT_EPS` (values agreeing to ten
//!   decimals are equal).
//! - Line directions are unit vectors, so `PARALLEL_EPS` bounds `sin` of the angle
//!   between two lines independently of scale.
//! - `ON_SEGMENT_EPS` is an absolute distance; inputs are expected in projected
//!   units (metres or similar), not degrees.

pub const POINT_EPS: f64 = 1e-10;
pub const PARALLEL_EPS: f64 = 1e-12;
pub const ON_SEGMENT_EPS: f64 = 1e-9;
pub const AREA_EPS: f64 = 1e-12;
