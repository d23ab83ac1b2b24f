/// Specifies a timestamp in seconds.
pub type Timestamp = f64;

/// Specifies a duration in seconds.
pub type Duration = f64;

/// Specifies a distance in meters.
pub type Distance = f64;

/// Specifies a cost value.
pub type Cost = f64;
