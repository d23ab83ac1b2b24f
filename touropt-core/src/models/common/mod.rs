//! Common value types shared by problem and solution models.

mod domain;
pub use self::domain::{Location, Schedule, TimeWindow};

mod load;
pub use self::load::Load;

mod primitives;
pub use self::primitives::{Cost, Distance, Duration, Timestamp};
