//! Solution model: routes, entities and violations.

mod entity;
pub use self::entity::Entity;

mod route;
pub use self::route::{Route, RouteCosts, Visit};

mod violation;
pub use self::violation::{Violation, ViolationCategory};
