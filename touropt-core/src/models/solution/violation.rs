/// Classifies a violation by the aspect of the solution it concerns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViolationCategory {
    /// A time window was missed.
    TimeWindow,
    /// Capacity was exceeded.
    Capacity,
    /// A travel time or distance budget was exceeded.
    TravelBudget,
    /// An attached element constraint fired.
    Constraint,
    /// A caller-injected restriction fired.
    Custom,
}

/// A typed, valued record attached to a route when a restriction fires. Purely observational,
/// it carries no mutation authority.
#[derive(Clone, Debug)]
pub struct Violation {
    /// The violation category.
    pub category: ViolationCategory,
    /// A numeric code identifying the firing restriction.
    pub code: i32,
    /// A human readable description.
    pub description: String,
    /// A numeric magnitude of the violation.
    pub magnitude: f64,
    /// Id of the element the violation concerns, if it concerns a single one.
    pub element_id: Option<String>,
}

impl Violation {
    /// Creates a route scoped `Violation`.
    pub fn new(category: ViolationCategory, code: i32, description: String, magnitude: f64) -> Self {
        Self { category, code, description, magnitude, element_id: None }
    }

    /// Creates a `Violation` attributed to a single element.
    pub fn for_element(
        element_id: &str,
        category: ViolationCategory,
        code: i32,
        description: String,
        magnitude: f64,
    ) -> Self {
        Self { category, code, description, magnitude, element_id: Some(element_id.to_string()) }
    }
}
