//! Domain error types.
//!
//! These errors represent structural problems with trips built from
//! backend rows or from user input. They are distinct from API/IO errors.

use super::CityId;

/// Domain-level errors for trip construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// A trip needs at least an origin and a destination
    #[error("trip must have at least an origin and a destination")]
    TooFewStops,

    /// Two stops share a sequence position
    #[error("stop sequence {0} appears more than once")]
    DuplicateSequence(u32),

    /// The same city appears twice in a route
    #[error("city {0} appears more than once in the route")]
    DuplicateCity(CityId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::TooFewStops;
        assert_eq!(
            err.to_string(),
            "trip must have at least an origin and a destination"
        );

        let err = DomainError::DuplicateSequence(2);
        assert_eq!(err.to_string(), "stop sequence 2 appears more than once");

        let err = DomainError::DuplicateCity(CityId(14));
        assert_eq!(err.to_string(), "city 14 appears more than once in the route");
    }
}
