//! State of an asynchronous request as seen by the page that issued it.

/// Where a fetch or submission currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState<T> {
    #[default]
    NotStarted,
    InFlight,
    Succeeded(T),
    /// Failed with a message fit for logs, not for visitors.
    Failed(String),
}

impl<T> RequestState<T> {
    /// Record the outcome of a request.
    pub fn complete<E: std::fmt::Display>(&mut self, result: Result<T, E>) {
        *self = match result {
            Ok(value) => Self::Succeeded(value),
            Err(e) => Self::Failed(e.to_string()),
        };
    }

    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The successful value, if any.
    #[must_use]
    pub const fn succeeded(&self) -> Option<&T> {
        match self {
            Self::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    /// The failure message, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}
