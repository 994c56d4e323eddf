use thiserror::Error;

/// Failures reported by a [`BrowserDriver`](crate::driver::BrowserDriver).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    #[error("no such element: {0}")]
    NoSuchElement(String),
    #[error("stale element reference: {0}")]
    StaleElement(String),
    #[error("no dialog is open")]
    NoDialogOpen,
    #[error("navigation failed: {0}")]
    Navigation(String),
    #[error("script error: {0}")]
    Script(String),
    #[error("browser session error: {0}")]
    Session(String),
}

impl DriverError {
    /// The browser has not caught up yet. Pollers keep retrying on these.
    pub fn is_not_ready(&self) -> bool {
        matches!(
            self,
            Self::NoSuchElement(_) | Self::StaleElement(_) | Self::NoDialogOpen
        )
    }
}

/// Errors surfaced to the caller of a guarded action.
///
/// Unreadiness of the page is never an error here: it is recorded as a
/// FAILURE [`Outcome`](crate::outcome::Outcome) instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("{0} is not a valid locator type")]
    InvalidLocatorKind(String),
    #[error("option index {index} is out of range for {locator}, which has {available} options")]
    OptionIndexOutOfRange {
        locator: String,
        index: usize,
        available: usize,
    },
    #[error("invalid action: {0}")]
    InvalidAction(String),
    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl GuardError {
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::Driver(err) if err.is_not_ready())
    }

    /// Caller mistakes, as opposed to browser or transport trouble.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidLocatorKind(_) | Self::OptionIndexOutOfRange { .. } | Self::InvalidAction(_)
        )
    }
}

pub type DriverResult<T> = std::result::Result<T, DriverError>;
pub type Result<T> = std::result::Result<T, GuardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_ready_classification() {
        assert!(DriverError::NoSuchElement("id a".into()).is_not_ready());
        assert!(DriverError::StaleElement("id a".into()).is_not_ready());
        assert!(DriverError::NoDialogOpen.is_not_ready());
        assert!(!DriverError::Session("closed".into()).is_not_ready());
        assert!(!DriverError::Script("boom".into()).is_not_ready());
    }

    #[test]
    fn test_guard_error_forwards_driver_readiness() {
        let err: GuardError = DriverError::NoSuchElement("id a".into()).into();
        assert!(err.is_not_ready());
        assert!(!err.is_configuration());

        let err: GuardError = DriverError::Session("gone".into()).into();
        assert!(!err.is_not_ready());
    }

    #[test]
    fn test_configuration_errors_are_distinct() {
        let err = GuardError::OptionIndexOutOfRange {
            locator: "id colorPicker".into(),
            index: 2,
            available: 2,
        };
        assert!(err.is_configuration());
        assert!(!err.is_not_ready());
        assert_eq!(
            err.to_string(),
            "option index 2 is out of range for id colorPicker, which has 2 options"
        );
        assert!(GuardError::InvalidLocatorKind("css".into()).is_configuration());
    }
}
