pub mod browser;
pub mod clock;
pub mod driver;
pub mod engine;
pub mod error;
pub mod interaction;
pub mod outcome;
pub mod poll;
pub mod selectors;
pub mod server;
pub mod tools;

pub use engine::{Engine, GuardConfig};
pub use error::{DriverError, GuardError};
pub use outcome::{Outcome, OutcomeLog, Recorder, Status};
pub use selectors::Locator;
