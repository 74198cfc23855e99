/// # Email Validation Models
///
/// Request and result types exchanged with the validation pipeline.
/// The result serializes to the wire shape:
///
/// ```json
/// {
///   "isValid": true,
///   "errors": [],
///   "warnings": [],
///   "validationSteps": { "format": true, "domain": true, "mailbox": true },
///   "processingTime": 37
/// }
/// ```
pub mod email;

/// # Health Status Response
///
/// Service status with a timestamp and the size of the in-memory
/// validator state.
pub mod health;

pub use email::{ErrorCode, ValidationRequest, ValidationResult, ValidationSteps};
pub use health::HealthResponse;
