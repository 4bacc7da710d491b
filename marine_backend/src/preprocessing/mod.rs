pub mod validator;

pub use validator::{PointValidator, ValidationResult, ValidationStats};
