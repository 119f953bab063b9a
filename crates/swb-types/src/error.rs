//! Unified error code interface.
//!
//! Every error enum in the Switchboard workspace implements
//! [`ErrorCode`] so the dispatcher and callers can log and branch on a
//! stable machine-readable code instead of matching on display strings.
//!
//! # Code format
//!
//! - UPPER_SNAKE_CASE
//! - Prefixed with the owning domain (`REGISTRY_`, `STATE_`, `DEPLOY_`,
//!   `DISPATCH_`, ...)
//! - Stable once defined (API contract)
//!
//! # Example
//!
//! ```
//! use swb_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum MyError {
//!     NotFound,
//!     Timeout,
//! }
//!
//! impl ErrorCode for MyError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::NotFound => "MY_NOT_FOUND",
//!             Self::Timeout => "MY_TIMEOUT",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::Timeout)
//!     }
//! }
//!
//! assert_eq!(MyError::Timeout.code(), "MY_TIMEOUT");
//! assert!(MyError::Timeout.is_recoverable());
//! ```

/// Machine-readable error code interface.
pub trait ErrorCode {
    /// Returns a stable UPPER_SNAKE_CASE error code.
    fn code(&self) -> &'static str;

    /// Returns whether retrying (or user action) can succeed.
    ///
    /// Recoverable: transient conditions such as timeouts or I/O.
    /// Non-recoverable: invalid input, policy rejections, bugs.
    fn is_recoverable(&self) -> bool;
}

/// Asserts that an error code follows workspace conventions.
///
/// Checks the code is non-empty, UPPER_SNAKE_CASE and starts with the
/// expected domain prefix. Intended for use in tests.
///
/// # Panics
///
/// Panics with a descriptive message if validation fails.
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "error code '{}' must start with prefix '{}'",
        code,
        expected_prefix
    );
    assert!(
        is_upper_snake_case(code),
        "error code '{}' must be UPPER_SNAKE_CASE",
        code
    );
}

/// Asserts conventions for every variant of an error enum at once.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return false;
    }
    s.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
