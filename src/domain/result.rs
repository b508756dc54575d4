//! Result type alias for vmexport
//!
//! This module provides a convenient Result type alias that uses ExportError
//! as the error type.

use super::errors::ExportError;

/// Result type alias for export operations
///
/// # Examples
///
/// ```
/// use vmexport::domain::result::Result;
/// use vmexport::domain::errors::ExportError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(ExportError::Session("no credentials".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, ExportError>;
