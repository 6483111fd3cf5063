//! # DPI Error Handling
//!
//! Errors in this crate follow a strict propagation policy:
//!
//! - Anything originating in the host OS layer (a missing entry point, a call the
//!   platform rejects) is absorbed into boolean or sentinel returns and never
//!   reaches the caller as an `Err`. [`DpiError::UnsupportedOnPlatform`] exists so
//!   that such conditions can be *described* (logs, diagnostics), not thrown.
//! - Anything originating in caller misuse (asking for the `Unspecified` sentinel
//!   as a target, an invalid configuration) is a hard error returned immediately.
//! - A degenerate rescale target is recoverable: the original image is handed back
//!   alongside a [`DpiError::ZeroSizeTarget`] describing what happened.
//!
//! There is no retry classification. OS capability is fixed for the process
//! lifetime, so an unsupported result stays unsupported.
//!
//! ## Usage
//!
//! ```rust
//! use dpi_awareness::error::{DpiError, HasRecoverySuggestion, Recoverable};
//!
//! let error = DpiError::zero_size_target(0, 0)
//!     .with_operation("rescale_to_size")
//!     .with_recovery_suggestion("Keep the logical image");
//!
//! assert!(error.is_recoverable());
//! assert_eq!(error.recovery_suggestion(), Some("Keep the logical image"));
//! ```

use std::{error::Error as StdError, fmt, time::SystemTime};

/// Severity levels for errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Debug-level errors that don't affect operation
    Debug,
    /// Informational errors
    Info,
    /// Warnings that may indicate potential issues
    Warning,
    /// Errors that affect operation but can be recovered from
    Error,
    /// Fatal errors that cannot be recovered from
    Fatal,
}

/// Metadata about when and where an error occurred
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// When the error occurred
    pub timestamp: SystemTime,
    /// The operation being performed when the error occurred
    pub operation: Option<String>,
    /// Additional context about the error
    pub context: Option<String>,
    /// Suggested recovery action
    pub recovery_suggestion: Option<String>,
    /// Error severity level
    pub severity: ErrorSeverity,
    /// Whether this error is recoverable
    pub recoverable: bool,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            timestamp: SystemTime::now(),
            operation: None,
            context: None,
            recovery_suggestion: None,
            severity: ErrorSeverity::Error,
            recoverable: false,
        }
    }
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = severity;
        self
    }

    fn recoverable(mut self) -> Self {
        self.recoverable = true;
        self
    }
}

/// Every error the DPI subsystem can describe.
#[derive(Debug)]
pub enum DpiError {
    /// The caller asked for something that can never be satisfied, such as the
    /// `Unspecified` sentinel as a target capability.
    InvalidRequest {
        operation: String,
        reason: String,
        context: ErrorContext,
    },
    /// A capability or query is absent at the detected OS feature level.
    UnsupportedOnPlatform {
        capability: String,
        feature_level: String,
        context: ErrorContext,
    },
    /// A rescale was requested against a degenerate target size.
    ZeroSizeTarget {
        width: u32,
        height: u32,
        context: ErrorContext,
    },
    /// Configuration validation errors
    Config {
        field: String,
        value: String,
        reason: String,
        context: ErrorContext,
    },
    /// Pixel processing failures
    Processing {
        operation: String,
        reason: String,
        context: ErrorContext,
    },
    /// I/O errors
    Io {
        operation: String,
        path: Option<String>,
        source: std::io::Error,
        context: ErrorContext,
    },
    /// External library errors
    External {
        library: String,
        source: Box<dyn StdError + Send + Sync>,
        context: ErrorContext,
    },
}

impl DpiError {
    /// Create an invalid-request error
    pub fn invalid_request(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            operation: operation.into(),
            reason: reason.into(),
            context: ErrorContext::new().with_severity(ErrorSeverity::Fatal),
        }
    }

    /// Create an unsupported-on-platform description
    pub fn unsupported(capability: impl Into<String>, feature_level: impl Into<String>) -> Self {
        Self::UnsupportedOnPlatform {
            capability: capability.into(),
            feature_level: feature_level.into(),
            context: ErrorContext::new()
                .with_severity(ErrorSeverity::Info)
                .recoverable(),
        }
    }

    /// Create a zero-size-target condition
    pub fn zero_size_target(width: u32, height: u32) -> Self {
        Self::ZeroSizeTarget {
            width,
            height,
            context: ErrorContext::new()
                .with_severity(ErrorSeverity::Warning)
                .recoverable(),
        }
    }

    /// Create a configuration error
    pub fn config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Config {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a processing error
    pub fn processing(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Processing {
            operation: operation.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: None,
            source,
            context: ErrorContext::new(),
        }
    }

    /// Create an external library error
    pub fn external(
        library: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            library: library.into(),
            source: Box::new(source),
            context: ErrorContext::new(),
        }
    }

    /// Attach the path an I/O error refers to
    pub fn with_path(mut self, p: impl Into<String>) -> Self {
        if let Self::Io { path, .. } = &mut self {
            *path = Some(p.into());
        }
        self
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context_mut().context = Some(context.into());
        self
    }

    /// Add operation context
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Add recovery suggestion
    pub fn with_recovery_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context_mut().recovery_suggestion = Some(suggestion.into());
        self
    }

    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::InvalidRequest { context, .. } => context,
            Self::UnsupportedOnPlatform { context, .. } => context,
            Self::ZeroSizeTarget { context, .. } => context,
            Self::Config { context, .. } => context,
            Self::Processing { context, .. } => context,
            Self::Io { context, .. } => context,
            Self::External { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::InvalidRequest { context, .. } => context,
            Self::UnsupportedOnPlatform { context, .. } => context,
            Self::ZeroSizeTarget { context, .. } => context,
            Self::Config { context, .. } => context,
            Self::Processing { context, .. } => context,
            Self::Io { context, .. } => context,
            Self::External { context, .. } => context,
        }
    }

    /// Get the error category as a string
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "invalid_request",
            Self::UnsupportedOnPlatform { .. } => "unsupported_on_platform",
            Self::ZeroSizeTarget { .. } => "zero_size_target",
            Self::Config { .. } => "config",
            Self::Processing { .. } => "processing",
            Self::Io { .. } => "io",
            Self::External { .. } => "external",
        }
    }
}

impl fmt::Display for DpiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DpiError::InvalidRequest {
                operation, reason, ..
            } => {
                write!(f, "Invalid request to {}: {}", operation, reason)
            }
            DpiError::UnsupportedOnPlatform {
                capability,
                feature_level,
                ..
            } => {
                write!(
                    f,
                    "{} is not supported at OS feature level {}",
                    capability, feature_level
                )
            }
            DpiError::ZeroSizeTarget { width, height, .. } => {
                write!(
                    f,
                    "Rescale target {}x{} is empty; image left unscaled",
                    width, height
                )
            }
            DpiError::Config {
                field,
                value,
                reason,
                ..
            } => {
                write!(
                    f,
                    "Configuration error in '{}': {} (value: {})",
                    field, reason, value
                )
            }
            DpiError::Processing {
                operation, reason, ..
            } => {
                write!(f, "Processing failed during {}: {}", operation, reason)
            }
            DpiError::Io {
                operation,
                path,
                source,
                ..
            } => {
                if let Some(path) = path {
                    write!(
                        f,
                        "I/O error during {} on '{}': {}",
                        operation, path, source
                    )
                } else {
                    write!(f, "I/O error during {}: {}", operation, source)
                }
            }
            DpiError::External {
                library, source, ..
            } => {
                write!(f, "External library error in {}: {}", library, source)
            }
        }
    }
}

impl StdError for DpiError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::External { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Result type alias using our custom error type
pub type DpiResult<T> = Result<T, DpiError>;

/// Trait for errors that can be recovered from
pub trait Recoverable {
    /// Check if this error can be recovered from
    fn is_recoverable(&self) -> bool;
}

impl Recoverable for DpiError {
    fn is_recoverable(&self) -> bool {
        self.context().recoverable
            || matches!(
                self,
                Self::UnsupportedOnPlatform { .. } | Self::ZeroSizeTarget { .. }
            )
    }
}

/// Trait for errors with severity levels
pub trait HasSeverity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;
}

impl HasSeverity for DpiError {
    fn severity(&self) -> ErrorSeverity {
        self.context().severity
    }
}

/// Trait for errors that provide recovery suggestions
pub trait HasRecoverySuggestion {
    /// Get recovery suggestion for this error
    fn recovery_suggestion(&self) -> Option<&str>;
}

impl HasRecoverySuggestion for DpiError {
    fn recovery_suggestion(&self) -> Option<&str> {
        self.context().recovery_suggestion.as_deref()
    }
}

impl From<std::io::Error> for DpiError {
    fn from(error: std::io::Error) -> Self {
        Self::io("unknown", error)
    }
}

impl From<serde_json::Error> for DpiError {
    fn from(error: serde_json::Error) -> Self {
        Self::external("serde_json", error)
    }
}

impl From<image::ImageError> for DpiError {
    fn from(error: image::ImageError) -> Self {
        Self::external("image", error)
    }
}

impl From<dpi_resample::ScaleError> for DpiError {
    fn from(error: dpi_resample::ScaleError) -> Self {
        Self::processing("draw_image", error.to_string())
    }
}
