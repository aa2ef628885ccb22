//! Unified, `miette`-based error reporting for the mzl engine.
//!
//! # Overview
//!
//! Every failure the engine can produce (registration, scope execution,
//! nesting resolution, argument adaptation) is an [`MzlError`]. Each variant
//! carries a human-readable `message`, an [`ErrorContext`] naming the call and
//! receiver involved, and an optional chained `source`.
//!
//! # Error Construction Macros
//!
//! - **Use `err_msg!` for message-only errors.**
//!   - `err_msg!(Handler, "total overflowed")`
//!
//! - **Use `err_ctx!` when the call name and receiver are known.**
//!   - `err_ctx!(UnresolvedCall, "foo", "Counter", "undefined builder method '{}'", "foo")`
//!
//! Do not build `ErrorContext` by hand unless you need a help message; the
//! macros cover every other case.

use miette::Diagnostic;
use thiserror::Error;

/// Boxed cause attached to an error.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Type-safe error classification that mirrors the `MzlError` variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Registry lookup miss
    NotFound,
    /// `alias` pointed at an unregistered builder method
    AliasSourceMissing,
    /// A call escaped every ancestor and the delegate
    UnresolvedCall,
    /// Attribute set outside a scope, or set twice
    AttributeMisuse,
    /// Alias retry exhausted
    ArgumentAdaptation,
    /// Wrong number or shape of arguments
    Arity,
    /// Argument of the wrong type
    TypeError,
    /// Raised by user handlers, hooks or blocks
    Handler,
    /// Engine invariant broken
    Internal,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::NotFound => "NotFound",
            ErrorType::AliasSourceMissing => "AliasSourceMissing",
            ErrorType::UnresolvedCall => "UnresolvedCall",
            ErrorType::AttributeMisuse => "AttributeMisuse",
            ErrorType::ArgumentAdaptation => "ArgumentAdaptation",
            ErrorType::Arity => "Arity",
            ErrorType::TypeError => "TypeError",
            ErrorType::Handler => "Handler",
            ErrorType::Internal => "Internal",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Minimal, composable error context for diagnostics.
#[derive(Debug, Default, Clone)]
pub struct ErrorContext {
    /// The builder method or call name involved (if any).
    pub call: Option<String>,
    /// Description of the receiving instance or class (if any).
    pub receiver: Option<String>,
    /// An optional help message.
    pub help: Option<String>,
}

impl ErrorContext {
    /// Returns an empty error context.
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates a context naming a call and its receiver.
    pub fn for_call(call: impl Into<String>, receiver: impl Into<String>) -> Self {
        Self {
            call: Some(call.into()),
            receiver: Some(receiver.into()),
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Unified error type for all mzl failure modes.
#[derive(Debug, Error)]
pub enum MzlError {
    #[error("Builder method not found: {message}")]
    NotFound {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<BoxedSource>,
    },
    #[error("Alias source missing: {message}")]
    AliasSourceMissing {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<BoxedSource>,
    },
    #[error("Unresolved call: {message}")]
    UnresolvedCall {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<BoxedSource>,
    },
    #[error("Attribute misuse: {message}")]
    AttributeMisuse {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<BoxedSource>,
    },
    #[error("Argument adaptation failed: {message}")]
    ArgumentAdaptation {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<BoxedSource>,
    },
    #[error("Arity mismatch: {message}")]
    Arity {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<BoxedSource>,
    },
    #[error("Type error: {message}")]
    TypeError {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<BoxedSource>,
    },
    #[error("{message}")]
    Handler {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<BoxedSource>,
    },
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl MzlError {
    fn get_ctx(&self) -> &ErrorContext {
        match self {
            MzlError::NotFound { ctx, .. } => ctx,
            MzlError::AliasSourceMissing { ctx, .. } => ctx,
            MzlError::UnresolvedCall { ctx, .. } => ctx,
            MzlError::AttributeMisuse { ctx, .. } => ctx,
            MzlError::ArgumentAdaptation { ctx, .. } => ctx,
            MzlError::Arity { ctx, .. } => ctx,
            MzlError::TypeError { ctx, .. } => ctx,
            MzlError::Handler { ctx, .. } => ctx,
            MzlError::Internal { ctx, .. } => ctx,
        }
    }

    /// Returns the type-safe classification for this error.
    pub fn error_type(&self) -> ErrorType {
        match self {
            MzlError::NotFound { .. } => ErrorType::NotFound,
            MzlError::AliasSourceMissing { .. } => ErrorType::AliasSourceMissing,
            MzlError::UnresolvedCall { .. } => ErrorType::UnresolvedCall,
            MzlError::AttributeMisuse { .. } => ErrorType::AttributeMisuse,
            MzlError::ArgumentAdaptation { .. } => ErrorType::ArgumentAdaptation,
            MzlError::Arity { .. } => ErrorType::Arity,
            MzlError::TypeError { .. } => ErrorType::TypeError,
            MzlError::Handler { .. } => ErrorType::Handler,
            MzlError::Internal { .. } => ErrorType::Internal,
        }
    }

    /// The call name recorded in the context, if any.
    pub fn call(&self) -> Option<&str> {
        self.get_ctx().call.as_deref()
    }

    /// The receiver description recorded in the context, if any.
    pub fn receiver(&self) -> Option<&str> {
        self.get_ctx().receiver.as_deref()
    }

    pub fn is_unresolved(&self) -> bool {
        self.error_type() == ErrorType::UnresolvedCall
    }

    pub fn is_arity(&self) -> bool {
        self.error_type() == ErrorType::Arity
    }

    /// Attaches a help message to the error's context.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        let help = help.into();
        match &mut self {
            MzlError::NotFound { ctx, .. }
            | MzlError::AliasSourceMissing { ctx, .. }
            | MzlError::UnresolvedCall { ctx, .. }
            | MzlError::AttributeMisuse { ctx, .. }
            | MzlError::ArgumentAdaptation { ctx, .. }
            | MzlError::Arity { ctx, .. }
            | MzlError::TypeError { ctx, .. }
            | MzlError::Handler { ctx, .. }
            | MzlError::Internal { ctx, .. } => ctx.help = Some(help),
        }
        self
    }

    /// Attaches `cause` as the chained source of this error.
    pub fn caused_by(mut self, cause: MzlError) -> Self {
        let boxed: BoxedSource = Box::new(cause);
        match &mut self {
            MzlError::NotFound { source, .. }
            | MzlError::AliasSourceMissing { source, .. }
            | MzlError::UnresolvedCall { source, .. }
            | MzlError::AttributeMisuse { source, .. }
            | MzlError::ArgumentAdaptation { source, .. }
            | MzlError::Arity { source, .. }
            | MzlError::TypeError { source, .. }
            | MzlError::Handler { source, .. }
            | MzlError::Internal { source, .. } => *source = Some(boxed),
        }
        self
    }
}

impl Diagnostic for MzlError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let code = match self.error_type() {
            ErrorType::NotFound => "mzl::not_found",
            ErrorType::AliasSourceMissing => "mzl::alias_source_missing",
            ErrorType::UnresolvedCall => "mzl::unresolved_call",
            ErrorType::AttributeMisuse => "mzl::attribute_misuse",
            ErrorType::ArgumentAdaptation => "mzl::argument_adaptation",
            ErrorType::Arity => "mzl::arity",
            ErrorType::TypeError => "mzl::type_error",
            ErrorType::Handler => "mzl::handler",
            ErrorType::Internal => "mzl::internal",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.get_ctx()
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }
}

/// Constructs an `MzlError` variant with a formatted message and no context.
#[macro_export]
macro_rules! err_msg {
    ($variant:ident, $($fmt:tt)+) => {
        $crate::MzlError::$variant {
            message: format!($($fmt)+),
            ctx: $crate::ErrorContext::none(),
            source: None,
        }
    };
}

/// Constructs an `MzlError` variant naming the call and receiver involved.
#[macro_export]
macro_rules! err_ctx {
    ($variant:ident, $call:expr, $receiver:expr, $($fmt:tt)+) => {
        $crate::MzlError::$variant {
            message: format!($($fmt)+),
            ctx: $crate::ErrorContext::for_call($call, $receiver),
            source: None,
        }
    };
}

#[cfg(test)]
mod diagnostics_tests {
    use miette::Report;

    use super::*;

    #[test]
    fn test_report_includes_code_and_help() {
        let err = MzlError::UnresolvedCall {
            message: "undefined builder method 'foo'".to_string(),
            ctx: ErrorContext::for_call("foo", "Counter").with_help("define it with `def`"),
            source: None,
        };
        let output = format!("{:?}", Report::new(err));
        assert!(output.contains("mzl::unresolved_call"));
        assert!(output.contains("define it with `def`"));
    }

    #[test]
    fn test_error_chaining() {
        let cause = err_msg!(Arity, "'i_am' expects 1 argument, got 2");
        let err = err_ctx!(ArgumentAdaptation, "me_am", "Child", "retry for alias 'me_am' failed")
            .caused_by(cause);
        let report = Report::new(err);
        let output = format!("{report:?}");
        assert!(output.contains("retry for alias 'me_am' failed"));
        assert!(output.contains("expects 1 argument"));
    }

    #[test]
    fn test_error_type_and_context_accessors() {
        let err = err_ctx!(UnresolvedCall, "parent_method", "Child", "no receiver for '{}'", "parent_method");
        assert_eq!(err.error_type(), ErrorType::UnresolvedCall);
        assert!(err.is_unresolved());
        assert_eq!(err.call(), Some("parent_method"));
        assert_eq!(err.receiver(), Some("Child"));
        assert_eq!(err.to_string(), "Unresolved call: no receiver for 'parent_method'");
    }
}
