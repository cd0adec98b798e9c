//! Error types for pkginfo operations.
//!
//! This module defines the two-tier error taxonomy:
//! - **Configuration errors** ([`PkginfoError::MissingContext`],
//!   [`PkginfoError::AlreadyRegistered`]) signal programmer error in the
//!   host application's initialization order and are never retried.
//! - **Lookup/system errors** ([`PkginfoError::PackageNotFound`],
//!   [`PkginfoError::System`]) wrap failures of the underlying OS metadata
//!   services.
//!
//! Degraded conditions — signature unavailable, installer unknown — are not
//! errors at all: resolvers absorb them and emit the documented sentinel
//! values instead.

use thiserror::Error;

// ============================================================================
// Canonical Error Type
// ============================================================================

/// Canonical error type for all pkginfo operations.
#[derive(Debug, Error)]
pub enum PkginfoError {
    /// The Android application context has not been registered.
    ///
    /// Returned when `current()` runs before the host application has
    /// supplied its context. This is a configuration error: fix the
    /// initialization order, do not retry.
    #[error(
        "Android application context has not been registered; \
         register it during application startup before querying package info"
    )]
    MissingContext,

    /// The Android application context was registered more than once.
    ///
    /// Registration is a write-once operation performed at startup.
    #[error("Android application context is already registered")]
    AlreadyRegistered,

    /// Package metadata lookup failed.
    ///
    /// The OS package service has no entry for the requested package.
    #[error("Package '{package}' not found")]
    PackageNotFound {
        /// The package identifier that was not found.
        package: String,
    },

    /// Operation not supported on the current platform.
    ///
    /// Package introspection exists only on Android and Apple targets.
    #[error("Operation '{feature}' not supported on {platform}")]
    NotSupported {
        /// The feature that is not supported.
        feature: String,
        /// The platform where it's not supported.
        platform: String,
    },

    /// Platform-level error from the underlying FFI layer.
    ///
    /// Used when a JNI or Foundation call fails unexpectedly.
    #[error("Platform error: {message}")]
    System {
        /// Description of the error.
        message: String,
    },
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl PkginfoError {
    /// Create a `PackageNotFound` error.
    pub fn package_not_found(package: impl Into<String>) -> Self {
        PkginfoError::PackageNotFound {
            package: package.into(),
        }
    }

    /// Create a `NotSupported` error.
    pub fn not_supported(feature: impl Into<String>, platform: impl Into<String>) -> Self {
        PkginfoError::NotSupported {
            feature: feature.into(),
            platform: platform.into(),
        }
    }

    /// Create a `System` error.
    pub fn system(message: impl Into<String>) -> Self {
        PkginfoError::System {
            message: message.into(),
        }
    }

    /// True for errors caused by host misconfiguration rather than OS state.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PkginfoError::MissingContext | PkginfoError::AlreadyRegistered
        )
    }
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for pkginfo operations.
pub type PkginfoResult<T> = Result<T, PkginfoError>;

// ============================================================================
// Tests
// ============================================================================
