//! pkginfo-core: Core types and errors for pkginfo
//!
//! This crate provides the foundational types used across the pkginfo
//! workspace:
//! - The [`Package`] record describing the running application
//! - The canonical error type [`PkginfoError`]
//! - Platform detection utilities
//!
//! ## Error Handling
//!
//! pkginfo uses a single canonical error type [`PkginfoError`] shared by all
//! platform resolvers. Degraded conditions (signature unavailable, installer
//! unknown) are never errors; they are represented by documented sentinel
//! values on the [`Package`] record itself.

use std::env::consts::OS;

use serde::{Deserialize, Serialize};

pub mod error;

// Re-export canonical error type at crate root
pub use error::{PkginfoError, PkginfoResult};

// ============================================================================
// Package Record
// ============================================================================

/// Identifying metadata for the currently running application package.
///
/// An immutable value object created fresh on every lookup. All string fields
/// are always present; `build_signature` uses the empty string as its
/// "unavailable" sentinel, and `installer_store` is `None` when the
/// distribution channel is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Human-readable display name of the application.
    pub app_name: String,

    /// Unique application identifier (reverse-domain or package name).
    pub package_name: String,

    /// Human-facing version string.
    pub version: String,

    /// Build/version-code identifier, stringified regardless of the
    /// underlying numeric width.
    pub build: String,

    /// Uppercase hex SHA-1 digest of the app's signing certificate.
    ///
    /// Empty when unavailable or not applicable on the platform.
    pub build_signature: String,

    /// Identifier of the distribution channel/installer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installer_store: Option<String>,
}

// ============================================================================
// Platform Detection
// ============================================================================

/// Get the current platform identifier.
///
/// Returns one of: "android", "ios", "macos", "linux", "windows", etc.
///
/// This is a pure function with no side effects.
#[inline]
pub fn get_platform() -> &'static str {
    OS
}

/// Check if running on Android.
#[inline]
#[cfg(target_os = "android")]
pub const fn is_android() -> bool {
    true
}

#[inline]
#[cfg(not(target_os = "android"))]
pub const fn is_android() -> bool {
    false
}

/// Check if running on an Apple platform (iOS, macOS, tvOS, watchOS).
#[inline]
#[cfg(target_vendor = "apple")]
pub const fn is_apple() -> bool {
    true
}

#[inline]
#[cfg(not(target_vendor = "apple"))]
pub const fn is_apple() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_platform() {
        let platform = get_platform();
        assert!(!platform.is_empty());
    }

    #[test]
    fn test_platform_detection_consistency() {
        // Android and Apple targets are mutually exclusive
        assert!(!(is_android() && is_apple()));
    }

    #[test]
    fn test_package_value_equality() {
        let a = Package {
            app_name: "Demo".into(),
            package_name: "com.example.demo".into(),
            version: "1.2.3".into(),
            build: "42".into(),
            build_signature: String::new(),
            installer_store: None,
        };
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn test_package_serialization() {
        let pkg = Package {
            app_name: "Demo".into(),
            package_name: "com.example.demo".into(),
            version: "1.2.3".into(),
            build: "42".into(),
            build_signature: "A7".into(),
            installer_store: Some("com.android.vending".into()),
        };
        let json = serde_json::to_string(&pkg).unwrap();
        assert!(json.contains("\"package_name\":\"com.example.demo\""));
        assert!(json.contains("\"installer_store\":\"com.android.vending\""));

        let back: Package = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pkg);
    }

    #[test]
    fn test_unknown_installer_is_omitted() {
        let pkg = Package {
            app_name: "Demo".into(),
            package_name: "com.example.demo".into(),
            version: "1.2.3".into(),
            build: "42".into(),
            build_signature: String::new(),
            installer_store: None,
        };
        let json = serde_json::to_string(&pkg).unwrap();
        assert!(!json.contains("installer_store"));
    }
}
