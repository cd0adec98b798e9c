//! pkginfo: Cross-platform introspection of the running application package.
//!
//! This crate exposes a single accessor, [`current`], that returns identifying
//! metadata about the application it runs inside: display name, package or
//! bundle identifier, version string, build identifier, a hex-encoded SHA-1
//! digest of the signing certificate (where the platform provides one), and
//! the store/channel the app was installed from.
//!
//! ## Platform Support
//!
//! | Field | Android | Apple (iOS/macOS) |
//! |-------|---------|-------------------|
//! | app name | application label | `CFBundleDisplayName` |
//! | package name | package name | bundle identifier |
//! | version | version name | `CFBundleShortVersionString` |
//! | build | version code (wide on API 28+) | `CFBundleVersion` |
//! | build signature | SHA-1 of signing certificate | always empty |
//! | installer store | install source / installer package | receipt classification |
//!
//! Platform selection happens at compile time; on any other target,
//! [`current`] returns [`PkginfoError::NotSupported`].
//!
//! ## Android Initialization
//!
//! Android is context-dependent: the host application must register its
//! application context during startup, before the first query. Calling
//! [`current`] earlier is a configuration error
//! ([`PkginfoError::MissingContext`]), not a condition to retry.
//!
//! ## Example
//!
//! ```rust,no_run
//! let pkg = pkginfo::current().unwrap();
//! println!("{} {} ({})", pkg.app_name, pkg.version, pkg.build);
//! match pkg.installer_store {
//!     Some(store) => println!("installed from {store}"),
//!     None => println!("installer unknown"),
//! }
//! ```

pub use pkginfo_core::{Package, PkginfoError, PkginfoResult};

pub mod android;
pub mod apple;

/// Retrieve metadata about the currently running application package.
///
/// Returns a freshly constructed [`Package`]; callers own the record and no
/// state is cached between calls. Reads OS package/bundle metadata only; no
/// network or disk I/O.
///
/// # Errors
///
/// - [`PkginfoError::MissingContext`] on Android before context registration.
/// - [`PkginfoError::PackageNotFound`] if the OS package service has no entry
///   for the running package (Android).
/// - [`PkginfoError::NotSupported`] on targets other than Android and Apple
///   platforms.
pub fn current() -> PkginfoResult<Package> {
    #[cfg(target_os = "android")]
    return android::current();

    #[cfg(target_vendor = "apple")]
    return apple::current();

    #[cfg(not(any(target_os = "android", target_vendor = "apple")))]
    Err(PkginfoError::not_supported(
        "package introspection",
        pkginfo_core::get_platform(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(any(target_os = "android", target_vendor = "apple")))]
    fn current_is_not_supported_off_mobile_targets() {
        let err = current().unwrap_err();
        assert!(matches!(err, PkginfoError::NotSupported { .. }));
        assert!(err.to_string().contains("package introspection"));
    }
}
