//! Apple bundle resolution.
//!
//! No registration step exists here: everything is read from the running
//! application's main bundle. The bundle is modeled as a read-only oracle
//! behind the [`Bundle`] trait; the Foundation-backed implementation lives
//! in the target-gated `foundation` submodule.
//!
//! The installer store is classified from the app-store receipt path. This
//! is a tri-way classification with no "unknown" outcome: a missing receipt
//! still reports the production store, matching the shipped behavior.

use pkginfo_core::Package;

#[cfg(target_vendor = "apple")]
mod foundation;

#[cfg(target_vendor = "apple")]
use pkginfo_core::PkginfoResult;

/// Installer identifier for App Store distribution (and missing receipts).
pub const INSTALLER_APP_STORE: &str = "com.apple";
/// Installer identifier for TestFlight (sandbox-receipt) distribution.
pub const INSTALLER_TESTFLIGHT: &str = "com.apple.testflight";
/// Installer identifier for simulator builds.
pub const INSTALLER_SIMULATOR: &str = "com.apple.simulator";

/// Receipt-path marker for simulator builds.
const SIMULATOR_MARKER: &str = "CoreSimulator";
/// Receipt-path marker for sandbox (TestFlight) receipts.
const SANDBOX_MARKER: &str = "sandboxReceipt";

/// Info-dictionary key for the display name.
const KEY_DISPLAY_NAME: &str = "CFBundleDisplayName";
/// Info-dictionary key for the human-facing version string.
const KEY_SHORT_VERSION: &str = "CFBundleShortVersionString";
/// Info-dictionary key for the build string.
const KEY_BUILD: &str = "CFBundleVersion";

// ============================================================================
// Bundle Oracle
// ============================================================================

/// Read-only oracle over the running application's bundle.
pub trait Bundle {
    /// Info-dictionary value for `key`, already platform-stringified.
    fn info_value(&self, key: &str) -> Option<String>;

    /// The bundle identifier, when the bundle has one.
    fn bundle_identifier(&self) -> Option<String>;

    /// Filesystem path of the app-store receipt, when present.
    fn app_store_receipt_path(&self) -> Option<String>;
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the [`Package`] record from the given bundle.
///
/// Infallible: every lookup degrades to its string default. The build
/// signature is not computed on Apple platforms and is always empty.
pub fn resolve<B: Bundle>(bundle: &B) -> Package {
    let receipt = bundle.app_store_receipt_path();
    Package {
        app_name: info_string(bundle.info_value(KEY_DISPLAY_NAME)),
        package_name: bundle.bundle_identifier().unwrap_or_default(),
        version: info_string(bundle.info_value(KEY_SHORT_VERSION)),
        build: info_string(bundle.info_value(KEY_BUILD)),
        build_signature: String::new(),
        installer_store: Some(classify_receipt(receipt.as_deref()).to_string()),
    }
}

/// Classify the distribution channel from the receipt path.
fn classify_receipt(receipt_path: Option<&str>) -> &'static str {
    match receipt_path {
        Some(path) if path.contains(SIMULATOR_MARKER) => INSTALLER_SIMULATOR,
        Some(path) if path.contains(SANDBOX_MARKER) => INSTALLER_TESTFLIGHT,
        // A receipt with neither marker, or no receipt at all, both report
        // the production store.
        _ => INSTALLER_APP_STORE,
    }
}

/// Direct string conversion of an info-dictionary value.
///
/// An absent key stringifies to the literal `"null"`, preserving the
/// platform's description semantics for missing objects.
fn info_string(value: Option<String>) -> String {
    value.unwrap_or_else(|| "null".to_string())
}

// ============================================================================
// Zero-Argument Accessor (Apple targets)
// ============================================================================

/// Resolve the running application's package from the main bundle.
#[cfg(target_vendor = "apple")]
pub fn current() -> PkginfoResult<Package> {
    Ok(resolve(&foundation::MainBundle))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeBundle {
        display_name: Option<String>,
        identifier: Option<String>,
        short_version: Option<String>,
        build: Option<String>,
        receipt_path: Option<String>,
    }

    impl FakeBundle {
        fn complete() -> Self {
            Self {
                display_name: Some("Demo".into()),
                identifier: Some("com.example.demo".into()),
                short_version: Some("1.2.3".into()),
                build: Some("42".into()),
                receipt_path: Some("/private/var/mobile/Demo.app/_MASReceipt/receipt".into()),
            }
        }
    }

    impl Bundle for FakeBundle {
        fn info_value(&self, key: &str) -> Option<String> {
            match key {
                KEY_DISPLAY_NAME => self.display_name.clone(),
                KEY_SHORT_VERSION => self.short_version.clone(),
                KEY_BUILD => self.build.clone(),
                _ => None,
            }
        }

        fn bundle_identifier(&self) -> Option<String> {
            self.identifier.clone()
        }

        fn app_store_receipt_path(&self) -> Option<String> {
            self.receipt_path.clone()
        }
    }

    #[test]
    fn resolves_all_fields_from_bundle() {
        let pkg = resolve(&FakeBundle::complete());
        assert_eq!(pkg.app_name, "Demo");
        assert_eq!(pkg.package_name, "com.example.demo");
        assert_eq!(pkg.version, "1.2.3");
        assert_eq!(pkg.build, "42");
        assert_eq!(pkg.build_signature, "");
        assert_eq!(pkg.installer_store.as_deref(), Some(INSTALLER_APP_STORE));
    }

    #[test]
    fn simulator_receipt_classifies_as_simulator() {
        let mut bundle = FakeBundle::complete();
        bundle.receipt_path = Some(
            "/Users/dev/Library/Developer/CoreSimulator/Devices/receipt".into(),
        );
        let pkg = resolve(&bundle);
        assert_eq!(pkg.installer_store.as_deref(), Some(INSTALLER_SIMULATOR));
    }

    #[test]
    fn sandbox_receipt_classifies_as_testflight() {
        let mut bundle = FakeBundle::complete();
        bundle.receipt_path =
            Some("/private/var/mobile/Demo.app/StoreKit/sandboxReceipt".into());
        let pkg = resolve(&bundle);
        assert_eq!(pkg.installer_store.as_deref(), Some(INSTALLER_TESTFLIGHT));
    }

    #[test]
    fn missing_receipt_still_reports_production_store() {
        let mut bundle = FakeBundle::complete();
        bundle.receipt_path = None;
        let pkg = resolve(&bundle);
        assert_eq!(pkg.installer_store.as_deref(), Some(INSTALLER_APP_STORE));
    }

    #[test]
    fn simulator_marker_wins_over_sandbox_marker() {
        // Simulator builds of TestFlight-style receipts classify as simulator
        let mut bundle = FakeBundle::complete();
        bundle.receipt_path =
            Some("/CoreSimulator/Devices/Demo.app/StoreKit/sandboxReceipt".into());
        let pkg = resolve(&bundle);
        assert_eq!(pkg.installer_store.as_deref(), Some(INSTALLER_SIMULATOR));
    }

    #[test]
    fn absent_info_values_stringify_to_literal_null() {
        let bundle = FakeBundle {
            display_name: None,
            identifier: None,
            short_version: None,
            build: None,
            receipt_path: None,
        };
        let pkg = resolve(&bundle);
        assert_eq!(pkg.app_name, "null");
        assert_eq!(pkg.version, "null");
        assert_eq!(pkg.build, "null");
        // The bundle identifier falls back to empty, not "null"
        assert_eq!(pkg.package_name, "");
    }

    #[test]
    fn build_signature_is_always_empty() {
        assert_eq!(resolve(&FakeBundle::complete()).build_signature, "");
    }
}
