//! Android package resolution.
//!
//! Android is the context-dependent platform: the host application must
//! register its application context once during startup (see
//! [`ContextRegistry`]). After that, resolution is a direct sequential
//! mapping from the package-manager service onto the [`Package`] record.
//!
//! The package manager is modeled as a read-only oracle behind the
//! [`PackageService`] trait so the resolution logic — version-code selection,
//! installer lookup, signature hashing — is plain testable code on every
//! host. The JNI-backed implementation lives in the target-gated `jni`
//! submodule.
//!
//! OS-version-dependent behavior goes through a small capability table
//! ([`ApiLevel::supports`]) instead of scattered version conditionals.

use std::sync::OnceLock;

use sha1::{Digest, Sha1};
use tracing::debug;

use pkginfo_core::{Package, PkginfoError, PkginfoResult};

#[cfg(target_os = "android")]
mod jni;

#[cfg(target_os = "android")]
pub use self::jni::register_context;

// ============================================================================
// Capability Table
// ============================================================================

/// Android API level (`android.os.Build.VERSION.SDK_INT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ApiLevel(pub u32);

/// Platform facilities that appeared at a specific API level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// 64-bit version codes (`PackageInfo.getLongVersionCode`).
    LongVersionCode,
    /// Multi-signer signing info (`PackageInfo.signingInfo`).
    SigningInfo,
    /// Install-source service (`PackageManager.getInstallSourceInfo`).
    InstallSourceInfo,
}

/// Minimum API level for each capability.
const CAPABILITY_TABLE: &[(Capability, u32)] = &[
    (Capability::LongVersionCode, 28),
    (Capability::SigningInfo, 28),
    (Capability::InstallSourceInfo, 30),
];

impl ApiLevel {
    /// True when this API level provides the given capability.
    pub fn supports(self, capability: Capability) -> bool {
        CAPABILITY_TABLE
            .iter()
            .find(|(candidate, _)| *candidate == capability)
            .is_some_and(|(_, min_level)| self.0 >= *min_level)
    }
}

// ============================================================================
// Application Context
// ============================================================================

/// The slice of the host application's context the resolver needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppContext {
    /// Package identifier of the host application.
    pub package_name: String,
    /// API level of the device the application runs on.
    pub api_level: ApiLevel,
}

/// Write-once holder for the process-wide [`AppContext`].
///
/// The host registers exactly once during startup; every read before that is
/// a configuration error. Re-registration is rejected rather than applied,
/// so a context can never change mid-flight.
#[derive(Debug, Default)]
pub struct ContextRegistry {
    slot: OnceLock<AppContext>,
}

impl ContextRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            slot: OnceLock::new(),
        }
    }

    /// Register the application context.
    ///
    /// # Errors
    ///
    /// Returns [`PkginfoError::AlreadyRegistered`] on any call after the
    /// first successful registration.
    pub fn register(&self, context: AppContext) -> PkginfoResult<()> {
        self.slot
            .set(context)
            .map_err(|_| PkginfoError::AlreadyRegistered)
    }

    /// Get the registered context.
    ///
    /// # Errors
    ///
    /// Returns [`PkginfoError::MissingContext`] before registration.
    pub fn get(&self) -> PkginfoResult<&AppContext> {
        self.slot.get().ok_or(PkginfoError::MissingContext)
    }
}

/// Process-wide registry backing the zero-argument accessor.
static REGISTRY: ContextRegistry = ContextRegistry::new();

/// The process-wide context registry used by [`crate::current`].
pub fn registry() -> &'static ContextRegistry {
    &REGISTRY
}

// ============================================================================
// Package-Manager Oracle
// ============================================================================

/// Core package metadata, as reported by the package-manager service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
    /// Human-readable application label.
    pub label: String,
    /// Human-facing version name.
    pub version_name: String,
    /// Legacy 32-bit version code.
    pub version_code: i32,
    /// 64-bit version code. Backends mirror `version_code` into this field
    /// on devices without the wide form; the resolver never reads it there.
    pub long_version_code: i64,
}

/// Signing info as reported on devices with multi-signer support.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningInfo {
    /// True when the APK was signed by multiple signers.
    pub has_multiple_signers: bool,
    /// Raw certificates of the current APK-contents signers.
    pub apk_contents_signers: Vec<Vec<u8>>,
    /// Raw certificates of the signing history (oldest first).
    pub signing_certificate_history: Vec<Vec<u8>>,
}

/// Read-only oracle over the OS package-manager service.
///
/// Each method mirrors one platform lookup; the resolver decides which of
/// them to consult based on the device's [`ApiLevel`].
pub trait PackageService {
    /// Label, version name, and version codes for the package.
    fn metadata(&self, package: &str) -> PkginfoResult<PackageMetadata>;

    /// Initiating package name from the install-source service (API 30+).
    fn install_source(&self, package: &str) -> Option<String>;

    /// Installer package name from the legacy installer API.
    fn installer_package(&self, package: &str) -> Option<String>;

    /// Signing info (API 28+). `Ok(None)` when the package reports none.
    fn signing_info(&self, package: &str) -> PkginfoResult<Option<SigningInfo>>;

    /// Legacy signature list. May be empty.
    fn signatures(&self, package: &str) -> PkginfoResult<Vec<Vec<u8>>>;
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the [`Package`] record for the given context.
///
/// Metadata lookup failures propagate; everything the signature and
/// installer steps can fail on degrades to the documented sentinel values
/// (`""` and `None`) instead.
pub fn resolve<S: PackageService>(context: &AppContext, service: &S) -> PkginfoResult<Package> {
    let metadata = service.metadata(&context.package_name)?;

    let build = if context.api_level.supports(Capability::LongVersionCode) {
        metadata.long_version_code.to_string()
    } else {
        i64::from(metadata.version_code).to_string()
    };

    let installer_store = if context.api_level.supports(Capability::InstallSourceInfo) {
        service.install_source(&context.package_name)
    } else {
        service.installer_package(&context.package_name)
    };

    let build_signature = build_signature(context, service).unwrap_or_default();

    Ok(Package {
        app_name: metadata.label,
        package_name: context.package_name.clone(),
        version: metadata.version_name,
        build,
        build_signature,
        installer_store,
    })
}

/// Resolve the signing-certificate digest, or `None` when unavailable.
fn build_signature<S: PackageService>(context: &AppContext, service: &S) -> Option<String> {
    if context.api_level.supports(Capability::SigningInfo) {
        let info = match service.signing_info(&context.package_name) {
            Ok(Some(info)) => info,
            Ok(None) => {
                debug!(package = %context.package_name, "no signing info reported");
                return None;
            }
            Err(err) => {
                debug!(package = %context.package_name, error = %err, "signing info lookup failed");
                return None;
            }
        };

        let certificate = if info.has_multiple_signers {
            info.apk_contents_signers.first()?
        } else {
            info.signing_certificate_history.first()?
        };
        Some(signature_digest(certificate))
    } else {
        let signatures = match service.signatures(&context.package_name) {
            Ok(signatures) => signatures,
            Err(err) => {
                debug!(package = %context.package_name, error = %err, "signature lookup failed");
                return None;
            }
        };
        let first = signatures.first()?;
        Some(signature_digest(first))
    }
}

/// SHA-1 digest of a signing certificate, hex-encoded uppercase.
///
/// Two hex characters per byte, most-significant nibble first.
pub fn signature_digest(certificate: &[u8]) -> String {
    let digest = Sha1::digest(certificate);
    hex::encode_upper(digest)
}

// ============================================================================
// Zero-Argument Accessor (Android targets)
// ============================================================================

/// Resolve the running application's package via the registered context.
#[cfg(target_os = "android")]
pub fn current() -> PkginfoResult<Package> {
    jni::current()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_table_boundaries() {
        // Wide version codes and signing info arrived with API 28
        assert!(!ApiLevel(27).supports(Capability::LongVersionCode));
        assert!(ApiLevel(28).supports(Capability::LongVersionCode));
        assert!(!ApiLevel(27).supports(Capability::SigningInfo));
        assert!(ApiLevel(28).supports(Capability::SigningInfo));

        // The install-source service arrived with API 30
        assert!(!ApiLevel(29).supports(Capability::InstallSourceInfo));
        assert!(ApiLevel(30).supports(Capability::InstallSourceInfo));
        assert!(ApiLevel(34).supports(Capability::InstallSourceInfo));
    }

    #[test]
    fn registry_rejects_reads_before_registration() {
        let registry = ContextRegistry::new();
        let err = registry.get().unwrap_err();
        assert!(matches!(err, PkginfoError::MissingContext));
        assert!(err.is_configuration());
    }

    #[test]
    fn registry_is_write_once() {
        let registry = ContextRegistry::new();
        let context = AppContext {
            package_name: "com.example.demo".into(),
            api_level: ApiLevel(33),
        };
        registry.register(context.clone()).unwrap();
        assert_eq!(registry.get().unwrap(), &context);

        let err = registry
            .register(AppContext {
                package_name: "com.example.other".into(),
                api_level: ApiLevel(21),
            })
            .unwrap_err();
        assert!(matches!(err, PkginfoError::AlreadyRegistered));
        // The original registration is untouched
        assert_eq!(registry.get().unwrap().package_name, "com.example.demo");
    }

    #[test]
    fn signature_digest_known_vectors() {
        // SHA-1("abc"), uppercase hex
        assert_eq!(
            signature_digest(b"abc"),
            "A9993E364706816ABA3E25717850C26C9CD0D89D"
        );
        // SHA-1 of the empty input
        assert_eq!(
            signature_digest(b""),
            "DA39A3EE5E6B4B0D3255BFEF95601890AFD80709"
        );
    }

    #[test]
    fn signature_digest_is_deterministic() {
        let cert = [0u8, 1, 2, 3, 0xFE, 0xFF];
        let first = signature_digest(&cert);
        let second = signature_digest(&cert);
        assert_eq!(first, second);
        assert_eq!(first.len(), 40); // 20 digest bytes, 2 chars each
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn hex_encoding_properties() {
        // Two characters per byte, high nibble first
        assert_eq!(hex::encode_upper([0xA7u8]), "A7");
        assert_eq!(hex::encode_upper([0x0Fu8, 0xF0]), "0FF0");
        assert_eq!(hex::encode_upper([0u8; 0]), "");

        let bytes: Vec<u8> = (0..=255).collect();
        let encoded = hex::encode_upper(&bytes);
        assert_eq!(encoded.len(), bytes.len() * 2);
        assert!(encoded
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }
}
