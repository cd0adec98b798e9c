//! JNI-backed implementation of the package-manager oracle.
//!
//! The host registers its `android.content.Context` once via
//! [`register_context`]; the JavaVM handle and a global ref to the context
//! are captured at that point, together with the package name and the
//! device's API level. Every later query attaches the current thread and
//! performs the lookups through plain JNI calls.
//!
//! Thrown Java exceptions are cleared before surfacing an error so the VM
//! is never left with a pending exception.

use std::cell::RefCell;
use std::sync::OnceLock;

use jni::objects::{GlobalRef, JByteArray, JObject, JObjectArray, JString, JValue};
use jni::{JNIEnv, JavaVM};

use pkginfo_core::{Package, PkginfoError, PkginfoResult};

use super::{
    registry, ApiLevel, AppContext, Capability, PackageMetadata, PackageService, SigningInfo,
};

/// `PackageManager.GET_SIGNATURES`
const GET_SIGNATURES: i32 = 0x40;
/// `PackageManager.GET_SIGNING_CERTIFICATES`
const GET_SIGNING_CERTIFICATES: i32 = 0x0800_0000;

struct Host {
    vm: JavaVM,
    context: GlobalRef,
}

/// VM handle and context ref, captured once at registration.
static HOST: OnceLock<Host> = OnceLock::new();

/// Register the host application's context.
///
/// Must be called once during application startup, before the first query.
/// Captures the JavaVM, a global reference to the context, the package name,
/// and `Build.VERSION.SDK_INT`.
///
/// # Errors
///
/// Returns [`PkginfoError::AlreadyRegistered`] on a second call and
/// [`PkginfoError::System`] if the JNI lookups fail.
pub fn register_context(env: &mut JNIEnv, context: &JObject) -> PkginfoResult<()> {
    let vm = env.get_java_vm().map_err(to_system)?;
    let global = env.new_global_ref(context).map_err(to_system)?;

    let package_name = {
        let name = env
            .call_method(context, "getPackageName", "()Ljava/lang/String;", &[])
            .and_then(|value| value.l())
            .map_err(to_system)?;
        jstring(env, name).map_err(to_system)?
    };
    let sdk_int = env
        .get_static_field("android/os/Build$VERSION", "SDK_INT", "I")
        .and_then(|value| value.i())
        .map_err(to_system)?;

    registry().register(AppContext {
        package_name,
        api_level: ApiLevel(sdk_int.max(0) as u32),
    })?;
    HOST.set(Host {
        vm,
        context: global,
    })
    .map_err(|_| PkginfoError::AlreadyRegistered)
}

/// Resolve the running application's package via the registered context.
pub(super) fn current() -> PkginfoResult<Package> {
    let host = HOST.get().ok_or(PkginfoError::MissingContext)?;
    let context = registry().get()?;

    let mut guard = host.vm.attach_current_thread().map_err(to_system)?;
    let service = JniPackageService {
        env: RefCell::new(&mut *guard),
        context: host.context.as_obj(),
        api_level: context.api_level,
    };
    super::resolve(context, &service)
}

struct JniPackageService<'a, 'local> {
    env: RefCell<&'a mut JNIEnv<'local>>,
    context: &'a JObject<'static>,
    api_level: ApiLevel,
}

impl PackageService for JniPackageService<'_, '_> {
    fn metadata(&self, package: &str) -> PkginfoResult<PackageMetadata> {
        let mut guard = self.env.borrow_mut();
        let env = &mut **guard;
        metadata_impl(env, self.context, self.api_level, package)
            .map_err(|err| map_lookup_error(env, err, package))
    }

    fn install_source(&self, package: &str) -> Option<String> {
        let mut guard = self.env.borrow_mut();
        let env = &mut **guard;
        match install_source_impl(env, self.context, package) {
            Ok(source) => source,
            Err(err) => {
                clear_exception(env, &err);
                None
            }
        }
    }

    fn installer_package(&self, package: &str) -> Option<String> {
        let mut guard = self.env.borrow_mut();
        let env = &mut **guard;
        match installer_package_impl(env, self.context, package) {
            Ok(installer) => installer,
            Err(err) => {
                clear_exception(env, &err);
                None
            }
        }
    }

    fn signing_info(&self, package: &str) -> PkginfoResult<Option<SigningInfo>> {
        let mut guard = self.env.borrow_mut();
        let env = &mut **guard;
        signing_info_impl(env, self.context, package)
            .map_err(|err| map_lookup_error(env, err, package))
    }

    fn signatures(&self, package: &str) -> PkginfoResult<Vec<Vec<u8>>> {
        let mut guard = self.env.borrow_mut();
        let env = &mut **guard;
        signatures_impl(env, self.context, package)
            .map_err(|err| map_lookup_error(env, err, package))
    }
}

// ============================================================================
// JNI Lookups
// ============================================================================

fn package_manager<'l>(
    env: &mut JNIEnv<'l>,
    context: &JObject,
) -> jni::errors::Result<JObject<'l>> {
    env.call_method(
        context,
        "getPackageManager",
        "()Landroid/content/pm/PackageManager;",
        &[],
    )?
    .l()
}

fn package_info<'l>(
    env: &mut JNIEnv<'l>,
    context: &JObject,
    package: &str,
    flags: i32,
) -> jni::errors::Result<JObject<'l>> {
    let pm = package_manager(env, context)?;
    let name = env.new_string(package)?;
    env.call_method(
        &pm,
        "getPackageInfo",
        "(Ljava/lang/String;I)Landroid/content/pm/PackageInfo;",
        &[JValue::Object(&name), JValue::Int(flags)],
    )?
    .l()
}

fn metadata_impl(
    env: &mut JNIEnv,
    context: &JObject,
    api_level: ApiLevel,
    package: &str,
) -> jni::errors::Result<PackageMetadata> {
    let info = package_info(env, context, package, 0)?;

    let app_info = env
        .get_field(
            &info,
            "applicationInfo",
            "Landroid/content/pm/ApplicationInfo;",
        )?
        .l()?;
    let pm = package_manager(env, context)?;
    let label = env
        .call_method(
            &app_info,
            "loadLabel",
            "(Landroid/content/pm/PackageManager;)Ljava/lang/CharSequence;",
            &[JValue::Object(&pm)],
        )?
        .l()?;
    let label = to_display_string(env, label)?;

    let version_name = env.get_field(&info, "versionName", "Ljava/lang/String;")?.l()?;
    let version_name = if version_name.is_null() {
        String::new()
    } else {
        jstring(env, version_name)?
    };

    let version_code = env.get_field(&info, "versionCode", "I")?.i()?;
    // getLongVersionCode does not exist below API 28
    let long_version_code = if api_level.supports(Capability::LongVersionCode) {
        env.call_method(&info, "getLongVersionCode", "()J", &[])?.j()?
    } else {
        i64::from(version_code)
    };

    Ok(PackageMetadata {
        label,
        version_name,
        version_code,
        long_version_code,
    })
}

fn install_source_impl(
    env: &mut JNIEnv,
    context: &JObject,
    package: &str,
) -> jni::errors::Result<Option<String>> {
    let pm = package_manager(env, context)?;
    let name = env.new_string(package)?;
    let source = env
        .call_method(
            &pm,
            "getInstallSourceInfo",
            "(Ljava/lang/String;)Landroid/content/pm/InstallSourceInfo;",
            &[JValue::Object(&name)],
        )?
        .l()?;
    let initiating = env
        .call_method(
            &source,
            "getInitiatingPackageName",
            "()Ljava/lang/String;",
            &[],
        )?
        .l()?;
    if initiating.is_null() {
        Ok(None)
    } else {
        jstring(env, initiating).map(Some)
    }
}

fn installer_package_impl(
    env: &mut JNIEnv,
    context: &JObject,
    package: &str,
) -> jni::errors::Result<Option<String>> {
    let pm = package_manager(env, context)?;
    let name = env.new_string(package)?;
    let installer = env
        .call_method(
            &pm,
            "getInstallerPackageName",
            "(Ljava/lang/String;)Ljava/lang/String;",
            &[JValue::Object(&name)],
        )?
        .l()?;
    if installer.is_null() {
        Ok(None)
    } else {
        jstring(env, installer).map(Some)
    }
}

fn signing_info_impl(
    env: &mut JNIEnv,
    context: &JObject,
    package: &str,
) -> jni::errors::Result<Option<SigningInfo>> {
    let info = package_info(env, context, package, GET_SIGNING_CERTIFICATES)?;
    let signing = env
        .get_field(&info, "signingInfo", "Landroid/content/pm/SigningInfo;")?
        .l()?;
    if signing.is_null() {
        return Ok(None);
    }

    let has_multiple_signers = env
        .call_method(&signing, "hasMultipleSigners", "()Z", &[])?
        .z()?;
    let signers = env
        .call_method(
            &signing,
            "getApkContentsSigners",
            "()[Landroid/content/pm/Signature;",
            &[],
        )?
        .l()?;
    let apk_contents_signers = signature_array(env, signers)?;
    let history = env
        .call_method(
            &signing,
            "getSigningCertificateHistory",
            "()[Landroid/content/pm/Signature;",
            &[],
        )?
        .l()?;
    let signing_certificate_history = signature_array(env, history)?;

    Ok(Some(SigningInfo {
        has_multiple_signers,
        apk_contents_signers,
        signing_certificate_history,
    }))
}

fn signatures_impl(
    env: &mut JNIEnv,
    context: &JObject,
    package: &str,
) -> jni::errors::Result<Vec<Vec<u8>>> {
    let info = package_info(env, context, package, GET_SIGNATURES)?;
    let signatures = env
        .get_field(&info, "signatures", "[Landroid/content/pm/Signature;")?
        .l()?;
    signature_array(env, signatures)
}

/// Collect `Signature[]` into raw certificate bytes.
///
/// Stops at the first null entry: a null leading signature means the package
/// reports no usable signature.
fn signature_array(env: &mut JNIEnv, array: JObject) -> jni::errors::Result<Vec<Vec<u8>>> {
    if array.is_null() {
        return Ok(Vec::new());
    }
    let array = JObjectArray::from(array);
    let length = env.get_array_length(&array)?;
    let mut certificates = Vec::with_capacity(length.max(0) as usize);
    for index in 0..length {
        let signature = env.get_object_array_element(&array, index)?;
        if signature.is_null() {
            break;
        }
        let bytes = env.call_method(&signature, "toByteArray", "()[B", &[])?.l()?;
        certificates.push(env.convert_byte_array(JByteArray::from(bytes))?);
    }
    Ok(certificates)
}

// ============================================================================
// Helpers
// ============================================================================

fn jstring(env: &mut JNIEnv, obj: JObject) -> jni::errors::Result<String> {
    let jstr = JString::from(obj);
    Ok(env.get_string(&jstr)?.into())
}

/// Stringify via the object's `toString()`.
fn to_display_string(env: &mut JNIEnv, obj: JObject) -> jni::errors::Result<String> {
    let string = env
        .call_method(&obj, "toString", "()Ljava/lang/String;", &[])?
        .l()?;
    jstring(env, string)
}

fn to_system(err: jni::errors::Error) -> PkginfoError {
    PkginfoError::system(err.to_string())
}

fn clear_exception(env: &mut JNIEnv, err: &jni::errors::Error) {
    if matches!(err, jni::errors::Error::JavaException) {
        let _ = env.exception_clear();
    }
}

fn map_lookup_error(env: &mut JNIEnv, err: jni::errors::Error, package: &str) -> PkginfoError {
    if matches!(err, jni::errors::Error::JavaException) {
        let _ = env.exception_clear();
        PkginfoError::package_not_found(package)
    } else {
        to_system(err)
    }
}
