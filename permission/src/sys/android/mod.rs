//! Android permission host using JNI against an `Activity`.

use std::fmt;

use jni::objects::{GlobalRef, JObject, JValue};
use jni::{JNIEnv, JavaVM};
use log::error;

use crate::{GrantResult, Permission, PermissionError, PermissionHost};

/// First SDK level with runtime permissions (Marshmallow).
const RUNTIME_PERMISSIONS_SDK: i32 = 23;

const ACTION_LOCATION_SOURCE_SETTINGS: &str = "android.settings.LOCATION_SOURCE_SETTINGS";

/// Permission host backed by a live Android `Activity`.
pub struct AndroidPermissionHost {
    vm: JavaVM,
    activity: GlobalRef,
    sdk_int: i32,
}

impl fmt::Debug for AndroidPermissionHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AndroidPermissionHost")
            .field("sdk_int", &self.sdk_int)
            .finish_non_exhaustive()
    }
}

impl AndroidPermissionHost {
    /// Create a host for the given `Activity`.
    ///
    /// # Errors
    /// Returns a [`PermissionError`] if the activity reference or the SDK
    /// level cannot be obtained.
    pub fn new(env: &mut JNIEnv<'_>, activity: &JObject<'_>) -> Result<Self, PermissionError> {
        let vm = env.get_java_vm().map_err(map_jni_error)?;
        let activity = env.new_global_ref(activity).map_err(map_jni_error)?;
        let sdk_int = env
            .get_static_field("android/os/Build$VERSION", "SDK_INT", "I")
            .and_then(|value| value.i())
            .map_err(map_jni_error)?;

        Ok(Self {
            vm,
            activity,
            sdk_int,
        })
    }

    fn with_activity<T, F>(&self, action: F) -> Result<T, PermissionError>
    where
        F: FnOnce(&mut JNIEnv<'_>, &JObject<'_>) -> jni::errors::Result<T>,
    {
        let mut env = self.vm.attach_current_thread().map_err(map_jni_error)?;
        let result = action(&mut env, self.activity.as_obj());
        if result.is_err() {
            clear_pending_exception(&mut env);
        }
        result.map_err(map_jni_error)
    }
}

impl PermissionHost for AndroidPermissionHost {
    fn uses_runtime_permissions(&self) -> bool {
        self.sdk_int >= RUNTIME_PERMISSIONS_SDK
    }

    fn check_permission(&self, permission: Permission) -> GrantResult {
        let code = self.with_activity(|env, activity| {
            let name = env.new_string(permission.identifier())?;
            env.call_method(
                activity,
                "checkSelfPermission",
                "(Ljava/lang/String;)I",
                &[JValue::Object(&name)],
            )?
            .i()
        });

        match code {
            Ok(code) => GrantResult::from_code(code),
            Err(err) => {
                error!("checkSelfPermission failed for {permission:?}: {err}");
                GrantResult::Denied
            }
        }
    }

    fn request_permissions(
        &self,
        permissions: &[Permission],
        request_code: i32,
    ) -> Result<(), PermissionError> {
        let len = i32::try_from(permissions.len())
            .map_err(|_| PermissionError::Platform("too many permissions".into()))?;

        self.with_activity(|env, activity| {
            let array = env.new_object_array(len, "java/lang/String", JObject::null())?;
            for (index, permission) in (0..).zip(permissions) {
                let name = env.new_string(permission.identifier())?;
                env.set_object_array_element(&array, index, name)?;
            }

            env.call_method(
                activity,
                "requestPermissions",
                "([Ljava/lang/String;I)V",
                &[JValue::Object(&array), JValue::Int(request_code)],
            )?;
            Ok(())
        })
    }

    fn should_show_rationale(&self, permission: Permission) -> bool {
        self.with_activity(|env, activity| {
            let name = env.new_string(permission.identifier())?;
            env.call_method(
                activity,
                "shouldShowRequestPermissionRationale",
                "(Ljava/lang/String;)Z",
                &[JValue::Object(&name)],
            )?
            .z()
        })
        .unwrap_or_else(|err| {
            error!("shouldShowRequestPermissionRationale failed: {err}");
            false
        })
    }

    fn is_gps_provider_enabled(&self) -> bool {
        self.with_activity(|env, activity| {
            let service = env.new_string("location")?;
            let manager = env
                .call_method(
                    activity,
                    "getSystemService",
                    "(Ljava/lang/String;)Ljava/lang/Object;",
                    &[JValue::Object(&service)],
                )?
                .l()?;
            if manager.is_null() {
                return Ok(false);
            }

            let provider = env.new_string("gps")?;
            env.call_method(
                &manager,
                "isProviderEnabled",
                "(Ljava/lang/String;)Z",
                &[JValue::Object(&provider)],
            )?
            .z()
        })
        .unwrap_or_else(|err| {
            error!("isProviderEnabled failed: {err}");
            false
        })
    }

    fn open_location_settings(&self, request_code: i32) -> Result<(), PermissionError> {
        self.with_activity(|env, activity| {
            let action = env.new_string(ACTION_LOCATION_SOURCE_SETTINGS)?;
            let intent = env.new_object(
                "android/content/Intent",
                "(Ljava/lang/String;)V",
                &[JValue::Object(&action)],
            )?;
            env.call_method(
                activity,
                "startActivityForResult",
                "(Landroid/content/Intent;I)V",
                &[JValue::Object(&intent), JValue::Int(request_code)],
            )?;
            Ok(())
        })
    }
}

fn clear_pending_exception(env: &mut JNIEnv<'_>) {
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_describe();
        let _ = env.exception_clear();
    }
}

#[allow(clippy::needless_pass_by_value)]
fn map_jni_error(err: jni::errors::Error) -> PermissionError {
    PermissionError::Platform(err.to_string())
}
