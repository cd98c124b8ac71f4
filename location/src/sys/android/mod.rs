//! Android location backend using JNI against `android.location.LocationManager`.
//!
//! Updates are delivered to a Kotlin `LocationBridge` listener which forwards
//! each callback as JSON through
//! `Java_com_gpsview_location_LocationBridge_dispatchEvent`.

use std::collections::HashMap;
use std::ffi::c_void;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use jni::objects::{GlobalRef, JClass, JObject, JString, JThrowable, JValue};
use jni::sys::jlong;
use jni::{JNIEnv, JavaVM, NativeMethod};
use log::{debug, error};

use crate::{
    LocationBackend, LocationError, LocationFix, LocationResult, LocationSource, Provider,
    UpdateParameters,
};

/// Embedded DEX bytecode containing the `LocationBridge` class.
/// Generated at build time by kotlinc + D8.
static DEX_BYTES: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/classes.dex"));

const BRIDGE_CLASS_NAME: &str = "com.gpsview.location.LocationBridge";

/// `LocationBridge` class loaded from the embedded DEX.
static BRIDGE_CLASS: OnceLock<GlobalRef> = OnceLock::new();

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);
static SOURCES: OnceLock<Mutex<HashMap<u64, Arc<LocationSource>>>> = OnceLock::new();

fn sources() -> &'static Mutex<HashMap<u64, Arc<LocationSource>>> {
    SOURCES.get_or_init(|| Mutex::new(HashMap::new()))
}

struct Registration {
    handle: u64,
    listener: GlobalRef,
    source: Arc<LocationSource>,
}

/// Backend backed by the system `LocationManager`.
pub struct AndroidLocationBackend {
    vm: JavaVM,
    manager: GlobalRef,
    registrations: Mutex<Vec<Registration>>,
}

impl fmt::Debug for AndroidLocationBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let active = self
            .registrations
            .lock()
            .map_or(0, |registrations| registrations.len());
        f.debug_struct("AndroidLocationBackend")
            .field("registrations", &active)
            .finish_non_exhaustive()
    }
}

impl AndroidLocationBackend {
    /// Obtain the location manager from `context`.
    ///
    /// # Errors
    /// Returns [`LocationError::ManagerUnavailable`] if the context has no
    /// location service, or a platform error if the bridge cannot be loaded.
    pub fn new(env: &mut JNIEnv<'_>, context: &JObject<'_>) -> LocationResult<Self> {
        load_bridge_class(env, context)?;

        let service = env.new_string("location").map_err(map_jni_error)?;
        let manager = env
            .call_method(
                context,
                "getSystemService",
                "(Ljava/lang/String;)Ljava/lang/Object;",
                &[JValue::Object(&service)],
            )
            .and_then(|value| value.l())
            .map_err(|err| java_failure(env, err))?;
        if manager.is_null() {
            return Err(LocationError::ManagerUnavailable);
        }

        let vm = env.get_java_vm().map_err(map_jni_error)?;
        let manager = env.new_global_ref(manager).map_err(map_jni_error)?;

        Ok(Self {
            vm,
            manager,
            registrations: Mutex::new(Vec::new()),
        })
    }

    fn with_manager<T, F>(&self, action: F) -> LocationResult<T>
    where
        F: FnOnce(&mut JNIEnv<'_>, &JObject<'_>) -> jni::errors::Result<T>,
    {
        let mut env = self.vm.attach_current_thread().map_err(map_jni_error)?;
        action(&mut env, self.manager.as_obj()).map_err(|err| java_failure(&mut env, err))
    }

    fn create_listener(&self, handle: u64) -> LocationResult<GlobalRef> {
        let class = BRIDGE_CLASS
            .get()
            .ok_or_else(|| LocationError::Platform {
                message: "LocationBridge class not loaded".into(),
            })?;

        let mut env = self.vm.attach_current_thread().map_err(map_jni_error)?;
        #[allow(clippy::cast_possible_wrap)]
        let handle = handle as jlong;
        let class: &JClass<'_> = class.as_obj().into();
        let listener = env
            .new_object(class, "(J)V", &[JValue::Long(handle)])
            .map_err(|err| java_failure(&mut env, err))?;
        env.new_global_ref(listener).map_err(map_jni_error)
    }
}

impl LocationBackend for AndroidLocationBackend {
    fn is_provider_enabled(&self, provider: Provider) -> bool {
        self.with_manager(|env, manager| {
            let name = env.new_string(provider.name())?;
            env.call_method(
                manager,
                "isProviderEnabled",
                "(Ljava/lang/String;)Z",
                &[JValue::Object(&name)],
            )?
            .z()
        })
        .unwrap_or_else(|err| {
            error!("isProviderEnabled({provider}) failed: {err}");
            false
        })
    }

    fn request_updates(
        &self,
        provider: Provider,
        params: UpdateParameters,
        source: Arc<LocationSource>,
    ) -> LocationResult<()> {
        let handle = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);
        let listener = self.create_listener(handle)?;

        sources()
            .lock()
            .map_err(|_| LocationError::Platform {
                message: "source registry poisoned".into(),
            })?
            .insert(handle, source.clone());

        let min_interval = jlong::try_from(params.min_interval_ms).unwrap_or(jlong::MAX);
        let registered = self.with_manager(|env, manager| {
            let name = env.new_string(provider.name())?;
            let looper = env
                .call_static_method(
                    "android/os/Looper",
                    "getMainLooper",
                    "()Landroid/os/Looper;",
                    &[],
                )?
                .l()?;
            env.call_method(
                manager,
                "requestLocationUpdates",
                "(Ljava/lang/String;JFLandroid/location/LocationListener;Landroid/os/Looper;)V",
                &[
                    JValue::Object(&name),
                    JValue::Long(min_interval),
                    JValue::Float(params.min_distance_m),
                    JValue::Object(listener.as_obj()),
                    JValue::Object(&looper),
                ],
            )?;
            Ok(())
        });

        if let Err(err) = registered {
            unregister_handle(handle);
            return Err(err);
        }

        debug!("registered LocationBridge {handle} for {provider}");
        if let Ok(mut registrations) = self.registrations.lock() {
            registrations.push(Registration {
                handle,
                listener,
                source,
            });
        }
        Ok(())
    }

    fn remove_updates(&self, source: &Arc<LocationSource>) -> LocationResult<()> {
        let removed: Vec<Registration> = {
            let mut registrations =
                self.registrations
                    .lock()
                    .map_err(|_| LocationError::Platform {
                        message: "registration list poisoned".into(),
                    })?;
            let (removed, kept) = registrations
                .drain(..)
                .partition(|registration| Arc::ptr_eq(&registration.source, source));
            *registrations = kept;
            removed
        };

        let mut result = Ok(());
        for registration in removed {
            unregister_handle(registration.handle);
            let outcome = self.with_manager(|env, manager| {
                env.call_method(
                    manager,
                    "removeUpdates",
                    "(Landroid/location/LocationListener;)V",
                    &[JValue::Object(registration.listener.as_obj())],
                )?;
                Ok(())
            });
            if let Err(err) = outcome {
                result = Err(err);
            }
        }
        result
    }

    fn last_known_fix(&self, provider: Provider) -> LocationResult<Option<LocationFix>> {
        self.with_manager(|env, manager| {
            let name = env.new_string(provider.name())?;
            let location = env
                .call_method(
                    manager,
                    "getLastKnownLocation",
                    "(Ljava/lang/String;)Landroid/location/Location;",
                    &[JValue::Object(&name)],
                )?
                .l()?;
            if location.is_null() {
                return Ok(None);
            }

            Ok(Some(LocationFix {
                latitude: env.call_method(&location, "getLatitude", "()D", &[])?.d()?,
                longitude: env.call_method(&location, "getLongitude", "()D", &[])?.d()?,
                altitude: env.call_method(&location, "getAltitude", "()D", &[])?.d()?,
                accuracy: env.call_method(&location, "getAccuracy", "()F", &[])?.f()?,
                speed: env.call_method(&location, "getSpeed", "()F", &[])?.f()?,
                bearing: env.call_method(&location, "getBearing", "()F", &[])?.f()?,
            }))
        })
    }
}

impl Drop for AndroidLocationBackend {
    fn drop(&mut self) {
        let registrations = match self.registrations.get_mut() {
            Ok(registrations) => std::mem::take(registrations),
            Err(poisoned) => std::mem::take(poisoned.into_inner()),
        };
        for registration in &registrations {
            registration.source.detach();
            unregister_handle(registration.handle);
        }
    }
}

fn unregister_handle(handle: u64) {
    if let Ok(mut map) = sources().lock() {
        map.remove(&handle);
    }
}

/// Load `LocationBridge` from the embedded DEX and bind its native method.
fn load_bridge_class(env: &mut JNIEnv<'_>, context: &JObject<'_>) -> LocationResult<()> {
    if BRIDGE_CLASS.get().is_some() {
        return Ok(());
    }

    let cache_dir = env
        .call_method(context, "getCacheDir", "()Ljava/io/File;", &[])
        .and_then(|value| value.l())
        .map_err(|err| java_failure(env, err))?;

    let cache_path = env
        .call_method(&cache_dir, "getAbsolutePath", "()Ljava/lang/String;", &[])
        .and_then(|value| value.l())
        .map_err(|err| java_failure(env, err))?;

    let dex_path = format!(
        "{}/gpsview_location.dex",
        String::from(
            env.get_string((&cache_path).into())
                .map_err(map_jni_error)?
        )
    );

    // Android refuses to load writable DEX files.
    let _ = std::fs::remove_file(&dex_path);
    std::fs::write(&dex_path, DEX_BYTES).map_err(|err| LocationError::Platform {
        message: format!("write DEX failed: {err}"),
    })?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&dex_path, std::fs::Permissions::from_mode(0o444)).map_err(
            |err| LocationError::Platform {
                message: format!("chmod DEX failed: {err}"),
            },
        )?;
    }

    let dex_path = env.new_string(&dex_path).map_err(map_jni_error)?;
    let parent_loader = env
        .call_method(context, "getClassLoader", "()Ljava/lang/ClassLoader;", &[])
        .and_then(|value| value.l())
        .map_err(|err| java_failure(env, err))?;

    let class_loader = env
        .new_object(
            "dalvik/system/DexClassLoader",
            "(Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;Ljava/lang/ClassLoader;)V",
            &[
                JValue::Object(&dex_path),
                JValue::Object(&cache_path),
                JValue::Object(&JObject::null()),
                JValue::Object(&parent_loader),
            ],
        )
        .map_err(|err| java_failure(env, err))?;

    let class_name = env.new_string(BRIDGE_CLASS_NAME).map_err(map_jni_error)?;
    let class = env
        .call_method(
            &class_loader,
            "loadClass",
            "(Ljava/lang/String;)Ljava/lang/Class;",
            &[JValue::Object(&class_name)],
        )
        .and_then(|value| value.l())
        .map_err(|err| java_failure(env, err))?;
    let class = JClass::from(class);

    // Classes from a DexClassLoader cannot see natives registered by the app
    // loader, so bind the callback explicitly.
    env.register_native_methods(
        &class,
        &[NativeMethod {
            name: "dispatchEvent".into(),
            sig: "(JLjava/lang/String;)V".into(),
            fn_ptr: Java_com_gpsview_location_LocationBridge_dispatchEvent as *mut c_void,
        }],
    )
    .map_err(|err| java_failure(env, err))?;

    let global = env.new_global_ref(class).map_err(map_jni_error)?;
    let _ = BRIDGE_CLASS.set(global);
    Ok(())
}

#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_gpsview_location_LocationBridge_dispatchEvent(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
    handle: jlong,
    json_event: JString<'_>,
) {
    #[allow(clippy::cast_sign_loss)]
    let handle = handle as u64;
    let json = match env.get_string(&json_event) {
        Ok(value) => value.to_string_lossy().into_owned(),
        Err(err) => {
            error!("failed to read Android location payload: {err}");
            return;
        }
    };

    let source = sources()
        .lock()
        .ok()
        .and_then(|map| map.get(&handle).cloned());

    match source {
        Some(source) => source.dispatch_json(&json),
        None => debug!("location event for released handle {handle}"),
    }
}

/// Turn a failed JNI call into a [`LocationError`], clearing any pending
/// Java exception. `SecurityException` becomes a security fault.
fn java_failure(env: &mut JNIEnv<'_>, err: jni::errors::Error) -> LocationError {
    if !matches!(err, jni::errors::Error::JavaException) {
        return map_jni_error(err);
    }

    let Ok(throwable) = env.exception_occurred() else {
        return map_jni_error(err);
    };
    let _ = env.exception_clear();

    let message = throwable_message(env, &throwable).unwrap_or_else(|| err.to_string());
    let is_security = env
        .is_instance_of(&throwable, "java/lang/SecurityException")
        .unwrap_or(false);

    if is_security {
        LocationError::SecurityFault { message }
    } else {
        LocationError::Platform { message }
    }
}

fn throwable_message(env: &mut JNIEnv<'_>, throwable: &JThrowable<'_>) -> Option<String> {
    let message = env
        .call_method(throwable, "getMessage", "()Ljava/lang/String;", &[])
        .and_then(|value| value.l());
    let message = match message {
        Ok(message) if !message.is_null() => JString::from(message),
        _ => {
            let _ = env.exception_clear();
            return None;
        }
    };
    env.get_string(&message).ok().map(Into::into)
}

#[allow(clippy::needless_pass_by_value)]
fn map_jni_error(err: jni::errors::Error) -> LocationError {
    LocationError::Platform {
        message: err.to_string(),
    }
}
