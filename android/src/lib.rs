//! JNI entry points for `com.gpsview.GpsActivity`.
//!
//! This crate is only compiled for Android targets.
//! To build: cargo ndk -t arm64-v8a build -p gpsview-android
//!
//! The activity keeps the `long` returned by `nativeCreate` and passes it to
//! every other native call. `nativeDestroy` releases it; the activity must
//! zero its copy afterwards. `requestUiDrain()` is expected to post
//! `nativeDrainUi(handle)` to the main looper rather than run it inline.

#![cfg(target_os = "android")]
#![allow(non_snake_case)]

mod view;

use std::sync::Arc;

use gpsview_location::LocationBackend;
use gpsview_location::sys::android::AndroidLocationBackend;
use gpsview_permission::sys::android::AndroidPermissionHost;
use gpsview_permission::{GrantResult, PermissionGate};
use gpsview_presenter::{Dialog, LocationScreen, QueuedUiThread};
use jni::JNIEnv;
use jni::objects::{JIntArray, JObject};
use jni::sys::{jint, jlong};
use log::{LevelFilter, debug, error, warn};

use crate::view::ActivityView;

struct NativeScreen {
    screen: LocationScreen,
    ui: Arc<QueuedUiThread>,
}

fn init_logging() {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("gpsview"),
    );
}

fn create_screen(env: &mut JNIEnv<'_>, activity: &JObject<'_>) -> Option<NativeScreen> {
    let host = match AndroidPermissionHost::new(env, activity) {
        Ok(host) => host,
        Err(err) => {
            error!("failed to create permission host: {err}");
            return None;
        }
    };

    let backend: Option<Arc<dyn LocationBackend>> =
        match AndroidLocationBackend::new(env, activity) {
            Ok(backend) => Some(Arc::new(backend)),
            Err(err) => {
                warn!("location manager unavailable: {err}");
                None
            }
        };

    let view = match ActivityView::new(env, activity) {
        Ok(view) => Arc::new(view),
        Err(err) => {
            error!("failed to bind GpsActivity: {err}");
            return None;
        }
    };

    let ui = {
        let view = view.clone();
        Arc::new(QueuedUiThread::with_waker(move || view.request_drain()))
    };

    let screen = LocationScreen::new(
        PermissionGate::new(Arc::new(host)),
        backend,
        view,
        ui.clone(),
    );
    Some(NativeScreen { screen, ui })
}

/// Borrow the screen behind `handle`.
///
/// # Safety
/// `handle` must be zero or a value returned by `nativeCreate` that has not
/// been passed to `nativeDestroy`, and calls must come from the UI thread.
unsafe fn native_screen<'a>(handle: jlong) -> Option<&'a mut NativeScreen> {
    if handle == 0 {
        debug!("native call with released handle");
        return None;
    }
    // SAFETY: upheld by the caller.
    unsafe { (handle as *mut NativeScreen).as_mut() }
}

/// Build the screen for `activity` and run its create step.
/// Returns `0` if the screen could not be built.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_gpsview_GpsActivity_nativeCreate(
    mut env: JNIEnv,
    activity: JObject,
) -> jlong {
    init_logging();

    let Some(native) = create_screen(&mut env, &activity) else {
        return 0;
    };
    let native = Box::into_raw(Box::new(native));
    // SAFETY: freshly allocated above.
    unsafe { (*native).screen.on_create() };
    native as jlong
}

/// Start button.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_gpsview_GpsActivity_nativeStartClicked(
    _env: JNIEnv,
    _activity: JObject,
    handle: jlong,
) {
    // SAFETY: the activity passes the handle it got from `nativeCreate`.
    if let Some(native) = unsafe { native_screen(handle) } {
        native.screen.on_start_clicked();
    }
}

/// Stop button.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_gpsview_GpsActivity_nativeStopClicked(
    _env: JNIEnv,
    _activity: JObject,
    handle: jlong,
) {
    // SAFETY: as above.
    if let Some(native) = unsafe { native_screen(handle) } {
        native.screen.on_stop_clicked();
    }
}

/// Forwarded from `onRequestPermissionsResult`.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_gpsview_GpsActivity_nativePermissionResult(
    env: JNIEnv,
    _activity: JObject,
    handle: jlong,
    request_code: jint,
    grant_results: JIntArray,
) {
    let codes = match read_int_array(&env, &grant_results) {
        Ok(codes) => codes,
        Err(err) => {
            error!("failed to read grant results: {err}");
            Vec::new()
        }
    };
    let results: Vec<GrantResult> = codes.into_iter().map(GrantResult::from_code).collect();

    // SAFETY: as above.
    if let Some(native) = unsafe { native_screen(handle) } {
        native.screen.on_permission_result(request_code, &results);
    }
}

/// Forwarded from `onActivityResult`.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_gpsview_GpsActivity_nativeActivityResult(
    _env: JNIEnv,
    _activity: JObject,
    handle: jlong,
    request_code: jint,
) {
    // SAFETY: as above.
    if let Some(native) = unsafe { native_screen(handle) } {
        native.screen.on_activity_result(request_code);
    }
}

/// Confirm button of the dialog shown through `presentDialog(int)`.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_gpsview_GpsActivity_nativeDialogConfirmed(
    _env: JNIEnv,
    _activity: JObject,
    handle: jlong,
    dialog: jint,
) {
    let Some(dialog) = Dialog::from_index(dialog) else {
        warn!("unknown dialog index {dialog}");
        return;
    };
    // SAFETY: as above.
    if let Some(native) = unsafe { native_screen(handle) } {
        native.screen.on_dialog_confirmed(dialog);
    }
}

/// Run pending view updates. Must be called on the main looper.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_gpsview_GpsActivity_nativeDrainUi(
    _env: JNIEnv,
    _activity: JObject,
    handle: jlong,
) {
    // SAFETY: as above.
    if let Some(native) = unsafe { native_screen(handle) } {
        native.ui.drain();
    }
}

/// Stop updates and release the handle.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_gpsview_GpsActivity_nativeDestroy(
    _env: JNIEnv,
    _activity: JObject,
    handle: jlong,
) {
    if handle == 0 {
        return;
    }
    // SAFETY: the handle came from `Box::into_raw` in `nativeCreate` and is
    // released exactly once here.
    let mut native = unsafe { Box::from_raw(handle as *mut NativeScreen) };
    native.screen.on_destroy();
    let dropped = native.ui.drain();
    debug!("screen destroyed, {dropped} pending UI tasks flushed");
}

fn read_int_array(env: &JNIEnv<'_>, array: &JIntArray<'_>) -> jni::errors::Result<Vec<i32>> {
    if array.is_null() {
        return Ok(Vec::new());
    }
    let len = env.get_array_length(array)?;
    let mut values = vec![0; usize::try_from(len).unwrap_or(0)];
    env.get_int_array_region(array, 0, &mut values)?;
    Ok(values)
}
