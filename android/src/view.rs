//! [`ScreenView`] backed by the hosting `GpsActivity`.

use std::fmt;

use gpsview_presenter::{Dialog, Field, ScreenView};
use jni::objects::{GlobalRef, JObject, JValue};
use jni::{JNIEnv, JavaVM};
use log::error;

/// Calls the widget methods of the activity.
///
/// The activity is expected to implement `renderField(int, String)`,
/// `renderStatus(String)`, `renderButtons(boolean, boolean)`,
/// `presentDialog(int)`, `showToast(String)` and `requestUiDrain()`.
pub struct ActivityView {
    vm: JavaVM,
    activity: GlobalRef,
}

impl fmt::Debug for ActivityView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityView").finish_non_exhaustive()
    }
}

impl ActivityView {
    pub fn new(env: &mut JNIEnv<'_>, activity: &JObject<'_>) -> jni::errors::Result<Self> {
        Ok(Self {
            vm: env.get_java_vm()?,
            activity: env.new_global_ref(activity)?,
        })
    }

    /// Ask the activity to call `nativeDrainUi` from its main looper.
    pub fn request_drain(&self) {
        self.call("requestUiDrain", |env, activity| {
            env.call_method(activity, "requestUiDrain", "()V", &[])?;
            Ok(())
        });
    }

    fn call<F>(&self, method: &str, action: F)
    where
        F: FnOnce(&mut JNIEnv<'_>, &JObject<'_>) -> jni::errors::Result<()>,
    {
        let mut env = match self.vm.attach_current_thread() {
            Ok(env) => env,
            Err(err) => {
                error!("cannot attach thread for {method}: {err}");
                return;
            }
        };

        if let Err(err) = action(&mut env, self.activity.as_obj()) {
            if env.exception_check().unwrap_or(false) {
                let _ = env.exception_describe();
                let _ = env.exception_clear();
            }
            error!("GpsActivity.{method} failed: {err}");
        }
    }

    fn call_with_text(&self, method: &str, sig: &str, int_arg: Option<i32>, text: &str) {
        self.call(method, |env, activity| {
            let text = env.new_string(text)?;
            match int_arg {
                Some(value) => env.call_method(
                    activity,
                    method,
                    sig,
                    &[JValue::Int(value), JValue::Object(&text)],
                )?,
                None => env.call_method(activity, method, sig, &[JValue::Object(&text)])?,
            };
            Ok(())
        });
    }
}

impl ScreenView for ActivityView {
    fn render_field(&self, field: Field, text: &str) {
        self.call_with_text(
            "renderField",
            "(ILjava/lang/String;)V",
            Some(field.index()),
            text,
        );
    }

    fn render_status(&self, text: &str) {
        self.call_with_text("renderStatus", "(Ljava/lang/String;)V", None, text);
    }

    fn render_buttons(&self, start_enabled: bool, stop_enabled: bool) {
        self.call("renderButtons", |env, activity| {
            env.call_method(
                activity,
                "renderButtons",
                "(ZZ)V",
                &[JValue::Bool(start_enabled.into()), JValue::Bool(stop_enabled.into())],
            )?;
            Ok(())
        });
    }

    fn show_dialog(&self, dialog: Dialog) {
        self.call("presentDialog", |env, activity| {
            env.call_method(activity, "presentDialog", "(I)V", &[JValue::Int(dialog.index())])?;
            Ok(())
        });
    }

    fn show_toast(&self, text: &str) {
        self.call_with_text("showToast", "(Ljava/lang/String;)V", None, text);
    }
}
