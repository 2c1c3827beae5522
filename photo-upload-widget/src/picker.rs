// Platform-specific image picker implementation
//
// Android goes through JNI to the host MainActivity, desktop uses a native file
// dialog, every other target reports that no picker is available.

use crate::models::{PickerOptions, PickerResult, SelectedImage};
use base64::Engine;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum PickerError {
    PermissionDenied(String),
    Timeout(String),
    PlatformNotSupported(String),
    Io(String),
    Other(String),
}

impl std::fmt::Display for PickerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PickerError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            PickerError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            PickerError::PlatformNotSupported(msg) => write!(f, "Platform not supported: {}", msg),
            PickerError::Io(msg) => write!(f, "IO error: {}", msg),
            PickerError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for PickerError {}

/// Native photo-selection dialog.
///
/// Implementations block until the user made a choice; callers are expected
/// to run them off the UI thread.
pub trait ImagePicker: Send + Sync {
    fn show(&self, options: &PickerOptions) -> PickerResult;
}

/// Picker for the platform the crate was compiled for
pub fn platform_picker() -> Arc<dyn ImagePicker> {
    #[cfg(target_os = "android")]
    {
        Arc::new(AndroidImagePicker::default())
    }
    #[cfg(not(any(target_os = "android", target_os = "ios", target_arch = "wasm32")))]
    {
        Arc::new(DesktopImagePicker)
    }
    #[cfg(any(target_os = "ios", target_arch = "wasm32"))]
    {
        Arc::new(UnsupportedPicker)
    }
}

/// Guesses a MIME type from the file extension
pub fn guess_mime_from_ext(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("heic") | Some("heif") => "image/heic",
        _ => "image/jpeg",
    }
}

/// Loads a picked file into a [`SelectedImage`]
pub fn load_selected_image(path: &Path) -> Result<SelectedImage, PickerError> {
    let bytes = std::fs::read(path)
        .map_err(|e| PickerError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    let (width, height) = image::ImageReader::new(std::io::Cursor::new(&bytes))
        .with_guessed_format()
        .map_err(|e| PickerError::Io(format!("Failed to sniff format: {}", e)))?
        .into_dimensions()
        .map_err(|e| PickerError::Other(format!("Unreadable image {}: {}", path.display(), e)))?;

    log::debug!(
        "Loaded picked image {:?} ({}x{}, {} bytes)",
        path,
        width,
        height,
        bytes.len()
    );

    Ok(SelectedImage {
        data: base64::engine::general_purpose::STANDARD.encode(&bytes),
        width,
        height,
        mime_type: guess_mime_from_ext(path).to_string(),
        file_name: path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|s| s.to_string()),
        path: Some(path.to_string_lossy().to_string()),
    })
}

fn result_from_path(path: &Path) -> PickerResult {
    match load_selected_image(path) {
        Ok(selected) => PickerResult::Selected(selected),
        Err(e) => PickerResult::Error(e.to_string()),
    }
}

/// Picker used where no native dialog is wired up
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedPicker;

impl ImagePicker for UnsupportedPicker {
    fn show(&self, _options: &PickerOptions) -> PickerResult {
        PickerResult::Error(
            PickerError::PlatformNotSupported(
                "Image picker not available on this platform".to_string(),
            )
            .to_string(),
        )
    }
}

/// Native file dialog on desktop targets
#[cfg(not(any(target_os = "android", target_os = "ios", target_arch = "wasm32")))]
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopImagePicker;

#[cfg(not(any(target_os = "android", target_os = "ios", target_arch = "wasm32")))]
impl ImagePicker for DesktopImagePicker {
    fn show(&self, options: &PickerOptions) -> PickerResult {
        if !options.custom_buttons.is_empty() {
            log::debug!("Custom picker buttons are not shown by the desktop dialog");
        }
        let picked = rfd::FileDialog::new()
            .set_title(&options.title)
            .add_filter("images", &["png", "jpg", "jpeg", "webp"])
            .pick_file();
        match picked {
            Some(path) => result_from_path(&path),
            None => PickerResult::Cancelled,
        }
    }
}

// Android-specific constants and helper functions
const DEFAULT_MAIN_ACTIVITY_CLASS: &str = "dev/dioxus/main/MainActivity";
/// Error string the activity reports when the user backs out of the picker
pub const ANDROID_CANCELLED_MARKER: &str = "cancelled";

/// Configuration for the picker on Android
///
/// The host activity must provide `launchImagePicker(String, boolean, String,
/// String)` plus the static `clearLastError`, `getLastPhotoPath`,
/// `getLastCustomButton` and `getLastError` accessors.
#[derive(Debug, Clone)]
pub struct AndroidPickerConfig {
    /// Fully qualified class name in slash format (e.g., "com/example/myapp/MainActivity")
    pub main_activity_class: String,
}

impl Default for AndroidPickerConfig {
    fn default() -> Self {
        Self {
            main_activity_class: DEFAULT_MAIN_ACTIVITY_CLASS.to_string(),
        }
    }
}

/// Encodes custom buttons as `name\ttitle` lines for the activity
pub fn encode_custom_buttons(options: &PickerOptions) -> String {
    options
        .custom_buttons
        .iter()
        .map(|b| format!("{}\t{}", b.name, b.title))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Maps the activity's error string onto a picker result
pub fn classify_android_error(err: &str) -> PickerResult {
    if err.trim().eq_ignore_ascii_case(ANDROID_CANCELLED_MARKER) {
        PickerResult::Cancelled
    } else {
        PickerResult::Error(err.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct AndroidImagePicker {
    pub config: AndroidPickerConfig,
}

#[cfg(target_os = "android")]
impl ImagePicker for AndroidImagePicker {
    fn show(&self, options: &PickerOptions) -> PickerResult {
        match android::pick(&self.config, options) {
            Ok(result) => result,
            Err(e) => PickerResult::Error(e.to_string()),
        }
    }
}

#[cfg(not(target_os = "android"))]
impl ImagePicker for AndroidImagePicker {
    fn show(&self, options: &PickerOptions) -> PickerResult {
        UnsupportedPicker.show(options)
    }
}

#[cfg(target_os = "android")]
mod android {
    use super::*;
    use jni::objects::{JClass, JObject, JString, JValue};
    use ndk_context::android_context;
    use std::path::PathBuf;

    /// Poll attempts at 100ms each
    const ANDROID_POLL_ATTEMPTS: u32 = 600;

    fn jni_err(what: &str) -> impl Fn(jni::errors::Error) -> PickerError + '_ {
        move |e| PickerError::PermissionDenied(format!("{} failed: {}", what, e))
    }

    fn get_app_class_loader<'a>(env: &mut jni::JNIEnv<'a>) -> Result<JObject<'a>, PickerError> {
        let at_cls = env
            .find_class("android/app/ActivityThread")
            .map_err(jni_err("ActivityThread lookup"))?;
        let at = env
            .call_static_method(
                &at_cls,
                "currentActivityThread",
                "()Landroid/app/ActivityThread;",
                &[],
            )
            .map_err(jni_err("currentActivityThread"))?
            .l()
            .map_err(jni_err("currentActivityThread result"))?;

        // Prefer application class loader
        let app = env
            .call_method(&at, "getApplication", "()Landroid/app/Application;", &[])
            .map_err(jni_err("getApplication"))?
            .l()
            .map_err(jni_err("getApplication result"))?;

        let ctx = if app.is_null() {
            env.call_method(&at, "getSystemContext", "()Landroid/app/ContextImpl;", &[])
                .map_err(jni_err("getSystemContext"))?
                .l()
                .map_err(jni_err("getSystemContext result"))?
        } else {
            app
        };

        env.call_method(&ctx, "getClassLoader", "()Ljava/lang/ClassLoader;", &[])
            .map_err(jni_err("getClassLoader"))?
            .l()
            .map_err(jni_err("getClassLoader result"))
    }

    fn load_class<'a>(
        env: &mut jni::JNIEnv<'a>,
        loader: &JObject<'a>,
        fq_slash: &str,
    ) -> Result<JClass<'a>, PickerError> {
        // dev/dioxus/main/MainActivity -> dev.dioxus.main.MainActivity for ClassLoader.loadClass
        let name: JString = env
            .new_string(fq_slash.replace('/', "."))
            .map_err(jni_err("new_string"))?;
        let cls_obj = env
            .call_method(
                loader,
                "loadClass",
                "(Ljava/lang/String;)Ljava/lang/Class;",
                &[JValue::Object(&JObject::from(name))],
            )
            .map_err(jni_err("ClassLoader.loadClass"))?
            .l()
            .map_err(jni_err("loadClass result"))?;
        Ok(JClass::from(cls_obj))
    }

    fn get_activity_instance<'a>(
        env: &mut jni::JNIEnv<'a>,
        config: &AndroidPickerConfig,
    ) -> Result<(JObject<'a>, JClass<'a>), PickerError> {
        let loader = get_app_class_loader(env)?;
        let cls = load_class(env, &loader, &config.main_activity_class)?;
        let signature = format!("()L{};", config.main_activity_class);

        // `@JvmStatic getInstance()` first, then the Kotlin companion object
        let instance = match env.call_static_method(&cls, "getInstance", &signature, &[]) {
            Ok(val) => val.l().map_err(jni_err("getInstance result"))?,
            Err(_) => {
                if env.exception_check().unwrap_or(false) {
                    let _ = env.exception_clear();
                }
                let comp_signature = format!("L{}$Companion;", config.main_activity_class);
                let comp_obj = env
                    .get_static_field(&cls, "Companion", &comp_signature)
                    .map_err(jni_err("Companion field"))?
                    .l()
                    .map_err(jni_err("Companion field value"))?;
                if comp_obj.is_null() {
                    return Err(PickerError::PermissionDenied(
                        "MainActivity.Companion is null, activity not initialized?".to_string(),
                    ));
                }
                env.call_method(&comp_obj, "getInstance", &signature, &[])
                    .map_err(jni_err("Companion.getInstance"))?
                    .l()
                    .map_err(jni_err("Companion.getInstance result"))?
            }
        };

        if instance.is_null() {
            return Err(PickerError::PermissionDenied(
                "MainActivity instance is null - Activity not initialized?".to_string(),
            ));
        }

        Ok((instance, cls))
    }

    fn poll_string(
        env: &mut jni::JNIEnv<'_>,
        cls: &JClass<'_>,
        getter: &str,
    ) -> Result<Option<String>, PickerError> {
        let Ok(result) = env.call_static_method(cls, getter, "()Ljava/lang/String;", &[]) else {
            return Ok(None);
        };
        let Ok(obj) = result.l() else {
            return Ok(None);
        };
        if obj.is_null() {
            return Ok(None);
        }
        let value: String = env
            .get_string((&obj).into())
            .map_err(jni_err("String conversion"))?
            .into();
        Ok(Some(value))
    }

    pub(super) fn pick(
        config: &AndroidPickerConfig,
        options: &PickerOptions,
    ) -> Result<PickerResult, PickerError> {
        let vm_ptr = android_context().vm() as *mut *const jni::sys::JNIInvokeInterface_;
        let vm = unsafe { jni::JavaVM::from_raw(vm_ptr) }.map_err(jni_err("JavaVM"))?;
        let mut env = vm.attach_current_thread().map_err(jni_err("JNI attach"))?;

        let (activity, main_cls) = get_activity_instance(&mut env, config)?;

        env.call_static_method(&main_cls, "clearLastError", "()V", &[])
            .map_err(jni_err("clearLastError"))?;

        let title = JObject::from(env.new_string(&options.title).map_err(jni_err("new_string"))?);
        let path = JObject::from(
            env.new_string(&options.storage.path)
                .map_err(jni_err("new_string"))?,
        );
        let buttons = JObject::from(
            env.new_string(encode_custom_buttons(options))
                .map_err(jni_err("new_string"))?,
        );
        env.call_method(
            &activity,
            "launchImagePicker",
            "(Ljava/lang/String;ZLjava/lang/String;Ljava/lang/String;)V",
            &[
                JValue::Object(&title),
                JValue::Bool(options.storage.skip_backup as u8),
                JValue::Object(&path),
                JValue::Object(&buttons),
            ],
        )
        .map_err(jni_err("launchImagePicker"))?;

        for _ in 0..ANDROID_POLL_ATTEMPTS {
            std::thread::sleep(std::time::Duration::from_millis(100));

            if let Some(path) = poll_string(&mut env, &main_cls, "getLastPhotoPath")? {
                return Ok(result_from_path(&PathBuf::from(path)));
            }
            if let Some(button) = poll_string(&mut env, &main_cls, "getLastCustomButton")? {
                return Ok(PickerResult::CustomButtonTapped(button));
            }
            if let Some(err) = poll_string(&mut env, &main_cls, "getLastError")? {
                return Ok(classify_android_error(&err));
            }
        }

        Err(PickerError::Timeout(
            "Image picker timeout - no selection made".to_string(),
        ))
    }
}
