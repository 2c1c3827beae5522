use crate::error::AppError;
use photo_upload_widget::models::DEFAULT_STORAGE_PATH;
use photo_upload_widget::WidgetConfig;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "photo-upload.toml";

#[cfg(target_os = "android")]
fn android_files_dir() -> Option<PathBuf> {
    use jni::{objects::{JObject, JString}, JavaVM};
    unsafe {
        let ctx = ndk_context::android_context();
        let vm = JavaVM::from_raw(ctx.vm().cast()).ok()?;
        let mut env = vm.attach_current_thread().ok()?; // mutable for JNI calls
        let activity = JObject::from_raw(ctx.context().cast());
        let files_dir = env
            .call_method(activity, "getFilesDir", "()Ljava/io/File;", &[])
            .ok()?
            .l()
            .ok()?;
        let abs_path_obj = env
            .call_method(files_dir, "getAbsolutePath", "()Ljava/lang/String;", &[])
            .ok()?
            .l()
            .ok()?;
        let abs_path_jstring: JString = JString::from(abs_path_obj);
        let abs_path: String = env.get_string(&abs_path_jstring).ok()?.into();
        Some(PathBuf::from(abs_path))
    }
}

/// Get the app data directory for the current platform
pub fn get_app_data_dir() -> PathBuf {
    #[cfg(target_os = "android")]
    {
        if let Some(dir) = android_files_dir() { return dir; }
        // Fallbacks
        for d in [
            "/data/user/0/de.teilgedanken.photoupload/files",
            "/data/data/de.teilgedanken.photoupload/files",
        ] {
            let p = PathBuf::from(d);
            if p.exists() { return p; }
        }
        PathBuf::from("./data")
    }

    #[cfg(not(target_os = "android"))]
    {
        // On desktop, use ./data directory
        PathBuf::from("./data")
    }
}

/// Directory resized photos are written to
pub fn images_dir() -> PathBuf {
    get_app_data_dir().join(DEFAULT_STORAGE_PATH)
}

/// Loads the widget config from `dir`, falling back to defaults when the file is missing
pub fn load_widget_config_from(dir: &Path) -> Result<WidgetConfig, AppError> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        log::debug!("No config at {:?}, using defaults", path);
        return Ok(WidgetConfig::default());
    }

    let content = fs::read_to_string(&path)?;
    let config = WidgetConfig::from_toml(&content)?;
    config.validate().map_err(AppError::Validation)?;
    log::info!("Loaded widget config from {:?}", path);
    Ok(config)
}

pub fn save_widget_config_to(dir: &Path, config: &WidgetConfig) -> Result<PathBuf, AppError> {
    config.validate().map_err(AppError::Validation)?;
    fs::create_dir_all(dir)?;
    let path = dir.join(CONFIG_FILE_NAME);
    fs::write(&path, config.to_toml()?)?;
    Ok(path)
}

/// Like [`load_widget_config_from`], but writes the defaults to `dir` on first
/// run so they can be edited afterwards
pub fn load_or_init_widget_config(dir: &Path) -> Result<WidgetConfig, AppError> {
    if dir.join(CONFIG_FILE_NAME).exists() {
        return load_widget_config_from(dir);
    }
    let config = WidgetConfig::default();
    let path = save_widget_config_to(dir, &config)?;
    log::info!("Wrote default widget config to {:?}", path);
    Ok(config)
}

/// Widget config of this device; broken files are logged and replaced by defaults
pub fn load_widget_config() -> WidgetConfig {
    match load_or_init_widget_config(&get_app_data_dir()) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{}; {}", e, e.user_message());
            WidgetConfig::default()
        }
    }
}
