// Platform detection and the Android file reference fix-up.

/// Prefix the Android resizer puts in front of app-private files
const ANDROID_FILE_PREFIX: &str = "file:/data";
const ANDROID_DATA_PREFIX: &str = "/data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Android,
    Ios,
    Desktop,
    Web,
}

impl Platform {
    /// Platform the crate was compiled for
    pub fn current() -> Self {
        if cfg!(target_os = "android") {
            Platform::Android
        } else if cfg!(target_os = "ios") {
            Platform::Ios
        } else if cfg!(target_arch = "wasm32") {
            Platform::Web
        } else {
            Platform::Desktop
        }
    }

    pub fn is_android(&self) -> bool {
        matches!(self, Platform::Android)
    }
}

/// Returns the path the file reader should open for a resized image.
///
/// On Android `file:/data/...` becomes `/data/...`. Every other input is
/// returned unchanged, so applying it twice gives the same result.
pub fn resolve_read_path(platform: Platform, uri: &str) -> String {
    if platform.is_android() && uri.starts_with(ANDROID_FILE_PREFIX) {
        uri.replacen(ANDROID_FILE_PREFIX, ANDROID_DATA_PREFIX, 1)
    } else {
        uri.to_string()
    }
}
