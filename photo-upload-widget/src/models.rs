use serde::{Deserialize, Serialize};

/// Default title shown by the platform picker
pub const DEFAULT_PICKER_TITLE: &str = "Select Photo";
/// Default label of the rectangular button
pub const DEFAULT_BUTTON_LABEL: &str = "Create Laugh";
/// Sub-directory the picker stores captured photos in
pub const DEFAULT_STORAGE_PATH: &str = "images";

/// Output format of the resize step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImageFormat {
    #[default]
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageFormat::Jpeg => write!(f, "JPEG"),
            ImageFormat::Png => write!(f, "PNG"),
        }
    }
}

/// Known deployments of the widget, differing in their defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetVariant {
    /// 300x300 target, fixed icon on the floating button, positional payload
    #[default]
    Classic,
    /// 300x400 target, children on the floating button, structured payload
    Wide,
}

/// Shape of the value handed to `on_photo_select`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallbackContract {
    /// Base64 data plus the original picker selection
    V1,
    /// Structured [`UploadPayload`]
    #[default]
    V2,
}

/// What the floating (non-`normal_button`) control shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatContent {
    #[default]
    Icon,
    Children,
}

/// Construction-time configuration of the widget
///
/// Immutable once the widget is built. Every field has a default so partial
/// TOML files are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub picker_title: String,
    pub height: u32,
    pub width: u32,
    pub format: ImageFormat,
    pub quality: u8,
    pub callback_contract: CallbackContract,
    pub float_content: FloatContent,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            picker_title: DEFAULT_PICKER_TITLE.to_string(),
            height: 300,
            width: 300,
            format: ImageFormat::Jpeg,
            quality: 80,
            callback_contract: CallbackContract::V2,
            float_content: FloatContent::Icon,
        }
    }
}

impl WidgetConfig {
    /// Defaults of one of the known deployments
    pub fn for_variant(variant: WidgetVariant) -> Self {
        match variant {
            WidgetVariant::Classic => Self {
                callback_contract: CallbackContract::V1,
                ..Self::default()
            },
            WidgetVariant::Wide => Self {
                width: 400,
                callback_contract: CallbackContract::V2,
                float_content: FloatContent::Children,
                ..Self::default()
            },
        }
    }

    /// Checks the value ranges the resizer relies on
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!(
                "target size must be non-zero, got {}x{}",
                self.width, self.height
            ));
        }
        if self.quality > 100 {
            return Err(format!("quality must be 0-100, got {}", self.quality));
        }
        Ok(())
    }

    pub fn picker_options(&self) -> PickerOptions {
        PickerOptions {
            title: self.picker_title.clone(),
            ..PickerOptions::default()
        }
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}

/// Where the picker keeps photos it captures itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageOptions {
    pub skip_backup: bool,
    pub path: String,
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self {
            skip_backup: true,
            path: DEFAULT_STORAGE_PATH.to_string(),
        }
    }
}

/// An extra button offered by the picker dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomButton {
    pub name: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickerOptions {
    pub title: String,
    pub storage: StorageOptions,
    pub custom_buttons: Vec<CustomButton>,
}

impl Default for PickerOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_PICKER_TITLE.to_string(),
            storage: StorageOptions::default(),
            custom_buttons: Vec::new(),
        }
    }
}

/// Photo returned by the picker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedImage {
    /// Base64 of the original file bytes
    pub data: String,
    pub width: u32,
    pub height: u32,
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Outcome of one picker invocation
#[derive(Debug, Clone, PartialEq)]
pub enum PickerResult {
    Cancelled,
    Error(String),
    CustomButtonTapped(String),
    Selected(SelectedImage),
}

/// Parameters handed to the resizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeRequest {
    pub data_uri: String,
    pub height: u32,
    pub width: u32,
    pub format: ImageFormat,
    pub quality: u8,
}

/// File written by the resizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizedImage {
    /// Local file reference, usually a `file:` URI
    pub uri: String,
    pub width: u32,
    pub height: u32,
    pub name: String,
    pub size: u64,
}

/// Reference the widget keeps to re-render the chosen photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySource {
    pub uri: String,
}

/// Structured result of a successful run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPayload {
    /// Data URI of the resized image
    pub uri: String,
    pub width: u32,
    pub height: u32,
    /// Base64 of the resized file
    pub data: String,
    pub mime_type: String,
    pub name: String,
    /// Resized file reference as returned by the resizer
    pub path: String,
    pub size: u64,
}

/// Value passed to `on_photo_select`, versioned by [`CallbackContract`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "version", rename_all = "lowercase")]
pub enum PhotoSelection {
    V1 {
        data: String,
        response: SelectedImage,
    },
    V2(UploadPayload),
}

impl PhotoSelection {
    /// Base64 of the resized image, whatever the contract
    pub fn data(&self) -> &str {
        match self {
            PhotoSelection::V1 { data, .. } => data,
            PhotoSelection::V2(payload) => &payload.data,
        }
    }

    /// JSON form for hosts that forward the selection to a webview
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
