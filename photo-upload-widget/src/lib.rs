//! # Photo Upload Widget
//!
//! A button that lets the user pick a photo, resizes it and hands the result
//! back as a file reference plus base64 data.
//!
//! One activation runs a linear pipeline:
//! 1. show the platform picker
//! 2. resize the picked bytes to the configured size, format and quality
//! 3. read the resized file back as base64
//! 4. remember the new display source and call `on_photo_select`
//!
//! The picker, resizer and file reader are traits so apps and tests can swap
//! them out. The Dioxus component lives behind the `components` feature.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use photo_upload_widget::{PhotoServices, PhotoUploadWidget, WidgetConfig};
//!
//! let mut widget = PhotoUploadWidget::new(
//!     WidgetConfig::default(),
//!     PhotoServices::platform_default("/path/to/cache/images"),
//! )
//! .on_photo_select(|selection| println!("{} bytes of base64", selection.data().len()));
//!
//! widget.activate().await;
//! ```

pub mod file_reader;
pub mod models;
pub mod picker;
pub mod pipeline;
pub mod platform;
pub mod resizer;
pub mod theme;
pub mod widget;

#[cfg(feature = "components")]
pub mod components;

#[cfg(test)]
mod testing;

pub use file_reader::{Encoding, FileReader, FsFileReader, ReadError};
pub use models::{
    CallbackContract, CustomButton, DisplaySource, FloatContent, ImageFormat, PhotoSelection,
    PickerOptions, PickerResult, ResizeRequest, ResizedImage, SelectedImage, StorageOptions,
    UploadPayload, WidgetConfig, WidgetVariant,
};
pub use picker::{platform_picker, AndroidPickerConfig, ImagePicker, PickerError};
pub use pipeline::{
    PhotoPipeline, PhotoServices, PipelineError, PipelineOutcome, PipelineState, PipelineSuccess,
};
pub use platform::{resolve_read_path, Platform};
pub use resizer::{ImageCrateResizer, ImageResizer, ResizeError};
pub use theme::Theme;
pub use widget::{apply_outcome, ButtonContent, OutcomeSink, PhotoUploadWidget};

#[cfg(feature = "components")]
pub use components::{use_display_source, PhotoPreview, PhotoUpload};
