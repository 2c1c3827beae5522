use dioxus::prelude::*;
use dioxus_i18n::t;
use photo_upload_widget::{
    CallbackContract, FloatContent, PhotoPreview, PhotoSelection, PhotoUpload, PipelineError,
    UploadPayload, WidgetConfig,
};

use crate::error::AppError;

/// Summary of the last photo for display
#[derive(Clone, PartialEq, Debug)]
struct LastPhoto {
    name: String,
    width: u32,
    height: u32,
    size: u64,
    data_url: String,
}

impl LastPhoto {
    fn from_selection(selection: &PhotoSelection) -> Option<Self> {
        match selection {
            PhotoSelection::V2(UploadPayload {
                name,
                width,
                height,
                size,
                uri,
                ..
            }) => Some(Self {
                name: name.clone(),
                width: *width,
                height: *height,
                size: *size,
                data_url: uri.clone(),
            }),
            // positional payload carries no resized metadata
            PhotoSelection::V1 { .. } => None,
        }
    }
}

/// The avatar button shows its preview inside the button and always wants the
/// structured payload; size, format and quality follow the loaded config.
fn avatar_config(config: &WidgetConfig) -> WidgetConfig {
    WidgetConfig {
        float_content: FloatContent::Children,
        callback_contract: CallbackContract::V2,
        ..config.clone()
    }
}

#[component]
pub fn UploadScreen(config: WidgetConfig) -> Element {
    let avatar = avatar_config(&config);
    let mut last_photo = use_signal(|| None::<LastPhoto>);
    let mut error = use_signal(|| None::<String>);

    let mut handle_selection = move |selection: PhotoSelection| {
        log::info!("Photo selected ({} base64 chars)", selection.data().len());
        error.set(None);
        if let Some(photo) = LastPhoto::from_selection(&selection) {
            last_photo.set(Some(photo));
        }
    };
    let mut handle_error = move |e: PipelineError| {
        let err = AppError::from(e);
        log::error!("{}", err);
        error.set(Some(t!("error-photo", error: err.user_message())));
    };

    rsx! {
        div { style: "padding: 16px; max-width: 600px; margin: 0 auto;",

            if let Some(err) = error() {
                div { style: "background: #fee; border: 1px solid #fcc; color: #c33; padding: 12px; margin-bottom: 16px; border-radius: 8px; font-size: 14px;",
                    "⚠️ {err}"
                }
            }

            div { class: "card",
                h2 { style: "font-size: 18px; margin: 0 0 8px 0;", {t!("upload-avatar-title")} }
                p { style: "color: #666; font-size: 13px; margin: 0 0 72px 0;", {t!("upload-avatar-hint")} }
                PhotoUpload {
                    picker_title: avatar.picker_title.clone(),
                    height: avatar.height,
                    width: avatar.width,
                    format: avatar.format,
                    quality: avatar.quality,
                    float_content: avatar.float_content,
                    callback_contract: avatar.callback_contract,
                    on_photo_select: move |s: PhotoSelection| handle_selection(s),
                    on_error: move |e: PipelineError| handle_error(e),
                    PhotoPreview { alt: "Profile photo" }
                }
            }

            div { class: "card",
                h2 { style: "font-size: 18px; margin: 0 0 8px 0;", {t!("upload-laugh-title")} }
                p { style: "color: #666; font-size: 13px; margin: 0 0 12px 0;", {t!("upload-laugh-hint")} }
                PhotoUpload {
                    picker_title: config.picker_title.clone(),
                    height: config.height,
                    width: config.width,
                    format: config.format,
                    quality: config.quality,
                    normal_button: true,
                    callback_contract: config.callback_contract,
                    on_photo_select: move |s: PhotoSelection| handle_selection(s),
                    on_error: move |e: PipelineError| handle_error(e),
                }
            }

            div { class: "card",
                h2 { style: "font-size: 18px; margin: 0 0 8px 0;", {t!("upload-last-result")} }
                if let Some(photo) = last_photo() {
                    div { style: "display: flex; gap: 12px; align-items: center;",
                        img {
                            src: "{photo.data_url}",
                            style: "width: 96px; height: 96px; object-fit: cover; border-radius: 8px;",
                        }
                        div { style: "font-size: 13px; color: #333;",
                            div { {t!("upload-file-name", name: photo.name.clone())} }
                            div { {t!("upload-dimensions", width: photo.width, height: photo.height)} }
                            div { {t!("upload-file-size", size: photo.size)} }
                        }
                    }
                } else {
                    div { style: "width: 100%; height: 96px; border: 2px dashed #ccc; border-radius: 8px; display: flex; align-items: center; justify-content: center; color: #999; font-size: 14px;",
                        {t!("upload-none-selected")}
                    }
                }
            }
        }
    }
}
