//! Dioxus UI components for the photo upload button
//!
//! `PhotoUpload` renders the tappable control and drives the pipeline.
//! `PhotoPreview` placed among its children shows the last chosen photo.

use crate::models::{
    CallbackContract, DisplaySource, FloatContent, ImageFormat, PhotoSelection, WidgetConfig,
    DEFAULT_BUTTON_LABEL, DEFAULT_PICKER_TITLE, DEFAULT_STORAGE_PATH,
};
use crate::pipeline::{PhotoPipeline, PhotoServices, PipelineError};
use crate::theme::Theme;
use crate::widget::{apply_outcome, ButtonContent, OutcomeSink};
use dioxus::prelude::*;

#[derive(Clone, Copy)]
struct PreviewContext {
    source: Signal<Option<DisplaySource>>,
    data_url: Signal<Option<String>>,
}

/// Routes a finished run into the component's signals and handlers
struct ComponentSink {
    preview: PreviewContext,
    busy: Signal<bool>,
    on_photo_select: Option<EventHandler<PhotoSelection>>,
    on_error: Option<EventHandler<PipelineError>>,
}

impl OutcomeSink for ComponentSink {
    fn display(&mut self, source: DisplaySource, data_url: String) {
        self.preview.source.set(Some(source));
        self.preview.data_url.set(Some(data_url));
    }

    fn photo_selected(&mut self, selection: PhotoSelection) {
        if let Some(handler) = &self.on_photo_select {
            handler.call(selection);
        }
    }

    fn failed(&mut self, error: &PipelineError) {
        if let Some(handler) = &self.on_error {
            handler.call(error.clone());
        }
    }

    fn finished(&mut self) {
        self.busy.set(false);
    }
}

/// Last photo chosen through the enclosing [`PhotoUpload`], if any
pub fn use_display_source() -> Option<DisplaySource> {
    try_use_context::<PreviewContext>().and_then(|ctx| (ctx.source)())
}

/// Photo upload button
///
/// Collaborators come from a `PhotoServices` context when the app provides
/// one, otherwise the platform defaults are used.
///
/// # Example
/// ```rust,ignore
/// PhotoUpload {
///     width: 400,
///     float_content: FloatContent::Children,
///     on_photo_select: move |selection: PhotoSelection| {
///         log::info!("got {} base64 chars", selection.data().len());
///     },
///     PhotoPreview { placeholder: "/assets/avatar.png" }
/// }
/// ```
#[component]
pub fn PhotoUpload(
    /// Extra CSS appended to the root container
    #[props(default)]
    container_style: Option<String>,
    #[props(default = DEFAULT_PICKER_TITLE.to_string())] picker_title: String,
    #[props(default = 300)] height: u32,
    #[props(default = 300)] width: u32,
    #[props(default)] format: ImageFormat,
    #[props(default = 80)] quality: u8,
    /// Icon name for the floating button ("plus" if unset)
    #[props(default)]
    icon: Option<String>,
    /// Rectangular labelled button instead of the floating one
    #[props(default = false)]
    normal_button: bool,
    #[props(default = DEFAULT_BUTTON_LABEL.to_string())] button_label: String,
    #[props(default)] float_content: FloatContent,
    #[props(default)] callback_contract: CallbackContract,
    #[props(default)] theme: Theme,
    #[props(default)] on_photo_select: Option<EventHandler<PhotoSelection>>,
    /// Called when resizing or reading the photo failed
    #[props(default)]
    on_error: Option<EventHandler<PipelineError>>,
    children: Element,
) -> Element {
    let source = use_signal(|| None::<DisplaySource>);
    let data_url = use_signal(|| None::<String>);
    let preview = use_context_provider(|| PreviewContext { source, data_url });
    let mut busy = use_signal(|| false);

    let pipeline = use_hook(|| {
        let config = WidgetConfig {
            picker_title: picker_title.clone(),
            height,
            width,
            format,
            quality,
            callback_contract,
            float_content,
        };
        if let Err(e) = config.validate() {
            log::warn!("PhotoUpload configured with {}", e);
        }
        let services = try_consume_context::<PhotoServices>().unwrap_or_else(|| {
            PhotoServices::platform_default(std::env::temp_dir().join(DEFAULT_STORAGE_PATH))
        });
        PhotoPipeline::new(config, services)
    });

    let activate = move |_| {
        let pipeline = pipeline.clone();
        busy.set(true);
        spawn(async move {
            let outcome = pipeline.run().await;
            let mut sink = ComponentSink {
                preview,
                busy,
                on_photo_select,
                on_error,
            };
            apply_outcome(&outcome, pipeline.config().callback_contract, &mut sink);
        });
    };

    let root_style = format!(
        "{} {}",
        theme.container_style(),
        container_style.unwrap_or_default()
    );
    let button_style = if normal_button {
        theme.normal_button_style()
    } else {
        theme.float_button_style()
    };
    let text_style = theme.button_text_style();
    let content = ButtonContent::choose(normal_button, float_content, icon.as_deref());

    rsx! {
        div { style: "{root_style}",
            button {
                r#type: "button",
                style: "{button_style}",
                disabled: busy(),
                onclick: activate,
                {match content {
                    ButtonContent::Label => rsx! {
                        span { style: "{text_style}", "{button_label}" }
                    },
                    ButtonContent::Children => children,
                    ButtonContent::Glyph(glyph) => rsx! {
                        span { style: "{text_style}", "{glyph}" }
                    },
                }}
            }
        }
    }
}

/// Image showing the photo last chosen through the enclosing [`PhotoUpload`]
#[component]
pub fn PhotoPreview(
    /// Shown until a photo was chosen
    #[props(default)]
    placeholder: Option<String>,
    #[props(default = "Photo".to_string())] alt: String,
    #[props(default = "width: 100%; height: 100%; object-fit: cover;".to_string())] style: String,
) -> Element {
    let chosen = try_use_context::<PreviewContext>().and_then(|ctx| (ctx.data_url)());

    match chosen.or(placeholder) {
        Some(src) => rsx! {
            img { src: "{src}", alt: "{alt}", style: "{style}" }
        },
        None => rsx! {},
    }
}

