use crate::models::{CallbackContract, DisplaySource, FloatContent, PhotoSelection, WidgetConfig};
use crate::pipeline::{PhotoPipeline, PhotoServices, PipelineError, PipelineOutcome, PipelineState};

pub type PhotoSelectCallback = Box<dyn Fn(PhotoSelection) + Send + Sync>;
pub type PipelineErrorCallback = Box<dyn Fn(&PipelineError) + Send + Sync>;

/// Receives the visible effects of a finished run.
///
/// Implemented by the headless widget and by the Dioxus component, so both
/// react to an outcome the same way.
pub trait OutcomeSink {
    /// New photo to show; `data_url` is the inline form of the same image
    fn display(&mut self, source: DisplaySource, data_url: String);
    fn photo_selected(&mut self, selection: PhotoSelection);
    fn failed(&mut self, error: &PipelineError);
    /// The activation that produced the outcome is over
    fn finished(&mut self) {}
}

/// Applies `outcome` to `sink`.
///
/// A completed run updates the display before `photo_selected` fires, once.
/// Failures go to `failed` only. A [`PipelineOutcome::Busy`] outcome belongs
/// to a run that is still going, so nothing is reported, not even `finished`.
pub fn apply_outcome(
    outcome: &PipelineOutcome,
    contract: CallbackContract,
    sink: &mut impl OutcomeSink,
) {
    match outcome {
        PipelineOutcome::Busy => return,
        PipelineOutcome::Completed(success) => {
            sink.display(success.display.clone(), success.payload.uri.clone());
            sink.photo_selected(success.selection(contract));
        }
        PipelineOutcome::Failed(e) => sink.failed(e),
        PipelineOutcome::Cancelled
        | PipelineOutcome::PickerError(_)
        | PipelineOutcome::CustomButton(_) => {}
    }
    sink.finished();
}

/// What goes inside the button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonContent<'a> {
    /// Text label of the rectangular button
    Label,
    /// The caller's children, e.g. a preview image
    Children,
    Glyph(&'a str),
}

impl<'a> ButtonContent<'a> {
    /// `icon` falls back to "plus"; a labelled button never shows children
    pub fn choose(normal_button: bool, float_content: FloatContent, icon: Option<&'a str>) -> Self {
        if normal_button {
            ButtonContent::Label
        } else if float_content == FloatContent::Children {
            ButtonContent::Children
        } else {
            ButtonContent::Glyph(icon_glyph(icon.unwrap_or("plus")))
        }
    }
}

/// Glyph for a known icon name; anything else is shown as given
pub fn icon_glyph(name: &str) -> &str {
    match name {
        "plus" => "+",
        "camera" => "📷",
        "image" | "photo" => "🖼️",
        other => other,
    }
}

struct WidgetSink<'a> {
    display_source: &'a mut Option<DisplaySource>,
    on_photo_select: &'a Option<PhotoSelectCallback>,
    on_error: &'a Option<PipelineErrorCallback>,
}

impl OutcomeSink for WidgetSink<'_> {
    fn display(&mut self, source: DisplaySource, _data_url: String) {
        *self.display_source = Some(source);
    }

    fn photo_selected(&mut self, selection: PhotoSelection) {
        if let Some(callback) = self.on_photo_select {
            callback(selection);
        }
    }

    fn failed(&mut self, error: &PipelineError) {
        if let Some(callback) = self.on_error {
            callback(error);
        }
    }
}

/// Headless photo upload control.
///
/// Holds the last displayed photo and the caller's callbacks; the Dioxus
/// component keeps the same state in signals.
pub struct PhotoUploadWidget {
    pipeline: PhotoPipeline,
    display_source: Option<DisplaySource>,
    on_photo_select: Option<PhotoSelectCallback>,
    on_error: Option<PipelineErrorCallback>,
}

impl PhotoUploadWidget {
    pub fn new(config: WidgetConfig, services: PhotoServices) -> Self {
        Self {
            pipeline: PhotoPipeline::new(config, services),
            display_source: None,
            on_photo_select: None,
            on_error: None,
        }
    }

    pub fn on_photo_select(
        mut self,
        callback: impl Fn(PhotoSelection) + Send + Sync + 'static,
    ) -> Self {
        self.on_photo_select = Some(Box::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl Fn(&PipelineError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &WidgetConfig {
        self.pipeline.config()
    }

    pub fn display_source(&self) -> Option<&DisplaySource> {
        self.display_source.as_ref()
    }

    pub fn state(&self) -> PipelineState {
        self.pipeline.state()
    }

    /// Handles one tap on the control.
    ///
    /// Only a completed run updates the display source and calls
    /// `on_photo_select`, once.
    pub async fn activate(&mut self) -> PipelineOutcome {
        let outcome = self.pipeline.run().await;
        apply_outcome(
            &outcome,
            self.pipeline.config().callback_contract,
            &mut WidgetSink {
                display_source: &mut self.display_source,
                on_photo_select: &self.on_photo_select,
                on_error: &self.on_error,
            },
        );
        outcome
    }
}
