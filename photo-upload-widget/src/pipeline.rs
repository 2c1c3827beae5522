//! Pick → resize → read pipeline behind the upload button.
//!
//! One [`PhotoPipeline::run`] call is one activation of the button. The
//! blocking collaborators run on `spawn_blocking` so the UI loop keeps
//! rendering while the picker dialog is open. Without a tokio runtime they
//! run inline.

use crate::file_reader::{Encoding, FileReader, FsFileReader, ReadError};
use crate::models::{
    CallbackContract, DisplaySource, PhotoSelection, PickerResult, ResizeRequest, SelectedImage,
    UploadPayload, WidgetConfig,
};
use crate::picker::{platform_picker, ImagePicker};
use crate::platform::{resolve_read_path, Platform};
use crate::resizer::{to_resize_data_uri, ImageCrateResizer, ImageResizer, ResizeError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Selecting,
    Resizing,
    Reading,
    /// Last run delivered a photo
    Done,
}

impl PipelineState {
    pub fn accepts_activation(&self) -> bool {
        matches!(self, PipelineState::Idle | PipelineState::Done)
    }

    pub fn is_busy(&self) -> bool {
        !self.accepts_activation()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    Resize(ResizeError),
    Read(ReadError),
    /// A blocking step panicked or was cancelled
    Task(String),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::Resize(e) => write!(f, "Resize failed: {}", e),
            PipelineError::Read(e) => write!(f, "Reading resized image failed: {}", e),
            PipelineError::Task(msg) => write!(f, "Background task failed: {}", msg),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<ResizeError> for PipelineError {
    fn from(err: ResizeError) -> Self {
        PipelineError::Resize(err)
    }
}

impl From<ReadError> for PipelineError {
    fn from(err: ReadError) -> Self {
        PipelineError::Read(err)
    }
}

/// Everything a successful run produces
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSuccess {
    pub display: DisplaySource,
    pub payload: UploadPayload,
    /// The picker's original selection
    pub selected: SelectedImage,
}

impl PipelineSuccess {
    /// Callback value in the shape the caller asked for
    pub fn selection(&self, contract: CallbackContract) -> PhotoSelection {
        match contract {
            CallbackContract::V1 => PhotoSelection::V1 {
                data: self.payload.data.clone(),
                response: self.selected.clone(),
            },
            CallbackContract::V2 => PhotoSelection::V2(self.payload.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// Activation ignored, another run is in flight
    Busy,
    Cancelled,
    PickerError(String),
    CustomButton(String),
    Completed(PipelineSuccess),
    Failed(PipelineError),
}

impl PipelineOutcome {
    pub fn success(&self) -> Option<&PipelineSuccess> {
        match self {
            PipelineOutcome::Completed(success) => Some(success),
            _ => None,
        }
    }
}

/// The external collaborators a pipeline drives
#[derive(Clone)]
pub struct PhotoServices {
    pub picker: Arc<dyn ImagePicker>,
    pub resizer: Arc<dyn ImageResizer>,
    pub reader: Arc<dyn FileReader>,
    pub platform: Platform,
}

impl PhotoServices {
    /// Native picker, `image`-crate resizer writing into `output_dir`, std fs reader
    pub fn platform_default(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            picker: platform_picker(),
            resizer: Arc::new(ImageCrateResizer::new(output_dir)),
            reader: Arc::new(FsFileReader),
            platform: Platform::current(),
        }
    }
}

impl std::fmt::Debug for PhotoServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoServices")
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}

/// Runs a collaborator call off the async executor.
///
/// Inside a tokio runtime this is `spawn_blocking`. Without one (the web
/// renderer, plain executors) the call runs inline; a panic is caught in
/// both cases and reported as [`PipelineError::Task`].
async fn off_executor<T, F>(task: F) -> Result<T, PipelineError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle
            .spawn_blocking(task)
            .await
            .map_err(|e| PipelineError::Task(e.to_string())),
        Err(_) => std::panic::catch_unwind(std::panic::AssertUnwindSafe(task))
            .map_err(|_| PipelineError::Task("task panicked".to_string())),
    }
}

async fn run_blocking<T, E, F>(task: F) -> Result<T, PipelineError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<PipelineError> + Send + 'static,
{
    off_executor(task).await?.map_err(Into::into)
}

/// Puts the state back when a run ends, including when its future is
/// dropped half way.
struct RunGuard<'a> {
    state: &'a watch::Sender<PipelineState>,
    finish: PipelineState,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.state.send_replace(self.finish);
    }
}

/// Cloning shares the run state, so clones guard each other against re-entry.
#[derive(Clone, Debug)]
pub struct PhotoPipeline {
    config: WidgetConfig,
    services: PhotoServices,
    state: Arc<watch::Sender<PipelineState>>,
}

impl PhotoPipeline {
    pub fn new(config: WidgetConfig, services: PhotoServices) -> Self {
        let (state, _) = watch::channel(PipelineState::Idle);
        Self {
            config,
            services,
            state: Arc::new(state),
        }
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn state(&self) -> PipelineState {
        *self.state.borrow()
    }

    /// Follows state changes, e.g. to disable the button while busy
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    /// Runs one activation to completion.
    ///
    /// Returns [`PipelineOutcome::Busy`] without touching any collaborator
    /// when a previous run has not finished yet.
    pub async fn run(&self) -> PipelineOutcome {
        let began = self.state.send_if_modified(|state| {
            if state.accepts_activation() {
                *state = PipelineState::Selecting;
                true
            } else {
                false
            }
        });
        if !began {
            log::debug!("Photo pipeline busy ({:?}), activation ignored", self.state());
            return PipelineOutcome::Busy;
        }

        let mut guard = RunGuard {
            state: &self.state,
            finish: PipelineState::Idle,
        };
        let outcome = self.select_and_process().await;
        if let PipelineOutcome::Completed(_) = outcome {
            guard.finish = PipelineState::Done;
        }
        drop(guard);
        outcome
    }

    async fn select_and_process(&self) -> PipelineOutcome {
        let picker = self.services.picker.clone();
        let options = self.config.picker_options();
        let result = match off_executor(move || picker.show(&options)).await {
            Ok(result) => result,
            Err(e) => {
                log::error!("Image picker task failed: {}", e);
                return PipelineOutcome::Failed(e);
            }
        };

        let selected = match result {
            PickerResult::Cancelled => {
                log::info!("User cancelled image picker");
                return PipelineOutcome::Cancelled;
            }
            PickerResult::Error(msg) => {
                log::error!("ImagePicker Error: {}", msg);
                return PipelineOutcome::PickerError(msg);
            }
            PickerResult::CustomButtonTapped(id) => {
                log::info!("User tapped custom button: {}", id);
                return PipelineOutcome::CustomButton(id);
            }
            PickerResult::Selected(selected) => selected,
        };

        log::debug!(
            "Picked {}x{} {} ({:?})",
            selected.width,
            selected.height,
            selected.mime_type,
            selected.file_name
        );

        match self.process(selected).await {
            Ok(success) => PipelineOutcome::Completed(success),
            Err(e) => {
                log::error!("Photo pipeline aborted: {}", e);
                PipelineOutcome::Failed(e)
            }
        }
    }

    async fn process(&self, selected: SelectedImage) -> Result<PipelineSuccess, PipelineError> {
        self.state.send_replace(PipelineState::Resizing);
        let request = ResizeRequest {
            data_uri: to_resize_data_uri(&selected.data),
            height: self.config.height,
            width: self.config.width,
            format: self.config.format,
            quality: self.config.quality,
        };
        let resizer = self.services.resizer.clone();
        let resized = run_blocking(move || resizer.resize(&request)).await?;
        log::debug!("Resized image at {} ({} bytes)", resized.uri, resized.size);

        self.state.send_replace(PipelineState::Reading);
        let read_path = resolve_read_path(self.services.platform, &resized.uri);
        let reader = self.services.reader.clone();
        let data = run_blocking(move || reader.read(&read_path, Encoding::Base64)).await?;

        let mime_type = self.config.format.mime_type();
        Ok(PipelineSuccess {
            display: DisplaySource {
                uri: resized.uri.clone(),
            },
            payload: UploadPayload {
                uri: format!("data:{};base64,{}", mime_type, data),
                width: resized.width,
                height: resized.height,
                data,
                mime_type: mime_type.to_string(),
                name: resized.name,
                path: resized.uri,
                size: resized.size,
            },
            selected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageFormat;
    use crate::testing::*;
    use std::future::Future;
    use std::task::{Context, Poll, Waker};

    /// Polls once on the calling thread, outside any tokio runtime
    fn poll_once<F: Future>(future: F) -> Poll<F::Output> {
        let mut future = std::pin::pin!(future);
        future
            .as_mut()
            .poll(&mut Context::from_waker(Waker::noop()))
    }

    fn pipeline_with(
        config: WidgetConfig,
        result: PickerResult,
        platform: Platform,
    ) -> (
        PhotoPipeline,
        Arc<StaticPicker>,
        Arc<RecordingResizer>,
        Arc<RecordingReader>,
    ) {
        let picker = StaticPicker::new(result);
        let resizer = RecordingResizer::ok();
        let reader = RecordingReader::ok();
        let pipeline = PhotoPipeline::new(
            config,
            services(picker.clone(), resizer.clone(), reader.clone(), platform),
        );
        (pipeline, picker, resizer, reader)
    }

    #[tokio::test]
    async fn test_selected_runs_all_steps() {
        let (pipeline, picker, resizer, reader) = pipeline_with(
            WidgetConfig::default(),
            PickerResult::Selected(selected_image(1200, 900)),
            Platform::Android,
        );

        let outcome = pipeline.run().await;
        let success = outcome.success().expect("pipeline should complete");

        let options = picker.calls.lock().unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].title, "Select Photo");
        assert!(options[0].storage.skip_backup);
        assert_eq!(options[0].storage.path, "images");

        let requests = resizer.calls.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].height, 300);
        assert_eq!(requests[0].width, 300);
        assert_eq!(requests[0].format, ImageFormat::Jpeg);
        assert_eq!(requests[0].quality, 80);
        assert_eq!(requests[0].data_uri, "data:image/jpeg;base64,T1JJR0lOQUw=");

        let reads = reader.calls.lock().unwrap();
        assert_eq!(
            *reads,
            vec![(
                "/data/user/0/app/cache/resized.jpg".to_string(),
                Encoding::Base64
            )]
        );

        assert_eq!(success.display.uri, RESIZED_URI);
        assert_eq!(success.payload.path, RESIZED_URI);
        assert_eq!(success.payload.data, RESIZED_DATA);
        assert_eq!(
            success.payload.uri,
            format!("data:image/jpeg;base64,{}", RESIZED_DATA)
        );
        assert_eq!(success.payload.mime_type, "image/jpeg");
        assert_eq!((success.payload.width, success.payload.height), (300, 225));
        assert_eq!(pipeline.state(), PipelineState::Done);
    }

    #[tokio::test]
    async fn test_resize_uses_config_not_original_size() {
        let config = WidgetConfig {
            height: 640,
            width: 480,
            format: ImageFormat::Png,
            quality: 55,
            ..WidgetConfig::default()
        };
        let (pipeline, _, resizer, _) = pipeline_with(
            config,
            PickerResult::Selected(selected_image(4000, 3000)),
            Platform::Desktop,
        );

        let outcome = pipeline.run().await;
        assert_eq!(
            outcome.success().map(|s| s.payload.mime_type.as_str()),
            Some("image/png")
        );

        let requests = resizer.calls.lock().unwrap();
        assert_eq!(
            (
                requests[0].height,
                requests[0].width,
                requests[0].format,
                requests[0].quality
            ),
            (640, 480, ImageFormat::Png, 55)
        );
    }

    #[tokio::test]
    async fn test_ios_reads_reference_unchanged() {
        let (pipeline, _, _, reader) = pipeline_with(
            WidgetConfig::default(),
            PickerResult::Selected(selected_image(10, 10)),
            Platform::Ios,
        );

        pipeline.run().await;
        assert_eq!(reader.calls.lock().unwrap()[0].0, RESIZED_URI);
    }

    #[tokio::test]
    async fn test_early_exits_touch_nothing() {
        let cases = [
            (PickerResult::Cancelled, PipelineOutcome::Cancelled),
            (
                PickerResult::Error("camera unavailable".to_string()),
                PipelineOutcome::PickerError("camera unavailable".to_string()),
            ),
            (
                PickerResult::CustomButtonTapped("fb".to_string()),
                PipelineOutcome::CustomButton("fb".to_string()),
            ),
        ];

        for (result, expected) in cases {
            let (pipeline, _, resizer, reader) =
                pipeline_with(WidgetConfig::default(), result, Platform::Android);

            assert_eq!(pipeline.run().await, expected);
            assert!(resizer.calls.lock().unwrap().is_empty());
            assert!(reader.calls.lock().unwrap().is_empty());
            assert_eq!(pipeline.state(), PipelineState::Idle);
        }
    }

    #[tokio::test]
    async fn test_resize_failure_is_contained() {
        let picker = StaticPicker::new(PickerResult::Selected(selected_image(10, 10)));
        let resizer =
            RecordingResizer::with_result(Err(ResizeError::ImageLoadError("corrupt".to_string())));
        let reader = RecordingReader::ok();
        let pipeline = PhotoPipeline::new(
            WidgetConfig::default(),
            services(picker, resizer, reader.clone(), Platform::Android),
        );

        let outcome = pipeline.run().await;
        assert!(matches!(
            outcome,
            PipelineOutcome::Failed(PipelineError::Resize(_))
        ));
        assert!(reader.calls.lock().unwrap().is_empty());
        assert_eq!(pipeline.state(), PipelineState::Idle);
    }

    #[tokio::test]
    async fn test_read_failure_is_contained() {
        let picker = StaticPicker::new(PickerResult::Selected(selected_image(10, 10)));
        let reader = RecordingReader::with_result(Err(ReadError::NotFound("x".to_string())));
        let pipeline = PhotoPipeline::new(
            WidgetConfig::default(),
            services(picker, RecordingResizer::ok(), reader, Platform::Android),
        );

        let outcome = pipeline.run().await;
        assert_eq!(
            outcome,
            PipelineOutcome::Failed(PipelineError::Read(ReadError::NotFound("x".to_string())))
        );
        assert_eq!(pipeline.state(), PipelineState::Idle);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_reactivation_while_busy_is_ignored() {
        let (picker, release) = GatedPicker::new();
        let resizer = RecordingResizer::ok();
        let pipeline = PhotoPipeline::new(
            WidgetConfig::default(),
            services(picker, resizer.clone(), RecordingReader::ok(), Platform::Android),
        );

        let mut states = pipeline.subscribe();
        let first = tokio::spawn({
            let pipeline = pipeline.clone();
            async move { pipeline.run().await }
        });
        states
            .wait_for(|s| *s == PipelineState::Selecting)
            .await
            .unwrap();

        assert_eq!(pipeline.run().await, PipelineOutcome::Busy);

        release
            .send(PickerResult::Selected(selected_image(10, 10)))
            .unwrap();
        let outcome = first.await.unwrap();
        assert!(outcome.success().is_some());
        assert_eq!(resizer.calls.lock().unwrap().len(), 1);

        // a finished run accepts the next activation
        release.send(PickerResult::Cancelled).unwrap();
        assert_eq!(pipeline.run().await, PipelineOutcome::Cancelled);
    }

    #[test]
    fn test_runs_without_tokio_runtime() {
        let (pipeline, picker, resizer, reader) = pipeline_with(
            WidgetConfig::default(),
            PickerResult::Selected(selected_image(1200, 900)),
            Platform::Web,
        );

        let outcome = match poll_once(pipeline.run()) {
            Poll::Ready(outcome) => outcome,
            Poll::Pending => panic!("run should finish inline without a runtime"),
        };

        assert!(outcome.success().is_some());
        assert_eq!(picker.calls.lock().unwrap().len(), 1);
        assert_eq!(resizer.calls.lock().unwrap().len(), 1);
        assert_eq!(reader.calls.lock().unwrap().len(), 1);
        assert_eq!(pipeline.state(), PipelineState::Done);
    }

    #[test]
    fn test_picker_error_without_runtime_returns_to_idle() {
        let (pipeline, _, resizer, _) = pipeline_with(
            WidgetConfig::default(),
            PickerResult::Error("no picker".to_string()),
            Platform::Web,
        );

        assert_eq!(
            poll_once(pipeline.run()),
            Poll::Ready(PipelineOutcome::PickerError("no picker".to_string()))
        );
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert!(resizer.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_picker_panic_without_runtime_is_contained() {
        let pipeline = PhotoPipeline::new(
            WidgetConfig::default(),
            services(
                Arc::new(PanickingPicker),
                RecordingResizer::ok(),
                RecordingReader::ok(),
                Platform::Web,
            ),
        );

        match poll_once(pipeline.run()) {
            Poll::Ready(PipelineOutcome::Failed(PipelineError::Task(_))) => {}
            other => panic!("unexpected poll result: {:?}", other),
        }
        assert_eq!(pipeline.state(), PipelineState::Idle);
    }

    #[tokio::test]
    async fn test_picker_panic_is_contained() {
        let pipeline = PhotoPipeline::new(
            WidgetConfig::default(),
            services(
                Arc::new(PanickingPicker),
                RecordingResizer::ok(),
                RecordingReader::ok(),
                Platform::Android,
            ),
        );

        assert!(matches!(
            pipeline.run().await,
            PipelineOutcome::Failed(PipelineError::Task(_))
        ));
        assert_eq!(pipeline.state(), PipelineState::Idle);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_dropped_run_returns_to_idle() {
        let (picker, release) = GatedPicker::new();
        let pipeline = PhotoPipeline::new(
            WidgetConfig::default(),
            services(picker, RecordingResizer::ok(), RecordingReader::ok(), Platform::Android),
        );

        let mut states = pipeline.subscribe();
        let first = tokio::spawn({
            let pipeline = pipeline.clone();
            async move { pipeline.run().await }
        });
        states
            .wait_for(|s| *s == PipelineState::Selecting)
            .await
            .unwrap();

        first.abort();
        assert!(first.await.unwrap_err().is_cancelled());
        states
            .wait_for(|s| *s == PipelineState::Idle)
            .await
            .unwrap();

        // one result for the abandoned dialog, one for the next activation
        release.send(PickerResult::Cancelled).unwrap();
        release.send(PickerResult::Cancelled).unwrap();
        assert_eq!(pipeline.run().await, PipelineOutcome::Cancelled);
    }

    #[test]
    fn test_selection_contracts() {
        let success = PipelineSuccess {
            display: DisplaySource {
                uri: RESIZED_URI.to_string(),
            },
            payload: UploadPayload {
                uri: "data:image/jpeg;base64,UkVTSVpFRA==".to_string(),
                width: 300,
                height: 225,
                data: RESIZED_DATA.to_string(),
                mime_type: "image/jpeg".to_string(),
                name: "resized.jpg".to_string(),
                path: RESIZED_URI.to_string(),
                size: 6,
            },
            selected: selected_image(1200, 900),
        };

        match success.selection(CallbackContract::V1) {
            PhotoSelection::V1 { data, response } => {
                assert_eq!(data, RESIZED_DATA);
                assert_eq!(response.width, 1200);
            }
            other => panic!("unexpected selection: {:?}", other),
        }
        assert_eq!(
            success.selection(CallbackContract::V2),
            PhotoSelection::V2(success.payload.clone())
        );
    }
}
