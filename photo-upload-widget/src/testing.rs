// Recording doubles for the picker, resizer and file reader.

use crate::file_reader::{Encoding, FileReader, ReadError};
use crate::models::{PickerOptions, PickerResult, ResizeRequest, ResizedImage, SelectedImage};
use crate::picker::ImagePicker;
use crate::pipeline::PhotoServices;
use crate::platform::Platform;
use crate::resizer::{ImageResizer, ResizeError};
use std::sync::{mpsc, Arc, Mutex};

pub const RESIZED_URI: &str = "file:/data/user/0/app/cache/resized.jpg";
pub const RESIZED_DATA: &str = "UkVTSVpFRA==";

pub fn selected_image(width: u32, height: u32) -> SelectedImage {
    SelectedImage {
        data: "T1JJR0lOQUw=".to_string(),
        width,
        height,
        mime_type: "image/png".to_string(),
        file_name: Some("original.png".to_string()),
        path: Some("/sdcard/DCIM/original.png".to_string()),
    }
}

pub struct StaticPicker {
    result: PickerResult,
    pub calls: Mutex<Vec<PickerOptions>>,
}

impl StaticPicker {
    pub fn new(result: PickerResult) -> Arc<Self> {
        Arc::new(Self {
            result,
            calls: Mutex::new(Vec::new()),
        })
    }
}

impl ImagePicker for StaticPicker {
    fn show(&self, options: &PickerOptions) -> PickerResult {
        self.calls.lock().unwrap().push(options.clone());
        self.result.clone()
    }
}

/// Blocks inside `show` until a result is sent through the channel
pub struct GatedPicker {
    results: Mutex<mpsc::Receiver<PickerResult>>,
}

impl GatedPicker {
    pub fn new() -> (Arc<Self>, mpsc::Sender<PickerResult>) {
        let (tx, rx) = mpsc::channel();
        (
            Arc::new(Self {
                results: Mutex::new(rx),
            }),
            tx,
        )
    }
}

impl ImagePicker for GatedPicker {
    fn show(&self, _options: &PickerOptions) -> PickerResult {
        self.results
            .lock()
            .unwrap()
            .recv()
            .unwrap_or(PickerResult::Cancelled)
    }
}

pub struct PanickingPicker;

impl ImagePicker for PanickingPicker {
    fn show(&self, _options: &PickerOptions) -> PickerResult {
        panic!("picker crashed")
    }
}

pub struct RecordingResizer {
    result: Result<ResizedImage, ResizeError>,
    pub calls: Mutex<Vec<ResizeRequest>>,
}

impl RecordingResizer {
    pub fn ok() -> Arc<Self> {
        Self::with_result(Ok(ResizedImage {
            uri: RESIZED_URI.to_string(),
            width: 300,
            height: 225,
            name: "resized.jpg".to_string(),
            size: 6,
        }))
    }

    pub fn with_result(result: Result<ResizedImage, ResizeError>) -> Arc<Self> {
        Arc::new(Self {
            result,
            calls: Mutex::new(Vec::new()),
        })
    }
}

impl ImageResizer for RecordingResizer {
    fn resize(&self, request: &ResizeRequest) -> Result<ResizedImage, ResizeError> {
        self.calls.lock().unwrap().push(request.clone());
        self.result.clone()
    }
}

pub struct RecordingReader {
    result: Result<String, ReadError>,
    pub calls: Mutex<Vec<(String, Encoding)>>,
}

impl RecordingReader {
    pub fn ok() -> Arc<Self> {
        Self::with_result(Ok(RESIZED_DATA.to_string()))
    }

    pub fn with_result(result: Result<String, ReadError>) -> Arc<Self> {
        Arc::new(Self {
            result,
            calls: Mutex::new(Vec::new()),
        })
    }
}

impl FileReader for RecordingReader {
    fn read(&self, path: &str, encoding: Encoding) -> Result<String, ReadError> {
        self.calls
            .lock()
            .unwrap()
            .push((path.to_string(), encoding));
        self.result.clone()
    }
}

pub fn services(
    picker: Arc<dyn ImagePicker>,
    resizer: Arc<RecordingResizer>,
    reader: Arc<RecordingReader>,
    platform: Platform,
) -> PhotoServices {
    PhotoServices {
        picker,
        resizer,
        reader,
        platform,
    }
}
