mod upload_screen;

pub use upload_screen::UploadScreen;
