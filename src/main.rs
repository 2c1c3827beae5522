use dioxus::prelude::*;
use dioxus_i18n::prelude::use_init_i18n;
use dioxus_i18n::t;
use photo_upload_widget::PhotoServices;

mod components;
mod error;
mod filesystem;
mod i18n;

use components::UploadScreen;

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    init_logging();
    dioxus::launch(App);
}

#[cfg(target_os = "android")]
fn init_logging() {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Debug)
            .with_tag("photo-upload"),
    );
}

#[cfg(not(target_os = "android"))]
fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

#[component]
fn App() -> Element {
    use_init_i18n(i18n::init_i18n);
    let config = use_hook(filesystem::load_widget_config);
    use_context_provider(|| PhotoServices::platform_default(filesystem::images_dir()));

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        div { style: "display: flex; flex-direction: column; height: 100vh; font-family: sans-serif;",
            h1 { style: "color: #0066cc; font-size: 24px; font-weight: 700; margin: 16px;",
                {t!("app-title")}
            }
            div { style: "flex: 1; overflow-y: auto;",
                UploadScreen { config }
            }
        }
    }
}
