pub mod page_image;
pub mod preview;
pub mod settings;

pub use page_image::{encode_page_file, encode_page_image, JPEG_QUALITY, MAX_DIMENSION};
pub use preview::AssetVoicePreview;
pub use settings::{default_settings_path, JsonSettingsStore};
