pub mod api;
pub mod core;

pub use crate::api::scanner::CardScanner;
pub use crate::core::scanner::{
    Frame, LanguageHints, RawFrame, ScanEngine, ScanHit, ScannerConfig, VisionService,
};

pub fn init_logging() {
    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Debug)
                .with_tag("card_scan_rust"),
        );
    }

    #[cfg(not(target_os = "android"))]
    {
        // 非 Android 宿主自行安装 log 实现
    }
}
