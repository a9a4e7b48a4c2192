//! 卡片扫描器

use crate::core::scanner::{
    ConfigError, Frame, LanguageHints, RawFrame, ScanEngine, ScanHit, ScanStats, ScannerConfig,
    VisionService,
};
use log::info;

/// 卡片扫描器 - 每次打开扫描界面创建一个，关闭时丢弃
///
/// ```ignore
/// let mut scanner = CardScanner::create(Box::new(vision), LanguageHints::latin_first());
/// if let Some(hit) = scanner.process_raw_frame(&camera_frame) {
///     search(hit.name, hit.number);
/// }
/// ```
pub struct CardScanner {
    engine: ScanEngine,
}

impl CardScanner {
    pub fn create(vision: Box<dyn VisionService>, hints: LanguageHints) -> Self {
        Self::with_config(vision, ScannerConfig::with_hints(hints))
    }

    pub fn with_config(vision: Box<dyn VisionService>, config: ScannerConfig) -> Self {
        crate::init_logging();
        info!(
            "🎴 CardScanner: created (hints={:?}, dwell={}ms)",
            config.hints.mixed, config.tracker.dwell_ms
        );
        Self {
            engine: ScanEngine::new(vision, config),
        }
    }

    /// 从 JSON 配置创建
    pub fn from_json(vision: Box<dyn VisionService>, json: &str) -> Result<Self, ConfigError> {
        let config = ScannerConfig::from_json(json)?;
        Ok(Self::with_config(vision, config))
    }

    pub fn process(&mut self, frame: &Frame) -> Option<ScanHit> {
        self.engine.process(frame)
    }

    /// 直接处理相机 YUV420 帧
    pub fn process_raw_frame(&mut self, raw_frame: &RawFrame) -> Option<ScanHit> {
        self.engine.process_raw_frame(raw_frame)
    }

    pub fn stats(&self) -> ScanStats {
        self.engine.stats()
    }

    /// 切换游戏/重新打开扫描时调用
    pub fn reset(&mut self) {
        info!("🔄 CardScanner: reset");
        self.engine.reset()
    }
}

impl Drop for CardScanner {
    fn drop(&mut self) {
        let stats = self.engine.stats();
        info!(
            "🗑️ CardScanner: released ({} frames processed, {} hits)",
            stats.frames_processed, stats.emitted
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scanner::config::TrackerConfig;
    use crate::core::scanner::{MockVisionService, PixelRect, Quad, RecognizedLine};

    fn mock() -> MockVisionService {
        MockVisionService::new()
            .with_rectangles(vec![Some(Quad::from_rect(TrackerConfig::default().guide, 0.9))])
            .with_text(|q| {
                let text = if q.roi.y < q.image_size.1 / 2 {
                    "ミュウツー"
                } else {
                    "No. 150"
                };
                Ok(vec![RecognizedLine::new(text, 0.92, PixelRect::new(0, 0, 40, 18))])
            })
    }

    fn frame(i: u64) -> Frame {
        Frame::new(90, 126, vec![200u8; 90 * 126 * 4], i * 500, i)
    }

    #[test]
    fn test_scanner_emits_japanese_hit() {
        let mut scanner = CardScanner::create(Box::new(mock()), LanguageHints::japanese_first());

        assert!(scanner.process(&frame(0)).is_none());
        assert!(scanner.process(&frame(1)).is_none());
        let hit = scanner.process(&frame(2)).expect("settled after 1s");
        assert_eq!(hit.name.as_deref(), Some("ミュウツー"));
        assert_eq!(hit.number.as_deref(), Some("150"));
        assert_eq!(scanner.stats().emitted, 1);
    }

    #[test]
    fn test_scanner_from_json() {
        let scanner = CardScanner::from_json(Box::new(mock()), r#"{ "tracker": { "dwell_ms": 0 } }"#);
        let mut scanner = scanner.expect("valid config");
        assert!(scanner.process(&frame(0)).is_some());

        scanner.reset();
        assert_eq!(scanner.stats(), ScanStats::default());

        assert!(CardScanner::from_json(Box::new(mock()), "{ tracker").is_err());
    }
}
