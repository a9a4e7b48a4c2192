use super::config::ScannerConfig;
use super::consensus::ConsensusWindow;
use super::error::ScanMiss;
use super::frame::{Frame, RawFrame};
use super::frame_gate::FrameGate;
use super::hit::ScanHit;
use super::normalizer::{CardSource, GeometricNormalizer};
use super::ocr::OcrOrchestrator;
use super::roi::RoiExtractor;
use super::state_machine::{DwellGate, GateAction, ScanPhase};
use super::text::{clean_name, extract_number};
use super::tracker::RectangleTracker;
use super::vision::VisionService;
use log::{debug, info};
use std::time::Duration;

/// 扫描统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub frames_received: u64,
    pub frames_processed: u64,
    pub detection_misses: u64,
    pub degenerate_geometry: u64,
    pub rejected_frames: u64,
    pub low_confidence: u64,
    pub no_content: u64,
    pub emitted: u64,
}

impl ScanStats {
    fn record(&mut self, miss: ScanMiss) {
        match miss {
            ScanMiss::DetectionMiss => self.detection_misses += 1,
            ScanMiss::DegenerateGeometry => self.degenerate_geometry += 1,
            ScanMiss::LowConfidenceRecognition => self.low_confidence += 1,
            ScanMiss::NoContent => self.no_content += 1,
        }
    }
}

/// 单个扫描会话的引擎，所有会话状态都在实例内
///
/// `process` 需要 `&mut self`，同一时刻只会处理一帧。
pub struct ScanEngine {
    vision: Box<dyn VisionService>,
    gate: FrameGate,
    tracker: RectangleTracker,
    dwell: DwellGate,
    normalizer: GeometricNormalizer,
    rois: RoiExtractor,
    ocr: OcrOrchestrator,
    names: ConsensusWindow,
    numbers: ConsensusWindow,
    stats: ScanStats,
}

impl ScanEngine {
    pub fn new(vision: Box<dyn VisionService>, config: ScannerConfig) -> Self {
        Self {
            vision,
            gate: FrameGate::with_millis(config.gate.min_frame_gap_ms),
            tracker: RectangleTracker::new(&config.tracker),
            dwell: DwellGate::new(Duration::from_millis(config.tracker.dwell_ms)),
            normalizer: GeometricNormalizer::new(),
            rois: RoiExtractor::new(config.roi.clone(), config.ocr.widen_margin),
            ocr: OcrOrchestrator::new(config.hints.clone(), config.ocr.clone()),
            names: ConsensusWindow::new(config.consensus_capacity),
            numbers: ConsensusWindow::new(config.consensus_capacity),
            stats: ScanStats::default(),
        }
    }

    pub fn with_defaults(vision: Box<dyn VisionService>) -> Self {
        Self::new(vision, ScannerConfig::default())
    }

    /// 处理一帧；只有驻留时间满足且至少一个字段非空时返回结果
    pub fn process(&mut self, frame: &Frame) -> Option<ScanHit> {
        self.stats.frames_received += 1;

        if !frame.is_valid() {
            debug!("🚫 frame {} has invalid buffer", frame.frame_number);
            self.stats.rejected_frames += 1;
            return None;
        }
        if !self.gate.should_accept(frame.timestamp) {
            return None;
        }
        let image = frame.to_image()?;
        self.stats.frames_processed += 1;
        let now = frame.timestamp;

        let observation = self.tracker.observe(self.vision.as_ref(), &image);
        if observation.quad.is_none() {
            self.stats.record(ScanMiss::DetectionMiss);
        }
        if self.dwell.observe(observation.aligned, now) == GateAction::Lost {
            debug!("📤 card left the guide at {:?}", now);
        }

        let card = match self.normalizer.normalize(&image, observation.quad.as_ref()) {
            Some(card) => card,
            None => {
                self.stats.rejected_frames += 1;
                return None;
            }
        };
        if card.source == (CardSource::Fallback { degenerate: true }) {
            self.stats.record(ScanMiss::DegenerateGeometry);
        }

        let (w, h) = card.dimensions();
        let rois = self.rois.extract(w, h);
        let name_outcome = self.ocr.recognize_name(self.vision.as_ref(), &card.image, &rois);
        let number_outcome = self
            .ocr
            .recognize_number(self.vision.as_ref(), &card.image, &rois);
        if !name_outcome.is_confident() || !number_outcome.is_confident() {
            self.stats.record(ScanMiss::LowConfidenceRecognition);
        }

        // 两次识别各自只给出一个字段，合并成本帧的猜测
        let name_guess = ScanHit::new(name_outcome.text().and_then(clean_name), None);
        let number_guess = ScanHit::new(None, number_outcome.text().and_then(extract_number));
        let guess = name_guess.merge(&number_guess);
        if !guess.has_content() {
            self.stats.record(ScanMiss::NoContent);
        }
        if let Some(name) = &guess.name {
            self.names.push(name.as_str());
        }
        if let Some(number) = &guess.number {
            self.numbers.push(number.as_str());
        }
        debug!(
            "🃏 frame {}: name={:?} number={:?} phase={:?}",
            frame.frame_number,
            guess.name,
            guess.number,
            self.dwell.current_phase()
        );

        if !self.dwell.is_satisfied(now) {
            return None;
        }

        let hit = ScanHit::new(
            self.names.best().map(str::to_string),
            self.numbers.best().map(str::to_string),
        )
        .normalized();
        if !hit.has_content() {
            return None;
        }

        self.stats.emitted += 1;
        info!("✅ card settled: {:?} #{:?}", hit.name, hit.number);
        Some(hit)
    }

    pub fn process_raw_frame(&mut self, raw_frame: &RawFrame) -> Option<ScanHit> {
        if !raw_frame.is_valid() {
            self.stats.frames_received += 1;
            self.stats.rejected_frames += 1;
            return None;
        }
        let frame = raw_frame.to_rgba();
        self.process(&frame)
    }

    pub fn phase(&self) -> &ScanPhase {
        self.dwell.current_phase()
    }

    pub fn stats(&self) -> ScanStats {
        self.stats.clone()
    }

    /// 清空窗口、锚点和节流状态
    pub fn reset(&mut self) {
        self.gate.reset();
        self.dwell.reset();
        self.names.clear();
        self.numbers.clear();
        self.stats = ScanStats::default();
    }
}
