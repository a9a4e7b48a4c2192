//! 多语言 OCR 调度
//!
//! 每个字段是一串按顺序尝试的识别 pass，每个 pass 带触发条件；
//! 后一个 pass 的结果只有在置信度不低于当前最佳时才被采用。

use super::config::{LanguageHints, OcrConfig};
use super::roi::{CardRois, RoiVariant};
use super::text::{contains_secondary_script, is_mostly_numeric, is_template_noise};
use super::vision::{RecognizedLine, VisionService};
use image::RgbaImage;
use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintTier {
    Mixed,
    Primary,
    /// 按当前最佳结果的文字种类选择主/次语言
    MatchingScript,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Always,
    LowConfidence,
    LowConfidenceOrSecondaryScript,
}

impl Trigger {
    fn should_run(&self, best: Option<&Candidate>, threshold: f32) -> bool {
        let low = best.map_or(true, |b| b.confidence < threshold);
        match self {
            Trigger::Always => true,
            Trigger::LowConfidence => low,
            Trigger::LowConfidenceOrSecondaryScript => {
                low || best.map_or(false, |b| contains_secondary_script(&b.text))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecognitionPass {
    pub trigger: Trigger,
    pub hints: HintTier,
    pub auto_detect_script: bool,
    pub roi: RoiVariant,
}

const fn pass(trigger: Trigger, hints: HintTier, auto_detect_script: bool, roi: RoiVariant) -> RecognitionPass {
    RecognitionPass {
        trigger,
        hints,
        auto_detect_script,
        roi,
    }
}

pub const NAME_PASSES: [RecognitionPass; 3] = [
    pass(Trigger::Always, HintTier::Mixed, true, RoiVariant::Base),
    pass(
        Trigger::LowConfidenceOrSecondaryScript,
        HintTier::MatchingScript,
        false,
        RoiVariant::Base,
    ),
    pass(Trigger::LowConfidence, HintTier::Mixed, true, RoiVariant::Widened),
];

pub const NUMBER_PASSES: [RecognitionPass; 4] = [
    pass(Trigger::Always, HintTier::Mixed, true, RoiVariant::Base),
    pass(Trigger::LowConfidence, HintTier::Primary, false, RoiVariant::Base),
    pass(Trigger::LowConfidence, HintTier::Mixed, true, RoiVariant::Widened),
    pass(Trigger::LowConfidence, HintTier::Primary, false, RoiVariant::Sweep),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub text: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OcrOutcome {
    pub candidate: Option<Candidate>,
    pub passes_run: usize,
    pub threshold: f32,
}

impl OcrOutcome {
    pub fn text(&self) -> Option<&str> {
        self.candidate.as_ref().map(|c| c.text.as_str())
    }

    pub fn is_confident(&self) -> bool {
        self.candidate
            .as_ref()
            .map_or(false, |c| c.confidence >= self.threshold)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Number,
}

pub struct OcrOrchestrator {
    hints: LanguageHints,
    config: OcrConfig,
}

impl OcrOrchestrator {
    pub fn new(hints: LanguageHints, config: OcrConfig) -> Self {
        Self { hints, config }
    }

    pub fn recognize_name(
        &self,
        vision: &dyn VisionService,
        image: &RgbaImage,
        rois: &CardRois,
    ) -> OcrOutcome {
        self.run(Field::Name, &NAME_PASSES, vision, image, rois)
    }

    pub fn recognize_number(
        &self,
        vision: &dyn VisionService,
        image: &RgbaImage,
        rois: &CardRois,
    ) -> OcrOutcome {
        self.run(Field::Number, &NUMBER_PASSES, vision, image, rois)
    }

    fn run(
        &self,
        field: Field,
        passes: &[RecognitionPass],
        vision: &dyn VisionService,
        image: &RgbaImage,
        rois: &CardRois,
    ) -> OcrOutcome {
        let threshold = match field {
            Field::Name => self.config.name_threshold,
            Field::Number => self.config.number_threshold,
        };
        let mut best: Option<Candidate> = None;
        let mut passes_run = 0;

        for pass in passes {
            if !pass.trigger.should_run(best.as_ref(), threshold) {
                continue;
            }

            let roi = match field {
                Field::Name => rois.name_variant(pass.roi),
                Field::Number => rois.number_variant(pass.roi),
            };
            if roi.is_empty() {
                continue;
            }

            passes_run += 1;
            let hints = self.resolve_hints(pass.hints, best.as_ref());
            let lines = match vision.recognize_text(image, roi, hints, pass.auto_detect_script) {
                Ok(lines) => lines,
                Err(e) => {
                    warn!("⚠️ {:?} recognition pass {} failed: {}", field, passes_run, e);
                    Vec::new()
                }
            };

            let candidate = match field {
                Field::Name => select_title_line(&lines, self.config.line_height_epsilon),
                Field::Number => join_lines(&lines),
            };

            if let Some(candidate) = candidate {
                debug!(
                    "🔤 {:?} pass {} ({:?}/{:?}): {:?} conf={:.2}",
                    field, passes_run, pass.hints, pass.roi, candidate.text, candidate.confidence
                );
                if best
                    .as_ref()
                    .map_or(true, |b| candidate.confidence >= b.confidence)
                {
                    best = Some(candidate);
                }
            }
        }

        OcrOutcome {
            candidate: best,
            passes_run,
            threshold,
        }
    }

    fn resolve_hints(&self, tier: HintTier, best: Option<&Candidate>) -> &[String] {
        match tier {
            HintTier::Mixed => &self.hints.mixed,
            HintTier::Primary => &self.hints.primary,
            HintTier::MatchingScript => {
                if best.map_or(false, |b| contains_secondary_script(&b.text)) {
                    &self.hints.secondary
                } else {
                    &self.hints.primary
                }
            }
        }
    }
}

/// 选出最高的一行作为卡名（标题字号大于说明文字）
///
/// 行高相差不超过 `epsilon` 像素时比较置信度。
pub fn select_title_line(lines: &[RecognizedLine], epsilon: f32) -> Option<Candidate> {
    let mut best: Option<&RecognizedLine> = None;

    for line in lines {
        let text = line.text.trim();
        if text.is_empty() || is_mostly_numeric(text) || is_template_noise(text) {
            continue;
        }
        best = match best {
            None => Some(line),
            Some(current) => {
                let diff = line.bbox.height as f32 - current.bbox.height as f32;
                let replace = if diff.abs() <= epsilon {
                    line.confidence > current.confidence
                } else {
                    diff > 0.0
                };
                if replace {
                    Some(line)
                } else {
                    Some(current)
                }
            }
        };
    }

    best.map(|line| Candidate {
        text: line.text.trim().to_string(),
        confidence: line.confidence.clamp(0.0, 1.0),
    })
}

/// 编号区所有行拼接，置信度取平均
pub fn join_lines(lines: &[RecognizedLine]) -> Option<Candidate> {
    let kept: Vec<&RecognizedLine> = lines.iter().filter(|l| !l.text.trim().is_empty()).collect();
    if kept.is_empty() {
        return None;
    }

    let text = kept
        .iter()
        .map(|l| l.text.trim())
        .collect::<Vec<_>>()
        .join(" ");
    let confidence = kept
        .iter()
        .map(|l| l.confidence.clamp(0.0, 1.0))
        .sum::<f32>()
        / kept.len() as f32;

    Some(Candidate { text, confidence })
}
