use super::error::ConfigError;
use super::geometry::NormRect;
use serde::{Deserialize, Serialize};

/// OCR 语言提示分层
///
/// `mixed` 的顺序决定识别引擎优先尝试哪种文字。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageHints {
    pub mixed: Vec<String>,
    /// 主文字（拉丁）
    pub primary: Vec<String>,
    /// 次文字（日文）
    pub secondary: Vec<String>,
}

impl Default for LanguageHints {
    fn default() -> Self {
        Self::latin_first()
    }
}

impl LanguageHints {
    pub fn latin_first() -> Self {
        Self {
            mixed: vec!["en-US".to_string(), "ja-JP".to_string()],
            primary: vec!["en-US".to_string()],
            secondary: vec!["ja-JP".to_string()],
        }
    }

    pub fn japanese_first() -> Self {
        Self {
            mixed: vec!["ja-JP".to_string(), "en-US".to_string()],
            ..Self::latin_first()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub min_frame_gap_ms: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_frame_gap_ms: 280,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// 宽/高 比下限
    pub min_aspect: f32,
    pub max_aspect: f32,
    /// 相对帧的最小尺寸
    pub min_size: f32,
    pub min_confidence: f32,
    /// 取景框（归一化，左上角原点）
    pub guide: NormRect,
    pub guide_margin: f32,
    pub iou_threshold: f32,
    pub dwell_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            min_aspect: 0.62,
            max_aspect: 0.90,
            min_size: 0.2,
            min_confidence: 0.5,
            guide: NormRect::new(0.19, 0.14, 0.62, 0.72),
            guide_margin: 0.04,
            iou_threshold: 0.25,
            dwell_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub name_threshold: f32,
    pub number_threshold: f32,
    /// ROI 放宽比例（相对 ROI 自身尺寸）
    pub widen_margin: f32,
    /// 行高差在此像素内视为同高，改比置信度
    pub line_height_epsilon: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            name_threshold: 0.45,
            number_threshold: 0.40,
            widen_margin: 0.25,
            line_height_epsilon: 1.5,
        }
    }
}

/// 校正后卡面上的 ROI 比例（左上角原点）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoiLayout {
    pub name: NormRect,
    pub number: NormRect,
    pub number_sweep: NormRect,
}

impl Default for RoiLayout {
    fn default() -> Self {
        Self {
            name: NormRect::new(0.06, 0.06, 0.62, 0.18),
            number: NormRect::new(0.06, 0.78, 0.46, 0.16),
            number_sweep: NormRect::new(0.0, 0.66, 1.0, 0.34),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub hints: LanguageHints,
    pub gate: GateConfig,
    pub tracker: TrackerConfig,
    pub ocr: OcrConfig,
    pub roi: RoiLayout,
    pub consensus_capacity: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            hints: LanguageHints::default(),
            gate: GateConfig::default(),
            tracker: TrackerConfig::default(),
            ocr: OcrConfig::default(),
            roi: RoiLayout::default(),
            consensus_capacity: 7,
        }
    }
}

impl ScannerConfig {
    pub fn with_hints(hints: LanguageHints) -> Self {
        Self {
            hints,
            ..Self::default()
        }
    }

    /// 从 JSON 加载，缺省字段取默认值
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ScannerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.consensus_capacity == 0 {
            return Err(invalid("consensus_capacity", "must be at least 1"));
        }
        if self.hints.mixed.is_empty() {
            return Err(invalid("hints.mixed", "must not be empty"));
        }
        let t = &self.tracker;
        if !(t.min_aspect > 0.0 && t.min_aspect <= t.max_aspect) {
            return Err(invalid(
                "tracker.min_aspect",
                format!("{} .. {} is not a valid range", t.min_aspect, t.max_aspect),
            ));
        }
        if t.guide.area() <= 0.0 {
            return Err(invalid("tracker.guide", "guide region has no area"));
        }
        for (field, value) in [
            ("tracker.iou_threshold", t.iou_threshold),
            ("tracker.min_confidence", t.min_confidence),
            ("ocr.name_threshold", self.ocr.name_threshold),
            ("ocr.number_threshold", self.ocr.number_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, format!("{} is outside [0, 1]", value)));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ScannerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.consensus_capacity, 7);
        assert_eq!(config.gate.min_frame_gap_ms, 280);
        assert_eq!(config.tracker.dwell_ms, 1000);
    }

    #[test]
    fn test_from_json_partial() {
        let json = r#"{
            "hints": { "mixed": ["ja-JP", "en-US"] },
            "tracker": { "dwell_ms": 600 },
            "consensus_capacity": 5
        }"#;
        let config = ScannerConfig::from_json(json).expect("valid config");
        assert_eq!(config.hints.mixed, vec!["ja-JP", "en-US"]);
        assert_eq!(config.hints.primary, vec!["en-US"]);
        assert_eq!(config.tracker.dwell_ms, 600);
        assert_eq!(config.tracker.iou_threshold, 0.25);
        assert_eq!(config.consensus_capacity, 5);
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        let err = ScannerConfig::from_json(r#"{ "consensus_capacity": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "consensus_capacity",
                ..
            }
        ));

        let err = ScannerConfig::from_json(r#"{ "ocr": { "name_threshold": 1.5 } }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "ocr.name_threshold",
                ..
            }
        ));

        assert!(matches!(
            ScannerConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_japanese_first_preset() {
        let hints = LanguageHints::japanese_first();
        assert_eq!(hints.mixed[0], "ja-JP");
        assert_eq!(hints.secondary, vec!["ja-JP"]);
    }
}
