use thiserror::Error;

/// 视觉服务调用失败（由适配层返回，流水线内部吞掉）
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("rectangle detection failed: {0}")]
    Detection(String),
    #[error("text recognition failed: {0}")]
    Recognition(String),
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON 配置解析失败: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// 单帧未产出结果的原因，只用于统计和日志，不向调用方暴露
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMiss {
    DetectionMiss,
    DegenerateGeometry,
    LowConfidenceRecognition,
    NoContent,
}
