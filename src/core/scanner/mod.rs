//! 卡片实时扫描流水线 - 从相机帧流中稳定识别卡名和卡号
//!
//! 核心流程：
//! 1. 帧节流 - 固定最小间隔，丢弃过密的帧
//! 2. 矩形跟踪 + 驻留门控 - 卡片对准取景框并保持足够时间才输出
//! 3. 几何校正 - 透视拉正，失败时中心裁剪
//! 4. 多语言 OCR - 分层语言提示，低置信度逐级重试
//! 5. 后处理 + 滑动窗口投票 - 抑制单帧误识别

pub mod config;
pub mod consensus;
pub mod error;
pub mod frame;
pub mod frame_gate;
pub mod geometry;
pub mod hit;
pub mod normalizer;
pub mod ocr;
pub mod pipeline;
pub mod roi;
pub mod state_machine;
pub mod text;
pub mod tracker;
pub mod vision;

pub use config::{LanguageHints, ScannerConfig};
pub use consensus::ConsensusWindow;
pub use error::{ConfigError, ScanMiss, VisionError};
pub use frame::{Frame, RawFrame};
pub use geometry::{NormRect, PixelRect, Point, Quad};
pub use hit::ScanHit;
pub use pipeline::{ScanEngine, ScanStats};
pub use state_machine::ScanPhase;
pub use vision::{MockVisionService, RecognizedLine, RectangleConstraints, VisionService};
