use super::config::TrackerConfig;
use super::geometry::{NormRect, Quad};
use super::vision::{RectangleConstraints, VisionService};
use image::RgbaImage;
use log::{debug, warn};

/// 单帧矩形跟踪结果
#[derive(Debug, Clone, PartialEq)]
pub struct TrackObservation {
    pub quad: Option<Quad>,
    pub iou: f32,
    pub aligned: bool,
}

impl TrackObservation {
    fn miss() -> Self {
        Self {
            quad: None,
            iou: 0.0,
            aligned: false,
        }
    }
}

pub struct RectangleTracker {
    constraints: RectangleConstraints,
    /// 已加上容差的取景框
    guide: NormRect,
    iou_threshold: f32,
}

impl RectangleTracker {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            constraints: RectangleConstraints::from_config(config),
            guide: config.guide.expanded(config.guide_margin),
            iou_threshold: config.iou_threshold,
        }
    }

    pub fn observe(&self, vision: &dyn VisionService, image: &RgbaImage) -> TrackObservation {
        let quad = match vision.detect_rectangle(image, &self.constraints) {
            Ok(Some(quad)) if quad.is_finite() => quad,
            Ok(Some(_)) => {
                debug!("📐 rectangle with non-finite corners ignored");
                return TrackObservation::miss();
            }
            Ok(None) => return TrackObservation::miss(),
            Err(e) => {
                warn!("⚠️ rectangle detection failed: {}", e);
                return TrackObservation::miss();
            }
        };

        let iou = quad.bounding_box().iou(&self.guide);
        let aligned = iou >= self.iou_threshold;
        debug!("📐 rectangle iou={:.3} aligned={}", iou, aligned);

        TrackObservation {
            quad: Some(quad),
            iou,
            aligned,
        }
    }
}
