//! 几何基础类型
//!
//! 归一化坐标统一以左上角为原点，x/y ∈ [0, 1]。

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance(&self, other: &Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// 归一化矩形（相对帧宽高的比例）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl NormRect {
    pub const UNIT: NormRect = NormRect {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
    };

    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    pub fn area(&self) -> f32 {
        if self.width <= 0.0 || self.height <= 0.0 {
            0.0
        } else {
            self.width * self.height
        }
    }

    /// 四边各外扩 `margin`，并裁剪到单位正方形内
    pub fn expanded(&self, margin: f32) -> NormRect {
        let x0 = (self.x - margin).max(0.0);
        let y0 = (self.y - margin).max(0.0);
        let x1 = (self.max_x() + margin).min(1.0);
        let y1 = (self.max_y() + margin).min(1.0);
        NormRect::new(x0, y0, (x1 - x0).max(0.0), (y1 - y0).max(0.0))
    }

    pub fn intersection(&self, other: &NormRect) -> Option<NormRect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.max_x().min(other.max_x());
        let y1 = self.max_y().min(other.max_y());
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(NormRect::new(x0, y0, x1 - x0, y1 - y0))
    }

    pub fn iou(&self, other: &NormRect) -> f32 {
        let inter = match self.intersection(other) {
            Some(r) => r.area(),
            None => return 0.0,
        };
        let union = self.area() + other.area() - inter;
        if union <= f32::EPSILON {
            0.0
        } else {
            inter / union
        }
    }

    /// 映射到像素坐标，并裁剪到图像边界内
    pub fn to_pixels(&self, width: u32, height: u32) -> PixelRect {
        let w = width as f32;
        let h = height as f32;
        let x0 = (self.x * w).round().clamp(0.0, w);
        let y0 = (self.y * h).round().clamp(0.0, h);
        let x1 = (self.max_x() * w).round().clamp(0.0, w);
        let y1 = (self.max_y() * h).round().clamp(0.0, h);
        PixelRect::new(
            x0 as u32,
            y0 as u32,
            (x1 - x0).max(0.0) as u32,
            (y1 - y0).max(0.0) as u32,
        )
    }
}

/// 检测到的卡片四边形，角点为归一化坐标
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
    pub confidence: f32,
}

impl Quad {
    pub fn from_rect(rect: NormRect, confidence: f32) -> Self {
        Self {
            top_left: Point::new(rect.x, rect.y),
            top_right: Point::new(rect.max_x(), rect.y),
            bottom_right: Point::new(rect.max_x(), rect.max_y()),
            bottom_left: Point::new(rect.x, rect.max_y()),
            confidence,
        }
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    pub fn is_finite(&self) -> bool {
        self.corners().iter().all(Point::is_finite)
    }

    /// 四个角点的轴对齐包围盒
    pub fn bounding_box(&self) -> NormRect {
        let corners = self.corners();
        let min_x = corners.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let min_y = corners.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_x = corners.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
        let max_y = corners.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        NormRect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// 按帧尺寸换算为像素坐标
    pub fn to_pixels(&self, width: u32, height: u32) -> [Point; 4] {
        let w = width as f32;
        let h = height as f32;
        self.corners().map(|p| Point::new(p.x * w, p.y * h))
    }
}

/// 像素坐标矩形
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn max_x(&self) -> u32 {
        self.x + self.width
    }

    pub fn max_y(&self) -> u32 {
        self.y + self.height
    }

    /// 按自身宽高的比例向外扩展，结果裁剪到 `bounds` (宽, 高) 内
    pub fn widen(&self, margin: f32, bounds: (u32, u32)) -> PixelRect {
        let dx = (self.width as f32 * margin).round() as u32;
        let dy = (self.height as f32 * margin).round() as u32;
        let x0 = self.x.saturating_sub(dx).min(bounds.0);
        let y0 = self.y.saturating_sub(dy).min(bounds.1);
        let x1 = self.max_x().saturating_add(dx).min(bounds.0);
        let y1 = self.max_y().saturating_add(dy).min(bounds.1);
        PixelRect::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }
}
