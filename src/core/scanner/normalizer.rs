//! 卡面几何校正
//!
//! 有检测框时做透视校正，否则退回中心裁剪；横向结果旋转为竖向。

use super::geometry::{Point, Quad};
use image::{imageops, RgbaImage};
use log::debug;
use rayon::prelude::*;

/// 标准卡片宽高比 (63mm x 88mm)
const CARD_ASPECT: f32 = 0.716;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CardSource {
    Perspective,
    /// 中心裁剪；`degenerate` 表示有检测框但校正结果不可用
    Fallback { degenerate: bool },
}

#[derive(Debug, Clone)]
pub struct NormalizedCard {
    pub image: RgbaImage,
    pub source: CardSource,
    pub rotated: bool,
}

impl NormalizedCard {
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

pub struct GeometricNormalizer {
    min_dimension: u32,
    fallback_width_ratio: f32,
}

impl GeometricNormalizer {
    pub fn new() -> Self {
        Self {
            min_dimension: 8,
            fallback_width_ratio: 0.62,
        }
    }

    /// 返回 `None` 表示本帧无法得到可用图像
    pub fn normalize(&self, frame: &RgbaImage, quad: Option<&Quad>) -> Option<NormalizedCard> {
        let (image, source) = match quad {
            Some(quad) => match self.correct_perspective(frame, quad) {
                Some(img) => (img, CardSource::Perspective),
                None => {
                    debug!("📐 degenerate perspective output, using center crop");
                    (
                        self.fallback_crop(frame)?,
                        CardSource::Fallback { degenerate: true },
                    )
                }
            },
            None => (
                self.fallback_crop(frame)?,
                CardSource::Fallback { degenerate: false },
            ),
        };

        let (w, h) = image.dimensions();
        let (image, rotated) = if w > h {
            (imageops::rotate90(&image), true)
        } else {
            (image, false)
        };

        let (w, h) = image.dimensions();
        if w < self.min_dimension || h < self.min_dimension {
            debug!("📐 normalized image too small: {}x{}", w, h);
            return None;
        }

        Some(NormalizedCard {
            image,
            source,
            rotated,
        })
    }

    fn correct_perspective(&self, frame: &RgbaImage, quad: &Quad) -> Option<RgbaImage> {
        if !quad.is_finite() {
            return None;
        }
        let (fw, fh) = frame.dimensions();
        let corners = quad.to_pixels(fw, fh);
        warp_perspective(frame, corners, self.min_dimension, fw.max(fh) * 2)
    }

    /// 居中裁剪：宽取帧宽的 62%，高按卡片比例推算并限制在帧内
    pub fn fallback_crop(&self, frame: &RgbaImage) -> Option<RgbaImage> {
        let (fw, fh) = frame.dimensions();
        if fw == 0 || fh == 0 {
            return None;
        }

        let crop_w = ((fw as f32 * self.fallback_width_ratio).round() as u32).clamp(1, fw);
        let crop_h = ((crop_w as f32 / CARD_ASPECT).round() as u32).clamp(1, fh);
        let x = (fw - crop_w) / 2;
        let y = (fh - crop_h) / 2;

        Some(imageops::crop_imm(frame, x, y, crop_w, crop_h).to_image())
    }
}

impl Default for GeometricNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// 单位正方形 -> 四边形 的射影变换
#[derive(Debug, Clone, Copy)]
struct Homography {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
    g: f32,
    h: f32,
}

impl Homography {
    /// 角点顺序: (0,0) (1,0) (1,1) (0,1)
    fn square_to_quad(p: [Point; 4]) -> Option<Self> {
        let dx1 = p[1].x - p[2].x;
        let dx2 = p[3].x - p[2].x;
        let dx3 = p[0].x - p[1].x + p[2].x - p[3].x;
        let dy1 = p[1].y - p[2].y;
        let dy2 = p[3].y - p[2].y;
        let dy3 = p[0].y - p[1].y + p[2].y - p[3].y;

        let den = dx1 * dy2 - dx2 * dy1;
        if !den.is_finite() || den.abs() < 1e-6 {
            return None;
        }

        let g = (dx3 * dy2 - dx2 * dy3) / den;
        let h = (dx1 * dy3 - dx3 * dy1) / den;

        Some(Self {
            a: p[1].x - p[0].x + g * p[1].x,
            b: p[3].x - p[0].x + h * p[3].x,
            c: p[0].x,
            d: p[1].y - p[0].y + g * p[1].y,
            e: p[3].y - p[0].y + h * p[3].y,
            f: p[0].y,
            g,
            h,
        })
    }

    fn map(&self, u: f32, v: f32) -> Option<(f32, f32)> {
        let w = self.g * u + self.h * v + 1.0;
        if w.abs() < 1e-6 {
            return None;
        }
        Some((
            (self.a * u + self.b * v + self.c) / w,
            (self.d * u + self.e * v + self.f) / w,
        ))
    }
}

/// 将像素坐标四边形（左上、右上、右下、左下）拉正为矩形图像
///
/// 输出尺寸取对边中较长者；小于 `min_dimension` 或大于 `max_dimension` 视为退化。
pub fn warp_perspective(
    src: &RgbaImage,
    corners: [Point; 4],
    min_dimension: u32,
    max_dimension: u32,
) -> Option<RgbaImage> {
    if !corners.iter().all(Point::is_finite) {
        return None;
    }
    let [tl, tr, br, bl] = corners;
    let out_w = tl.distance(&tr).max(bl.distance(&br)).round();
    let out_h = tl.distance(&bl).max(tr.distance(&br)).round();
    if !out_w.is_finite() || !out_h.is_finite() {
        return None;
    }
    let min = min_dimension as f32;
    let max = max_dimension as f32;
    if out_w < min || out_h < min || out_w > max || out_h > max {
        return None;
    }

    let homography = Homography::square_to_quad(corners)?;
    let out_w = out_w as u32;
    let out_h = out_h as u32;
    let row_bytes = out_w as usize * 4;
    let mut data = vec![0u8; row_bytes * out_h as usize];

    data.par_chunks_mut(row_bytes)
        .enumerate()
        .for_each(|(y, row)| {
            let v = (y as f32 + 0.5) / out_h as f32;
            for x in 0..out_w as usize {
                let u = (x as f32 + 0.5) / out_w as f32;
                if let Some((sx, sy)) = homography.map(u, v) {
                    let px = sample_bilinear(src, sx, sy);
                    row[x * 4..x * 4 + 4].copy_from_slice(&px);
                }
            }
        });

    RgbaImage::from_raw(out_w, out_h, data)
}

/// 以像素中心为采样点的双线性插值，越界时贴边
fn sample_bilinear(src: &RgbaImage, x: f32, y: f32) -> [u8; 4] {
    let (w, h) = src.dimensions();
    if w == 0 || h == 0 {
        return [0, 0, 0, 0];
    }
    let fx = (x - 0.5).clamp(0.0, (w - 1) as f32);
    let fy = (y - 0.5).clamp(0.0, (h - 1) as f32);
    let x0 = fx.floor() as u32;
    let y0 = fy.floor() as u32;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let tx = fx - x0 as f32;
    let ty = fy - y0 as f32;

    let p00 = src.get_pixel(x0, y0).0;
    let p10 = src.get_pixel(x1, y0).0;
    let p01 = src.get_pixel(x0, y1).0;
    let p11 = src.get_pixel(x1, y1).0;

    let mut out = [0u8; 4];
    for i in 0..4 {
        let top = p00[i] as f32 * (1.0 - tx) + p10[i] as f32 * tx;
        let bottom = p01[i] as f32 * (1.0 - tx) + p11[i] as f32 * tx;
        out[i] = (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8;
    }
    out
}
