use image::RgbaImage;
use std::time::Duration;

/// 相机帧
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>, // RGBA 格式
    pub timestamp: Duration,
    pub frame_number: u64,
}

impl Frame {
    pub fn new(
        width: u32,
        height: u32,
        data: Vec<u8>,
        timestamp_ms: u64,
        frame_number: u64,
    ) -> Self {
        Self {
            width,
            height,
            data,
            timestamp: Duration::from_millis(timestamp_ms),
            frame_number,
        }
    }

    /// 像素数；尺寸溢出时为 `None`
    pub fn pixel_count(&self) -> Option<usize> {
        plane_len(self.width, self.height)
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self
                .pixel_count()
                .and_then(|pixels| pixels.checked_mul(4))
                .is_some_and(|len| self.data.len() == len)
    }

    /// 复制像素到独立图像；缓冲区大小与尺寸不符时返回 `None`
    pub fn to_image(&self) -> Option<RgbaImage> {
        if !self.is_valid() {
            return None;
        }
        RgbaImage::from_raw(self.width, self.height, self.data.clone())
    }
}

/// 从原生层传递的原始帧数据 (YUV420 planar)
#[derive(Debug)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub y_plane: Vec<u8>,
    pub u_plane: Vec<u8>,
    pub v_plane: Vec<u8>,
    pub timestamp_ms: u64,
    pub frame_number: u64,
}

impl RawFrame {
    pub fn is_valid(&self) -> bool {
        let (Some(luma), Some(chroma)) = (
            plane_len(self.width, self.height),
            plane_len(self.width / 2, self.height / 2),
        ) else {
            return false;
        };
        self.width > 0
            && self.height > 0
            && luma.checked_mul(4).is_some()
            && self.y_plane.len() >= luma
            && self.u_plane.len() >= chroma
            && self.v_plane.len() >= chroma
    }

    /// 调用前需通过 `is_valid`
    pub fn to_rgba(&self) -> Frame {
        let width = self.width as usize;
        let height = self.height as usize;
        let mut rgba_data = vec![0u8; width * height * 4];
        let chroma_width = (width / 2).max(1);

        for y in 0..height {
            for x in 0..width {
                let y_idx = y * width + x;
                let uv_idx = (y / 2) * chroma_width + x / 2;

                let y_val = self.y_plane.get(y_idx).copied().unwrap_or(0) as f32;
                let u_val = self.u_plane.get(uv_idx).copied().unwrap_or(128) as f32 - 128.0;
                let v_val = self.v_plane.get(uv_idx).copied().unwrap_or(128) as f32 - 128.0;

                let r = (y_val + 1.402 * v_val).clamp(0.0, 255.0) as u8;
                let g = (y_val - 0.344136 * u_val - 0.714136 * v_val).clamp(0.0, 255.0) as u8;
                let b = (y_val + 1.772 * u_val).clamp(0.0, 255.0) as u8;

                let rgba_idx = y_idx * 4;
                rgba_data[rgba_idx] = r;
                rgba_data[rgba_idx + 1] = g;
                rgba_data[rgba_idx + 2] = b;
                rgba_data[rgba_idx + 3] = 255;
            }
        }

        Frame::new(
            self.width,
            self.height,
            rgba_data,
            self.timestamp_ms,
            self.frame_number,
        )
    }
}

fn plane_len(width: u32, height: u32) -> Option<usize> {
    (width as usize).checked_mul(height as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let data = vec![255u8; 100 * 100 * 4];
        let frame = Frame::new(100, 100, data, 1000, 30);

        assert_eq!(frame.width, 100);
        assert_eq!(frame.height, 100);
        assert_eq!(frame.pixel_count(), Some(10000));
        assert_eq!(frame.timestamp.as_millis(), 1000);
        assert_eq!(frame.frame_number, 30);
        assert!(frame.is_valid());
    }

    #[test]
    fn test_frame_to_image() {
        let frame = Frame::new(4, 2, vec![7u8; 4 * 2 * 4], 0, 0);
        let img = frame.to_image().expect("valid frame");
        assert_eq!(img.dimensions(), (4, 2));

        let broken = Frame::new(4, 2, vec![0u8; 3], 0, 0);
        assert!(!broken.is_valid());
        assert!(broken.to_image().is_none());
    }

    #[test]
    fn test_yuv_to_rgba() {
        let width = 64;
        let height = 64;

        let raw_frame = RawFrame {
            width,
            height,
            y_plane: vec![128u8; (width * height) as usize],
            u_plane: vec![128u8; (width * height / 4) as usize],
            v_plane: vec![128u8; (width * height / 4) as usize],
            timestamp_ms: 40,
            frame_number: 2,
        };

        assert!(raw_frame.is_valid());
        let frame = raw_frame.to_rgba();
        assert_eq!(frame.width, width);
        assert_eq!(frame.height, height);
        assert_eq!(frame.data.len(), (width * height * 4) as usize);
        // 中性色度保持灰色
        assert_eq!(&frame.data[0..4], &[128, 128, 128, 255]);
        assert_eq!(frame.timestamp.as_millis(), 40);
    }

    #[test]
    fn test_short_planes_invalid() {
        let raw_frame = RawFrame {
            width: 8,
            height: 8,
            y_plane: vec![0u8; 10],
            u_plane: vec![],
            v_plane: vec![],
            timestamp_ms: 0,
            frame_number: 0,
        };
        assert!(!raw_frame.is_valid());
    }

    #[test]
    fn test_oversized_dimensions_rejected() {
        let frame = Frame::new(70_000, 70_000, vec![0u8; 16], 0, 0);
        assert!(!frame.is_valid());
        assert!(frame.to_image().is_none());

        let raw_frame = RawFrame {
            width: 70_000,
            height: 70_000,
            y_plane: vec![],
            u_plane: vec![],
            v_plane: vec![],
            timestamp_ms: 0,
            frame_number: 0,
        };
        assert!(!raw_frame.is_valid());

        let huge = Frame::new(u32::MAX, u32::MAX, vec![], 0, 0);
        assert!(!huge.is_valid());
    }
}
