use super::config::RoiLayout;
use super::geometry::PixelRect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoiVariant {
    Base,
    Widened,
    /// 编号所在边的大范围扫描区域
    Sweep,
}

/// 校正后卡面上的识别区域
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardRois {
    pub name: PixelRect,
    pub number: PixelRect,
    pub number_sweep: PixelRect,
    pub bounds: (u32, u32),
    widen_margin: f32,
}

impl CardRois {
    pub fn name_variant(&self, variant: RoiVariant) -> PixelRect {
        match variant {
            RoiVariant::Base | RoiVariant::Sweep => self.name,
            RoiVariant::Widened => self.name.widen(self.widen_margin, self.bounds),
        }
    }

    pub fn number_variant(&self, variant: RoiVariant) -> PixelRect {
        match variant {
            RoiVariant::Base => self.number,
            RoiVariant::Widened => self.number.widen(self.widen_margin, self.bounds),
            RoiVariant::Sweep => self.number_sweep,
        }
    }
}

pub struct RoiExtractor {
    layout: RoiLayout,
    widen_margin: f32,
}

impl RoiExtractor {
    pub fn new(layout: RoiLayout, widen_margin: f32) -> Self {
        Self {
            layout,
            widen_margin,
        }
    }

    pub fn extract(&self, width: u32, height: u32) -> CardRois {
        CardRois {
            name: self.layout.name.to_pixels(width, height),
            number: self.layout.number.to_pixels(width, height),
            number_sweep: self.layout.number_sweep.to_pixels(width, height),
            bounds: (width, height),
            widen_margin: self.widen_margin,
        }
    }
}

impl Default for RoiExtractor {
    fn default() -> Self {
        Self::new(RoiLayout::default(), 0.25)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bands() {
        let rois = RoiExtractor::default().extract(500, 700);

        assert_eq!(rois.name, PixelRect::new(30, 42, 310, 126));
        assert_eq!(rois.number, PixelRect::new(30, 546, 230, 112));
        // 名称在上半部，编号在下半部
        assert!(rois.name.max_y() < 350);
        assert!(rois.number.y > 350);
    }

    #[test]
    fn test_widened_stays_in_bounds() {
        let rois = RoiExtractor::default().extract(500, 700);
        let wide = rois.number_variant(RoiVariant::Widened);

        assert!(wide.x < rois.number.x);
        assert!(wide.width > rois.number.width);
        assert!(wide.max_x() <= 500);
        assert!(wide.max_y() <= 700);

        let name = rois.name_variant(RoiVariant::Widened);
        assert_eq!(name.y, 42 - 32);
    }

    #[test]
    fn test_sweep_spans_width() {
        let rois = RoiExtractor::default().extract(500, 700);
        let sweep = rois.number_variant(RoiVariant::Sweep);
        assert_eq!(sweep.x, 0);
        assert_eq!(sweep.width, 500);
        assert_eq!(sweep.max_y(), 700);
    }
}
