//! 视觉服务抽象
//!
//! 矩形检测和文字识别由宿主平台提供（iOS Vision / ML Kit / 第三方 OCR），
//! 这里只定义能力边界，流水线逻辑不依赖具体适配层。

use super::config::TrackerConfig;
use super::error::VisionError;
use super::geometry::{PixelRect, Quad};
use image::RgbaImage;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub struct RectangleConstraints {
    pub min_aspect: f32,
    pub max_aspect: f32,
    pub min_size: f32,
    pub min_confidence: f32,
    pub max_results: usize,
}

impl RectangleConstraints {
    pub fn from_config(config: &TrackerConfig) -> Self {
        Self {
            min_aspect: config.min_aspect,
            max_aspect: config.max_aspect,
            min_size: config.min_size,
            min_confidence: config.min_confidence,
            max_results: 1,
        }
    }
}

/// 单行识别结果，`bbox` 为所识别图像的像素坐标
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedLine {
    pub text: String,
    pub confidence: f32,
    pub bbox: PixelRect,
}

impl RecognizedLine {
    pub fn new(text: impl Into<String>, confidence: f32, bbox: PixelRect) -> Self {
        Self {
            text: text.into(),
            confidence,
            bbox,
        }
    }
}

pub trait VisionService: Send + Sync {
    /// 返回最佳候选四边形，没有则 `Ok(None)`
    fn detect_rectangle(
        &self,
        image: &RgbaImage,
        constraints: &RectangleConstraints,
    ) -> Result<Option<Quad>, VisionError>;

    fn recognize_text(
        &self,
        image: &RgbaImage,
        roi: PixelRect,
        language_hints: &[String],
        auto_detect_script: bool,
    ) -> Result<Vec<RecognizedLine>, VisionError>;
}

impl<T: VisionService + ?Sized> VisionService for Arc<T> {
    fn detect_rectangle(
        &self,
        image: &RgbaImage,
        constraints: &RectangleConstraints,
    ) -> Result<Option<Quad>, VisionError> {
        (**self).detect_rectangle(image, constraints)
    }

    fn recognize_text(
        &self,
        image: &RgbaImage,
        roi: PixelRect,
        language_hints: &[String],
        auto_detect_script: bool,
    ) -> Result<Vec<RecognizedLine>, VisionError> {
        (**self).recognize_text(image, roi, language_hints, auto_detect_script)
    }
}

/// 一次文字识别请求的记录
#[derive(Debug, Clone, PartialEq)]
pub struct TextQuery {
    pub image_size: (u32, u32),
    pub roi: PixelRect,
    pub hints: Vec<String>,
    pub auto_detect_script: bool,
}

type TextResponder = dyn Fn(&TextQuery) -> Result<Vec<RecognizedLine>, VisionError> + Send + Sync;

/// 脚本化的视觉服务，用于测试和宿主联调
///
/// 矩形检测按调用顺序消费预设结果，用完后重复最后一个；
/// 文字识别交给闭包按请求内容作答。
pub struct MockVisionService {
    rectangles: Mutex<VecDeque<Result<Option<Quad>, String>>>,
    last_rectangle: Mutex<Option<Quad>>,
    text_responder: Option<Box<TextResponder>>,
    queries: Mutex<Vec<TextQuery>>,
}

impl MockVisionService {
    pub fn new() -> Self {
        Self {
            rectangles: Mutex::new(VecDeque::new()),
            last_rectangle: Mutex::new(None),
            text_responder: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_rectangles(mut self, rectangles: Vec<Option<Quad>>) -> Self {
        self.rectangles = Mutex::new(rectangles.into_iter().map(Ok).collect());
        self
    }

    /// 下一次矩形检测返回错误
    pub fn push_detection_error(&self, message: &str) {
        if let Ok(mut queue) = self.rectangles.lock() {
            queue.push_front(Err(message.to_string()));
        }
    }

    pub fn with_text<F>(mut self, responder: F) -> Self
    where
        F: Fn(&TextQuery) -> Result<Vec<RecognizedLine>, VisionError> + Send + Sync + 'static,
    {
        self.text_responder = Some(Box::new(responder));
        self
    }

    pub fn queries(&self) -> Vec<TextQuery> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

impl Default for MockVisionService {
    fn default() -> Self {
        Self::new()
    }
}

impl VisionService for MockVisionService {
    fn detect_rectangle(
        &self,
        _image: &RgbaImage,
        _constraints: &RectangleConstraints,
    ) -> Result<Option<Quad>, VisionError> {
        let next = self.rectangles.lock().ok().and_then(|mut q| q.pop_front());
        let mut last = self
            .last_rectangle
            .lock()
            .map_err(|e| VisionError::Detection(format!("mock lock poisoned: {}", e)))?;

        match next {
            Some(Ok(quad)) => {
                *last = quad;
                Ok(quad)
            }
            Some(Err(message)) => Err(VisionError::Detection(message)),
            None => Ok(*last),
        }
    }

    fn recognize_text(
        &self,
        image: &RgbaImage,
        roi: PixelRect,
        language_hints: &[String],
        auto_detect_script: bool,
    ) -> Result<Vec<RecognizedLine>, VisionError> {
        let query = TextQuery {
            image_size: image.dimensions(),
            roi,
            hints: language_hints.to_vec(),
            auto_detect_script,
        };
        if let Ok(mut q) = self.queries.lock() {
            q.push(query.clone());
        }

        match &self.text_responder {
            Some(responder) => responder(&query),
            None => Ok(Vec::new()),
        }
    }
}
