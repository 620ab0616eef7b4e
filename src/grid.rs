//! # 像素网格模块
//!
//! [`ImageGrid`] 是一个按 `[row][col][channel]` 索引的三维采样缓冲区，
//! 与任何图像容器格式解耦。与 `image` crate 之间的转换也在此处完成。

use crate::error::StegoError;
use image::{DynamicImage, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};

/// 解码后的图像采样网格 (高 × 宽 × 通道)，每个采样取值 0..=255。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageGrid {
    height: usize,
    width: usize,
    channels: usize,
    samples: Vec<u8>,
}

impl ImageGrid {
    /// 使用行优先排列的采样数据创建网格。
    ///
    /// # Errors
    ///
    /// 任一维度为零，或者 `samples.len() != height * width * channels` 时，
    /// 返回 [`StegoError::InvalidGridShape`]。
    pub fn new(
        height: usize,
        width: usize,
        channels: usize,
        samples: Vec<u8>,
    ) -> Result<Self, StegoError> {
        let expected = height
            .checked_mul(width)
            .and_then(|n| n.checked_mul(channels));
        if height == 0 || width == 0 || channels == 0 || expected != Some(samples.len()) {
            return Err(StegoError::InvalidGridShape {
                height,
                width,
                channels,
                len: samples.len(),
            });
        }

        Ok(Self {
            height,
            width,
            channels,
            samples,
        })
    }

    /// 创建所有采样都等于 `value` 的网格。
    ///
    /// # Errors
    ///
    /// 参见 [`ImageGrid::new`]。
    pub fn filled(
        height: usize,
        width: usize,
        channels: usize,
        value: u8,
    ) -> Result<Self, StegoError> {
        let len = height.saturating_mul(width).saturating_mul(channels);
        Self::new(height, width, channels, vec![value; len])
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// 返回 `(height, width, channels)`。
    pub fn dimensions(&self) -> (usize, usize, usize) {
        (self.height, self.width, self.channels)
    }

    /// 读取一个采样。坐标越界时返回 `None`。
    pub fn get(&self, row: usize, col: usize, channel: usize) -> Option<u8> {
        self.offset(row, col, channel)
            .and_then(|offset| self.samples.get(offset).copied())
    }

    /// 单个采样的可变引用。坐标越界时返回 `None`。
    pub fn get_mut(&mut self, row: usize, col: usize, channel: usize) -> Option<&mut u8> {
        let offset = self.offset(row, col, channel)?;
        self.samples.get_mut(offset)
    }

    /// 单个像素的全部通道。坐标越界时返回 `None`。
    pub fn pixel(&self, row: usize, col: usize) -> Option<&[u8]> {
        let start = self.offset(row, col, 0)?;
        self.samples.get(start..start + self.channels)
    }

    /// 单个像素的全部通道 (可变)。坐标越界时返回 `None`。
    pub fn pixel_mut(&mut self, row: usize, col: usize) -> Option<&mut [u8]> {
        let start = self.offset(row, col, 0)?;
        self.samples.get_mut(start..start + self.channels)
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// 转换回 `image` crate 的图像，颜色类型由通道数决定。
    ///
    /// # Errors
    ///
    /// 通道数大于 4，或尺寸超出 `u32` 时返回 [`StegoError::InvalidGridShape`]。
    pub fn into_image(self) -> Result<DynamicImage, StegoError> {
        let shape_error = StegoError::InvalidGridShape {
            height: self.height,
            width: self.width,
            channels: self.channels,
            len: self.samples.len(),
        };
        let (Ok(width), Ok(height)) = (u32::try_from(self.width), u32::try_from(self.height))
        else {
            return Err(shape_error);
        };

        let samples = self.samples;
        let image = match self.channels {
            1 => GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8),
            2 => GrayAlphaImage::from_raw(width, height, samples).map(DynamicImage::ImageLumaA8),
            3 => RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8),
            4 => RgbaImage::from_raw(width, height, samples).map(DynamicImage::ImageRgba8),
            _ => None,
        };

        image.ok_or(shape_error)
    }

    fn offset(&self, row: usize, col: usize, channel: usize) -> Option<usize> {
        (row < self.height && col < self.width && channel < self.channels)
            .then(|| (row * self.width + col) * self.channels + channel)
    }
}

impl TryFrom<DynamicImage> for ImageGrid {
    type Error = StegoError;

    /// 8 位灰度、灰度 + Alpha、RGB、RGBA 图像保留原有通道数；
    /// 其他采样类型带 Alpha 时转换为 RGBA8，否则转换为 RGB8。
    fn try_from(image: DynamicImage) -> Result<Self, Self::Error> {
        let (width, height, channels, samples) = match image {
            DynamicImage::ImageLuma8(buf) => (buf.width(), buf.height(), 1, buf.into_raw()),
            DynamicImage::ImageLumaA8(buf) => (buf.width(), buf.height(), 2, buf.into_raw()),
            DynamicImage::ImageRgb8(buf) => (buf.width(), buf.height(), 3, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => (buf.width(), buf.height(), 4, buf.into_raw()),
            other if other.color().has_alpha() => {
                let buf = other.to_rgba8();
                (buf.width(), buf.height(), 4, buf.into_raw())
            }
            other => {
                let buf = other.to_rgb8();
                (buf.width(), buf.height(), 3, buf.into_raw())
            }
        };

        Self::new(height as usize, width as usize, channels, samples)
    }
}
