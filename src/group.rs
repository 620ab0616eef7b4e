//! # 像素组映射模块
//!
//! 一个像素组 (tile) 是边长为 `sqrt(group_size)` 的正方形像素块，共同承载一个比特。
//! 编码时组内每个像素的每个通道都被调整为相同的奇偶性；
//! 解码时默认只读取左上角像素的第 0 个通道。

use crate::error::StegoError;
use crate::grid::ImageGrid;

/// 每个比特占用的像素数量，必须是正的完全平方数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSize {
    size: u32,
    stride: usize,
}

impl GroupSize {
    /// 校验并创建像素组大小。
    ///
    /// # Errors
    ///
    /// `size` 为零或不是完全平方数时，返回 [`StegoError::InvalidGroupSize`]。
    pub fn new(size: u32) -> Result<Self, StegoError> {
        let root = size.isqrt();
        if size == 0 || root * root != size {
            return Err(StegoError::InvalidGroupSize(size));
        }

        Ok(Self {
            size,
            stride: root as usize,
        })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// 每个轴上的步长，即 `sqrt(size)`。
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// 网格在该像素组大小下可用的像素组数量。
    pub fn capacity(&self, grid: &ImageGrid) -> usize {
        (grid.height() / self.stride) * (grid.width() / self.stride)
    }
}

impl Default for GroupSize {
    fn default() -> Self {
        Self { size: 1, stride: 1 }
    }
}

/// 解码单个像素组时读取比特的策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodePolicy {
    /// 只读取左上角像素第 0 个通道的奇偶性。
    #[default]
    Representative,
    /// 对组内全部采样的奇偶性进行多数表决，票数相同时取 0。
    Majority,
}

/// 像素组遍历的状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Scanning { row: usize, col: usize },
    Done,
}

/// 以行优先顺序、步长 `stride` 遍历全部完整像素组的左上角坐标。
///
/// 不足一个完整像素组的右侧列与底部行会被跳过。
#[derive(Debug, Clone)]
pub struct TileWalk {
    state: ScanState,
    stride: usize,
    rows: usize,
    cols: usize,
    visited: usize,
}

impl TileWalk {
    pub fn new(grid: &ImageGrid, group: GroupSize) -> Self {
        let stride = group.stride();
        let rows = grid.height() / stride * stride;
        let cols = grid.width() / stride * stride;
        let state = if rows == 0 || cols == 0 {
            ScanState::Done
        } else {
            ScanState::Scanning { row: 0, col: 0 }
        };

        Self {
            state,
            stride,
            rows,
            cols,
            visited: 0,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// 已经访问过的像素组数量。
    pub fn visited(&self) -> usize {
        self.visited
    }
}

impl Iterator for TileWalk {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let ScanState::Scanning { row, col } = self.state else {
            return None;
        };

        self.state = if col + self.stride < self.cols {
            ScanState::Scanning {
                row,
                col: col + self.stride,
            }
        } else if row + self.stride < self.rows {
            ScanState::Scanning {
                row: row + self.stride,
                col: 0,
            }
        } else {
            ScanState::Done
        };
        self.visited += 1;

        Some((row, col))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let total = (self.rows / self.stride.max(1)) * (self.cols / self.stride.max(1));
        let remaining = total.saturating_sub(self.visited);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TileWalk {}

/// 调整单个采样的奇偶性，使其与 `bit` 一致。
///
/// 偶数需要变为奇数时减一 (0 则加一)；奇数需要变为偶数时减一。
pub fn oddify(sample: u8, bit: bool) -> u8 {
    let odd = sample % 2 == 1;
    match (bit, odd) {
        (true, false) if sample == 0 => 1,
        (true, false) | (false, true) => sample - 1,
        _ => sample,
    }
}

/// 将一个比特写入以 `top_left` 为左上角、边长为 `stride` 的像素组。
///
/// 组内每个像素的每个通道都会被调整为与 `bit` 相同的奇偶性。
/// 调用方需保证整个像素组位于网格范围内，越界的部分不会被写入。
pub fn encode_bit_into_group(
    grid: &mut ImageGrid,
    top_left: (usize, usize),
    stride: usize,
    bit: bool,
) {
    let (top, left) = top_left;
    for row in top..top + stride {
        for col in left..left + stride {
            if let Some(pixel) = grid.pixel_mut(row, col) {
                pixel.iter_mut().for_each(|sample| *sample = oddify(*sample, bit));
            }
        }
    }
}

/// 读取左上角像素第 0 个通道的奇偶性：奇数为 `true`，偶数为 `false`。
pub fn decode_bit_from_group(grid: &ImageGrid, top_left: (usize, usize), stride: usize) -> bool {
    decode_bit_with_policy(grid, top_left, stride, DecodePolicy::Representative)
}

/// 按指定策略从像素组中读取一个比特。网格不会被修改。
pub fn decode_bit_with_policy(
    grid: &ImageGrid,
    top_left: (usize, usize),
    stride: usize,
    policy: DecodePolicy,
) -> bool {
    let (top, left) = top_left;
    match policy {
        DecodePolicy::Representative => grid.get(top, left, 0).is_some_and(|s| s % 2 == 1),
        DecodePolicy::Majority => {
            let (odd, total) = (top..top + stride)
                .flat_map(|row| (left..left + stride).map(move |col| (row, col)))
                .filter_map(move |(row, col)| grid.pixel(row, col))
                .flatten()
                .fold((0usize, 0usize), |(odd, total), &sample| {
                    (odd + usize::from(sample % 2 == 1), total + 1)
                });
            odd * 2 > total
        }
    }
}
