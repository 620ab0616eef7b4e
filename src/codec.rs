//! # 编码器与解码器模块
//!
//! 编码器与解码器以相同的行优先顺序遍历像素组：第 *i* 个比特总是落在第 *i* 个像素组中。
//! 数据流布局为 `[1024 bits 头部][载荷比特]`。
//!
//! 编码前会先比较所需与可用的像素组数量，容量不足时网格保持原样。

use crate::bits::{bytes_to_bits, pack_bits};
use crate::constants::HEADER_BITS;
use crate::error::StegoError;
use crate::grid::ImageGrid;
use crate::group::{
    DecodePolicy, GroupSize, TileWalk, decode_bit_with_policy, encode_bit_into_group,
};
use crate::header::Header;
use log::debug;

/// 编码或解码的进度：已处理的像素组数量与本次操作需要处理的总数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
}

impl Progress {
    /// 进度百分比 (0.0 ~ 100.0)。总数为零时视为已完成。
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            100.0 * self.done as f64 / self.total as f64
        }
    }
}

/// 解码得到的完整消息。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: Header,
    pub payload: Vec<u8>,
}

/// 网格在给定像素组大小下可用的像素组数量。
pub fn capacity(grid: &ImageGrid, group: GroupSize) -> usize {
    group.capacity(grid)
}

/// 网格最多能容纳的载荷字节数 (扣除头部之后)。
pub fn max_payload_bytes(grid: &ImageGrid, group: GroupSize) -> usize {
    capacity(grid, group).saturating_sub(HEADER_BITS) / 8
}

/// 将 `payload` 隐藏到 `grid` 中。
///
/// # Errors
///
/// * [`StegoError::InsufficientCapacity`]：像素组数量少于 `1024 + 8 * payload.len()`。
///   此时网格不会被修改。
/// * [`StegoError::PayloadTooLarge`]：载荷长度无法写入头部。
pub fn encode(payload: &[u8], grid: &mut ImageGrid, group: GroupSize) -> Result<(), StegoError> {
    encode_with_progress(payload, grid, group, |_| {})
}

/// 与 [`encode`] 相同，但每写入一个像素组都会调用一次 `on_progress`。
///
/// # Errors
///
/// 参见 [`encode`]。
pub fn encode_with_progress<F>(
    payload: &[u8],
    grid: &mut ImageGrid,
    group: GroupSize,
    mut on_progress: F,
) -> Result<(), StegoError>
where
    F: FnMut(Progress),
{
    let bits = bytes_to_bits(payload);
    let payload_bits = u64::try_from(bits.len()).map_err(|_| StegoError::PayloadTooLarge)?;
    let mut stream = Header::new(payload_bits).to_bits()?;
    stream.push_str(&bits);

    let required = stream.len();
    let available = capacity(grid, group);
    if required > available {
        return Err(StegoError::InsufficientCapacity {
            required,
            available,
        });
    }

    debug!(
        "Encoding {} payload bits into {required} of {available} pixel groups (group size {})",
        bits.len(),
        group.size()
    );

    let stride = group.stride();
    let walk = TileWalk::new(grid, group);
    for (done, (top_left, symbol)) in walk.zip(stream.bytes()).enumerate() {
        encode_bit_into_group(grid, top_left, stride, symbol == b'1');
        on_progress(Progress {
            done: done + 1,
            total: required,
        });
    }

    Ok(())
}

/// 从 `grid` 中恢复隐藏的载荷。
///
/// # Errors
///
/// * [`StegoError::InsufficientCapacity`]：像素组数量不足以读出头部，或不足以读出头部声明的载荷。
/// * [`StegoError::MalformedHeader`]：头部无法解析，通常表示图像未经编码或像素组大小不匹配。
pub fn decode(grid: &ImageGrid, group: GroupSize) -> Result<Vec<u8>, StegoError> {
    decode_message(grid, group, DecodePolicy::default()).map(|message| message.payload)
}

/// 从 `grid` 中恢复头部与载荷，使用指定的像素组读取策略。
///
/// # Errors
///
/// 参见 [`decode`]。
pub fn decode_message(
    grid: &ImageGrid,
    group: GroupSize,
    policy: DecodePolicy,
) -> Result<Message, StegoError> {
    decode_with_progress(grid, group, policy, |_| {})
}

/// 与 [`decode_message`] 相同，但每读取一个像素组都会调用一次 `on_progress`。
///
/// 读取头部之前总数未知，此阶段报告的总数为头部比特数。
///
/// # Errors
///
/// 参见 [`decode`]。
pub fn decode_with_progress<F>(
    grid: &ImageGrid,
    group: GroupSize,
    policy: DecodePolicy,
    mut on_progress: F,
) -> Result<Message, StegoError>
where
    F: FnMut(Progress),
{
    let available = capacity(grid, group);
    if available < HEADER_BITS {
        return Err(StegoError::InsufficientCapacity {
            required: HEADER_BITS,
            available,
        });
    }

    let stride = group.stride();
    let mut walk = TileWalk::new(grid, group);
    let mut read = |walk: &mut TileWalk, count: usize, total: usize, out: &mut String| {
        for top_left in walk.by_ref().take(count) {
            let bit = decode_bit_with_policy(grid, top_left, stride, policy);
            out.push(if bit { '1' } else { '0' });
            on_progress(Progress {
                done: out.len(),
                total,
            });
        }
    };

    let mut stream = String::with_capacity(HEADER_BITS);
    read(&mut walk, HEADER_BITS, HEADER_BITS, &mut stream);
    let header = Header::parse(&stream)?;

    // 超出 usize 的长度必然大于任何网格的容量
    let required = header
        .payload_bits
        .to_u64()
        .and_then(|bits| usize::try_from(bits).ok())
        .and_then(|bits| bits.checked_add(HEADER_BITS));
    let total = match required {
        Some(total) if total <= available => total,
        _ => {
            return Err(StegoError::InsufficientCapacity {
                required: required.unwrap_or(usize::MAX),
                available,
            });
        }
    };
    let payload_bits = total - HEADER_BITS;
    debug!("Decoding {payload_bits} payload bits from {total} of {available} pixel groups");

    // 沿用同一次遍历，不从头开始
    stream.reserve(payload_bits);
    read(&mut walk, payload_bits, total, &mut stream);

    let payload = pack_bits(&stream[HEADER_BITS..])?;
    Ok(Message { header, payload })
}
