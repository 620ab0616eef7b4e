//! # 错误类型模块
//!
//! [`StegoError`] 覆盖核心编解码器的全部失败情形。
//! 所有错误都可以在调用方处理，核心逻辑从不直接终止进程。

use std::fmt;

/// 隐写编码或解码过程中可能出现的错误。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StegoError {
    /// 图像的像素组数量不足以容纳头部与载荷。
    InsufficientCapacity { required: usize, available: usize },
    /// 比特串包含 '0' 和 '1' 以外的字符，或者为空。
    MalformedBitstring,
    /// 解码得到的头部无法解析。
    MalformedHeader(String),
    /// 载荷比特长度的十进制表示超过了长度字段的宽度。
    PayloadTooLarge,
    /// 选项文本不是 ASCII，或超过了选项字段的宽度。
    OptionsTooLong,
    /// 像素组大小不是正的完全平方数。
    InvalidGroupSize(u32),
    /// 像素缓冲区的长度与声明的形状不一致，或存在零维度。
    InvalidGridShape {
        height: usize,
        width: usize,
        channels: usize,
        len: usize,
    },
}

impl fmt::Display for StegoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientCapacity {
                required,
                available,
            } => write!(
                f,
                "Not enough space in the image: {required} pixel groups required, {available} available"
            ),
            Self::MalformedBitstring => write!(f, "bitstring is empty or contains non-binary symbols"),
            Self::MalformedHeader(reason) => write!(f, "malformed header: {reason}"),
            Self::PayloadTooLarge => write!(f, "payload length does not fit in the header"),
            Self::OptionsTooLong => write!(f, "options text is not ASCII or does not fit in the header"),
            Self::InvalidGroupSize(size) => {
                write!(f, "group size {size} is not a positive perfect square")
            }
            Self::InvalidGridShape {
                height,
                width,
                channels,
                len,
            } => write!(
                f,
                "a {height}x{width}x{channels} grid cannot hold {len} samples"
            ),
        }
    }
}

impl std::error::Error for StegoError {}
