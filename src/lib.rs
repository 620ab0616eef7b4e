//! # pixgroup_stego 库
//!
//! 本库包含基于像素奇偶性的 LSB 隐写工具的核心逻辑：
//! 比特串编解码、定长头部、像素组映射以及编码器/解码器。
//! 核心只处理解码后的采样网格 ([`grid::ImageGrid`])，不直接接触压缩后的图像文件字节。

// 声明库包含的所有模块。

pub mod bits;
pub mod cli;
pub mod codec;
pub mod constants;
pub mod error;
pub mod grid;
pub mod group;
pub mod handler;
pub mod header;

pub use codec::{Message, Progress, decode, decode_message, encode};
pub use error::StegoError;
pub use grid::ImageGrid;
pub use group::{DecodePolicy, GroupSize};
pub use header::{Header, PayloadLength};
