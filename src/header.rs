//! # 头部构建与解析模块
//!
//! 每个编码流都以 1024 bits 的定长头部开始：
//!
//! * 长度字段：载荷比特数的十进制 ASCII 文本，左侧以 '0' 填充至 64 个字符。
//! * 选项字段：保留的 ASCII 文本，右侧以空格填充至 64 个字符。
//!
//! 两个字段都经过 [`bytes_to_bits`] 编码，各占 512 bits。

use crate::bits::{bits_to_bytes, bytes_to_bits};
use crate::constants::{HEADER_BITS, HEADER_FIELD_BITS, HEADER_FIELD_WIDTH, OPTIONS_PLACEHOLDER};
use crate::error::StegoError;
use log::debug;
use std::fmt;

/// 载荷比特数，以去除前导零的十进制数字保存。
///
/// 长度字段最多容纳 64 位十进制数字，超出任何整数类型的范围，
/// 因此这里不做数值转换；需要时通过 [`PayloadLength::to_u64`] 获取数值。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PayloadLength {
    digits: String,
}

impl PayloadLength {
    /// 从十进制文本创建长度，前导零会被去除。
    ///
    /// # Errors
    ///
    /// 文本为空或包含数字以外的字符时，返回 [`StegoError::MalformedHeader`]。
    pub fn from_decimal(text: &str) -> Result<Self, StegoError> {
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(StegoError::MalformedHeader(format!(
                "length field {text:?} is not a non-negative decimal integer"
            )));
        }

        let trimmed = text.trim_start_matches('0');
        let digits = if trimmed.is_empty() { "0" } else { trimmed };
        Ok(Self {
            digits: digits.to_string(),
        })
    }

    /// 十进制数字 (无前导零)。
    pub fn digits(&self) -> &str {
        &self.digits
    }

    /// 数值超出 `u64` 时返回 `None`。
    pub fn to_u64(&self) -> Option<u64> {
        self.digits.parse().ok()
    }
}

impl From<u64> for PayloadLength {
    fn from(value: u64) -> Self {
        Self {
            digits: value.to_string(),
        }
    }
}

impl fmt::Display for PayloadLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digits)
    }
}

/// 解析后的头部内容。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// 紧随头部之后的载荷比特数。
    pub payload_bits: PayloadLength,
    /// 去除尾部填充后的选项文本。
    pub options: String,
}

impl Header {
    /// 使用默认占位选项创建头部。
    pub fn new(payload_bits: impl Into<PayloadLength>) -> Self {
        Self {
            payload_bits: payload_bits.into(),
            options: OPTIONS_PLACEHOLDER.to_string(),
        }
    }

    /// 将头部编码为恰好 [`HEADER_BITS`] 个比特。
    ///
    /// # Errors
    ///
    /// * 长度的十进制表示超过 64 个字符时返回 [`StegoError::PayloadTooLarge`]。
    /// * 选项文本不是 ASCII 或超过 64 个字符时返回 [`StegoError::OptionsTooLong`]。
    pub fn to_bits(&self) -> Result<String, StegoError> {
        let length = self.payload_bits.digits();
        if length.len() > HEADER_FIELD_WIDTH {
            return Err(StegoError::PayloadTooLarge);
        }
        if !self.options.is_ascii() || self.options.len() > HEADER_FIELD_WIDTH {
            return Err(StegoError::OptionsTooLong);
        }

        let length_field = format!("{length:0>width$}", width = HEADER_FIELD_WIDTH);
        let options_field = format!("{:<width$}", self.options, width = HEADER_FIELD_WIDTH);

        let mut bits = bytes_to_bits(length_field.as_bytes());
        bits.push_str(&bytes_to_bits(options_field.as_bytes()));

        debug!(
            "Built header: {} payload bits, options {:?}",
            self.payload_bits, self.options
        );
        Ok(bits)
    }

    /// 从恰好 [`HEADER_BITS`] 个比特中解析头部。
    ///
    /// # Errors
    ///
    /// 比特数不正确、长度字段不是合法的非负十进制整数，或者选项字段无法解码时，
    /// 返回 [`StegoError::MalformedHeader`]。这通常意味着图像中没有隐藏数据，
    /// 或者编码与解码使用了不同的像素组大小。
    pub fn parse(bits: &str) -> Result<Self, StegoError> {
        if bits.len() != HEADER_BITS || !bits.is_ascii() {
            return Err(StegoError::MalformedHeader(format!(
                "expected {HEADER_BITS} header bits, got {}",
                bits.len()
            )));
        }
        let (length_bits, options_bits) = bits.split_at(HEADER_FIELD_BITS);

        let length_bytes = bits_to_bytes(length_bits)?;
        let length = std::str::from_utf8(&length_bytes)
            .map_err(|_| StegoError::MalformedHeader("length field is not text".to_string()))?;
        let payload_bits = PayloadLength::from_decimal(length)?;

        let options_bytes = bits_to_bytes(options_bits)?;
        let options = String::from_utf8(options_bytes)
            .map_err(|_| StegoError::MalformedHeader("options field is not text".to_string()))?
            .trim_end_matches(' ')
            .to_string();

        debug!("Parsed header: {payload_bits} payload bits, options {options:?}");
        Ok(Self {
            payload_bits,
            options,
        })
    }
}

/// 为给定的载荷比特数构建带有默认选项的头部比特串。
///
/// # Errors
///
/// 参见 [`Header::to_bits`]。
pub fn build_header(payload_bits: impl Into<PayloadLength>) -> Result<String, StegoError> {
    Header::new(payload_bits).to_bits()
}

/// 解析头部比特串，返回载荷比特数与选项文本。
///
/// # Errors
///
/// 参见 [`Header::parse`]。
pub fn parse_header(bits: &str) -> Result<(PayloadLength, String), StegoError> {
    let header = Header::parse(bits)?;
    Ok((header.payload_bits, header.options))
}
