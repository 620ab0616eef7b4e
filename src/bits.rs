//! # 比特串编解码模块
//!
//! 在原始字节序列与规范的大端二进制字符串 (每个字符 '0' 或 '1' 表示一个比特) 之间转换。

use crate::error::StegoError;

/// 将字节序列转换为比特串。
///
/// 每个字节按大端顺序 (最高位在前) 输出 8 个字符，输出长度恒为输入字节数的 8 倍。
pub fn bytes_to_bits(bytes: &[u8]) -> String {
    bytes
        .iter()
        .flat_map(|&byte| (0..8).rev().map(move |shift| (byte >> shift) & 1))
        .map(|bit| if bit == 1 { '1' } else { '0' })
        .collect()
}

/// 将比特串视为一个大端无符号整数，并输出其最小宽度的大端字节序列。
///
/// 数值的前导零字节会被丢弃，因此只应在长度已知的片段 (例如定宽的头部字段) 上使用。
/// 需要保持原始宽度时请使用 [`pack_bits`]。
///
/// # Errors
///
/// 如果比特串为空，或包含 '0' 和 '1' 以外的字符，返回 [`StegoError::MalformedBitstring`]。
pub fn bits_to_bytes(bits: &str) -> Result<Vec<u8>, StegoError> {
    if bits.is_empty() {
        return Err(StegoError::MalformedBitstring);
    }

    let packed = pack_bits(bits)?;
    let first_nonzero = packed
        .iter()
        .position(|&byte| byte != 0)
        .unwrap_or(packed.len());

    Ok(packed[first_nonzero..].to_vec())
}

/// 将比特串按大端顺序打包为 `ceil(len / 8)` 个字节。
///
/// 长度不是 8 的倍数时，在左侧补零。空比特串得到空字节序列。
///
/// # Errors
///
/// 如果比特串包含 '0' 和 '1' 以外的字符，返回 [`StegoError::MalformedBitstring`]。
pub fn pack_bits(bits: &str) -> Result<Vec<u8>, StegoError> {
    let symbols = bits.as_bytes();
    let head = symbols.len() % 8;

    let mut out = Vec::with_capacity(symbols.len().div_ceil(8));
    if head != 0 {
        out.push(fold_byte(&symbols[..head])?);
    }
    for chunk in symbols[head..].chunks_exact(8) {
        out.push(fold_byte(chunk)?);
    }

    Ok(out)
}

fn fold_byte(symbols: &[u8]) -> Result<u8, StegoError> {
    symbols.iter().try_fold(0u8, |acc, &symbol| match symbol {
        b'0' => Ok(acc << 1),
        b'1' => Ok((acc << 1) | 1),
        _ => Err(StegoError::MalformedBitstring),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_prefix_is_left_padded() {
        assert_eq!(pack_bits("1").unwrap(), vec![0x01]);
        assert_eq!(pack_bits("100000000").unwrap(), vec![0x01, 0x00]);
    }

    #[test]
    fn non_binary_symbol_is_rejected() {
        assert_eq!(pack_bits("0102"), Err(StegoError::MalformedBitstring));
        assert_eq!(bits_to_bytes("01 1"), Err(StegoError::MalformedBitstring));
    }
}
