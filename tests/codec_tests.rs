use pixgroup_stego::bits::{bits_to_bytes, bytes_to_bits, pack_bits};
use pixgroup_stego::codec::{self, Progress, max_payload_bytes};
use pixgroup_stego::constants::{HEADER_BITS, OPTIONS_PLACEHOLDER};
use pixgroup_stego::group::{TileWalk, decode_bit_from_group, encode_bit_into_group};
use pixgroup_stego::header::{Header, PayloadLength, build_header, parse_header};
use pixgroup_stego::{DecodePolicy, GroupSize, ImageGrid, StegoError, decode, decode_message, encode};
use rand::RngCore;

/// 一个辅助函数，用于创建一个带有随机采样的测试网格
fn random_grid(height: usize, width: usize, channels: usize) -> ImageGrid {
    let mut samples = vec![0u8; height * width * channels];
    rand::rng().fill_bytes(&mut samples);
    ImageGrid::new(height, width, channels, samples).expect("valid grid shape")
}

/// 验证不同像素组大小下的完整往返流程，包括空载荷与以零字节开头的载荷
#[test]
fn test_round_trip_for_all_group_sizes() -> anyhow::Result<()> {
    // (像素组大小, 网格边长)，网格边长保证容量足够
    let cases = [(1, 64), (4, 80), (9, 99), (16, 136)];
    let payloads: [&[u8]; 4] = [b"", b"Hi", &[0x00, 0x00, 0x05], &[0xFF, 0x00, 0x80, 0x01]];

    for (size, side) in cases {
        let group = GroupSize::new(size)?;
        for payload in payloads {
            let mut grid = random_grid(side, side, 3);
            encode(payload, &mut grid, group)?;
            assert_eq!(
                decode(&grid, group)?,
                payload,
                "round trip failed for group size {size}"
            );
        }
    }

    Ok(())
}

/// 验证一个较大的随机载荷能够填满网格的全部容量
#[test]
fn test_round_trip_at_full_capacity() -> anyhow::Result<()> {
    let group = GroupSize::default();
    let mut grid = random_grid(64, 64, 3);
    let limit = max_payload_bytes(&grid, group);
    assert_eq!(limit, (64 * 64 - HEADER_BITS) / 8);

    let mut payload = vec![0u8; limit];
    rand::rng().fill_bytes(&mut payload);
    encode(&payload, &mut grid, group)?;
    assert_eq!(decode(&grid, group)?, payload);

    let too_large = vec![1u8; limit + 1];
    assert!(matches!(
        encode(&too_large, &mut grid, group),
        Err(StegoError::InsufficientCapacity { .. })
    ));

    Ok(())
}

/// 验证头部的构建与解析互为逆操作
#[test]
fn test_header_exactness() -> anyhow::Result<()> {
    for n in [0, 1, 16, 1040, 4_294_967_296, u64::MAX] {
        let bits = build_header(n)?;
        assert_eq!(bits.len(), HEADER_BITS);
        assert_eq!(
            parse_header(&bits)?,
            (PayloadLength::from(n), OPTIONS_PLACEHOLDER.to_string())
        );
    }

    // 长度字段可以容纳超出任何整数类型的 64 位十进制数
    let huge = [format!("1{}", "0".repeat(30)), "9".repeat(64)];
    for digits in huge {
        let length = PayloadLength::from_decimal(&digits)?;
        let (parsed, options) = parse_header(&build_header(length.clone())?)?;
        assert_eq!(parsed, length);
        assert_eq!(parsed.digits(), digits);
        assert_eq!(parsed.to_u64(), None);
        assert_eq!(options, OPTIONS_PLACEHOLDER);
    }

    let custom = Header {
        payload_bits: PayloadLength::from(42u64),
        options: "gzip".to_string(),
    };
    assert_eq!(Header::parse(&custom.to_bits()?)?, custom);

    Ok(())
}

/// 验证头部字段的具体布局：左侧补 '0' 的十进制长度与右侧补空格的选项
#[test]
fn test_header_layout() -> anyhow::Result<()> {
    let bits = build_header(16u64)?;
    let length_field = format!("{:0>64}", 16);
    let options_field = format!("{OPTIONS_PLACEHOLDER:<64}");

    assert_eq!(&bits[..512], bytes_to_bits(length_field.as_bytes()));
    assert_eq!(&bits[512..], bytes_to_bits(options_field.as_bytes()));

    Ok(())
}

/// 验证无法解析的头部与过长的选项会被拒绝
#[test]
fn test_header_rejects_malformed_input() {
    // 全零的长度字段没有任何数字
    let zeros = "0".repeat(HEADER_BITS);
    assert!(matches!(
        Header::parse(&zeros),
        Err(StegoError::MalformedHeader(_))
    ));

    // 长度字段包含非数字字符
    let mut bits = bytes_to_bits(format!("{:0>64}", "-5").as_bytes());
    bits.push_str(&bytes_to_bits(&[b' '; 64]));
    assert!(matches!(
        Header::parse(&bits),
        Err(StegoError::MalformedHeader(_))
    ));

    assert!(matches!(
        Header::parse("0101"),
        Err(StegoError::MalformedHeader(_))
    ));

    let oversized = Header {
        payload_bits: PayloadLength::from(0u64),
        options: "x".repeat(65),
    };
    assert_eq!(oversized.to_bits(), Err(StegoError::OptionsTooLong));
}

/// 十进制长度超过 64 位数字时无法写入头部
#[test]
fn test_header_rejects_oversized_length() -> anyhow::Result<()> {
    let too_long = PayloadLength::from_decimal(&format!("1{}", "0".repeat(64)))?;
    assert_eq!(build_header(too_long), Err(StegoError::PayloadTooLarge));

    // 前导零不计入长度
    let padded = PayloadLength::from_decimal(&format!("{}7", "0".repeat(80)))?;
    assert_eq!(padded.digits(), "7");
    assert_eq!(padded.to_u64(), Some(7));

    assert!(PayloadLength::from_decimal("").is_err());
    assert!(PayloadLength::from_decimal("+12").is_err());

    Ok(())
}

/// 头部声明的长度超出整数范围时，解码报告容量不足而不是头部错误
#[test]
fn test_decode_huge_declared_length_is_insufficient_capacity() -> anyhow::Result<()> {
    let group = GroupSize::default();
    let mut grid = random_grid(64, 64, 3);
    let header = build_header(PayloadLength::from_decimal(&format!("1{}", "0".repeat(30)))?)?;

    for (top_left, symbol) in TileWalk::new(&grid, group).zip(header.bytes()) {
        encode_bit_into_group(&mut grid, top_left, 1, symbol == b'1');
    }

    assert_eq!(
        decode(&grid, group),
        Err(StegoError::InsufficientCapacity {
            required: usize::MAX,
            available: 64 * 64,
        })
    );

    Ok(())
}

/// 验证容量边界：恰好 T 个像素组时成功，T - 1 个时失败且网格保持不变
#[test]
fn test_capacity_boundary() -> anyhow::Result<()> {
    let group = GroupSize::default();
    let required = HEADER_BITS + 16;

    let mut exact = random_grid(1, required, 1);
    encode(b"Hi", &mut exact, group)?;
    assert_eq!(decode(&exact, group)?, b"Hi");

    let mut short = random_grid(1, required - 1, 1);
    let before = short.clone();
    assert_eq!(
        encode(b"Hi", &mut short, group),
        Err(StegoError::InsufficientCapacity {
            required,
            available: required - 1,
        })
    );
    assert_eq!(short, before, "a failed encode must not touch the grid");

    Ok(())
}

/// 验证解码时的容量检查：头部之前与头部声明的载荷之后
#[test]
fn test_decode_capacity_errors() -> anyhow::Result<()> {
    let group = GroupSize::default();

    let tiny = random_grid(10, 10, 3);
    assert_eq!(
        decode(&tiny, group),
        Err(StegoError::InsufficientCapacity {
            required: HEADER_BITS,
            available: 100,
        })
    );

    // 截断一张已编码的网格，使其只剩头部和部分载荷
    let mut full = random_grid(1, HEADER_BITS + 16, 1);
    encode(b"Hi", &mut full, group)?;
    let truncated = ImageGrid::new(1, HEADER_BITS + 6, 1, full.samples()[..HEADER_BITS + 6].to_vec())?;
    assert_eq!(
        decode(&truncated, group),
        Err(StegoError::InsufficientCapacity {
            required: HEADER_BITS + 16,
            available: HEADER_BITS + 6,
        })
    );

    Ok(())
}

/// 未经编码的图像无法得到合法头部
#[test]
fn test_decode_plain_image_is_malformed() -> anyhow::Result<()> {
    let grid = ImageGrid::filled(64, 64, 3, 0)?;
    assert!(matches!(
        decode(&grid, GroupSize::default()),
        Err(StegoError::MalformedHeader(_))
    ));
    Ok(())
}

/// 验证像素组大小的校验
#[test]
fn test_group_size_validation() {
    for size in [1, 4, 9, 16] {
        let group = GroupSize::new(size).expect("perfect squares are accepted");
        assert_eq!(group.stride() * group.stride(), size as usize);
    }
    for size in [0, 2, 3, 5, 7] {
        assert_eq!(GroupSize::new(size), Err(StegoError::InvalidGroupSize(size)));
    }
}

/// 验证比特串编解码
#[test]
fn test_bit_codec() -> anyhow::Result<()> {
    assert_eq!(bytes_to_bits(b"Hi"), "0100100001101001");
    assert_eq!(bytes_to_bits(&[]), "");

    let samples: [&[u8]; 3] = [b"Hello World", &[0x01], &[0x80, 0x00, 0x00]];
    for bytes in samples {
        assert_eq!(bits_to_bytes(&bytes_to_bits(bytes))?, bytes);
    }

    // 整数语义会丢弃前导零字节，定宽打包则保留它们
    let leading_zero = [0x00, 0x41];
    assert_eq!(bits_to_bytes(&bytes_to_bits(&leading_zero))?, vec![0x41]);
    assert_eq!(pack_bits(&bytes_to_bits(&leading_zero))?, leading_zero);

    assert_eq!(bits_to_bytes(""), Err(StegoError::MalformedBitstring));
    assert_eq!(bits_to_bytes("10x1"), Err(StegoError::MalformedBitstring));

    Ok(())
}

/// 具体场景："Hi" 写入 64x64x3 网格，占用 1040 个像素组
#[test]
fn test_hi_scenario() -> anyhow::Result<()> {
    let group = GroupSize::default();
    let original = random_grid(64, 64, 3);
    let mut grid = original.clone();
    encode(b"Hi", &mut grid, group)?;

    let read: String = TileWalk::new(&grid, group)
        .take(HEADER_BITS + 16)
        .map(|top_left| {
            if decode_bit_from_group(&grid, top_left, 1) {
                '1'
            } else {
                '0'
            }
        })
        .collect();
    assert_eq!(&read[..HEADER_BITS], build_header(16u64)?);
    assert_eq!(&read[HEADER_BITS..], "0100100001101001");

    // 第 1040 个像素组之后的像素保持不变
    let touched = (HEADER_BITS + 16) * 3;
    assert_eq!(&grid.samples()[touched..], &original.samples()[touched..]);

    assert_eq!(decode(&grid, group)?, b"Hi");
    Ok(())
}

/// 验证奇偶性映射的边界值
#[test]
fn test_parity_mapping() -> anyhow::Result<()> {
    let mut zero = ImageGrid::filled(1, 1, 1, 0)?;
    encode_bit_into_group(&mut zero, (0, 0), 1, true);
    assert_eq!(zero.get(0, 0, 0), Some(1));

    let mut max = ImageGrid::filled(1, 1, 1, 255)?;
    encode_bit_into_group(&mut max, (0, 0), 1, true);
    assert_eq!(max.get(0, 0, 0), Some(255));
    encode_bit_into_group(&mut max, (0, 0), 1, false);
    assert_eq!(max.get(0, 0, 0), Some(254));

    let mut even = ImageGrid::filled(1, 1, 1, 100)?;
    encode_bit_into_group(&mut even, (0, 0), 1, true);
    assert_eq!(even.get(0, 0, 0), Some(99));

    Ok(())
}

/// 一个多像素组内的全部采样都被写成同一奇偶性，相邻的像素组不受影响
#[test]
fn test_group_writes_every_sample() -> anyhow::Result<()> {
    let mut grid = random_grid(4, 4, 3);
    let before = grid.clone();
    encode_bit_into_group(&mut grid, (0, 2), 2, true);

    for row in 0..4 {
        for col in 0..4 {
            for channel in 0..3 {
                let sample = grid.get(row, col, channel);
                if row < 2 && col >= 2 {
                    assert_eq!(sample.map(|s| s % 2), Some(1));
                } else {
                    assert_eq!(sample, before.get(row, col, channel));
                }
            }
        }
    }

    Ok(())
}

/// 读取像素组是只读操作，重复读取结果一致
#[test]
fn test_decode_bit_is_idempotent() {
    let grid = random_grid(8, 8, 3);
    let before = grid.clone();

    let first = decode_bit_from_group(&grid, (2, 4), 2);
    let second = decode_bit_from_group(&grid, (2, 4), 2);
    assert_eq!(first, second);
    assert_eq!(first, grid.get(2, 4, 0).is_some_and(|s| s % 2 == 1));
    assert_eq!(grid, before);
}

/// 多数表决可以容忍代表采样被破坏
#[test]
fn test_majority_vote_tolerates_single_corruption() -> anyhow::Result<()> {
    let group = GroupSize::new(4)?;
    let mut grid = random_grid(80, 80, 3);
    encode(b"vote", &mut grid, group)?;

    // 翻转第一个像素组的代表采样
    if let Some(sample) = grid.get_mut(0, 0, 0) {
        *sample ^= 1;
    }

    assert!(decode(&grid, group).is_err());
    let message = decode_message(&grid, group, DecodePolicy::Majority)?;
    assert_eq!(message.payload, b"vote");
    assert_eq!(message.header.options, OPTIONS_PLACEHOLDER);

    Ok(())
}

/// 验证进度回调覆盖每一个写入的像素组
#[test]
fn test_encode_progress_reaches_completion() -> anyhow::Result<()> {
    let mut grid = random_grid(64, 64, 1);
    let mut reports = Vec::new();
    codec::encode_with_progress(b"progress", &mut grid, GroupSize::default(), |p| {
        reports.push(p)
    })?;

    let total = HEADER_BITS + 8 * 8;
    assert_eq!(reports.len(), total);
    assert_eq!(reports.last(), Some(&Progress { done: total, total }));
    assert_eq!(reports.last().map(Progress::percent), Some(100.0));

    Ok(())
}

/// 越界坐标返回 `None`，不会 panic
#[test]
fn test_out_of_bounds_access_is_checked() -> anyhow::Result<()> {
    let mut grid = ImageGrid::filled(2, 3, 4, 9)?;

    assert_eq!(grid.get(1, 2, 3), Some(9));
    assert_eq!(grid.get(2, 0, 0), None);
    assert_eq!(grid.get(0, 3, 0), None);
    assert_eq!(grid.get(0, 0, 4), None);
    assert!(grid.get_mut(5, 5, 5).is_none());
    assert!(grid.pixel(0, 3).is_none());
    assert!(grid.pixel_mut(2, 0).is_none());
    assert_eq!(grid.pixel(1, 2).map(<[u8]>::len), Some(4));

    // 越界的像素组部分不会被写入
    let before = grid.clone();
    encode_bit_into_group(&mut grid, (1, 2), 2, false);
    assert_eq!(grid.pixel(1, 2), Some(&[8u8, 8, 8, 8][..]));
    assert_eq!(grid.get(0, 0, 0), before.get(0, 0, 0));

    Ok(())
}
