//! # 命令处理逻辑模块
//!
//! 包含处理 `encode` 和 `decode` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、图像容器的读写、调用核心隐写算法以及向用户报告结果。

use crate::cli::{DecodeArgs, EncodeArgs, PayloadSource};
use crate::codec::{self, Progress};
use crate::constants::{DOCTORED_PREFIX, HEADER_BITS};
use crate::grid::ImageGrid;
use crate::group::{DecodePolicy, GroupSize};
use anyhow::{Context, Result};
use colored::Colorize;
use image::ImageFormat;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// 处理 'Encode' 命令的执行逻辑。
///
/// 负责读取图像和待隐藏的数据、检查隐写空间是否足够、调用编码器写入头部与载荷，
/// 最后将结果以无损格式写入目标图像文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径与像素组大小的 `EncodeArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 像素组大小不是完全平方数。
/// * 目标文件已存在且未指定 `--force`，或目标格式不是无损格式。
/// * 无法读取输入的图像或数据文件。
/// * 图像没有足够的空间来隐藏数据。
/// * 无法写入到目标图像文件。
pub fn handle_encode(args: EncodeArgs) -> Result<()> {
    let group = GroupSize::new(args.group_size)
        .with_context(|| "The group size must be a perfect square such as 1, 4, 9 or 16.")?;

    let dest = args
        .dest
        .clone()
        .unwrap_or_else(|| default_dest_path(&args.image));
    ensure_writable(&dest, args.force)?;
    ensure_lossless(&dest)?;

    let mut grid = load_grid(&args.image)?;
    let payload = read_payload(args.payload)?;

    let required = HEADER_BITS + payload.len() * 8;
    let available = codec::capacity(&grid, group);
    anyhow::ensure!(
        available >= required,
        "Not enough space in the image to hide the payload. \nRequired: {}, Available: {} (pixel groups of size {})",
        required.to_string().red().bold(),
        available.to_string().green().bold(),
        group.size()
    );

    codec::encode_with_progress(&payload, &mut grid, group, progress_logger("Encoding"))
        .with_context(|| "Failed to hide the payload in the image.")?;

    let picture = grid
        .into_image()
        .with_context(|| "Failed to rebuild the image from the modified pixels.")?;
    picture.save(&dest).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The payload ({} bytes) has been successfully hidden and saved: {}",
        payload.len(),
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Decode' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像文件、调用解码器读取头部与载荷，
/// 最后将恢复的数据写入目标文件，或以文本形式打印到终端。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径与像素组大小的 `DecodeArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 像素组大小不是完全平方数。
/// * 无法读取输入的图像文件。
/// * 图像中没有可识别的头部，或图像容量小于头部声明的载荷长度。
/// * 目标文件已存在且未指定 `--force`，或无法写入。
pub fn handle_decode(args: DecodeArgs) -> Result<()> {
    let group = GroupSize::new(args.group_size)
        .with_context(|| "The group size must be a perfect square such as 1, 4, 9 or 16.")?;
    if let Some(out) = &args.out {
        ensure_writable(out, args.force)?;
    }

    let grid = load_grid(&args.image)?;
    let policy = if args.vote {
        DecodePolicy::Majority
    } else {
        DecodePolicy::Representative
    };

    let message = codec::decode_with_progress(&grid, group, policy, progress_logger("Decoding"))
        .with_context(|| {
            format!(
                "Failed to recover the hidden data from '{}'. \nThe image may not contain a hidden message, or the group size differs from the one used to encode it.",
                args.image.to_string_lossy().red().bold()
            )
        })?;
    info!("Header options: {:?}", message.header.options);

    match &args.out {
        Some(out) => {
            fs::write(out, &message.payload).with_context(|| {
                format!(
                    "Unable to write to target file: {}",
                    out.to_string_lossy().red().bold()
                )
            })?;
            println!(
                "The payload ({} bytes) has been successfully recovered and saved: {}",
                message.payload.len(),
                out.to_string_lossy().green().bold()
            );
        }
        None => println!("{}", String::from_utf8_lossy(&message.payload)),
    }

    Ok(())
}

/// 未指定输出路径时，在输入图像同目录下生成 `doctored_<文件名>.png`。
pub fn default_dest_path(image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    image.with_file_name(format!("{DOCTORED_PREFIX}{stem}.png"))
}

fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

/// 有损格式会破坏奇偶性编码，因此拒绝 JPEG 输出。
fn ensure_lossless(path: &Path) -> Result<()> {
    let format = ImageFormat::from_path(path).with_context(|| {
        format!(
            "Unable to determine the image format of: {}",
            path.to_string_lossy().red().bold()
        )
    })?;
    anyhow::ensure!(
        format != ImageFormat::Jpeg,
        "Lossy output format is not supported: {}. \nUse a lossless format such as PNG or BMP.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

fn load_grid(path: &Path) -> Result<ImageGrid> {
    let picture = image::open(path).with_context(|| {
        format!(
            "Unable to read image file: {}",
            path.to_string_lossy().red().bold()
        )
    })?;
    let grid = ImageGrid::try_from(picture)?;

    let (height, width, channels) = grid.dimensions();
    info!("Loaded {height}x{width} image with {channels} channel(s)");
    Ok(grid)
}

fn read_payload(source: PayloadSource) -> Result<Vec<u8>> {
    match (source.text, source.file) {
        (Some(text), _) => Ok(text.into_bytes()),
        (None, Some(file)) => fs::read(&file).with_context(|| {
            format!(
                "Unable to read payload file: {}",
                file.to_string_lossy().red().bold()
            )
        }),
        (None, None) => anyhow::bail!("Either --text or --file must be provided."),
    }
}

/// 每完成 10% 记录一次调试日志。总数变化 (解码读完头部) 时重新计数。
fn progress_logger(stage: &'static str) -> impl FnMut(Progress) {
    let mut last_total = 0;
    let mut last_decile = 0;
    move |progress| {
        if progress.total != last_total {
            last_total = progress.total;
            last_decile = 0;
        }
        let decile = (progress.percent() / 10.0) as u32;
        if decile > last_decile {
            last_decile = decile;
            debug!(
                "{stage}: {:.0}% ({}/{} pixel groups)",
                progress.percent(),
                progress.done,
                progress.total
            );
        }
    }
}
