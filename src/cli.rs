//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use crate::constants::DEFAULT_GROUP_SIZE;
use clap::{Args, Parser};
use log::warn;
use std::ffi::OsString;
use std::path::PathBuf;

/// 一款基于像素奇偶性的 LSB 隐写工具，可在无损格式图像 (如 PNG, BMP) 中隐藏或恢复任意数据。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于像素奇偶性的 LSB 隐写工具，可在无损格式图像 (如 PNG, BMP) 中隐藏或恢复任意数据。\n每个比特可以由多个像素组成的正方形像素组共同承载。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// 解析命令行参数。
    ///
    /// 缺少必需参数等用户输入错误时打印用法说明并返回 `None`，由调用方正常退出，
    /// 不改变进程的退出码。`--help` 与 `--version` 同样走这条路径。
    pub fn parse_or_usage<I, T>(args: I) -> Option<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(cli) => Some(cli),
            Err(err) => {
                if let Err(io_err) = err.print() {
                    warn!("Unable to print usage: {io_err}");
                }
                None
            }
        }
    }
}

/// 可用的子命令：encode (隐藏) 和 decode (恢复)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 将文本或文件内容隐藏到图像中，并以无损格式保存。
    Encode(EncodeArgs),

    /// 从经过隐写的图像中恢复隐藏的数据。
    Decode(DecodeArgs),
}

/// 'encode' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct EncodeArgs {
    /// 用于隐写的输入图像文件路径 (PNG, BMP, TIFF, WebP, QOI, JPEG)。
    #[arg(short, long)]
    pub image: PathBuf,

    #[command(flatten)]
    pub payload: PayloadSource,

    /// 保存结果图像的输出路径，必须是无损格式。
    /// 省略时保存为输入图像同目录下的 `doctored_<文件名>.png`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 每个比特占用的像素数量，必须是完全平方数 (1, 4, 9, 16, ...)。
    #[arg(short, long, default_value_t = DEFAULT_GROUP_SIZE)]
    pub group_size: u32,

    /// 输出文件已存在时强制覆盖。
    #[arg(long)]
    pub force: bool,
}

/// 要隐藏的数据来源：直接给出的文本，或者文件内容。二者必须且只能提供一个。
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct PayloadSource {
    /// 要隐藏的文本内容。
    #[arg(short, long)]
    pub text: Option<String>,

    /// 要隐藏的文件路径。
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

/// 'decode' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct DecodeArgs {
    /// 已隐藏数据的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 保存恢复数据的输出路径。省略时以文本形式打印到终端。
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// 编码时使用的像素组大小。
    #[arg(short, long, default_value_t = DEFAULT_GROUP_SIZE)]
    pub group_size: u32,

    /// 对像素组内的全部采样进行多数表决，而不是只读取左上角像素。
    #[arg(long)]
    pub vote: bool,

    /// 输出文件已存在时强制覆盖。
    #[arg(long)]
    pub force: bool,
}
