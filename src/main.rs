use env_logger::Env;

use pixgroup_stego::{
    cli::{Cli, Commands},
    handler::{handle_decode, handle_encode},
};

/// 程序的主入口点
///
/// 负责初始化日志、解析命令行参数，并根据指定的子命令（`encode` 或 `decode`）
/// 将执行分派到相应的处理函数
fn main() -> anyhow::Result<()> {
    // 默认只输出警告，可通过 RUST_LOG 调整
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    // 解析命令行参数，参数不完整时只打印用法
    let Some(cli) = Cli::parse_or_usage(std::env::args_os()) else {
        return Ok(());
    };

    // 根据子命令调用相应的处理函数
    match cli.command {
        Commands::Encode(args) => handle_encode(args),
        Commands::Decode(args) => handle_decode(args),
    }
}
