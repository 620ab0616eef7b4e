/// 头部中每个字段的字符宽度。
/// 每个字符按一个字节 (8 bits) 编码，因此每个字段占用 64 * 8 = 512 bits。
pub const HEADER_FIELD_WIDTH: usize = 64;

/// 单个头部字段编码后的比特数。
pub const HEADER_FIELD_BITS: usize = HEADER_FIELD_WIDTH * 8;

/// 完整头部 (长度字段 + 选项字段) 的比特数。
/// 头部总是最先写入，每个比特占用一个像素组。
pub const HEADER_BITS: usize = HEADER_FIELD_BITS * 2;

/// 选项字段当前使用的占位文本，右侧以空格填充至 [`HEADER_FIELD_WIDTH`]。
pub const OPTIONS_PLACEHOLDER: &str = "None Right Now Bucko";

/// 默认的像素组大小：每个比特只占用一个像素。
pub const DEFAULT_GROUP_SIZE: u32 = 1;

/// 未指定输出路径时，隐写结果图像文件名的前缀。
pub const DOCTORED_PREFIX: &str = "doctored_";
