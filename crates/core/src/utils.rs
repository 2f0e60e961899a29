//! 通用工具函数

/// 掩码后缀
pub const SECRET_MASK: &str = "****";

/// 掩码时保留的前缀字符数
const MASK_PREFIX_LEN: usize = 6;

/// 掩码敏感凭证
///
/// 只保留前几个字符，其余替换为固定掩码；过短的值整体掩码，
/// 避免前缀暴露大部分内容。
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= MASK_PREFIX_LEN * 2 {
        SECRET_MASK.to_string()
    } else {
        let prefix: String = chars[..MASK_PREFIX_LEN].iter().collect();
        format!("{prefix}{SECRET_MASK}")
    }
}
