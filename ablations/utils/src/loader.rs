//! 实验输出路径.

use std::env;
use std::path::PathBuf;

/// 获取实验输出目录.
///
/// 1. 若环境变量 `$TRACT_ABLATION_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/ablation`. 无法确定家目录时返回 `None`.
pub fn output_dir_from_env_or_home() -> Option<PathBuf> {
    match env::var("TRACT_ABLATION_DIR") {
        Ok(d) if !d.is_empty() => Some(PathBuf::from(d)),
        _ => {
            let mut ans = dirs::home_dir()?;
            ans.push("dataset");
            ans.push("ablation");
            Some(ans)
        }
    }
}

/// 在输出目录下拼接文件名.
pub fn output_file_with(name: &str) -> Option<PathBuf> {
    output_dir_from_env_or_home().map(|d| d.join(name))
}
