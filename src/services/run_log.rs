//! 运行日志写入服务 - 业务能力层
//!
//! 只负责"写运行日志文件"能力，不关心流程

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

/// 运行日志
///
/// 职责：
/// - 运行开始时写入带时间戳的表头
/// - 每篇没有完整完成的论文追加一行
/// - 不关心流程顺序
pub struct RunLog {
    log_file_path: PathBuf,
}

impl RunLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            log_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.log_file_path
    }

    /// 初始化日志文件（覆盖旧文件）
    pub fn init(&self, volume: u32, issue: u32) -> Result<()> {
        let header = format!(
            "{}\n论文重新编号日志 - {} (Volume {}, Issue {})\n{}\n\n",
            "=".repeat(60),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            volume,
            issue,
            "=".repeat(60)
        );
        fs::write(&self.log_file_path, header)?;
        Ok(())
    }

    /// 追加一行记录
    ///
    /// # 参数
    /// - `file_name`: 论文文件名
    /// - `id`: 数据库 ID（未查到时为空）
    /// - `outcome`: 结果（跳过 / 失败阶段 / 元数据缺失）
    /// - `detail`: 详细原因
    pub fn append(&self, file_name: &str, id: &str, outcome: &str, detail: &str) -> Result<()> {
        debug!("写入运行日志: {} | {} | {}", file_name, id, outcome);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file_path)?;

        writeln!(file, "{} | {} | {} | {}", file_name, id, outcome, detail)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_then_append() {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::new(dir.path().join("log.txt"));

        log.init(45, 1).unwrap();
        log.append("EB-V44-I1-P7-24-A7.pdf", "", "跳过", "未找到 ID").unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        assert!(content.contains("Volume 45, Issue 1"));
        assert!(content.ends_with("EB-V44-I1-P7-24-A7.pdf |  | 跳过 | 未找到 ID\n"));
    }
}
