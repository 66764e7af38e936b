//! 论文处理上下文
//!
//! 封装"我正在把第几篇论文改到哪一卷哪一期"这一信息

use std::fmt::Display;

use chrono::{DateTime, Local};

use crate::models::IssueTarget;

/// 论文处理上下文
#[derive(Debug, Clone)]
pub struct PaperCtx {
    /// 论文索引（仅用于日志显示，从1开始）
    pub paper_index: usize,

    /// 目标卷/期
    pub target: IssueTarget,

    /// 本次运行的时间戳，同一批论文共用
    pub run_time: DateTime<Local>,
}

impl PaperCtx {
    pub fn new(paper_index: usize, target: IssueTarget, run_time: DateTime<Local>) -> Self {
        Self {
            paper_index,
            target,
            run_time,
        }
    }

    /// 写入数据库的时间戳
    pub fn timestamp(&self) -> String {
        self.run_time.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// 元数据中的 `Creation-Date`
    pub fn creation_date(&self) -> String {
        self.run_time.format("%Y-%m-%d").to_string()
    }
}

impl Display for PaperCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[论文 #{} -> Volume {} Issue {}]",
            self.paper_index, self.target.volume, self.target.issue
        )
    }
}
