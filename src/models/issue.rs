use std::fmt;

/// 本次批处理的目标卷/期
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueTarget {
    pub volume: u32,
    pub issue: u32,
}

impl IssueTarget {
    pub fn new(volume: u32, issue: u32) -> Self {
        Self { volume, issue }
    }

    /// 出版年份：卷号 20 对应 2000 年
    pub fn year(&self) -> i64 {
        i64::from(self.volume) - 20 + 2000
    }

    /// 数据库 `Volume_Number` 字段的编码，例如 `2025450001`
    pub fn volume_number_code(&self) -> String {
        format!("{}{}000{}", self.year(), self.volume, self.issue)
    }

    /// 引用字符串，例如 `2025, Volume 45, Issue 1, pages 1-10`
    pub fn citation(&self, pages: Option<PageRange>) -> String {
        let mut citation = format!(
            "{}, Volume {}, Issue {}",
            self.year(),
            self.volume,
            self.issue
        );
        if let Some(range) = pages {
            citation.push_str(&format!(", pages {}", range));
        }
        citation
    }
}

/// 批处理运行期间的序号状态
///
/// 只由编排层在一篇论文合格完成后修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningIssueState {
    /// 下一篇论文的序号
    pub next_paper_number: u32,
    /// 已分配的累计页数
    pub last_total_pages: u32,
    /// 最近一次完成的论文 ID
    pub last_document_id: String,
}

impl RunningIssueState {
    pub fn new(next_paper_number: u32, last_total_pages: u32) -> Self {
        Self {
            next_paper_number,
            last_total_pages,
            last_document_id: String::new(),
        }
    }
}

/// 连续页码范围，`first <= last`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub first: u32,
    pub last: u32,
}

impl PageRange {
    pub fn is_single_page(&self) -> bool {
        self.first == self.last
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_page() {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}-{}", self.first, self.last)
        }
    }
}
