use std::path::PathBuf;

/// 从文件名中解析出的字段
///
/// `year` 是文件名中的两位年份（例如 `25`）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilenameFields {
    pub year: u32,
    pub volume: u32,
    pub issue: u32,
    pub paper: Option<u32>,
}

/// 写入文件名的新标签
///
/// `paper` 为 `Some` 时使用带 `-P` 的文件名格式，否则使用只有卷/期的格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilenameTags {
    pub volume: u32,
    pub issue: u32,
    pub paper: Option<u32>,
}

impl FilenameTags {
    pub fn new(volume: u32, issue: u32, paper: Option<u32>) -> Self {
        Self {
            volume,
            issue,
            paper,
        }
    }

    /// 由卷号推导出的两位年份：`((volume - 20) + 2000) mod 100`
    pub fn year_suffix(&self) -> u32 {
        (i64::from(self.volume) - 20 + 2000).rem_euclid(100) as u32
    }

    /// 渲染后再解析应得到的字段
    pub fn expected_fields(&self) -> FilenameFields {
        FilenameFields {
            year: self.year_suffix(),
            volume: self.volume,
            issue: self.issue,
            paper: self.paper,
        }
    }
}

/// 待处理的已发布论文
#[derive(Debug, Clone)]
pub struct PaperDocument {
    /// 文件完整路径
    pub path: PathBuf,
    /// 文件名（含扩展名）
    pub file_name: String,
    /// 期刊缩写（文件名第一个 `-` 之前的部分）
    pub acronym: String,
    /// 文件名字段，文件名不符合格式时为 `None`
    pub fields: Option<FilenameFields>,
    /// 扩展名之前的最后一个数字序号，用于排序
    pub sequence_tag: u64,
}

impl PaperDocument {
    /// 文件名中是否带有 `-P` 序号标签
    pub fn has_paper_tag(&self) -> bool {
        self.fields.map_or(false, |f| f.paper.is_some())
    }
}
