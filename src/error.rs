use std::path::PathBuf;

use thiserror::Error;

use crate::workflow::Stage;

/// 致命错误：在处理任何论文之前（或替代处理）终止整个运行
#[derive(Debug, Error)]
pub enum FatalError {
    /// 批处理参数不合法
    #[error("参数 {name} 不合法: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// 源目录不存在
    #[error("目录不存在: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// 无法读取源目录
    #[error("无法读取目录 {}: {source}", path.display())]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 数据库不可达
    #[error("无法连接数据库: {0}")]
    StoreUnavailable(#[source] StoreError),

    /// 续编查询失败
    #[error("续编查询失败 (序号: {paper_number}): {source}")]
    ResumeQuery {
        paper_number: u32,
        #[source]
        source: StoreError,
    },

    /// 续编查询没有结果
    #[error("未找到序号 {paper_number} 的已发布论文 (路径前缀: {prefix})")]
    ResumeNotFound { paper_number: u32, prefix: String },

    /// 续编记录中缺少累计页数
    #[error("论文 {id} 的累计页数无效: {value:?}")]
    ResumeTotalInvalid { id: String, value: Option<String> },
}

/// 数据库错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    /// 字段值无法解析
    #[error("字段 {field} 的值无法解析: {value}")]
    InvalidValue { field: &'static str, value: String },

    /// 记录不存在（仅用于测试替身和按 ID 更新时）
    #[error("记录不存在: {0}")]
    MissingRecord(String),
}

/// 外部工具（转换 / 拼接）错误
#[derive(Debug, Error)]
pub enum ServiceError {
    /// 无法启动外部程序
    #[error("无法启动 {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// 外部程序返回非零退出码
    #[error("{tool} 执行失败 (退出码: {code:?}): {stderr}")]
    NonZeroExit {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    /// 临时文件读写失败
    #[error("临时文件读写失败: {0}")]
    Io(#[from] std::io::Error),
}

/// 单篇论文某个阶段的失败，只影响当前论文
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    /// 文件读写失败
    #[error("文件操作失败 ({}): {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 重命名目标已存在
    #[error("目标文件已存在: {}", .0.display())]
    TargetExists(PathBuf),

    /// 配置中没有该期刊的目录
    #[error("未配置期刊目录: {0}")]
    UnknownPublication(String),

    /// 累计页数超出范围
    #[error("累计页数溢出: {last_total_pages} + {page_count}")]
    PageTotalOverflow { last_total_pages: u32, page_count: u32 },
}

impl StageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StageError::Io {
            path: path.into(),
            source,
        }
    }
}

/// 文件名解析错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// 文件名末尾没有数字序号
    #[error("文件名中没有数字序号: {0}")]
    NoSequenceTag(String),

    /// 序号超出范围
    #[error("文件名序号超出范围: {0}")]
    SequenceTagOverflow(String),
}

/// 阶段失败的记录（阶段 + 原因）
#[derive(Debug)]
pub struct StageFailure {
    pub stage: Stage,
    pub error: StageError,
}

impl std::fmt::Display for StageFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} 阶段失败: {}", self.stage, self.error)
    }
}

// ========== Result 类型别名 ==========

/// 致命错误结果类型
pub type FatalResult<T> = Result<T, FatalError>;

/// 阶段结果类型
pub type StageResult<T> = Result<T, StageError>;
