//! 单篇论文的阶段状态机
//!
//! ```text
//! Init -> S1Done -> S2Done -> S3Done -> S4Done
//!   \________\_________\_________\______> Failed(stage)
//! ```

use std::fmt;

/// 处理阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// S0 按文件名查 ID
    Lookup,
    /// S1 更新数据库
    RecordUpdate,
    /// S2 文件改名
    Rename,
    /// S3 更新 RDF 元数据
    MetadataUpdate,
    /// S4 重新生成标题页
    TitlePage,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Lookup => "S0 查询ID",
            Stage::RecordUpdate => "S1 数据库更新",
            Stage::Rename => "S2 文件改名",
            Stage::MetadataUpdate => "S3 元数据更新",
            Stage::TitlePage => "S4 标题页生成",
        };
        f.write_str(name)
    }
}

/// 单篇论文的处理状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    Init,
    S1Done,
    S2Done,
    S3Done,
    S4Done,
    Failed(Stage),
}

impl DocumentState {
    /// 当前状态下要执行的下一个阶段，终态返回 `None`
    pub fn next_stage(self) -> Option<Stage> {
        match self {
            DocumentState::Init => Some(Stage::RecordUpdate),
            DocumentState::S1Done => Some(Stage::Rename),
            DocumentState::S2Done => Some(Stage::MetadataUpdate),
            DocumentState::S3Done => Some(Stage::TitlePage),
            DocumentState::S4Done | DocumentState::Failed(_) => None,
        }
    }

    /// 阶段成功后的状态
    pub fn after(stage: Stage) -> Self {
        match stage {
            Stage::Lookup => DocumentState::Init,
            Stage::RecordUpdate => DocumentState::S1Done,
            Stage::Rename => DocumentState::S2Done,
            Stage::MetadataUpdate => DocumentState::S3Done,
            Stage::TitlePage => DocumentState::S4Done,
        }
    }

    /// S1、S2、S3 都成功（S4 的结果不影响序号推进）
    pub fn qualifies_for_advance(self) -> bool {
        matches!(
            self,
            DocumentState::S3Done | DocumentState::S4Done | DocumentState::Failed(Stage::TitlePage)
        )
    }
}

impl fmt::Display for DocumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentState::Init => f.write_str("Init"),
            DocumentState::S1Done => f.write_str("S1Done"),
            DocumentState::S2Done => f.write_str("S2Done"),
            DocumentState::S3Done => f.write_str("S3Done"),
            DocumentState::S4Done => f.write_str("S4Done"),
            DocumentState::Failed(stage) => write!(f, "Failed({})", stage),
        }
    }
}
