//! # Renumber Issue
//!
//! 把一批已发布论文重新编号到新的卷/期：更新数据库、改名、
//! 更新 RDF 元数据、重新生成标题页
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（数据库连接 / 外部程序），只暴露能力
//! - `RecordStore` - 论文数据库：按文件名查 ID、按序号续编、按 ID 更新字段
//! - `DocumentService` - HTML 转 PDF、PDF 删页与拼接
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单篇论文
//! - `FilenameCodec` - 文件名中卷/期/序号/年份的解析与改写
//! - `Sequencer` - 序号和累计页数
//! - `MetadataRecord` - RDF 元数据的按键改写
//! - `TitleRewriter` - 标题页 HTML 的卷/期/页码改写
//! - `RunLog` - 写运行日志能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一篇论文"的完整处理流程
//! - `PaperCtx` - 上下文封装（论文索引 + 目标卷/期 + 运行时间）
//! - `StageFlow` - 流程编排（查 ID → 数据库 → 改名 → 元数据 → 标题页）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量论文处理器，管理资源和序号状态
//! - `orchestrator/paper_processor` - 单篇论文处理器，写运行日志
//!
//! ## 模块结构

pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use cli::{BatchParams, Cli};
pub use config::{Config, StoreCredentials};
pub use error::{FatalError, FatalResult, StageError};
pub use infrastructure::{DocumentService, RecordStore};
pub use models::{IssueTarget, PaperDocument};
pub use orchestrator::{App, BatchStats};
pub use utils::logger;
pub use workflow::{DocumentReport, DocumentState, PaperCtx, ProcessResult, StageFlow};
