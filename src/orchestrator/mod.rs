//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量论文处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载论文（Vec<PaperDocument>）
//! - 持有数据库连接和外部工具
//! - 持有并推进序号状态（Sequencer）
//! - 输出全局统计信息
//!
//! ### `paper_processor` - 单篇论文处理器
//! - 委托 StageFlow 执行单篇论文的四个阶段
//! - 写运行日志
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<PaperDocument>，推进 Sequencer)
//!     ↓
//! paper_processor (处理单篇论文)
//!     ↓
//! workflow::StageFlow (S0 → S1 → S2 → S3 → S4)
//!     ↓
//! services (能力层：文件名 / 页码 / 元数据 / 标题页 / 运行日志)
//!     ↓
//! infrastructure (基础设施：RecordStore / DocumentService)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_processor 管批量和状态，paper_processor 管单篇
//! 2. **资源隔离**：只有编排层持有数据库连接和外部工具
//! 3. **向下依赖**：编排层 → workflow → services → infrastructure

pub mod batch_processor;
pub mod paper_processor;

// 重新导出主要类型
pub use batch_processor::{App, BatchStats};
pub use paper_processor::process_paper;
