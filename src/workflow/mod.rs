//! 流程层（Workflow Layer）
//!
//! 定义"一篇论文"的完整重新编号流程：
//! 查 ID → 数据库 → 改名 → 元数据 → 标题页

pub mod paper_ctx;
pub mod stage;
pub mod stage_flow;

pub use paper_ctx::PaperCtx;
pub use stage::{DocumentState, Stage};
pub use stage_flow::{DocumentReport, ProcessResult, StageFlow};
