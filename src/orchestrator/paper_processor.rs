//! 单篇论文处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **流程调度**：委托 `StageFlow` 执行四个阶段
//! 2. **运行日志**：跳过、失败、元数据缺键的论文各追加一行
//! 3. **日志输出**：记录单篇论文的开始和结果
//!
//! 不修改序号状态，推进由 batch_processor 决定。

use tracing::{error, info, warn};

use crate::infrastructure::{DocumentService, RecordStore};
use crate::models::PaperDocument;
use crate::services::{RunLog, Sequencer};
use crate::workflow::{DocumentReport, DocumentState, PaperCtx, ProcessResult, StageFlow};

/// 处理单篇论文
///
/// # 参数
/// - `flow`: 单篇论文流程（整批复用）
/// - `doc`: 待处理论文
/// - `sequencer`: 当前序号状态（只读）
/// - `ctx`: 论文上下文
/// - `run_log`: 运行日志
pub async fn process_paper(
    flow: &StageFlow,
    store: &dyn RecordStore,
    tools: &dyn DocumentService,
    doc: &PaperDocument,
    sequencer: &Sequencer,
    ctx: &PaperCtx,
    run_log: &RunLog,
) -> DocumentReport {
    log_paper_start(ctx, doc);

    let report = flow.run(store, tools, doc, sequencer, ctx).await;
    record_outcome(run_log, &report, ctx.paper_index);
    log_paper_complete(ctx.paper_index, &report);

    report
}

/// 把没有完整完成的论文写入运行日志
fn record_outcome(run_log: &RunLog, report: &DocumentReport, paper_index: usize) {
    let id = report.id.as_deref().unwrap_or("");

    let mut lines = Vec::new();
    match (&report.result, &report.failure) {
        (ProcessResult::Skipped, _) => {
            lines.push(("跳过".to_string(), "数据库中未找到 ID".to_string()));
        }
        (ProcessResult::Processed(_), Some(failure)) => {
            lines.push((format!("失败: {}", failure.stage), failure.error.to_string()));
        }
        _ => {}
    }

    if let Some(metadata) = report.metadata.as_ref().filter(|m| !m.is_complete()) {
        let keys: Vec<String> = metadata
            .missing
            .iter()
            .chain(metadata.no_value.iter())
            .map(|key| key.to_string())
            .collect();
        lines.push(("元数据不完整".to_string(), keys.join(" ")));
    }

    for (outcome, detail) in lines {
        if let Err(e) = run_log.append(&report.file_name, id, &outcome, &detail) {
            error!("[论文 {}] 写入运行日志失败: {}", paper_index, e);
        }
    }
}

// ========== 日志辅助函数 ==========

fn log_paper_start(ctx: &PaperCtx, doc: &PaperDocument) {
    info!("\n{}", "─".repeat(60));
    info!("{} 开始处理: {}", ctx, doc.file_name);
}

fn log_paper_complete(paper_index: usize, report: &DocumentReport) {
    match report.result {
        ProcessResult::Skipped => warn!("[论文 {}] ⚠️ 已跳过", paper_index),
        ProcessResult::Processed(DocumentState::S4Done) => {
            info!("[论文 {}] ✅ 全部阶段完成", paper_index)
        }
        ProcessResult::Processed(state) => {
            error!("[论文 {}] ❌ 处理结束于 {}", paper_index, state)
        }
    }
}
