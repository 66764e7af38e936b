//! 批量论文处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一批论文的重新编号和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：连接数据库、准备外部工具
//! 2. **批量加载**：扫描目录并按序号排序（`Vec<PaperDocument>`）
//! 3. **序号状态**：全新开始或从上一次运行续编
//! 4. **顺序处理**：逐篇处理，前一篇结束后才开始下一篇
//! 5. **状态推进**：只有 S1-S3 都成功的论文才推进序号和累计页数
//! 6. **全局统计**：汇总所有论文的处理结果
//!
//! ## 设计特点
//!
//! - **资源所有者**：唯一持有数据库连接和外部工具的模块
//! - **严格顺序**：每篇论文的页码依赖前一篇的累计页数，不能并发
//! - **向下委托**：委托 paper_processor 处理单篇论文

use chrono::Local;
use tracing::{info, warn};

use crate::cli::BatchParams;
use crate::config::{Config, StoreCredentials};
use crate::error::{FatalError, FatalResult};
use crate::infrastructure::{DocumentService, ExternalDocumentTools, MySqlRecordStore, RecordStore};
use crate::models::{load_paper_set, PaperDocument};
use crate::orchestrator::paper_processor;
use crate::services::{FilenameCodec, RunLog, Sequencer};
use crate::workflow::{DocumentState, PaperCtx, ProcessResult, Stage, StageFlow};

/// 应用主结构
pub struct App {
    config: Config,
    params: BatchParams,
    store: Box<dyn RecordStore>,
    tools: Box<dyn DocumentService>,
    run_log: RunLog,
}

impl App {
    /// 初始化应用：连接数据库，准备外部工具
    pub async fn initialize(
        config: Config,
        params: BatchParams,
        credentials: &StoreCredentials,
    ) -> FatalResult<Self> {
        params.validate()?;
        log_startup(&config, &params);

        let store = MySqlRecordStore::connect(credentials)
            .await
            .map_err(FatalError::StoreUnavailable)?;
        let tools = ExternalDocumentTools::new(&config.converter_bin, &config.ghostscript_bin);

        Ok(Self::with_services(
            config,
            params,
            Box::new(store),
            Box::new(tools),
        ))
    }

    /// 使用给定的数据库和外部工具创建应用
    pub fn with_services(
        config: Config,
        params: BatchParams,
        store: Box<dyn RecordStore>,
        tools: Box<dyn DocumentService>,
    ) -> Self {
        let run_log = RunLog::new(&config.output_log_file);
        Self {
            config,
            params,
            store,
            tools,
            run_log,
        }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> FatalResult<BatchStats> {
        if let Err(e) = self
            .run_log
            .init(self.params.target.volume, self.params.target.issue)
        {
            warn!("⚠️ 无法初始化运行日志 {}: {}", self.run_log.path().display(), e);
        }

        // 加载所有待处理的论文
        let papers = self.load_papers().await?;
        if papers.is_empty() {
            warn!("⚠️ 没有找到待处理的论文，程序结束");
            return Ok(BatchStats::default());
        }
        log_papers_loaded(papers.len());

        let mut sequencer = self.init_sequencer(&papers[0]).await?;
        let stats = self.process_all_papers(&papers, &mut sequencer).await;

        print_final_stats(&stats, &sequencer, &self.config);
        Ok(stats)
    }

    /// 加载论文
    async fn load_papers(&self) -> FatalResult<Vec<PaperDocument>> {
        info!("\n📁 正在扫描待处理的论文: {}", self.params.directory.display());
        load_paper_set(
            &self.params.directory,
            &self.config.paper_extension,
            &FilenameCodec::new(),
        )
        .await
    }

    /// 全新开始或续编，续编时以第一篇论文的期刊缩写确定路径前缀
    async fn init_sequencer(&self, first: &PaperDocument) -> FatalResult<Sequencer> {
        match self.params.resume_point() {
            None => Ok(Sequencer::init_fresh(self.config.first_paper_number)),
            Some(prior) => {
                let prefix = self.config.volume_prefix(&first.acronym, &self.params.target);
                Sequencer::init_resume(self.store.as_ref(), prior, &prefix, &self.config.site_root)
                    .await
            }
        }
    }

    /// 顺序处理所有论文
    async fn process_all_papers(
        &self,
        papers: &[PaperDocument],
        sequencer: &mut Sequencer,
    ) -> BatchStats {
        let flow = StageFlow::new(&self.config, self.params.title_pages_to_remove);
        let run_time = Local::now();
        let mut stats = BatchStats {
            total: papers.len(),
            ..Default::default()
        };

        for (index, doc) in papers.iter().enumerate() {
            let ctx = PaperCtx::new(index + 1, self.params.target, run_time);

            let report = paper_processor::process_paper(
                &flow,
                self.store.as_ref(),
                self.tools.as_ref(),
                doc,
                sequencer,
                &ctx,
                &self.run_log,
            )
            .await;

            if report.qualifies_for_advance() {
                let id = report.id.as_deref().unwrap_or_default();
                sequencer.advance(report.page_count, id);
            }

            match report.result {
                ProcessResult::Skipped => stats.skipped += 1,
                ProcessResult::Processed(DocumentState::S4Done) => stats.completed += 1,
                ProcessResult::Processed(DocumentState::Failed(Stage::TitlePage)) => {
                    stats.title_page_failed += 1
                }
                ProcessResult::Processed(_) => stats.failed += 1,
            }
        }

        stats
    }
}

/// 批处理统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchStats {
    pub total: usize,
    /// 四个阶段全部完成
    pub completed: usize,
    /// 数据库中查不到
    pub skipped: usize,
    /// S0-S3 失败（不推进序号）
    pub failed: usize,
    /// 只有标题页失败（仍推进序号）
    pub title_page_failed: usize,
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config, params: &BatchParams) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 论文重新编号");
    info!(
        "📊 目标: Volume {} Issue {} ({})",
        params.target.volume,
        params.target.issue,
        params.target.year()
    );
    match params.resume_point() {
        Some(prior) => info!("🔁 续编: 上一篇序号 {}", prior),
        None => info!("🆕 全新开始: 第一篇序号 {}", config.first_paper_number),
    }
    info!("✂️ 标题页删除页数: {}", params.title_pages_to_remove);
    info!("{}", "=".repeat(60));
}

fn log_papers_loaded(total: usize) {
    info!("✓ 找到 {} 篇待处理的论文", total);
    info!("💡 逐篇顺序处理，序号和页码依次累加\n");
}

fn print_final_stats(stats: &BatchStats, sequencer: &Sequencer, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!("完成时间: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("{}", "=".repeat(60));
    info!("✅ 完成: {}/{}", stats.completed, stats.total);
    info!("⚠️ 标题页失败: {}", stats.title_page_failed);
    info!("⏭️ 跳过: {}", stats.skipped);
    info!("❌ 失败: {}", stats.failed);
    info!(
        "📄 下一篇序号: {}，累计页数: {}",
        sequencer.next_paper_number(),
        sequencer.last_total_pages()
    );
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", config.output_log_file);
}
