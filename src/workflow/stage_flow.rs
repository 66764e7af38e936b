//! 论文处理流程 - 流程层
//!
//! 核心职责：定义"一篇论文"的完整重新编号流程
//!
//! 流程顺序：
//! 0. 按文件名查 ID（查不到则跳过）
//! 1. 更新数据库字段
//! 2. 文件改名
//! 3. 更新 RDF 元数据
//! 4. 重新生成标题页并拼接到论文开头
//!
//! 任何阶段失败都只结束当前论文，已完成的阶段不回滚。

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{StageError, StageFailure, StageResult};
use crate::infrastructure::{DocumentService, RecordStore, SpliceDirective};
use crate::models::{FilenameTags, PageRange, PaperDocument, PublicationRecord, RecordField};
use crate::services::{
    apply_updates, FilenameCodec, MetadataKey, MetadataRecord, MetadataReport, Sequencer,
    TitleRewriter,
};
use crate::workflow::paper_ctx::PaperCtx;
use crate::workflow::stage::{DocumentState, Stage};

/// 单篇论文的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    /// 数据库中查不到 ID，跳过
    Skipped,
    /// 已进入状态机，附带终态
    Processed(DocumentState),
}

/// 单篇论文的处理报告
#[derive(Debug)]
pub struct DocumentReport {
    pub file_name: String,
    pub id: Option<String>,
    pub result: ProcessResult,
    /// 本篇页数（推进序号时使用）
    pub page_count: u32,
    pub metadata: Option<MetadataReport>,
    pub failure: Option<StageFailure>,
}

impl DocumentReport {
    fn skipped(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            id: None,
            result: ProcessResult::Skipped,
            page_count: 0,
            metadata: None,
            failure: None,
        }
    }

    /// S1、S2、S3 都成功时才推进序号
    pub fn qualifies_for_advance(&self) -> bool {
        match self.result {
            ProcessResult::Processed(state) => state.qualifies_for_advance(),
            ProcessResult::Skipped => false,
        }
    }
}

/// 一篇论文的新值，在 S1 之前一次算好，后面各阶段共用
#[derive(Debug, Clone)]
struct RenumberPlan {
    id: String,
    acronym: String,
    paper_number: u32,
    range: Option<PageRange>,
    citation: String,
    new_file_name: String,
    published_path: String,
    file_url: String,
}

/// 论文处理流程
///
/// - 编排单篇论文的四个阶段
/// - 不持有任何资源（数据库 / 外部程序）
/// - 不修改序号状态，只读取
pub struct StageFlow {
    config: Config,
    codec: FilenameCodec,
    title_rewriter: TitleRewriter,
    title_pages_to_remove: u32,
}

impl StageFlow {
    pub fn new(config: &Config, title_pages_to_remove: u32) -> Self {
        Self {
            config: config.clone(),
            codec: FilenameCodec::new(),
            title_rewriter: TitleRewriter::new(),
            title_pages_to_remove,
        }
    }

    pub async fn run(
        &self,
        store: &dyn RecordStore,
        tools: &dyn DocumentService,
        doc: &PaperDocument,
        sequencer: &Sequencer,
        ctx: &PaperCtx,
    ) -> DocumentReport {
        // ========== S0: 查询 ID ==========
        let record = match store.find_by_filename(&doc.file_name).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                warn!("[论文 {}] ⚠️ 数据库中未找到 ID，跳过", ctx.paper_index);
                return DocumentReport::skipped(&doc.file_name);
            }
            Err(e) => {
                error!("[论文 {}] ❌ 查询 ID 失败: {}", ctx.paper_index, e);
                let mut report = DocumentReport::skipped(&doc.file_name);
                report.result = ProcessResult::Processed(DocumentState::Failed(Stage::Lookup));
                report.failure = Some(StageFailure {
                    stage: Stage::Lookup,
                    error: e.into(),
                });
                return report;
            }
        };
        info!("[论文 {}] 找到 ID: {}", ctx.paper_index, record.id);

        let mut report = DocumentReport {
            file_name: doc.file_name.clone(),
            id: Some(record.id.clone()),
            result: ProcessResult::Processed(DocumentState::Init),
            page_count: record.number_of_pages.unwrap_or(0),
            metadata: None,
            failure: None,
        };

        // 页码算不出来时数据库还没动过，记为 S1 失败
        let plan = match self.plan(doc, &record, sequencer, ctx) {
            Ok(plan) => plan,
            Err(e) => {
                error!("[论文 {}] ❌ {} 失败: {}", ctx.paper_index, Stage::RecordUpdate, e);
                report.result =
                    ProcessResult::Processed(DocumentState::Failed(Stage::RecordUpdate));
                report.failure = Some(StageFailure {
                    stage: Stage::RecordUpdate,
                    error: e,
                });
                return report;
            }
        };
        self.log_plan(ctx.paper_index, &plan);

        // ========== S1 -> S4 ==========
        let mut state = DocumentState::Init;
        while let Some(stage) = state.next_stage() {
            let outcome = match stage {
                Stage::RecordUpdate => self.update_record(store, &plan, ctx).await,
                Stage::Rename => self.rename(doc, &plan, ctx).await,
                Stage::MetadataUpdate => self
                    .update_metadata(&record, &plan, ctx)
                    .await
                    .map(|metadata| report.metadata = Some(metadata)),
                Stage::TitlePage => self.regenerate_title_page(tools, doc, &plan, ctx).await,
                Stage::Lookup => Ok(()),
            };

            state = match outcome {
                Ok(()) => {
                    info!("[论文 {}] ✓ {} 完成", ctx.paper_index, stage);
                    DocumentState::after(stage)
                }
                Err(e) => {
                    error!("[论文 {}] ❌ {} 失败: {}", ctx.paper_index, stage, e);
                    report.failure = Some(StageFailure { stage, error: e });
                    DocumentState::Failed(stage)
                }
            };
        }

        report.result = ProcessResult::Processed(state);
        report
    }

    fn plan(
        &self,
        doc: &PaperDocument,
        record: &PublicationRecord,
        sequencer: &Sequencer,
        ctx: &PaperCtx,
    ) -> StageResult<RenumberPlan> {
        let paper_number = sequencer.next_paper_number();
        let range = match record.number_of_pages {
            Some(count) => sequencer.next_range(count)?,
            None => None,
        };

        // 原文件名带 -P 标签时才写入序号
        let paper_tag = doc.has_paper_tag().then_some(paper_number);
        let tags = FilenameTags::new(ctx.target.volume, ctx.target.issue, paper_tag);
        let new_file_name = self.codec.render(&doc.file_name, &tags);

        let acronym = record.acronym().to_string();
        Ok(RenumberPlan {
            id: record.id.clone(),
            paper_number,
            range,
            citation: ctx.target.citation(range),
            published_path: self
                .config
                .published_path(&acronym, &ctx.target, &new_file_name),
            file_url: self.config.file_url(&acronym, &ctx.target, &new_file_name),
            new_file_name,
            acronym,
        })
    }

    /// S1: 更新数据库字段（非事务，失败时已写入的字段不回滚）
    async fn update_record(
        &self,
        store: &dyn RecordStore,
        plan: &RenumberPlan,
        ctx: &PaperCtx,
    ) -> StageResult<()> {
        let timestamp = ctx.timestamp();
        let mut writes = vec![
            (RecordField::VolumeNumber, ctx.target.volume_number_code()),
            (RecordField::NumIssue, ctx.target.issue.to_string()),
            (RecordField::TotalPaper, plan.paper_number.to_string()),
            (RecordField::CitationString, plan.citation.clone()),
        ];
        if let Some(range) = plan.range {
            writes.push((RecordField::TotalNumPages, range.last.to_string()));
        }
        writes.push((RecordField::PublishedPdfFile, plan.published_path.clone()));
        writes.push((RecordField::PublishDate, timestamp.clone()));
        writes.push((RecordField::StatusDate, timestamp));

        for (field, value) in writes {
            store.update_field(&plan.id, field, &value).await?;
            info!("[论文 {}] {} = {}", ctx.paper_index, field, value);
        }
        Ok(())
    }

    /// S2: 文件改名，文件名不符合格式时保持不变
    async fn rename(&self, doc: &PaperDocument, plan: &RenumberPlan, ctx: &PaperCtx) -> StageResult<()> {
        if plan.new_file_name == doc.file_name {
            info!(
                "[论文 {}] 文件名无需修改: {}",
                ctx.paper_index, doc.file_name
            );
            return Ok(());
        }

        let target = doc.path.with_file_name(&plan.new_file_name);
        if fs::try_exists(&target).await.unwrap_or(false) {
            return Err(StageError::TargetExists(target));
        }

        fs::rename(&doc.path, &target)
            .await
            .map_err(|e| StageError::io(&doc.path, e))?;
        info!(
            "[论文 {}] 文件改名: {} -> {}",
            ctx.paper_index, doc.file_name, plan.new_file_name
        );
        Ok(())
    }

    /// S3: 更新 RDF 元数据，缺少的键只记录
    async fn update_metadata(
        &self,
        record: &PublicationRecord,
        plan: &RenumberPlan,
        ctx: &PaperCtx,
    ) -> StageResult<MetadataReport> {
        let dir = self
            .config
            .metadata_dir(&plan.acronym)
            .ok_or_else(|| StageError::UnknownPublication(plan.acronym.clone()))?;
        let rdf_path = dir.join(format!("{}.rdf", plan.id));

        let content = fs::read_to_string(&rdf_path)
            .await
            .map_err(|e| StageError::io(&rdf_path, e))?;
        let mut metadata = MetadataRecord::parse(&content);

        let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.trim().is_empty());
        let updates = [
            (MetadataKey::Title, non_empty(&record.title)),
            (MetadataKey::Abstract, non_empty(&record.abstract_text)),
            (MetadataKey::CreationDate, Some(ctx.creation_date())),
            (MetadataKey::FileUrl, Some(plan.file_url.clone())),
            (MetadataKey::Pages, plan.range.map(|r| r.to_string())),
            (MetadataKey::Year, Some(ctx.target.year().to_string())),
            (MetadataKey::Volume, Some(ctx.target.volume.to_string())),
            (MetadataKey::Issue, Some(ctx.target.issue.to_string())),
        ];
        let report = apply_updates(&mut metadata, &updates);

        for key in &report.missing {
            warn!("[论文 {}] ⚠️ RDF 中没有 {} 行", ctx.paper_index, key);
        }
        for key in &report.no_value {
            warn!("[论文 {}] ⚠️ {} 没有可写入的值", ctx.paper_index, key);
        }

        if !report.updated.is_empty() {
            write_replacing(&rdf_path, metadata.render().as_bytes()).await?;
        }
        Ok(report)
    }

    /// S4: 改写标题页 HTML，转成 PDF，替换论文开头的旧标题页
    async fn regenerate_title_page(
        &self,
        tools: &dyn DocumentService,
        doc: &PaperDocument,
        plan: &RenumberPlan,
        ctx: &PaperCtx,
    ) -> StageResult<()> {
        let title_dir = self
            .config
            .title_dir(&plan.acronym)
            .ok_or_else(|| StageError::UnknownPublication(plan.acronym.clone()))?;
        let html_path = title_dir.join(format!("{}Pub.html", plan.id));
        let title_pdf_path = title_dir.join(format!("{}Pub.pdf", plan.id));

        let html = fs::read_to_string(&html_path)
            .await
            .map_err(|e| StageError::io(&html_path, e))?;
        let html = self.title_rewriter.rewrite(&html, &ctx.target, plan.range);
        write_replacing(&html_path, html.as_bytes()).await?;

        let title_pdf = tools.convert(&html).await?;
        write_replacing(&title_pdf_path, &title_pdf).await?;
        info!("[论文 {}] 标题页已更新: {}", ctx.paper_index, title_pdf_path.display());

        let paper_path = doc.path.with_file_name(&plan.new_file_name);
        let paper = fs::read(&paper_path)
            .await
            .map_err(|e| StageError::io(&paper_path, e))?;

        let backup_dir = title_dir.join(format!("GeneralPDF{}", plan.acronym));
        fs::create_dir_all(&backup_dir)
            .await
            .map_err(|e| StageError::io(&backup_dir, e))?;
        let backup_path = backup_dir.join(format!("{}finalPaper_ScriptFix.pdf", plan.id));
        fs::write(&backup_path, &paper)
            .await
            .map_err(|e| StageError::io(&backup_path, e))?;

        let trimmed = tools
            .splice(&paper, &SpliceDirective::RemoveLeadingPages(self.title_pages_to_remove))
            .await?;
        let spliced = tools
            .splice(&trimmed, &SpliceDirective::Prepend(title_pdf))
            .await?;
        write_replacing(&paper_path, &spliced).await?;

        Ok(())
    }

    fn log_plan(&self, paper_index: usize, plan: &RenumberPlan) {
        info!("[论文 {}] 序号: {}", paper_index, plan.paper_number);
        match plan.range {
            Some(range) => info!("[论文 {}] 页码: {}", paper_index, range),
            None => warn!("[论文 {}] ⚠️ 页数未知，引用中不含页码", paper_index),
        }
        info!("[论文 {}] 引用: {}", paper_index, plan.citation);
    }
}

/// 先写临时文件再改名替换
async fn write_replacing(path: &Path, contents: &[u8]) -> StageResult<()> {
    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    fs::write(&temp_path, contents)
        .await
        .map_err(|e| StageError::io(&temp_path, e))?;
    fs::rename(&temp_path, path)
        .await
        .map_err(|e| StageError::io(path, e))
}
