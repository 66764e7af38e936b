//! 序号分配器 - 业务能力层
//!
//! 持有本次批处理的 `RunningIssueState`：下一篇论文序号和累计页数。
//! 只有编排层在一篇论文合格完成后才调用 `advance`。

use std::path::Path;

use tracing::{info, warn};

use crate::error::{FatalError, FatalResult, StageResult};
use crate::infrastructure::RecordStore;
use crate::models::{PageRange, RunningIssueState};
use crate::services::page_range::compute_range;

/// 序号分配器
#[derive(Debug, Clone)]
pub struct Sequencer {
    state: RunningIssueState,
}

impl Sequencer {
    /// 全新开始：从 `first_paper_number` 开始编号，累计页数为 0
    pub fn init_fresh(first_paper_number: u32) -> Self {
        info!("🆕 从序号 {} 开始编号", first_paper_number);
        Self {
            state: RunningIssueState::new(first_paper_number, 0),
        }
    }

    /// 接着上一次运行继续编号
    ///
    /// 通过一次查询拿到序号为 `prior_paper_number` 的已发布论文的 ID 和累计页数。
    /// 查不到是致命错误；查到了但文件在 `site_root` 下不存在只记警告。
    pub async fn init_resume(
        store: &dyn RecordStore,
        prior_paper_number: u32,
        path_prefix: &str,
        site_root: &Path,
    ) -> FatalResult<Self> {
        let next_paper_number =
            prior_paper_number
                .checked_add(1)
                .ok_or_else(|| FatalError::InvalidParameter {
                    name: "resume",
                    reason: format!("序号 {} 超出范围", prior_paper_number),
                })?;

        info!(
            "🔁 续编: 查找序号 {} 的已发布论文 (前缀: {})",
            prior_paper_number, path_prefix
        );

        let point = store
            .find_by_sequence(prior_paper_number, path_prefix)
            .await
            .map_err(|source| FatalError::ResumeQuery {
                paper_number: prior_paper_number,
                source,
            })?
            .ok_or_else(|| FatalError::ResumeNotFound {
                paper_number: prior_paper_number,
                prefix: path_prefix.to_string(),
            })?;

        let total_pages = point
            .total_pages
            .as_deref()
            .map(str::trim)
            .and_then(|t| t.parse::<u32>().ok())
            .ok_or_else(|| FatalError::ResumeTotalInvalid {
                id: point.id.clone(),
                value: point.total_pages.clone(),
            })?;

        let physical = site_root.join(point.published_pdf_file.trim_start_matches('/'));
        if !tokio::fs::try_exists(&physical).await.unwrap_or(false) {
            warn!(
                "⚠️ 无法确认上一篇论文文件存在: {} (继续使用数据库中的状态)",
                physical.display()
            );
        }

        info!(
            "✓ 续编起点: ID {}，累计页数 {}，下一篇序号 {}",
            point.id,
            total_pages,
            next_paper_number
        );

        Ok(Self {
            state: RunningIssueState {
                next_paper_number,
                last_total_pages: total_pages,
                last_document_id: point.id,
            },
        })
    }

    pub fn state(&self) -> &RunningIssueState {
        &self.state
    }

    pub fn next_paper_number(&self) -> u32 {
        self.state.next_paper_number
    }

    pub fn last_total_pages(&self) -> u32 {
        self.state.last_total_pages
    }

    /// 下一篇论文的页码范围
    pub fn next_range(&self, page_count: u32) -> StageResult<Option<PageRange>> {
        compute_range(self.state.last_total_pages, page_count)
    }

    /// 一篇论文合格完成后推进状态
    ///
    /// 合格的论文在 S1 之前已经通过 `next_range` 检查过累计页数
    pub fn advance(&mut self, page_count: u32, document_id: &str) {
        self.state.last_total_pages = self.state.last_total_pages.saturating_add(page_count);
        self.state.next_paper_number = self.state.next_paper_number.saturating_add(1);
        self.state.last_document_id = document_id.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::models::{PublicationRecord, RecordField, ResumePoint};
    use async_trait::async_trait;

    struct ResumeStore {
        point: Option<ResumePoint>,
    }

    #[async_trait]
    impl RecordStore for ResumeStore {
        async fn find_by_filename(
            &self,
            _file_name: &str,
        ) -> Result<Option<PublicationRecord>, StoreError> {
            Ok(None)
        }

        async fn find_by_sequence(
            &self,
            paper_number: u32,
            path_prefix: &str,
        ) -> Result<Option<ResumePoint>, StoreError> {
            Ok(self
                .point
                .clone()
                .filter(|p| paper_number == 26 && p.published_pdf_file.starts_with(path_prefix)))
        }

        async fn update_field(
            &self,
            id: &str,
            _field: RecordField,
            _value: &str,
        ) -> Result<(), StoreError> {
            Err(StoreError::MissingRecord(id.to_string()))
        }
    }

    fn store_with_total(total: Option<&str>) -> ResumeStore {
        ResumeStore {
            point: Some(ResumePoint {
                id: "EB-25-00026".to_string(),
                total_pages: total.map(str::to_string),
                published_pdf_file: "/Pubs/EB/2025/Volume45/EB-V45-I1-P26-25-A00026.pdf"
                    .to_string(),
            }),
        }
    }

    #[test]
    fn test_fresh_start() {
        let sequencer = Sequencer::init_fresh(1);
        assert_eq!(sequencer.next_paper_number(), 1);
        assert_eq!(sequencer.last_total_pages(), 0);
        assert_eq!(sequencer.next_range(10).unwrap().unwrap().to_string(), "1-10");
    }

    #[test]
    fn test_advance_accumulates_pages() {
        let mut sequencer = Sequencer::init_fresh(1);
        sequencer.advance(10, "EB-25-00001");
        sequencer.advance(8, "EB-25-00002");
        assert_eq!(sequencer.next_paper_number(), 3);
        assert_eq!(sequencer.last_total_pages(), 18);
        assert_eq!(sequencer.state().last_document_id, "EB-25-00002");
    }

    #[test]
    fn test_resume_from_prior_paper() {
        let store = store_with_total(Some("200"));
        let site_root = tempfile::tempdir().unwrap();

        let mut sequencer = tokio_test::block_on(Sequencer::init_resume(
            &store,
            26,
            "/Pubs/EB/2025/Volume45/",
            site_root.path(),
        ))
        .unwrap();

        assert_eq!(sequencer.next_paper_number(), 27);
        assert_eq!(sequencer.last_total_pages(), 200);
        assert_eq!(sequencer.next_range(5).unwrap().unwrap().to_string(), "201-205");

        sequencer.advance(5, "EB-25-00027");
        assert_eq!(sequencer.last_total_pages(), 205);
        assert_eq!(sequencer.next_paper_number(), 28);
    }

    #[test]
    fn test_resume_not_found_is_fatal() {
        let store = store_with_total(Some("200"));
        let site_root = tempfile::tempdir().unwrap();

        let err = tokio_test::block_on(Sequencer::init_resume(
            &store,
            26,
            "/Pubs/EB/2025/Volume46/",
            site_root.path(),
        ))
        .unwrap_err();

        assert!(matches!(err, FatalError::ResumeNotFound { paper_number: 26, .. }));
    }

    #[test]
    fn test_resume_without_page_total_is_fatal() {
        let store = store_with_total(None);
        let site_root = tempfile::tempdir().unwrap();

        let err = tokio_test::block_on(Sequencer::init_resume(
            &store,
            26,
            "/Pubs/EB/2025/Volume45/",
            site_root.path(),
        ))
        .unwrap_err();

        assert!(matches!(err, FatalError::ResumeTotalInvalid { .. }));
    }

    #[test]
    fn test_resume_page_total_beyond_range_is_fatal() {
        let store = store_with_total(Some("4294967296"));
        let site_root = tempfile::tempdir().unwrap();

        let err = tokio_test::block_on(Sequencer::init_resume(
            &store,
            26,
            "/Pubs/EB/2025/Volume45/",
            site_root.path(),
        ))
        .unwrap_err();

        assert!(matches!(err, FatalError::ResumeTotalInvalid { .. }));
    }

    #[test]
    fn test_range_overflow_leaves_state_untouched() {
        let mut sequencer = Sequencer::init_fresh(1);
        sequencer.advance(u32::MAX - 3, "EB-25-00001");

        assert!(sequencer.next_range(10).is_err());
        assert_eq!(sequencer.next_paper_number(), 2);
        assert_eq!(sequencer.last_total_pages(), u32::MAX - 3);
    }

    #[test]
    fn test_resume_from_last_possible_number_is_rejected() {
        let store = store_with_total(Some("200"));
        let site_root = tempfile::tempdir().unwrap();

        let err = tokio_test::block_on(Sequencer::init_resume(
            &store,
            u32::MAX,
            "/Pubs/EB/2025/Volume45/",
            site_root.path(),
        ))
        .unwrap_err();

        assert!(matches!(err, FatalError::InvalidParameter { name: "resume", .. }));
    }
}
