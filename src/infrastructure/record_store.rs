//! 论文数据库 - 基础设施层
//!
//! 持有唯一的数据库会话，只暴露"查询 / 更新字段"的能力

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::Row;
use tracing::{debug, info};

use crate::config::StoreCredentials;
use crate::error::StoreError;
use crate::models::{PublicationRecord, RecordField, ResumePoint};

/// 论文数据库能力
///
/// 职责：
/// - 按文件名（子串匹配）查询论文记录
/// - 按序号和路径前缀查询上一篇已发布的论文
/// - 按 ID 更新单个字段
/// - 不关心流程顺序
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 按文件名子串查询，多条匹配时返回第一条
    async fn find_by_filename(&self, file_name: &str)
        -> Result<Option<PublicationRecord>, StoreError>;

    /// 按论文序号和 `Published_PDF_File` 前缀查询
    async fn find_by_sequence(
        &self,
        paper_number: u32,
        path_prefix: &str,
    ) -> Result<Option<ResumePoint>, StoreError>;

    /// 更新指定 ID 的单个字段
    async fn update_field(
        &self,
        id: &str,
        field: RecordField,
        value: &str,
    ) -> Result<(), StoreError>;
}

/// MySQL 论文数据库
pub struct MySqlRecordStore {
    pool: MySqlPool,
}

impl MySqlRecordStore {
    /// 连接数据库
    ///
    /// 整个批处理只使用一个连接
    pub async fn connect(credentials: &StoreCredentials) -> Result<Self, StoreError> {
        info!(
            "正在连接数据库: {}:{}/{}",
            credentials.host, credentials.port, credentials.schema
        );

        let options = MySqlConnectOptions::new()
            .host(&credentials.host)
            .port(credentials.port)
            .username(&credentials.username)
            .password(&credentials.password)
            .database(&credentials.schema);

        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        info!("✓ 数据库连接成功");
        Ok(Self { pool })
    }

    fn row_to_record(row: &MySqlRow) -> Result<PublicationRecord, StoreError> {
        Ok(PublicationRecord {
            id: row.try_get::<Option<String>, _>("ID")?.unwrap_or_default(),
            number_of_pages: parse_count("NumberOfPages", row.try_get("NumberOfPages")?)?,
            total_num_pages: parse_count("TotalNumpages", row.try_get("TotalNumpages")?)?,
            published_pdf_file: row.try_get("Published_PDF_File")?,
            title: row.try_get("Title")?,
            abstract_text: row.try_get("Abstract")?,
        })
    }
}

#[async_trait]
impl RecordStore for MySqlRecordStore {
    async fn find_by_filename(
        &self,
        file_name: &str,
    ) -> Result<Option<PublicationRecord>, StoreError> {
        debug!("按文件名查询: {}", file_name);

        let row = sqlx::query(
            r#"
            SELECT CAST(p.ID AS CHAR) AS ID,
                   CAST(p.NumberOfPages AS CHAR) AS NumberOfPages,
                   CAST(p.TotalNumpages AS CHAR) AS TotalNumpages,
                   CAST(p.Published_PDF_File AS CHAR) AS Published_PDF_File,
                   CAST(a.Title AS CHAR) AS Title,
                   CAST(a.Abstract AS CHAR) AS Abstract
            FROM tablepaper p
            LEFT JOIN tablepaperofarticles a ON a.ID = p.ID
            WHERE p.Published_PDF_File LIKE ?
            LIMIT 1
            "#,
        )
        .bind(format!("%{}%", escape_like(file_name)))
        .fetch_optional(&self.pool)
        .await?;

        let record = row.as_ref().map(Self::row_to_record).transpose()?;
        Ok(record.filter(|r| !r.id.is_empty()))
    }

    async fn find_by_sequence(
        &self,
        paper_number: u32,
        path_prefix: &str,
    ) -> Result<Option<ResumePoint>, StoreError> {
        debug!("按序号查询: {} (前缀: {})", paper_number, path_prefix);

        let row = sqlx::query(
            r#"
            SELECT CAST(ID AS CHAR) AS ID,
                   CAST(TotalNumpages AS CHAR) AS TotalNumpages,
                   CAST(Published_PDF_File AS CHAR) AS Published_PDF_File
            FROM tablepaper
            WHERE TotalPaper = ? AND Published_PDF_File LIKE ?
            LIMIT 1
            "#,
        )
        .bind(paper_number.to_string())
        .bind(format!("{}%", escape_like(path_prefix)))
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(ResumePoint {
                id: row.try_get::<Option<String>, _>("ID")?.unwrap_or_default(),
                total_pages: row.try_get("TotalNumpages")?,
                published_pdf_file: row
                    .try_get::<Option<String>, _>("Published_PDF_File")?
                    .unwrap_or_default(),
            })),
            None => Ok(None),
        }
    }

    async fn update_field(
        &self,
        id: &str,
        field: RecordField,
        value: &str,
    ) -> Result<(), StoreError> {
        // 列名来自封闭枚举，只有值走参数绑定
        let sql = format!("UPDATE tablepaper SET {} = ? WHERE ID = ?", field.column());
        let result = sqlx::query(&sql)
            .bind(value)
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(
            "更新 {} (ID: {}) = {} [影响 {} 行]",
            field,
            id,
            value,
            result.rows_affected()
        );
        Ok(())
    }
}

/// 转义 LIKE 通配符
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// 解析数据库中的页数字段，空字符串视为没有值
pub fn parse_count(field: &'static str, value: Option<String>) -> Result<Option<u32>, StoreError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text
            .parse()
            .map(Some)
            .map_err(|_| StoreError::InvalidValue {
                field,
                value: text.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("EB-V44_I1%.pdf"), r"EB-V44\_I1\%.pdf");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("NumberOfPages", Some(" 12 ".into())).unwrap(), Some(12));
        assert_eq!(parse_count("NumberOfPages", Some(String::new())).unwrap(), None);
        assert_eq!(parse_count("NumberOfPages", None).unwrap(), None);
        assert!(parse_count("NumberOfPages", Some("twelve".into())).is_err());
    }
}
