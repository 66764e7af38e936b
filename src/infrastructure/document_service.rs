//! 外部文档工具 - 基础设施层
//!
//! 把 HTML 转 PDF（wkhtmltopdf）和 PDF 拼接（Ghostscript）封装成两个能力：
//! `convert` 和 `splice`。编排层只看到字节，不关心外部程序。

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::ServiceError;

/// 拼接指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpliceDirective {
    /// 删除文档开头的若干页
    RemoveLeadingPages(u32),
    /// 在文档前面拼上一份标题页 PDF
    Prepend(Vec<u8>),
}

/// 文档转换 / 拼接能力
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// 把标题页 HTML 转成 PDF
    async fn convert(&self, title_html: &str) -> Result<Vec<u8>, ServiceError>;

    /// 按指令修改 PDF，返回新文档
    async fn splice(
        &self,
        document: &[u8],
        directive: &SpliceDirective,
    ) -> Result<Vec<u8>, ServiceError>;
}

/// 调用外部程序实现的文档服务
pub struct ExternalDocumentTools {
    converter_bin: PathBuf,
    ghostscript_bin: PathBuf,
}

impl ExternalDocumentTools {
    pub fn new(converter_bin: impl Into<PathBuf>, ghostscript_bin: impl Into<PathBuf>) -> Self {
        Self {
            converter_bin: converter_bin.into(),
            ghostscript_bin: ghostscript_bin.into(),
        }
    }

    async fn run_ghostscript(
        &self,
        options: &[String],
        inputs: &[&Path],
        output: &Path,
    ) -> Result<(), ServiceError> {
        let mut command = Command::new(&self.ghostscript_bin);
        command
            .args(["-dBATCH", "-dNOPAUSE", "-q", "-sDEVICE=pdfwrite"])
            .args(options)
            .arg(format!("-sOutputFile={}", output.display()))
            .args(inputs);
        run(command, &self.ghostscript_bin).await
    }
}

#[async_trait]
impl DocumentService for ExternalDocumentTools {
    async fn convert(&self, title_html: &str) -> Result<Vec<u8>, ServiceError> {
        let work_dir = tempfile::tempdir()?;
        let html_path = work_dir.path().join("title.html");
        let pdf_path = work_dir.path().join("title.pdf");
        fs::write(&html_path, title_html).await?;

        let mut command = Command::new(&self.converter_bin);
        command.arg(&html_path).arg(&pdf_path);
        run(command, &self.converter_bin).await?;

        info!("✓ 标题页 HTML 已转换为 PDF");
        Ok(fs::read(&pdf_path).await?)
    }

    async fn splice(
        &self,
        document: &[u8],
        directive: &SpliceDirective,
    ) -> Result<Vec<u8>, ServiceError> {
        if *directive == SpliceDirective::RemoveLeadingPages(0) {
            return Ok(document.to_vec());
        }

        let work_dir = tempfile::tempdir()?;
        let input_path = work_dir.path().join("paper.pdf");
        let output_path = work_dir.path().join("paper_out.pdf");
        fs::write(&input_path, document).await?;

        match directive {
            SpliceDirective::RemoveLeadingPages(count) => {
                let options = [format!("-dFirstPage={}", count + 1)];
                self.run_ghostscript(&options, &[input_path.as_path()], &output_path)
                    .await?;
                info!("✓ 已删除开头 {} 页", count);
            }
            SpliceDirective::Prepend(title) => {
                let title_path = work_dir.path().join("title.pdf");
                fs::write(&title_path, title).await?;
                let options = ["-dPDFSETTINGS=/prepress".to_string()];
                let inputs = [title_path.as_path(), input_path.as_path()];
                self.run_ghostscript(&options, &inputs, &output_path).await?;
                info!("✓ 新标题页已拼接到论文开头");
            }
        }

        Ok(fs::read(&output_path).await?)
    }
}

/// 执行外部程序，非零退出码视为失败
async fn run(mut command: Command, tool: &Path) -> Result<(), ServiceError> {
    let tool_name = tool.display().to_string();
    debug!("执行外部程序: {:?}", command);

    let output = command.output().await.map_err(|e| ServiceError::Spawn {
        tool: tool_name.clone(),
        source: e,
    })?;

    if !output.status.success() {
        return Err(ServiceError::NonZeroExit {
            tool: tool_name,
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_remove_zero_pages_skips_external_tool() {
        let tools = ExternalDocumentTools::new("/nonexistent/wkhtmltopdf", "/nonexistent/gs");
        let document = b"%PDF-1.4 fake".to_vec();
        let result = tools
            .splice(&document, &SpliceDirective::RemoveLeadingPages(0))
            .await
            .unwrap();
        assert_eq!(result, document);
    }

    #[tokio::test]
    async fn test_missing_binary_reports_spawn_error() {
        let tools = ExternalDocumentTools::new("/nonexistent/wkhtmltopdf", "/nonexistent/gs");
        let err = tools.convert("<html></html>").await.unwrap_err();
        assert!(matches!(err, ServiceError::Spawn { .. }), "{:?}", err);
    }
}
