use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{FatalError, FatalResult, ParseError};
use crate::models::PaperDocument;
use crate::services::FilenameCodec;

/// 取出文件名中扩展名之前的最后一个数字序号
///
/// `EB-V44-I1-P10.pdf` -> 10
pub fn sequence_tag(file_name: &str) -> Result<u64, ParseError> {
    static TRAILING_DIGITS: OnceLock<Regex> = OnceLock::new();
    let pattern = TRAILING_DIGITS.get_or_init(|| Regex::new(r"(\d+)$").expect("valid tag pattern"));

    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);

    let digits = pattern
        .captures(stem)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| ParseError::NoSequenceTag(file_name.to_string()))?;

    digits
        .as_str()
        .parse()
        .map_err(|_| ParseError::SequenceTagOverflow(file_name.to_string()))
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case(extension))
}

/// 从目录中加载所有待处理的论文，按文件名末尾的数字序号排序
///
/// 没有数字序号的文件记警告后跳过，不会中断批处理
pub async fn load_paper_set(
    folder_path: &Path,
    extension: &str,
    codec: &FilenameCodec,
) -> FatalResult<Vec<PaperDocument>> {
    if !fs::metadata(folder_path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
    {
        return Err(FatalError::DirectoryNotFound(folder_path.to_path_buf()));
    }

    let unreadable = |source| FatalError::DirectoryUnreadable {
        path: folder_path.to_path_buf(),
        source,
    };

    let mut papers = Vec::new();
    let mut entries = fs::read_dir(folder_path).await.map_err(unreadable)?;

    while let Some(entry) = entries.next_entry().await.map_err(unreadable)? {
        let path: PathBuf = entry.path();
        let is_file = fs::metadata(&path).await.map(|m| m.is_file()).unwrap_or(false);
        if !is_file || !has_extension(&path, extension) {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().to_string();
        let tag = match sequence_tag(&file_name) {
            Ok(tag) => tag,
            Err(e) => {
                warn!("⚠️ 跳过文件: {}", e);
                continue;
            }
        };

        let fields = codec.parse(&file_name);
        if fields.is_none() {
            debug!("文件名不符合卷/期格式，改名将保持不变: {}", file_name);
        }

        papers.push(PaperDocument {
            acronym: file_name.split('-').next().unwrap_or_default().to_string(),
            path,
            file_name,
            fields,
            sequence_tag: tag,
        });
    }

    papers.sort_by(|a, b| {
        a.sequence_tag
            .cmp(&b.sequence_tag)
            .then_with(|| a.file_name.cmp(&b.file_name))
    });

    info!("✓ 共加载 {} 篇论文", papers.len());
    Ok(papers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_tag() {
        assert_eq!(sequence_tag("EB-V44-I1-P10.pdf").unwrap(), 10);
        assert_eq!(sequence_tag("EB-V44-I1-P7-24-A00007.PDF").unwrap(), 7);
        assert_eq!(
            sequence_tag("EB-V44-I1-final.pdf"),
            Err(ParseError::NoSequenceTag("EB-V44-I1-final.pdf".to_string()))
        );
    }

    #[tokio::test]
    async fn test_numeric_ordering_and_filtering() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "EB-V44-I1-24-P9.pdf",
            "EB-V44-I1-24-P10.PDF",
            "EB-V44-I1-24-P2.pdf",
            "EB-V44-I1-24-notes.pdf",
            "EB-V44-I1-24-P3.html",
        ] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("EB-V44-I1-24-P1.pdf")).unwrap();

        let papers = load_paper_set(dir.path(), "pdf", &FilenameCodec::new())
            .await
            .unwrap();
        let names: Vec<&str> = papers.iter().map(|p| p.file_name.as_str()).collect();

        assert_eq!(
            names,
            vec!["EB-V44-I1-24-P2.pdf", "EB-V44-I1-24-P9.pdf", "EB-V44-I1-24-P10.PDF"]
        );
        assert_eq!(papers[0].acronym, "EB");
        assert_eq!(papers[0].sequence_tag, 2);
    }

    #[tokio::test]
    async fn test_missing_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = load_paper_set(&missing, "pdf", &FilenameCodec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FatalError::DirectoryNotFound(_)));
    }
}
