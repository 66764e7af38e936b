use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::IssueTarget;

/// 单个期刊的目录配置（相对路径以 `site_root` 为基准）
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct PublicationDirs {
    /// RDF 元数据目录
    pub metadata_dir: PathBuf,
    /// 标题页（`<ID>Pub.html` / `<ID>Pub.pdf`）目录
    pub title_dir: PathBuf,
}

impl PublicationDirs {
    fn new(metadata_dir: &str, title_dir: &str) -> Self {
        Self {
            metadata_dir: PathBuf::from(metadata_dir),
            title_dir: PathBuf::from(title_dir),
        }
    }
}

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 数据库主机
    pub db_host: String,
    /// 数据库端口
    pub db_port: u16,
    /// 网站根目录
    pub site_root: PathBuf,
    /// 数据库中已发布论文路径的根（`Published_PDF_File` 的前缀）
    pub published_path_root: String,
    /// 网站地址（生成 `File-URL`）
    pub site_url: String,
    /// 论文文件扩展名
    pub paper_extension: String,
    /// 全新开始时的第一篇序号
    pub first_paper_number: u32,
    /// HTML 转 PDF 程序
    pub converter_bin: PathBuf,
    /// Ghostscript 程序
    pub ghostscript_bin: PathBuf,
    /// 输出日志文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 期刊缩写 -> 目录
    pub publications: BTreeMap<String, PublicationDirs>,
}

impl Default for Config {
    fn default() -> Self {
        let publications = BTreeMap::from([
            (
                "EBFT08".to_string(),
                PublicationDirs::new("RePEc/EBF/ebfull", "pubs/EBFT08"),
            ),
            (
                "EB".to_string(),
                PublicationDirs::new("RePEc/ebl/ecbull", "pubs/EB"),
            ),
            (
                "777wps777".to_string(),
                PublicationDirs::new("RePEc/777/777wps", "pubs/777wps777"),
            ),
            (
                "VUECON".to_string(),
                PublicationDirs::new("RePEc/van/wpaper", "pubs/VUECON"),
            ),
        ]);

        Self {
            db_host: "127.0.0.1".to_string(),
            db_port: 3306,
            site_root: PathBuf::from("C:/inetpub/vhosts/accessecon.com/httpdocs"),
            published_path_root: "/Pubs".to_string(),
            site_url: "http://www.accessecon.com".to_string(),
            paper_extension: "pdf".to_string(),
            first_paper_number: 1,
            converter_bin: PathBuf::from("wkhtmltopdf"),
            ghostscript_bin: PathBuf::from("gs"),
            output_log_file: "renumber_log.txt".to_string(),
            verbose_logging: false,
            publications,
        }
    }
}

impl Config {
    /// 加载配置：默认值 -> TOML 文件（可选）-> 环境变量
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        Ok(base.with_env())
    }

    /// 从 TOML 文件加载，未写的字段取默认值
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", path.display()))
    }

    /// 用环境变量覆盖
    pub fn with_env(self) -> Self {
        let env = |name: &str| std::env::var(name).ok();
        Self {
            db_host: env("RENUMBER_DB_HOST").unwrap_or(self.db_host),
            db_port: env("RENUMBER_DB_PORT").and_then(|v| v.parse().ok()).unwrap_or(self.db_port),
            site_root: env("RENUMBER_SITE_ROOT").map(PathBuf::from).unwrap_or(self.site_root),
            published_path_root: env("RENUMBER_PUBLISHED_ROOT").unwrap_or(self.published_path_root),
            site_url: env("RENUMBER_SITE_URL").unwrap_or(self.site_url),
            paper_extension: env("RENUMBER_PAPER_EXTENSION").unwrap_or(self.paper_extension),
            first_paper_number: env("RENUMBER_FIRST_PAPER_NUMBER").and_then(|v| v.parse().ok()).unwrap_or(self.first_paper_number),
            converter_bin: env("RENUMBER_CONVERTER_BIN").map(PathBuf::from).unwrap_or(self.converter_bin),
            ghostscript_bin: env("RENUMBER_GHOSTSCRIPT_BIN").map(PathBuf::from).unwrap_or(self.ghostscript_bin),
            output_log_file: env("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
            verbose_logging: env("VERBOSE_LOGGING").and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
            publications: self.publications,
        }
    }

    /// 期刊的 RDF 元数据目录
    pub fn metadata_dir(&self, acronym: &str) -> Option<PathBuf> {
        self.publications
            .get(acronym)
            .map(|dirs| self.site_root.join(&dirs.metadata_dir))
    }

    /// 期刊的标题页目录
    pub fn title_dir(&self, acronym: &str) -> Option<PathBuf> {
        self.publications
            .get(acronym)
            .map(|dirs| self.site_root.join(&dirs.title_dir))
    }

    /// 某一卷已发布论文的路径前缀，例如 `/Pubs/EB/2025/Volume45/`
    pub fn volume_prefix(&self, acronym: &str, target: &IssueTarget) -> String {
        format!(
            "{}/{}/{}/Volume{}/",
            self.published_path_root.trim_end_matches('/'),
            acronym,
            target.year(),
            target.volume
        )
    }

    /// 数据库中的 `Published_PDF_File`
    pub fn published_path(&self, acronym: &str, target: &IssueTarget, file_name: &str) -> String {
        format!("{}{}", self.volume_prefix(acronym, target), file_name)
    }

    /// 元数据中的 `File-URL`
    pub fn file_url(&self, acronym: &str, target: &IssueTarget, file_name: &str) -> String {
        format!(
            "{}{}",
            self.site_url.trim_end_matches('/'),
            self.published_path(acronym, target, file_name)
        )
    }
}

/// 数据库连接信息
#[derive(Clone, Debug)]
pub struct StoreCredentials {
    pub host: String,
    pub port: u16,
    pub schema: String,
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_published_path_and_url() {
        let config = Config::default();
        let target = IssueTarget::new(45, 1);
        assert_eq!(
            config.published_path("EB", &target, "EB-V45-I1-P1-25-A7.pdf"),
            "/Pubs/EB/2025/Volume45/EB-V45-I1-P1-25-A7.pdf"
        );
        assert_eq!(
            config.file_url("EB", &target, "EB-V45-I1-P1-25-A7.pdf"),
            "http://www.accessecon.com/Pubs/EB/2025/Volume45/EB-V45-I1-P1-25-A7.pdf"
        );
    }

    #[test]
    fn test_publication_dirs_resolve_against_site_root() {
        let config = Config::default();
        assert_eq!(
            config.metadata_dir("EBFT08").unwrap(),
            PathBuf::from("C:/inetpub/vhosts/accessecon.com/httpdocs/RePEc/EBF/ebfull")
        );
        assert!(config.title_dir("UNKNOWN").is_none());
    }

    #[test]
    fn test_toml_overrides_keep_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("renumber.toml");
        std::fs::write(
            &path,
            r#"
site_root = "/srv/site"
first_paper_number = 5

[publications.EB]
metadata_dir = "/srv/rdf/eb"
title_dir = "pubs/EB"
"#,
        )
        .unwrap();

        let config = Config::from_toml_file(&path).unwrap();
        assert_eq!(config.first_paper_number, 5);
        assert_eq!(config.db_port, 3306);
        assert_eq!(config.publications.len(), 1);
        assert_eq!(config.metadata_dir("EB").unwrap(), PathBuf::from("/srv/rdf/eb"));
        assert_eq!(config.title_dir("EB").unwrap(), PathBuf::from("/srv/site/pubs/EB"));
    }
}
