//! 命令行参数

use std::path::PathBuf;

use clap::Parser;

use crate::config::{Config, StoreCredentials};
use crate::error::{FatalError, FatalResult};
use crate::models::IssueTarget;

/// 把一批已发布论文重新编号到新的卷/期
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 待处理论文所在目录
    pub directory: PathBuf,

    /// 目标卷号 [20, 100)
    #[arg(long)]
    pub volume: u32,

    /// 目标期号 [0, 10)
    #[arg(long)]
    pub issue: u32,

    /// 续编：上一次运行最后一篇论文的序号（0 表示全新开始）
    #[arg(long)]
    pub resume: Option<u32>,

    /// 拼接前从论文开头删除的页数 [0, 4]
    #[arg(long = "title-pages", default_value_t = 1)]
    pub title_pages: u32,

    /// 数据库名
    #[arg(long, env = "RENUMBER_DB_SCHEMA")]
    pub schema: String,

    /// 数据库用户
    #[arg(long, env = "RENUMBER_DB_USER")]
    pub user: String,

    /// 数据库密码
    #[arg(long, env = "RENUMBER_DB_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// TOML 配置文件
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// 显示详细日志
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    /// 校验后的批处理参数
    pub fn batch_params(&self) -> FatalResult<BatchParams> {
        let params = BatchParams {
            directory: self.directory.clone(),
            target: IssueTarget::new(self.volume, self.issue),
            resume_from: self.resume,
            title_pages_to_remove: self.title_pages,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn credentials(&self, config: &Config) -> StoreCredentials {
        StoreCredentials {
            host: config.db_host.clone(),
            port: config.db_port,
            schema: self.schema.clone(),
            username: self.user.clone(),
            password: self.password.clone(),
        }
    }
}

/// 一次批处理的参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchParams {
    pub directory: PathBuf,
    pub target: IssueTarget,
    /// `None` 或 `Some(0)` 表示全新开始
    pub resume_from: Option<u32>,
    pub title_pages_to_remove: u32,
}

impl BatchParams {
    pub fn validate(&self) -> FatalResult<()> {
        if !(20..100).contains(&self.target.volume) {
            return Err(FatalError::InvalidParameter {
                name: "volume",
                reason: format!("{} 不在 [20, 100) 范围内", self.target.volume),
            });
        }
        if self.target.issue >= 10 {
            return Err(FatalError::InvalidParameter {
                name: "issue",
                reason: format!("{} 不在 [0, 10) 范围内", self.target.issue),
            });
        }
        if self.title_pages_to_remove > 4 {
            return Err(FatalError::InvalidParameter {
                name: "title-pages",
                reason: format!("{} 不在 [0, 4] 范围内", self.title_pages_to_remove),
            });
        }
        Ok(())
    }

    /// 续编时上一篇论文的序号
    pub fn resume_point(&self) -> Option<u32> {
        self.resume_from.filter(|&n| n > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec![
            "renumber_issue",
            "--schema",
            "pubs",
            "--user",
            "editor",
            "--password",
            "secret",
        ];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["/tmp/papers", "--volume", "45", "--issue", "1"]);
        let params = cli.batch_params().unwrap();
        assert_eq!(params.target, IssueTarget::new(45, 1));
        assert_eq!(params.title_pages_to_remove, 1);
        assert_eq!(params.resume_point(), None);
    }

    #[test]
    fn test_resume_zero_is_fresh_start() {
        let cli = parse(&["/tmp/papers", "--volume", "45", "--issue", "2", "--resume", "0"]);
        assert_eq!(cli.batch_params().unwrap().resume_point(), None);

        let cli = parse(&["/tmp/papers", "--volume", "45", "--issue", "2", "--resume", "26"]);
        assert_eq!(cli.batch_params().unwrap().resume_point(), Some(26));
    }

    #[test]
    fn test_out_of_range_parameters() {
        for (args, name) in [
            (vec!["/tmp/p", "--volume", "19", "--issue", "1"], "volume"),
            (vec!["/tmp/p", "--volume", "100", "--issue", "1"], "volume"),
            (vec!["/tmp/p", "--volume", "45", "--issue", "10"], "issue"),
            (vec!["/tmp/p", "--volume", "45", "--issue", "1", "--title-pages", "5"], "title-pages"),
        ] {
            let err = parse(&args).batch_params().unwrap_err();
            assert!(
                matches!(err, FatalError::InvalidParameter { name: n, .. } if n == name),
                "{:?}",
                args
            );
        }
    }

    #[test]
    fn test_credentials_take_host_from_config() {
        let cli = parse(&["/tmp/papers", "--volume", "45", "--issue", "1"]);
        let config = Config {
            db_host: "db.internal".to_string(),
            db_port: 3307,
            ..Config::default()
        };
        let credentials = cli.credentials(&config);
        assert_eq!(credentials.host, "db.internal");
        assert_eq!(credentials.port, 3307);
        assert_eq!(credentials.schema, "pubs");
        assert_eq!(credentials.username, "editor");
    }
}
