use anyhow::Result;
use clap::Parser;

use renumber_issue::{logger, App, Cli, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::load(cli.config.as_deref())?;

    // 初始化日志
    logger::init(cli.verbose || config.verbose_logging);

    let params = cli.batch_params()?;
    let credentials = cli.credentials(&config);

    // 初始化并运行应用
    let stats = App::initialize(config, params, &credentials).await?.run().await?;
    if stats.total > 0 && stats.completed == 0 {
        tracing::warn!("没有论文完成全部阶段");
    }

    Ok(())
}
