//! 日志初始化

use tracing_subscriber::EnvFilter;

/// 初始化控制台日志
///
/// `RUST_LOG` 优先；未设置时 `verbose` 决定默认级别
pub fn init(verbose: bool) {
    let default_directive = if verbose {
        "renumber_issue=debug,info"
    } else {
        "renumber_issue=info,warn"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // 测试中可能被重复调用
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
