use config::{Config, ConfigError, Environment, File};
use std::path::Path;
use steplog_core::config::{AppConfig, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// 环境变量前缀，例如 `STEPLOG__HEALTH__SOURCE_NAME`
const ENV_PREFIX: &str = "STEPLOG";
const LOG_FILE_PREFIX: &str = "steplog.log";

/// `STEPLOG__<SECTION>__<KEY>` 形式的环境变量来源，数值字符串按类型解析
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// # Summary
/// 加载应用配置。
///
/// # Logic
/// 1. 以 `AppConfig::default()` 作为最底层来源。
/// 2. 若指定了配置文件则叠加 (文件必须存在)。
/// 3. 叠加 `STEPLOG__*` 环境变量。
///
/// # Arguments
/// * `path`: 可选的配置文件路径，格式由扩展名决定。
///
/// # Returns
/// 合并后的配置或 `ConfigError`。
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    load_with(path, environment())
}

fn load_with(path: Option<&Path>, env: Environment) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }
    builder.add_source(env).build()?.try_deserialize()
}

/// # Summary
/// 初始化全局日志。
///
/// # Logic
/// 1. 日志级别取 `RUST_LOG`，缺省为 `info`。
/// 2. 始终输出到终端。
/// 3. 配置了日志目录时额外按天滚动写入文件。
///
/// # Returns
/// 文件写入的后台守卫，必须在进程退出前保持存活。
pub fn init_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr));

    match &logging.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    }
}
