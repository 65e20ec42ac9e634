mod display;
mod settings;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use steplog_core::common::time::{SystemClock, TimeProvider};
use steplog_core::store::port::HealthStore;
use steplog_health::generator::SampleGenerator;
use steplog_health::purger::DuplicateSamplePurger;
use steplog_health::statistics::StatisticsService;
use steplog_store::sample::SqliteHealthStore;
use tracing::info;

/// 步数样本的写入、统计与同日重复清理
#[derive(Parser)]
#[command(name = "steplog", version, about)]
struct Cli {
    /// 配置文件路径 (toml / yaml / json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 数据目录，覆盖配置中的 database.data_dir
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 写入一条随机步数样本
    Add,
    /// 写入若干条完全相同的样本
    Seed {
        #[arg(long)]
        copies: Option<usize>,
    },
    /// 清理同日重复样本
    Purge {
        /// 来源过滤，缺省取 health.source_name
        #[arg(long)]
        source: Option<String>,
        /// 只列出重复样本，不删除
        #[arg(long)]
        dry_run: bool,
    },
    /// 按时间桶、按来源输出累计值
    Stats,
    /// 先写入重复样本再执行清理
    RefreshQuery,
}

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 负责加载配置、实例化 SQLite 存储并把它注入各个服务。
///
/// # Logic
/// 1. 解析命令行并加载配置 (样本类型、时间窗口在此处校验，非法直接失败)。
/// 2. 初始化全局日志。
/// 3. 实例化基础设施层 (Store、Clock)。
/// 4. 按子命令构造服务并执行。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 1. 加载配置
    let config = settings::load(cli.config.as_deref())?;
    let kind = config.health.kind()?;
    let interval = config.health.interval()?;

    // 2. 初始化日志
    let _log_guard = settings::init_logging(&config.logging);
    info!("steplog starting, kind={}", kind);

    // 3. 实例化基础设施层
    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| PathBuf::from(&config.database.data_dir));
    let store: Arc<dyn HealthStore> = Arc::new(SqliteHealthStore::open(&data_dir).await?);
    let clock: Arc<dyn TimeProvider> = Arc::new(SystemClock);

    let health = &config.health;
    let generator =
        SampleGenerator::new(store.clone(), clock.clone(), kind, health.source_name.clone());
    let purger = DuplicateSamplePurger::new(store.clone(), kind);
    let range = health.window(clock.now())?;

    // 4. 执行子命令
    match cli.command {
        Command::Add => {
            let sample = generator.add_sample().await?;
            println!(
                "added {} ({} {})",
                sample.id,
                display::format_quantity(sample.quantity),
                sample.kind.unit()
            );
        }
        Command::Seed { copies } => {
            let written = generator
                .create_duplicates(copies.unwrap_or(health.duplicate_copies))
                .await?;
            println!("seeded {} identical samples", written.len());
        }
        Command::Purge { source, dry_run } => {
            let source = source.unwrap_or_else(|| health.source_name.clone());
            let report = if dry_run {
                purger.plan(&range, &source).await?
            } else {
                purger.purge_duplicates(&range, &source).await?
            };
            print!("{}", display::render_report(&report, dry_run));
        }
        Command::Stats => {
            let rows = StatisticsService::new(store.clone(), kind)
                .refresh(&range, interval, range.end())
                .await?;
            print!("{}", display::render_statistics(&rows));
        }
        Command::RefreshQuery => {
            generator.create_duplicates(health.duplicate_copies).await?;
            let report = purger
                .purge_duplicates(&range, &health.source_name)
                .await?;
            print!("{}", display::render_report(&report, false));
        }
    }

    Ok(())
}
