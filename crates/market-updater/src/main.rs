//! Market updater CLI.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use chrono::NaiveDate;
use market_core::{
    init_logging, AppConfig, Dataset, Instrument, LogConfig, LogFormat, MarketClock, Timeframe,
};
use market_data::{CsvFileStore, DataProvider, DurableStore, YahooProvider};
use market_updater::{CycleOutcome, ManualUpdateReport, UpdateScheduler};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "market-updater")]
#[command(about = "Market-aware OHLCV update scheduler", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 설정 파일 경로
    #[arg(long, global = true, default_value = market_core::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// 로그 레벨 (trace, debug, info, warn, error). 설정 파일보다 우선
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// 로그 형식 (pretty, json, compact)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// 종목 세트 (development, production, sector_banking, sector_it, sector_auto)
    #[arg(long, global = true)]
    symbol_set: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// 데몬 모드: 스케줄러를 시작하고 Ctrl-C까지 실행
    Daemon,

    /// 수동 갱신 (시간 게이트 생략)
    Update {
        /// 타임프레임 (15m, 1h, 1d, 1wk). 생략하면 활성화된 전체
        #[arg(long)]
        timeframe: Option<Timeframe>,

        /// 특정 종목만 갱신 (쉼표로 구분, 예: "RELIANCE.NS,TCS.NS")
        #[arg(long)]
        symbols: Option<String>,
    },

    /// 스케줄러 상태 출력
    Status {
        /// JSON으로 출력
        #[arg(long)]
        json: bool,
    },

    /// 데이터 조회. 기본은 병합 후 저장하며 `--no-save`면 결과만 출력
    Fetch {
        /// 타임프레임 (15m, 1h, 1d, 1wk)
        #[arg(long)]
        timeframe: Timeframe,

        /// 특정 종목만 조회 (쉼표로 구분). 생략하면 유니버스 전체
        #[arg(long)]
        symbols: Option<String>,

        /// 저장하지 않고 조회 결과만 출력
        #[arg(long)]
        no_save: bool,

        /// 출력할 샘플 행 수
        #[arg(long, default_value_t = 5)]
        head: usize,
    },

    /// 저장된 데이터 조회
    Load {
        /// 타임프레임 (15m, 1h, 1d, 1wk)
        #[arg(long)]
        timeframe: Timeframe,

        /// 종목 필터 (쉼표로 구분)
        #[arg(long)]
        symbols: Option<String>,

        /// 시작 날짜 (YYYY-MM-DD, 거래소 시간대, 포함)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// 종료 날짜 (YYYY-MM-DD, 거래소 시간대, 포함)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// 출력할 행 수
        #[arg(long, default_value_t = 10)]
        head: usize,

        /// JSON으로 출력 (`--head` 무시)
        #[arg(long)]
        json: bool,
    },

    /// 보관 기간이 지난 스냅샷 정리
    Cleanup,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("설정 로드 실패: {}", cli.config.display()))?;
    if let Some(set) = &cli.symbol_set {
        config.universe.symbol_set = set.clone();
    }

    // 로깅 초기화
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    let format = match cli.log_format {
        Some(format) => format,
        None => config.logging.format.parse().unwrap_or_default(),
    };
    init_logging(LogConfig::new(level).with_format(format))
        .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    tracing::info!(config = %cli.config.display(), "Market Updater 시작");

    let clock = MarketClock::from_config(&config.market)?;
    let provider: Arc<dyn DataProvider> = Arc::new(YahooProvider::new(&config.provider)?);
    let store: Arc<dyn DurableStore> = Arc::new(CsvFileStore::from_config(&config.storage));
    let scheduler = UpdateScheduler::new(config, clock, provider, Arc::clone(&store))?;

    match cli.command {
        Commands::Daemon => {
            scheduler.start().await?;
            tracing::info!("=== 데몬 모드 시작 (Ctrl-C로 종료) ===");

            tokio::signal::ctrl_c()
                .await
                .context("종료 신호 대기 실패")?;
            tracing::info!("종료 신호 수신, 스케줄러 중지 중...");

            scheduler.stop().await?;
        }
        Commands::Update { timeframe, symbols } => {
            let report = scheduler
                .manual_update(timeframe, symbols.as_deref().map(parse_symbols))
                .await?;
            print_report(&report);

            if !report.succeeded() {
                bail!("수동 갱신 실패");
            }
        }
        Commands::Fetch {
            timeframe,
            symbols,
            no_save,
            head,
        } => {
            let symbols = symbols.as_deref().map(parse_symbols);
            if no_save {
                let report = scheduler.preview_fetch(timeframe, symbols).await?;
                for failure in &report.failures {
                    println!("failed  {}: {}", failure.instrument, failure.reason);
                }
                if report.dataset.is_empty() {
                    bail!("{} 데이터를 받지 못했습니다", timeframe);
                }
                print_dataset(timeframe, &report.dataset, head);
                println!("(not saved)");
            } else {
                let report = scheduler.manual_update(Some(timeframe), symbols).await?;
                print_report(&report);
                if !report.succeeded() {
                    bail!("{} 조회 실패", timeframe);
                }
            }
        }
        Commands::Load {
            timeframe,
            symbols,
            start,
            end,
            head,
            json,
        } => {
            let symbols = symbols.as_deref().map(parse_symbols);
            let dataset = scheduler
                .load_data(timeframe, symbols.as_deref(), start, end)
                .await?;
            if dataset.is_empty() {
                bail!("{} 데이터가 없습니다", timeframe);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(dataset.records())?);
            } else {
                print_dataset(timeframe, &dataset, head);
            }
        }
        Commands::Status { json } => {
            let status = scheduler.status();

            let mut datasets = BTreeMap::new();
            for tf in scheduler.timeframes() {
                match store.summary(tf).await {
                    Ok(summary) => {
                        datasets.insert(tf.to_string(), summary);
                    }
                    Err(e) => tracing::warn!(timeframe = %tf, error = %e, "데이터셋 요약 실패"),
                }
            }

            if json {
                let body = serde_json::json!({ "scheduler": status, "datasets": datasets });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                print!("{}", status);
                println!();
                println!(
                    "{:<5} {:>8} {:>6}  {:<25} {}",
                    "TF", "RECORDS", "SYMS", "FIRST", "LAST"
                );
                for (tf, summary) in &datasets {
                    println!(
                        "{:<5} {:>8} {:>6}  {:<25} {}",
                        tf,
                        summary.records,
                        summary.instruments,
                        fmt_opt(summary.first),
                        fmt_opt(summary.last),
                    );
                }
            }
        }
        Commands::Cleanup => {
            let removed = scheduler.cleanup().await?;
            println!("removed {} snapshot(s)", removed);
        }
    }

    tracing::info!("Market Updater 종료");
    Ok(())
}

fn parse_symbols(raw: &str) -> Vec<Instrument> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Instrument::new)
        .collect()
}

fn print_report(report: &ManualUpdateReport) {
    for (tf, result) in &report.results {
        match result {
            Ok(CycleOutcome::Updated(stats)) => println!(
                "{:<4} {:<8} symbols={}/{} records={}",
                tf.to_string(),
                result_label(result),
                stats.fetched,
                stats.requested,
                stats.merge.records_after,
            ),
            Ok(outcome) => println!("{:<4} {}", tf.to_string(), outcome.label()),
            Err(e) => println!("{:<4} failed   {}", tf.to_string(), e),
        }
    }
}

fn print_dataset(timeframe: Timeframe, dataset: &Dataset, head: usize) {
    let summary = dataset.summary();
    println!(
        "{} records for {} ({} symbols, {} to {})",
        summary.records,
        timeframe,
        summary.instruments,
        fmt_opt(summary.first),
        fmt_opt(summary.last),
    );
    println!();
    println!(
        "{:<14} {:<17} {:>12} {:>12} {:>12} {:>12} {:>14}",
        "SYMBOL", "TIME", "OPEN", "HIGH", "LOW", "CLOSE", "VOLUME"
    );
    for r in dataset.records().iter().take(head) {
        println!(
            "{:<14} {:<17} {:>12} {:>12} {:>12} {:>12} {:>14}",
            r.instrument.as_str(),
            r.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            r.open.to_string(),
            r.high.to_string(),
            r.low.to_string(),
            r.close.to_string(),
            r.volume.to_string(),
        );
    }
}

fn fmt_opt(ts: Option<chrono::DateTime<chrono::Utc>>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn result_label(result: &market_updater::Result<CycleOutcome>) -> &'static str {
    match result {
        Ok(outcome) => outcome.label(),
        Err(_) => "failed",
    }
}
