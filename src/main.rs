use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use agg_table_loader::agg::{AggConfigSpec, AggConfigs};
use agg_table_loader::config::Config;
use agg_table_loader::search::{
    FetchContext, HttpSearchBackend, InspectorAdapters, PaginatedFetcher, RequestOptions,
    TimeRange, VisParams,
};
use agg_table_loader::utils::logging;
use agg_table_loader::LoadResult;

#[derive(Parser)]
#[clap(version = "0.1.0", author = "GraphDB Contributors")]
/// Load table visualization data from a search backend
struct Cli {
    #[clap(short, long, default_value = "config.toml")]
    config: PathBuf,
    /// Index pattern to search
    #[clap(short, long)]
    index: String,
    /// Visualization params (JSON)
    #[clap(short, long)]
    params: Option<PathBuf>,
    /// Aggregation configs (JSON array)
    #[clap(short, long)]
    aggs: Option<PathBuf>,
    /// Raw query DSL (JSON)
    #[clap(short, long)]
    query: Option<String>,
    #[clap(long)]
    time_field: Option<String>,
    #[clap(long, default_value = "now-15m")]
    from: String,
    #[clap(long, default_value = "now")]
    to: String,
    #[clap(long)]
    metrics_at_all_levels: bool,
    #[clap(long)]
    force_fetch: bool,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> LoadResult<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

async fn run(cli: Cli, config: Config) -> LoadResult<()> {
    let params: VisParams = match &cli.params {
        Some(path) => read_json(path)?,
        None => VisParams::default(),
    };
    let specs: Vec<AggConfigSpec> = match &cli.aggs {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };
    let mut aggs = AggConfigs::from_specs(cli.index.clone(), specs);

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("收到中断信号，取消加载");
            ctrl_c.cancel();
        }
    });

    let ctx = FetchContext {
        time_range: cli.time_field.map(|field| TimeRange {
            field,
            from: cli.from,
            to: cli.to,
        }),
        query: cli
            .query
            .as_deref()
            .map(serde_json::from_str::<serde_json::Value>)
            .transpose()?,
        filters: Vec::new(),
        options: RequestOptions {
            partial_rows: false,
            metrics_at_all_levels: cli.metrics_at_all_levels,
            force_fetch: cli.force_fetch,
        },
        cancel,
    };

    let backend = Arc::new(HttpSearchBackend::new(&config.backend)?);
    let fetcher = PaginatedFetcher::new(backend, &config.fetch);
    let mut inspector = InspectorAdapters::new();
    let response = fetcher.fetch(&mut aggs, &params, &ctx, &mut inspector).await?;

    println!("{}", serde_json::to_string_pretty(&response.to_json())?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };
    logging::init(&config.log)?;

    let result = run(cli, config).await;
    if let Err(e) = &result {
        log::error!("加载失败: {}", e);
    }
    logging::shutdown();
    result.map_err(Into::into)
}
