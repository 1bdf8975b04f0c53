use {
    crate::{
        api::dto,
        cli,
        domain::{pool::source::PoolDataProvider, vault::VaultModel},
        infra::{config, file::PoolsFile, metrics, subgraph::Subgraph},
    },
    anyhow::Context,
    clap::Parser,
    std::path::Path,
};

pub async fn start(args: impl IntoIterator<Item = String>) -> anyhow::Result<()> {
    let args = cli::Args::parse_from(args);
    initialize_tracing(&args.log);
    tracing::info!("running vault model with {args:#?}");

    let result = run(&args).await;
    if args.metrics {
        eprintln!("{}", encode_metrics()?);
    }
    let deltas = result?;
    println!("{}", serde_json::to_string_pretty(&deltas)?);
    Ok(())
}

async fn run(args: &cli::Args) -> anyhow::Result<dto::Deltas> {
    let config = config::load(&args.config).await?;
    let provider: Box<dyn PoolDataProvider> = match config.source {
        config::Source::Subgraph(subgraph) => Box::new(Subgraph::new(subgraph)?),
        config::Source::File(path) => Box::new(PoolsFile::new(path)),
    };

    let requests = load_batch(&args.batch)
        .await?
        .iter()
        .enumerate()
        .map(|(i, call)| call.to_domain().with_context(|| format!("invalid call {i}")))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut model = VaultModel::new(provider);
    let deltas = model.multicall(&requests, args.refresh).await?;
    Ok(dto::Deltas::from_domain(&deltas))
}

async fn load_batch(path: &Path) -> anyhow::Result<Vec<dto::Call>> {
    let data = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("I/O error while reading {path:?}"))?;
    serde_json::from_str(&data).with_context(|| format!("invalid batch file {path:?}"))
}

fn initialize_tracing(filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}

fn encode_metrics() -> anyhow::Result<String> {
    let families = metrics::registry().gather();
    let mut buffer = Vec::new();
    prometheus::Encoder::encode(&prometheus::TextEncoder::new(), &families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
