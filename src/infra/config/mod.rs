//! The TOML configuration of the `vault-model` binary.

use {
    crate::{domain::pool::PoolId, infra::subgraph},
    anyhow::{Context, bail},
    serde::Deserialize,
    serde_with::{DisplayFromStr, serde_as},
    std::{
        path::{Path, PathBuf},
        time::Duration,
    },
};

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct File {
    /// Lists pools from a subgraph.
    subgraph: Option<SubgraphFile>,

    /// Reads pools from a local JSON file instead.
    pools_file: Option<PathBuf>,
}

#[serde_as]
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct SubgraphFile {
    /// The GraphQL endpoint.
    #[serde_as(as = "DisplayFromStr")]
    url: reqwest::Url,

    /// Only list these pools.
    #[serde_as(as = "Vec<DisplayFromStr>")]
    #[serde(default)]
    pool_ids: Vec<PoolId>,

    #[serde(default = "default_page_size")]
    page_size: usize,

    #[serde(with = "humantime_serde", default = "default_request_timeout")]
    request_timeout: Duration,
}

fn default_page_size() -> usize {
    1000
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

/// Where pools come from.
pub enum Source {
    Subgraph(subgraph::Config),
    /// A JSON file, relative paths are resolved against the config file's
    /// directory.
    File(PathBuf),
}

pub struct Config {
    pub source: Source,
}

/// Loads the configuration from a TOML file.
pub async fn load(path: &Path) -> anyhow::Result<Config> {
    let data = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("I/O error while reading {path:?}"))?;
    parse(&data, path.parent().unwrap_or(Path::new(".")))
        .with_context(|| format!("invalid config file {path:?}"))
}

fn parse(data: &str, base: &Path) -> anyhow::Result<Config> {
    let file: File = toml::de::from_str(data)?;
    let source = match (file.subgraph, file.pools_file) {
        (Some(subgraph), None) => Source::Subgraph(subgraph::Config {
            url: subgraph.url,
            pool_ids: subgraph.pool_ids,
            page_size: subgraph.page_size,
            timeout: subgraph.request_timeout,
        }),
        (None, Some(pools)) => Source::File(base.join(pools)),
        (Some(_), Some(_)) => bail!("only one of `subgraph` and `pools-file` may be set"),
        (None, None) => bail!("either `subgraph` or `pools-file` must be set"),
    };
    Ok(Config { source })
}
