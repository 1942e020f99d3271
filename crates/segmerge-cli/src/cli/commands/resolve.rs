//! `segmerge resolve` – fetch one playlist and print its segment URLs.

use anyhow::{Context, Result};
use segmerge_core::config::SegmergeConfig;
use segmerge_core::fetch;
use segmerge_core::resolver;
use segmerge_core::retry::run_with_retry;

pub async fn run_resolve(cfg: &SegmergeConfig, url: &str) -> Result<()> {
    let opts = cfg.fetch_options();
    let policy = cfg.retry_policy();
    let fetch_url = url.to_string();
    let body = tokio::task::spawn_blocking(move || {
        run_with_retry(&policy, None, || fetch::fetch(&fetch_url, &opts, None))
    })
    .await?
    .with_context(|| format!("fetching playlist {}", url))?;

    let text = resolver::decode_playlist(body).with_context(|| format!("reading playlist {}", url))?;
    let refs = resolver::resolve(&text, url);
    if refs.is_empty() {
        println!("No segments in playlist.");
    }
    for r in refs {
        println!("{}\t{}", r.index, r.url);
    }
    Ok(())
}
