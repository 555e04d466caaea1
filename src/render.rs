// =============================================================================
// Direct invocation — render configured charts and show them
// =============================================================================
//
// Each target is fetched and computed, its three summary lines go to stdout,
// and the page is written to `{output_dir}/{symbol}.html`. With
// `open_browser` set the page is then opened in the default browser. A failed
// target is logged and the rest still render.
// =============================================================================

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use reqwest::Url;
use tracing::{debug, error, info, warn};

use crate::chart::html::render_page;
use crate::config::{AppConfig, ChartTarget};
use crate::market_data::PriceSource;
use crate::pipeline::{compute_and_build, ChartRequest};

/// Render every target in `config`, printing summaries to stdout.
/// Errors if any target failed.
pub async fn render_all(config: &AppConfig, source: &dyn PriceSource) -> Result<()> {
    render_all_to(config, source, &mut std::io::stdout()).await
}

async fn render_all_to(
    config: &AppConfig,
    source: &dyn PriceSource,
    out: &mut (dyn Write + Send),
) -> Result<()> {
    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| {
            format!("failed to create output dir {}", config.output_dir.display())
        })?;

    let mut failed = 0usize;
    for target in &config.targets {
        match render_target(config, source, target, out).await {
            Ok(path) => {
                info!(symbol = %target.symbol, path = %path.display(), "chart written");
                if config.open_browser {
                    open_page(&path).await;
                }
            }
            Err(e) => {
                failed += 1;
                error!(symbol = %target.symbol, error = %format!("{e:#}"), "chart failed");
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} charts failed", config.targets.len());
    }
    Ok(())
}

async fn render_target(
    config: &AppConfig,
    source: &dyn PriceSource,
    target: &ChartTarget,
    out: &mut (dyn Write + Send),
) -> Result<PathBuf> {
    let request = ChartRequest::parse_now(&target.symbol, &target.start_date, &target.title)?;
    let (spec, summary) = compute_and_build(source, &request, config.window).await?;

    // The summary is printed even if the page cannot be written.
    writeln!(out, "{summary}").context("failed to print summary")?;

    let html = render_page(&spec, &summary, &config.plotly_cdn_url)
        .context("failed to serialise chart")?;
    let path = output_path(&config.output_dir, &request.symbol);
    tokio::fs::write(&path, html)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(path)
}

/// `{dir}/{symbol}.html`, with characters awkward in file names replaced.
fn output_path(dir: &Path, symbol: &str) -> PathBuf {
    let stem: String = symbol
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect();
    dir.join(format!("{stem}.html"))
}

/// `file://` URL of a written page.
async fn page_url(path: &Path) -> Result<Url> {
    let absolute = tokio::fs::canonicalize(path)
        .await
        .with_context(|| format!("failed to resolve {}", path.display()))?;
    Url::from_file_path(&absolute)
        .map_err(|_| anyhow::anyhow!("{} is not a valid file URL", absolute.display()))
}

/// Open `path` in the default browser. Failure only warns: the file is
/// already on disk.
async fn open_page(path: &Path) {
    let result = match page_url(path).await {
        Ok(url) => {
            debug!(%url, "opening chart in browser");
            tokio::task::spawn_blocking(move || webbrowser::open(url.as_str()))
                .await
                .context("browser launcher panicked")
                .and_then(|r| r.context("failed to launch browser"))
        }
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        warn!(path = %path.display(), error = %format!("{e:#}"), "could not open chart, open it manually");
    }
}
