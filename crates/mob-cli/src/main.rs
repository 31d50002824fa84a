//! Mobilize - command line driver
//!
//! `mobilize <input.html> [--config <file.json>] [--always] [--mobile-ua]`

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use mob_html::{HtmlParser, serialize};
use mob_rewrite::{InMemoryStatistics, MobilizeRewriteFilter, RewriteConfig};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: mobilize <input.html> [--config <file.json>] [--always] [--mobile-ua]";

#[derive(Debug, Default)]
struct Args {
    input: PathBuf,
    config: Option<PathBuf>,
    always: bool,
    mobile_ua: bool,
}

impl Args {
    fn parse(args: impl Iterator<Item = String>) -> Result<Self> {
        let mut input = None;
        let mut out = Args::default();
        let mut args = args;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let path = args.next().context("--config needs a file")?;
                    out.config = Some(path.into());
                }
                "--always" => out.always = true,
                "--mobile-ua" => out.mobile_ua = true,
                "-h" | "--help" => bail!(USAGE),
                flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
                path if input.is_none() => input = Some(PathBuf::from(path)),
                extra => bail!("unexpected argument {extra}\n{USAGE}"),
            }
        }
        out.input = input.context(USAGE)?;
        Ok(out)
    }
}

fn load_config(args: &Args) -> Result<RewriteConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            RewriteConfig::from_json(&json)
                .with_context(|| format!("loading config {}", path.display()))?
        }
        None => RewriteConfig::default(),
    };
    config.always |= args.always;
    Ok(config)
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse(std::env::args().skip(1))?;
    let config = load_config(&args)?;

    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let url = format!("file://{}", args.input.display());
    let mut doc = HtmlParser::new()
        .parse_bytes(&bytes, &url)
        .with_context(|| format!("parsing {}", args.input.display()))?;

    let mut stats = InMemoryStatistics::new();
    MobilizeRewriteFilter::init_stats(&mut stats);
    let filter = MobilizeRewriteFilter::new(&config, &stats);

    if filter.applies_to(args.mobile_ua) {
        filter.rewrite_document(&mut doc)?;
        for (name, value) in stats.snapshot() {
            tracing::info!("{name} = {value}");
        }
    } else {
        tracing::info!("Not a mobile user agent; leaving {} unchanged", args.input.display());
    }

    println!("{}", serialize(&doc));
    Ok(())
}
