// Command-line front end for archive replay.
//
// Builds the archive index from the configured roots and answers one query
// per invocation: site listing, capture resolution, rendering, directory
// listings and single-URL resolution.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

use kodegen_tools_archive_replay::archive::{ArchiveRegistry, as_of_for_version};
use kodegen_tools_archive_replay::config::ReplayConfig;
use kodegen_tools_archive_replay::link_rewriter::{Classification, OutputMode, resolve_url};
use kodegen_tools_archive_replay::replay::{
    self, ArchiveFlags, ReplayBody, ReplayRequest, list_directory, requested_path, root_path,
};

#[derive(Parser)]
#[command(name = "kodegen-archive-replay")]
#[command(about = "Replay archived websites as they were on a given date", long_about = None)]
#[command(version)]
struct Cli {
    /// Archive root holding one directory per site (repeatable).
    /// Defaults to $ARCHIVE_DIR, then ./archives
    #[arg(long = "archive-dir", global = true)]
    archive_dirs: Vec<PathBuf>,

    /// Root site-local URLs at /<site>/<version>/ instead of writing them relative
    #[arg(long, global = true)]
    absolute: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List archived sites by title.
    Sites {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Show which capture serves a path at a version's date.
    Resolve {
        site: String,
        version: String,
        #[arg(default_value = "")]
        path: String,
    },

    /// Replay a path and write the served body to stdout or a file.
    Render {
        site: String,
        version: String,
        #[arg(default_value = "")]
        path: String,
        /// Comma-separated debug flags: raw, tokenize
        #[arg(long, default_value = "")]
        flags: String,
        /// Site-relative path of the page loading a script
        #[arg(long)]
        referer: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a directory listing as JSON.
    Listing {
        site: String,
        version: String,
        #[arg(default_value = "")]
        dir: String,
    },

    /// Resolve one URL as it would be written into a page.
    Url {
        site: String,
        version: String,
        url: String,
        /// Page the URL appears in
        #[arg(long, default_value = "")]
        from: String,
        /// Classify the URL as a navigation target rather than a resource
        #[arg(long)]
        external: bool,
    },
}

fn load_config(cli: &Cli) -> Result<ReplayConfig> {
    let config = match cli.archive_dirs.split_first() {
        None => ReplayConfig::from_env().context("Invalid environment configuration")?,
        Some((first, rest)) => rest
            .iter()
            .fold(ReplayConfig::builder().archive_dir(first), |builder, dir| {
                builder.archive_dir(dir)
            })
            .build()?,
    };
    Ok(if cli.absolute {
        config.with_output_mode(OutputMode::Absolute)
    } else {
        config
    })
}

async fn write_output(output: Option<&PathBuf>, bytes: &[u8]) -> Result<()> {
    match output {
        Some(path) => tokio::fs::write(path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(bytes).await?;
            stdout.flush().await?;
            Ok(())
        }
    }
}

fn print_sites(registry: &ArchiveRegistry, json: bool) -> Result<()> {
    let sites = registry.sites();
    if json {
        println!("{}", serde_json::to_string_pretty(&sites)?);
    } else {
        for (title, id) in sites {
            println!("{id}\t{title}");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let registry = config
        .load_registry()
        .context("Failed to build archive index")?;

    match &cli.command {
        Command::Sites { json } => print_sites(&registry, *json)?,
        Command::Resolve {
            site,
            version,
            path,
        } => {
            let request = ReplayRequest::new(site, version, path);
            let capture = replay::capture_path(&registry, &request)?;
            println!("{}", capture.display());
        }
        Command::Render {
            site,
            version,
            path,
            flags,
            referer,
            output,
        } => {
            let mut request =
                ReplayRequest::new(site, version, path).with_flags(ArchiveFlags::parse(flags));
            if let Some(referer) = referer {
                request = request.with_referer(referer);
            }
            let response = replay::replay(&registry, &request, &config.replay_options()).await?;
            if let Some(content_type) = &response.content_type {
                log::info!("Content-Type: {content_type}");
            }
            match response.body {
                ReplayBody::Text(text) => write_output(output.as_ref(), text.as_bytes()).await?,
                ReplayBody::Bytes(bytes) => write_output(output.as_ref(), &bytes).await?,
                ReplayBody::File(file) => {
                    let bytes = tokio::fs::read(&file)
                        .await
                        .with_context(|| format!("Failed to read {}", file.display()))?;
                    write_output(output.as_ref(), &bytes).await?;
                }
            }
        }
        Command::Listing { site, version, dir } => {
            let entries = list_directory(&registry, site, version, dir)?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        Command::Url {
            site,
            version,
            url,
            from,
            external,
        } => {
            let archive = registry
                .site(site)
                .with_context(|| format!("Unknown site: {site}"))?;
            let (settings, _) = archive.version_settings(version)?;
            as_of_for_version(version)?;
            let classification = if *external {
                Classification::External
            } else {
                Classification::Local
            };
            let page = requested_path(from, &settings.default_page);
            let resolved = resolve_url(
                url,
                &page,
                &settings,
                &root_path(site, version),
                config.output_mode(),
                classification,
            );
            println!("{resolved}");
        }
    }

    Ok(())
}
