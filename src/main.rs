//! svgrab CLI: find inline SVG graphics in a page and export them as PNG.
//!
//! Usage:
//!   svgrab scan <SOURCE>                     List the graphics of a page
//!   svgrab export <SOURCE> --index <N>       Export one listed graphic
//!   svgrab export <SOURCE> --target <CSS>    Export the graphic under an element
//!   svgrab export-all <SOURCE>               Export every listed graphic
//!
//! `SOURCE` is a local HTML file or an http(s) URL.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use svgrab::delivery::DirectoryDelivery;
use svgrab::export::{export_all, export_asset};
use svgrab::raster::Rasterizer;
use svgrab::session::DialogStatus;
use svgrab::{Background, Downloader, ExportSettings, Page, PageSession, StyleMode};

#[derive(Parser)]
#[command(
    name = "svgrab",
    about = "Export inline SVG graphics of a web page as PNG images",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the graphics found in a page
    Scan {
        #[command(flatten)]
        opts: CommonOpts,

        /// Print the assets as JSON, including both serializations
        #[arg(long)]
        json: bool,
    },

    /// Export a single graphic
    Export {
        #[command(flatten)]
        opts: CommonOpts,

        /// Index of the graphic in the scan list
        #[arg(long, conflicts_with = "target", required_unless_present = "target")]
        index: Option<usize>,

        /// CSS selector of any element; the graphic containing it is exported
        #[arg(long)]
        target: Option<String>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Export every graphic of the scan list
    ExportAll {
        #[command(flatten)]
        opts: CommonOpts,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
}

#[derive(Args)]
struct CommonOpts {
    /// Local HTML file or http(s) URL
    source: String,

    /// JSON settings file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scale factor 1-8
    #[arg(short, long)]
    scale: Option<u32>,

    /// transparent | white
    #[arg(short, long)]
    background: Option<Background>,

    /// styled (alias computed) | raw
    #[arg(long)]
    style: Option<StyleMode>,

    /// Only keep graphics inside the viewport
    #[arg(long)]
    visible_only: bool,

    /// Maximum number of graphics scanned, 1-200
    #[arg(long)]
    limit: Option<usize>,

    /// Do not load system fonts (text renders blank)
    #[arg(long)]
    no_system_fonts: bool,
}

impl CommonOpts {
    fn settings(&self) -> Result<ExportSettings> {
        let mut settings = match &self.config {
            Some(path) => ExportSettings::from_json_file(path)
                .with_context(|| format!("reading settings from {}", path.display()))?,
            None => ExportSettings::default(),
        };
        if let Some(scale) = self.scale {
            settings.scale = scale;
        }
        if let Some(background) = self.background {
            settings.background = background;
        }
        if let Some(style) = self.style {
            settings.style_mode = style;
        }
        if let Some(limit) = self.limit {
            settings.limit = limit;
        }
        settings.visible_only |= self.visible_only;
        settings.load_system_fonts &= !self.no_system_fonts;
        Ok(settings.normalized())
    }

    fn load(&self, settings: &ExportSettings) -> Result<Page> {
        Page::load(&self.source, &settings.page)
            .with_context(|| format!("loading {}", self.source))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan { opts, json } => {
            let settings = opts.settings()?;
            let page = opts.load(&settings)?;
            let assets = page.scan(&settings.scan_options());
            if json {
                println!("{}", serde_json::to_string_pretty(&assets)?);
            } else if assets.is_empty() {
                println!("no inline SVG found");
            } else {
                for a in &assets {
                    println!(
                        "{:>4}  {:>5}x{:<5}  {:<24}  {}",
                        a.index,
                        a.asset.width.round(),
                        a.asset.height.round(),
                        a.selector,
                        a.asset.title
                    );
                }
                println!("{} graphics", assets.len());
            }
        }

        Commands::Export {
            opts,
            index,
            target,
            out,
        } => {
            let settings = opts.settings()?;
            let page = opts.load(&settings)?;
            let rasterizer = Rasterizer::new(settings.load_system_fonts);
            let downloader = Downloader::spawn(DirectoryDelivery::new(&out)?);

            if let Some(selector) = target {
                let element = page
                    .select(&selector)?
                    .into_iter()
                    .next()
                    .ok_or_else(|| anyhow!("no element matches '{}'", selector))?;
                let mut session = PageSession::new(&page);
                if session.on_context_menu(&element).is_none() {
                    bail!("'{}' is not inside an <svg>", selector);
                }
                let mut dialog = session
                    .open_export_dialog()
                    .ok_or_else(|| anyhow!("no graphic recorded"))?;
                dialog.scale_input = settings.scale.to_string();
                dialog.background = settings.background.to_string();
                dialog.style_mode = settings.style_mode.to_string();
                match dialog.submit(&rasterizer, &downloader).await {
                    DialogStatus::Started { filename, .. } => println!("saved {}", filename),
                    DialogStatus::Failed(e) => bail!("export failed: {}", e),
                }
            } else if let Some(index) = index {
                let assets = page.scan(&settings.scan_options());
                let asset = assets
                    .iter()
                    .find(|a| a.index == index)
                    .ok_or_else(|| anyhow!("no graphic with index {} in the scan list", index))?;
                let file = export_asset(
                    asset,
                    &settings.export_request(),
                    settings.style_mode,
                    &rasterizer,
                    &downloader,
                    true,
                )
                .await?;
                println!("saved {} ({}x{})", file.filename, file.width, file.height);
            }
            downloader.close().await?;
        }

        Commands::ExportAll { opts, out } => {
            let settings = opts.settings()?;
            let page = opts.load(&settings)?;
            let assets = page.scan(&settings.scan_options());
            let rasterizer = Rasterizer::new(settings.load_system_fonts);
            let downloader = Downloader::spawn(DirectoryDelivery::new(&out)?);

            let abort = Arc::new(AtomicBool::new(false));
            let flag = abort.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    flag.store(true, Ordering::SeqCst);
                }
            });

            let report = export_all(
                &assets,
                &settings.export_request(),
                settings.style_mode,
                &rasterizer,
                &downloader,
                &abort,
            )
            .await?;
            downloader.close().await?;

            println!(
                "{} PNG files written to {}{}",
                report.exported.len(),
                out.display(),
                if report.aborted { " (aborted)" } else { "" }
            );
        }
    }

    Ok(())
}
