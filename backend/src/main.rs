//! covidviz CLI - Covid-19 France dashboard data
//!
//! # Main Commands
//!
//! ```bash
//! covidviz serve                         # Start HTTP API (port 3000)
//! covidviz regional --regions "Grand Est" # Regional series as JSON
//! covidviz chart heatmap                  # Chart datasets for one mode
//! ```
//!
//! # Other Commands
//!
//! ```bash
//! covidviz national                      # National long-form series
//! covidviz regions                       # Region list
//! covidviz parse                         # Parse only, report skipped rows
//! ```
//!
//! Every data command reads `--url` (default: `COVIDVIZ_DATA_URL` or the
//! opencovid19-fr dataset) or a local `--input` file.

use clap::{Args, Parser, Subcommand};
use covidviz::view::parse_region_list;
use covidviz::{
    annotations, charts, filter_regions, load_dashboard, load_dashboard_file, load_file,
    ChartMode, DashboardData, DataLoader, Scale, Settings,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "covidviz")]
#[command(about = "Covid-19 France data pipeline and dashboard API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// CSV URL (default: COVIDVIZ_DATA_URL or the opencovid19-fr dataset)
    #[arg(short, long, conflicts_with = "input")]
    url: Option<String>,

    /// Local CSV file instead of downloading
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Port to listen on (default: COVIDVIZ_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,

        /// CSV URL served by the API
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Parse the dataset and report what was read
    Parse {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// List regions present in the regional series
    Regions {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// National series (date, type, nombre)
    National {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Regional series with deltas, fatality rate and outbreak-day ranks
    Regional {
        #[command(flatten)]
        source: SourceArgs,

        /// Comma-separated regions (default: all)
        #[arg(short, long)]
        regions: Option<String>,
    },

    /// Chart datasets for one dashboard mode
    Chart {
        /// Visualisation mode
        #[arg(value_enum)]
        mode: ChartMode,

        #[command(flatten)]
        source: SourceArgs,

        /// Comma-separated regions (default: all)
        #[arg(short, long)]
        regions: Option<String>,

        /// Logarithmic y axis (graph mode)
        #[arg(long)]
        log: bool,

        /// Include narrative annotations
        #[arg(long)]
        analysis: bool,
    },
}

#[tokio::main]
async fn main() {
    let settings = Settings::from_env();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { port, url } => cmd_serve(settings.with_overrides(url, port)).await,

        Commands::Parse { source } => cmd_parse(&settings, &source).await,

        Commands::Regions { source } => {
            cmd_dataset(&settings, &source, |data| to_json(&data.regions)).await
        }

        Commands::National { source } => {
            cmd_dataset(&settings, &source, |data| to_json(&data.national)).await
        }

        Commands::Regional { source, regions } => {
            let selection = regions.as_deref().map(parse_region_list);
            cmd_dataset(&settings, &source, |data| {
                to_json(&filter_regions(&data.regional, selection.as_deref()))
            })
            .await
        }

        Commands::Chart {
            mode,
            source,
            regions,
            log,
            analysis,
        } => {
            let selection = regions.as_deref().map(parse_region_list);
            let scale = if log { Scale::Log } else { Scale::Linear };
            cmd_dataset(&settings, &source, |data| {
                let view = filter_regions(&data.regional, selection.as_deref());
                let notes = if analysis { annotations(mode) } else { &[] };
                to_json(&serde_json::json!({
                    "mode": mode,
                    "scale": scale,
                    "charts": charts(mode, scale, &view, &data.national),
                    "annotations": notes,
                }))
            })
            .await
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_serve(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    covidviz::server::start_server(settings).await?;
    Ok(())
}

async fn cmd_parse(settings: &Settings, source: &SourceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let table = match &source.input {
        Some(path) => load_file(path).await?,
        None => {
            let url = source.url.as_deref().unwrap_or(&settings.data_url);
            DataLoader::new().fetch(url).await?.as_ref().clone()
        }
    };

    eprintln!("   Encoding: {}", table.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(table.delimiter));
    eprintln!("   Columns: {}", table.headers.join(", "));
    eprintln!("✅ Parsed {} records, {} skipped", table.len(), table.skipped.len());

    write_output(&to_json(&table.skipped)?, source.output.as_deref())
}

/// Load the dataset, then render it with `render`.
async fn cmd_dataset<F>(
    settings: &Settings,
    source: &SourceArgs,
    render: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(&DashboardData) -> Result<String, serde_json::Error>,
{
    let data = match &source.input {
        Some(path) => load_dashboard_file(path).await?,
        None => {
            let url = source.url.as_deref().unwrap_or(&settings.data_url);
            load_dashboard(&DataLoader::new(), url).await?
        }
    };

    let json = render(&data)?;
    write_output(&json, source.output.as_deref())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
