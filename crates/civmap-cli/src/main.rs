mod session;
mod source;

use civmap_bridge::{visible_markers, FilterKey, FilterSet, MapScreen, MarkerConfig, MarkerQuery, ScreenConfig};
use civmap_core::{AppConfig, FacilityId, FacilitySet};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::session::{run_session, StdoutSink};
use crate::source::FacilitySource;

#[derive(Debug, Parser)]
#[command(name = "civmap-cli")]
#[command(about = "Facility map host harness")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a map-screen session over stdin/stdout
    Run {
        /// Treat the session as signed in even without an API token
        #[arg(long)]
        signed_in: bool,
    },
    /// Print the marker payload the surface would receive
    Markers {
        /// Map zoom level
        #[arg(long, default_value = "13")]
        zoom: u8,
        /// Filter chip to switch off (repeatable)
        #[arg(long = "hide")]
        hide: Vec<FilterKey>,
        /// Only facilities whose name contains this text
        #[arg(long)]
        search: Option<String>,
    },
    /// List reviews for a facility (REST backend only)
    Reviews {
        /// Facility id
        facility_id: i64,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = civmap_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Run { signed_in }) => run(&config, signed_in).await?,
        Some(Commands::Markers { zoom, hide, search }) => {
            print_markers(&config, zoom, &hide, search.as_deref()).await?;
        }
        Some(Commands::Reviews { facility_id }) => {
            print_reviews(&config, FacilityId(facility_id)).await?;
        }
        Some(Commands::Config) | None => println!("{config:#?}"),
    }

    Ok(())
}

async fn run(config: &AppConfig, signed_in: bool) -> anyhow::Result<()> {
    let source = FacilitySource::from_config(config)?;
    let authenticated = signed_in || config.is_authenticated();
    tracing::info!(authenticated, env = %config.env, "starting map session");

    let mut screen = MapScreen::new(StdoutSink, ScreenConfig::from(config), authenticated);
    screen.load_facilities(source.facilities().await);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    run_session(&mut screen, stdin, shutdown_signal()).await
}

async fn print_markers(
    config: &AppConfig,
    zoom: u8,
    hide: &[FilterKey],
    search: Option<&str>,
) -> anyhow::Result<()> {
    let source = FacilitySource::from_config(config)?;
    let facilities = FacilitySet::new(source.facilities().await?);

    let mut filters = FilterSet::default();
    for key in hide {
        filters.set(*key, false);
    }
    let markers_config = MarkerConfig::from(config);
    let query = MarkerQuery {
        filters: &filters,
        keyword: search.unwrap_or_default(),
        selected: None,
        zoom: markers_config.clamp_zoom(f64::from(zoom)),
    };

    let markers = visible_markers(&facilities, &query, &markers_config);
    println!("{}", serde_json::to_string_pretty(&markers)?);
    Ok(())
}

async fn print_reviews(config: &AppConfig, facility_id: FacilityId) -> anyhow::Result<()> {
    let source = FacilitySource::from_config(config)?;
    let reviews = source.reviews(facility_id).await?;
    if reviews.is_empty() {
        println!("no reviews for facility {facility_id}");
        return Ok(());
    }
    for review in reviews {
        println!(
            "{} {}/5 {} ({} likes, {} replies)\n  {}",
            review.date.format("%Y-%m-%d"),
            review.rating,
            review.reviewer,
            review.like_count,
            review.reply_count,
            review.text,
        );
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
