use anyhow::{Result, bail};
use api::run_api;
use clap::{Parser, Subcommand, ValueEnum};
use district::{
    AnalysisMonth, AnalyticsClient, AnalyticsRequest, CITY_WIDE_ID, DEFAULT_API_URL, DrtModel,
    Scope,
};
use extract::{extract, write_feature_collection};
use log::info;
use std::path::{Path, PathBuf};
use std::thread;
use util::{BoundaryConfig, GeometryPolicy, load_config};

fn default_thread_count() -> usize {
    thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1)
}

#[derive(Parser)]
#[command(version, about, long_about)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Group sub-region polygons into one MultiPolygon feature per district
    Extract {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(short, long)]
        config_path: Option<PathBuf>,

        /// Overrides the configured target region
        #[arg(short, long)]
        region: Option<String>,

        /// Abort on the first feature with unusable geometry or no district code
        #[arg(long)]
        strict: bool,

        /// Union each district's polygons into its outer boundary
        #[arg(long)]
        dissolve: bool,
    },
    /// Print the identifier for each district display name
    Resolve {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Serve extracted district boundaries over HTTP
    Serve {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        config_path: Option<PathBuf>,

        #[arg(short, long, default_value_t = 8090)]
        port: u16,

        #[arg(short, long, default_value_t = default_thread_count())]
        threads: usize,
    },
    /// Fetch district analytics from the backend
    Query {
        /// District display name or identifier, `seoul` for the whole city
        district: String,

        #[arg(short, long, value_enum, default_value_t = QueryKind::Traffic)]
        kind: QueryKind,

        #[arg(short, long)]
        month: Option<String>,

        #[arg(long, default_value = "commuter")]
        model: DrtModel,

        #[arg(long, env = "DRT_API_URL", default_value = DEFAULT_API_URL)]
        api_url: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum QueryKind {
    Traffic,
    Heatmap,
    DrtScore,
}

#[ntex::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Args::parse();

    match cli.command {
        Commands::Extract {
            input,
            output,
            config_path,
            region,
            strict,
            dissolve,
        } => {
            let mut config = boundary_config(config_path.as_deref())?;
            if let Some(region) = region {
                config.target_region = region;
            }
            if strict {
                config.geometry_policy = GeometryPolicy::Strict;
            }
            config.dissolve |= dissolve;

            let extraction = extract(&input, &config)?;
            let report = &extraction.report;
            info!(
                "{} districts with {} ring-groups, {} features outside {}, {} skipped",
                report.district_count(),
                report.ring_group_total(),
                report.outside_region,
                config.target_region,
                report.skipped.len()
            );

            write_feature_collection(&output, &extraction.collection)?;
            info!("wrote {}", output.display());
        }
        Commands::Resolve { names } => {
            for name in names {
                println!("{name}\t{}", district::resolve(&name));
            }
        }
        Commands::Serve {
            input,
            config_path,
            port,
            threads,
        } => {
            let config = boundary_config(config_path.as_deref())?;
            run_api(&input, &config.properties, port, threads).await?;
        }
        Commands::Query {
            district,
            kind,
            month,
            model,
            api_url,
        } => {
            let client = AnalyticsClient::new(&api_url)?;
            let request = analytics_request(&district, kind, month.as_deref(), model)?;
            let response: serde_json::Value = client.fetch(&request).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }
    Ok(())
}

fn boundary_config(config_path: Option<&Path>) -> Result<BoundaryConfig> {
    match config_path {
        Some(path) => Ok(load_config(path)?),
        None => Ok(BoundaryConfig::default()),
    }
}

fn analytics_request(
    target: &str,
    kind: QueryKind,
    month: Option<&str>,
    model: DrtModel,
) -> Result<AnalyticsRequest> {
    let id = if target == CITY_WIDE_ID || district::display_name(target).is_some() {
        target.to_string()
    } else {
        district::resolve(target).into_owned()
    };
    let month = month.map(AnalysisMonth::new).unwrap_or_default();
    let scope = Scope::from_identifier(&id);
    let district_name = district::display_name(&id).unwrap_or(target).to_string();

    let request = match (kind, scope) {
        (QueryKind::Traffic, scope) => AnalyticsRequest::HourlyTraffic { scope, month },
        (QueryKind::Heatmap, Scope::City) => AnalyticsRequest::CityHeatmap {
            month,
            include_station_details: true,
            min_traffic_threshold: None,
        },
        (QueryKind::Heatmap, Scope::District(_)) => AnalyticsRequest::DistrictHeatmap {
            district_name,
            month,
            min_traffic_threshold: None,
        },
        (QueryKind::DrtScore, Scope::City) => {
            bail!("DRT scores are only available per district")
        }
        (QueryKind::DrtScore, Scope::District(_)) => AnalyticsRequest::DistrictDrtScore {
            district_name,
            model,
            month,
        },
    };

    info!("querying {} for {}", request.path_segments().join("/"), id);
    Ok(request)
}
