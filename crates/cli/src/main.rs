//! COP-STAC CLI - STAC export with COP metadata and DGGS elevation queries

mod manifest;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use copstac_catalog::{CopMetadata, EmptyFieldPolicy, ExportOptions, StacCopExporter};
use copstac_core::{Extent, CRS};
use copstac_dggs::{
    available_dggs_crs, CoverageSummary, DggsClientBlocking, DggsClientOptions, DEFAULT_BASE_URL,
    DEFAULT_DGGS_CRS,
};

use crate::manifest::Manifest;

/// Collection id used by `--write-collection` when none is given.
const DEFAULT_COLLECTION_ID: &str = "cop-stac-export";

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "copstac")]
#[command(author, version, about = "STAC catalogs with COP metadata and DGGS elevation queries", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export layers as a STAC catalog with COP metadata
    Export(ExportArgs),
    /// Query DGGS-indexed elevation data
    Dggs {
        #[command(subcommand)]
        command: DggsCommands,
    },
}

// ─── Export ─────────────────────────────────────────────────────────────

#[derive(Args)]
struct ExportArgs {
    /// Layer manifest (JSON)
    #[arg(short, long)]
    layers: PathBuf,
    /// Output directory; the catalog goes to <output>/stac_cop_export
    #[arg(short, long)]
    output: PathBuf,
    /// COP metadata file (JSON); flags below override its fields
    #[arg(short, long)]
    metadata: Option<PathBuf>,
    /// Mission name
    #[arg(long)]
    mission: Option<String>,
    /// public-release, internal, confidential, restricted, classified
    #[arg(long)]
    classification: Option<String>,
    /// Releasability marking (default 1:N)
    #[arg(long)]
    releasability: Option<String>,
    /// DGGS reference system recorded in items
    #[arg(long)]
    dggs_crs: Option<String>,
    /// DGGS zone id recorded in items
    #[arg(long)]
    dggs_zone_id: Option<String>,
    /// Service provider recorded in items
    #[arg(long)]
    service_provider: Option<String>,
    /// Package the catalog as a ZIP with a SHA-256 sidecar
    #[arg(long)]
    zip: bool,
    /// Also write collection.json
    #[arg(long)]
    write_collection: bool,
    /// Collection id set on every item
    #[arg(long)]
    collection_id: Option<String>,
    /// Fail when the mission is empty instead of writing ""
    #[arg(long)]
    reject_empty: bool,
}

impl ExportArgs {
    fn metadata(&self) -> Result<CopMetadata> {
        let mut metadata = match &self.metadata {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read metadata {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("Invalid metadata {}", path.display()))?
            }
            None => CopMetadata::default(),
        };

        if let Some(mission) = &self.mission {
            metadata.mission = mission.clone();
        }
        if let Some(classification) = &self.classification {
            metadata.classification = classification.parse()?;
        }
        if let Some(releasability) = &self.releasability {
            metadata.releasability = releasability.clone();
        }
        if let Some(dggs_crs) = &self.dggs_crs {
            metadata.dggs_crs = dggs_crs.clone();
        }
        if self.dggs_zone_id.is_some() {
            metadata.dggs_zone_id = self.dggs_zone_id.clone();
        }
        if self.service_provider.is_some() {
            metadata.service_provider = self.service_provider.clone();
        }
        Ok(metadata)
    }

    fn options(&self) -> ExportOptions {
        let collection_id = match (&self.collection_id, self.write_collection) {
            (Some(id), _) => Some(id.clone()),
            (None, true) => Some(DEFAULT_COLLECTION_ID.to_string()),
            (None, false) => None,
        };
        ExportOptions {
            empty_fields: if self.reject_empty {
                EmptyFieldPolicy::RejectEmpty
            } else {
                EmptyFieldPolicy::PassThrough
            },
            collection_id,
        }
    }
}

fn run_export(args: ExportArgs) -> Result<()> {
    let start = Instant::now();
    let metadata = args.metadata()?;
    let options = args.options();

    let manifest = Manifest::load(&args.layers)?;
    let base_dir = args.layers.parent().unwrap_or(Path::new("."));
    let pb = spinner("Opening layers...");
    let (layers, skipped) = manifest.open_layers(base_dir);
    pb.finish_and_clear();
    if layers.is_empty() {
        bail!("No layer in {} could be opened", args.layers.display());
    }
    info!("Exporting {} layers", layers.len());

    let mut exporter = StacCopExporter::new(&args.output, options.clone())
        .context("Failed to create export directory")?;
    let pb = spinner("Exporting layers...");
    let report = exporter.export_layers(&layers, &metadata);
    pb.finish_and_clear();
    let report = report.context("Export failed")?;

    if args.write_collection {
        let id = options.collection_id.as_deref().unwrap_or(DEFAULT_COLLECTION_ID);
        let title = if metadata.mission.is_empty() {
            id
        } else {
            metadata.mission.as_str()
        };
        let description = format!("COP layers exported for {}", title);
        exporter
            .write_collection(id, title, &description, &metadata)
            .context("Failed to write collection")?;
    }

    println!(
        "Exported {} of {} layers to: {}",
        report.items.len(),
        manifest.layers.len(),
        exporter.stac_dir().display()
    );
    for name in &skipped {
        println!("  Skipped {}: could not be opened", name);
    }
    for failure in &report.failures {
        println!("  Skipped {}: {}", failure.layer, failure.message);
    }

    if args.zip {
        let pb = spinner("Creating archive...");
        let archive = exporter.create_zip_archive();
        pb.finish_and_clear();
        let archive = archive.context("Failed to create archive")?;
        println!("Archive: {}", archive.zip_path.display());
        println!("  SHA-256: {}", archive.sha256);
    }
    println!("  Processing time: {:.2?}", start.elapsed());
    Ok(())
}

// ─── DGGS ───────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum DggsCommands {
    /// Zone/feature counts and elevation range over a bounding box
    Summary {
        #[command(flatten)]
        query: QueryArgs,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Zone ids covering a bounding box
    Zones {
        #[command(flatten)]
        query: QueryArgs,
        /// List zones at this level from the zone listing instead of the
        /// data query
        #[arg(long)]
        level: Option<u32>,
    },
    /// Save the elevation features of a bounding box as GeoJSON
    Fetch {
        #[command(flatten)]
        query: QueryArgs,
        /// Output GeoJSON file
        output: PathBuf,
    },
    /// List the supported DGGS reference systems
    CrsList,
}

#[derive(Args)]
struct QueryArgs {
    /// Bounding box: xmin,ymin,xmax,ymax
    #[arg(long, allow_hyphen_values = true)]
    bbox: String,
    /// CRS of the bounding box (default EPSG:4326)
    #[arg(long)]
    crs: Option<String>,
    /// DGGS reference system
    #[arg(long, default_value = DEFAULT_DGGS_CRS)]
    dggs_crs: String,
    /// Restrict the query to one zone
    #[arg(long)]
    zone_id: Option<String>,
    /// OGC API root
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,
}

impl QueryArgs {
    fn client(&self) -> Result<DggsClientBlocking> {
        DggsClientBlocking::new(DggsClientOptions {
            base_url: self.base_url.clone(),
            ..Default::default()
        })
        .context("Failed to create DGGS client")
    }

    /// Bounding box in WGS84.
    fn extent(&self, client: &DggsClientBlocking) -> Result<Extent> {
        let extent = Extent::parse(&self.bbox)?.validated()?;
        match &self.crs {
            Some(crs) => {
                let crs: CRS = crs.parse()?;
                let geographic = client
                    .transform_extent_to_wgs84(&extent, &crs)
                    .with_context(|| format!("Cannot query in {}", crs))?;
                info!(
                    "Bounding box in WGS84: {:.6},{:.6},{:.6},{:.6}",
                    geographic.min_x, geographic.min_y, geographic.max_x, geographic.max_y
                );
                Ok(geographic)
            }
            None => Ok(extent),
        }
    }
}

fn print_summary(summary: &CoverageSummary) {
    if !summary.success {
        println!("Query failed: {}", summary.error.as_deref().unwrap_or("unknown error"));
        return;
    }
    println!("DGGS CRS: {}", summary.dggs_crs);
    println!(
        "Extent: ({:.6}, {:.6}) - ({:.6}, {:.6})",
        summary.extent.min_x, summary.extent.min_y, summary.extent.max_x, summary.extent.max_y
    );
    println!("Features: {}", summary.feature_count);
    println!("Zones: {}", summary.zone_count);
    match &summary.elevation_stats {
        Some(stats) => {
            println!("\nElevation:");
            println!("  Min: {:.2}", stats.min);
            println!("  Max: {:.2}", stats.max);
            println!("  Samples: {}", stats.count);
        }
        None => println!("No elevation values in response"),
    }
}

fn run_dggs(command: DggsCommands) -> Result<()> {
    match command {
        DggsCommands::CrsList => {
            for crs in available_dggs_crs() {
                println!("{}", crs);
            }
        }
        DggsCommands::Summary { query, json } => {
            let mut client = query.client()?;
            let extent = query.extent(&client)?;
            let pb = spinner("Querying DGGS service...");
            let summary = client.get_coverage_summary(&extent, &query.dggs_crs);
            pb.finish_and_clear();
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
            if !summary.success {
                bail!("DGGS query failed");
            }
        }
        DggsCommands::Zones { query, level } => {
            let mut client = query.client()?;
            let extent = query.extent(&client)?;
            let pb = spinner("Querying DGGS service...");
            let zones = match level {
                Some(level) => client.list_zones(&extent, &query.dggs_crs, level),
                None => Ok(client.get_dggs_zones_for_extent(&extent, &query.dggs_crs)),
            };
            pb.finish_and_clear();
            let zones = zones.context("Zone listing failed")?;
            if let Some(err) = client.last_error() {
                bail!("DGGS query failed: {}", err);
            }
            for zone in &zones {
                println!("{}", zone);
            }
            info!("{} zones", zones.len());
        }
        DggsCommands::Fetch { query, output } => {
            let start = Instant::now();
            let mut client = query.client()?;
            let extent = query.extent(&client)?;
            let pb = spinner("Fetching DGGS data...");
            let saved = client.fetch_and_save_geojson(
                &extent,
                &output,
                &query.dggs_crs,
                query.zone_id.as_deref(),
            );
            pb.finish_and_clear();
            if !saved {
                bail!(
                    "DGGS fetch failed: {}",
                    client.last_error().unwrap_or("unknown error")
                );
            }
            done("DGGS data", &output, start.elapsed());
        }
    }
    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Export(args) => run_export(args),
        Commands::Dggs { command } => run_dggs(command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use copstac_catalog::Classification;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn negative_bbox_parses() {
        let cli = Cli::try_parse_from([
            "copstac", "dggs", "summary", "--bbox", "-122.5,37.7,-122.3,37.9",
        ])
        .unwrap();
        match cli.command {
            Commands::Dggs {
                command: DggsCommands::Summary { query, json },
            } => {
                assert_eq!(query.bbox, "-122.5,37.7,-122.3,37.9");
                assert_eq!(query.dggs_crs, DEFAULT_DGGS_CRS);
                assert_eq!(query.base_url, DEFAULT_BASE_URL);
                assert!(!json);
            }
            _ => panic!("expected dggs summary"),
        }
    }

    #[test]
    fn flags_override_metadata_file() {
        let tmp = tempfile::tempdir().unwrap();
        let meta = tmp.path().join("meta.json");
        std::fs::write(
            &meta,
            r#"{"mission": "Flood", "classification": "internal", "service_provider": "EMS"}"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "copstac",
            "export",
            "--layers",
            "layers.json",
            "--output",
            "out",
            "--metadata",
            meta.to_str().unwrap(),
            "--classification",
            "Confidential",
            "--write-collection",
            "--reject-empty",
        ])
        .unwrap();
        let Commands::Export(args) = cli.command else {
            panic!("expected export");
        };

        let metadata = args.metadata().unwrap();
        assert_eq!(metadata.mission, "Flood");
        assert_eq!(metadata.classification, Classification::Confidential);
        assert_eq!(metadata.service_provider.as_deref(), Some("EMS"));
        assert_eq!(metadata.releasability, "1:N");

        let options = args.options();
        assert_eq!(options.empty_fields, EmptyFieldPolicy::RejectEmpty);
        assert_eq!(options.collection_id.as_deref(), Some(DEFAULT_COLLECTION_ID));
    }

    #[test]
    fn unknown_classification_is_rejected() {
        let cli = Cli::try_parse_from([
            "copstac", "export", "--layers", "l.json", "--output", "o", "--classification", "secret",
        ])
        .unwrap();
        let Commands::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert!(args.metadata().is_err());
    }
}
