use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use engine::{EngineConfig, MapEngine};
use formats::{MapData, decode_regions, encode_regions};
use foundation::bounds::PixelRect;
use foundation::math::{DVec2, LocalPoint, local_to_lat_lon};
use scene::{MapHit, MapWorld};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mapctl", version, about = "Inspect and query political map files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a packed region string into JSON polygons
    Decode {
        packed: String,
    },
    /// Pack JSON polygons (`[[[x, y], ...], ...]`) read from a file, or `-` for stdin
    Encode {
        input: PathBuf,
    },
    /// Summarize a map file
    Inspect {
        map: PathBuf,
        /// List every country
        #[arg(long)]
        countries: bool,
    },
    /// Hit-test a map-local point
    Hit {
        map: PathBuf,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
        /// Engine config JSON (hit-test options)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Include hit-test work counters
        #[arg(long)]
        stats: bool,
    },
    /// Great-circle distance between two cities, in km
    Distance {
        map: PathBuf,
        from: String,
        to: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let cli = Cli::parse();
    match cli.command {
        Command::Decode { packed } => cmd_decode(&packed),
        Command::Encode { input } => cmd_encode(input),
        Command::Inspect { map, countries } => cmd_inspect(map, countries),
        Command::Hit {
            map,
            x,
            y,
            config,
            stats,
        } => cmd_hit(map, LocalPoint::new(x, y), config, stats),
        Command::Distance { map, from, to } => cmd_distance(map, &from, &to),
    }
}

fn cmd_decode(packed: &str) -> Result<(), String> {
    let regions = decode_regions(packed).map_err(|e| format!("decode: {e}"))?;
    print_json(&regions)
}

fn cmd_encode(input: PathBuf) -> Result<(), String> {
    let payload = if input.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin()).map_err(|e| format!("read stdin: {e}"))?
    } else {
        fs::read_to_string(&input).map_err(|e| format!("read {input:?}: {e}"))?
    };
    println!("{}", pack_polygons_json(&payload)?);
    Ok(())
}

fn pack_polygons_json(payload: &str) -> Result<String, String> {
    let regions: Vec<Vec<DVec2>> =
        serde_json::from_str(payload).map_err(|e| format!("parse polygons: {e}"))?;
    if let Some(i) = regions.iter().position(|r| r.len() < 3) {
        return Err(format!("polygon {i} has fewer than 3 points"));
    }
    Ok(encode_regions(&regions))
}

#[derive(Serialize)]
struct MapSummary {
    countries: usize,
    hidden_countries: usize,
    provinces: usize,
    cities: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    country_list: Vec<CountrySummary>,
}

#[derive(Serialize)]
struct CountrySummary {
    index: usize,
    name: String,
    continent: String,
    regions: usize,
    provinces: usize,
    hidden: bool,
    center: [f64; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    capital: Option<String>,
}

fn cmd_inspect(map: PathBuf, list_countries: bool) -> Result<(), String> {
    let world = load_world(&map)?;
    print_json(&summarize(&world, list_countries))
}

fn summarize(world: &MapWorld, list_countries: bool) -> MapSummary {
    let country_list = if list_countries {
        world
            .countries()
            .iter()
            .map(|c| CountrySummary {
                index: c.index,
                name: c.name.clone(),
                continent: c.continent.clone(),
                regions: c.regions.len(),
                provinces: c.provinces.len(),
                hidden: c.hidden,
                center: [c.center.x(), c.center.y()],
                capital: c.capital.and_then(|i| world.city(i)).map(|city| city.name.clone()),
            })
            .collect()
    } else {
        Vec::new()
    };
    MapSummary {
        countries: world.countries().len(),
        hidden_countries: world.countries().iter().filter(|c| c.hidden).count(),
        provinces: world.provinces().len(),
        cities: world.cities().len(),
        country_list,
    }
}

#[derive(Serialize)]
struct HitReport {
    point: [f64; 2],
    lat: f64,
    lon: f64,
    country: Option<String>,
    country_region: Option<usize>,
    province: Option<String>,
    province_region: Option<usize>,
    city: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stats: Vec<(&'static str, u64)>,
}

fn cmd_hit(
    map: PathBuf,
    point: LocalPoint,
    config: Option<PathBuf>,
    stats: bool,
) -> Result<(), String> {
    let config = match config {
        Some(path) => EngineConfig::from_path(path).map_err(|e| e.to_string())?,
        None => EngineConfig::default(),
    };
    let mut engine = MapEngine::new(config, PixelRect::from_size(1.0, 1.0));
    engine
        .load_map_from_path(&map)
        .map_err(|e| format!("load {map:?}: {e}"))?;
    let hit = engine.hit_test(point);
    let mut report = hit_report(engine.world(), point, hit);
    if stats {
        report.stats = engine.metrics().counters();
    }
    print_json(&report)
}

fn hit_report(world: &MapWorld, point: LocalPoint, hit: MapHit) -> HitReport {
    let geo = local_to_lat_lon(point);
    HitReport {
        point: [point.x(), point.y()],
        lat: geo.lat_deg,
        lon: geo.lon_deg,
        country: hit
            .country
            .and_then(|c| world.country(c.entity))
            .map(|c| c.name.clone()),
        country_region: hit.country.map(|c| c.region),
        province: hit
            .province
            .and_then(|p| world.province(p.entity))
            .map(|p| p.name.clone()),
        province_region: hit.province.map(|p| p.region),
        city: hit.city.and_then(|i| world.city(i)).map(|c| c.name.clone()),
        stats: Vec::new(),
    }
}

fn cmd_distance(map: PathBuf, from: &str, to: &str) -> Result<(), String> {
    let mut engine = MapEngine::new(EngineConfig::default(), PixelRect::from_size(1.0, 1.0));
    engine
        .load_map_from_path(&map)
        .map_err(|e| format!("load {map:?}: {e}"))?;
    let km = engine
        .distance_between_cities(from, to)
        .map_err(|e| e.to_string())?;
    println!("{km:.1}");
    Ok(())
}

fn load_world(path: &Path) -> Result<MapWorld, String> {
    let data = MapData::load(path).map_err(|e| e.to_string())?;
    formats::load_world(&data).map_err(|e| format!("load {path:?}: {e}"))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let payload = serde_json::to_string_pretty(value).map_err(|e| format!("json: {e}"))?;
    println!("{payload}");
    Ok(())
}
