use std::fs;
use std::path::{Path, PathBuf};

use catalog::{Catalog, CategoryFilter, FilterState};
use clap::{Parser, Subcommand};
use foundation::math::GeoPoint;
use layers::{MarkerLayer, PointerEvent, SceneLayer};
use runtime::{DirectionsUrl, LocationDetail};
use scene::{TourConfig, ViewPreset};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "campus", about = "Inspect and query the campus location catalog")]
struct Cli {
    /// Catalog asset to load instead of the bundled campus dataset.
    #[arg(long, global = true, env = "CAMPUS_CATALOG")]
    catalog: Option<PathBuf>,

    /// Print JSON instead of plain text.
    #[arg(long, global = true)]
    json: bool,

    /// Log at debug level when RUST_LOG is unset.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load and validate the catalog.
    Validate,
    /// List visible locations after filtering.
    List {
        /// `all` or one of the categories.
        #[arg(long, default_value = "all")]
        category: CategoryFilter,
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Show the detail panel content of one location.
    Show { id: String },
    /// Great-circle distance between two locations.
    Distance { from: String, to: String },
    /// Directions link to a location.
    Directions {
        id: String,
        #[arg(long, requires = "from_lng", allow_negative_numbers = true)]
        from_lat: Option<f64>,
        #[arg(long, requires = "from_lat", allow_negative_numbers = true)]
        from_lng: Option<f64>,
    },
    /// Hit-test the 3D tour from a camera preset.
    Pick {
        #[arg(allow_negative_numbers = true)]
        ndc_x: f64,
        #[arg(allow_negative_numbers = true)]
        ndc_y: f64,
        #[arg(long, default_value = "home", value_parser = parse_view)]
        view: ViewPreset,
        #[arg(long, default_value_t = 16.0 / 9.0)]
        aspect: f64,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Err(e) = real_main(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn real_main(cli: Cli) -> Result<(), String> {
    let catalog = load_catalog(cli.catalog.as_deref())?;
    let out = Output { json: cli.json };

    match cli.command {
        Command::Validate => cmd_validate(&catalog, out),
        Command::List { category, search } => cmd_list(&catalog, category, &search, out),
        Command::Show { id } => cmd_show(&catalog, &id, out),
        Command::Distance { from, to } => cmd_distance(&catalog, &from, &to, out),
        Command::Directions {
            id,
            from_lat,
            from_lng,
        } => {
            let origin = from_lat.zip(from_lng).map(|(lat, lng)| GeoPoint::new(lat, lng));
            cmd_directions(&catalog, &id, origin, out)
        }
        Command::Pick {
            ndc_x,
            ndc_y,
            view,
            aspect,
        } => cmd_pick(&catalog, ndc_x, ndc_y, view, aspect, out),
    }
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog, String> {
    let Some(path) = path else {
        return Catalog::bundled().map_err(|e| format!("bundled catalog: {e}"));
    };
    let text = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    let catalog = Catalog::from_json_str(&text).map_err(|e| format!("{path:?}: {e}"))?;
    info!(path = %path.display(), entries = catalog.len(), "catalog loaded from file");
    Ok(catalog)
}

#[derive(Debug, Copy, Clone)]
struct Output {
    json: bool,
}

impl Output {
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<(), String> {
        if self.json {
            let s = serde_json::to_string_pretty(value).map_err(|e| format!("json: {e}"))?;
            println!("{s}");
        } else {
            println!("{}", text());
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct ValidateReport<'a> {
    version: &'a str,
    content_hash: &'a str,
    entries: usize,
}

fn cmd_validate(catalog: &Catalog, out: Output) -> Result<(), String> {
    let report = ValidateReport {
        version: catalog.version(),
        content_hash: catalog.content_hash(),
        entries: catalog.len(),
    };
    out.emit(&report, || {
        format!(
            "ok: {} locations (version {}, hash {})",
            report.entries, report.version, report.content_hash
        )
    })
}

#[derive(Serialize)]
struct ListRow<'a> {
    id: &'a str,
    category: &'static str,
    name: &'a str,
}

fn cmd_list(
    catalog: &Catalog,
    category: CategoryFilter,
    search: &str,
    out: Output,
) -> Result<(), String> {
    let rows: Vec<ListRow<'_>> = FilterState::new(category, search)
        .visible(catalog)
        .into_iter()
        .map(|p| ListRow {
            id: p.id().as_str(),
            category: p.category().as_str(),
            name: p.name(),
        })
        .collect();
    out.emit(&rows, || {
        rows.iter()
            .map(|r| format!("{}\t{}\t{}", r.id, r.category, r.name))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

fn cmd_show(catalog: &Catalog, id: &str, out: Output) -> Result<(), String> {
    let poi = catalog.lookup(id).map_err(|e| e.to_string())?;
    let detail = LocationDetail::of(poi);
    out.emit(&detail, || {
        let mut text = format!(
            "{} [{}] ({}, {})\n{}",
            detail.name, detail.category, detail.lat, detail.lng, detail.description
        );
        if !detail.facilities.is_empty() {
            text.push_str("\nÉquipements: ");
            text.push_str(&detail.facilities.join(", "));
        }
        for line in &detail.details {
            text.push('\n');
            text.push_str(line);
        }
        text
    })
}

#[derive(Serialize)]
struct DistanceReport<'a> {
    from: &'a str,
    to: &'a str,
    km: f64,
}

fn cmd_distance(catalog: &Catalog, from: &str, to: &str, out: Output) -> Result<(), String> {
    let a = catalog.lookup(from).map_err(|e| e.to_string())?;
    let b = catalog.lookup(to).map_err(|e| e.to_string())?;
    let report = DistanceReport {
        from,
        to,
        km: a.location().distance_km(&b.location()),
    };
    out.emit(&report, || {
        format!("{} -> {}: {:.3} km", a.name(), b.name(), report.km)
    })
}

fn cmd_directions(
    catalog: &Catalog,
    id: &str,
    origin: Option<GeoPoint>,
    out: Output,
) -> Result<(), String> {
    let poi = catalog.lookup(id).map_err(|e| e.to_string())?;
    let url = DirectionsUrl::new(origin, poi.location()).to_string();
    out.emit(&url, || url.clone())
}

#[derive(Serialize)]
struct PickReport {
    hit: Option<String>,
}

fn cmd_pick(
    catalog: &Catalog,
    ndc_x: f64,
    ndc_y: f64,
    view: ViewPreset,
    aspect: f64,
    out: Output,
) -> Result<(), String> {
    let mut tour = SceneLayer::new(1, TourConfig::default(), aspect);
    let all: Vec<_> = catalog.iter().collect();
    tour.reconcile(&all);
    tour.apply_preset(view);

    let hit = tour.hit_test(&PointerEvent::Viewport { ndc_x, ndc_y });
    let report = PickReport {
        hit: hit.map(|id| id.to_string()),
    };
    out.emit(&report, || match &report.hit {
        Some(id) => id.clone(),
        None => "no hit".to_string(),
    })
}

fn parse_view(s: &str) -> Result<ViewPreset, String> {
    match s {
        "home" => Ok(ViewPreset::Home),
        "top" => Ok(ViewPreset::Top),
        "ground" => Ok(ViewPreset::Ground),
        other => Err(format!("unknown view {other:?} (expected home, top or ground)")),
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, parse_view};
    use clap::Parser;
    use scene::ViewPreset;

    #[test]
    fn parses_views() {
        assert_eq!(parse_view("top"), Ok(ViewPreset::Top));
        assert!(parse_view("side").is_err());
    }

    #[test]
    fn pick_accepts_negative_ndc() {
        let cli = Cli::try_parse_from(["campus", "pick", "-0.5", "0.25", "--view", "ground"])
            .expect("parse");
        let Command::Pick {
            ndc_x, ndc_y, view, ..
        } = cli.command
        else {
            panic!("expected pick");
        };
        assert_eq!((ndc_x, ndc_y), (-0.5, 0.25));
        assert_eq!(view, ViewPreset::Ground);
    }

    #[test]
    fn list_parses_category_filter() {
        let cli = Cli::try_parse_from(["campus", "list", "--category", "faculty", "--json"])
            .expect("parse");
        assert!(cli.json);
        assert!(matches!(cli.command, Command::List { .. }));
        assert!(Cli::try_parse_from(["campus", "list", "--category", "cafeteria"]).is_err());
    }
}
