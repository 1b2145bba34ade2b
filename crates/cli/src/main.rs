use spellgrid_core::{
    BoardReport, BoundingBoxIndex, CardCatalog, ClusterLayout, DeckRegions, EventBus, GroupId,
    HierarchicalGridLayout, LayoutConfig, LayoutEvent, PlacementStore, Point, RngState,
};
use spellgrid_data::{load_assets, load_deck, load_layout, save_layout, Assets};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_ASSETS: &str = "assets";
const DEFAULT_OUT: &str = "placements.json";
const DEFAULT_SEED: u64 = 0x5eed;

const USAGE: &str = "usage: spellgrid [--assets <dir>] [--mode grid|cluster] [--deck <file>]... \
[--layout <file>] [--out <file>] [--seed <n>]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CatalogMode {
    Grid,
    Cluster,
}

#[derive(Debug, Clone, PartialEq)]
struct CliOptions {
    assets: PathBuf,
    mode: CatalogMode,
    /// Explicit deck files; when empty the assets' `decks/` directory is used.
    decks: Vec<PathBuf>,
    layout: Option<PathBuf>,
    out: PathBuf,
    seed: u64,
}

fn parse_cli_options(args: &[String]) -> Result<CliOptions, String> {
    let mut assets = std::env::var("SPELLGRID_ASSETS")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_ASSETS));
    let mut mode = CatalogMode::Grid;
    let mut decks = Vec::new();
    let mut layout = None;
    let mut out = PathBuf::from(DEFAULT_OUT);
    let mut seed = DEFAULT_SEED;
    let mut idx = 0usize;
    while idx < args.len() {
        let flag = args[idx].as_str();
        if flag == "--help" || flag == "-h" {
            return Err(USAGE.to_string());
        }
        let value = args
            .get(idx + 1)
            .ok_or_else(|| format!("{flag} needs a value\n{USAGE}"))?;
        match flag {
            "--assets" => assets = PathBuf::from(value),
            "--mode" => {
                mode = match value.as_str() {
                    "grid" => CatalogMode::Grid,
                    "cluster" => CatalogMode::Cluster,
                    other => return Err(format!("unknown mode {other:?}\n{USAGE}")),
                }
            }
            "--deck" => decks.push(PathBuf::from(value)),
            "--layout" => layout = Some(PathBuf::from(value)),
            "--out" => out = PathBuf::from(value),
            "--seed" => {
                seed = value
                    .parse::<u64>()
                    .map_err(|_| format!("invalid seed {value:?}"))?
            }
            other => return Err(format!("unknown argument {other:?}\n{USAGE}")),
        }
        idx += 2;
    }
    Ok(CliOptions {
        assets,
        mode,
        decks,
        layout,
        out,
        seed,
    })
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("SPELLGRID_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_cli_options(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(2);
        }
    };
    init_tracing();
    if let Err(err) = run(&options) {
        eprintln!("spellgrid error: {err:#}");
        std::process::exit(1);
    }
}

fn run(options: &CliOptions) -> anyhow::Result<()> {
    let mut assets = load_assets(&options.assets)?;
    if !options.decks.is_empty() {
        assets.decks = options
            .decks
            .iter()
            .map(|path| load_deck(path))
            .collect::<anyhow::Result<_>>()?;
    }
    let catalog = &assets.cards.catalog;

    let mut store = match &options.layout {
        Some(path) => load_layout(path, catalog)?,
        None => PlacementStore::new(),
    };
    let mut events = EventBus::default();
    let reports = arrange(&assets, options.mode, options.seed, &mut store, &mut events);

    print_summary(&store, catalog, &assets.config, &reports, &events);
    save_layout(&options.out, &store)?;
    println!("layout written to {}", options.out.display());
    Ok(())
}

/// Lays out the catalog and every deck. Placements already in `store` keep
/// their positions; only cards it lacks are placed.
fn arrange(
    assets: &Assets,
    mode: CatalogMode,
    seed: u64,
    store: &mut PlacementStore,
    events: &mut EventBus,
) -> Vec<BoardReport> {
    let catalog = &assets.cards.catalog;
    let config = assets.config;
    let mut fresh = PlacementStore::new();

    let names = catalog.sorted_names();
    match mode {
        CatalogMode::Grid => {
            HierarchicalGridLayout::new(config).layout(
                catalog,
                &names,
                &GroupId::Catalog,
                Point::ZERO,
                &mut fresh,
                events,
            );
        }
        CatalogMode::Cluster => {
            let mut rng = RngState::from_seed(seed);
            let report = ClusterLayout::new(config).layout(
                catalog,
                &names,
                &GroupId::Catalog,
                Point::ZERO,
                &mut fresh,
                &mut rng,
                events,
            );
            info!(
                seed,
                iterations = report.separation.iterations,
                "cluster layout done"
            );
        }
    }

    let mut reports = Vec::new();
    for (index, deck) in assets.decks.iter().enumerate() {
        let origin = DeckRegions::next_deck_origin(&config, index);
        let regions = DeckRegions::at(deck.id.as_str(), origin, &config);
        reports.extend(regions.place_deck(deck, catalog, &config, &mut fresh, events));
    }

    let seeded = store.len();
    let added = store.fill_unplaced(&fresh);
    info!(seeded, added, "placements merged");
    reports
}

fn print_summary(
    store: &PlacementStore,
    catalog: &CardCatalog,
    config: &LayoutConfig,
    reports: &[BoardReport],
    events: &EventBus,
) {
    let index = BoundingBoxIndex::new(*config);
    println!("placements: {}", store.len());
    for group in store.groups() {
        let count = store.group_len(group);
        match index.compute(store, catalog, group, config.bounds_padding) {
            Some(rect) => println!(
                "  {group}: {count} cards, bounds ({:.1}, {:.1}) - ({:.1}, {:.1})",
                rect.min_x, rect.min_y, rect.max_x, rect.max_y
            ),
            None => println!("  {group}: {count} cards"),
        }
    }
    for report in reports.iter().filter(|report| report.overflow) {
        println!(
            "  overflow: {} uses {:.1}px of height",
            report.group, report.used_height
        );
    }
    let warnings: Vec<&LayoutEvent> = events.events().iter().filter(|e| e.is_warning()).collect();
    if !warnings.is_empty() {
        warn!(count = warnings.len(), "layout finished with warnings");
        for event in warnings {
            println!("  warning: {event:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spellgrid_core::{BoardKind, PlacementRef};
    use std::fs;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn flags_are_parsed() {
        let options = parse_cli_options(&args(&[
            "--assets", "data", "--mode", "cluster", "--deck", "a.json", "--deck", "b.json",
            "--out", "o.json", "--seed", "42",
        ]))
        .expect("options");
        assert_eq!(options.assets, PathBuf::from("data"));
        assert_eq!(options.mode, CatalogMode::Cluster);
        assert_eq!(
            options.decks,
            vec![PathBuf::from("a.json"), PathBuf::from("b.json")]
        );
        assert_eq!(options.out, PathBuf::from("o.json"));
        assert_eq!(options.seed, 42);
        assert!(options.layout.is_none());
    }

    #[test]
    fn bad_arguments_are_rejected() {
        assert!(parse_cli_options(&args(&["--mode", "spiral"])).is_err());
        assert!(parse_cli_options(&args(&["--seed", "many"])).is_err());
        assert!(parse_cli_options(&args(&["--deck"])).is_err());
        assert!(parse_cli_options(&args(&["--verbose", "1"])).is_err());
    }

    fn assets() -> Assets {
        let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("assets");
        load_assets(&root).expect("assets")
    }

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("spellgrid-cli-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("scratch dir");
        dir.join(name)
    }

    #[test]
    fn saved_positions_survive_a_second_run() {
        let assets = assets();
        let mut store = PlacementStore::new();
        arrange(&assets, CatalogMode::Grid, DEFAULT_SEED, &mut store, &mut EventBus::default());
        let main = GroupId::board("earth_ramp", BoardKind::Mainboard);
        assert_eq!(store.slots("Amazon Warriors", &main).map(<[Point]>::len), Some(4));

        let on_board = PlacementRef::new("Amazon Warriors", main, 0);
        let in_catalog = PlacementRef::new("Amazon Warriors", GroupId::Catalog, 0);
        store.set_position(&on_board, Point::new(9000.0, 9000.0)).expect("move");
        store.set_position(&in_catalog, Point::new(-550.0, -550.0)).expect("move");
        let total = store.len();
        let path = scratch("second_run.json");
        save_layout(&path, &store).expect("save");

        let mut reloaded = load_layout(&path, &assets.cards.catalog).expect("load");
        arrange(&assets, CatalogMode::Grid, DEFAULT_SEED, &mut reloaded, &mut EventBus::default());
        assert_eq!(reloaded.position(&on_board), Some(Point::new(9000.0, 9000.0)));
        assert_eq!(reloaded.position(&in_catalog), Some(Point::new(-550.0, -550.0)));
        assert_eq!(reloaded.len(), total);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn cards_missing_from_the_seed_are_placed() {
        let assets = assets();
        let mut full = PlacementStore::new();
        arrange(&assets, CatalogMode::Grid, DEFAULT_SEED, &mut full, &mut EventBus::default());

        let mut partial = PlacementStore::new();
        partial.add_placement("Amazon Warriors", &GroupId::Catalog, Point::new(-550.0, -550.0));
        arrange(&assets, CatalogMode::Grid, DEFAULT_SEED, &mut partial, &mut EventBus::default());
        assert_eq!(partial.len(), full.len());
        assert_eq!(
            partial.slots("Amazon Warriors", &GroupId::Catalog),
            Some(&[Point::new(-550.0, -550.0)][..])
        );
        let avatar = GroupId::board("earth_ramp", BoardKind::Avatar);
        assert_eq!(partial.slots("Geomancer", &avatar), full.slots("Geomancer", &avatar));
    }
}
