//! PocketPal CLI - Play sprites, change the shared selection, inspect the widget.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use pocketpal::{
    animation::{Clock, SystemClock},
    catalog::Catalog,
    host::{App, Render},
    schema::AppConfig,
    storage::{DirAssets, FileSelectionStore, SelectionStore},
    widget::{TimelineProvider, WidgetCenter, render_entry},
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let program = program_name(&args);
    let (config_path, rest) = split_config_flag(args.get(1..).unwrap_or_default());

    let Some(command) = rest.first() else {
        print_usage(program);
        std::process::exit(1);
    };

    if command == "--example" {
        print_example_config();
        return;
    }

    let config = match config_path {
        Some(path) => AppConfig::load(&path).unwrap_or_else(|e| {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }),
        None => AppConfig::default(),
    };

    match command.as_str() {
        "play" => cmd_play(&config, &rest[1..]),
        "select" => cmd_select(&config, &rest[1..]),
        "widget" => cmd_widget(&config),
        "list" => cmd_list(&config, &rest[1..]),
        other => {
            eprintln!("Unknown command: {}", other);
            eprintln!();
            print_usage(program);
            std::process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [--config <config.json>] <command>", program);
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  play [id] [seconds]  Play a sprite (default: stored selection, 3s)");
    eprintln!("  select <id>          Store a new selection and reload the widget");
    eprintln!("  widget               Print the widget timeline");
    eprintln!("  list [query]         List or search the catalog");
    eprintln!("  --example            Print the default configuration");
}

/// argv[0], or the package name when the OS passed no arguments at all.
fn program_name(args: &[String]) -> &str {
    args.first().map_or("pocketpal", String::as_str)
}

/// Pull `--config <path>` out of the argument list.
fn split_config_flag(args: &[String]) -> (Option<PathBuf>, Vec<String>) {
    let mut config = None;
    let mut rest = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            config = iter.next().map(PathBuf::from);
        } else {
            rest.push(arg.clone());
        }
    }
    (config, rest)
}

struct Runtime {
    app: App,
    widgets: Arc<WidgetCenter>,
    clock: Arc<SystemClock>,
}

fn build_runtime(config: &AppConfig) -> Runtime {
    let store: Arc<dyn SelectionStore> = Arc::new(
        FileSelectionStore::open(
            &config.storage.dir,
            &config.storage.namespace,
            config.storage.default_id,
        )
        .unwrap_or_else(|e| {
            eprintln!("Error opening selection store: {}", e);
            std::process::exit(1);
        }),
    );

    let widgets = Arc::new(WidgetCenter::new(TimelineProvider::new(
        Arc::clone(&store),
        config,
    )));
    let clock = Arc::new(SystemClock::new());
    let catalog = Catalog::load(&config.catalog_path, config.ids);

    let app = App::new(
        config,
        catalog,
        Box::new(DirAssets::new(&config.assets_dir)),
        store,
        widgets.clone(),
        clock.clone(),
    );

    Runtime {
        app,
        widgets,
        clock,
    }
}

fn cmd_play(config: &AppConfig, args: &[String]) {
    let Runtime { mut app, clock, .. } = build_runtime(config);

    if let Some(input) = args.first() {
        if let Err(e) = app.commit_input(input) {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
    let seconds = args
        .get(1)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|s| s.is_finite() && *s >= 0.0)
        .unwrap_or(3.0);

    let id = app.selected().unwrap_or(config.storage.default_id);
    let name = app
        .selected_entity()
        .map_or_else(|| "unknown".to_string(), |e| e.name.clone());

    println!("PocketPal");
    println!("=========");
    println!("Selection: {:03} ({})", id, name);

    let Some(player) = app.view().player().filter(|p| p.has_content()) else {
        if let Render::Fallback { message } = app.render() {
            println!("{}", message);
        }
        return;
    };

    let frames = player.frames();
    let (width, height) = frames.dimensions();
    println!(
        "Sprite: {}x{}, {} frames ({} in container), {:.2}s per loop",
        width,
        height,
        frames.len(),
        frames.source_frames(),
        frames.total_duration().as_secs_f64()
    );
    println!();

    let end = clock.now() + Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX / 2);
    print_render(&app, clock.now());

    loop {
        let view = app.view_mut();
        match view.next_deadline() {
            Some(deadline) if deadline <= end => {
                clock.sleep_until(deadline);
                if view.poll().is_some() {
                    print_render(&app, clock.now());
                }
            }
            _ => break,
        }
    }

    println!();
    println!("Published {} frames", app.view().publications());
}

fn print_render(app: &App, at: Duration) {
    if let Render::Sprite {
        frame_index,
        placement,
        ..
    } = app.render()
    {
        println!(
            "  t={:>7.3}s  frame {:>3}  at ({:.0}, {:.0}) {:.0}x{:.0}",
            at.as_secs_f64(),
            frame_index,
            placement.x,
            placement.y,
            placement.width,
            placement.height
        );
    }
}

fn cmd_select(config: &AppConfig, args: &[String]) {
    let Some(input) = args.first() else {
        eprintln!("Usage: select <id>");
        std::process::exit(1);
    };

    let Runtime {
        mut app, widgets, ..
    } = build_runtime(config);

    match app.commit_input(input) {
        Ok(id) => {
            let name = app
                .selected_entity()
                .map_or_else(|| "unknown".to_string(), |e| e.name.clone());
            println!("Selected {:03} ({})", id, name);
            println!("Widget reloads: {}", widgets.reload_count());
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn cmd_widget(config: &AppConfig) {
    let Runtime { widgets, .. } = build_runtime(config);

    let timeline = widgets.timeline(SystemTime::now());
    println!("Widget: {}", widgets.kind());
    for entry in &timeline.entries {
        println!("  {}", render_entry(entry).join(" "));
    }
}

fn cmd_list(config: &AppConfig, args: &[String]) {
    let Runtime { app, .. } = build_runtime(config);

    let query = args.join(" ");
    let matches = app.search(&query);
    if matches.is_empty() {
        println!("No matches for {:?}", query);
        return;
    }

    for entity in matches {
        let types: Vec<String> = entity
            .types
            .iter()
            .map(|t| format!("{} {}", t, app.styles().style_for(t).hex()))
            .collect();
        println!("{:03}  {:<12}  {}", entity.id, entity.name, types.join(", "));
    }
}

fn print_example_config() {
    let config = AppConfig::default();

    println!("Example configuration (config.json):");
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|e| e.to_string())
    );
}
