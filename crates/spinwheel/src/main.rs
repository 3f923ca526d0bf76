use anyhow::{Context, Result, bail};
use clap::Parser;
use relm4::prelude::*;
use spinwheel::config::{self, Config};
use spinwheel::gui::app::{AppInit, AppModel};
use spinwheel::gui::wheel::{DEFAULT_SIZE, Quality, Viewport, WheelRenderer};
use spinwheel::sys::runtime;
use std::path::{Path, PathBuf};
use wheelkit::store::PresetStore;

#[derive(Parser, Debug)]
#[command(version, about = "Weighted random spinner wheel")]
struct Args {
    /// Configuration file (defaults to the per-user config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the default configuration file and exit
    #[arg(long)]
    write_config: bool,

    /// Render the wheel to a PNG file instead of opening the window
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Preset to render with --snapshot (defaults to the autosaved entries)
    #[arg(long, requires = "snapshot")]
    preset: Option<String>,

    /// Wheel rotation in degrees for --snapshot
    #[arg(long, default_value_t = 0.0, requires = "snapshot", allow_negative_numbers = true)]
    angle: f64,

    /// Edge length in pixels for --snapshot
    #[arg(long, default_value_t = DEFAULT_SIZE, requires = "snapshot")]
    size: i32,
}

fn open_store(config: &Config) -> Result<PresetStore> {
    match &config.data_dir {
        Some(dir) => Ok(PresetStore::new(dir)),
        None => PresetStore::open_default().context("no data directory available"),
    }
}

fn snapshot(args: &Args, config: &Config, store: &PresetStore, out: &Path) -> Result<()> {
    let entries = match &args.preset {
        Some(name) => match store.load(name) {
            Some(preset) => preset.entries,
            None => bail!("configuration '{}' not found", name),
        },
        None => store.load_autosave(),
    };

    let viewport = Viewport::new(args.size, args.size);
    let mut renderer = WheelRenderer::new(viewport, config.wheel.font_family.clone());
    renderer.rebuild(&entries, viewport)?;
    let surface = renderer.compose(args.angle, Quality::High)?;

    let mut file = fs_err::File::create(out)?;
    surface
        .write_to_png(&mut file)
        .with_context(|| format!("writing {}", out.display()))?;
    log::info!("Wrote {}", out.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.write_config {
        let path = config::write_default_config(args.config.as_deref())?;
        println!("{}", path.display());
        return Ok(());
    }

    let config = config::load_or_default(args.config.as_deref());
    let store = open_store(&config)?;
    log::info!("Using data directory {}", store.root().display());

    if let Some(out) = &args.snapshot {
        return snapshot(&args, &config, &store, out);
    }

    let (tx, rx) = async_channel::bounded(32);

    // Start Background Services
    runtime::start_background_services(tx, store.presets_dir());

    let app = RelmApp::new("org.spinwheel.Spinwheel").with_args(Vec::new());
    app.run::<AppModel>(AppInit {
        config,
        store,
        events: rx,
    });
    Ok(())
}
