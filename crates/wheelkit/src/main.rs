use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wheelkit::select;
use wheelkit::store::PresetStore;

#[derive(Parser, Debug)]
#[command(name = "wheelkit", version, about = "Manage saved wheel configurations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Data directory to use instead of the per-user default
    #[arg(short = 'd', long, global = true)]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// List saved configurations
    List,
    /// Print the entries of a configuration
    Show { name: String },
    /// Pick a weighted random entry from a configuration
    Pick { name: String },
    /// Rename a configuration
    Rename { old: String, new: String },
    /// Delete a configuration
    Delete { name: String },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let store = match cli.dir {
        Some(dir) => PresetStore::new(dir),
        None => PresetStore::open_default()?,
    };

    match cli.command {
        Commands::List => {
            for name in store.list() {
                println!("{}", name);
            }
        }
        Commands::Show { name } => {
            let preset = load(&store, &name)?;
            let total = select::total_weight(&preset.entries);
            for entry in &preset.entries {
                let share = if total > 0.0 {
                    entry.effective_weight() / total * 100.0
                } else {
                    0.0
                };
                let color = entry.color.as_ref().map(|c| c.as_str()).unwrap_or("-");
                println!("{:<32} x{:<8} {:>5.1}%  {}", entry.label, entry.weight, share, color);
            }
        }
        Commands::Pick { name } => {
            let preset = load(&store, &name)?;
            let angle = select::random_angle(&mut rand::thread_rng());
            let winner = select::compute_winner(&preset.entries, angle).ok_or_else(|| {
                anyhow::anyhow!("'{}' has no entries with a positive weight", preset.name)
            })?;
            println!("{}", winner.label);
        }
        Commands::Rename { old, new } => store.rename(&old, &new)?,
        Commands::Delete { name } => store.delete(&name)?,
    }

    Ok(())
}

fn load(store: &PresetStore, name: &str) -> anyhow::Result<wheelkit::model::Preset> {
    store
        .load(name)
        .ok_or_else(|| anyhow::anyhow!("No saved configuration named '{}'", name))
}
