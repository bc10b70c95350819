use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use character_anim::{
    resource_system::file_formats::{load_animation, save_animation},
    CurveSource,
};
use clap::{Parser, Subcommand};
use glam::Vec4;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

#[derive(Parser)]
#[command(name = "anim_convert")]
#[command(about = "Inspect and convert nanim2 / nax2 animation files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print groups, curves and durations
    Info { input: PathBuf },

    /// Convert between formats, picked from the file extensions
    Convert { input: PathBuf, output: PathBuf },

    /// Write the animation as pretty JSON
    Json { input: PathBuf, output: PathBuf },

    /// Print every curve of a group at the given time
    Sample {
        input: PathBuf,
        #[arg(short, long, default_value_t = 0)]
        group: usize,
        #[arg(short, long, default_value_t = 0.0)]
        time: f32,
    },
}

fn info(input: &Path) -> Result<()> {
    let asset = load_animation(input).with_context(|| format!("loading {}", input.display()))?;
    println!("{}: {} groups, {} keys", asset.name(), asset.groups().len(), asset.keys().len());
    for (index, group) in asset.groups().iter().enumerate() {
        let animated = group.curves.iter().filter(|c| c.is_animated()).count();
        println!(
            "  group {index}: {} curves ({animated} animated), {} keys x {}s = {}s, {}",
            group.num_curves(),
            group.num_keys,
            group.key_time,
            group.duration(),
            group.loop_type.keyword()
        );
    }
    Ok(())
}

fn sample(input: &Path, group: usize, time: f32) -> Result<()> {
    let asset = load_animation(input)?;
    let Some(num_curves) = asset.group(group).map(|g| g.num_curves()) else {
        bail!("group {group} does not exist, the file has {}", asset.group_count());
    };
    let mut keys = vec![Vec4::ZERO; num_curves];
    asset.sample_curves(time, group, 0, &mut keys, None)?;
    for (index, key) in keys.iter().enumerate() {
        println!("  curve {index}: {} {} {} {}", key.x, key.y, key.z, key.w);
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(LevelFilter::INFO.into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Info { input } => info(&input)?,
        Commands::Convert { input, output } => {
            let asset = load_animation(&input).with_context(|| format!("loading {}", input.display()))?;
            save_animation(&asset, &output).with_context(|| format!("writing {}", output.display()))?;
            log::info!("converted {} -> {}", input.display(), output.display());
        }
        Commands::Json { input, output } => {
            let asset = load_animation(&input)?;
            std::fs::write(&output, serde_json::to_string_pretty(&asset)?)?;
            log::info!("wrote {}", output.display());
        }
        Commands::Sample { input, group, time } => sample(&input, group, time)?,
    }
    Ok(())
}
