mod scene;
mod viewer;

use ballpit_core::diagnostics::format_config_error;
use ballpit_core::{run_simulation, RunOptions};
use clap::{Parser, Subcommand};
use glam::Vec3;
use scene::SceneFile;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use viewer::ViewerApp;

#[derive(Parser)]
#[command(name = "ballpit")]
#[command(about = "Ball pit particle field - run, inspect and view", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scene headless and print measurements
    Run {
        /// Path to the scene TOML file
        file: PathBuf,
        /// Number of frames to simulate
        #[arg(long, default_value_t = 600)]
        steps: usize,
        /// Frame time in seconds
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f32,
        /// Hold the controller at x,y,z for the whole run
        #[arg(long, value_parser = parse_point)]
        pointer: Option<Vec3>,
    },
    /// Write the default scene as TOML
    Init {
        /// Output path, stdout when omitted
        file: Option<PathBuf>,
    },
    /// Open the interactive viewer; the scene reloads when the file changes
    View {
        /// Path to the scene TOML file
        file: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Run {
            file,
            steps,
            dt,
            pointer,
        } => run_file(&file, RunOptions { steps, dt, pointer }),
        Commands::Init { file } => init_scene(file),
        Commands::View { file } => view_file(file),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_file(file: &PathBuf, options: RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    let source = fs::read_to_string(file)?;
    let scene = SceneFile::from_toml_str(&source).map_err(|e| format_config_error(&e, &source))?;
    let result = run_simulation(&scene.field, options)?;

    for m in result.measurements {
        println!("{} = {}", m.name, m.value);
    }

    Ok(())
}

fn init_scene(file: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let text = SceneFile::default().to_toml_string()?;
    match file {
        Some(path) => {
            fs::write(&path, text)?;
            info!(path = %path.display(), "wrote default scene");
        }
        None => print!("{}", text),
    }
    Ok(())
}

fn view_file(file: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "ballpit",
        options,
        Box::new(move |cc| Ok(Box::new(ViewerApp::new(file, cc)))),
    )
    .map_err(|e| format!("viewer failed: {}", e))?;
    Ok(())
}

fn parse_point(s: &str) -> Result<Vec3, String> {
    let parts: Vec<f32> = s
        .split(',')
        .map(|p| p.trim().parse::<f32>().map_err(|e| format!("{}: {}", p, e)))
        .collect::<Result<_, _>>()?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        [x, y] => Ok(Vec3::new(*x, *y, 0.0)),
        _ => Err(format!("expected x,y[,z], got '{}'", s)),
    }
}
