//! Pratibimba - reference object grid builder and model inspector
//!
//! # Usage
//!
//! ```bash
//! # Build a voxel grid from a point file and save it as a model
//! pratibimba build --points mug.xyz --center 0,0,0 --extent 0.2,0.15,0.2 --out models/mug.prati
//!
//! # Print a saved model
//! pratibimba inspect models/mug.prati
//! ```
//!
//! Point files hold one `x y z` triple per line; blank lines and lines
//! starting with `#` are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::{info, warn};

use pratibimba::config::PratibimbaConfig;
use pratibimba::core::{BoundingVolume, Point3};
use pratibimba::detection::ReferenceId;
use pratibimba::grid::VoxelGrid;
use pratibimba::io::{ReferenceModel, read_model, write_model};
use pratibimba::session::ReferenceObject;

#[derive(Parser)]
#[command(name = "pratibimba")]
#[command(about = "Build and inspect reference object voxel grids")]
struct Args {
    /// Configuration file (defaults to configs/config.yaml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a voxel grid from a point file
    Build {
        /// Point file (one "x y z" per line)
        #[arg(short, long)]
        points: PathBuf,

        /// Bounding volume center "x,y,z" (meters)
        #[arg(long, value_parser = parse_point)]
        center: Point3,

        /// Bounding volume extent "x,y,z" (meters)
        #[arg(long, value_parser = parse_point)]
        extent: Point3,

        /// Reference id stored in the model
        #[arg(long, default_value = "1")]
        id: u64,

        /// Write the model to this file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print a summary of a saved model
    Inspect {
        /// Model file
        model: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => PratibimbaConfig::load(path)?,
        None => PratibimbaConfig::load_default()?,
    };

    match &args.command {
        Command::Build {
            points,
            center,
            extent,
            id,
            out,
        } => build(&config, points, *center, *extent, *id, out.as_deref()),
        Command::Inspect { model } => inspect(model),
    }
}

fn build(
    config: &PratibimbaConfig,
    points_path: &Path,
    center: Point3,
    extent: Point3,
    id: u64,
    out: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let volume = BoundingVolume::new(center, extent)?;
    let all_points = read_points(points_path)?;
    let points: Vec<Point3> = all_points
        .iter()
        .copied()
        .filter(|&p| volume.contains(p))
        .collect();
    if points.len() < all_points.len() {
        warn!(
            "{} of {} points lie outside the bounding volume and were skipped",
            all_points.len() - points.len(),
            all_points.len()
        );
    }

    let grid = VoxelGrid::build_with(&points, &volume, &config.to_voxel_sizing())?;
    let model = ReferenceModel {
        reference: ReferenceObject {
            id: ReferenceId(id),
            points,
            volume,
            origin: center,
        },
        grid: Some(grid),
        annotations: Vec::new(),
    };
    print_summary(&model);

    if let Some(path) = out {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        write_model(&model, &mut writer)?;
        writer.flush()?;
        info!("Saved model to {}", path.display());
    }
    Ok(())
}

fn inspect(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = BufReader::new(File::open(path)?);
    let model = read_model(&mut reader)?;
    print_summary(&model);
    Ok(())
}

fn print_summary(model: &ReferenceModel) {
    let reference = &model.reference;
    let (c, e) = (reference.volume.center(), reference.volume.extent());

    println!("Reference {}", reference.id);
    println!("  Points:  {}", reference.points.len());
    println!("  Center:  ({:.3}, {:.3}, {:.3})", c.x, c.y, c.z);
    println!("  Extent:  ({:.3}, {:.3}, {:.3})", e.x, e.y, e.z);
    println!(
        "  Origin:  ({:.3}, {:.3}, {:.3})",
        reference.origin.x, reference.origin.y, reference.origin.z
    );

    match &model.grid {
        Some(grid) => {
            let dims = grid.dims();
            let edge = grid.edge();
            println!(
                "  Grid:    {}x{}x{} voxels, edge ({:.4}, {:.4}, {:.4})",
                dims.nx, dims.ny, dims.nz, edge.x, edge.y, edge.z
            );
            println!(
                "  Occupied: {} of {}",
                grid.occupied_count(),
                grid.total_voxels()
            );
        }
        None => println!("  Grid:    none"),
    }

    println!("  Annotations: {}", model.annotations.len());
    for a in &model.annotations {
        let v = a.anchor_voxel;
        println!("    #{} at ({}, {}, {})", a.sequence_number, v.i, v.j, v.k);
    }
}

fn read_points(path: &Path) -> Result<Vec<Point3>, Box<dyn std::error::Error>> {
    let reader = BufReader::new(File::open(path)?);
    let mut points = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let values: Vec<f32> = line
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<_, _>>()
            .map_err(|e| format!("{}:{}: {}", path.display(), line_no + 1, e))?;
        let [x, y, z] = values[..] else {
            return Err(format!(
                "{}:{}: expected 3 values, found {}",
                path.display(),
                line_no + 1,
                values.len()
            )
            .into());
        };
        points.push(Point3::new(x, y, z));
    }

    info!("Read {} points from {}", points.len(), path.display());
    Ok(points)
}

fn parse_point(s: &str) -> Result<Point3, String> {
    let values: Vec<f32> = s
        .split(',')
        .map(|v| v.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid number in '{}': {}", s, e))?;
    match values[..] {
        [x, y, z] => Ok(Point3::new(x, y, z)),
        _ => Err(format!("expected x,y,z, got '{}'", s)),
    }
}
