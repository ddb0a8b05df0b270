/// STLander - Principal Axes Aligner
///
/// Loads an STL, moves its area-weighted surface center of mass to the
/// origin, rotates the principal axes onto global XYZ, and shows the
/// original and aligned meshes side by side in the terminal.
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use stlander_core::stl::{load_stl, save_stl, StlFormat};
use stlander_core::{align, AlignOptions, Pa2Target};
use stlander_terminal::{SaveTarget, TerminalApp};

/// Align an STL to its principal axes (surface COM to origin, axes to XYZ).
#[derive(Parser, Debug)]
#[command(name = "stlander", version, about)]
struct Cli {
    /// Input STL path (binary or ASCII).
    input: PathBuf,

    /// Where to map the 2nd principal axis: Y (default) or Z (swap Y/Z).
    #[arg(long, value_enum, default_value_t = Pa2TargetArg::Y)]
    pa2_target: Pa2TargetArg,

    /// Override the degenerate-area tolerance (absolute, in squared mesh units).
    #[arg(long, value_name = "AREA")]
    area_epsilon: Option<f64>,

    /// Output STL path for the aligned mesh.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write ASCII STL instead of binary.
    #[arg(long)]
    ascii: bool,

    /// Align and write without opening the viewer.
    #[arg(long, requires = "output")]
    headless: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Pa2TargetArg {
    Y,
    Z,
}

impl From<Pa2TargetArg> for Pa2Target {
    fn from(arg: Pa2TargetArg) -> Self {
        match arg {
            Pa2TargetArg::Y => Pa2Target::Y,
            Pa2TargetArg::Z => Pa2Target::Z,
        }
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("stlander: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let options = AlignOptions {
        pa2_target: cli.pa2_target.into(),
        area_epsilon: cli.area_epsilon,
    };
    let format = if cli.ascii {
        StlFormat::Ascii
    } else {
        StlFormat::Binary
    };

    println!("Loading STL file: {}", cli.input.display());
    let mesh = load_stl(&cli.input)?;
    println!("Loaded {} triangles", mesh.face_count());

    let result = align(&mesh, &options)?;
    let c = result.centroid;
    let ev = result.eigenvalues;
    println!("Surface COM: ({:.6}, {:.6}, {:.6})", c.x, c.y, c.z);
    println!("Eigenvalues: ({:.6}, {:.6}, {:.6})", ev[0], ev[1], ev[2]);

    if cli.headless {
        // clap guarantees --output is present alongside --headless
        if let Some(path) = &cli.output {
            save_stl(path, &result.aligned, format)?;
            println!("Wrote aligned mesh to {}", path.display());
        }
        return Ok(());
    }

    let save = cli.output.map(|path| SaveTarget { path, format });
    println!("Starting terminal viewer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(mesh, result, save)?;
    app.run()?;

    Ok(())
}
