/// Example: align a generated box mesh and view it side by side
///
/// Usage: cargo run --example align_box
use std::io;

use nalgebra::Vector3;
use stlander_core::{align, AlignOptions, Mesh};
use stlander_terminal::TerminalApp;

fn main() -> io::Result<()> {
    // An elongated box, pushed away from the origin
    let mesh = Mesh::cuboid(10.0, 2.0, 1.0).translated(Vector3::new(5.0, 5.0, 5.0));

    let result = match align(&mesh, &AlignOptions::default()) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("alignment failed: {e}");
            return Ok(());
        }
    };

    println!(
        "Aligned {} triangles, COM was ({:.2}, {:.2}, {:.2})",
        mesh.face_count(),
        result.centroid.x,
        result.centroid.y,
        result.centroid.z
    );
    println!("Starting terminal viewer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(mesh, result, None)?;
    app.run()
}
