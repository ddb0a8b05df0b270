/// Terminal-based side-by-side viewer for original and aligned meshes
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{self, stdout, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use stlander_core::stl::{save_stl, StlFormat};
use stlander_core::{Alignment, Axis, Camera, Mesh, RotationState, Transform};

pub mod renderer;

pub use renderer::{AsciiRenderer, RenderStyle};

/// Where the viewer writes the aligned mesh when the user hits the save key.
pub struct SaveTarget {
    pub path: PathBuf,
    pub format: StlFormat,
}

/// Main application struct for the split ORIGINAL | ALIGNED view
pub struct TerminalApp {
    original: Mesh,
    alignment: Alignment,
    save: Option<SaveTarget>,
    rotation: RotationState,
    camera: Camera,
    style: RenderStyle,
    left: AsciiRenderer,
    right: AsciiRenderer,
    view_height: usize,
    status: String,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(original: Mesh, alignment: Alignment, save: Option<SaveTarget>) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let (pane_width, view_height) = pane_dimensions(width, height);

        let mut camera = Camera::new(pane_width as u32, view_height as u32);
        camera.frame_radius(frame_radius(&original));
        camera.view_isometric();

        Ok(Self {
            original,
            alignment,
            save,
            rotation: RotationState::zero(),
            camera,
            style: RenderStyle::Shaded,
            left: AsciiRenderer::new(pane_width, view_height),
            right: AsciiRenderer::new(pane_width, view_height),
            view_height,
            status: String::new(),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            if event::poll(Duration::from_millis(0))? {
                self.handle_event()?;
            }

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self) -> io::Result<()> {
        match event::read()? {
            Event::Key(KeyEvent { code, .. }) => self.handle_key(code),
            Event::Resize(width, height) => self.resize(width, height),
            _ => {}
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('w') | KeyCode::Up => {
                self.rotation.rotate(0.1, 0.0, 0.0);
            }
            KeyCode::Char('s') | KeyCode::Down => {
                self.rotation.rotate(-0.1, 0.0, 0.0);
            }
            KeyCode::Char('a') | KeyCode::Left => {
                self.rotation.rotate(0.0, -0.1, 0.0);
            }
            KeyCode::Char('d') | KeyCode::Right => {
                self.rotation.rotate(0.0, 0.1, 0.0);
            }
            KeyCode::Char('e') => {
                self.rotation.rotate(0.0, 0.0, 0.1);
            }
            KeyCode::Char('r') => {
                self.rotation.rotate(0.0, 0.0, -0.1);
            }
            KeyCode::Char('p') => {
                self.camera.mode = self.camera.mode.toggled();
                self.status = format!("projection: {:?}", self.camera.mode);
            }
            KeyCode::Char('m') => {
                self.style = self.style.toggled();
                self.status = format!("render style: {}", self.style.label());
            }
            KeyCode::Char('x') => self.flip(Axis::X),
            KeyCode::Char('y') => self.flip(Axis::Y),
            KeyCode::Char('z') => self.flip(Axis::Z),
            KeyCode::Char('1') => self.camera.view_along(Axis::X, true),
            KeyCode::Char('2') => self.camera.view_along(Axis::Y, true),
            KeyCode::Char('3') => self.camera.view_along(Axis::Z, true),
            KeyCode::Char('i') => {
                self.camera.view_isometric();
                self.rotation = RotationState::zero();
            }
            KeyCode::Char('o') => self.save_aligned(),
            _ => {}
        }
    }

    /// Rotate the aligned mesh 180 degrees about a global axis.
    fn flip(&mut self, axis: Axis) {
        match self.alignment.rotated_about(&self.original, axis, 180.0) {
            Ok(alignment) => {
                self.alignment = alignment;
                self.status = format!("flipped aligned mesh about {axis:?}");
            }
            Err(e) => self.status = format!("flip failed: {e}"),
        }
    }

    fn save_aligned(&mut self) {
        let Some(target) = &self.save else {
            self.status = "no output path given (run with --output)".to_string();
            return;
        };
        match save_stl(&target.path, &self.alignment.aligned, target.format) {
            Ok(()) => self.status = format!("saved aligned mesh to {}", target.path.display()),
            Err(e) => self.status = format!("save failed: {e}"),
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        let (pane_width, view_height) = pane_dimensions(width, height);
        self.left = AsciiRenderer::new(pane_width, view_height);
        self.right = AsciiRenderer::new(pane_width, view_height);
        self.view_height = view_height;
        self.camera.aspect = pane_width as f32 / view_height.max(1) as f32;
    }

    fn render(&mut self) -> io::Result<()> {
        let view = Transform::rotation_matrix(&self.rotation);

        // Each pane spins about its own centroid; the aligned mesh is
        // already centered on the origin
        let c = self.alignment.centroid;
        let original_model =
            view * Transform::translation_matrix(-c.x as f32, -c.y as f32, -c.z as f32);
        let aligned_model = view;

        self.left.clear();
        self.left
            .render_mesh(&self.original, &original_model, &self.camera, self.style);
        self.right.clear();
        self.right
            .render_mesh(&self.alignment.aligned, &aligned_model, &self.camera, self.style);

        let mut stdout = stdout();
        queue!(stdout, terminal::Clear(ClearType::All), cursor::MoveTo(0, 0))?;

        // Title row with pane labels
        let ev = self.alignment.eigenvalues;
        queue!(
            stdout,
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "STLander | {} tris | COM ({:.3}, {:.3}, {:.3}) | evals ({:.3}, {:.3}, {:.3}) | FPS {:.1}",
                self.original.face_count(),
                c.x,
                c.y,
                c.z,
                ev[0],
                ev[1],
                ev[2],
                self.fps
            )),
            ResetColor
        )?;

        let pane_width = self.left.width();
        queue!(
            stdout,
            cursor::MoveTo(0, 1),
            SetForegroundColor(Color::Green),
            Print(center_label("ORIGINAL", pane_width)),
            Print("|"),
            Print(center_label("ALIGNED", pane_width)),
            ResetColor
        )?;

        for y in 0..self.view_height {
            queue!(stdout, cursor::MoveTo(0, (y + 2) as u16))?;
            self.left.queue_row(&mut stdout, y)?;
            queue!(stdout, ResetColor, Print('|'))?;
            self.right.queue_row(&mut stdout, y)?;
        }

        // Help / status row
        let help = if self.status.is_empty() {
            "WASD/Arrows=Rotate E/R=Roll P=Projection M=Style X/Y/Z=Flip 1/2/3=Axis view I=Iso O=Save Q=Quit"
                .to_string()
        } else {
            self.status.clone()
        };
        queue!(
            stdout,
            cursor::MoveTo(0, (self.view_height + 2) as u16),
            SetForegroundColor(Color::Yellow),
            Print(help),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

fn pane_dimensions(width: u16, height: u16) -> (usize, usize) {
    // Two panes split by a one-column rule; three rows of chrome
    let pane_width = (width.saturating_sub(1) / 2).max(10) as usize;
    let view_height = height.saturating_sub(3).max(5) as usize;
    (pane_width, view_height)
}

fn frame_radius(mesh: &Mesh) -> f32 {
    (mesh.bounding_box_diagonal() as f32 / 2.0).max(1e-3)
}

fn center_label(label: &str, width: usize) -> String {
    if label.len() >= width {
        return label[..width].to_string();
    }
    let pad = width - label.len();
    let left = pad / 2;
    format!(
        "{}{}{}",
        " ".repeat(left),
        label,
        " ".repeat(pad - left)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pane_dimensions() {
        let (pane, height) = pane_dimensions(81, 24);
        assert_eq!(pane, 40);
        assert_eq!(height, 21);

        // Tiny terminals still get a usable viewport
        let (pane, height) = pane_dimensions(4, 2);
        assert_eq!(pane, 10);
        assert_eq!(height, 5);
    }

    #[test]
    fn test_center_label() {
        assert_eq!(center_label("AB", 6), "  AB  ");
        assert_eq!(center_label("ALIGNED", 4), "ALIG");
    }
}
