/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Matrix4;
use std::io::Write;
use stlander_core::{Camera, Mesh};

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// How to draw mesh faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStyle {
    Shaded,
    Wireframe,
}

impl RenderStyle {
    pub fn toggled(self) -> Self {
        match self {
            RenderStyle::Shaded => RenderStyle::Wireframe,
            RenderStyle::Wireframe => RenderStyle::Shaded,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RenderStyle::Shaded => "shaded",
            RenderStyle::Wireframe => "wireframe",
        }
    }
}

/// ASCII renderer that rasterizes one mesh viewport into characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
        }
    }

    pub fn clear(&mut self) {
        for i in 0..self.depth_buffer.len() {
            self.depth_buffer[i] = f32::INFINITY;
            self.char_buffer[i] = ' ';
        }
    }

    pub fn render_mesh(
        &mut self,
        mesh: &Mesh,
        model_matrix: &Matrix4<f32>,
        camera: &Camera,
        style: RenderStyle,
    ) {
        for face in 0..mesh.face_count() {
            self.render_face(mesh, face, model_matrix, camera, style);
        }
    }

    fn render_face(
        &mut self,
        mesh: &Mesh,
        face: usize,
        model_matrix: &Matrix4<f32>,
        camera: &Camera,
        style: RenderStyle,
    ) {
        let mut screen_coords = [(0.0f32, 0.0f32, 0.0f32); 3];
        for (slot, vertex) in screen_coords.iter_mut().zip(mesh.corners(face)) {
            match camera.project_to_screen(
                &vertex,
                model_matrix,
                self.width as u32,
                self.height as u32,
            ) {
                Some(coords) => *slot = coords,
                None => return, // Face is clipped
            }
        }

        // Shade by the rotated face normal against the view direction
        let normal = model_matrix.transform_vector(&mesh.face_normal(face));
        let light_dir = (camera.position - camera.target)
            .try_normalize(1e-6)
            .unwrap_or_else(nalgebra::Vector3::z);
        let brightness = normal.dot(&light_dir).max(0.0);

        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
        let char_index = char_index.min(LUMINOSITY_RAMP.len() - 1);
        let character = LUMINOSITY_RAMP[char_index];

        match style {
            RenderStyle::Shaded => self.rasterize_triangle(&screen_coords, character),
            RenderStyle::Wireframe => {
                // Wireframe keeps some shading contrast but never vanishes
                let character = if character == ' ' { '.' } else { character };
                for (a, b) in [(0, 1), (1, 2), (2, 0)] {
                    self.draw_line(screen_coords[a], screen_coords[b], character);
                }
            }
        }
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32)], character: char) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to viewport bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        // Scanline rasterization
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                // Barycentric coordinates
                if let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
                {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        // Interpolate depth
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                        self.plot(x, y, depth, character);
                    }
                }
            }
        }
    }

    fn draw_line(&mut self, from: (f32, f32, f32), to: (f32, f32, f32), character: char) {
        let (x0, y0, z0) = from;
        let (x1, y1, z1) = to;
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0);
        for i in 0..=steps as i32 {
            let t = i as f32 / steps;
            let x = (x0 + (x1 - x0) * t).round() as i32;
            let y = (y0 + (y1 - y0) * t).round() as i32;
            // Bias edges slightly towards the viewer so they win the
            // depth test against their own face fill
            let depth = z0 + (z1 - z0) * t - 1e-3;
            self.plot(x, y, depth, character);
        }
    }

    fn plot(&mut self, x: i32, y: i32, depth: f32, character: char) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.char_buffer[idx] = character;
        }
    }

    /// Queue one row of this viewport, without a trailing newline, so the
    /// caller can compose several viewports side by side.
    pub fn queue_row<W: Write>(&self, writer: &mut W, y: usize) -> std::io::Result<()> {
        for x in 0..self.width {
            let c = self.char_buffer[y * self.width + x];
            writer.queue(SetForegroundColor(color_for(c)))?;
            writer.queue(Print(c))?;
        }
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}

/// Color based on character intensity
fn color_for(c: char) -> Color {
    match c {
        ' ' | '.' | ':' => Color::DarkGrey,
        '-' | '=' => Color::Grey,
        '+' | '*' => Color::White,
        '#' | '%' | '@' => Color::Cyan,
        _ => Color::White,
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_barycentric_center() {
        let (w0, w1, w2) =
            barycentric((0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (3.0, 3.0)).unwrap();
        assert!((w0 + w1 + w2 - 1.0).abs() < 1e-5);
        assert!(w0 > 0.0 && w1 > 0.0 && w2 > 0.0);
    }

    #[test]
    fn test_barycentric_degenerate() {
        assert!(barycentric((0.0, 0.0), (5.0, 0.0), (10.0, 0.0), (1.0, 1.0)).is_none());
    }

    #[test]
    fn test_plot_respects_depth() {
        let mut renderer = AsciiRenderer::new(4, 4);
        renderer.plot(1, 1, 5.0, '@');
        renderer.plot(1, 1, 9.0, '.');
        assert_eq!(renderer.char_buffer[1 * 4 + 1], '@');
        renderer.plot(1, 1, 2.0, '#');
        assert_eq!(renderer.char_buffer[1 * 4 + 1], '#');
    }
}
