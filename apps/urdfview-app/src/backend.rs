//! Render backend that writes one text line per call.
//!
//! Used by `urdfview draw` to show exactly what a graphics backend would be
//! asked to do for one frame.

use std::io::{self, Write};

use nalgebra::Matrix4;
use urdfview_kinematics::math::translation_of;
use urdfview_scene::{DrawCommand, LightRig, Primitive, Projection, RenderBackend, SurfaceDefaults};

/// [`RenderBackend`] printing to any writer.
///
/// `RenderBackend` methods cannot fail, so the first write error is kept
/// and returned by [`finish`](Self::finish).
pub struct TextBackend<W> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> TextBackend<W> {
    pub const fn new(out: W) -> Self {
        Self { out, error: None }
    }

    pub fn finish(mut self) -> io::Result<W> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.out.write_fmt(args).and_then(|()| self.out.write_all(b"\n")) {
            self.error = Some(e);
        }
    }
}

fn describe(primitive: &Primitive) -> String {
    match primitive {
        Primitive::Box { size } => format!("box size={size:?}"),
        Primitive::Sphere { radius } => format!("sphere radius={radius}"),
        Primitive::Cylinder { radius, length } => {
            format!("cylinder radius={radius} length={length}")
        }
        Primitive::Mesh(mesh) => format!(
            "mesh triangles={} vertices={}",
            mesh.triangle_count(),
            mesh.vertices.len()
        ),
    }
}

impl<W: Write> RenderBackend for TextBackend<W> {
    fn clear(&mut self, color: [f32; 4]) {
        self.line(format_args!("clear rgba={color:?}"));
    }

    fn set_projection(&mut self, p: &Projection) {
        self.line(format_args!(
            "projection fov_y={} aspect={:.4} near={} far={}",
            p.fov_y, p.aspect, p.near, p.far
        ));
    }

    fn setup_lighting(&mut self, lights: &LightRig, surface: &SurfaceDefaults) {
        self.line(format_args!(
            "lights key={:?} fill={:?} specular={:?} shininess={}",
            lights.key.position, lights.fill.position, surface.specular, surface.shininess
        ));
    }

    fn set_view(&mut self, view: &Matrix4<f32>) {
        let t = translation_of(view);
        self.line(format_args!(
            "view translation=[{:.4}, {:.4}, {:.4}]",
            t.x, t.y, t.z
        ));
    }

    fn draw(&mut self, command: &DrawCommand) {
        let t = translation_of(&command.transform);
        let shape = describe(&command.primitive);
        self.line(format_args!(
            "draw {} {} at=[{:.4}, {:.4}, {:.4}] rgba={:?}",
            command.link, shape, t.x, t.y, t.z, command.color
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_one_line_per_call() {
        let mut backend = TextBackend::new(Vec::new());
        backend.clear([0.0, 0.0, 0.0, 1.0]);
        backend.draw(&DrawCommand {
            link: "base".into(),
            transform: Matrix4::new_translation(&nalgebra::Vector3::new(1.0, 2.0, 3.0)),
            primitive: Primitive::Sphere { radius: 0.5 },
            color: [1.0, 0.0, 0.0, 1.0],
        });
        let text = String::from_utf8(backend.finish().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "clear rgba=[0.0, 0.0, 0.0, 1.0]");
        assert_eq!(
            lines[1],
            "draw base sphere radius=0.5 at=[1.0000, 2.0000, 3.0000] rgba=[1.0, 0.0, 0.0, 1.0]"
        );
    }
}
