use std::fmt::Write;

use rooftop_city::PieceKind;
use rooftop_kernel::GameWorld;

use crate::camera::RenderView;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads world state and a view configuration, then produces
/// output. It never mutates the world.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given world state and view.
    fn render(&self, world: &GameWorld, view: &RenderView) -> Self::Output;
}

/// Text renderer for the CLI, logs and tests.
///
/// Produces a human-readable dump of what a frame would show.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    /// List every target and paintball, not only the counts.
    pub verbose: bool,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn write_frame(&self, out: &mut String, world: &GameWorld, view: &RenderView) -> std::fmt::Result {
        let stats = world.stats();
        writeln!(out, "=== Frame (tick={}, seed={}) ===", world.tick(), world.seed())?;
        writeln!(
            out,
            "Score: {} ({} hits / {} shots, streak {})",
            stats.score, stats.hits, stats.shots, stats.streak
        )?;
        let city = world.city();
        let pieces: Vec<String> = PieceKind::ALL
            .iter()
            .map(|&k| format!("{}={}", k.name(), city.count(k)))
            .collect();
        writeln!(out, "City: {}", pieces.join(" "))?;
        writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            view.eye.x, view.eye.y, view.eye.z, view.target.x, view.target.y, view.target.z, view.fov_degrees
        )?;

        let avatar = world.avatar();
        let p = avatar.position;
        writeln!(
            out,
            "Avatar: pos=({:.2}, {:.2}, {:.2}) anim={}",
            p.x,
            p.y,
            p.z,
            avatar.anim.name()
        )?;

        let active = world.targets().iter().filter(|t| t.is_active()).count();
        writeln!(out, "Targets: {active}/{} active", world.targets().len())?;
        if self.verbose {
            for t in world.targets() {
                let p = t.position;
                let state = if t.is_active() { "active" } else { "popped" };
                writeln!(out, "  [{}] pos=({:.2}, {:.2}, {:.2}) {state}", t.id.short(), p.x, p.y, p.z)?;
            }
        }

        writeln!(out, "Paintballs: {}", world.paintballs().len())?;
        if self.verbose {
            for b in world.paintballs() {
                let p = b.position;
                writeln!(out, "  [{}] pos=({:.2}, {:.2}, {:.2}) age={:.2}", b.id.short(), p.x, p.y, p.z, b.age)?;
            }
        }
        writeln!(out, "Splats: {}/{}", world.splats().len(), world.splats().capacity())?;
        Ok(())
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, world: &GameWorld, view: &RenderView) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_frame(&mut out, world, view);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rooftop_kernel::GameConfig;

    #[test]
    fn summarizes_a_fresh_world() {
        let world = GameWorld::new(GameConfig::default()).unwrap();
        let view = RenderView::default();
        let output = DebugTextRenderer::new().render(&world, &view);

        assert!(output.contains("tick=0"));
        assert!(output.contains("Score: 0"));
        assert!(output.contains(&format!("building={}", world.city().count(PieceKind::Building))));
        assert!(output.contains("anim=idle"));
        assert!(output.contains("Paintballs: 0"));
    }

    #[test]
    fn verbose_lists_targets() {
        let world = GameWorld::new(GameConfig::default()).unwrap();
        let renderer = DebugTextRenderer { verbose: true };
        let output = renderer.render(&world, &RenderView::default());
        let first = world.targets()[0].id.short();
        assert!(output.contains(&format!("[{first}]")));
    }
}
