use egui::{Align2, Color32, Context, Id, LayerId, Order, Stroke};
use rooftop_tools::GameSummary;

const CROSSHAIR_ARM: f32 = 8.0;
const CROSSHAIR_GAP: f32 = 3.0;

/// What the overlay shows this frame.
pub struct HudView<'a> {
    pub summary: &'a GameSummary,
    pub fps: f32,
    pub clip: Option<&'a str>,
    pub paused: bool,
    pub grabbed: bool,
    pub third_person: bool,
}

pub fn draw_hud(ctx: &Context, view: &HudView<'_>) {
    let s = view.summary;
    egui::Area::new(Id::new("hud"))
        .anchor(Align2::LEFT_TOP, [12.0, 12.0])
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.heading(format!("Score {}", s.score));
                ui.label(format!(
                    "Shots {}  Hits {}  Accuracy {:.0}%",
                    s.shots,
                    s.hits,
                    s.accuracy * 100.0
                ));
                ui.label(format!("Streak {} (best {})", s.streak, s.best_streak));
                ui.label(format!("Targets {}/{}", s.targets_active, s.targets_total));
                ui.separator();
                ui.small(format!("{:.0} fps", view.fps));
                let clip = view.clip.unwrap_or("-");
                ui.small(format!("Anim {} / clip {clip}", s.anim));
                ui.small(if view.third_person { "Third person" } else { "First person" });
            });
        });
}

pub fn draw_status(ctx: &Context, view: &HudView<'_>) {
    let message = if view.paused {
        Some("Paused (P to resume)")
    } else if !view.grabbed {
        Some("Click to play")
    } else {
        None
    };
    if let Some(message) = message {
        egui::Area::new(Id::new("status"))
            .anchor(Align2::CENTER_TOP, [0.0, 24.0])
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.heading(message);
                });
            });
    }
}

pub fn draw_help(ctx: &Context) {
    egui::Window::new("Controls")
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            egui::Grid::new("controls").num_columns(2).show(ui, |ui| {
                for (keys, what) in [
                    ("W A S D", "move"),
                    ("Shift", "run"),
                    ("Space", "jump"),
                    ("Mouse", "look"),
                    ("Left click", "fire"),
                    ("V", "first / third person"),
                    ("H", "toggle HUD"),
                    ("P", "pause"),
                    ("R", "new round"),
                    ("Esc", "release cursor"),
                    ("F1", "this help"),
                ] {
                    ui.strong(keys);
                    ui.label(what);
                    ui.end_row();
                }
            });
        });
}

pub fn draw_crosshair(ctx: &Context) {
    let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("crosshair")));
    let c = ctx.screen_rect().center();
    let stroke = Stroke::new(2.0, Color32::from_rgba_unmultiplied(255, 255, 255, 220));
    let (gap, arm) = (CROSSHAIR_GAP, CROSSHAIR_GAP + CROSSHAIR_ARM);
    painter.line_segment([c + egui::vec2(-arm, 0.0), c + egui::vec2(-gap, 0.0)], stroke);
    painter.line_segment([c + egui::vec2(gap, 0.0), c + egui::vec2(arm, 0.0)], stroke);
    painter.line_segment([c + egui::vec2(0.0, -arm), c + egui::vec2(0.0, -gap)], stroke);
    painter.line_segment([c + egui::vec2(0.0, gap), c + egui::vec2(0.0, arm)], stroke);
}
