//! Interactive viewer for ball pit scenes
//!
//! Renders the field orthographically, feeds the hovered pointer position to
//! the controller body and reloads the scene whenever its file changes.

use crate::scene::SceneFile;
use ballpit_core::diagnostics::format_config_error;
use ballpit_core::{Bounds, ParticleField};
use eframe::egui;
use glam::Vec3;
use notify::{Event, RecommendedWatcher, Watcher};
use std::path::PathBuf;
use std::sync::mpsc;
use tracing::{info, warn};

/// Longest frame handed to the field; longer stalls are clamped
const MAX_FRAME_DT: f32 = 0.1;

pub struct ViewerApp {
    source_path: PathBuf,
    scene: SceneFile,
    field: Option<ParticleField>,
    last_load_error: Option<String>,
    playing: bool,
    last_aspect: Option<f32>,
    #[allow(dead_code)] // Kept alive to maintain file watching
    file_watcher: Option<RecommendedWatcher>,
    file_receiver: mpsc::Receiver<notify::Result<Event>>,
}

impl ViewerApp {
    pub fn new(source_path: PathBuf, _cc: &eframe::CreationContext<'_>) -> Self {
        // Watcher events carry absolute paths
        let source_path = std::fs::canonicalize(&source_path).unwrap_or(source_path);
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })
        .ok();

        if let Some(ref mut w) = watcher {
            if let Err(e) = w.watch(&source_path, notify::RecursiveMode::NonRecursive) {
                warn!(error = %e, "file watching disabled");
            }
        }

        let mut app = Self {
            source_path,
            scene: SceneFile::default(),
            field: None,
            last_load_error: None,
            playing: true,
            last_aspect: None,
            file_watcher: watcher,
            file_receiver: rx,
        };
        app.reload_scene();
        app
    }

    fn reload_scene(&mut self) {
        let source = match std::fs::read_to_string(&self.source_path) {
            Ok(source) => source,
            Err(e) => {
                self.fail(format!("Error reading {}: {}", self.source_path.display(), e));
                return;
            }
        };

        let built = SceneFile::from_toml_str(&source)
            .map_err(|e| format_config_error(&e, &source))
            .and_then(|scene| {
                ParticleField::new(&scene.field)
                    .map(|field| (scene, field))
                    .map_err(|e| e.to_string())
            });

        match built {
            Ok((scene, field)) => {
                info!(bodies = field.len(), "scene loaded");
                self.scene = scene;
                self.field = Some(field);
                self.last_load_error = None;
                // Force bounds to be recomputed for the current window
                self.last_aspect = None;
            }
            Err(msg) => self.fail(msg),
        }
    }

    fn fail(&mut self, msg: String) {
        warn!("{}", msg);
        self.last_load_error = Some(msg);
        self.field = None;
    }

    fn check_file_changes(&mut self) {
        let mut needs_reload = false;
        while let Ok(event) = self.file_receiver.try_recv() {
            match event {
                Ok(Event {
                    kind: notify::EventKind::Modify(_),
                    paths,
                    ..
                }) => {
                    if paths.contains(&self.source_path) {
                        needs_reload = true;
                    }
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "file watcher error"),
            }
        }

        if needs_reload {
            self.reload_scene();
        }
    }

    fn draw_field(&self, painter: &egui::Painter, view: &ViewTransform) {
        let Some(field) = self.field.as_ref() else {
            return;
        };
        let positions = field.positions();
        let radii = field.radii();
        let max_z = field.bounds().max_z;
        let colors = &self.scene.viewer.colors;

        // Far bodies first
        let mut order: Vec<usize> = (0..field.len()).collect();
        order.sort_by(|a, b| positions[*a].z.total_cmp(&positions[*b].z));

        for i in order {
            if i == 0 && !self.scene.viewer.follow_cursor {
                continue;
            }
            let base = gradient_color(i, field.len(), colors);
            let color = shade(base, depth_factor(positions[i].z, max_z));
            painter.circle_filled(
                view.to_screen(positions[i]),
                radii[i] * view.scale,
                color,
            );
        }

        if self.scene.viewer.follow_cursor {
            let light = view.to_screen(field.light_position());
            let glow = gradient_color(0, field.len(), colors);
            let [r, g, b, _] = glow.to_array();
            painter.circle_filled(
                light,
                radii[0] * view.scale * 1.6,
                egui::Color32::from_rgba_unmultiplied(r, g, b, 40),
            );
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_file_changes();

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button(if self.playing { "⏸ Pause" } else { "▶ Play" }).clicked() {
                    self.playing = !self.playing;
                }

                if ui.button("⏮ Reset").clicked() {
                    self.reload_scene();
                }

                if ui.button("⏭ Step").clicked() {
                    if let Some(ref mut field) = self.field {
                        field.update(1.0 / 60.0);
                    }
                }

                ui.separator();
                ui.checkbox(&mut self.scene.viewer.follow_cursor, "Follow cursor");

                if let Some(ref field) = self.field {
                    ui.separator();
                    ui.label(format!("Bodies: {}", field.len()));
                    if field.controller_enabled() {
                        ui.label("controller: on");
                    }
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let rect = ui.max_rect();
            let view_height = self.scene.viewer.view_height;
            let view = ViewTransform::new(rect.center(), rect.height() / view_height);

            if let Some(ref mut field) = self.field {
                let aspect = rect.width() / rect.height().max(1.0);
                if self.last_aspect != Some(aspect) {
                    field.set_bounds(Bounds::from_view(
                        view_height,
                        aspect,
                        self.scene.field.max_z,
                    ));
                    self.last_aspect = Some(aspect);
                }

                let hover = ctx.input(|i| i.pointer.hover_pos());
                match hover {
                    Some(pos) if self.scene.viewer.follow_cursor && rect.contains(pos) => {
                        field.set_controller_target(view.to_world(pos));
                    }
                    _ => field.clear_controller(),
                }

                if self.playing {
                    let dt = ctx.input(|i| i.stable_dt).min(MAX_FRAME_DT);
                    field.update(dt);
                }
            }

            self.draw_field(ui.painter(), &view);

            if let Some(ref error) = self.last_load_error {
                ui.vertical_centered(|ui| {
                    ui.add_space(rect.height() * 0.4);
                    ui.label(
                        egui::RichText::new(error)
                            .color(egui::Color32::RED)
                            .size(16.0),
                    );
                });
            }
        });

        if self.playing {
            ctx.request_repaint();
        }
    }
}

/// Orthographic mapping between the z = 0 world plane and screen points
struct ViewTransform {
    center: egui::Pos2,
    scale: f32,
}

impl ViewTransform {
    fn new(center: egui::Pos2, scale: f32) -> Self {
        Self { center, scale }
    }

    fn to_screen(&self, p: Vec3) -> egui::Pos2 {
        self.center + egui::vec2(p.x * self.scale, -p.y * self.scale)
    }

    fn to_world(&self, pos: egui::Pos2) -> Vec3 {
        let d = pos - self.center;
        Vec3::new(d.x / self.scale, -d.y / self.scale, 0.0)
    }
}

/// Bucketed gradient: body `i` of `count` takes one of the `colors` stops
fn gradient_color(i: usize, count: usize, colors: &[u32]) -> egui::Color32 {
    if colors.is_empty() {
        return egui::Color32::LIGHT_BLUE;
    }
    let idx = (i * colors.len() / count.max(1)).min(colors.len() - 1);
    let rgb = colors[idx];
    egui::Color32::from_rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

/// Nearer bodies (positive z) are brighter
fn depth_factor(z: f32, max_z: f32) -> f32 {
    let t = (z / max_z.max(f32::EPSILON)).clamp(-1.0, 1.0);
    0.8 + 0.2 * t
}

fn shade(color: egui::Color32, factor: f32) -> egui::Color32 {
    let scale = |c: u8| (c as f32 * factor).round().clamp(0.0, 255.0) as u8;
    egui::Color32::from_rgb(scale(color.r()), scale(color.g()), scale(color.b()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_buckets() {
        let colors = [0xff0000, 0x00ff00, 0x0000ff];
        assert_eq!(gradient_color(0, 9, &colors), egui::Color32::from_rgb(255, 0, 0));
        assert_eq!(gradient_color(4, 9, &colors), egui::Color32::from_rgb(0, 255, 0));
        assert_eq!(gradient_color(8, 9, &colors), egui::Color32::from_rgb(0, 0, 255));
        assert_eq!(gradient_color(3, 9, &[]), egui::Color32::LIGHT_BLUE);
    }

    #[test]
    fn test_view_transform_inverts() {
        let view = ViewTransform::new(egui::pos2(400.0, 300.0), 60.0);
        let world = Vec3::new(1.5, -2.0, 0.0);
        let back = view.to_world(view.to_screen(world));
        assert!((back - world).length() < 1e-4);
        // Screen y grows downward
        assert!(view.to_screen(Vec3::new(0.0, 1.0, 0.0)).y < 300.0);
    }

    #[test]
    fn test_shade_by_depth() {
        let c = egui::Color32::from_rgb(200, 100, 50);
        assert_eq!(shade(c, 1.0), c);
        assert!((depth_factor(2.0, 2.0) - 1.0).abs() < 1e-6);
        assert!((depth_factor(-2.0, 2.0) - 0.6).abs() < 1e-6);
        assert!(shade(c, depth_factor(-2.0, 2.0)).r() < 200);
    }
}
