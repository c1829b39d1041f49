//! Interactive overlap separation viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a [`Separator`] over the
//! standalone [`ForceSim`] and implements [`eframe::App`] to render and
//! control the layout through an egui UI.

use std::collections::HashSet;

use eframe::App;
use glam::Vec2;
use rand::rng;
use sep_core::{ForceSim, Host, Node, NodeId, Separator, Shape, TickReport, Traversal};

/// Main application state for the interactive viewer.
///
/// [`Viewer`] glues together:
/// - The layout: a [`Separator`] driving a [`ForceSim`].
/// - UI configuration (pan/zoom, spawning, timing).
/// - eframe/egui callbacks for drawing and user interaction.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input.
/// 2. If `running` is `true` and enough time has passed, call [`Viewer::step_once`].
/// 3. Render the nodes, their homes and the tethers between them.
///
/// ### Fields
/// - `sep` - Separation force and the simulation it is attached to.
/// - `rng` - Random number generator used for scattering nodes.
///
/// - `scatter_count` - Number of nodes created by [`Viewer::reset`].
/// - `scatter_half_range` - Half side of the square homes are scattered in.
/// - `spawn_size` - Size of nodes added by clicking.
/// - `show_homes` - Whether homes and tethers are drawn.
///
/// - `running` - Whether the simulation is currently auto-advancing.
/// - `zoom` - Zoom factor for world-to-screen coordinate mapping.
/// - `pan` - Screen-space pan offset in pixels.
///
/// - `last_report` - Report of the last separation tick (for highlighting).
///
/// - `step_interval` - Target time step between automatic simulation steps (seconds).
/// - `last_step_time` - Time stamp of the last step (egui time).
/// - `last_step_dt` - Actual time delta between the last two steps (for display only).
pub struct Viewer {
    sep: Separator,
    rng: rand::rngs::ThreadRng,

    scatter_count: usize,
    scatter_half_range: f32,
    spawn_size: Vec2,
    show_homes: bool,

    running: bool,
    zoom: f32,
    pan: egui::Vec2,

    last_report: Option<TickReport>,

    step_interval: f64,
    last_step_time: f64,
    last_step_dt: f64,
}

impl Viewer {
    /// Creates a new viewer with a random cloud of overlapping labels.
    ///
    /// The default setup is:
    /// - [`Separator::standalone`] with its default configuration.
    /// - 40 label-sized nodes scattered around the origin, each starting at
    ///   its home position.
    ///
    /// The camera starts with a moderate zoom and no pan.
    ///
    /// ### Returns
    /// A fully-initialized [`Viewer`] ready to be passed to `eframe::run_native`.
    pub fn new() -> Self {
        let mut viewer = Self {
            sep: Separator::standalone(),
            rng: rng(),
            scatter_count: 40,
            scatter_half_range: 60.0,
            spawn_size: Vec2::new(30.0, 12.0),
            show_homes: true,
            running: false,
            zoom: 3.0,
            pan: egui::vec2(0.0, 0.0),
            last_report: None,
            step_interval: 0.02,
            last_step_time: 0.0,
            last_step_dt: 0.0,
        };
        viewer.reset();
        viewer
    }

    /// Scatters a fresh set of nodes and reheats the simulation.
    ///
    /// This keeps the separation configuration and camera settings, but:
    /// - Replaces the nodes with `scatter_count` random label boxes.
    /// - Restarts the simulation alpha.
    /// - Clears `last_report` and stops auto-running.
    fn reset(&mut self) {
        let nodes = (0..self.scatter_count)
            .map(|_| {
                Node::random_in_square(
                    self.scatter_half_range,
                    Vec2::new(15.0, 6.0),
                    Vec2::new(45.0, 14.0),
                    &mut self.rng,
                )
            })
            .collect();
        let host = self.sep.host_mut();
        host.set_nodes(nodes);
        host.start();
        self.last_report = None;
        self.running = false;
    }

    /// Removes every node and stops the simulation.
    ///
    /// This is mainly useful as a “blank canvas” for manual spawning.
    fn clear(&mut self) {
        let host = self.sep.host_mut();
        host.clear();
        host.stop();
        self.last_report = None;
    }

    /// Advances the simulation by a single tick.
    ///
    /// The host integrates its own forces first, then the separation pass
    /// pulls nodes home and pushes overlapping pairs apart. The tick report
    /// is kept in `last_report` so corrected nodes can be highlighted. Once
    /// the simulation has cooled down, auto-running stops.
    fn step_once(&mut self) {
        match self.sep.tick() {
            Some(report) => self.last_report = Some(report),
            None => {
                self.last_report = None;
                self.running = false;
            }
        }
    }

    /// Ids of nodes pushed during the last tick.
    fn corrected_nodes(&self) -> HashSet<NodeId> {
        self.last_report
            .iter()
            .flat_map(|r| r.corrected.iter().flat_map(|&(a, b)| [a, b]))
            .collect()
    }

    /// Converts a world-space position to screen-space.
    ///
    /// World coordinates are scaled by `zoom`, offset by `pan`, and then
    /// centered inside the given `rect`. The y-axis is flipped so that
    /// positive y goes up in world space.
    ///
    /// ### Parameters
    /// - `p` - World-space position.
    /// - `rect` - Screen-space rectangle representing the drawing area.
    ///
    /// ### Returns
    /// The corresponding egui position in screen-space.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        egui::pos2(
            center.x + p.x * self.zoom + self.pan.x,
            center.y - p.y * self.zoom + self.pan.y,
        )
    }

    /// Converts a screen-space position back to world-space.
    ///
    /// This is the inverse of [`Viewer::world_to_screen`] (up to floating
    /// point rounding), using the same `zoom`, `pan`, and `rect` center.
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let center = rect.center();
        let x = (p.x - center.x - self.pan.x) / self.zoom;
        let y = (center.y - p.y + self.pan.y) / self.zoom;
        Vec2::new(x, y)
    }

    /// Outline of a node in screen-space, following the configured shape.
    fn outline(&self, node: &Node, shape: Shape, rect: egui::Rect) -> Vec<egui::Pos2> {
        let h = node.half_extents();
        match shape {
            Shape::Rectangle => [
                Vec2::new(-h.x, -h.y),
                Vec2::new(h.x, -h.y),
                Vec2::new(h.x, h.y),
                Vec2::new(-h.x, h.y),
            ]
            .iter()
            .map(|&off| self.world_to_screen(node.pos + off, rect))
            .collect(),

            Shape::Ellipse => {
                use std::f32::consts::TAU;
                let segments = 48;
                (0..segments)
                    .map(|i| {
                        let t = (i as f32) / (segments as f32) * TAU;
                        let local = Vec2::new(t.cos() * h.x, t.sin() * h.y);
                        self.world_to_screen(node.pos + local, rect)
                    })
                    .collect()
            }
        }
    }

    /// Helper to draw a labeled `f32` [`egui::DragValue`].
    ///
    /// ### Returns
    /// `true` if the value was changed this frame.
    fn labeled_drag_f32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f32,
        range: std::ops::RangeInclusive<f32>,
        speed: f64,
    ) -> bool {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed))
                .changed()
        })
        .inner
    }

    /// Builds the top panel UI (run controls, stepping, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                    if self.running && !self.sep.host().is_running() {
                        self.sep.host_mut().start();
                    }
                }

                ui.add(
                    egui::DragValue::new(&mut self.step_interval)
                        .prefix("dt target = ")
                        .range(0.0..=1.0)
                        .speed(0.01),
                );

                if ui.button("Step").clicked() {
                    let now = ctx.input(|i| i.time);
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = now - self.last_step_time;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                if ui.button("Reheat").clicked() {
                    self.sep.host_mut().start();
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                if ui.button("Clear").clicked() {
                    self.clear();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 0.1..=10.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (timing, alpha, node and pair counts).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("dt target = {:.3} s", self.step_interval));
                ui.label(format!("dt last = {:.3} s", self.last_step_dt));
                ui.separator();
                ui.label(format!("alpha = {:.4}", self.sep.host().alpha()));
                ui.label(format!("nodes = {}", self.sep.nodes().len()));
                if let Some(report) = &self.last_report {
                    ui.label(format!(
                        "pairs tested = {}, corrected = {}",
                        report.tested,
                        report.corrected_pairs().len()
                    ));
                }
            });
        });
    }

    /// Builds the right-hand configuration panel for the separation knobs.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Separation");

                ui.separator();
                let mut padding = self.sep.padding();
                if Self::labeled_drag_f32(ui, "padding:", &mut padding, 0.0..=50.0, 0.2)
                    && let Err(err) = self.sep.set_padding(padding)
                {
                    tracing::warn!(%err, "padding rejected");
                }

                let mut stickyness = self.sep.stickyness();
                if Self::labeled_drag_f32(ui, "stickyness:", &mut stickyness, 0.0..=1.0, 0.005)
                    && let Err(err) = self.sep.set_stickyness(stickyness)
                {
                    tracing::warn!(%err, "stickyness rejected");
                }

                let mut conformity = self.sep.conformity();
                if ui
                    .add(egui::Slider::new(&mut conformity, 0.0..=1.0).text("conformity"))
                    .changed()
                    && let Err(err) = self.sep.set_conformity(conformity)
                {
                    tracing::warn!(%err, "conformity rejected");
                }

                ui.separator();
                let mut shape = self.sep.shape();
                egui::ComboBox::from_label("shape")
                    .selected_text(shape.name())
                    .show_ui(ui, |ui| {
                        for s in Shape::ALL {
                            ui.selectable_value(&mut shape, s, s.name());
                        }
                    });
                self.sep.set_shape(shape);

                let mut traversal = self.sep.traversal();
                egui::ComboBox::from_label("traversal")
                    .selected_text(traversal.name())
                    .show_ui(ui, |ui| {
                        for t in Traversal::ALL {
                            ui.selectable_value(&mut traversal, t, t.name());
                        }
                    });
                self.sep.set_traversal(traversal);

                ui.separator();
                ui.label("Simulation");
                Self::labeled_drag_f32(
                    ui,
                    "friction:",
                    &mut self.sep.host_mut().friction,
                    0.0..=1.0,
                    0.01,
                );

                ui.separator();
                ui.label("Spawning");
                ui.horizontal(|ui| {
                    ui.label("scatter count:");
                    ui.add(egui::DragValue::new(&mut self.scatter_count).range(1..=500));
                });
                Self::labeled_drag_f32(
                    ui,
                    "scatter half range:",
                    &mut self.scatter_half_range,
                    1.0..=1000.0,
                    1.0,
                );
                Self::labeled_drag_f32(ui, "click w:", &mut self.spawn_size.x, 1.0..=200.0, 0.5);
                Self::labeled_drag_f32(ui, "click h:", &mut self.spawn_size.y, 1.0..=200.0, 0.5);

                ui.separator();
                ui.checkbox(&mut self.show_homes, "Show homes");
                if ui.button("Reset config to default").clicked()
                    && let Err(err) = self.sep.set_config(Default::default())
                {
                    tracing::warn!(%err, "default config rejected");
                }
            });
    }

    /// Builds the central panel where nodes are drawn and interacted with.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Pan with drag.
            if response.dragged() {
                self.pan += response.drag_delta();
            }

            let hover_world = response.hover_pos().map(|p| self.screen_to_world(p, rect));

            // Click adds a node whose home is the clicked position.
            if response.clicked()
                && let Some(center) = hover_world
            {
                let host = self.sep.host_mut();
                host.add_node(Node::new(center, self.spawn_size));
                if !host.is_running() {
                    host.start();
                }
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                let world_before = self.screen_to_world(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(0.1, 10.0);

                let screen_after = self.world_to_screen(world_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            let shape = self.sep.shape();
            let corrected = self.corrected_nodes();

            // Homes and the tethers pulling nodes back to them.
            if self.show_homes {
                for node in self.sep.nodes() {
                    let home = self.world_to_screen(node.home, rect);
                    let pos = self.world_to_screen(node.pos, rect);
                    painter.line_segment([home, pos], egui::Stroke::new(1.0, egui::Color32::GRAY));
                    painter.circle_filled(home, 2.0, egui::Color32::LIGHT_GREEN);
                }
            }

            // Node outlines (pushed during the last tick in red).
            for (i, node) in self.sep.nodes().iter().enumerate() {
                let color = if corrected.contains(&i) {
                    egui::Color32::LIGHT_RED
                } else {
                    egui::Color32::LIGHT_BLUE
                };
                let pts = self.outline(node, shape, rect);
                painter.add(egui::Shape::closed_line(pts, egui::Stroke::new(1.5, color)));
            }

            // Preview of the node a click would add.
            if let Some(center) = hover_world {
                let preview = Node::new(center, self.spawn_size);
                let pts = self.outline(&preview, shape, rect);
                painter.add(egui::Shape::closed_line(
                    pts,
                    egui::Stroke::new(1.0, egui::Color32::YELLOW),
                ));
            }

            // Auto-run simulation if requested.
            if self.running {
                let now = ctx.input(|i| i.time);
                let elapsed = now - self.last_step_time;
                if elapsed >= self.step_interval {
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = elapsed;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                ctx.request_repaint();
            }
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}
