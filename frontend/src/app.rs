use std::time::{Duration, Instant};

use egui::{Color32, Pos2, Rect, Stroke, Vec2};
use gridpath::{
    grid::MAX_RANDOM_WEIGHT, Canvas, CellRole, Config, PathFinderState, Point, Preset, RunState,
    Session, WeightMode,
};
use log::{debug, info, warn};

pub struct App {
    settings: Settings,
    session: Session,
    /// Roles of all cells, updated from the search events
    canvas: Canvas,
    last_tick: Option<Instant>,
    /// Wall state written by the current pointer stroke, fixed when the stroke starts
    paint_mode: Option<bool>,
    hovered: Option<Point>,
    message: Option<String>,
}

/// We derive Deserialize/Serialize so we can persist the settings on shutdown.
/// The grid itself is never stored.
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
struct Settings {
    preset: Preset,
    config: Config,
    draw_grid_lines: bool,
    shade_weights: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preset: Preset::Unweighted,
            config: Preset::Unweighted.config(),
            draw_grid_lines: true,
            shade_weights: true,
        }
    }
}

impl App {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Load previous settings (if any).
        // Note that you must enable the `persistence` feature for this to work.
        let settings: Settings = if let Some(storage) = cc.storage {
            eframe::get_value(storage, eframe::APP_KEY).unwrap_or_default()
        } else {
            Default::default()
        };

        let session = Session::new(settings.config.clone()).unwrap_or_else(|err| {
            warn!("stored settings are not usable ({}), using defaults", err);
            Session::default()
        });

        let mut app = App {
            settings,
            canvas: Canvas::for_grid(session.grid()),
            session,
            last_tick: None,
            paint_mode: None,
            hovered: None,
            message: None,
        };
        app.sync();
        app
    }

    /// Repaints the whole canvas from the session
    fn redraw(&mut self) {
        self.canvas = Canvas::for_grid(self.session.grid());
        self.session.render_all(&mut self.canvas);
    }

    /// Takes over the session configuration after a successful edit
    fn sync(&mut self) {
        self.settings.config = self.session.config().clone();
        self.redraw();
    }

    fn report<T>(&mut self, result: gridpath::Result<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.message = None;
                Some(value)
            }
            Err(err) => {
                debug!("rejected: {}", err);
                self.message = Some(err.to_string());
                None
            }
        }
    }

    fn apply_config(&mut self, config: Config) {
        let result = self.session.reconfigure(config);
        if self.report(result).is_some() {
            info!(
                "grid is {}x{}, heuristic weight {}",
                self.session.grid().columns(),
                self.session.grid().rows(),
                self.session.config().heuristic_weight
            );
            self.sync();
        }
    }

    fn tick(&mut self, ctx: &egui::Context) {
        if !self.session.is_running() {
            self.last_tick = None;
            return;
        }

        let now = Instant::now();
        let elapsed = self.last_tick.map_or(Duration::ZERO, |last| now - last);
        self.last_tick = Some(now);

        self.session.advance(elapsed, &mut self.canvas);
        if self.session.is_running() {
            ctx.request_repaint_after(self.session.config().step_interval());
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        let running = self.session.is_running();

        ui.horizontal(|ui| {
            let label = match self.session.run_state() {
                RunState::Running => "Pause",
                RunState::Paused => "Resume",
                RunState::Idle | RunState::Finished => "Start",
            };
            if ui.button(label).clicked() {
                self.session.start_pause();
                self.redraw();
            }
            if ui.add_enabled(!running, egui::Button::new("Step")).clicked() {
                let result = self.session.step_once(&mut self.canvas);
                self.report(result);
            }
            if ui.button("Finish").clicked() {
                self.session.finish(&mut self.canvas);
            }
        });
        ui.horizontal(|ui| {
            if ui.add_enabled(!running, egui::Button::new("Reset")).clicked() {
                let result = self.session.reset();
                if self.report(result).is_some() {
                    self.redraw();
                }
            }
            if ui
                .add_enabled(!running, egui::Button::new("Clear walls"))
                .clicked()
            {
                let result = self.session.clear_walls();
                if self.report(result).is_some() {
                    self.redraw();
                }
            }
        });

        ui.separator();

        let mut config = self.settings.config.clone();
        ui.add_enabled_ui(!running, |ui| {
            egui::ComboBox::from_label("Preset")
                .selected_text(self.settings.preset.to_string())
                .show_ui(ui, |ui| {
                    for preset in Preset::ALL {
                        let selected = self.settings.preset == preset;
                        if ui.selectable_label(selected, preset.to_string()).clicked() {
                            self.settings.preset = preset;
                            config = preset.config();
                        }
                    }
                });

            ui.horizontal(|ui| {
                ui.add(
                    egui::DragValue::new(&mut config.columns)
                        .clamp_range(1..=200)
                        .prefix("columns: "),
                );
                ui.add(
                    egui::DragValue::new(&mut config.rows)
                        .clamp_range(1..=200)
                        .prefix("rows: "),
                );
            });
            ui.add(
                egui::Slider::new(&mut config.heuristic_weight, 1.0..=5.0)
                    .text("heuristic weight"),
            );

            let mut random = config.weights.is_random();
            if ui.checkbox(&mut random, "Random weights").changed() {
                config.weights = if random {
                    WeightMode::Random { seed: None }
                } else {
                    WeightMode::default()
                };
            }
            if let WeightMode::Random { seed } = &mut config.weights {
                ui.horizontal(|ui| {
                    let mut fixed = seed.is_some();
                    if ui.checkbox(&mut fixed, "Fixed seed").changed() {
                        *seed = fixed.then_some(0);
                    }
                    if let Some(seed) = seed {
                        ui.add(egui::DragValue::new(seed));
                    }
                });
            }
        });
        ui.add(
            egui::Slider::new(&mut config.step_interval_ms, 0..=200).text("step interval (ms)"),
        );

        if config != self.settings.config {
            self.apply_config(config);
        }

        ui.separator();
        ui.checkbox(&mut self.settings.draw_grid_lines, "Draw grid lines");
        ui.checkbox(&mut self.settings.shade_weights, "Shade weights");
    }

    fn status(&self, ui: &mut egui::Ui) {
        let finder = self.session.finder();

        ui.label(format!(
            "{:?}, search {:?}",
            self.session.run_state(),
            finder.state()
        ));
        ui.label(format!(
            "steps: {}  visited: {}  frontier: {}",
            finder.steps(),
            finder.visited_len(),
            finder.frontier_len()
        ));
        match (finder.state(), finder.result()) {
            (PathFinderState::PathFound, Some(result)) => {
                ui.label(format!(
                    "path: {} cells, cost {:.2}",
                    result.len(),
                    result.total_cost
                ));
            }
            (PathFinderState::Exhausted, _) => {
                ui.label("no path");
            }
            _ => {}
        }

        if let Some(point) = self.hovered {
            let grid = self.session.grid();
            let weight = grid.weight(point).unwrap_or_default();
            ui.label(format!("cell {} weight {:.2}", point, weight));
            if let Some(record) = finder.record(point) {
                ui.label(format!(
                    "g={:.2} h={:.2} f={:.2}",
                    record.cost_from_start, record.heuristic, record.priority
                ));
            }
        }

        if let Some(message) = &self.message {
            ui.colored_label(Color32::RED, message);
        }
    }

    fn grid_view(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());

        let grid = self.session.grid();
        let layout = CellLayout::fit(response.rect, grid.rows(), grid.columns());

        for point in grid.points() {
            let role = self.canvas.role(point).unwrap_or(CellRole::Empty);
            let weight = grid.weight(point).unwrap_or(1.0);
            let rect = layout.rect(point);

            painter.rect_filled(
                rect,
                0.0,
                role_color(role, weight, self.settings.shade_weights),
            );
            if self.settings.draw_grid_lines {
                painter.rect_stroke(rect, 0.0, Stroke::new(0.5, Color32::GRAY));
            }
        }

        self.hovered = response.hover_pos().and_then(|pos| layout.point_at(pos));

        let modifiers = ui.input(|i| i.modifiers);
        let pointer = response
            .interact_pointer_pos()
            .and_then(|pos| layout.point_at(pos));

        if modifiers.shift || modifiers.command {
            if let (true, Some(point)) = (response.clicked(), pointer) {
                let result = if modifiers.shift {
                    self.session.set_goal(point)
                } else {
                    self.session.set_start(point)
                };
                if self.report(result).is_some() {
                    self.sync();
                }
            }
        } else if response.is_pointer_button_down_on() {
            if let Some(point) = pointer {
                let session = &self.session;
                let blocked = *self
                    .paint_mode
                    .get_or_insert_with(|| !session.grid().is_blocked(point).unwrap_or(false));

                let result = self.session.paint(point, blocked);
                if self.report(result).is_some() {
                    self.redraw();
                }
            }
        } else {
            self.paint_mode = None;
        }
    }
}

impl eframe::App for App {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.settings);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.tick(ctx);

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.add_space(16.0);

                egui::widgets::global_dark_light_mode_buttons(ui);
            });
        });

        egui::SidePanel::left("side_panel").show(ctx, |ui| {
            ui.heading("A* search");
            self.controls(ui);
            ui.separator();
            self.status(ui);

            ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
                ui.label("drag to paint walls, shift-click sets the goal, ctrl-click the start");
                egui::warn_if_debug_build(ui);
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.grid_view(ui);
        });
    }
}

/// Places square cells in the largest square area that fits the available space
#[derive(Debug, Clone, Copy)]
struct CellLayout {
    origin: Pos2,
    size: f32,
    rows: usize,
    columns: usize,
}

impl CellLayout {
    fn fit(rect: Rect, rows: usize, columns: usize) -> Self {
        let size = (rect.width() / columns.max(1) as f32).min(rect.height() / rows.max(1) as f32);
        Self {
            origin: rect.min,
            size: size.max(1.0),
            rows,
            columns,
        }
    }

    fn rect(&self, point: Point) -> Rect {
        Rect::from_min_size(
            self.origin + Vec2::new(point.col as f32, point.row as f32) * self.size,
            Vec2::splat(self.size),
        )
    }

    fn point_at(&self, pos: Pos2) -> Option<Point> {
        let local = (pos - self.origin) / self.size;
        if local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let point = Point::new(local.x as usize, local.y as usize);
        (point.col < self.columns && point.row < self.rows).then_some(point)
    }
}

fn role_color(role: CellRole, weight: f64, shade_weights: bool) -> Color32 {
    match role {
        CellRole::Start => Color32::BLUE,
        CellRole::Goal => Color32::RED,
        CellRole::Wall => Color32::BLACK,
        CellRole::Frontier => Color32::LIGHT_BLUE,
        CellRole::Visited => Color32::from_rgb(255, 165, 0),
        CellRole::Path => Color32::from_rgb(0, 255, 0),
        CellRole::Empty if shade_weights => {
            // heavier cells are darker
            let t = (weight / MAX_RANDOM_WEIGHT).clamp(0.0, 1.0);
            Color32::from_gray(255 - (t * 150.0) as u8)
        }
        CellRole::Empty => Color32::WHITE,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_point_at() {
        let rect = Rect::from_min_size(Pos2::new(10.0, 20.0), Vec2::new(300.0, 100.0));
        let layout = CellLayout::fit(rect, 5, 10);
        // limited by the height
        assert_eq!(layout.size, 20.0);

        assert_eq!(layout.point_at(Pos2::new(10.0, 20.0)), Some(Point::new(0, 0)));
        assert_eq!(layout.point_at(Pos2::new(55.0, 61.0)), Some(Point::new(2, 2)));
        assert_eq!(layout.point_at(Pos2::new(209.0, 119.0)), Some(Point::new(9, 4)));
        assert_eq!(layout.point_at(Pos2::new(211.0, 50.0)), None);
        assert_eq!(layout.point_at(Pos2::new(5.0, 50.0)), None);

        let rect = layout.rect(Point::new(2, 1));
        assert_eq!(rect.min, Pos2::new(50.0, 40.0));
        assert_eq!(rect.max, Pos2::new(70.0, 60.0));
    }

    #[test]
    fn test_role_color() {
        assert_eq!(role_color(CellRole::Wall, 1.0, true), Color32::BLACK);
        assert_eq!(role_color(CellRole::Empty, 9.0, false), Color32::WHITE);

        let light = role_color(CellRole::Empty, 1.0, true);
        let dark = role_color(CellRole::Empty, 9.0, true);
        assert!(dark.r() < light.r());
    }
}
