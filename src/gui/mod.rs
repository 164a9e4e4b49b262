use crate::launcher::{Launcher, Outcome, SystemExecutor};
use crate::plugin::Mode;
use crate::render::{Element, Icon, PageView, Renderer};
use crate::thumbnail::Thumbnail;
use eframe::egui;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const MAX_TEXTURES: usize = 512;
const LIST_ICON_SIZE: f32 = 50.0;
const WALLPAPER_ICON_SIZE: f32 = 60.0;

/// The state managers last reported, kept for drawing.
#[derive(Default)]
pub struct ViewModel {
    pub mode: Option<Mode>,
    pub page: PageView,
    pub status: String,
    /// Thumbnails that arrived after the page was built, by element key.
    late: HashMap<String, Arc<Thumbnail>>,
    textures: HashMap<String, egui::TextureHandle>,
}

impl ViewModel {
    fn thumbnail_for(&self, element: &Element) -> Option<Arc<Thumbnail>> {
        if let Some(thumb) = self.late.get(&element.key) {
            return Some(Arc::clone(thumb));
        }
        match &element.icon {
            Icon::Thumbnail(thumb) => Some(Arc::clone(thumb)),
            _ => None,
        }
    }

    fn texture(&mut self, ctx: &egui::Context, key: &str, thumb: &Thumbnail) -> egui::TextureHandle {
        if let Some(tex) = self.textures.get(key) {
            return tex.clone();
        }
        if self.textures.len() >= MAX_TEXTURES {
            self.textures.clear();
        }
        let size = [thumb.width as usize, thumb.height as usize];
        let tex = ctx.load_texture(
            key,
            egui::ColorImage::from_rgba_unmultiplied(size, &thumb.rgba),
            egui::TextureOptions::LINEAR,
        );
        self.textures.insert(key.to_string(), tex.clone());
        tex
    }
}

impl Renderer for ViewModel {
    fn render_page(&mut self, mode: Mode, page: PageView) {
        if self.mode != Some(mode) {
            self.textures.clear();
        }
        self.mode = Some(mode);
        self.late.clear();
        self.page = page;
    }

    fn highlight(&mut self, mode: Mode, selected: Option<usize>) {
        if self.mode == Some(mode) {
            self.page.selected = selected;
        }
    }

    fn set_status(&mut self, text: &str) {
        self.status = text.to_string();
    }

    fn thumbnail_ready(&mut self, key: &str, thumbnail: Arc<Thumbnail>) {
        if self.page.elements.iter().any(|e| e.key == key) {
            self.late.insert(key.to_string(), thumbnail);
        }
    }
}

fn mode_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Apps => "Apps",
        Mode::Emojis => "Emoji",
        Mode::Gifs => "GIFs",
        Mode::Files => "Files",
        Mode::Wallpapers => "Wallpapers",
    }
}

pub struct LauncherApp {
    launcher: Launcher,
    view: ViewModel,
    executor: SystemExecutor,
    query: String,
    close_at: Option<Instant>,
    focus_query: bool,
}

impl LauncherApp {
    pub fn new(mut launcher: Launcher) -> Self {
        let executor = SystemExecutor::new(launcher.settings());
        let mut view = ViewModel::default();
        launcher.start(&mut view);
        Self {
            launcher,
            view,
            executor,
            query: String::new(),
            close_at: None,
            focus_query: true,
        }
    }

    fn icon_size(&self) -> f32 {
        let settings = self.launcher.settings();
        match self.launcher.mode() {
            Mode::Emojis => settings.emoji_size as f32,
            Mode::Gifs => settings.gif_size as f32,
            Mode::Wallpapers => WALLPAPER_ICON_SIZE,
            Mode::Apps | Mode::Files => LIST_ICON_SIZE,
        }
    }

    fn handle_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Close { delay_ms } => {
                self.close_at = Some(Instant::now() + Duration::from_millis(delay_ms));
            }
            Outcome::Failed => self.view.status = "Action failed, see log".into(),
            Outcome::Ignored => {}
        }
    }

    fn switch_mode(&mut self, mode: Mode) {
        if self.launcher.switch_mode(mode, &mut self.view) {
            self.query = self.launcher.query().to_string();
            self.focus_query = true;
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
        if ctx.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::Tab))
            && self.launcher.accept_suggestion(&mut self.view)
        {
            self.query = self.launcher.query().to_string();
            self.focus_query = true;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowDown)) {
            self.launcher.select_next(&mut self.view);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowUp)) {
            self.launcher.select_prev(&mut self.view);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::PageDown)) {
            self.launcher.scroll_down(&mut self.view);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::PageUp)) {
            self.launcher.scroll_up(&mut self.view);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Enter)) {
            let outcome = self.launcher.activate_selected(&mut self.executor);
            self.handle_outcome(outcome);
        }
    }

    fn draw_element(
        &mut self,
        ui: &mut egui::Ui,
        element: &Element,
        vertical: bool,
    ) -> egui::Response {
        let size = self.icon_size();
        let selected = self.view.page.selected == Some(element.index);
        let fill = if selected {
            ui.visuals().selection.bg_fill
        } else {
            egui::Color32::TRANSPARENT
        };
        let thumb = self.view.thumbnail_for(element);
        let texture = thumb
            .as_ref()
            .map(|t| self.view.texture(ui.ctx(), &element.key, t));
        let inner = egui::Frame::none()
            .fill(fill)
            .rounding(4.0)
            .inner_margin(4.0)
            .show(ui, |ui| {
                let draw = |ui: &mut egui::Ui| {
                    match (&texture, &element.icon) {
                        (Some(tex), _) => {
                            ui.image((tex.id(), tex.size_vec2()));
                        }
                        (None, Icon::Glyph(glyph)) => {
                            ui.label(egui::RichText::new(glyph).size(size));
                        }
                        (None, Icon::Placeholder) | (None, Icon::Thumbnail(_)) => {
                            ui.add_sized([size, size], egui::Spinner::new());
                        }
                        (None, Icon::None) => {}
                    }
                    if vertical || element.icon == Icon::None {
                        ui.label(&element.label);
                    }
                };
                if vertical {
                    ui.horizontal(draw);
                } else {
                    ui.vertical(draw);
                }
            });
        let response = inner.response.interact(egui::Sense::click());
        if element.tooltip.is_empty() {
            response
        } else {
            response.on_hover_text(&element.tooltip)
        }
    }

    fn draw_page(&mut self, ui: &mut egui::Ui) -> Option<usize> {
        let elements = self.view.page.elements.clone();
        let mut clicked = None;
        match self.launcher.mode() {
            Mode::Apps | Mode::Files => {
                for element in &elements {
                    if self.draw_element(ui, element, true).clicked() {
                        clicked = Some(element.index);
                    }
                }
            }
            Mode::Emojis | Mode::Gifs | Mode::Wallpapers => {
                ui.horizontal_wrapped(|ui| {
                    for element in &elements {
                        if self.draw_element(ui, element, false).clicked() {
                            clicked = Some(element.index);
                        }
                    }
                });
            }
        }
        clicked
    }
}

impl eframe::App for LauncherApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        use egui::*;

        if let Some(at) = self.close_at {
            let now = Instant::now();
            if now >= at {
                ctx.send_viewport_cmd(ViewportCommand::Close);
                return;
            }
            ctx.request_repaint_after(at - now);
        }

        self.launcher.poll(&mut self.view);
        self.handle_keys(ctx);

        TopBottomPanel::top("search").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for mode in self.launcher.switchable_modes() {
                    if ui
                        .selectable_label(self.launcher.mode() == mode, mode_label(mode))
                        .clicked()
                    {
                        self.switch_mode(mode);
                    }
                }
            });
            let input = ui.add(
                TextEdit::singleline(&mut self.query)
                    .hint_text("Search...")
                    .desired_width(f32::INFINITY),
            );
            if self.focus_query {
                input.request_focus();
                self.focus_query = false;
            }
            if input.changed() {
                let query = self.query.clone();
                self.launcher.set_query(&query, &mut self.view);
            }
            if let Some(suggestion) = self.launcher.suggestion() {
                ui.weak(format!("Tab: {suggestion}"));
            }
        });

        TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.view.status);
                let page = &self.view.page;
                if page.page_count > 1 {
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.weak(format!("{}/{}", page.page_index + 1, page.page_count));
                    });
                }
            });
        });

        CentralPanel::default().show(ctx, |ui| {
            if ui.rect_contains_pointer(ui.max_rect()) {
                let delta = ctx.input(|i| i.raw_scroll_delta.y);
                if delta > 0.0 {
                    self.launcher.scroll_up(&mut self.view);
                } else if delta < 0.0 {
                    self.launcher.scroll_down(&mut self.view);
                }
            }
            if let Some(index) = self.draw_page(ui) {
                let outcome = self
                    .launcher
                    .activate_at(index, &mut self.view, &mut self.executor);
                self.handle_outcome(outcome);
            }
        });

        ctx.request_repaint_after(POLL_INTERVAL);
    }
}
