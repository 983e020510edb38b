use std::path::{Path, PathBuf};

use box_annotator::config::SUPPORTED_IMAGE_EXTENSIONS;
use box_annotator::{export_bundle, menu_layout, AnnotationCanvas, Config, Point, PointerHandler, Rect};
use eframe::egui;
use image::RgbImage;

// ── State ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
enum Page {
    MainMenu,
    Image,
}

#[derive(Clone, Debug)]
enum Status {
    Info(String),
    Error(String),
}

/// Everything tied to one opened image. Replaced as a whole on every load.
struct LoadedImage {
    path: PathBuf,
    pixels: RgbImage,
    texture: egui::TextureHandle,
    canvas: AnnotationCanvas,
}

pub struct AnnotatorApp {
    config: Config,
    page: Page,
    loaded: Option<LoadedImage>,
    draw_mode: bool,
    status: Option<Status>,
    show_manual_notice: bool,
}

impl AnnotatorApp {
    pub fn new(ctx: &egui::Context, config: Config) -> Self {
        let mut app = Self {
            page: Page::MainMenu,
            loaded: None,
            draw_mode: true,
            status: None,
            show_manual_notice: false,
            config,
        };
        if let Some(path) = app.config.initial_image.clone() {
            app.page = Page::Image;
            app.load_image(ctx, &path);
        }
        app
    }

    fn info(&mut self, msg: String) {
        log::info!("{msg}");
        self.status = Some(Status::Info(msg));
    }

    fn error(&mut self, msg: String) {
        log::error!("{msg}");
        self.status = Some(Status::Error(msg));
    }

    /// Decodes `path` and swaps it in together with an empty box list. On
    /// failure the current image and its boxes stay as they were.
    fn load_image(&mut self, ctx: &egui::Context, path: &Path) {
        let pixels = match image::open(path) {
            Ok(img) => img.to_rgb8(),
            Err(e) => {
                self.error(format!("Could not open {}: {e}", path.display()));
                return;
            }
        };
        let size = [pixels.width() as usize, pixels.height() as usize];
        let color_image = egui::ColorImage::from_rgb(size, pixels.as_raw());
        let texture = ctx.load_texture("image", color_image, egui::TextureOptions::LINEAR);

        let mut canvas = AnnotationCanvas::new(pixels.dimensions());
        canvas.toggle(self.draw_mode);
        self.loaded = Some(LoadedImage {
            path: path.to_path_buf(),
            pixels,
            texture,
            canvas,
        });
        self.info(format!(
            "Opened {} ({}x{})",
            path.display(),
            size[0],
            size[1]
        ));
    }

    fn open_dialog(&mut self, ctx: &egui::Context) {
        let picked = rfd::FileDialog::new()
            .add_filter("Images", &SUPPORTED_IMAGE_EXTENSIONS)
            .pick_file();
        if let Some(path) = picked {
            self.load_image(ctx, &path);
        }
    }

    fn set_draw_mode(&mut self, active: bool) {
        self.draw_mode = active;
        if let Some(loaded) = &mut self.loaded {
            loaded.canvas.toggle(active);
        }
    }

    fn delete_last(&mut self) {
        if let Some(loaded) = &mut self.loaded {
            loaded.canvas.delete_last();
        }
    }

    fn export(&mut self) {
        let now = chrono::Local::now();
        let result = match &self.loaded {
            Some(loaded) => {
                let records = loaded.canvas.export_records();
                export_bundle(
                    &self.config,
                    Some((&loaded.path, &loaded.pixels)),
                    &records,
                    now,
                )
                .map(|bundle| (bundle, records.len()))
            }
            None => export_bundle(&self.config, None, &[], now).map(|b| (b, 0)),
        };
        match result {
            Ok((bundle, n)) => {
                self.info(format!("Exported {n} boxes to {}", bundle.csv_path.display()))
            }
            Err(e) => self.error(format!("Export failed: {e}")),
        }
    }

    // ── Pages ───────────────────────────────────────────────────────────────

    fn main_menu_ui(&mut self, ui: &mut egui::Ui) {
        let page = ui.max_rect();
        let layout = menu_layout(page.width() as i32, page.height() as i32);
        let labels = ["Image", "Manual entry"];

        for (i, (b, label)) in layout.buttons.iter().zip(labels).enumerate() {
            let rect = egui::Rect::from_min_size(
                page.min + egui::vec2(b.x as f32, b.y as f32),
                egui::vec2(b.width as f32, b.height as f32),
            );
            let text = egui::RichText::new(label).size(layout.font_size as f32);
            if ui.put(rect, egui::Button::new(text)).clicked() {
                match i {
                    0 => self.page = Page::Image,
                    _ => self.show_manual_notice = true,
                }
            }
        }
    }

    fn manual_notice(&mut self, ctx: &egui::Context) {
        if !self.show_manual_notice {
            return;
        }
        egui::Window::new("Notice")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label("Manual entry is not available yet.");
                if ui.button("OK").clicked() {
                    self.show_manual_notice = false;
                }
            });
    }

    fn toolbar_ui(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.horizontal(|ui| {
            if ui.button("Menu").clicked() {
                self.page = Page::MainMenu;
            }
            ui.separator();
            if ui.button("Open image...").clicked() {
                self.open_dialog(ctx);
            }
            let mut draw = self.draw_mode;
            if ui.toggle_value(&mut draw, "Draw boxes").changed() {
                self.set_draw_mode(draw);
            }
            if ui.button("Undo box").clicked() {
                self.delete_last();
            }
            if ui.button("Export").clicked() {
                self.export();
            }
            ui.separator();
            if let Some(loaded) = &self.loaded {
                let (w, h) = loaded.pixels.dimensions();
                ui.label(format!("{w}x{h}, {} boxes", loaded.canvas.rects().len()));
            }
        });
    }

    fn canvas_ui(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let canvas = response.rect;
        painter.rect_filled(canvas, 0.0, egui::Color32::from_gray(40));

        let Some(loaded) = self.loaded.as_mut() else {
            painter.text(
                canvas.center(),
                egui::Align2::CENTER_CENTER,
                "Open an image to start",
                egui::FontId::proportional(18.0),
                egui::Color32::GRAY,
            );
            return;
        };

        let display = (canvas.width() as i32, canvas.height() as i32);
        let Some(mapper) = loaded.canvas.resize(display) else {
            return;
        };

        let to_screen = |p: Point| canvas.min + egui::vec2(p.x as f32, p.y as f32);
        let to_local = |pos: egui::Pos2| {
            let v = pos - canvas.min;
            Point::new(v.x.round() as i32, v.y.round() as i32)
        };
        let screen_rect = |r: Rect| egui::Rect::from_min_max(to_screen(r.min()), to_screen(r.max()));

        painter.image(
            loaded.texture.id(),
            screen_rect(mapper.image_rect()),
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        let committed = egui::Color32::from_rgb(0, 200, 80);
        for (i, r) in loaded.canvas.rects().rects().iter().enumerate() {
            let rect = screen_rect(*r);
            painter.rect_stroke(
                rect,
                0.0,
                egui::Stroke::new(2.0, committed),
                egui::StrokeKind::Middle,
            );
            painter.text(
                rect.left_top() + egui::vec2(3.0, 2.0),
                egui::Align2::LEFT_TOP,
                format!("{}", i + 1),
                egui::FontId::proportional(14.0),
                committed,
            );
        }
        if let Some(r) = loaded.canvas.rects().preview() {
            painter.rect_stroke(
                screen_rect(r),
                0.0,
                egui::Stroke::new(2.0, egui::Color32::RED),
                egui::StrokeKind::Middle,
            );
        }

        // The drag only registers once the pointer has travelled a few
        // pixels; the box starts where the button went down.
        if response.drag_started_by(egui::PointerButton::Primary) {
            if let Some(pos) = ctx
                .input(|i| i.pointer.press_origin())
                .or(response.interact_pointer_pos())
            {
                loaded.canvas.on_pointer_down(to_local(pos));
            }
        }
        if response.dragged_by(egui::PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                loaded.canvas.on_pointer_move(to_local(pos));
            }
        }
        if response.drag_stopped_by(egui::PointerButton::Primary) {
            if let Some(pos) = response
                .interact_pointer_pos()
                .or(ctx.input(|i| i.pointer.latest_pos()))
            {
                loaded.canvas.on_pointer_up(to_local(pos));
            }
        }
    }

    fn status_ui(&self, ui: &mut egui::Ui) {
        match &self.status {
            Some(Status::Info(msg)) => {
                ui.label(msg);
            }
            Some(Status::Error(msg)) => {
                ui.colored_label(egui::Color32::from_rgb(230, 80, 80), msg);
            }
            None => {
                ui.weak("Drag on the image to draw a box. Ctrl+Z removes the last one.");
            }
        }
    }
}

// ── eframe App impl ────────────────────────────────────────────────────────

impl eframe::App for AnnotatorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.page == Page::MainMenu {
            egui::CentralPanel::default().show(ctx, |ui| self.main_menu_ui(ui));
            self.manual_notice(ctx);
            return;
        }

        let (undo, cancel) = ctx.input(|i| {
            (
                i.modifiers.command && i.key_pressed(egui::Key::Z),
                i.key_pressed(egui::Key::Escape),
            )
        });
        if undo {
            self.delete_last();
        }
        if cancel {
            self.set_draw_mode(false);
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar_ui(ui, ctx));
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| self.status_ui(ui));
        egui::CentralPanel::default()
            .frame(egui::Frame::default())
            .show(ctx, |ui| self.canvas_ui(ui, ctx));
    }
}
