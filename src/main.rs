use eframe::egui;
use egui::{Color32, CornerRadius, RichText, ScrollArea, Stroke, Ui, ViewportBuilder};
use std::collections::{HashMap, HashSet};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

mod db;
mod giphy_client;
mod lightbox;
mod models;

use crate::db::{Database, FavoriteGif};
use crate::giphy_client::GiphyClient;
use crate::lightbox::Lightbox;
use crate::models::GifImage;

fn main() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_inner_size([720.0, 600.0])
            .with_min_inner_size([520.0, 480.0])
            .with_title("GIF Lightbox"),
        ..Default::default()
    };

    eframe::run_native(
        "GIF Lightbox",
        options,
        Box::new(|cc| {
            let mut app = GifLightboxApp::new();

            if let Some(storage) = cc.storage {
                // Try to load saved theme preference
                if let Some(theme_str) = storage.get_string("is_dark_mode") {
                    if let Ok(is_dark_mode) = theme_str.parse::<bool>() {
                        app.is_dark_mode = is_dark_mode;
                        app.theme = if is_dark_mode {
                            AppTheme::dark()
                        } else {
                            AppTheme::light()
                        };
                    }
                }
            }

            Ok(Box::new(app))
        }),
    )
}

struct AppTheme {
    background: Color32,
    card_background: Color32,
    text: Color32,
    secondary_text: Color32,
    highlight: Color32,
    accent: Color32,
    separator: Color32,
    button_background: Color32,
    button_foreground: Color32,
    button_active_background: Color32,
    button_hover_background: Color32,
}

impl AppTheme {
    fn dark() -> Self {
        Self {
            background: Color32::from_rgb(16, 16, 20),
            card_background: Color32::from_rgb(28, 28, 34),
            text: Color32::from_rgb(240, 240, 240),
            secondary_text: Color32::from_rgb(175, 175, 185),
            highlight: Color32::from_rgb(140, 110, 255), // Giphy purple
            accent: Color32::from_rgb(230, 70, 182),     // Giphy pink
            separator: Color32::from_rgb(58, 58, 66),
            button_background: Color32::from_rgb(52, 52, 60),
            button_foreground: Color32::from_rgb(240, 240, 240),
            button_active_background: Color32::from_rgb(110, 87, 243),
            button_hover_background: Color32::from_rgb(72, 72, 84),
        }
    }

    fn light() -> Self {
        Self {
            background: Color32::from_rgb(246, 246, 248),
            card_background: Color32::from_rgb(255, 255, 255),
            text: Color32::from_rgb(22, 22, 26),
            secondary_text: Color32::from_rgb(92, 92, 104),    // Darker for better contrast
            highlight: Color32::from_rgb(86, 58, 214),         // Darker purple for better contrast
            accent: Color32::from_rgb(196, 42, 150),           // Darker pink for better contrast
            separator: Color32::from_rgb(205, 205, 212),
            button_background: Color32::from_rgb(232, 232, 238),
            button_foreground: Color32::from_rgb(22, 22, 26),
            button_active_background: Color32::from_rgb(86, 58, 214),
            button_hover_background: Color32::from_rgb(214, 214, 224),
        }
    }

    fn apply_to_ctx(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();

        // Set base colors
        style.visuals.panel_fill = self.background;
        style.visuals.window_fill = self.card_background;
        style.visuals.window_stroke = Stroke::new(1.0, self.separator);
        style.visuals.widgets.noninteractive.bg_fill = self.card_background;

        // Set text colors
        style.visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, self.text);

        // Set button styles
        style.visuals.widgets.inactive.bg_fill = self.button_background;
        style.visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, self.button_foreground);
        style.visuals.widgets.active.bg_fill = self.button_active_background;
        style.visuals.widgets.active.fg_stroke = Stroke::new(1.0, self.button_foreground);
        style.visuals.widgets.hovered.bg_fill = self.button_hover_background;
        style.visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, self.button_foreground);

        // Set selection color
        style.visuals.selection.bg_fill = self.highlight;
        style.visuals.selection.stroke = Stroke::new(1.0, self.highlight);

        // Set various rounding amounts
        style.visuals.window_corner_radius = CornerRadius::same(8);
        style.visuals.menu_corner_radius = CornerRadius::same(6);
        style.visuals.widgets.noninteractive.corner_radius = CornerRadius::same(4);
        style.visuals.widgets.inactive.corner_radius = CornerRadius::same(4);
        style.visuals.widgets.hovered.corner_radius = CornerRadius::same(4);
        style.visuals.widgets.active.corner_radius = CornerRadius::same(4);

        ctx.set_style(style);
    }
}

// One decoded gif frame, ready for texture upload on the UI thread.
struct DecodedFrame {
    width: usize,
    height: usize,
    rgba: Vec<u8>,
}

fn decode_first_frame(bytes: &[u8]) -> anyhow::Result<DecodedFrame> {
    let decoded = image::load_from_memory(bytes)?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(DecodedFrame {
        width: width as usize,
        height: height as usize,
        rgba: rgba.into_raw(),
    })
}

struct GifLightboxApp {
    client: GiphyClient,
    lightbox: Lightbox,
    theme: AppTheme,
    is_dark_mode: bool,
    // Flag to indicate a trending fetch is in flight
    loading: bool,
    gifs_receiver: Option<mpsc::Receiver<Option<Vec<GifImage>>>>,
    // Uploaded textures keyed by gif URL
    textures: HashMap<String, egui::TextureHandle>,
    // URLs with a download/decode thread in flight
    pending_image_urls: HashSet<String>,
    // Loading state of the displayed image, cleared when its frame arrives
    image_loading: bool,
    frame_tx: mpsc::Sender<(String, Option<DecodedFrame>)>,
    frame_rx: mpsc::Receiver<(String, Option<DecodedFrame>)>,
    // Favorites
    database: Option<Arc<Database>>,
    favorites: Vec<FavoriteGif>,
    show_favorites_panel: bool,
    // Pending actions to avoid borrow checker issues
    pending_favorite_toggle: Option<GifImage>,
    needs_repaint: bool,
}

impl GifLightboxApp {
    fn new() -> Self {
        // Initialize the favorites database; the app still works without it
        let database = match Database::new() {
            Ok(db) => Some(Arc::new(db)),
            Err(e) => {
                eprintln!("Failed to initialize favorites database: {}", e);
                None
            }
        };

        let (frame_tx, frame_rx) = mpsc::channel();

        let mut app = Self {
            client: GiphyClient::new(),
            lightbox: Lightbox::new(),
            theme: AppTheme::dark(),
            is_dark_mode: true,
            loading: false,
            gifs_receiver: None,
            textures: HashMap::new(),
            pending_image_urls: HashSet::new(),
            image_loading: false,
            frame_tx,
            frame_rx,
            database,
            favorites: Vec::new(),
            show_favorites_panel: false,
            pending_favorite_toggle: None,
            needs_repaint: false,
        };

        app.reload_favorites();
        app
    }

    // Entry point for the trigger button: the lightbox opens right away,
    // the data follows whenever the worker delivers it.
    fn show_trending(&mut self, force_refresh: bool) {
        self.lightbox.open();

        if self.loading {
            return; // Don't start another load if we're already loading
        }

        self.loading = true;
        self.image_loading = false;

        // Create a new thread for loading
        let client = self.client.clone();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = if force_refresh {
                client.fetch_fresh_trending()
            } else {
                client.fetch_trending()
            };

            match result {
                Ok(gifs) => {
                    let _ = tx.send(Some(gifs));
                }
                Err(e) => {
                    eprintln!("Failed to fetch trending gifs: {}", e);
                    let _ = tx.send(None);
                }
            }
        });

        self.gifs_receiver = Some(rx);
    }

    fn check_worker_channels(&mut self, ctx: &egui::Context) {
        // Check for trending results from the fetch thread
        let mut received = None;
        if let Some(rx) = &self.gifs_receiver {
            if let Ok(message) = rx.try_recv() {
                received = Some(message);
            }
        }

        if let Some(message) = received {
            self.gifs_receiver = None;
            self.loading = false;

            // A failed fetch leaves the lightbox as it is; the error has
            // already been reported by the worker.
            if let Some(gifs) = message {
                self.lightbox.set_gifs(gifs);
                self.lightbox.turn_page(1);
                self.request_current_image();
            }

            self.needs_repaint = true;
        }

        // Drain decoded frames and upload them as textures
        let mut uploaded = false;
        while let Ok((url, frame)) = self.frame_rx.try_recv() {
            self.pending_image_urls.remove(&url);

            if let Some(frame) = frame {
                let color_image = egui::ColorImage::from_rgba_unmultiplied(
                    [frame.width, frame.height],
                    &frame.rgba,
                );
                let texture =
                    ctx.load_texture(url.clone(), color_image, egui::TextureOptions::default());
                self.textures.insert(url.clone(), texture);
            }

            // One-shot completion for the displayed image
            let is_current = self
                .lightbox
                .current_gif()
                .map(|gif| gif.url == url)
                .unwrap_or(false);
            if is_current {
                self.image_loading = false;
            }

            uploaded = true;
        }

        if uploaded {
            self.needs_repaint = true;
        }
    }

    // Kicks off download/decode of the displayed gif unless its texture is
    // already in place.
    fn request_current_image(&mut self) {
        let url = match self.lightbox.current_gif() {
            Some(gif) => gif.url.clone(),
            None => return,
        };

        if self.textures.contains_key(&url) {
            self.image_loading = false;
            return;
        }

        self.image_loading = true;

        if self.pending_image_urls.contains(&url) {
            return;
        }
        self.pending_image_urls.insert(url.clone());

        let client = self.client.clone();
        let tx = self.frame_tx.clone();

        thread::spawn(move || {
            let frame = match client
                .fetch_image_bytes(&url)
                .and_then(|bytes| decode_first_frame(&bytes))
            {
                Ok(frame) => Some(frame),
                Err(e) => {
                    eprintln!("Failed to load gif image: {}", e);
                    None
                }
            };

            let _ = tx.send((url, frame));
        });
    }

    fn start_page_turn(&mut self, delta: i64) {
        let previous_page = self.lightbox.page();
        self.lightbox.turn_page(delta);

        if self.lightbox.page() != previous_page {
            self.request_current_image();
        }
    }

    fn close_lightbox(&mut self) {
        self.lightbox.close();
        self.image_loading = false;
    }

    fn toggle_theme(&mut self) {
        self.is_dark_mode = !self.is_dark_mode;
        self.theme = if self.is_dark_mode {
            AppTheme::dark()
        } else {
            AppTheme::light()
        };
    }

    fn reload_favorites(&mut self) {
        if let Some(database) = &self.database {
            match database.get_all_favorites() {
                Ok(favorites) => self.favorites = favorites,
                Err(e) => eprintln!("Failed to load favorites: {}", e),
            }
        }
    }

    fn is_favorite(&self, url: &str) -> bool {
        self.favorites.iter().any(|favorite| favorite.url == url)
    }

    fn copy_to_clipboard(&self, text: &str) {
        match arboard::Clipboard::new() {
            Ok(mut clipboard) => {
                if let Err(e) = clipboard.set_text(text.to_string()) {
                    eprintln!("Failed to copy url to clipboard: {}", e);
                }
            }
            Err(e) => eprintln!("Failed to access clipboard: {}", e),
        }
    }

    fn render_header(&mut self, ui: &mut Ui, ctx: &egui::Context) {
        ui.horizontal(|ui| {
            // Side panel toggle button
            let panel_btn = ui.add(
                egui::Button::new(
                    RichText::new("☰")
                        .color(if self.show_favorites_panel {
                            self.theme.highlight
                        } else {
                            self.theme.button_foreground
                        })
                        .size(22.0),
                )
                .min_size(egui::Vec2::new(32.0, 32.0))
                .corner_radius(CornerRadius::same(6))
                .fill(self.theme.button_background),
            );

            if panel_btn.clicked() {
                self.show_favorites_panel = !self.show_favorites_panel;
            }

            if panel_btn.hovered() {
                ui.output_mut(|o| o.cursor_icon = egui::CursorIcon::PointingHand);
            }

            ui.add_space(8.0);
            ui.heading(
                RichText::new("GIF Lightbox")
                    .color(self.theme.highlight)
                    .size(24.0),
            );

            // Push buttons to the right
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                // Theme toggle button
                let theme_icon = if self.is_dark_mode { "☀" } else { "☾" };
                let theme_btn = ui.add(
                    egui::Button::new(
                        RichText::new(theme_icon)
                            .color(self.theme.button_foreground)
                            .size(22.0),
                    )
                    .min_size(egui::Vec2::new(32.0, 32.0))
                    .corner_radius(CornerRadius::same(16)) // Make it circular
                    .fill(self.theme.button_background),
                );

                if theme_btn.hovered() {
                    ui.output_mut(|o| o.cursor_icon = egui::CursorIcon::PointingHand);
                }

                if theme_btn.clicked() {
                    self.toggle_theme();
                    // Request immediate repaint to avoid a frame with the old theme
                    ctx.request_repaint();
                }
            });
        });

        ui.separator();
    }

    fn render_welcome(&mut self, ui: &mut Ui, ctx: &egui::Context) {
        ui.vertical_centered(|ui| {
            ui.add_space(90.0);
            ui.heading(
                RichText::new("Trending on Giphy")
                    .color(self.theme.text)
                    .size(28.0),
            );
            ui.add_space(8.0);
            ui.label(
                RichText::new("The day's trending gifs, one page at a time.")
                    .color(self.theme.secondary_text),
            );
            ui.add_space(28.0);

            let trigger_btn = ui.add(
                egui::Button::new(
                    RichText::new("Show Trending Gifs")
                        .color(self.theme.button_foreground)
                        .size(18.0),
                )
                .min_size(egui::Vec2::new(220.0, 48.0))
                .corner_radius(CornerRadius::same(8))
                .fill(self.theme.button_active_background),
            );

            if trigger_btn.hovered() {
                ui.output_mut(|o| o.cursor_icon = egui::CursorIcon::PointingHand);
            }

            if trigger_btn.clicked() {
                // Shift+click bypasses the session cache
                let force_refresh = ctx.input(|i| i.modifiers.shift);
                self.show_trending(force_refresh);
            }
        });
    }

    fn render_lightbox(&mut self, ctx: &egui::Context) {
        let mut page_delta: Option<i64> = None;
        let mut close_clicked = false;
        let mut open_source: Option<String> = None;
        let mut copy_url: Option<String> = None;
        let mut toggle_favorite: Option<GifImage> = None;

        let modal = egui::Modal::new(egui::Id::new("gif_lightbox")).show(ctx, |ui| {
            ui.set_width(560.0);

            // Title row with close control
            ui.horizontal(|ui| {
                let title = if self.lightbox.page() > 0 {
                    self.lightbox.title_text()
                } else {
                    "Trending Gifs".to_string()
                };
                ui.heading(RichText::new(title).color(self.theme.highlight).size(20.0));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let close_btn = ui.add(
                        egui::Button::new(
                            RichText::new("✕")
                                .color(self.theme.button_foreground)
                                .size(16.0),
                        )
                        .min_size(egui::Vec2::new(28.0, 28.0))
                        .corner_radius(CornerRadius::same(14))
                        .fill(self.theme.button_background),
                    );

                    if close_btn.clicked() {
                        close_clicked = true;
                    }

                    if close_btn.hovered() {
                        ui.output_mut(|o| o.cursor_icon = egui::CursorIcon::PointingHand);
                    }
                });
            });

            ui.separator();

            // Image area: texture when ready, spinner while loading
            ui.vertical_centered(|ui| {
                match self.lightbox.current_gif() {
                    Some(gif) => {
                        if let Some(texture) = self.textures.get(&gif.url) {
                            ui.add(egui::Image::new(texture).max_size(egui::vec2(520.0, 380.0)));
                        } else if self.image_loading {
                            ui.add_space(170.0);
                            ui.add(egui::Spinner::new().size(40.0));
                            ui.add_space(170.0);
                        } else {
                            ui.add_space(380.0);
                        }
                    }
                    None => {
                        ui.add_space(170.0);
                        if self.loading {
                            ui.add(egui::Spinner::new().size(40.0));
                        }
                        ui.add_space(170.0);
                    }
                }
            });

            // Source row with favorite/copy controls
            if let Some(gif) = self.lightbox.current_gif() {
                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    let has_source = gif.source != "Unknown";
                    let source_label = ui.add(
                        egui::Label::new(
                            RichText::new(self.lightbox.source_text())
                                .color(self.theme.secondary_text),
                        )
                        .sense(egui::Sense::click()),
                    );

                    if source_label.hovered() && has_source {
                        ui.output_mut(|o| o.cursor_icon = egui::CursorIcon::PointingHand);
                    }

                    if source_label.clicked() && has_source {
                        open_source = Some(format!("https://{}", gif.source));
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let is_favorite = self.is_favorite(&gif.url);
                        let star_icon = if is_favorite { "★" } else { "☆" };
                        let star_color = if is_favorite {
                            self.theme.accent
                        } else {
                            self.theme.button_foreground
                        };

                        let fav_btn = ui.add(
                            egui::Button::new(RichText::new(star_icon).color(star_color).size(16.0))
                                .min_size(egui::Vec2::new(28.0, 28.0))
                                .corner_radius(CornerRadius::same(14))
                                .fill(self.theme.button_background),
                        );

                        if fav_btn.clicked() {
                            toggle_favorite = Some(gif.clone());
                        }

                        let copy_btn = ui.add(
                            egui::Button::new(
                                RichText::new("⧉")
                                    .color(self.theme.button_foreground)
                                    .size(16.0),
                            )
                            .min_size(egui::Vec2::new(28.0, 28.0))
                            .corner_radius(CornerRadius::same(14))
                            .fill(self.theme.button_background),
                        );

                        if copy_btn.clicked() {
                            copy_url = Some(gif.url.clone());
                        }
                    });
                });
            }

            ui.add_space(4.0);
            ui.separator();

            // Pager controls, hidden at the boundaries
            let visibility = self.lightbox.pager_visibility();
            ui.horizontal(|ui| {
                if visibility.previous {
                    let prev_btn = ui.add(
                        egui::Button::new(
                            RichText::new("‹ Previous").color(self.theme.button_foreground),
                        )
                        .min_size(egui::Vec2::new(96.0, 32.0))
                        .corner_radius(CornerRadius::same(6))
                        .fill(self.theme.button_background),
                    );

                    if prev_btn.clicked() {
                        page_delta = Some(-1);
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if visibility.next {
                        let next_btn = ui.add(
                            egui::Button::new(
                                RichText::new("Next ›").color(self.theme.button_foreground),
                            )
                            .min_size(egui::Vec2::new(96.0, 32.0))
                            .corner_radius(CornerRadius::same(6))
                            .fill(self.theme.button_background),
                        );

                        if next_btn.clicked() {
                            page_delta = Some(1);
                        }
                    }
                });
            });
        });

        if close_clicked || modal.should_close() {
            self.close_lightbox();
        } else if let Some(delta) = page_delta {
            self.start_page_turn(delta);
        }

        if let Some(url) = open_source {
            if let Err(e) = open::that(&url) {
                eprintln!("Failed to open source site: {}", e);
            }
        }

        if let Some(url) = copy_url {
            self.copy_to_clipboard(&url);
        }

        if let Some(gif) = toggle_favorite {
            self.pending_favorite_toggle = Some(gif);
        }
    }

    fn render_favorites_panel(&mut self, ctx: &egui::Context) {
        let mut open_url: Option<String> = None;
        let mut remove_url: Option<String> = None;

        egui::SidePanel::left("favorites_panel")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                ui.heading(RichText::new("Favorites").color(self.theme.highlight));
                ui.separator();

                if self.favorites.is_empty() {
                    ui.label(
                        RichText::new("No favorites yet").color(self.theme.secondary_text),
                    );
                    return;
                }

                ScrollArea::vertical().show(ui, |ui| {
                    for favorite in &self.favorites {
                        ui.horizontal(|ui| {
                            let label = ui.add(
                                egui::Label::new(
                                    RichText::new(&favorite.source).color(self.theme.text),
                                )
                                .sense(egui::Sense::click()),
                            );

                            if label.hovered() {
                                ui.output_mut(|o| o.cursor_icon = egui::CursorIcon::PointingHand);
                            }

                            if label.clicked() {
                                open_url = Some(favorite.url.clone());
                            }

                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    if ui.button("✕").clicked() {
                                        remove_url = Some(favorite.url.clone());
                                    }
                                },
                            );
                        });

                        ui.label(
                            RichText::new(shorten_url(&favorite.url))
                                .color(self.theme.secondary_text)
                                .small(),
                        );
                        ui.separator();
                    }
                });
            });

        if let Some(url) = open_url {
            if let Err(e) = open::that(&url) {
                eprintln!("Failed to open gif in browser: {}", e);
            }
        }

        if let Some(url) = remove_url {
            if let Some(database) = &self.database {
                if let Err(e) = database.remove_favorite(&url) {
                    eprintln!("Failed to remove favorite: {}", e);
                }
            }
            self.reload_favorites();
            self.needs_repaint = true;
        }
    }
}

fn shorten_url(url: &str) -> String {
    const MAX_CHARS: usize = 42;

    if url.chars().count() <= MAX_CHARS {
        return url.to_string();
    }

    let shortened: String = url.chars().take(MAX_CHARS).collect();
    format!("{}…", shortened)
}

impl eframe::App for GifLightboxApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        // Save theme preference
        storage.set_string("is_dark_mode", self.is_dark_mode.to_string());
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply our custom theme
        self.theme.apply_to_ctx(ctx);

        // Check if background work has finished
        self.check_worker_channels(ctx);

        // Process any pending actions
        if let Some(gif) = self.pending_favorite_toggle.take() {
            if let Some(database) = &self.database {
                let result = if self.favorites.iter().any(|fav| fav.url == gif.url) {
                    database.remove_favorite(&gif.url)
                } else {
                    database.add_favorite(&gif)
                };

                if let Err(e) = result {
                    eprintln!("Error toggling favorite status: {}", e);
                }
            }

            self.reload_favorites();
            self.needs_repaint = true;
        }

        // Arrow keys page while the lightbox is open
        if self.lightbox.is_open() {
            let (previous_pressed, next_pressed) = ctx.input(|i| {
                (
                    i.key_pressed(egui::Key::ArrowLeft),
                    i.key_pressed(egui::Key::ArrowRight),
                )
            });

            if previous_pressed {
                self.start_page_turn(-1);
            }

            if next_pressed {
                self.start_page_turn(1);
            }
        }

        // Request repaint if needed
        if self.needs_repaint {
            ctx.request_repaint();
            self.needs_repaint = false;
        }

        // Keep polling the worker channels while anything is in flight
        if self.loading || self.image_loading {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        // Render favorites panel if it's visible
        if self.show_favorites_panel {
            self.render_favorites_panel(ctx);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_header(ui, ctx);
            self.render_welcome(ui, ctx);
        });

        if self.lightbox.is_open() {
            self.render_lightbox(ctx);
        }
    }
}
