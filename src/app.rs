use eframe::egui;
use egui_extras::{Column, TableBuilder};
use std::path::{Path, PathBuf};

use crate::annotation::CropFrame;
use crate::caliper::MeasurementMode;
use crate::canvas::{CanvasReply, PointerEvent};
use crate::command::Command;
use crate::dialogs::{
    self, CalibrationAction, CalibrationDialog, PlaylistAction, PlaylistEditor,
    PreferencesDialog, RenameDialog,
};
use crate::pipeline::Rotation;
use crate::playlist::{Playlist, IMAGE_EXTENSIONS, PLAYLIST_EXTENSION};
use crate::prefs::Preferences;
use crate::session::Session;
use crate::surface::PainterSurface;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SideTab {
    Playlist,
    Notes,
}

/// Identifies the display image a texture was uploaded from.
type TextureKey = (PathBuf, Rotation, CropFrame);

#[derive(Default)]
struct Dialogs {
    calibration: CalibrationDialog,
    preferences: PreferencesDialog,
    playlist: PlaylistEditor,
    rename: RenameDialog,
    about: bool,
    shortcuts: bool,
    fullscreen_help: bool,
    hide_fullscreen_help: bool,
}

pub struct ViewerApp {
    session: Session,
    prefs: Preferences,
    texture: Option<(egui::TextureHandle, TextureKey)>,
    show_side_panel: bool,
    side_tab: SideTab,
    fullscreen: bool,
    dialogs: Dialogs,
    /// Screen position of the canvas context menu, when open.
    context_menu: Option<egui::Pos2>,
    last_pointer: Option<egui::Pos2>,
    pressed_on_canvas: bool,
}

impl ViewerApp {
    pub fn new(prefs: Preferences, initial: Option<PathBuf>) -> Self {
        let mut session = Session::new();
        session.canvas_mut().set_caliper_shape(prefs.caliper_shape);
        if let Some(path) = initial {
            if let Err(e) = session.open_path(&path) {
                session.report(&e);
            }
        }
        Self {
            session,
            prefs,
            texture: None,
            show_side_panel: true,
            side_tab: SideTab::Playlist,
            fullscreen: false,
            dialogs: Dialogs::default(),
            context_menu: None,
            last_pointer: None,
            pressed_on_canvas: false,
        }
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        let Some(pipeline) = self.session.pipeline() else {
            self.texture = None;
            return;
        };
        let key = (
            pipeline.path().to_path_buf(),
            pipeline.rotation(),
            pipeline.crop(),
        );
        if self.texture.as_ref().is_some_and(|(_, k)| *k == key) {
            return;
        }

        let rgba = pipeline.display().to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        let pixels = rgba.as_flat_samples();
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
        let handle = ctx.load_texture("display", color_image, egui::TextureOptions::LINEAR);
        log::debug!("Uploaded {}x{} texture", size[0], size[1]);
        self.texture = Some((handle, key));
    }

    fn remember_dir(&mut self, path: &Path) {
        let dir = if path.is_dir() { Some(path) } else { path.parent() };
        if let Some(dir) = dir {
            if self.prefs.last_dir.as_deref() != Some(dir) {
                self.prefs.last_dir = Some(dir.to_path_buf());
                if let Err(e) = self.prefs.save_to_default() {
                    log::warn!("{e}");
                }
            }
        }
    }

    fn apply_preferences(&mut self, prefs: Preferences) {
        self.session.canvas_mut().set_caliper_shape(prefs.caliper_shape);
        self.prefs = prefs;
        match self.prefs.save_to_default() {
            Ok(()) => self.session.set_message("Preferences saved"),
            Err(e) => self.session.report(&e),
        }
    }

    // ── Commands ────────────────────────────────────────────────────────

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let fired: Vec<Command> = Command::ALL
            .into_iter()
            .filter(|cmd| {
                cmd.shortcut()
                    .is_some_and(|s| ctx.input_mut(|i| i.consume_shortcut(&s)))
            })
            .collect();
        for cmd in fired {
            self.execute(cmd, ctx);
        }
    }

    fn execute(&mut self, cmd: Command, ctx: &egui::Context) {
        if cmd.needs_image() && !self.session.has_image() {
            return;
        }
        log::debug!("{cmd:?}");
        match cmd {
            Command::Open => self.open_dialog(),
            Command::SaveImage => self.save_image_dialog(),
            Command::Quit => {
                self.session.close_image();
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            Command::ToggleSidePanel => self.show_side_panel = !self.show_side_panel,
            Command::ToggleFullscreen => {
                self.fullscreen = !self.fullscreen;
                ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(self.fullscreen));
                if self.fullscreen && self.prefs.show_fullscreen_help {
                    self.dialogs.fullscreen_help = true;
                    self.dialogs.hide_fullscreen_help = false;
                }
            }
            Command::Calibrate => self.session.start_calibration(),
            Command::NewCaliper => self.session.canvas_mut().new_caliper(),
            Command::RemoveCalipers => self.session.canvas_mut().remove_all_calipers(),
            Command::ToggleDoodle => {
                let on = self.session.canvas_mut().toggle_doodle();
                self.session
                    .set_message(if on { "Doodling" } else { "Doodle off" });
            }
            Command::ClearDoodle => self.session.canvas_mut().clear_doodle(),
            Command::Preferences => self.dialogs.preferences.open(&self.prefs),
            Command::RotateLeft => self.session.rotate_left(),
            Command::RotateRight => self.session.rotate_right(),
            Command::Crop => self.session.choose_crop_frame(),
            Command::PreviousImage => {
                if let Err(e) = self.session.previous_image() {
                    self.session.report(&e);
                }
            }
            Command::NextImage => {
                if let Err(e) = self.session.next_image() {
                    self.session.report(&e);
                }
            }
            Command::NewPlaylist => self.dialogs.playlist.open(Playlist::default()),
            Command::EditPlaylist => self.dialogs.playlist.open(self.session.playlist().clone()),
            Command::About => self.dialogs.about = true,
            Command::Shortcuts => self.dialogs.shortcuts = true,
        }
    }

    fn open_dialog(&mut self) {
        let openable = image_or_playlist_extensions();
        let mut dialog = rfd::FileDialog::new()
            .add_filter("Images and playlists", &openable[..])
            .add_filter("Images", IMAGE_EXTENSIONS)
            .add_filter("Playlists", &[PLAYLIST_EXTENSION]);
        if let Some(dir) = self.prefs.start_dir() {
            dialog = dialog.set_directory(dir);
        }
        let Some(path) = dialog.pick_file() else {
            return;
        };
        self.remember_dir(&path);
        if let Err(e) = self.session.open_path(&path) {
            self.session.report(&e);
        }
    }

    fn save_image_dialog(&mut self) {
        let Some(pipeline) = self.session.pipeline() else {
            return;
        };
        let stem = pipeline
            .path()
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".into());
        let mut dialog = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .add_filter("JPEG", &["jpg", "jpeg"])
            .set_file_name(format!("{stem}_annotated.png"));
        if let Some(dir) = pipeline.path().parent() {
            dialog = dialog.set_directory(dir);
        }
        if let Some(path) = dialog.save_file() {
            let style = self.prefs.overlay_style();
            if let Err(e) = self.session.export_annotated(&path, &style) {
                self.session.report(&e);
            }
        }
    }

    // ── Panels ──────────────────────────────────────────────────────────

    fn menu_bar(&mut self, ctx: &egui::Context) {
        let has_image = self.session.has_image();
        let mut chosen = None;
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                let mut menu = |ui: &mut egui::Ui, title: &str, cmds: &[Command]| {
                    ui.menu_button(title, |ui| {
                        for cmd in cmds {
                            if menu_item(ui, *cmd, has_image) {
                                chosen = Some(*cmd);
                                ui.close_menu();
                            }
                        }
                    });
                };
                menu(
                    ui,
                    "File",
                    &[Command::Open, Command::SaveImage, Command::Preferences, Command::Quit],
                );
                menu(
                    ui,
                    "Edit",
                    &[
                        Command::Calibrate,
                        Command::NewCaliper,
                        Command::RemoveCalipers,
                        Command::ToggleDoodle,
                        Command::ClearDoodle,
                    ],
                );
                menu(
                    ui,
                    "Image",
                    &[
                        Command::RotateLeft,
                        Command::RotateRight,
                        Command::Crop,
                        Command::ToggleSidePanel,
                        Command::ToggleFullscreen,
                    ],
                );
                menu(
                    ui,
                    "Playlist",
                    &[
                        Command::PreviousImage,
                        Command::NextImage,
                        Command::NewPlaylist,
                        Command::EditPlaylist,
                    ],
                );
                menu(ui, "Help", &[Command::Shortcuts, Command::About]);
            });
        });
        if let Some(cmd) = chosen {
            self.execute(cmd, ctx);
        }
    }

    fn toolbar(&mut self, ctx: &egui::Context) {
        let has_image = self.session.has_image();
        let doodling = self.session.canvas().is_doodling();
        let mut chosen = None;
        let mut measurement = self.prefs.measurement;

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for (cmd, text) in [
                    (Command::Open, "Open"),
                    (Command::PreviousImage, "◀"),
                    (Command::NextImage, "▶"),
                ] {
                    if ui.button(text).on_hover_text(cmd.label()).clicked() {
                        chosen = Some(cmd);
                    }
                }
                ui.separator();
                for (cmd, text) in [
                    (Command::Calibrate, "Calibrate"),
                    (Command::NewCaliper, "Caliper"),
                ] {
                    if ui.add_enabled(has_image, egui::Button::new(text)).clicked() {
                        chosen = Some(cmd);
                    }
                }
                if ui
                    .add_enabled(has_image, egui::Button::new("Doodle").selected(doodling))
                    .clicked()
                {
                    chosen = Some(Command::ToggleDoodle);
                }
                ui.separator();
                for (cmd, text) in [
                    (Command::RotateLeft, "⟲"),
                    (Command::RotateRight, "⟳"),
                    (Command::Crop, "Crop"),
                ] {
                    let button = ui
                        .add_enabled(has_image, egui::Button::new(text))
                        .on_hover_text(cmd.label());
                    if button.clicked() {
                        chosen = Some(cmd);
                    }
                }
                ui.separator();
                ui.label("Show:");
                egui::ComboBox::from_id_salt("toolbar_measurement")
                    .selected_text(measurement.name())
                    .show_ui(ui, |ui| {
                        for mode in MeasurementMode::all() {
                            ui.selectable_value(&mut measurement, *mode, mode.name());
                        }
                    });
            });
        });

        if measurement != self.prefs.measurement {
            let prefs = Preferences {
                measurement,
                ..self.prefs.clone()
            };
            self.apply_preferences(prefs);
        }
        if let Some(cmd) = chosen {
            self.execute(cmd, ctx);
        }
    }

    fn status_bar(&self, ctx: &egui::Context) {
        let status = self.session.status();
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&status.message);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(&status.calibration);
                    ui.separator();
                    ui.label(&status.file);
                });
            });
        });
    }

    fn side_panel(&mut self, ctx: &egui::Context) {
        let mut jump = None;
        let mut rename = None;

        egui::SidePanel::right("side_panel")
            .resizable(true)
            .default_width(220.0)
            .show_animated(ctx, self.show_side_panel, |ui| {
                ui.horizontal(|ui| {
                    ui.selectable_value(&mut self.side_tab, SideTab::Playlist, "Playlist");
                    ui.selectable_value(&mut self.side_tab, SideTab::Notes, "Notes");
                });
                ui.separator();

                match self.side_tab {
                    SideTab::Playlist => {
                        let playlist = self.session.playlist();
                        let now = playlist.now_showing();
                        TableBuilder::new(ui)
                            .striped(true)
                            .column(Column::remainder())
                            .body(|body| {
                                body.rows(20.0, playlist.len(), |mut row| {
                                    let i = row.index();
                                    let name = playlist.paths()[i]
                                        .file_name()
                                        .map(|n| n.to_string_lossy().into_owned())
                                        .unwrap_or_default();
                                    row.col(|ui| {
                                        let item = ui.selectable_label(i == now, &name);
                                        if item.double_clicked() {
                                            jump = Some(i);
                                        }
                                        item.context_menu(|ui| {
                                            if ui.button("Rename…").clicked() {
                                                rename = Some((i, name.clone()));
                                                ui.close_menu();
                                            }
                                        });
                                    });
                                });
                            });
                    }
                    SideTab::Notes => {
                        let enabled = self.session.has_image();
                        ui.add_enabled(
                            enabled,
                            egui::TextEdit::multiline(self.session.note_mut())
                                .hint_text("Notes for this image")
                                .desired_width(f32::INFINITY)
                                .desired_rows(20),
                        );
                    }
                }
            });

        if let Some(i) = jump {
            if let Err(e) = self.session.jump_to(i) {
                self.session.report(&e);
            }
        }
        if let Some((i, name)) = rename {
            self.dialogs.rename.open(i, name);
        }
    }

    fn canvas_context_menu(&mut self, ctx: &egui::Context) {
        let Some(pos) = self.context_menu else {
            return;
        };
        let has_image = self.session.has_image();
        let mut chosen = None;
        let area = egui::Area::new(egui::Id::new("canvas_context_menu"))
            .fixed_pos(pos)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_min_width(150.0);
                    for cmd in [
                        Command::RotateLeft,
                        Command::RotateRight,
                        Command::Crop,
                        Command::RemoveCalipers,
                        Command::ClearDoodle,
                        Command::SaveImage,
                    ] {
                        if menu_item(ui, cmd, has_image) {
                            chosen = Some(cmd);
                        }
                    }
                });
            });

        let dismissed = ctx.input(|i| {
            i.key_pressed(egui::Key::Escape)
                || ((i.pointer.primary_pressed() || i.pointer.secondary_pressed())
                    && !area.response.contains_pointer())
        });
        if chosen.is_some() || dismissed {
            self.context_menu = None;
        }
        if let Some(cmd) = chosen {
            self.execute(cmd, ctx);
        }
    }

    fn central(&mut self, ctx: &egui::Context, menu_was_open: bool) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            painter.rect_filled(rect, 0.0, egui::Color32::from_gray(40));

            self.session.set_canvas_size(rect.size());
            let redraw = self.session.canvas_mut().take_redraw();
            if redraw.background {
                self.ensure_texture(ctx);
            }

            if let (Some((tex, _)), Some(transform)) =
                (&self.texture, self.session.canvas().transform())
            {
                painter.image(
                    tex.id(),
                    transform.image_rect().translate(rect.min.to_vec2()),
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            }

            if !menu_was_open {
                self.route_pointer(ctx, &response);
            }
            if response.hovered() {
                ctx.set_cursor_icon(self.session.canvas().cursor());
            }

            let style = self.prefs.overlay_style();
            let mut surface = PainterSurface::new(&painter, rect);
            self.session.canvas().draw(&mut surface, &style);
        });
    }

    /// Translate this frame's pointer input into canvas events.
    fn route_pointer(&mut self, ctx: &egui::Context, response: &egui::Response) {
        let over = response.hovered();
        let (latest, primary_pressed, primary_released, secondary_pressed) = ctx.input(|i| {
            (
                i.pointer.latest_pos(),
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.secondary_pressed(),
            )
        });
        let Some(screen) = latest else {
            return;
        };
        let local = (screen - response.rect.min).to_pos2();

        let mut events = Vec::new();
        if (over || self.pressed_on_canvas) && self.last_pointer != Some(local) {
            self.last_pointer = Some(local);
            events.push(PointerEvent::Moved(local));
        }
        if primary_pressed && over {
            self.pressed_on_canvas = true;
            events.push(PointerEvent::PrimaryDown(local));
        }
        if primary_released && self.pressed_on_canvas {
            self.pressed_on_canvas = false;
            events.push(PointerEvent::PrimaryUp(local));
        }
        if secondary_pressed && over {
            events.push(PointerEvent::SecondaryDown(local));
        }

        for event in events {
            if let CanvasReply::ContextMenu(at) = self.session.handle_pointer(event) {
                self.context_menu = Some(at + response.rect.min.to_vec2());
            }
        }
    }

    // ── Dialogs ─────────────────────────────────────────────────────────

    fn dialogs(&mut self, ctx: &egui::Context) {
        let pending = self.session.canvas().pending_calibration().is_some();
        if pending && !self.dialogs.calibration.open {
            self.dialogs.calibration.open();
        }
        match self.dialogs.calibration.show(ctx) {
            Some(CalibrationAction::Submit(input)) => match self.session.submit_calibration(&input) {
                Ok(_) => self.dialogs.calibration.close(),
                Err(e) => self.dialogs.calibration.reject(e.to_string()),
            },
            Some(CalibrationAction::Cancel) => {
                self.session.cancel_calibration();
                self.dialogs.calibration.close();
            }
            None => {}
        }

        if let Some(prefs) = self.dialogs.preferences.show(ctx) {
            self.apply_preferences(prefs);
        }

        match self.dialogs.playlist.show(ctx, self.prefs.start_dir()) {
            Some(PlaylistAction::Apply(list)) => self.apply_playlist(list),
            Some(PlaylistAction::Save(list, path)) => match list.save(&path) {
                Ok(written) => {
                    self.remember_dir(&written);
                    self.session
                        .set_message(format!("Saved playlist {}", written.display()));
                }
                Err(e) => self.session.report(&e),
            },
            None => {}
        }

        if let Some((index, name)) = self.dialogs.rename.show(ctx) {
            if let Err(e) = self.session.rename_entry(index, &name) {
                self.session.report(&e);
            }
        }

        dialogs::show_about(ctx, &mut self.dialogs.about);
        dialogs::show_shortcuts(ctx, &mut self.dialogs.shortcuts);
        if dialogs::show_fullscreen_help(
            ctx,
            &mut self.dialogs.fullscreen_help,
            &mut self.dialogs.hide_fullscreen_help,
        ) {
            let prefs = Preferences {
                show_fullscreen_help: false,
                ..self.prefs.clone()
            };
            self.apply_preferences(prefs);
        }
    }

    fn apply_playlist(&mut self, list: Playlist) {
        let shown_listed = self
            .session
            .pipeline()
            .is_some_and(|p| list.paths().iter().any(|q| q == p.path()));
        if shown_listed {
            self.session.replace_playlist(list);
        } else if let Err(e) = self.session.set_playlist(list) {
            self.session.report(&e);
        }
    }
}

fn image_or_playlist_extensions() -> Vec<&'static str> {
    let mut all = IMAGE_EXTENSIONS.to_vec();
    all.push(PLAYLIST_EXTENSION);
    all
}

/// A menu button showing the command's shortcut. Returns `true` on click.
fn menu_item(ui: &mut egui::Ui, cmd: Command, has_image: bool) -> bool {
    let mut button = egui::Button::new(cmd.label());
    if let Some(shortcut) = cmd.shortcut() {
        button = button.shortcut_text(ui.ctx().format_shortcut(&shortcut));
    }
    ui.add_enabled(!cmd.needs_image() || has_image, button)
        .clicked()
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.viewport().close_requested()) {
            self.session.close_image();
        }

        self.handle_shortcuts(ctx);

        if !self.fullscreen {
            self.menu_bar(ctx);
            self.toolbar(ctx);
            self.status_bar(ctx);
            self.side_panel(ctx);
        }

        let menu_was_open = self.context_menu.is_some();
        self.canvas_context_menu(ctx);
        self.central(ctx, menu_was_open);
        self.dialogs(ctx);
    }
}
