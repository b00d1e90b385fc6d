//! Modal windows. Each `show` returns what the user asked for and leaves
//! acting on it to the app.

use eframe::egui;
use egui_extras::{Column, TableBuilder};
use std::path::PathBuf;

use crate::caliper::{CaliperShape, MeasurementMode};
use crate::command::Command;
use crate::playlist::{Playlist, IMAGE_EXTENSIONS, PLAYLIST_EXTENSION};
use crate::prefs::{LogLevel, Preferences};

fn modal(title: &str) -> egui::Window<'_> {
    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
}

fn enter_pressed(ctx: &egui::Context) -> bool {
    ctx.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::Enter))
}

fn escape_pressed(ctx: &egui::Context) -> bool {
    ctx.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::Escape))
}

// ── Calibration ─────────────────────────────────────────────────────────────

pub enum CalibrationAction {
    Submit(String),
    Cancel,
}

#[derive(Default)]
pub struct CalibrationDialog {
    pub open: bool,
    input: String,
    error: Option<String>,
}

impl CalibrationDialog {
    pub fn open(&mut self) {
        self.open = true;
        self.input.clear();
        self.error = None;
    }

    /// Keep the prompt up and say why the entry was refused.
    pub fn reject(&mut self, message: String) {
        self.error = Some(message);
        self.input.clear();
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn show(&mut self, ctx: &egui::Context) -> Option<CalibrationAction> {
        if !self.open {
            return None;
        }
        let mut action = None;
        if escape_pressed(ctx) {
            action = Some(CalibrationAction::Cancel);
        }
        if enter_pressed(ctx) {
            action = Some(CalibrationAction::Submit(self.input.clone()));
        }

        modal("Calibrate").show(ctx, |ui| {
            ui.label("Duration of the selected interval (ms):");
            let edit = ui.text_edit_singleline(&mut self.input);
            edit.request_focus();
            if let Some(err) = &self.error {
                ui.colored_label(ui.visuals().error_fg_color, err);
            }
            ui.horizontal(|ui| {
                if ui.button("OK").clicked() {
                    action = Some(CalibrationAction::Submit(self.input.clone()));
                }
                if ui.button("Cancel").clicked() {
                    action = Some(CalibrationAction::Cancel);
                }
            });
        });
        action
    }
}

// ── Preferences ─────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct PreferencesDialog {
    draft: Option<Preferences>,
}

impl PreferencesDialog {
    pub fn open(&mut self, current: &Preferences) {
        self.draft = Some(current.clone());
    }

    /// Returns the edited preferences when the user applies them.
    pub fn show(&mut self, ctx: &egui::Context) -> Option<Preferences> {
        let draft = self.draft.as_mut()?;
        let mut applied = None;
        let mut close = escape_pressed(ctx);

        modal("Preferences").show(ctx, |ui| {
            egui::Grid::new("prefs_grid")
                .num_columns(2)
                .spacing([12.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Caliper colour");
                    ui.color_edit_button_srgb(&mut draft.caliper_color);
                    ui.end_row();

                    ui.label("Active caliper colour");
                    ui.color_edit_button_srgb(&mut draft.active_caliper_color);
                    ui.end_row();

                    ui.label("Caliper width");
                    ui.add(egui::Slider::new(&mut draft.caliper_width, 1.0..=5.0));
                    ui.end_row();

                    ui.label("Caliper shape");
                    egui::ComboBox::from_id_salt("caliper_shape")
                        .selected_text(draft.caliper_shape.name())
                        .show_ui(ui, |ui| {
                            for shape in [CaliperShape::Full, CaliperShape::Truncated] {
                                ui.selectable_value(&mut draft.caliper_shape, shape, shape.name());
                            }
                        });
                    ui.end_row();

                    ui.label("Measurement");
                    egui::ComboBox::from_id_salt("measurement")
                        .selected_text(draft.measurement.name())
                        .show_ui(ui, |ui| {
                            for mode in MeasurementMode::all() {
                                ui.selectable_value(&mut draft.measurement, *mode, mode.name());
                            }
                        });
                    ui.end_row();

                    ui.label("Doodle colour");
                    ui.color_edit_button_srgb(&mut draft.doodle_color);
                    ui.end_row();

                    ui.label("Doodle width");
                    ui.add(egui::Slider::new(&mut draft.doodle_width, 1.0..=10.0));
                    ui.end_row();

                    ui.label("Default folder");
                    ui.horizontal(|ui| {
                        let shown = draft
                            .default_dir
                            .as_ref()
                            .map(|d| d.display().to_string())
                            .unwrap_or_else(|| "(none)".into());
                        ui.label(shown);
                        if ui.button("Browse…").clicked() {
                            if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                                draft.default_dir = Some(dir);
                            }
                        }
                    });
                    ui.end_row();

                    ui.label("Reuse last folder");
                    ui.checkbox(&mut draft.reuse_last_dir, "");
                    ui.end_row();

                    ui.label("Fullscreen help");
                    ui.checkbox(&mut draft.show_fullscreen_help, "");
                    ui.end_row();

                    ui.label("Log level");
                    egui::ComboBox::from_id_salt("log_level")
                        .selected_text(draft.log_level.name())
                        .show_ui(ui, |ui| {
                            for level in LogLevel::all() {
                                ui.selectable_value(&mut draft.log_level, *level, level.name());
                            }
                        });
                    ui.end_row();
                });

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Apply").clicked() {
                    applied = Some(draft.clone());
                    close = true;
                }
                if ui.button("Cancel").clicked() {
                    close = true;
                }
            });
        });

        if close {
            self.draft = None;
        }
        applied
    }
}

// ── Playlist editor ─────────────────────────────────────────────────────────

pub enum PlaylistAction {
    Apply(Playlist),
    Save(Playlist, PathBuf),
}

#[derive(Default)]
pub struct PlaylistEditor {
    list: Option<Playlist>,
    selected: Option<usize>,
}

impl PlaylistEditor {
    pub fn open(&mut self, list: Playlist) {
        self.list = Some(list);
        self.selected = None;
    }

    pub fn show(&mut self, ctx: &egui::Context, start_dir: Option<&std::path::Path>) -> Option<PlaylistAction> {
        let list = self.list.as_mut()?;
        let mut action = None;
        let mut close = escape_pressed(ctx);
        let selected = &mut self.selected;

        modal("Playlist").resizable(true).show(ctx, |ui| {
            ui.set_min_size(egui::vec2(420.0, 300.0));

            ui.horizontal(|ui| {
                if ui.button("Add…").clicked() {
                    let mut dialog = rfd::FileDialog::new().add_filter("Images", IMAGE_EXTENSIONS);
                    if let Some(dir) = start_dir {
                        dialog = dialog.set_directory(dir);
                    }
                    for path in dialog.pick_files().unwrap_or_default() {
                        list.push(path);
                    }
                }
                if let Some(i) = *selected {
                    if ui.button("Remove").clicked() {
                        list.remove(i);
                        *selected = None;
                    }
                    if ui.button("Up").clicked() {
                        *selected = list.move_up(i).or(*selected);
                    }
                    if ui.button("Down").clicked() {
                        *selected = list.move_down(i).or(*selected);
                    }
                }
            });
            ui.separator();

            egui::ScrollArea::vertical()
                .max_height(240.0)
                .show(ui, |ui| {
                    TableBuilder::new(ui)
                        .striped(true)
                        .column(Column::auto())
                        .column(Column::remainder())
                        .body(|body| {
                            body.rows(18.0, list.len(), |mut row| {
                                let i = row.index();
                                row.col(|ui| {
                                    ui.label(format!("{}", i + 1));
                                });
                                row.col(|ui| {
                                    let path = list.paths()[i].display().to_string();
                                    if ui.selectable_label(*selected == Some(i), path).clicked() {
                                        *selected = Some(i);
                                    }
                                });
                            });
                        });
                });

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("OK").clicked() {
                    action = Some(PlaylistAction::Apply(list.clone()));
                    close = true;
                }
                if ui.button("Save as…").clicked() {
                    let mut dialog = rfd::FileDialog::new()
                        .add_filter("Playlist", &[PLAYLIST_EXTENSION])
                        .set_file_name("playlist.plst");
                    if let Some(dir) = start_dir {
                        dialog = dialog.set_directory(dir);
                    }
                    if let Some(path) = dialog.save_file() {
                        action = Some(PlaylistAction::Save(list.clone(), path));
                    }
                }
                if ui.button("Cancel").clicked() {
                    close = true;
                }
            });
        });

        if close {
            self.list = None;
        }
        action
    }
}

// ── Rename ──────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RenameDialog {
    target: Option<(usize, String)>,
}

impl RenameDialog {
    pub fn open(&mut self, index: usize, current_name: String) {
        self.target = Some((index, current_name));
    }

    /// Returns `(index, new file name)` on confirm.
    pub fn show(&mut self, ctx: &egui::Context) -> Option<(usize, String)> {
        let (index, name) = self.target.as_mut()?;
        let mut result = None;
        let mut close = escape_pressed(ctx);
        let confirm = enter_pressed(ctx);

        modal("Rename").show(ctx, |ui| {
            ui.label("New file name:");
            ui.text_edit_singleline(name).request_focus();
            ui.horizontal(|ui| {
                if ui.button("Rename").clicked() || confirm {
                    result = Some((*index, name.clone()));
                    close = true;
                }
                if ui.button("Cancel").clicked() {
                    close = true;
                }
            });
        });

        if close {
            self.target = None;
        }
        result
    }
}

// ── Informational windows ───────────────────────────────────────────────────

pub fn show_about(ctx: &egui::Context, open: &mut bool) {
    egui::Window::new("About eepee")
        .open(open)
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.heading(format!("eepee {}", env!("CARGO_PKG_VERSION")));
            ui.label("A viewer for electrophysiology tracings.");
            ui.label("Calibrate, measure with calipers, doodle, crop and rotate,");
            ui.label("and page through studies with playlists.");
        });
}

fn shortcut_grid(ui: &mut egui::Ui, ctx: &egui::Context) {
    egui::Grid::new("shortcut_grid")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui| {
            for cmd in Command::ALL {
                if let Some(shortcut) = cmd.shortcut() {
                    ui.monospace(ctx.format_shortcut(&shortcut));
                    ui.label(cmd.label());
                    ui.end_row();
                }
            }
            ui.monospace("Left click");
            ui.label("Start a caliper (next clicks place its legs), or grab one");
            ui.end_row();
            ui.monospace("Right click");
            ui.label("Remove caliper under the pointer");
            ui.end_row();
        });
}

pub fn show_shortcuts(ctx: &egui::Context, open: &mut bool) {
    egui::Window::new("Keyboard shortcuts")
        .open(open)
        .collapsible(false)
        .show(ctx, |ui| shortcut_grid(ui, ctx));
}

/// Shown when entering fullscreen. Returns `true` when the user asked not
/// to see it again.
pub fn show_fullscreen_help(ctx: &egui::Context, open: &mut bool, dont_show: &mut bool) -> bool {
    if !*open {
        return false;
    }
    let mut done = enter_pressed(ctx) || escape_pressed(ctx);
    modal("Fullscreen").show(ctx, |ui| {
        ui.label("You are entering fullscreen mode.");
        ui.label(format!(
            "Press {} to leave it at any time.",
            Command::ToggleFullscreen
                .shortcut()
                .map(|s| ctx.format_shortcut(&s))
                .unwrap_or_default()
        ));
        ui.separator();
        shortcut_grid(ui, ctx);
        ui.separator();
        ui.checkbox(dont_show, "Do not show this message again");
        if ui.button("OK").clicked() {
            done = true;
        }
    });
    if done {
        *open = false;
        return *dont_show;
    }
    false
}
