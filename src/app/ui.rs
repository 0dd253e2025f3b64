use chrono::Datelike;
use eframe::egui::{self, Align, Align2, Layout, RichText};
use rfd::FileDialog;

use super::{Command, NavTab, VCardManager};
use crate::persistence::KeyValueStore;
use crate::render::{self, FileLogTable, SELECT_CARD_PLACEHOLDER};
use crate::upload::Validity;
use crate::utils::{color, format_size};

impl<S: KeyValueStore> VCardManager<S> {
    pub fn render(&mut self, ctx: &egui::Context) {
        let mut commands = Vec::new();

        self.render_nav(ctx);
        self.render_footer(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            let now = ui.input(|i| i.time);
            let mut page = egui::ScrollArea::vertical()
                .id_source("page")
                .auto_shrink([false, false]);
            if let Some(offset) = self.controller.animated_offset(now) {
                page = page.vertical_scroll_offset(offset);
                ctx.request_repaint();
            }

            let output = page.show(ui, |ui| {
                ui.add_space(10.0);
                self.render_file_log_section(ui, &mut commands);
                ui.add_space(30.0);
                self.render_card_view_section(ui, &mut commands);
                ui.add_space(20.0);
            });

            self.scroll_offset = output.state.offset.y;
            self.controller.toggle_back_to_top(self.scroll_offset);
        });

        self.render_back_to_top(ctx);

        for command in commands {
            self.execute(command);
        }
    }

    fn render_nav(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("nav").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("vCard Manager");
                ui.add_space(20.0);
                for tab in NavTab::ALL {
                    let active = self.controller.state.nav == tab;
                    if ui.selectable_label(active, tab.label()).clicked() {
                        self.controller.toggle_nav_tab(tab);
                        self.scroll_to_section = Some(tab);
                    }
                }
            });
        });
    }

    fn section_heading(&mut self, ui: &mut egui::Ui, tab: NavTab) {
        let response = ui.heading(tab.label());
        if self.scroll_to_section == Some(tab) {
            response.scroll_to_me(Some(Align::TOP));
            self.scroll_to_section = None;
        }
        ui.separator();
    }

    fn render_status_panel(&mut self, ui: &mut egui::Ui, surface: u8) {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.strong("Status");
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if ui.button("🗑 Clear").clicked() {
                        self.controller.clear_status();
                    }
                });
            });

            let mut text = self.controller.state.status.text();
            egui::ScrollArea::vertical()
                .id_source(("status", surface))
                .max_height(110.0)
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut text)
                            .desired_rows(5)
                            .desired_width(f32::INFINITY)
                            .font(egui::TextStyle::Monospace),
                    );
                });
        });
    }

    fn render_file_log_section(&mut self, ui: &mut egui::Ui, commands: &mut Vec<Command>) {
        self.section_heading(ui, NavTab::FileLog);
        self.render_status_panel(ui, 1);
        ui.add_space(10.0);
        self.render_upload_form(ui, commands);
        ui.add_space(10.0);
        self.render_file_log_table(ui, commands);
    }

    fn render_upload_form(&mut self, ui: &mut egui::Ui, commands: &mut Vec<Command>) {
        ui.group(|ui| {
            ui.label("Upload a card (.vcf or .vcard)");
            ui.horizontal(|ui| {
                let upload = &self.controller.state.upload;
                let border = match upload.validity {
                    Validity::Valid => color::valid(),
                    Validity::Invalid => color::invalid(),
                    Validity::Unchecked => ui.visuals().widgets.inactive.bg_stroke.color,
                };
                let mut display = upload.display.as_str();
                egui::Frame::none()
                    .stroke(egui::Stroke::new(1.5, border))
                    .rounding(4.0)
                    .inner_margin(2.0)
                    .show(ui, |ui| {
                        ui.add(
                            egui::TextEdit::singleline(&mut display)
                                .hint_text("Choose a file...")
                                .desired_width(280.0),
                        );
                    });

                if ui.button("📁 Browse").clicked() {
                    if let Some(path) = FileDialog::new()
                        .set_title("Choose a vCard file")
                        .pick_file()
                    {
                        let size = std::fs::metadata(&path).ok().map(|meta| meta.len());
                        self.controller.choose_upload_file(path, size);
                    }
                }

                let enabled = self.controller.state.upload.can_upload();
                if ui
                    .add_enabled(enabled, egui::Button::new("📤 Upload"))
                    .clicked()
                {
                    commands.extend(self.controller.submit_upload());
                }
            });

            let upload = &self.controller.state.upload;
            if upload.in_flight {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(format!("Uploading {}...", upload.display));
                });
            } else if upload.validity == Validity::Invalid {
                ui.colored_label(color::invalid(), "Only .vcf and .vcard files can be uploaded");
            } else if let (Validity::Valid, Some(size)) = (upload.validity, upload.size) {
                ui.colored_label(
                    color::valid(),
                    format!("{} ({})", upload.display, format_size(size)),
                );
            }
        });
    }

    fn render_file_log_table(&mut self, ui: &mut egui::Ui, commands: &mut Vec<Command>) {
        let mut clicked = None;
        egui::Grid::new("file_log_table")
            .striped(true)
            .num_columns(3)
            .min_col_width(140.0)
            .show(ui, |ui| {
                ui.strong("File name (click to download)");
                ui.strong("Individual's name");
                ui.strong("Additional properties");
                ui.end_row();

                match &self.controller.state.file_log {
                    FileLogTable::Loading => {
                        ui.spinner();
                        ui.end_row();
                    }
                    FileLogTable::Unavailable => {}
                    FileLogTable::Empty => {
                        for cells in self.controller.state.file_log.cells() {
                            for cell in cells {
                                ui.label(cell);
                            }
                            ui.end_row();
                        }
                    }
                    FileLogTable::Rows(rows) => {
                        for row in rows {
                            let link = ui
                                .link(row.link.label.as_str())
                                .on_hover_text(row.link.href.as_str());
                            if link.clicked() {
                                clicked = Some(row.link.clone());
                            }
                            ui.label(row.individual_name.as_str());
                            ui.label(row.additional_properties.as_str());
                            ui.end_row();
                        }
                    }
                }
            });

        if let Some(link) = clicked {
            commands.push(self.controller.log_download(&link.label, &link.href));
        }
    }

    fn render_card_view_section(&mut self, ui: &mut egui::Ui, commands: &mut Vec<Command>) {
        self.section_heading(ui, NavTab::CardView);
        self.render_status_panel(ui, 2);
        ui.add_space(10.0);

        let state = &self.controller.state;
        let current = state.card_view.selected;
        let mut choice = current;
        let selected_text = state
            .selected_option()
            .map(|option| option.label.clone())
            .unwrap_or_else(|| SELECT_CARD_PLACEHOLDER.to_string());

        ui.horizontal(|ui| {
            ui.label("Card:");
            egui::ComboBox::from_id_source("card_view_dropdown")
                .selected_text(selected_text)
                .width(280.0)
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut choice, None, SELECT_CARD_PLACEHOLDER);
                    for option in &state.card_options {
                        ui.selectable_value(&mut choice, Some(option.value), option.label.as_str());
                    }
                });
        });

        if choice != current {
            commands.extend(self.controller.select_card(choice));
        }

        ui.add_space(10.0);
        egui::Grid::new("card_view_table")
            .striped(true)
            .num_columns(3)
            .min_col_width(60.0)
            .show(ui, |ui| {
                ui.strong("#");
                ui.strong("Property Name");
                ui.strong("Values");
                ui.end_row();

                for row in &self.controller.state.card_view.rows {
                    ui.label(row.number.to_string());
                    ui.label(row.name.as_str());
                    ui.label(row.values.as_str());
                    ui.end_row();
                }
            });
    }

    fn render_back_to_top(&mut self, ctx: &egui::Context) {
        if !self.controller.state.back_to_top.visible {
            return;
        }

        egui::Area::new(egui::Id::new("back_to_top"))
            .anchor(Align2::RIGHT_BOTTOM, egui::vec2(-20.0, -40.0))
            .show(ctx, |ui| {
                let button = egui::Button::new(RichText::new("⬆").size(18.0))
                    .fill(color::accent());
                if ui.add(button).on_hover_text("Back to top").clicked() {
                    let now = ctx.input(|i| i.time);
                    self.controller.scroll_to_top(self.scroll_offset, now);
                    ctx.request_repaint();
                }
            });
    }

    fn render_footer(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                let year = chrono::Local::now().year();
                ui.label(
                    RichText::new(render::copyright(year))
                        .color(ui.visuals().text_color().gamma_multiply(0.7)),
                );
            });
        });
    }
}
