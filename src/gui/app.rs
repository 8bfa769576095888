// Main application state and UI rendering logic for HDD Doctor

// Reusable card widgets and colours
use crate::gui::{section_card, stat_card, status_color, verdict_color};
// Configuration shared with the scanner
use crate::config::AppConfig;
// Attribute row classification
use crate::diagnostics::attribute_status;
// Disk, report and partition models
use crate::models::{DeviceReport, DiskEntry, InfoField, PartitionInfo};
// External tools: lsblk, smartctl, shred
use crate::scanner::{self, EraseMonitor, EraseOutcome};
// Import egui for UI rendering
use eframe::egui;
use log::{error, info, warn};

/// Which step of the erase confirmation is showing.
#[derive(Clone, Debug, PartialEq)]
enum EraseConfirm {
    Hidden,
    /// First warning, lists mounted filesystems found when it opened
    First {
        disk: DiskEntry,
        mounts: Result<Vec<String>, String>,
    },
    /// Last chance before shred starts
    Final(DiskEntry),
}

impl EraseConfirm {
    /// First confirmation step. Mounts are checked here once, not on every frame.
    fn first(config: &AppConfig, disk: DiskEntry) -> Self {
        let mounts: Result<Vec<String>, String> = scanner::mounted_partitions(config, &disk.name)
            .map(|parts| parts.into_iter().map(|p| p.mount_point).collect())
            .map_err(|e| e.to_string());
        EraseConfirm::First { disk, mounts }
    }
}

/// Main application state for the eframe app.
/// Holds the selected disk, its latest diagnosis and the running erase job.
pub struct AppState {
    /// Tool paths and timeouts
    config: AppConfig,

    /// Disks listed by lsblk
    disks: Vec<DiskEntry>,

    /// Index of currently selected disk in the disks vector
    selected: Option<usize>,

    /// Diagnosis of the selected disk, rebuilt on every query
    report: Option<DeviceReport>,

    /// Mounted filesystems on the selected disk
    partitions: Vec<PartitionInfo>,

    /// Last error message if listing disks failed
    last_error: Option<String>,

    /// Whether we run with root privileges
    is_root: bool,

    /// At most one shred job and its progress
    erase: EraseMonitor,

    /// Confirmation dialog state
    confirm: EraseConfirm,

    /// Message shown once an erase ends
    erase_message: Option<String>,
}

impl AppState {
    /// Creates a new application state instance.
    /// Sets light theme and lists the disks.
    ///
    /// # Arguments
    /// * `cc` - eframe creation context containing egui context
    /// * `config` - tool paths and timeouts
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        // Configure light theme for consistent appearance
        cc.egui_ctx.set_visuals(egui::Visuals::light());

        let mut s = Self {
            config,
            disks: Vec::new(),
            selected: None,
            report: None,
            partitions: Vec::new(),
            last_error: None,
            is_root: scanner::is_root(),
            erase: EraseMonitor::new(),
            confirm: EraseConfirm::Hidden,
            erase_message: None,
        };

        s.refresh();
        s
    }

    /// Re-lists disks with lsblk and keeps the selection if the disk is still there.
    fn refresh(&mut self) {
        self.last_error = None;
        let previous = self.selected_disk().map(|d| d.path.clone());

        match scanner::list_disks(&self.config) {
            Ok(list) => {
                self.disks = list;
                self.selected = previous.and_then(|p| self.disks.iter().position(|d| d.path == p));
                if self.selected.is_none() {
                    self.report = None;
                    self.partitions.clear();
                }
            }
            Err(e) => {
                // Clear disks and store error for display
                error!("listing disks failed: {}", e);
                self.disks.clear();
                self.selected = None;
                self.report = None;
                self.last_error = Some(e.to_string());
            }
        }
    }

    fn selected_disk(&self) -> Option<&DiskEntry> {
        self.selected.and_then(|i| self.disks.get(i))
    }

    /// Selects a disk and diagnoses it from fresh smartctl output.
    fn select(&mut self, index: usize) {
        self.selected = Some(index);
        self.diagnose_selected();
    }

    fn diagnose_selected(&mut self) {
        let Some(disk) = self.selected_disk().cloned() else {
            return;
        };
        info!("diagnosing {}", disk.path);
        self.report = Some(scanner::diagnose_disk(&self.config, &disk));
        self.partitions = match scanner::mounted_partitions(&self.config, &disk.name) {
            Ok(parts) => parts,
            Err(e) => {
                warn!("could not list mounts on {}: {}", disk.path, e);
                Vec::new()
            }
        };
    }



    /// Drains erase events and reacts to the job ending.
    fn poll_erase(&mut self) {
        let was_running = self.erase.is_running();
        self.erase.poll();

        if was_running && !self.erase.is_running() {
            let device = self.erase.device().unwrap_or("?").to_string();
            self.erase_message = Some(match self.erase.outcome() {
                Some(EraseOutcome::Completed) => format!("'{}' was erased.", device),
                Some(EraseOutcome::Failed { code, detail }) => {
                    let detail = detail.trim();
                    format!(
                        "Erasing '{}' failed.\nExit code: {}\nDetail: {}",
                        device,
                        code.map(|c| c.to_string()).unwrap_or_else(|| "none".into()),
                        if detail.is_empty() { "none" } else { detail }
                    )
                }
                None => format!("Erase of '{}' ended.", device),
            });
            // Show the drive state after the erase
            if self.selected_disk().map(|d| d.path.as_str()) == Some(device.as_str()) {
                self.diagnose_selected();
            }
        }
    }

    fn start_erase(&mut self, disk: &DiskEntry) {
        if let Err(e) = self.erase.start(&self.config, &disk.path) {
            error!("could not start erase on {}: {}", disk.path, e);
            self.erase_message = Some(format!("Could not start the erase: {}", e));
        }
    }

    /// Popup shown after an erase ends or fails to start.
    fn message_dialog(&mut self, ctx: &egui::Context) {
        let Some(message) = self.erase_message.clone() else {
            return;
        };
        let mut close = false;
        egui::Window::new("Secure erase")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message);
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    close = true;
                }
            });
        if close {
            self.erase_message = None;
        }
    }
}

impl eframe::App for AppState {
    /// Main UI update function called every frame.
    /// Drains erase events, renders sidebar with disk list, detail panel and dialogs.
    ///
    /// # Arguments
    /// * `ctx` - egui context for rendering
    /// * `_frame` - eframe frame (unused)
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_erase();
        // Keep polling shred output while a job runs
        if self.erase.is_running() {
            ctx.request_repaint_after(self.config.poll_interval);
        }

        // LEFT SIDEBAR: disk list
        egui::SidePanel::left("disk_panel")
            .resizable(false)
            .exact_width(240.0)
            .show(ctx, |ui| {
                ui.add_space(10.0);

                // Header with title and refresh button
                ui.horizontal(|ui| {
                    ui.heading(egui::RichText::new("Disks").size(18.0).strong());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let refresh_btn = egui::Button::new(egui::RichText::new("🔄").size(14.0)).frame(false);
                        if ui.add(refresh_btn).on_hover_text("Refresh").clicked() {
                            self.refresh();
                        }
                    });
                });

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                let mut clicked = None;
                for (i, d) in self.disks.iter().enumerate() {
                    let is_selected = self.selected == Some(i);

                    // Change appearance based on selection state
                    let frame = if is_selected {
                        egui::Frame::none()
                            .fill(egui::Color32::from_rgb(220, 235, 255))
                            .stroke(egui::Stroke::new(2.0, egui::Color32::from_rgb(70, 130, 220)))
                            .rounding(8.0)
                            .inner_margin(12.0)
                    } else {
                        egui::Frame::none()
                            .fill(egui::Color32::from_rgb(250, 250, 250))
                            .stroke(egui::Stroke::new(1.0, egui::Color32::from_gray(220)))
                            .rounding(8.0)
                            .inner_margin(12.0)
                    };

                    // Disk card showing path, size and model
                    let response = frame.show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.vertical(|ui| {
                            ui.label(egui::RichText::new(&d.path).strong().size(14.0));
                            ui.add_space(2.0);
                            ui.label(
                                egui::RichText::new(format!("{}  {}", d.size, d.model))
                                    .size(11.0)
                                    .color(egui::Color32::from_gray(100)),
                            );
                        });
                    });

                    if response.response.interact(egui::Sense::click()).clicked() {
                        clicked = Some(i);
                    }
                    ui.add_space(8.0);
                }
                if let Some(i) = clicked {
                    self.select(i);
                }

                if !self.is_root {
                    ui.add_space(10.0);
                    ui.colored_label(
                        egui::Color32::from_rgb(217, 119, 6),
                        "Not running as root: smartctl and shred will likely fail.",
                    );
                }

                // Display error message if present
                if let Some(err) = &self.last_error {
                    ui.add_space(10.0);
                    ui.separator();
                    ui.add_space(10.0);
                    ui.colored_label(egui::Color32::RED, err);
                }
            });

        // CENTRAL PANEL: details of the selected disk
        let mut erase_request = None;
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::from_rgb(245, 247, 250)))
            .show(ctx, |ui| {
                if self.disks.is_empty() {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.heading("No disks detected");
                            ui.add_space(8.0);
                            ui.label("Make sure lsblk and smartctl are installed and run as root");
                        });
                    });
                    return;
                }

                let selected = self.selected.and_then(|i| self.disks.get(i)).cloned();
                let (Some(disk), Some(report)) = (selected, self.report.as_ref()) else {
                    ui.centered_and_justified(|ui| {
                        ui.label("Select a disk to run a health check");
                    });
                    return;
                };

                let mut erase_clicked = false;
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.add_space(20.0);
                    header_card(ui, &disk, report);
                    ui.add_space(12.0);

                    // Quick facts
                    let card_width = 190.0;
                    let card_height = 70.0;
                    let card_spacing = 11.0;
                    let value = |field| report.info.get(field).map(|v| v.to_string()).unwrap_or("--".into());
                    ui.horizontal(|ui| {
                        ui.add_space(20.0);
                        stat_card(ui, card_width, card_height, "Capacity", &value(InfoField::UserCapacity), egui::Color32::from_rgb(59, 130, 246));
                        ui.add_space(card_spacing);
                        stat_card(ui, card_width, card_height, "Power on hours", &value(InfoField::PowerOnHours), egui::Color32::from_rgb(168, 85, 247));
                        ui.add_space(card_spacing);
                        stat_card(ui, card_width, card_height, "Power cycles", &value(InfoField::PowerCycleCount), egui::Color32::from_rgb(34, 197, 94));
                        ui.add_space(card_spacing);
                        stat_card(ui, card_width, card_height, "Rotation", &value(InfoField::RotationRate), egui::Color32::from_rgb(251, 146, 60));
                    });
                    ui.add_space(12.0);

                    // Identity fields
                    section_card(ui, "Drive Information", |ui| {
                        egui::Grid::new("info_grid").striped(true).spacing([15.0, 6.0]).show(ui, |ui| {
                            if report.info.is_empty() {
                                ui.label(egui::RichText::new("No device information").size(11.0));
                                ui.end_row();
                            }
                            for (field, value) in report.info.iter() {
                                ui.label(egui::RichText::new(field.label()).strong().size(11.0));
                                ui.label(egui::RichText::new(value.to_string()).size(11.0));
                                ui.end_row();
                            }
                        });
                    });
                    ui.add_space(12.0);

                    // Band note and warnings
                    section_card(ui, "Notes", |ui| {
                        ui.label(egui::RichText::new(report.result.notes()).size(12.0));
                    });
                    ui.add_space(12.0);

                    attribute_table(ui, report);

                    if !self.partitions.is_empty() {
                        ui.add_space(12.0);
                        partition_table(ui, &self.partitions);
                    }
                    ui.add_space(12.0);

                    // Secure erase controls
                    section_card(ui, "Secure Erase", |ui| {
                        ui.horizontal(|ui| {
                            let button = egui::Button::new(
                                egui::RichText::new("Erase disk (zero fill)").color(egui::Color32::WHITE),
                            )
                            .fill(egui::Color32::from_rgb(220, 38, 38));
                            if ui.add_enabled(!self.erase.is_running(), button).clicked() {
                                erase_clicked = true;
                            }
                            ui.add_space(12.0);
                            ui.label(egui::RichText::new(self.erase.progress_label()).size(13.0).strong());
                            if let Some(device) = self.erase.device() {
                                ui.label(egui::RichText::new(device).size(11.0).color(egui::Color32::from_gray(120)));
                            }
                        });
                    });
                    ui.add_space(15.0);
                });

                if erase_clicked {
                    erase_request = Some(disk);
                }
            });

        if let Some(disk) = erase_request {
            self.confirm = EraseConfirm::first(&self.config, disk);
        }

        if let Some(disk) = confirm_dialog(ctx, &mut self.confirm) {
            self.start_erase(&disk);
        }
        self.message_dialog(ctx);
    }
}

/// Two-step confirmation before shred is started. Returns the disk once the
/// final step is accepted.
fn confirm_dialog(ctx: &egui::Context, confirm: &mut EraseConfirm) -> Option<DiskEntry> {
    let mut next = None;
    let mut launch = None;

    match confirm.clone() {
        EraseConfirm::Hidden => {}
        EraseConfirm::First { disk, mounts } => {
            egui::Window::new("Dangerous operation")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(format!("Selected disk: {} ({})", disk.display_name(), disk.path));
                    ui.add_space(6.0);
                    ui.label("This will IRREVERSIBLY destroy ALL data on the selected disk.");
                    let mount_warning = match &mounts {
                        Ok(list) if list.is_empty() => None,
                        Ok(list) => Some(format!("Mounted filesystems: {}", list.join(", "))),
                        Err(e) => Some(format!("Could not check mounted filesystems: {}", e)),
                    };
                    if let Some(text) = mount_warning {
                        ui.add_space(6.0);
                        ui.colored_label(egui::Color32::from_rgb(220, 38, 38), text);
                    }
                    ui.add_space(10.0);
                    ui.horizontal(|ui| {
                        if ui.button("Yes, continue").clicked() {
                            next = Some(EraseConfirm::Final(disk.clone()));
                        }
                        if ui.button("No").clicked() {
                            next = Some(EraseConfirm::Hidden);
                        }
                    });
                });
        }
        EraseConfirm::Final(disk) => {
            egui::Window::new("Last warning: data loss")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.colored_label(
                        egui::Color32::from_rgb(220, 38, 38),
                        format!(
                            "There is no way back! Every byte on {} will be overwritten with zeros.",
                            disk.path
                        ),
                    );
                    ui.add_space(10.0);
                    ui.horizontal(|ui| {
                        if ui.button("Erase").clicked() {
                            launch = Some(disk.clone());
                            next = Some(EraseConfirm::Hidden);
                        }
                        if ui.button("Cancel").clicked() {
                            next = Some(EraseConfirm::Hidden);
                        }
                    });
                });
        }
    }

    if let Some(state) = next {
        *confirm = state;
    }
    launch
}

/// Model name with the health badge on the right.
fn header_card(ui: &mut egui::Ui, disk: &DiskEntry, report: &DeviceReport) {
    ui.horizontal(|ui| {
        ui.add_space(20.0);
        egui::Frame::none()
            .fill(egui::Color32::WHITE)
            .stroke(egui::Stroke::new(1.0, egui::Color32::from_gray(230)))
            .rounding(12.0)
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width() - 40.0);

                ui.horizontal(|ui| {
                    ui.vertical(|ui| {
                        let model = report.info.text(InfoField::DeviceModel).unwrap_or("Unknown Drive");
                        ui.heading(egui::RichText::new(model).size(22.0));
                        ui.add_space(4.0);
                        ui.label(
                            egui::RichText::new(format!("{}  •  {}", disk.path, disk.size))
                                .size(16.0)
                                .color(egui::Color32::from_gray(100)),
                        );
                    });

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let verdict = report.result.verdict();
                        egui::Frame::none()
                            .fill(verdict_color(verdict))
                            .rounding(8.0)
                            .inner_margin(egui::vec2(20.0, 10.0))
                            .show(ui, |ui| {
                                ui.vertical_centered(|ui| {
                                    ui.label(
                                        egui::RichText::new(verdict.label())
                                            .color(egui::Color32::WHITE)
                                            .size(14.0)
                                            .strong(),
                                    );
                                    ui.label(
                                        egui::RichText::new(report.result.score().to_string())
                                            .color(egui::Color32::WHITE)
                                            .size(28.0)
                                            .strong(),
                                    );
                                });
                            });
                    });
                });
            });
        ui.add_space(20.0);
    });
}

/// SMART attribute rows, coloured by status.
fn attribute_table(ui: &mut egui::Ui, report: &DeviceReport) {
    section_card(ui, "SMART Attributes", |ui| {
        if report.attributes.is_empty() {
            ui.label(egui::RichText::new("No attribute table available").size(11.0));
            return;
        }
        egui::Grid::new("attr_grid").striped(true).spacing([20.0, 6.0]).show(ui, |ui| {
            for header in &["ID", "Name", "Current", "Worst", "Threshold", "Type", "Raw Value"] {
                ui.label(egui::RichText::new(*header).strong().size(11.0));
            }
            ui.end_row();

            for attr in &report.attributes {
                let color = status_color(attribute_status(attr));
                let cells = [
                    attr.id.to_string(),
                    attr.name.clone(),
                    attr.current.to_string(),
                    attr.worst.to_string(),
                    attr.threshold.to_string(),
                    attr.kind.clone(),
                    attr.raw_value.to_string(),
                ];
                for cell in cells {
                    ui.label(egui::RichText::new(cell).size(11.0).color(color));
                }
                ui.end_row();
            }
        });
    });
}

/// Partition table showing mount points and space usage.
fn partition_table(ui: &mut egui::Ui, partitions: &[PartitionInfo]) {
    section_card(ui, "Mounted Partitions", |ui| {
        egui::Grid::new("part_grid").striped(true).spacing([25.0, 10.0]).show(ui, |ui| {
            for header in &["Mount point", "Type", "Total", "Used", "Free", "Free%"] {
                ui.label(egui::RichText::new(*header).strong().size(11.0));
            }
            ui.end_row();

            for part in partitions {
                ui.label(egui::RichText::new(&part.mount_point).size(11.0));
                ui.label(egui::RichText::new(&part.fs_type).size(11.0));
                ui.label(egui::RichText::new(format!("{:.1} GB", part.total_gb)).size(11.0));
                ui.label(egui::RichText::new(format!("{:.1} GB", part.used_gb)).size(11.0));
                ui.label(egui::RichText::new(format!("{:.1} GB", part.free_gb)).size(11.0));

                // Calculate free percentage and color code it
                let free_pct = 100.0 - part.used_percent;
                let color = if free_pct < 10.0 {
                    egui::Color32::from_rgb(239, 68, 68) // Red: critical
                } else if free_pct < 25.0 {
                    egui::Color32::from_rgb(245, 158, 11) // Orange: warning
                } else {
                    egui::Color32::from_rgb(34, 197, 94) // Green: good
                };
                ui.colored_label(color, egui::RichText::new(format!("{:.1}%", free_pct)).size(11.0));
                ui.end_row();
            }
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn disk() -> DiskEntry {
        DiskEntry {
            path: "/dev/sdz".into(),
            name: "sdz".into(),
            size: "1T".into(),
            model: "Test Disk".into(),
        }
    }

    #[test]
    fn first_step_records_mount_check_failure() {
        let config = AppConfig { lsblk: PathBuf::from("/nonexistent/lsblk"), ..AppConfig::default() };
        let EraseConfirm::First { disk: shown, mounts } = EraseConfirm::first(&config, disk()) else {
            panic!("expected the first confirmation step");
        };
        assert_eq!(shown, disk());
        assert!(mounts.unwrap_err().contains("/nonexistent/lsblk"));
    }

    #[test]
    fn dialog_redraws_from_stored_mounts() {
        let ctx = egui::Context::default();
        let opened = EraseConfirm::First { disk: disk(), mounts: Ok(vec!["/".to_string(), "/home".to_string()]) };
        let mut confirm = opened.clone();

        for _ in 0..3 {
            let mut launched = None;
            let _ = ctx.run(egui::RawInput::default(), |ctx| {
                launched = confirm_dialog(ctx, &mut confirm);
            });
            assert_eq!(launched, None);
        }
        assert_eq!(confirm, opened);
    }

    #[test]
    fn hidden_dialog_launches_nothing() {
        let ctx = egui::Context::default();
        let mut confirm = EraseConfirm::Hidden;
        let mut launched = None;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            launched = confirm_dialog(ctx, &mut confirm);
        });
        assert_eq!(launched, None);
        assert_eq!(confirm, EraseConfirm::Hidden);
    }
}
