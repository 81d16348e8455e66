//! Main application struct for Oralia
//!
//! Contains the OraliaApp which implements eframe::App and manages the
//! three tabs (Practical, Theory, Settings), the MIDI listener, the shared
//! state store, and the per-frame note-event pump.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use egui::{Align, Layout, RichText};
use rtrb::Consumer;

use crate::engine::{
    classify, DeviceSelector, MidiEvent, MidiListener, NoteDispatcher, NoteEvent,
};
use crate::state::{SharedStore, StoreError};
use crate::theory::{reference, DrillMode, NoteName, TheoryReference, DRILL_MODES};
use crate::widgets::{piano, ActiveNotes, PianoConfig};

use super::theme;

/// Which tab is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Practical,
    Theory,
    Settings,
}

impl Tab {
    fn name(&self) -> &'static str {
        match self {
            Tab::Practical => "Practical",
            Tab::Theory => "Theory",
            Tab::Settings => "Settings",
        }
    }
}

const TABS: [Tab; 3] = [Tab::Practical, Tab::Theory, Tab::Settings];

/// Device choice: the store's `midi_device` key names a preferred port,
/// otherwise the first available input is used.
fn selector_from(store: &SharedStore) -> DeviceSelector {
    match store.get("midi_device") {
        Some(name) if !name.is_empty() => DeviceSelector::ByName(name.to_string()),
        _ => DeviceSelector::FirstAvailable,
    }
}

/// Main application state.
pub struct OraliaApp {
    /// Shared key-value store, single instance for the whole app.
    store: SharedStore,
    /// Last persistence error, shown in the status bar.
    store_error: Option<String>,
    /// Key count mirror updated through a store subscription.
    state_summary: Rc<RefCell<String>>,

    /// MIDI input listener.
    listener: MidiListener,
    /// Consumer side of the listener's bounded event buffer.
    midi_rx: Consumer<MidiEvent>,
    /// Last MIDI error, shown in the toolbar.
    midi_error: Option<String>,

    /// Observer list fed from the event pump.
    dispatcher: NoteDispatcher,
    /// Currently held keys, shared with the dispatcher's observers.
    active_notes: Rc<RefCell<ActiveNotes>>,
    /// Name of the most recently pressed note, for the inversion label.
    last_note: Rc<RefCell<Option<String>>>,

    /// Key-rendering reference dataset, loaded once at startup.
    theory_reference: Rc<TheoryReference>,
    piano_config: PianoConfig,

    selected_tab: Tab,

    // Practical tab selections.
    drill_mode: Option<DrillMode>,
    drill_variants: Vec<String>,
    drill_options: Vec<String>,

    // Settings tab inputs.
    key_input: String,
    value_input: String,
    settings_status: String,

    theme_applied: bool,
}

impl OraliaApp {
    /// Create the app, loading persisted state and connecting the first
    /// available MIDI input. Both failures are survivable: the store falls
    /// back to memory-only and the app runs without live input.
    pub fn new(state_path: PathBuf, reference_path: PathBuf) -> Self {
        let (store, store_error) = match SharedStore::open(&state_path) {
            Ok(store) => (store, None),
            Err(e) => {
                log::warn!("failed to load shared state: {}", e);
                // Memory-only fallback against the same path; later writes
                // may still succeed.
                (SharedStore::empty(&state_path), Some(e.to_string()))
            }
        };

        let theory_reference = Rc::new(reference::load_or_default(&reference_path));
        if theory_reference.is_empty() {
            log::warn!("running with empty reference data; key overlays degrade to flat colors");
        }

        match MidiListener::list_inputs() {
            Ok(ports) if ports.is_empty() => log::warn!("no MIDI input ports found"),
            Ok(ports) => log::info!("MIDI inputs available: {}", ports.join(", ")),
            Err(e) => log::warn!("could not enumerate MIDI inputs: {}", e),
        }

        let (mut listener, midi_rx) = MidiListener::new();
        let midi_error = match listener.start(&selector_from(&store)) {
            Ok(port) => {
                log::info!("listening on {}", port);
                None
            }
            Err(e) => {
                log::warn!("no live MIDI input: {}", e);
                Some(e.to_string())
            }
        };

        let mut app = Self {
            store,
            store_error,
            state_summary: Rc::new(RefCell::new(String::new())),
            listener,
            midi_rx,
            midi_error,
            dispatcher: NoteDispatcher::new(),
            active_notes: Rc::new(RefCell::new(ActiveNotes::new())),
            last_note: Rc::new(RefCell::new(None)),
            theory_reference,
            piano_config: PianoConfig::default(),
            selected_tab: Tab::Practical,
            drill_mode: None,
            drill_variants: Vec::new(),
            drill_options: Vec::new(),
            key_input: String::new(),
            value_input: String::new(),
            settings_status: String::new(),
            theme_applied: false,
        };
        app.register_observers();
        app
    }

    /// Wire the note-event observers and the store subscription. All of these
    /// run on the UI thread, inside the frame that triggered them.
    fn register_observers(&mut self) {
        {
            let active_notes = Rc::clone(&self.active_notes);
            let reference = Rc::clone(&self.theory_reference);
            self.dispatcher.subscribe(move |event| {
                active_notes.borrow_mut().apply(event, &reference);
            });
        }
        {
            let last_note = Rc::clone(&self.last_note);
            self.dispatcher.subscribe(move |event| {
                if let NoteEvent::Activated { note, .. } = event {
                    *last_note.borrow_mut() = Some(NoteName::from_midi(*note).to_string());
                }
            });
        }
        {
            let summary = Rc::clone(&self.state_summary);
            self.store.subscribe(move |data| {
                *summary.borrow_mut() = format!("{} keys", data.len());
            });
        }
    }

    /// Drain the MIDI buffer and dispatch the resulting note events.
    /// Runs once per frame on the UI thread.
    fn pump_midi_events(&mut self) {
        while let Ok(event) = self.midi_rx.pop() {
            if let Some(note_event) = classify(event) {
                self.dispatcher.dispatch(&note_event);
            }
        }
    }

    /// Record a store mutation result for the status bar.
    fn note_store_result(&mut self, result: Result<(), StoreError>) {
        match result {
            Ok(()) => self.store_error = None,
            Err(e) => {
                log::error!("{}", e);
                self.store_error = Some(e.to_string());
            }
        }
    }

    fn reconnect_midi(&mut self) {
        self.active_notes.borrow_mut().clear();
        match self.listener.start(&selector_from(&self.store)) {
            Ok(port) => {
                log::info!("reconnected to {}", port);
                self.midi_error = None;
            }
            Err(e) => {
                log::warn!("reconnect failed: {}", e);
                self.midi_error = Some(e.to_string());
            }
        }
    }

    fn stop_midi(&mut self) {
        self.listener.stop();
        self.active_notes.borrow_mut().clear();
    }

    /// Draw the top toolbar with the tab bar and MIDI status.
    fn draw_toolbar(&mut self, ui: &mut egui::Ui) -> ToolbarActions {
        let mut actions = ToolbarActions::default();

        ui.horizontal(|ui| {
            ui.add_space(8.0);
            ui.label(
                RichText::new("ORALIA")
                    .size(18.0)
                    .color(theme::text::PRIMARY)
                    .strong(),
            );

            ui.add_space(16.0);
            ui.separator();

            for tab in TABS {
                let selected = self.selected_tab == tab;
                if ui.selectable_label(selected, tab.name()).clicked() {
                    self.selected_tab = tab;
                }
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                match (self.listener.is_running(), &self.midi_error) {
                    (true, _) => {
                        if ui.button("Disconnect").clicked() {
                            actions.stop_midi = true;
                        }
                        let port = self.listener.port_name().unwrap_or("unknown");
                        ui.label(
                            RichText::new(format!("● {}", port))
                                .color(theme::accent::SUCCESS)
                                .small(),
                        );
                    }
                    (false, error) => {
                        if ui.button("Reconnect").clicked() {
                            actions.reconnect_midi = true;
                        }
                        let text = match error {
                            Some(e) => format!("○ {}", e),
                            None => "○ no MIDI input".to_string(),
                        };
                        ui.label(RichText::new(text).color(theme::text::DISABLED).small());
                    }
                }
            });
        });

        actions
    }

    /// Draw the Practical tab: drill selectors, labels, and the keyboard.
    fn draw_practical_tab(&mut self, ui: &mut egui::Ui) {
        let mut store_ops: Vec<(String, String)> = Vec::new();

        ui.horizontal(|ui| {
            // Column 1: drill modes.
            ui.vertical(|ui| {
                ui.label(RichText::new("Mode").color(theme::text::SECONDARY));
                for mode in DRILL_MODES {
                    let selected = self.drill_mode == Some(mode);
                    if ui.selectable_label(selected, mode.name()).clicked() {
                        self.drill_mode = Some(mode);
                        self.drill_variants.clear();
                        self.drill_options.clear();
                    }
                }
            });

            ui.separator();

            // Column 2: variants (multi-select).
            ui.vertical(|ui| {
                ui.label(RichText::new("Variant").color(theme::text::SECONDARY));
                if let Some(mode) = self.drill_mode {
                    for variant in mode.variants() {
                        let selected = self.drill_variants.iter().any(|v| v == variant);
                        if ui.selectable_label(selected, *variant).clicked() {
                            if selected {
                                self.drill_variants.retain(|v| v != variant);
                            } else {
                                self.drill_variants.push(variant.to_string());
                            }
                        }
                    }
                }
            });

            ui.separator();

            // Column 3: inversions / hands / voicings.
            ui.vertical(|ui| {
                ui.label(RichText::new("Options").color(theme::text::SECONDARY));
                if let Some(mode) = self.drill_mode {
                    for option in mode.options() {
                        let selected = self.drill_options.iter().any(|o| o == option);
                        if ui.selectable_label(selected, *option).clicked() {
                            if selected {
                                self.drill_options.retain(|o| o != option);
                            } else {
                                self.drill_options.push(option.to_string());
                            }
                        }
                    }
                }
            });

            ui.separator();

            // Labels and the Go button.
            ui.vertical(|ui| {
                let key = self.store.get("key").unwrap_or("C Major").to_string();
                ui.label(RichText::new(format!("Key: {}", key)).size(28.0));

                let inversion = self
                    .last_note
                    .borrow()
                    .clone()
                    .unwrap_or_else(|| "Root".to_string());
                ui.label(format!("Inversion: {}", inversion));

                let fingering = self.store.get("fingering").unwrap_or("1-2-3-4-5").to_string();
                ui.label(format!("Fingering: {}", fingering));

                let score = self.store.get("score").unwrap_or("100").to_string();
                ui.label(format!("Score: {}", score));

                if ui.button("Go").clicked() {
                    if let Some(mode) = self.drill_mode {
                        store_ops.push(("drill_mode".to_string(), mode.name().to_string()));
                        store_ops
                            .push(("drill_variants".to_string(), self.drill_variants.join(",")));
                        store_ops.push(("drill_options".to_string(), self.drill_options.join(",")));
                    }
                }
            });
        });

        ui.add_space(12.0);
        let active = self.active_notes.borrow();
        piano(ui, &active, &self.piano_config);
        drop(active);

        for (key, value) in store_ops {
            let result = self.store.set(key, value);
            self.note_store_result(result);
        }
    }

    /// Draw the Theory tab: reference dataset status and the drill catalog.
    fn draw_theory_tab(&mut self, ui: &mut egui::Ui) {
        if self.theory_reference.is_empty() {
            ui.label(
                RichText::new("Reference data missing; key overlays use flat colors.")
                    .color(theme::accent::ERROR),
            );
        } else {
            ui.label(
                RichText::new("Reference data loaded (12 note classes).")
                    .color(theme::accent::SUCCESS),
            );
        }

        ui.add_space(8.0);
        for mode in DRILL_MODES {
            ui.collapsing(mode.name(), |ui| {
                ui.label(format!("Variants: {}", mode.variants().join(", ")));
                if !mode.options().is_empty() {
                    ui.label(format!("Options: {}", mode.options().join(", ")));
                }
            });
        }
    }

    /// Draw the Settings tab: the raw key-value editor over the shared store.
    fn draw_settings_tab(&mut self, ui: &mut egui::Ui) {
        ui.label(RichText::new(&self.settings_status).color(theme::text::SECONDARY));
        ui.add_space(4.0);

        ui.horizontal(|ui| {
            ui.label("Key:");
            ui.text_edit_singleline(&mut self.key_input);
        });
        ui.horizontal(|ui| {
            ui.label("Value:");
            ui.text_edit_singleline(&mut self.value_input);
        });

        let mut pending: Option<SettingsAction> = None;
        ui.horizontal(|ui| {
            if ui.button("Set value for key").clicked() {
                pending = Some(SettingsAction::Set);
            }
            if ui.button("Get value for key").clicked() {
                pending = Some(SettingsAction::Get);
            }
            if ui.button("Delete key").clicked() {
                pending = Some(SettingsAction::Delete);
            }
        });

        match pending {
            Some(SettingsAction::Set) => {
                if !self.key_input.is_empty() && !self.value_input.is_empty() {
                    let key = self.key_input.clone();
                    let result = self.store.set(key.clone(), self.value_input.clone());
                    self.note_store_result(result);
                    self.settings_status = format!("Set '{}'", key);
                }
            }
            Some(SettingsAction::Get) => {
                self.settings_status = match self.store.get(&self.key_input) {
                    Some(value) => {
                        format!("Current value for '{}': {}", self.key_input, value)
                    }
                    None => format!("No value found for '{}'", self.key_input),
                };
            }
            Some(SettingsAction::Delete) => {
                let known = self.store.get(&self.key_input).is_some();
                let key = self.key_input.clone();
                // Absent keys still run the persist+notify cycle.
                let result = self.store.delete(&key);
                self.note_store_result(result);
                self.settings_status = if known {
                    format!("Key '{}' deleted.", key)
                } else {
                    format!("Key '{}' not found.", key)
                };
            }
            None => {}
        }

        ui.add_space(12.0);
        ui.label(RichText::new("Current state").color(theme::text::SECONDARY));
        egui::Grid::new("settings_state_grid")
            .striped(true)
            .show(ui, |ui| {
                for (key, value) in self.store.data() {
                    ui.label(key);
                    ui.label(value);
                    ui.end_row();
                }
            });
    }

    /// Draw the bottom status bar.
    fn draw_status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.add_space(8.0);
            if let Some(ref error) = self.store_error {
                ui.label(
                    RichText::new(format!("⚠ {}", error))
                        .color(theme::accent::ERROR)
                        .small(),
                );
            } else {
                ui.label(RichText::new("Ready").color(theme::text::SECONDARY).small());
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                ui.label(
                    RichText::new(self.state_summary.borrow().as_str())
                        .color(theme::text::DISABLED)
                        .small(),
                );
            });
        });
    }
}

/// Actions collected from the toolbar for deferred execution
#[derive(Default)]
struct ToolbarActions {
    reconnect_midi: bool,
    stop_midi: bool,
}

enum SettingsAction {
    Set,
    Get,
    Delete,
}

impl eframe::App for OraliaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.theme_applied {
            theme::apply_theme(ctx);
            self.theme_applied = true;
        }

        self.pump_midi_events();

        let toolbar_actions = egui::TopBottomPanel::top("toolbar")
            .frame(
                egui::Frame::none()
                    .fill(theme::background::PANEL)
                    .inner_margin(egui::Margin::symmetric(0.0, 8.0)),
            )
            .show(ctx, |ui| self.draw_toolbar(ui))
            .inner;

        egui::TopBottomPanel::bottom("status_bar")
            .frame(
                egui::Frame::none()
                    .fill(theme::background::PANEL)
                    .inner_margin(egui::Margin::symmetric(0.0, 4.0)),
            )
            .show(ctx, |ui| {
                self.draw_status_bar(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| match self.selected_tab {
            Tab::Practical => self.draw_practical_tab(ui),
            Tab::Theory => self.draw_theory_tab(ui),
            Tab::Settings => self.draw_settings_tab(ui),
        });

        if toolbar_actions.reconnect_midi {
            self.reconnect_midi();
        }
        if toolbar_actions.stop_midi {
            self.stop_midi();
        }

        // Live input can arrive between frames; keep the keyboard fresh.
        ctx.request_repaint_after(std::time::Duration::from_millis(16));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::NoteColor;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("oralia_app_{}_{}", std::process::id(), name))
    }

    fn test_app(tag: &str) -> OraliaApp {
        OraliaApp::new(
            temp_path(&format!("{}_state.json", tag)),
            temp_path(&format!("{}_missing_reference.json", tag)),
        )
    }

    #[test]
    fn test_event_pump_updates_active_notes() {
        let mut app = test_app("pump");

        app.dispatcher.dispatch(&NoteEvent::Activated {
            note: 60,
            color: NoteColor::Green,
        });
        assert!(app.active_notes.borrow().contains(60));
        assert_eq!(app.last_note.borrow().as_deref(), Some("C4"));

        app.dispatcher.dispatch(&NoteEvent::Released { note: 60 });
        assert!(app.active_notes.borrow().is_empty());
        // Release keeps the last pressed note on the label.
        assert_eq!(app.last_note.borrow().as_deref(), Some("C4"));
    }

    #[test]
    fn test_double_activation_single_entry() {
        let mut app = test_app("double");
        for _ in 0..2 {
            app.dispatcher.dispatch(&NoteEvent::Activated {
                note: 64,
                color: NoteColor::Green,
            });
        }
        assert_eq!(app.active_notes.borrow().len(), 1);
    }

    #[test]
    fn test_store_subscription_summary() {
        let mut app = test_app("summary");
        let result = app.store.set("tempo", "120");
        app.note_store_result(result);
        assert_eq!(app.state_summary.borrow().as_str(), "1 keys");
        assert!(app.store_error.is_none());
        let _ = std::fs::remove_file(app.store.path());
    }

    #[test]
    fn test_selector_prefers_configured_device() {
        let path = temp_path("selector_state.json");
        let mut store = SharedStore::empty(&path);
        assert_eq!(selector_from(&store), DeviceSelector::FirstAvailable);

        store.set("midi_device", "Keystation").unwrap();
        assert_eq!(
            selector_from(&store),
            DeviceSelector::ByName("Keystation".to_string())
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_stop_midi_clears_held_notes() {
        let mut app = test_app("stop");
        app.dispatcher.dispatch(&NoteEvent::Activated {
            note: 72,
            color: NoteColor::Green,
        });
        app.stop_midi();
        assert!(app.active_notes.borrow().is_empty());
        assert!(!app.listener.is_running());
    }
}
