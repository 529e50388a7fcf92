use ratatui::layout::Rect;
use tokio::task::JoinHandle;

use doctor_core::{
    AnalysisClient, AnalysisResult, Analyzer, FieldId, FormController, RequestError,
    SubmitRejected,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Form,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Last known state of the analysis service's `/health` route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceStatus {
    Unknown,
    Checking,
    Reported(String),
    Unreachable,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub focus: FocusPane,
    pub input_mode: InputMode,

    // Form state
    pub field_idx: usize,
    pub cursor: usize, // char index into the selected field
    pub flash: Option<String>,

    // Submission state
    pub controller: FormController,
    pub client: AnalysisClient,
    pub submit_task: Option<JoinHandle<Result<Vec<AnalysisResult>, RequestError>>>,

    // Results state
    pub selected_panel: usize,
    pub results_scroll: u16,

    // Service health
    pub service_status: ServiceStatus,
    pub health_task: Option<JoinHandle<anyhow::Result<String>>>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Areas for mouse hit-testing (updated during render)
    pub field_areas: Vec<Rect>,
    pub results_area: Option<Rect>,
}

impl App {
    pub fn new(controller: FormController, client: AnalysisClient) -> Self {
        Self {
            should_quit: false,
            focus: FocusPane::Form,
            input_mode: InputMode::Normal,

            field_idx: 0,
            cursor: 0,
            flash: None,

            controller,
            client,
            submit_task: None,

            selected_panel: 0,
            results_scroll: 0,

            service_status: ServiceStatus::Unknown,
            health_task: None,

            animation_frame: 0,

            field_areas: Vec::new(),
            results_area: None,
        }
    }

    pub fn selected_field(&self) -> FieldId {
        FieldId::all()[self.field_idx]
    }

    pub fn selected_value(&self) -> &str {
        self.controller.form().value(self.selected_field())
    }

    // Field navigation
    pub fn select_field(&mut self, idx: usize) {
        self.field_idx = idx.min(FieldId::all().len() - 1);
        self.cursor = self.selected_value().chars().count();
    }

    pub fn next_field(&mut self) {
        self.select_field((self.field_idx + 1) % FieldId::all().len());
    }

    pub fn prev_field(&mut self) {
        let len = FieldId::all().len();
        self.select_field((self.field_idx + len - 1) % len);
    }

    pub fn start_editing(&mut self) {
        self.focus = FocusPane::Form;
        self.input_mode = InputMode::Editing;
        self.cursor = self.selected_value().chars().count();
        self.flash = None;
    }

    pub fn stop_editing(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    // Text editing; every change is an input event on the controller
    fn replace_value(&mut self, value: String) {
        let id = self.selected_field();
        self.controller.input(id, value);
    }

    /// Cursor position clamped to the selected field's current length.
    fn clamped_cursor(&self) -> usize {
        self.cursor.min(self.selected_value().chars().count())
    }

    pub fn insert_char(&mut self, c: char) {
        if !self.selected_field().accepts(c) {
            return;
        }
        let cursor = self.clamped_cursor();
        let mut value = self.selected_value().to_string();
        let byte_pos = char_to_byte_index(&value, cursor);
        value.insert(byte_pos, c);
        self.replace_value(value);
        self.cursor = (cursor + 1).min(self.selected_value().chars().count());
    }

    /// Paste: characters the field would reject are dropped.
    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars() {
            let c = if c == '\r' { '\n' } else { c };
            self.insert_char(c);
        }
    }

    pub fn backspace(&mut self) {
        let cursor = self.clamped_cursor();
        if cursor == 0 {
            self.cursor = 0;
            return;
        }
        let mut value = self.selected_value().to_string();
        let byte_pos = char_to_byte_index(&value, cursor - 1);
        value.remove(byte_pos);
        self.replace_value(value);
        self.cursor = cursor - 1;
    }

    pub fn delete(&mut self) {
        let cursor = self.clamped_cursor();
        self.cursor = cursor;
        let mut value = self.selected_value().to_string();
        if cursor < value.chars().count() {
            let byte_pos = char_to_byte_index(&value, cursor);
            value.remove(byte_pos);
            self.replace_value(value);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let len = self.selected_value().chars().count();
        self.cursor = (self.cursor + 1).min(len);
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.selected_value().chars().count();
    }

    // Form actions
    pub fn submit(&mut self) {
        match self.controller.begin_submit() {
            Ok(submission) => {
                self.flash = None;
                self.input_mode = InputMode::Normal;
                self.selected_panel = 0;
                self.results_scroll = 0;

                // Spawn background task for the single in-flight request
                let client = self.client.clone();
                self.submit_task = Some(tokio::spawn(async move {
                    client.analyze(&submission).await
                }));
            }
            Err(SubmitRejected::MissingField(id)) => {
                if let Some(idx) = FieldId::all().iter().position(|f| *f == id) {
                    self.focus = FocusPane::Form;
                    self.select_field(idx);
                }
                self.flash = Some(format!("Please fill out {}", id.label()));
            }
            Err(SubmitRejected::InFlight) => {}
        }
    }

    pub fn clear_form(&mut self) {
        self.controller.clear();
        self.cursor = 0;
        self.selected_panel = 0;
        self.results_scroll = 0;
        self.flash = Some("Form cleared".to_string());
    }

    pub fn check_health(&mut self) {
        if self.health_task.is_some() {
            return;
        }
        self.service_status = ServiceStatus::Checking;
        let client = self.client.clone();
        self.health_task = Some(tokio::spawn(async move { client.health().await }));
    }

    /// Collect any background task that has finished.
    pub async fn poll_tasks(&mut self) {
        if self.submit_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.submit_task.take() {
                let outcome = task.await.unwrap_or_else(|e| Err(RequestError::from(e)));
                self.controller.finish(outcome);
                if self.controller.results_visible() {
                    self.focus = FocusPane::Results;
                }
            }
        }

        if self.health_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.health_task.take() {
                self.service_status = match task.await {
                    Ok(Ok(status)) => ServiceStatus::Reported(status),
                    Ok(Err(e)) => {
                        tracing::warn!(error = %e, "health check failed");
                        ServiceStatus::Unreachable
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "health check task failed");
                        ServiceStatus::Unreachable
                    }
                };
            }
        }
    }

    // Accordion navigation
    pub fn panel_nav_down(&mut self) {
        let len = self.controller.panels().len();
        if len > 0 {
            self.selected_panel = (self.selected_panel + 1).min(len - 1);
        }
    }

    pub fn panel_nav_up(&mut self) {
        self.selected_panel = self.selected_panel.saturating_sub(1);
    }

    pub fn toggle_selected_panel(&mut self) {
        self.controller.toggle_panel(self.selected_panel);
        self.results_scroll = 0;
    }

    pub fn scroll_results_down(&mut self) {
        self.results_scroll = self.results_scroll.saturating_add(1);
    }

    pub fn scroll_results_up(&mut self) {
        self.results_scroll = self.results_scroll.saturating_sub(1);
    }

    pub fn tick_animation(&mut self) {
        if self.controller.loading_visible() || self.service_status == ServiceStatus::Checking {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doctor_core::{FieldStore, MemoryStore, StoreError, UiState};
    use std::time::Duration;

    /// Store whose every write fails, like a full disk.
    struct ReadOnlyStore;

    impl FieldStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }

        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            self.set(key, "")
        }

        fn clear(&mut self) -> Result<(), StoreError> {
            self.set("", "")
        }
    }

    /// Endpoint nothing is listening on.
    async fn dead_endpoint() -> String {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}/analyze")
    }

    fn app_with(endpoint: &str) -> App {
        let controller = FormController::new(Box::new(MemoryStore::new()));
        App::new(controller, AnalysisClient::new(endpoint))
    }

    fn type_into(app: &mut App, idx: usize, text: &str) {
        app.select_field(idx);
        app.start_editing();
        app.insert_str(text);
        app.stop_editing();
    }

    #[test]
    fn test_editing_is_utf8_safe() {
        let mut app = app_with("http://127.0.0.1:9/analyze");
        type_into(&mut app, 0, "Zoë");
        app.start_editing();
        app.cursor_left();
        app.backspace();
        assert_eq!(app.selected_value(), "Zë");

        app.cursor_home();
        app.delete();
        assert_eq!(app.selected_value(), "ë");
    }

    #[test]
    fn test_age_rejects_letters() {
        let mut app = app_with("http://127.0.0.1:9/analyze");
        type_into(&mut app, 1, "4a2");
        assert_eq!(app.controller.form().value(FieldId::Age), "42");
    }

    #[test]
    fn test_field_navigation_wraps() {
        let mut app = app_with("http://127.0.0.1:9/analyze");
        app.prev_field();
        assert_eq!(app.selected_field(), FieldId::CurrentMedications);
        app.next_field();
        assert_eq!(app.selected_field(), FieldId::PatientName);
    }

    #[test]
    fn test_submit_with_missing_field_moves_focus() {
        let mut app = app_with("http://127.0.0.1:9/analyze");
        type_into(&mut app, 0, "Ana");
        app.submit();

        assert_eq!(app.selected_field(), FieldId::Age);
        assert_eq!(app.flash.as_deref(), Some("Please fill out Age"));
        assert!(app.submit_task.is_none());
        assert_eq!(app.controller.state(), &UiState::Idle);
    }

    #[tokio::test]
    async fn test_unreachable_service_ends_in_error_state() {
        let endpoint = dead_endpoint().await;
        let mut app = app_with(&endpoint);
        type_into(&mut app, 0, "Ana");
        type_into(&mut app, 1, "30");
        type_into(&mut app, 2, "cough");

        app.submit();
        assert!(!app.controller.submit_control().enabled);

        for _ in 0..200 {
            app.poll_tasks().await;
            if app.submit_task.is_none() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }

        assert_eq!(app.controller.state(), &UiState::Errored);
        assert!(app.controller.submit_control().enabled);
        assert_eq!(app.focus, FocusPane::Results);
    }

    #[test]
    fn test_clear_form_blanks_fields() {
        let mut app = app_with("http://127.0.0.1:9/analyze");
        type_into(&mut app, 3, "asthma");
        app.clear_form();

        assert_eq!(app.controller.form().value(FieldId::MedicalHistory), "");
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn test_typing_survives_failing_store() {
        let controller = FormController::new(Box::new(ReadOnlyStore));
        let mut app = App::new(controller, AnalysisClient::new("http://127.0.0.1:9/analyze"));

        app.start_editing();
        app.insert_char('a');
        assert_eq!(app.selected_value(), "a");
        assert_eq!(app.cursor, 1);

        app.backspace();
        assert_eq!(app.selected_value(), "");
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn test_cursor_past_end_is_clamped() {
        let mut app = app_with("http://127.0.0.1:9/analyze");
        type_into(&mut app, 0, "Bo");
        app.start_editing();

        app.cursor = 99;
        app.delete();
        assert_eq!(app.selected_value(), "Bo");
        assert_eq!(app.cursor, 2);

        app.cursor = 99;
        app.backspace();
        assert_eq!(app.selected_value(), "B");
        assert_eq!(app.cursor, 1);

        app.cursor = 99;
        app.insert_char('x');
        assert_eq!(app.selected_value(), "Bx");
        assert_eq!(app.cursor, 2);
    }
}
