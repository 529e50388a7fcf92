//! The intake form controller.
//!
//! Owns the form values, the field store and the visible UI state. A submit
//! moves the controller into [`UiState::Submitting`] and disables the submit
//! control until the single in-flight request resolves.
//!
//! There is no cancellation: once a request has started, the controller waits
//! for [`FormController::finish`]. Dropping the request future simply leaves
//! the controller in `Submitting`.

use crate::analysis::{AnalysisResult, PatientSubmission};
use crate::client::Analyzer;
use crate::error::{RequestError, SubmitRejected};
use crate::form::{FieldId, PatientForm};
use crate::render::{self, Panel};
use crate::store::FieldStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiState {
    Idle,
    Submitting,
    Rendered(Vec<Panel>),
    Errored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitControl {
    pub enabled: bool,
    pub label: &'static str,
}

impl SubmitControl {
    pub const LABEL: &'static str = "Analyze";
    pub const BUSY_LABEL: &'static str = "Analyzing...";

    fn ready() -> Self {
        Self {
            enabled: true,
            label: Self::LABEL,
        }
    }

    fn busy() -> Self {
        Self {
            enabled: false,
            label: Self::BUSY_LABEL,
        }
    }
}

pub struct FormController {
    form: PatientForm,
    store: Box<dyn FieldStore>,
    state: UiState,
    submit: SubmitControl,
}

impl FormController {
    /// Bind to `store` and restore any saved field values.
    pub fn new(store: Box<dyn FieldStore>) -> Self {
        let mut form = PatientForm::new();
        form.restore(store.as_ref());

        Self {
            form,
            store,
            state: UiState::Idle,
            submit: SubmitControl::ready(),
        }
    }

    pub fn form(&self) -> &PatientForm {
        &self.form
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn submit_control(&self) -> SubmitControl {
        self.submit
    }

    pub fn loading_visible(&self) -> bool {
        self.state == UiState::Submitting
    }

    pub fn results_visible(&self) -> bool {
        matches!(self.state, UiState::Rendered(_) | UiState::Errored)
    }

    pub fn panels(&self) -> &[Panel] {
        match &self.state {
            UiState::Rendered(panels) => panels,
            _ => &[],
        }
    }

    /// Input event on a field. A failed store write is logged and the edit kept.
    pub fn input(&mut self, id: FieldId, value: impl Into<String>) {
        if let Err(e) = self.form.set_field(id, value, self.store.as_mut()) {
            tracing::warn!(field = id.as_str(), error = %e, "failed to persist field");
        }
    }

    /// Clear action: blank the form, wipe the store and drop rendered output.
    ///
    /// An in-flight request is not affected; its result still lands when it
    /// resolves.
    pub fn clear(&mut self) {
        if let Err(e) = self.form.clear(self.store.as_mut()) {
            tracing::warn!(error = %e, "failed to clear field store");
        }
        if self.state != UiState::Submitting {
            self.state = UiState::Idle;
        }
    }

    /// Submit event. On success the controller is `Submitting` and the
    /// returned submission must be sent and handed back via [`Self::finish`].
    pub fn begin_submit(&mut self) -> Result<PatientSubmission, SubmitRejected> {
        if !self.submit.enabled || self.state == UiState::Submitting {
            return Err(SubmitRejected::InFlight);
        }
        if let Some(missing) = self.form.missing_required() {
            return Err(SubmitRejected::MissingField(missing));
        }

        self.state = UiState::Submitting;
        self.submit = SubmitControl::busy();
        Ok(self.form.compose())
    }

    /// Resolve the in-flight request.
    pub fn finish(&mut self, outcome: Result<Vec<AnalysisResult>, RequestError>) {
        if self.state != UiState::Submitting {
            tracing::warn!("ignoring analysis result with no request in flight");
            return;
        }

        self.state = match outcome {
            Ok(results) => UiState::Rendered(render::render_panels(&results)),
            Err(e) => {
                tracing::error!(error = %e, "analysis request failed");
                UiState::Errored
            }
        };
        self.submit = SubmitControl::ready();
    }

    /// Full lifecycle against `analyzer`: begin, await the one response, finish.
    pub async fn submit<A: Analyzer + ?Sized>(
        &mut self,
        analyzer: &A,
    ) -> Result<(), SubmitRejected> {
        let submission = self.begin_submit()?;
        let outcome = analyzer.analyze(&submission).await;
        self.finish(outcome);
        Ok(())
    }

    pub fn toggle_panel(&mut self, index: usize) {
        if let UiState::Rendered(panels) = &mut self.state {
            render::toggle_panel(panels, index);
        }
    }
}
