//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Session and workflow integration
//! - Background prediction requests via the worker

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::{FileReportSink, HttpPredictor};
use crate::application::{
    AssessmentWorkflow, PhaseKind, ReportService, Session, WorkflowError,
};
use crate::config::AppConfig;
use crate::ports::Predictor;

use super::ui::{
    form::{render_intake_form, IntakeFormState},
    render_disclaimer,
    result::{render_result, render_submitting},
};
use super::worker::{AssessmentProgress, AssessmentWorker, AssessmentWorkerHandle};

/// Progress bar target while waiting; never reaches 100% on its own.
const PROGRESS_CEILING: f64 = 0.95;
const PROGRESS_TAU_SECS: f64 = 2.5;

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Form,
    Result,
}

/// Main application state
pub struct App<P: Predictor + 'static = HttpPredictor> {
    screen: Screen,

    should_quit: bool,

    session: Session,

    workflow: AssessmentWorkflow<P>,

    reports: ReportService<FileReportSink>,

    form_state: IntakeFormState,

    /// Pending assessment worker (if running)
    pending_worker: Option<AssessmentWorkerHandle>,

    /// When the pending request started and how far the bar has moved
    progress: Option<(Instant, f64)>,

    /// Outcome of the last export/print, shown in the result footer
    status_message: Option<String>,
}

impl App<HttpPredictor> {
    /// Create a new application talking to the configured prediction service.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let predictor = HttpPredictor::new(&config.predictor_url, config.timeout)?;
        let sink = FileReportSink::new(&config.export_dir);
        Ok(Self::with_dependencies(
            AssessmentWorkflow::new(Arc::new(predictor)),
            ReportService::new(Arc::new(sink)),
        ))
    }
}

impl<P: Predictor + 'static> App<P> {
    /// Create application with injected dependencies.
    pub fn with_dependencies(
        workflow: AssessmentWorkflow<P>,
        reports: ReportService<FileReportSink>,
    ) -> Self {
        Self {
            screen: Screen::Form,
            should_quit: false,
            session: Session::new(),
            workflow,
            reports,
            form_state: IntakeFormState::default(),
            pending_worker: None,
            progress: None,
            status_message: None,
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            self.poll_worker();
            self.tick_progress();

            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(2)])
                    .split(f.area());

                let content_area = chunks[0];
                if self.session.kind() == PhaseKind::Submitting {
                    let progress = self.progress.map_or(0.0, |(_, p)| p);
                    render_submitting(f, content_area, progress);
                } else {
                    match self.screen {
                        Screen::Form => {
                            render_intake_form(f, content_area, &self.form_state, &self.session)
                        }
                        Screen::Result => render_result(
                            f,
                            content_area,
                            &self.session,
                            self.status_message.as_deref(),
                        ),
                    }
                }

                render_disclaimer(f, chunks[1]);
            })?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key.code, key.modifiers);
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Follow the worker: start the progress bar once the request is out,
    /// apply the outcome once it arrives.
    fn poll_worker(&mut self) {
        while let Some(progress) = self
            .pending_worker
            .as_ref()
            .and_then(AssessmentWorkerHandle::try_recv)
        {
            match progress {
                AssessmentProgress::Requesting => {
                    self.progress = Some((Instant::now(), 0.0));
                }
                AssessmentProgress::Complete(outcome) => {
                    self.workflow.complete(&mut self.session, outcome);
                    self.pending_worker = None;
                    self.progress = None;
                    self.screen = match self.session.kind() {
                        PhaseKind::Success => Screen::Result,
                        _ => Screen::Form,
                    };
                    break;
                }
            }
        }
    }

    /// Smooth, monotonic progress approaching the ceiling while waiting.
    fn tick_progress(&mut self) {
        let Some((started_at, current)) = self.progress else {
            return;
        };
        let elapsed = started_at.elapsed().as_secs_f64();
        let desired = PROGRESS_CEILING * (1.0 - (-elapsed / PROGRESS_TAU_SECS).exp());
        self.progress = Some((started_at, desired.max(current).min(PROGRESS_CEILING)));
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.session.kind() == PhaseKind::Submitting {
            if matches!(key, KeyCode::Char('r') | KeyCode::Char('R')) {
                self.reset();
            }
            return;
        }

        match self.screen {
            Screen::Form => self.handle_form_key(key),
            Screen::Result => self.handle_result_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up => {
                if self.form_state.commit(&mut self.session).is_ok() {
                    self.form_state.prev_field();
                }
            }
            KeyCode::Down | KeyCode::Tab => {
                if self.form_state.commit(&mut self.session).is_ok() {
                    self.form_state.next_field();
                }
            }
            KeyCode::Left => self.form_state.cycle(&mut self.session, false),
            KeyCode::Right => self.form_state.cycle(&mut self.session, true),
            KeyCode::Backspace => self.form_state.delete_char(),
            KeyCode::Enter => self.submit(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.reset(),
            KeyCode::Char(c) => self.form_state.input_char(c),
            KeyCode::Esc => {
                if self.session.result().is_some() {
                    self.form_state.clear_sensitive();
                    self.screen = Screen::Result;
                }
            }
            _ => {}
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('a') | KeyCode::Char('A') => self.session.toggle_advanced_panel(),
            KeyCode::Char('e') | KeyCode::Char('E') => {
                self.status_message = Some(match self.reports.export(&self.session) {
                    Ok(path) => format!("Exported to {}", path.display()),
                    Err(e) => {
                        tracing::error!("Export failed: {}", e);
                        format!("Export failed: {e}")
                    }
                });
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                self.status_message = Some(match self.reports.print(&self.session) {
                    Ok(path) => format!("Report written to {}", path.display()),
                    Err(e) => {
                        tracing::error!("Print failed: {}", e);
                        format!("Print failed: {e}")
                    }
                });
            }
            KeyCode::Char('n') | KeyCode::Char('N') => self.reset(),
            KeyCode::Esc => self.screen = Screen::Form,
            _ => {}
        }
    }

    fn submit(&mut self) {
        if self.form_state.commit(&mut self.session).is_err() {
            return;
        }

        match self.workflow.begin(&mut self.session) {
            Ok(pending) => {
                self.status_message = None;
                self.pending_worker =
                    Some(AssessmentWorker::spawn(self.workflow.clone(), pending));
            }
            Err(WorkflowError::Validation(violations)) => {
                self.form_state.error_message = violations.first().map(ToString::to_string);
            }
            Err(WorkflowError::InProgress) => {}
        }
    }

    /// New assessment: default record, form screen, any pending request orphaned.
    fn reset(&mut self) {
        self.session.reset();
        self.form_state.clear_sensitive();
        self.form_state = IntakeFormState::default();
        self.pending_worker = None;
        self.progress = None;
        self.status_message = None;
        self.screen = Screen::Form;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AssessmentResult, ClinicalRecord, Prediction};
    use crate::ports::PredictorError;

    struct InstantPredictor;

    impl Predictor for InstantPredictor {
        fn predict(&self, _: &ClinicalRecord) -> Result<AssessmentResult, PredictorError> {
            Ok(AssessmentResult::new(Prediction::Present, 85.0))
        }
    }

    fn test_app(dir: &std::path::Path) -> App<InstantPredictor> {
        App::with_dependencies(
            AssessmentWorkflow::new(Arc::new(InstantPredictor)),
            ReportService::new(Arc::new(FileReportSink::new(dir))),
        )
    }

    struct SlowPredictor;

    impl Predictor for SlowPredictor {
        fn predict(&self, _: &ClinicalRecord) -> Result<AssessmentResult, PredictorError> {
            std::thread::sleep(Duration::from_millis(300));
            Ok(AssessmentResult::new(Prediction::Absent, 20.0))
        }
    }

    fn wait_until_idle<P: Predictor + 'static>(app: &mut App<P>) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.pending_worker.is_some() && Instant::now() < deadline {
            app.poll_worker();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_submit_shows_result_and_exports() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let mut app = test_app(dir.path());

        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.session.kind(), PhaseKind::Submitting);

        // Edits are refused while the request is in flight.
        app.handle_key(KeyCode::Char('5'), KeyModifiers::NONE);
        assert!(app.form_state.edit_buffer.is_none());

        wait_until_idle(&mut app);
        assert_eq!(app.screen, Screen::Result);
        assert_eq!(app.session.kind(), PhaseKind::Success);

        app.handle_key(KeyCode::Char('a'), KeyModifiers::NONE);
        assert!(app.session.is_advanced_panel_open());

        app.handle_key(KeyCode::Char('e'), KeyModifiers::NONE);
        assert!(app
            .status_message
            .as_deref()
            .is_some_and(|m| m.starts_with("Exported to")));

        app.handle_key(KeyCode::Char('n'), KeyModifiers::NONE);
        assert_eq!(app.screen, Screen::Form);
        assert_eq!(app.session.kind(), PhaseKind::Idle);
    }

    #[test]
    fn test_invalid_edit_blocks_submission() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let mut app = test_app(dir.path());

        app.handle_key(KeyCode::Char('9'), KeyModifiers::NONE);
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);

        assert_eq!(app.session.kind(), PhaseKind::Idle);
        assert!(app.pending_worker.is_none());
        assert!(app.form_state.error_message.is_some());
    }

    #[test]
    fn test_progress_starts_when_request_is_out() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let mut app = App::with_dependencies(
            AssessmentWorkflow::new(Arc::new(SlowPredictor)),
            ReportService::new(Arc::new(FileReportSink::new(dir.path()))),
        );

        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.session.kind(), PhaseKind::Submitting);

        let deadline = Instant::now() + Duration::from_secs(5);
        while app.progress.is_none() && Instant::now() < deadline {
            app.poll_worker();
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(app.progress.is_some());
        assert_eq!(app.session.kind(), PhaseKind::Submitting);

        wait_until_idle(&mut app);
        assert!(app.progress.is_none());
        assert_eq!(app.screen, Screen::Result);
    }

    #[test]
    fn test_export_after_edit_keeps_analyzed_inputs() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let mut app = test_app(dir.path());

        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        wait_until_idle(&mut app);
        assert_eq!(app.screen, Screen::Result);

        app.handle_key(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(app.screen, Screen::Form);
        app.handle_key(KeyCode::Char('5'), KeyModifiers::NONE);
        app.handle_key(KeyCode::Char('0'), KeyModifiers::NONE);
        app.handle_key(KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(app.session.record().age, 50);
        assert!(app.session.has_unassessed_edits());

        app.handle_key(KeyCode::Esc, KeyModifiers::NONE);
        app.handle_key(KeyCode::Char('e'), KeyModifiers::NONE);

        let written = std::fs::read_to_string(dir.path().join("cardiac-risk-assessment.json"))
            .expect("Should read export");
        let json: serde_json::Value = serde_json::from_str(&written).expect("Should parse");
        assert_eq!(json["formData"]["Age"], 65);
    }

    #[test]
    fn test_ctrl_q_quits() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let mut app = test_app(dir.path());
        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }
}
