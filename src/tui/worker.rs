//! Background assessment worker.
//!
//! Runs the predictor call on its own thread so the TUI keeps drawing while
//! the request is in flight. The worker never touches the session; the UI
//! loop applies the outcome it reports.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::application::{AssessmentWorkflow, PendingSubmission, SubmissionOutcome};
use crate::ports::Predictor;

/// Progress updates from the assessment worker.
#[derive(Debug, Clone)]
pub enum AssessmentProgress {
    /// Request sent, waiting for the service
    Requesting,
    /// Service answered (successfully or not)
    Complete(SubmissionOutcome),
}

/// Handle to a running assessment worker.
pub struct AssessmentWorkerHandle {
    progress_rx: Receiver<AssessmentProgress>,
    _handle: JoinHandle<()>,
}

impl AssessmentWorkerHandle {
    /// Try to receive the next progress update (non-blocking).
    #[must_use]
    pub fn try_recv(&self) -> Option<AssessmentProgress> {
        self.progress_rx.try_recv().ok()
    }
}

/// Assessment worker that runs the predictor call in background.
pub struct AssessmentWorker;

impl AssessmentWorker {
    /// Spawn a background request for an admitted submission.
    pub fn spawn<P>(
        workflow: AssessmentWorkflow<P>,
        pending: PendingSubmission,
    ) -> AssessmentWorkerHandle
    where
        P: Predictor + 'static,
    {
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            Self::run_with_progress(&workflow, pending, &tx);
        });

        AssessmentWorkerHandle {
            progress_rx: rx,
            _handle: handle,
        }
    }

    fn run_with_progress<P: Predictor>(
        workflow: &AssessmentWorkflow<P>,
        pending: PendingSubmission,
        tx: &Sender<AssessmentProgress>,
    ) {
        let _ = tx.send(AssessmentProgress::Requesting);

        let outcome = workflow.run(pending);

        // The receiver is gone if the UI quit meanwhile.
        let _ = tx.send(AssessmentProgress::Complete(outcome));
    }
}
