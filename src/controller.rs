//! Interaction controller.
//!
//! Owns the session state (draft, result, request state) and runs one
//! request/response cycle per invoked action. The handle is cheap to clone so
//! the UI can keep drawing and editing the draft while a request is in flight.

use crate::action::Action;
use crate::client::Enhancer;
use crate::protocol::Reply;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Whether a request is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Pending(Action),
}

impl RequestState {
    pub fn is_idle(&self) -> bool {
        matches!(self, RequestState::Idle)
    }
}

/// Mutable state shared between the controller handle and its busy token.
#[derive(Debug, Default)]
struct Session {
    draft: String,
    result: Option<String>,
    state: RequestState,
}

/// Read-only view handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub draft: String,
    pub result: Option<String>,
    pub state: RequestState,
    /// Action controls accept input.
    pub enabled: bool,
}

/// Why an invocation was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The draft is empty or whitespace only.
    EmptyDraft,
    /// Another action is already pending.
    Busy,
}

/// What ended up in the result slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Text returned by the endpoint.
    Enhanced,
    /// The endpoint answered without enhanced text.
    Placeholder,
    /// The call failed; a local fallback string was shown.
    Fallback,
}

/// Result of [`Controller::invoke`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation {
    Skipped(SkipReason),
    Completed(Outcome),
}

/// Holds the session in the pending state; dropping it returns to idle.
///
/// Dropping covers every exit path of an invocation: normal completion, the
/// invoking future being dropped mid-await, and a panic inside the client.
struct BusyToken {
    session: Arc<Mutex<Session>>,
    action: Action,
}

impl Drop for BusyToken {
    fn drop(&mut self) {
        let mut session = lock(&self.session);
        session.state = RequestState::Idle;
        debug!(action = %self.action, "Request state reset to idle");
    }
}

/// The interaction controller.
#[derive(Clone)]
pub struct Controller {
    session: Arc<Mutex<Session>>,
    enhancer: Arc<dyn Enhancer>,
}

fn lock(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    // State stays consistent under poisoning: every write is a single field store.
    session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Controller {
    pub fn new(enhancer: Arc<dyn Enhancer>) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::default())),
            enhancer,
        }
    }

    /// Replace the draft. Allowed at any time, including while pending.
    pub fn set_draft(&self, text: impl Into<String>) {
        lock(&self.session).draft = text.into();
    }

    pub fn draft(&self) -> String {
        lock(&self.session).draft.clone()
    }

    pub fn result(&self) -> Option<String> {
        lock(&self.session).result.clone()
    }

    pub fn state(&self) -> RequestState {
        lock(&self.session).state
    }

    /// Action controls are live: idle and a non-blank draft.
    pub fn enabled(&self) -> bool {
        let session = lock(&self.session);
        session.state.is_idle() && !session.draft.trim().is_empty()
    }

    pub fn snapshot(&self) -> Snapshot {
        let session = lock(&self.session);
        Snapshot {
            draft: session.draft.clone(),
            result: session.result.clone(),
            state: session.state,
            enabled: session.state.is_idle() && !session.draft.trim().is_empty(),
        }
    }

    /// Move to `Pending(action)` if the preconditions hold.
    ///
    /// Returns the busy token together with the draft captured at this moment.
    fn acquire(&self, action: Action) -> Result<(BusyToken, String), SkipReason> {
        let mut session = lock(&self.session);
        if !session.state.is_idle() {
            return Err(SkipReason::Busy);
        }
        if session.draft.trim().is_empty() {
            return Err(SkipReason::EmptyDraft);
        }
        session.state = RequestState::Pending(action);
        let draft = session.draft.clone();
        drop(session);

        let token = BusyToken {
            session: Arc::clone(&self.session),
            action,
        };
        Ok((token, draft))
    }

    /// Claim the request slot for `action` and return the work to run.
    ///
    /// The state is `Pending(action)` when this returns `Ok`, before the
    /// returned future is polled. Dropping the future unpolled releases the
    /// slot again.
    pub fn start(
        &self,
        action: Action,
    ) -> Result<impl Future<Output = Outcome> + Send + 'static, SkipReason> {
        let (token, draft) = self.acquire(action).map_err(|reason| {
            debug!(%action, ?reason, "Invocation skipped");
            reason
        })?;
        let session = Arc::clone(&self.session);
        let enhancer = Arc::clone(&self.enhancer);
        info!(%action, "Enhancement requested");

        Ok(async move {
            let reply = enhancer
                .enhance(&draft, action.label(), action.prompt())
                .await;

            let (text, outcome) = match reply {
                Ok(Reply::Enhanced(text)) => (text, Outcome::Enhanced),
                Ok(Reply::Missing) => {
                    warn!(%action, "Response carried no enhanced text");
                    (action.placeholder(&draft), Outcome::Placeholder)
                }
                Err(e) => {
                    warn!(%action, error = %e, "Enhancement failed");
                    (action.fallback(&draft), Outcome::Fallback)
                }
            };

            lock(&session).result = Some(text);
            drop(token);
            info!(%action, ?outcome, "Enhancement finished");
            outcome
        })
    }

    /// Run one enhancement cycle for `action` to completion.
    pub async fn invoke(&self, action: Action) -> Invocation {
        match self.start(action) {
            Ok(work) => Invocation::Completed(work.await),
            Err(reason) => Invocation::Skipped(reason),
        }
    }
}
