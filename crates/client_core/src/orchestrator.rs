use std::sync::Arc;

use shared::{
    domain::{Assessment, AssessmentId},
    protocol::AssessmentMeta,
};
use storage::KeyValueStore;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    api::AssessmentApi,
    assessments::AssessmentStore,
    error::ClientResult,
    session::SessionStore,
    upload::UploadFile,
    view::{Effect, Transition, View},
};

pub const MISSING_FILE_MESSAGE: &str = "Please choose a file to upload.";
pub const AUTH_FAILED_MESSAGE: &str = "Authentication failed";
pub const UPLOAD_FAILED_MESSAGE: &str = "Upload failed";
pub const SIGN_IN_REQUIRED_MESSAGE: &str = "Sign in to upload an assessment.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    SignIn,
    Register,
}

#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub mode: AuthMode,
}

#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub meta: AssessmentMeta,
    pub file: Option<UploadFile>,
}

/// Loading/error pair scoped to the most recent user action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionStatus {
    pub loading: bool,
    pub error: Option<String>,
}

impl ActionStatus {
    pub fn succeeded(&self) -> bool {
        !self.loading && self.error.is_none()
    }
}

/// Render-ready copy of the orchestrator state.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub view: View,
    pub has_session: bool,
    pub assessments: Vec<Assessment>,
    pub selected: Option<Assessment>,
    pub status: ActionStatus,
}

struct OrchestratorState {
    view: View,
    session: SessionStore,
    assessments: AssessmentStore,
    status: ActionStatus,
}

/// Sequences API calls for the sign-in screen and the dashboard.
///
/// State sits behind one async mutex which is never held across a network
/// call; continuations re-check the session ticket before applying results.
pub struct Orchestrator {
    api: Arc<dyn AssessmentApi>,
    state: Mutex<OrchestratorState>,
}

impl Orchestrator {
    pub fn new(api: Arc<dyn AssessmentApi>, session: SessionStore) -> Arc<Self> {
        Arc::new(Self {
            api,
            state: Mutex::new(OrchestratorState {
                view: View::Auth,
                session,
                assessments: AssessmentStore::new(),
                status: ActionStatus::default(),
            }),
        })
    }

    /// Builds an orchestrator over `persistence` and runs startup.
    pub async fn launch(
        api: Arc<dyn AssessmentApi>,
        persistence: Arc<dyn KeyValueStore>,
    ) -> Arc<Self> {
        let session = SessionStore::new(persistence, Arc::clone(&api));
        let orchestrator = Self::new(api, session);
        orchestrator.startup().await;
        orchestrator
    }

    /// Restores a persisted session; lands on the dashboard (and refreshes)
    /// when one exists, otherwise stays on the sign-in screen.
    pub async fn startup(&self) -> View {
        let effect = {
            let mut state = self.state.lock().await;
            if state.session.restore().await {
                self.transition(&mut state, Transition::SessionRestored).await
            } else {
                Effect::None
            }
        };
        self.run_effect(effect).await;
        self.view().await
    }

    pub async fn submit_auth(&self, form: AuthForm) -> ActionStatus {
        self.begin_action().await;
        let result = self.authenticate(&form).await;
        let error = match result {
            Ok(effect) => {
                self.run_effect(effect).await;
                None
            }
            Err(err) => {
                warn!(error = %err, "authentication failed");
                Some(err.user_message(AUTH_FAILED_MESSAGE))
            }
        };
        self.finish_action(error).await
    }

    async fn authenticate(&self, form: &AuthForm) -> ClientResult<Effect> {
        if form.mode == AuthMode::Register {
            self.api
                .register(&form.email, &form.password, form.full_name.as_deref())
                .await?;
            info!("account registered");
        }
        let token = self.api.login(&form.email, &form.password).await?;

        let mut state = self.state.lock().await;
        state.session.establish(token).await;
        Ok(self.transition(&mut state, Transition::SignedIn).await)
    }

    /// Background list refresh. Failures and stale responses leave the
    /// collection untouched and are never surfaced. Returns whether the
    /// collection was replaced.
    pub async fn refresh(&self) -> bool {
        let ticket = self.state.lock().await.session.ticket();
        if !ticket.has_session() {
            debug!("skipping assessment refresh without a session");
            return false;
        }

        match self.api.list_assessments().await {
            Ok(items) => {
                let mut state = self.state.lock().await;
                if !state.session.is_current(&ticket) {
                    debug!("discarding assessment list issued under a previous session");
                    return false;
                }
                debug!(count = items.len(), "assessment list refreshed");
                state.assessments.replace_all(items);
                true
            }
            Err(err) => {
                warn!(error = %err, "assessment refresh failed; keeping last known list");
                false
            }
        }
    }

    pub async fn upload(&self, form: UploadForm) -> ActionStatus {
        let Some(file) = form.file else {
            let mut state = self.state.lock().await;
            state.status = ActionStatus {
                loading: false,
                error: Some(MISSING_FILE_MESSAGE.to_string()),
            };
            return state.status.clone();
        };

        let ticket = {
            let mut state = self.state.lock().await;
            if state.view != View::Dashboard || !state.session.has_session() {
                debug!("rejecting upload without a session");
                state.status = ActionStatus {
                    loading: false,
                    error: Some(SIGN_IN_REQUIRED_MESSAGE.to_string()),
                };
                return state.status.clone();
            }
            state.status = ActionStatus {
                loading: true,
                error: None,
            };
            state.session.ticket()
        };

        let error = match self.api.create_assessment(&form.meta, &file).await {
            Ok(created) => {
                let mut state = self.state.lock().await;
                if state.session.is_current(&ticket) {
                    info!(assessment_id = created.id.0, "assessment created");
                    state.assessments.prepend_and_select(created);
                } else {
                    debug!("discarding created assessment issued under a previous session");
                }
                None
            }
            Err(err) => {
                warn!(error = %err, file = %file.file_name, "upload failed");
                Some(err.user_message(UPLOAD_FAILED_MESSAGE))
            }
        };
        self.finish_action(error).await
    }

    /// Ends the session. Assessments stay in memory until the next sign-in
    /// replaces them.
    pub async fn logout(&self) {
        let mut state = self.state.lock().await;
        self.transition(&mut state, Transition::SignedOut).await;
    }

    pub async fn select(&self, id: AssessmentId) -> bool {
        self.state.lock().await.assessments.select(id)
    }

    pub async fn view(&self) -> View {
        self.state.lock().await.view
    }

    pub async fn snapshot(&self) -> Snapshot {
        let state = self.state.lock().await;
        Snapshot {
            view: state.view,
            has_session: state.session.has_session(),
            assessments: state.assessments.items().to_vec(),
            selected: state.assessments.selected().cloned(),
            status: state.status.clone(),
        }
    }

    /// Applies a transition. Session clearing happens here under the lock;
    /// refreshes are returned to the caller to run after the lock is released.
    async fn transition(&self, state: &mut OrchestratorState, transition: Transition) -> Effect {
        let (next, effect) = state.view.apply(transition);
        info!(from = state.view.as_str(), to = next.as_str(), ?transition, "view transition");
        state.view = next;
        match effect {
            Effect::ClearSession => {
                state.session.clear().await;
                Effect::None
            }
            other => other,
        }
    }

    async fn run_effect(&self, effect: Effect) {
        if effect == Effect::RefreshAssessments {
            self.refresh().await;
        }
    }

    async fn begin_action(&self) {
        let mut state = self.state.lock().await;
        state.status = ActionStatus {
            loading: true,
            error: None,
        };
    }

    async fn finish_action(&self, error: Option<String>) -> ActionStatus {
        let mut state = self.state.lock().await;
        state.status = ActionStatus {
            loading: false,
            error,
        };
        state.status.clone()
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
