pub mod api;
pub mod assessments;
pub mod error;
pub mod format;
pub mod orchestrator;
pub mod session;
pub mod upload;
pub mod view;

pub use api::{ApiClient, AssessmentApi, DEFAULT_REQUEST_TIMEOUT};
pub use assessments::AssessmentStore;
pub use error::{ClientError, ClientResult};
pub use orchestrator::{
    ActionStatus, AuthForm, AuthMode, Orchestrator, Snapshot, UploadForm, AUTH_FAILED_MESSAGE,
    MISSING_FILE_MESSAGE, SIGN_IN_REQUIRED_MESSAGE, UPLOAD_FAILED_MESSAGE,
};
pub use session::{SessionStore, SessionTicket, SESSION_TOKEN_KEY};
pub use upload::{is_accepted_upload, UploadFile, ACCEPTED_UPLOAD_EXTENSIONS};
pub use view::View;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
