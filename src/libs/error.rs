use std::fmt;

use thiserror::Error;

/// One of the three CGI exchanges in a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Login,
    Exec,
    Logout,
}

impl Step {
    /// Endpoint path under /cgi-bin/ for this exchange.
    pub fn path(self) -> &'static str {
        match self {
            Step::Login => "login",
            Step::Exec => "exec",
            Step::Logout => "logout",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Login => "login",
            Step::Exec => "cmd",
            Step::Logout => "logout",
        };
        write!(f, "{name}")
    }
}

/// Fatal failures of a racadm session.
///
/// Parse failures are not listed here: a response that cannot be parsed
/// is treated as "field not found", which is only fatal during login
/// (where it surfaces as `Auth`).
#[derive(Debug, Error)]
pub enum RacError {
    #[error("failed to set up https client: {0}")]
    Client(reqwest::Error),

    #[error("{step} error: {source}")]
    Transport { step: Step, source: reqwest::Error },

    #[error("could not login to device: {0}")]
    Auth(String),
}

#[test]
fn step_paths_and_display() {
    assert_eq!(Step::Login.path(), "login");
    assert_eq!(Step::Exec.path(), "exec");
    assert_eq!(Step::Logout.path(), "logout");
    assert_eq!(Step::Exec.to_string(), "cmd");
}

#[test]
fn auth_error_message() {
    let err = RacError::Auth("session id is missing".to_string());
    assert_eq!(
        err.to_string(),
        "could not login to device: session id is missing"
    );
}
