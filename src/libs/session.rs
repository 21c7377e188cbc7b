use crate::libs::error::{RacError, Step};
use crate::libs::transport::Transport;
use crate::libs::xml::{escape_text, extract_field, Field};

/// Connection parameters for one controller. Built once by the caller
/// and read-only for the life of the session.
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Print each request and response on stderr.
    pub debug: bool,
    /// Verify the controller's TLS certificate instead of accepting any.
    pub verify_certs: bool,
}

/// Aggregate result of a full login/exec/logout run.
#[derive(Clone, Debug)]
pub struct ExecutionOutcome {
    pub success: bool,
    /// Command output as sent by the controller, empty when the
    /// response carried none. Populated even when a later logout fails.
    pub output: String,
    pub error_message: String,
}

impl ExecutionOutcome {
    fn success(output: String) -> Self {
        ExecutionOutcome {
            success: true,
            output,
            error_message: String::new(),
        }
    }

    fn failure(output: String, err: &RacError) -> Self {
        ExecutionOutcome {
            success: false,
            output,
            error_message: err.to_string(),
        }
    }
}

/// Protocol position of a session. `Failed` and `LoggedOut` are
/// terminal; no further exchanges are issued from either.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    LoggedIn,
    CommandExecuted,
    LoggedOut,
    Failed,
}

/// One racadm session against one controller. Owns the transport, the
/// session token, and the response buffer of the most recent exchange;
/// all three are released when the session drops, on every exit path.
pub struct Session<'a> {
    config: &'a ConnectionConfig,
    transport: Transport,
    /// Empty until login succeeds; attached as `sid={token}` to every
    /// exchange after that, never to login itself.
    token: String,
    response: Vec<u8>,
    state: SessionState,
}

impl<'a> Session<'a> {
    /// Opens a session against `https://{host}:{port}`. No exchange is
    /// issued until [`Session::execute`].
    pub fn open(config: &'a ConnectionConfig) -> Result<Self, RacError> {
        let transport = Transport::open(config).map_err(RacError::Client)?;
        Ok(Self::new(config, transport))
    }

    /// Wraps an already-built transport. Tests use this to point the
    /// session at a mock server.
    pub fn new(config: &'a ConnectionConfig, transport: Transport) -> Self {
        Session {
            config,
            transport,
            token: String::new(),
            response: Vec::new(),
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Runs the three-step protocol for one command. Success requires
    /// all of login, exec, and logout to complete; any failure names
    /// the step it happened in. A logout failure still surfaces the
    /// output captured by exec.
    pub fn execute(&mut self, command: &str) -> ExecutionOutcome {
        if self.state != SessionState::Idle {
            return ExecutionOutcome {
                success: false,
                output: String::new(),
                error_message: "session already finished".to_string(),
            };
        }

        if let Err(err) = self.login() {
            return ExecutionOutcome::failure(String::new(), &err);
        }

        let output = match self.exec(command) {
            Ok(output) => output,
            // Logout is deliberately not attempted here: the stock
            // client skips it after a failed exec, and the remote CGI
            // expires the orphaned session on its own.
            Err(err) => return ExecutionOutcome::failure(String::new(), &err),
        };

        if let Err(err) = self.logout() {
            return ExecutionOutcome::failure(output, &err);
        }

        ExecutionOutcome::success(output)
    }

    /// One exchange. Replaces the response buffer wholly and attaches
    /// the session cookie whenever a token is held.
    fn exchange(&mut self, step: Step, body: &str) -> Result<(), RacError> {
        self.response.clear();
        let token = if self.token.is_empty() {
            None
        } else {
            Some(self.token.as_str())
        };
        match self.transport.exchange(step.path(), body, token) {
            Ok(data) => {
                self.response = data;
                Ok(())
            }
            Err(source) => {
                self.state = SessionState::Failed;
                Err(RacError::Transport { step, source })
            }
        }
    }

    fn login(&mut self) -> Result<(), RacError> {
        let body = login_payload(&self.config.username, &self.config.password);
        self.exchange(Step::Login, &body)?;

        let sid = match extract_field(&self.response, Field::SessionId) {
            Ok(Some(sid)) => sid,
            Ok(None) => return Err(self.fail_auth("no session id in login response")),
            Err(err) => {
                return Err(self.fail_auth(&format!("unable to parse login response: {err}")))
            }
        };

        // The CGI reports a rejected login as a session id of zero;
        // any leading '0' (or an empty value) counts as rejection.
        if sid.is_empty() || sid.starts_with('0') {
            return Err(self.fail_auth(&format!("rejected session id {sid:?}")));
        }

        if self.config.debug {
            eprintln!("logged in, session id {sid}");
        }
        self.token = sid;
        self.state = SessionState::LoggedIn;
        Ok(())
    }

    fn exec(&mut self, command: &str) -> Result<String, RacError> {
        let body = exec_payload(command);
        self.exchange(Step::Exec, &body)?;

        // A response without CMDOUTPUT is a command with no output, not
        // an error. Unparseable responses degrade the same way.
        let output = match extract_field(&self.response, Field::CommandOutput) {
            Ok(Some(output)) => output,
            Ok(None) => String::new(),
            Err(err) => {
                eprintln!("warning: unable to parse command response: {err}");
                String::new()
            }
        };

        self.state = SessionState::CommandExecuted;
        Ok(output)
    }

    fn logout(&mut self) -> Result<(), RacError> {
        self.exchange(Step::Logout, "")?;
        self.state = SessionState::LoggedOut;
        Ok(())
    }

    fn fail_auth(&mut self, detail: &str) -> RacError {
        self.state = SessionState::Failed;
        RacError::Auth(detail.to_string())
    }
}

/// Runs one command against one controller and reports the aggregate
/// outcome. This is the crate's single entry point for callers.
pub fn execute(config: &ConnectionConfig, command: &str) -> ExecutionOutcome {
    match Session::open(config) {
        Ok(mut session) => session.execute(command),
        Err(err) => ExecutionOutcome::failure(String::new(), &err),
    }
}

fn login_payload(username: &str, password: &str) -> String {
    format!(
        "<?xml version='1.0'?><LOGIN><REQ><USERNAME>{}</USERNAME><PASSWORD>{}</PASSWORD></REQ></LOGIN>",
        escape_text(username),
        escape_text(password)
    )
}

fn exec_payload(command: &str) -> String {
    format!(
        "<?xml version='1.0'?><EXEC><REQ><CMDINPUT>racadm {}</CMDINPUT><MAXOUTPUTLEN>0x0fff</MAXOUTPUTLEN></REQ></EXEC>",
        escape_text(command)
    )
}

#[test]
fn login_payload_matches_wire_template() {
    assert_eq!(
        login_payload("root", "calvin"),
        "<?xml version='1.0'?><LOGIN><REQ><USERNAME>root</USERNAME><PASSWORD>calvin</PASSWORD></REQ></LOGIN>"
    );
}

#[test]
fn exec_payload_carries_racadm_prefix_and_cap() {
    let body = exec_payload("getconfig -g cfgLanNetworking");
    assert_eq!(
        body,
        "<?xml version='1.0'?><EXEC><REQ><CMDINPUT>racadm getconfig -g cfgLanNetworking</CMDINPUT><MAXOUTPUTLEN>0x0fff</MAXOUTPUTLEN></REQ></EXEC>"
    );
}

#[test]
fn payload_text_is_escaped() {
    let body = exec_payload(r#"set "name" <&>"#);
    assert!(body.contains("racadm set &quot;name&quot; &lt;&amp;&gt;"));
    let login = login_payload("ro<ot", "pa&ss'");
    assert!(login.contains("<USERNAME>ro&lt;ot</USERNAME>"));
    assert!(login.contains("<PASSWORD>pa&amp;ss&apos;</PASSWORD>"));
}
