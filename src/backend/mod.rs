pub mod api;
pub mod export;
pub mod model;
pub mod store;

use crate::config::Config;
use crate::state::form::{FormRequest, VoterSubmission};
use crate::state::listing::ListingRow;
use api::reports::ReportFilters;
use api::{ApiClient, ApiError, HttpTransport, Transport};
use model::{
    AssignmentSummary, Candidate, Corporation, Department, Leader, Municipality, Page, Report,
};
use store::{Session, SessionStore};
use tokio::sync::mpsc;

pub const LOGIN_FAILED: &str = "Usuario o contraseña incorrectos";

#[derive(Debug)]
pub enum AppCmd {
    Login { email: String, password: String },
    Logout,
    FetchFormOptions,
    FetchReportOptions,
    FetchMunicipalities { department_id: i64 },
    FetchLeaderCandidates { leader_id: i64 },
    FetchAssignment { voter_id: i64 },
    FetchVoters { page: u32, enrich: bool },
    SaveVoter { submission: VoterSubmission, refresh_page: u32 },
    DeleteVoter { voter_id: i64, page: u32 },
    FetchReport { filters: ReportFilters },
}

impl AppCmd {
    /// Variant name for logs; never includes credentials.
    pub fn name(&self) -> &'static str {
        match self {
            AppCmd::Login { .. } => "Login",
            AppCmd::Logout => "Logout",
            AppCmd::FetchFormOptions => "FetchFormOptions",
            AppCmd::FetchReportOptions => "FetchReportOptions",
            AppCmd::FetchMunicipalities { .. } => "FetchMunicipalities",
            AppCmd::FetchLeaderCandidates { .. } => "FetchLeaderCandidates",
            AppCmd::FetchAssignment { .. } => "FetchAssignment",
            AppCmd::FetchVoters { .. } => "FetchVoters",
            AppCmd::SaveVoter { .. } => "SaveVoter",
            AppCmd::DeleteVoter { .. } => "DeleteVoter",
            AppCmd::FetchReport { .. } => "FetchReport",
        }
    }
}

impl From<FormRequest> for AppCmd {
    fn from(request: FormRequest) -> Self {
        match request {
            FormRequest::Municipalities(department_id) => AppCmd::FetchMunicipalities { department_id },
            FormRequest::Candidates(leader_id) => AppCmd::FetchLeaderCandidates { leader_id },
            FormRequest::Assignment(voter_id) => AppCmd::FetchAssignment { voter_id },
        }
    }
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Stored session read at startup; `None` means signed out.
    SessionRestored(Option<Session>),
    LoggedIn(Session),
    LoginFailed(String),
    LoggedOut,
    DepartmentsFetched(Vec<Department>),
    LeadersFetched(Vec<Leader>),
    CandidatesFetched(Vec<Candidate>),
    CorporationsFetched(Vec<Corporation>),
    // `None` when the lookup failed
    MunicipalitiesFetched { department_id: i64, municipalities: Option<Vec<Municipality>> },
    LeaderCandidatesFetched { leader_id: i64, candidates: Option<Vec<Candidate>> },
    AssignmentFetched { voter_id: i64, assignment: AssignmentSummary },
    VotersFetched(Page<ListingRow>),
    VotersFailed { page: u32, message: String },
    VoterSaved { voter_id: i64 },
    VoterSaveFailed(String),
    VoterDeleted { voter_id: i64 },
    DeleteFailed(String),
    ReportFetched { filters: ReportFilters, report: Report },
    ReportFailed { filters: ReportFilters, message: String },
    Notice(String),
}

/// Create-or-update followed by the assignment call. The two calls are
/// independent: if the assignment fails after a create, the voter stays
/// saved without assignment.
pub async fn save_voter<T: Transport>(client: &ApiClient<T>, submission: &VoterSubmission) -> Result<i64, ApiError> {
    let voter_id = match submission.voter_id {
        Some(id) => {
            client.update_voter(id, &submission.voter).await?;
            if let Some(assignment) = &submission.assignment {
                client.update_assignment(id, assignment).await?;
            }
            id
        }
        None => {
            let id = client.create_voter(&submission.voter).await?;
            if let Some(assignment) = &submission.assignment {
                if let Err(e) = client.assign(id, assignment).await {
                    tracing::error!(voter_id = id, "Voter created but assignment failed: {}", e);
                    return Err(e);
                }
            }
            id
        }
    };
    Ok(voter_id)
}

pub struct Backend<T: Transport = HttpTransport> {
    client: ApiClient<T>,
    store: SessionStore,
    cmd_rx: mpsc::UnboundedReceiver<AppCmd>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
    page_size: u32,
}

impl<T: Transport> Backend<T> {
    pub fn new(
        client: ApiClient<T>,
        store: SessionStore,
        cmd_rx: mpsc::UnboundedReceiver<AppCmd>,
        event_tx: mpsc::UnboundedSender<AppEvent>,
        page_size: u32,
    ) -> Self {
        Self { client, store, cmd_rx, event_tx, page_size }
    }

    /// Reads the stored session, if any, and tells the view tree about it.
    pub fn restore_session(&mut self) {
        let session = match self.store.load_session() {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("Failed to load session: {}", e);
                None
            }
        };
        self.client.set_token(session.as_ref().map(|s| s.access_token.clone()));
        self.emit(AppEvent::SessionRestored(session));
    }

    pub async fn run(&mut self) {
        while let Some(cmd) = self.cmd_rx.recv().await {
            self.handle_command(cmd).await;
        }
        tracing::info!("Command channel closed, backend stopping");
    }

    fn emit(&self, event: AppEvent) {
        if let Err(e) = self.event_tx.send(event) {
            tracing::warn!("Dropping event, view tree is gone: {:?}", e.0);
        }
    }

    async fn handle_command(&mut self, cmd: AppCmd) {
        tracing::debug!(command = cmd.name(), "handling command");
        match cmd {
            AppCmd::Login { email, password } => self.login(&email, &password).await,
            AppCmd::Logout => {
                if let Err(e) = self.store.clear() {
                    tracing::error!("Failed to clear session: {}", e);
                }
                self.client.set_token(None);
                self.emit(AppEvent::LoggedOut);
            }
            AppCmd::FetchFormOptions => {
                self.fetch_departments().await;
                self.fetch_leaders().await;
            }
            AppCmd::FetchReportOptions => {
                self.fetch_leaders().await;
                match self.client.candidates().await {
                    Ok(candidates) => self.emit(AppEvent::CandidatesFetched(candidates)),
                    Err(e) => self.emit(AppEvent::Notice(e.user_message())),
                }
                match self.client.corporations().await {
                    Ok(corporations) => self.emit(AppEvent::CorporationsFetched(corporations)),
                    Err(e) => self.emit(AppEvent::Notice(e.user_message())),
                }
                self.fetch_departments().await;
            }
            AppCmd::FetchMunicipalities { department_id } => {
                let municipalities = self.client.municipalities(department_id).await.ok();
                self.emit(AppEvent::MunicipalitiesFetched { department_id, municipalities });
            }
            AppCmd::FetchLeaderCandidates { leader_id } => {
                let candidates = self.client.candidates_by_leader(leader_id).await.ok();
                self.emit(AppEvent::LeaderCandidatesFetched { leader_id, candidates });
            }
            AppCmd::FetchAssignment { voter_id } => {
                let assignment = match self.client.assignment(voter_id).await {
                    Ok(records) => AssignmentSummary::from_records(&records),
                    Err(e) => {
                        tracing::warn!(voter_id, "No assignment loaded: {}", e);
                        AssignmentSummary::default()
                    }
                };
                self.emit(AppEvent::AssignmentFetched { voter_id, assignment });
            }
            AppCmd::FetchVoters { page, enrich } => self.fetch_voters(page, enrich).await,
            AppCmd::SaveVoter { submission, refresh_page } => {
                match save_voter(&self.client, &submission).await {
                    Ok(voter_id) => {
                        tracing::info!(voter_id, "Voter saved");
                        self.emit(AppEvent::VoterSaved { voter_id });
                        self.fetch_voters(refresh_page, true).await;
                    }
                    Err(e) => self.emit(AppEvent::VoterSaveFailed(e.user_message())),
                }
            }
            AppCmd::DeleteVoter { voter_id, page } => match self.client.delete_voter(voter_id).await {
                Ok(()) => {
                    tracing::info!(voter_id, "Voter deleted");
                    self.emit(AppEvent::VoterDeleted { voter_id });
                    self.refetch_after_delete(page).await;
                }
                Err(e) => self.emit(AppEvent::DeleteFailed(e.user_message())),
            },
            AppCmd::FetchReport { filters } => match self.client.voter_report(&filters).await {
                Ok(report) => self.emit(AppEvent::ReportFetched { filters, report }),
                Err(e) => self.emit(AppEvent::ReportFailed { filters, message: e.user_message() }),
            },
        }
    }

    async fn login(&mut self, email: &str, password: &str) {
        let response = match self.client.login(email, password).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Login rejected: {}", e);
                self.emit(AppEvent::LoginFailed(LOGIN_FAILED.to_string()));
                return;
            }
        };

        let session = Session {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            user_email: response.email.or_else(|| Some(email.to_string())),
        };
        if let Err(e) = self.store.save_session(&session) {
            tracing::error!("Failed to persist session: {}", e);
        }
        self.client.set_token(Some(session.access_token.clone()));
        tracing::info!(email, "Signed in");
        self.emit(AppEvent::LoggedIn(session));
    }

    async fn fetch_departments(&self) {
        match self.client.departments().await {
            Ok(departments) => self.emit(AppEvent::DepartmentsFetched(departments)),
            Err(e) => self.emit(AppEvent::Notice(e.user_message())),
        }
    }

    async fn fetch_leaders(&self) {
        match self.client.leaders().await {
            Ok(leaders) => self.emit(AppEvent::LeadersFetched(leaders)),
            Err(e) => self.emit(AppEvent::Notice(e.user_message())),
        }
    }

    async fn load_page(&self, page: u32, enrich: bool) -> Result<Page<ListingRow>, ApiError> {
        let fetched = self.client.voters(page, self.page_size).await?;
        let mut rows = Vec::with_capacity(fetched.data.len());
        // Roster used to name bare candidate ids, fetched at most once per page.
        let mut known: Option<Vec<Candidate>> = None;
        for voter in fetched.data {
            let candidates = if enrich {
                // One request per row, in order; a failure only loses the names.
                match self.client.assignment(voter.id).await {
                    Ok(records) => {
                        let summary = AssignmentSummary::from_records(&records);
                        if summary.has_unnamed() && known.is_none() {
                            known = Some(self.client.candidates().await.unwrap_or_else(|e| {
                                tracing::debug!("Candidate roster unavailable: {}", e);
                                Vec::new()
                            }));
                        }
                        Some(summary.candidate_labels(known.as_deref().unwrap_or_default()))
                    }
                    Err(e) => {
                        tracing::debug!(voter_id = voter.id, "Assignment lookup failed: {}", e);
                        None
                    }
                }
            } else {
                None
            };
            rows.push(ListingRow { voter, candidates });
        }
        Ok(Page { data: rows, page: fetched.page, pages: fetched.pages, total: fetched.total })
    }

    async fn fetch_voters(&self, page: u32, enrich: bool) {
        match self.load_page(page, enrich).await {
            Ok(loaded) => self.emit(AppEvent::VotersFetched(loaded)),
            Err(e) => {
                tracing::warn!(page, "Voter page failed: {}", e);
                self.emit(AppEvent::VotersFailed { page, message: e.user_message() });
            }
        }
    }

    async fn refetch_after_delete(&self, page: u32) {
        match self.load_page(page, true).await {
            Ok(loaded) if loaded.data.is_empty() && page > 1 => self.fetch_voters(page - 1, true).await,
            Ok(loaded) => self.emit(AppEvent::VotersFetched(loaded)),
            Err(e) => {
                tracing::warn!("Refetch after delete failed: {}", e);
                self.emit(AppEvent::VotersFailed { page, message: e.user_message() });
            }
        }
    }
}

/// Opens the session store at `path`, keeping the session in memory when
/// the file cannot be opened.
fn open_store(path: &str) -> Result<SessionStore, store::StoreError> {
    SessionStore::new(path).or_else(|e| {
        tracing::error!(path, "Failed to open session store, session will not persist: {}", e);
        SessionStore::new_in_memory()
    })
}

pub async fn init(
    config: Config,
    cmd_rx: mpsc::UnboundedReceiver<AppCmd>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
) {
    let store = match open_store(&config.session_path) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("No session store available: {}", e);
            let _ = event_tx.send(AppEvent::SessionRestored(None));
            return;
        }
    };

    tracing::info!(api_url = %config.api_url, "Backend initialized");
    let client = ApiClient::new(HttpTransport::new(config.api_url.clone()));
    let mut backend = Backend::new(client, store, cmd_rx, event_tx, config.page_size);
    backend.restore_session();
    backend.run().await
}
