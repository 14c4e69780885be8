pub mod common;
pub mod home_page;
pub mod login_page;
pub mod nav_bar;
pub mod personas_page;
pub mod reportes_page;
pub mod voter_form;

use crate::backend::model::{Candidate, Corporation, Department, Leader};
use crate::backend::store::Session;
use crate::backend::{AppCmd, AppEvent};
use crate::config::Config;
use crate::state::form::VoterForm;
use crate::state::listing::Listing;
use crate::state::report::ReportView;
use dioxus::prelude::*;
use tokio::sync::mpsc::UnboundedSender;

pub type CmdSender = UnboundedSender<AppCmd>;

#[derive(Clone, Copy)]
pub struct AppState {
    pub session: Signal<Option<Session>>,
    pub session_restored: Signal<bool>,
    pub login_error: Signal<Option<String>>,
    pub login_pending: Signal<bool>,

    // Lookup lists
    pub departments: Signal<Vec<Department>>,
    pub leaders: Signal<Vec<Leader>>,
    pub candidates: Signal<Vec<Candidate>>,
    pub corporations: Signal<Vec<Corporation>>,

    pub listing: Signal<Listing>,
    pub voter_form: Signal<Option<VoterForm>>,
    pub report: Signal<ReportView>,
    pub notice: Signal<Option<String>>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let page_size = config.page_size;
        let report_limit = config.report_limit;
        Self {
            session: use_signal(|| None),
            session_restored: use_signal(|| false),
            login_error: use_signal(|| None),
            login_pending: use_signal(|| false),
            departments: use_signal(Vec::new),
            leaders: use_signal(Vec::new),
            candidates: use_signal(Vec::new),
            corporations: use_signal(Vec::new),
            listing: use_signal(move || Listing::new(page_size)),
            voter_form: use_signal(|| None),
            report: use_signal(move || ReportView::new(report_limit)),
            notice: use_signal(|| None),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.read().as_ref().is_some_and(|s| !s.access_token.is_empty())
    }

    pub fn user_email(&self) -> String {
        self.session.read().as_ref().and_then(|s| s.user_email.clone()).unwrap_or_default()
    }

    /// Folds one backend event into the signals. Follow-up lookups the forms
    /// ask for go out on `cmd_tx`.
    pub fn apply(&mut self, event: AppEvent, cmd_tx: &CmdSender) {
        match event {
            AppEvent::SessionRestored(session) => {
                self.session.set(session);
                self.session_restored.set(true);
            }
            AppEvent::LoggedIn(session) => {
                self.session.set(Some(session));
                self.login_error.set(None);
                self.login_pending.set(false);
            }
            AppEvent::LoginFailed(message) => {
                self.login_error.set(Some(message));
                self.login_pending.set(false);
            }
            AppEvent::LoggedOut => {
                let (page_size, limit) = (self.listing.peek().page_size, self.report.peek().filters.limit);
                self.session.set(None);
                self.voter_form.set(None);
                self.listing.set(Listing::new(page_size));
                self.report.set(ReportView::new(limit));
                self.notice.set(None);
            }
            AppEvent::DepartmentsFetched(departments) => self.departments.set(departments),
            AppEvent::LeadersFetched(leaders) => self.leaders.set(leaders),
            AppEvent::CandidatesFetched(candidates) => self.candidates.set(candidates),
            AppEvent::CorporationsFetched(corporations) => self.corporations.set(corporations),
            AppEvent::MunicipalitiesFetched { department_id, municipalities } => {
                let mut form = self.voter_form.write();
                let Some(form) = form.as_mut() else { return };
                match municipalities {
                    Some(options) => {
                        if !form.municipalities_loaded(department_id, options) {
                            tracing::debug!(department_id, "Dropped stale municipalities");
                        }
                    }
                    None => {
                        form.municipalities_failed(department_id);
                        form.error = Some("Error al obtener municipios".to_string());
                    }
                }
            }
            AppEvent::LeaderCandidatesFetched { leader_id, candidates } => {
                let mut form = self.voter_form.write();
                let Some(form) = form.as_mut() else { return };
                match candidates {
                    Some(options) => {
                        if !form.candidates_loaded(leader_id, options) {
                            tracing::debug!(leader_id, "Dropped stale candidates");
                        }
                    }
                    None => {
                        form.candidates_failed(leader_id);
                        form.error = Some("Error al obtener candidatos del líder".to_string());
                    }
                }
            }
            AppEvent::AssignmentFetched { voter_id, assignment } => {
                let request = self
                    .voter_form
                    .write()
                    .as_mut()
                    .and_then(|form| form.apply_assignment(voter_id, &assignment));
                if let Some(request) = request {
                    send(cmd_tx, request.into());
                }
            }
            AppEvent::VotersFetched(page) => {
                if !self.listing.write().loaded(page) {
                    tracing::debug!("Dropped stale voter page");
                }
            }
            AppEvent::VotersFailed { page, message } => {
                if !self.listing.write().failed(page, message) {
                    tracing::debug!(page, "Dropped stale voter page failure");
                }
            }
            AppEvent::VoterSaved { .. } => self.voter_form.set(None),
            AppEvent::VoterSaveFailed(message) => {
                if let Some(form) = self.voter_form.write().as_mut() {
                    form.submit_failed(message);
                }
            }
            AppEvent::VoterDeleted { voter_id } => {
                tracing::debug!(voter_id, "Voter removed from listing");
            }
            AppEvent::DeleteFailed(message) => self.notice.set(Some(message)),
            AppEvent::ReportFetched { filters, report } => {
                if !self.report.write().loaded(&filters, report) {
                    tracing::debug!("Dropped stale report");
                }
            }
            AppEvent::ReportFailed { filters, message } => {
                self.report.write().failed(&filters, message);
            }
            AppEvent::Notice(message) => self.notice.set(Some(message)),
        }
    }
}

/// Sends a command, logging instead of failing when the backend is gone.
pub fn send(cmd_tx: &CmdSender, cmd: AppCmd) {
    if let Err(e) = cmd_tx.send(cmd) {
        tracing::error!(command = e.0.name(), "Failed to send command, backend stopped");
    }
}
