use super::cascade::{Cascade, CascadeAction};
use crate::backend::model::{AssignmentRequest, AssignmentSummary, Candidate, Municipality, Voter, VoterPayload};
use regex::Regex;
use std::sync::OnceLock;

pub const GENDERS: [(&str, &str); 2] = [("M", "Masculino"), ("F", "Femenino")];
pub const BLOOD_TYPES: [&str; 8] = ["O+", "O-", "A+", "A-", "B+", "B-", "AB+", "AB-"];
pub const DEFAULT_POLITICAL_STATUS: &str = "Active";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FirstName,
    LastName,
    Identification,
    Gender,
    BloodType,
    BirthDate,
    Phone,
    Address,
    Neighborhood,
    Email,
    Occupation,
    VotingLocation,
    VotingBooth,
    Department,
    Municipality,
    Leader,
    Candidates,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::FirstName => "Nombre",
            Field::LastName => "Apellido",
            Field::Identification => "Identificación",
            Field::Gender => "Género",
            Field::BloodType => "Tipo de sangre",
            Field::BirthDate => "Fecha de nacimiento",
            Field::Phone => "Teléfono",
            Field::Address => "Dirección",
            Field::Neighborhood => "Barrio",
            Field::Email => "Correo",
            Field::Occupation => "Ocupación",
            Field::VotingLocation => "Lugar de votación",
            Field::VotingBooth => "Casilla",
            Field::Department => "Departamento",
            Field::Municipality => "Municipio",
            Field::Leader => "Líder",
            Field::Candidates => "Candidato",
        }
    }
}

/// Free-text inputs in the order the form renders them.
pub const TEXT_FIELDS: [Field; 11] = [
    Field::FirstName,
    Field::LastName,
    Field::Identification,
    Field::Phone,
    Field::Address,
    Field::Neighborhood,
    Field::Email,
    Field::Occupation,
    Field::VotingLocation,
    Field::VotingBooth,
    Field::BirthDate,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentMode {
    Single,
    Multi,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormConfig {
    /// Checked in this order; the first missing one is reported.
    pub required: Vec<Field>,
    pub assignment: AssignmentMode,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            required: vec![
                Field::FirstName,
                Field::LastName,
                Field::Identification,
                Field::VotingLocation,
                Field::VotingBooth,
                Field::Leader,
                Field::Candidates,
                Field::Department,
                Field::Municipality,
            ],
            assignment: AssignmentMode::Multi,
        }
    }
}

impl FormConfig {
    pub fn is_required(&self, field: Field) -> bool {
        self.required.contains(&field)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{} es requerido", .0.label())]
    Required(Field),
    #[error("Correo inválido")]
    InvalidEmail,
    #[error("Teléfono inválido")]
    InvalidPhone,
    #[error("Seleccione un solo candidato")]
    SingleCandidate,
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\+?[0-9][0-9 ()-]{6,14}$").expect("valid phone regex"))
}

/// Remote lookups a form needs after a user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormRequest {
    Municipalities(i64),
    Candidates(i64),
    Assignment(i64),
}

/// What a valid form turns into on submit.
#[derive(Debug, Clone, PartialEq)]
pub struct VoterSubmission {
    pub voter_id: Option<i64>,
    pub voter: VoterPayload,
    pub assignment: Option<AssignmentRequest>,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct TextValues {
    first_name: String,
    last_name: String,
    identification: String,
    gender: String,
    blood_type: String,
    birth_date: String,
    phone: String,
    address: String,
    neighborhood: String,
    email: String,
    occupation: String,
    voting_location: String,
    voting_booth: String,
    political_status: String,
}

/// The create/edit voter form. Owns the record being edited and both
/// dependent selects (department → municipality, leader → candidates).
#[derive(Debug, Clone, PartialEq)]
pub struct VoterForm {
    pub config: FormConfig,
    voter_id: Option<i64>,
    values: TextValues,
    department_id: Option<i64>,
    municipality_id: Option<i64>,
    leader_id: Option<i64>,
    candidate_ids: Vec<i64>,
    initial_leader: Option<i64>,
    leader_touched: bool,
    municipalities: Cascade<i64, Municipality>,
    candidates: Cascade<i64, Candidate>,
    pub error: Option<String>,
    pub saving: bool,
}

impl VoterForm {
    pub fn new(config: FormConfig) -> Self {
        Self {
            config,
            voter_id: None,
            values: TextValues {
                political_status: DEFAULT_POLITICAL_STATUS.to_string(),
                ..Default::default()
            },
            department_id: None,
            municipality_id: None,
            leader_id: None,
            candidate_ids: Vec::new(),
            initial_leader: None,
            leader_touched: false,
            municipalities: Cascade::new(),
            candidates: Cascade::new(),
            error: None,
            saving: false,
        }
    }

    /// Form pre-filled from `voter`, plus the lookups needed to finish
    /// populating it (its municipalities and its current assignment).
    pub fn edit(config: FormConfig, voter: &Voter) -> (Self, Vec<FormRequest>) {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        let mut form = Self::new(config);
        form.voter_id = Some(voter.id);
        form.values = TextValues {
            first_name: voter.first_name.clone(),
            last_name: voter.last_name.clone(),
            identification: voter.identification.clone(),
            gender: text(&voter.gender),
            blood_type: text(&voter.blood_type),
            birth_date: text(&voter.birth_date),
            phone: text(&voter.phone),
            address: text(&voter.address),
            neighborhood: text(&voter.neighborhood),
            email: text(&voter.email),
            occupation: text(&voter.occupation),
            voting_location: text(&voter.voting_location),
            voting_booth: text(&voter.voting_booth),
            political_status: voter
                .political_status
                .clone()
                .unwrap_or_else(|| DEFAULT_POLITICAL_STATUS.to_string()),
        };

        let mut requests = Vec::new();
        form.department_id = voter.department_id;
        if let CascadeAction::Fetch(department) = form.municipalities.select(voter.department_id) {
            form.municipality_id = voter.municipality_id;
            requests.push(FormRequest::Municipalities(department));
        }
        requests.push(FormRequest::Assignment(voter.id));
        (form, requests)
    }

    pub fn is_editing(&self) -> bool {
        self.voter_id.is_some()
    }

    pub fn text(&self, field: Field) -> &str {
        self.text_slot(field).map(String::as_str).unwrap_or("")
    }

    pub fn set_text(&mut self, field: Field, value: impl Into<String>) {
        if let Some(slot) = self.text_slot_mut(field) {
            *slot = value.into();
        }
    }

    fn text_slot(&self, field: Field) -> Option<&String> {
        let v = &self.values;
        Some(match field {
            Field::FirstName => &v.first_name,
            Field::LastName => &v.last_name,
            Field::Identification => &v.identification,
            Field::Gender => &v.gender,
            Field::BloodType => &v.blood_type,
            Field::BirthDate => &v.birth_date,
            Field::Phone => &v.phone,
            Field::Address => &v.address,
            Field::Neighborhood => &v.neighborhood,
            Field::Email => &v.email,
            Field::Occupation => &v.occupation,
            Field::VotingLocation => &v.voting_location,
            Field::VotingBooth => &v.voting_booth,
            Field::Department | Field::Municipality | Field::Leader | Field::Candidates => return None,
        })
    }

    fn text_slot_mut(&mut self, field: Field) -> Option<&mut String> {
        let v = &mut self.values;
        Some(match field {
            Field::FirstName => &mut v.first_name,
            Field::LastName => &mut v.last_name,
            Field::Identification => &mut v.identification,
            Field::Gender => &mut v.gender,
            Field::BloodType => &mut v.blood_type,
            Field::BirthDate => &mut v.birth_date,
            Field::Phone => &mut v.phone,
            Field::Address => &mut v.address,
            Field::Neighborhood => &mut v.neighborhood,
            Field::Email => &mut v.email,
            Field::Occupation => &mut v.occupation,
            Field::VotingLocation => &mut v.voting_location,
            Field::VotingBooth => &mut v.voting_booth,
            Field::Department | Field::Municipality | Field::Leader | Field::Candidates => return None,
        })
    }

    pub fn department_id(&self) -> Option<i64> {
        self.department_id
    }

    pub fn municipality_id(&self) -> Option<i64> {
        self.municipality_id
    }

    pub fn leader_id(&self) -> Option<i64> {
        self.leader_id
    }

    pub fn candidate_ids(&self) -> &[i64] {
        &self.candidate_ids
    }

    pub fn municipality_options(&self) -> &[Municipality] {
        self.municipalities.options()
    }

    pub fn candidate_options(&self) -> &[Candidate] {
        self.candidates.options()
    }

    pub fn municipalities_loading(&self) -> bool {
        self.municipalities.is_loading()
    }

    pub fn candidates_loading(&self) -> bool {
        self.candidates.is_loading()
    }

    pub fn select_department(&mut self, department: Option<i64>) -> Option<FormRequest> {
        self.department_id = department;
        match self.municipalities.select(department) {
            CascadeAction::Unchanged => None,
            CascadeAction::Clear => {
                self.municipality_id = None;
                None
            }
            CascadeAction::Fetch(key) => {
                self.municipality_id = None;
                Some(FormRequest::Municipalities(key))
            }
        }
    }

    pub fn select_municipality(&mut self, municipality: Option<i64>) {
        self.municipality_id = match municipality {
            Some(id) if self.municipality_allowed(id) => Some(id),
            _ => None,
        };
    }

    fn municipality_allowed(&self, id: i64) -> bool {
        if self.department_id.is_none() {
            return false;
        }
        if self.municipalities.is_loading() {
            // Checked again once the options arrive.
            return true;
        }
        self.municipalities.options().iter().any(|m| m.id == id)
    }

    /// Returns `false` when the answer was for a department that is no longer
    /// selected.
    pub fn municipalities_loaded(&mut self, department: i64, options: Vec<Municipality>) -> bool {
        if !self.municipalities.resolve(&department, options) {
            return false;
        }
        if let Some(id) = self.municipality_id {
            if !self.municipalities.options().iter().any(|m| m.id == id) {
                self.municipality_id = None;
            }
        }
        true
    }

    pub fn municipalities_failed(&mut self, department: i64) {
        if self.municipalities.fail(&department) {
            self.municipality_id = None;
        }
    }

    pub fn select_leader(&mut self, leader: Option<i64>) -> Option<FormRequest> {
        self.leader_touched = true;
        self.leader_id = leader;
        match self.candidates.select(leader) {
            CascadeAction::Unchanged => None,
            CascadeAction::Clear => {
                self.candidate_ids.clear();
                None
            }
            CascadeAction::Fetch(key) => {
                if leader != self.initial_leader {
                    self.candidate_ids.clear();
                }
                Some(FormRequest::Candidates(key))
            }
        }
    }

    pub fn candidates_loaded(&mut self, leader: i64, options: Vec<Candidate>) -> bool {
        if !self.candidates.resolve(&leader, options) {
            return false;
        }
        if Some(leader) != self.initial_leader {
            let roster = self.candidates.options();
            self.candidate_ids.retain(|id| roster.iter().any(|c| c.id == *id));
        }
        true
    }

    pub fn candidates_failed(&mut self, leader: i64) {
        self.candidates.fail(&leader);
    }

    pub fn toggle_candidate(&mut self, candidate: i64) {
        match self.config.assignment {
            AssignmentMode::Single => {
                if self.candidate_ids == [candidate] {
                    self.candidate_ids.clear();
                } else {
                    self.candidate_ids = vec![candidate];
                }
            }
            AssignmentMode::Multi => {
                if let Some(pos) = self.candidate_ids.iter().position(|id| *id == candidate) {
                    self.candidate_ids.remove(pos);
                } else {
                    self.candidate_ids.push(candidate);
                }
            }
        }
    }

    /// Pre-populates leader and candidates from the voter's current
    /// assignment. Ignored once the user has picked a leader, so a late
    /// answer cannot undo their change.
    pub fn apply_assignment(&mut self, voter_id: i64, summary: &AssignmentSummary) -> Option<FormRequest> {
        if self.voter_id != Some(voter_id) || self.leader_touched {
            return None;
        }
        self.initial_leader = summary.leader_id;
        self.leader_id = summary.leader_id;
        self.candidate_ids = summary.candidate_ids.clone();
        match self.candidates.select(summary.leader_id) {
            CascadeAction::Fetch(key) => Some(FormRequest::Candidates(key)),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for field in &self.config.required {
            let present = match field {
                Field::Department => self.department_id.is_some(),
                Field::Municipality => self.municipality_id.is_some(),
                Field::Leader => self.leader_id.is_some(),
                Field::Candidates => !self.candidate_ids.is_empty(),
                other => !self.text(*other).trim().is_empty(),
            };
            if !present {
                return Err(ValidationError::Required(*field));
            }
        }

        let email = self.values.email.trim();
        if !email.is_empty() && !email_pattern().is_match(email) {
            return Err(ValidationError::InvalidEmail);
        }
        let phone = self.values.phone.trim();
        if !phone.is_empty() && !phone_pattern().is_match(phone) {
            return Err(ValidationError::InvalidPhone);
        }
        if self.config.assignment == AssignmentMode::Single && self.candidate_ids.len() > 1 {
            return Err(ValidationError::SingleCandidate);
        }
        Ok(())
    }

    /// Validates and builds the write payload and the assignment body.
    pub fn submission(&self) -> Result<VoterSubmission, ValidationError> {
        self.validate()?;
        let optional = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };
        let v = &self.values;
        let voter = VoterPayload {
            first_name: v.first_name.trim().to_string(),
            last_name: v.last_name.trim().to_string(),
            identification: v.identification.trim().to_string(),
            gender: optional(&v.gender),
            blood_type: optional(&v.blood_type),
            birth_date: optional(&v.birth_date),
            phone: optional(&v.phone),
            address: optional(&v.address),
            department_id: self.department_id.unwrap_or_default(),
            municipality_id: self.municipality_id.unwrap_or_default(),
            neighborhood: optional(&v.neighborhood),
            email: optional(&v.email),
            occupation: optional(&v.occupation),
            voting_location: v.voting_location.trim().to_string(),
            voting_booth: v.voting_booth.trim().to_string(),
            political_status: optional(&v.political_status),
        };
        let assignment = match self.leader_id {
            Some(leader_id) if !self.candidate_ids.is_empty() => Some(AssignmentRequest {
                candidate_ids: self.candidate_ids.clone(),
                leader_id,
            }),
            _ => None,
        };
        Ok(VoterSubmission { voter_id: self.voter_id, voter, assignment })
    }

    pub fn begin_submit(&mut self) {
        self.saving = true;
        self.error = None;
    }

    pub fn submit_failed(&mut self, message: impl Into<String>) {
        self.saving = false;
        self.error = Some(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn municipality(id: i64, name: &str) -> Municipality {
        Municipality { id, name: name.into() }
    }

    fn candidate(id: i64, name: &str) -> Candidate {
        Candidate { id, name: name.into(), ..Default::default() }
    }

    fn filled_form() -> VoterForm {
        let mut form = VoterForm::new(FormConfig::default());
        form.set_text(Field::FirstName, "Ana");
        form.set_text(Field::LastName, "Rojas");
        form.set_text(Field::Identification, "1020304050");
        form.set_text(Field::VotingLocation, "Colegio Central");
        form.set_text(Field::VotingBooth, "3");
        assert_eq!(form.select_department(Some(5)), Some(FormRequest::Municipalities(5)));
        form.municipalities_loaded(5, vec![municipality(12, "Bello")]);
        form.select_municipality(Some(12));
        assert_eq!(form.select_leader(Some(7)), Some(FormRequest::Candidates(7)));
        form.candidates_loaded(7, vec![candidate(10, "Paz"), candidate(11, "Rey")]);
        form.toggle_candidate(10);
        form.toggle_candidate(11);
        form
    }

    fn editable_voter() -> Voter {
        Voter {
            id: 42,
            first_name: "Luis".into(),
            last_name: "Gil".into(),
            identification: "77".into(),
            department_id: Some(5),
            municipality_id: Some(12),
            voting_location: Some("Escuela".into()),
            voting_booth: Some("1".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_department_without_municipalities() {
        let mut form = filled_form();
        form.select_department(Some(9));
        assert!(form.municipalities_loaded(9, vec![]));
        assert!(form.municipality_options().is_empty());
        assert_eq!(form.municipality_id(), None);
    }

    #[test]
    fn test_clearing_department_clears_municipality() {
        let mut form = filled_form();
        assert_eq!(form.select_department(None), None);
        assert_eq!(form.municipality_id(), None);
        assert!(form.municipality_options().is_empty());
    }

    #[test]
    fn test_municipality_outside_department_is_rejected() {
        let mut form = filled_form();
        form.select_municipality(Some(99));
        assert_eq!(form.municipality_id(), None);

        let mut empty = VoterForm::new(FormConfig::default());
        empty.select_municipality(Some(12));
        assert_eq!(empty.municipality_id(), None);
    }

    #[test]
    fn test_late_municipalities_for_old_department_ignored() {
        let mut form = VoterForm::new(FormConfig::default());
        form.select_department(Some(5));
        form.select_department(Some(8));
        assert!(!form.municipalities_loaded(5, vec![municipality(12, "Bello")]));
        assert!(form.municipalities_loading());
        assert!(form.municipalities_loaded(8, vec![municipality(30, "Tunja")]));
        assert_eq!(form.municipality_options()[0].name, "Tunja");
    }

    #[test]
    fn test_leader_with_empty_roster_blocks_submit() {
        let mut form = filled_form();
        form.select_leader(Some(8));
        form.candidates_loaded(8, vec![]);
        assert!(form.candidate_options().is_empty());
        assert!(form.candidate_ids().is_empty());
        assert_eq!(form.validate(), Err(ValidationError::Required(Field::Candidates)));
        assert_eq!(form.validate().unwrap_err().to_string(), "Candidato es requerido");
    }

    #[test]
    fn test_validation_reports_first_missing_field() {
        let form = VoterForm::new(FormConfig::default());
        assert_eq!(form.validate().unwrap_err().to_string(), "Nombre es requerido");

        let mut form = filled_form();
        form.set_text(Field::VotingBooth, "  ");
        assert_eq!(form.validate(), Err(ValidationError::Required(Field::VotingBooth)));
    }

    #[test]
    fn test_email_and_phone_patterns() {
        let mut form = filled_form();
        form.set_text(Field::Email, "ana@");
        assert_eq!(form.validate(), Err(ValidationError::InvalidEmail));
        form.set_text(Field::Email, "ana@smartpol.co");
        form.set_text(Field::Phone, "12ab");
        assert_eq!(form.validate(), Err(ValidationError::InvalidPhone));
        form.set_text(Field::Phone, "+57 300 123 4567");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_submission_payload() {
        let form = filled_form();
        let submission = form.submission().unwrap();
        assert_eq!(submission.voter_id, None);
        assert_eq!(submission.voter.department_id, 5);
        assert_eq!(submission.voter.municipality_id, 12);
        assert_eq!(submission.voter.email, None);
        assert_eq!(submission.voter.political_status.as_deref(), Some("Active"));
        assert_eq!(
            submission.assignment,
            Some(AssignmentRequest { candidate_ids: vec![10, 11], leader_id: 7 })
        );
    }

    #[test]
    fn test_edit_preserves_assignment() {
        let (mut form, requests) = VoterForm::edit(FormConfig::default(), &editable_voter());
        assert_eq!(requests, vec![FormRequest::Municipalities(5), FormRequest::Assignment(42)]);
        assert_eq!(form.municipality_id(), Some(12));

        form.municipalities_loaded(5, vec![municipality(12, "Bello")]);
        assert_eq!(form.municipality_id(), Some(12));

        let summary = AssignmentSummary { leader_id: Some(7), candidate_ids: vec![10, 11], ..Default::default() };
        assert_eq!(form.apply_assignment(42, &summary), Some(FormRequest::Candidates(7)));
        // Roster no longer lists 11; the saved assignment is still kept.
        form.candidates_loaded(7, vec![candidate(10, "Paz")]);

        let submission = form.submission().unwrap();
        assert_eq!(submission.voter_id, Some(42));
        assert_eq!(
            submission.assignment,
            Some(AssignmentRequest { candidate_ids: vec![10, 11], leader_id: 7 })
        );
    }

    #[test]
    fn test_stale_assignment_does_not_override_leader_change() {
        let (mut form, _) = VoterForm::edit(FormConfig::default(), &editable_voter());
        form.select_leader(Some(3));

        let summary = AssignmentSummary { leader_id: Some(7), candidate_ids: vec![10], ..Default::default() };
        assert_eq!(form.apply_assignment(42, &summary), None);
        assert_eq!(form.leader_id(), Some(3));
        assert!(form.candidate_ids().is_empty());
    }

    #[test]
    fn test_changing_leader_resets_candidates() {
        let mut form = filled_form();
        form.select_leader(Some(8));
        assert!(form.candidate_ids().is_empty());
    }

    #[test]
    fn test_single_assignment_mode() {
        let config = FormConfig { assignment: AssignmentMode::Single, ..FormConfig::default() };
        let mut form = VoterForm::new(config);
        form.toggle_candidate(10);
        form.toggle_candidate(11);
        assert_eq!(form.candidate_ids(), &[11]);
        form.toggle_candidate(11);
        assert!(form.candidate_ids().is_empty());
    }

    #[test]
    fn test_optional_requirements_are_configurable() {
        let config = FormConfig {
            required: vec![Field::FirstName, Field::Identification],
            assignment: AssignmentMode::Multi,
        };
        let mut form = VoterForm::new(config);
        form.set_text(Field::FirstName, "Ana");
        form.set_text(Field::Identification, "10");
        let submission = form.submission().unwrap();
        assert_eq!(submission.assignment, None);
    }
}
