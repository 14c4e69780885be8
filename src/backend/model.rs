use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NamedRef {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Voter {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub identification: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub blood_type: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub department_id: Option<i64>,
    #[serde(default)]
    pub municipality_id: Option<i64>,
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub voting_location: Option<String>,
    #[serde(default)]
    pub voting_booth: Option<String>,
    #[serde(default)]
    pub political_status: Option<String>,

    // Populated by the report endpoint only
    #[serde(default)]
    pub department: Option<NamedRef>,
    #[serde(default)]
    pub municipality: Option<NamedRef>,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub leaders: Vec<Leader>,
}

impl Voter {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Body of `POST /voters` and `PATCH /voters/:id`. Empty optional fields are
/// left out of the JSON entirely.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VoterPayload {
    pub first_name: String,
    pub last_name: String,
    pub identification: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub department_id: i64,
    pub municipality_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    pub voting_location: String,
    pub voting_booth: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub political_status: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Created {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Leader {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub municipality: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Corporation {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Candidate {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub party: Option<String>,
    #[serde(default)]
    pub corporation: Option<Corporation>,
}

impl Candidate {
    pub fn corporation_name(&self) -> &str {
        self.corporation.as_ref().map(|c| c.name.as_str()).unwrap_or("")
    }
}

/// Write body for candidates; the corporation is referenced by id.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party: Option<String>,
    pub corporation_id: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct CorporationPayload {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Department {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Municipality {
    pub id: i64,
    pub name: String,
}

/// `POST|PATCH /voters/:id/assign-candidate`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssignmentRequest {
    pub candidate_ids: Vec<i64>,
    pub leader_id: i64,
}

/// One element of `GET /voters/:id/assign-candidate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Assignment {
    #[serde(default, alias = "leaderId")]
    pub leader_id: Option<i64>,
    #[serde(default, alias = "candidateId")]
    pub candidate_id: Option<i64>,
    #[serde(default)]
    pub leader: Option<Leader>,
    #[serde(default)]
    pub candidate: Option<Candidate>,
}

/// Flattened view over a voter's assignment records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssignmentSummary {
    pub leader_id: Option<i64>,
    pub candidate_ids: Vec<i64>,
    /// Names carried by records that nest the candidate object.
    pub candidate_names: HashMap<i64, String>,
}

impl AssignmentSummary {
    pub fn from_records(records: &[Assignment]) -> Self {
        let mut summary = Self::default();
        for record in records {
            let leader = record.leader_id.or(record.leader.as_ref().map(|l| l.id));
            if summary.leader_id.is_none() {
                summary.leader_id = leader;
            }
            let candidate = record.candidate_id.or(record.candidate.as_ref().map(|c| c.id));
            if let Some(id) = candidate {
                if !summary.candidate_ids.contains(&id) {
                    summary.candidate_ids.push(id);
                    if let Some(c) = &record.candidate {
                        summary.candidate_names.insert(id, c.name.clone());
                    }
                }
            }
        }
        summary
    }

    /// True when some assigned candidate came back as a bare id.
    pub fn has_unnamed(&self) -> bool {
        self.candidate_ids.iter().any(|id| !self.candidate_names.contains_key(id))
    }

    /// One label per assigned candidate: the nested name, else the name in
    /// `known`, else `#<id>`.
    pub fn candidate_labels(&self, known: &[Candidate]) -> Vec<String> {
        self.candidate_ids
            .iter()
            .map(|id| {
                self.candidate_names
                    .get(id)
                    .cloned()
                    .or_else(|| known.iter().find(|c| c.id == *id).map(|c| c.name.clone()))
                    .unwrap_or_else(|| format!("#{id}"))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub pages: u32,
    pub total: u64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self { data: Vec::new(), page: 1, pages: 0, total: 0 }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoginResponse {
    #[serde(default)]
    pub id: Option<i64>,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GenderBucket {
    #[serde(default)]
    pub gender: Option<String>,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LeaderBucket {
    pub id: i64,
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CandidateBucket {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub corporation_name: Option<String>,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LocationBucket {
    pub department_id: i64,
    #[serde(default)]
    pub department_name: String,
    pub municipality_id: i64,
    #[serde(default)]
    pub municipality_name: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Aggregations {
    #[serde(default)]
    pub by_gender: Vec<GenderBucket>,
    #[serde(default)]
    pub by_leader: Vec<LeaderBucket>,
    #[serde(default)]
    pub by_candidate: Vec<CandidateBucket>,
    #[serde(default)]
    pub by_location: Vec<LocationBucket>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Report {
    #[serde(default)]
    pub data: Vec<Voter>,
    #[serde(default)]
    pub aggregations: Option<Aggregations>,
}
