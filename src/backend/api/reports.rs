use super::{ApiClient, ApiError, ApiRequest, Transport};
use crate::backend::model::Report;

pub const DEFAULT_REPORT_LIMIT: u32 = 50;

/// Active filters of the general report. Empty strings mean "no filter".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFilters {
    pub page: u32,
    pub limit: u32,
    pub gender: String,
    pub leader_id: String,
    pub corporation_id: String,
    pub candidate_id: String,
    pub department_id: String,
    pub municipality_id: String,
    pub voting_location: String,
}

impl Default for ReportFilters {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_REPORT_LIMIT,
            gender: String::new(),
            leader_id: String::new(),
            corporation_id: String::new(),
            candidate_id: String::new(),
            department_id: String::new(),
            municipality_id: String::new(),
            voting_location: String::new(),
        }
    }
}

impl ReportFilters {
    /// Query pairs in wire order. Pagination is always present, the rest only
    /// when set.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let page = if self.page == 0 { 1 } else { self.page };
        let limit = if self.limit == 0 { DEFAULT_REPORT_LIMIT } else { self.limit };
        let mut query = vec![("page", page.to_string()), ("limit", limit.to_string())];
        let optional = [
            ("gender", &self.gender),
            ("leaderId", &self.leader_id),
            ("corporationId", &self.corporation_id),
            ("candidateId", &self.candidate_id),
            ("departmentId", &self.department_id),
            ("municipalityId", &self.municipality_id),
            ("votingLocation", &self.voting_location),
        ];
        for (key, value) in optional {
            let value = value.trim();
            if !value.is_empty() {
                query.push((key, value.to_string()));
            }
        }
        query
    }
}

impl<T: Transport> ApiClient<T> {
    pub async fn voter_report(&self, filters: &ReportFilters) -> Result<Report, ApiError> {
        let mut request = ApiRequest::get("/voters/report/general");
        request.query = filters.to_query();
        self.fetch(request, "Error al obtener reporte de votantes").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::api::testing::MockTransport;
    use crate::backend::api::Method;
    use serde_json::json;

    #[test]
    fn test_default_query_only_paginates() {
        let query = ReportFilters::default().to_query();
        assert_eq!(query, vec![("page", "1".to_string()), ("limit", "50".to_string())]);
    }

    #[test]
    fn test_query_skips_blank_filters() {
        let filters = ReportFilters {
            gender: "F".into(),
            municipality_id: "12".into(),
            voting_location: "   ".into(),
            ..Default::default()
        };
        let keys: Vec<_> = filters.to_query().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["page", "limit", "gender", "municipalityId"]);
    }

    #[tokio::test]
    async fn test_report_decodes_aggregations() {
        let transport = MockTransport::new();
        transport.respond(
            Method::Get,
            "/voters/report/general",
            200,
            json!({
                "data": [],
                "aggregations": {
                    "byGender": [{"gender": "F", "count": 3}],
                    "byLeader": [{"id": 2, "name": "Marta", "count": 3}],
                    "byCandidate": [],
                    "byLocation": [{"departmentId": 5, "departmentName": "Antioquia",
                                    "municipalityId": 12, "municipalityName": "Bello", "count": 3}]
                }
            }),
        );
        let client = ApiClient::new(transport);

        let report = client.voter_report(&ReportFilters::default()).await.unwrap();
        let aggregations = report.aggregations.unwrap();
        assert_eq!(aggregations.by_gender[0].count, 3);
        assert_eq!(aggregations.by_location[0].municipality_name, "Bello");
    }
}
