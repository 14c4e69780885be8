use super::{ApiClient, ApiError, ApiRequest, Method, Transport};
use crate::backend::model::{Assignment, AssignmentRequest, Created, Page, Voter, VoterPayload};

impl<T: Transport> ApiClient<T> {
    pub async fn voters(&self, page: u32, limit: u32) -> Result<Page<Voter>, ApiError> {
        let request = ApiRequest::get("/voters").query("page", page).query("limit", limit);
        self.fetch(request, "Error al obtener votantes").await
    }

    pub async fn voter(&self, id: i64) -> Result<Voter, ApiError> {
        let path = format!("/voters/{}", id);
        self.fetch(ApiRequest::get(path), "Error al obtener votante").await
    }

    /// Returns the id the server assigned to the new voter.
    pub async fn create_voter(&self, voter: &VoterPayload) -> Result<i64, ApiError> {
        let request = ApiRequest::new(Method::Post, "/voters").json(voter)?;
        let created: Created = self.fetch(request, "Error al crear votante").await?;
        Ok(created.id)
    }

    pub async fn update_voter(&self, id: i64, voter: &VoterPayload) -> Result<(), ApiError> {
        let request = ApiRequest::new(Method::Patch, format!("/voters/{}", id)).json(voter)?;
        self.execute(request, "Error al actualizar votante").await
    }

    pub async fn delete_voter(&self, id: i64) -> Result<(), ApiError> {
        let request = ApiRequest::new(Method::Delete, format!("/voters/{}", id));
        self.execute(request, "Error al eliminar votante").await
    }

    pub async fn assignment(&self, voter_id: i64) -> Result<Vec<Assignment>, ApiError> {
        let path = format!("/voters/{}/assign-candidate", voter_id);
        self.fetch(ApiRequest::get(path), "Error al obtener la asignación").await
    }

    pub async fn assign(&self, voter_id: i64, assignment: &AssignmentRequest) -> Result<(), ApiError> {
        let path = format!("/voters/{}/assign-candidate", voter_id);
        let request = ApiRequest::new(Method::Post, path).json(assignment)?;
        self.execute(request, "Error al asignar candidato al votante").await
    }

    pub async fn update_assignment(&self, voter_id: i64, assignment: &AssignmentRequest) -> Result<(), ApiError> {
        let path = format!("/voters/{}/assign-candidate", voter_id);
        let request = ApiRequest::new(Method::Patch, path).json(assignment)?;
        self.execute(request, "Error al actualizar la asignación").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::api::testing::MockTransport;
    use serde_json::json;

    #[tokio::test]
    async fn test_voters_page_query() {
        let transport = MockTransport::new();
        transport.respond(
            Method::Get,
            "/voters",
            200,
            json!({"data": [{"id": 1, "firstName": "Ana", "lastName": "Rojas", "identification": "10"}],
                   "page": 2, "pages": 3, "total": 21}),
        );
        let client = ApiClient::new(transport.clone());

        let page = client.voters(2, 10).await.unwrap();
        assert_eq!(page.total, 21);
        assert_eq!(page.data[0].first_name, "Ana");
        assert_eq!(
            transport.requests()[0].query,
            vec![("page", "2".to_string()), ("limit", "10".to_string())]
        );
    }

    #[tokio::test]
    async fn test_voter_by_id() {
        let transport = MockTransport::new();
        transport.respond(
            Method::Get,
            "/voters/9",
            200,
            json!({"id": 9, "firstName": "Luis", "lastName": "Gil", "identification": "77", "votingBooth": "3"}),
        );
        let client = ApiClient::new(transport.clone());

        let voter = client.voter(9).await.unwrap();
        assert_eq!(voter.full_name(), "Luis Gil");
        assert_eq!(voter.voting_booth.as_deref(), Some("3"));

        transport.respond(Method::Get, "/voters/10", 404, json!({}));
        let err = client.voter(10).await.unwrap_err();
        assert_eq!(err.user_message(), "Error al obtener votante");
    }

    #[tokio::test]
    async fn test_create_voter_returns_new_id() {
        let transport = MockTransport::new();
        transport.respond(Method::Post, "/voters", 201, json!({"id": 77, "firstName": "Ana"}));
        let client = ApiClient::new(transport);

        let id = client.create_voter(&VoterPayload::default()).await.unwrap();
        assert_eq!(id, 77);
    }

    #[tokio::test]
    async fn test_assign_body_shape() {
        let transport = MockTransport::new();
        transport.respond(Method::Patch, "/voters/4/assign-candidate", 200, json!({}));
        let client = ApiClient::new(transport.clone());

        let body = AssignmentRequest { candidate_ids: vec![1, 2], leader_id: 5 };
        client.update_assignment(4, &body).await.unwrap();
        assert_eq!(
            transport.requests()[0].body,
            Some(json!({"candidate_ids": [1, 2], "leader_id": 5}))
        );
    }
}
