use super::{ApiClient, ApiError, ApiRequest, Method, Transport};
use crate::backend::model::{Candidate, CandidatePayload};

impl<T: Transport> ApiClient<T> {
    pub async fn candidates(&self) -> Result<Vec<Candidate>, ApiError> {
        self.fetch(ApiRequest::get("/candidates"), "Error al obtener candidatos").await
    }

    pub async fn candidate(&self, id: i64) -> Result<Candidate, ApiError> {
        let path = format!("/candidates/{}", id);
        self.fetch(ApiRequest::get(path), "Error al obtener candidato").await
    }

    pub async fn create_candidate(&self, candidate: &CandidatePayload) -> Result<Candidate, ApiError> {
        let request = ApiRequest::new(Method::Post, "/candidates").json(candidate)?;
        self.fetch(request, "Error al crear candidato").await
    }

    pub async fn update_candidate(&self, id: i64, candidate: &CandidatePayload) -> Result<Candidate, ApiError> {
        let request = ApiRequest::new(Method::Patch, format!("/candidates/{}", id)).json(candidate)?;
        self.fetch(request, "Error al actualizar candidato").await
    }

    pub async fn delete_candidate(&self, id: i64) -> Result<(), ApiError> {
        let request = ApiRequest::new(Method::Delete, format!("/candidates/{}", id));
        self.execute(request, "Error al eliminar candidato").await
    }
}
