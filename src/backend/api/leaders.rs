use super::{ApiClient, ApiError, ApiRequest, Transport};
use crate::backend::model::{Candidate, Leader};

impl<T: Transport> ApiClient<T> {
    pub async fn leaders(&self) -> Result<Vec<Leader>, ApiError> {
        self.fetch(ApiRequest::get("/leaders"), "Error al obtener líderes").await
    }

    pub async fn candidates_by_leader(&self, leader_id: i64) -> Result<Vec<Candidate>, ApiError> {
        let path = format!("/leaders/{}/candidates", leader_id);
        self.fetch(ApiRequest::get(path), "Error al obtener candidatos").await
    }
}
