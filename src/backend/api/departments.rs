use super::{ApiClient, ApiError, ApiRequest, Transport};
use crate::backend::model::{Department, Municipality};

impl<T: Transport> ApiClient<T> {
    pub async fn departments(&self) -> Result<Vec<Department>, ApiError> {
        self.fetch(ApiRequest::get("/departments"), "Error al obtener departamentos").await
    }

    pub async fn municipalities(&self, department_id: i64) -> Result<Vec<Municipality>, ApiError> {
        let path = format!("/municipalities/by-department/{}", department_id);
        self.fetch(ApiRequest::get(path), "Error al obtener municipios").await
    }
}
