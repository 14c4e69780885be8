use super::{ApiClient, ApiError, ApiRequest, Method, Transport};
use crate::backend::model::{Corporation, CorporationPayload};

impl<T: Transport> ApiClient<T> {
    pub async fn corporations(&self) -> Result<Vec<Corporation>, ApiError> {
        self.fetch(ApiRequest::get("/corporations"), "Error al obtener corporaciones").await
    }

    pub async fn corporation(&self, id: i64) -> Result<Corporation, ApiError> {
        let path = format!("/corporations/{}", id);
        self.fetch(ApiRequest::get(path), "Error al obtener corporación").await
    }

    pub async fn create_corporation(&self, corporation: &CorporationPayload) -> Result<Corporation, ApiError> {
        let request = ApiRequest::new(Method::Post, "/corporations").json(corporation)?;
        self.fetch(request, "Error al crear corporación").await
    }

    pub async fn update_corporation(&self, id: i64, corporation: &CorporationPayload) -> Result<Corporation, ApiError> {
        let request = ApiRequest::new(Method::Patch, format!("/corporations/{}", id)).json(corporation)?;
        self.fetch(request, "Error al actualizar corporación").await
    }

    pub async fn delete_corporation(&self, id: i64) -> Result<(), ApiError> {
        let request = ApiRequest::new(Method::Delete, format!("/corporations/{}", id));
        self.execute(request, "Error al eliminar corporación").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::api::testing::MockTransport;
    use serde_json::json;

    #[tokio::test]
    async fn test_corporation_by_id() {
        let transport = MockTransport::new();
        transport.respond(Method::Get, "/corporations/2", 200, json!({"id": 2, "name": "Senado"}));
        let client = ApiClient::new(transport);

        let corporation = client.corporation(2).await.unwrap();
        assert_eq!(corporation.name, "Senado");
    }

    #[tokio::test]
    async fn test_update_corporation_patches_by_id() {
        let transport = MockTransport::new();
        transport.respond(Method::Patch, "/corporations/2", 200, json!({"id": 2, "name": "Senado de la República"}));
        let client = ApiClient::new(transport.clone());

        let payload = CorporationPayload { name: "Senado de la República".into() };
        let updated = client.update_corporation(2, &payload).await.unwrap();
        assert_eq!(updated.name, "Senado de la República");
        assert_eq!(transport.requests()[0].body, Some(json!({"name": "Senado de la República"})));
    }

    #[tokio::test]
    async fn test_delete_corporation() {
        let transport = MockTransport::new();
        transport
            .respond(Method::Delete, "/corporations/2", 200, json!({}))
            .respond(Method::Delete, "/corporations/5", 409, json!({}));
        let client = ApiClient::new(transport.clone());

        client.delete_corporation(2).await.unwrap();
        let err = client.delete_corporation(5).await.unwrap_err();
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.user_message(), "Error al eliminar corporación");
        assert_eq!(
            transport.calls(),
            vec![(Method::Delete, "/corporations/2".to_string()), (Method::Delete, "/corporations/5".to_string())]
        );
    }

    #[tokio::test]
    async fn test_create_corporation() {
        let transport = MockTransport::new();
        transport.respond(Method::Post, "/corporations", 201, json!({"id": 8, "name": "Cámara"}));
        let client = ApiClient::new(transport.clone());

        let created = client
            .create_corporation(&CorporationPayload { name: "Cámara".into() })
            .await
            .unwrap();
        assert_eq!(created.id, 8);
        assert_eq!(transport.calls(), vec![(Method::Post, "/corporations".to_string())]);
    }
}
