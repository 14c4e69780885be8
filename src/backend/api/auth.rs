use super::{ApiClient, ApiError, ApiRequest, Method, Transport};
use crate::backend::model::{LoginRequest, LoginResponse};

impl<T: Transport> ApiClient<T> {
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest { email: email.to_string(), password: password.to_string() };
        let request = ApiRequest::new(Method::Post, "/auth/login").json(&body)?;
        self.fetch(request, "Error en login").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::api::testing::MockTransport;
    use serde_json::json;

    #[tokio::test]
    async fn test_login_posts_credentials() {
        let transport = MockTransport::new();
        transport.respond(
            Method::Post,
            "/auth/login",
            200,
            json!({"id": 1, "access_token": "tok", "refresh_token": "ref", "email": "a@b.co", "message": "ok"}),
        );
        let client = ApiClient::new(transport.clone());

        let response = client.login("a@b.co", "secret").await.unwrap();
        assert_eq!(response.access_token, "tok");
        assert_eq!(
            transport.requests()[0].body,
            Some(json!({"email": "a@b.co", "password": "secret"}))
        );
    }
}
