use std::future::{ready, Ready};

use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;

use crate::errors::ApiError;
use crate::models::Role;

/// Identity the middleware resolves from a bearer token. Handlers that need
/// an authenticated caller take this as an extractor and get a 401 when the
/// request carried no valid token.
#[derive(Debug, Clone)]
pub struct UserAuthData {
    pub user_id: uuid::Uuid,
    pub email: String,
    pub role: Role,
}

impl FromRequest for UserAuthData {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<UserAuthData>()
                .cloned()
                .ok_or(ApiError::Unauthorized),
        )
    }
}

pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Attach an identity when the request carries a valid bearer token.
        // A missing, stale, or garbled token never blocks the request here:
        // public routes stay reachable, and protected handlers reject the
        // anonymous request through the UserAuthData extractor.
        let claims = jwt::parse_request(&req, "Bearer ").and_then(|token| {
            jwt::decode_claims(&jwt::TokenType::Access, &token).map_err(|_| ApiError::Unauthorized)
        });
        if let Ok(token_data) = claims {
            let claims = token_data.claims;
            req.extensions_mut().insert(UserAuthData {
                user_id: claims.user_id,
                email: claims.email,
                role: claims.role,
            });
        }
        let fut = self.service.call(req);
        Box::pin(async move { fut.await })
    }
}

pub mod jwt {
    use std::env::{self, VarError};

    use actix_web::dev::ServiceRequest;
    use chrono::Utc;
    use jsonwebtoken::{
        decode, encode, errors::Error, Algorithm, DecodingKey, EncodingKey, Header, TokenData,
        Validation,
    };
    use uuid::Uuid;

    use crate::dto::Claims;
    use crate::errors::ApiError;
    use crate::models::Role;

    pub enum TokenType {
        Access,
        Refresh,
    }

    pub fn get_secret(token_type: &TokenType) -> Result<String, VarError> {
        let env_key = match token_type {
            TokenType::Access => "JWT_ACCESS_SECRET",
            TokenType::Refresh => "JWT_REFRESH_SECRET",
        };
        env::var(env_key)
    }

    pub fn create(
        token_type: &TokenType,
        user_id: &Uuid,
        email: &str,
        role: Role,
        exp_secs: i64,
    ) -> Result<String, Error> {
        // Presence is checked at boot by Config::from_env.
        let secret = get_secret(token_type).expect("JWT secret must be set");
        let claims = Claims::new(user_id, email, role, Utc::now().timestamp() + exp_secs);
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
    }

    pub fn decode_claims(token_type: &TokenType, token: &str) -> Result<TokenData<Claims>, Error> {
        let secret = get_secret(token_type).expect("JWT secret must be set");
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &DecodingKey::from_secret(secret.as_ref()), &validation)
    }

    pub fn parse_request(req: &ServiceRequest, prefix: &str) -> Result<String, ApiError> {
        if let Some(auth_header) = req.headers().get("Authorization") {
            if let Ok(auth_value) = auth_header.to_str() {
                if let Some(token) = auth_value.strip_prefix(prefix) {
                    return Ok(token.trim().to_string());
                }
            }
        }
        Err(ApiError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpResponse};
    use uuid::Uuid;

    fn set_test_secrets() {
        std::env::set_var("JWT_ACCESS_SECRET", "access-secret-for-tests");
        std::env::set_var("JWT_REFRESH_SECRET", "refresh-secret-for-tests");
    }

    #[::core::prelude::v1::test]
    fn access_token_round_trips_its_claims() {
        set_test_secrets();
        let user_id = Uuid::new_v4();
        let token = jwt::create(
            &jwt::TokenType::Access,
            &user_id,
            "alice@example.com",
            Role::Organizer,
            3600,
        )
        .unwrap();
        let decoded = jwt::decode_claims(&jwt::TokenType::Access, &token).unwrap();
        assert_eq!(decoded.claims.user_id, user_id);
        assert_eq!(decoded.claims.email, "alice@example.com");
        assert_eq!(decoded.claims.role, Role::Organizer);
    }

    #[::core::prelude::v1::test]
    fn expired_tokens_are_rejected() {
        set_test_secrets();
        let token = jwt::create(
            &jwt::TokenType::Access,
            &Uuid::new_v4(),
            "alice@example.com",
            Role::Attendee,
            -120,
        )
        .unwrap();
        assert!(jwt::decode_claims(&jwt::TokenType::Access, &token).is_err());
    }

    #[::core::prelude::v1::test]
    fn refresh_tokens_do_not_pass_as_access_tokens() {
        set_test_secrets();
        let token = jwt::create(
            &jwt::TokenType::Refresh,
            &Uuid::new_v4(),
            "alice@example.com",
            Role::Attendee,
            3600,
        )
        .unwrap();
        assert!(jwt::decode_claims(&jwt::TokenType::Access, &token).is_err());
    }

    async fn whoami(user: UserAuthData) -> HttpResponse {
        HttpResponse::Ok().json(user.email)
    }

    async fn browse() -> HttpResponse {
        HttpResponse::Ok().json("events")
    }

    macro_rules! test_app {
        () => {
            test::init_service(
                App::new()
                    .wrap(AuthMiddleware)
                    .route("/whoami", web::get().to(whoami))
                    .route("/browse", web::get().to(browse)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn middleware_attaches_identity_from_bearer_token() {
        set_test_secrets();
        let token = jwt::create(
            &jwt::TokenType::Access,
            &Uuid::new_v4(),
            "alice@example.com",
            Role::Attendee,
            3600,
        )
        .unwrap();
        let app = test_app!();

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert!(res.status().is_success());
        let body: String = test::read_body_json(res).await;
        assert_eq!(body, "alice@example.com");
    }

    #[actix_web::test]
    async fn invalid_token_cannot_authenticate_a_protected_route() {
        set_test_secrets();
        let app = test_app!();

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", "Bearer not-a-jwt"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn stale_token_does_not_block_public_routes() {
        set_test_secrets();
        let expired = jwt::create(
            &jwt::TokenType::Access,
            &Uuid::new_v4(),
            "alice@example.com",
            Role::Attendee,
            -120,
        )
        .unwrap();
        let app = test_app!();

        // A browser still holding an expired token can keep browsing events.
        let req = test::TestRequest::get()
            .uri("/browse")
            .insert_header(("Authorization", format!("Bearer {expired}")))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert!(res.status().is_success());

        // Same for a token that does not decode at all.
        let req = test::TestRequest::get()
            .uri("/browse")
            .insert_header(("Authorization", "Bearer not-a-jwt"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert!(res.status().is_success());
    }

    #[actix_web::test]
    async fn missing_token_fails_the_extractor_with_401() {
        set_test_secrets();
        let app = test_app!();

        let req = test::TestRequest::get().uri("/whoami").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }
}
