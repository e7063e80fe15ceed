use std::{
    future::{Ready, ready},
    rc::Rc,
};

use actix_web::{
    Error, HttpResponse, Result,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;

/// Middleware guarding the admin scope with a shared token supplied in the
/// `x-admin-token` header. End-user auth lives with the hosted platform;
/// this only fences the operational surface.
pub struct AdminAuth {
    token: Option<String>,
}

impl AdminAuth {
    /// Reads `ADMIN_API_TOKEN`; admin routes stay disabled when it is unset.
    pub fn from_env() -> Self {
        Self {
            token: std::env::var("ADMIN_API_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
        }
    }

    /// Builds the guard around a fixed token (tests, embedded setups).
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AdminAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AdminAuthService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminAuthService {
            service: Rc::new(service),
            token: self.token.clone(),
        }))
    }
}

/// Service that implements the admin token check
pub struct AdminAuthService<S> {
    service: Rc<S>,
    token: Option<String>,
}

impl<S, B> Service<ServiceRequest> for AdminAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let expected = self.token.clone();

        Box::pin(async move {
            let Some(expected) = expected else {
                let response = HttpResponse::ServiceUnavailable().json(serde_json::json!({
                    "error": "admin_disabled",
                    "message": "ADMIN_API_TOKEN is not configured"
                }));
                return Ok(req.into_response(response).map_into_right_body());
            };

            let provided = req
                .headers()
                .get("x-admin-token")
                .and_then(|header| header.to_str().ok());

            match provided {
                None => {
                    let response = HttpResponse::Unauthorized().json(serde_json::json!({
                        "error": "missing_token",
                        "message": "Admin token is required"
                    }));
                    Ok(req.into_response(response).map_into_right_body())
                }
                Some(token) if token != expected => {
                    let response = HttpResponse::Unauthorized().json(serde_json::json!({
                        "error": "invalid_token",
                        "message": "Admin token is not valid"
                    }));
                    Ok(req.into_response(response).map_into_right_body())
                }
                Some(_) => {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{App, HttpResponse, test, web};

    use super::*;

    fn ping() -> actix_web::Route {
        web::get().to(|| async { HttpResponse::Ok().body("pong") })
    }

    #[actix_web::test]
    async fn valid_token_passes_through() {
        let app = test::init_service(
            App::new().wrap(AdminAuth::with_token("secret")).route("/ping", ping()),
        )
        .await;

        let request = test::TestRequest::get()
            .uri("/ping")
            .insert_header(("x-admin-token", "secret"))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert!(response.status().is_success());
    }

    #[actix_web::test]
    async fn missing_or_wrong_token_is_unauthorized() {
        let app = test::init_service(
            App::new().wrap(AdminAuth::with_token("secret")).route("/ping", ping()),
        )
        .await;

        let missing = test::TestRequest::get().uri("/ping").to_request();
        let response = test::call_service(&app, missing).await;
        assert_eq!(response.status(), 401);

        let wrong = test::TestRequest::get()
            .uri("/ping")
            .insert_header(("x-admin-token", "nope"))
            .to_request();
        let response = test::call_service(&app, wrong).await;
        assert_eq!(response.status(), 401);
    }

    #[actix_web::test]
    async fn unconfigured_guard_disables_the_scope() {
        let guard = AdminAuth { token: None };
        let app = test::init_service(App::new().wrap(guard).route("/ping", ping())).await;

        let request = test::TestRequest::get()
            .uri("/ping")
            .insert_header(("x-admin-token", "anything"))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), 503);
    }
}
