//! Per-client API rate limiting middleware.

use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{HeaderName, HeaderValue},
};
use haven_core::domain::{RateLimitPolicy, ThrottleScope};
use haven_core::ports::RateLimiter;
use haven_shared::ErrorResponse;
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::sync::Arc;

const REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Rate limiting middleware factory.
///
/// Every request is counted against the API scope, keyed by client IP.
#[derive(Clone)]
pub struct ApiRateLimit {
    limiter: Arc<dyn RateLimiter>,
    policy: RateLimitPolicy,
}

impl ApiRateLimit {
    pub fn new(limiter: Arc<dyn RateLimiter>, policy: RateLimitPolicy) -> Self {
        Self { limiter, policy }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiRateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = ApiRateLimitService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiRateLimitService {
            service,
            limiter: self.limiter.clone(),
            policy: self.policy,
        }))
    }
}

pub struct ApiRateLimitService<S> {
    service: S,
    limiter: Arc<dyn RateLimiter>,
    policy: RateLimitPolicy,
}

impl<S, B> Service<ServiceRequest> for ApiRateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let client = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();
        let key = ThrottleScope::Api.key(&client);

        let result = self.limiter.attempt(&key, &self.policy);

        if !result.allowed {
            tracing::warn!(key = %key, retry_after = result.reset_after_secs, "API rate limit exceeded");

            let error = ErrorResponse::too_many_requests(format!(
                "Rate limit exceeded. Try again in {} seconds.",
                result.reset_after_secs
            ));

            let response = HttpResponse::TooManyRequests()
                .insert_header((REMAINING_HEADER, "0"))
                .insert_header(("Retry-After", result.reset_after_secs.to_string()))
                .json(error);

            let (http_req, _payload) = req.into_parts();
            let srv_response = ServiceResponse::new(http_req, response);

            return Box::pin(async move { Ok(srv_response.map_into_right_body()) });
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let mut res = fut.await?;
            res.headers_mut().insert(
                HeaderName::from_static(REMAINING_HEADER),
                HeaderValue::from(result.remaining),
            );
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test, web};
    use haven_core::ports::ManualClock;
    use haven_infra::InMemoryRateLimiter;
    use std::time::Duration;

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    #[actix_web::test]
    async fn test_rejects_after_policy_ceiling() {
        let clock = Arc::new(ManualClock::new());
        let limiter: Arc<dyn RateLimiter> = Arc::new(InMemoryRateLimiter::with_clock(clock.clone()));
        let policy = RateLimitPolicy::new(2, Duration::from_secs(60));

        let app = test::init_service(
            App::new()
                .wrap(ApiRateLimit::new(limiter.clone(), policy))
                .route("/ping", web::get().to(ok)),
        )
        .await;

        let request = || {
            test::TestRequest::get()
                .uri("/ping")
                .insert_header(("X-Forwarded-For", "203.0.113.9"))
                .to_request()
        };

        let res = test::call_service(&app, request()).await;
        assert!(res.status().is_success());
        assert_eq!(res.headers().get("x-ratelimit-remaining").unwrap(), "1");

        let res = test::call_service(&app, request()).await;
        assert_eq!(res.headers().get("x-ratelimit-remaining").unwrap(), "0");

        let res = test::call_service(&app, request()).await;
        assert_eq!(res.status(), 429);
        assert_eq!(res.headers().get("retry-after").unwrap(), "120");
        assert_eq!(limiter.remaining("api:203.0.113.9", &policy), 0);

        clock.advance(Duration::from_secs(121));
        let res = test::call_service(&app, request()).await;
        assert!(res.status().is_success());
    }

    #[actix_web::test]
    async fn test_clients_are_counted_separately() {
        let limiter: Arc<dyn RateLimiter> = Arc::new(InMemoryRateLimiter::new());
        let policy = RateLimitPolicy::new(1, Duration::from_secs(60));

        let app = test::init_service(
            App::new()
                .wrap(ApiRateLimit::new(limiter, policy))
                .route("/ping", web::get().to(ok)),
        )
        .await;

        for ip in ["198.51.100.1", "198.51.100.2"] {
            let req = test::TestRequest::get()
                .uri("/ping")
                .insert_header(("X-Forwarded-For", ip))
                .to_request();
            let res = test::call_service(&app, req).await;
            assert!(res.status().is_success());
        }
    }
}
