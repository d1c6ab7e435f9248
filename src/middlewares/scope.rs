use crate::error::AppError;
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

/// Academy account scope threaded through every request. Stored in request
/// extensions by the middleware; handlers read it via `academy_id`. There is
/// no ambient current-user anywhere in the core.
#[derive(Debug, Clone)]
pub struct AcademyScope(pub String);

const SCOPE_HEADER: &str = "X-Academy-Id";

struct PublicPaths {
    exact_paths: Vec<&'static str>,
    prefix_paths: Vec<&'static str>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            exact_paths: vec!["/swagger-ui", "/swagger-ui/", "/api-docs/openapi.json"],
            prefix_paths: vec!["/swagger-ui/", "/api-docs/"],
        }
    }

    fn is_public_path(&self, path: &str) -> bool {
        if self.exact_paths.contains(&path) {
            return true;
        }
        self.prefix_paths
            .iter()
            .any(|&prefix| path.starts_with(prefix))
    }
}

pub struct AcademyScopeMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AcademyScopeMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AcademyScopeMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AcademyScopeMiddlewareService {
            service,
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct AcademyScopeMiddlewareService<S> {
    service: S,
    public_paths: PublicPaths,
}

impl<S, B> Service<ServiceRequest> for AcademyScopeMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // CORS preflights carry no custom headers.
        if req.method() == Method::OPTIONS {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        if self.public_paths.is_public_path(req.path()) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        // The query fallback exists for EventSource only; every other route
        // must send the header.
        let scope = header_scope(&req).or_else(|| {
            if req.path().ends_with("/events") {
                query_scope(&req)
            } else {
                None
            }
        });

        match scope {
            Some(academy) if !academy.is_empty() => {
                req.extensions_mut().insert(AcademyScope(academy));
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            _ => {
                let error =
                    AppError::ValidationError(format!("Missing {SCOPE_HEADER} header"));
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}

fn header_scope(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(SCOPE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
}

/// `EventSource` cannot set headers, so the SSE endpoint also accepts the
/// scope as `?academy=` in the query string.
fn query_scope(req: &ServiceRequest) -> Option<String> {
    req.query_string()
        .split('&')
        .find_map(|kv| kv.strip_prefix("academy="))
        .map(|v| v.to_string())
}
