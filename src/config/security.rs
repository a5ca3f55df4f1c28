use axum::http::{HeaderName, HeaderValue, Request, Response};
use std::{
    env,
    task::{Context, Poll},
};
use tower::{Layer, Service};

/// Security header names
const X_CONTENT_TYPE_OPTIONS: &str = "x-content-type-options";
const X_FRAME_OPTIONS: &str = "x-frame-options";
const STRICT_TRANSPORT_SECURITY: &str = "strict-transport-security";
const CONTENT_SECURITY_POLICY: &str = "content-security-policy";
const REFERRER_POLICY: &str = "referrer-policy";
const PERMISSIONS_POLICY: &str = "permissions-policy";

/// Security header values
const NOSNIFF: &str = "nosniff";
const DENY: &str = "DENY";
const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains";
const CSP_API_VALUE: &str = "default-src 'none'; frame-ancestors 'none'";
const REFERRER_POLICY_VALUE: &str = "strict-origin-when-cross-origin";
// The scanner page needs the camera; nothing else does.
const PERMISSIONS_POLICY_VALUE: &str = "geolocation=(), microphone=(), camera=(self)";

const STATIC_HEADERS: [(&str, &str); 5] = [
    (X_CONTENT_TYPE_OPTIONS, NOSNIFF),
    (X_FRAME_OPTIONS, DENY),
    (CONTENT_SECURITY_POLICY, CSP_API_VALUE),
    (REFERRER_POLICY, REFERRER_POLICY_VALUE),
    (PERMISSIONS_POLICY, PERMISSIONS_POLICY_VALUE),
];

#[derive(Clone)]
pub struct SecurityHeadersLayer {
    include_hsts: bool,
}

impl SecurityHeadersLayer {
    pub fn new(include_hsts: bool) -> Self {
        Self { include_hsts }
    }

    pub fn from_env() -> Self {
        let is_production = env::var("RUST_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        if is_production {
            tracing::info!("Security: HSTS header enabled (production mode)");
        } else {
            tracing::info!("Security: HSTS header disabled (development mode)");
        }

        Self::new(is_production)
    }
}

impl<S> Layer<S> for SecurityHeadersLayer {
    type Service = SecurityHeadersService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SecurityHeadersService {
            inner,
            include_hsts: self.include_hsts,
        }
    }
}

#[derive(Clone)]
pub struct SecurityHeadersService<S> {
    inner: S,
    include_hsts: bool,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for SecurityHeadersService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = SecurityHeadersFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        SecurityHeadersFuture {
            future: self.inner.call(request),
            include_hsts: self.include_hsts,
        }
    }
}

#[pin_project::pin_project]
pub struct SecurityHeadersFuture<F> {
    #[pin]
    future: F,
    include_hsts: bool,
}

impl<F, ResBody, E> std::future::Future for SecurityHeadersFuture<F>
where
    F: std::future::Future<Output = Result<Response<ResBody>, E>>,
{
    type Output = Result<Response<ResBody>, E>;

    fn poll(self: std::pin::Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let mut response = match this.future.poll(cx) {
            Poll::Ready(Ok(response)) => response,
            other => return other,
        };

        let headers = response.headers_mut();
        for (name, value) in STATIC_HEADERS {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }

        // Only add HSTS in production (HTTPS environments)
        if *this.include_hsts {
            headers.insert(
                HeaderName::from_static(STRICT_TRANSPORT_SECURITY),
                HeaderValue::from_static(HSTS_VALUE),
            );
        }

        Poll::Ready(Ok(response))
    }
}

pub fn create_security_headers_layer() -> SecurityHeadersLayer {
    SecurityHeadersLayer::from_env()
}
