//! Request guards
//!
//! A guard inspects a request before it reaches the handler and either lets
//! it through or rejects it with a reason. Guards are composed into a
//! [`GuardChain`] and evaluated in order; the first rejection wins.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::State,
    http::{header, Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::extract_api_key;
use crate::error::AppError;
use crate::DynUserService;

/// Header set by browsers' XMLHttpRequest/fetch wrappers
pub const REQUESTED_WITH: &str = "x-requested-with";

/// A failed guard check
#[derive(Debug)]
pub struct Rejection {
    pub guard: &'static str,
    pub reason: String,
    pub error: AppError,
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        tracing::debug!(guard = self.guard, reason = %self.reason, "Request rejected");
        let method_not_allowed = matches!(self.error, AppError::MethodNotAllowed);
        let mut response = self.error.into_response();
        if method_not_allowed {
            response
                .headers_mut()
                .insert(header::ALLOW, header::HeaderValue::from_static("POST"));
        }
        response
    }
}

#[async_trait]
pub trait Guard: Send + Sync {
    fn name(&self) -> &'static str;

    /// Check the request. Guards may attach data to the request extensions.
    async fn check(&self, request: &mut Request<Body>) -> Result<(), Rejection>;
}

/// Only accept requests issued from script (`X-Requested-With: XMLHttpRequest`)
pub struct ScriptOriginated;

#[async_trait]
impl Guard for ScriptOriginated {
    fn name(&self) -> &'static str {
        "script_originated"
    }

    async fn check(&self, request: &mut Request<Body>) -> Result<(), Rejection> {
        let is_script = request
            .headers()
            .get(REQUESTED_WITH)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
            .unwrap_or(false);

        if is_script {
            Ok(())
        } else {
            Err(Rejection {
                guard: self.name(),
                reason: "missing X-Requested-With header".to_string(),
                error: AppError::BadRequest("Request must be made from script".to_string()),
            })
        }
    }
}

/// Only accept POST
pub struct PostOnly;

#[async_trait]
impl Guard for PostOnly {
    fn name(&self) -> &'static str {
        "post_only"
    }

    async fn check(&self, request: &mut Request<Body>) -> Result<(), Rejection> {
        if request.method() == Method::POST {
            Ok(())
        } else {
            Err(Rejection {
                guard: self.name(),
                reason: format!("method {} not allowed", request.method()),
                error: AppError::MethodNotAllowed,
            })
        }
    }
}

/// Require a valid API key. On success the `User` is added to the request
/// extensions.
pub struct Authenticated {
    users: Arc<DynUserService>,
}

impl Authenticated {
    pub fn new(users: Arc<DynUserService>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl Guard for Authenticated {
    fn name(&self) -> &'static str {
        "authenticated"
    }

    async fn check(&self, request: &mut Request<Body>) -> Result<(), Rejection> {
        let reject = |reason: &str| Rejection {
            guard: "authenticated",
            reason: reason.to_string(),
            error: AppError::Unauthorized,
        };

        let api_key = extract_api_key(request)
            .ok_or_else(|| reject("missing bearer token"))?
            .to_string();

        let user = match self.users.authenticate(&api_key).await {
            Ok(Some(user)) => user,
            Ok(None) => return Err(reject("unknown or disabled API key")),
            Err(e) => {
                return Err(Rejection {
                    guard: self.name(),
                    reason: "user lookup failed".to_string(),
                    error: e,
                })
            }
        };

        request.extensions_mut().insert(user);
        Ok(())
    }
}

/// Ordered list of guards
#[derive(Clone, Default)]
pub struct GuardChain {
    guards: Vec<Arc<dyn Guard>>,
}

impl GuardChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, guard: impl Guard + 'static) -> Self {
        self.guards.push(Arc::new(guard));
        self
    }

    /// Run every guard in order, stopping at the first rejection
    pub async fn run(&self, request: &mut Request<Body>) -> Result<(), Rejection> {
        for guard in &self.guards {
            guard.check(request).await?;
        }
        Ok(())
    }
}

/// Guards for the follow toggle: script-originated, then POST, then
/// authenticated
pub fn follow_toggle_chain(users: Arc<DynUserService>) -> GuardChain {
    GuardChain::new()
        .with(ScriptOriginated)
        .with(PostOnly)
        .with(Authenticated::new(users))
}

/// Middleware running a guard chain in front of a route
pub async fn enforce(
    State(chain): State<GuardChain>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match chain.run(&mut request).await {
        Ok(()) => next.run(request).await,
        Err(rejection) => rejection.into_response(),
    }
}
