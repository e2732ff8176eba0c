use std::collections::HashMap;

use axum::{
    RequestExt,
    extract::{Path, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};

use crate::{
    error::{AppError, AppResult},
    middleware::auth::ensure_self,
    models::Role,
    state::AppState,
};

/// Access rule attached to the handlers of a path when they are registered.
///
/// Guards wrap individual methods, so a method that is not registered on a path
/// still answers 405 instead of running the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    Public,
    /// Any valid bearer token.
    Authenticated,
    /// Valid token whose email equals the `{email}` path parameter.
    SelfOnly,
    /// Valid token whose persisted role is admin.
    Admin,
}

#[derive(Clone)]
struct Guard {
    state: AppState,
    policy: AccessPolicy,
}

impl AccessPolicy {
    pub fn protect(
        self,
        routes: MethodRouter<AppState>,
        state: &AppState,
    ) -> MethodRouter<AppState> {
        if self == AccessPolicy::Public {
            return routes;
        }
        let guard = Guard {
            state: state.clone(),
            policy: self,
        };
        routes.route_layer(middleware::from_fn_with_state(guard, enforce))
    }
}

async fn enforce(
    State(guard): State<Guard>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let user = guard.state.tokens.authenticate(request.headers())?;

    match guard.policy {
        AccessPolicy::Public | AccessPolicy::Authenticated => {}
        AccessPolicy::SelfOnly => {
            let Path(params) = request
                .extract_parts::<Path<HashMap<String, String>>>()
                .await
                .map_err(|_| AppError::AccessDenied)?;
            let email = params.get("email").ok_or(AppError::AccessDenied)?;
            ensure_self(&user, email)?;
        }
        AccessPolicy::Admin => guard.state.authorizer.require_role(&user, Role::Admin).await?,
    }

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
