use std::{sync::Arc, time::Instant};

use axum::{
    Router,
    extract::{Request, State},
    http::HeaderValue,
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tracing::Instrument;

use crate::{
    ServerError, admin, auth, bookings, contracts, disputes, expenses, funds, groups, payments,
    reports, token::TokenKeys, usage, users, vehicles, votes,
};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub tokens: Arc<TokenKeys>,
}

/// Resolves the bearer token into the calling [`engine::User`].
///
/// The user is stored in the request extensions, handlers read it back with
/// `Extension<engine::User>`. Only the protected router is layered with this
/// guard: public routes (login, register) never look at the credential, and
/// a protected route answers 401 when no valid user could be resolved.
async fn require_user(
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(TypedHeader(Authorization(bearer))) = auth_header else {
        return Err(ServerError::Unauthorized("missing bearer token".to_string()));
    };

    let claims = state
        .tokens
        .verify(bearer.token(), chrono::Utc::now())
        .map_err(|err| {
            tracing::debug!("rejected token: {err:?}");
            ServerError::Unauthorized("invalid or expired token".to_string())
        })?;

    let user = state
        .engine
        .user_by_email(&claims.sub)
        .await
        .map_err(|err| match err {
            engine::EngineError::KeyNotFound(_) => {
                ServerError::Unauthorized("invalid or expired token".to_string())
            }
            other => ServerError::Engine(other),
        })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// One span and one log line per request, tagged with a fresh request id.
async fn log_request(request: Request, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let span = tracing::info_span!(
        "http.request",
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    let started = Instant::now();
    let mut response = next.run(request).instrument(span.clone()).await;
    span.in_scope(|| {
        tracing::info!(
            status = response.status().as_u16(),
            latency_ms = started.elapsed().as_millis() as u64,
            "{method} {path}"
        );
    });

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

pub fn router(state: ServerState) -> Router {
    let public = Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/users/register", post(users::register));

    let protected = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/users/{id}", get(users::get))
        // groups
        .route("/api/groups", post(groups::create).get(groups::list))
        .route("/api/groups/{id}", get(groups::get).delete(groups::delete))
        .route(
            "/api/groups/{id}/members",
            get(groups::list_members).post(groups::add_member),
        )
        .route(
            "/api/groups/{id}/members/{user_id}",
            put(groups::update_member).delete(groups::remove_member),
        )
        .route("/api/groups/{id}/owner", put(groups::transfer_owner))
        .route("/api/groups/{id}/vehicles", get(vehicles::list_for_group))
        .route("/api/groups/{id}/priority", get(bookings::priority))
        .route("/api/groups/{id}/expenses", get(expenses::list_for_group))
        .route("/api/groups/{id}/funds", get(funds::list_for_group))
        .route("/api/groups/{id}/votes", get(votes::list_for_group))
        .route("/api/groups/{id}/disputes", get(disputes::list_for_group))
        .route("/api/groups/{id}/contracts", get(contracts::list_for_group))
        // vehicles
        .route("/api/vehicles", post(vehicles::create))
        .route(
            "/api/vehicles/{id}",
            get(vehicles::get).delete(vehicles::delete),
        )
        .route("/api/vehicles/{id}/bookings", get(bookings::list_for_vehicle))
        // bookings
        .route("/api/bookings", post(bookings::create).get(bookings::mine))
        .route("/api/bookings/{id}", get(bookings::get))
        .route("/api/bookings/{id}/cancel", put(bookings::cancel))
        .route("/api/bookings/{id}/status", put(bookings::update_status))
        // expenses
        .route("/api/expenses", post(expenses::create))
        .route(
            "/api/expenses/{id}",
            get(expenses::get).delete(expenses::delete),
        )
        .route("/api/expenses/{id}/approve", put(expenses::approve))
        .route("/api/expenses/{id}/reject", put(expenses::reject))
        .route("/api/expenses/{id}/shares", get(expenses::shares))
        .route("/api/expense-shares/mine", get(expenses::my_shares))
        // payments
        .route("/api/payments", post(payments::pay).get(payments::mine))
        .route("/api/payments/{id}", get(payments::get))
        .route("/api/payments/{id}/status", put(payments::update_status))
        .route(
            "/api/payments/expense-share/{id}",
            get(payments::list_for_share),
        )
        // funds
        .route("/api/funds", post(funds::create))
        .route("/api/funds/{id}", get(funds::get))
        .route("/api/funds/{id}/deposit", post(funds::deposit))
        .route("/api/funds/{id}/withdraw", post(funds::withdraw))
        .route("/api/funds/{id}/transactions", get(funds::transactions))
        // votes
        .route("/api/votes", post(votes::create))
        .route("/api/votes/{id}", get(votes::get).delete(votes::delete))
        .route("/api/votes/{id}/cast", post(votes::cast))
        .route("/api/votes/{id}/close", put(votes::close))
        // disputes
        .route("/api/disputes", post(disputes::open).get(disputes::list))
        .route("/api/disputes/open", get(disputes::list_open))
        .route("/api/disputes/{id}", get(disputes::get))
        .route("/api/disputes/{id}/review", put(disputes::review))
        .route("/api/disputes/{id}/resolve", put(disputes::resolve))
        .route("/api/disputes/{id}/close", put(disputes::close))
        // contracts
        .route("/api/contracts", post(contracts::create))
        .route("/api/contracts/{id}", get(contracts::get))
        .route("/api/contracts/{id}/sign", put(contracts::sign))
        // usage history
        .route("/api/usage-history/check-in", post(usage::check_in))
        .route("/api/usage-history/mine", get(usage::mine))
        .route("/api/usage-history/{id}", get(usage::get))
        .route("/api/usage-history/{id}/check-out", post(usage::check_out))
        .route("/api/usage-history/user/{id}", get(usage::list_for_user))
        .route("/api/usage-history/vehicle/{id}", get(usage::list_for_vehicle))
        // reports
        .route("/api/reports/group/{id}", get(reports::group_financial))
        .route("/api/reports/user/{id}", get(reports::user_expenses))
        .route(
            "/api/reports/usage-vs-ownership/{id}",
            get(reports::usage_vs_ownership),
        )
        // admin
        .route("/api/admin/users", get(admin::users))
        .route("/api/admin/groups", get(admin::groups))
        .route("/api/admin/vehicles", get(admin::vehicles))
        .route("/api/admin/bookings", get(admin::bookings))
        .route("/api/admin/expenses", get(admin::expenses))
        .route("/api/admin/payments", get(admin::payments))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_user));

    public
        .merge(protected)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

pub async fn run(engine: Engine, tokens: TokenKeys, addr: &str) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    run_with_listener(engine, tokens, listener).await
}

pub async fn run_with_listener(
    engine: Engine,
    tokens: TokenKeys,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        tokens: Arc::new(tokens),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    tokens: TokenKeys,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, tokens, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
