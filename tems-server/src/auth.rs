/**
 * ACCÈS - Basic Auth optionnelle sur l'API de lecture et le dashboard
 *
 * Si `basic.user` et `basic.pass` sont vides, le middleware laisse tout passer.
 * Sinon le couple présenté doit correspondre exactement, sinon 401 avec
 * challenge `WWW-Authenticate` pour que le navigateur redemande.
 * Aucune session : réévalué à chaque requête.
 */

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::headers::{authorization::Basic, Authorization, HeaderMapExt};
use tracing::debug;

use crate::http::AppState;

pub const REALM_CHALLENGE: &str = r#"Basic realm="TEMS""#;

pub async fn require_basic_auth(State(app): State<AppState>, req: Request, next: Next) -> Response {
    let creds = &app.cfg.basic;
    if creds.is_open() {
        return next.run(req).await;
    }

    let ok = req
        .headers()
        .typed_get::<Authorization<Basic>>()
        .map(|auth| auth.username() == creds.user && auth.password() == creds.pass)
        .unwrap_or(false);

    if !ok {
        debug!(path = %req.uri().path(), "rejected request without valid credentials");
        return unauthorized();
    }
    next.run(req).await
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, REALM_CHALLENGE)],
        "Unauthorized",
    )
        .into_response()
}
