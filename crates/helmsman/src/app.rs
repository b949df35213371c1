use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use helmsman_auth::require_auth;
use helmsman_core::journal::{Account, Snapshot, Strategy, Tag, Trade, TradeTag, User};

use crate::{
    handlers::{
        accounts::create_account,
        collections::{list_trade_tags, list_user_tags},
        health::{codes, health, ping},
        resource::{keyed_routes, routes},
        users::{
            delete_by_ids, get_by_condition, list_by_ids, list_by_last_id, login, register,
        },
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState, request_timeout: Duration) -> Router {
    // CORS configuration for API endpoints
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let authenticated = |router: Router<AppState>| {
        router.route_layer(from_fn_with_state(state.auth.clone(), require_auth))
    };

    let users = Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .merge(authenticated(
            routes::<User>()
                .route("/condition", post(get_by_condition))
                .route("/delete/ids", post(delete_by_ids))
                .route("/list/ids", post(list_by_ids))
                .route("/list", get(list_by_last_id)),
        ));

    let api_routes = Router::new()
        .nest("/users", users)
        .nest(
            "/accounts",
            authenticated(
                Router::new()
                    .route("/", post(create_account))
                    .merge(keyed_routes::<Account>()),
            ),
        )
        .nest("/trades", authenticated(routes::<Trade>()))
        .nest(
            "/tags",
            authenticated(routes::<Tag>().route("/list/all", get(list_user_tags))),
        )
        .nest("/strategies", routes::<Strategy>())
        .nest("/snapshots", routes::<Snapshot>())
        .nest(
            "/tradeTags",
            routes::<TradeTag>().route("/all", post(list_trade_tags)),
        )
        .layer(cors);

    // Main application router
    Router::new()
        .route("/health", get(health))
        .route("/ping", get(ping))
        .route("/codes", get(codes))
        .nest("/api/v1", api_routes)
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");
                tracing::debug_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id,
                )
            }),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::test_state;
    use axum::http::header::AUTHORIZATION;
    use helmsman_auth::issue_token;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const TIMEOUT: Duration = Duration::from_secs(10);

    struct TestApp {
        router: Router,
        state: AppState,
    }

    impl TestApp {
        async fn new() -> Self {
            let state = test_state(true).await;
            Self {
                router: create_app(state.clone(), TIMEOUT),
                state,
            }
        }

        fn token(&self, uid: u64) -> String {
            issue_token(&self.state.auth, uid).unwrap()
        }

        async fn send(
            &self,
            method: &str,
            uri: &str,
            body: Option<Value>,
            token: Option<&str>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
            }
            let request = match body {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, json)
        }
    }

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::new().await;
        let (status, json) = app.send("GET", "/health", None, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "UP");
        assert!(json["hostname"].is_string());
    }

    #[tokio::test]
    async fn test_ping_and_codes() {
        let app = TestApp::new().await;

        let (_, json) = app.send("GET", "/ping", None, None).await;
        assert_eq!(json, json!({"code": 0, "msg": "ok", "data": {}}));

        let (_, json) = app.send("GET", "/codes", None, None).await;
        let codes = json["data"].as_array().unwrap();
        assert!(codes.iter().any(|c| c["code"] == 208001));
        assert!(codes.iter().any(|c| c["code"] == 207811));
    }

    #[tokio::test]
    async fn test_request_id_is_returned() {
        let app = TestApp::new().await;
        let response = app
            .router
            .clone()
            .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_trade_crud_round_trip() {
        let app = TestApp::new().await;
        let token = app.token(1);
        let token = Some(token.as_str());

        let (status, json) = app
            .send(
                "POST",
                "/api/v1/trades",
                Some(json!({"accountID": 1, "symbol": "ES", "direction": "long", "pnl": 125.5})),
                token,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["code"], 0);
        let id = json["data"]["id"].as_u64().unwrap();
        assert_eq!(id, 1);

        let (_, json) = app.send("GET", "/api/v1/trades/1", None, token).await;
        assert_eq!(json["data"]["trades"]["symbol"], "ES");
        assert_eq!(json["data"]["trades"]["pnl"], 125.5);

        let (_, json) = app
            .send(
                "PUT",
                "/api/v1/trades/1",
                Some(json!({"exitReason": "target"})),
                token,
            )
            .await;
        assert_eq!(json["code"], 0);

        let (_, json) = app.send("GET", "/api/v1/trades/1", None, token).await;
        assert_eq!(json["data"]["trades"]["exitReason"], "target");
        assert_eq!(json["data"]["trades"]["symbol"], "ES");

        let (_, json) = app
            .send("POST", "/api/v1/trades/list", Some(json!({})), token)
            .await;
        assert_eq!(json["data"]["total"], 1);
        assert_eq!(json["data"]["tradess"].as_array().unwrap().len(), 1);

        let (_, json) = app.send("DELETE", "/api/v1/trades/1", None, token).await;
        assert_eq!(json["code"], 0);

        let (status, json) = app.send("GET", "/api/v1/trades/1", None, token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["code"], 100004);
    }

    #[tokio::test]
    async fn test_account_is_owned_by_caller() {
        let app = TestApp::new().await;
        let token = app.token(42);
        let token = Some(token.as_str());

        let (_, json) = app
            .send(
                "POST",
                "/api/v1/accounts",
                Some(json!({"name": "main", "userID": 7, "currency": "USD"})),
                token,
            )
            .await;
        assert_eq!(json["code"], 0);
        let id = json["data"]["id"].as_u64().unwrap();

        let (_, json) = app
            .send("GET", &format!("/api/v1/accounts/{id}"), None, token)
            .await;
        assert_eq!(json["data"]["accounts"]["userID"], 42);
        assert_eq!(json["data"]["accounts"]["name"], "main");

        let (status, json) = app
            .send("POST", "/api/v1/accounts", Some(json!({"name": "alt"})), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["code"], 100002);
    }

    #[tokio::test]
    async fn test_separator_only_sort_lists_newest_first() {
        let app = TestApp::new().await;
        for name in ["ORB", "VWAP fade"] {
            app.send("POST", "/api/v1/strategies", Some(json!({"name": name})), None)
                .await;
        }

        let (status, json) = app
            .send("POST", "/api/v1/strategies/list", Some(json!({"sort": ","})), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["code"], 0);
        assert_eq!(json["data"]["total"], 2);
        assert_eq!(json["data"]["strategiess"][0]["name"], "VWAP fade");
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let app = TestApp::new().await;

        for uri in ["/api/v1/trades/1", "/api/v1/accounts/1", "/api/v1/tags/1", "/api/v1/users/1"] {
            let (status, json) = app.send("GET", uri, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(json["code"], 100002);
        }
    }

    #[tokio::test]
    async fn test_public_routes_skip_auth() {
        let app = TestApp::new().await;

        let (status, json) = app
            .send(
                "POST",
                "/api/v1/strategies",
                Some(json!({"name": "ORB", "description": "Opening range breakout"})),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["id"], 1);

        let (_, json) = app
            .send("POST", "/api/v1/tradeTags", Some(json!({"tradeID": 7, "tagID": 2})), None)
            .await;
        assert_eq!(json["data"]["tradeID"], 7);

        let (_, json) = app
            .send(
                "POST",
                "/api/v1/tradeTags/all",
                Some(json!({"columns": [{"name": "tag_id", "value": 2}]})),
                None,
            )
            .await;
        assert_eq!(json["data"]["tradeTags"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_input_is_invalid_params() {
        let app = TestApp::new().await;

        let (status, json) = app.send("GET", "/api/v1/strategies/0", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["code"], 100001);

        let (_, json) = app.send("GET", "/api/v1/strategies/abc", None, None).await;
        assert_eq!(json["code"], 100001);

        let (_, json) = app
            .send("GET", "/api/v1/strategies/9223372036854775808", None, None)
            .await;
        assert_eq!(json["code"], 100001);

        let (_, json) = app
            .send("POST", "/api/v1/strategies/list", Some(json!({"sort": "-nope"})), None)
            .await;
        assert_eq!(json["code"], 100001);

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/snapshots")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["code"], 100001);
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let app = TestApp::new().await;
        let credentials = json!({"username": "ana", "password": "hunter22"});

        let (_, json) = app
            .send("POST", "/api/v1/users/register", Some(credentials.clone()), None)
            .await;
        assert_eq!(json["code"], 0);
        let id = json["data"]["id"].as_u64().unwrap();

        let (_, json) = app
            .send("POST", "/api/v1/users/register", Some(credentials.clone()), None)
            .await;
        assert_eq!(json["code"], 207811);

        let (_, json) = app
            .send("POST", "/api/v1/users/login", Some(credentials), None)
            .await;
        assert_eq!(json["code"], 0);
        assert_eq!(json["data"]["id"], id);
        assert_eq!(json["data"]["username"], "ana");
        let token = json["data"]["token"].as_str().unwrap().to_string();

        // The issued token opens protected routes
        let (status, json) = app
            .send("GET", &format!("/api/v1/users/{id}"), None, Some(&token))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["users"]["username"], "ana");
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let app = TestApp::new().await;
        app.send(
            "POST",
            "/api/v1/users/register",
            Some(json!({"username": "ben", "password": "right"})),
            None,
        )
        .await;

        let (_, json) = app
            .send(
                "POST",
                "/api/v1/users/login",
                Some(json!({"username": "ben", "password": "wrong"})),
                None,
            )
            .await;
        assert_eq!(json["code"], 207810);

        let (_, json) = app
            .send(
                "POST",
                "/api/v1/users/login",
                Some(json!({"username": "nobody", "password": "x"})),
                None,
            )
            .await;
        assert_eq!(json["code"], 207810);
    }

    #[tokio::test]
    async fn test_user_batch_routes() {
        let app = TestApp::new().await;
        for name in ["u1", "u2", "u3"] {
            app.send(
                "POST",
                "/api/v1/users/register",
                Some(json!({"username": name, "password": "pw"})),
                None,
            )
            .await;
        }
        let token = app.token(1);
        let token = Some(token.as_str());

        let (_, json) = app
            .send("POST", "/api/v1/users/list/ids", Some(json!({"ids": [3, 99, 1]})), token)
            .await;
        let users = json["data"]["users"].as_array().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0]["username"], "u3");
        assert_eq!(users[1]["username"], "u1");

        let (_, json) = app
            .send("GET", "/api/v1/users/list?lastID=3&limit=10", None, token)
            .await;
        let users = json["data"]["users"].as_array().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0]["id"], 2);

        let (_, json) = app
            .send(
                "POST",
                "/api/v1/users/condition",
                Some(json!({"columns": [{"name": "username", "value": "u2"}]})),
                token,
            )
            .await;
        assert_eq!(json["data"]["users"]["id"], 2);

        let (_, json) = app
            .send("POST", "/api/v1/users/delete/ids", Some(json!({"ids": [1, 2]})), token)
            .await;
        assert_eq!(json["code"], 0);

        let (_, json) = app.send("GET", "/api/v1/users/2", None, token).await;
        assert_eq!(json["code"], 100004);
    }

    #[tokio::test]
    async fn test_tags_list_all_is_scoped_to_caller() {
        let app = TestApp::new().await;
        let mine = app.token(5);
        let theirs = app.token(6);

        for (owner, name) in [(5, "fomo"), (6, "tilt"), (5, "patience")] {
            app.send(
                "POST",
                "/api/v1/tags",
                Some(json!({"userID": owner, "name": name})),
                Some(&mine),
            )
            .await;
        }

        let (_, json) = app.send("GET", "/api/v1/tags/list/all", None, Some(&mine)).await;
        let tags = json["data"]["tags"].as_array().unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0]["name"], "patience");

        let (_, json) = app.send("GET", "/api/v1/tags/list/all", None, Some(&theirs)).await;
        assert_eq!(json["data"]["tags"].as_array().unwrap().len(), 1);
    }
}
