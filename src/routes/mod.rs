use axum::http::HeaderValue;
use axum::{
    middleware,
    routing::{delete, get, patch, post, put, MethodRouter},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::{
    access::{
        capability::{BanUser, ChangeRole, DeleteChat, EditChat, SendMessage, ViewMessages},
        Capability, RequirePermission,
    },
    state::{ChatState, TaskState},
};

pub mod chats;
pub mod health;
pub mod messages;
pub mod roles;
pub mod tasks;

fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let allow_origin = match allowed_origin {
        Some(origins) => {
            let headers: Vec<HeaderValue> = origins
                .split(',')
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .filter_map(|value| match value.parse::<HeaderValue>() {
                    Ok(header) => Some(header),
                    Err(_) => {
                        warn!(origin = value, "ignoring invalid CORS allowed origin");
                        None
                    }
                })
                .collect();
            AllowOrigin::list(headers)
        }
        None => AllowOrigin::mirror_request(),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Puts `route` behind the permission gate for `C`.
fn gated<C: Capability>(
    route: MethodRouter<ChatState>,
    state: &ChatState,
) -> MethodRouter<ChatState> {
    route.route_layer(middleware::from_extractor_with_state::<
        RequirePermission<C>,
        _,
    >(state.clone()))
}

pub fn chat_router(state: ChatState) -> Router<()> {
    let cors = cors_layer(state.config.cors_allowed_origin.as_deref());

    let chat_routes = Router::new()
        .route("/", post(chats::create_chat))
        .route("/user/:user_id", get(chats::user_chats))
        .route(
            "/:chat_id",
            get(chats::get_chat)
                .merge(gated::<EditChat>(put(chats::update_chat), &state))
                .merge(gated::<DeleteChat>(delete(chats::delete_chat), &state)),
        )
        .route(
            "/:chat_id/roles/change",
            gated::<ChangeRole>(patch(chats::change_role), &state),
        )
        .route(
            "/:chat_id/ban/:user_id",
            gated::<BanUser>(post(chats::ban_user), &state),
        )
        .route("/:chat_id/user-roles/:user_id", get(chats::user_role))
        .route("/:chat_id/me/role", get(chats::my_role))
        .route("/:chat_id/members", get(chats::members))
        .route(
            "/messages/:chat_id",
            gated::<SendMessage>(post(messages::send_message), &state).merge(
                gated::<ViewMessages>(get(messages::chat_messages), &state),
            ),
        )
        .route(
            "/search/:chat_id",
            gated::<ViewMessages>(get(messages::search_messages), &state),
        );

    let role_routes = Router::new()
        .route("/", get(roles::list_roles).post(roles::create_role))
        .route("/:role_id", get(roles::get_role).delete(roles::delete_role))
        .route("/:role_id/permissions", patch(roles::set_role_permissions));

    let permission_routes = Router::new()
        .route(
            "/",
            get(roles::list_permissions).post(roles::create_permission),
        )
        .route("/:permission_id", delete(roles::delete_permission));

    Router::new()
        .nest("/api/v1/chats", chat_routes)
        .nest("/api/v1/chat-roles", role_routes)
        .nest("/api/v1/chat-permissions", permission_routes)
        .route("/api/health", get(health::chat_service))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub fn task_router(state: TaskState) -> Router<()> {
    let cors = cors_layer(state.config.cors_allowed_origin.as_deref());

    let api_routes = Router::new()
        .route("/tasks", post(tasks::create_task))
        .route(
            "/tasks/statuses",
            get(tasks::list_statuses).post(tasks::create_status),
        )
        .route(
            "/tasks/statuses/:status_id",
            get(tasks::get_status).delete(tasks::delete_status),
        )
        .route("/tasks/:task_id", get(tasks::get_task))
        .route(
            "/tasks/:task_id/status/:status_id",
            patch(tasks::update_status),
        )
        .route("/users/:user_id/tasks", get(tasks::user_tasks));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/api/health", get(health::task_service))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
