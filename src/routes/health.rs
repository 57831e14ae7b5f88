use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

fn report(service: &'static str) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok",
        service,
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn chat_service() -> Json<HealthReport> {
    report("chat")
}

pub async fn task_service() -> Json<HealthReport> {
    report("task")
}
