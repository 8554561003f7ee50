use actix_web::HttpResponse;
use serde_json::json;

pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "Hello from doggo!",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
