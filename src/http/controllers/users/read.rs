use actix_web::{web, HttpResponse};

use crate::{
    http::{Actor, Error},
    services, App,
};

#[tracing::instrument(skip_all, fields(actor.id = %actor.id))]
pub async fn profile(actor: Actor) -> HttpResponse {
    HttpResponse::Ok().json(services::users::profile(&actor))
}

#[tracing::instrument(skip_all, fields(actor.id = %actor.id))]
pub async fn list(app: web::Data<App>, actor: Actor) -> Result<HttpResponse, Error> {
    let users = services::users::list(&app).await?;
    Ok(HttpResponse::Ok().json(users))
}

#[tracing::instrument(skip_all, fields(actor.id = %actor.id))]
pub async fn get(
    app: web::Data<App>,
    path: web::Path<String>,
    actor: Actor,
) -> Result<HttpResponse, Error> {
    let user = services::users::get(&app, &path).await?;
    Ok(HttpResponse::Ok().json(user))
}
