use actix_web::{web, HttpResponse};

use crate::{
    http::{Actor, Error},
    services, App,
};

#[tracing::instrument(skip_all, fields(actor.id = %actor.id))]
pub async fn delete(
    app: web::Data<App>,
    path: web::Path<String>,
    actor: Actor,
) -> Result<HttpResponse, Error> {
    services::users::delete(&app, &actor, &path).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[tracing::instrument(skip_all, fields(actor.id = %actor.id))]
pub async fn purge_test_users(app: web::Data<App>, actor: Actor) -> Result<HttpResponse, Error> {
    services::users::purge_test_users(&app).await?;
    Ok(HttpResponse::NoContent().finish())
}
