use actix_web::{
    web::{self, Json},
    HttpResponse,
};

use crate::{
    http::{Actor, Error},
    services,
    types::form::users::update,
    App,
};

#[tracing::instrument(skip_all, fields(actor.id = %actor.id))]
pub async fn update(
    app: web::Data<App>,
    path: web::Path<String>,
    actor: Actor,
    form: Json<update::Request>,
) -> Result<HttpResponse, Error> {
    let user = services::users::update(&app, &actor, &path, form.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}
