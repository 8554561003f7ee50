use actix_web::{
    web::{self, Json},
    HttpResponse,
};

use crate::{http::Error, services, types::form::users::register, App};

#[tracing::instrument(skip_all)]
pub async fn register(
    app: web::Data<App>,
    form: Json<register::Request>,
) -> Result<HttpResponse, Error> {
    let user = services::users::register(&app, form.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}
