use actix_web::{
    web::{self, Json},
    HttpResponse,
};

use crate::{http::Error, services, types::form::users::login, App};

#[tracing::instrument(skip_all)]
pub async fn login(app: web::Data<App>, form: Json<login::Request>) -> Result<HttpResponse, Error> {
    let response = services::users::login(&app, form.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}
