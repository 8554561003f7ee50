use actix_web::web;

pub mod general;
pub mod users;

/// Registers every route. `/users/login` and `/users/me` come before
/// `/users/{id}` so they are never taken as ids.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(general::index))
        .service(
            web::scope("/users")
                .route("/login", web::post().to(users::login))
                .route("/me", web::get().to(users::profile))
                .service(
                    web::resource("")
                        .route(web::get().to(users::list))
                        .route(web::post().to(users::register)),
                )
                .service(
                    web::resource("/{id}")
                        .route(web::get().to(users::get))
                        .route(web::put().to(users::update))
                        .route(web::delete().to(users::delete)),
                ),
        )
        .route("/testusers", web::delete().to(users::purge_test_users));
}
