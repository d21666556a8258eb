pub mod auth;
pub mod files;
pub mod health;
pub mod projects;
pub mod users;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .route("/token", web::post().to(auth::token))
        .service(web::scope("/auth").route("/register", web::post().to(auth::register)))
        .service(web::scope("/users").route("/me", web::get().to(users::me)))
        .service(
            web::scope("/projects")
                .route("", web::get().to(projects::list_projects))
                .route("", web::post().to(projects::create_project))
                .route("/{id}", web::delete().to(projects::delete_project))
                .route("/{id}/files", web::get().to(files::list_files))
                .route("/{id}/files", web::post().to(files::upload_files))
                .route("/{id}/files/{name}", web::get().to(files::download_file))
                .route("/{id}/files/{name}", web::delete().to(files::delete_file)),
        )
        .service(web::scope("/files").route("", web::post().to(files::upload_root)));
}
