//! HTTP handlers and route configuration.

mod admin;
mod auth;
mod blog;
mod feeds;
mod health;
mod sitemap;

#[cfg(test)]
mod tests;

use actix_web::web;

pub use blog::not_found;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(blog::index))
        .route("/health", web::get().to(health::health_check))
        .route("/sitemap.xml", web::get().to(sitemap::sitemap))
        .service(
            web::scope("/blog")
                .route("/", web::get().to(blog::post_list))
                .route("/feed/", web::get().to(feeds::latest_posts_feed))
                .route("/search/", web::get().to(blog::post_search))
                .route("/tag/{tag_slug}/", web::get().to(blog::post_list_by_tag))
                .route(
                    r"/{year:\d+}/{month:\d+}/{day:\d+}/{slug}/",
                    web::get().to(blog::post_detail),
                )
                .service(
                    web::resource("/{post_id}/share/")
                        .route(web::get().to(blog::post_share_form))
                        .route(web::post().to(blog::post_share)),
                )
                .service(
                    web::resource("/{post_id}/comment/")
                        .route(web::post().to(blog::post_comment))
                        .default_service(web::route().to(blog::method_not_allowed)),
                ),
        )
        .service(
            web::scope("/admin")
                .route("/auth/login", web::post().to(auth::login))
                .service(
                    web::resource("/posts")
                        .route(web::get().to(admin::list_posts))
                        .route(web::post().to(admin::create_post)),
                )
                .service(
                    web::resource("/posts/{id}")
                        .route(web::get().to(admin::get_post))
                        .route(web::put().to(admin::update_post))
                        .route(web::patch().to(admin::update_post))
                        .route(web::delete().to(admin::delete_post)),
                )
                .route("/posts/{id}/publish", web::post().to(admin::publish_post))
                .route("/comments", web::get().to(admin::list_comments))
                .service(
                    web::resource("/comments/{id}/visibility")
                        .route(web::put().to(admin::set_comment_visibility))
                        .route(web::patch().to(admin::set_comment_visibility)),
                ),
        );
}
