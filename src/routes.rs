use crate::{
    api::{leave_balance, leave_request, leave_type},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

// Helper to build per-scope limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);

    // both inputs are clamped to >= 1, so `finish` always yields a config
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));
    let admin_limiter = Arc::new(build_limiter(config.rate_admin_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // static paths before /leave/{id}
                    .service(web::resource("/mine").route(web::get().to(leave_request::my_leaves)))
                    .service(
                        web::resource("/pending/manager")
                            .route(web::get().to(leave_request::pending_for_manager)),
                    )
                    .service(
                        web::resource("/pending/hr")
                            .route(web::get().to(leave_request::pending_for_hr)),
                    )
                    // /leave/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(leave_request::get_leave))
                            .route(web::put().to(leave_request::update_leave))
                            .route(web::delete().to(leave_request::delete_leave)),
                    )
                    .service(
                        web::resource("/{id}/manager/approve")
                            .route(web::put().to(leave_request::manager_approve_leave)),
                    )
                    .service(
                        web::resource("/{id}/manager/reject")
                            .route(web::put().to(leave_request::manager_reject_leave)),
                    )
                    .service(
                        web::resource("/{id}/hr/approve")
                            .route(web::put().to(leave_request::hr_approve_leave)),
                    )
                    .service(
                        web::resource("/{id}/hr/reject")
                            .route(web::put().to(leave_request::hr_reject_leave)),
                    )
                    .service(
                        web::resource("/{id}/cancel")
                            .route(web::put().to(leave_request::cancel_leave)),
                    ),
            )
            .service(
                web::scope("/balances")
                    .wrap(admin_limiter.clone())
                    // /balances
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_balance::list_balances))
                            .route(web::post().to(leave_balance::create_balance)),
                    )
                    .service(web::resource("/mine").route(web::get().to(leave_balance::my_balances)))
                    .service(
                        web::resource("/initialize/{user_id}")
                            .route(web::post().to(leave_balance::initialize_user_balances)),
                    )
                    // /balances/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(leave_balance::get_balance))
                            .route(web::delete().to(leave_balance::delete_balance)),
                    )
                    .service(
                        web::resource("/{id}/adjust")
                            .route(web::post().to(leave_balance::adjust_balance)),
                    )
                    .service(
                        web::resource("/{id}/history")
                            .route(web::get().to(leave_balance::balance_history)),
                    ),
            )
            .service(
                web::scope("/leave-types")
                    .wrap(admin_limiter)
                    // /leave-types
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_type::list_leave_types))
                            .route(web::post().to(leave_type::create_leave_type)),
                    )
                    // /leave-types/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(leave_type::get_leave_type))
                            .route(web::put().to(leave_type::update_leave_type))
                            .route(web::delete().to(leave_type::delete_leave_type)),
                    )
                    .service(
                        web::resource("/{id}/toggle")
                            .route(web::put().to(leave_type::toggle_leave_type)),
                    ),
            ),
    );
}
