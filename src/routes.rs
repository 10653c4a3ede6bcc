use crate::{api::attendance, config::Config};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> anyhow::Result<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        (60_000 / requests_per_min as u64).max(1)
    };
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("invalid rate limit: {requests_per_min}/min"))?;
    Ok(Governor::new(&cfg))
}

/// Rate limiters, built once at startup and shared by every worker.
#[derive(Clone)]
pub struct Limiters {
    punch: Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>,
    biometric: Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>,
    protected: Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>,
}

impl Limiters {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            punch: Arc::new(build_limiter(config.rate_punch_per_min)?),
            biometric: Arc::new(build_limiter(config.rate_biometric_per_min)?),
            protected: Arc::new(build_limiter(config.rate_protected_per_min)?),
        })
    }
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiters: &Limiters) {
    cfg.service(
        web::scope(&config.api_prefix).service(
            web::scope("/attendance")
                // /attendance/punch/*
                .service(
                    web::scope("/punch")
                        .wrap(limiters.punch.clone())
                        .service(web::resource("/web").route(web::post().to(attendance::punch_web)))
                        .service(
                            web::resource("/mobile").route(web::post().to(attendance::punch_mobile)),
                        )
                        .service(
                            web::resource("/admin/{employee_id}")
                                .route(web::post().to(attendance::punch_admin)),
                        ),
                )
                // /attendance/biometric/push
                .service(
                    web::resource("/biometric/push")
                        .wrap(limiters.biometric.clone())
                        .route(web::post().to(attendance::biometric_push)),
                )
                .service(
                    web::resource("/process-logs")
                        .wrap(limiters.protected.clone())
                        .route(web::post().to(attendance::process_logs)),
                )
                .service(
                    web::resource("/break/toggle")
                        .wrap(limiters.protected.clone())
                        .route(web::post().to(attendance::toggle_break)),
                )
                .service(
                    web::resource("/today")
                        .wrap(limiters.protected.clone())
                        .route(web::get().to(attendance::today)),
                ),
        ),
    );
}
