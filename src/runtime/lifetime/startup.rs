use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::api::jwt::JwtService;
use crate::api::services::{AppServices, AppStartTime};
use crate::config::AppConfig;
use crate::services::{
    AuthService, DisabledQrPublisher, IdentityProvider, ImageHostPublisher, LinkService,
    OAuthProvider, QrPublisher, RandomCodeGenerator, StatsService,
};
use crate::storage::{Repositories, StorageFactory};

/// Wires services over the given repositories.
///
/// `provider` and `publisher` are injected so tests can swap the external
/// collaborators.
pub fn build_app_services(
    config: &AppConfig,
    repos: &Repositories,
    provider: Arc<dyn IdentityProvider>,
    publisher: Arc<dyn QrPublisher>,
) -> AppServices {
    let jwt = Arc::new(JwtService::from_config(&config.auth));
    let generator = Arc::new(RandomCodeGenerator::new(config.links.code_length));

    let links = Arc::new(LinkService::new(
        repos.links.clone(),
        repos.users.clone(),
        generator,
        publisher,
        config.public_base_url(),
        config.links.max_code_attempts,
    ));
    let stats = Arc::new(StatsService::new(repos.links.clone()));
    let auth = Arc::new(AuthService::new(
        provider,
        repos.users.clone(),
        jwt.clone(),
        &config.auth.frontend_redirect_url,
    ));

    AppServices {
        links,
        stats,
        auth,
        jwt,
        start_time: AppStartTime {
            start_datetime: Utc::now(),
            storage_backend: repos.backend_name.clone(),
        },
        secure_cookies: config.server.base_url.starts_with("https://"),
    }
}

/// 准备服务器启动：存储、外部服务、业务服务
pub async fn prepare_server_startup(config: &AppConfig) -> Result<AppServices> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|e| anyhow::anyhow!("Failed to install rustls crypto provider: {:?}", e))?;

    let repos = StorageFactory::create(&config.database)
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", repos.backend_name);

    let publisher: Arc<dyn QrPublisher> = if config.image_host.enabled {
        info!("QR assets will be uploaded to {}", config.image_host.upload_url);
        Arc::new(ImageHostPublisher::new(&config.image_host))
    } else {
        warn!("image_host.enabled = false, links are created without QR assets");
        Arc::new(DisabledQrPublisher)
    };

    if config.oauth.client_id.is_empty() {
        warn!("oauth.client_id is empty, sign-in via {} will fail", config.oauth.provider_name);
    }
    let provider: Arc<dyn IdentityProvider> = Arc::new(OAuthProvider::new(&config.oauth));

    let services = build_app_services(config, &repos, provider, publisher);

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );
    Ok(services)
}
