use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use env_logger::Env;
use serde::Deserialize;

use adoption_feed::{
    feed::AnimalFeed,
    graph::{AlbumCredentials, GraphPhotoSource},
    router::app_router,
    state::AppState,
};

#[derive(Deserialize, Debug)]
struct EnvVars {
    #[serde(default = "default_listen_addr")]
    host: Ipv4Addr,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default)]
    facebook_album_id: Option<String>,
    #[serde(default)]
    facebook_access_token: Option<String>,
    #[serde(default = "default_graph_api_base")]
    graph_api_base: String,
    #[serde(default = "default_graph_api_version")]
    graph_api_version: String,
    #[serde(default = "default_photo_limit")]
    photo_limit: u32,
    #[serde(default = "default_cache_ttl_secs")]
    cache_ttl_secs: u64,
    #[serde(default = "default_upstream_timeout_secs")]
    upstream_timeout_secs: u64,
}

fn default_listen_addr() -> Ipv4Addr {
    Ipv4Addr::LOCALHOST
}

fn default_port() -> u16 {
    8000
}

fn default_graph_api_base() -> String {
    String::from("https://graph.facebook.com")
}

fn default_graph_api_version() -> String {
    String::from("v25.0")
}

fn default_photo_limit() -> u32 {
    100
}

fn default_cache_ttl_secs() -> u64 {
    10 * 60
}

fn default_upstream_timeout_secs() -> u64 {
    30
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let env: EnvVars = envy::from_env().context("failed to read environment")?;
    log::info!(
        "Environment: host={} port={} graph={}/{} limit={} ttl={}s",
        &env.host,
        &env.port,
        &env.graph_api_base,
        &env.graph_api_version,
        &env.photo_limit,
        &env.cache_ttl_secs
    );

    let credentials =
        AlbumCredentials::from_parts(env.facebook_album_id, env.facebook_access_token);
    if credentials.is_none() {
        log::warn!("FACEBOOK_ALBUM_ID or FACEBOOK_ACCESS_TOKEN not set, /api/dogs will answer 500");
    }

    let source = GraphPhotoSource::new(
        env.graph_api_base,
        env.graph_api_version,
        env.photo_limit,
        Duration::from_secs(env.upstream_timeout_secs),
    )
    .context("failed to build album client")?;

    let feed = AnimalFeed::new(
        Arc::new(source),
        credentials,
        Duration::from_secs(env.cache_ttl_secs),
    );

    let app = app_router().with_state(AppState::new(feed));

    let listen_addr = SocketAddr::from((env.host, env.port));
    log::info!("Listening on {}", &listen_addr);
    axum::Server::bind(&listen_addr)
        .serve(app.into_make_service())
        .await
        .context("failed to start axum server")?;

    Ok(())
}
