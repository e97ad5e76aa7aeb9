use anyhow::Result;
use axum::{routing::get, Router};
use kcc_core::culture_client::{CultureClient, URL};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod route;

pub fn app(client: CultureClient) -> Router {
    Router::new()
        .route("/calendar", get(route::calendar::handler))
        .route("/events", get(route::events::handler))
        .layer(TraceLayer::new_for_http())
        .with_state(client)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let config = config::Config::from_env()?;
    let client = CultureClient::with_options(config.service_key, URL, config.timeout)?;
    info!(addr = %config.bind_addr, "listening");
    axum::Server::bind(&config.bind_addr)
        .serve(app(client).into_make_service())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::{http::header::CONTENT_TYPE, routing::get, Router};
    use kcc_core::culture_client::{CultureClient, TIMEOUT};

    pub static LISTING: &str = r#"<response>
        <header><resultCode>00</resultCode><resultMsg>NORMAL SERVICE.</resultMsg></header>
        <body>
            <items>
                <item>
                    <seq>312345</seq><title>2025 서울음악축제</title>
                    <startDate>20250610</startDate><endDate>20250612</endDate>
                    <place>세종문화회관 대극장</place><realmName>음악</realmName><area>서울</area>
                </item>
                <item>
                    <seq>312388</seq><title>햄릿</title>
                    <startDate>20250601</startDate><endDate>20250630</endDate>
                    <place>대학로 예술극장</place><realmName>연극</realmName><area>서울</area>
                </item>
            </items>
            <numOfRows>50</numOfRows><pageNo>1</pageNo><totalCount>2</totalCount>
        </body>
    </response>"#;

    pub static RESULT_CODE_ERROR: &str = r#"<response>
        <header><resultCode>99</resultCode><resultMsg>SERVICE ERROR</resultMsg></header>
    </response>"#;

    /// A client talking to a local upstream which always answers with `body`.
    pub async fn upstream_client(body: &'static str) -> CultureClient {
        let upstream = Router::new().route(
            "/",
            get(move || async move { ([(CONTENT_TYPE, "application/xml")], body) }),
        );
        let server = axum::Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0)))
            .serve(upstream.into_make_service());
        let url = format!("http://{}/", server.local_addr());
        tokio::spawn(server);
        CultureClient::with_options("test-key", url, TIMEOUT).unwrap()
    }
}
