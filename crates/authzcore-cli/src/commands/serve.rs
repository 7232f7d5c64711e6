use authzcore_gateway::GatewayServerBuilder;
use tracing::info;

pub async fn run(host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let server = GatewayServerBuilder::new().host(host).port(port).build();

    info!("press ctrl-c to stop");
    server
        .run_with_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
}
