use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::info;

use daybook::clock::{self, Clock};
use daybook::config::{SchedulerConfig, ServerConfig};
use daybook::engine::Engine;
use daybook::notify::NotifyHub;
use daybook::{seed, wire};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let server = ServerConfig::from_env()?;
    let config = SchedulerConfig::from_env()?;
    daybook::observability::init(server.metrics_port)?;

    let notify = Arc::new(NotifyHub::new());
    let engine = Arc::new(Engine::new(config, seed::demo_resources(), notify)?);
    if server.seed {
        let today = clock::local_now().date();
        let loaded = engine.load_appointments(seed::demo_appointments(today))?;
        info!("seeded {loaded} demo appointments for {today}");
    }

    let clock = Clock::spawn(Duration::from_secs(60));
    let max_connections = server.max_connections;
    let semaphore = Arc::new(Semaphore::new(max_connections));

    let addr = server.addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("daybook listening on {addr}");
    let window = engine.config.window;
    info!("  window: {:02}:00-{:02}:00", window.start_hour, window.end_hour);
    info!("  max_connections: {max_connections}");
    info!(
        "  metrics: {}",
        server
            .metrics_port
            .map_or("disabled".to_string(), |p| format!("http://0.0.0.0:{p}/metrics"))
    );

    // Graceful shutdown: stop accepting on SIGTERM/ctrl-c, drain in-flight connections
    let shutdown = async {
        let ctrl_c = tokio::signal::ctrl_c();
        #[cfg(unix)]
        {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => {}
                        _ = sigterm.recv() => {}
                    }
                }
                Err(e) => {
                    tracing::warn!("failed to register SIGTERM handler: {e}");
                    ctrl_c.await.ok();
                }
            }
        }
        #[cfg(not(unix))]
        {
            ctrl_c.await.ok();
        }
    };
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (socket, peer) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::error!("accept error: {e}");
                        continue;
                    }
                };

                let permit = match semaphore.clone().try_acquire_owned() {
                    Ok(permit) => permit,
                    Err(_) => {
                        tracing::warn!("connection limit reached, rejecting {peer}");
                        metrics::counter!(daybook::observability::CONNECTIONS_REJECTED_TOTAL)
                            .increment(1);
                        drop(socket);
                        continue;
                    }
                };

                info!("connection from {peer}");
                metrics::counter!(daybook::observability::CONNECTIONS_TOTAL).increment(1);
                metrics::gauge!(daybook::observability::CONNECTIONS_ACTIVE).increment(1.0);
                let engine = engine.clone();
                let now = clock.subscribe();

                tokio::spawn(async move {
                    let _permit = permit; // held until connection closes
                    if let Err(e) = wire::process_connection(socket, engine, now).await {
                        tracing::error!("connection error from {peer}: {e}");
                    }
                    info!("connection from {peer} closed");
                    metrics::gauge!(daybook::observability::CONNECTIONS_ACTIVE).decrement(1.0);
                });
            }
            _ = &mut shutdown => {
                info!("shutdown signal received, stopping accept loop");
                break;
            }
        }
    }

    // Wait for in-flight connections to finish (up to 10s)
    info!("draining connections...");
    let drain_deadline = tokio::time::sleep(Duration::from_secs(10));
    tokio::pin!(drain_deadline);

    loop {
        if semaphore.available_permits() == max_connections {
            info!("all connections drained");
            break;
        }
        tokio::select! {
            _ = &mut drain_deadline => {
                let remaining = max_connections - semaphore.available_permits();
                tracing::warn!("drain timeout, {remaining} connections still open");
                break;
            }
            _ = tokio::time::sleep(Duration::from_millis(100)) => {}
        }
    }

    info!("daybook stopped");
    Ok(())
}
