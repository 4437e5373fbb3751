use dotenvy::dotenv;
use tracing::{error, info, warn};
use uuid::Uuid;

fn init_logging() {
    // 提前加载 .env，使得 RUST_LOG / LOG_FORMAT / CONFIG_PATH 等环境变量生效
    dotenv().ok();
    common::utils::logging::init_logging_from_env();
    info!(service = "customer_api", event = "logger_init", "tracing subscriber initialized");
}

/// Resolves on Ctrl+C; axum then stops accepting and drains in-flight requests.
async fn shutdown_signal(service_id: Uuid) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!(service = "customer_api", event = "shutdown_signal", %service_id, "received Ctrl+C, draining"),
        Err(e) => {
            // 无法监听信号时不退出，服务继续运行
            warn!(service = "customer_api", event = "signal_unavailable", error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}

fn main() -> std::process::ExitCode {
    init_logging();

    let service_id = Uuid::new_v4();
    let pid = std::process::id();

    std::panic::set_hook(Box::new(move |info| {
        error!(service = "customer_api", event = "panic", %service_id, pid, message = %info, "unhandled panic occurred");
    }));

    // 配置只加载一次：config.toml 存在则必须合法，缺失时回退到环境变量
    let cfg = match configs::AppConfig::load_or_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "customer_api", event = "config_invalid", error = %format!("{e:#}"), "configuration rejected");
            return std::process::ExitCode::FAILURE;
        }
    };

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = cfg.server.worker_threads { builder.worker_threads(w); }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "customer_api", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "customer_api",
        event = "start",
        %service_id,
        pid,
        version = env!("CARGO_PKG_VERSION"),
        threads = cfg.server.worker_threads.unwrap_or_default(),
        seed = cfg.store.seed_sample_data,
        "customer api starting"
    );

    match rt.block_on(server::run_with_config(cfg, shutdown_signal(service_id))) {
        Ok(()) => {
            info!(service = "customer_api", event = "stop", %service_id, pid, "server stopped normally");
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "customer_api", event = "run_failed", %service_id, error = %e, "server returned error");
            std::process::ExitCode::FAILURE
        }
    }
}
