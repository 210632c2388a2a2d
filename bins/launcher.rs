use common::utils::logging::init_logging_stderr;
use dotenvy::dotenv;
use server::plugin::{self, PluginError};
use tracing::{error, info};
use uuid::Uuid;

fn init_logging() {
    dotenv().ok();
    // stdout is reserved for the handshake line
    init_logging_stderr();
    info!(service = "item-plugin", event = "logger_init", "tracing subscriber initialized");
}

fn main() -> std::process::ExitCode {
    init_logging();

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "item-plugin",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let cfg = match server::startup::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "item-plugin", event = "config_invalid", error = %e, "failed to load configuration");
            return std::process::ExitCode::FAILURE;
        }
    };

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = cfg.server.worker_threads {
        builder.worker_threads(w);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "item-plugin", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(service = "item-plugin", event = "start", %service_id, pid, version, "item plugin starting");

    let result = rt.block_on(async {
        let app = server::startup::build_app(&cfg).await?;
        plugin::serve(app, &cfg.plugin).await?;
        anyhow::Ok(())
    });

    match result {
        Ok(()) => {
            info!(service = "item-plugin", event = "stop", %service_id, pid, "item plugin stopped");
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            if let Some(PluginError::NotLaunchedByHost { .. }) = e.downcast_ref::<PluginError>() {
                eprintln!(
                    "This binary is a plugin. It is not meant to be executed directly; \
                     run the host application that loads it instead."
                );
            }
            error!(service = "item-plugin", event = "run_failed", error = %e, "plugin serving failed");
            std::process::ExitCode::FAILURE
        }
    }
}
