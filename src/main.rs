use std::process::ExitCode;
use std::sync::Arc;

use scholar_assist::{
    FileStore, HttpConfig, HttpTransport, OperationOrchestrator, ResilienceConfig, TextSelection,
};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: scholar-assist <prompt|analyze> <text>";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let mut args = std::env::args().skip(1);
    let (Some(command), Some(text)) = (args.next(), args.next()) else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };

    let resilience = ResilienceConfig::from_env();
    let http = match HttpConfig::from_env() {
        Ok(http) => http,
        Err(e) => {
            tracing::error!(error = %e, "backend not configured");
            return ExitCode::FAILURE;
        }
    };
    let transport = match HttpTransport::new(&http, resilience.policies.ai_service.timeout) {
        Ok(transport) => transport,
        Err(e) => {
            tracing::error!(error = %e, "http client init failed");
            return ExitCode::FAILURE;
        }
    };
    let state_dir = std::env::var("ASSIST_STATE_DIR")
        .map_or_else(|_| std::env::temp_dir().join("scholar-assist"), Into::into);
    let store = match FileStore::open(state_dir.clone()) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, dir = %state_dir.display(), "state directory unavailable");
            return ExitCode::FAILURE;
        }
    };

    let orchestrator = OperationOrchestrator::builder(Arc::new(transport), Arc::new(store))
        .config(resilience)
        .build();
    tracing::info!(base_url = %http.base_url, "scholar-assist ready");

    let result = match command.as_str() {
        "prompt" => orchestrator.submit_prompt(&text, 0).await,
        "analyze" => {
            orchestrator.update_selection(Some(TextSelection::new(0, text.as_str())));
            orchestrator.analyze_document(&text).await
        }
        _ => {
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };
    orchestrator.shutdown();

    match result {
        Ok(outcome) => match serde_json::to_string_pretty(&outcome) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to encode outcome");
                ExitCode::FAILURE
            }
        },
        Err(err) => {
            eprintln!("{}", err.user_message);
            tracing::warn!(kind = ?err.kind, error = %err.message, "operation failed");
            ExitCode::FAILURE
        }
    }
}
