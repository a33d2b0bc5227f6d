//! nersdk: rotulagem BIO por regras, com pacotes de domínio opcionais.

mod commands;

use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    // .env antes de tudo (NERSDK_PACK_PATH, RUST_LOG)
    let _ = dotenvy::dotenv();

    let default_filter = if commands::is_verbose() {
        "nersdk_core=info,nersdk=info"
    } else {
        "nersdk_core=warn,nersdk=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match commands::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
