// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Hujjat: PDF/Word page selection, conversion, and Uzbek transliteration.
//
// Entry point. Initialises logging and backend services, then runs the
// console transport. The first argument, if given, is the output directory.

mod console;
mod services;

use std::path::PathBuf;

use services::app_services::AppServices;
use services::data_dir;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Hujjat starting");

    let services = match AppServices::init() {
        Ok(services) => services,
        Err(e) => {
            tracing::error!(error = %e, "failed to initialise services");
            std::process::exit(1);
        }
    };
    let _sweeper = services.spawn_session_sweeper();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| data_dir::data_subdir("output"));
    tracing::info!(
        data_dir = %services.data_dir().display(),
        out_dir = %out_dir.display(),
        "console ready"
    );
    let display_name = std::env::var("USER").unwrap_or_else(|_| "foydalanuvchi".into());

    if let Err(e) = console::run(&services, &out_dir, &display_name).await {
        tracing::error!(error = %e, "console transport stopped");
        std::process::exit(1);
    }
}
