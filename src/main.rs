use daka_core::{Notifier, Settings, SmtpNotifier, run_user};
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(err) => {
            error!(error = %err, "could not load configuration");
            return;
        }
    };

    let notifier: Arc<dyn Notifier> = match SmtpNotifier::new(&settings.email) {
        Ok(notifier) => Arc::new(notifier),
        Err(err) => {
            error!(error = %err, "could not set up the mail relay");
            return;
        }
    };

    // Strictly one user at a time; a failed run is reported by email and
    // never stops the remaining users. The process exits 0 regardless.
    for user in &settings.users {
        run_user(&settings, Arc::clone(&notifier), user).await;
    }
}
