use std::io;

use btreefs::config::ShellConfig;
use btreefs::shell::Shell;
use btreefs::time::SystemTimeSource;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    // Logs go to stderr so they never interleave with command output.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "btreefs=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = match ShellConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Loaded configuration: file_extension={}, image_directory={}",
        config.file_extension,
        config.image_directory.display()
    );

    let mut shell = Shell::new(config, SystemTimeSource);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    if let Err(e) = shell.run(stdin.lock(), &mut stdout) {
        tracing::error!("Shell stopped: {e}");
        std::process::exit(1);
    }
}
