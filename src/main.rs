use clap::Parser;
use smartfit::utils::error::{ErrorSeverity, SmartFitError};
use smartfit::utils::{logger, validation::Validate};
use smartfit::{app, AppConfig};

#[derive(Parser, Debug)]
#[command(name = "smartfit-server")]
#[command(about = "SmartFit virtual try-on API server")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Override the listening port
    #[arg(long)]
    port: Option<u16>,

    /// Override the runtime environment (development, production, test)
    #[arg(long)]
    environment: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn load_config(args: &Args) -> Result<AppConfig, SmartFitError> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::from_env()?,
    };

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(environment) = &args.environment {
        config.server.environment = environment.parse()?;
    }
    if args.json_logs {
        config.logging.json = true;
    }

    config.validate()?;
    Ok(config)
}

fn exit_code(e: &SmartFitError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e));
        }
    };

    let level = if args.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    logger::init_server_logger(level, config.logging.json);

    tracing::info!("Starting SmartFit API server");
    tracing::debug!("Config: {:?}", config);

    if let Err(e) = app::start_server(config).await {
        tracing::error!(
            "Server stopped with error: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());
        std::process::exit(exit_code(&e));
    }
}
