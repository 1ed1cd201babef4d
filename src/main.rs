mod cli;

use imageforge::{config, models::ModelRegistry, server};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

async fn start_server(
    host: String,
    port: u16,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    // Load config
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    config.server.host = host;
    config.server.port = port;

    tracing::info!("Starting imageforge server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    server::start_server(config).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "imageforge=trace,tower_http=debug".to_string()
        } else {
            "imageforge=debug,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            // Create tokio runtime
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::CheckModels => check_models(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("imageforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn check_models(config_path: Option<&std::path::Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    println!("Checking external model runners...\n");

    let registry = ModelRegistry::discover(&config.models);
    let mut all_ok = true;

    for info in registry.check_all() {
        let status = if info.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, info.name);

        if let Some(ref version) = info.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = info.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!("\nConfigured styles:");
    for style in &config.models.styles {
        let status = if style.weights.exists() { "✓" } else { "✗" };
        println!("{} {} - {}", status, style.name, style.weights.display());
    }

    println!();
    if all_ok {
        println!("All model runners are available!");
    } else {
        println!("Some runners are missing. Install them to enable all features.");
    }

    Ok(())
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Output dir: {}", config.output.dir.display());
            println!("  Styles: {}", config.models.styles.len());
            println!("  Max images per request: {}", config.generation.max_images);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Output dir: {}", config.output.dir.display());
        }
    }

    Ok(())
}
