use clap::Parser;
use radius_server::{Config, DefaultHandler, RadiusServer, ServerConfig};
use std::process;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// RADIUS accounting and authentication listener
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(value_name = "CONFIG", default_value = "config.json")]
    config_path: String,

    /// Validate configuration and exit (doesn't start server)
    #[arg(short, long)]
    validate: bool,
}

fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::from_file(&cli.config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            if cli.validate {
                eprintln!("Configuration validation failed: {}", e);
                process::exit(1);
            }

            init_tracing("info");
            warn!(error = %e, "Could not load config file from: {}", cli.config_path);
            info!("Creating example configuration at: {}", cli.config_path);

            if let Err(e) = Config::example().to_file(&cli.config_path) {
                error!("Error creating example config: {}", e);
                process::exit(1);
            }

            info!("Please edit {} and restart the server", cli.config_path);
            process::exit(0);
        }
    };

    if cli.validate {
        println!("✓ Configuration validated successfully!");
        println!("  Listen: {}:{}", config.listen_address, config.listen_port);
        println!("  Clients: {}", config.clients.len());
        println!("  Users: {}", config.users.len());
        println!("  Log level: {}", config.log_level.as_deref().unwrap_or("info"));
        for client in &config.clients {
            let status = if client.enabled { "✓" } else { "✗" };
            let name = client.name.as_deref().unwrap_or("(unnamed)");
            println!("  {} {} - {}", status, client.address, name);
        }
        process::exit(0);
    }

    init_tracing(config.log_level.as_deref().unwrap_or("info"));

    info!("RADIUS server v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded configuration from: {}", cli.config_path);

    if config.clients.is_empty() {
        warn!("No clients configured, requests from any address are accepted with the default secret");
    } else {
        for client in &config.clients {
            info!(
                address = %client.address,
                name = client.name.as_deref().unwrap_or("(unnamed)"),
                enabled = client.enabled,
                "Configured client"
            );
        }
    }

    let handler = DefaultHandler::from_config(&config);
    info!(users = config.users.len(), "Loaded local users");

    let server_config = match ServerConfig::from_config(config, Arc::new(handler)) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            process::exit(1);
        }
    };

    let server = match RadiusServer::new(server_config).await {
        Ok(srv) => srv,
        Err(e) => {
            error!("Failed to create server: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        error!("Server error: {}", e);
        process::exit(1);
    }
}
