mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use splicer_av::ToolRegistry;
use splicer_core::config::Config;
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise pick defaults from the verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "splicer=trace,splicer_server=trace,splicer_av=trace,splicer_core=debug,tower_http=debug"
                .to_string()
        } else {
            "splicer=info,splicer_server=info,splicer_av=info,splicer_core=info,tower_http=info"
                .to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start {
            host,
            port,
            directory,
            ffmpeg,
        } => {
            let mut config = Config::load_or_default(cli.config.as_deref());
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(directory) = directory {
                config.output.directory = directory;
            }
            if let Some(ffmpeg) = ffmpeg {
                config.tools.ffmpeg_path = Some(ffmpeg);
            }

            tracing::info!("splicer {} starting", env!("CARGO_PKG_VERSION"));
            match cli.config.as_deref() {
                Some(path) => tracing::debug!("Config file: {}", path.display()),
                None => tracing::debug!("No config file given, using defaults"),
            }

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(splicer_server::start(config))?;
            Ok(())
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("splicer {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = Config::load_or_default(config_path);
    let tools = ToolRegistry::discover(&config.tools).check_all();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Splicing needs ffmpeg; /query and /watch need yt-dlp.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let content = std::fs::read_to_string(p)?;
            let config = Config::from_json(&content)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!(
        "  Output: {} (.{})",
        config.output.directory.display(),
        config.output.extension
    );
    match config.tools.encode_timeout_secs {
        Some(secs) => println!("  Encode timeout: {secs}s"),
        None => println!("  Encode timeout: none"),
    }

    for warning in config.validate() {
        println!("  warning: {warning}");
    }

    Ok(())
}
