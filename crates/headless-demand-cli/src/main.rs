//! Headless demand CLI — entry point.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use headless_demand_cli::commands::{describe_sites, resolve_demand, ResolveInput};
use headless_demand_cli::config::{load_registry, resolve_sites_path};

#[derive(Parser)]
#[command(
    name = "headless-demand",
    about = "Resolve headless page-rendering demands against a site configuration",
    version
)]
struct Cli {
    /// Path to the JSON site configuration.
    #[arg(short, long, global = true)]
    sites: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the demand of a request and print its link arguments.
    Resolve {
        /// Identifier of a site already attached by routing.
        #[arg(long)]
        attached_site: Option<String>,

        /// URL query string, e.g. "id=5&tx_headless[lang]=1".
        #[arg(short, long)]
        query: Option<String>,

        /// JSON request body.
        #[arg(long, conflicts_with = "form")]
        body: Option<String>,

        /// Form-encoded request body.
        #[arg(long)]
        form: Option<String>,

        /// Plugin namespace for nested query arguments.
        #[arg(short, long, default_value = "")]
        namespace: String,
    },

    /// List configured sites and their languages.
    Sites,

    /// Validate the site configuration.
    Validate,

    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Resolve {
            attached_site,
            query,
            body,
            form,
            namespace,
        } => {
            let registry = load_registry(cli.sites.as_deref())?;
            let input = ResolveInput {
                attached_site,
                query,
                body,
                form,
                namespace,
            };
            let output = resolve_demand(&registry, &input)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Commands::Sites => {
            let registry = load_registry(cli.sites.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&describe_sites(&registry))?);
        }

        Commands::Validate => {
            let path = resolve_sites_path(cli.sites.as_deref());
            match load_registry(cli.sites.as_deref()) {
                Ok(registry) => {
                    let languages: usize = registry
                        .sites()
                        .iter()
                        .map(|s| s.all_languages().len())
                        .sum();
                    println!("Valid site configuration: {}", path.display());
                    println!("  Sites: {}", registry.count());
                    println!("  Languages: {languages}");
                }
                Err(e) => {
                    eprintln!("Invalid site configuration: {e}");
                    std::process::exit(1);
                }
            }
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "headless-demand", &mut std::io::stdout());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "headless-demand",
            "resolve",
            "--log-level",
            "debug",
            "--sites",
            "sites.json",
        ])
        .unwrap();
        assert_eq!(cli.log_level, "debug");
        assert_eq!(cli.sites.as_deref(), Some("sites.json"));
        assert!(matches!(cli.command, Commands::Resolve { .. }));

        let cli = Cli::try_parse_from(["headless-demand", "sites"]).unwrap();
        assert_eq!(cli.log_level, "warn");
    }
}
