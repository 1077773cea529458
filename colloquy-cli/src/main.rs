//! Colloquy CLI - Chat with model profiles from the terminal

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colloquy_core::prelude::*;

mod chat;

#[derive(Parser)]
#[command(name = "colloquy")]
#[command(about = "Bounded conversations across model profiles", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to colloquy.toml and COLLOQUY_* variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Profile management commands
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Start an interactive chat
    Chat {
        /// Profile to use
        #[arg(short, long)]
        profile: Option<String>,
        /// History entries sent with each request (at least 1)
        #[arg(long, value_parser = parse_max_turns)]
        max_turns: Option<usize>,
    },
    /// Send a single message and print the reply
    Ask {
        /// Profile to use
        #[arg(short, long)]
        profile: Option<String>,
        /// History entries sent with each request (at least 1)
        #[arg(long, value_parser = parse_max_turns)]
        max_turns: Option<usize>,
        /// Message text
        message: String,
    },
    /// Version information
    Version,
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Add or replace a profile
    Add {
        /// Profile name
        name: String,
        /// Base URL of the model endpoint
        #[arg(long)]
        endpoint: String,
        /// API key
        #[arg(long, env = "COLLOQUY_API_KEY", hide_env_values = true)]
        api_key: String,
        /// Model identifier
        #[arg(long)]
        model: String,
        /// System instruction sent with every request
        #[arg(long, default_value = "")]
        instruction: String,
        /// Wire dialect: openai or gemini
        #[arg(long, default_value = "openai")]
        provider: ProviderKind,
    },
    /// List profile names
    List,
    /// Show one profile (key redacted)
    Show {
        /// Profile name
        name: String,
    },
    /// Remove a profile
    Remove {
        /// Profile name
        name: String,
    },
}

fn parse_max_turns(value: &str) -> std::result::Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<ColloquyConfig> {
    let config = match path {
        Some(path) => ColloquyConfig::from_file(path)?,
        None => ColloquyConfig::load()?,
    };
    Ok(config)
}

fn open_store(config: &ColloquyConfig) -> Result<JsonFileProfileStore> {
    let path = config
        .storage
        .resolve_profiles_path()
        .context("Could not locate the profile store")?;
    Ok(JsonFileProfileStore::new(path))
}

/// Pick the profile named on the command line, else the configured default,
/// else the only stored profile.
fn resolve_profile(
    profiles: &ProfileSet,
    requested: Option<&str>,
    config: &ColloquyConfig,
) -> Result<Profile> {
    let name = match requested.or(config.storage.default_profile.as_deref()) {
        Some(name) => name.to_string(),
        None => match profiles.names().as_slice() {
            [only] => only.to_string(),
            [] => anyhow::bail!("No profiles configured; add one with `colloquy profile add`"),
            _ => anyhow::bail!("Several profiles configured; pick one with --profile"),
        },
    };

    profiles
        .get(&name)
        .cloned()
        .ok_or_else(|| ColloquyError::ProfileNotFound(name).into())
}

fn run_profile_command(command: ProfileCommands, store: &JsonFileProfileStore) -> Result<()> {
    let mut profiles = store.load_or_default()?;

    match command {
        ProfileCommands::Add {
            name,
            endpoint,
            api_key,
            model,
            instruction,
            provider,
        } => {
            let profile = Profile::new(name.as_str(), endpoint, api_key, model)
                .with_system_instruction(instruction)
                .with_provider(provider);
            profile.validate()?;

            let replaced = profiles.save(profile).is_some();
            store.save(&profiles)?;

            if replaced {
                println!("Updated profile: {}", name);
            } else {
                println!("Added profile: {}", name);
            }
        }
        ProfileCommands::List => {
            if profiles.is_empty() {
                println!("No profiles configured");
            }
            for name in profiles.names() {
                println!("{}", name);
            }
        }
        ProfileCommands::Show { name } => {
            let profile = profiles
                .get(&name)
                .ok_or_else(|| ColloquyError::ProfileNotFound(name.clone()))?;
            let view = serde_json::json!({
                "name": profile.name,
                "provider": profile.provider.as_str(),
                "endpoint_url": profile.endpoint_url,
                "api_key": profile.api_key.to_string(),
                "model_id": profile.model_id,
                "system_instruction": profile.system_instruction,
            });
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        ProfileCommands::Remove { name } => {
            if profiles.remove(&name).is_none() {
                return Err(ColloquyError::ProfileNotFound(name).into());
            }
            store.save(&profiles)?;
            println!("Removed profile: {}", name);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("colloquy {}", env!("CARGO_PKG_VERSION"));
        println!("colloquy-core {}", colloquy_core::VERSION);
        return Ok(());
    }

    let config = load_config(cli.config.as_ref())?;
    let store = open_store(&config)?;
    tracing::debug!(path = %store.path().display(), "Using profile store");

    match cli.command {
        Commands::Version => {}
        Commands::Profile { command } => run_profile_command(command, &store)?,
        Commands::Chat { profile, max_turns } => {
            let profiles = store.load_or_default()?;
            let profile = resolve_profile(&profiles, profile.as_deref(), &config)?;
            let mut options = ExchangeOptions::from_config(&config);
            if let Some(max_turns) = max_turns {
                options = options.with_max_turns(max_turns);
            }
            chat::run(profile, &store, &config, options).await?;
        }
        Commands::Ask {
            profile,
            max_turns,
            message,
        } => {
            let profiles = store.load_or_default()?;
            let profile = resolve_profile(&profiles, profile.as_deref(), &config)?;
            let mut options = ExchangeOptions::from_config(&config);
            if let Some(max_turns) = max_turns {
                options = options.with_max_turns(max_turns);
            }

            let client = LLMProviderFactory::for_profile(&profile, &config.http)?;
            let mut session = ConversationSession::create(profile)?;
            let reply = exchange(&mut session, client.as_ref(), &message, &options)
                .await
                .context("Error getting response")?;
            println!("{}", reply);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profiles() -> ProfileSet {
        [
            Profile::new("work", "https://x", "k", "m"),
            Profile::new("home", "https://y", "k", "m2"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_profile_add() {
        let cli = Cli::try_parse_from([
            "colloquy", "profile", "add", "google", "--endpoint", "https://g", "--api-key", "k",
            "--model", "gemini-2.0-flash", "--provider", "gemini",
        ])
        .unwrap();

        match cli.command {
            Commands::Profile {
                command: ProfileCommands::Add { name, provider, instruction, .. },
            } => {
                assert_eq!(name, "google");
                assert_eq!(provider, ProviderKind::Gemini);
                assert!(instruction.is_empty());
            }
            _ => panic!("expected profile add"),
        }
    }

    #[test]
    fn test_max_turns_must_be_positive() {
        assert!(Cli::try_parse_from(["colloquy", "ask", "--max-turns", "0", "hi"]).is_err());
        assert!(Cli::try_parse_from(["colloquy", "chat", "--max-turns", "x"]).is_err());

        let cli = Cli::try_parse_from(["colloquy", "ask", "--max-turns", "3", "hi"]).unwrap();
        assert!(matches!(cli.command, Commands::Ask { max_turns: Some(3), .. }));
    }

    #[test]
    fn test_resolve_explicit_profile() {
        let config = ColloquyConfig::default();
        let profile = resolve_profile(&profiles(), Some("home"), &config).unwrap();
        assert_eq!(profile.model_id, "m2");
    }

    #[test]
    fn test_resolve_default_profile() {
        let mut config = ColloquyConfig::default();
        config.storage.default_profile = Some("work".to_string());
        let profile = resolve_profile(&profiles(), None, &config).unwrap();
        assert_eq!(profile.name, "work");
    }

    #[test]
    fn test_resolve_ambiguous_profile() {
        let config = ColloquyConfig::default();
        assert!(resolve_profile(&profiles(), None, &config).is_err());

        let single: ProfileSet = [Profile::new("solo", "https://x", "k", "m")]
            .into_iter()
            .collect();
        assert_eq!(resolve_profile(&single, None, &config).unwrap().name, "solo");
    }

    #[test]
    fn test_resolve_missing_profile() {
        let config = ColloquyConfig::default();
        let err = resolve_profile(&profiles(), Some("nope"), &config).unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_profile_commands_roundtrip_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileProfileStore::new(dir.path().join("profiles.json"));

        run_profile_command(
            ProfileCommands::Add {
                name: "work".to_string(),
                endpoint: "https://x".to_string(),
                api_key: "k".to_string(),
                model: "m".to_string(),
                instruction: "be terse".to_string(),
                provider: ProviderKind::OpenAI,
            },
            &store,
        )
        .unwrap();

        let stored = store.load().unwrap().unwrap();
        assert_eq!(stored.get("work").unwrap().system_instruction, "be terse");

        run_profile_command(ProfileCommands::Remove { name: "work".to_string() }, &store).unwrap();
        assert!(store.load().unwrap().unwrap().is_empty());
    }
}
