use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use trade_prompt_proxy::config::split_list;
use trade_prompt_proxy::image::image_fallback_from_config;
use trade_prompt_proxy::llm::{backend_from_config, chain_from_config, invoke_ai};
use trade_prompt_proxy::prompt::image_prompt::{build_image_prompt, ImagePromptRequest};
use trade_prompt_proxy::prompt::sections::{contextual_templates, is_known_section, literal_templates, SECTIONS};
use trade_prompt_proxy::scenarios::fixtures::{DEFAULT_IMAGE_PROFESSION, DEFAULT_IMAGE_SECTION};
use trade_prompt_proxy::scenarios::{self, Scenario};
use trade_prompt_proxy::Config;

#[derive(Parser, Debug)]
#[command(name = "promptctl", about = "CLI for the Trade Prompt Proxy", version)]
struct Cli {
    /// Override FALLBACK_ORDER, e.g. `google,openai`
    #[arg(global = true, long)]
    fallback_order: Option<String>,

    /// Print compact JSON instead of pretty JSON
    #[arg(global = true, long)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one of the demo scenarios
    Scenario {
        #[arg(value_enum)]
        name: Scenario,
    },
    /// Send a single prompt, primary backend first
    Ask {
        prompt: String,
        #[arg(long, default_value = "openai")]
        primary: String,
        #[arg(long, default_value = "google")]
        secondary: String,
    },
    /// Generate an image, building the prompt from a section unless one is given
    Imagine {
        /// Use this prompt as-is
        #[arg(long, value_name = "TEXT")]
        prompt: Option<String>,
        #[arg(long, default_value = "")]
        seed: String,
        #[arg(long, default_value = DEFAULT_IMAGE_PROFESSION)]
        profession: String,
        #[arg(long, default_value = DEFAULT_IMAGE_SECTION)]
        section: String,
        /// Midjourney aspect ratio, e.g. 16:9
        #[arg(long)]
        aspect_ratio: Option<String>,
        /// DALL-E size, e.g. 1024x1024
        #[arg(long)]
        size: Option<String>,
    },
    /// Upscale one variant of a finished Midjourney job
    Upscale {
        task_id: String,
        /// Variant 1-4
        #[arg(long, default_value_t = 1)]
        index: u8,
    },
    /// Build the image prompt for a section without generating an image
    SectionPrompt {
        #[arg(long)]
        section: String,
        #[arg(long)]
        profession: String,
        #[arg(long, default_value = "")]
        seed: String,
    },
    /// List the website sections and their template kind
    Sections,
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<(), Box<dyn std::error::Error>> {
    if compact {
        println!("{}", serde_json::to_string(value)?);
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load env and parse CLI
    Config::dotenv_load();
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut conf = Config::new()?;
    if let Some(order) = cli.fallback_order {
        conf.fallback_order = split_list(&order);
    }

    match cli.command {
        Commands::Scenario { name } => {
            let chain = chain_from_config(&conf)?;
            let report = scenarios::run_scenario(&chain, name).await?;
            print_json(&report, cli.compact)
        }
        Commands::Ask {
            prompt,
            primary,
            secondary,
        } => {
            let primary = backend_from_config(&primary.to_ascii_lowercase(), &conf)?;
            let secondary = backend_from_config(&secondary.to_ascii_lowercase(), &conf)?;
            let outcome = invoke_ai(primary, secondary, &prompt).await?;
            eprintln!("[{}]", outcome.provider);
            println!("{}", outcome.value);
            Ok(())
        }
        Commands::Imagine {
            prompt,
            seed,
            profession,
            section,
            aspect_ratio,
            size,
        } => {
            let chain = chain_from_config(&conf)?;
            let images = image_fallback_from_config(&conf)?;
            let params = scenarios::GenerateImageParams {
                prompt,
                seed: Some(seed),
                profession: Some(profession),
                section: Some(section),
                aspect_ratio,
                size,
            };
            let report = scenarios::generate_image(&chain, &images, &params).await?;
            print_json(&report, cli.compact)
        }
        Commands::Upscale { task_id, index } => {
            let images = image_fallback_from_config(&conf)?;
            let report = scenarios::upscale(&images, &task_id, index).await?;
            print_json(&report, cli.compact)
        }
        Commands::SectionPrompt {
            section,
            profession,
            seed,
        } => {
            if !is_known_section(&section) {
                eprintln!("Warning: unknown section '{}', using the default template", section);
            }
            let chain = chain_from_config(&conf)?;
            let request = ImagePromptRequest {
                seed,
                profession,
                section,
            };
            let outcome = build_image_prompt(&chain, &request).await?;
            eprintln!("[{}]", outcome.provider);
            println!("{}", outcome.value);
            Ok(())
        }
        Commands::Sections => {
            for section in SECTIONS {
                let kind = if literal_templates(section).is_some() {
                    "literal"
                } else if contextual_templates(section).is_some() {
                    "contextual"
                } else {
                    "default"
                };
                println!("{:<24}{}", section, kind);
            }
            Ok(())
        }
    }
}
