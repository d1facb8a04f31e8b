use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use content_crew::pipeline::{DEFAULT_CONTENT_TYPE, DEFAULT_LENGTH, DEFAULT_TONE};
use content_crew::{
    configure_routes, logging, AppConfig, AppState, ContentPipeline, ContentRequest, PipelineEvent,
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "content_crew")]
#[command(version)]
#[command(about = "Multi-agent content generation with Gemini and Tavily search", long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the web application
    Serve {
        /// Overrides CONTENT_CREW_BIND
        #[arg(long, value_name = "ADDR")]
        bind: Option<SocketAddr>,
    },

    /// Generate one piece of content and print it
    Generate {
        #[arg(short, long)]
        topic: String,

        #[arg(long, default_value = DEFAULT_CONTENT_TYPE)]
        content_type: String,

        #[arg(long, default_value = DEFAULT_LENGTH)]
        length: String,

        #[arg(long, default_value = DEFAULT_TONE)]
        tone: String,

        #[arg(long)]
        no_research: bool,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    info!(models = ?config.model_names(), research = config.research_enabled(), "configuration loaded");

    let pipeline = ContentPipeline::from_config(&config).context("Failed to build content pipeline")?;

    match cli.command {
        Commands::Serve { bind } => {
            let addr = bind.unwrap_or(config.bind);
            let state = AppState::new(pipeline, config.model_names());
            let routes = configure_routes(state);

            info!("Starting server on http://{}", addr);
            warp::serve(routes).run(addr).await;
        }
        Commands::Generate {
            topic,
            content_type,
            length,
            tone,
            no_research,
            json,
        } => {
            let request = ContentRequest {
                topic,
                content_type,
                length,
                tone,
                use_research: !no_research,
            };

            let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
            let progress = tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    match event {
                        PipelineEvent::StageStarted { agent } => eprintln!("==> {}", agent),
                        PipelineEvent::ToolCall { tool_name, arguments, .. } => {
                            eprintln!("    {} {}", tool_name, arguments)
                        }
                        PipelineEvent::FallbackActivated { reason } => {
                            eprintln!("==> Crew failed ({}); running fallback", reason)
                        }
                        _ => {}
                    }
                }
            });

            let result = pipeline.create_content(request, Some(tx)).await;
            progress.await.context("Progress printer panicked")?;
            let result = result.context("Content generation failed")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                if let Some(error) = &result.error {
                    warn!(error = %error, "content produced by the fallback pipeline");
                }
                println!("{}", result.final_output);
            }
        }
    }

    Ok(())
}
