use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pathfinder_lib::config::Config;
use pathfinder_lib::controller::{Action, InteractionController, RoadmapView};
use pathfinder_lib::gateway::HttpGateway;
use pathfinder_lib::notice::{Notice, NoticeLevel, Notifier};
use pathfinder_lib::roadmap::RenderedRoadmap;
use pathfinder_lib::role::TargetRole;
use pathfinder_lib::upload::ResumeFile;

#[derive(Parser)]
#[command(name = "pathfinder")]
#[command(about = "Turn a resume or a list of skills into a phased learning roadmap", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend base URL (overrides PATHFINDER_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a resume and/or add skills, then generate a roadmap
    Roadmap(RoadmapArgs),
    /// Time an uncached and a cached generation on the backend
    Probe {
        /// Target role identifier (see `pathfinder roles`)
        #[arg(long)]
        role: String,
        /// Sample resume text to send
        #[arg(long)]
        input: Option<String>,
    },
    /// List supported target roles
    Roles,
}

#[derive(Args)]
struct RoadmapArgs {
    /// Target role identifier (see `pathfinder roles`)
    #[arg(long)]
    role: String,

    /// Resume to upload (PDF or DOCX)
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Replace the skill list with skills extracted from the uploaded resume
    #[arg(long)]
    extract: bool,

    /// Skills to add; whitespace-separated values are split
    #[arg(short, long = "skill")]
    skills: Vec<String>,

    /// Skills to remove after adding
    #[arg(long)]
    remove: Vec<String>,

    /// Ask the backend to bypass its result cache
    #[arg(long)]
    force_refresh: bool,

    /// Print the rendered roadmap as JSON instead of a timeline
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let level = &config.rust_log;
            EnvFilter::new(format!(
                "{}={level},pathfinder_lib={level}",
                env!("CARGO_PKG_NAME")
            ))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Commands::Roles = cli.command {
        for role in TargetRole::ALL {
            println!("{:<24} {}", role.as_str(), role.label());
        }
        return Ok(());
    }

    info!(
        "Starting pathfinder v{} against {}",
        env!("CARGO_PKG_VERSION"),
        config.api_url
    );

    let gateway = Arc::new(HttpGateway::new(&config.api_url, config.request_timeout)?);
    let (notifier, notices) = Notifier::channel();
    let printer = tokio::spawn(print_notices(notices));

    let controller =
        InteractionController::new(gateway, notifier).with_reveal_step(config.reveal_step);
    let result = run(&controller, cli.command).await;

    // Closing the controller closes the notice channel, letting the printer drain and exit.
    drop(controller);
    printer.await?;
    result
}

async fn run(controller: &InteractionController, command: Commands) -> Result<()> {
    match command {
        Commands::Roadmap(args) => {
            if let Some(path) = &args.resume {
                let file = ResumeFile::from_path(path).await?;
                controller.dispatch(Action::Upload(file)).await?;
            }
            if args.extract {
                controller.dispatch(Action::Extract).await?;
            }
            for raw in args.skills {
                controller.dispatch(Action::AddSkills(raw)).await?;
            }
            for skill in args.remove {
                controller.dispatch(Action::RemoveSkill(skill)).await?;
            }

            let view = controller
                .generate_roadmap(&args.role, args.force_refresh)
                .await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&view.rendered)?);
            } else {
                reveal(&view).await;
            }
        }
        Commands::Probe { role, input } => {
            let probe = controller
                .run_performance_probe(&role, input.as_deref())
                .await?;
            println!("{}", probe.headline());
            if let Some(summary) = probe.summary() {
                println!("{summary}");
            }
        }
        Commands::Roles => {}
    }
    Ok(())
}

/// Prints the timeline one item at a time on its reveal schedule.
async fn reveal(view: &RoadmapView) {
    match &view.rendered {
        RenderedRoadmap::Empty { placeholder } => println!("{placeholder}"),
        RenderedRoadmap::Timeline { items } => {
            let start = Instant::now();
            for item in items {
                tokio::time::sleep_until(start + item.reveal_delay).await;
                println!("{item}");
            }
        }
    }
    println!("\nResources: {}", view.resources);
    if let Some(performance) = &view.performance {
        println!("{performance}");
    }
}

async fn print_notices(mut notices: UnboundedReceiver<Notice>) {
    while let Some(notice) = notices.recv().await {
        let tag = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "ok",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        eprintln!("[{}] {tag}: {}", notice.at.format("%H:%M:%S"), notice.text);
    }
}
