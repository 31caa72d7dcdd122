mod cli;
mod config;
mod error;
mod export;
mod notify;
mod seed;
mod session;
mod store;
mod ui;

use anyhow::Result;
use clap::Parser;
use console::Style;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use config::SkuforgeConfig;
use error::{ActionError, SkuforgeError};
use export::ExportFormat;
use notify::Notifier;
use session::{Session, SimulatedBackend};
use store::{FieldName, JobStatus, Snapshot, Workspace};

fn init_tracing(verbose: bool) {
    let default = if verbose { "skuforge=debug" } else { "skuforge=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn seeded_workspace(config: &SkuforgeConfig) -> Workspace {
    let mut snapshot = Snapshot::seeded();
    snapshot.user = config.user.clone();
    snapshot.limits = config.budget_limits();
    Workspace::new(snapshot)
}

fn build_session(config: &SkuforgeConfig) -> Session<SimulatedBackend> {
    Session::new(
        seeded_workspace(config),
        config.backend(),
        Notifier::default(),
        config.tick_settings(),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = SkuforgeConfig::load()?;

    match cli.command {
        Command::Demo => run_demo(&config).await,
        Command::Status => {
            let workspace = seeded_workspace(&config);
            ui::print_counts(&workspace.filter_counts());
            println!();
            ui::print_budget(&workspace.budget());
            Ok(())
        }
        Command::Jobs { filter } => {
            let workspace = seeded_workspace(&config);
            let jobs = workspace.jobs_with_status(filter.map(Into::into));
            ui::print_jobs(jobs, None);
            Ok(())
        }
        Command::Create { input, watch_secs } => run_create(&config, &input, watch_secs).await,
        Command::Export { format, fix } => run_export(&config, format.into(), fix).await,
    }
}

/// Creates a job and watches the simulated run advance its counters.
async fn run_create(config: &SkuforgeConfig, input: &str, watch_secs: u64) -> Result<()> {
    let session = build_session(config);
    let id = session.create_job(input);
    let job = session
        .with_store(|ws| ws.selected_job().cloned())
        .ok_or_else(|| SkuforgeError::JobNotFound(id.clone()))?;

    let progress = ui::RunProgress::start(&job);
    for message in session.with_store(|ws| ws.messages().to_vec()) {
        progress.trace(&message);
    }
    for _ in 0..watch_secs {
        tokio::time::sleep(config.tick_settings().period).await;
        if let Some(job) = session.with_store(|ws| ws.selected_job().cloned()) {
            progress.update_counters(&job);
        }
    }
    session.stop();
    progress.finish("Simulation stopped");

    let jobs = session.with_store(|ws| ws.jobs().to_vec());
    ui::print_jobs(&jobs, Some(id.as_str()));
    Ok(())
}

/// Exports the first publish-ready job, optionally clearing blockers
/// through the fix agent first.
async fn run_export(config: &SkuforgeConfig, format: ExportFormat, fix: bool) -> Result<()> {
    let session = build_session(config);
    let target = session
        .with_store(|ws| {
            ws.jobs_with_status(Some(JobStatus::ReadyToPublish))
                .first()
                .map(|j| j.id.clone())
        })
        .ok_or_else(|| SkuforgeError::JobNotFound("no job is ready to publish".into()))?;
    session.select_job(&target);

    if fix {
        let blockers: Vec<String> =
            session.with_store(|ws| ws.blockers().iter().map(|b| b.id.clone()).collect());
        for blocker_id in blockers {
            println!("Fixing blocker {blocker_id}...");
            session.request_fix(&blocker_id).await?;
        }
    }

    match session.export(format).await {
        Ok(receipt) => {
            println!(
                "  {} Exported {} as {} at {}",
                Style::new().green().bold().apply_to("✓"),
                receipt.job_id,
                receipt.format.label(),
                receipt.exported_at.format("%H:%M:%S")
            );
            Ok(())
        }
        Err(ActionError::Blocked { remaining }) => {
            println!(
                "  {} Export blocked: {remaining} validation blocker(s) open",
                Style::new().red().bold().apply_to("✗")
            );
            for blocker in session.with_store(|ws| ws.blockers().to_vec()) {
                println!("    - {} ({})", blocker.description, blocker.id);
            }
            println!("  Re-run with --fix to let the agent clear them.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// The scripted walkthrough: dashboard, workspace, conflict, lock,
/// fixes, export, publish, audit.
async fn run_demo(config: &SkuforgeConfig) -> Result<()> {
    let session = build_session(config);
    let mut notifications = session.notifier().subscribe();
    let header = Style::new().bold().underlined();

    println!("{}", header.apply_to("Dashboard"));
    let jobs = session.with_store(|ws| ws.jobs().to_vec());
    ui::print_jobs(&jobs, None);
    println!();
    session.with_store(|ws| ui::print_counts(&ws.filter_counts()));

    println!();
    println!("{}", header.apply_to("Workspace: job-001"));
    session.select_job("job-001");
    let job = session
        .with_store(|ws| ws.selected_job().cloned())
        .ok_or_else(|| SkuforgeError::JobNotFound("job-001".into()))?;
    let progress = ui::RunProgress::start(&job);
    for message in session.with_store(|ws| ws.messages().to_vec()) {
        progress.trace(&message);
        tokio::time::sleep(std::time::Duration::from_millis(300)).await;
    }
    for _ in 0..3 {
        tokio::time::sleep(config.tick_settings().period).await;
        if let Some(job) = session.with_store(|ws| ws.selected_job().cloned()) {
            progress.update_counters(&job);
        }
    }
    progress.finish("Agent run paused on a decision");

    // The decision line asks which dimension source to trust.
    session.trigger_conflict(FieldName::Dimensions);
    if let Some(conflict) = session.with_store(|ws| ws.active_conflict().cloned()) {
        println!();
        println!("{}", header.apply_to("Conflict: dimensions"));
        for (i, claim) in conflict.claims.iter().enumerate() {
            println!("  [{i}] {} ({})", claim.value, claim.source);
        }
        if let Some(resolution) = conflict.resolution_for(0) {
            session.resolve_conflict(&resolution);
            println!("  Trusting {}", resolution.source);
        }
    }

    session.toggle_field_lock(FieldName::Brand);
    if let Some(sku) = session.with_store(|ws| ws.sku().cloned()) {
        println!();
        ui::print_sku(&sku);
    }

    println!();
    println!("{}", header.apply_to("Export & Publish"));
    let blockers: Vec<String> =
        session.with_store(|ws| ws.blockers().iter().map(|b| b.id.clone()).collect());
    for blocker_id in blockers {
        session.request_fix(&blocker_id).await?;
    }
    if let Some(target) = session.with_store(|ws| {
        ws.jobs_with_status(Some(JobStatus::ReadyToPublish))
            .first()
            .map(|j| j.id.clone())
    }) {
        session.select_job(&target);
        let receipt = session.export(ExportFormat::OzonXml).await?;
        println!("  Export receipt: {} / {}", receipt.job_id, receipt.format);
        session.publish().await?;
    }

    session.stop();

    println!();
    session.with_store(|ws| {
        ui::print_audit(ws.audit_log());
        println!();
        ui::print_budget(&ws.budget());
    });

    println!();
    println!("{}", header.apply_to("Notifications"));
    while let Ok(notification) = notifications.try_recv() {
        ui::print_notification(&notification);
    }

    Ok(())
}
