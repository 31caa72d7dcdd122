//! Terminal output for the console: styled job tables, the budget
//! meter, SKU cards, and a spinner tracking the simulated run.
//!
//! Uses `indicatif` for the spinner and `console` for color styling.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::notify::{Level, Notification};
use crate::store::{
    AgentMessage, AuditEntry, BudgetData, FieldName, FieldStatus, FilterCounts, Job, JobStatus,
    MessageKind, SkuData,
};

/// Spinner shown while a selected job's simulation is live.
pub struct RunProgress {
    pb: ProgressBar,
    green: Style,
    yellow: Style,
}

impl RunProgress {
    pub fn start(job: &Job) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("invalid template"),
        );
        pb.set_message(format!("Enriching: {}", job.input));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Prints one agent trace line above the spinner.
    pub fn trace(&self, message: &AgentMessage) {
        let tag = match message.kind {
            MessageKind::Plan => self.yellow.apply_to("plan"),
            MessageKind::Activity => Style::new().cyan().apply_to("activity"),
            MessageKind::Result => self.green.apply_to("result"),
            MessageKind::Decision => Style::new().magenta().bold().apply_to("decision"),
        };
        self.pb
            .println(format!("  [{tag}] {}: {}", message.agent, message.content));
    }

    /// Updates the live counters under the spinner.
    pub fn update_counters(&self, job: &Job) {
        self.pb.set_message(format!(
            "Enriching: {} ({}s, ${:.3}, {} tokens)",
            job.input, job.duration_secs, job.cost, job.token_usage
        ));
    }

    pub fn finish(&self, note: &str) {
        self.pb.finish_and_clear();
        println!("  {} {note}", self.green.apply_to("✓"));
    }
}

fn status_style(status: JobStatus) -> Style {
    match status {
        JobStatus::Running => Style::new().cyan(),
        JobStatus::Completed => Style::new().green(),
        JobStatus::Failed => Style::new().red().bold(),
        JobStatus::NeedsReview => Style::new().yellow(),
        JobStatus::Blocked => Style::new().red(),
        JobStatus::ReadyToPublish => Style::new().green().bold(),
    }
}

fn field_glyph(status: FieldStatus) -> console::StyledObject<&'static str> {
    match status {
        FieldStatus::Verified => Style::new().green().apply_to("✓"),
        FieldStatus::Pending => Style::new().yellow().apply_to("○"),
        FieldStatus::Conflict => Style::new().red().apply_to("!"),
        FieldStatus::Locked => Style::new().cyan().apply_to("■"),
    }
}

/// Job table, newest first.
pub fn print_jobs<'a>(jobs: impl IntoIterator<Item = &'a Job>, selected: Option<&str>) {
    println!(
        "{:<12} {:<17} {:<10} {:<8} {:>8} {:>9}",
        "ID", "STATUS", "MPN", "BRAND", "COST", "TOKENS"
    );
    for job in jobs {
        let marker = if selected == Some(job.id.as_str()) { "▸" } else { " " };
        let status = status_style(job.status).apply_to(job.status.as_str());
        println!(
            "{marker}{:<11} {:<17} {:<10} {:<8} {:>7.3}$ {:>9}",
            job.id, status, job.mpn, job.brand, job.cost, job.token_usage
        );
    }
}

/// Per-status counts for the dashboard filter bar.
pub fn print_counts(counts: &FilterCounts) {
    println!("{} jobs total", Style::new().bold().apply_to(counts.all));
    for status in JobStatus::ALL {
        let n = counts.count(status);
        if n > 0 {
            println!("  {:<17} {n}", status_style(status).apply_to(status.as_str()));
        }
    }
}

/// Budget usage against the configured limits.
pub fn print_budget(budget: &BudgetData) {
    let pct = |used: f64, limit: f64| {
        if limit > 0.0 { (used / limit * 100.0).min(100.0) } else { 0.0 }
    };
    println!("{}", Style::new().bold().apply_to("─── Budget ───"));
    println!(
        "  tokens    {:>8} / {:<8} ({:.0}%)",
        budget.token_usage,
        budget.token_limit,
        pct(budget.token_usage as f64, budget.token_limit as f64)
    );
    println!(
        "  cost      {:>7.2}$ / {:<7.2}$ ({:.0}%)",
        budget.estimated_cost,
        budget.cost_limit,
        pct(budget.estimated_cost, budget.cost_limit)
    );
    println!(
        "  api calls {:>8} / {:<8} ({:.0}%)",
        budget.api_calls,
        budget.api_call_limit,
        pct(budget.api_calls as f64, budget.api_call_limit as f64)
    );
}

/// The SKU card for the selected job.
pub fn print_sku(sku: &SkuData) {
    println!(
        "{}",
        Style::new().bold().apply_to(format!("─── SKU {} ───", sku.job_id))
    );
    for field in FieldName::ALL {
        match sku.record(field) {
            Some(rec) => println!(
                "  {} {:<11} {:<22} ({}%)",
                field_glyph(rec.status),
                field.as_str(),
                rec.value,
                rec.confidence.get()
            ),
            None => println!(
                "  {} {:<11} {} (qc: {})",
                Style::new().dim().apply_to("▣"),
                field.as_str(),
                sku.hero_image.url,
                sku.hero_image.qc_status
            ),
        }
    }
}

/// Pretty-prints the audit log as JSON.
pub fn print_audit(entries: &[AuditEntry]) {
    println!("{}", Style::new().bold().apply_to("─── Audit Log ───"));
    println!(
        "{}",
        serde_json::to_string_pretty(entries).unwrap_or_default()
    );
}

/// One notification line, colored by level.
pub fn print_notification(notification: &Notification) {
    let styled = match notification.level {
        Level::Info => Style::new().cyan().apply_to("i"),
        Level::Success => Style::new().green().bold().apply_to("✓"),
        Level::Warning => Style::new().yellow().bold().apply_to("⚠"),
    };
    println!("  {styled} {}", notification.message);
}
