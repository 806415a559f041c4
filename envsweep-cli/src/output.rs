//! Console rendering of the snapshot, the plan, and the execution report.
//!
//! Human-readable only; nothing downstream parses this.

use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use envsweep_core::Snapshot;
use envsweep_engine::{DeploymentReason, EnvironmentReason, ExecutionReport, Plan};

#[derive(Tabled)]
struct DeploymentRow {
    #[tabled(rename = "id")]
    id: u64,
    #[tabled(rename = "environment")]
    environment: String,
    #[tabled(rename = "branch")]
    branch: String,
    #[tabled(rename = "created")]
    created: String,
    #[tabled(rename = "reason")]
    reason: String,
}

#[derive(Tabled)]
struct EnvironmentRow {
    #[tabled(rename = "environment")]
    name: String,
    #[tabled(rename = "scope")]
    scope: String,
    #[tabled(rename = "reason")]
    reason: String,
}

/// Summarize the fetched catalogs before classification.
pub fn print_snapshot(snapshot: &Snapshot) {
    println!();
    println!("{}", "# Detected catalogs".bold());
    println!(
        "Branches ({}): {}",
        snapshot.branches.len(),
        snapshot
            .branches
            .iter()
            .map(|b| b.0.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "GitHub deployments ({}): {}",
        snapshot.deployments.len(),
        snapshot
            .deployments
            .iter()
            .map(|d| format!("{}:{}", d.environment, d.branch))
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "Okteto environments ({}): {}",
        snapshot.environments.len(),
        snapshot
            .environments
            .iter()
            .map(|e| e.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
}

/// Print the full deletion plan in execution order, one table per registry.
pub fn print_plan(plan: &Plan, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    println!();

    if plan.is_empty() {
        println!("{prefix}{} nothing to delete — registries are in sync", "✓".green());
        return;
    }

    println!(
        "{prefix}{} {} deployment(s) and {} environment(s) queued for deletion",
        "!".yellow().bold(),
        plan.deployments.len(),
        plan.environments.len()
    );

    if !plan.deployments.is_empty() {
        let rows: Vec<DeploymentRow> = plan
            .deployments
            .iter()
            .map(|p| DeploymentRow {
                id: p.deployment.id.0,
                environment: p.deployment.environment.clone(),
                branch: p.deployment.branch.0.clone(),
                created: p.deployment.created_at.to_rfc3339(),
                reason: deployment_reason(p.reason).to_string(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }

    if !plan.environments.is_empty() {
        let rows: Vec<EnvironmentRow> = plan
            .environments
            .iter()
            .map(|p| EnvironmentRow {
                name: p.environment.name.clone(),
                scope: p.environment.scope.clone(),
                reason: environment_reason(p.reason).to_string(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }
}

/// Print deletion outcomes and any failures.
pub fn print_report(report: &ExecutionReport) {
    println!();
    println!(
        "{} deleted {} deployment(s), destroyed {} environment(s)",
        "✓".green(),
        report.deleted_deployments,
        report.destroyed_environments
    );
    for failure in &report.failures {
        println!(
            "{} {} — {}",
            "✗".red().bold(),
            failure.target,
            failure.error
        );
    }
}

fn deployment_reason(reason: DeploymentReason) -> &'static str {
    match reason {
        DeploymentReason::BranchMissing => "branch missing",
        DeploymentReason::EnvironmentMissing => "preview environment missing",
    }
}

fn environment_reason(reason: EnvironmentReason) -> &'static str {
    match reason {
        EnvironmentReason::BranchCascade => "branch missing (cascade)",
        EnvironmentReason::DeploymentMissing => "deployment record missing",
    }
}
