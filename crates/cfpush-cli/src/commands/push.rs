//! Push command.

use anyhow::{Context, Result};
use cfpush_client::CloudControllerClient;
use cfpush_config::TargetConfig;
use cfpush_deployer::{PushOperation, PushReport, RouteOutcome};
use std::sync::Arc;
use tracing::info;

use crate::ManifestArgs;

pub async fn run(target: TargetConfig, args: &ManifestArgs) -> Result<()> {
    let manifest = super::load(args)?;
    let space = target
        .space
        .context("No space selected: pass --space, set CF_SPACE_GUID or add a space node")?;

    info!(api = %target.api, space = %space, "Pushing manifest");

    let client = CloudControllerClient::with_options(
        target.api.clone(),
        target.token.clone(),
        target.skip_ssl_validation,
    )?;
    let operation = PushOperation::new(Arc::new(client));

    let reports = operation
        .push(&space, &manifest)
        .await
        .with_context(|| format!("Push of {} failed", args.manifest.display()))?;

    for report in &reports {
        println!("{}", summarize(report));
    }
    println!("\nPushed {} application(s)", reports.len());

    Ok(())
}

fn summarize(report: &PushReport) -> String {
    let routes = match &report.routes {
        RouteOutcome::Unmapped { count } => format!("unmapped {} route(s)", count),
        RouteOutcome::DefaultCreated(route) => match route.port {
            Some(port) => format!("default route on port {}", port),
            None => format!("default route {}", route.host),
        },
        RouteOutcome::Reconciled {
            created,
            associated,
            unchanged,
        } => format!(
            "routes: {} created, {} associated, {} unchanged",
            created.len(),
            associated.len(),
            unchanged
        ),
    };

    format!(
        "✓ {} ({}, {}, {} service binding(s), state {:?})",
        report.app.name,
        report.action,
        routes,
        report.bindings.len(),
        report.app.state
    )
}
