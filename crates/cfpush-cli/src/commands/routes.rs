//! Offline route inspection.

use anyhow::Result;
use cfpush_config::Manifest;
use cfpush_deployer::parse_route;

use crate::ManifestArgs;

/// Print how every declared route splits into location, port and path.
pub fn show(args: &ManifestArgs) -> Result<()> {
    let manifest = super::load(args)?;
    for line in describe(&manifest) {
        println!("{}", line);
    }
    Ok(())
}

fn describe(manifest: &Manifest) -> Vec<String> {
    let mut lines = Vec::new();

    for app in &manifest.applications {
        lines.push(format!("{}:", app.name));
        if app.no_route {
            lines.push("  no-route (all routes will be unmapped)".to_string());
            continue;
        }
        if app.routes.is_empty() {
            let kind = if app.random_route { "random" } else { "default" };
            lines.push(format!(
                "  (none declared, a {} route is created only if the app has no routes yet)",
                kind
            ));
            continue;
        }

        for declaration in &app.routes {
            lines.push(match parse_route(&declaration.route) {
                Ok(parsed) => format!(
                    "  {:<40} location={} port={} path={}",
                    declaration.route,
                    parsed.location,
                    parsed
                        .port
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    if parsed.path.is_empty() { "-" } else { &parsed.path }
                ),
                Err(e) => format!("  {:<40} error: {}", declaration.route, e),
            });
        }
    }

    lines
}
