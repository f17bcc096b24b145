//! `advisory query` command handler

use std::io::Write;

use serde::Serialize;
use tracing::{debug, info};

use advisory_schema::event::{Detection, EventKind};
use advisory_schema::{Advisory, Document, DocumentLoader, PackageAdvisory, SchemaConfig};

use crate::cli::QueryArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `query` command.
///
/// Without `--exact` the first advisory whose ID or alias equals any of the
/// given IDs is returned. With `--exact` only advisory IDs are matched, using
/// the first given ID.
///
/// # Errors
///
/// Returns `CliError::Schema` if the document cannot be loaded and
/// `CliError::Command` if no advisory matches.
pub async fn execute(
    args: QueryArgs,
    config: SchemaConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(file = %args.file.display(), ids = ?args.vuln_ids, "querying advisory document");

    let file = args.file.clone();
    let loaded = tokio::task::spawn_blocking(move || DocumentLoader::new(config).load_file(&file))
        .await
        .map_err(|e| CliError::Command(format!("load task failed: {e}")))??;

    let matched = find(&loaded.document, &args.vuln_ids, args.exact).ok_or_else(|| {
        CliError::Command(format!(
            "no advisory in {} matches {}",
            args.file.display(),
            args.vuln_ids.join(", ")
        ))
    })?;
    debug!(id = %matched.advisory.id, "found advisory");

    writer.render(&AdvisoryMatch(matched))?;
    Ok(())
}

fn find(document: &Document, ids: &[String], exact: bool) -> Option<PackageAdvisory> {
    let advisory: Option<&Advisory> = if exact {
        ids.first().and_then(|id| document.advisories.get(id))
    } else {
        document.advisories.get_by_any_vulnerability(ids)
    };
    advisory.map(|adv| PackageAdvisory::new(document.name(), adv.clone()))
}

/// Query result; serializes as the flattened [`PackageAdvisory`].
#[derive(Serialize)]
#[serde(transparent)]
pub struct AdvisoryMatch(pub PackageAdvisory);

impl Render for AdvisoryMatch {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let PackageAdvisory {
            package_name,
            advisory,
        } = &self.0;

        writeln!(w, "Package:  {}", package_name.bold())?;
        writeln!(w, "Advisory: {}", advisory.id.bold())?;
        if !advisory.aliases.is_empty() {
            writeln!(w, "Aliases:  {}", advisory.aliases.join(", "))?;
        }

        let status = match advisory.latest_event() {
            Some(event) if advisory.resolved() => event.kind.type_name().green(),
            Some(event) => event.kind.type_name().yellow(),
            None => "no events".dimmed(),
        };
        writeln!(w, "Status:   {}", status)?;

        let events = advisory.sorted_events();
        if !events.is_empty() {
            writeln!(w)?;
            writeln!(w, "Events:")?;
        }
        for event in events {
            writeln!(
                w,
                "  {}  {}{}",
                event.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
                event.kind.type_name(),
                summary(&event.kind)
            )?;
        }
        Ok(())
    }
}

/// One-line payload summary shown next to the event type.
fn summary(kind: &EventKind) -> String {
    match kind {
        EventKind::Fixed(fixed) => format!(" ({})", fixed.fixed_version),
        EventKind::Detection(Detection::NvdApi(nvd)) => format!(" (nvdapi: {})", nvd.cpe_found),
        EventKind::Detection(Detection::ScanV1(scan)) => format!(
            " (scan/v1: {} {} via {})",
            scan.component_name, scan.component_version, scan.scanner
        ),
        EventKind::Detection(Detection::Manual) => " (manual)".to_owned(),
        EventKind::FalsePositiveDetermination(fp) => format!(" ({})", fp.kind.as_str()),
        EventKind::TruePositiveDetermination(_) => String::new(),
        EventKind::AnalysisNotPlanned(j)
        | EventKind::FixNotPlanned(j)
        | EventKind::PendingUpstreamFix(j) => format!(": {}", j.note),
    }
}
