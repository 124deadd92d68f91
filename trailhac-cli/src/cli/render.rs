//! Report rendering for the `run` command.

use std::io::{self, Write};

use trailhac_core::{SkipReason, SkippedLevel};

use super::commands::{ExecutionSummary, OutputFormat};

/// Renders `summary` to `writer` in the requested format.
///
/// The human format prints one row per scored level, the skipped levels and
/// the members of every community at the best level. The JSON format
/// serialises the whole summary.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(
    summary: &ExecutionSummary,
    format: OutputFormat,
    mut writer: impl Write,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, summary)?;
            writeln!(writer)
        }
        OutputFormat::Human => render_human(summary, writer),
    }
}

fn render_human(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    let report = &summary.report;
    let criterion = report.criterion();
    writeln!(
        writer,
        "graph: {} ({} nodes, {} edges, {} bases)",
        summary.graph, summary.nodes, summary.edges, summary.bases
    )?;
    writeln!(
        writer,
        "merges: {}, criterion: {}",
        report.linkage().merge_count(),
        criterion.as_str()
    )?;
    writeln!(writer)?;
    writeln!(
        writer,
        "{:>5}  {:>10}  {:>11}  {:>8}  {:>10}  {:>12}",
        "level", "distance", "communities", "overlap", "unassigned", "score"
    )?;
    for level in report.levels() {
        let scores = &level.scores;
        writeln!(
            writer,
            "{:>5}  {:>10}  {:>11}  {:>8.4}  {:>10.4}  {:>12.6}",
            level.level,
            format_distance(level.distance),
            scores.community_count,
            scores.overlap_ratio,
            scores.unassigned_ratio,
            criterion.value(scores),
        )?;
    }
    for skipped in report.skipped() {
        writeln!(writer, "{}", describe_skip(skipped))?;
    }

    match report.best_level() {
        Some(best) => {
            writeln!(writer, "best level: {}", best.level)?;
            for (index, community) in best.communities.iter().enumerate() {
                let members: Vec<String> = community.iter().map(ToString::to_string).collect();
                writeln!(writer, "  community {index}: {}", members.join(" "))?;
            }
        }
        None => writeln!(writer, "best level: none")?,
    }
    Ok(())
}

fn format_distance(distance: Option<f64>) -> String {
    distance.map_or_else(|| "-".to_owned(), |value| format!("{value:.4}"))
}

fn describe_skip(skipped: &SkippedLevel) -> String {
    let reason = match &skipped.reason {
        SkipReason::BelowMinDistance => "below minimum merge distance".to_owned(),
        SkipReason::NonPositiveDistance => "non-positive merge distance".to_owned(),
        SkipReason::CommunityCountOutsideWindow { count } => {
            format!("{count} communities outside expected range")
        }
        SkipReason::ScoringFailed { code, message } => format!("scoring failed [{code}]: {message}"),
        other => format!("{other:?}"),
    };
    format!(
        "skipped level {} (distance {}): {reason}",
        skipped.level,
        format_distance(skipped.distance)
    )
}
