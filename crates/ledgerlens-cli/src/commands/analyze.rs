//! Analysis command implementations

use anyhow::Result;
use ledgerlens_core::ai::{AIClient, NarrativeBackend};
use ledgerlens_core::analysis::{AnalysisEngine, AnalysisKind, AnalysisRequest, NarrativeStatus};
use ledgerlens_core::db::Database;

use super::{print_summary, require_dataset, resolve_window, truncate};
use crate::cli::DateWindow;

#[allow(clippy::too_many_arguments)]
pub async fn cmd_analyze(
    db: &Database,
    ai: Option<AIClient>,
    user: &str,
    dataset_id: i64,
    kind: &str,
    prompt: Option<String>,
    focus: Option<Vec<String>>,
    window: &DateWindow,
) -> Result<i64> {
    let kind: AnalysisKind = kind.parse()?;
    let dataset = require_dataset(db, user, dataset_id)?;
    let (from, to) = resolve_window(window)?;

    let focus = focus
        .map(|f| {
            f.into_iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|f| !f.is_empty());

    println!("🔍 Running {} analysis on '{}'...", kind, dataset.name);
    match &ai {
        Some(client) => println!(
            "   🤖 Narrative backend: {} ({})",
            client.backend_name(),
            client.model()
        ),
        None => println!("   💡 Tip: Set OLLAMA_HOST for narrative insights"),
    }

    let engine = AnalysisEngine::new(db.clone(), ai);
    let request = AnalysisRequest::new(dataset.id, user, kind)
        .with_prompt(prompt)
        .with_focus(focus)
        .with_window(from, to);
    let outcome = engine.run(&request).await?;

    db.log_audit(
        user,
        "analyze",
        Some("dataset"),
        Some(dataset.id),
        Some(&format!("kind={} analysis_id={}", kind, outcome.analysis_id)),
    )?;

    let result = &outcome.result;
    println!();
    println!("📊 Figures");
    println!("   ─────────────────────────────");
    print_summary(&result.summary);

    println!();
    println!("📐 Metrics");
    println!("   ─────────────────────────────");
    println!("{}", serde_json::to_string_pretty(&result.metrics)?);

    println!();
    match (&result.narrative_status, &result.insights) {
        (NarrativeStatus::Generated, Some(insights)) => {
            println!("💬 Insights");
            println!("   ─────────────────────────────");
            println!("{}", insights);
        }
        _ => {
            println!(
                "⚠️  Narrative unavailable: {}",
                result.narrative_error.as_deref().unwrap_or("unknown reason")
            );
            println!("   The figures above are complete.");
        }
    }

    println!();
    println!("✅ Saved as analysis {}", outcome.analysis_id);

    Ok(outcome.analysis_id)
}

pub fn cmd_history(
    db: &Database,
    user: &str,
    dataset_id: Option<i64>,
    kind: Option<&str>,
    limit: i64,
) -> Result<usize> {
    let kind = kind.map(str::parse::<AnalysisKind>).transpose()?;
    let analyses = db.list_analyses(user, dataset_id, kind, limit)?;

    if analyses.is_empty() {
        println!("No analyses yet. Run one with:");
        println!("  ledgerlens analyze --dataset 1 --kind trend");
        return Ok(0);
    }

    println!();
    println!("🗂️  Analysis History");
    println!("   ─────────────────────────────────────────────────────────────");

    for analysis in &analyses {
        let narrative = match analysis.narrative_status {
            NarrativeStatus::Generated => "🤖",
            NarrativeStatus::Unavailable => "  ",
        };
        println!(
            "   {:>4} │ {} │ dataset {:>4} │ {:<11} │ {} {}",
            analysis.id,
            analysis.created_at.format("%Y-%m-%d %H:%M"),
            analysis.dataset_id,
            analysis.kind.as_str(),
            narrative,
            truncate(analysis.prompt.as_deref().unwrap_or_default(), 40)
        );
    }

    Ok(analyses.len())
}
