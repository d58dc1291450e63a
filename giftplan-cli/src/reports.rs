use anyhow::Result;
use chrono::Utc;
use clap::ValueEnum;
use colored::Colorize;
use giftplan_core::{
    AnalysisOutcome, AnalyzedGift, AssignmentTable, BondPreview, BondState, CommitOutcome,
    GiftKey, SynthesisOutcome, token_flag,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

const SHARE_LISTS_UNSELECTED: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewRow {
    pub character_id: u32,
    pub name: String,
    pub gifts: BTreeMap<GiftKey, u32>,
    pub preview: BondPreview,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub locale: String,
    pub owned: BTreeMap<GiftKey, u32>,
    pub selected: Vec<u32>,
    pub assignments: AssignmentTable,
    pub bonds: BTreeMap<u32, BondState>,
    pub share_token: Option<String>,
}

/// Everything a subcommand can report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "report", rename_all = "snake_case")]
pub enum Report {
    Analysis {
        selected: Vec<u32>,
        gifts: Vec<AnalyzedGift>,
    },
    Previews {
        previews: Vec<PreviewRow>,
    },
    Assignment {
        character_id: u32,
        gift: GiftKey,
        requested: u32,
        applied: u32,
    },
    Unassigned {
        character_id: Option<u32>,
    },
    Commit {
        outcome: CommitOutcome,
    },
    Stock {
        gift: GiftKey,
        owned: u32,
        assigned: u32,
    },
    Bond {
        character_id: u32,
        state: BondState,
    },
    Synthesis {
        outcome: Option<SynthesisOutcome>,
    },
    Selection {
        selected: Vec<u32>,
        token: Option<String>,
    },
    Status(StatusReport),
}

pub fn write_report(out: &mut dyn Write, format: ReportFormat, report: &Report) -> Result<()> {
    match format {
        ReportFormat::Console => generate_console_report(out, report),
        ReportFormat::Json => generate_json_report(out, report),
        ReportFormat::Markdown => generate_markdown_report(out, report),
    }
}

pub fn generate_json_report(out: &mut dyn Write, report: &Report) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

fn outcome_label(outcome: &AnalysisOutcome) -> String {
    match outcome {
        AnalysisOutcome::Recommended { tier, .. } => format!("recommended ({})", tier.class()),
        AnalysisOutcome::Generic => "generic".to_string(),
        AnalysisOutcome::Synthesize => "synthesize".to_string(),
    }
}

fn recommended_names(outcome: &AnalysisOutcome) -> String {
    match outcome {
        AnalysisOutcome::Recommended { characters, .. } => characters
            .iter()
            .map(|c| {
                let name = if c.name.is_empty() {
                    format!("#{}", c.character_id)
                } else {
                    c.name.clone()
                };
                let star = if c.is_optimal { "*" } else { "" };
                format!("{name}{star} [{}]", c.interaction.key())
            })
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    }
}

fn join_gifts(gifts: &BTreeMap<GiftKey, u32>) -> String {
    gifts
        .iter()
        .map(|(key, qty)| format!("{key} x{qty}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_ids(ids: &[u32]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn write_console_preview(out: &mut dyn Write, row: &PreviewRow) -> Result<()> {
    let label = if row.name.is_empty() {
        format!("#{}", row.character_id)
    } else {
        format!("{} (#{})", row.name, row.character_id)
    };
    let preview = &row.preview;
    writeln!(
        out,
        "{} Lv.{} {}/exp -> Lv.{} {}/exp (+{} exp)",
        label.bold(),
        preview.level,
        preview.exp,
        preview.new_level.to_string().green(),
        preview.new_exp,
        preview.gained_exp
    )?;
    if !row.gifts.is_empty() {
        writeln!(out, "   Gifts: {}", join_gifts(&row.gifts))?;
    }
    Ok(())
}

#[allow(clippy::too_many_lines)]
pub fn generate_console_report(out: &mut dyn Write, report: &Report) -> Result<()> {
    match report {
        Report::Analysis { selected, gifts } => {
            writeln!(out, "{}", "🎁 Gift Analysis".bright_cyan().bold())?;
            writeln!(out, "{}", "================".cyan())?;
            if selected.is_empty() {
                writeln!(out, "No characters selected.")?;
                return Ok(());
            }
            writeln!(out, "Selected: {}", join_ids(selected))?;
            for entry in gifts {
                let label = outcome_label(&entry.analysis.outcome);
                let label = match entry.analysis.outcome {
                    AnalysisOutcome::Recommended { .. } => label.green(),
                    AnalysisOutcome::Generic => label.yellow(),
                    AnalysisOutcome::Synthesize => label.red(),
                };
                writeln!(
                    out,
                    "{} {} [{}] max {}",
                    entry.gift.key().to_string().bold(),
                    entry.gift.name,
                    label,
                    entry.analysis.max_value
                )?;
                let names = recommended_names(&entry.analysis.outcome);
                if !names.is_empty() {
                    writeln!(out, "   For: {names}")?;
                }
            }
        }
        Report::Previews { previews } => {
            writeln!(out, "{}", "💞 Bond Preview".bright_cyan().bold())?;
            writeln!(out, "{}", "===============".cyan())?;
            if previews.is_empty() {
                writeln!(out, "No tentative assignments.")?;
            }
            for row in previews {
                write_console_preview(out, row)?;
            }
        }
        Report::Assignment {
            character_id,
            gift,
            requested,
            applied,
        } => {
            let applied_text = if applied < requested {
                applied.to_string().yellow()
            } else {
                applied.to_string().green()
            };
            writeln!(
                out,
                "Assigned {gift} x{applied_text} to #{character_id} (requested {requested})"
            )?;
        }
        Report::Unassigned { character_id } => match character_id {
            Some(id) => writeln!(out, "Cleared assignments for #{id}")?,
            None => writeln!(out, "Cleared all assignments")?,
        },
        Report::Commit { outcome } => match outcome {
            CommitOutcome::Applied(commit) => {
                writeln!(out, "{}", "✅ Committed".green().bold())?;
                for (id, preview) in &commit.bonds {
                    writeln!(
                        out,
                        "#{id}: Lv.{} -> Lv.{} ({} exp, +{})",
                        preview.level, preview.new_level, preview.new_exp, preview.gained_exp
                    )?;
                }
                writeln!(out, "Consumed: {}", join_gifts(&commit.consumed))?;
            }
            CommitOutcome::NothingToCommit => writeln!(out, "Nothing to commit.")?,
            CommitOutcome::Deferred => writeln!(
                out,
                "{}",
                "⚠️  Reference data incomplete; nothing was changed.".yellow()
            )?,
        },
        Report::Stock {
            gift,
            owned,
            assigned,
        } => {
            writeln!(out, "{} owned {owned} (assigned {assigned})", gift.to_string().bold())?;
        }
        Report::Bond {
            character_id,
            state,
        } => {
            writeln!(
                out,
                "#{character_id} bond Lv.{} ({} exp)",
                state.level, state.exp
            )?;
        }
        Report::Synthesis { outcome } => match outcome {
            Some(result) => {
                writeln!(
                    out,
                    "🔁 Converted {} gifts into {} choice boxes",
                    result.converted,
                    result.boxes_created.to_string().green()
                )?;
                if let Some(key) = result.remainder_kept {
                    writeln!(out, "   Kept 1 unit of {key}")?;
                }
            }
            None => writeln!(out, "Not enough synthesis gifts to convert.")?,
        },
        Report::Selection { selected, token } => {
            if selected.is_empty() {
                writeln!(out, "Selection is empty.")?;
            } else {
                writeln!(out, "Selected: {}", join_ids(selected).bold())?;
            }
            if let Some(token) = token {
                let listing = match token_flag(token) {
                    Ok(SHARE_LISTS_UNSELECTED) => " (lists unselected ids)",
                    _ => "",
                };
                writeln!(out, "Share token: {}{listing}", token.cyan())?;
            }
        }
        Report::Status(status) => {
            writeln!(out, "{}", "📋 Planner Status".bright_cyan().bold())?;
            writeln!(out, "{}", "=================".cyan())?;
            writeln!(out, "Locale: {}", status.locale)?;
            writeln!(out, "Owned: {}", join_gifts(&status.owned))?;
            writeln!(out, "Selected: {}", join_ids(&status.selected))?;
            for (id, gifts) in &status.assignments {
                writeln!(out, "Assigned to #{id}: {}", join_gifts(gifts))?;
            }
            for (id, state) in &status.bonds {
                writeln!(out, "Bond #{id}: Lv.{} ({} exp)", state.level, state.exp)?;
            }
            if let Some(token) = &status.share_token {
                writeln!(out, "Share token: {}", token.cyan())?;
            }
        }
    }
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, report: &Report) -> Result<()> {
    writeln!(out, "# Gift Planner Report\n")?;
    writeln!(out, "_Generated {}_\n", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"))?;
    match report {
        Report::Analysis { selected, gifts } => {
            writeln!(out, "## Gift Analysis\n")?;
            writeln!(out, "- **Selected**: {}\n", join_ids(selected))?;
            if gifts.is_empty() {
                writeln!(out, "_No gifts analyzed._")?;
                return Ok(());
            }
            writeln!(out, "| Gift | Name | Outcome | Max value | Characters |")?;
            writeln!(out, "|------|------|---------|-----------|------------|")?;
            for entry in gifts {
                writeln!(
                    out,
                    "| {} | {} | {} | {} | {} |",
                    entry.gift.key(),
                    entry.gift.name,
                    outcome_label(&entry.analysis.outcome),
                    entry.analysis.max_value,
                    recommended_names(&entry.analysis.outcome)
                )?;
            }
        }
        Report::Previews { previews } => {
            writeln!(out, "## Bond Preview\n")?;
            writeln!(out, "| Character | Gifts | Gained | Before | After |")?;
            writeln!(out, "|-----------|-------|--------|--------|-------|")?;
            for row in previews {
                let p = &row.preview;
                writeln!(
                    out,
                    "| {} | {} | {} | Lv.{} ({}) | Lv.{} ({}) |",
                    row.character_id,
                    join_gifts(&row.gifts),
                    p.gained_exp,
                    p.level,
                    p.exp,
                    p.new_level,
                    p.new_exp
                )?;
            }
        }
        Report::Commit {
            outcome: CommitOutcome::Applied(commit),
        } => {
            writeln!(out, "## Commit\n")?;
            for (id, p) in &commit.bonds {
                writeln!(
                    out,
                    "- **#{id}**: Lv.{} -> Lv.{} (+{} exp)",
                    p.level, p.new_level, p.gained_exp
                )?;
            }
            writeln!(out, "- **Consumed**: {}", join_gifts(&commit.consumed))?;
        }
        Report::Status(status) => {
            writeln!(out, "## Status\n")?;
            writeln!(out, "- **Locale**: {}", status.locale)?;
            writeln!(out, "- **Owned**: {}", join_gifts(&status.owned))?;
            writeln!(out, "- **Selected**: {}", join_ids(&status.selected))?;
            for (id, gifts) in &status.assignments {
                writeln!(out, "- **Assigned to #{id}**: {}", join_gifts(gifts))?;
            }
            for (id, state) in &status.bonds {
                writeln!(out, "- **Bond #{id}**: Lv.{} ({} exp)", state.level, state.exp)?;
            }
        }
        other => {
            // Short results read fine as a fenced JSON block.
            writeln!(out, "```json")?;
            generate_json_report(out, other)?;
            writeln!(out, "```")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use giftplan_core::{
        CommitReport, FavorTier, Gift, GiftAnalysis, Rarity, RecommendationTier, encode_selection,
    };

    fn render(format: ReportFormat, report: &Report) -> String {
        let mut buf = Vec::new();
        write_report(&mut buf, format, report).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn analysis_report() -> Report {
        Report::Analysis {
            selected: vec![10],
            gifts: vec![AnalyzedGift {
                gift: Gift {
                    id: 6,
                    rarity: Rarity::Sr,
                    name: "Cat Plush".to_string(),
                    is_special: false,
                    exp: None,
                },
                analysis: GiftAnalysis {
                    max_value: 80,
                    outcome: AnalysisOutcome::Recommended {
                        tier: RecommendationTier::Extra,
                        characters: vec![giftplan_core::RecommendedCharacter {
                            character_id: 10,
                            name: "Aru".to_string(),
                            value: 80,
                            is_optimal: true,
                            interaction: FavorTier::Xl,
                        }],
                    },
                },
            }],
        }
    }

    #[test]
    fn json_report_is_tagged() {
        let text = render(ReportFormat::Json, &analysis_report());
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["report"], "analysis");
        assert_eq!(value["gifts"][0]["gift"]["name"], "Cat Plush");
    }

    #[test]
    fn markdown_analysis_renders_table() {
        let text = render(ReportFormat::Markdown, &analysis_report());
        assert!(text.contains("# Gift Planner Report"));
        assert!(text.contains("| sr-6 | Cat Plush |"));
        assert!(text.contains("Aru* [xl]"));
    }

    #[test]
    fn console_commit_lists_consumed_gifts() {
        let report = Report::Commit {
            outcome: CommitOutcome::Applied(CommitReport {
                bonds: BTreeMap::from([(
                    10,
                    BondPreview {
                        level: 1,
                        exp: 0,
                        gained_exp: 180,
                        new_level: 5,
                        new_exp: 30,
                    },
                )]),
                consumed: BTreeMap::from([(GiftKey::sr(1), 3)]),
            }),
        };
        let text = render(ReportFormat::Console, &report);
        assert!(text.contains("sr-1 x3"));
        assert!(text.contains("+180"));
    }

    #[test]
    fn markdown_falls_back_to_json_block() {
        let report = Report::Selection {
            selected: vec![],
            token: None,
        };
        let text = render(ReportFormat::Markdown, &report);
        assert!(text.contains("```json"));
        assert!(text.contains("\"selection\""));
    }

    #[test]
    fn console_selection_notes_complement_tokens() {
        let known = [1, 2, 3];
        let token = encode_selection(&[1, 2, 3], &known).unwrap();
        let report = Report::Selection {
            selected: vec![1, 2, 3],
            token,
        };
        let text = render(ReportFormat::Console, &report);
        assert!(text.contains("(lists unselected ids)"));

        let token = encode_selection(&[2], &known).unwrap();
        let report = Report::Selection {
            selected: vec![2],
            token,
        };
        assert!(!render(ReportFormat::Console, &report).contains("unselected"));
    }
}
