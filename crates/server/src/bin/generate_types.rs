use std::{fs, path::PathBuf};

use ts_rs::TS;

fn generate_types_content() -> String {
    let decls = [
        db::models::user::User::decl(),
        db::models::user::CreateUser::decl(),
        db::models::family::FamilyRole::decl(),
        db::models::family::Family::decl(),
        db::models::family::FamilyMembership::decl(),
        db::models::family::CreateFamily::decl(),
        db::models::family::AddFamilyMember::decl(),
        db::models::goal::GoalStatus::decl(),
        db::models::goal::Goal::decl(),
        db::models::goal::CreateGoal::decl(),
        db::models::goal::UpdateGoal::decl(),
        db::models::weekly_review::WeeklyReview::decl(),
        db::models::weekly_review::CreateWeeklyReview::decl(),
        db::models::weekly_review::UpdateWeeklyReview::decl(),
        db::models::daily_plan::DailyPlan::decl(),
        db::models::daily_plan::TopPriority::decl(),
        db::models::daily_plan::DailyPlanWithPriorities::decl(),
        db::models::daily_plan::CreateDailyPlan::decl(),
        db::models::daily_plan::UpdateDailyPlan::decl(),
        db::models::daily_plan::CreateTopPriority::decl(),
        db::models::daily_plan::UpdateTopPriority::decl(),
        db::models::mention::MentionableType::decl(),
        db::models::mention::Mention::decl(),
    ];

    let body = decls
        .into_iter()
        .map(|decl| format!("export {decl}"))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "// This file was generated by `generate_types`. Do not edit it by hand.\n\n{body}\n"
    )
}

fn main() -> anyhow::Result<()> {
    let check_mode = std::env::args().any(|arg| arg == "--check");
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../shared/types.ts");
    let generated = generate_types_content();

    if check_mode {
        let current = fs::read_to_string(&path).unwrap_or_default();
        if current == generated {
            println!("shared/types.ts is up to date.");
            return Ok(());
        }
        anyhow::bail!("shared/types.ts is out of date, run `cargo run --bin generate_types`");
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, generated)?;
    println!("Generated {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exports_mention_types() {
        let content = generate_types_content();
        assert!(content.contains("export type Mention = "));
        assert!(content.contains("export type MentionableType = "));
        assert!(content.contains("\"weekly_review\""));
    }
}
