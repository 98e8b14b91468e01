use std::fmt::Write as _;

use hq_core::household::{ActionEntry, Availability};
use hq_core::ledger::{Acknowledgment, Amount, HistoryRecord, Receipt, UserId};
use hq_core::rotation::WeekInfo;
use hq_core::view::{turn_label, Dashboard, VaultLine};

const BAR_WIDTH: usize = 20;

/// Who is using the dashboard right now. Passed into every view instead of
/// living in shared state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub active: UserId,
}

impl Session {
    pub fn new(active: impl Into<UserId>) -> Self {
        Self {
            active: active.into(),
        }
    }

    pub fn is_active(&self, user: &str) -> bool {
        self.active == user
    }
}

pub fn dashboard(dash: &Dashboard) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "🍯 Pot £{}   📅 Wk {}   Turn: {}",
        dash.pot,
        dash.week.week,
        turn_label(&dash.week)
    );
    let _ = writeln!(out, "{}", "─".repeat(40));
    let _ = writeln!(out, "{}'s Dashboard", dash.user);
    let _ = writeln!(out, "💵 Wallet £{}   ⭐ XP {}", dash.wallet, dash.xp);
    out.push('\n');

    let off_duty = dash
        .actions
        .iter()
        .any(|entry| entry.availability == Availability::NotYourWeek);
    if off_duty {
        let _ = writeln!(out, "  Not your week!");
    }
    for entry in &dash.actions {
        if entry.availability == Availability::NotYourWeek {
            continue;
        }
        let _ = writeln!(out, "{}", action_line(entry));
    }
    out
}

fn action_line(entry: &ActionEntry) -> String {
    let note = match entry.availability {
        Availability::Open => "",
        Availability::NotYourWeek => "  (not your week)",
        Availability::Locked => "  (locked)",
        Availability::Unaffordable => "  (not enough cash)",
    };
    format!("  {:<12} {}{}", entry.action.key(), entry.label, note)
}

pub fn acknowledgment(receipt: &Receipt) -> String {
    match receipt.acknowledgment {
        Acknowledgment::Celebrate(value) => format!("✅ Earned £{value}!"),
        Acknowledgment::Neutral(value) => format!("🔻 Spent £{value}"),
        Acknowledgment::Silent => format!("✔ {}", receipt.record.msg),
    }
}

pub fn progress_bar(progress: f64) -> String {
    let filled = (progress.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        progress * 100.0
    )
}

pub fn vault(lines: &[VaultLine], session: &Session, deposit_range: (Amount, Amount)) -> String {
    let mut out = String::from("🏆 Savings\n");
    for line in lines {
        let _ = writeln!(out, "{}: £{} / £{}", line.user, line.vault, line.goal);
        let _ = writeln!(out, "  {}", progress_bar(line.progress));
        if session.is_active(&line.user) {
            let _ = writeln!(
                out,
                "  🔒 hq deposit <{}-{}>",
                deposit_range.0, deposit_range.1
            );
        }
    }
    out
}

pub fn history(records: &[HistoryRecord]) -> String {
    if records.is_empty() {
        return "📊 History\n  (empty)\n".to_string();
    }
    let user_width = records
        .iter()
        .map(|r| r.user.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);
    let mut out = String::from("📊 History\n");
    let _ = writeln!(out, "{:<11}  {:<user_width$}  {:>5}  Msg", "Date", "User", "Val");
    for record in records {
        let _ = writeln!(
            out,
            "{:<11}  {:<user_width$}  {:>5}  {}",
            record.date, record.user, record.val, record.msg
        );
    }
    out
}

pub fn week(info: &WeekInfo) -> String {
    format!(
        "📅 Week {}\n  on duty: {}\n  living room unlocked: {}\n",
        info.week, info.on_duty_adult, info.unlocked_child
    )
}
