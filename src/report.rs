/// Report logic behind the analysis and chat tabs

use crate::analysis::{Action, CommentSummary, Stats};
use crate::settings::Settings;

/// Counters and percentages shown in the analysis tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub total: u64,
    pub filtered: u64,
    pub safe: u64,
    pub safe_percent: u32,
    pub filtered_percent: u32,
}

impl Summary {
    pub fn from_stats(stats: &Stats) -> Summary {
        let total = stats.total_comments.unwrap_or(0);
        let filtered = stats.filtered_count.unwrap_or(0);
        let safe = total.saturating_sub(filtered);

        Summary {
            total,
            filtered,
            safe,
            safe_percent: percent(safe, total),
            filtered_percent: percent(filtered, total),
        }
    }
}

fn percent(part: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}

/// Format a count with comma thousands separators
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// How a comment appears in the chat feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEntry {
    Visible(String),
    HiddenByPolicy,
    HiddenByBlacklist,
}

impl FeedEntry {
    /// A blacklist word in the original text hides the comment before the
    /// service's AUTO_HIDE is considered.
    pub fn classify(comment: &CommentSummary, settings: &Settings) -> FeedEntry {
        if settings.black_list.matches_text(&comment.original) {
            FeedEntry::HiddenByBlacklist
        } else if comment.action == Action::AutoHide {
            FeedEntry::HiddenByPolicy
        } else {
            FeedEntry::Visible(comment.processed.clone())
        }
    }

    pub fn is_hidden(&self) -> bool {
        !matches!(self, FeedEntry::Visible(_))
    }

    pub fn text(&self) -> &str {
        match self {
            FeedEntry::Visible(text) => text,
            FeedEntry::HiddenByPolicy => "🛡️ 규정 위반으로 숨겨진 메시지입니다.",
            FeedEntry::HiddenByBlacklist => "🚫 사용자 블랙리스트 단어가 포함되어 숨겨졌습니다.",
        }
    }
}

/// Two letters after the leading '@' of a handle, uppercased
pub fn avatar_initials(author: &str) -> String {
    author.chars().skip(1).take(2).collect::<String>().to_uppercase()
}
