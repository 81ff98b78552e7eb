//! Console reporter with colored output

use crate::access::{AccessDecision, ConfigIssue};
use crate::quiz::{Eligibility, QuizOutcome, QuizScorer};
use crate::{AccessTier, Archetype, QuizResult};
use colored::{ColoredString, Colorize};

const BAR_WIDTH: usize = 20;

/// Reporter for terminal output
pub struct ConsoleReporter {
    /// Whether to use colors
    use_colors: bool,
    /// Whether to show tallies and descriptions
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self {
            use_colors: true,
            verbose: false,
        }
    }

    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Render a scored result (no retake information)
    pub fn render_result(&self, result: &QuizResult) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Entrepreneurial DNA: {}\n",
            self.colorize_archetype(result.archetype)
        ));
        out.push_str(&format!(
            "Awareness:          {} {}%\n",
            awareness_bar(result.awareness_percentage),
            result.awareness_percentage
        ));
        if self.verbose {
            out.push_str(&format!(
                "Tally:              architect {} / alchemist {} / aware {}\n",
                result.architect_score, result.alchemist_score, result.awareness_score
            ));
            out.push_str(&format!(
                "                    {}\n",
                QuizScorer::archetype_description(result.archetype)
            ));
        }
        out
    }

    pub fn render_outcome(&self, outcome: &QuizOutcome) -> String {
        let mut out = String::new();
        if !outcome.stored {
            out.push_str(&format!(
                "{}\n",
                self.paint(
                    "Retake not yet available - showing your previous result".to_string(),
                    |s| s.yellow()
                )
            ));
        }
        out.push_str(&self.render_result(&outcome.result));
        out.push_str(&format!(
            "Taken:              {}\n",
            outcome.taken_at.format("%Y-%m-%d %H:%M UTC")
        ));
        out.push_str(&self.render_eligibility(&Eligibility {
            can_retake: outcome.can_retake,
            next_retake_date: outcome.next_retake_date,
        }));
        out
    }

    pub fn render_eligibility(&self, eligibility: &Eligibility) -> String {
        match (eligibility.can_retake, eligibility.next_retake_date) {
            (true, _) => format!(
                "Retake:             {}\n",
                self.paint("available now".to_string(), |s| s.green())
            ),
            (false, Some(next)) => format!(
                "Retake:             available from {}\n",
                next.format("%Y-%m-%d")
            ),
            (false, None) => "Retake:             not available\n".to_string(),
        }
    }

    pub fn render_decision(&self, subject: &str, decision: &AccessDecision) -> String {
        let verdict = if decision.has_access {
            self.paint("granted".to_string(), |s| s.green().bold())
        } else {
            self.paint("denied".to_string(), |s| s.red().bold())
        };
        let mut out = format!(
            "Access to {} for tier '{}': {}\n",
            subject, decision.current_tier, verdict
        );
        if let Some(required) = decision.required_tier {
            out.push_str(&format!("  Requires: {}\n", required));
        }
        if let Some(target) = decision.upgrade_target {
            out.push_str(&format!(
                "  Upgrade to {} ({}) to unlock it\n",
                self.paint(target.to_string(), |s| s.cyan()),
                tier_label(target)
            ));
        }
        out
    }

    pub fn render_courses(&self, tier: &str, courses: &[String]) -> String {
        if courses.is_empty() {
            return format!("No courses available for tier '{}'\n", tier);
        }
        let mut out = format!("Courses for tier '{}' ({}):\n", tier, courses.len());
        for course in courses {
            out.push_str(&format!("  - {}\n", course));
        }
        out
    }

    pub fn render_issues(&self, issues: &[ConfigIssue]) -> String {
        if issues.is_empty() {
            return format!(
                "{}\n",
                self.paint("Access configuration is consistent".to_string(), |s| s.green())
            );
        }
        let mut out = format!(
            "{}\n",
            self.paint(
                format!("{} access configuration issue(s):", issues.len()),
                |s| s.red().bold()
            )
        );
        for issue in issues {
            out.push_str(&format!("  - {}\n", issue));
        }
        out
    }

    fn colorize_archetype(&self, archetype: Archetype) -> ColoredString {
        let label = archetype.to_string();
        if !self.use_colors {
            return label.normal();
        }
        match archetype {
            Archetype::Architect => label.blue().bold(),
            Archetype::Alchemist => label.magenta().bold(),
            Archetype::BlurredIdentity => label.yellow().bold(),
            Archetype::UnfocusedPotential => label.white().bold(),
        }
    }

    fn paint(&self, text: String, style: impl Fn(ColoredString) -> ColoredString) -> ColoredString {
        if self.use_colors {
            style(text.normal())
        } else {
            text.normal()
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Text bar such as `[##############------]`
pub fn awareness_bar(percentage: u8) -> String {
    let filled = (usize::from(percentage.min(100)) * BAR_WIDTH) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

/// Human label for a tier used in upgrade prompts
pub fn tier_label(tier: AccessTier) -> &'static str {
    match tier {
        AccessTier::Beginner => "Entry",
        AccessTier::Intermediate => "Intermediate",
        AccessTier::Advanced => "Advanced",
        AccessTier::Mastermind => "Mastermind (£100K Club)",
    }
}
