//! Synthetic review data for demonstrating the report without a database.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use review_report::charts::SiteBranding;
use review_report::report::{
    PerformancePeriod, QuestionnaireRow, ReportInputs, ResponseRow, ResponseStatus, UserRow,
};
use review_report::scoring::{AnswerValue, AnswersByLinkId, ItemType, QuestionItem, SectionDef};

const TEAM: [(&str, Option<&str>); 8] = [
    ("Avery Chen", Some("Engineering")),
    ("Jordan Patel", Some("Engineering")),
    ("Sam Rivera", Some("Customer Success")),
    ("Riley Okafor", Some("Customer Success")),
    ("Morgan Schmidt", Some("Sales")),
    ("Casey Novak", Some("Sales")),
    ("Taylor Brooks", Some("Operations")),
    ("Quinn Adeyemi", None),
];

pub fn demo_branding() -> SiteBranding {
    SiteBranding {
        site_name: Some("Northwind Reviews".to_string()),
        primary_color: Some("#2f6f4e".to_string()),
        light_color: None,
        dark_color: None,
    }
}

fn annual_review() -> QuestionnaireRow {
    QuestionnaireRow {
        id: 1,
        title: "Annual Performance Review".to_string(),
        sections: vec![
            SectionDef { id: 10, title: "Delivery".to_string() },
            SectionDef { id: 11, title: "Collaboration".to_string() },
            SectionDef { id: 12, title: "Growth".to_string() },
        ],
        items: vec![
            QuestionItem::new(1, "intro", ItemType::Display),
            QuestionItem::new(2, "quality", ItemType::Likert).in_section(10),
            QuestionItem::new(3, "ownership", ItemType::Likert).in_section(10),
            QuestionItem::new(4, "teamwork", ItemType::Likert).in_section(11),
            QuestionItem::new(5, "feedback", ItemType::Likert).in_section(11),
            QuestionItem::new(6, "learning", ItemType::Likert).in_section(12),
            QuestionItem::new(7, "goals_met", ItemType::Boolean).in_section(12),
        ],
    }
}

fn pulse_check() -> QuestionnaireRow {
    QuestionnaireRow {
        id: 2,
        title: "Quarterly Pulse Check".to_string(),
        sections: Vec::new(),
        items: vec![
            QuestionItem::new(20, "workload", ItemType::Boolean).with_weight(40.0),
            QuestionItem::new(21, "focus", ItemType::Choice).with_weight(30.0),
            QuestionItem::new(22, "comment", ItemType::Textarea).with_weight(30.0),
        ],
    }
}

fn periods() -> Vec<PerformancePeriod> {
    [(1, "2024 H1", (2024, 1, 1)), (2, "2024 H2", (2024, 7, 1)), (3, "2025 H1", (2025, 1, 1))]
        .into_iter()
        .map(|(id, label, (year, month, day))| PerformancePeriod {
            id,
            label: label.to_string(),
            start_date: NaiveDate::from_ymd_opt(year, month, day),
        })
        .collect()
}

/// Deterministic pseudo-random Likert value in 1..=5.
fn likert(seed: usize) -> AnswerValue {
    AnswerValue::Integer(((seed * 7 + 3) % 5 + 1) as i64)
}

fn review_answers(seed: usize) -> AnswersByLinkId {
    let mut answers = AnswersByLinkId::new();
    for (offset, link_id) in ["quality", "ownership", "teamwork", "feedback", "learning"]
        .into_iter()
        .enumerate()
    {
        answers.insert(link_id.to_string(), vec![likert(seed + offset * 3)]);
    }
    answers.insert("goals_met".to_string(), vec![AnswerValue::Boolean(seed % 3 != 0)]);
    answers
}

fn pulse_answers(seed: usize) -> AnswersByLinkId {
    let mut answers = AnswersByLinkId::new();
    answers.insert("workload".to_string(), vec![AnswerValue::text(if seed % 2 == 0 { "yes" } else { "no" })]);
    answers.insert("focus".to_string(), vec![AnswerValue::coding("delivery", "Delivery")]);
    if seed % 4 != 1 {
        answers.insert("comment".to_string(), vec![AnswerValue::text("Steady quarter.")]);
    }
    answers
}

/// A small organisation with two questionnaires over three review periods.
pub fn demo_inputs(now: DateTime<Utc>) -> ReportInputs {
    let users: Vec<UserRow> = TEAM
        .iter()
        .enumerate()
        .map(|(index, (name, function))| UserRow {
            id: index as i64 + 1,
            name: name.to_string(),
            work_function: function.map(str::to_string),
        })
        .collect();

    let base = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).single().unwrap_or(now);
    let mut responses = Vec::new();
    let mut next_id = 1;
    for (period_index, period) in periods().into_iter().enumerate() {
        for user in &users {
            let seed = next_id as usize + period_index;
            let submitted_at = base + Duration::days(period_index as i64 * 182 + user.id);
            responses.push(ResponseRow {
                id: next_id,
                questionnaire_id: 1,
                user_id: user.id,
                status: if seed % 11 == 0 { ResponseStatus::Draft } else { ResponseStatus::Submitted },
                submitted_at: Some(submitted_at),
                period: Some(period.clone()),
                answers: review_answers(seed),
            });
            next_id += 1;
        }
    }
    for user in users.iter().take(5) {
        responses.push(ResponseRow {
            id: next_id,
            questionnaire_id: 2,
            user_id: user.id,
            status: ResponseStatus::Submitted,
            submitted_at: Some(now),
            period: None,
            answers: pulse_answers(next_id as usize),
        });
        next_id += 1;
    }

    ReportInputs {
        questionnaires: vec![annual_review(), pulse_check()],
        responses,
        users,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_covers_every_period_and_user() {
        let inputs = demo_inputs(Utc::now());
        assert_eq!(inputs.questionnaires.len(), 2);
        assert_eq!(inputs.users.len(), TEAM.len());
        assert_eq!(inputs.responses.len(), TEAM.len() * 3 + 5);
        assert!(inputs.responses.iter().any(|response| !response.is_submitted()));
    }
}
