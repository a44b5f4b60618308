use super::inputs::{QuestionnaireRow, ReportInputs, ResponseRow, UserRow};
use super::views::{
    truncate_label, ChartPoint, QuestionnaireSummary, ReportSnapshot, SectionBreakdown, SummaryCounts,
    UserBreakdownEntry, WorkFunctionSummary, CHART_LABEL_LIMIT,
};
use crate::i18n::{PassThrough, Translate};
use crate::scoring::{
    aggregate_series, compute_section_breakdown, even_likert_weights, score_response,
    MeanAccumulator, ResponseAnswers, ScoredResponse, WeightCache, DEFAULT_TOTAL_WEIGHT,
    SERIES_LIMIT,
};
use chrono::{DateTime, NaiveDate, Utc};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info};

pub const USER_BREAKDOWN_LIMIT: usize = 15;

static PASS_THROUGH: PassThrough = PassThrough;

/// A submitted response joined with its questionnaire, user and score.
struct ScoredRow<'a> {
    scored: ScoredResponse,
    response: &'a ResponseRow,
    questionnaire: &'a QuestionnaireRow,
    user: Option<&'a UserRow>,
}

impl AsRef<ScoredResponse> for ScoredRow<'_> {
    fn as_ref(&self) -> &ScoredResponse {
        &self.scored
    }
}

impl ScoredRow<'_> {
    fn user_name(&self) -> String {
        self.user
            .map(|user| user.name.clone())
            .unwrap_or_else(|| format!("User #{}", self.response.user_id))
    }

    fn work_function(&self) -> Option<&str> {
        self.user
            .and_then(|user| user.work_function.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Turns pre-fetched rows into a [`ReportSnapshot`]. Performs no I/O.
pub struct SnapshotBuilder<'a> {
    inputs: &'a ReportInputs,
    translator: &'a dyn Translate,
    generated_at: DateTime<Utc>,
}

impl<'a> SnapshotBuilder<'a> {
    pub fn new(inputs: &'a ReportInputs) -> Self {
        Self {
            inputs,
            translator: &PASS_THROUGH,
            generated_at: Utc::now(),
        }
    }

    pub fn with_translator(mut self, translator: &'a dyn Translate) -> Self {
        self.translator = translator;
        self
    }

    pub fn generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = at;
        self
    }

    /// Builds the snapshot for `questionnaire_filter`, falling back to the
    /// first questionnaire when the filter is absent or unknown.
    pub fn build(&self, questionnaire_filter: Option<i64>, include_details: bool) -> ReportSnapshot {
        let questionnaires: HashMap<i64, &QuestionnaireRow> = self
            .inputs
            .questionnaires
            .iter()
            .map(|questionnaire| (questionnaire.id, questionnaire))
            .collect();
        let users: HashMap<i64, &UserRow> =
            self.inputs.users.iter().map(|user| (user.id, user)).collect();

        let rows = self.score_rows(&questionnaires, &users);
        let summary = self.summary(&rows);
        let total_participants = rows
            .iter()
            .map(|row| row.response.user_id)
            .collect::<HashSet<_>>()
            .len();

        let selected = questionnaire_filter
            .filter(|id| questionnaires.contains_key(id))
            .or_else(|| self.inputs.questionnaires.first().map(|q| q.id));
        if questionnaire_filter.is_some() && selected != questionnaire_filter {
            debug!(?questionnaire_filter, ?selected, "questionnaire filter not found, using fallback");
        }
        let selected_questionnaire = selected.and_then(|id| questionnaires.get(&id).copied());

        let unassigned = self.translator.translate("Unassigned");
        let chart_labels = questionnaire_chart_labels(&self.inputs.questionnaires);
        let snapshot = ReportSnapshot {
            summary,
            total_participants,
            questionnaires: self.questionnaire_summaries(&rows),
            work_functions: work_function_summaries(&rows, &unassigned),
            selected_questionnaire_id: selected,
            selected_questionnaire_title: selected_questionnaire.map(|q| q.title.clone()),
            section_breakdowns: selected_questionnaire
                .map(|questionnaire| self.section_breakdowns(questionnaire, &rows))
                .unwrap_or_default(),
            user_breakdown: include_details.then(|| self.user_breakdown(&rows, &unassigned)),
            questionnaire_chart: aggregate_series(&rows, |row| {
                chart_labels.get(&row.questionnaire.id).cloned()
            }),
            work_function_chart: aggregate_series(&rows, |row| {
                Some(
                    row.work_function()
                        .map(str::to_string)
                        .unwrap_or_else(|| unassigned.clone()),
                )
            }),
            period_chart: period_series(rows.iter()),
            period_chart_selected: period_series(
                rows.iter()
                    .filter(|row| Some(row.questionnaire.id) == selected),
            ),
            generated_at: self.generated_at,
        };

        info!(
            questionnaires = snapshot.summary.questionnaires,
            scored_responses = rows.len(),
            participants = snapshot.total_participants,
            selected_questionnaire = ?snapshot.selected_questionnaire_id,
            "report snapshot built"
        );

        snapshot
    }

    fn score_rows(
        &self,
        questionnaires: &HashMap<i64, &'a QuestionnaireRow>,
        users: &HashMap<i64, &'a UserRow>,
    ) -> Vec<ScoredRow<'a>> {
        let mut cache = WeightCache::new();
        let mut rows = Vec::new();

        for response in self.inputs.responses.iter().filter(|r| r.is_submitted()) {
            let Some(questionnaire) = questionnaires.get(&response.questionnaire_id).copied() else {
                debug!(response_id = response.id, "skipping response for unknown questionnaire");
                continue;
            };

            let weights = cache.likert_weights(questionnaire.id, &questionnaire.items);
            let scored = score_response(
                response.id,
                questionnaire.id,
                &questionnaire.items,
                weights,
                &response.answers,
            );

            rows.push(ScoredRow {
                scored,
                response,
                questionnaire,
                user: users.get(&response.user_id).copied(),
            });
        }

        rows
    }

    fn summary(&self, rows: &[ScoredRow<'_>]) -> SummaryCounts {
        let total_responses = self.inputs.responses.len();
        let submitted_responses = self
            .inputs
            .responses
            .iter()
            .filter(|response| response.is_submitted())
            .count();

        let mut overall = MeanAccumulator::default();
        for row in rows {
            overall.push(f64::from(row.scored.percentage));
        }

        SummaryCounts {
            questionnaires: self.inputs.questionnaires.len(),
            total_responses,
            submitted_responses,
            draft_responses: total_responses - submitted_responses,
            average_score: overall.mean(),
        }
    }

    fn questionnaire_summaries(&self, rows: &[ScoredRow<'_>]) -> Vec<QuestionnaireSummary> {
        self.inputs
            .questionnaires
            .iter()
            .map(|questionnaire| {
                let mut mean = MeanAccumulator::default();
                let mut participants = HashSet::new();
                for row in rows.iter().filter(|row| row.questionnaire.id == questionnaire.id) {
                    mean.push(f64::from(row.scored.percentage));
                    participants.insert(row.response.user_id);
                }

                QuestionnaireSummary {
                    id: questionnaire.id,
                    title: questionnaire.title.clone(),
                    responses: mean.count(),
                    participants: participants.len(),
                    average_score: mean.mean(),
                }
            })
            .collect()
    }

    fn section_breakdowns(
        &self,
        questionnaire: &QuestionnaireRow,
        rows: &[ScoredRow<'_>],
    ) -> Vec<SectionBreakdown> {
        let selected: Vec<(String, Option<&str>, &ScoredRow<'_>)> = rows
            .iter()
            .filter(|row| row.questionnaire.id == questionnaire.id)
            .map(|row| {
                let title = match row.response.submitted_at {
                    Some(at) => format!("{} ({})", row.user_name(), at.format("%Y-%m-%d")),
                    None => row.user_name(),
                };
                let period = row.response.period.as_ref().map(|period| period.label.as_str());
                (title, period, row)
            })
            .collect();

        let answers: Vec<ResponseAnswers<'_>> = selected
            .iter()
            .map(|(title, period, row)| ResponseAnswers {
                title: title.as_str(),
                period: *period,
                answers: &row.response.answers,
            })
            .collect();

        let weights = even_likert_weights(&questionnaire.items, DEFAULT_TOTAL_WEIGHT);
        compute_section_breakdown(
            &questionnaire.items,
            &questionnaire.sections,
            &weights,
            &answers,
            &self.translator.translate("General"),
        )
    }

    fn user_breakdown(&self, rows: &[ScoredRow<'_>], unassigned: &str) -> Vec<UserBreakdownEntry> {
        let mut by_user: BTreeMap<i64, (String, Option<String>, MeanAccumulator)> = self
            .inputs
            .users
            .iter()
            .map(|user| {
                (
                    user.id,
                    (user.name.clone(), user.work_function.clone(), MeanAccumulator::default()),
                )
            })
            .collect();

        for row in rows {
            let entry = by_user.entry(row.response.user_id).or_insert_with(|| {
                (
                    row.user_name(),
                    row.work_function().map(str::to_string),
                    MeanAccumulator::default(),
                )
            });
            entry.2.push(f64::from(row.scored.percentage));
        }

        let mut entries: Vec<UserBreakdownEntry> = by_user
            .into_iter()
            .map(|(user_id, (name, work_function, mean))| UserBreakdownEntry {
                user_id,
                name,
                work_function: Some(
                    work_function
                        .filter(|name| !name.trim().is_empty())
                        .unwrap_or_else(|| unassigned.to_string()),
                ),
                responses: mean.count(),
                average_score: mean.mean(),
            })
            .collect();

        entries.sort_by(compare_leaderboard);
        entries.truncate(USER_BREAKDOWN_LIMIT);
        entries
    }
}

/// Scored users first, then by descending score, then by descending
/// response count, then by name.
fn compare_leaderboard(a: &UserBreakdownEntry, b: &UserBreakdownEntry) -> Ordering {
    b.average_score
        .is_some()
        .cmp(&a.average_score.is_some())
        .then_with(|| {
            b.average_score
                .unwrap_or(0.0)
                .total_cmp(&a.average_score.unwrap_or(0.0))
        })
        .then_with(|| b.responses.cmp(&a.responses))
        .then_with(|| a.name.cmp(&b.name))
}

fn work_function_summaries(rows: &[ScoredRow<'_>], unassigned: &str) -> Vec<WorkFunctionSummary> {
    let mut groups: BTreeMap<String, (MeanAccumulator, HashSet<i64>)> = BTreeMap::new();
    for row in rows {
        let name = row.work_function().unwrap_or(unassigned).to_string();
        let (mean, participants) = groups.entry(name).or_default();
        mean.push(f64::from(row.scored.percentage));
        participants.insert(row.response.user_id);
    }

    groups
        .into_iter()
        .map(|(name, (mean, participants))| WorkFunctionSummary {
            name,
            participants: participants.len(),
            responses: mean.count(),
            average_score: mean.mean(),
        })
        .collect()
}

/// One chart label per questionnaire id. Titles that would collide once
/// truncated carry a ` (#id)` suffix so each questionnaire keeps its own bar.
fn questionnaire_chart_labels(questionnaires: &[QuestionnaireRow]) -> HashMap<i64, String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for questionnaire in questionnaires {
        *seen
            .entry(truncate_label(questionnaire.title.trim(), CHART_LABEL_LIMIT))
            .or_default() += 1;
    }

    questionnaires
        .iter()
        .map(|questionnaire| {
            let title = questionnaire.title.trim();
            let label = truncate_label(title, CHART_LABEL_LIMIT);
            if seen.get(&label).copied().unwrap_or(0) > 1 {
                let suffix = format!(" (#{})", questionnaire.id);
                let room = CHART_LABEL_LIMIT.saturating_sub(suffix.chars().count());
                (questionnaire.id, format!("{}{suffix}", truncate_label(title, room)))
            } else {
                (questionnaire.id, label)
            }
        })
        .collect()
}

/// Chronological per-period means, keeping the most recent periods.
fn period_series<'r, 'a: 'r>(rows: impl Iterator<Item = &'r ScoredRow<'a>>) -> Vec<ChartPoint> {
    let mut periods: HashMap<i64, (String, Option<NaiveDate>, MeanAccumulator)> = HashMap::new();
    for row in rows {
        if let Some(period) = &row.response.period {
            let entry = periods
                .entry(period.id)
                .or_insert_with(|| (period.label.clone(), period.start_date, MeanAccumulator::default()));
            entry.2.push(f64::from(row.scored.percentage));
        }
    }

    let mut ordered: Vec<(String, Option<NaiveDate>, MeanAccumulator)> =
        periods.into_values().collect();
    ordered.sort_by(|a, b| match (a.1, b.1) {
        (Some(left), Some(right)) => left.cmp(&right).then_with(|| a.0.cmp(&b.0)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.0.cmp(&b.0),
    });

    let skip = ordered.len().saturating_sub(SERIES_LIMIT);
    ordered
        .into_iter()
        .skip(skip)
        .filter_map(|(label, _, mean)| {
            mean.mean()
                .map(|value| ChartPoint::new(&label, value, mean.count()))
        })
        .collect()
}
