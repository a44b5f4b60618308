use review_report::report::{truncate_label, CHART_LABEL_LIMIT};
use review_report::scoring::{
    even_likert_weights, resolve_weights, score_response, AnswerValue, AnswersByLinkId, ItemType,
    QuestionItem, WeightCache, DEFAULT_TOTAL_WEIGHT,
};

fn answers(entries: &[(&str, AnswerValue)]) -> AnswersByLinkId {
    entries
        .iter()
        .map(|(link_id, value)| (link_id.to_string(), vec![value.clone()]))
        .collect()
}

#[test]
fn likert_items_suppress_other_weights() {
    let items = vec![
        QuestionItem::new(1, "a", ItemType::Likert),
        QuestionItem::new(2, "b", ItemType::Likert),
        QuestionItem::new(3, "c", ItemType::Boolean).with_weight(20.0),
    ];
    let likert = even_likert_weights(&items, DEFAULT_TOTAL_WEIGHT);
    assert_eq!(resolve_weights(&items, &likert), vec![50.0, 50.0, 0.0]);
}

#[test]
fn likert_weights_always_total_one_hundred() {
    for count in 1..=13 {
        let mut items: Vec<QuestionItem> = (0..count)
            .map(|index| QuestionItem::new(index + 1, format!("likert-{index}"), ItemType::Likert))
            .collect();
        items.push(QuestionItem::new(100, "note", ItemType::Text).with_weight(15.0));
        items.push(QuestionItem::new(101, "header", ItemType::Display));

        let likert = even_likert_weights(&items, DEFAULT_TOTAL_WEIGHT);
        let weights = resolve_weights(&items, &likert);
        let likert_total: f64 = weights[..count as usize].iter().sum();
        assert!((likert_total - 100.0).abs() < 1e-9, "{count} items sum to {likert_total}");
        assert_eq!(&weights[count as usize..], &[0.0, 0.0]);
    }
}

#[test]
fn lone_zero_weight_item_defaults_to_nominal_weight() {
    let items = vec![QuestionItem::new(1, "agree", ItemType::Boolean).with_weight(0.0)];
    let likert = even_likert_weights(&items, DEFAULT_TOTAL_WEIGHT);
    assert_eq!(resolve_weights(&items, &likert), vec![1.0]);

    let scored = score_response(9, 4, &items, &likert, &answers(&[("agree", AnswerValue::Boolean(true))]));
    assert_eq!(scored.max_points, 1.0);
    assert_eq!(scored.percentage, 100);
}

#[test]
fn structural_only_questionnaire_scores_zero() {
    let items = vec![
        QuestionItem::new(1, "intro", ItemType::Display),
        QuestionItem::new(2, "group", ItemType::Group),
    ];
    let likert = even_likert_weights(&items, DEFAULT_TOTAL_WEIGHT);
    let scored = score_response(1, 1, &items, &likert, &AnswersByLinkId::new());
    assert_eq!(scored.max_points, 0.0);
    assert_eq!(scored.achieved_points, 0.0);
    assert_eq!(scored.percentage, 0);
}

#[test]
fn scores_stay_within_bounds() {
    let items = vec![
        QuestionItem::new(1, "l1", ItemType::Likert),
        QuestionItem::new(2, "l2", ItemType::Likert),
        QuestionItem::new(3, "l3", ItemType::Likert),
    ];
    let mut cache = WeightCache::new();
    let likert = cache.likert_weights(5, &items).clone();

    let cases = [
        answers(&[]),
        answers(&[("l1", AnswerValue::Integer(9)), ("l2", AnswerValue::Integer(-4))]),
        answers(&[
            ("l1", AnswerValue::Integer(5)),
            ("l2", AnswerValue::Decimal(5.0)),
            ("l3", AnswerValue::text("5 - Strongly agree")),
        ]),
        answers(&[("l3", AnswerValue::Decimal(f64::NAN))]),
    ];
    for case in &cases {
        let scored = score_response(1, 5, &items, &likert, case);
        assert!(scored.achieved_points >= 0.0);
        assert!(scored.achieved_points <= scored.max_points + 1e-9);
        assert!(scored.percentage <= 100);
    }

    let full = score_response(1, 5, &items, &likert, &cases[2]);
    assert_eq!(full.percentage, 100);
    assert_eq!(cache.len(), 1);
}

#[test]
fn long_titles_truncate_to_exact_limit() {
    let truncated = truncate_label("Very Long Questionnaire Title About Something", CHART_LABEL_LIMIT);
    assert_eq!(truncated.chars().count(), 22);
    assert!(truncated.ends_with('\u{2026}'));

    let accented = truncate_label("Évaluation trimestrielle des équipes", CHART_LABEL_LIMIT);
    assert_eq!(accented.chars().count(), 22);
    assert!(std::str::from_utf8(accented.as_bytes()).is_ok());
}
