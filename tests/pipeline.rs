//! End-to-end tests: factory pipeline, candidate recognition, span agreement
//! across all three forms, and serialization shapes.

use textform::prelude::*;

fn factory() -> QueryFactory {
    QueryFactory::new(Box::new(WhitespaceTokenizer), Box::new(PatternRecognizer))
        .with_preprocessor(Box::new(WhitespacePreprocessor))
}

#[test]
fn create_query_produces_all_three_forms() {
    let query = factory()
        .create_query("  Pay   15% to BOB@example.com  ")
        .unwrap();
    assert_eq!(query.raw_text(), "  Pay   15% to BOB@example.com  ");
    assert_eq!(query.processed_text(), "Pay 15% to BOB@example.com");
    assert_eq!(query.normalized_text(), "pay 15% to bob@example.com");
}

#[test]
fn candidates_are_attached_once_at_construction() {
    let query = factory()
        .create_query("  Pay   15% to BOB@example.com  ")
        .unwrap();

    let types: Vec<&str> = query
        .system_entity_candidates()
        .iter()
        .map(|c| c.entity().entity_type.as_str())
        .collect();
    assert_eq!(types.len(), 2);
    assert!(types.contains(&"sys:percent"));
    assert!(types.contains(&"sys:email"));

    let percents = query.system_entity_candidates_of(&["sys:percent"]);
    assert_eq!(percents.len(), 1);
    assert!(query
        .system_entity_candidates_of(&["sys:duration"])
        .is_empty());
}

#[test]
fn candidate_spans_agree_across_forms() {
    let query = factory()
        .create_query("  Pay   15% to BOB@example.com  ")
        .unwrap();

    let percent = query.system_entity_candidates_of(&["sys:percent"])[0];
    assert_eq!(percent.text(TextForm::Raw), "15%");
    assert_eq!(percent.span(TextForm::Raw), Span::new(8, 10));
    assert_eq!(percent.span(TextForm::Processed), Span::new(4, 6));
    assert_eq!(percent.span(TextForm::Normalized), Span::new(4, 6));
    assert_eq!(percent.token_span(TextForm::Raw), Span::new(1, 1));
    assert_eq!(percent.token_span(TextForm::Normalized), Span::new(1, 1));

    let email = query.system_entity_candidates_of(&["sys:email"])[0];
    assert_eq!(email.text(TextForm::Raw), "BOB@example.com");
    assert_eq!(email.text(TextForm::Normalized), "bob@example.com");
    assert_eq!(email.span(TextForm::Processed), Span::new(11, 25));

    // every candidate span round-trips through the maps
    let raw_span = email.span(TextForm::Raw);
    let there = query
        .transform_span(raw_span, TextForm::Raw, TextForm::Normalized)
        .unwrap();
    assert_eq!(there, email.span(TextForm::Normalized));
    let back = query
        .transform_span(there, TextForm::Normalized, TextForm::Raw)
        .unwrap();
    assert_eq!(back, raw_span);
}

#[test]
fn collapsed_whitespace_indices_do_not_translate() {
    let query = factory()
        .create_query("  Pay   15% to BOB@example.com  ")
        .unwrap();

    // leading whitespace was trimmed away: its indices are invalid upward
    assert!(matches!(
        query.transform_index(0, TextForm::Raw, TextForm::Processed),
        Err(Error::InvalidIndex { index: 0, .. })
    ));
    // second char of the inner run was collapsed away
    assert!(matches!(
        query.transform_index(6, TextForm::Raw, TextForm::Processed),
        Err(Error::InvalidIndex { index: 6, .. })
    ));
    // but every processed index maps back to a raw origin
    for index in 0..query.processed_text().chars().count() {
        assert!(query
            .transform_index(index, TextForm::Processed, TextForm::Raw)
            .is_ok());
    }
}

#[test]
fn entities_from_normalized_spans_recover_raw_text() {
    let query = factory().create_query("  Play   The WHITE Album ").unwrap();

    // "white album" in the normalized text
    let entity = Entity::new("album").with_role("title");
    let anchored = QueryEntity::from_normalized_span(&query, entity, Span::new(9, 19)).unwrap();

    assert_eq!(anchored.text(TextForm::Normalized), "white album");
    assert_eq!(anchored.text(TextForm::Raw), "WHITE Album");
    assert_eq!(anchored.span(TextForm::Raw), Span::new(13, 23));
    assert_eq!(anchored.token_span(TextForm::Normalized), Span::new(2, 3));
}

#[test]
fn resolver_runs_over_factory_entities() {
    let query = factory()
        .create_query("  Pay   15% to BOB@example.com  ")
        .unwrap();

    // a manual annotation covering "15% to" outranks the nested percent
    let wide = QueryEntity::from_normalized_span(
        &query,
        Entity::new("amount").with_confidence(Confidence::saturating(0.4)),
        Span::new(4, 9),
    )
    .unwrap();

    let mut proposed = vec![wide];
    proposed.extend(query.system_entity_candidates().iter().cloned());

    let (survivors, discards) = ConflictResolver::new().resolve_with_trace(proposed);
    let types: Vec<&str> = survivors
        .iter()
        .map(|e| e.entity().entity_type.as_str())
        .collect();
    assert_eq!(types, vec!["amount", "sys:email"]);
    assert_eq!(discards.len(), 1);
    assert_eq!(discards[0].entity_type, "sys:percent");
    assert_eq!(discards[0].reason, DiscardReason::Subsumed);
}

#[test]
fn query_entity_projection_shape() {
    let query = factory().create_query("Pay 15%").unwrap();
    let percent = &query.system_entity_candidates_of(&["sys:percent"])[0];

    let json = serde_json::to_value(percent).unwrap();
    assert_eq!(json["type"], "sys:percent");
    assert_eq!(json["display_text"], "15%");
    assert_eq!(json["value"], serde_json::json!(15.0));
    assert_eq!(json["text"], "15%");
    assert_eq!(json["span"], serde_json::json!({"start": 4, "end": 6}));
    assert!(json.get("confidence").is_some());
}

#[test]
fn processed_query_wraps_resolved_entities() {
    let query = factory().create_query("Pay 15%").unwrap();
    let entities = ConflictResolver::new()
        .resolve(query.system_entity_candidates().to_vec());
    let processed = ProcessedQuery::new(query)
        .with_domain("payments")
        .with_intent("pay")
        .with_entities(entities)
        .gold();

    assert!(processed.is_gold);
    let json = serde_json::to_value(&processed).unwrap();
    assert_eq!(json["text"], "Pay 15%");
    assert_eq!(json["domain"], "payments");
    assert_eq!(json["entities"].as_array().unwrap().len(), 1);
}

#[test]
fn factory_normalize_is_standalone() {
    assert_eq!(factory().normalize("  The  WHITE Album "), "the white album");
}
