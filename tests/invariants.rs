use std::collections::{BTreeMap, HashMap};

use holdouts::aggregates::add_aggregation_columns;
use holdouts::ingestion::ingest_purchases;
use holdouts::{
    EvaluationSplitter, HoldoutTable, IdentifierIndex, IdentifierRemapper, InteractionTable,
    ItemColumn, ItemId, PrepError, PurchaseRow, UserId,
};

fn purchase(item: &str, user: &str, day: u32, second: u32) -> PurchaseRow {
    PurchaseRow {
        item_id: item.to_string(),
        user_id: user.to_string(),
        timestamp: format!("2021-03-{day:02} 08:00:{second:02}.000000"),
    }
}

/// Three users with 1, 3, and 4 baskets; two users share a timestamp.
fn build_purchases() -> InteractionTable {
    ingest_purchases(vec![
        purchase("i01", "alice", 1, 0),
        purchase("i02", "alice", 1, 0),
        purchase("i03", "bob", 1, 0),
        purchase("i04", "alice", 2, 0),
        purchase("i05", "carol", 2, 5),
        purchase("i06", "alice", 3, 0),
        purchase("i07", "alice", 3, 0),
        purchase("i08", "bob", 4, 0),
        purchase("i09", "alice", 5, 0),
        purchase("i10", "bob", 6, 0),
    ])
    .unwrap()
}

fn items_by_user(table: &InteractionTable) -> BTreeMap<UserId, Vec<ItemId>> {
    let mut items: BTreeMap<UserId, Vec<ItemId>> = BTreeMap::new();
    for row in table.rows() {
        items
            .entry(row.user_id.unwrap().to_string())
            .or_default()
            .extend(row.items.iter().cloned());
    }
    items
}

fn holdout_items_by_user(
    holdout: &HoldoutTable,
    train: &InteractionTable,
) -> BTreeMap<UserId, Vec<ItemId>> {
    let mut items = items_by_user(train);
    for scenario in holdout.scenarios() {
        items
            .entry(scenario.user_id.to_string())
            .or_default()
            .extend(scenario.predict.iter().cloned());
    }
    items
}

#[test]
fn training_and_holdout_partition_the_input() {
    let purchases = build_purchases();
    let (holdout, train) = EvaluationSplitter::default()
        .split(purchases.clone())
        .unwrap();

    assert_eq!(train.len() + holdout.len(), purchases.len());
    assert!(train.evaluation.as_ref().unwrap().iter().all(|flag| !flag));

    let mut expected = items_by_user(&purchases);
    let mut actual = holdout_items_by_user(&holdout, &train);
    for items in expected.values_mut().chain(actual.values_mut()) {
        items.sort();
    }
    assert_eq!(actual, expected);
}

#[test]
fn holdout_profile_plus_predictions_cover_each_evaluated_user() {
    let purchases = build_purchases();
    let original = items_by_user(&purchases);
    let (holdout, _) = EvaluationSplitter::new(2)
        .unwrap()
        .split(purchases)
        .unwrap();

    let mut per_user: HashMap<&str, (Vec<ItemId>, Vec<ItemId>)> = HashMap::new();
    for scenario in holdout.scenarios() {
        let entry = per_user
            .entry(scenario.user_id)
            .or_insert_with(|| (scenario.profile.to_vec(), Vec::new()));
        assert_eq!(entry.0, scenario.profile, "profile must not grow");
        entry.1.extend(scenario.predict.iter().cloned());
    }

    // alice has 4 baskets and bob 3; carol's single basket is never evaluated.
    assert_eq!(per_user.len(), 2);
    assert!(!per_user.contains_key("carol"));
    for (user, (profile, predicted)) in per_user {
        let mut combined: Vec<ItemId> = profile.into_iter().chain(predicted).collect();
        let mut expected = original[user].clone();
        combined.sort();
        expected.sort();
        assert_eq!(combined, expected, "items lost or duplicated for {user}");
    }
}

#[test]
fn every_evaluated_user_keeps_training_rows() {
    for threshold in 1..=4 {
        let (holdout, train) = EvaluationSplitter::new(threshold)
            .unwrap()
            .split(build_purchases())
            .unwrap();
        let train_users: Vec<&str> = train.user_ids().unwrap().iter().map(String::as_str).collect();
        for scenario in holdout.scenarios() {
            assert!(!scenario.profile.is_empty());
            assert!(train_users.contains(&scenario.user_id));
        }
    }
}

#[test]
fn outputs_are_sorted_by_timestamp() {
    let (holdout, train) = EvaluationSplitter::default()
        .split(add_aggregation_columns(build_purchases()).unwrap())
        .unwrap();
    assert!(holdout.timestamp.windows(2).all(|w| w[0] <= w[1]));
    assert!(train.timestamp.windows(2).all(|w| w[0] <= w[1]));
    // Aggregates computed before the split travel with the training rows.
    assert!(train.n_baskets.is_some());
    assert_eq!(train.n_items.as_ref().unwrap().len(), train.len());
}

#[test]
fn first_basket_groups_items_bought_together() {
    let purchases = build_purchases();
    let first = purchases.row(0).unwrap();
    assert_eq!(first.user_id, Some("alice"));
    assert_eq!(first.items, &["i01".to_string(), "i02".to_string()]);
    let second = purchases.row(1).unwrap();
    assert_eq!(second.user_id, Some("bob"));
}

#[test]
fn remapping_both_outputs_shares_one_identifier_space() {
    let purchases = build_purchases();
    let index = IdentifierIndex::from_vocabulary(purchases.item_id.iter_ids());
    let (holdout, train) = EvaluationSplitter::default().split(purchases).unwrap();

    let remapper = IdentifierRemapper::new(&index);
    let train = remapper.remap_interactions(train).unwrap();
    let remapped = remapper.remap_holdout(holdout.clone()).unwrap();

    let inverse = index.inverse();
    for (before, after) in holdout.scenarios().zip(remapped.scenarios()) {
        let profile: Vec<ItemId> = after.profile.iter().map(|idx| inverse[idx].clone()).collect();
        let predict: Vec<ItemId> = after.predict.iter().map(|idx| inverse[idx].clone()).collect();
        assert_eq!(profile, before.profile);
        assert_eq!(predict, before.predict);
    }
    let ItemColumn::Listed(baskets) = &train.item_id else {
        panic!("training baskets lost their shape");
    };
    let max = index.len() as i64;
    assert!(baskets.iter().flatten().all(|idx| (0..max).contains(idx)));
}

#[test]
fn remapping_with_incomplete_index_fails_loudly() {
    let purchases = build_purchases();
    let index = IdentifierIndex::from_vocabulary(["i01", "i02"]);
    let err = IdentifierRemapper::new(&index)
        .remap_interactions(purchases)
        .unwrap_err();
    assert!(matches!(err, PrepError::Lookup { .. }));
}
