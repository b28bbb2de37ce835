use chrono::{DateTime, TimeZone, Utc};
use rankshift::{
    BatchMoveRequest, InMemoryRankStore, ItemId, MoveRequest, Rank, RankError, RankStore,
    ReorderCoordinator, ScopeId, ScopeSnapshot,
};

fn ts(offset: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + chrono::Duration::seconds(offset)
}

async fn seed(store: &InMemoryRankStore, scope: &ScopeId, ids: &[&str]) {
    for (i, id) in ids.iter().enumerate() {
        store
            .insert_item(scope, ItemId::new(*id), ts(i as i64))
            .await
            .unwrap();
    }
}

fn order(snapshot: &ScopeSnapshot) -> Vec<&str> {
    snapshot.items().iter().map(|i| i.id.as_str()).collect()
}

fn ranks(snapshot: &ScopeSnapshot) -> Vec<Rank> {
    snapshot.items().iter().map(|i| i.rank).collect()
}

#[tokio::test]
async fn admin_reorders_a_scope_end_to_end() {
    let store = InMemoryRankStore::new();
    let scope = ScopeId::new("certifications");
    seed(&store, &scope, &["aws", "gcp", "azure", "k8s", "terraform"]).await;
    let coordinator = ReorderCoordinator::new(store);

    coordinator
        .single_move(&scope, &ItemId::new("k8s"), 0)
        .await
        .unwrap();
    coordinator
        .single_move(&scope, &ItemId::new("aws"), 4)
        .await
        .unwrap();

    let snapshot = coordinator.store().load_scope(&scope).await.unwrap();
    assert_eq!(order(&snapshot), vec!["k8s", "gcp", "azure", "terraform", "aws"]);
    assert_eq!(ranks(&snapshot), vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn batch_is_equivalent_to_the_same_moves_applied_one_by_one() {
    let moves = vec![
        MoveRequest {
            target_id: ItemId::new("a"),
            desired_rank: 3,
        },
        MoveRequest {
            target_id: ItemId::new("b"),
            desired_rank: 3,
        },
    ];
    let scope = ScopeId::new("certifications");

    let batched = {
        let store = InMemoryRankStore::new();
        seed(&store, &scope, &["a", "b", "c", "d"]).await;
        let coordinator = ReorderCoordinator::new(store);
        coordinator
            .batch_move(&scope, &BatchMoveRequest::new(moves.clone()))
            .await
            .unwrap()
    };

    let sequential = {
        let store = InMemoryRankStore::new();
        seed(&store, &scope, &["a", "b", "c", "d"]).await;
        let coordinator = ReorderCoordinator::new(store);
        for mv in &moves {
            coordinator
                .single_move(&scope, &mv.target_id, mv.desired_rank)
                .await
                .unwrap();
        }
        coordinator.store().load_scope(&scope).await.unwrap()
    };

    assert_eq!(order(&batched), vec!["c", "d", "a", "b"]);
    assert_eq!(order(&batched), order(&sequential));
    assert_eq!(ranks(&batched), ranks(&sequential));
}

#[tokio::test]
async fn failed_batch_leaves_the_scope_exactly_as_it_was() {
    let store = InMemoryRankStore::new();
    let scope = ScopeId::new("certifications");
    seed(&store, &scope, &["a", "b", "c", "d"]).await;
    let coordinator = ReorderCoordinator::new(store);
    let before = coordinator.store().load_scope(&scope).await.unwrap();

    let batch = BatchMoveRequest::new(vec![
        MoveRequest {
            target_id: ItemId::new("d"),
            desired_rank: 0,
        },
        MoveRequest {
            target_id: ItemId::new("b"),
            desired_rank: 7,
        },
    ]);
    let err = coordinator.batch_move(&scope, &batch).await.unwrap_err();
    assert!(matches!(err, RankError::RankOutOfRange { .. }));

    let after = coordinator.store().load_scope(&scope).await.unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn reorders_never_leak_across_scopes() {
    let store = InMemoryRankStore::new();
    let certifications = ScopeId::new("certifications");
    let stack = ScopeId::new("stack");
    seed(&store, &certifications, &["a", "b", "c"]).await;
    seed(&store, &stack, &["rust", "postgres", "redis"]).await;
    let coordinator = ReorderCoordinator::new(store);

    coordinator
        .single_move(&certifications, &ItemId::new("c"), 0)
        .await
        .unwrap();

    let stack_snapshot = coordinator.store().load_scope(&stack).await.unwrap();
    assert_eq!(order(&stack_snapshot), vec!["rust", "postgres", "redis"]);
    assert_eq!(stack_snapshot.version(), 0);
}

#[tokio::test]
async fn mixed_operations_preserve_the_rank_multiset() {
    let store = InMemoryRankStore::new();
    let scope = ScopeId::new("projects");
    let ids = ["p1", "p2", "p3", "p4", "p5"];
    seed(&store, &scope, &ids).await;
    let coordinator = ReorderCoordinator::new(store);

    coordinator
        .single_move(&scope, &ItemId::new("p5"), 1)
        .await
        .unwrap();
    coordinator
        .batch_move(
            &scope,
            &BatchMoveRequest::new(vec![
                MoveRequest {
                    target_id: ItemId::new("p1"),
                    desired_rank: 4,
                },
                MoveRequest {
                    target_id: ItemId::new("p3"),
                    desired_rank: 0,
                },
            ]),
        )
        .await
        .unwrap();
    coordinator
        .single_move(&scope, &ItemId::new("p2"), 2)
        .await
        .unwrap();

    let snapshot = coordinator.store().load_scope(&scope).await.unwrap();
    assert_eq!(ranks(&snapshot), vec![0, 1, 2, 3, 4]);

    let mut seen = snapshot.ordered_ids();
    seen.sort();
    let mut expected: Vec<ItemId> = ids.iter().map(|id| ItemId::new(*id)).collect();
    expected.sort();
    assert_eq!(seen, expected);
}
