//! Tests for the sync client against a scriptable engine.

mod support;

use nim_session::{GameState, Move, Player, SessionError, SyncClient, ValidationError};
use std::sync::Arc;
use std::time::Duration;
use support::FakeEngine;

async fn started(piles: &[u64]) -> (Arc<FakeEngine>, SyncClient<Arc<FakeEngine>>) {
    let engine = Arc::new(FakeEngine::new());
    let client = SyncClient::new(engine.clone());
    client.start(piles).await.unwrap();
    (engine, client)
}

#[tokio::test]
async fn test_start_commits_fresh_state() {
    for piles in [vec![1, 1], vec![3, 4, 5], vec![7, 1, 9, 2]] {
        let (_, client) = started(&piles).await;
        let state = client.store().read();
        assert_eq!(state.piles(), piles.as_slice());
        assert_eq!(state.current_player(), Player::One);
        assert!(!state.is_game_over());
        assert_eq!(state.winner(), None);
    }
}

#[tokio::test]
async fn test_rejected_start_leaves_store_alone() {
    let engine = Arc::new(FakeEngine::new());
    engine.reject("start");
    let client = SyncClient::new(engine.clone());

    let result = client.start(&[3, 4]).await;

    assert!(matches!(result, Err(SessionError::RemoteRejection(_))));
    assert_eq!(client.store().read(), GameState::default());
    assert_eq!(engine.count("game_state"), 0);
}

#[tokio::test]
async fn test_accepted_move_decrements_pile_and_flips_player() {
    let (_, client) = started(&[3, 4, 5]).await;

    let state = client.submit_move(Move::new(1, 3)).await.unwrap();

    assert_eq!(state.piles(), &[3, 1, 5]);
    assert_eq!(state.current_player(), Player::Two);
    assert_eq!(client.store().read(), state);
}

#[tokio::test]
async fn test_invalid_move_never_reaches_engine() {
    let (engine, client) = started(&[3, 4]).await;
    let before = client.store().read();

    let cases = [
        (Move::new(2, 1), ValidationError::InvalidIndex { index: 2, len: 2 }),
        (Move::new(0, 0), ValidationError::NonPositiveCount),
        (
            Move::new(1, 5),
            ValidationError::InsufficientPileSize {
                index: 1,
                requested: 5,
                available: 4,
            },
        ),
    ];
    for (mov, expected) in cases {
        match client.submit_move(mov).await {
            Err(SessionError::Validation(e)) => assert_eq!(e, expected),
            other => panic!("Expected validation error for {}, got {:?}", mov, other),
        }
    }

    assert_eq!(engine.count("remove"), 0);
    assert_eq!(client.store().read(), before);
}

#[tokio::test]
async fn test_network_failure_leaves_store_alone() {
    let (engine, client) = started(&[3, 4]).await;
    let before = client.store().read();
    engine.fail("remove");

    let result = client.submit_move(Move::new(0, 1)).await;

    assert!(matches!(result, Err(SessionError::Network(_))));
    assert_eq!(client.store().read(), before);

    engine.heal("remove");
    let state = client.submit_move(Move::new(0, 1)).await.unwrap();
    assert_eq!(state.piles(), &[2, 4]);
}

#[tokio::test]
async fn test_failed_refresh_after_accepted_move_keeps_old_mirror() {
    let (engine, client) = started(&[3, 4]).await;
    let before = client.store().read();
    engine.fail("game_state");

    let result = client.submit_move(Move::new(0, 1)).await;

    assert!(matches!(result, Err(SessionError::Network(_))));
    assert_eq!(client.store().read(), before);
}

#[tokio::test]
async fn test_remote_rejection_leaves_store_alone() {
    let (engine, client) = started(&[3, 4]).await;
    let before = client.store().read();
    engine.reject("remove");

    let result = client.submit_move(Move::new(0, 1)).await;

    assert!(matches!(result, Err(SessionError::RemoteRejection(_))));
    assert_eq!(client.store().read(), before);
}

#[tokio::test]
async fn test_undo_restores_pile_and_player() {
    let (_, client) = started(&[3, 4]).await;
    client.submit_move(Move::new(1, 2)).await.unwrap();
    client.submit_move(Move::new(0, 3)).await.unwrap();

    let state = client.undo().await.unwrap();

    assert_eq!(state.piles(), &[3, 2]);
    assert_eq!(state.current_player(), Player::Two);
}

#[tokio::test]
async fn test_undo_without_history_is_rejected() {
    let (_, client) = started(&[3, 4]).await;
    let before = client.store().read();

    let result = client.undo().await;

    assert!(matches!(result, Err(SessionError::RemoteRejection(_))));
    assert_eq!(client.store().read(), before);
}

#[tokio::test]
async fn test_inconsistent_state_is_fetched_again() {
    let (engine, client) = started(&[3, 4]).await;
    // Empty piles while the game is still running.
    engine.script_state(vec![0, 0], 1, false, -1);

    let state = client.fetch_state().await.unwrap();

    assert_eq!(state.piles(), &[3, 4]);
    assert_eq!(engine.count("game_state"), 3);
}

#[tokio::test]
async fn test_persistent_desync_leaves_store_alone() {
    let (engine, client) = started(&[3, 4]).await;
    let before = client.store().read();
    engine.script_state(vec![0, 0], 1, false, -1);
    engine.script_state(vec![2, 0], 2, true, 1);

    let result = client.fetch_state().await;

    assert!(matches!(result, Err(SessionError::StateDesync(_))));
    assert_eq!(client.store().read(), before);
}

#[tokio::test]
async fn test_winner_while_running_is_a_desync() {
    let (engine, client) = started(&[3, 4]).await;
    engine.script_state(vec![3, 4], 1, false, 2);
    engine.script_state(vec![3, 4], 1, false, 2);

    let result = client.fetch_state().await;

    assert!(matches!(result, Err(SessionError::StateDesync(_))));
}

#[tokio::test]
async fn test_optimal_move_is_not_committed() {
    let (_, client) = started(&[3, 5]).await;
    let before = client.store().read();

    let mov = client.request_optimal_move().await.unwrap();

    assert_eq!(mov, Some(Move::new(1, 2)));
    assert_eq!(client.store().read(), before);
}

#[tokio::test]
async fn test_optimal_move_on_terminal_state_is_none() {
    let (_, client) = started(&[1, 1]).await;
    client.submit_move(Move::new(0, 1)).await.unwrap();
    let state = client.submit_move(Move::new(1, 1)).await.unwrap();
    assert!(state.is_game_over());

    assert_eq!(client.request_optimal_move().await.unwrap(), None);
}

#[tokio::test]
async fn test_optimal_move_stays_within_bounds() {
    for piles in [vec![1, 2], vec![4, 4], vec![5, 9, 3], vec![1, 1, 1], vec![6, 0, 2]] {
        let engine = Arc::new(FakeEngine::new());
        let client = SyncClient::new(engine.clone());
        let playable: Vec<u64> = piles.iter().map(|&size| size.max(1)).collect();
        client.start(&playable).await.unwrap();

        let state = client.store().read();
        let mov = client
            .request_optimal_move()
            .await
            .unwrap()
            .expect("running game has a move");
        assert!(mov.pile_index < state.piles().len(), "{} on {:?}", mov, playable);
        assert!(mov.count > 0);
        assert!(mov.count <= state.piles()[mov.pile_index]);
    }
}

#[tokio::test]
async fn test_initial_piles_reported() {
    let (_, client) = started(&[2, 6, 1]).await;
    client.submit_move(Move::new(1, 6)).await.unwrap();

    assert_eq!(client.fetch_initial_piles().await.unwrap(), vec![2, 6, 1]);
}

#[tokio::test]
async fn test_missing_initial_piles_is_a_rejection() {
    let (engine, client) = started(&[2, 6]).await;
    engine.reject("initial_piles");

    let result = client.fetch_initial_piles().await;

    assert!(matches!(result, Err(SessionError::RemoteRejection(_))));
}

#[tokio::test]
async fn test_slow_response_is_superseded_by_newer_request() {
    let (engine, client) = started(&[3, 4]).await;
    engine.slow_down("remove", Duration::from_millis(100));

    // The refresh is issued after the move and lands first.
    let (moved, refreshed) = tokio::join!(client.submit_move(Move::new(0, 1)), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        client.fetch_state().await
    });

    assert!(matches!(moved, Err(SessionError::Superseded)));
    let refreshed = refreshed.unwrap();
    assert_eq!(refreshed.piles(), &[3, 4]);
    assert_eq!(client.store().read(), refreshed);
}

#[tokio::test]
async fn test_replace_invalidates_requests_in_flight() {
    let (engine, client) = started(&[3, 4]).await;
    engine.slow_down("remove", Duration::from_millis(50));

    let (moved, ()) = tokio::join!(client.submit_move(Move::new(0, 1)), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        client.store().replace(GameState::default());
    });

    assert!(matches!(moved, Err(SessionError::Superseded)));
    assert_eq!(client.store().read(), GameState::default());
}

#[tokio::test]
async fn test_empty_piles_while_running_is_a_desync() {
    let (engine, client) = started(&[3, 4]).await;
    let before = client.store().read();
    engine.script_state(vec![], 1, false, -1);
    engine.script_state(vec![], 1, false, -1);

    let result = client.fetch_state().await;

    assert!(matches!(result, Err(SessionError::StateDesync(_))));
    assert_eq!(client.store().read(), before);
}

#[tokio::test]
async fn test_huge_pile_sizes_are_mirrored() {
    let (engine, client) = started(&[3, 4]).await;
    engine.script_state(vec![u64::MAX, 1], 2, false, -1);

    let state = client.fetch_state().await.unwrap();

    assert_eq!(state.piles(), &[u64::MAX, 1]);
    assert_eq!(state.remaining(), u64::MAX);
}
