//! Client against a real server on a local port.

use std::time::Duration;

use nline_client::{
    ClientConfig, ClientError, GameClient, LobbyEvent, LobbyWatcher, MatchEvent, MatchWatcher,
    OnlineSession, Phase, SearchOutcome, SessionResult,
};
use nline_core::{DeviceId, Mark};
use nline_server::AppState;
use tokio::net::TcpListener;

const POLL: Duration = Duration::from_millis(25);
const RECV_TIMEOUT: Duration = Duration::from_secs(5);

async fn start_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = nline_server::router(AppState::default());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(url: &str) -> GameClient {
    GameClient::new(ClientConfig::default().with_url(url).with_max_retries(0)).unwrap()
}

#[tokio::test]
async fn test_full_game_over_http() {
    let url = start_server().await;
    let client = client(&url);
    assert!(client.check_health().await);

    let ana = client.register(Some("ana")).await.unwrap();
    let bob = client.register(None).await.unwrap();
    let devices = client.list_devices().await.unwrap();
    assert!(devices.contains(&ana) && devices.contains(&bob));

    let mut ana_session = OnlineSession::new(ana.clone());
    let outcome = client.search_match(&ana, 3).await.unwrap();
    assert!(matches!(outcome, SearchOutcome::Waiting { .. }));
    ana_session.set_waiting();

    let (lobby_watcher, mut lobby_events) = LobbyWatcher::spawn(client.clone(), ana.clone(), POLL);

    let SearchOutcome::Matched(bob_assignment) = client.search_match(&bob, 3).await.unwrap() else {
        panic!("second request should pair");
    };
    assert_eq!(bob_assignment.players.get(&bob), Some(&Mark::X));

    let Some(LobbyEvent::Matched(ana_assignment)) = tokio::time::timeout(RECV_TIMEOUT, lobby_events.recv())
        .await
        .unwrap()
    else {
        panic!("lobby watcher closed without a match");
    };
    assert_eq!(ana_assignment.match_id, bob_assignment.match_id);
    lobby_watcher.stop().await;

    ana_session.start(&ana_assignment);
    assert_eq!(ana_session.phase(), Phase::Playing);
    assert!(!ana_session.is_my_turn());

    let match_id = ana_assignment.match_id.clone();
    let (match_watcher, mut match_events) = MatchWatcher::spawn(client.clone(), match_id.clone(), POLL);

    // bob (X) takes the top row, ana (O) plays the middle row
    let moves: [(&DeviceId, usize, usize); 5] =
        [(&bob, 0, 0), (&ana, 1, 0), (&bob, 0, 1), (&ana, 1, 1), (&bob, 0, 2)];
    for (device, x, y) in moves {
        let response = client.make_move(&match_id, device, x, y).await.unwrap();
        if device == &ana {
            ana_session.record_local_move(&response);
        }
    }

    let finished = loop {
        match tokio::time::timeout(RECV_TIMEOUT, match_events.recv()).await.unwrap() {
            Some(MatchEvent::Updated(state)) => ana_session.apply(&state),
            Some(MatchEvent::Finished(state)) => break state,
            None => panic!("match watcher closed before the end"),
        }
    };
    ana_session.apply(&finished);
    match_watcher.stop().await;

    assert_eq!(ana_session.phase(), Phase::Finished);
    assert_eq!(ana_session.result(), Some(SessionResult::Lost));
    assert_eq!(ana_session.move_count(), 5);

    let bob_stats = client.stats(&bob).await.unwrap();
    assert_eq!((bob_stats.wins, bob_stats.losses), (1, 0));
    let ana_stats = client.stats(&ana).await.unwrap();
    assert_eq!(ana_stats.alias, "ana");
    assert_eq!((ana_stats.wins, ana_stats.losses), (0, 1));

    let late = client.make_move(&match_id, &ana, 2, 2).await;
    assert!(matches!(late, Err(ClientError::BadRequest { .. })));
}

#[tokio::test]
async fn test_surrender_over_http() {
    let url = start_server().await;
    let client = client(&url);

    let a = client.register(None).await.unwrap();
    let b = client.register(None).await.unwrap();
    client.search_match(&a, 4).await.unwrap();
    let SearchOutcome::Matched(assignment) = client.search_match(&b, 4).await.unwrap() else {
        panic!("expected pairing");
    };
    assert_eq!(assignment.board_size, 4);

    let out_of_turn = client.make_move(&assignment.match_id, &a, 0, 0).await;
    assert!(matches!(out_of_turn, Err(ClientError::NotYourTurn)));

    let response = client.surrender(&assignment.match_id, &a).await.unwrap();
    assert_eq!(response.winner.and_then(|w| w.winner()), Some(Mark::X));

    let state = client.match_state(&assignment.match_id).await.unwrap();
    assert_eq!(state.size, 4);
    assert!(state.winner.is_some());
}

#[tokio::test]
async fn test_unknown_ids() {
    let url = start_server().await;
    let client = client(&url);

    let missing = client.stats(&DeviceId::new("nobody")).await;
    assert!(matches!(missing, Err(ClientError::NotFound { .. })));

    let unregistered = client.search_match(&DeviceId::new("nobody"), 3).await;
    assert!(matches!(unregistered, Err(ClientError::BadRequest { .. })));
}
