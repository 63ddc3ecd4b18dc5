use anyhow::Result;
use nline_client::{
    ClientError, GameClient, LobbyEvent, LobbyWatcher, MatchEvent, MatchWatcher, OnlineSession,
    Phase, SearchOutcome,
};
use nline_core::{DeviceId, MatchAssignment};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use super::input::{self, Input};
use super::{client_config, report};
use crate::cli::args::PlayArgs;
use crate::exit_codes;

pub async fn run(server: Option<String>, args: PlayArgs) -> Result<i32> {
    let mut config = client_config(server);
    if let Some(ms) = args.poll_ms {
        config = config.with_poll_interval_ms(ms);
    }
    let interval = Duration::from_millis(config.poll_interval_ms);
    let client = match GameClient::new(config) {
        Ok(client) => client,
        Err(e) => return Ok(report(&e)),
    };

    if !client.check_health().await {
        eprintln!("error: cannot reach server at {}", client.base_url());
        return Ok(exit_codes::NETWORK_ERROR);
    }

    let device_id = match args.device_id {
        Some(id) => DeviceId::new(id),
        None => match client.register(args.alias.as_deref()).await {
            Ok(id) => id,
            Err(e) => return Ok(report(&e)),
        },
    };
    println!("Device id: {device_id}");

    let mut session = OnlineSession::new(device_id);
    let assignment = match find_match(&client, &mut session, args.size, interval).await {
        Ok(Some(assignment)) => assignment,
        Ok(None) => return Ok(exit_codes::SUCCESS),
        Err(e) => return Ok(report(&e)),
    };

    session.start(&assignment);
    play_match(&client, &mut session, interval).await?;
    Ok(exit_codes::SUCCESS)
}

/// `None` when the player gave up waiting.
async fn find_match(
    client: &GameClient,
    session: &mut OnlineSession,
    size: usize,
    interval: Duration,
) -> Result<Option<MatchAssignment>, ClientError> {
    let message = match client.search_match(session.device_id(), size).await? {
        SearchOutcome::Matched(assignment) => return Ok(Some(assignment)),
        SearchOutcome::Waiting { message } => message,
    };
    session.set_waiting();
    println!("{message}");

    let (watcher, mut events) = LobbyWatcher::spawn(client.clone(), session.device_id().clone(), interval);
    let assignment = tokio::select! {
        event = events.recv() => match event {
            Some(LobbyEvent::Matched(assignment)) => Some(assignment),
            None => None,
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!("Stopped waiting.");
            None
        }
    };
    watcher.stop().await;
    Ok(assignment)
}

async fn play_match(client: &GameClient, session: &mut OnlineSession, interval: Duration) -> Result<()> {
    let Some(match_id) = session.match_id().cloned() else {
        return Ok(());
    };
    info!(match_id = %match_id, "match started");
    if let (Some(mark), Some(board)) = (session.my_mark(), session.board()) {
        println!("Match {match_id}: you play {mark} on a {0}x{0} board.", board.size());
    }
    println!("Enter moves as `row col`, or `surrender`.");
    render(session);

    let (watcher, mut events) = MatchWatcher::spawn(client.clone(), match_id.clone(), interval);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(MatchEvent::Updated(state)) => {
                    session.apply(&state);
                    render(session);
                }
                Some(MatchEvent::Finished(state)) => {
                    session.apply(&state);
                    render(session);
                    break;
                }
                None => break,
            },
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => {
                    if !handle_line(client, session, &line).await {
                        break;
                    }
                    if session.phase() == Phase::Finished {
                        break;
                    }
                }
                Ok(None) | Err(_) => {
                    debug!("stdin closed");
                    stdin_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                eprintln!("Leaving match.");
                break;
            }
        }
    }
    watcher.stop().await;

    if let Some(result) = session.result() {
        println!("{result}");
    }
    Ok(())
}

/// Returns `false` when the player wants to leave.
async fn handle_line(client: &GameClient, session: &mut OnlineSession, line: &str) -> bool {
    let Some(match_id) = session.match_id().cloned() else {
        return false;
    };
    let device_id = session.device_id().clone();

    match input::parse(line) {
        Input::Move { row, col } => {
            if let Err(e) = session.check_move(row, col) {
                println!("Invalid move: {e}");
                return true;
            }
            match client.make_move(&match_id, &device_id, row, col).await {
                Ok(response) => {
                    session.record_local_move(&response);
                    render(session);
                }
                Err(e) => {
                    debug!(error = %e, "move rejected");
                    println!("{}", e.player_message());
                }
            }
        }
        Input::Surrender => match client.surrender(&match_id, &device_id).await {
            Ok(response) => {
                session.record_local_move(&response);
                render(session);
            }
            Err(e) => println!("{}", e.player_message()),
        },
        Input::Quit => return false,
        Input::Reset => println!("Reset is only available in local games."),
        Input::Empty => {}
        Input::Unknown(text) => println!("Unrecognized input: {text:?}"),
    }
    true
}

fn render(session: &OnlineSession) {
    let Some(board) = session.board() else {
        return;
    };
    print!("{board}");
    if let Some(line) = session.winning_line() {
        let cells: Vec<String> = line.cells.iter().map(|(r, c)| format!("({r},{c})")).collect();
        println!("Line: {}", cells.join(" "));
    }
    match session.phase() {
        Phase::Finished => {}
        _ if session.is_my_turn() => println!("Your turn ({} moves played)", session.move_count()),
        _ => println!("Waiting for opponent..."),
    }
}
