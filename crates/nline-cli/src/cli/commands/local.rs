use anyhow::Result;
use nline_core::LocalGame;
use std::io::{BufRead, Write};

use super::input::{self, Input};
use crate::cli::args::LocalArgs;
use crate::exit_codes;

pub fn run(args: LocalArgs) -> Result<i32> {
    let mut game = LocalGame::new(args.size)?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    play(&mut game, stdin.lock(), stdout.lock())?;
    Ok(exit_codes::SUCCESS)
}

/// Read moves until `quit` or end of input.
fn play(game: &mut LocalGame, input: impl BufRead, mut out: impl Write) -> Result<()> {
    writeln!(
        out,
        "Enter moves as `row col`, `reset` for a new game, `quit` to leave."
    )?;
    render(game, &mut out)?;

    for line in input.lines() {
        match input::parse(&line?) {
            Input::Move { row, col } => match game.play(row, col) {
                Ok(true) => render(game, &mut out)?,
                Ok(false) => writeln!(out, "Game over. Type `reset` to play again.")?,
                Err(e) => writeln!(out, "Invalid move: {e}")?,
            },
            Input::Reset => {
                game.reset();
                render(game, &mut out)?;
            }
            Input::Quit => break,
            Input::Empty => {}
            Input::Surrender => writeln!(out, "Nobody to surrender to; type `reset`.")?,
            Input::Unknown(text) => writeln!(out, "Unrecognized input: {text:?}")?,
        }
    }
    Ok(())
}

fn render(game: &LocalGame, out: &mut impl Write) -> Result<()> {
    write!(out, "{}", game.board())?;
    if let Some(line) = game.winning_line() {
        let cells: Vec<String> = line.cells.iter().map(|(r, c)| format!("({r},{c})")).collect();
        writeln!(out, "Line: {}", cells.join(" "))?;
    }
    writeln!(out, "{}", game.status())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_script(size: usize, script: &str) -> (LocalGame, String) {
        let mut game = LocalGame::new(size).unwrap();
        let mut out = Vec::new();
        play(&mut game, script.as_bytes(), &mut out).unwrap();
        (game, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_win_then_ignored_move() {
        let (game, out) = run_script(3, "0 0\n1 0\n0 1\n1 1\n0 2\n2 2\n");
        assert!(out.contains("Winner: X!"));
        assert!(out.contains("Line: (0,0) (0,1) (0,2)"));
        assert!(out.contains("Game over."));
        assert_eq!(game.board().get(2, 2), None);
    }

    #[test]
    fn test_invalid_moves_reported() {
        let (game, out) = run_script(3, "1 1\n1 1\n5 5\nfoo\n");
        assert!(out.contains("Invalid move: cell occupied: (1, 1)"));
        assert!(out.contains("Invalid move: move out of board: (5, 5)"));
        assert!(out.contains("Unrecognized input: \"foo\""));
        assert_eq!(game.board().filled(), 1);
    }

    #[test]
    fn test_reset_keeps_size_and_quit_stops() {
        let (game, out) = run_script(5, "2 2\nreset\nquit\n3 3\n");
        assert_eq!(game.board().size(), 5);
        assert_eq!(game.board().filled(), 0);
        assert!(out.ends_with("Next player: X\n"));
    }
}
