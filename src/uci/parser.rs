//! UCI command parser for arrocco
//!
//! Tokenizes one input line into a `UciCommand`. Unparsable numbers are
//! dropped rather than rejected, as GUIs expect a forgiving engine.

use crate::time::TimeControl;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum UciCommand {
    Uci,
    IsReady,
    SetOption {
        name: String,
        value: Option<String>,
    },
    UciNewGame,
    Position {
        /// None means the standard starting position
        fen: Option<String>,
        moves: Vec<String>,
    },
    Go(GoParams),
    Stop,
    Quit,
    /// "d": print the current position
    Display,
    Unknown(String),
}

/// Limits carried by a "go" command
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct GoParams {
    pub clock: TimeControl,
    pub depth: Option<u8>,
    pub nodes: Option<u64>,
    pub infinite: bool,
}

/// Parse a UCI command from a string (simple tokenizer)
pub fn parse_uci_command(line: &str) -> UciCommand {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(&head) = parts.first() else {
        return UciCommand::Unknown(String::new());
    };

    match head {
        "uci" => UciCommand::Uci,
        "isready" => UciCommand::IsReady,
        "ucinewgame" => UciCommand::UciNewGame,
        "stop" => UciCommand::Stop,
        "quit" => UciCommand::Quit,
        "d" => UciCommand::Display,
        "setoption" => parse_setoption(&parts[1..]),
        "position" => parse_position(&parts[1..]),
        "go" => UciCommand::Go(parse_go(&parts[1..])),
        _ => UciCommand::Unknown(line.trim().to_string()),
    }
}

// setoption name <name...> [value <value...>]
fn parse_setoption(parts: &[&str]) -> UciCommand {
    let value_at = parts.iter().position(|&p| p == "value");
    let name_end = value_at.unwrap_or(parts.len());
    let name_start = match parts.first() {
        Some(&"name") => 1,
        _ => 0,
    };
    let name = parts[name_start.min(name_end)..name_end].join(" ");
    let value = value_at.map(|i| parts[i + 1..].join(" "));
    UciCommand::SetOption { name, value }
}

// position [startpos | fen <fields...>] [moves <m1> ...]
fn parse_position(parts: &[&str]) -> UciCommand {
    let moves_at = parts.iter().position(|&p| p == "moves");
    let setup = &parts[..moves_at.unwrap_or(parts.len())];

    let fen = match setup.first() {
        Some(&"fen") => Some(setup[1..].join(" ")),
        _ => None,
    };
    let moves = moves_at
        .map(|i| parts[i + 1..].iter().map(|m| m.to_string()).collect())
        .unwrap_or_default();
    UciCommand::Position { fen, moves }
}

fn parse_go(parts: &[&str]) -> GoParams {
    let mut go = GoParams::default();
    let mut tokens = parts.iter();

    while let Some(&token) = tokens.next() {
        let mut number = || tokens.next().and_then(|v| v.parse::<u64>().ok());
        match token {
            "wtime" => go.clock.wtime = number(),
            "btime" => go.clock.btime = number(),
            "winc" => go.clock.winc = number(),
            "binc" => go.clock.binc = number(),
            "movestogo" => go.clock.movestogo = number(),
            "movetime" => go.clock.movetime = number(),
            "nodes" => go.nodes = number(),
            "depth" => go.depth = number().map(|d| d.min(u64::from(u8::MAX)) as u8),
            "infinite" => go.infinite = true,
            other => log::debug!("go: ignoring token {:?}", other),
        }
    }
    go
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_commands() {
        assert_eq!(parse_uci_command("uci"), UciCommand::Uci);
        assert_eq!(parse_uci_command("  isready  "), UciCommand::IsReady);
        assert_eq!(parse_uci_command("d"), UciCommand::Display);
        assert_eq!(parse_uci_command(""), UciCommand::Unknown(String::new()));
        assert_eq!(
            parse_uci_command("xyzzy 1"),
            UciCommand::Unknown("xyzzy 1".to_string())
        );
    }

    #[test]
    fn position_with_moves() {
        assert_eq!(
            parse_uci_command("position startpos moves e2e4 e7e5"),
            UciCommand::Position {
                fen: None,
                moves: vec!["e2e4".to_string(), "e7e5".to_string()],
            }
        );
        assert_eq!(
            parse_uci_command("position fen 8/8/8/8/8/8/8/K6k w - - 0 1 moves a1a2"),
            UciCommand::Position {
                fen: Some("8/8/8/8/8/8/8/K6k w - - 0 1".to_string()),
                moves: vec!["a1a2".to_string()],
            }
        );
    }

    #[test]
    fn go_fields() {
        let UciCommand::Go(go) =
            parse_uci_command("go wtime 1000 btime 2000 winc 10 binc 20 movestogo 5 depth 7")
        else {
            panic!("expected go");
        };
        assert_eq!(go.clock.wtime, Some(1000));
        assert_eq!(go.clock.btime, Some(2000));
        assert_eq!(go.clock.winc, Some(10));
        assert_eq!(go.clock.binc, Some(20));
        assert_eq!(go.clock.movestogo, Some(5));
        assert_eq!(go.depth, Some(7));
        assert!(!go.infinite);

        let UciCommand::Go(go) = parse_uci_command("go infinite nodes 500 movetime x") else {
            panic!("expected go");
        };
        assert!(go.infinite);
        assert_eq!(go.nodes, Some(500));
        assert_eq!(go.clock.movetime, None);
    }

    #[test]
    fn setoption_name_and_value() {
        assert_eq!(
            parse_uci_command("setoption name Hash value 64"),
            UciCommand::SetOption {
                name: "Hash".to_string(),
                value: Some("64".to_string()),
            }
        );
        assert_eq!(
            parse_uci_command("setoption name Clear Hash"),
            UciCommand::SetOption {
                name: "Clear Hash".to_string(),
                value: None,
            }
        );
    }
}
