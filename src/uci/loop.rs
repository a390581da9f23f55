//! UCI event loop and command handling for arrocco
//!
//! Replies to a command are returned from `handle_command`; search output is
//! produced later by the worker. Both go through one channel and a printer
//! thread that owns stdout, so lines never interleave.

use super::options::{OptionChange, UciOptions};
use super::parser::{parse_uci_command, GoParams, UciCommand};
use crate::board::Board;
use crate::eval::Score;
use crate::moves::{move_to_uci, parse_uci_move};
use crate::search::params::MAX_DEPTH;
use crate::search::{SearchEvent, SearchInfo, SearchJob, SearchParams, ThreadManager};
use crate::search::{MATE, MATE_BOUND};
use crate::time::TimeManager;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Sender};
use std::thread;

pub struct UciEngine {
    board: Board,
    running: bool,
    options: UciOptions,
    thread_mgr: ThreadManager,
    /// Shared with the search worker
    out: Sender<String>,
}

impl UciEngine {
    pub fn new(out: Sender<String>) -> Self {
        let options = UciOptions::default();
        Self {
            board: Board::startpos(),
            running: true,
            thread_mgr: ThreadManager::new(options.hash_mb),
            options,
            out,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn options(&self) -> &UciOptions {
        &self.options
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Block until the current search has reported its best move
    pub fn wait_for_search(&mut self) {
        self.thread_mgr.wait();
    }

    pub fn handle_command(&mut self, cmd: UciCommand) -> Vec<String> {
        let mut res = Vec::new();
        match cmd {
            UciCommand::Uci => {
                res.push(format!("id name arrocco {}", env!("CARGO_PKG_VERSION")));
                res.push("id author the arrocco developers".to_string());
                res.extend(UciOptions::declarations());
                res.push("uciok".to_string());
            }
            UciCommand::IsReady => res.push("readyok".to_string()),
            UciCommand::UciNewGame => {
                self.thread_mgr.clear_tt();
                self.board = Board::startpos();
            }
            UciCommand::Position { fen, moves } => self.set_position(fen.as_deref(), &moves),
            UciCommand::Go(go) => self.start_search(go),
            UciCommand::Stop => self.thread_mgr.stop(),
            UciCommand::SetOption { name, value } => {
                match self.options.set_option(&name, value.as_deref()) {
                    Ok(OptionChange::Hash(mb)) => {
                        self.thread_mgr.resize_tt(mb);
                        log::info!("hash resized to {} MB", mb);
                    }
                    Err(e) => {
                        log::warn!("setoption rejected: {}", e);
                        res.push(format!("info string {}", e));
                    }
                }
            }
            UciCommand::Display => {
                res.extend(self.board.to_string().lines().map(str::to_string));
            }
            UciCommand::Quit => {
                self.thread_mgr.stop();
                self.running = false;
            }
            UciCommand::Unknown(s) => {
                if !s.is_empty() {
                    log::warn!("unknown command: {}", s);
                }
            }
        }
        res
    }

    /// Moves are applied up to the first one that is not legal.
    /// A bad FEN leaves an empty board and no moves are applied.
    fn set_position(&mut self, fen: Option<&str>, moves: &[String]) {
        let mut board = match fen {
            None => Board::startpos(),
            Some(fen) => {
                let mut board = Board::new();
                if let Err(e) = board.set_from_fen(fen) {
                    log::warn!("bad fen {:?}: {}; board left empty", fen, e);
                    self.board = board;
                    return;
                }
                board
            }
        };

        for text in moves {
            match parse_uci_move(&mut board, text) {
                Ok(mv) => board.make_move(mv),
                Err(e) => {
                    log::warn!("position: {}; ignoring remaining moves", e);
                    break;
                }
            }
        }
        self.board = board;
    }

    fn start_search(&mut self, go: GoParams) {
        let time_limit = if go.infinite {
            0
        } else {
            TimeManager::allocate_time(&go.clock, self.board.side(), self.board.fullmove()).unwrap_or(0)
        };
        let params = SearchParams::new()
            .max_depth(go.depth.unwrap_or(MAX_DEPTH))
            .time_limit(time_limit)
            .node_limit(go.nodes.unwrap_or(0))
            .infinite(go.infinite);
        log::debug!("go: {:?}", params);

        let job = SearchJob {
            board: self.board.clone(),
            params,
        };
        let out = self.out.clone();
        self.thread_mgr.start(job, move |event| {
            let line = match event {
                SearchEvent::Iteration(info) => info_line(&info),
                SearchEvent::BestMove(mv) => {
                    format!("bestmove {}", move_to_uci(mv.unwrap_or_default()))
                }
            };
            // receiver gone means we are shutting down
            let _ = out.send(line);
        });
    }
}

/// "cp N", or "mate N" in moves (negative when being mated)
pub fn format_score(score: Score) -> String {
    if score.abs() >= MATE_BOUND {
        let moves = (MATE - score.abs() + 1) / 2;
        format!("mate {}", if score > 0 { moves } else { -moves })
    } else {
        format!("cp {}", score)
    }
}

pub fn info_line(info: &SearchInfo) -> String {
    let mut line = format!(
        "info depth {} seldepth {} score {} nodes {} time {} nps {} hashfull {}",
        info.depth,
        info.seldepth,
        format_score(info.score),
        info.nodes,
        info.time_ms,
        info.nps,
        info.hashfull
    );
    if !info.pv.is_empty() {
        line.push_str(" pv ");
        line.push_str(&info.pv_string());
    }
    line
}

pub fn run_uci_loop() -> io::Result<()> {
    let (tx, rx) = mpsc::channel::<String>();
    let printer = thread::Builder::new()
        .name("uci-out".to_string())
        .spawn(move || -> io::Result<()> {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            for line in rx {
                writeln!(writer, "{}", line)?;
                writer.flush()?;
            }
            Ok(())
        })?;

    let mut engine = UciEngine::new(tx.clone());
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        for reply in process_uci_line(&line, &mut engine) {
            if tx.send(reply).is_err() {
                break;
            }
        }
        if !engine.is_running() {
            break;
        }
    }

    // stops the worker, releasing its sender
    drop(engine);
    drop(tx);
    printer
        .join()
        .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "output thread panicked")))
}

pub fn process_uci_line(line: &str, engine: &mut UciEngine) -> Vec<String> {
    let cmd = parse_uci_command(line);
    engine.handle_command(cmd)
}
