//! Search worker for the protocol front end
//!
//! A single dedicated thread runs one `Search` at a time. The `Search` value
//! (and with it the transposition table) moves into the worker for the
//! duration of a job and comes back through the join handle, so the cache
//! survives from one move to the next.

use crate::board::Board;
use crate::moves::Move;
use crate::search::stats::SearchInfo;
use crate::search::{Search, SearchParams};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// One search request
#[derive(Debug, Clone)]
pub struct SearchJob {
    pub board: Board,
    pub params: SearchParams,
}

/// What the worker reports while it runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// A completed iteration
    Iteration(SearchInfo),
    /// Final answer; None when the side to move has no legal move
    BestMove(Option<Move>),
}

/// Owns the search worker and its stop flag
pub struct ThreadManager {
    /// Present while idle, moved into the worker while a job runs
    search: Option<Search>,
    worker: Option<JoinHandle<Search>>,
    stop_flag: Arc<AtomicBool>,
    /// Releases an infinite search that finished before being stopped
    wake: Option<Sender<()>>,
    tt_size_mb: usize,
}

impl ThreadManager {
    pub fn new(tt_size_mb: usize) -> Self {
        let search = Search::new(Board::startpos(), tt_size_mb, SearchParams::default());
        let stop_flag = search.stop_handle();
        Self {
            search: Some(search),
            worker: None,
            stop_flag,
            wake: None,
            tt_size_mb,
        }
    }

    pub fn is_searching(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Start `job` on the worker thread, stopping any search still running.
    /// Every event goes to `reporter`; `BestMove` is always the last one.
    pub fn start<R>(&mut self, job: SearchJob, reporter: R)
    where
        R: Fn(SearchEvent) + Send + Sync + 'static,
    {
        self.stop();
        let mut search = self.take_search();

        self.stop_flag.store(false, Ordering::SeqCst);
        search.set_board(job.board);
        search.set_params(job.params.clone());

        let reporter = Arc::new(reporter);
        let progress = Arc::clone(&reporter);
        search.set_on_iteration(Box::new(move |info| {
            progress(SearchEvent::Iteration(info.clone()))
        }));

        let (wake_tx, wake_rx) = mpsc::channel::<()>();
        self.wake = Some(wake_tx);
        let infinite = job.params.infinite;
        let spawned = thread::Builder::new()
            .name("search".to_string())
            .spawn(move || {
                log::debug!("worker: search started");
                let best = search.think_with_params();
                search.clear_on_iteration();
                // "go infinite" answers only once told to stop; a dropped sender also releases it
                if infinite {
                    let _ = wake_rx.recv();
                }
                reporter(SearchEvent::BestMove(best));
                log::debug!("worker: search finished");
                search
            });

        match spawned {
            Ok(handle) => self.worker = Some(handle),
            Err(e) => log::error!("could not spawn search thread: {}", e),
        }
    }

    /// Ask the running search to stop and wait for its `BestMove`
    pub fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(wake) = self.wake.take() {
            let _ = wake.send(());
        }
        self.wait();
    }

    /// Wait for the running search to finish on its own
    pub fn wait(&mut self) {
        let Some(handle) = self.worker.take() else {
            return;
        };
        match handle.join() {
            Ok(search) => self.search = Some(search),
            Err(_) => log::error!("search thread panicked; starting with a fresh table"),
        }
    }

    /// Drop cached results ("ucinewgame")
    pub fn clear_tt(&mut self) {
        self.stop();
        if let Some(search) = self.search.as_mut() {
            search.clear_tt();
        }
    }

    pub fn resize_tt(&mut self, size_mb: usize) {
        self.stop();
        self.tt_size_mb = size_mb;
        if let Some(search) = self.search.as_mut() {
            search.resize_tt(size_mb);
        }
    }

    /// Deepest completed iteration of the last finished job
    pub fn last_info(&self) -> Option<&SearchInfo> {
        self.search.as_ref().map(|s| s.info())
    }

    fn take_search(&mut self) -> Search {
        match self.search.take() {
            Some(search) => search,
            None => {
                let search = Search::new(Board::startpos(), self.tt_size_mb, SearchParams::default());
                self.stop_flag = search.stop_handle();
                search
            }
        }
    }
}

impl Drop for ThreadManager {
    fn drop(&mut self) {
        self.stop();
    }
}
