use std::time::{Duration, Instant};

use alloy::primitives::Address;
use erc20_indexer::domain::address::checksum;
use erc20_indexer::QueryState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    pub since: Instant,
}

/// UI-side state; the worker owns the real query state and sends copies
pub struct App {
    /// What is in the input box right now
    pub input: String,
    /// Debounced value the next query will use
    pub settled_input: String,
    pub query: QueryState,
    pub generation: u64,
    pub has_queried: bool,
    pub cached_queries: usize,
    pub endpoint: String,
    pub wallet_available: bool,
    pub wallet: Option<Address>,
    pub scroll: usize,
    pub spinner_frame: usize,
    pub help_open: bool,
    pub should_quit: bool,
    status: Option<StatusMessage>,
    pending_input: Option<String>,
    submit_requested: bool,
    connect_requested: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            settled_input: String::new(),
            query: QueryState::Idle,
            generation: 0,
            has_queried: false,
            cached_queries: 0,
            endpoint: "connecting".to_string(),
            wallet_available: false,
            wallet: None,
            scroll: 0,
            spinner_frame: 0,
            help_open: false,
            should_quit: false,
            status: None,
            pending_input: None,
            submit_requested: false,
            connect_requested: false,
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
            since: Instant::now(),
        });
    }

    pub fn status_text(&self) -> Option<(&str, StatusLevel)> {
        self.status
            .as_ref()
            .map(|status| (status.text.as_str(), status.level))
    }

    pub fn on_tick(&mut self) {
        if let Some(status) = self.status.as_ref() {
            if status.since.elapsed() > Duration::from_secs(3) {
                self.status = None;
            }
        }
        if self.query.is_loading() {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }
    }

    // === Input ===

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
        self.pending_input = Some(self.input.clone());
    }

    pub fn pop_char(&mut self) {
        if self.input.pop().is_some() {
            self.pending_input = Some(self.input.clone());
        }
    }

    pub fn clear_input(&mut self) {
        if !self.input.is_empty() {
            self.input.clear();
            self.pending_input = Some(String::new());
        }
    }

    pub fn submit(&mut self) {
        self.submit_requested = true;
    }

    pub fn connect_wallet(&mut self) {
        self.connect_requested = true;
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        let len = self.query.result().map(|r| r.len()).unwrap_or(0);
        if self.scroll + 1 < len {
            self.scroll += 1;
        }
    }

    // === Requests drained by the event loop ===

    pub fn take_input_change(&mut self) -> Option<String> {
        self.pending_input.take()
    }

    pub fn take_submit_request(&mut self) -> bool {
        std::mem::take(&mut self.submit_requested)
    }

    pub fn take_connect_request(&mut self) -> bool {
        std::mem::take(&mut self.connect_requested)
    }

    // === Worker events ===

    pub fn apply_ready(&mut self, endpoint: String, wallet_available: bool) {
        self.endpoint = endpoint;
        self.wallet_available = wallet_available;
        self.set_status("Provider ready", StatusLevel::Info);
    }

    pub fn apply_settled(&mut self, value: String) {
        self.settled_input = value;
    }

    pub fn apply_wallet(&mut self, address: Address, prefill: bool) {
        self.wallet = Some(address);
        self.input = checksum(&address);
        self.settled_input = self.input.clone();
        self.pending_input = None;
        if !prefill {
            self.set_status("Wallet connected!", StatusLevel::Info);
        }
    }

    pub fn apply_query(&mut self, generation: u64, state: QueryState, cached_queries: usize) {
        // events from one worker arrive in order, but never go backwards
        if generation < self.generation {
            return;
        }
        self.generation = generation;
        self.cached_queries = cached_queries;
        if matches!(state, QueryState::Success(_)) {
            self.has_queried = true;
            self.scroll = 0;
        }
        self.query = state;
    }

    pub fn apply_error(&mut self, message: String) {
        self.set_status(message, StatusLevel::Error);
    }
}
