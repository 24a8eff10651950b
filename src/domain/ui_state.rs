//! Loading / error / empty / content state shared by both widgets.
//!
//! Every fetch goes through `Loading` and hands out a [`FetchTicket`]. Only
//! the ticket from the most recent `begin_fetch` may resolve the machine; an
//! older ticket is reported stale and leaves the state untouched.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiState {
    Loading,
    Error(String),
    Empty,
    Content,
}

/// Which regions of a widget are visible for a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Regions {
    pub loading: bool,
    pub error: bool,
    pub list: bool,
    pub pagination: bool,
}

impl UiState {
    pub fn regions(&self, has_multiple_pages: bool) -> Regions {
        match self {
            UiState::Loading => Regions {
                loading: true,
                error: false,
                list: false,
                pagination: false,
            },
            UiState::Error(_) => Regions {
                loading: false,
                error: true,
                list: false,
                pagination: false,
            },
            // The list region carries the "nothing here" notice.
            UiState::Empty => Regions {
                loading: false,
                error: false,
                list: true,
                pagination: false,
            },
            UiState::Content => Regions {
                loading: false,
                error: false,
                list: true,
                pagination: has_multiple_pages,
            },
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            UiState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Terminal state a fetch resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Content,
    Empty,
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiStateMachine {
    state: UiState,
    generation: u64,
}

impl Default for UiStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl UiStateMachine {
    pub fn new() -> Self {
        Self {
            state: UiState::Loading,
            generation: 0,
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Enters `Loading` and invalidates every earlier ticket.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.state = UiState::Loading;
        FetchTicket {
            generation: self.generation,
        }
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Returns `false` (and changes nothing) for a stale ticket.
    pub fn resolve(&mut self, ticket: FetchTicket, resolution: Resolution) -> bool {
        if !self.is_current(ticket) {
            log::info!(
                "Dropping stale fetch result (generation {}, current {})",
                ticket.generation,
                self.generation
            );
            return false;
        }
        self.state = match resolution {
            Resolution::Content => UiState::Content,
            Resolution::Empty => UiState::Empty,
            Resolution::Error(message) => UiState::Error(message),
        };
        true
    }
}
