//! Tournament and TournamentError.

use crate::models::cursor::RevealCursor;
use crate::models::team::Team;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Title shown before the organizer types their own.
pub const DEFAULT_TITLE: &str = "Giải Giao Hữu Hoàng Mai";
/// Team count offered on a fresh form.
pub const DEFAULT_TEAM_COUNT: i64 = 6;
/// Seconds between two reveal ticks on a fresh form.
pub const DEFAULT_REVEAL_DELAY_SECS: f64 = 0.1;
/// Longest accepted pause between two reveal ticks.
pub const MAX_REVEAL_DELAY_SECS: f64 = 3600.0;

const DEFAULT_PLAYERS: &str =
    "An\nBình\nCường\nDung\nGiang\nHương\nKhánh\nLinh\nMinh\nNam\nNga\nPhong";
const DEFAULT_SEEDS: &str = "An\nCường";

/// Errors that can occur during tournament operations.
///
/// `Display` renders the message shown to the organizer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// Requested team count is zero or negative.
    InvalidTeamCount(i64),
    /// Fewer distinct participants than requested teams.
    InsufficientPlayers { players: usize, teams: usize },
    /// More seeds than teams, so seeds cannot be kept apart.
    TooManySeeds { seeds: usize, teams: usize },
    /// Seeds that are missing from the participant list.
    UnknownSeed(Vec<String>),
    /// Reveal delay is negative, not a number, or above `MAX_REVEAL_DELAY_SECS`.
    InvalidRevealDelay,
    /// No team at this index in the current structure.
    TeamNotFound(usize),
    /// A name request for this team is already running.
    NameRequestInFlight(usize),
    /// Nothing has been generated yet.
    NoTeams,
    /// Another export of this tournament is still running.
    ExportInProgress,
    /// Building, rasterizing or encoding the roster image failed.
    ExportFailed(String),
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::InvalidTeamCount(_) => write!(f, "Số lượng đội phải lớn hơn 0."),
            TournamentError::InsufficientPlayers { .. } => {
                write!(f, "Không đủ người chơi để tạo số lượng đội mong muốn.")
            }
            TournamentError::TooManySeeds { .. } => write!(
                f,
                "Số lượng vận động viên hạt giống không thể nhiều hơn số lượng đội."
            ),
            TournamentError::UnknownSeed(names) => write!(
                f,
                "Vận động viên hạt giống \"{}\" không có trong danh sách người chơi.",
                names.join(", ")
            ),
            TournamentError::InvalidRevealDelay => {
                write!(f, "Thời gian hiện phải từ 0 đến {} giây.", MAX_REVEAL_DELAY_SECS)
            }
            TournamentError::TeamNotFound(index) => write!(f, "Không tìm thấy đội {}.", index + 1),
            TournamentError::NameRequestInFlight(index) => {
                write!(f, "Đang tạo tên cho đội {}.", index + 1)
            }
            TournamentError::NoTeams => write!(f, "Chưa có đội nào được tạo."),
            TournamentError::ExportInProgress => write!(f, "Đang xuất ảnh, vui lòng đợi."),
            TournamentError::ExportFailed(_) => write!(f, "Không thể xuất ảnh. Vui lòng thử lại."),
        }
    }
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Organizer settings that survive regeneration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TournamentConfig {
    pub title: String,
    /// Seconds between reveal ticks (non-negative, fractional allowed).
    pub reveal_delay_secs: f64,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            reveal_delay_secs: DEFAULT_REVEAL_DELAY_SECS,
        }
    }
}

/// Raw form input for one "generate teams" action.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RosterInput {
    /// Newline-separated participant names.
    pub players: String,
    /// Newline-separated seed names.
    #[serde(default)]
    pub seeds: String,
    pub team_count: i64,
}

impl Default for RosterInput {
    fn default() -> Self {
        Self {
            players: DEFAULT_PLAYERS.to_string(),
            seeds: DEFAULT_SEEDS.to_string(),
            team_count: DEFAULT_TEAM_COUNT,
        }
    }
}

/// Full tournament state: configuration, teams, reveal progress and export flag.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub config: TournamentConfig,
    /// Last roster input that produced `teams` (form defaults before the first generation).
    pub roster: RosterInput,
    pub teams: Vec<Team>,
    /// None before the first generation.
    pub reveal: Option<RevealCursor>,
    /// Bumped on every successful generation; stale name requests compare against it.
    pub generation: u64,
    pub generated_at: Option<DateTime<Utc>>,
    /// True while an image export is running.
    pub exporting: bool,
}

impl Tournament {
    /// Create a tournament with no teams.
    pub fn new(config: TournamentConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            roster: RosterInput::default(),
            teams: Vec::new(),
            reveal: None,
            generation: 0,
            generated_at: None,
            exporting: false,
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.config.title = title.into();
    }

    /// Set the reveal delay. Callers re-arm the reveal timer afterwards.
    pub fn set_reveal_delay(&mut self, secs: f64) -> Result<(), TournamentError> {
        if !(0.0..=MAX_REVEAL_DELAY_SECS).contains(&secs) {
            return Err(TournamentError::InvalidRevealDelay);
        }
        Duration::try_from_secs_f64(secs).map_err(|_| TournamentError::InvalidRevealDelay)?;
        self.config.reveal_delay_secs = secs;
        Ok(())
    }

    /// Delay between reveal ticks, capped at `MAX_REVEAL_DELAY_SECS`.
    pub fn reveal_delay(&self) -> Duration {
        let max = Duration::from_secs_f64(MAX_REVEAL_DELAY_SECS);
        Duration::try_from_secs_f64(self.config.reveal_delay_secs).map_or(max, |d| d.min(max))
    }

    /// Member count per team, in team order.
    pub fn team_sizes(&self) -> Vec<usize> {
        self.teams.iter().map(Team::len).collect()
    }

    /// Mutable reference to a team by index.
    pub fn get_team_mut(&mut self, index: usize) -> Option<&mut Team> {
        self.teams.get_mut(index)
    }
}

impl Default for Tournament {
    fn default() -> Self {
        Self::new(TournamentConfig::default())
    }
}
