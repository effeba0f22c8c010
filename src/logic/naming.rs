//! Team-name generation: the generator seam and per-team request bookkeeping.

use crate::models::{Tournament, TournamentError};
use rand::seq::SliceRandom;
use std::future::Future;

/// Failure reported by a name generator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NameGenerationError(pub String);

impl std::fmt::Display for NameGenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "team name generation failed: {}", self.0)
    }
}

/// Produces a short whimsical team name for a tournament.
pub trait TeamNameGenerator: Send + Sync {
    fn generate(
        &self,
        tournament_title: &str,
    ) -> impl Future<Output = Result<String, NameGenerationError>> + Send;
}

static ADJECTIVES: &[&str] = &[
    "Tia Chớp", "Bão Táp", "Siêu Tốc", "Bất Bại", "Rực Lửa", "Lốc Xoáy", "Thần Sấm",
    "Vui Vẻ", "Lém Lỉnh", "Ngẫu Hứng", "Quyết Thắng", "Tí Hon",
];

static NOUNS: &[&str] = &[
    "Đại Bàng", "Cá Mập", "Hổ Vằn", "Rồng Xanh", "Kỳ Lân", "Chim Sẻ", "Báo Đốm",
    "Dưa Muối", "Vợt Vàng", "Bóng Nảy", "Sóc Nhí", "Gấu Trúc",
];

/// Built-in generator: random noun + adjective from fixed word lists.
#[derive(Clone, Copy, Debug, Default)]
pub struct WordListNameGenerator;

impl WordListNameGenerator {
    fn pick(&self) -> Option<String> {
        let mut rng = rand::thread_rng();
        let noun = NOUNS.choose(&mut rng)?;
        let adjective = ADJECTIVES.choose(&mut rng)?;
        Some(format!("{noun} {adjective}"))
    }
}

impl TeamNameGenerator for WordListNameGenerator {
    fn generate(
        &self,
        _tournament_title: &str,
    ) -> impl Future<Output = Result<String, NameGenerationError>> + Send {
        let name = self
            .pick()
            .ok_or_else(|| NameGenerationError("empty word list".to_string()));
        std::future::ready(name)
    }
}

/// Handle for one in-flight name request, tied to the team structure it was issued for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NameTicket {
    pub team_index: usize,
    pub generation: u64,
}

/// Mark `team_index` as loading. At most one request per team may be in flight.
pub fn begin_name_request(
    tournament: &mut Tournament,
    team_index: usize,
) -> Result<NameTicket, TournamentError> {
    let generation = tournament.generation;
    let team = tournament
        .get_team_mut(team_index)
        .ok_or(TournamentError::TeamNotFound(team_index))?;
    if team.name_loading {
        return Err(TournamentError::NameRequestInFlight(team_index));
    }
    team.name_loading = true;
    Ok(NameTicket {
        team_index,
        generation,
    })
}

/// Apply the outcome of a name request.
///
/// Results for a superseded generation are dropped and false is returned. Otherwise the
/// loading flag is cleared; a generated name is stored, a failure is only logged.
pub fn complete_name_request(
    tournament: &mut Tournament,
    ticket: NameTicket,
    result: Result<String, NameGenerationError>,
) -> bool {
    if ticket.generation != tournament.generation {
        log::info!(
            "Discarding name for team {} of superseded generation {}",
            ticket.team_index + 1,
            ticket.generation
        );
        return false;
    }
    let Some(team) = tournament.get_team_mut(ticket.team_index) else {
        return false;
    };
    team.name_loading = false;
    match result {
        Ok(name) => {
            team.name = Some(name);
            true
        }
        Err(e) => {
            log::error!("Failed to generate name for team {}: {}", ticket.team_index + 1, e);
            false
        }
    }
}
