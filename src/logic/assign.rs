//! Team generation: roster parsing, validation and seeded balanced assignment.

use crate::models::{RevealCursor, RosterInput, Team, Tournament, TournamentError};
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Split newline-separated text into names: trimmed, non-empty, first occurrence wins.
pub fn parse_roster(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.split('\n')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

/// Validate the input and randomly partition participants into `team_count` teams.
///
/// Checks run in order and the first failure wins:
/// 1. team count must be positive,
/// 2. there must be at least as many participants as teams,
/// 3. there must be no more seeds than teams,
/// 4. every seed must be a participant.
///
/// Seeds go one per team (seed `i` to team `i` after shuffling). Each regular then joins
/// the team with the fewest members, ties going to the lowest index.
pub fn assign_teams<R: Rng + ?Sized>(
    players_text: &str,
    seeds_text: &str,
    team_count: i64,
    rng: &mut R,
) -> Result<Vec<Vec<String>>, TournamentError> {
    if team_count <= 0 {
        return Err(TournamentError::InvalidTeamCount(team_count));
    }
    let players = parse_roster(players_text);
    let seeds = parse_roster(seeds_text);

    let teams = usize::try_from(team_count)
        .map_err(|_| TournamentError::InvalidTeamCount(team_count))?;
    if players.len() < teams {
        return Err(TournamentError::InsufficientPlayers {
            players: players.len(),
            teams,
        });
    }
    if seeds.len() > teams {
        return Err(TournamentError::TooManySeeds {
            seeds: seeds.len(),
            teams,
        });
    }
    let missing: Vec<String> = seeds
        .iter()
        .filter(|seed| !players.contains(*seed))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(TournamentError::UnknownSeed(missing));
    }

    let mut seeds = seeds;
    let mut regulars: Vec<String> = players.into_iter().filter(|p| !seeds.contains(p)).collect();
    seeds.shuffle(rng);
    regulars.shuffle(rng);

    let mut out: Vec<Vec<String>> = vec![Vec::new(); teams];
    for (team, seed) in out.iter_mut().zip(seeds) {
        team.push(seed);
    }
    for player in regulars {
        // min_by_key keeps the first minimum, so ties go to the lowest index.
        if let Some(smallest) = out.iter_mut().min_by_key(|team| team.len()) {
            smallest.push(player);
        }
    }
    Ok(out)
}

/// Run validation and assignment for `input` and install the result on the tournament.
///
/// On success the previous teams and names are replaced, the generation is bumped and the
/// reveal cursor restarts at team 0 with no players shown. On failure nothing changes.
pub fn generate_teams<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    input: &RosterInput,
    rng: &mut R,
) -> Result<(), TournamentError> {
    let teams = assign_teams(&input.players, &input.seeds, input.team_count, rng)?;

    tournament.teams = teams.into_iter().map(Team::with_members).collect();
    tournament.roster = input.clone();
    tournament.generation += 1;
    tournament.generated_at = Some(Utc::now());
    tournament.reveal = Some(RevealCursor::start());

    log::info!(
        "Generated {} team(s) for {} participant(s) in tournament {}",
        tournament.teams.len(),
        tournament.teams.iter().map(Team::len).sum::<usize>(),
        tournament.id
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn parse_roster_trims_and_dedupes() {
        let names = parse_roster("  An \n\nBình\r\nAn\n   \nCường");
        assert_eq!(names, vec!["An", "Bình", "Cường"]);
    }

    #[test]
    fn ties_go_to_lowest_index() {
        let mut rng = StdRng::seed_from_u64(7);
        // No seeds: 5 regulars into 3 teams fill 0,1,2,0,1.
        let teams = assign_teams("a\nb\nc\nd\ne", "", 3, &mut rng).unwrap();
        let sizes: Vec<usize> = teams.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn seeds_fill_leading_teams_first() {
        let mut rng = StdRng::seed_from_u64(3);
        let teams = assign_teams("a\nb\nc\nd", "a\nb", 3, &mut rng).unwrap();
        let seeded: HashSet<&str> = teams[..2].iter().map(|t| t[0].as_str()).collect();
        assert_eq!(seeded, HashSet::from(["a", "b"]));
        // First regular goes to the empty team 2.
        assert_eq!(teams[2].len(), 1);
        assert_eq!(teams.iter().map(Vec::len).sum::<usize>(), 4);
    }

    #[test]
    fn failed_generation_leaves_state_untouched() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut t = Tournament::default();
        generate_teams(&mut t, &RosterInput::default(), &mut rng).unwrap();
        let before = t.teams.clone();
        let generation = t.generation;

        let bad = RosterInput {
            players: "An\nBình".into(),
            seeds: String::new(),
            team_count: 5,
        };
        assert!(generate_teams(&mut t, &bad, &mut rng).is_err());
        assert_eq!(t.teams, before);
        assert_eq!(t.generation, generation);
    }
}
