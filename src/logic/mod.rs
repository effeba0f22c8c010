//! Team divider business logic: assignment, reveal, naming, export.

mod assign;
mod naming;
mod render;
mod reveal;

pub use assign::{assign_teams, generate_teams, parse_roster};
pub use naming::{
    begin_name_request, complete_name_request, NameGenerationError, NameTicket,
    TeamNameGenerator, WordListNameGenerator,
};
pub use render::{
    begin_export, build_roster_svg, escape_markup, export_roster, finish_export, rasterize_png,
    RosterCard, RosterImage, RosterLayout, RosterSheet, EXPORT_FILENAME, SCALE,
};
pub use reveal::{
    advance_reveal, is_terminal, next_cursor, reveal_pending, visible_count, visible_roster,
    RevealTimer,
};
