//! Integration tests for roster export: image size, export flag and snapshot isolation.

use pickleball_team_divider::{
    begin_export, build_roster_svg, export_roster, finish_export, generate_teams, RosterInput,
    RosterLayout, RosterSheet, Tournament, TournamentError, EXPORT_FILENAME, SCALE,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn generated() -> Tournament {
    let mut t = Tournament::default();
    generate_teams(&mut t, &RosterInput::default(), &mut StdRng::seed_from_u64(4)).unwrap();
    t
}

#[test]
fn exported_png_is_supersampled_layout() {
    let mut t = generated();
    t.teams[1].name = Some("Rồng Xanh <Tí Hon>".into());
    let sheet = begin_export(&mut t).unwrap();
    let image = export_roster(&sheet).unwrap();
    finish_export(&mut t);

    let layout = RosterLayout::compute(&t.team_sizes());
    assert_eq!(image.filename, EXPORT_FILENAME);
    assert_eq!((image.width, image.height), (layout.width * SCALE, layout.height * SCALE));

    let decoded = image::load_from_memory(&image.png).unwrap();
    assert_eq!(decoded.width(), layout.width * SCALE);
    assert_eq!(decoded.height(), layout.height * SCALE);

    // Background colour #f0f9ff in the corner.
    let px = decoded.to_rgba8().get_pixel(0, 0).0;
    assert_eq!(px, [0xf0, 0xf9, 0xff, 0xff]);
}

#[test]
fn export_is_not_reentrant() {
    let mut t = generated();
    begin_export(&mut t).unwrap();
    assert_eq!(begin_export(&mut t), Err(TournamentError::ExportInProgress));
    finish_export(&mut t);
    assert!(begin_export(&mut t).is_ok());
}

#[test]
fn export_without_teams_fails() {
    let mut t = Tournament::default();
    assert_eq!(begin_export(&mut t), Err(TournamentError::NoTeams));
    assert!(!t.exporting);
}

#[test]
fn snapshot_does_not_touch_team_data() {
    let mut t = generated();
    let before = t.teams.clone();
    let sheet = begin_export(&mut t).unwrap();
    assert_eq!(t.teams, before);
    assert_eq!(sheet.teams.len(), before.len());
    assert_eq!(sheet.title, t.config.title);
    assert!(sheet.teams.iter().all(|c| c.name.is_none()));
}

#[test]
fn svg_lists_every_member_once() {
    let t = generated();
    let svg = build_roster_svg(&RosterSheet::from_tournament(&t));
    for member in t.teams.iter().flat_map(|team| &team.members) {
        assert_eq!(svg.matches(&format!(">{member}<")).count(), 1, "{member}");
    }
    assert!(svg.contains("Giải Giao Hữu Hoàng Mai"));
}
