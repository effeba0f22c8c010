//! Roster image export: card layout, SVG scene and PNG rasterization.

use crate::models::{Tournament, TournamentError};
use std::io::Cursor;
use std::sync::{Arc, OnceLock};

pub const CARD_WIDTH: u32 = 360;
pub const BASE_CARD_HEIGHT: u32 = 160;
pub const PLAYER_ROW_HEIGHT: u32 = 32;
pub const GAP: u32 = 24;
pub const PADDING: u32 = 24;
/// Band reserved above the cards for the tournament title (even when the title is empty).
pub const TITLE_HEIGHT: u32 = 60;
pub const COLUMNS: usize = 2;
/// Supersampling factor applied when rasterizing.
pub const SCALE: u32 = 2;
pub const EXPORT_FILENAME: &str = "pickleball-teams.png";

const FONT_FAMILY: &str = "Inter, sans-serif";
const PLAYERS_TOP: u32 = 145;

/// Snapshot of everything the renderer reads, detached from the live tournament.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RosterSheet {
    pub title: String,
    pub teams: Vec<RosterCard>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RosterCard {
    pub name: Option<String>,
    pub members: Vec<String>,
}

impl RosterSheet {
    pub fn from_tournament(tournament: &Tournament) -> Self {
        Self {
            title: tournament.config.title.clone(),
            teams: tournament
                .teams
                .iter()
                .map(|t| RosterCard {
                    name: t.name.clone().filter(|n| !n.is_empty()),
                    members: t.members.clone(),
                })
                .collect(),
        }
    }
}

/// Encoded image ready to hand to the user.
#[derive(Clone, Debug)]
pub struct RosterImage {
    pub filename: &'static str,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

/// Escape `&`, `<` and `>` so user text cannot break the markup.
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Card positions and canvas size for a list of team sizes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RosterLayout {
    pub width: u32,
    pub height: u32,
    /// Height of each row: the tallest card in it.
    pub row_heights: Vec<u32>,
    /// Per card: (x, y, height).
    pub cards: Vec<(u32, u32, u32)>,
}

impl RosterLayout {
    pub fn compute(team_sizes: &[usize]) -> Self {
        let card_heights: Vec<u32> = team_sizes.iter().map(|&n| card_height(n)).collect();
        let row_heights: Vec<u32> = card_heights
            .chunks(COLUMNS)
            .filter_map(|row| row.iter().copied().max())
            .collect();

        let cols = COLUMNS as u32;
        let rows_total = row_heights.iter().sum::<u32>()
            + (row_heights.len() as u32).saturating_sub(1) * GAP;
        let width = cols * CARD_WIDTH + (cols - 1) * GAP + PADDING * 2;
        let height = rows_total + PADDING * 2 + TITLE_HEIGHT;

        let mut cards = Vec::with_capacity(card_heights.len());
        let mut y = PADDING + TITLE_HEIGHT;
        for (index, &h) in card_heights.iter().enumerate() {
            let col = (index % COLUMNS) as u32;
            let row = index / COLUMNS;
            if col == 0 && index > 0 {
                y += row_heights[row - 1] + GAP;
            }
            let x = PADDING + col * (CARD_WIDTH + GAP);
            cards.push((x, y, h));
        }

        Self {
            width,
            height,
            row_heights,
            cards,
        }
    }
}

fn card_height(members: usize) -> u32 {
    BASE_CARD_HEIGHT + members as u32 * PLAYER_ROW_HEIGHT
}

/// Build the full SVG scene for the sheet.
pub fn build_roster_svg(sheet: &RosterSheet) -> String {
    let sizes: Vec<usize> = sheet.teams.iter().map(|t| t.members.len()).collect();
    let layout = RosterLayout::compute(&sizes);
    let (w, h) = (layout.width, layout.height);

    let mut svg = format!(
        r##"<svg width="{w}" height="{h}" xmlns="http://www.w3.org/2000/svg"><defs><linearGradient id="nameGradient" x1="0%" y1="0%" x2="100%" y2="0%"><stop offset="0%" stop-color="#075985"/><stop offset="100%" stop-color="#0c4a6e"/></linearGradient></defs><rect x="0" y="0" width="100%" height="100%" fill="#f0f9ff"/>"##
    );

    if !sheet.title.is_empty() {
        svg.push_str(&format!(
            r##"<text x="{}" y="{}" font-size="28" font-weight="700" fill="#0369a1" font-family="{FONT_FAMILY}" text-anchor="middle">{}</text>"##,
            w / 2,
            PADDING + 30,
            escape_markup(&sheet.title)
        ));
    }

    for (index, (card, &(x, y, card_h))) in sheet.teams.iter().zip(&layout.cards).enumerate() {
        svg.push_str(&card_svg(index, card, x, y, card_h));
    }

    svg.push_str("</svg>");
    svg
}

/// One team card as an SVG group positioned at (`x`, `y`).
fn card_svg(index: usize, card: &RosterCard, x: u32, y: u32, card_h: u32) -> String {
    let mut group = format!(
        r##"<g transform="translate({x}, {y})"><rect x="0" y="0" width="{CARD_WIDTH}" height="{card_h}" fill="white" rx="16" stroke="#e0f2fe" stroke-width="1.5"/><text x="24" y="40" font-size="18" font-weight="700" fill="#0369a1" font-family="{FONT_FAMILY}">Đội {}</text>"##,
        index + 1
    );
    if let Some(name) = &card.name {
        group.push_str(&format!(
            r##"<text x="24" y="72" font-size="24" font-weight="700" fill="url(#nameGradient)" font-family="{FONT_FAMILY}">{}</text>"##,
            escape_markup(name)
        ));
    }
    group.push_str(&format!(
        r##"<line x1="24" y1="100" x2="{}" y2="100" stroke="#e0f2fe" stroke-width="1.5"/><text x="24" y="128" font-size="16" font-weight="600" fill="#0369a1" font-family="{FONT_FAMILY}">Thành viên</text><g transform="translate(24, 0)">"##,
        CARD_WIDTH - 24
    ));
    for (row, member) in card.members.iter().enumerate() {
        group.push_str(&format!(
            r##"<g transform="translate(0, {})"><rect x="0" y="0" width="{}" height="28" rx="6" fill="#f0f9ff"/><text x="12" y="19" font-size="14" font-weight="500" fill="#0c4a6e" font-family="{FONT_FAMILY}">{}</text></g>"##,
            PLAYERS_TOP + row as u32 * PLAYER_ROW_HEIGHT,
            CARD_WIDTH - 48,
            escape_markup(member)
        ));
    }
    group.push_str("</g></g>");
    group
}

fn system_fonts() -> Arc<usvg::fontdb::Database> {
    static FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            log::info!("Loaded {} font face(s) for roster export", db.len());
            Arc::new(db)
        })
        .clone()
}

/// Parse `svg`, render it at `SCALE` and encode the pixels as PNG.
pub fn rasterize_png(svg: &str) -> Result<(u32, u32, Vec<u8>), TournamentError> {
    let opts = usvg::Options {
        fontdb: system_fonts(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(svg, &opts)
        .map_err(|e| TournamentError::ExportFailed(format!("parse svg: {e}")))?;

    let size = tree.size();
    let width = (size.width().ceil() as u32).max(1) * SCALE;
    let height = (size.height().ceil() as u32).max(1) * SCALE;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| TournamentError::ExportFailed(format!("allocate {width}x{height} pixmap")))?;
    let scale = SCALE as f32;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    let rgba: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|px| {
            let c = px.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    let img = image::RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| TournamentError::ExportFailed("pixel buffer size mismatch".to_string()))?;

    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| TournamentError::ExportFailed(format!("encode png: {e}")))?;
    Ok((width, height, png))
}

/// Run the whole export pipeline for a sheet. Never returns partial output.
pub fn export_roster(sheet: &RosterSheet) -> Result<RosterImage, TournamentError> {
    let svg = build_roster_svg(sheet);
    let (width, height, png) = rasterize_png(&svg).inspect_err(|e| {
        if let TournamentError::ExportFailed(reason) = e {
            log::error!("Roster export failed: {}", reason);
        }
    })?;
    Ok(RosterImage {
        filename: EXPORT_FILENAME,
        width,
        height,
        png,
    })
}

/// Claim the export flag and snapshot the roster. Team data is not modified.
pub fn begin_export(tournament: &mut Tournament) -> Result<RosterSheet, TournamentError> {
    if tournament.exporting {
        return Err(TournamentError::ExportInProgress);
    }
    if tournament.teams.is_empty() {
        return Err(TournamentError::NoTeams);
    }
    tournament.exporting = true;
    Ok(RosterSheet::from_tournament(tournament))
}

/// Release the export flag, whether the export succeeded or not.
pub fn finish_export(tournament: &mut Tournament) {
    tournament.exporting = false;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape_markup("A & <B>"), "A &amp; &lt;B&gt;");
        assert_eq!(escape_markup("Bình"), "Bình");
    }

    #[test]
    fn rows_level_to_tallest_card() {
        let layout = RosterLayout::compute(&[3, 1, 2]);
        assert_eq!(layout.row_heights, vec![160 + 3 * 32, 160 + 2 * 32]);
        assert_eq!(layout.width, 2 * 360 + 24 + 48);
        assert_eq!(layout.height, 256 + 224 + 24 + 48 + 60);
        assert_eq!(layout.cards[0], (24, 84, 256));
        assert_eq!(layout.cards[1], (24 + 360 + 24, 84, 192));
        assert_eq!(layout.cards[2], (24, 84 + 256 + 24, 224));
    }

    #[test]
    fn empty_layout_keeps_title_band() {
        let layout = RosterLayout::compute(&[]);
        assert!(layout.cards.is_empty());
        assert_eq!(layout.height, 48 + 60);
    }

    #[test]
    fn svg_escapes_user_text_and_skips_missing_names() {
        let sheet = RosterSheet {
            title: "<Cup>".into(),
            teams: vec![
                RosterCard {
                    name: Some("A&B".into()),
                    members: vec!["x<y".into()],
                },
                RosterCard {
                    name: None,
                    members: vec!["z".into()],
                },
            ],
        };
        let svg = build_roster_svg(&sheet);
        assert!(svg.contains("&lt;Cup&gt;"));
        assert!(svg.contains("A&amp;B"));
        assert!(svg.contains("x&lt;y"));
        assert!(!svg.contains("<Cup>"));
        assert_eq!(svg.matches("url(#nameGradient)").count(), 1);
        assert!(svg.contains("Đội 2"));
    }

    #[test]
    fn every_card_group_is_placed_and_closed() {
        let sheet = RosterSheet {
            title: "Cup".into(),
            teams: vec![
                RosterCard {
                    name: None,
                    members: vec!["a".into(), "b".into()],
                },
                RosterCard::default(),
                RosterCard {
                    name: Some("N".into()),
                    members: vec!["c".into()],
                },
            ],
        };
        let svg = build_roster_svg(&sheet);
        assert!(svg.starts_with("<svg "));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<g ").count(), svg.matches("</g>").count());
        assert_eq!(svg.matches("<g ").count(), 3 * 2 + 3);

        let layout = RosterLayout::compute(&[2, 0, 1]);
        for &(x, y, _) in &layout.cards {
            assert!(svg.contains(&format!(r#"<g transform="translate({x}, {y})">"#)));
        }
    }

    #[test]
    fn empty_title_is_not_drawn() {
        let svg = build_roster_svg(&RosterSheet::default());
        assert!(!svg.contains("text-anchor"));
    }

    #[test]
    fn malformed_svg_is_export_failed() {
        assert!(matches!(
            rasterize_png("<svg"),
            Err(TournamentError::ExportFailed(_))
        ));
    }
}
