use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::composer::{CardState, Phase};
use crate::export::card_filename;
use crate::inline::{InlinedAsset, Provenance};
use crate::species::capitalize;
use crate::theme::{Theme, TypeName};

pub const CARD_WIDTH: u32 = 720;
pub const CARD_HEIGHT: u32 = 440;

const TITLE: &str = "GitHub Pokémon Card";
const FONT: &str = "sans-serif";
const MUTED: &str = "#64748b";
const PLACEHOLDER: &str = "#e2e8f0";
const ERROR: &str = "#dc2626";
const DASH: &str = "—";

/// A labelled number in the stats grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    pub label: &'static str,
    pub value: Option<u64>,
}

/// Render-ready projection of a [`CardState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub phase: Phase,
    pub theme: Theme,
    pub active_type: Option<TypeName>,
    pub login: Option<String>,
    pub profile_loading: bool,
    pub avatar: Option<InlinedAsset>,
    pub species_name: Option<String>,
    pub species_loading: bool,
    pub sprite: Option<InlinedAsset>,
    /// Type names, primary first.
    pub types: Vec<String>,
    pub stats: Vec<Stat>,
    pub error: Option<String>,
    pub filename: String,
}

impl CardView {
    pub fn from_state(state: &CardState, now: DateTime<Utc>) -> Self {
        let profile = state.profile.ready();
        let species = state.species.ready();

        let stats = vec![
            Stat {
                label: "HP",
                value: profile.map(|p| p.account_age_days_at(now)),
            },
            Stat {
                label: "Attack",
                value: state.commits.ready().copied(),
            },
            Stat {
                label: "Defense",
                value: profile.map(|p| p.public_repos),
            },
            Stat {
                label: "Charm",
                value: profile.map(|p| p.followers),
            },
        ];

        Self {
            phase: state.phase,
            theme: state.theme(),
            active_type: state.active_type(),
            login: profile.map(|p| p.login.clone()),
            profile_loading: state.profile.is_loading(),
            avatar: state.avatar.clone(),
            species_name: species.map(|s| s.display_name()),
            species_loading: state.species.is_loading(),
            sprite: state.sprite.clone(),
            types: species
                .map(|s| s.sorted_types().iter().map(|t| t.name().to_owned()).collect())
                .unwrap_or_default(),
            stats,
            error: state.error.clone(),
            filename: card_filename(
                profile.map(|p| p.login.as_str()),
                state.username.as_deref(),
            ),
        }
    }

    /// Images on the card that still point at the network.
    pub fn remote_assets(&self) -> Vec<&str> {
        [&self.avatar, &self.sprite]
            .into_iter()
            .flatten()
            .filter(|asset| asset.provenance == Provenance::Remote)
            .map(|asset| asset.source.as_str())
            .collect()
    }
}

/// Whether remote image references make it into the SVG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetPolicy {
    /// Reference every image, inlined or not.
    All,
    /// Draw placeholders for images that were not inlined.
    InlinedOnly,
}

/// The rendered card, input of the exporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSurface {
    pub view: CardView,
}

impl CardSurface {
    pub fn new(view: CardView) -> Self {
        Self { view }
    }

    pub fn width(&self) -> u32 {
        CARD_WIDTH
    }

    pub fn height(&self) -> u32 {
        CARD_HEIGHT
    }

    pub fn svg(&self, policy: AssetPolicy) -> String {
        render_svg(&self.view, policy)
    }
}

pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn usable(asset: &Option<InlinedAsset>, policy: AssetPolicy) -> Option<&InlinedAsset> {
    asset
        .as_ref()
        .filter(|a| policy == AssetPolicy::All || a.provenance == Provenance::Inlined)
}

fn gradient(svg: &mut String, id: &str, theme: Theme, diagonal: bool) {
    let (x2, y2) = if diagonal { (1, 1) } else { (1, 0) };
    let _ = write!(
        svg,
        r#"<linearGradient id="{id}" x1="0" y1="0" x2="{x2}" y2="{y2}"><stop offset="0" stop-color="{}"/><stop offset="1" stop-color="{}"/></linearGradient>"#,
        theme.from, theme.to
    );
}

fn text(svg: &mut String, x: u32, y: u32, size: u32, fill: &str, weight: u32, content: &str) {
    let _ = write!(
        svg,
        r#"<text x="{x}" y="{y}" font-family="{FONT}" font-size="{size}" font-weight="{weight}" fill="{fill}">{}</text>"#,
        escape_xml(content)
    );
}

/// Lay the card out as an SVG document.
pub fn render_svg(view: &CardView, policy: AssetPolicy) -> String {
    let mut svg = String::with_capacity(4096);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{CARD_WIDTH}" height="{CARD_HEIGHT}" viewBox="0 0 {CARD_WIDTH} {CARD_HEIGHT}">"#
    );

    svg.push_str("<defs>");
    gradient(&mut svg, "card-bg", view.theme, true);
    gradient(&mut svg, "stat-bg", Theme::stat_fill(view.active_type), true);
    for (i, name) in view.types.iter().enumerate() {
        gradient(&mut svg, &format!("chip-{i}"), Theme::chip(name), false);
    }
    svg.push_str(r#"<clipPath id="avatar-clip"><circle cx="72" cy="128" r="32"/></clipPath>"#);
    svg.push_str("</defs>");

    let _ = write!(
        svg,
        r#"<rect width="{CARD_WIDTH}" height="{CARD_HEIGHT}" rx="24" fill="url(#card-bg)"/>"#
    );
    text(&mut svg, 32, 48, 24, "#ffffff", 700, TITLE);
    svg.push_str(
        r##"<rect x="16" y="72" width="688" height="352" rx="16" fill="#ffffff" fill-opacity="0.85"/>"##,
    );

    render_trainer(&mut svg, view, policy);
    render_partner(&mut svg, view, policy);
    render_stats(&mut svg, view);

    svg.push_str("</svg>");
    svg
}

fn render_trainer(svg: &mut String, view: &CardView, policy: AssetPolicy) {
    match usable(&view.avatar, policy) {
        Some(avatar) if !view.profile_loading => {
            let _ = write!(
                svg,
                r#"<image x="40" y="96" width="64" height="64" clip-path="url(#avatar-clip)" preserveAspectRatio="xMidYMid slice" xlink:href="{}"/>"#,
                escape_xml(&avatar.href)
            );
        }
        _ => {
            let _ = write!(svg, r#"<circle cx="72" cy="128" r="32" fill="{PLACEHOLDER}"/>"#);
        }
    }

    text(svg, 120, 116, 13, MUTED, 400, "Trainer");
    let login = if view.profile_loading {
        "Loading..."
    } else {
        view.login.as_deref().unwrap_or("Unknown")
    };
    text(svg, 120, 142, 20, "#0f172a", 600, login);
}

fn render_partner(svg: &mut String, view: &CardView, policy: AssetPolicy) {
    text(svg, 40, 200, 17, "#0f172a", 500, "Partner Pokémon");

    match usable(&view.sprite, policy) {
        Some(sprite) => {
            let _ = write!(
                svg,
                r#"<image x="40" y="216" width="112" height="112" image-rendering="optimizeSpeed" xlink:href="{}"/>"#,
                escape_xml(&sprite.href)
            );
        }
        None => {
            svg.push_str(
                r##"<rect x="40" y="216" width="112" height="112" rx="8" fill="#f1f5f9"/>"##,
            );
            let label = if view.species_loading { "..." } else { "No Pokémon" };
            let _ = write!(
                svg,
                r##"<text x="96" y="276" text-anchor="middle" font-family="{FONT}" font-size="13" fill="#94a3b8">{label}</text>"##
            );
        }
    }

    text(svg, 172, 232, 13, MUTED, 400, "Name");
    text(
        svg,
        172,
        258,
        20,
        "#0f172a",
        600,
        view.species_name.as_deref().unwrap_or(DASH),
    );
    text(svg, 172, 290, 13, MUTED, 400, "Type(s)");

    if view.types.is_empty() {
        text(svg, 172, 318, 13, "#0f172a", 400, DASH);
    }
    let mut x = 172;
    for (i, name) in view.types.iter().enumerate() {
        let label = capitalize(name);
        let width = 16 + 7 * label.chars().count() as u32;
        let _ = write!(
            svg,
            r##"<rect x="{x}" y="302" width="{width}" height="22" rx="11" fill="url(#chip-{i})"/><text x="{}" y="317" text-anchor="middle" font-family="{FONT}" font-size="12" font-weight="500" fill="#ffffff">{}</text>"##,
            x + width / 2,
            escape_xml(&label)
        );
        x += width + 8;
    }

    if let Some(error) = &view.error {
        text(svg, 40, 356, 13, ERROR, 400, error);
    }
}

fn render_stats(svg: &mut String, view: &CardView) {
    text(svg, 384, 116, 17, "#0f172a", 500, "Stats");

    for (i, stat) in view.stats.iter().enumerate() {
        let x = 384 + (i as u32 % 2) * 160;
        let y = 132 + (i as u32 / 2) * 88;
        let _ = write!(
            svg,
            r#"<rect x="{x}" y="{y}" width="148" height="76" rx="10" fill="url(#stat-bg)"/>"#
        );
        let _ = write!(
            svg,
            r##"<text x="{}" y="{}" font-family="{FONT}" font-size="12" fill="#ffffff" fill-opacity="0.9">{}</text>"##,
            x + 12,
            y + 24,
            stat.label
        );
        let value = stat.value.map_or_else(|| DASH.to_owned(), |v| v.to_string());
        text(svg, x + 12, y + 56, 20, "#ffffff", 600, &value);
    }
}
