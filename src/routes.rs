use crate::snapshot::Snapshot;
use crate::util::slug;
use derive_more::Deref;
use std::fmt::{self, Display};

/// Paths no crawler should follow.
const DISALLOWED: &[&str] = &["/admin", "/api", "/setup"];

const STATIC_PAGES: &[&str] = &["/", "/news", "/standings", "/schedule"];

pub fn team_path(team_name: &str) -> String {
    format!("/teams/{}", slug(team_name))
}

pub fn player_path(team_name: &str, number: u8) -> String {
    format!("{}/players/{}", team_path(team_name), number)
}

/// Absolute URLs of every public page.
#[derive(Debug, Clone, PartialEq, Eq, Deref)]
pub struct Sitemap(Vec<String>);

impl Display for Sitemap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            f,
            r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#
        )?;
        for url in &self.0 {
            writeln!(f, "  <url><loc>{}</loc></url>", escape(url))?;
        }
        writeln!(f, "</urlset>")
    }
}

fn escape(url: &str) -> String {
    url.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn absolute(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

pub fn sitemap(base_url: &str, snapshot: &Snapshot) -> Sitemap {
    let mut urls = STATIC_PAGES
        .iter()
        .map(|path| absolute(base_url, path))
        .collect::<Vec<_>>();
    let mut teams = snapshot.teams.iter().collect::<Vec<_>>();
    teams.sort_by(|a, b| a.team.name.cmp(&b.team.name));
    for doc in teams {
        urls.push(absolute(base_url, &team_path(&doc.team.name)));
        let mut numbers = doc.roster.iter().map(|p| p.number).collect::<Vec<_>>();
        numbers.sort_unstable();
        urls.extend(
            numbers
                .into_iter()
                .map(|number| absolute(base_url, &player_path(&doc.team.name, number))),
        );
    }
    Sitemap(urls)
}

pub fn robots(base_url: &str) -> String {
    let mut out = String::from("User-agent: *\nAllow: /\n");
    for path in DISALLOWED {
        out.push_str("Disallow: ");
        out.push_str(path);
        out.push('\n');
    }
    out.push('\n');
    out.push_str("Sitemap: ");
    out.push_str(&absolute(base_url, "/sitemap.xml"));
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::{player_path, robots, sitemap, team_path};
    use crate::snapshot::{Snapshot, TeamDocument};
    use crate::{Gender, Player, Team};

    #[test]
    fn paths() {
        assert_eq!(team_path("Riverside Hawks"), "/teams/riverside-hawks");
        assert_eq!(team_path("  St. Mary's  B.C. "), "/teams/st-mary-s-b-c");
        assert_eq!(player_path("Harbor Tides", 7), "/teams/harbor-tides/players/7");
    }

    #[test]
    fn sitemap_lists_teams_and_players() {
        let team = Team::new("Lakeside Otters", "Lakeside", Gender::Men);
        let roster = vec![
            Player::new(team.id, "B", "B", 12, "L2"),
            Player::new(team.id, "A", "A", 4, "L1"),
        ];
        let snapshot = Snapshot {
            teams: vec![TeamDocument {
                team,
                roster,
                staff: Vec::new(),
            }],
            ..Snapshot::default()
        };
        let map = sitemap("https://league.test/", &snapshot);
        assert_eq!(
            map.as_slice(),
            [
                "https://league.test/",
                "https://league.test/news",
                "https://league.test/standings",
                "https://league.test/schedule",
                "https://league.test/teams/lakeside-otters",
                "https://league.test/teams/lakeside-otters/players/4",
                "https://league.test/teams/lakeside-otters/players/12",
            ]
        );
        let xml = map.to_string();
        assert!(xml.contains("<loc>https://league.test/teams/lakeside-otters/players/4</loc>"));
        assert!(xml.trim_end().ends_with("</urlset>"));
    }

    #[test]
    fn robots_hides_admin_pages() {
        let txt = robots("https://league.test");
        for path in ["/admin", "/api", "/setup"] {
            assert!(txt.contains(&format!("Disallow: {}\n", path)));
        }
        assert!(txt.ends_with("Sitemap: https://league.test/sitemap.xml\n"));
    }
}
