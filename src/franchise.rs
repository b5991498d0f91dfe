use crate::util::name_key;
use crate::{Colors, Gender};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A team the pages list even when no document exists for it yet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FranchiseTemplate {
    pub name: String,
    pub city: String,
    pub gender: Gender,
    #[serde(default)]
    pub colors: Colors,
}

impl FranchiseTemplate {
    fn builtin(name: &str, city: &str, gender: Gender, primary: &str, secondary: &str) -> Self {
        FranchiseTemplate {
            name: name.into(),
            city: city.into(),
            gender,
            colors: Colors {
                primary: primary.into(),
                secondary: secondary.into(),
            },
        }
    }
}

pub fn builtin_franchises() -> Vec<FranchiseTemplate> {
    use Gender::{Men, Women};
    vec![
        FranchiseTemplate::builtin("Riverside Hawks", "Riverside", Men, "#0b3d91", "#f2c500"),
        FranchiseTemplate::builtin("Lakeside Otters", "Lakeside", Men, "#006d5b", "#ffffff"),
        FranchiseTemplate::builtin("Hillcrest Comets", "Hillcrest", Women, "#6a1b9a", "#ffd54f"),
        FranchiseTemplate::builtin("Harbor Tides", "Harbor City", Women, "#01579b", "#ff7043"),
    ]
}

/// Bundled logo assets, by team name. These win over uploaded logos, which are often low
/// resolution.
const LOGO_OVERRIDES: &[(&str, &str)] = &[
    ("Riverside Hawks", "/images/teams/riverside-hawks.svg"),
    ("Lakeside Otters", "/images/teams/lakeside-otters.svg"),
    ("Hillcrest Comets", "/images/teams/hillcrest-comets.svg"),
    ("Harbor Tides", "/images/teams/harbor-tides.svg"),
];

pub const PLACEHOLDER_LOGO: &str = "/images/teams/placeholder.svg";

/// Resolves the logo a page shows for a team: bundled asset, then uploaded logo, then the
/// placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoResolver {
    overrides: BTreeMap<String, String>,
    placeholder: String,
}

impl LogoResolver {
    pub fn new<I, K, V>(overrides: I, placeholder: impl Into<String>) -> LogoResolver
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        LogoResolver {
            overrides: overrides
                .into_iter()
                .map(|(name, asset)| (name_key(name.as_ref()), asset.into()))
                .collect(),
            placeholder: placeholder.into(),
        }
    }

    /// The bundled overrides plus `extra`, which replace bundled entries of the same name.
    pub fn with_builtin<I, K, V>(extra: I, placeholder: impl Into<String>) -> LogoResolver
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut resolver = LogoResolver::new(LOGO_OVERRIDES.iter().copied(), placeholder);
        for (name, asset) in extra {
            resolver
                .overrides
                .insert(name_key(name.as_ref()), asset.into());
        }
        resolver
    }

    pub fn resolve(&self, team_name: &str, stored_url: Option<&str>) -> String {
        if let Some(asset) = self.overrides.get(&name_key(team_name)) {
            return asset.clone();
        }
        match stored_url.map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => self.placeholder.clone(),
        }
    }
}

impl Default for LogoResolver {
    fn default() -> LogoResolver {
        LogoResolver::with_builtin(Vec::<(String, String)>::new(), PLACEHOLDER_LOGO)
    }
}

#[cfg(test)]
mod tests {
    use super::{LogoResolver, PLACEHOLDER_LOGO};

    #[test]
    fn override_then_stored_then_placeholder() {
        let resolver = LogoResolver::default();
        assert_eq!(
            resolver.resolve("  riverside HAWKS", Some("https://cdn.test/hawks.png")),
            "/images/teams/riverside-hawks.svg"
        );
        assert_eq!(
            resolver.resolve("Northfield Bears", Some("https://cdn.test/bears.png")),
            "https://cdn.test/bears.png"
        );
        assert_eq!(resolver.resolve("Northfield Bears", Some(" ")), PLACEHOLDER_LOGO);
        assert_eq!(resolver.resolve("Northfield Bears", None), PLACEHOLDER_LOGO);
    }

    #[test]
    fn configured_overrides_replace_bundled_ones() {
        let resolver = LogoResolver::with_builtin(
            [("Riverside Hawks", "/custom/hawks.svg")],
            "/none.svg",
        );
        assert_eq!(resolver.resolve("Riverside Hawks", None), "/custom/hawks.svg");
        assert_eq!(resolver.resolve("Harbor Tides", None), "/images/teams/harbor-tides.svg");
        assert_eq!(resolver.resolve("Unknown", None), "/none.svg");
    }
}
