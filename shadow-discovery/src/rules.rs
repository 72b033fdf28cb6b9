//! Include/exclude pattern sets and the two built-in presets.

use glob::{MatchOptions, Pattern};

use crate::DiscoverError;

/// Static asset extensions picked up by both presets.
const SITE_EXTENSIONS: &str = "html,css,js,jsx,tsx,json,png,jpg,jpeg,svg,woff,woff2";

const MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Glob patterns matched against `/`-separated paths relative to the project
/// root. `{a,b}` alternation is expanded before compiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryRules {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl DiscoveryRules {
    pub fn new<I, E, S, T>(include: I, exclude: E) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            include: include.into_iter().map(Into::into).collect(),
            exclude: exclude.into_iter().map(Into::into).collect(),
        }
    }

    /// Rules for deploying a project created by `shadow init`.
    pub fn deploy() -> Self {
        Self::new(
            [format!("**/*.{{{SITE_EXTENSIONS}}}")],
            [
                "**/node_modules/**",
                "**/.git/**",
                ".shadow/**",
                "programs/**",
                "target/**",
                "anchor/**",
                "shadow.json",
                "**/*.log",
            ],
        )
    }

    /// Rules for converting an existing site: skips build output and
    /// package-manager lock files.
    pub fn convert() -> Self {
        Self::new(
            [format!("**/*.{{{SITE_EXTENSIONS}}}")],
            [
                "**/node_modules/**",
                "**/.git/**",
                "dist/**",
                "build/**",
                ".next/**",
                ".shadow/**",
                "shadow.json",
                "shadow-integration.js",
                "package-lock.json",
                "yarn.lock",
            ],
        )
    }

    pub(crate) fn compile(&self) -> Result<CompiledRules, DiscoverError> {
        let include = compile_all(&self.include)?;
        let exclude = compile_all(&self.exclude)?;
        let prune = self
            .exclude
            .iter()
            .flat_map(|p| expand_braces(p))
            .filter_map(|p| p.strip_suffix("/**").map(str::to_owned))
            .map(|p| compile_one(&p))
            .collect::<Result<_, _>>()?;
        Ok(CompiledRules {
            include,
            exclude,
            prune,
        })
    }
}

pub(crate) struct CompiledRules {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
    /// Excludes of the form `dir/**`, with the suffix stripped: a directory
    /// matching one of these is never descended into.
    prune: Vec<Pattern>,
}

impl CompiledRules {
    pub(crate) fn accepts(&self, rel: &str) -> bool {
        self.include.iter().any(|p| p.matches_with(rel, MATCH))
            && !self.exclude.iter().any(|p| p.matches_with(rel, MATCH))
    }

    pub(crate) fn prunes(&self, rel_dir: &str) -> bool {
        self.prune.iter().any(|p| p.matches_with(rel_dir, MATCH))
    }
}

fn compile_all(patterns: &[String]) -> Result<Vec<Pattern>, DiscoverError> {
    patterns
        .iter()
        .flat_map(|p| expand_braces(p))
        .map(|p| compile_one(&p))
        .collect()
}

fn compile_one(pattern: &str) -> Result<Pattern, DiscoverError> {
    Pattern::new(pattern).map_err(|e| DiscoverError::Pattern {
        pattern: pattern.to_string(),
        source: e,
    })
}

/// Expand the first `{a,b,..}` group (recursively) into separate patterns.
///
/// Unbalanced braces are left as-is for the glob compiler to reject.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };
    let Some(close) = pattern[open..].find('}').map(|i| open + i) else {
        return vec![pattern.to_string()];
    };
    let (head, tail) = (&pattern[..open], &pattern[close + 1..]);
    pattern[open + 1..close]
        .split(',')
        .flat_map(|alt| expand_braces(&format!("{head}{alt}{tail}")))
        .collect()
}
