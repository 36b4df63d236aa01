use std::fmt;

use serde::Deserialize;

/// Highest percentage the aggregated bar reaches before results are confirmed.
pub const PROGRESS_CEILING: u8 = 90;

/// Named sub-task of the remote analysis pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModuleName {
    Google,
    Youtube,
    Summary,
    Comparison,
}

impl ModuleName {
    pub const ALL: [ModuleName; 4] = [
        ModuleName::Google,
        ModuleName::Youtube,
        ModuleName::Summary,
        ModuleName::Comparison,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ModuleName::Google => "google",
            ModuleName::Youtube => "youtube",
            ModuleName::Summary => "summary",
            ModuleName::Comparison => "comparison",
        }
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sample of `GET /api/progress`. Missing modules count as 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct ProgressSnapshot {
    #[serde(default)]
    pub google: u32,
    #[serde(default)]
    pub youtube: u32,
    #[serde(default)]
    pub summary: u32,
    #[serde(default)]
    pub comparison: u32,
    #[serde(default)]
    pub completed: bool,
}

impl ProgressSnapshot {
    pub fn module(&self, name: ModuleName) -> u32 {
        match name {
            ModuleName::Google => self.google,
            ModuleName::Youtube => self.youtube,
            ModuleName::Summary => self.summary,
            ModuleName::Comparison => self.comparison,
        }
    }

    /// `round(mean(modules) * 0.9)`, so a finished pipeline shows 90.
    pub fn aggregate_percent(&self) -> u8 {
        aggregate_percent(ModuleName::ALL.iter().map(|name| self.module(*name)))
    }
}

/// Average the module percentages and scale them to [`PROGRESS_CEILING`],
/// rounding half up.
///
/// Values above 100 are clamped so a misbehaving backend cannot push the
/// bar past the ceiling.
pub fn aggregate_percent<I>(modules: I) -> u8
where
    I: IntoIterator<Item = u32>,
{
    let (total, count) = modules
        .into_iter()
        .fold((0u64, 0u64), |(total, count), value| {
            (total + u64::from(value.min(100)), count + 1)
        });
    if count == 0 {
        return 0;
    }
    let scaled = total * u64::from(PROGRESS_CEILING);
    let denominator = count * 100;
    ((2 * scaled + denominator) / (2 * denominator)) as u8
}
