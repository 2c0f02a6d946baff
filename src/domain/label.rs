//! Sentiment labels assigned to filings.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    Neg,
    Neutral,
    Pos,
}

impl Label {
    pub const ALL: [Label; 3] = [Label::Neg, Label::Neutral, Label::Pos];

    /// Name used for corpus directories and CSV cells.
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Neg => "neg",
            Label::Neutral => "neutral",
            Label::Pos => "pos",
        }
    }

    /// Labels a classifier with `num_classes` classes can produce.
    pub fn for_classes(num_classes: i64) -> &'static [Label] {
        match num_classes {
            2 => &[Label::Neg, Label::Pos],
            _ => &Label::ALL,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "neg" => Ok(Label::Neg),
            "neutral" | "neut" => Ok(Label::Neutral),
            "pos" => Ok(Label::Pos),
            other => Err(format!("unknown label: {other}")),
        }
    }
}
