use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The client convention a template is written for. Decides how an
/// interpolation hole can be turned back into GraphQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// No `env` configured.
    #[default]
    Unmarked,
    /// Interpolation is only legal outside any selection set.
    Apollo,
    /// `${x}` after a colon is a variable; anywhere else it is a fragment
    /// spread whose `...` the author does not type.
    Relay,
    /// The author types `...${fragment}` explicitly.
    Lokka,
    /// Plain GraphQL text with no interpolation at all.
    Literal,
}

/// What the literal chunk right before a hole ends with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrecedingMarker {
    /// `:` optionally followed by whitespace.
    Colon,
    /// `...` optionally followed by whitespace.
    Ellipsis,
    Neither,
}

/// How a single hole is rendered as placeholder text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Substitution {
    /// `$` plus filler: a variable reference.
    Variable,
    /// Filler only; the author already wrote the `...`.
    TypedSpread,
    /// `...` plus filler.
    ImplicitSpread,
    /// Nothing at all. Only sound outside any selection set.
    Elide,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid option for env, only `apollo`, `lokka`, `relay`, and `literal` supported.")]
pub struct UnknownDialect(pub String);

impl Dialect {
    pub const ALL: [Dialect; 5] = [
        Dialect::Unmarked,
        Dialect::Apollo,
        Dialect::Relay,
        Dialect::Lokka,
        Dialect::Literal,
    ];

    /// The `env` name this dialect is configured with.
    pub fn env_name(self) -> Option<&'static str> {
        match self {
            Dialect::Unmarked => None,
            Dialect::Apollo => Some("apollo"),
            Dialect::Relay => Some("relay"),
            Dialect::Lokka => Some("lokka"),
            Dialect::Literal => Some("literal"),
        }
    }

    /// Whether every literal chunk must have as many `{` as `}`.
    pub fn requires_balanced_chunks(self) -> bool {
        matches!(self, Dialect::Unmarked | Dialect::Apollo)
    }

    /// The substitution for a hole preceded by `marker`, or `None` when the
    /// dialect cannot express an interpolation there.
    pub fn substitution(self, marker: PrecedingMarker) -> Option<Substitution> {
        use PrecedingMarker::*;
        match (self, marker) {
            (Dialect::Unmarked | Dialect::Apollo, _) => Some(Substitution::Elide),
            (Dialect::Relay, Colon) => Some(Substitution::Variable),
            (Dialect::Relay, Ellipsis | Neither) => Some(Substitution::ImplicitSpread),
            (Dialect::Lokka, Ellipsis) => Some(Substitution::TypedSpread),
            (Dialect::Lokka, Colon | Neither) => None,
            (Dialect::Literal, _) => None,
        }
    }

    /// Whether the anonymous `fragment on T` shorthand is accepted.
    pub fn allows_anonymous_fragments(self) -> bool {
        matches!(self, Dialect::Relay | Dialect::Lokka)
    }
}

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apollo" => Ok(Dialect::Apollo),
            "relay" => Ok(Dialect::Relay),
            "lokka" => Ok(Dialect::Lokka),
            "literal" => Ok(Dialect::Literal),
            other => Err(UnknownDialect(other.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.env_name().unwrap_or("unmarked"))
    }
}

impl PrecedingMarker {
    pub fn of(chunk: &str) -> Self {
        let trimmed = chunk.trim_end();
        if trimmed.ends_with("...") {
            PrecedingMarker::Ellipsis
        } else if trimmed.ends_with(':') {
            PrecedingMarker::Colon
        } else {
            PrecedingMarker::Neither
        }
    }
}

impl Substitution {
    /// Repeated to pad a placeholder; a name character so the placeholder
    /// lexes as one token.
    pub const FILLER: char = 'x';

    /// Filler characters beyond the hole's own width.
    pub fn extra_width(self) -> usize {
        match self {
            Substitution::Variable => 2,
            Substitution::TypedSpread => 3,
            Substitution::ImplicitSpread | Substitution::Elide => 0,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Substitution::Variable => "$",
            Substitution::ImplicitSpread => "...",
            Substitution::TypedSpread | Substitution::Elide => "",
        }
    }

    /// Placeholder text for a hole whose expression is `width` chars long.
    pub fn render(self, width: usize) -> String {
        if self == Substitution::Elide {
            return String::new();
        }
        let filler_len = width + self.extra_width();
        let mut text = String::with_capacity(self.prefix().len() + filler_len);
        text.push_str(self.prefix());
        text.extend(std::iter::repeat_n(Self::FILLER, filler_len));
        text
    }
}
