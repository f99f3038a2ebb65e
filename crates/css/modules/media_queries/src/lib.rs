//! Media Queries Level 4: the subset needed to classify a virtual viewport.
//! Spec: <https://www.w3.org/TR/mediaqueries-4/>
//!
//! This module implements:
//! - A parser from query text to an immutable [`MediaQuery`] tree
//! - A pure evaluator over a [`ViewportSize`] and a [`MediaEnvironment`]
//! - The override map and ambient preferences that drive static features
//!
//! Supported features: `width`, `height`, `aspect-ratio` (each with `min-`/`max-`),
//! `orientation`, `hover`, `pointer`, `prefers-color-scheme`,
//! `prefers-reduced-motion` and `prefers-contrast`.

#![forbid(unsafe_code)]

mod environment;
mod evaluator;
mod parser;

pub use environment::{AmbientPreferences, FeatureOverrides, MediaEnvironment};
pub use evaluator::{ASPECT_RATIO_EPSILON, evaluate};
pub use parser::parse_media_query;

use core::error::Error;
use core::fmt;

/// Size of the virtual viewport a query is evaluated against.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl ViewportSize {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width divided by height. Infinite for a zero-height viewport.
    #[inline]
    pub fn aspect_ratio(self) -> f32 {
        self.width / self.height
    }

    /// Spec: Section 4.5 — portrait when height is greater than or equal to width.
    #[inline]
    pub fn orientation(self) -> Orientation {
        if self.height >= self.width {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }
}

/// Spec: Section 4.5 — `orientation`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
        }
    }
}

/// Media features understood by the parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeatureName {
    Width,
    Height,
    AspectRatio,
    Orientation,
    Hover,
    Pointer,
    PrefersColorScheme,
    PrefersReducedMotion,
    PrefersContrast,
}

impl FeatureName {
    /// Every supported feature, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Width,
        Self::Height,
        Self::AspectRatio,
        Self::Orientation,
        Self::Hover,
        Self::Pointer,
        Self::PrefersColorScheme,
        Self::PrefersReducedMotion,
        Self::PrefersContrast,
    ];

    /// The feature name as written in a query (without a `min-`/`max-` prefix).
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Width => "width",
            Self::Height => "height",
            Self::AspectRatio => "aspect-ratio",
            Self::Orientation => "orientation",
            Self::Hover => "hover",
            Self::Pointer => "pointer",
            Self::PrefersColorScheme => "prefers-color-scheme",
            Self::PrefersReducedMotion => "prefers-reduced-motion",
            Self::PrefersContrast => "prefers-contrast",
        }
    }

    /// Look up a feature by its lowercase name.
    pub fn from_ident(ident: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|feature| feature.as_str().eq_ignore_ascii_case(ident))
    }

    /// Range features accept the `min-` and `max-` prefixes.
    #[inline]
    pub const fn is_range(self) -> bool {
        matches!(self, Self::Width | Self::Height | Self::AspectRatio)
    }

    /// Static features cannot be derived from the viewport size and are
    /// answered by the override map or the ambient environment.
    #[inline]
    pub const fn is_static(self) -> bool {
        matches!(
            self,
            Self::Hover
                | Self::Pointer
                | Self::PrefersColorScheme
                | Self::PrefersReducedMotion
                | Self::PrefersContrast
        )
    }

    /// Keyword values accepted for a discrete feature. Empty for range features.
    pub const fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Width | Self::Height | Self::AspectRatio => &[],
            Self::Orientation => &["portrait", "landscape"],
            Self::Hover => &["none", "hover"],
            Self::Pointer => &["none", "coarse", "fine"],
            Self::PrefersColorScheme => &["light", "dark"],
            Self::PrefersReducedMotion => &["reduce", "no-preference"],
            Self::PrefersContrast => &["more", "less", "no-preference"],
        }
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// How a feature value is compared against the environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeKind {
    /// `min-` prefix: actual >= requested.
    Min,
    /// `max-` prefix: actual <= requested.
    Max,
    /// No prefix: actual == requested.
    Exact,
}

/// The right-hand side of a feature clause.
#[derive(Clone, Debug, PartialEq)]
pub enum FeatureValue {
    /// A length (unit discarded) or a ratio already divided out.
    Number(f32),
    /// An ASCII-lowercased keyword.
    Keyword(String),
}

/// A single `(feature: value)` clause.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaFeature {
    pub name: FeatureName,
    pub range: RangeKind,
    pub value: FeatureValue,
}

/// Immutable predicate tree produced by [`parse_media_query`].
#[derive(Clone, Debug, PartialEq)]
pub enum MediaQuery {
    /// A bare media type (`screen`, `all`, `print`); matches every viewport.
    AllMedia,
    Feature(MediaFeature),
    And(Box<Self>, Box<Self>),
    Or(Box<Self>, Box<Self>),
    Not(Box<Self>),
}

impl MediaQuery {
    #[inline]
    pub fn and(left: Self, right: Self) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    #[inline]
    pub fn or(left: Self, right: Self) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }

    #[inline]
    pub fn negate(operand: Self) -> Self {
        Self::Not(Box::new(operand))
    }

}

/// Reasons a query string is rejected. The whole query fails, never a single clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// The query (or one of its comma/`and` parts) was empty or whitespace only.
    Empty,
    /// A parenthesised clause named a feature this module does not support.
    UnsupportedFeature { fragment: String },
    /// A clause that is not a well-formed `(feature: value)` expression.
    Malformed { fragment: String },
}

impl ParseError {
    /// The offending fragment of the query, if any.
    pub fn fragment(&self) -> Option<&str> {
        match self {
            Self::Empty => None,
            Self::UnsupportedFeature { fragment } | Self::Malformed { fragment } => {
                Some(fragment)
            }
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => formatter.write_str("empty media query"),
            Self::UnsupportedFeature { fragment } => {
                write!(formatter, "unsupported media feature in `{fragment}`")
            }
            Self::Malformed { fragment } => {
                write!(formatter, "malformed media query clause `{fragment}`")
            }
        }
    }
}

impl Error for ParseError {}
