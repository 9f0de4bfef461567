//! Accept-header content negotiation.
//!
//! Candidates are ranked by how specifically a range names them (`type/subtype` over `type/*`
//! over `*/*`), then by quality, then by the order the caller listed them. A candidate's quality
//! comes from the most specific range that matches it, so `text/*;q=0` excludes every text type
//! even when `*/*` is also accepted.

use http::header::ACCEPT;
use http::HeaderMap;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Specificity {
    Any,
    Type,
    Exact,
}

#[derive(Debug, Clone)]
struct MediaRange {
    kind: String,
    subtype: String,
    quality: f32,
    position: usize,
}

impl MediaRange {
    fn parse(position: usize, raw: &str) -> Option<Self> {
        let mut parts = raw.split(';');
        let (kind, subtype) = parts.next()?.trim().split_once('/')?;
        let (kind, subtype) = (kind.trim().to_lowercase(), subtype.trim().to_lowercase());
        if kind.is_empty() || subtype.is_empty() || (kind == "*" && subtype != "*") {
            return None;
        }

        let mut quality = 1.0;
        for parameter in parts {
            if let Some((name, value)) = parameter.split_once('=') {
                if name.trim().eq_ignore_ascii_case("q") {
                    quality = value.trim().parse::<f32>().ok()?.clamp(0.0, 1.0);
                }
            }
        }

        Some(Self {
            kind,
            subtype,
            quality,
            position,
        })
    }

    fn specificity(&self) -> Specificity {
        match (self.kind.as_str(), self.subtype.as_str()) {
            ("*", _) => Specificity::Any,
            (_, "*") => Specificity::Type,
            _ => Specificity::Exact,
        }
    }

    fn matches(&self, kind: &str, subtype: &str) -> bool {
        match self.specificity() {
            Specificity::Any => true,
            Specificity::Type => self.kind == kind,
            Specificity::Exact => self.kind == kind && self.subtype == subtype,
        }
    }

    /// Orders ranges by preference: more specific first, then higher quality, then earlier.
    fn preference(&self, other: &Self) -> Ordering {
        other
            .specificity()
            .cmp(&self.specificity())
            .then(other.quality.total_cmp(&self.quality))
            .then(self.position.cmp(&other.position))
    }
}

/// Parsed `Accept` header.
#[derive(Debug, Clone)]
pub struct Negotiator {
    ranges: Vec<MediaRange>,
}

impl Default for Negotiator {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Negotiator {
    /// Parse an `Accept` value. A missing header accepts everything.
    ///
    /// Malformed ranges are ignored.
    pub fn new(accept: Option<&str>) -> Self {
        let ranges = accept
            .unwrap_or("*/*")
            .split(',')
            .map(str::trim)
            .filter(|range| !range.is_empty())
            .enumerate()
            .filter_map(|(position, range)| MediaRange::parse(position, range))
            .collect();
        Self { ranges }
    }

    /// Negotiator for the `Accept` headers of a request; repeated headers are concatenated.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let values: Vec<&str> = headers
            .get_all(ACCEPT)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();
        if values.is_empty() {
            Self::new(None)
        } else {
            Self::new(Some(&values.join(",")))
        }
    }

    /// Acceptable media types in preference order.
    ///
    /// With `available`, returns the acceptable candidates (as given by the caller). Without it,
    /// returns the accepted ranges themselves.
    pub fn media_types(&self, available: Option<&[&str]>) -> Vec<String> {
        let Some(available) = available else {
            let mut ranges: Vec<&MediaRange> =
                self.ranges.iter().filter(|r| r.quality > 0.0).collect();
            ranges.sort_by(|a, b| a.preference(b));
            return ranges
                .into_iter()
                .map(|r| format!("{}/{}", r.kind, r.subtype))
                .collect();
        };

        let mut ranked: Vec<(&MediaRange, usize, &str)> = available
            .iter()
            .enumerate()
            .filter_map(|(index, candidate)| {
                let range = self.best_range_for(candidate)?;
                (range.quality > 0.0).then_some((range, index, *candidate))
            })
            .collect();
        ranked.sort_by(|(a, a_index, _), (b, b_index, _)| {
            b.specificity()
                .cmp(&a.specificity())
                .then(b.quality.total_cmp(&a.quality))
                .then(a_index.cmp(b_index))
        });
        ranked
            .into_iter()
            .map(|(_, _, candidate)| candidate.to_string())
            .collect()
    }

    /// The single preferred media type, or `None` when nothing is acceptable.
    pub fn media_type(&self, available: Option<&[&str]>) -> Option<String> {
        self.media_types(available).into_iter().next()
    }

    pub fn accepts(&self, media_type: &str) -> bool {
        self.best_range_for(media_type)
            .is_some_and(|range| range.quality > 0.0)
    }

    fn best_range_for(&self, candidate: &str) -> Option<&MediaRange> {
        let essence = candidate.split(';').next()?.trim().to_lowercase();
        let (kind, subtype) = essence.split_once('/')?;
        self.ranges
            .iter()
            .filter(|range| range.matches(kind, subtype))
            .min_by(|a, b| a.preference(b))
    }
}
