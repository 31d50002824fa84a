//! Mobile role classification
//!
//! A role comes from an explicit `data-mobile-role` attribute, or from the
//! tag for elements whose content must never be disturbed. Classification
//! looks at the element alone: a header nested inside a content block is
//! still a header.

use mob_dom::{DomTree, NodeId};

use crate::stats::MobilizeCounter;

/// Attribute carrying an explicit role
pub const MOBILE_ROLE_ATTRIBUTE: &str = "data-mobile-role";

/// Tags that default to [`MobileRole::Keeper`]
const KEEPER_TAGS: &[&str] = &["area", "link", "map", "script", "style"];

/// Mobilization role of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MobileRole {
    Keeper,
    Header,
    Navigational,
    Content,
    Marginal,
    /// A role attribute was present but its value is unknown
    Invalid,
    /// Not relevant to mobilization
    None,
}

impl MobileRole {
    /// Map a `data-mobile-role` value to a role
    pub fn from_attribute(value: &str) -> Self {
        match value {
            "keeper" => Self::Keeper,
            "header" => Self::Header,
            "navigational" => Self::Navigational,
            "content" => Self::Content,
            "marginal" => Self::Marginal,
            _ => Self::Invalid,
        }
    }

    /// Attribute spelling of the role, if it has one
    pub fn as_str(self) -> Option<&'static str> {
        match self {
            Self::Keeper => Some("keeper"),
            Self::Header => Some("header"),
            Self::Navigational => Some("navigational"),
            Self::Content => Some("content"),
            Self::Marginal => Some("marginal"),
            Self::Invalid | Self::None => None,
        }
    }

    /// Statistics counter tallying elements of this role
    pub fn counter(self) -> Option<MobilizeCounter> {
        match self {
            Self::Keeper => Some(MobilizeCounter::KeeperBlocks),
            Self::Header => Some(MobilizeCounter::HeaderBlocks),
            Self::Navigational => Some(MobilizeCounter::NavigationalBlocks),
            Self::Content => Some(MobilizeCounter::ContentBlocks),
            Self::Marginal => Some(MobilizeCounter::MarginalBlocks),
            Self::Invalid | Self::None => None,
        }
    }
}

/// Whether the tag defaults to the keeper role
pub fn is_keeper_tag(tag: &str) -> bool {
    KEEPER_TAGS.iter().any(|k| k.eq_ignore_ascii_case(tag))
}

/// Classify an element. Non-elements are [`MobileRole::None`].
pub fn classify(tree: &DomTree, id: NodeId) -> MobileRole {
    let Some(tag) = tree.tag_name(id) else {
        return MobileRole::None;
    };
    if let Some(value) = tree.get_attr(id, MOBILE_ROLE_ATTRIBUTE) {
        return MobileRole::from_attribute(value);
    }
    if is_keeper_tag(tag) {
        MobileRole::Keeper
    } else {
        MobileRole::None
    }
}
