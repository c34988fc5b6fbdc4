//! Content-unit domain model and the compiled-in kind catalog.
//!
//! # Responsibility
//! - Define `Unit`, the uniform shape every content family projects into.
//! - Enumerate every togglable kind the site ships with.
//! - Declare exclusivity as a property of the kind, not of call sites.
//!
//! # Invariants
//! - `identity` is a kebab-case slug, unique within its kind.
//! - For any exclusivity group, at most one member unit may be active; the
//!   activation service enforces this, the model only declares it.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::{Error as DeError, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// Exclusivity group shared by promotional popups: at most one may be live.
pub const PROMO_POPUP_GROUP: &str = "promo-popup";

static SLUG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("slug pattern must compile"));

/// Returns whether `value` is an acceptable unit identity.
pub fn is_valid_slug(value: &str) -> bool {
    SLUG_PATTERN.is_match(value)
}

/// Industrial process families, each backed by its own single-row page table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProcessKind {
    HotDipGalvanizing,
    ElectroGalvanizing,
    Anodizing,
    PowderCoating,
    ECoating,
    Phosphating,
    Passivation,
    Pickling,
    Annealing,
    ShotBlasting,
    Electroplating,
    Nitriding,
}

impl ProcessKind {
    pub const ALL: [ProcessKind; 12] = [
        ProcessKind::HotDipGalvanizing,
        ProcessKind::ElectroGalvanizing,
        ProcessKind::Anodizing,
        ProcessKind::PowderCoating,
        ProcessKind::ECoating,
        ProcessKind::Phosphating,
        ProcessKind::Passivation,
        ProcessKind::Pickling,
        ProcessKind::Annealing,
        ProcessKind::ShotBlasting,
        ProcessKind::Electroplating,
        ProcessKind::Nitriding,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Self::HotDipGalvanizing => "hot-dip-galvanizing",
            Self::ElectroGalvanizing => "electro-galvanizing",
            Self::Anodizing => "anodizing",
            Self::PowderCoating => "powder-coating",
            Self::ECoating => "e-coating",
            Self::Phosphating => "phosphating",
            Self::Passivation => "passivation",
            Self::Pickling => "pickling",
            Self::Annealing => "annealing",
            Self::ShotBlasting => "shot-blasting",
            Self::Electroplating => "electroplating",
            Self::Nitriding => "nitriding",
        }
    }

    /// Storage handle for this family. One table per family is the site's
    /// established schema; the registry hides this from callers.
    pub fn table(self) -> &'static str {
        match self {
            Self::HotDipGalvanizing => "hot_dip_galvanizing_page",
            Self::ElectroGalvanizing => "electro_galvanizing_page",
            Self::Anodizing => "anodizing_page",
            Self::PowderCoating => "powder_coating_page",
            Self::ECoating => "e_coating_page",
            Self::Phosphating => "phosphating_page",
            Self::Passivation => "passivation_page",
            Self::Pickling => "pickling_page",
            Self::Annealing => "annealing_page",
            Self::ShotBlasting => "shot_blasting_page",
            Self::Electroplating => "electroplating_page",
            Self::Nitriding => "nitriding_page",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.slug() == value)
    }
}

/// Base-metal families, each backed by its own single-row page table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BaseMetalKind {
    Steel,
    StainlessSteel,
    Aluminum,
    Copper,
    Brass,
    Zinc,
}

impl BaseMetalKind {
    pub const ALL: [BaseMetalKind; 6] = [
        BaseMetalKind::Steel,
        BaseMetalKind::StainlessSteel,
        BaseMetalKind::Aluminum,
        BaseMetalKind::Copper,
        BaseMetalKind::Brass,
        BaseMetalKind::Zinc,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Self::Steel => "steel",
            Self::StainlessSteel => "stainless-steel",
            Self::Aluminum => "aluminum",
            Self::Copper => "copper",
            Self::Brass => "brass",
            Self::Zinc => "zinc",
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            Self::Steel => "steel_page",
            Self::StainlessSteel => "stainless_steel_page",
            Self::Aluminum => "aluminum_page",
            Self::Copper => "copper_page",
            Self::Brass => "brass_page",
            Self::Zinc => "zinc_page",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.slug() == value)
    }
}

/// Every togglable content-unit family the site ships with.
///
/// The derive order is the canonical catalog order: processes, base metals,
/// then the navigation and popup kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnitKind {
    Process(ProcessKind),
    BaseMetal(BaseMetalKind),
    MenuEntry,
    MenuSubEntry,
    Popup,
}

impl UnitKind {
    /// Returns the full compiled-in catalog in canonical order.
    pub fn all() -> Vec<UnitKind> {
        let mut kinds = Vec::with_capacity(ProcessKind::ALL.len() + BaseMetalKind::ALL.len() + 3);
        kinds.extend(ProcessKind::ALL.into_iter().map(UnitKind::Process));
        kinds.extend(BaseMetalKind::ALL.into_iter().map(UnitKind::BaseMetal));
        kinds.push(UnitKind::MenuEntry);
        kinds.push(UnitKind::MenuSubEntry);
        kinds.push(UnitKind::Popup);
        kinds
    }

    /// Returns the twelve process kinds feeding the dashboard's composite
    /// active-process statistic.
    pub fn processes() -> Vec<UnitKind> {
        ProcessKind::ALL.into_iter().map(UnitKind::Process).collect()
    }

    /// Stable wire name, e.g. `process:anodizing` or `popup`.
    pub fn name(self) -> String {
        match self {
            Self::Process(kind) => format!("process:{}", kind.slug()),
            Self::BaseMetal(kind) => format!("base-metal:{}", kind.slug()),
            Self::MenuEntry => "menu-entry".to_string(),
            Self::MenuSubEntry => "menu-sub-entry".to_string(),
            Self::Popup => "popup".to_string(),
        }
    }

    /// Parses a wire name back into a catalog kind.
    pub fn parse(value: &str) -> Option<Self> {
        if let Some(slug) = value.strip_prefix("process:") {
            return ProcessKind::parse(slug).map(UnitKind::Process);
        }
        if let Some(slug) = value.strip_prefix("base-metal:") {
            return BaseMetalKind::parse(slug).map(UnitKind::BaseMetal);
        }
        match value {
            "menu-entry" => Some(UnitKind::MenuEntry),
            "menu-sub-entry" => Some(UnitKind::MenuSubEntry),
            "popup" => Some(UnitKind::Popup),
            _ => None,
        }
    }

    /// Exclusivity group this kind belongs to, if any.
    ///
    /// Members of a group allow at most one active unit across the whole
    /// group. Today only promotional popups are exclusive.
    pub fn exclusivity_group(self) -> Option<&'static str> {
        match self {
            Self::Popup => Some(PROMO_POPUP_GROUP),
            _ => None,
        }
    }

    /// Default `is_active` for newly created units of this kind.
    pub fn default_active(self) -> bool {
        self.exclusivity_group().is_none()
    }
}

impl Display for UnitKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

impl Serialize for UnitKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for UnitKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KindVisitor;

        impl Visitor<'_> for KindVisitor {
            type Value = UnitKind;

            fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str("a registered unit kind name")
            }

            fn visit_str<E: DeError>(self, value: &str) -> Result<UnitKind, E> {
                UnitKind::parse(value)
                    .ok_or_else(|| E::custom(format!("unknown unit kind `{value}`")))
            }
        }

        deserializer.deserialize_str(KindVisitor)
    }
}

/// Uniform projection of one togglable content entity.
///
/// Each family keeps its own physical table; this shape is what the registry
/// hands to the aggregator and activation service so neither needs
/// kind-specific logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub kind: UnitKind,
    /// Stable slug, unique within `kind`.
    pub identity: String,
    pub display_name: String,
    pub is_active: bool,
    /// Stable sort key within the kind; ties break on `identity`.
    pub sort_order: i64,
    /// Parent menu entry slug. Set only for menu sub-entries.
    pub parent: Option<String>,
}

impl Unit {
    /// Creates a unit with the kind's default activation state.
    pub fn new(kind: UnitKind, identity: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            kind,
            identity: identity.into(),
            display_name: display_name.into(),
            is_active: kind.default_active(),
            sort_order: 0,
            parent: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{is_valid_slug, BaseMetalKind, ProcessKind, Unit, UnitKind};

    #[test]
    fn catalog_holds_twenty_one_kinds_in_canonical_order() {
        let kinds = UnitKind::all();
        assert_eq!(kinds.len(), 21);
        assert_eq!(kinds[0], UnitKind::Process(ProcessKind::HotDipGalvanizing));
        assert_eq!(kinds[12], UnitKind::BaseMetal(BaseMetalKind::Steel));
        assert_eq!(kinds[20], UnitKind::Popup);
    }

    #[test]
    fn kind_names_roundtrip_through_parse() {
        for kind in UnitKind::all() {
            let name = kind.name();
            assert_eq!(UnitKind::parse(&name), Some(kind), "roundtrip for {name}");
        }
    }

    #[test]
    fn parse_rejects_unknown_names() {
        assert_eq!(UnitKind::parse("not-a-real-kind"), None);
        assert_eq!(UnitKind::parse("process:unobtainium"), None);
        assert_eq!(UnitKind::parse("base-metal:"), None);
    }

    #[test]
    fn only_popups_declare_exclusivity() {
        for kind in UnitKind::all() {
            match kind {
                UnitKind::Popup => assert!(kind.exclusivity_group().is_some()),
                _ => assert!(kind.exclusivity_group().is_none(), "{kind} must not be exclusive"),
            }
        }
    }

    #[test]
    fn new_unit_defaults_follow_kind_exclusivity() {
        let page = Unit::new(UnitKind::MenuEntry, "services", "Services");
        assert!(page.is_active);

        let popup = Unit::new(UnitKind::Popup, "summer-sale", "Summer Sale");
        assert!(!popup.is_active);
    }

    #[test]
    fn slug_validation_accepts_kebab_case_only() {
        assert!(is_valid_slug("hot-dip-galvanizing"));
        assert!(is_valid_slug("steel"));
        assert!(!is_valid_slug("Hot-Dip"));
        assert!(!is_valid_slug("double--dash"));
        assert!(!is_valid_slug("-leading"));
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn kind_serializes_as_wire_name() {
        let json = serde_json::to_string(&UnitKind::BaseMetal(BaseMetalKind::StainlessSteel))
            .expect("kind should serialize");
        assert_eq!(json, "\"base-metal:stainless-steel\"");

        let parsed: UnitKind =
            serde_json::from_str("\"process:pickling\"").expect("kind should deserialize");
        assert_eq!(parsed, UnitKind::Process(ProcessKind::Pickling));
    }
}
