//! Stand-in profiles for players who never completed a survey.

use std::collections::BTreeSet;

use contracts::{Anatomy, BodyPart, Boundaries, PowerDynamic, Profile};

const GIVE_SUFFIX: &str = "_give";
const RECEIVE_SUFFIX: &str = "_receive";

/// Anatomy-only profile for an anonymous guest: Switch, no preferences, no
/// limits. An empty anatomy preference means the guest is open to anyone.
pub fn guest_profile(
    id: impl Into<String>,
    name: Option<String>,
    anatomy: BTreeSet<BodyPart>,
    preference: BTreeSet<BodyPart>,
) -> Profile {
    let preference = if preference.is_empty() {
        BodyPart::ALL.into_iter().collect()
    } else {
        preference
    };
    Profile {
        id: id.into(),
        display_name: name,
        power_dynamic: PowerDynamic::default(),
        anatomy: Anatomy {
            has: anatomy,
            preference,
        },
        ..Profile::default()
    }
}

/// A partner built to complement `primary`: has the anatomy the primary
/// prefers, takes the opposite pole, and wants to receive what the primary
/// wants to give (and the reverse). Hard limits are copied.
pub fn complementary_profile(primary: &Profile) -> Profile {
    let has = if primary.anatomy.preference.is_empty() {
        BTreeSet::from([BodyPart::Penis, BodyPart::Vagina])
    } else {
        primary.anatomy.preference.clone()
    };
    Profile {
        id: format!("{}:complement", primary.id),
        display_name: None,
        power_dynamic: PowerDynamic {
            orientation: primary.orientation().inverted(),
            intensity: primary.power_intensity(),
        },
        activities: primary
            .activities
            .iter()
            .map(|(key, interest)| (mirror_key(key), *interest))
            .collect(),
        boundaries: Boundaries {
            hard_limits: primary.hard_limits().clone(),
        },
        anatomy: Anatomy {
            has,
            preference: primary.anatomy.has.clone(),
        },
        ..Profile::default()
    }
}

/// Swaps a directional suffix; keys without one pass through.
pub fn mirror_key(key: &str) -> String {
    if let Some(stem) = key.strip_suffix(GIVE_SUFFIX) {
        format!("{stem}{RECEIVE_SUFFIX}")
    } else if let Some(stem) = key.strip_suffix(RECEIVE_SUFFIX) {
        format!("{stem}{GIVE_SUFFIX}")
    } else {
        key.to_string()
    }
}
