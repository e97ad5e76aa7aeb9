//! Classification of events by their realm (category) name.

use bitmask_enum::bitmask;

static FALLBACK_COLOR: &str = "#6B7280";
pub static TEXT_COLOR: &str = "#ffffff";

/// A set of realms, used to exclude events from a calendar.
#[bitmask]
pub enum RealmBitmask {
    Theater,
    Musical,
    Concert,
    Music,
    Dance,
    FineArt,
    Exhibition,
    Literature,
    Film,
    Other,
}

/// The realm an event belongs to, derived from the upstream `realmName`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Realm {
    Theater,
    Musical,
    Concert,
    Music,
    Dance,
    FineArt,
    Exhibition,
    Literature,
    Film,
    Other,
}

impl Realm {
    /// Realms in matching priority. The first keyword contained in a realm name wins.
    pub const PRIORITY: [Realm; 9] = [
        Realm::Theater,
        Realm::Musical,
        Realm::Concert,
        Realm::Music,
        Realm::Dance,
        Realm::FineArt,
        Realm::Exhibition,
        Realm::Literature,
        Realm::Film,
    ];

    /// Classify a realm name by keyword substring.
    pub fn classify(realm_name: &str) -> Realm {
        Realm::PRIORITY
            .into_iter()
            .find(|realm| {
                realm
                    .keyword()
                    .is_some_and(|keyword| realm_name.contains(keyword))
            })
            .unwrap_or(Realm::Other)
    }

    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Realm::Theater => Some("연극"),
            Realm::Musical => Some("뮤지컬"),
            Realm::Concert => Some("콘서트"),
            Realm::Music => Some("음악"),
            Realm::Dance => Some("무용"),
            Realm::FineArt => Some("미술"),
            Realm::Exhibition => Some("전시"),
            Realm::Literature => Some("문학"),
            Realm::Film => Some("영화"),
            Realm::Other => None,
        }
    }

    /// The background and border color of this realm's calendar events.
    pub fn color(&self) -> &'static str {
        match self {
            Realm::Theater => "#3B82F6",
            Realm::Musical => "#8B5CF6",
            Realm::Concert => "#EF4444",
            Realm::Music => "#10B981",
            Realm::Dance => "#F59E0B",
            Realm::FineArt => "#6B7280",
            Realm::Exhibition => "#EC4899",
            Realm::Literature => "#14B8A6",
            Realm::Film => "#84CC16",
            Realm::Other => FALLBACK_COLOR,
        }
    }

    pub fn bitmask(&self) -> RealmBitmask {
        match self {
            Realm::Theater => RealmBitmask::Theater,
            Realm::Musical => RealmBitmask::Musical,
            Realm::Concert => RealmBitmask::Concert,
            Realm::Music => RealmBitmask::Music,
            Realm::Dance => RealmBitmask::Dance,
            Realm::FineArt => RealmBitmask::FineArt,
            Realm::Exhibition => RealmBitmask::Exhibition,
            Realm::Literature => RealmBitmask::Literature,
            Realm::Film => RealmBitmask::Film,
            Realm::Other => RealmBitmask::Other,
        }
    }

    pub fn is_excluded(&self, excluded: RealmBitmask) -> bool {
        excluded.contains(self.bitmask())
    }
}
