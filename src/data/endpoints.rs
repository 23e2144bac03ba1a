//! Request paths for the Garland Tools database
//!
//! Every function returns a path relative to the service host. The full URL,
//! host included, is what the cache uses as its key.

use super::Language;

/// Documents looked up by numeric ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Document {
    Achievement,
    Action,
    Fate,
    Instance,
    Item,
    Leve,
    Mob,
    Node,
    Npc,
    Quest,
    Status,
}

impl Document {
    fn segment(self) -> &'static str {
        match self {
            Document::Achievement => "achievement",
            Document::Action => "action",
            Document::Fate => "fate",
            Document::Instance => "instance",
            Document::Item => "item",
            Document::Leve => "leve",
            Document::Mob => "mob",
            Document::Node => "node",
            Document::Npc => "npc",
            Document::Quest => "quest",
            // The service capitalises this one.
            Document::Status => "Status",
        }
    }

    fn schema_version(self) -> u8 {
        match self {
            Document::Item | Document::Leve => 3,
            _ => 2,
        }
    }
}

/// Index listings served as browse documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Index {
    Achievements,
    Actions,
    Fates,
    FishingSpots,
    Instances,
    Leves,
    Mobs,
    Nodes,
    Npcs,
    Quests,
    Statuses,
}

impl Index {
    fn file_stem(self) -> &'static str {
        match self {
            Index::Achievements => "achievement",
            Index::Actions => "action",
            Index::Fates => "fate",
            Index::FishingSpots => "fishing",
            Index::Instances => "instance",
            Index::Leves => "leve",
            Index::Mobs => "mob",
            Index::Nodes => "node",
            Index::Npcs => "npc",
            Index::Quests => "quest",
            Index::Statuses => "status",
        }
    }
}

/// Job equipment recommendations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GearSet {
    Endgame,
    Leveling,
}

impl GearSet {
    fn prefix(self) -> &'static str {
        match self {
            GearSet::Endgame => "end-",
            GearSet::Leveling => "leveling-",
        }
    }
}

/// `/db/doc/<resource>/<lang>/<schema>/<id>.json`
pub fn document(lang: Language, doc: Document, id: u32) -> String {
    format!(
        "/db/doc/{}/{}/{}/{}.json",
        doc.segment(),
        lang,
        doc.schema_version(),
        id
    )
}

/// `/db/doc/browse/<lang>/2/<resource>.json`
pub fn browse(lang: Language, index: Index) -> String {
    format!("/db/doc/browse/{}/2/{}.json", lang, index.file_stem())
}

/// The core data index
pub fn core_data(lang: Language) -> String {
    format!("/db/doc/core/{}/3/data.json", lang)
}

/// Gear list for a three-letter job abbreviation
pub fn gear(lang: Language, set: GearSet, job: &str) -> String {
    format!(
        "/db/doc/equip/{}/2/{}{}.json",
        lang,
        set.prefix(),
        urlencoding::encode(job)
    )
}

/// `/files/icons/<type>/<id>.png`
pub fn icon(kind: &str, id: u32) -> String {
    format!("/files/icons/{}/{}.png", urlencoding::encode(kind), id)
}

/// `/files/maps/<zone>.png`
///
/// Some zones are nested under a parent, e.g. `La Noscea/Lower La Noscea`;
/// the separators are kept and each segment is encoded on its own.
pub fn map(zone: &str) -> String {
    let encoded: Vec<String> = zone
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("/files/maps/{}.png", encoded.join("/"))
}

/// `/api/search.php?text=<query>&lang=<lang>`
pub fn search(lang: Language, query: &str) -> String {
    format!(
        "/api/search.php?text={}&lang={}",
        urlencoding::encode(query),
        lang
    )
}
