#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassId {
    Scion,
    Marauder,
    Ranger,
    Witch,
    Duelist,
    Templar,
    Shadow,
}

#[derive(Clone, Copy, Debug)]
pub struct CharacterClass {
    pub id: ClassId,
    pub name: &'static str,
    pub start_index: u32,
    pub allowed_ascendancies: &'static [&'static str],
}

/// Static catalog; `start_index` is resolved against the loaded graph's
/// classStart nodes, so the catalog never goes stale across dataset reloads.
pub const CLASSES: [CharacterClass; 7] = [
    CharacterClass {
        id: ClassId::Scion,
        name: "Scion",
        start_index: 0,
        allowed_ascendancies: &["Ascendant"],
    },
    CharacterClass {
        id: ClassId::Marauder,
        name: "Marauder",
        start_index: 1,
        allowed_ascendancies: &["Juggernaut", "Berserker", "Chieftain"],
    },
    CharacterClass {
        id: ClassId::Ranger,
        name: "Ranger",
        start_index: 2,
        allowed_ascendancies: &["Raider", "Deadeye", "Pathfinder"],
    },
    CharacterClass {
        id: ClassId::Witch,
        name: "Witch",
        start_index: 3,
        allowed_ascendancies: &["Occultist", "Elementalist", "Necromancer"],
    },
    CharacterClass {
        id: ClassId::Duelist,
        name: "Duelist",
        start_index: 4,
        allowed_ascendancies: &["Slayer", "Gladiator", "Champion"],
    },
    CharacterClass {
        id: ClassId::Templar,
        name: "Templar",
        start_index: 5,
        allowed_ascendancies: &["Inquisitor", "Hierophant", "Guardian"],
    },
    CharacterClass {
        id: ClassId::Shadow,
        name: "Shadow",
        start_index: 6,
        allowed_ascendancies: &["Assassin", "Trickster", "Saboteur"],
    },
];

impl ClassId {
    pub const ALL: [ClassId; 7] = [
        ClassId::Scion,
        ClassId::Marauder,
        ClassId::Ranger,
        ClassId::Witch,
        ClassId::Duelist,
        ClassId::Templar,
        ClassId::Shadow,
    ];

    pub fn data(self) -> &'static CharacterClass {
        &CLASSES[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.data().name
    }

    pub fn from_name(name: &str) -> Option<Self> {
        CLASSES
            .iter()
            .find(|class| class.name.eq_ignore_ascii_case(name))
            .map(|class| class.id)
    }

    /// Class owning a given dataset classStart index, if any.
    pub fn for_start_index(index: u32) -> Option<Self> {
        CLASSES
            .iter()
            .find(|class| class.start_index == index)
            .map(|class| class.id)
    }
}

impl CharacterClass {
    pub fn allows_ascendancy(&self, name: &str) -> bool {
        self.allowed_ascendancies.contains(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_order_matches_enum_discriminants() {
        for class in ClassId::ALL {
            assert_eq!(class.data().id, class);
        }
    }

    #[test]
    fn start_indices_are_unique() {
        for (i, a) in CLASSES.iter().enumerate() {
            for b in &CLASSES[i + 1..] {
                assert_ne!(a.start_index, b.start_index);
            }
        }
    }

    #[test]
    fn name_round_trip() {
        assert_eq!(ClassId::from_name("Marauder"), Some(ClassId::Marauder));
        assert_eq!(ClassId::from_name("marauder"), Some(ClassId::Marauder));
        assert_eq!(ClassId::from_name("Paladin"), None);
    }

    #[test]
    fn ascendancy_gating_is_per_class() {
        assert!(ClassId::Marauder.data().allows_ascendancy("Juggernaut"));
        assert!(!ClassId::Marauder.data().allows_ascendancy("Slayer"));
    }
}
