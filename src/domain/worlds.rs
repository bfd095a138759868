//! Static region / data center / world catalog.
//!
//! Mirrors the public server topology; only needs touching when new worlds
//! open. Universalis accepts either a world name or a data center name as the
//! query location.

pub struct Region {
    pub name: &'static str,
    pub data_centers: &'static [DataCenter],
}

pub struct DataCenter {
    pub name: &'static str,
    pub worlds: &'static [&'static str],
}

pub const DEFAULT_REGION: &str = "Europe";
pub const DEFAULT_DATA_CENTER: &str = "Light";

pub const REGIONS: &[Region] = &[
    Region {
        name: "Europe",
        data_centers: &[
            DataCenter {
                name: "Chaos",
                worlds: &[
                    "Cerberus",
                    "Louisoix",
                    "Moogle",
                    "Omega",
                    "Phantom",
                    "Ragnarok",
                    "Sagittarius",
                    "Spriggan",
                ],
            },
            DataCenter {
                name: "Light",
                worlds: &[
                    "Alpha",
                    "Lich",
                    "Odin",
                    "Phoenix",
                    "Raiden",
                    "Shiva",
                    "Twintania",
                    "Zodiark",
                ],
            },
        ],
    },
    Region {
        name: "North America",
        data_centers: &[
            DataCenter {
                name: "Aether",
                worlds: &[
                    "Adamantoise",
                    "Cactuar",
                    "Faerie",
                    "Gilgamesh",
                    "Jenova",
                    "Midgardsormr",
                    "Sargatanas",
                    "Siren",
                ],
            },
            DataCenter {
                name: "Primal",
                worlds: &[
                    "Behemoth",
                    "Excalibur",
                    "Exodus",
                    "Famfrit",
                    "Hyperion",
                    "Lamia",
                    "Leviathan",
                    "Ultros",
                ],
            },
            DataCenter {
                name: "Crystal",
                worlds: &[
                    "Balmung",
                    "Brynhildr",
                    "Coeurl",
                    "Diabolos",
                    "Goblin",
                    "Malboro",
                    "Mateus",
                    "Zalera",
                ],
            },
            DataCenter {
                name: "Dynamis",
                worlds: &[
                    "Cuchulainn",
                    "Golem",
                    "Halicarnassus",
                    "Maduin",
                    "Marilith",
                    "Rafflesia",
                    "Seraph",
                    "Kraken",
                ],
            },
        ],
    },
    Region {
        name: "Japan",
        data_centers: &[
            DataCenter {
                name: "Elemental",
                worlds: &[
                    "Aegis", "Atomos", "Carbuncle", "Garuda", "Gungnir", "Kujata", "Ramuh",
                    "Typhon",
                ],
            },
            DataCenter {
                name: "Gaia",
                worlds: &[
                    "Alexander",
                    "Bahamut",
                    "Durandal",
                    "Fenrir",
                    "Ifrit",
                    "Ridill",
                    "Tiamat",
                    "Ultima",
                ],
            },
            DataCenter {
                name: "Mana",
                worlds: &[
                    "Anima",
                    "Asura",
                    "Chocobo",
                    "Hades",
                    "Ixion",
                    "Masamune",
                    "Pandaemonium",
                    "Titan",
                ],
            },
            DataCenter {
                name: "Meteor",
                worlds: &[
                    "Belias",
                    "Mandragora",
                    "Ramuh",
                    "Shinryu",
                    "Unicorn",
                    "Valefor",
                    "Yojimbo",
                    "Zeromus",
                ],
            },
        ],
    },
    Region {
        name: "Oceania",
        data_centers: &[DataCenter {
            name: "Materia",
            worlds: &["Bismarck", "Ravana", "Sephirot", "Sophia", "Zurvan"],
        }],
    },
];

pub fn region(name: &str) -> Option<&'static Region> {
    REGIONS.iter().find(|region| region.name == name)
}

pub fn data_center(region_name: &str, dc_name: &str) -> Option<&'static DataCenter> {
    region(region_name)?
        .data_centers
        .iter()
        .find(|dc| dc.name == dc_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selection_exists() {
        let dc = data_center(DEFAULT_REGION, DEFAULT_DATA_CENTER).expect("default DC");
        assert!(dc.worlds.contains(&"Odin"));
    }

    #[test]
    fn every_data_center_has_worlds() {
        for region in REGIONS {
            assert!(!region.data_centers.is_empty(), "{} has no DCs", region.name);
            for dc in region.data_centers {
                assert!(!dc.worlds.is_empty(), "{} has no worlds", dc.name);
            }
        }
    }

    #[test]
    fn unknown_names_resolve_to_none() {
        assert!(region("Atlantis").is_none());
        assert!(data_center("Europe", "Aether").is_none());
    }
}
