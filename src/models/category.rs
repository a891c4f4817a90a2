//! Torznab category table, shared by the presenter and by plugins that don't
//! declare an explicit category mapping in their descriptor.

use serde::{Deserialize, Serialize};

/// A Torznab category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i32,
    pub name: &'static str,
    pub description: &'static str,
}

/// Standard Torznab categories (Console, Movies, Audio, PC, TV, XXX, Books, Other).
pub static CATEGORIES: &[Category] = &[
    Category { id: 1000, name: "Console", description: "Console games" },
    Category { id: 2000, name: "Movies", description: "Movies" },
    Category { id: 2010, name: "Movies/Foreign", description: "Foreign movies" },
    Category { id: 2020, name: "Movies/Other", description: "Other movies" },
    Category { id: 2030, name: "Movies/SD", description: "SD movies" },
    Category { id: 2040, name: "Movies/HD", description: "HD movies" },
    Category { id: 2045, name: "Movies/UHD", description: "4K/UHD movies" },
    Category { id: 2050, name: "Movies/BluRay", description: "BluRay movies" },
    Category { id: 2060, name: "Movies/3D", description: "3D movies" },
    Category { id: 2070, name: "Movies/DVD", description: "DVD movies" },
    Category { id: 2080, name: "Movies/WEBDL", description: "WEB-DL movies" },
    Category { id: 3000, name: "Audio", description: "Audio" },
    Category { id: 3010, name: "Audio/MP3", description: "MP3" },
    Category { id: 3030, name: "Audio/Audiobook", description: "Audiobooks" },
    Category { id: 4000, name: "PC", description: "PC software and games" },
    Category { id: 4050, name: "PC/Games", description: "PC games" },
    Category { id: 5000, name: "TV", description: "TV shows" },
    Category { id: 5010, name: "TV/WEB-DL", description: "WEB-DL TV" },
    Category { id: 5020, name: "TV/Foreign", description: "Foreign TV" },
    Category { id: 5030, name: "TV/SD", description: "SD TV" },
    Category { id: 5040, name: "TV/HD", description: "HD TV" },
    Category { id: 5045, name: "TV/UHD", description: "4K/UHD TV" },
    Category { id: 5060, name: "TV/Sport", description: "Sports TV" },
    Category { id: 5070, name: "TV/Anime", description: "Anime" },
    Category { id: 5080, name: "TV/Documentary", description: "Documentaries" },
    Category { id: 6000, name: "XXX", description: "Adult content" },
    Category { id: 7000, name: "Books", description: "Books" },
    Category { id: 7020, name: "Books/EBook", description: "E-books" },
    Category { id: 7030, name: "Books/Comics", description: "Comics" },
    Category { id: 8000, name: "Other", description: "Other" },
    Category { id: 8010, name: "Other/Misc", description: "Miscellaneous" },
    Category { id: 8020, name: "Other/Hashed", description: "Hashed releases" },
];

/// Look up a category by exact id.
pub fn get_category(id: i32) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.id == id)
}

/// Parent category id (e.g. 2030 -> 2000); used as the fallback mapping when a
/// plugin's descriptor doesn't declare an explicit entry for a site category.
pub fn parent_category(id: i32) -> i32 {
    (id / 1000) * 1000
}
