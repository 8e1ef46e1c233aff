use fontdb::{Database, Family, Query, Stretch, Style, Weight};

use super::FontError;

/// Bytes of one installed font face.
#[derive(Clone)]
pub struct SystemFont {
    pub family: String,
    pub data: Vec<u8>,
    /// Face index inside a font collection (`.ttc`), `0` otherwise.
    pub index: u32,
}

impl std::fmt::Debug for SystemFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemFont")
            .field("family", &self.family)
            .field("bytes", &self.data.len())
            .field("index", &self.index)
            .finish()
    }
}

/// Installed fonts, scanned once.
pub struct SystemFonts {
    db: Database,
}

impl SystemFonts {
    /// Scans the platform font directories.
    pub fn load() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        log::debug!("fontdb: {} faces loaded", db.len());
        Self { db }
    }

    /// Resolves a regular-weight upright face by family name.
    ///
    /// `serif`, `sans-serif` and `monospace` map to the generic families.
    pub fn find(&self, family: &str) -> Result<SystemFont, FontError> {
        let name = family.trim();
        let families = [generic_family(name)];
        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };

        let id = self
            .db
            .query(&query)
            .ok_or_else(|| FontError::NotFound(family.to_string()))?;

        self.db
            .with_face_data(id, |data, index| SystemFont {
                family: name.to_string(),
                data: data.to_vec(),
                index,
            })
            .ok_or_else(|| FontError::NotFound(family.to_string()))
    }

    /// Returns the first family in `families` that resolves.
    pub fn find_first(&self, families: &[&str]) -> Result<SystemFont, FontError> {
        for family in families {
            match self.find(family) {
                Ok(font) => return Ok(font),
                Err(e) => log::debug!("{e}"),
            }
        }
        Err(FontError::NotFound(families.join(", ")))
    }
}

fn generic_family(name: &str) -> Family<'_> {
    if name.eq_ignore_ascii_case("serif") {
        Family::Serif
    } else if name.eq_ignore_ascii_case("sans-serif") || name.eq_ignore_ascii_case("sans") {
        Family::SansSerif
    } else if name.eq_ignore_ascii_case("monospace") || name.eq_ignore_ascii_case("mono") {
        Family::Monospace
    } else {
        Family::Name(name)
    }
}

/// Resolves an installed font by family name.
pub fn find_system_font(family: &str) -> Result<SystemFont, FontError> {
    SystemFonts::load().find(family)
}

/// Resolves the first installed family out of `families`.
pub fn find_first_system_font(families: &[&str]) -> Result<SystemFont, FontError> {
    SystemFonts::load().find_first(families)
}
