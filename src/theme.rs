use std::fmt;
use std::str::FromStr;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    const fn hex(value: u32) -> Self {
        Rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// The eighteen species types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeName {
    Normal,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

impl TypeName {
    pub const ALL: [TypeName; 18] = [
        TypeName::Normal,
        TypeName::Fire,
        TypeName::Water,
        TypeName::Electric,
        TypeName::Grass,
        TypeName::Ice,
        TypeName::Fighting,
        TypeName::Poison,
        TypeName::Ground,
        TypeName::Flying,
        TypeName::Psychic,
        TypeName::Bug,
        TypeName::Rock,
        TypeName::Ghost,
        TypeName::Dragon,
        TypeName::Dark,
        TypeName::Steel,
        TypeName::Fairy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeName::Normal => "normal",
            TypeName::Fire => "fire",
            TypeName::Water => "water",
            TypeName::Electric => "electric",
            TypeName::Grass => "grass",
            TypeName::Ice => "ice",
            TypeName::Fighting => "fighting",
            TypeName::Poison => "poison",
            TypeName::Ground => "ground",
            TypeName::Flying => "flying",
            TypeName::Psychic => "psychic",
            TypeName::Bug => "bug",
            TypeName::Rock => "rock",
            TypeName::Ghost => "ghost",
            TypeName::Dragon => "dragon",
            TypeName::Dark => "dark",
            TypeName::Steel => "steel",
            TypeName::Fairy => "fairy",
        }
    }

    pub fn theme(&self) -> Theme {
        let (from, to) = match self {
            TypeName::Normal => (0xe7e5e4, 0xd6d3d1),
            TypeName::Fire => (0xf97316, 0xef4444),
            TypeName::Water => (0x0ea5e9, 0x2563eb),
            TypeName::Electric => (0xfacc15, 0xf59e0b),
            TypeName::Grass => (0x10b981, 0x16a34a),
            TypeName::Ice => (0x67e8f9, 0x7dd3fc),
            TypeName::Fighting => (0xe11d48, 0xc2410c),
            TypeName::Poison => (0xc026d3, 0x7e22ce),
            TypeName::Ground => (0xb45309, 0x854d0e),
            TypeName::Flying => (0x818cf8, 0x38bdf8),
            TypeName::Psychic => (0xec4899, 0x9333ea),
            TypeName::Bug => (0x84cc16, 0x16a34a),
            TypeName::Rock => (0x854d0e, 0x44403c),
            TypeName::Ghost => (0x1f2937, 0x111827),
            TypeName::Dragon => (0x4338ca, 0x1e40af),
            TypeName::Dark => (0x171717, 0x262626),
            TypeName::Steel => (0xa1a1aa, 0x737373),
            TypeName::Fairy => (0xfb7185, 0xec4899),
        };
        Theme {
            from: Rgb::hex(from),
            to: Rgb::hex(to),
        }
    }
}

impl FromStr for TypeName {
    type Err = ();

    /// Exact, lowercase match; PokéAPI type names are lowercase.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeName::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two-color gradient used as a card background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Theme {
    pub from: Rgb,
    pub to: Rgb,
}

impl Theme {
    /// Neutral slate theme shown before a species is known.
    pub const DEFAULT: Theme = Theme {
        from: Rgb::hex(0xf1f5f9),
        to: Rgb::hex(0xe2e8f0),
    };

    const CHIP_FALLBACK: Theme = Theme {
        from: Rgb::hex(0x94a3b8),
        to: Rgb::hex(0x64748b),
    };

    const STAT_FALLBACK: Theme = Theme {
        from: Rgb::hex(0x334155),
        to: Rgb::hex(0x334155),
    };

    /// Resolve the card theme for a type name. Absent, empty and unknown
    /// names all give [`Theme::DEFAULT`].
    pub fn resolve(type_name: Option<&str>) -> Theme {
        type_name
            .and_then(|name| name.parse::<TypeName>().ok())
            .map(|t| t.theme())
            .unwrap_or(Theme::DEFAULT)
    }

    /// Gradient for a single type badge.
    pub fn chip(type_name: &str) -> Theme {
        type_name
            .parse::<TypeName>()
            .map(|t| t.theme())
            .unwrap_or(Theme::CHIP_FALLBACK)
    }

    /// Background of a stat tile: the active type's gradient, or solid slate.
    pub fn stat_fill(active: Option<TypeName>) -> Theme {
        active
            .map(|t| t.theme())
            .unwrap_or(Theme::STAT_FALLBACK)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::DEFAULT
    }
}
