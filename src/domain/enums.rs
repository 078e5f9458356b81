//! Enumerated option sets offered by the input form.
//!
//! Every option has a human-readable label (what the form shows), a stored
//! value (what a saved session carries) and optional aliases. Parsing accepts
//! any of them case-insensitively, plus the 1-based position used by numeric
//! option sets.

use serde::Serialize;
use std::fmt;

pub trait OptionSet: Sized + Copy + PartialEq + 'static {
    const ALL: &'static [Self];

    fn label(&self) -> &'static str;

    fn stored_value(&self) -> &'static str;

    fn aliases(&self) -> &'static [&'static str];

    /// 1-based position within the option set.
    fn numeric_value(&self) -> usize {
        Self::ALL
            .iter()
            .position(|member| member == self)
            .map(|index| index + 1)
            .unwrap_or(0)
    }

    fn parse_option(raw: &str) -> Option<Self> {
        let needle = raw.trim();
        Self::ALL.iter().copied().find(|member| {
            member.label().eq_ignore_ascii_case(needle)
                || member.stored_value().eq_ignore_ascii_case(needle)
                || member
                    .aliases()
                    .iter()
                    .any(|alias| alias.eq_ignore_ascii_case(needle))
        })
    }

    fn from_numeric(value: i64) -> Option<Self> {
        usize::try_from(value)
            .ok()
            .and_then(|position| position.checked_sub(1))
            .and_then(|index| Self::ALL.get(index).copied())
    }

    fn allowed_labels() -> Vec<String> {
        Self::ALL
            .iter()
            .map(|member| member.label().to_string())
            .collect()
    }
}

macro_rules! option_set {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => ($label:literal, $stored:literal $(, $alias:literal)*)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        pub enum $name {
            $(
                #[serde(rename = $stored)]
                $variant,
            )+
        }

        impl OptionSet for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }

            fn stored_value(&self) -> &'static str {
                match self {
                    $(Self::$variant => $stored,)+
                }
            }

            fn aliases(&self) -> &'static [&'static str] {
                match self {
                    $(Self::$variant => &[stringify!($variant) $(, $alias)*],)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

option_set! {
    /// Supported FLAC3D releases.
    FlacVersion {
        V5_0 => ("5.0", "5_0", "5"),
        V7_0 => ("7.0", "7_0", "7"),
    }
}

option_set! {
    /// Layout of the generated script.
    OutputFormat {
        Standard => ("Standard", "standard"),
        Compact => ("Compact", "compact"),
    }
}

option_set! {
    GeometryFormat {
        Stl => ("STL", "stl"),
        Dxf => ("DXF", "dxf"),
    }
}

option_set! {
    /// External visualization tools that can consume simulator results.
    ExportTarget {
        Mxrap => ("mXrap", "mxrap"),
        Gem4d => ("GEM4D", "gem4d"),
        ParaView => ("ParaView", "paraview"),
    }
}

option_set! {
    /// Relative geometry accuracy. The form labels Low/High map to Minimum/Maximum.
    GeometryAccuracy {
        Minimum => ("Minimum", "minimum", "low"),
        Intermediate => ("Intermediate", "intermediate", "medium"),
        Maximum => ("Maximum", "maximum", "high"),
    }
}

option_set! {
    DensificationLevel {
        No => ("No Densification", "no_densification", "none"),
        Minimum => ("Minimum Densification", "minimum_densification"),
        Intermediate => ("Intermediate Densification", "intermediate_densification"),
        Maximum => ("Maximum Densification", "maximum_densification"),
    }
}

option_set! {
    AoiGeoType {
        Surface => ("Surface", "surface"),
        ClosedVolume => ("Closed Volume", "closed_volume"),
        PitSlope => ("Pit Slope", "pit_slope"),
    }
}

option_set! {
    BackfillMaterial {
        Elastic => ("Elastic", "elastic"),
        Inelastic => ("Inelastic", "inelastic"),
    }
}

option_set! {
    /// Kinds of model-construction steps.
    StepKind {
        Stoping => ("Stoping", "stoping", "stopping"),
        Topography => ("Topography", "topography", "topo"),
        Development => ("Development", "development", "dev"),
        AreaOfInterest => ("Area of Interest", "area_of_interest", "aoi"),
        HistoricalMining => ("Historical Mining", "historical_mining", "historical", "hist"),
    }
}

impl FlacVersion {
    /// Tag used in output file names, e.g. `7_0`.
    pub fn file_tag(&self) -> &'static str {
        self.stored_value()
    }
}

impl GeometryFormat {
    pub fn extension(&self) -> &'static str {
        self.stored_value()
    }
}

impl ExportTarget {
    /// Settings field holding this target's flag.
    pub fn field_name(&self) -> &'static str {
        self.stored_value()
    }
}

impl StepKind {
    /// Prefix of the FISH variables describing this step, e.g. `Area_of_Interest`.
    pub fn key_prefix(&self) -> &'static str {
        match self {
            StepKind::Stoping => "Stoping",
            StepKind::Topography => "Topography",
            StepKind::Development => "Development",
            StepKind::AreaOfInterest => "Area_of_Interest",
            StepKind::HistoricalMining => "Historical_Mining",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_round_trip<T: OptionSet + fmt::Debug>() {
        for member in T::ALL {
            assert_eq!(T::parse_option(member.label()), Some(*member));
            assert_eq!(T::parse_option(member.stored_value()), Some(*member));
            assert_eq!(T::from_numeric(member.numeric_value() as i64), Some(*member));
        }
    }

    #[test]
    fn test_every_option_parses_from_label_and_stored_value() {
        assert_round_trip::<FlacVersion>();
        assert_round_trip::<OutputFormat>();
        assert_round_trip::<GeometryFormat>();
        assert_round_trip::<ExportTarget>();
        assert_round_trip::<GeometryAccuracy>();
        assert_round_trip::<DensificationLevel>();
        assert_round_trip::<AoiGeoType>();
        assert_round_trip::<BackfillMaterial>();
        assert_round_trip::<StepKind>();
    }

    #[test]
    fn test_aliases_and_case_insensitivity() {
        assert_eq!(FlacVersion::parse_option("V7_0"), Some(FlacVersion::V7_0));
        assert_eq!(GeometryAccuracy::parse_option("High"), Some(GeometryAccuracy::Maximum));
        assert_eq!(GeometryAccuracy::parse_option("low"), Some(GeometryAccuracy::Minimum));
        assert_eq!(StepKind::parse_option("Topo"), Some(StepKind::Topography));
        assert_eq!(StepKind::parse_option(" Area of Interest "), Some(StepKind::AreaOfInterest));
        assert_eq!(ExportTarget::parse_option("MXRAP"), Some(ExportTarget::Mxrap));
    }

    #[test]
    fn test_unknown_values_are_rejected() {
        assert_eq!(FlacVersion::parse_option("6.0"), None);
        assert_eq!(OutputFormat::parse_option("verbose"), None);
        assert_eq!(StepKind::parse_option(""), None);
        assert_eq!(AoiGeoType::from_numeric(0), None);
        assert_eq!(AoiGeoType::from_numeric(4), None);
        assert_eq!(AoiGeoType::from_numeric(-1), None);
    }

    #[test]
    fn test_numeric_values_are_one_based() {
        assert_eq!(DensificationLevel::No.numeric_value(), 1);
        assert_eq!(DensificationLevel::Maximum.numeric_value(), 4);
        assert_eq!(
            FlacVersion::allowed_labels(),
            vec!["5.0".to_string(), "7.0".to_string()]
        );
    }

    #[test]
    fn test_serializes_as_stored_value() {
        let json = serde_json::to_string(&FlacVersion::V7_0).unwrap();
        assert_eq!(json, "\"7_0\"");
    }
}
