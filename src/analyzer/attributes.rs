// Lookup table describing how known SMART attributes are interpreted

use regex::Regex;
use std::sync::LazyLock;

use crate::models::AttributeReading;

/// How the analyzer reads an attribute's value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpretation {
    /// Raw value counts remapped sectors
    ReallocatedSectors,
    /// Raw value counts sectors waiting to be remapped
    PendingSectors,
    /// Raw value counts sectors that could not be read back
    UncorrectableSectors,
    /// Normalized value is the percentage of life left
    LifeLeft,
    /// Normalized value counts down from 100 as the media wears
    MediaWearout,
    /// Raw value is the percentage of rated life used
    LifetimeUsed,
    /// Normalized value is life left, raw value is the wear-leveling count
    WearLevelingCount,
    /// Raw value is the average program/erase cycle count
    ProgramEraseCount,
    /// Plain counter, reported but not scored
    Counter,
}

/// How much an attribute matters for the drive's survival.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Criticality {
    Informational,
    Advisory,
    Critical,
}

#[derive(Debug)]
pub struct AttributeSpec {
    pub id: u8,
    pub name: &'static str,
    /// Case-insensitive pattern for vendors that report the attribute under another id
    pub name_pattern: &'static str,
    pub interpretation: Interpretation,
    pub criticality: Criticality,
}

/// Known attributes. Adding a vendor attribute only needs a new row here.
pub static ATTRIBUTE_TABLE: &[AttributeSpec] = &[
    AttributeSpec {
        id: 5,
        name: "Reallocated_Sector_Ct",
        name_pattern: r"^reallocated_sector",
        interpretation: Interpretation::ReallocatedSectors,
        criticality: Criticality::Critical,
    },
    AttributeSpec {
        id: 197,
        name: "Current_Pending_Sector",
        name_pattern: r"pending_sector",
        interpretation: Interpretation::PendingSectors,
        criticality: Criticality::Critical,
    },
    AttributeSpec {
        id: 198,
        name: "Offline_Uncorrectable",
        name_pattern: r"^offline_uncorrectable",
        interpretation: Interpretation::UncorrectableSectors,
        criticality: Criticality::Critical,
    },
    AttributeSpec {
        id: 231,
        name: "SSD_Life_Left",
        name_pattern: r"^ssd_life_left",
        interpretation: Interpretation::LifeLeft,
        criticality: Criticality::Advisory,
    },
    AttributeSpec {
        id: 233,
        name: "Media_Wearout_Indicator",
        name_pattern: r"media_wearout",
        interpretation: Interpretation::MediaWearout,
        criticality: Criticality::Advisory,
    },
    AttributeSpec {
        id: 202,
        name: "Percent_Lifetime_Used",
        name_pattern: r"^percent_lifetime_used",
        interpretation: Interpretation::LifetimeUsed,
        criticality: Criticality::Advisory,
    },
    AttributeSpec {
        id: 177,
        name: "Wear_Leveling_Count",
        name_pattern: r"^wear_leveling_count",
        interpretation: Interpretation::WearLevelingCount,
        criticality: Criticality::Advisory,
    },
    AttributeSpec {
        id: 173,
        name: "Ave_Block-Erase_Count",
        name_pattern: r"erase_count",
        interpretation: Interpretation::ProgramEraseCount,
        criticality: Criticality::Informational,
    },
    AttributeSpec {
        id: 10,
        name: "Spin_Retry_Count",
        name_pattern: r"^spin_retry",
        interpretation: Interpretation::Counter,
        criticality: Criticality::Critical,
    },
    AttributeSpec {
        id: 184,
        name: "End-to-End_Error",
        name_pattern: r"end.to.end_error",
        interpretation: Interpretation::Counter,
        criticality: Criticality::Critical,
    },
    AttributeSpec {
        id: 187,
        name: "Reported_Uncorrect",
        name_pattern: r"^reported_uncorrect",
        interpretation: Interpretation::Counter,
        criticality: Criticality::Critical,
    },
    AttributeSpec {
        id: 188,
        name: "Command_Timeout",
        name_pattern: r"^command_timeout",
        interpretation: Interpretation::Counter,
        criticality: Criticality::Advisory,
    },
    AttributeSpec {
        id: 199,
        name: "UDMA_CRC_Error_Count",
        name_pattern: r"crc_error",
        interpretation: Interpretation::Counter,
        criticality: Criticality::Advisory,
    },
    AttributeSpec {
        id: 9,
        name: "Power_On_Hours",
        name_pattern: r"^power_on_hours",
        interpretation: Interpretation::Counter,
        criticality: Criticality::Informational,
    },
    AttributeSpec {
        id: 12,
        name: "Power_Cycle_Count",
        name_pattern: r"^power_cycle_count",
        interpretation: Interpretation::Counter,
        criticality: Criticality::Informational,
    },
    AttributeSpec {
        id: 194,
        name: "Temperature_Celsius",
        name_pattern: r"^temperature_celsius",
        interpretation: Interpretation::Counter,
        criticality: Criticality::Informational,
    },
];

/// Wear indicators in the order they are preferred.
pub const WEAR_INDICATORS: [Interpretation; 4] = [
    Interpretation::LifeLeft,
    Interpretation::MediaWearout,
    Interpretation::LifetimeUsed,
    Interpretation::WearLevelingCount,
];

static NAME_PATTERNS: LazyLock<Vec<(Regex, &'static AttributeSpec)>> = LazyLock::new(|| {
    ATTRIBUTE_TABLE
        .iter()
        .map(|spec| {
            let re = Regex::new(&format!("(?i){}", spec.name_pattern))
                .expect("attribute name patterns are valid regexes");
            (re, spec)
        })
        .collect()
});

/// Finds the table entry for a reading, by id first and by name otherwise.
pub fn lookup(reading: &AttributeReading) -> Option<&'static AttributeSpec> {
    ATTRIBUTE_TABLE
        .iter()
        .find(|spec| spec.id == reading.id)
        .or_else(|| {
            NAME_PATTERNS
                .iter()
                .find(|(re, _)| re.is_match(&reading.name))
                .map(|(_, spec)| *spec)
        })
}

/// First reading interpreted the given way, in snapshot order.
pub fn find(
    readings: &[AttributeReading],
    interpretation: Interpretation,
) -> Option<&AttributeReading> {
    readings
        .iter()
        .find(|r| lookup(r).is_some_and(|spec| spec.interpretation == interpretation))
}
