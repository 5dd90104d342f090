//! Default consolidation rule tables for MIMIC-III admission data.

use los_model::columns::{
    ADMISSION_LOCATION, ADMISSION_TYPE, CURR_SERVICE, ETHNICITY, FIRST_CAREUNIT, LANGUAGE,
    MARITAL_STATUS, NOT_ADMITTED, RELIGION,
};

use crate::consolidate::RuleTable;

pub const OTHER_UNKNOWN: &str = "OTHER/UNKNOWN";

pub fn admission_type() -> RuleTable {
    RuleTable::new(ADMISSION_TYPE, OTHER_UNKNOWN)
        .exact(&["EMERGENCY", "URGENT"], "EMERGENCY")
        .exact(&["ELECTIVE"], "ELECTIVE")
        .exact(&["NEWBORN"], "NEWBORN")
}

pub fn first_careunit() -> RuleTable {
    RuleTable::new(FIRST_CAREUNIT, OTHER_UNKNOWN)
        .exact(&["MICU", "SICU", "CCU", "CSRU", "TSICU", "ICU"], "ICU")
        .exact(&["NICU"], "NICU")
        .exact(&[NOT_ADMITTED], NOT_ADMITTED)
}

pub fn curr_service() -> RuleTable {
    RuleTable::new(CURR_SERVICE, OTHER_UNKNOWN)
        .exact(
            &["CSURG", "NSURG", "ORTHO", "PSURG", "SURG", "TSURG", "VSURG"],
            "SURGERY",
        )
        .exact(&["MED", "CMED", "OMED", "NMED", "TRAUM"], "MED")
        .exact(&["NB", "NBB", "OBS", "GYN"], "GYNECOLOGY/NEWBORN")
        .exact(&["GU", "ENT", "DENT", "PSYCH"], OTHER_UNKNOWN)
}

/// Exact matches run first so e.g. `AMERICAN INDIAN/ALASKA NATIVE` is not
/// captured by a broader substring rule.
pub fn ethnicity() -> RuleTable {
    RuleTable::new(ETHNICITY, OTHER_UNKNOWN)
        .exact(
            &[
                "AMERICAN INDIAN/ALASKA NATIVE FEDERALLY RECOGNIZED TRIBE",
                "SOUTH AMERICAN",
                "CARIBBEAN ISLAND",
                "NATIVE HAWAIIAN OR OTHER PACIFIC ISLANDER",
                "AMERICAN INDIAN/ALASKA NATIVE",
                "MIDDLE EASTERN",
                "PORTUGUESE",
                "MULTI RACE ETHNICITY",
                "PATIENT DECLINED TO ANSWER",
                "OTHER",
            ],
            OTHER_UNKNOWN,
        )
        .contains(&["WHITE"], "WHITE")
        .contains(&["ASIAN"], "ASIAN")
        .contains(&["HISPANIC", "LATINA"], "HISPANIC/LATINO")
        .contains(&["BLACK"], "BLACK_AFRICAN/OTHER")
        .contains(&["UNKNOWN", "OBTAIN"], OTHER_UNKNOWN)
}

pub fn marital_status() -> RuleTable {
    RuleTable::new(MARITAL_STATUS, OTHER_UNKNOWN)
        .exact(&["MARRIED", "LIFE PARTNER"], "LIFE_PARTNER")
        .exact(&["SINGLE", "WIDOWED", "DIVORCED", "SEPARATED"], "SINGLE")
        .exact(&["UNKNOWN (DEFAULT)"], OTHER_UNKNOWN)
}

pub fn religion() -> RuleTable {
    RuleTable::new(RELIGION, OTHER_UNKNOWN)
        .exact(
            &[
                "LUTHERAN",
                "METHODIST",
                "HEBREW",
                "BAPTIST",
                "HINDU",
                "UNITARIAN-UNIVERSALIST",
                "ROMANIAN EAST. ORTH",
                "7TH DAY ADVENTIST",
                "JEHOVAH'S WITNESS",
                "MUSLIM",
                "BUDDHIST",
                "CHRISTIAN SCIENTIST",
                "GREEK ORTHODOX",
                "EPISCOPALIAN",
                "OTHER",
                "JEWISH",
                "CATHOLIC",
                "PROTESTANT QUAKER",
            ],
            "RELIGIOUS",
        )
        .exact(&["NOT SPECIFIED", "UNOBTAINABLE"], "NOT_SPECIFIED")
}

pub fn admission_location() -> RuleTable {
    RuleTable::new(ADMISSION_LOCATION, OTHER_UNKNOWN)
        .exact(&["EMERGENCY ROOM ADMIT"], "ER_ADMIT")
        .exact(
            &[
                "HMO REFERRAL/SICK",
                "PHYS REFERRAL/NORMAL DELI",
                "CLINIC REFERRAL/PREMATURE",
            ],
            "REFERRAL",
        )
        .exact(
            &[
                "TRANSFER FROM HOSP/EXTRAM",
                "TRANSFER FROM SKILLED NUR",
                "TRANSFER FROM OTHER HEALT",
                "TRSF WITHIN THIS FACILITY",
            ],
            "TRANSFER",
        )
        .exact(&["** INFO NOT AVAILABLE **"], OTHER_UNKNOWN)
}

pub fn language() -> RuleTable {
    RuleTable::new(LANGUAGE, "OTHER")
        .exact(&["ENGL"], "ENGL")
        .exact(&["UNKNOWN"], "UNKNOWN")
}

/// All default tables, in application order.
pub fn default_rule_tables() -> Vec<RuleTable> {
    vec![
        admission_type(),
        first_careunit(),
        curr_service(),
        ethnicity(),
        marital_status(),
        religion(),
        admission_location(),
        language(),
    ]
}
