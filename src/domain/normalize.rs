//! Canonical comparable form for Chinese place names.
//!
//! The table covers only characters expected in Taipei station and facility
//! names. It is not a general simplified-to-traditional converter; anything
//! outside it passes through unchanged.

/// Simplified → traditional pairs. Identity pairs are kept so the table
/// documents every character the matcher was tuned against.
pub const S2T_TABLE: &[(char, char)] = &[
    ('运', '運'), ('馆', '館'), ('区', '區'), ('号', '號'), ('园', '園'),
    ('场', '場'), ('兴', '興'), ('体', '體'), ('育', '育'), ('路', '路'),
    ('街', '街'), ('电', '電'), ('湾', '灣'), ('学', '學'), ('里', '里'),
    ('宫', '宮'), ('东', '東'), ('南', '南'), ('西', '西'), ('北', '北'),
    ('关', '關'), ('会', '會'), ('员', '員'), ('从', '從'), ('众', '眾'),
    ('业', '業'), ('书', '書'), ('画', '畫'), ('气', '氣'), ('温', '溫'),
    ('国', '國'), ('华', '華'), ('宝', '寶'), ('楼', '樓'), ('医', '醫'),
    ('龙', '龍'), ('龟', '龜'), ('戏', '戲'), ('联', '聯'), ('点', '點'),
    ('务', '務'), ('时', '時'), ('机', '機'), ('车', '車'), ('站', '站'),
    ('台', '台'),
];

/// Alternate form of "Tai" folded into the preferred `台`.
const TAI_ALT: char = '臺';
const TAI: char = '台';

fn substitute(c: char) -> char {
    if c == TAI_ALT {
        return TAI;
    }
    S2T_TABLE
        .iter()
        .find(|(simplified, _)| *simplified == c)
        .map(|(_, traditional)| *traditional)
        .unwrap_or(c)
}

/// Map text to its comparable form. Total and deterministic.
pub fn normalize(text: &str) -> String {
    text.chars().map(substitute).collect::<String>().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_entry_maps_to_traditional() {
        for (s, t) in S2T_TABLE {
            assert_eq!(normalize(&s.to_string()), t.to_string(), "entry {s}");
        }
    }

    #[test]
    fn both_tai_forms_collapse() {
        assert_eq!(normalize("臺北"), "台北");
        assert_eq!(normalize("台北"), "台北");
    }

    #[test]
    fn simplified_station_name_matches_traditional() {
        assert_eq!(normalize("公馆二号"), normalize("公館二號"));
        assert_eq!(normalize("捷运公馆站"), "捷運公館站");
    }

    #[test]
    fn latin_is_lowercased_and_unknown_chars_pass_through() {
        assert_eq!(normalize("MRT Taipei 101"), "mrt taipei 101");
        assert_eq!(normalize("麥當勞"), "麥當勞");
        assert_eq!(normalize(""), "");
    }
}
