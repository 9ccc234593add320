use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Hokkaido,
    Tohoku,
    Kanto,
    Chubu,
    Kinki,
    Chugoku,
    Shikoku,
    Kyushu,
}

impl Region {
    pub const ALL: [Region; 8] = [
        Region::Hokkaido,
        Region::Tohoku,
        Region::Kanto,
        Region::Chubu,
        Region::Kinki,
        Region::Chugoku,
        Region::Shikoku,
        Region::Kyushu,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Hokkaido => "hokkaido",
            Region::Tohoku => "tohoku",
            Region::Kanto => "kanto",
            Region::Chubu => "chubu",
            Region::Kinki => "kinki",
            Region::Chugoku => "chugoku",
            Region::Shikoku => "shikoku",
            Region::Kyushu => "kyushu",
        }
    }

    pub fn prefectures(&self) -> &'static [&'static str] {
        match self {
            Region::Hokkaido => &["北海道"],
            Region::Tohoku => &["青森県", "岩手県", "宮城県", "秋田県", "山形県", "福島県"],
            Region::Kanto => &[
                "茨城県", "栃木県", "群馬県", "埼玉県", "千葉県", "東京都", "神奈川県",
            ],
            Region::Chubu => &[
                "新潟県", "富山県", "石川県", "福井県", "山梨県", "長野県", "岐阜県", "静岡県",
                "愛知県",
            ],
            Region::Kinki => &[
                "三重県", "滋賀県", "京都府", "大阪府", "兵庫県", "奈良県", "和歌山県",
            ],
            Region::Chugoku => &["鳥取県", "島根県", "岡山県", "広島県", "山口県"],
            Region::Shikoku => &["徳島県", "香川県", "愛媛県", "高知県"],
            Region::Kyushu => &[
                "福岡県", "佐賀県", "長崎県", "熊本県", "大分県", "宮崎県", "鹿児島県", "沖縄県",
            ],
        }
    }

    pub fn contains(&self, prefecture: &str) -> bool {
        self.prefectures().contains(&prefecture)
    }

    /// Region a prefecture belongs to, if the name is one of the 47.
    pub fn of(prefecture: &str) -> Option<Region> {
        Region::ALL.into_iter().find(|r| r.contains(prefecture))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("unknown region: {s}"))
    }
}

pub fn is_known_prefecture(name: &str) -> bool {
    Region::of(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_all_47_prefectures_once() {
        let mut all: Vec<&str> = Region::ALL
            .iter()
            .flat_map(|r| r.prefectures().iter().copied())
            .collect();
        assert_eq!(all.len(), 47);
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 47);
    }

    #[test]
    fn finds_region_of_prefecture() {
        assert_eq!(Region::of("神奈川県"), Some(Region::Kanto));
        assert_eq!(Region::of("沖縄県"), Some(Region::Kyushu));
        assert_eq!(Region::of("Atlantis"), None);
    }

    #[test]
    fn parses_region_names() {
        assert_eq!("kinki".parse::<Region>().unwrap(), Region::Kinki);
        assert!("kansai".parse::<Region>().is_err());
    }
}
