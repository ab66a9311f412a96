//! Prefecture to representative city lookup.
//!
//! Keys are the lower-cased, normalized romaji prefecture names. Each maps to
//! the city searched instead when the geocoder has no hit for the prefecture.

use std::collections::HashMap;
use std::sync::LazyLock;

const PREFECTURE_TO_CITY: [(&str, &str); 47] = [
    ("hokkaido", "sapporo"),
    ("aomori", "aomori"),
    ("iwate", "morioka"),
    ("miyagi", "sendai"),
    ("akita", "akita"),
    ("yamagata", "yamagata"),
    ("fukushima", "fukushima"),
    ("ibaraki", "mito"),
    ("tochigi", "utsunomiya"),
    ("gunma", "maebashi"),
    ("saitama", "saitama"),
    ("chiba", "chiba"),
    ("tokyo", "tokyo"),
    ("kanagawa", "yokohama"),
    ("niigata", "niigata"),
    ("toyama", "toyama"),
    ("ishikawa", "kanazawa"),
    ("fukui", "fukui"),
    ("yamanashi", "kofu"),
    ("nagano", "nagano"),
    ("gifu", "gifu"),
    ("shizuoka", "shizuoka"),
    ("aichi", "nagoya"),
    ("mie", "tsu"),
    ("shiga", "otsu"),
    ("kyoto", "kyoto"),
    ("osaka", "osaka"),
    ("hyogo", "kobe"),
    ("nara", "nara"),
    ("wakayama", "wakayama"),
    ("tottori", "tottori"),
    ("shimane", "matsue"),
    ("okayama", "okayama"),
    ("hiroshima", "hiroshima"),
    ("yamaguchi", "yamaguchi"),
    ("tokushima", "tokushima"),
    ("kagawa", "takamatsu"),
    ("ehime", "matsuyama"),
    ("kochi", "kochi"),
    ("fukuoka", "fukuoka"),
    ("saga", "saga"),
    ("nagasaki", "nagasaki"),
    ("kumamoto", "kumamoto"),
    ("oita", "oita"),
    ("miyazaki", "miyazaki"),
    ("kagoshima", "kagoshima"),
    ("okinawa", "naha"),
];

static TABLE: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| PREFECTURE_TO_CITY.into_iter().collect());

/// Representative city for a lower-cased prefecture name.
#[must_use]
pub fn representative_city(prefecture: &str) -> Option<&'static str> {
    TABLE.get(prefecture).copied()
}

/// All `(prefecture, city)` pairs.
pub fn entries() -> impl Iterator<Item = (&'static str, &'static str)> {
    PREFECTURE_TO_CITY.iter().copied()
}
